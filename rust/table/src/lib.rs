//! # rivertable-table: Live Table Service
//!
//! Runs a [`rivertable_engine::round::Round`] inside a single tokio task. Players, bots, the
//! background driver and turn timers all reach the round through that task; callers hold a
//! cloneable [`TableHandle`] and may subscribe to a stream of [`TableEvent`]s.

pub mod errors;
pub mod events;
pub mod logging;
pub mod service;
pub mod settings;

pub use errors::{ErrorResponse, ErrorSeverity, TableError};
pub use events::{EventBus, EventSubscription, TableEvent};
pub use logging::{init_logging, LogEntry, TestLogSubscriber};
pub use service::{TableHandle, TableService};
pub use settings::{SettingsError, TableSettings};
