//! # rivertable-engine: Texas Hold'em Round Engine
//!
//! Runs Texas Hold'em hands for a table of two to ten players: blinds,
//! hole cards, four betting streets, showdown and pot award, with a per-street log.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and parsing
//! - [`deck`] - Seeded 52-card deck with ChaCha20 shuffling
//! - [`player`] - Seat state and the player action vocabulary
//! - [`rules`] - Action validation against balance and amount owed
//! - [`state`] - Table state; the only place chips move
//! - [`betting`] - One street of betting as a resumable state machine
//! - [`round`] - Hand orchestration: blinds, streets, showdown, reset
//! - [`hand`] / [`equity`] - Hand ranking and win-probability providers
//! - [`events`] - Table events and observers
//! - [`logger`] - Per-street records with CSV and JSONL export
//! - [`snapshot`] - Read-only table view for display
//! - [`errors`] - Error types for round operations
//!
//! ## Quick Start
//!
//! ```rust
//! use rivertable_engine::betting::{ActionRequest, SourceError};
//! use rivertable_engine::events::NoopObserver;
//! use rivertable_engine::player::PlayerAction;
//! use rivertable_engine::round::{Round, RoundConfig};
//!
//! let mut round = Round::with_players(["Alice", "Bob"], 1000, RoundConfig::new(10, 20).with_seed(7))
//!     .expect("valid table");
//! let mut check_or_call = |req: &ActionRequest| -> Result<PlayerAction, SourceError> {
//!     Ok(if req.owed == 0 { PlayerAction::Check } else { PlayerAction::Call })
//! };
//! let summary = round.play_round(&mut check_or_call, &mut NoopObserver).expect("hand completes");
//! assert_eq!(summary.pot, 40);
//! assert_eq!(round.state().total_chips(), 2000);
//! ```
//!
//! ## Action Validation
//!
//! ```rust
//! use rivertable_engine::player::PlayerAction;
//! use rivertable_engine::rules::{validate_action, ValidatedAction};
//!
//! let balance = 1000;
//! let owed = 50;
//! assert_eq!(
//!     validate_action(balance, owed, PlayerAction::Call),
//!     Ok(ValidatedAction::Call { amount: 50 })
//! );
//! assert!(validate_action(balance, owed, PlayerAction::Check).is_err());
//! ```

pub mod betting;
pub mod cards;
pub mod deck;
pub mod equity;
pub mod errors;
pub mod events;
pub mod hand;
pub mod logger;
pub mod player;
pub mod round;
pub mod rules;
pub mod snapshot;
pub mod state;
