use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use rivertable_engine::events::RoundEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

// Slow subscribers lose their subscription once this many events are queued
const EVENT_CHANNEL_BUFFER: usize = 1000;

pub type EventSender = mpsc::Sender<TableEvent>;
pub type EventReceiver = mpsc::Receiver<TableEvent>;

/// What the table service publishes to its subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableEvent {
    /// An engine event from hand `hand`
    Round { hand: u32, event: RoundEvent },
    /// A human seat is on the clock
    TurnStarted {
        player: String,
        owed: u32,
        timeout_ms: u64,
        /// Wall-clock time the seat is folded if it has not acted
        deadline: chrono::DateTime<chrono::Utc>,
    },
    BlindsChanged { small_blind: u32, big_blind: u32 },
    Stopped { log_path: Option<String> },
}

pub struct EventSubscription {
    bus: EventBus,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }

    pub async fn recv(&mut self) -> Option<TableEvent> {
        self.receiver.recv().await
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscriber_id);
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<Vec<(usize, EventSender)>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> EventSubscription {
        let (subscriber_id, receiver) = self.subscribe_raw();
        EventSubscription {
            bus: self.clone(),
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, tx));
        tracing::info!(subscriber_id = id, "subscribed to table events");
        (id, rx)
    }

    pub fn broadcast(&self, event: TableEvent) {
        tracing::trace!(event = ?event, "broadcasting table event");
        let subscribers = self
            .inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut failed = Vec::new();
        for (id, sender) in subscribers {
            // never block the table on a slow reader
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(subscriber_id = id, error = %e, "dropping table event subscriber");
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(&failed);
        }
    }

    pub fn unsubscribe(&self, subscriber_id: usize) {
        self.remove_subscribers(&[subscriber_id]);
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn remove_subscribers(&self, ids: &[usize]) {
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(id, _)| !ids.contains(id));
    }
}
