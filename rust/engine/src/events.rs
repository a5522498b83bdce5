use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::errors::ActionError;
use crate::logger::Street;
use crate::rules::ValidatedAction;

/// Something that happened at the table. The orchestrator queues these in order; drivers
/// drain them with [`crate::round::Round::drain_events`] and forward them to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundEvent {
    HandStarted {
        hand: u32,
        small_blind_player: String,
        big_blind_player: String,
    },
    BlindPosted {
        player: String,
        amount: u32,
    },
    HoleCardsDealt {
        player: String,
        cards: Vec<Card>,
    },
    CommunityDealt {
        street: Street,
        cards: Vec<Card>,
    },
    StreetStarted {
        street: Street,
    },
    ActionApplied {
        player: String,
        action: ValidatedAction,
        pot: u32,
        current_bet: u32,
    },
    ActionRejected {
        player: String,
        reason: String,
        attempts: u32,
    },
    ForcedFold {
        player: String,
        reason: ForcedFoldReason,
    },
    StreetCompleted {
        street: Street,
        pot: u32,
    },
    PotAwarded {
        winners: Vec<String>,
        share: u32,
        /// Chips left over by the floor split; nobody receives them
        undistributed: u32,
        uncontested: bool,
    },
    HandReset {
        next_small_blind_index: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcedFoldReason {
    /// The action source did not answer before the turn deadline
    Timeout,
    /// Too many invalid actions in a row
    TooManyInvalidActions,
}

impl RoundEvent {
    pub(crate) fn rejected(player: &str, err: &ActionError, attempts: u32) -> Self {
        RoundEvent::ActionRejected {
            player: player.to_string(),
            reason: err.to_string(),
            attempts,
        }
    }
}

/// Fire-and-forget listener for table events (sound cues, UIs, logs).
pub trait RoundObserver {
    /// Called when a street's betting is about to begin.
    fn on_street_start(&mut self, _street: Street) {}

    fn on_event(&mut self, _event: &RoundEvent) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RoundObserver for NoopObserver {}

/// Forwards a batch of events, routing street starts to the cue hook as well.
pub fn dispatch(observer: &mut dyn RoundObserver, events: &[RoundEvent]) {
    for event in events {
        if let RoundEvent::StreetStarted { street } = event {
            observer.on_street_start(*street);
        }
        observer.on_event(event);
    }
}
