//! # rivertable-ai: Computer Opponents
//!
//! Action policies for seats without a human behind them. A policy sees the same
//! [`ActionRequest`] a human would and answers with a [`PlayerAction`].
//!
//! ## Core Components
//!
//! - [`AIOpponent`] - Trait every policy implements
//! - [`baseline`] - Hand-strength and pot-odds opponent
//! - [`PassiveAI`] / [`RandomAI`] - Simple reference policies
//! - [`create_ai`] - Factory by policy name
//! - [`BotSeats`] - Adapts policies to the engine's [`ActionSource`]
//!
//! ## Quick Start
//!
//! ```rust
//! use rivertable_ai::{create_ai, BotSeats};
//! use rivertable_engine::events::NoopObserver;
//! use rivertable_engine::round::{Round, RoundConfig};
//!
//! let mut bots = BotSeats::new();
//! bots.seat("Alice", create_ai("baseline").expect("known policy"));
//! bots.seat("Bob", create_ai("passive").expect("known policy"));
//!
//! let mut round = Round::with_players(["Alice", "Bob"], 1000, RoundConfig::new(10, 20).with_seed(1))
//!     .expect("valid table");
//! let summary = round.play_round(&mut bots, &mut NoopObserver).expect("bots finish the hand");
//! assert!(!summary.winners.is_empty());
//! ```

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rivertable_engine::betting::{ActionRequest, ActionSource, SourceError};
use rivertable_engine::player::PlayerAction;

pub mod baseline;

/// Policy interface for a computer-controlled seat.
///
/// # Example Implementation
///
/// ```rust
/// use rivertable_ai::AIOpponent;
/// use rivertable_engine::betting::ActionRequest;
/// use rivertable_engine::player::PlayerAction;
///
/// struct AlwaysFold;
///
/// impl AIOpponent for AlwaysFold {
///     fn decide(&mut self, _request: &ActionRequest) -> PlayerAction {
///         PlayerAction::Fold
///     }
///
///     fn name(&self) -> &str {
///         "AlwaysFold"
///     }
/// }
/// ```
pub trait AIOpponent: Send {
    /// Chooses an action for the player named in `request`.
    fn decide(&mut self, request: &ActionRequest) -> PlayerAction;

    fn name(&self) -> &str;
}

/// Checks when free, calls otherwise, folds only when a call is unaffordable.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveAI;

impl AIOpponent for PassiveAI {
    fn decide(&mut self, request: &ActionRequest) -> PlayerAction {
        if request.owed == 0 {
            PlayerAction::Check
        } else if request.owed <= request.balance {
            PlayerAction::Call
        } else {
            PlayerAction::Fold
        }
    }

    fn name(&self) -> &str {
        "PassiveAI"
    }
}

/// Picks uniformly among the affordable actions; raises are one to three units.
#[derive(Debug, Clone)]
pub struct RandomAI {
    rng: StdRng,
    raise_unit: u32,
}

impl RandomAI {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            raise_unit: baseline::DEFAULT_RAISE_UNIT,
        }
    }

    pub fn with_raise_unit(mut self, unit: u32) -> Self {
        self.raise_unit = unit.max(1);
        self
    }
}

impl AIOpponent for RandomAI {
    fn decide(&mut self, request: &ActionRequest) -> PlayerAction {
        let mut options = vec![PlayerAction::Fold];
        if request.owed == 0 {
            options.push(PlayerAction::Check);
        } else if request.owed <= request.balance {
            options.push(PlayerAction::Call);
        }
        let by = self.raise_unit * self.rng.random_range(1..=3);
        if request.owed.saturating_add(by) <= request.balance {
            options.push(PlayerAction::Raise(by));
        }
        options[self.rng.random_range(0..options.len())]
    }

    fn name(&self) -> &str {
        "RandomAI"
    }
}

/// Policy names accepted by [`create_ai`].
pub const AI_KINDS: [&str; 3] = ["baseline", "passive", "random"];

/// Builds a policy by name; `None` for an unknown name.
///
/// ```rust
/// use rivertable_ai::create_ai;
///
/// assert_eq!(create_ai("baseline").map(|ai| ai.name().to_string()), Some("BaselineAI".into()));
/// assert!(create_ai("telepathic").is_none());
/// ```
pub fn create_ai(kind: &str) -> Option<Box<dyn AIOpponent>> {
    create_ai_seeded(kind, 0)
}

/// As [`create_ai`], seeding policies that draw random numbers.
pub fn create_ai_seeded(kind: &str, seed: u64) -> Option<Box<dyn AIOpponent>> {
    match kind {
        "baseline" => Some(Box::new(baseline::BaselineAI::new())),
        "passive" => Some(Box::new(PassiveAI)),
        "random" => Some(Box::new(RandomAI::new(seed))),
        _ => None,
    }
}

/// Answers action requests for the seats it holds a policy for.
///
/// A request for any other player is reported as cancelled, which stops a blocking driver
/// instead of guessing on that player's behalf.
#[derive(Default)]
pub struct BotSeats {
    bots: HashMap<String, Box<dyn AIOpponent>>,
}

impl BotSeats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seat(&mut self, player: impl Into<String>, policy: Box<dyn AIOpponent>) {
        self.bots.insert(player.into(), policy);
    }

    pub fn controls(&self, player: &str) -> bool {
        self.bots.contains_key(player)
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }

    /// The chosen action for `request`, if its player has a policy.
    pub fn decide(&mut self, request: &ActionRequest) -> Option<PlayerAction> {
        self.bots
            .get_mut(&request.player)
            .map(|bot| bot.decide(request))
    }
}

impl ActionSource for BotSeats {
    fn get_action(&mut self, request: &ActionRequest) -> Result<PlayerAction, SourceError> {
        self.decide(request).ok_or_else(|| {
            SourceError::Cancelled(format!("no policy seated for {}", request.player))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivertable_engine::logger::Street;

    fn request(owed: u32, balance: u32) -> ActionRequest {
        ActionRequest {
            player: "Bot".into(),
            seat: 1,
            street: Street::Flop,
            owed,
            balance,
            current_bet: owed,
            pot: 60,
            hole_cards: Vec::new(),
            community: Vec::new(),
            win_prob: 0.0,
            attempt: 0,
        }
    }

    #[test]
    fn passive_never_raises() {
        let mut ai = PassiveAI;
        assert_eq!(ai.decide(&request(0, 100)), PlayerAction::Check);
        assert_eq!(ai.decide(&request(20, 100)), PlayerAction::Call);
        assert_eq!(ai.decide(&request(200, 100)), PlayerAction::Fold);
    }

    #[test]
    fn random_only_picks_affordable_actions() {
        let mut ai = RandomAI::new(9).with_raise_unit(10);
        for _ in 0..200 {
            match ai.decide(&request(20, 45)) {
                PlayerAction::Fold | PlayerAction::Call => {}
                PlayerAction::Raise(by) => assert!(20 + by <= 45),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn random_is_reproducible_with_a_seed() {
        let mut a = RandomAI::new(5);
        let mut b = RandomAI::new(5);
        for _ in 0..20 {
            assert_eq!(a.decide(&request(0, 1000)), b.decide(&request(0, 1000)));
        }
    }

    #[test]
    fn factory_knows_every_kind() {
        for kind in AI_KINDS {
            assert!(create_ai(kind).is_some(), "{kind}");
        }
        assert!(create_ai("unknown").is_none());
    }

    #[test]
    fn unseated_player_cancels() {
        let mut bots = BotSeats::new();
        bots.seat("Other", Box::new(PassiveAI));
        assert!(matches!(
            bots.get_action(&request(0, 10)),
            Err(SourceError::Cancelled(_))
        ));
        bots.seat("Bot", Box::new(PassiveAI));
        assert_eq!(bots.get_action(&request(0, 10)), Ok(PlayerAction::Check));
    }
}
