//! One street of betting: turn order, the per-player negotiation and termination.
//!
//! [`BettingRound`] is a resumable state machine so the same rules serve a blocking driver
//! ([`BettingRound::run`]) and an event-driven owner that feeds actions as they arrive.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::Card;
use crate::errors::{ActionError, GameError};
use crate::events::ForcedFoldReason;
use crate::logger::Street;
use crate::player::PlayerAction;
use crate::rules::{validate_action, ValidatedAction};
use crate::state::TableState;

/// What an action source is told when a player must act.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub player: String,
    pub seat: usize,
    pub street: Street,
    /// Chips needed to match the current bet
    pub owed: u32,
    pub balance: u32,
    pub current_bet: u32,
    pub pot: u32,
    pub hole_cards: Vec<Card>,
    pub community: Vec<Card>,
    /// Advisory win probability in percent
    pub win_prob: f64,
    /// Rejected attempts so far on this turn
    pub attempt: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Input that does not parse as an action; the player is asked again
    #[error("invalid input: {0:?}")]
    Invalid(String),
    /// No answer before the turn deadline; the player is folded
    #[error("timed out waiting for an action")]
    TimedOut,
    /// The source gave up; the street is aborted
    #[error("cancelled: {0}")]
    Cancelled(String),
}

/// Supplies one action per turn. May block until the player answers.
pub trait ActionSource {
    fn get_action(&mut self, request: &ActionRequest) -> Result<PlayerAction, SourceError>;
}

impl<F> ActionSource for F
where
    F: FnMut(&ActionRequest) -> Result<PlayerAction, SourceError>,
{
    fn get_action(&mut self, request: &ActionRequest) -> Result<PlayerAction, SourceError> {
        self(request)
    }
}

/// Result of handing one action to the betting round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Applied(ValidatedAction),
    /// Illegal action; the same player acts again
    Rejected(ActionError),
    ForcedFold(ForcedFoldReason),
}

#[derive(Debug, Clone)]
pub struct BettingRound {
    street: Street,
    /// Seats in turn order, fixed when the street starts
    order: Vec<usize>,
    cursor: usize,
    /// Matched flag by seat
    matched: Vec<bool>,
    last_raiser: Option<usize>,
    awaiting: Option<usize>,
    invalid_attempts: u32,
    max_invalid_actions: Option<u32>,
    complete: bool,
}

impl BettingRound {
    /// Prepares a street. Pre-flop action starts two seats after the small blind, later
    /// streets at the first seat that has not folded; both wrap around the table.
    pub fn new(
        street: Street,
        state: &TableState,
        small_blind_index: usize,
        max_invalid_actions: Option<u32>,
    ) -> Self {
        let seats = state.seat_count();
        let start_seat = match street {
            Street::Preflop => (small_blind_index + 2) % seats,
            _ => (0..seats)
                .find(|s| !state.folded_seats().contains(s))
                .unwrap_or(0),
        };
        let active = state.active_seats();
        let pos = active.iter().position(|&s| s >= start_seat).unwrap_or(0);
        let order = active[pos..].iter().chain(&active[..pos]).copied().collect();

        Self {
            street,
            order,
            cursor: 0,
            matched: vec![false; seats],
            last_raiser: None,
            awaiting: None,
            invalid_attempts: 0,
            max_invalid_actions,
            complete: false,
        }
    }

    pub fn street(&self) -> Street {
        self.street
    }
    pub fn order(&self) -> &[usize] {
        &self.order
    }
    pub fn last_raiser(&self) -> Option<usize> {
        self.last_raiser
    }
    pub fn is_matched(&self, seat: usize) -> bool {
        self.matched[seat]
    }
    pub fn is_complete(&self) -> bool {
        self.complete
    }
    /// The seat whose action is awaited, as determined by the last [`BettingRound::poll`].
    pub fn awaiting(&self) -> Option<usize> {
        self.awaiting
    }
    pub fn invalid_attempts(&self) -> u32 {
        self.invalid_attempts
    }

    fn all_matched(&self, state: &TableState) -> bool {
        state.active_seats().iter().all(|&s| self.matched[s])
    }

    /// Advances to the next seat that must act and marks it pending, or returns `None` once
    /// the street is resolved.
    pub fn poll(&mut self, state: &mut TableState) -> Option<usize> {
        loop {
            if self.complete {
                return None;
            }
            if state.active_count() <= 1 {
                return self.finish(state);
            }
            if self.cursor >= self.order.len() {
                if self.all_matched(state) {
                    return self.finish(state);
                }
                self.cursor = 0;
                continue;
            }
            let seat = self.order[self.cursor];
            if !state.is_active(seat) {
                self.cursor += 1;
                continue;
            }
            // the last raiser's action already closed the street
            if self.last_raiser == Some(seat) && self.all_matched(state) {
                return self.finish(state);
            }
            if self.awaiting != Some(seat) {
                self.awaiting = Some(seat);
                self.invalid_attempts = 0;
            }
            state.player_mut(seat).set_action_pending(true);
            return Some(seat);
        }
    }

    fn finish(&mut self, state: &mut TableState) -> Option<usize> {
        self.complete = true;
        if let Some(seat) = self.awaiting.take() {
            state.player_mut(seat).set_action_pending(false);
        }
        None
    }

    pub fn request(&self, state: &TableState, seat: usize) -> ActionRequest {
        let player = state.player(seat);
        ActionRequest {
            player: player.name().to_string(),
            seat,
            street: self.street,
            owed: state.owed(seat),
            balance: player.balance(),
            current_bet: state.current_bet(),
            pot: state.pot(),
            hole_cards: player.hole_cards().to_vec(),
            community: state.community().to_vec(),
            win_prob: player.win_prob(),
            attempt: self.invalid_attempts,
        }
    }

    /// Applies `action` for the awaited seat. Illegal actions leave the state untouched.
    pub fn submit(
        &mut self,
        state: &mut TableState,
        seat: usize,
        action: PlayerAction,
    ) -> TurnOutcome {
        let validated = match validate_action(state.player(seat).balance(), state.owed(seat), action)
        {
            Ok(v) => v,
            Err(err) => return self.reject(state, seat, err),
        };
        match validated {
            ValidatedAction::Fold => state.fold(seat),
            ValidatedAction::Check => self.matched[seat] = true,
            ValidatedAction::Call { amount } => {
                if let Err(err) = state.commit(seat, amount) {
                    return self.reject(state, seat, err);
                }
                self.matched[seat] = true;
            }
            ValidatedAction::Raise { by, total } => {
                if let Err(err) = state.commit(seat, total) {
                    return self.reject(state, seat, err);
                }
                state.raise_current_bet(by);
                for &s in state.active_seats() {
                    self.matched[s] = false;
                }
                self.matched[seat] = true;
                self.last_raiser = Some(seat);
            }
        }
        self.end_turn(state, seat);
        TurnOutcome::Applied(validated)
    }

    /// Counts an input that could not be parsed as an action.
    pub fn reject_input(&mut self, state: &mut TableState, seat: usize, raw: &str) -> TurnOutcome {
        self.reject(state, seat, ActionError::Unrecognised(raw.to_string()))
    }

    fn reject(&mut self, state: &mut TableState, seat: usize, err: ActionError) -> TurnOutcome {
        self.invalid_attempts += 1;
        match self.max_invalid_actions {
            Some(max) if self.invalid_attempts >= max => {
                self.force_fold(state, seat, ForcedFoldReason::TooManyInvalidActions)
            }
            _ => TurnOutcome::Rejected(err),
        }
    }

    pub fn force_fold(
        &mut self,
        state: &mut TableState,
        seat: usize,
        reason: ForcedFoldReason,
    ) -> TurnOutcome {
        self.fold_seat(state, seat);
        TurnOutcome::ForcedFold(reason)
    }

    /// Folds `seat`, which need not be the awaited one.
    pub fn fold_seat(&mut self, state: &mut TableState, seat: usize) {
        state.fold(seat);
        if self.awaiting == Some(seat) {
            self.end_turn(state, seat);
        }
    }

    fn end_turn(&mut self, state: &mut TableState, seat: usize) {
        state.player_mut(seat).set_action_pending(false);
        self.awaiting = None;
        self.invalid_attempts = 0;
        self.cursor += 1;
    }

    /// Resolves the whole street against a blocking action source.
    pub fn run(
        &mut self,
        state: &mut TableState,
        source: &mut dyn ActionSource,
    ) -> Result<(), GameError> {
        while let Some(seat) = self.poll(state) {
            let request = self.request(state, seat);
            let outcome = match source.get_action(&request) {
                Ok(action) => self.submit(state, seat, action),
                Err(SourceError::Invalid(raw)) => self.reject_input(state, seat, &raw),
                Err(SourceError::TimedOut) => {
                    self.force_fold(state, seat, ForcedFoldReason::Timeout)
                }
                Err(SourceError::Cancelled(reason)) => {
                    state.player_mut(seat).set_action_pending(false);
                    return Err(GameError::ActionCancelled {
                        street: self.street,
                        reason,
                    });
                }
            };
            tracing::debug!(
                street = %self.street,
                player = %request.player,
                outcome = ?outcome,
                pot = state.pot(),
                "betting turn"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Player;
    use std::collections::VecDeque;

    fn table(n: usize) -> TableState {
        let players = (0..n).map(|i| Player::new(format!("P{}", i), 1000)).collect();
        TableState::new(players).unwrap()
    }

    fn scripted(
        actions: &[&str],
    ) -> impl FnMut(&ActionRequest) -> Result<PlayerAction, SourceError> {
        let mut queue: VecDeque<String> = actions.iter().map(|s| s.to_string()).collect();
        move |_req: &ActionRequest| {
            let raw = queue.pop_front().ok_or(SourceError::Cancelled("script empty".into()))?;
            raw.parse().map_err(|_| SourceError::Invalid(raw))
        }
    }

    #[test]
    fn preflop_starts_two_after_small_blind() {
        let t = table(4);
        assert_eq!(BettingRound::new(Street::Preflop, &t, 0, None).order(), &[2, 3, 0, 1]);
        assert_eq!(BettingRound::new(Street::Preflop, &t, 3, None).order(), &[1, 2, 3, 0]);
    }

    #[test]
    fn later_streets_start_at_first_unfolded_seat() {
        let mut t = table(4);
        t.fold(0);
        assert_eq!(BettingRound::new(Street::Flop, &t, 2, None).order(), &[1, 2, 3]);
    }

    #[test]
    fn everyone_checks_closes_the_street() {
        let mut t = table(3);
        let mut round = BettingRound::new(Street::Flop, &t, 0, None);
        round.run(&mut t, &mut scripted(&["check", "check", "check"])).unwrap();
        assert!(round.is_complete());
        assert_eq!(t.pot(), 0);
    }

    #[test]
    fn raise_reopens_action_for_everyone_else() {
        let mut t = table(3);
        let mut round = BettingRound::new(Street::Flop, &t, 0, None);
        let seat = round.poll(&mut t).unwrap();
        assert_eq!(
            round.submit(&mut t, seat, PlayerAction::Check),
            TurnOutcome::Applied(ValidatedAction::Check)
        );
        let seat = round.poll(&mut t).unwrap();
        round.submit(&mut t, seat, PlayerAction::Raise(50));
        assert_eq!(t.current_bet(), 50);
        assert!(round.is_matched(1));
        assert!(!round.is_matched(0));
        assert!(!round.is_matched(2));
        assert_eq!(round.last_raiser(), Some(1));
    }

    #[test]
    fn raiser_is_not_asked_again_once_called() {
        let mut t = table(3);
        let mut round = BettingRound::new(Street::Flop, &t, 0, None);
        // P0 checks, P1 raises, P2 calls, P0 calls: P1 is never asked again
        round
            .run(&mut t, &mut scripted(&["check", "raise 40", "call", "call"]))
            .unwrap();
        assert_eq!(t.pot(), 120);
        assert!(round.is_complete());
    }

    #[test]
    fn illegal_check_reprompts_without_changing_state() {
        let mut t = table(2);
        t.commit(1, 20).unwrap();
        t.set_current_bet(20);
        let mut round = BettingRound::new(Street::Flop, &t, 0, None);
        let seat = round.poll(&mut t).unwrap();
        assert_eq!(seat, 0);
        let outcome = round.submit(&mut t, seat, PlayerAction::Check);
        assert_eq!(outcome, TurnOutcome::Rejected(ActionError::CannotCheck { owed: 20 }));
        assert_eq!(round.poll(&mut t), Some(0));
        assert_eq!(round.invalid_attempts(), 1);
        assert_eq!(t.pot(), 20);
        assert_eq!(t.player(0).balance(), 1000);
        assert!(t.player(0).is_action_pending());
    }

    #[test]
    fn fold_down_to_one_ends_immediately() {
        let mut t = table(3);
        let mut round = BettingRound::new(Street::Turn, &t, 0, None);
        round.run(&mut t, &mut scripted(&["raise 10", "fold", "fold"])).unwrap();
        assert_eq!(t.active_seats(), &[0]);
        assert!(round.is_complete());
    }

    #[test]
    fn bounded_retries_force_a_fold() {
        let mut t = table(2);
        let mut round = BettingRound::new(Street::Flop, &t, 0, Some(2));
        let mut source = scripted(&["dance", "sing"]);
        round.run(&mut t, &mut source).unwrap();
        assert!(t.player(0).is_folded());
        assert_eq!(t.active_seats(), &[1]);
    }

    #[test]
    fn timeout_folds_and_cancel_aborts() {
        let mut t = table(3);
        let mut round = BettingRound::new(Street::Flop, &t, 0, None);
        let mut calls = 0;
        let mut source = |_req: &ActionRequest| -> Result<PlayerAction, SourceError> {
            calls += 1;
            match calls {
                1 => Err(SourceError::TimedOut),
                _ => Err(SourceError::Cancelled("table closed".into())),
            }
        };
        let err = round.run(&mut t, &mut source).unwrap_err();
        assert!(t.player(0).is_folded());
        assert_eq!(
            err,
            GameError::ActionCancelled {
                street: Street::Flop,
                reason: "table closed".into()
            }
        );
        assert!(!t.player(1).is_action_pending());
    }
}
