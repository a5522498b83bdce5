//! The round orchestrator: blinds, dealing, the four betting streets, showdown and reset.
//!
//! A [`Round`] owns all table state. It can be driven two ways:
//!
//! - [`Round::play_round`] runs one hand to completion against a blocking [`ActionSource`];
//! - an owner that receives actions asynchronously calls [`Round::start_hand`], reads
//!   [`Round::current_request`] and feeds [`Round::act_seat`], [`Round::place_bet`] or
//!   [`Round::fold_player`] as actions arrive.
//!
//! Both paths go through the same [`BettingRound`] state machine and queue the same
//! [`RoundEvent`]s, which callers collect with [`Round::drain_events`].

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::betting::{ActionRequest, ActionSource, BettingRound, SourceError, TurnOutcome};
use crate::cards::Card;
use crate::deck::Deck;
use crate::equity::{EquityEstimator, MonteCarloEquity};
use crate::errors::GameError;
use crate::events::{dispatch, ForcedFoldReason, RoundEvent, RoundObserver};
use crate::hand::{BestHandEvaluator, HandEvaluator, HandStrength, StrongestHandRanking, WinnerRanking};
use crate::logger::{RoundLog, Street, StreetRecord};
use crate::player::{Player, PlayerAction};
use crate::rules::{action_for_amount, validate_action, ValidatedAction};
use crate::snapshot::{pad_board, round_percent, CardView, PlayerView, TableSnapshot};
use crate::state::TableState;

/// Invalid actions tolerated on one turn before the player is folded.
pub const DEFAULT_MAX_INVALID_ACTIONS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    pub small_blind: u32,
    pub big_blind: u32,
    /// Seed for every deck the table will use; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// `None` keeps asking forever
    #[serde(default)]
    pub max_invalid_actions: Option<u32>,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            small_blind: 10,
            big_blind: 20,
            seed: None,
            max_invalid_actions: Some(DEFAULT_MAX_INVALID_ACTIONS),
        }
    }
}

impl RoundConfig {
    pub fn new(small_blind: u32, big_blind: u32) -> Self {
        Self {
            small_blind,
            big_blind,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.small_blind == 0 || self.small_blind > self.big_blind {
            return Err(GameError::InvalidBlinds {
                small: self.small_blind,
                big: self.big_blind,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "street", rename_all = "snake_case")]
pub enum Phase {
    /// No hand in progress
    Waiting,
    Betting(Street),
}

/// How a hand ended and who was paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandSummary {
    pub hand: u32,
    pub last_street: Street,
    pub pot: u32,
    pub winners: Vec<String>,
    /// Chips paid to each winner
    pub share: u32,
    /// Floor-split remainder nobody received
    pub undistributed: u32,
    /// Everyone else folded
    pub uncontested: bool,
    pub showdown: Vec<(String, HandStrength)>,
}

/// Integer split of `pot` among `winners`: `(share, remainder)`.
pub fn split_pot(pot: u32, winners: usize) -> (u32, u32) {
    let Ok(n) = u32::try_from(winners) else {
        return (0, pot);
    };
    if n == 0 {
        return (0, pot);
    }
    let share = pot / n;
    (share, pot - share * n)
}

pub struct Round {
    config: RoundConfig,
    state: TableState,
    deck: Deck,
    seeder: ChaCha20Rng,
    small_blind_index: usize,
    hand_no: u32,
    phase: Phase,
    betting: Option<BettingRound>,
    log: RoundLog,
    events: Vec<RoundEvent>,
    history: Vec<HandSummary>,
    /// Balance after each completed hand, by seat
    pnl: Vec<Vec<u32>>,
    evaluator: Box<dyn HandEvaluator>,
    ranking: Box<dyn WinnerRanking>,
    equity: Box<dyn EquityEstimator>,
}

impl std::fmt::Debug for Round {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Round")
            .field("config", &self.config)
            .field("hand_no", &self.hand_no)
            .field("phase", &self.phase)
            .field("small_blind_index", &self.small_blind_index)
            .field("pot", &self.state.pot())
            .finish()
    }
}

impl Round {
    pub fn new(players: Vec<Player>, config: RoundConfig) -> Result<Self, GameError> {
        config.validate()?;
        let state = TableState::new(players)?;
        let mut seeder = ChaCha20Rng::seed_from_u64(config.seed.unwrap_or_else(rand::random));
        let deck = Deck::shuffled(seeder.next_u64());
        let seats = state.seat_count();
        Ok(Self {
            config,
            state,
            deck,
            seeder,
            small_blind_index: 0,
            hand_no: 0,
            phase: Phase::Waiting,
            betting: None,
            log: RoundLog::new(),
            events: Vec::new(),
            history: Vec::new(),
            pnl: vec![Vec::new(); seats],
            evaluator: Box::new(BestHandEvaluator),
            ranking: Box::new(StrongestHandRanking),
            equity: Box::new(MonteCarloEquity::default()),
        })
    }

    /// Seats every name with the same starting balance.
    pub fn with_players<I, S>(
        names: I,
        starting_balance: u32,
        config: RoundConfig,
    ) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let players = names
            .into_iter()
            .map(|name| Player::new(name, starting_balance))
            .collect();
        Self::new(players, config)
    }

    pub fn with_evaluator(mut self, evaluator: impl HandEvaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    pub fn with_ranking(mut self, ranking: impl WinnerRanking + 'static) -> Self {
        self.ranking = Box::new(ranking);
        self
    }

    pub fn with_equity(mut self, equity: impl EquityEstimator + 'static) -> Self {
        self.equity = Box::new(equity);
        self
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }
    pub fn state(&self) -> &TableState {
        &self.state
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn betting(&self) -> Option<&BettingRound> {
        self.betting.as_ref()
    }
    pub fn small_blind_index(&self) -> usize {
        self.small_blind_index
    }
    pub fn hand_number(&self) -> u32 {
        self.hand_no
    }
    pub fn log(&self) -> &RoundLog {
        &self.log
    }
    pub fn history(&self) -> &[HandSummary] {
        &self.history
    }
    pub fn is_hand_in_progress(&self) -> bool {
        self.phase != Phase::Waiting
    }

    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    /// Changes the blinds for the next hand.
    pub fn set_blinds(&mut self, small_blind: u32, big_blind: u32) -> Result<(), GameError> {
        if self.is_hand_in_progress() {
            return Err(GameError::HandInProgress);
        }
        let config = RoundConfig {
            small_blind,
            big_blind,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Replaces the deck the next hand will be dealt from.
    pub fn replace_deck(&mut self, deck: Deck) -> Result<(), GameError> {
        if self.is_hand_in_progress() {
            return Err(GameError::HandInProgress);
        }
        self.deck = deck;
        Ok(())
    }

    /// Posts the blinds, deals hole cards and opens pre-flop betting.
    ///
    /// # Errors
    ///
    /// [`GameError::InsufficientBlind`] when a blind cannot be covered; nothing is changed.
    pub fn start_hand(&mut self) -> Result<(), GameError> {
        if self.is_hand_in_progress() {
            return Err(GameError::HandInProgress);
        }
        let seats = self.state.seat_count();
        let sb_seat = self.small_blind_index;
        let bb_seat = (sb_seat + 1) % seats;
        self.check_blind(sb_seat, self.config.small_blind, "small blind")?;
        self.check_blind(bb_seat, self.config.big_blind, "big blind")?;

        self.hand_no += 1;
        tracing::info!(
            hand = self.hand_no,
            small_blind = %self.state.player(sb_seat).name(),
            big_blind = %self.state.player(bb_seat).name(),
            "starting hand"
        );
        self.events.push(RoundEvent::HandStarted {
            hand: self.hand_no,
            small_blind_player: self.state.player(sb_seat).name().to_string(),
            big_blind_player: self.state.player(bb_seat).name().to_string(),
        });
        self.post_blind(sb_seat, self.config.small_blind, "small blind")?;
        self.post_blind(bb_seat, self.config.big_blind, "big blind")?;
        self.state.set_current_bet(self.config.big_blind);

        let dealt = self
            .deal_private_cards()
            .and_then(|_| self.begin_street(Street::Preflop));
        if let Err(err) = dealt {
            self.abandon_hand();
            return Err(err);
        }
        self.advance()
    }

    fn check_blind(&self, seat: usize, amount: u32, blind: &'static str) -> Result<(), GameError> {
        let player = self.state.player(seat);
        if player.balance() < amount {
            return Err(GameError::InsufficientBlind {
                player: player.name().to_string(),
                blind,
                amount,
                balance: player.balance(),
            });
        }
        Ok(())
    }

    fn post_blind(&mut self, seat: usize, amount: u32, blind: &'static str) -> Result<(), GameError> {
        let balance = self.state.player(seat).balance();
        self.state
            .commit(seat, amount)
            .map_err(|_| GameError::InsufficientBlind {
                player: self.state.player(seat).name().to_string(),
                blind,
                amount,
                balance,
            })?;
        self.events.push(RoundEvent::BlindPosted {
            player: self.state.player(seat).name().to_string(),
            amount,
        });
        Ok(())
    }

    fn deal_private_cards(&mut self) -> Result<(), GameError> {
        for _ in 0..2 {
            for seat in 0..self.state.seat_count() {
                let card = self.deck.deal_card()?;
                self.state.deal_hole(seat, card)?;
            }
        }
        for p in self.state.players() {
            self.events.push(RoundEvent::HoleCardsDealt {
                player: p.name().to_string(),
                cards: p.hole_cards().to_vec(),
            });
        }
        Ok(())
    }

    fn begin_street(&mut self, street: Street) -> Result<(), GameError> {
        if street != Street::Preflop {
            self.state.start_street();
            let mut cards = Vec::with_capacity(street.cards_dealt());
            for _ in 0..street.cards_dealt() {
                let card = self.deck.deal_card()?;
                self.state.deal_community(card);
                cards.push(card);
            }
            self.events.push(RoundEvent::CommunityDealt { street, cards });
        }
        self.refresh_probabilities();
        tracing::info!(hand = self.hand_no, street = %street, pot = self.state.pot(), "street started");
        self.events.push(RoundEvent::StreetStarted { street });
        self.betting = Some(BettingRound::new(
            street,
            &self.state,
            self.small_blind_index,
            self.config.max_invalid_actions,
        ));
        self.phase = Phase::Betting(street);
        Ok(())
    }

    fn refresh_probabilities(&mut self) {
        let (seats, holes): (Vec<usize>, Vec<[Card; 2]>) = self
            .state
            .active_seats()
            .iter()
            .filter_map(|&seat| self.state.player(seat).hole_pair().map(|h| (seat, h)))
            .unzip();
        let probs = self.equity.estimate(self.state.community(), &holes);
        for (seat, p) in seats.into_iter().zip(probs) {
            self.state.player_mut(seat).set_win_prob(p * 100.0);
        }
    }

    /// Polls the betting round; finished streets roll into the next street or end the hand.
    fn advance(&mut self) -> Result<(), GameError> {
        loop {
            let Some(betting) = self.betting.as_mut() else {
                return Ok(());
            };
            if betting.poll(&mut self.state).is_some() {
                return Ok(());
            }
            let street = betting.street();
            self.finish_street(street)?;
        }
    }

    fn finish_street(&mut self, street: Street) -> Result<(), GameError> {
        self.betting = None;
        self.log_street(street);
        self.events.push(RoundEvent::StreetCompleted {
            street,
            pot: self.state.pot(),
        });

        if self.state.active_count() == 1 {
            self.award_uncontested(street);
            self.complete_hand();
            return Ok(());
        }
        match street.next() {
            Some(next) => {
                if let Err(err) = self.begin_street(next) {
                    self.abandon_hand();
                    return Err(err);
                }
            }
            None => {
                self.showdown();
                self.complete_hand();
            }
        }
        Ok(())
    }

    fn log_street(&mut self, street: Street) {
        let players = self.state.players();
        let record = StreetRecord {
            hand: self.hand_no,
            round: street,
            pot: self.state.pot(),
            community_cards: self.state.community().iter().map(Card::to_string).collect(),
            player_bets: players
                .iter()
                .enumerate()
                .map(|(seat, p)| (p.name().to_string(), self.state.street_bet(seat)))
                .collect(),
            player_balances: players
                .iter()
                .map(|p| (p.name().to_string(), p.balance()))
                .collect(),
            ts: Some(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
        };
        self.log.append(record);
    }

    fn award_uncontested(&mut self, street: Street) {
        let seat = self.state.active_seats()[0];
        let pot = self.state.pot();
        self.state.award(seat, pot);
        let name = self.state.player(seat).name().to_string();
        tracing::info!(hand = self.hand_no, winner = %name, pot, "everyone else folded");
        self.events.push(RoundEvent::PotAwarded {
            winners: vec![name.clone()],
            share: pot,
            undistributed: 0,
            uncontested: true,
        });
        self.history.push(HandSummary {
            hand: self.hand_no,
            last_street: street,
            pot,
            winners: vec![name],
            share: pot,
            undistributed: 0,
            uncontested: true,
            showdown: Vec::new(),
        });
    }

    fn showdown(&mut self) {
        let pot = self.state.pot();
        let community = self.state.community();
        let hands: Vec<(String, HandStrength)> = self
            .state
            .active_seats()
            .iter()
            .map(|&seat| {
                let p = self.state.player(seat);
                (
                    p.name().to_string(),
                    self.evaluator.best_hand(p.hole_cards(), community),
                )
            })
            .collect();

        let mut winner_seats: Vec<usize> = self
            .ranking
            .winners(&hands)
            .iter()
            .filter_map(|name| self.state.seat_of(name).ok())
            .filter(|&seat| self.state.is_active(seat))
            .collect();
        winner_seats.sort_unstable();
        winner_seats.dedup();

        let (share, undistributed) = split_pot(pot, winner_seats.len());
        for &seat in &winner_seats {
            self.state.award(seat, share);
        }
        let winners: Vec<String> = winner_seats
            .iter()
            .map(|&seat| self.state.player(seat).name().to_string())
            .collect();
        if undistributed > 0 {
            tracing::warn!(
                hand = self.hand_no,
                undistributed,
                winners = winners.len(),
                "split pot leaves chips undistributed"
            );
        }
        tracing::info!(hand = self.hand_no, winners = ?winners, pot, share, "showdown");
        self.events.push(RoundEvent::PotAwarded {
            winners: winners.clone(),
            share,
            undistributed,
            uncontested: false,
        });
        self.history.push(HandSummary {
            hand: self.hand_no,
            last_street: Street::River,
            pot,
            winners,
            share,
            undistributed,
            uncontested: false,
            showdown: hands,
        });
    }

    fn complete_hand(&mut self) {
        for (seat, p) in self.state.players().iter().enumerate() {
            self.pnl[seat].push(p.balance());
        }
        self.clear_table();
    }

    /// Gives every contribution back and clears the table without recording a result.
    fn abandon_hand(&mut self) {
        if self.is_hand_in_progress() || self.state.pot() > 0 {
            tracing::warn!(hand = self.hand_no, pot = self.state.pot(), "abandoning hand");
            self.state.refund_contributions();
        }
        self.clear_table();
    }

    fn clear_table(&mut self) {
        self.state.clear_for_next_round();
        self.deck = Deck::shuffled(self.seeder.next_u64());
        self.small_blind_index = (self.small_blind_index + 1) % self.state.seat_count();
        self.betting = None;
        self.phase = Phase::Waiting;
        self.events.push(RoundEvent::HandReset {
            next_small_blind_index: self.small_blind_index,
        });
    }

    /// Resets the table: a hand in progress is abandoned with every contribution refunded,
    /// hole cards and board are cleared and the blinds move one seat.
    pub fn reset(&mut self) {
        self.abandon_hand();
    }

    /// The request for the player whose action is awaited.
    pub fn current_request(&self) -> Option<ActionRequest> {
        let betting = self.betting.as_ref()?;
        let seat = betting.awaiting()?;
        Some(betting.request(&self.state, seat))
    }

    fn expect_turn(&self, seat: usize) -> Result<(), GameError> {
        let betting = self.betting.as_ref().ok_or(GameError::RoundResolved)?;
        let player = self.state.player(seat);
        if player.is_folded() {
            return Err(GameError::PlayerAlreadyFolded(player.name().to_string()));
        }
        match betting.awaiting() {
            Some(awaited) if awaited == seat => Ok(()),
            Some(awaited) => Err(GameError::NotPlayersTurn {
                expected: self.state.player(awaited).name().to_string(),
                actual: player.name().to_string(),
            }),
            None => Err(GameError::RoundResolved),
        }
    }

    fn take_turn<F>(&mut self, seat: usize, turn: F) -> Result<TurnOutcome, GameError>
    where
        F: FnOnce(&mut BettingRound, &mut TableState) -> TurnOutcome,
    {
        if seat >= self.state.seat_count() {
            return Err(GameError::PlayerNotFound(format!("seat {}", seat)));
        }
        self.expect_turn(seat)?;
        let betting = self.betting.as_mut().ok_or(GameError::RoundResolved)?;
        let outcome = turn(betting, &mut self.state);
        self.record_outcome(seat, &outcome);
        self.advance()?;
        Ok(outcome)
    }

    fn record_outcome(&mut self, seat: usize, outcome: &TurnOutcome) {
        let player = self.state.player(seat).name().to_string();
        tracing::debug!(hand = self.hand_no, player = %player, outcome = ?outcome, "turn");
        let event = match outcome {
            TurnOutcome::Applied(action) => RoundEvent::ActionApplied {
                player,
                action: *action,
                pot: self.state.pot(),
                current_bet: self.state.current_bet(),
            },
            TurnOutcome::Rejected(err) => {
                let attempts = self.betting.as_ref().map_or(0, BettingRound::invalid_attempts);
                RoundEvent::rejected(&player, err, attempts)
            }
            TurnOutcome::ForcedFold(reason) => RoundEvent::ForcedFold {
                player,
                reason: *reason,
            },
        };
        self.events.push(event);
    }

    /// Hands `action` to the betting round for the awaited seat.
    pub fn act_seat(&mut self, seat: usize, action: PlayerAction) -> Result<TurnOutcome, GameError> {
        self.take_turn(seat, |betting, state| betting.submit(state, seat, action))
    }

    pub fn act(&mut self, name: &str, action: PlayerAction) -> Result<TurnOutcome, GameError> {
        let seat = self.state.seat_of(name)?;
        self.act_seat(seat, action)
    }

    /// Counts unparseable input against the awaited seat.
    pub fn reject_input(&mut self, seat: usize, raw: &str) -> Result<TurnOutcome, GameError> {
        self.take_turn(seat, |betting, state| betting.reject_input(state, seat, raw))
    }

    /// Folds the awaited seat because its action source ran out of time.
    pub fn time_out(&mut self, seat: usize) -> Result<TurnOutcome, GameError> {
        self.take_turn(seat, |betting, state| {
            betting.force_fold(state, seat, ForcedFoldReason::Timeout)
        })
    }

    /// Puts `amount` chips in for `name`, who must be the player to act. Exactly the owed
    /// amount checks or calls, more raises by the difference.
    ///
    /// # Errors
    ///
    /// - [`GameError::PlayerNotFound`] for an unseated name
    /// - [`GameError::InvalidAmount`] when the amount is short of what is owed or exceeds the
    ///   balance
    /// - [`GameError::RoundResolved`] when no betting is in progress
    /// - [`GameError::NotPlayersTurn`] when someone else is to act
    pub fn place_bet(&mut self, name: &str, amount: u32) -> Result<ValidatedAction, GameError> {
        let seat = self.state.seat_of(name)?;
        self.expect_turn(seat)?;
        let owed = self.state.owed(seat);
        let action = action_for_amount(owed, amount).ok_or_else(|| GameError::InvalidAmount {
            amount,
            reason: format!("{} is owed", owed),
        })?;
        let validated = validate_action(self.state.player(seat).balance(), owed, action)
            .map_err(|err| GameError::InvalidAmount {
                amount,
                reason: err.to_string(),
            })?;
        match self.act_seat(seat, action)? {
            TurnOutcome::Applied(applied) => Ok(applied),
            _ => Err(GameError::InvalidAmount {
                amount,
                reason: format!("{:?} was not applied", validated),
            }),
        }
    }

    /// Folds `name` whether or not it is their turn.
    pub fn fold_player(&mut self, name: &str) -> Result<(), GameError> {
        let seat = self.state.seat_of(name)?;
        if self.betting.is_none() {
            return Err(GameError::RoundResolved);
        }
        if self.state.player(seat).is_folded() {
            return Err(GameError::PlayerAlreadyFolded(name.to_string()));
        }
        if let Some(betting) = self.betting.as_mut() {
            betting.fold_seat(&mut self.state, seat);
        }
        self.record_outcome(seat, &TurnOutcome::Applied(ValidatedAction::Fold));
        self.advance()
    }

    /// Plays one full hand against a blocking action source, forwarding events to `observer`.
    ///
    /// A cancelled source abandons the hand (contributions refunded) and returns
    /// [`GameError::ActionCancelled`].
    pub fn play_round(
        &mut self,
        source: &mut dyn ActionSource,
        observer: &mut dyn RoundObserver,
    ) -> Result<HandSummary, GameError> {
        let started = self.start_hand();
        dispatch(observer, &self.drain_events());
        started?;

        while let Some(request) = self.current_request() {
            let seat = request.seat;
            let step = match source.get_action(&request) {
                Ok(action) => self.act_seat(seat, action),
                Err(SourceError::Invalid(raw)) => self.reject_input(seat, &raw),
                Err(SourceError::TimedOut) => self.time_out(seat),
                Err(SourceError::Cancelled(reason)) => {
                    self.abandon_hand();
                    Err(GameError::ActionCancelled {
                        street: request.street,
                        reason,
                    })
                }
            };
            dispatch(observer, &self.drain_events());
            step?;
        }
        self.history.last().cloned().ok_or(GameError::RoundResolved)
    }

    pub fn snapshot(&self) -> TableSnapshot {
        let players = self
            .state
            .players()
            .iter()
            .enumerate()
            .map(|(seat, p)| PlayerView {
                name: p.name().to_string(),
                balance: p.balance(),
                hand: p.hole_cards().iter().map(CardView::from).collect(),
                bet: self.state.street_bet(seat),
                prob_win: round_percent(p.win_prob()),
                folded: p.is_folded(),
                action_pending: p.is_action_pending(),
                pnl: self.pnl[seat].clone(),
            })
            .collect();
        TableSnapshot {
            hand: self.hand_no,
            phase: self.phase,
            players,
            community_cards: pad_board(self.state.community()),
            dealer_index: self.small_blind_index,
            pot: self.state.pot(),
            current_bet: self.state.current_bet(),
        }
    }
}
