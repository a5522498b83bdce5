use std::collections::{BTreeSet, HashSet};

use crate::cards::Card;
use crate::errors::{ActionError, GameError};
use crate::player::Player;

/// Most players a table seats.
pub const MAX_PLAYERS: usize = 10;

/// Mutable state of the table during a hand: seats, board, pot and bets.
///
/// Every chip movement goes through [`TableState::commit`] or [`TableState::award`], which keep
/// the balance debit, the street bet, the hand contribution and the pot in step.
#[derive(Debug, Clone)]
pub struct TableState {
    players: Vec<Player>,
    community: Vec<Card>,
    pot: u32,
    current_bet: u32,
    /// Chips put in this street, indexed by seat
    bets: Vec<u32>,
    /// Chips put in this hand, indexed by seat
    contributed: Vec<u32>,
    /// Seats still eligible to act, in seating order
    active: Vec<usize>,
    folded: BTreeSet<usize>,
}

impl TableState {
    pub fn new(players: Vec<Player>) -> Result<Self, GameError> {
        if players.len() < 2 {
            return Err(GameError::NotEnoughPlayers(players.len()));
        }
        if players.len() > MAX_PLAYERS {
            return Err(GameError::TooManyPlayers {
                count: players.len(),
                max: MAX_PLAYERS,
            });
        }
        let mut names = HashSet::new();
        for p in &players {
            if !names.insert(p.name()) {
                return Err(GameError::DuplicatePlayer(p.name().to_string()));
            }
        }
        let n = players.len();
        Ok(Self {
            players,
            community: Vec::with_capacity(5),
            pot: 0,
            current_bet: 0,
            bets: vec![0; n],
            contributed: vec![0; n],
            active: (0..n).collect(),
            folded: BTreeSet::new(),
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }
    pub fn player(&self, seat: usize) -> &Player {
        &self.players[seat]
    }
    pub fn seat_count(&self) -> usize {
        self.players.len()
    }
    pub fn community(&self) -> &[Card] {
        &self.community
    }
    pub fn pot(&self) -> u32 {
        self.pot
    }
    pub fn current_bet(&self) -> u32 {
        self.current_bet
    }
    pub fn street_bet(&self, seat: usize) -> u32 {
        self.bets[seat]
    }
    pub fn contributed(&self, seat: usize) -> u32 {
        self.contributed[seat]
    }
    pub fn total_contributed(&self) -> u32 {
        self.contributed.iter().sum()
    }
    pub fn active_seats(&self) -> &[usize] {
        &self.active
    }
    pub fn folded_seats(&self) -> &BTreeSet<usize> {
        &self.folded
    }
    pub fn is_active(&self, seat: usize) -> bool {
        self.active.contains(&seat)
    }
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
    pub fn total_chips(&self) -> u32 {
        self.players.iter().map(Player::balance).sum::<u32>() + self.pot
    }

    /// Chips `seat` still has to put in to match the current bet.
    pub fn owed(&self, seat: usize) -> u32 {
        self.current_bet.saturating_sub(self.bets[seat])
    }

    pub fn seat_of(&self, name: &str) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.name() == name)
            .ok_or_else(|| GameError::PlayerNotFound(name.to_string()))
    }

    /// Moves `amount` from the seat's balance into the pot. Nothing changes on error.
    pub(crate) fn commit(&mut self, seat: usize, amount: u32) -> Result<(), ActionError> {
        self.players[seat].debit(amount)?;
        self.bets[seat] += amount;
        self.contributed[seat] += amount;
        self.pot += amount;
        Ok(())
    }

    pub(crate) fn raise_current_bet(&mut self, by: u32) {
        self.current_bet += by;
    }

    /// Sets the bet to match without committing chips; used when the big blind is posted.
    pub(crate) fn set_current_bet(&mut self, bet: u32) {
        self.current_bet = self.current_bet.max(bet);
    }

    pub(crate) fn fold(&mut self, seat: usize) {
        self.active.retain(|&s| s != seat);
        self.folded.insert(seat);
        self.players[seat].set_folded();
    }

    pub(crate) fn deal_hole(&mut self, seat: usize, card: Card) -> Result<(), GameError> {
        self.players[seat].give_card(card)
    }

    pub(crate) fn deal_community(&mut self, card: Card) {
        self.community.push(card);
    }

    pub(crate) fn player_mut(&mut self, seat: usize) -> &mut Player {
        &mut self.players[seat]
    }

    pub(crate) fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    /// A new street: nothing bet yet and nothing owed.
    pub(crate) fn start_street(&mut self) {
        self.current_bet = 0;
        self.bets.iter_mut().for_each(|b| *b = 0);
    }

    /// Pays `amount` out of the pot to `seat`.
    pub(crate) fn award(&mut self, seat: usize, amount: u32) {
        let amount = amount.min(self.pot);
        self.pot -= amount;
        self.players[seat].add_chips(amount);
    }

    /// Returns every seat's hand contribution from the pot.
    pub(crate) fn refund_contributions(&mut self) {
        for seat in 0..self.players.len() {
            let amount = self.contributed[seat];
            self.award(seat, amount);
        }
    }

    /// Clears everything but balances; what is left in the pot is dropped.
    pub(crate) fn clear_for_next_round(&mut self) -> u32 {
        let dropped = self.pot;
        self.community.clear();
        self.pot = 0;
        self.current_bet = 0;
        self.bets.iter_mut().for_each(|b| *b = 0);
        self.contributed.iter_mut().for_each(|c| *c = 0);
        self.folded.clear();
        self.active = (0..self.players.len()).collect();
        self.players
            .iter_mut()
            .for_each(Player::clear_for_next_round);
        dropped
    }
}
