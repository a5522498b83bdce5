use crate::cards::Card;
use crate::errors::{ActionError, GameError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An action offered by an action source during a betting street.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    /// Fold and forfeit the hand
    Fold,
    /// Check (only valid when nothing is owed)
    Check,
    /// Pay exactly the amount owed
    Call,
    /// Pay the amount owed plus this many chips, raising the current bet by it
    Raise(u32),
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerAction::Fold => f.write_str("fold"),
            PlayerAction::Check => f.write_str("check"),
            PlayerAction::Call => f.write_str("call"),
            PlayerAction::Raise(amount) => write!(f, "raise {}", amount),
        }
    }
}

impl FromStr for PlayerAction {
    type Err = ActionError;

    /// Parses the textual form used by terminal input: `fold`, `check`, `call`, `raise <n>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_ascii_lowercase();
        let mut parts = input.split_whitespace();
        let action = match (parts.next(), parts.next(), parts.next()) {
            (Some("fold"), None, None) => PlayerAction::Fold,
            (Some("check"), None, None) => PlayerAction::Check,
            (Some("call"), None, None) => PlayerAction::Call,
            (Some("raise"), Some(amount), None) => amount
                .parse()
                .map(PlayerAction::Raise)
                .map_err(|_| ActionError::Unrecognised(s.trim().to_string()))?,
            _ => return Err(ActionError::Unrecognised(s.trim().to_string())),
        };
        Ok(action)
    }
}

/// A seated player. The balance is the only state that survives a round reset.
#[derive(Debug, Clone)]
pub struct Player {
    name: String,
    balance: u32,
    hole: Vec<Card>,
    folded: bool,
    /// Advisory win probability in percent (0-100)
    win_prob: f64,
    action_pending: bool,
}

impl Player {
    pub fn new(name: impl Into<String>, balance: u32) -> Self {
        Self {
            name: name.into(),
            balance,
            hole: Vec::with_capacity(2),
            folded: false,
            win_prob: 0.0,
            action_pending: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn balance(&self) -> u32 {
        self.balance
    }
    pub fn hole_cards(&self) -> &[Card] {
        &self.hole
    }
    pub fn is_folded(&self) -> bool {
        self.folded
    }
    pub fn win_prob(&self) -> f64 {
        self.win_prob
    }
    pub fn is_action_pending(&self) -> bool {
        self.action_pending
    }

    pub fn give_card(&mut self, c: Card) -> Result<(), GameError> {
        if self.hole.len() >= 2 {
            return Err(GameError::HoleCardsFull(self.name.clone()));
        }
        self.hole.push(c);
        Ok(())
    }

    /// Hole cards as a pair, once both have been dealt.
    pub fn hole_pair(&self) -> Option<[Card; 2]> {
        match self.hole.as_slice() {
            [a, b] => Some([*a, *b]),
            _ => None,
        }
    }

    pub(crate) fn clear_for_next_round(&mut self) {
        self.hole.clear();
        self.folded = false;
        self.win_prob = 0.0;
        self.action_pending = false;
    }

    pub(crate) fn set_folded(&mut self) {
        self.folded = true;
        self.win_prob = 0.0;
        self.action_pending = false;
    }

    pub(crate) fn set_win_prob(&mut self, percent: f64) {
        self.win_prob = percent.clamp(0.0, 100.0);
    }

    pub(crate) fn set_action_pending(&mut self, pending: bool) {
        self.action_pending = pending;
    }

    pub(crate) fn add_chips(&mut self, amount: u32) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Debits `amount`, refusing to take the balance below zero.
    pub(crate) fn debit(&mut self, amount: u32) -> Result<(), ActionError> {
        if amount > self.balance {
            return Err(ActionError::InsufficientChips {
                needed: amount,
                balance: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    #[test]
    fn parses_terminal_actions() {
        assert_eq!("fold".parse::<PlayerAction>(), Ok(PlayerAction::Fold));
        assert_eq!(" Check ".parse::<PlayerAction>(), Ok(PlayerAction::Check));
        assert_eq!("call".parse::<PlayerAction>(), Ok(PlayerAction::Call));
        assert_eq!("raise 40".parse::<PlayerAction>(), Ok(PlayerAction::Raise(40)));
        assert!("raise".parse::<PlayerAction>().is_err());
        assert!("raise -5".parse::<PlayerAction>().is_err());
        assert!("bet 10".parse::<PlayerAction>().is_err());
        assert!("call 10".parse::<PlayerAction>().is_err());
    }

    #[test]
    fn display_matches_parse_format() {
        let action = PlayerAction::Raise(25);
        assert_eq!(action.to_string().parse::<PlayerAction>(), Ok(action));
    }

    #[test]
    fn at_most_two_hole_cards() {
        let mut p = Player::new("Alice", 100);
        p.give_card(Card::new(Rank::Ace, Suit::Spades)).unwrap();
        assert!(p.hole_pair().is_none());
        p.give_card(Card::new(Rank::King, Suit::Spades)).unwrap();
        assert!(p.hole_pair().is_some());
        assert_eq!(
            p.give_card(Card::new(Rank::Two, Suit::Clubs)),
            Err(GameError::HoleCardsFull("Alice".into()))
        );
    }

    #[test]
    fn debit_never_goes_negative() {
        let mut p = Player::new("Bob", 50);
        assert!(p.debit(60).is_err());
        assert_eq!(p.balance(), 50);
        p.debit(50).unwrap();
        assert_eq!(p.balance(), 0);
    }

    #[test]
    fn fold_zeroes_win_probability() {
        let mut p = Player::new("Carol", 10);
        p.set_win_prob(140.0);
        assert_eq!(p.win_prob(), 100.0);
        p.set_folded();
        assert!(p.is_folded());
        assert_eq!(p.win_prob(), 0.0);
    }
}
