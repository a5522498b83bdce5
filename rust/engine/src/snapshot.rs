use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::round::Phase;

/// A card as shown to callers. The board is padded with face-down placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "face", rename_all = "snake_case")]
pub enum CardView {
    Up { code: String, display: String },
    Down,
}

impl From<&Card> for CardView {
    fn from(card: &Card) -> Self {
        CardView::Up {
            code: card.abbreviation(),
            display: card.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub name: String,
    pub balance: u32,
    pub hand: Vec<CardView>,
    /// Chips put in during the current street
    pub bet: u32,
    /// Advisory win probability in percent, two decimals
    pub prob_win: f64,
    pub folded: bool,
    pub action_pending: bool,
    /// Balance after each completed hand
    pub pnl: Vec<u32>,
}

/// Read-only picture of the table for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub hand: u32,
    pub phase: Phase,
    pub players: Vec<PlayerView>,
    /// Always five entries
    pub community_cards: Vec<CardView>,
    /// Seat of the small blind, which doubles as the dealer marker
    pub dealer_index: usize,
    pub pot: u32,
    pub current_bet: u32,
}

pub(crate) fn pad_board(community: &[Card]) -> Vec<CardView> {
    let mut cards: Vec<CardView> = community.iter().map(CardView::from).collect();
    cards.resize(5.max(cards.len()), CardView::Down);
    cards
}

pub(crate) fn round_percent(p: f64) -> f64 {
    (p * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    #[test]
    fn board_is_padded_to_five() {
        let board = pad_board(&[Card::new(Rank::Ace, Suit::Hearts)]);
        assert_eq!(board.len(), 5);
        assert_eq!(
            board[0],
            CardView::Up {
                code: "Ah".into(),
                display: "A♥".into()
            }
        );
        assert!(board[1..].iter().all(|c| *c == CardView::Down));
        assert_eq!(pad_board(&[]).len(), 5);
    }

    #[test]
    fn face_down_serializes_with_tag() {
        let json = serde_json::to_string(&CardView::Down).unwrap();
        assert_eq!(json, r#"{"face":"down"}"#);
    }

    #[test]
    fn percent_rounding() {
        assert_eq!(round_percent(33.33333), 33.33);
    }
}
