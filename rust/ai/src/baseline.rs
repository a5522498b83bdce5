//! Rule-based opponent built on hand strength and pot odds.

use crate::AIOpponent;
use rivertable_engine::betting::ActionRequest;
use rivertable_engine::cards::Card;
use rivertable_engine::hand::{Category, evaluate_hand};
use rivertable_engine::logger::Street;
use rivertable_engine::player::PlayerAction;

/// Raise size used when the table's big blind is unknown.
pub const DEFAULT_RAISE_UNIT: u32 = 20;

/// Deterministic baseline opponent.
///
/// **Pre-flop** the two hole cards are scored 0-10 (pairs, broadway cards, suited connectors).
/// **Post-flop** the best hand made with the board is scored by category.
///
/// Strong hands raise, medium hands call when the pot odds are acceptable, weak hands
/// check when it is free and fold otherwise. Every action it returns is affordable, so the
/// betting loop never has to re-prompt it.
#[derive(Debug, Clone)]
pub struct BaselineAI {
    raise_unit: u32,
}

impl BaselineAI {
    pub fn new() -> Self {
        Self {
            raise_unit: DEFAULT_RAISE_UNIT,
        }
    }

    /// Smallest raise this policy makes, usually the big blind.
    pub fn with_raise_unit(mut self, unit: u32) -> Self {
        self.raise_unit = unit.max(1);
        self
    }

    /// Pre-flop score of two hole cards, 0 (trash) to 10 (premium).
    fn preflop_strength(hole: [Card; 2]) -> u8 {
        let r1 = hole[0].rank.value();
        let r2 = hole[1].rank.value();
        let (high, low) = if r1 >= r2 { (r1, r2) } else { (r2, r1) };
        let suited = hole[0].suit == hole[1].suit;
        let pick = |s: u8, o: u8| if suited { s } else { o };

        if high == low {
            return match high {
                13..=14 => 10,
                11..=12 => 9,
                10 => 8,
                9 => 7,
                8 => 6,
                7 => 5,
                _ => 4,
            };
        }
        match (high, low) {
            (14, 13) => pick(10, 8),
            (14, 12) => pick(8, 7),
            (14, 11) => pick(7, 6),
            (14, 10) => pick(6, 5),
            (14, _) => pick(5, 4),
            (13, 12) => pick(7, 6),
            (13, 11) => pick(6, 5),
            (13, 10) => pick(5, 4),
            (12, 11) => pick(6, 5),
            (12, 10) => pick(5, 4),
            _ if suited && high - low <= 2 => {
                if high >= 9 {
                    5
                } else {
                    4
                }
            }
            _ if high >= 11 && low >= 9 => 4,
            _ => 2,
        }
    }

    /// Post-flop score from the best hand on the board; `None` before the flop.
    fn postflop_strength(hole: &[Card], board: &[Card]) -> Option<u8> {
        if board.len() < 3 {
            return None;
        }
        let cards: Vec<Card> = hole.iter().chain(board).copied().collect();
        let strength = evaluate_hand(&cards);
        let base = match strength.category {
            Category::HighCard => 1,
            Category::OnePair => 3,
            Category::TwoPair => 5,
            Category::ThreeOfAKind => 6,
            Category::Straight => 7,
            Category::Flush => 8,
            Category::FullHouse => 9,
            Category::FourOfAKind | Category::StraightFlush => 10,
        };
        let kicker_boost = u8::from(strength.kickers[0] >= 12);
        Some((base + kicker_boost).min(10))
    }

    /// Share of the final pot a call would buy: `pot / (pot + owed)`.
    fn pot_odds(pot: u32, owed: u32) -> f32 {
        if owed == 0 {
            return 1.0;
        }
        pot as f32 / (pot + owed) as f32
    }

    fn strength(request: &ActionRequest) -> u8 {
        let Some(hole) = hole_pair(&request.hole_cards) else {
            return 0;
        };
        if request.street == Street::Preflop {
            return Self::preflop_strength(hole);
        }
        Self::postflop_strength(&request.hole_cards, &request.community)
            .unwrap_or_else(|| Self::preflop_strength(hole))
    }

    /// Raise by `wanted` if the balance covers it, else fall back to `otherwise`.
    fn raise_or(request: &ActionRequest, wanted: u32, otherwise: PlayerAction) -> PlayerAction {
        let by = wanted.max(1);
        match request.owed.checked_add(by) {
            Some(total) if total <= request.balance => PlayerAction::Raise(by),
            _ => otherwise,
        }
    }

    fn decide_facing_bet(&self, strength: u8, request: &ActionRequest) -> PlayerAction {
        let owed = request.owed;
        let pot = request.pot;
        if owed > request.balance {
            return PlayerAction::Fold;
        }
        let odds = Self::pot_odds(pot, owed);
        match strength {
            9..=10 => {
                // no re-raise war once the bet is already large
                if owed <= pot {
                    Self::raise_or(request, (pot / 2).max(self.raise_unit), PlayerAction::Call)
                } else {
                    PlayerAction::Call
                }
            }
            7..=8 => PlayerAction::Call,
            5..=6 if odds >= 0.3 || owed <= pot / 4 => PlayerAction::Call,
            3..=4 if odds >= 0.4 || owed <= pot / 6 => PlayerAction::Call,
            _ => PlayerAction::Fold,
        }
    }

    fn decide_unopened(&self, strength: u8, request: &ActionRequest) -> PlayerAction {
        let pot = request.pot;
        match strength {
            9..=10 => Self::raise_or(request, (pot * 2 / 3).max(self.raise_unit), PlayerAction::Check),
            7..=8 => Self::raise_or(request, (pot / 2).max(self.raise_unit), PlayerAction::Check),
            _ => PlayerAction::Check,
        }
    }
}

impl Default for BaselineAI {
    fn default() -> Self {
        Self::new()
    }
}

impl AIOpponent for BaselineAI {
    fn decide(&mut self, request: &ActionRequest) -> PlayerAction {
        let strength = Self::strength(request);
        if request.owed == 0 {
            self.decide_unopened(strength, request)
        } else {
            self.decide_facing_bet(strength, request)
        }
    }

    fn name(&self) -> &str {
        "BaselineAI"
    }
}

fn hole_pair(cards: &[Card]) -> Option<[Card; 2]> {
    match cards {
        [a, b] => Some([*a, *b]),
        _ => None,
    }
}
