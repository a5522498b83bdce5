//! Hand ranking used at showdown and by the equity estimator.
//!
//! The round engine only talks to the [`HandEvaluator`] and [`WinnerRanking`] traits; the
//! functions here are the default provider behind them.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Suit};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

/// Strength of the best five-card hand. Ordering is category first, then kickers.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct HandStrength {
    pub category: Category,
    // kickers: ordered high -> low for tiebreaks
    pub kickers: [u8; 5],
}

/// Finds the best five-card hand among 5 to 7 hole and community cards.
pub trait HandEvaluator: Send + Sync {
    fn best_hand(&self, hole: &[Card], community: &[Card]) -> HandStrength;
}

/// Picks the winners among showdown hands. Several names mean a split pot.
pub trait WinnerRanking: Send + Sync {
    fn winners(&self, hands: &[(String, HandStrength)]) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BestHandEvaluator;

impl HandEvaluator for BestHandEvaluator {
    fn best_hand(&self, hole: &[Card], community: &[Card]) -> HandStrength {
        let cards: Vec<Card> = hole.iter().chain(community).copied().collect();
        evaluate_hand(&cards)
    }
}

/// Every hand equal to the strongest one wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrongestHandRanking;

impl WinnerRanking for StrongestHandRanking {
    fn winners(&self, hands: &[(String, HandStrength)]) -> Vec<String> {
        let Some(best) = hands.iter().map(|(_, h)| h).max() else {
            return Vec::new();
        };
        hands
            .iter()
            .filter(|(_, h)| h == best)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Evaluates the best five-card hand contained in `cards` (any count, normally 5-7).
pub fn evaluate_hand(cards: &[Card]) -> HandStrength {
    let mut rank_counts = [0u8; 15]; // 2..14 used
    let mut by_suit_mask = [0u16; 4];
    let mut rank_mask = 0u16;
    for c in cards {
        let r = c.rank.value();
        rank_counts[r as usize] += 1;
        rank_mask |= 1 << r;
        by_suit_mask[suit_index(c.suit)] |= 1 << r;
    }

    let flush_mask = by_suit_mask
        .iter()
        .copied()
        .find(|m| m.count_ones() >= 5);

    if let Some(high) = flush_mask.and_then(straight_high_from_mask) {
        return strength(Category::StraightFlush, &[high]);
    }

    // groups ordered by (count, rank) descending
    let mut groups: Vec<(u8, u8)> = (2..=14u8)
        .rev()
        .filter(|&r| rank_counts[r as usize] > 0)
        .map(|r| (rank_counts[r as usize], r))
        .collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));
    if groups.is_empty() {
        return strength(Category::HighCard, &[]);
    }

    if groups[0].0 == 4 {
        let quad = groups[0].1;
        let kicker = highest_except(&rank_counts, &[quad]);
        return strength(Category::FourOfAKind, &[quad, kicker]);
    }

    if groups[0].0 == 3 {
        // a second trip counts as the pair of a full house
        if let Some(&(_, pair)) = groups[1..].iter().find(|(count, _)| *count >= 2) {
            return strength(Category::FullHouse, &[groups[0].1, pair]);
        }
    }

    if let Some(mask) = flush_mask {
        let ranks = ranks_from_mask(mask);
        return strength(Category::Flush, &ranks[..5]);
    }

    if let Some(high) = straight_high_from_mask(rank_mask) {
        return strength(Category::Straight, &[high]);
    }

    if groups[0].0 == 3 {
        let trip = groups[0].1;
        let mut k = vec![trip];
        k.extend(top_singles(&rank_counts, &[trip], 2));
        return strength(Category::ThreeOfAKind, &k);
    }

    let pairs: Vec<u8> = groups
        .iter()
        .filter(|(count, _)| *count == 2)
        .map(|&(_, r)| r)
        .collect();
    if pairs.len() >= 2 {
        let (high, low) = (pairs[0], pairs[1]);
        let kicker = highest_except(&rank_counts, &[high, low]);
        return strength(Category::TwoPair, &[high, low, kicker]);
    }
    if let Some(&pair) = pairs.first() {
        let mut k = vec![pair];
        k.extend(top_singles(&rank_counts, &[pair], 3));
        return strength(Category::OnePair, &k);
    }

    strength(Category::HighCard, &top_singles(&rank_counts, &[], 5))
}

fn strength(category: Category, ranks: &[u8]) -> HandStrength {
    let mut kickers = [0u8; 5];
    for (slot, r) in kickers.iter_mut().zip(ranks) {
        *slot = *r;
    }
    HandStrength { category, kickers }
}

fn suit_index(s: Suit) -> usize {
    match s {
        Suit::Clubs => 0,
        Suit::Diamonds => 1,
        Suit::Hearts => 2,
        Suit::Spades => 3,
    }
}

fn ranks_from_mask(mask: u16) -> Vec<u8> {
    (2..=14u8).rev().filter(|r| mask & (1 << r) != 0).collect()
}

fn highest_except(rank_counts: &[u8; 15], excluded: &[u8]) -> u8 {
    top_singles(rank_counts, excluded, 1)
        .first()
        .copied()
        .unwrap_or(0)
}

fn top_singles(rank_counts: &[u8; 15], excluded: &[u8], n: usize) -> Vec<u8> {
    (2..=14u8)
        .rev()
        .filter(|r| rank_counts[*r as usize] > 0 && !excluded.contains(r))
        .take(n)
        .collect()
}

fn straight_high_from_mask(mask: u16) -> Option<u8> {
    let mut m = mask;
    // Ace also plays low
    if (m & (1 << 14)) != 0 {
        m |= 1 << 1;
    }
    (5..=14u8).rev().find(|&high| {
        let window = 0b11111u16 << (high - 4);
        m & window == window
    })
}
