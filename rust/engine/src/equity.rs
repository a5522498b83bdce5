//! Win-probability estimation for the players still in a hand.
//!
//! Estimates are advisory: the orchestrator stores them on each player for display and never
//! consults them when validating actions.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};
use crate::hand::evaluate_hand;

/// Estimates each player's probability of winning from visible cards only.
pub trait EquityEstimator: Send + Sync {
    /// One value in `[0, 1]` per entry of `holes`, in the same order.
    fn estimate(&self, community: &[Card], holes: &[[Card; 2]]) -> Vec<f64>;
}

/// Monte-Carlo rollout of the missing community cards. Ties give each winner a fractional share.
/// With a complete board there is nothing to sample and the result is exact.
#[derive(Debug, Clone)]
pub struct MonteCarloEquity {
    iterations: u32,
    seed: Option<u64>,
}

impl MonteCarloEquity {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
            seed: None,
        }
    }

    /// Fixed seed so repeated estimates over the same cards agree.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for MonteCarloEquity {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl EquityEstimator for MonteCarloEquity {
    fn estimate(&self, community: &[Card], holes: &[[Card; 2]]) -> Vec<f64> {
        match holes.len() {
            0 => return Vec::new(),
            1 => return vec![1.0],
            _ => {}
        }
        let known: Vec<Card> = community
            .iter()
            .chain(holes.iter().flatten())
            .copied()
            .collect();
        let mut remaining: Vec<Card> = full_deck()
            .into_iter()
            .filter(|c| !known.contains(c))
            .collect();
        let missing = 5usize.saturating_sub(community.len()).min(remaining.len());
        let iterations = if missing == 0 { 1 } else { self.iterations };

        let mut rng = ChaCha20Rng::seed_from_u64(self.seed.unwrap_or_else(rand::random));
        let mut shares = vec![0.0f64; holes.len()];
        let mut board: Vec<Card> = Vec::with_capacity(5);
        let mut hand = Vec::with_capacity(7);
        for _ in 0..iterations {
            let (drawn, _) = remaining.partial_shuffle(&mut rng, missing);
            board.clear();
            board.extend_from_slice(community);
            board.extend_from_slice(drawn);

            let strengths: Vec<_> = holes
                .iter()
                .map(|hole| {
                    hand.clear();
                    hand.extend_from_slice(hole);
                    hand.extend_from_slice(&board);
                    evaluate_hand(&hand)
                })
                .collect();
            let Some(best) = strengths.iter().max() else {
                continue;
            };
            let winners = strengths.iter().filter(|s| *s == best).count() as f64;
            for (share, s) in shares.iter_mut().zip(&strengths) {
                if s == best {
                    *share += 1.0 / winners;
                }
            }
        }
        shares
            .into_iter()
            .map(|s| s / f64::from(iterations))
            .collect()
    }
}

/// Splits the probability evenly. Useful when estimation is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformEquity;

impl EquityEstimator for UniformEquity {
    fn estimate(&self, _community: &[Card], holes: &[[Card; 2]]) -> Vec<f64> {
        if holes.is_empty() {
            return Vec::new();
        }
        vec![1.0 / holes.len() as f64; holes.len()]
    }
}
