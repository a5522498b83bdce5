use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};
use crate::errors::GameError;

/// The 52-card supply for one round. Cards are issued from the top without replacement.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
    rng: ChaCha20Rng,
}

impl Deck {
    pub fn new_with_seed(seed: u64) -> Self {
        let rng = ChaCha20Rng::seed_from_u64(seed);
        // Keep initial order until shuffle is called explicitly
        Self {
            cards: full_deck(),
            position: 0,
            rng,
        }
    }

    /// A new deck already shuffled, as issued at the start of every round.
    pub fn shuffled(seed: u64) -> Self {
        let mut deck = Self::new_with_seed(seed);
        deck.shuffle();
        deck
    }

    /// Deck that deals `top` first (in order) and then the rest of the 52 cards unshuffled.
    /// Used to stack a deck for scripted hands. A card repeated in `top` is only dealt at its
    /// first position.
    pub fn stacked(top: &[Card]) -> Self {
        let mut cards: Vec<Card> = Vec::with_capacity(52);
        for card in top {
            if !cards.contains(card) {
                cards.push(*card);
            }
        }
        cards.extend(full_deck().into_iter().filter(|c| !top.contains(c)));
        Self {
            cards,
            position: 0,
            rng: ChaCha20Rng::seed_from_u64(0),
        }
    }

    pub fn shuffle(&mut self) {
        self.cards = full_deck();
        self.cards.shuffle(&mut self.rng);
        self.position = 0;
    }

    pub fn deal_card(&mut self) -> Result<Card, GameError> {
        let card = self
            .cards
            .get(self.position)
            .copied()
            .ok_or(GameError::DeckExhausted)?;
        self.position += 1;
        Ok(card)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }
}
