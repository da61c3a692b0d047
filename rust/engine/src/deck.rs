use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};

/// The dealer's pile of cards that are not on the board.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    rng: ChaCha20Rng,
}

impl Deck {
    pub fn new_with_seed(deck_size: usize, seed: u64) -> Self {
        // Keep initial order until shuffle is called explicitly
        Self {
            cards: full_deck(deck_size),
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn from_cards(cards: Vec<Card>, seed: u64) -> Self {
        Self {
            cards,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
    }

    /// Takes the card at the top of the pile.
    pub fn draw(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }

    pub fn put_back(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
