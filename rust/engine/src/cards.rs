use serde::{Deserialize, Serialize};
use std::fmt;

/// A single card, identified by its position in the full card universe.
/// The card's features are not stored on the card itself; they are derived
/// from the id by a [`SetRules`] implementation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Card(u16);

impl Card {
    pub fn new(id: u16) -> Self {
        Card(id)
    }

    pub fn id(self) -> u16 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Builds the cards `0..deck_size` in id order.
pub fn full_deck(deck_size: usize) -> Vec<Card> {
    (0..deck_size).map(|id| Card(id as u16)).collect()
}

/// The set-evaluation collaborator: decides whether three cards form a set
/// and searches a pile of cards for sets.
///
/// Implementations are pure and shared between the dealer, the board's hint
/// view and the CLI, so they must be `Send + Sync`.
pub trait SetRules: Send + Sync {
    /// Feature values of `card`, one entry per feature.
    fn features(&self, card: Card) -> Vec<usize>;

    /// Returns true iff the three cards form a legal set.
    fn is_valid_set(&self, cards: &[Card; 3]) -> bool;

    /// Returns up to `limit` sets found among `cards`.
    ///
    /// Combinations are visited in ascending index order, so the result is
    /// deterministic for a given input order. `limit == 1` is the cheap
    /// "does any set exist" query.
    fn find_sets(&self, cards: &[Card], limit: usize) -> Vec<[Card; 3]> {
        let mut found = Vec::new();
        if limit == 0 {
            return found;
        }
        for i in 0..cards.len() {
            for j in (i + 1)..cards.len() {
                for k in (j + 1)..cards.len() {
                    let triple = [cards[i], cards[j], cards[k]];
                    if self.is_valid_set(&triple) {
                        found.push(triple);
                        if found.len() >= limit {
                            return found;
                        }
                    }
                }
            }
        }
        found
    }
}

/// The classic rules: each card has `feature_count` features taking one of
/// `feature_size` values, and three cards form a set when every feature is
/// either the same on all three cards or different on all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardRules {
    feature_count: usize,
    feature_size: usize,
}

impl Default for StandardRules {
    fn default() -> Self {
        Self {
            feature_count: 4,
            feature_size: 3,
        }
    }
}

impl StandardRules {
    pub fn new(feature_count: usize, feature_size: usize) -> Self {
        Self {
            feature_count,
            feature_size,
        }
    }

    /// Number of distinct cards these rules can describe.
    pub fn universe_size(&self) -> Option<usize> {
        u32::try_from(self.feature_count)
            .ok()
            .and_then(|exp| self.feature_size.checked_pow(exp))
    }
}

impl SetRules for StandardRules {
    fn features(&self, card: Card) -> Vec<usize> {
        let mut rest = card.index();
        let mut out = Vec::with_capacity(self.feature_count);
        for _ in 0..self.feature_count {
            out.push(rest % self.feature_size);
            rest /= self.feature_size;
        }
        out
    }

    fn is_valid_set(&self, cards: &[Card; 3]) -> bool {
        if cards[0] == cards[1] || cards[1] == cards[2] || cards[0] == cards[2] {
            return false;
        }
        let a = self.features(cards[0]);
        let b = self.features(cards[1]);
        let c = self.features(cards[2]);
        a.iter().zip(&b).zip(&c).all(|((x, y), z)| {
            let all_same = x == y && y == z;
            let all_different = x != y && y != z && x != z;
            all_same || all_different
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_are_base_digits_of_the_id() {
        let rules = StandardRules::default();
        assert_eq!(rules.features(Card::new(0)), vec![0, 0, 0, 0]);
        assert_eq!(rules.features(Card::new(5)), vec![2, 1, 0, 0]);
        assert_eq!(rules.features(Card::new(80)), vec![2, 2, 2, 2]);
    }

    #[test]
    fn universe_overflow_is_reported_as_none() {
        assert_eq!(StandardRules::default().universe_size(), Some(81));
        assert_eq!(StandardRules::new(64, 3).universe_size(), None);
    }
}
