use std::collections::HashSet;

use setgame_engine::cards::Card;
use setgame_engine::deck::Deck;

#[test]
fn fresh_deck_has_every_card_once() {
    let mut deck = Deck::new_with_seed(81, 42);
    let mut seen = HashSet::new();
    for i in 0..81 {
        let c = deck.draw().expect("should have 81 cards");
        assert!(seen.insert(c), "card {c} duplicated at position {i}");
    }
    assert!(deck.draw().is_none(), "after 81 cards, deck should be empty");
}

#[test]
fn shuffle_is_deterministic_with_same_seed() {
    let mut d1 = Deck::new_with_seed(81, 12345);
    let mut d2 = Deck::new_with_seed(81, 12345);
    d1.shuffle();
    d2.shuffle();
    assert_eq!(d1.cards(), d2.cards(), "same seed must yield identical order");
}

#[test]
fn shuffle_differs_with_different_seed() {
    let mut d1 = Deck::new_with_seed(81, 1);
    let mut d2 = Deck::new_with_seed(81, 2);
    d1.shuffle();
    d2.shuffle();
    assert_ne!(
        d1.cards(),
        d2.cards(),
        "different seeds should produce different orders (high probability)"
    );
}

#[test]
fn returned_cards_are_reshuffled_with_the_rest() {
    let mut deck = Deck::new_with_seed(12, 7);
    deck.shuffle();
    let drawn: Vec<Card> = (0..5).map(|_| deck.draw().unwrap()).collect();
    assert_eq!(deck.len(), 7);
    for card in &drawn {
        deck.put_back(*card);
    }
    deck.shuffle();
    let mut all: Vec<u16> = deck.cards().iter().map(|c| c.id()).collect();
    all.sort_unstable();
    assert_eq!(all, (0..12).collect::<Vec<u16>>());
}

#[test]
fn small_decks_use_the_lowest_ids() {
    let deck = Deck::new_with_seed(9, 0);
    let ids: Vec<u16> = deck.cards().iter().map(|c| c.id()).collect();
    assert_eq!(ids, (0..9).collect::<Vec<u16>>());
}
