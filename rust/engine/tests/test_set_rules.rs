use setgame_engine::cards::{full_deck, Card, SetRules, StandardRules};

fn cards(ids: [u16; 3]) -> [Card; 3] {
    ids.map(Card::new)
}

#[test]
fn all_same_or_all_different_in_every_feature() {
    let rules = StandardRules::default();
    // (0,0,0,0) (1,1,1,1) (2,2,2,2)
    assert!(rules.is_valid_set(&cards([0, 40, 80])));
    // (0,0,0,0) (0,1,0,0) (0,2,0,0)
    assert!(rules.is_valid_set(&cards([0, 3, 6])));
    // duplicates never count
    assert!(!rules.is_valid_set(&cards([1, 1, 1])));
    // first feature 0, 1, 1
    assert!(!rules.is_valid_set(&cards([0, 1, 4])));
}

#[test]
fn order_does_not_matter() {
    let rules = StandardRules::default();
    let set = [5u16, 10, 66];
    let valid = rules.is_valid_set(&cards(set));
    for perm in [[10, 5, 66], [66, 10, 5], [5, 66, 10]] {
        assert_eq!(rules.is_valid_set(&cards(perm)), valid);
    }
}

#[test]
fn any_two_cards_complete_exactly_one_set_in_the_full_deck() {
    let rules = StandardRules::default();
    let deck = full_deck(81);
    for a in [0usize, 17, 42] {
        for b in [1usize, 55, 80] {
            let completions = deck
                .iter()
                .filter(|&&c| rules.is_valid_set(&[deck[a], deck[b], c]))
                .count();
            assert_eq!(completions, 1, "pair {a},{b}");
        }
    }
}

#[test]
fn find_sets_honors_the_limit() {
    let rules = StandardRules::default();
    let deck = full_deck(81);
    assert_eq!(rules.find_sets(&deck, 1).len(), 1);
    assert_eq!(rules.find_sets(&deck, 5).len(), 5);
    assert!(rules.find_sets(&deck, 0).is_empty());
    // 81 * 80 / 6 sets in the full deck
    assert_eq!(rules.find_sets(&deck, usize::MAX).len(), 1080);
}

#[test]
fn find_sets_on_a_setless_pile_is_empty() {
    let rules = StandardRules::default();
    // 0, 1, 3, 4: no feature combination closes
    let pile: Vec<Card> = [0u16, 1, 3, 4].into_iter().map(Card::new).collect();
    assert!(rules.find_sets(&pile, usize::MAX).is_empty());
}

#[test]
fn smaller_feature_spaces_work() {
    let rules = StandardRules::new(2, 3);
    assert_eq!(rules.universe_size(), Some(9));
    assert_eq!(rules.features(Card::new(7)), vec![1, 2]);
    assert!(rules.is_valid_set(&cards([0, 4, 8])));
}

#[test]
fn wide_features_keep_every_value() {
    let rules = StandardRules::new(1, 300);
    assert_eq!(rules.features(Card::new(256)), vec![256]);
    assert_eq!(rules.features(Card::new(299)), vec![299]);
    // 0, 256 and 1 are pairwise distinct
    assert!(rules.is_valid_set(&cards([0, 256, 1])));
    assert!(!rules.is_valid_set(&cards([0, 256, 256])));
}

#[test]
fn wide_feature_configs_validate() {
    let config = setgame_engine::config::GameConfig {
        feature_count: 1,
        feature_size: 300,
        deck_size: 300,
        ..Default::default()
    };
    assert!(config.validate().is_ok());
    assert_eq!(config.rules().universe_size(), Some(300));
}
