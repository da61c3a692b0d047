use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use setgame_engine::board::{Board, Toggle};
use setgame_engine::cards::{Card, StandardRules};
use setgame_engine::shutdown::Shutdown;
use setgame_engine::surface::{NullSurface, RecordingSurface, SurfaceEvent};

fn board(table_size: usize, players: usize) -> Board {
    Board::new(
        table_size,
        81,
        players,
        Arc::new(NullSurface),
        Duration::ZERO,
        Shutdown::new(),
    )
}

fn dealt(table_size: usize, players: usize) -> Board {
    let board = board(table_size, players);
    {
        let mut table = board.exclusive();
        for slot in 0..table_size {
            assert!(table.place_card(Card::new(slot as u16), slot));
        }
        table.open();
    }
    board
}

#[test]
fn card_and_slot_mappings_mirror_each_other() {
    let board = board(12, 2);
    assert!(board.place_card(Card::new(40), 3));
    assert_eq!(board.card_at(3), Some(Card::new(40)));
    assert_eq!(board.slot_of(Card::new(40)), Some(3));
    assert!(board.is_consistent());

    // occupied slot and duplicate card are both refused
    assert!(!board.place_card(Card::new(41), 3));
    assert!(!board.place_card(Card::new(40), 4));
    assert!(board.is_consistent());

    let removal = board.remove_card(3).expect("card on slot 3");
    assert_eq!(removal.card, Card::new(40));
    assert_eq!(board.card_at(3), None);
    assert_eq!(board.slot_of(Card::new(40)), None);
    assert!(board.remove_card(3).is_none());
    assert!(board.is_consistent());
}

#[test]
fn toggling_twice_restores_the_board() {
    let board = dealt(12, 2);
    let before = board.snapshot();
    assert_eq!(board.toggle_marker(0, 5, |_| {}), Toggle::Placed);
    assert!(board.has_marker(0, 5));
    assert!(!board.has_marker(1, 5));
    assert_eq!(board.toggle_marker(0, 5, |_| {}), Toggle::Removed);
    assert_eq!(board.snapshot(), before);
}

#[test]
fn third_marker_completes_and_fourth_is_ignored() {
    let board = dealt(12, 1);
    let mut completed = None;
    assert_eq!(board.toggle_marker(0, 9, |_| {}), Toggle::Placed);
    assert_eq!(board.toggle_marker(0, 2, |_| {}), Toggle::Placed);
    assert_eq!(
        board.toggle_marker(0, 4, |slots| completed = Some(slots)),
        Toggle::Completed([2, 4, 9])
    );
    assert_eq!(completed, Some([2, 4, 9]));
    assert_eq!(board.toggle_marker(0, 7, |_| {}), Toggle::Ignored);
    assert_eq!(board.marker_count(0), 3);
    assert_eq!(board.markers_of(0), vec![2, 4, 9]);

    // removing one frees room again
    assert_eq!(board.remove_marker(0, 4), Toggle::Removed);
    assert_eq!(board.place_marker(0, 7), Toggle::Completed([2, 7, 9]));
}

#[test]
fn empty_and_out_of_range_slots_are_ignored() {
    let board = dealt(12, 1);
    let _ = board.remove_card(6);
    assert_eq!(board.toggle_marker(0, 6, |_| {}), Toggle::Ignored);
    assert_eq!(board.toggle_marker(0, 12, |_| {}), Toggle::Ignored);
    assert_eq!(board.toggle_marker(3, 0, |_| {}), Toggle::Ignored);
    assert_eq!(board.marker_count(0), 0);
}

#[test]
fn closed_board_ignores_toggles() {
    let board = dealt(12, 1);
    board.exclusive().close();
    assert!(!board.is_accepting());
    assert_eq!(board.toggle_marker(0, 1, |_| {}), Toggle::Ignored);
    board.exclusive().open();
    assert_eq!(board.toggle_marker(0, 1, |_| {}), Toggle::Placed);
}

#[test]
fn removing_a_card_clears_every_marker_on_it() {
    let surface = Arc::new(RecordingSurface::new());
    let board = Board::new(
        12,
        81,
        3,
        surface.clone(),
        Duration::ZERO,
        Shutdown::new(),
    );
    {
        let mut table = board.exclusive();
        table.place_card(Card::new(7), 0);
        table.place_card(Card::new(8), 1);
        table.open();
    }
    board.toggle_marker(0, 0, |_| {});
    board.toggle_marker(2, 0, |_| {});
    board.toggle_marker(2, 1, |_| {});
    surface.clear();

    let removal = board.remove_card(0).expect("card");
    assert_eq!(removal.cleared, vec![0, 2]);
    assert_eq!(board.markers_of(2), vec![1]);
    assert_eq!(board.marker_count(0), 0);
    assert_eq!(
        surface.events(),
        vec![
            SurfaceEvent::RemoveMarker { player: 0, slot: 0 },
            SurfaceEvent::RemoveMarker { player: 2, slot: 0 },
            SurfaceEvent::RemoveCard { slot: 0 },
        ]
    );
    assert!(board.is_consistent());
}

#[test]
fn hints_report_slots_of_sets_on_the_table() {
    let board = board(4, 1);
    {
        let mut table = board.exclusive();
        // cards 0, 1, 2 form a set; 40 does not join any
        table.place_card(Card::new(2), 0);
        table.place_card(Card::new(40), 1);
        table.place_card(Card::new(0), 2);
        table.place_card(Card::new(1), 3);
    }
    assert_eq!(board.hints(&StandardRules::default()), vec![[0, 2, 3]]);
}

#[test]
fn concurrent_toggles_keep_the_board_consistent() {
    let players = 6;
    let board = Arc::new(dealt(12, players));
    let threads: Vec<_> = (0..players)
        .map(|player| {
            let board = Arc::clone(&board);
            thread::spawn(move || {
                let mut rng = ChaCha20Rng::seed_from_u64(player as u64);
                for _ in 0..2_000 {
                    let slot = rng.random_range(0..12);
                    board.toggle_marker(player, slot, |_| {});
                    assert!(board.marker_count(player) <= 3);
                }
            })
        })
        .collect();

    // the dealer keeps swapping one card meanwhile
    for round in 0..200u16 {
        let mut table = board.exclusive();
        assert!(table.remove_card(11).is_some());
        assert!(table.place_card(Card::new(20 + (round % 2)), 11));
    }

    for t in threads {
        t.join().unwrap();
    }
    assert!(board.is_consistent());
}
