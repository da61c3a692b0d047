use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use setgame_engine::cards::{SetRules, StandardRules};
use setgame_engine::config::GameConfig;
use setgame_engine::dealer::GameEnd;
use setgame_engine::errors::GameError;
use setgame_engine::game::{Game, GameHandle, Seat};
use setgame_engine::input::ScriptedSource;
use setgame_engine::player::PlayerState;
use setgame_engine::surface::{NullSurface, RecordingSurface, SurfaceEvent};

/// Nine cards with two features: every card fits on one table.
fn small_config(players: usize) -> GameConfig {
    GameConfig {
        players,
        human_players: players,
        table_size: 9,
        deck_size: 9,
        feature_count: 2,
        feature_size: 3,
        turn_timeout_millis: 30_000,
        turn_timeout_warning_millis: 1_000,
        point_freeze_millis: 0,
        penalty_freeze_millis: 200,
        table_delay_millis: 0,
        seed: Some(5),
        ..GameConfig::default()
    }
}

fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}

fn idle_bot() -> Seat {
    Seat::Automated(Box::new(ScriptedSource::new(Vec::new(), Duration::from_millis(5))))
}

fn non_set_on_table(game: &GameHandle, rules: &StandardRules) -> Option<[usize; 3]> {
    let snapshot = game.snapshot();
    let slots: Vec<usize> = (0..snapshot.slots.len())
        .filter(|&s| snapshot.slots[s].is_some())
        .collect();
    for (i, &a) in slots.iter().enumerate() {
        for (j, &b) in slots.iter().enumerate().skip(i + 1) {
            for &c in slots.iter().skip(j + 1) {
                let cards = [a, b, c].map(|s| snapshot.slots[s].unwrap());
                if !rules.is_valid_set(&cards) {
                    return Some([a, b, c]);
                }
            }
        }
    }
    None
}

#[test]
fn human_pressing_sets_plays_until_game_over() {
    let rules = StandardRules::new(2, 3);
    let surface = Arc::new(RecordingSurface::new());
    let game = Game::start(small_config(1), vec![Seat::Human], surface.clone()).expect("start");

    let deadline = Instant::now() + Duration::from_secs(20);
    while !game.is_finished() {
        assert!(Instant::now() < deadline, "game did not finish");
        if game.state(0) == Some(PlayerState::Playing) && game.board().markers_of(0).is_empty() {
            if let Some(slots) = game.board().hints(&rules).first().copied() {
                for slot in slots {
                    game.press(0, slot).expect("player 0 exists");
                }
            }
        }
        thread::sleep(Duration::from_millis(5));
    }

    let outcome = game.join().expect("dealer result");
    assert_eq!(outcome.end, GameEnd::GameOver);
    assert!(outcome.scores[0] >= 1);
    assert_eq!(outcome.winners, vec![0]);
    assert!(surface.events().contains(&SurfaceEvent::Winners(vec![0])));
    assert!(surface
        .events()
        .contains(&SurfaceEvent::Score { player: 0, score: 1 }));
}

#[test]
fn wrong_claim_freezes_the_player_then_play_resumes() {
    let rules = StandardRules::new(2, 3);
    let game = Game::start(small_config(1), vec![Seat::Human], Arc::new(NullSurface)).unwrap();
    assert!(wait_until(Duration::from_secs(5), || {
        game.state(0) == Some(PlayerState::Playing)
    }));

    let slots = non_set_on_table(&game, &rules).expect("nine cards hold a non-set");
    for slot in slots {
        assert!(game.press(0, slot).unwrap());
    }
    assert!(wait_until(Duration::from_secs(5), || {
        game.state(0) == Some(PlayerState::PendingPenalty)
    }));
    assert!(!game.press(0, 0).unwrap(), "frozen players drop presses");
    assert!(wait_until(Duration::from_secs(5), || {
        game.state(0) == Some(PlayerState::Playing)
    }));
    assert!(game.board().markers_of(0).is_empty());
    assert_eq!(game.scores(), vec![0]);

    game.abort();
    let outcome = game.join().unwrap();
    assert_eq!(outcome.end, GameEnd::Aborted);
}

#[test]
fn rounds_advance_when_the_timer_runs_out() {
    let config = GameConfig {
        players: 1,
        human_players: 0,
        turn_timeout_millis: 120,
        turn_timeout_warning_millis: 60,
        table_delay_millis: 0,
        seed: Some(9),
        ..GameConfig::default()
    };
    let surface = Arc::new(RecordingSurface::new());
    let game = Game::start(config, vec![idle_bot()], surface.clone()).unwrap();
    thread::sleep(Duration::from_millis(700));
    game.abort();
    let outcome = game.join().unwrap();

    assert_eq!(outcome.end, GameEnd::Aborted);
    assert!(outcome.rounds >= 2, "only {} rounds", outcome.rounds);
    assert!(surface
        .events()
        .iter()
        .any(|e| matches!(e, SurfaceEvent::Countdown { warning: true, .. })));
    assert!(!surface
        .events()
        .iter()
        .any(|e| matches!(e, SurfaceEvent::Winners(_))));
}

#[test]
fn abort_stops_every_thread_promptly() {
    let config = GameConfig {
        players: 3,
        human_players: 1,
        turn_timeout_millis: 600_000,
        table_delay_millis: 0,
        ..GameConfig::default()
    };
    let game = Game::start(
        config,
        vec![Seat::Human, idle_bot(), idle_bot()],
        Arc::new(NullSurface),
    )
    .unwrap();
    thread::sleep(Duration::from_millis(50));
    assert!(!game.is_finished());

    let started = Instant::now();
    game.abort();
    while !game.is_finished() && started.elapsed() < Duration::from_secs(2) {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(game.is_finished(), "dealer still running after abort");
    let outcome = game.join().unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(outcome.end, GameEnd::Aborted);
    assert_eq!(outcome.scores, vec![0, 0, 0]);
}

#[test]
fn dropping_the_handle_aborts_the_game() {
    let config = GameConfig {
        players: 1,
        human_players: 0,
        turn_timeout_millis: 600_000,
        table_delay_millis: 0,
        ..GameConfig::default()
    };
    let game = Game::start(config, vec![idle_bot()], Arc::new(NullSurface)).unwrap();
    let shutdown = game.shutdown();
    let started = Instant::now();
    drop(game);
    assert!(shutdown.is_triggered());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn start_rejects_bad_setups() {
    let err = Game::start(small_config(2), vec![Seat::Human], Arc::new(NullSurface))
        .err()
        .expect("seat count mismatch");
    assert!(matches!(
        err,
        GameError::SeatMismatch {
            expected: 2,
            actual: 1
        }
    ));

    let config = GameConfig {
        deck_size: 100,
        ..small_config(1)
    };
    let err = Game::start(config, vec![Seat::Human], Arc::new(NullSurface))
        .err()
        .expect("deck larger than the card universe");
    assert!(matches!(err, GameError::InvalidConfig(_)));
}

#[test]
fn presses_for_unknown_players_are_errors() {
    let game = Game::start(small_config(1), vec![Seat::Human], Arc::new(NullSurface)).unwrap();
    assert!(matches!(game.press(4, 0), Err(GameError::UnknownPlayer(4))));
    game.abort();
    game.join().unwrap();
}
