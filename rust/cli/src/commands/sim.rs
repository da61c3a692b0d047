//! Bot-only simulation.
//!
//! Every seat is automated, freezes and table delays are zeroed and rounds
//! are capped at [`MAX_SIM_TURN_MILLIS`], so a game on the classic deck
//! finishes in seconds. Per-game seeds are drawn from a ChaCha20 stream
//! seeded with the base seed, which makes a whole run reproducible in its
//! deals (the race between bots still depends on scheduling).
//!
//! # Examples
//!
//! ```no_run
//! use setgame_cli::commands::handle_sim_command;
//! use setgame_cli::config::Overrides;
//! use std::io;
//!
//! let overrides = Overrides { seed: Some(42), players: Some(3), ..Overrides::default() };
//! handle_sim_command(10, &overrides, &mut io::stdout(), &mut io::stderr()).unwrap();
//! ```

use crate::config::{self, Overrides};
use crate::error::CliError;
use crate::ui;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use setgame_ai::create_ai;
use setgame_engine::config::GameConfig;
use setgame_engine::dealer::{GameEnd, winners};
use setgame_engine::game::{Game, Seat};
use setgame_engine::surface::NullSurface;
use std::io::Write;
use std::sync::Arc;

/// Upper bound on a simulated round.
pub const MAX_SIM_TURN_MILLIS: u64 = 1_000;

/// Runs `games` bot-only games and prints one line per game plus a tally of
/// wins per seat.
pub fn handle_sim_command(
    games: u32,
    overrides: &Overrides,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if games == 0 {
        ui::write_error(err, "games must be >= 1")?;
        return Err(CliError::InvalidInput("games must be >= 1".to_string()));
    }

    let overrides = Overrides {
        humans: Some(0),
        hints: Some(false),
        ..overrides.clone()
    };
    let base = sim_config(config::resolve(&overrides)?.config);
    let base_seed = base.seed.unwrap_or_else(rand::random);
    let mut seeds = ChaCha20Rng::seed_from_u64(base_seed);

    writeln!(
        out,
        "sim: games={} players={} deck={} table={} seed={}",
        games, base.players, base.deck_size, base.table_size, base_seed
    )?;

    let mut wins = vec![0u32; base.players];
    for game in 1..=games {
        let seed = seeds.next_u64();
        let config = GameConfig {
            seed: Some(seed),
            ..base.clone()
        };
        let seats = bot_seats(&config, seed)?;
        let outcome = Game::start(config, seats, Arc::new(NullSurface))?.join()?;
        if outcome.end != GameEnd::GameOver {
            return Err(CliError::Engine(format!("game {} was aborted", game)));
        }
        tracing::info!(game, seed, rounds = outcome.rounds, "simulated game finished");
        for &w in &outcome.winners {
            wins[w] += 1;
        }
        writeln!(
            out,
            "game {}: seed={} rounds={} scores={:?} winners={:?}",
            game, seed, outcome.rounds, outcome.scores, outcome.winners
        )?;
    }

    writeln!(out, "wins: {:?}", wins)?;
    writeln!(out, "most wins: {}", ui::format_players(&winners(&wins)))?;
    Ok(())
}

/// The resolved configuration with every pause removed.
fn sim_config(config: GameConfig) -> GameConfig {
    GameConfig {
        human_players: 0,
        hints: false,
        point_freeze_millis: 0,
        penalty_freeze_millis: 0,
        table_delay_millis: 0,
        turn_timeout_millis: config.turn_timeout_millis.min(MAX_SIM_TURN_MILLIS),
        turn_timeout_warning_millis: config.turn_timeout_warning_millis.min(MAX_SIM_TURN_MILLIS),
        bot_pace_millis: config.bot_pace_millis.max(1),
        ..config
    }
}

fn bot_seats(config: &GameConfig, seed: u64) -> Result<Vec<Seat>, CliError> {
    (0..config.players)
        .map(|id| {
            create_ai(
                "random",
                config.table_size,
                config.bot_pace(),
                Some(seed.wrapping_add(id as u64 + 1)),
            )
            .map(Seat::Automated)
            .ok_or_else(|| CliError::Engine("random bot unavailable".to_string()))
        })
        .collect()
}
