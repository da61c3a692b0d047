//! # Play Command
//!
//! A live game in the terminal. The first `humans` seats read key presses
//! from the input stream, the remaining seats are random bots. Board
//! changes, countdowns and freezes are printed as they happen.
//!
//! Input lines are `<player> <slot>` (or just `<slot>` with one human);
//! `q` or `quit` aborts the game. End of input aborts a game that has human
//! seats and is ignored otherwise.

use crate::config::{self, Overrides};
use crate::error::CliError;
use crate::io_utils::read_stdin_line;
use crate::terminal::TerminalSurface;
use crate::ui;
use crate::validation::{ParseResult, parse_press};
use crossbeam_channel::{Receiver, never, select, tick, unbounded};
use setgame_ai::create_ai;
use setgame_engine::config::GameConfig;
use setgame_engine::dealer::GameEnd;
use setgame_engine::game::{Game, GameHandle, Seat};
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Handle the play command.
///
/// Returns `CliError::Interrupted` when the user quits, so the caller exits
/// with 130.
///
/// ```no_run
/// use setgame_cli::commands::handle_play_command;
/// use setgame_cli::config::Overrides;
/// use std::io::{self, BufReader};
///
/// let input = Box::new(BufReader::new(io::stdin()));
/// handle_play_command(&Overrides::default(), input, &mut io::stdout(), &mut io::stderr()).unwrap();
/// ```
pub fn handle_play_command(
    overrides: &Overrides,
    input: Box<dyn BufRead + Send>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let mut config = config::resolve(overrides)?.config;
    let seed = config.seed.unwrap_or_else(rand::random);
    config.seed = Some(seed);

    let (line_tx, lines) = unbounded();
    let surface = Arc::new(TerminalSurface::new(line_tx, config.rules()));
    let seats = seats(&config, seed)?;

    writeln!(
        out,
        "play: players={} humans={} table={} seed={}",
        config.players, config.human_players, config.table_size, seed
    )?;
    if config.human_players == 1 {
        writeln!(out, "enter a slot number to mark it, q to quit")?;
    } else if config.human_players > 1 {
        writeln!(out, "enter '<player> <slot>' to mark a slot, q to quit")?;
    }

    let handle = Game::start(config.clone(), seats, surface)?;
    let inputs = spawn_reader(input)?;
    let quit = drive(&handle, &config, lines.clone(), inputs, out, err)?;

    let outcome = handle.join()?;
    for line in lines.try_iter() {
        writeln!(out, "{}", line)?;
    }
    match outcome.end {
        GameEnd::GameOver => writeln!(out, "game over after {} rounds", outcome.rounds)?,
        GameEnd::Aborted => writeln!(out, "game aborted in round {}", outcome.rounds)?,
    }
    for (player, score) in outcome.scores.iter().enumerate() {
        writeln!(out, "player {}: {}", player, score)?;
    }

    if quit {
        return Err(CliError::Interrupted("quit requested".to_string()));
    }
    Ok(())
}

fn seats(config: &GameConfig, seed: u64) -> Result<Vec<Seat>, CliError> {
    (0..config.players)
        .map(|id| {
            if id < config.human_players {
                return Ok(Seat::Human);
            }
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

/// Reads lines on a detached thread. `None` marks end of input. A blocked
/// read cannot be cancelled, so the thread is never joined; it exits on the
/// next line once the receiver is gone.
fn spawn_reader(mut input: Box<dyn BufRead + Send>) -> Result<Receiver<Option<String>>, CliError> {
    let (tx, rx) = unbounded();
    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            loop {
                let line = read_stdin_line(&mut *input);
                let eof = line.is_none();
                if tx.send(line).is_err() || eof {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// Pumps surface lines to `out` and typed presses into the game until the
/// dealer finishes. Returns whether the user quit.
fn drive(
    handle: &GameHandle,
    config: &GameConfig,
    lines: Receiver<String>,
    inputs: Receiver<Option<String>>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<bool, CliError> {
    let ticker = tick(POLL_INTERVAL);
    let closed_lines: Receiver<String> = never();
    let closed_inputs: Receiver<Option<String>> = never();
    let mut lines_open = true;
    let mut input_open = true;
    let mut quit = false;
    while !handle.is_finished() {
        let line_rx = if lines_open { &lines } else { &closed_lines };
        let input_rx = if input_open { &inputs } else { &closed_inputs };
        select! {
            recv(line_rx) -> line => match line {
                Ok(line) => writeln!(out, "{}", line)?,
                Err(_) => lines_open = false,
            },
            recv(input_rx) -> msg => match msg {
                Ok(Some(line)) if line.is_empty() => {}
                Ok(Some(line)) => {
                    match parse_press(&line, config.human_players, config.table_size) {
                        ParseResult::Press { player, slot } => {
                            if !handle.press(player, slot)? {
                                ui::display_warning(
                                    err,
                                    &format!("player {} cannot mark slot {} right now", player, slot),
                                )?;
                            }
                        }
                        ParseResult::Quit => {
                            quit = true;
                            handle.abort();
                        }
                        ParseResult::Invalid(msg) => ui::write_error(err, &msg)?,
                    }
                }
                Ok(None) | Err(_) => {
                    input_open = false;
                    if config.human_players > 0 {
                        tracing::info!("input closed, aborting game");
                        handle.abort();
                    }
                }
            },
            recv(ticker) -> _ => {}
        }
    }
    Ok(quit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humans_take_the_first_seats() {
        let config = GameConfig {
            players: 4,
            human_players: 2,
            ..GameConfig::default()
        };
        let seats = seats(&config, 1).unwrap();
        assert!(matches!(seats[0], Seat::Human));
        assert!(matches!(seats[1], Seat::Human));
        assert!(matches!(seats[2], Seat::Automated(_)));
        assert!(matches!(seats[3], Seat::Automated(_)));
    }

    #[test]
    fn reader_reports_end_of_input() {
        let input = Box::new(std::io::Cursor::new("0 1\n\nq\n"));
        let rx = spawn_reader(input).unwrap();
        let got: Vec<Option<String>> = rx.iter().collect();
        assert_eq!(
            got,
            vec![
                Some("0 1".to_string()),
                Some(String::new()),
                Some("q".to_string()),
                None
            ]
        );
    }
}
