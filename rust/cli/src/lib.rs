//! # Setgame CLI Library
//!
//! This library provides the command-line interface for the real-time Set
//! engine: playing a live game in the terminal, simulating bot-only games,
//! inspecting a deal and showing the layered configuration.
//!
//! ## Main Entry Point
//!
//! The primary entry point is the [`run`] function, which parses command-line arguments
//! and executes the appropriate subcommand. [`run_with_input`] does the same with a
//! caller-supplied input stream for `play`.
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::io;
//! let args = vec!["setgame", "play", "--players", "3", "--humans", "1"];
//! let code = setgame_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `play`: Play a live game against random bots
//! - `sim`: Run bot-only games without pauses and tally the winners
//! - `deal`: Deal one table and list the sets on it
//! - `cfg`: Display the resolved configuration and value sources

use clap::Parser;
use std::io::{BufRead, BufReader, Write};
pub mod cli;
pub mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod io_utils;
pub mod logging;
pub mod terminal;
pub mod ui;
pub mod validation;

use cli::{Commands, SetgameCli};
use commands::{
    handle_cfg_command, handle_deal_command, handle_play_command, handle_sim_command,
};
use config::Overrides;

pub use error::CliError;

const COMMANDS: &[&str] = &["play", "sim", "deal", "cfg"];

/// Main entry point for the CLI application. `play` reads from stdin.
///
/// Returns the process exit code: `0` for success, `2` for errors, `130`
/// when the user quits a game.
///
/// ```
/// use std::io;
/// let args = vec!["setgame", "deal", "--seed", "42"];
/// let code = setgame_cli::run(args, &mut io::stdout(), &mut io::stderr());
/// assert_eq!(code, 0);
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    run_with_input(args, Box::new(BufReader::new(std::io::stdin())), out, err)
}

/// Like [`run`], with `input` standing in for stdin.
pub fn run_with_input<I, S>(
    args: I,
    input: Box<dyn BufRead + Send>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match SetgameCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => return usage_error(e, out, err),
    };

    let result = match cli.cmd {
        Commands::Cfg => handle_cfg_command(out),
        Commands::Deal { seed } => handle_deal_command(seed, out),
        Commands::Play {
            seed,
            players,
            humans,
            hints,
            deck_size,
            table_size,
            turn_timeout_millis,
        } => {
            let overrides = Overrides {
                seed,
                players: players.map(|p| p as usize),
                humans: humans.map(|h| h as usize),
                hints: hints.then_some(true),
                deck_size,
                table_size,
                turn_timeout_millis,
            };
            handle_play_command(&overrides, input, out, err)
        }
        Commands::Sim {
            games,
            seed,
            players,
            deck_size,
            table_size,
        } => {
            let overrides = Overrides {
                seed,
                players: players.map(|p| p as usize),
                deck_size,
                table_size,
                ..Overrides::default()
            };
            handle_sim_command(games, &overrides, out, err)
        }
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(CliError::Interrupted(msg)) => {
            tracing::info!(%msg, "interrupted");
            exit_code::INTERRUPTED
        }
        Err(e) => {
            if writeln!(err, "Error: {}", e).is_err() {
                return exit_code::ERROR;
            }
            exit_code::ERROR
        }
    }
}

fn usage_error(e: clap::Error, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    use clap::error::ErrorKind;

    // Help and version should print to stdout and exit 0
    if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        if write!(out, "{}", e).is_err() {
            return exit_code::ERROR;
        }
        return exit_code::SUCCESS;
    }

    // Print clap error first
    if writeln!(err, "{}", e).is_err()
        || writeln!(err).is_err()
        || writeln!(err, "Setgame CLI").is_err()
        || writeln!(err, "Usage: setgame <command> [options]\n").is_err()
        || writeln!(err, "Commands:").is_err()
    {
        return exit_code::ERROR;
    }
    for c in COMMANDS {
        if writeln!(err, "  {}", c).is_err() {
            return exit_code::ERROR;
        }
    }
    let _ = writeln!(err, "\nFor full help, run: setgame --help");
    exit_code::ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        SetgameCli::command().debug_assert();
    }

    #[test]
    fn test_command_list_matches_subcommands() {
        let names: Vec<String> = SetgameCli::command()
            .get_subcommands()
            .map(|c| c.get_name().to_string())
            .collect();
        for c in COMMANDS {
            assert!(names.iter().any(|n| n == c), "{c} is not a subcommand");
        }
        assert_eq!(names.len(), COMMANDS.len());
    }

    #[test]
    fn test_players_must_be_positive() {
        let result = SetgameCli::try_parse_from(["setgame", "sim", "--players", "0"]);
        assert!(result.is_err());
        let result = SetgameCli::try_parse_from(["setgame", "sim", "--players", "2"]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_deal_command_dispatch_with_seed() {
        let mut out = Vec::new();
        let mut err = Vec::new();

        let code = run(["setgame", "deal", "--seed", "42"], &mut out, &mut err);
        assert_eq!(code, exit_code::SUCCESS);

        let output = String::from_utf8(out).unwrap();
        assert!(output.starts_with("seed: 42"));
    }

    #[test]
    fn test_unknown_command_lists_commands() {
        let mut out = Vec::new();
        let mut err = Vec::new();

        let code = run(["setgame", "bogus"], &mut out, &mut err);
        assert_eq!(code, exit_code::ERROR);
        let stderr = String::from_utf8(err).unwrap();
        for c in COMMANDS {
            assert!(stderr.contains(c));
        }
    }
}
