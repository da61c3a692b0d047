//! Shared helpers for the CLI integration tests.
//!
//! Commands run in-process through [`setgame_cli::run_with_input`]. Every
//! command reads `SETGAME_*` variables, so tests that touch the environment
//! are `#[serial]` and start from [`clear_env`].

#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tempfile::TempDir;

/// Every variable the CLI reads.
pub const SETGAME_VARS: &[&str] = &[
    "SETGAME_CONFIG",
    "SETGAME_SEED",
    "SETGAME_PLAYERS",
    "SETGAME_HUMANS",
    "SETGAME_HINTS",
    "SETGAME_TURN_TIMEOUT_MILLIS",
];

/// A 9-card deck on a 9-slot table with every pause removed. Random bots
/// finish a game on it in well under a second.
pub const SMALL_GAME_TOML: &str = "\
feature_count = 2
feature_size = 3
deck_size = 9
table_size = 9
point_freeze_millis = 0
penalty_freeze_millis = 0
table_delay_millis = 0
turn_timeout_millis = 2000
turn_timeout_warning_millis = 500
bot_pace_millis = 1
";

#[derive(Debug, Clone)]
pub struct CliResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

pub fn run(args: &[&str]) -> CliResult {
    run_with_input(args, "")
}

pub fn run_with_input(args: &[&str], input: &str) -> CliResult {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let argv: Vec<String> = std::iter::once("setgame".to_string())
        .chain(args.iter().map(|s| s.to_string()))
        .collect();
    let start = Instant::now();
    let code = setgame_cli::run_with_input(
        argv,
        Box::new(Cursor::new(input.to_string().into_bytes())),
        &mut out,
        &mut err,
    );
    CliResult {
        exit_code: code,
        stdout: String::from_utf8_lossy(&out).to_string(),
        stderr: String::from_utf8_lossy(&err).to_string(),
        duration: start.elapsed(),
    }
}

pub fn clear_env() {
    for var in SETGAME_VARS {
        unsafe {
            std::env::remove_var(var);
        }
    }
}

pub fn set_env(key: &str, value: &str) {
    unsafe {
        std::env::set_var(key, value);
    }
}

/// A config file in a fresh temporary directory, removed on drop.
pub struct ConfigFile {
    _dir: TempDir,
    pub path: PathBuf,
}

impl ConfigFile {
    pub fn new(contents: &str) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("setgame.toml");
        std::fs::write(&path, contents).expect("write config");
        Self { _dir: dir, path }
    }

    /// Writes the file and points `SETGAME_CONFIG` at it.
    pub fn install(contents: &str) -> Self {
        let file = Self::new(contents);
        set_env("SETGAME_CONFIG", &file.path.to_string_lossy());
        file
    }
}
