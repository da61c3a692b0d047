//! Command-line definitions.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "setgame",
    version,
    about = "Real-time Set for the terminal: race to mark three cards that form a set"
)]
pub struct SetgameCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play a game; humans type `<player> <slot>` (or `<slot>`), `q` quits
    Play {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=32))]
        players: Option<u32>,
        #[arg(long)]
        humans: Option<u32>,
        /// Log every set on the table after each deal
        #[arg(long)]
        hints: bool,
        #[arg(long)]
        deck_size: Option<usize>,
        #[arg(long)]
        table_size: Option<usize>,
        /// Round length in milliseconds
        #[arg(long)]
        turn_timeout_millis: Option<u64>,
    },
    /// Run bot-only games with no freezes or delays and tally the winners
    Sim {
        #[arg(long, default_value_t = 1)]
        games: u32,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=32))]
        players: Option<u32>,
        #[arg(long)]
        deck_size: Option<usize>,
        #[arg(long)]
        table_size: Option<usize>,
    },
    /// Lay out one table and list the sets on it
    Deal {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show the resolved configuration and where each value came from
    Cfg,
}
