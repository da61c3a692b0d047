//! # setgame-engine: concurrent Set table
//!
//! Runs a real-time game of Set: several players race to mark three cards
//! that form a set on a shared board, while a single dealer arbitrates
//! claims in the order they were made. Every participant is its own thread.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card identity, feature decoding and the set rule
//! - [`deck`] - Seeded deck with ChaCha20 shuffling
//! - [`board`] - Slot/card mapping and per-player markers behind one RwLock
//! - [`claims`] - FIFO of completed selections awaiting a verdict
//! - [`player`] - Player state machine and its actor thread
//! - [`input`] - Key press sources for human and automated players
//! - [`timer`] - Round countdown
//! - [`dealer`] - Round lifecycle and claim arbitration
//! - [`game`] - Thread wiring and the handle used to drive a game
//! - [`surface`] - Output notifications (display, logs, recording)
//! - [`shutdown`] - Broadcast cancellation
//! - [`config`] - Game parameters and validation
//! - [`errors`] - Error types
//!
//! ## Quick Start
//!
//! ```rust
//! use setgame_engine::cards::{Card, SetRules, StandardRules};
//!
//! let rules = StandardRules::default();
//! // ids 0, 1, 2 differ only in the first feature: 0, 1, 2
//! assert!(rules.is_valid_set(&[Card::new(0), Card::new(1), Card::new(2)]));
//! assert!(!rules.is_valid_set(&[Card::new(0), Card::new(1), Card::new(3)]));
//! ```
//!
//! ## Running a game
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use setgame_engine::config::GameConfig;
//! use setgame_engine::game::{Game, Seat};
//! use setgame_engine::surface::TracingSurface;
//!
//! let config = GameConfig { players: 1, ..GameConfig::default() };
//! let game = Game::start(config, vec![Seat::Human], Arc::new(TracingSurface)).unwrap();
//! game.press(0, 4).unwrap();
//! game.abort();
//! let outcome = game.join().unwrap();
//! println!("{:?}", outcome.end);
//! ```

pub use crossbeam_channel;

pub mod board;
pub mod cards;
pub mod claims;
pub mod config;
pub mod dealer;
pub mod deck;
pub mod errors;
pub mod game;
pub mod input;
pub mod player;
pub mod shutdown;
pub mod surface;
pub mod timer;
