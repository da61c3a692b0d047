//! # setgame-ai: automated players
//!
//! Automated seats produce key presses without a keyboard. Each one is a
//! [`SlotSource`] the engine plugs into a player actor, so an automated
//! player goes through exactly the same marker, claim and freeze cycle as
//! a human.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use setgame_ai::create_ai;
//!
//! let bot = create_ai("random", 12, Duration::from_millis(10), Some(7))
//!     .expect("random is a known kind");
//! assert_eq!(bot.name(), "random");
//! assert!(create_ai("oracle", 12, Duration::ZERO, None).is_none());
//! ```
//!
//! ## AI Types
//!
//! - `"random"` - presses a uniformly random slot after every pause

use std::time::Duration;

use setgame_engine::input::SlotSource;

pub mod random;

pub use random::RandomPresser;

/// Names accepted by [`create_ai`].
pub const AI_KINDS: &[&str] = &["random"];

/// Builds an automated input source by name.
///
/// `table_size` bounds the slots it presses, `pace` is the pause between
/// presses, and `seed` makes its choices reproducible. Returns `None` for
/// an unknown kind.
pub fn create_ai(
    kind: &str,
    table_size: usize,
    pace: Duration,
    seed: Option<u64>,
) -> Option<Box<dyn SlotSource>> {
    match kind {
        "random" => Some(Box::new(RandomPresser::new(table_size, pace, seed))),
        _ => None,
    }
}
