//! Process exit codes returned by [`crate::run`].

/// Command completed.
pub const SUCCESS: i32 = 0;

/// Bad arguments, bad configuration, or a failed command.
pub const ERROR: i32 = 2;

/// The user quit a running game.
pub const INTERRUPTED: i32 = 130;
