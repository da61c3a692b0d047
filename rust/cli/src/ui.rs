//! Small helpers for consistent terminal messages.

use std::io::Write;

pub fn write_error(err: &mut dyn Write, msg: &str) -> std::io::Result<()> {
    writeln!(err, "Error: {}", msg)
}

/// Display a warning message to stderr with "WARNING:" prefix
pub fn display_warning(err: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(err, "WARNING: {}", message)
}

/// "player 0", "players 0 and 2", "players 0, 1 and 3"
pub fn format_players(players: &[usize]) -> String {
    match players {
        [] => "nobody".to_string(),
        [only] => format!("player {}", only),
        [rest @ .., last] => {
            let rest: Vec<String> = rest.iter().map(|p| p.to_string()).collect();
            format!("players {} and {}", rest.join(", "), last)
        }
    }
}
