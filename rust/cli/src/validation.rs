//! Parsing of interactive key presses typed on stdin.

/// Outcome of parsing one input line during `play`.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseResult {
    /// Toggle `slot` for human `player`
    Press { player: usize, slot: usize },
    /// User entered quit command (q or quit)
    Quit,
    /// Invalid input with error message
    Invalid(String),
}

/// Parses `<player> <slot>`, or just `<slot>` when a single human plays.
///
/// Player ids index the human seats, which are always the first ones.
///
/// ```rust
/// use setgame_cli::validation::{parse_press, ParseResult};
///
/// assert_eq!(parse_press("4", 1, 12), ParseResult::Press { player: 0, slot: 4 });
/// assert_eq!(parse_press("1 11", 2, 12), ParseResult::Press { player: 1, slot: 11 });
/// assert_eq!(parse_press("quit", 2, 12), ParseResult::Quit);
/// assert!(matches!(parse_press("1 12", 2, 12), ParseResult::Invalid(_)));
/// ```
pub fn parse_press(input: &str, humans: usize, table_size: usize) -> ParseResult {
    let input = input.trim().to_lowercase();
    let parts: Vec<&str> = input.split_whitespace().collect();

    let (player, slot) = match parts.as_slice() {
        [] => return ParseResult::Invalid("Empty input".to_string()),
        ["q"] | ["quit"] => return ParseResult::Quit,
        [slot] if humans == 1 => ("0", *slot),
        [_] => {
            return ParseResult::Invalid(format!(
                "{} humans are playing: enter '<player> <slot>'",
                humans
            ));
        }
        [player, slot] => (*player, *slot),
        _ => return ParseResult::Invalid(format!("Unrecognized input: {}", input)),
    };

    let Ok(player) = player.parse::<usize>() else {
        return ParseResult::Invalid(format!("Invalid player: {}", player));
    };
    let Ok(slot) = slot.parse::<usize>() else {
        return ParseResult::Invalid(format!("Invalid slot: {}", slot));
    };
    if player >= humans {
        return ParseResult::Invalid(format!(
            "Player {} is not a human seat (0..{})",
            player, humans
        ));
    }
    if slot >= table_size {
        return ParseResult::Invalid(format!(
            "Slot {} is off the table (0..{})",
            slot, table_size
        ));
    }
    ParseResult::Press { player, slot }
}
