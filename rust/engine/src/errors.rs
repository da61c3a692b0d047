use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Expected {expected} seats, got {actual}")]
    SeatMismatch { expected: usize, actual: usize },
    #[error("Unknown player {0}")]
    UnknownPlayer(usize),
    #[error("Failed to spawn {name} thread")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("The {0} thread panicked")]
    ThreadPanicked(String),
}
