use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::cards::StandardRules;
use crate::errors::GameError;

/// Read-only game parameters, fixed for the lifetime of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Total number of players
    pub players: usize,
    /// The first `human_players` seats take keyboard input, the rest are automated
    pub human_players: usize,
    /// Number of card slots on the board
    pub table_size: usize,
    /// Number of cards in play (at most `feature_size ^ feature_count`)
    pub deck_size: usize,
    pub feature_count: usize,
    pub feature_size: usize,
    pub turn_timeout_millis: u64,
    /// Below this remaining time the countdown switches to fine-grained updates
    pub turn_timeout_warning_millis: u64,
    pub point_freeze_millis: u64,
    pub penalty_freeze_millis: u64,
    /// Cosmetic delay applied to every card placement and removal
    pub table_delay_millis: u64,
    /// Log every set on the table after each deal
    pub hints: bool,
    /// Pause between two key presses of an automated player
    pub bot_pace_millis: u64,
    /// Capacity of each actor's pending key press queue
    pub input_queue_capacity: usize,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: 4,
            human_players: 1,
            table_size: 12,
            deck_size: 81,
            feature_count: 4,
            feature_size: 3,
            turn_timeout_millis: 60_000,
            turn_timeout_warning_millis: 5_000,
            point_freeze_millis: 1_000,
            penalty_freeze_millis: 3_000,
            table_delay_millis: 100,
            hints: false,
            bot_pace_millis: 10,
            input_queue_capacity: 3,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        let invalid =
            |msg: &str| -> Result<(), GameError> { Err(GameError::InvalidConfig(msg.to_string())) };
        if self.players == 0 {
            return invalid("players must be >= 1");
        }
        if self.human_players > self.players {
            return invalid("human_players must not exceed players");
        }
        if self.table_size < 3 {
            return invalid("table_size must be >= 3");
        }
        if self.feature_size < 2 || self.feature_count == 0 {
            return invalid("cards need at least one feature with two values");
        }
        let universe = self.rules().universe_size().unwrap_or(usize::MAX);
        if self.deck_size < 3 || self.deck_size > universe || self.deck_size > u16::MAX as usize {
            return Err(GameError::InvalidConfig(format!(
                "deck_size must be between 3 and {}",
                universe.min(u16::MAX as usize)
            )));
        }
        if self.turn_timeout_millis == 0 {
            return invalid("turn_timeout_millis must be > 0");
        }
        if self.turn_timeout_warning_millis > self.turn_timeout_millis {
            return invalid("turn_timeout_warning_millis must not exceed turn_timeout_millis");
        }
        if self.input_queue_capacity == 0 {
            return invalid("input_queue_capacity must be >= 1");
        }
        Ok(())
    }

    pub fn rules(&self) -> StandardRules {
        StandardRules::new(self.feature_count, self.feature_size)
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_millis)
    }

    pub fn turn_timeout_warning(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_warning_millis)
    }

    pub fn point_freeze(&self) -> Duration {
        Duration::from_millis(self.point_freeze_millis)
    }

    pub fn penalty_freeze(&self) -> Duration {
        Duration::from_millis(self.penalty_freeze_millis)
    }

    pub fn table_delay(&self) -> Duration {
        Duration::from_millis(self.table_delay_millis)
    }

    pub fn bot_pace(&self) -> Duration {
        Duration::from_millis(self.bot_pace_millis)
    }
}
