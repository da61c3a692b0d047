//! Layered game configuration.
//!
//! Values are resolved in order: built-in defaults, then the TOML file named
//! by `SETGAME_CONFIG`, then `SETGAME_*` environment variables, then
//! command-line flags. The source of every value is tracked for `cfg`.

use serde::{Deserialize, Serialize};
use setgame_engine::config::GameConfig;
use setgame_engine::errors::GameError;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::str::FromStr;

pub const CONFIG_ENV: &str = "SETGAME_CONFIG";
pub const SEED_ENV: &str = "SETGAME_SEED";
pub const PLAYERS_ENV: &str = "SETGAME_PLAYERS";
pub const HUMANS_ENV: &str = "SETGAME_HUMANS";
pub const HINTS_ENV: &str = "SETGAME_HINTS";
pub const TURN_TIMEOUT_ENV: &str = "SETGAME_TURN_TIMEOUT_MILLIS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
    Cli,
}

/// Where each configuration value came from. Keys are `GameConfig` field
/// names; anything not recorded is a default.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    recorded: BTreeMap<&'static str, ValueSource>,
}

impl ConfigSources {
    pub fn get(&self, key: &str) -> ValueSource {
        self.recorded
            .get(key)
            .copied()
            .unwrap_or(ValueSource::Default)
    }

    fn set(&mut self, key: &'static str, source: ValueSource) {
        self.recorded.insert(key, source);
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: GameConfig,
    pub sources: ConfigSources,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<GameError> for ConfigError {
    fn from(e: GameError) -> Self {
        match e {
            GameError::InvalidConfig(msg) => ConfigError::Invalid(msg),
            other => ConfigError::Invalid(other.to_string()),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read {}: {}", CONFIG_ENV, e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub seed: Option<u64>,
    pub players: Option<usize>,
    pub humans: Option<usize>,
    pub hints: Option<bool>,
    pub deck_size: Option<usize>,
    pub table_size: Option<usize>,
    pub turn_timeout_millis: Option<u64>,
}

/// Defaults, file and environment, validated.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    resolve(&Overrides::default())
}

/// Every layer including `overrides`, validated.
pub fn resolve(overrides: &Overrides) -> Result<ConfigResolved, ConfigError> {
    let mut cfg = GameConfig::default();
    let mut sources = ConfigSources::default();

    if let Some(path) = env_value(CONFIG_ENV) {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        f.apply(&mut cfg, &mut sources);
    }
    apply_env(&mut cfg, &mut sources)?;
    apply_overrides(&mut cfg, &mut sources, overrides);

    cfg.validate()?;
    tracing::debug!(?cfg, "configuration resolved");
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

fn apply_env(cfg: &mut GameConfig, sources: &mut ConfigSources) -> Result<(), ConfigError> {
    if let Some(seed) = env_value(SEED_ENV) {
        cfg.seed = Some(parse_env(SEED_ENV, &seed)?);
        sources.set("seed", ValueSource::Env);
    }
    if let Some(players) = env_value(PLAYERS_ENV) {
        cfg.players = parse_env(PLAYERS_ENV, &players)?;
        sources.set("players", ValueSource::Env);
    }
    if let Some(humans) = env_value(HUMANS_ENV) {
        cfg.human_players = parse_env(HUMANS_ENV, &humans)?;
        sources.set("human_players", ValueSource::Env);
    }
    if let Some(hints) = env_value(HINTS_ENV) {
        cfg.hints = parse_bool(&hints)
            .ok_or_else(|| ConfigError::Invalid(format!("Invalid {}: {}", HINTS_ENV, hints)))?;
        sources.set("hints", ValueSource::Env);
    }
    if let Some(timeout) = env_value(TURN_TIMEOUT_ENV) {
        cfg.turn_timeout_millis = parse_env(TURN_TIMEOUT_ENV, &timeout)?;
        sources.set("turn_timeout_millis", ValueSource::Env);
    }
    Ok(())
}

fn apply_overrides(cfg: &mut GameConfig, sources: &mut ConfigSources, o: &Overrides) {
    if let Some(v) = o.seed {
        cfg.seed = Some(v);
        sources.set("seed", ValueSource::Cli);
    }
    if let Some(v) = o.players {
        cfg.players = v;
        sources.set("players", ValueSource::Cli);
    }
    if let Some(v) = o.humans {
        cfg.human_players = v;
        sources.set("human_players", ValueSource::Cli);
    }
    if let Some(v) = o.hints {
        cfg.hints = v;
        sources.set("hints", ValueSource::Cli);
    }
    if let Some(v) = o.deck_size {
        cfg.deck_size = v;
        sources.set("deck_size", ValueSource::Cli);
    }
    if let Some(v) = o.table_size {
        cfg.table_size = v;
        sources.set("table_size", ValueSource::Cli);
    }
    if let Some(v) = o.turn_timeout_millis {
        cfg.turn_timeout_millis = v;
        sources.set("turn_timeout_millis", ValueSource::Cli);
    }
}

macro_rules! take_from_file {
    ($file:expr, $cfg:expr, $sources:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(v) = $file.$field {
                $cfg.$field = v;
                $sources.set(stringify!($field), ValueSource::File);
            }
        )+
    };
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    players: Option<usize>,
    human_players: Option<usize>,
    table_size: Option<usize>,
    deck_size: Option<usize>,
    feature_count: Option<usize>,
    feature_size: Option<usize>,
    turn_timeout_millis: Option<u64>,
    turn_timeout_warning_millis: Option<u64>,
    point_freeze_millis: Option<u64>,
    penalty_freeze_millis: Option<u64>,
    table_delay_millis: Option<u64>,
    hints: Option<bool>,
    bot_pace_millis: Option<u64>,
    input_queue_capacity: Option<usize>,
    seed: Option<u64>,
}

impl FileConfig {
    fn apply(self, cfg: &mut GameConfig, sources: &mut ConfigSources) {
        take_from_file!(
            self,
            cfg,
            sources,
            players,
            human_players,
            table_size,
            deck_size,
            feature_count,
            feature_size,
            turn_timeout_millis,
            turn_timeout_warning_millis,
            point_freeze_millis,
            penalty_freeze_millis,
            table_delay_millis,
            hints,
            bot_pace_millis,
            input_queue_capacity,
        );
        if let Some(seed) = self.seed {
            cfg.seed = Some(seed);
            sources.set("seed", ValueSource::File);
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("Invalid {}: {}", key, raw)))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
