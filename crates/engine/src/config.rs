//! Engine configuration
//!
//! Values come from defaults, a JSON document, or `TILE_CASCADE_*`
//! environment variables:
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `TILE_CASCADE_DIFFICULTY` | `game.difficulty` | `casual` |
//! | `TILE_CASCADE_SEED` | `game.seed` | `1` |
//! | `TILE_CASCADE_HINT_DELAY_MS` | `hint_delay_ms` | `5000` |
//! | `TILE_CASCADE_ANIMATE` | `animate` | `true` |
//! | `TILE_CASCADE_BACKGROUND_HINTS` | `background_hints` | `false` |

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::GameConfig;
use crate::types::{Difficulty, DEFAULT_HINT_DELAY_MS};

pub const ENV_DIFFICULTY: &str = "TILE_CASCADE_DIFFICULTY";
pub const ENV_SEED: &str = "TILE_CASCADE_SEED";
pub const ENV_HINT_DELAY_MS: &str = "TILE_CASCADE_HINT_DELAY_MS";
pub const ENV_ANIMATE: &str = "TILE_CASCADE_ANIMATE";
pub const ENV_BACKGROUND_HINTS: &str = "TILE_CASCADE_BACKGROUND_HINTS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error from serde_json in engine config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown difficulty [{0}]")]
    UnknownDifficulty(String),
    #[error("invalid value [{value}] for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Config for the first run (and for restarts without an explicit one)
    pub game: GameConfig,
    /// Idle time before `on_hint` fires
    pub hint_delay_ms: u32,
    /// Honour per-phase delays in `tick`; otherwise chains resolve at once
    pub animate: bool,
    /// Scan for hints on the background worker instead of inline
    pub background_hints: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::new(Difficulty::Casual, 1),
            hint_delay_ms: DEFAULT_HINT_DELAY_MS,
            animate: true,
            background_hints: false,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    }
}

impl EngineConfig {
    /// Load from the process environment.
    ///
    /// Missing variables keep their defaults; invalid ones are logged and
    /// also keep their defaults.
    pub fn from_env() -> Self {
        let (config, errors) = Self::from_vars(|key| std::env::var(key).ok());
        for err in errors {
            warn!("ignoring engine config value: {}", err);
        }
        config
    }

    /// Build a config from any key lookup, collecting every invalid value
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<ConfigError>) {
        let mut config = Self::default();
        let mut errors = Vec::new();

        if let Some(value) = lookup(ENV_DIFFICULTY) {
            match Difficulty::from_str(&value) {
                Some(difficulty) => config.game.difficulty = difficulty,
                None => errors.push(ConfigError::UnknownDifficulty(value)),
            }
        }
        if let Some(value) = lookup(ENV_SEED) {
            match value.trim().parse() {
                Ok(seed) => config.game.seed = seed,
                Err(_) => errors.push(invalid(ENV_SEED, &value)),
            }
        }
        if let Some(value) = lookup(ENV_HINT_DELAY_MS) {
            match value.trim().parse() {
                Ok(ms) => config.hint_delay_ms = ms,
                Err(_) => errors.push(invalid(ENV_HINT_DELAY_MS, &value)),
            }
        }
        if let Some(value) = lookup(ENV_ANIMATE) {
            match parse_flag(&value) {
                Some(flag) => config.animate = flag,
                None => errors.push(invalid(ENV_ANIMATE, &value)),
            }
        }
        if let Some(value) = lookup(ENV_BACKGROUND_HINTS) {
            match parse_flag(&value) {
                Some(flag) => config.background_hints = flag,
                None => errors.push(invalid(ENV_BACKGROUND_HINTS, &value)),
            }
        }

        (config, errors)
    }

    /// Parse a JSON document; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
