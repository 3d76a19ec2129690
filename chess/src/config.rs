//! Configuration

use crate::tutorial::{self, TutorialDefinition};

use zoochess_base::{Color, FenParseError, Position, INITIAL_FEN};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::path::Path;
use std::time::Duration;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bad start position: {0}")]
    StartFen(#[from] FenParseError),
    #[error("unknown default tutorial {0:?}")]
    UnknownTutorial(String),
}

/// Side practiced in tutorials
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Learner {
    #[default]
    White,
    Black,
}

impl From<Learner> for Color {
    fn from(l: Learner) -> Color {
        match l {
            Learner::White => Color::White,
            Learner::Black => Color::Black,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How long the illegal move notice stays visible, in milliseconds
    pub notice_timeout_ms: u64,
    /// Position of a new game
    pub start_fen: String,
    /// Tutorial shown when entering tutorial mode
    pub default_tutorial: String,
    /// Side practicing in tutorials; tutorial boards are mirrored for Black
    pub learner: Learner,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            notice_timeout_ms: 2000,
            start_fen: INITIAL_FEN.to_string(),
            default_tutorial: "p".to_string(),
            learner: Learner::White,
        }
    }
}

impl Config {
    /// Parses and validates the config from JSON
    ///
    /// Missing fields take their default values.
    pub fn from_json(s: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.start_position()?;
        self.tutorial()?;
        Ok(())
    }

    pub fn notice_timeout(&self) -> Duration {
        Duration::from_millis(self.notice_timeout_ms)
    }

    pub fn start_position(&self) -> Result<Position, FenParseError> {
        Position::from_fen(&self.start_fen)
    }

    pub fn tutorial(&self) -> Result<&'static TutorialDefinition, ConfigError> {
        tutorial::find(&self.default_tutorial)
            .ok_or_else(|| ConfigError::UnknownTutorial(self.default_tutorial.clone()))
    }

    pub fn learner(&self) -> Color {
        self.learner.into()
    }
}
