use crate::engine::EngineError;

use zoochess_base::{AnchorError, FenParseError};

use thiserror::Error;

/// Error of the state engine
///
/// None of these is fatal: whoever gets one keeps the last known-good position.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum Error {
    /// A position string (from a shared link or tutorial data) cannot be parsed
    #[error("malformed position: {0}")]
    MalformedPosition(#[from] FenParseError),
    /// The rules engine refused a position or a move
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// Anchor kings cannot be placed or removed
    #[error(transparent)]
    Anchor(#[from] AnchorError),
    /// There is no tutorial with the given id
    #[error("unknown tutorial {0:?}")]
    UnknownTutorial(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
