//! # Zoo Chess state engine
//!
//! Game and tutorial state for a chess learning board. The crate sits between the user
//! interface and a rules engine: it turns drag gestures into validated moves, keeps the game
//! state and its move history, builds single-piece practice positions and encodes positions
//! into shareable links.
//!
//! Legal move generation and check detection are delegated to a [`RulesEngine`]. The default
//! one, [`OwlEngine`], is backed by the `owlchess` crate.
//!
//! # Example
//!
//! ```
//! use zoochess::{Attempt, GameSession, GameStatus, MoveProposal};
//!
//! let mut session = GameSession::new().unwrap();
//! let res = session.make_move("e2e4".parse::<MoveProposal>().unwrap());
//! assert_eq!(res, Attempt::Accepted(GameStatus::Normal));
//! assert_eq!(session.move_log(), ["e4"]);
//! assert!(session.undo());
//! assert!(session.move_log().is_empty());
//! ```

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod owl;
pub mod proposal;
pub mod sandbox;
pub mod session;
pub mod share;
pub mod tutorial;

pub use config::{Config, ConfigError};
pub use controller::{Controller, Event, Frame, Mode};
pub use engine::{EngineError, LegalMove, MoveRecord, RulesEngine};
pub use error::{Error, Result};
pub use ledger::{Ledger, MovePair};
pub use owl::OwlEngine;
pub use proposal::{Attempt, MovePipeline, MoveProposal, Playable, Rejection};
pub use sandbox::{Sandbox, SandboxState};
pub use session::{GameSession, GameStatus, LastMove};
pub use tutorial::{TutorialDefinition, TUTORIALS};

pub use zoochess_base as base;
