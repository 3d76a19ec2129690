//! Game session

use crate::engine::RulesEngine;
use crate::error::Result;
use crate::ledger::{self, MovePair};
use crate::owl::OwlEngine;
use crate::proposal::{Attempt, MoveProposal, Playable, Rejection};

use zoochess_base::{Position, Square, SquareSet};

use serde::Serialize;
use tracing::{debug, warn};

/// Game status, as reported by the rules engine after the last mutation
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Normal,
    Check,
    Checkmate,
    Draw,
}

impl GameStatus {
    /// Queries `engine` for the status of its current position
    pub fn of<E: RulesEngine>(engine: &E) -> GameStatus {
        if engine.is_checkmate() {
            GameStatus::Checkmate
        } else if engine.is_draw() {
            GameStatus::Draw
        } else if engine.is_check() {
            GameStatus::Check
        } else {
            GameStatus::Normal
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Draw)
    }
}

/// Source and destination of a move, used to highlight the last move made
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LastMove {
    pub from: Square,
    pub to: Square,
}

#[derive(Debug, Clone)]
struct Taken {
    position: Position,
    last_move: Option<LastMove>,
}

/// One independent game
///
/// A session owns its rules engine exclusively. After each accepted move it keeps a value copy
/// of the new position, the status and the move log, all updated together. Undo and reset
/// never rewind the engine in place: they build a fresh engine from a recorded position.
#[derive(Debug, Clone)]
pub struct GameSession<E: RulesEngine = OwlEngine> {
    engine: E,
    snapshot: Position,
    status: GameStatus,
    move_log: Vec<String>,
    taken: Vec<Taken>,
    last_move: Option<LastMove>,
}

impl GameSession<OwlEngine> {
    /// Starts a game from the standard starting position
    pub fn new() -> Result<Self> {
        Self::with_position(&Position::initial())
    }
}

impl<E: RulesEngine> GameSession<E> {
    /// Starts a game from `position`
    ///
    /// Fails if the rules engine refuses the position.
    pub fn with_position(position: &Position) -> Result<Self> {
        let engine = E::from_position(position)?;
        Ok(Self::with_engine(engine))
    }

    fn with_engine(engine: E) -> Self {
        GameSession {
            snapshot: engine.position(),
            status: GameStatus::of(&engine),
            engine,
            move_log: Vec::new(),
            taken: Vec::new(),
            last_move: None,
        }
    }

    /// Current position
    pub fn position(&self) -> &Position {
        &self.snapshot
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Moves made so far, in SAN
    pub fn move_log(&self) -> &[String] {
        &self.move_log
    }

    pub fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Move log grouped into rows of White's and Black's moves
    pub fn history_pairs(&self) -> Vec<MovePair> {
        ledger::history_pairs(&self.move_log)
    }

    pub fn legal_destinations(&self, from: Square) -> SquareSet {
        self.engine.moves_from(from).iter().map(|mv| mv.to).collect()
    }

    /// Validates the move with the rules engine and applies it
    ///
    /// A pawn reaching the last rank becomes a queen unless `proposal` says otherwise.
    pub fn make_move(&mut self, proposal: MoveProposal) -> Attempt {
        if proposal.from == proposal.to {
            return Attempt::Rejected(Rejection::SameSquare);
        }
        let proposal = proposal.with_default_promotion(&self.snapshot.board);
        let record = match self.engine.make_move(&proposal) {
            Ok(record) => record,
            Err(e) => {
                debug!(%proposal, error = %e, "move rejected");
                return Attempt::Rejected(Rejection::Illegal(e));
            }
        };

        let snapshot = self.engine.position();
        let status = GameStatus::of(&self.engine);
        debug!(%proposal, san = %record.san, ?status, "move accepted");

        self.taken.push(Taken {
            position: self.snapshot,
            last_move: self.last_move,
        });
        self.move_log.push(record.san);
        self.snapshot = snapshot;
        self.status = status;
        self.last_move = Some(LastMove {
            from: record.from,
            to: record.to,
        });
        Attempt::Accepted(status)
    }

    /// Takes back the last move
    ///
    /// Returns `false` and does nothing if no moves were made. Taken back moves cannot be
    /// redone.
    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.taken.last() else {
            return false;
        };
        let engine = match E::from_position(&prev.position) {
            Ok(engine) => engine,
            Err(e) => {
                warn!(error = %e, "cannot rebuild engine for undo");
                return false;
            }
        };
        let prev = self.taken.pop().map(|t| t.last_move).unwrap_or_default();
        self.move_log.pop();
        self.snapshot = engine.position();
        self.status = GameStatus::of(&engine);
        self.engine = engine;
        self.last_move = prev;
        true
    }

    /// Replaces the whole session with a new game from `position`, or from the standard
    /// starting position if `position` is `None`
    ///
    /// On failure, the session is left unchanged.
    pub fn reset(&mut self, position: Option<&Position>) -> Result<()> {
        let position = position.copied().unwrap_or_else(Position::initial);
        *self = Self::with_position(&position)?;
        Ok(())
    }

    /// Replaces the engine with a fresh one from `position`, keeping the move log and the
    /// undo records
    pub(crate) fn rebase(&mut self, position: &Position) -> Result<()> {
        let engine = E::from_position(position)?;
        self.snapshot = engine.position();
        self.status = GameStatus::of(&engine);
        self.engine = engine;
        Ok(())
    }
}

impl<E: RulesEngine> Playable for GameSession<E> {
    fn position(&self) -> &Position {
        &self.snapshot
    }

    fn legal_destinations(&self, from: Square) -> SquareSet {
        GameSession::legal_destinations(self, from)
    }

    fn play(&mut self, proposal: MoveProposal) -> Attempt {
        self.make_move(proposal)
    }
}
