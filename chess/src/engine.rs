//! Rules engine interface
//!
//! The state engine never decides by itself whether a move is legal or whether a side is
//! checkmated. It asks a [`RulesEngine`] instead. The default implementation,
//! [`OwlEngine`](crate::owl::OwlEngine), is backed by the `owlchess` crate.

use crate::proposal::MoveProposal;

use zoochess_base::{Board, Color, FenParseError, Piece, PieceKind, Position, Square};

use arrayvec::ArrayVec;
use thiserror::Error;

/// Error reported by a rules engine
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum EngineError {
    /// The position string cannot be parsed
    #[error("cannot parse position: {0}")]
    Fen(#[from] FenParseError),
    /// The position was parsed, but the engine refuses it (e.g. a side has no king)
    #[error("position refused by rules engine: {0}")]
    Refused(String),
    /// The move is not legal in the current position
    #[error("illegal move {0}")]
    IllegalMove(MoveProposal),
}

/// Legal move as reported by [`RulesEngine::moves_from()`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LegalMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

/// Legal moves from a single square
///
/// A queen in the middle of an empty board has 27 moves, and a pawn about to promote has at
/// most 12, so the capacity is never exceeded.
pub type MoveList = ArrayVec<LegalMove, 32>;

/// Move accepted by a rules engine
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
    /// Move in Standard Algebraic Notation, with check and mate marks
    pub san: String,
}

/// Legal move generator and rules enforcer
///
/// Each instance holds one mutable position. Instances are never shared: a session owns its
/// engine exclusively and replaces it with a fresh one on reset or undo. A clone is an
/// independent engine with the same position and history.
pub trait RulesEngine: Clone {
    /// Creates an engine from `fen`
    ///
    /// Fails if the position is malformed or is not acceptable by the rules of chess (for
    /// example, if one of the sides has no king).
    fn construct(fen: &str) -> Result<Self, EngineError>;

    /// Creates an engine from an already parsed position
    fn from_position(position: &Position) -> Result<Self, EngineError> {
        Self::construct(&position.as_fen())
    }

    /// Returns the current position in FEN
    fn fen(&self) -> String;

    /// Returns the current position
    fn position(&self) -> Position;

    /// Returns the contents of the board
    fn board(&self) -> Board {
        self.position().board
    }

    /// Returns the side to move
    fn turn(&self) -> Color;

    /// Returns all the legal moves of the piece standing on `from`
    ///
    /// The list is empty if there is no piece on `from`, if it belongs to the side which is not
    /// on move, or if it cannot move at all.
    fn moves_from(&self, from: Square) -> MoveList;

    /// Makes a move, returning its record
    ///
    /// The position is left unchanged if the move is illegal.
    fn make_move(&mut self, proposal: &MoveProposal) -> Result<MoveRecord, EngineError>;

    /// Takes back the last move made with [`RulesEngine::make_move()`]
    fn undo(&mut self) -> Option<MoveRecord>;

    fn is_check(&self) -> bool;

    fn is_checkmate(&self) -> bool;

    /// Returns `true` on stalemate, insufficient material, the 50-move rule or threefold
    /// repetition
    fn is_draw(&self) -> bool;

    /// Returns the moves made on this instance, in SAN
    fn history(&self) -> Vec<String>;

    /// Removes the piece on `sq`
    ///
    /// Fails if the resulting position is not acceptable (e.g. when removing a king). In this
    /// case, the position is left unchanged.
    fn remove(&mut self, sq: Square) -> Result<Option<Piece>, EngineError>;
}
