//! Move proposal pipeline
//!
//! Turns a drag gesture (pick a piece up, drop it somewhere) into a validated move against the
//! active board, which is either a full game or a practice sandbox.

use crate::engine::EngineError;
use crate::error::Error;
use crate::session::GameStatus;

use zoochess_base::{geometry, Board, PieceKind, Position, Square, SquareSet};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing a [`MoveProposal`] from UCI-like notation
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ProposalParseError {
    #[error("invalid string length")]
    BadLength,
    #[error("bad square: {0}")]
    Square(#[from] zoochess_base::types::SquareParseError),
    #[error("bad promotion char {0:?}")]
    Promotion(char),
}

/// Move requested by the player
///
/// A proposal is transient: it lives only until the active board accepts or rejects it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MoveProposal {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl MoveProposal {
    pub fn new(from: Square, to: Square) -> MoveProposal {
        MoveProposal {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(self, kind: PieceKind) -> MoveProposal {
        MoveProposal {
            promotion: Some(kind),
            ..self
        }
    }

    /// Fills in the promotion piece if the move takes a pawn to its last rank
    ///
    /// There is no promotion choice, pawns always become queens unless the proposal already
    /// says otherwise.
    pub fn with_default_promotion(self, board: &Board) -> MoveProposal {
        if self.promotion.is_some() {
            return self;
        }
        match board.get(self.from) {
            Some(piece)
                if piece.kind == PieceKind::Pawn
                    && self.to.rank() == geometry::promotion_rank(piece.color) =>
            {
                self.with_promotion(PieceKind::Queen)
            }
            _ => self,
        }
    }
}

impl fmt::Display for MoveProposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind)?;
        }
        Ok(())
    }
}

impl FromStr for MoveProposal {
    type Err = ProposalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(ProposalParseError::BadLength);
        }
        let from = Square::from_str(&s[0..2])?;
        let to = Square::from_str(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => match PieceKind::from_char(c) {
                Some(kind) if !matches!(kind, PieceKind::Pawn | PieceKind::King) => Some(kind),
                _ => return Err(ProposalParseError::Promotion(c)),
            },
        };
        Ok(MoveProposal {
            from,
            to,
            promotion,
        })
    }
}

/// Reason for rejecting a proposal
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum Rejection {
    /// The piece was dropped back on its own square
    #[error("piece dropped on its own square")]
    SameSquare,
    /// There is nothing to play on
    #[error("no practice position is loaded")]
    Inactive,
    /// The rules engine refused the move
    #[error(transparent)]
    Illegal(EngineError),
    /// The move was legal, but the practice position could not be rebuilt after it
    #[error("cannot rebuild practice position: {0}")]
    Resync(Error),
}

/// Result of a move attempt
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Attempt {
    Accepted(GameStatus),
    Rejected(Rejection),
}

impl Attempt {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Attempt::Accepted(_))
    }
}

/// Board the player can make moves on
pub trait Playable {
    /// Position as shown to the player
    fn position(&self) -> &Position;

    /// Squares where the piece on `from` can legally go
    fn legal_destinations(&self, from: Square) -> SquareSet;

    /// Validates and applies the move
    ///
    /// On rejection, the state is left unchanged.
    fn play(&mut self, proposal: MoveProposal) -> Attempt;
}

/// Tracks the gesture in progress and the legal destinations highlighted for it
///
/// Only one gesture can be in progress at a time. Starting a new one replaces the previous
/// highlight set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MovePipeline {
    source: Option<Square>,
    highlights: SquareSet,
}

impl MovePipeline {
    pub fn new() -> MovePipeline {
        MovePipeline::default()
    }

    /// Starts a gesture from `sq`, returning the legal destinations
    ///
    /// The destinations are remembered as the highlight set.
    pub fn propose_source<P: Playable + ?Sized>(&mut self, target: &P, sq: Square) -> SquareSet {
        self.source = Some(sq);
        self.highlights = target.legal_destinations(sq);
        self.highlights
    }

    /// Finishes the gesture by attempting the move
    ///
    /// The highlight set is cleared whatever the outcome is.
    pub fn attempt<P: Playable + ?Sized>(
        &mut self,
        target: &mut P,
        proposal: MoveProposal,
    ) -> Attempt {
        let res = target.play(proposal);
        self.cancel();
        res
    }

    /// Abandons the gesture, e.g. when a piece is released outside of the board
    pub fn cancel(&mut self) {
        self.source = None;
        self.highlights = SquareSet::EMPTY;
    }

    pub fn source(&self) -> Option<Square> {
        self.source
    }

    pub fn highlights(&self) -> SquareSet {
        self.highlights
    }
}
