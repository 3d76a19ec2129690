//! # Base types for zoochess
//!
//! Value types shared by the `zoochess` state engine: squares, pieces, positions and the FEN
//! codec, plus the anchor surgery that makes king-less practice positions acceptable to a
//! rules engine.
//!
//! Nothing here knows the rules of chess. A [`Position`] may hold any arrangement of pieces.

pub mod anchor;
pub mod geometry;
pub mod position;
pub mod square_set;
pub mod types;

pub use anchor::{AnchorError, Anchored, Anchors};
pub use position::{Board, CellsParseError, FenParseError, Position, PrettyStyle, INITIAL_FEN};
pub use square_set::SquareSet;
pub use types::{CastlingRights, CastlingSide, Color, File, Piece, PieceKind, Rank, Square};
