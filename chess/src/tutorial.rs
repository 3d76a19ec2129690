//! Tutorial catalog

use crate::error::{Error, Result};

use zoochess_base::{Color, FenParseError, PieceKind, Position};

use serde::Serialize;

/// Practice lesson for a single piece kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TutorialDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    #[serde(rename = "fen")]
    pub base_fen: &'static str,
    #[serde(skip)]
    pub piece: PieceKind,
}

impl TutorialDefinition {
    pub fn base_position(&self) -> Result<Position, FenParseError> {
        Position::from_fen(self.base_fen)
    }

    /// Base position with the practice piece owned by `learner`
    ///
    /// Base positions are written for White. For Black, the board is mirrored and the colors
    /// are swapped.
    pub fn base_position_for(&self, learner: Color) -> Result<Position, FenParseError> {
        let base = self.base_position()?;
        Ok(match learner {
            Color::White => base,
            Color::Black => base.flipped(),
        })
    }
}

pub static TUTORIALS: [TutorialDefinition; 6] = [
    TutorialDefinition {
        id: "p",
        title: "Pawn",
        description: "Pawns move forward one square, but capture diagonally. On their first \
                      move, they can move two squares!",
        base_fen: "7k/8/8/8/8/8/4P3/K7 w - - 0 1",
        piece: PieceKind::Pawn,
    },
    TutorialDefinition {
        id: "r",
        title: "Rook",
        description: "Rooks move in straight lines: forward, backward, left, or right, as far \
                      as they want.",
        base_fen: "7k/8/8/8/3R4/8/8/K7 w - - 0 1",
        piece: PieceKind::Rook,
    },
    TutorialDefinition {
        id: "n",
        title: "Knight",
        description: "Knights move in an 'L' shape: two squares in one direction and then one \
                      square to the side. They can jump over other pieces!",
        base_fen: "7k/8/8/8/3N4/8/8/K7 w - - 0 1",
        piece: PieceKind::Knight,
    },
    TutorialDefinition {
        id: "b",
        title: "Bishop",
        description: "Bishops move diagonally as far as they want. They always stay on the \
                      same color squares.",
        base_fen: "7k/8/8/8/3B4/8/8/K7 w - - 0 1",
        piece: PieceKind::Bishop,
    },
    TutorialDefinition {
        id: "q",
        title: "Queen",
        description: "The Queen is the most powerful piece! She can move like a Rook and a \
                      Bishop combined.",
        base_fen: "7k/8/8/8/3Q4/8/8/K7 w - - 0 1",
        piece: PieceKind::Queen,
    },
    TutorialDefinition {
        id: "k",
        title: "King",
        description: "The King moves one square in any direction. Keep him safe!",
        base_fen: "7k/8/8/8/3K4/8/8/8 w - - 0 1",
        piece: PieceKind::King,
    },
];

pub fn find(id: &str) -> Option<&'static TutorialDefinition> {
    TUTORIALS.iter().find(|t| t.id == id)
}

/// Same as [`find()`], but fails with [`Error::UnknownTutorial`]
pub fn lookup(id: &str) -> Result<&'static TutorialDefinition> {
    find(id).ok_or_else(|| Error::UnknownTutorial(id.to_string()))
}
