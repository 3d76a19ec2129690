//! Anchor kings
//!
//! Rules engines refuse positions in which a side has no king. Practice positions often have
//! none, so a king is placed on some empty square to make the position acceptable. Such kings
//! are called anchors: they are synthetic, are never shown to the player and are removed again
//! before the position is edited or displayed.

use crate::position::Position;
use crate::square_set::SquareSet;
use crate::types::{Color, Piece, Square};

use thiserror::Error;

#[derive(Debug, Copy, Clone, Error, Eq, PartialEq)]
pub enum AnchorError {
    /// There is no empty square to put the anchor on
    #[error("no empty square for the {} anchor king", .0.name())]
    BoardFull(Color),
    /// There are empty squares, but none of them is an acceptable anchor square
    #[error("no acceptable square for the {} anchor king", .0.name())]
    Unplaceable(Color),
    /// A recorded anchor square holds a piece other than the anchor
    #[error("anchor square {square} holds {found} instead of an anchor king")]
    InconsistentSandbox { square: Square, found: Piece },
}

/// Record of the squares holding anchor kings, at most one per color
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Anchors([Option<Square>; 2]);

impl Anchors {
    pub const NONE: Anchors = Anchors([None; 2]);

    #[inline]
    pub fn get(&self, color: Color) -> Option<Square> {
        self.0[color.index()]
    }

    #[inline]
    pub fn set(&mut self, color: Color, sq: Square) {
        self.0[color.index()] = Some(sq);
    }

    #[inline]
    pub fn clear(&mut self, color: Color) {
        self.0[color.index()] = None;
    }

    /// Drops the record for `sq`, if any
    pub fn forget(&mut self, sq: Square) {
        for slot in &mut self.0 {
            if *slot == Some(sq) {
                *slot = None;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Color, Square)> + '_ {
        Color::BOTH
            .into_iter()
            .filter_map(move |c| self.get(c).map(|sq| (c, sq)))
    }

    pub fn squares(&self) -> SquareSet {
        self.iter().map(|(_, sq)| sq).collect()
    }

    /// Merges `other` into `self`; records from `other` take precedence
    pub fn merge(&mut self, other: Anchors) {
        for (color, sq) in other.iter() {
            self.set(color, sq);
        }
    }
}

/// Position with anchors placed, together with the record of the placed anchors
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Anchored {
    pub position: Position,
    pub anchors: Anchors,
}

/// Inserts an anchor king for each color in `required` which has no king
///
/// Each anchor goes to the first empty square found by scanning ranks from 8 down to 1, and
/// files from a to h. Existing pieces are never displaced. If every required color already has
/// a king, the position is returned unchanged and no anchors are recorded.
///
/// # Example
///
/// ```
/// # use zoochess_base::{anchor, Color, Position};
/// #
/// let pos = Position::from_fen("8/8/8/8/8/8/4P3/8 w - - 0 1").unwrap();
/// let res = anchor::ensure_anchors(&pos, &[Color::White, Color::Black]).unwrap();
/// assert_eq!(res.position.as_fen(), "Kk6/8/8/8/8/8/4P3/8 w - - 0 1");
/// ```
pub fn ensure_anchors(position: &Position, required: &[Color]) -> Result<Anchored, AnchorError> {
    ensure_anchors_by(position, required, |_| true)
}

/// Same as [`ensure_anchors()`], but only accepts placements for which `accept` returns `true`
///
/// Candidate placements are tried in scan order, the first required color varying slowest.
/// `accept` sees the complete candidate position, with all the anchors placed.
pub fn ensure_anchors_by<F>(
    position: &Position,
    required: &[Color],
    mut accept: F,
) -> Result<Anchored, AnchorError>
where
    F: FnMut(&Position) -> bool,
{
    let mut missing = Vec::with_capacity(2);
    for &color in required {
        if !position.board.has_king(color) && !missing.contains(&color) {
            missing.push(color);
        }
    }

    let mut candidate = *position;
    let mut anchors = Anchors::NONE;
    if missing.is_empty() {
        return if accept(&candidate) {
            Ok(Anchored {
                position: candidate,
                anchors,
            })
        } else {
            Err(AnchorError::Unplaceable(required.first().copied().unwrap_or(Color::White)))
        };
    }

    let free = position.board.empty_squares().len() as usize;
    if free < missing.len() {
        return Err(AnchorError::BoardFull(missing[free]));
    }

    if place(&mut candidate, &mut anchors, &missing, &mut accept) {
        Ok(Anchored {
            position: candidate,
            anchors,
        })
    } else {
        Err(AnchorError::Unplaceable(missing[0]))
    }
}

fn place<F>(pos: &mut Position, anchors: &mut Anchors, missing: &[Color], accept: &mut F) -> bool
where
    F: FnMut(&Position) -> bool,
{
    let Some((&color, rest)) = missing.split_first() else {
        return accept(pos);
    };
    for sq in pos.board.empty_squares() {
        pos.board.put(sq, Some(Piece::king(color)));
        anchors.set(color, sq);
        if place(pos, anchors, rest, accept) {
            return true;
        }
        pos.board.put(sq, None);
        anchors.clear(color);
    }
    false
}

/// Removes the anchors recorded in `anchors`
///
/// A recorded square that is already empty is skipped, as the anchor is gone anyway. A recorded
/// square holding anything but the anchor king of its color is reported as
/// [`AnchorError::InconsistentSandbox`], and the position is not modified.
pub fn strip_anchors(position: &Position, anchors: &Anchors) -> Result<Position, AnchorError> {
    let mut res = *position;
    for (color, sq) in anchors.iter() {
        match res.board.get(sq) {
            None => {}
            Some(piece) if piece == Piece::king(color) => {
                res.board.put(sq, None);
            }
            Some(found) => return Err(AnchorError::InconsistentSandbox { square: sq, found }),
        }
    }
    Ok(res)
}

/// Returns the position as the player should see it, with anchors hidden
pub fn visible(position: &Position, anchors: &Anchors) -> Position {
    Position {
        board: position.board.without(anchors.squares()),
        ..*position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{File, PieceKind, Rank};

    const BOTH: [Color; 2] = [Color::White, Color::Black];

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_insert_scan_order() {
        let pos = Position::from_fen("8/8/8/8/8/8/4P3/8 w - - 0 1").unwrap();
        let res = ensure_anchors(&pos, &BOTH).unwrap();
        assert_eq!(res.anchors.get(Color::White), Some(sq("a8")));
        assert_eq!(res.anchors.get(Color::Black), Some(sq("b8")));
        assert_eq!(res.position.as_fen(), "Kk6/8/8/8/8/8/4P3/8 w - - 0 1");

        let pos = Position::from_fen("RN6/8/8/8/8/8/8/8 w - - 0 1").unwrap();
        let res = ensure_anchors(&pos, &[Color::Black]).unwrap();
        assert_eq!(res.anchors.get(Color::Black), Some(sq("c8")));
        assert_eq!(res.anchors.get(Color::White), None);
    }

    #[test]
    fn test_idempotent() {
        let pos = Position::from_fen("8/8/8/3Q4/8/8/8/8 w - - 0 1").unwrap();
        let once = ensure_anchors(&pos, &BOTH).unwrap();
        let twice = ensure_anchors(&once.position, &BOTH).unwrap();
        assert_eq!(twice.position, once.position);
        assert!(twice.anchors.is_empty());

        let with_kings = Position::from_fen("7k/8/8/8/8/8/4P3/K7 w - - 0 1").unwrap();
        let res = ensure_anchors(&with_kings, &BOTH).unwrap();
        assert_eq!(res.position, with_kings);
        assert!(res.anchors.is_empty());
    }

    #[test]
    fn test_board_full() {
        let full = "pppppppp/pppppppp/pppppppp/pppppppp/pppppppp/pppppppp/pppppppp/pppppppp w - - 0 1";
        let pos = Position::from_fen(full).unwrap();
        assert_eq!(
            ensure_anchors(&pos, &BOTH),
            Err(AnchorError::BoardFull(Color::White))
        );

        let one_free = "1ppppppp/pppppppp/pppppppp/pppppppp/pppppppp/pppppppp/pppppppp/pppppppp w - - 0 1";
        let pos = Position::from_fen(one_free).unwrap();
        assert_eq!(
            ensure_anchors(&pos, &BOTH),
            Err(AnchorError::BoardFull(Color::Black))
        );
        let res = ensure_anchors(&pos, &[Color::White]).unwrap();
        assert_eq!(res.anchors.get(Color::White), Some(sq("a8")));
    }

    #[test]
    fn test_predicate() {
        let pos = Position::from_fen("8/8/8/8/8/8/4P3/8 w - - 0 1").unwrap();
        // Reject kings standing next to each other
        let res = ensure_anchors_by(&pos, &BOTH, |p| {
            let w = p.board.squares_of(Piece::king(Color::White)).iter().next();
            let b = p.board.squares_of(Piece::king(Color::Black)).iter().next();
            match (w, b) {
                (Some(w), Some(b)) => {
                    let df = (w.file().index() as i32 - b.file().index() as i32).abs();
                    let dr = (w.rank().index() as i32 - b.rank().index() as i32).abs();
                    df.max(dr) > 1
                }
                _ => false,
            }
        })
        .unwrap();
        assert_eq!(res.anchors.get(Color::White), Some(sq("a8")));
        assert_eq!(res.anchors.get(Color::Black), Some(sq("c8")));

        assert_eq!(
            ensure_anchors_by(&pos, &BOTH, |_| false),
            Err(AnchorError::Unplaceable(Color::White))
        );
    }

    #[test]
    fn test_strip_restores_material() {
        let pos = Position::from_fen("8/8/8/8/8/8/4P3/8 w - - 0 1").unwrap();
        let res = ensure_anchors(&pos, &BOTH).unwrap();

        // A move which doesn't touch the anchors
        let mut moved = res.position;
        moved.board.put(sq("e2"), None);
        moved.board.put(
            Square::from_parts(File::E, Rank::R4),
            Some(Piece::new(Color::White, PieceKind::Pawn)),
        );
        moved.side = Color::Black;

        let stripped = strip_anchors(&moved, &res.anchors).unwrap();
        assert_eq!(stripped.as_fen(), "8/8/8/8/4P3/8/8/8 b - - 0 1");
        assert_eq!(strip_anchors(&res.position, &res.anchors).unwrap(), pos);
    }

    #[test]
    fn test_strip_inconsistent() {
        let pos = Position::from_fen("Kk6/8/8/8/8/8/4P3/8 w - - 0 1").unwrap();
        let mut anchors = Anchors::NONE;
        anchors.set(Color::White, sq("a8"));
        anchors.set(Color::Black, sq("b8"));

        // Already gone: skipped
        let mut gone = pos;
        gone.board.put(sq("b8"), None);
        assert_eq!(
            strip_anchors(&gone, &anchors).unwrap().as_fen(),
            "8/8/8/8/8/8/4P3/8 w - - 0 1"
        );

        // Replaced by a foreign piece: reported
        let mut replaced = pos;
        replaced.board.put(sq("b8"), Some(Piece::new(Color::White, PieceKind::Rook)));
        assert_eq!(
            strip_anchors(&replaced, &anchors),
            Err(AnchorError::InconsistentSandbox {
                square: sq("b8"),
                found: Piece::new(Color::White, PieceKind::Rook),
            })
        );

        anchors.forget(sq("b8"));
        assert_eq!(
            strip_anchors(&replaced, &anchors).unwrap().as_fen(),
            "1R6/8/8/8/8/8/4P3/8 w - - 0 1"
        );
    }

    #[test]
    fn test_visible() {
        let pos = Position::from_fen("7k/8/8/8/8/8/4P3/K7 w - - 0 1").unwrap();
        let mut anchors = Anchors::NONE;
        anchors.set(Color::White, sq("a1"));
        anchors.set(Color::Black, sq("h8"));
        let shown = visible(&pos, &anchors);
        assert_eq!(shown.as_fen(), "8/8/8/8/8/8/4P3/8 w - - 0 1");
        assert_eq!(pos.board.occupied().len(), 3);
    }
}
