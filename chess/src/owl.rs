//! Rules engine backed by `owlchess`

use crate::engine::{EngineError, LegalMove, MoveList, MoveRecord, RulesEngine};
use crate::proposal::MoveProposal;

use zoochess_base::{Color, Piece, PieceKind, Position, Square};

use owlchess::movegen::legal;
use owlchess::{Board, Coord, Move, Piece as OwlPiece};

use std::collections::HashMap;

/// Counts how many times each position occured, for threefold repetition
///
/// Two positions are the same if they have the same pieces, side to move, castling rights and
/// en passant target. Move counters are ignored.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
struct Repeat(HashMap<String, usize>);

impl Repeat {
    fn key(p: &Position) -> String {
        let mut key = p.as_fen();
        // Cut off both move counters
        for _ in 0..2 {
            if let Some(pos) = key.rfind(' ') {
                key.truncate(pos);
            }
        }
        key
    }

    fn push(&mut self, p: &Position) {
        *self.0.entry(Self::key(p)).or_insert(0) += 1;
    }

    fn pop(&mut self, p: &Position) {
        let key = Self::key(p);
        if let Some(r) = self.0.get_mut(&key) {
            *r -= 1;
            if *r == 0 {
                self.0.remove(&key);
            }
        }
    }

    fn count(&self, p: &Position) -> usize {
        *self.0.get(&Self::key(p)).unwrap_or(&0)
    }
}

#[derive(Debug, Clone)]
struct Undo {
    board: Board,
    position: Position,
    record: MoveRecord,
}

/// [`RulesEngine`] implementation on top of [`owlchess::Board`]
#[derive(Debug, Clone)]
pub struct OwlEngine {
    board: Board,
    position: Position,
    stack: Vec<Undo>,
    repeat: Repeat,
}

fn refused(e: impl std::fmt::Display) -> EngineError {
    EngineError::Refused(e.to_string())
}

fn square(c: Coord) -> Square {
    Square::from_index(c.index())
}

fn to_legal(mv: &Move) -> LegalMove {
    LegalMove {
        from: square(mv.src()),
        to: square(mv.dst()),
        promotion: mv.kind().promote().map(|p| match p {
            OwlPiece::Knight => PieceKind::Knight,
            OwlPiece::Bishop => PieceKind::Bishop,
            OwlPiece::Rook => PieceKind::Rook,
            _ => PieceKind::Queen,
        }),
    }
}

impl OwlEngine {
    fn from_board(board: Board) -> Result<OwlEngine, EngineError> {
        // `owlchess` drops castling rights and en passant targets which cannot be used, so the
        // position is read back from the engine rather than taken from the input.
        let position = Position::from_fen(&board.as_fen())?;
        let mut repeat = Repeat::default();
        repeat.push(&position);
        Ok(OwlEngine {
            board,
            position,
            stack: Vec::new(),
            repeat,
        })
    }

    /// Returns the engine with the standard starting position
    pub fn initial() -> OwlEngine {
        OwlEngine {
            board: Board::initial(),
            position: Position::initial(),
            stack: Vec::new(),
            repeat: {
                let mut r = Repeat::default();
                r.push(&Position::initial());
                r
            },
        }
    }

    fn find(&self, proposal: &MoveProposal) -> Option<Move> {
        Move::from_uci_legal(&proposal.to_string(), &self.board).ok()
    }
}

impl RulesEngine for OwlEngine {
    fn construct(fen: &str) -> Result<Self, EngineError> {
        let position = Position::from_fen(fen)?;
        for color in [Color::White, Color::Black] {
            let kings = position.board.squares_of(Piece::king(color)).len();
            if kings != 1 {
                return Err(EngineError::Refused(format!(
                    "{} has {} kings instead of one",
                    color.name(),
                    kings
                )));
            }
        }
        let board = Board::from_fen(fen).map_err(refused)?;
        OwlEngine::from_board(board)
    }

    fn fen(&self) -> String {
        self.board.as_fen()
    }

    fn position(&self) -> Position {
        self.position
    }

    fn turn(&self) -> Color {
        self.position.side
    }

    fn moves_from(&self, from: Square) -> MoveList {
        legal::gen_all(&self.board)
            .iter()
            .filter(|mv| square(mv.src()) == from)
            .map(to_legal)
            .collect()
    }

    fn make_move(&mut self, proposal: &MoveProposal) -> Result<MoveRecord, EngineError> {
        let mv = self
            .find(proposal)
            .ok_or(EngineError::IllegalMove(*proposal))?;
        let san = mv.san(&self.board).map_err(refused)?.to_string();
        let next = self.board.make_move(mv).map_err(refused)?;
        let position = Position::from_fen(&next.as_fen())?;

        let record = MoveRecord {
            from: proposal.from,
            to: proposal.to,
            promotion: proposal.promotion,
            san,
        };
        self.stack.push(Undo {
            board: std::mem::replace(&mut self.board, next),
            position: self.position,
            record: record.clone(),
        });
        self.position = position;
        self.repeat.push(&self.position);
        Ok(record)
    }

    fn undo(&mut self) -> Option<MoveRecord> {
        let undo = self.stack.pop()?;
        self.repeat.pop(&self.position);
        self.board = undo.board;
        self.position = undo.position;
        Some(undo.record)
    }

    fn is_check(&self) -> bool {
        self.board.is_check()
    }

    fn is_checkmate(&self) -> bool {
        self.board.is_check() && !self.board.has_legal_moves()
    }

    fn is_draw(&self) -> bool {
        if self.is_checkmate() {
            return false;
        }
        // Apart from checkmate, every outcome `owlchess` detects on a single board is a draw
        self.board.calc_outcome().is_some() || self.repeat.count(&self.position) >= 3
    }

    fn history(&self) -> Vec<String> {
        self.stack.iter().map(|u| u.record.san.clone()).collect()
    }

    fn remove(&mut self, sq: Square) -> Result<Option<Piece>, EngineError> {
        let mut edited = self.position;
        let removed = edited.board.put(sq, None);
        if removed.is_none() {
            return Ok(None);
        }
        let fresh = OwlEngine::construct(&edited.as_fen())?;
        self.repeat.pop(&self.position);
        self.board = fresh.board;
        self.position = fresh.position;
        self.repeat.push(&self.position);
        Ok(removed)
    }
}
