//! Board, position and the FEN codec

use crate::square_set::SquareSet;
use crate::types::{
    self, CastlingRights, Color, File, Piece, PieceKind, Rank, Square,
};

use std::fmt::{self, Display};
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// FEN of the standard starting position
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Error parsing the first part of FEN (i.e. the positions of pieces on the board)
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CellsParseError {
    /// Rank is too large
    #[error("too many items in rank {0}")]
    RankOverflow(Rank),
    /// Rank is too small
    #[error("not enough items in rank {0}")]
    RankUnderflow(Rank),
    /// Too many ranks
    #[error("too many ranks")]
    Overflow,
    /// Not enough ranks
    #[error("not enough ranks")]
    Underflow,
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

/// Error parsing a [`Position`] from FEN
///
/// Any of these means that the position string is malformed.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum FenParseError {
    /// FEN contains non-ASCII characters
    #[error("non-ASCII data in FEN")]
    NonAscii,
    /// FEN doesn't have board part
    #[error("board not specified")]
    NoBoard,
    /// Error parsing board from FEN
    #[error("bad board: {0}")]
    Board(#[from] CellsParseError),
    /// FEN doesn't have move side part
    #[error("no move side")]
    NoMoveSide,
    /// Error parsing move side from FEN
    #[error("bad move side: {0}")]
    MoveSide(#[from] types::ColorParseError),
    /// FEN doesn't have castling rights part
    #[error("no castling rights")]
    NoCastling,
    /// Error parsing castling rights from FEN
    #[error("bad castling rights: {0}")]
    Castling(#[from] types::CastlingRightsParseError),
    /// FEN doesn't have enpassant part
    #[error("no enpassant")]
    NoEnpassant,
    /// Error parsing enpassant from FEN
    #[error("bad enpassant: {0}")]
    Enpassant(#[from] types::SquareParseError),
    /// Error parsing halfmove clock
    #[error("bad halfmove clock: {0}")]
    HalfmoveClock(ParseIntError),
    /// Error parsing move number
    #[error("bad move number: {0}")]
    MoveNumber(ParseIntError),
    /// FEN contains extra data
    #[error("extra data in FEN")]
    ExtraData,
}

/// Contents of the 64 squares
///
/// No legality is implied: a board may lack kings, or hold pawns on the last rank. Rules are
/// enforced only when a position is handed to a rules engine.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Board([Option<Piece>; 64]);

impl Board {
    pub const EMPTY: Board = Board([None; 64]);

    /// Returns a board with the pieces of the standard starting position
    pub fn initial() -> Board {
        let mut res = Board::EMPTY;
        for file in File::iter() {
            res.put(
                Square::from_parts(file, Rank::R2),
                Some(Piece::new(Color::White, PieceKind::Pawn)),
            );
            res.put(
                Square::from_parts(file, Rank::R7),
                Some(Piece::new(Color::Black, PieceKind::Pawn)),
            );
        }
        const BACK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (color, rank) in [(Color::White, Rank::R1), (Color::Black, Rank::R8)] {
            for (file, kind) in File::iter().zip(BACK) {
                res.put(Square::from_parts(file, rank), Some(Piece::new(color, kind)));
            }
        }
        res
    }

    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.0[sq.index()]
    }

    /// Puts `piece` on `sq`, returning what was there before
    #[inline]
    pub fn put(&mut self, sq: Square, piece: Option<Piece>) -> Option<Piece> {
        std::mem::replace(&mut self.0[sq.index()], piece)
    }

    /// Mirrors the board vertically and swaps the colors of all the pieces
    pub fn flipped(&self) -> Board {
        let mut res = Board::EMPTY;
        for (sq, piece) in self.pieces() {
            res.put(sq.flipped_rank(), Some(piece.flipped()));
        }
        res
    }

    /// Iterates over the occupied squares in FEN order
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }

    pub fn occupied(&self) -> SquareSet {
        self.pieces().map(|(sq, _)| sq).collect()
    }

    pub fn empty_squares(&self) -> SquareSet {
        !self.occupied()
    }

    pub fn squares_of(&self, piece: Piece) -> SquareSet {
        self.pieces()
            .filter(|&(_, p)| p == piece)
            .map(|(sq, _)| sq)
            .collect()
    }

    pub fn has_king(&self, color: Color) -> bool {
        self.pieces().any(|(_, p)| p == Piece::king(color))
    }

    /// Returns a copy of the board with the squares in `hidden` cleared
    ///
    /// This is a display projection; the original board is left intact.
    pub fn without(&self, hidden: SquareSet) -> Board {
        let mut res = *self;
        for sq in hidden {
            res.put(sq, None);
        }
        res
    }

    /// Wraps the board to allow pretty-printing with the given style
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty {
            board: self,
            side: None,
            style,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::EMPTY
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Board({})", self)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter() {
            if rank.index() != 0 {
                write!(f, "/")?;
            }
            let mut empty = 0_u8;
            for file in File::iter() {
                match self.get(Square::from_parts(file, rank)) {
                    Some(piece) => {
                        if empty != 0 {
                            write!(f, "{}", (b'0' + empty) as char)?;
                            empty = 0;
                        }
                        write!(f, "{}", piece)?;
                    }
                    None => empty += 1,
                }
            }
            if empty != 0 {
                write!(f, "{}", (b'0' + empty) as char)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = CellsParseError;

    fn from_str(s: &str) -> Result<Board, Self::Err> {
        type Error = CellsParseError;

        let mut file = 0_usize;
        let mut rank = 0_usize;
        let mut board = Board::EMPTY;
        for c in s.chars() {
            match c {
                '1'..='8' => {
                    let add = (c as u8 - b'0') as usize;
                    if file + add > 8 {
                        return Err(Error::RankOverflow(Rank::from_index(rank)));
                    }
                    file += add;
                }
                '/' => {
                    if file < 8 {
                        return Err(Error::RankUnderflow(Rank::from_index(rank)));
                    }
                    rank += 1;
                    file = 0;
                    if rank >= 8 {
                        return Err(Error::Overflow);
                    }
                }
                _ => {
                    if file >= 8 {
                        return Err(Error::RankOverflow(Rank::from_index(rank)));
                    }
                    let piece = Piece::from_char(c).ok_or(Error::UnexpectedChar(c))?;
                    board.put(
                        Square::from_parts(File::from_index(file), Rank::from_index(rank)),
                        Some(piece),
                    );
                    file += 1;
                }
            }
        }

        if file < 8 {
            return Err(Error::RankUnderflow(Rank::from_index(rank)));
        }
        if rank < 7 {
            return Err(Error::Underflow);
        }
        Ok(board)
    }
}

/// Chess position
///
/// Besides the board and the side to move, the position carries castling rights, the en
/// passant target and both move counters. These are not interpreted here; they are kept so
/// that a position survives a trip through FEN unchanged.
///
/// # Example
///
/// ```
/// # use zoochess_base::{Position, Color};
/// #
/// let pos = Position::from_fen("7k/8/8/8/8/8/4P3/K7 w - - 0 1").unwrap();
/// assert_eq!(pos.side, Color::White);
/// assert_eq!(pos.as_fen(), "7k/8/8/8/8/8/4P3/K7 w - - 0 1");
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    /// Contents of the board
    pub board: Board,
    /// Side to move
    pub side: Color,
    /// Castling rights
    pub castling: CastlingRights,
    /// En passant target square, i.e. the square the capturing pawn lands on
    pub en_passant: Option<Square>,
    /// Number of half-moves without pawn moves or captures
    pub halfmove_clock: u16,
    /// Move number, incremented after each move by Black
    pub fullmove_number: u16,
}

impl Position {
    /// Returns an empty board with White to move
    pub const fn empty() -> Position {
        Position {
            board: Board::EMPTY,
            side: Color::White,
            castling: CastlingRights::EMPTY,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Returns the standard starting position
    pub fn initial() -> Position {
        Position {
            board: Board::initial(),
            castling: CastlingRights::FULL,
            ..Position::empty()
        }
    }

    /// Parses a position from FEN
    ///
    /// Does the same as [`Position::from_str`].
    #[inline]
    pub fn from_fen(fen: &str) -> Result<Position, FenParseError> {
        Position::from_str(fen)
    }

    /// Converts the position into a FEN string
    #[inline]
    pub fn as_fen(&self) -> String {
        self.to_string()
    }

    /// Returns a copy of the position where only the side to move is replaced
    pub fn with_side(&self, side: Color) -> Position {
        Position { side, ..*self }
    }

    /// Returns the same position seen from the other side
    ///
    /// The board is mirrored and the colors are swapped, so a White pawn on `e2` becomes a Black
    /// pawn on `e7`. The side to move, castling rights and en passant target follow along. Move
    /// counters are kept as is.
    pub fn flipped(&self) -> Position {
        Position {
            board: self.board.flipped(),
            side: self.side.inv(),
            castling: self.castling.flipped(),
            en_passant: self.en_passant.map(Square::flipped_rank),
            ..*self
        }
    }

    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty {
            board: &self.board,
            side: Some(self.side),
            style,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::initial()
    }
}

impl FromStr for Position {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<Position, Self::Err> {
        type Error = FenParseError;

        if !s.is_ascii() {
            return Err(Error::NonAscii);
        }
        let mut iter = s.split(' ').fuse();

        let board = Board::from_str(iter.next().filter(|s| !s.is_empty()).ok_or(Error::NoBoard)?)?;
        let side = Color::from_str(iter.next().ok_or(Error::NoMoveSide)?)?;
        let castling = CastlingRights::from_str(iter.next().ok_or(Error::NoCastling)?)?;
        let en_passant = match iter.next().ok_or(Error::NoEnpassant)? {
            "-" => None,
            s => Some(Square::from_str(s)?),
        };
        let halfmove_clock = match iter.next() {
            Some(s) => u16::from_str(s).map_err(Error::HalfmoveClock)?,
            None => 0,
        };
        let fullmove_number = match iter.next() {
            Some(s) => u16::from_str(s).map_err(Error::MoveNumber)?,
            None => 1,
        };

        if iter.next().is_some() {
            return Err(Error::ExtraData);
        }

        Ok(Position {
            board,
            side,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{} {} {}", self.board, self.side, self.castling)?;
        match self.en_passant {
            Some(sq) => write!(f, " {}", sq)?,
            None => write!(f, " -")?,
        }
        write!(f, " {} {}", self.halfmove_clock, self.fullmove_number)
    }
}

/// Parses `fen` into a position
pub fn parse(fen: &str) -> Result<Position, FenParseError> {
    Position::from_fen(fen)
}

/// Serializes `position` into FEN; inverse of [`parse()`]
pub fn serialize(position: &Position) -> String {
    position.as_fen()
}

/// Overwrites the side to move, keeping every other field
pub fn force_side_to_move(position: &Position, side: Color) -> Position {
    position.with_side(side)
}

/// Style for [`Board::pretty()`] and [`Position::pretty()`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrettyStyle {
    /// Use only ASCII characters
    Ascii,
    /// Use Unicode chess symbols and box-drawing characters
    Utf8,
}

/// Wrapper to pretty-print the board
pub struct Pretty<'a> {
    board: &'a Board,
    side: Option<Color>,
    style: PrettyStyle,
}

struct Frame {
    horz: char,
    vert: char,
    angle: char,
    empty: char,
}

impl<'a> Pretty<'a> {
    fn frame(&self) -> Frame {
        match self.style {
            PrettyStyle::Ascii => Frame {
                horz: '-',
                vert: '|',
                angle: '+',
                empty: '.',
            },
            PrettyStyle::Utf8 => Frame {
                horz: '─',
                vert: '│',
                angle: '┼',
                empty: '.',
            },
        }
    }

    fn piece(&self, piece: Piece) -> char {
        match self.style {
            PrettyStyle::Ascii => piece.as_char(),
            PrettyStyle::Utf8 => piece.as_utf8_char(),
        }
    }
}

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let frame = self.frame();
        for rank in Rank::iter() {
            write!(f, "{}{}", rank, frame.vert)?;
            for file in File::iter() {
                let c = match self.board.get(Square::from_parts(file, rank)) {
                    Some(piece) => self.piece(piece),
                    None => frame.empty,
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "{}{}", frame.horz, frame.angle)?;
        for _ in File::iter() {
            write!(f, "{}", frame.horz)?;
        }
        writeln!(f)?;
        let indicator = match self.side {
            Some(Color::White) => 'W',
            Some(Color::Black) => 'B',
            None => ' ',
        };
        write!(f, "{}{}", indicator, frame.vert)?;
        for file in File::iter() {
            write!(f, "{}", file)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_initial() {
        assert_eq!(Position::initial().to_string(), INITIAL_FEN);
        assert_eq!(Position::from_str(INITIAL_FEN), Ok(Position::initial()));
    }

    #[test]
    fn test_kingless() {
        let pos = Position::from_fen("8/8/8/8/4P3/8/8/8 w - - 0 1").unwrap();
        assert!(!pos.board.has_king(Color::White));
        assert!(!pos.board.has_king(Color::Black));
        assert_eq!(
            pos.board.get(Square::from_parts(File::E, Rank::R4)),
            Some(Piece::new(Color::White, PieceKind::Pawn))
        );
        assert_eq!(pos.board.occupied().len(), 1);
    }

    #[test]
    fn test_opaque_fields() {
        const FEN: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w Kq e6 7 42";
        let pos = Position::from_fen(FEN).unwrap();
        assert_eq!(pos.en_passant, Some(Square::from_parts(File::E, Rank::R6)));
        assert_eq!(pos.halfmove_clock, 7);
        assert_eq!(pos.fullmove_number, 42);
        assert_eq!(pos.as_fen(), FEN);
    }

    #[test]
    fn test_malformed() {
        assert_eq!(
            Position::from_fen("rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenParseError::Board(CellsParseError::RankOverflow(Rank::R7)))
        );
        assert_eq!(
            Position::from_fen("rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenParseError::Board(CellsParseError::RankUnderflow(Rank::R7)))
        );
        assert_eq!(
            Position::from_fen("8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenParseError::Board(CellsParseError::Underflow))
        );
        assert_eq!(
            Position::from_fen("8/8/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenParseError::Board(CellsParseError::Overflow))
        );
        assert_eq!(
            Position::from_fen("8/8/8/8/8/8/8/7x w - - 0 1"),
            Err(FenParseError::Board(CellsParseError::UnexpectedChar('x')))
        );
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/8 x - - 0 1"),
            Err(FenParseError::MoveSide(_))
        ));
        assert_eq!(Position::from_fen(""), Err(FenParseError::NoBoard));
        assert_eq!(Position::from_fen("garbage"), Err(FenParseError::Board(CellsParseError::UnexpectedChar('g'))));
        assert_eq!(
            Position::from_fen("8/8/8/8/8/8/8/8"),
            Err(FenParseError::NoMoveSide)
        );
        assert_eq!(
            Position::from_fen("8/8/8/8/8/8/8/8 w - - 0 1 extra"),
            Err(FenParseError::ExtraData)
        );
        assert_eq!(Position::from_fen("8/8/8/8/8/8/8/8 w - - 0 1 ♔"), Err(FenParseError::NonAscii));
    }

    #[test]
    fn test_incomplete() {
        let pos = Position::from_fen("7k/8/8/8/8/8/4P3/K7 w - -").unwrap();
        assert_eq!(pos.halfmove_clock, 0);
        assert_eq!(pos.fullmove_number, 1);
        assert_eq!(
            Position::from_fen("7k/8/8/8/8/8/4P3/K7 w"),
            Err(FenParseError::NoCastling)
        );
    }

    #[test]
    fn test_force_side() {
        let pos = Position::from_fen("7k/8/8/8/4P3/8/8/K7 b - e3 0 1").unwrap();
        let forced = force_side_to_move(&pos, Color::White);
        assert_eq!(forced.side, Color::White);
        assert_eq!(forced.board, pos.board);
        assert_eq!(forced.en_passant, pos.en_passant);
        assert_eq!(forced.as_fen(), "7k/8/8/8/4P3/8/8/K7 w - e3 0 1");
    }

    #[test]
    fn test_flipped() {
        let pos = Position::from_fen("r3k3/8/8/8/4P3/8/8/4K2R b Kq e3 0 7").unwrap();
        let flipped = pos.flipped();
        assert_eq!(flipped.as_fen(), "4k2r/8/8/4p3/8/8/8/R3K3 w Qk e6 0 7");
        assert_eq!(flipped.flipped(), pos);

        let pawn = Position::from_fen("8/8/8/8/8/8/4P3/8 w - - 0 1").unwrap();
        assert_eq!(pawn.flipped().as_fen(), "8/4p3/8/8/8/8/8/8 b - - 0 1");
    }

    #[test]
    fn test_random_round_trip() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..500 {
            let mut pos = Position::empty();
            for sq in Square::iter() {
                if rng.gen_bool(0.3) {
                    let color = Color::BOTH[rng.gen_range(0..2)];
                    let kind = PieceKind::ALL[rng.gen_range(0..6)];
                    pos.board.put(sq, Some(Piece::new(color, kind)));
                }
            }
            pos.side = Color::BOTH[rng.gen_range(0..2)];
            pos.castling = CastlingRights::from_index(rng.gen_range(0..16));
            pos.en_passant = rng
                .gen_bool(0.5)
                .then(|| Square::from_index(rng.gen_range(0..64)));
            pos.halfmove_clock = rng.gen_range(0..200);
            pos.fullmove_number = rng.gen_range(1..500);

            assert_eq!(parse(&serialize(&pos)), Ok(pos));
        }
    }

    #[test]
    fn test_pretty() {
        let pos = Position::from_fen("7k/8/8/8/8/8/4P3/K7 w - - 0 1").unwrap();
        let res = r#"
8|.......k
7|........
6|........
5|........
4|........
3|........
2|....P...
1|K.......
-+--------
W|abcdefgh
"#;
        assert_eq!(pos.pretty(PrettyStyle::Ascii).to_string().trim(), res.trim());
    }
}
