use crate::types::{Color, Rank};

/// Rank on which pawns of color `c` promote
pub const fn promotion_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R8,
        Color::Black => Rank::R1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_rank() {
        assert_eq!(promotion_rank(Color::White), Rank::R8);
        assert_eq!(promotion_rank(Color::Black), Rank::R1);
    }
}
