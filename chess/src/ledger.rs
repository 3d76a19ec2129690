//! Move ledger
//!
//! Views over a move log. Nothing here is stored: every view is recomputed from the log on
//! each read.

use serde::Serialize;

use std::fmt;

/// One row of the move history
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MovePair {
    pub white: String,
    pub black: Option<String>,
}

/// Groups `log` two moves at a time, White's move first
///
/// A trailing unmatched move leaves the black slot empty.
pub fn history_pairs(log: &[String]) -> Vec<MovePair> {
    log.chunks(2)
        .map(|chunk| MovePair {
            white: chunk[0].clone(),
            black: chunk.get(1).cloned(),
        })
        .collect()
}

/// Lists each move of a single-sided practice on its own row
///
/// Check and mate marks are dropped, as they can only refer to hidden anchor kings.
pub fn practice_pairs(log: &[String]) -> Vec<MovePair> {
    log.iter()
        .map(|san| MovePair {
            white: san.trim_end_matches(['+', '#']).to_string(),
            black: None,
        })
        .collect()
}

/// Numbered listing of move history, like `1. e4 e5 2. Nf3`
#[derive(Debug, Copy, Clone)]
pub struct Ledger<'a>(pub &'a [MovePair]);

impl<'a> fmt::Display for Ledger<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if self.0.is_empty() {
            return write!(f, "No moves yet");
        }
        for (i, pair) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            write!(f, "{}. {}", i + 1, pair.white)?;
            if let Some(black) = &pair.black {
                write!(f, " {}", black)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(s: &str) -> Vec<String> {
        s.split_ascii_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_history_pairs() {
        assert!(history_pairs(&[]).is_empty());
        assert_eq!(
            history_pairs(&log("e4 e5 Nf3")),
            vec![
                MovePair {
                    white: "e4".into(),
                    black: Some("e5".into())
                },
                MovePair {
                    white: "Nf3".into(),
                    black: None
                },
            ]
        );
        assert_eq!(history_pairs(&log("d4 d5")).len(), 1);
    }

    #[test]
    fn test_practice_pairs() {
        let pairs = practice_pairs(&log("e4 e5 e6 exd7+ Qh5#"));
        let white: Vec<_> = pairs.iter().map(|p| p.white.as_str()).collect();
        assert_eq!(white, ["e4", "e5", "e6", "exd7", "Qh5"]);
        assert!(pairs.iter().all(|p| p.black.is_none()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Ledger(&[]).to_string(), "No moves yet");
        assert_eq!(
            Ledger(&history_pairs(&log("e4 e5 Nf3"))).to_string(),
            "1. e4 e5 2. Nf3"
        );
        assert_eq!(
            Ledger(&practice_pairs(&log("e4 e5"))).to_string(),
            "1. e4 2. e5"
        );
    }
}
