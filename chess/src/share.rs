//! Shareable links
//!
//! A position is shared as the `fen` query parameter of a link, percent-encoded the same way
//! browsers encode URI components.

use crate::error::Result;

use zoochess_base::{FenParseError, Position};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::warn;

use std::borrow::Cow;

/// Name of the query parameter holding the position
pub const FEN_PARAM: &str = "fen";

/// Characters escaped in a URI component: everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Encodes `position` as a query parameter value
///
/// # Example
///
/// ```
/// # use zoochess::share;
/// # use zoochess_base::Position;
/// #
/// let pos = Position::from_fen("7k/8/8/8/8/8/4P3/K7 w - - 0 1").unwrap();
/// assert_eq!(share::encode(&pos), "7k%2F8%2F8%2F8%2F8%2F8%2F4P3%2FK7%20w%20-%20-%200%201");
/// ```
pub fn encode(position: &Position) -> String {
    utf8_percent_encode(&position.as_fen(), COMPONENT).to_string()
}

/// Decodes a query parameter value produced by [`encode()`]
///
/// Form-encoded spaces (`+`) are accepted as well.
pub fn decode(value: &str) -> Result<Position> {
    let value: Cow<'_, str> = if value.contains('+') {
        Cow::Owned(value.replace('+', " "))
    } else {
        Cow::Borrowed(value)
    };
    let fen = percent_decode_str(&value)
        .decode_utf8()
        .map_err(|_| FenParseError::NonAscii)?;
    Ok(Position::from_fen(fen.trim())?)
}

/// Same as [`decode()`], but falls back to `default` if `value` is malformed
pub fn decode_or_default(value: &str, default: &Position) -> Position {
    match decode(value) {
        Ok(position) => position,
        Err(e) => {
            warn!(value, error = %e, "malformed shared position, using default");
            *default
        }
    }
}

/// Builds a link to `base` which opens `position`
pub fn share_link(base: &str, position: &Position) -> String {
    let base = base.split(['?', '#']).next().unwrap_or(base);
    format!("{}?{}={}", base, FEN_PARAM, encode(position))
}

/// Looks up the raw `fen` parameter in `query`
///
/// `query` may start with `?`. Returns `None` if there is no such parameter.
pub fn fen_param(query: &str) -> Option<&str> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| *key == FEN_PARAM)
        .map(|(_, value)| value)
}

/// Extracts and decodes the position from the `fen` parameter of `query`
///
/// Returns `None` if there is no such parameter.
pub fn position_from_query(query: &str) -> Option<Result<Position>> {
    fen_param(query).map(decode)
}
