//! Parsing of numeric literals into words.

use crate::Word;

/// Error produced for a malformed numeric literal.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    #[error("invalid numeric literal `{0}`")]
    Invalid(String),
    #[error("numeric literal `{0}` does not fit into 64 bits")]
    OutOfRange(String),
}

/// Parse an integer literal.
///
/// Accepts decimal, `0x` hexadecimal and `0b` binary notation.
pub fn parse_int(text: &str) -> Result<Word, LiteralError> {
    let (digits, radix) = if let Some(rest) = strip_prefix_ci(text, "0x") {
        (rest, 16)
    } else if let Some(rest) = strip_prefix_ci(text, "0b") {
        (rest, 2)
    } else {
        (text, 10)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(LiteralError::Invalid(text.to_string()));
    }

    Word::from_str_radix(digits, radix).map_err(|_| LiteralError::OutOfRange(text.to_string()))
}

/// Parse a floating-point literal into the bit pattern of an `f64`.
pub fn parse_float(text: &str) -> Result<Word, LiteralError> {
    text.parse::<f64>()
        .map(f64::to_bits)
        .map_err(|_| LiteralError::Invalid(text.to_string()))
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        text.get(prefix.len()..)
    } else {
        None
    }
}
