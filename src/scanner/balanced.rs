//! Balanced-scan primitives.
//!
//! Parentheses are counted while `'`, `` ` `` and `"` quoted spans shield
//! their contents. All offsets are byte offsets; every delimiter is ASCII.

use thiserror::Error;

#[inline]
pub(crate) fn is_quote(b: u8) -> bool {
    matches!(b, b'\'' | b'`' | b'"')
}

/// Result of scanning a `$(`-style body for its closing parenthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParenScan {
    /// Byte offset of the matching `)`.
    pub close: usize,
    /// The body contains `.`, `[` or `$`, so it may be a function call.
    pub potential_property_function: bool,
    /// The body contains `:`, so it may be a registry reference.
    pub potential_registry_function: bool,
}

/// Find the `)` matching an already consumed `(`.
///
/// `from` is the offset just past the opening parenthesis. Returns `None`
/// for unbalanced parentheses or an unterminated quote.
pub fn scan_for_closing_paren(expr: &str, from: usize) -> Option<ParenScan> {
    let bytes = expr.as_bytes();
    let mut potential_property_function = false;
    let mut potential_registry_function = false;
    let mut nest = 1usize;
    let mut i = from;

    while i < bytes.len() {
        match bytes[i] {
            q if is_quote(q) => {
                i = scan_for_closing_quote(expr, q, i + 1)?;
            }
            b'(' => nest += 1,
            b')' => {
                nest -= 1;
                if nest == 0 {
                    return Some(ParenScan {
                        close: i,
                        potential_property_function,
                        potential_registry_function,
                    });
                }
            }
            b'.' | b'[' | b'$' => potential_property_function = true,
            b':' => potential_registry_function = true,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Offset of the next `quote` at or after `from`.
#[inline]
pub fn scan_for_closing_quote(expr: &str, quote: u8, from: usize) -> Option<usize> {
    expr.as_bytes()
        .get(from..)?
        .iter()
        .position(|&b| b == quote)
        .map(|p| from + p)
}

/// Consume a parenthesised argument list starting at `at` (which must hold
/// `(`), not reading at or beyond `end`.
///
/// Returns the offset just past the closing `)`.
pub fn sink_arguments_in_parentheses(expr: &str, at: usize, end: usize) -> Option<usize> {
    let bytes = expr.as_bytes();
    if bytes.get(at) != Some(&b'(') {
        return None;
    }

    let mut nest = 1usize;
    let mut i = at + 1;
    while i < end && nest > 0 {
        match bytes[i] {
            q if is_quote(q) => {
                let close = scan_for_closing_quote(expr, q, i + 1)?;
                if close >= end {
                    return None;
                }
                i = close;
            }
            b'(' => nest += 1,
            b')' => nest -= 1,
            _ => {}
        }
        i += 1;
    }
    (nest == 0).then_some(i)
}

/// Why a function argument list could not be split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("mismatched parenthesis in argument list")]
    MismatchedParenthesis,
    #[error("mismatched quote in argument list")]
    MismatchedQuote,
}

/// Split a function's argument text on top-level commas.
///
/// Commas inside a nested `$(...)` or a quoted span are not split points.
/// Each piece is trimmed; quotes are kept for the caller to interpret.
pub fn split_top_level_commas(args: &str) -> Result<Vec<&str>, SplitError> {
    let bytes = args.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'$' if bytes.get(i + 1) == Some(&b'(') => {
                let scan =
                    scan_for_closing_paren(args, i + 2).ok_or(SplitError::MismatchedParenthesis)?;
                i = scan.close;
            }
            q if is_quote(q) => {
                i = scan_for_closing_quote(args, q, i + 1).ok_or(SplitError::MismatchedQuote)?;
            }
            b',' => {
                pieces.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    pieces.push(args[start..].trim());
    Ok(pieces)
}
