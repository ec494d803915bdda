//! The name grammar shared by item types, properties and metadata.
//!
//! Names are ASCII only, so scanners can walk bytes and still slice on
//! character boundaries.

/// Check if a byte can start a name.
#[inline]
pub fn is_valid_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

/// Check if a byte can continue a name.
#[inline]
pub fn is_valid_continue(c: u8) -> bool {
    is_valid_start(c) || c.is_ascii_digit() || c == b'-'
}

/// Find the end of a name starting at byte offset `start`.
///
/// Returns `start` when no name begins there. A `-` that opens a `->`
/// arrow is never consumed.
pub fn scan_name(s: &str, start: usize) -> usize {
    let bytes = s.as_bytes();
    match bytes.get(start) {
        Some(&c) if is_valid_start(c) => {}
        _ => return start,
    }

    let mut end = start + 1;
    while let Some(&c) = bytes.get(end) {
        if !is_valid_continue(c) {
            break;
        }
        if c == b'-' && bytes.get(end + 1) == Some(&b'>') {
            break;
        }
        end += 1;
    }
    end
}

/// Whether the whole string is a single valid name.
pub fn is_valid_name(s: &str) -> bool {
    !s.is_empty() && scan_name(s, 0) == s.len()
}

/// Advance past ASCII whitespace starting at `from`.
#[inline]
pub fn skip_whitespace(s: &str, from: usize) -> usize {
    let bytes = s.as_bytes();
    let mut i = from;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}
