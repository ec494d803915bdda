//! The `%XX` escaping convention shared by every expanded string.
//!
//! Inside the engine strings are kept escaped, so a literal `;` travels as
//! `%3B` and is never mistaken for a list separator. Unescaping happens only
//! on output and right before a value is handed to the file system or a
//! native function.

use std::borrow::Cow;

/// Characters that carry meaning in expressions and must be escaped.
const SPECIAL_CHARS: &[u8] = b"%*?@$();'";

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

#[inline]
fn is_special(b: u8) -> bool {
    SPECIAL_CHARS.contains(&b)
}

/// Replace each special character with `%XX` (uppercase hex).
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.bytes().any(is_special) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        if c.is_ascii() && is_special(c as u8) {
            let b = c as u8;
            out.push('%');
            out.push(char::from(HEX_DIGITS[usize::from(b >> 4)]));
            out.push(char::from(HEX_DIGITS[usize::from(b & 0x0F)]));
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

#[inline]
fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Replace every `%XX` sequence (two hex digits) with its character.
///
/// Malformed sequences pass through untouched.
pub fn unescape(s: &str) -> Cow<'_, str> {
    let Some(first) = s.find('%') else {
        return Cow::Borrowed(s);
    };

    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);

    let mut i = first;
    let mut copy_from = first;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let decoded = bytes
                .get(i + 1)
                .and_then(|&hi| hex_value(hi))
                .zip(bytes.get(i + 2).and_then(|&lo| hex_value(lo)));
            if let Some((hi, lo)) = decoded {
                out.push_str(&s[copy_from..i]);
                out.push(char::from(hi * 16 + lo));
                i += 3;
                copy_from = i;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&s[copy_from..]);
    Cow::Owned(out)
}

/// Whether the string holds an escaped `*` or `?`.
pub fn contains_escaped_wildcards(s: &str) -> bool {
    if !s.contains('%') {
        return false;
    }
    let upper = s.to_ascii_uppercase();
    upper.contains("%2A") || upper.contains("%3F")
}

/// Whether the unescaped string would contain a `*` or `?`.
pub fn contains_wildcards(s: &str) -> bool {
    s.contains(['*', '?'])
}

/// Split an escaped list on literal semicolons.
///
/// Pieces are trimmed and empty pieces dropped. Semicolons inside an
/// `@(...)` reference (outside its quoted parts) are not split points, so
/// `@(A->'%(X)', ';')` stays whole.
pub fn split_semicolon_separated(s: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let bytes = s.as_bytes();

    let mut start = 0;
    let mut inside_item_list = false;
    let mut inside_quotes = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b';' if !inside_item_list => {
                push_trimmed(&mut pieces, &s[start..i]);
                start = i + 1;
            }
            b'@' if !inside_item_list && bytes.get(i + 1) == Some(&b'(') => {
                inside_item_list = true;
                i += 1;
            }
            b'\'' if inside_item_list => inside_quotes = !inside_quotes,
            b')' if inside_item_list && !inside_quotes => inside_item_list = false,
            _ => {}
        }
        i += 1;
    }
    push_trimmed(&mut pieces, &s[start..]);
    pieces
}

fn push_trimmed<'a>(pieces: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        pieces.push(piece);
    }
}
