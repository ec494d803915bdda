//! Metadata captures: `%(Name)` and `%(ItemType.Name)`.

use crate::base::names::{scan_name, skip_whitespace};
use crate::base::{TextRange, text_range};

/// A well-formed metadata reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataCapture<'a> {
    /// Span from `%` to `)` inclusive.
    pub range: TextRange,
    /// The full `%(...)` text.
    pub value: &'a str,
    /// Item type qualifier, if present.
    pub item_type: Option<&'a str>,
    pub name: &'a str,
}

impl MetadataCapture<'_> {
    pub fn start(&self) -> usize {
        u32::from(self.range.start()) as usize
    }

    pub fn end(&self) -> usize {
        u32::from(self.range.end()) as usize
    }
}

/// Lazily yields the well-formed metadata references in `expr`.
pub fn metadata_captures(expr: &str) -> MetadataCaptures<'_> {
    MetadataCaptures {
        expr,
        pos: 0,
        end: expr.len(),
    }
}

/// Lazily yields the well-formed metadata references in `expr[start..end]`.
pub fn metadata_captures_in(expr: &str, start: usize, end: usize) -> MetadataCaptures<'_> {
    MetadataCaptures {
        expr,
        pos: start,
        end: end.min(expr.len()),
    }
}

/// Iterator returned by [`metadata_captures`].
#[derive(Debug, Clone)]
pub struct MetadataCaptures<'a> {
    expr: &'a str,
    pos: usize,
    end: usize,
}

impl<'a> Iterator for MetadataCaptures<'a> {
    type Item = MetadataCapture<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.expr.as_bytes();
        while self.pos + 1 < self.end {
            let at = self.pos;
            let found = bytes[at..self.end]
                .windows(2)
                .position(|w| w == b"%(")
                .map(|p| at + p)?;

            match parse_metadata(self.expr, found, self.end) {
                Some(capture) => {
                    self.pos = capture.end();
                    return Some(capture);
                }
                None => self.pos = found + 1,
            }
        }
        None
    }
}

/// Parse a metadata reference whose `%` sits at `at`.
pub(crate) fn parse_metadata(expr: &str, at: usize, end: usize) -> Option<MetadataCapture<'_>> {
    let bounded = &expr[..end];
    let bytes = bounded.as_bytes();
    if !bytes[at..].starts_with(b"%(") {
        return None;
    }

    let first_start = skip_whitespace(bounded, at + 2);
    let first_end = scan_name_with_dashes(bounded, first_start);
    if first_end == first_start {
        return None;
    }

    let mut i = skip_whitespace(bounded, first_end);
    let mut item_type = None;
    let mut name = &expr[first_start..first_end];

    if bytes.get(i) == Some(&b'.') {
        let second_start = skip_whitespace(bounded, i + 1);
        let second_end = scan_name_with_dashes(bounded, second_start);
        if second_end == second_start {
            return None;
        }
        item_type = Some(name);
        name = &expr[second_start..second_end];
        i = skip_whitespace(bounded, second_end);
    }

    if bytes.get(i) != Some(&b')') {
        return None;
    }

    Some(MetadataCapture {
        range: text_range(at, i + 1),
        value: &expr[at..i + 1],
        item_type,
        name,
    })
}

/// Metadata names have no arrows to stop at, so a trailing `-` belongs to
/// the name.
fn scan_name_with_dashes(s: &str, start: usize) -> usize {
    let mut end = scan_name(s, start);
    let bytes = s.as_bytes();
    if end > start {
        while bytes
            .get(end)
            .is_some_and(|&b| crate::base::names::is_valid_continue(b))
        {
            end += 1;
        }
    }
    end
}

/// How the metadata references in a string line up with the string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataMatch {
    /// No metadata references.
    None,
    /// One reference spanning the whole string.
    WholeString,
    /// One reference with literal text around it.
    Partial,
    /// More than one reference.
    Multiple,
}

/// Classify `expr` so callers can skip rebuilding it when there is nothing
/// or only a single reference to substitute.
pub fn classify_metadata_matches(expr: &str) -> MetadataMatch {
    let mut captures = metadata_captures(expr);
    let Some(first) = captures.next() else {
        return MetadataMatch::None;
    };
    if captures.next().is_some() {
        MetadataMatch::Multiple
    } else if first.start() == 0 && first.end() == expr.len() {
        MetadataMatch::WholeString
    } else {
        MetadataMatch::Partial
    }
}
