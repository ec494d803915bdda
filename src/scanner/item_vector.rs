//! Item-vector captures: `@(Type->'transform'->Func(args), 'separator')`.

use crate::base::names::{scan_name, skip_whitespace};
use crate::base::{TextRange, text_range};

use super::balanced::sink_arguments_in_parentheses;
use super::metadata::{MetadataCaptures, metadata_captures};

/// One `->` step of an item vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformCapture<'a> {
    /// Span of the transform within the scanned expression.
    pub range: TextRange,
    /// Transform text (`'%(Filename)'` or `Count()`).
    pub value: &'a str,
    pub kind: TransformKind<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformKind<'a> {
    /// `->'body'`: the body is expanded per item.
    Quoted { body: &'a str },
    /// `->Name(args)`: `arguments` is the raw text between the parentheses,
    /// `None` when it is empty.
    Function {
        name: &'a str,
        arguments: Option<&'a str>,
    },
}

impl<'a> TransformCapture<'a> {
    /// The function name, or `None` for a quoted transform.
    pub fn function_name(&self) -> Option<&'a str> {
        match self.kind {
            TransformKind::Function { name, .. } => Some(name),
            TransformKind::Quoted { .. } => None,
        }
    }

    /// Raw argument text: the quoted body, or the text inside the parentheses.
    pub fn arguments(&self) -> Option<&'a str> {
        match self.kind {
            TransformKind::Quoted { body } => Some(body),
            TransformKind::Function { arguments, .. } => arguments,
        }
    }
}

/// A well-formed `@(...)` reference found in an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemExpressionCapture<'a> {
    /// Span from `@` to `)` inclusive.
    pub range: TextRange,
    /// The full `@(...)` text.
    pub value: &'a str,
    pub item_type: &'a str,
    pub transforms: Vec<TransformCapture<'a>>,
    /// Separator literal without its quotes; `None` when absent.
    pub separator: Option<&'a str>,
    /// Offset of the separator text relative to the start of the capture.
    pub separator_start: Option<usize>,
}

impl<'a> ItemExpressionCapture<'a> {
    pub fn start(&self) -> usize {
        u32::from(self.range.start()) as usize
    }

    pub fn end(&self) -> usize {
        u32::from(self.range.end()) as usize
    }

    /// Whether any transform calls `name` (case-insensitive).
    pub fn has_function(&self, name: &str) -> bool {
        self.transforms.iter().any(|t| {
            t.function_name()
                .is_some_and(|f| f.eq_ignore_ascii_case(name))
        })
    }

    /// Metadata references inside the separator literal.
    pub fn separator_metadata(&self) -> MetadataCaptures<'a> {
        metadata_captures(self.separator.unwrap_or(""))
    }
}

/// Lazily yields the well-formed item vectors in `expr[start..end]`.
pub fn item_vector_captures(expr: &str, start: usize, end: usize) -> ItemVectorCaptures<'_> {
    ItemVectorCaptures {
        expr,
        pos: start,
        end: end.min(expr.len()),
    }
}

/// Iterator returned by [`item_vector_captures`].
#[derive(Debug, Clone)]
pub struct ItemVectorCaptures<'a> {
    expr: &'a str,
    pos: usize,
    end: usize,
}

impl<'a> Iterator for ItemVectorCaptures<'a> {
    type Item = ItemExpressionCapture<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.expr.as_bytes();
        while self.pos + 1 < self.end {
            let at = self.pos;
            let found = bytes[at..self.end]
                .windows(2)
                .position(|w| w == b"@(")
                .map(|p| at + p)?;

            match parse_item_vector(self.expr, found, self.end) {
                Some(capture) => {
                    self.pos = capture.end();
                    return Some(capture);
                }
                // Abandoned: retry one character past the '@'
                None => self.pos = found + 1,
            }
        }
        None
    }
}

/// Parse an item vector whose `@` sits at `at`.
pub(crate) fn parse_item_vector(
    expr: &str,
    at: usize,
    end: usize,
) -> Option<ItemExpressionCapture<'_>> {
    let scan = scan_item_vector(expr, at, end)?;
    Some(ItemExpressionCapture {
        range: text_range(at, scan.end),
        value: &expr[at..scan.end],
        item_type: &expr[scan.name.0..scan.name.1],
        transforms: scan.transforms,
        separator: scan.separator.map(|(s, e)| &expr[s..e]),
        separator_start: scan.separator.map(|(s, _)| s - at),
    })
}

pub(crate) struct ItemVectorScan<'a> {
    pub name: (usize, usize),
    pub transforms: Vec<TransformCapture<'a>>,
    pub separator: Option<(usize, usize)>,
    /// Offset just past the closing `)`.
    pub end: usize,
}

/// The shared item-vector grammar walk, used by captures and by the
/// referenced-name collector.
pub(crate) fn scan_item_vector(expr: &str, at: usize, end: usize) -> Option<ItemVectorScan<'_>> {
    let bytes = &expr.as_bytes()[..end];
    if !bytes[at..].starts_with(b"@(") {
        return None;
    }

    let mut i = skip_whitespace_within(expr, at + 2, end);
    let name_start = i;
    i = scan_name(&expr[..end], i);
    if i == name_start {
        return None;
    }
    let name = (name_start, i);
    i = skip_whitespace_within(expr, i, end);

    let mut transforms = Vec::new();
    while bytes[i..].starts_with(b"->") {
        i = skip_whitespace_within(expr, i + 2, end);
        let transform_start = i;

        if let Some(after) = sink_single_quoted(bytes, i) {
            transforms.push(TransformCapture {
                range: text_range(transform_start, after),
                value: &expr[transform_start..after],
                kind: TransformKind::Quoted {
                    body: &expr[transform_start + 1..after - 1],
                },
            });
            i = after;
        } else {
            let name_end = scan_name(&expr[..end], i);
            if name_end == i {
                return None;
            }
            let open = skip_whitespace_within(expr, name_end, end);
            let after = sink_arguments_in_parentheses(expr, open, end)?;
            let inner = &expr[open + 1..after - 1];
            transforms.push(TransformCapture {
                range: text_range(transform_start, after),
                value: &expr[transform_start..after],
                kind: TransformKind::Function {
                    name: &expr[transform_start..name_end],
                    arguments: (!inner.is_empty()).then_some(inner),
                },
            });
            i = after;
        }
        i = skip_whitespace_within(expr, i, end);
    }

    let mut separator = None;
    if bytes.get(i) == Some(&b',') {
        i = skip_whitespace_within(expr, i + 1, end);
        if bytes.get(i) != Some(&b'\'') {
            return None;
        }
        let open = i + 1;
        let close = bytes[open..].iter().position(|&b| b == b'\'')? + open;
        separator = Some((open, close));
        i = skip_whitespace_within(expr, close + 1, end);
    }

    if bytes.get(i) != Some(&b')') {
        return None;
    }

    Some(ItemVectorScan {
        name,
        transforms,
        separator,
        end: i + 1,
    })
}

#[inline]
fn skip_whitespace_within(expr: &str, from: usize, end: usize) -> usize {
    skip_whitespace(expr, from).min(end)
}

/// Consume `'...'` at `i`; a closing quote must be followed by more text.
fn sink_single_quoted(bytes: &[u8], i: usize) -> Option<usize> {
    if bytes.get(i) != Some(&b'\'') {
        return None;
    }
    let close = bytes[i + 1..].iter().position(|&b| b == b'\'')? + i + 1;
    let after = close + 1;
    (after < bytes.len()).then_some(after)
}
