//! Extraction of a property-function call from a `$(...)` body.

use crate::base::{ElementLocation, ExpandError, Result, names};
use crate::scanner::{SplitError, scan_for_closing_paren, split_top_level_commas};

/// One unevaluated argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument<'b> {
    /// The literal token `null`.
    Null,
    /// The `out _` placeholder.
    Out,
    /// Argument text with surrounding quotes removed, still unexpanded.
    Text(&'b str),
}

impl<'b> Argument<'b> {
    /// Interpret one trimmed argument.
    pub fn from_text(text: &'b str) -> Self {
        if text.eq_ignore_ascii_case("null") {
            return Self::Null;
        }
        if is_out_placeholder(text) {
            return Self::Out;
        }
        Self::Text(dequote(text))
    }
}

fn is_out_placeholder(text: &str) -> bool {
    text.strip_prefix("out")
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_whitespace()))
        .is_some_and(|rest| rest.trim() == "_")
}

/// Strip every leading and trailing quote of the kind that opens and
/// closes `text`.
pub fn dequote(text: &str) -> &str {
    let bytes = text.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(&q), Some(&l)) if q == l && matches!(q, b'\'' | b'`' | b'"') => {
            text.trim_matches(char::from(q))
        }
        _ => text,
    }
}

/// Split and interpret the text between a call's parentheses.
///
/// Empty text is no arguments; anything else, even whitespace, is at least
/// one.
pub fn parse_arguments(content: &str) -> std::result::Result<Vec<Argument<'_>>, SplitError> {
    if content.is_empty() {
        return Ok(Vec::new());
    }
    Ok(split_top_level_commas(content)?
        .into_iter()
        .map(Argument::from_text)
        .collect())
}

/// Who receives the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'b> {
    /// `[Type]::Member`
    Static { type_name: &'b str },
    /// `Receiver.Member` on first entry (`receiver` names a property), or
    /// `.Member` on a previous result.
    Instance { receiver: Option<&'b str> },
    /// `[index]` on a previous result.
    Indexer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Called with an argument list.
    Method,
    /// Accessed without parentheses.
    Property,
    Indexer,
}

/// A parsed call plus whatever follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall<'b> {
    /// The text this call was extracted from.
    pub expression: &'b str,
    pub target: Target<'b>,
    /// Member name; empty for indexers.
    pub name: &'b str,
    pub kind: CallKind,
    pub arguments: Vec<Argument<'b>>,
    /// Trailing `.Next(...)` or `[index]` text, trimmed.
    pub remainder: &'b str,
}

struct Tail<'b> {
    name: &'b str,
    kind: CallKind,
    arguments: Vec<Argument<'b>>,
    remainder: &'b str,
}

impl<'b> FunctionCall<'b> {
    /// Extract the first call of a property body.
    ///
    /// Equivalent to [`FunctionCall::extract_on`] with no previous result.
    pub fn extract(body: &'b str, location: &ElementLocation) -> Result<Self> {
        Self::extract_on(body, false, location)
    }

    /// Extract a call; `chained` is set when the receiver is the result of
    /// a previous call rather than a named property.
    pub fn extract_on(body: &'b str, chained: bool, location: &ElementLocation) -> Result<Self> {
        Self::parse(body.trim(), chained).map_err(|err| err.with_location(location))
    }

    fn parse(expr: &'b str, chained: bool) -> Result<Self> {
        let invalid = |message: &str| ExpandError::invalid_function(format!("$({expr})"), message);

        let paren = expr.find('(');
        let root = &expr[..paren.unwrap_or(expr.len())];
        if root.trim().is_empty() {
            return Err(invalid("expected a function call"));
        }

        if !chained && root.starts_with('[') {
            let close = root
                .find(']')
                .ok_or_else(|| invalid("expected \"[Type]::Member\""))?;
            let type_name = root[1..close].trim();
            let after = close + 1;
            if type_name.is_empty()
                || !root[after..].starts_with("::")
                || root.len() <= after + 2
            {
                return Err(invalid("expected \"[Type]::Member\""));
            }
            let tail = Self::parse_member(expr, paren, after + 2)?;
            return Ok(Self::assemble(expr, Target::Static { type_name }, tail));
        }

        if expr.starts_with('[') {
            let close = expr[1..]
                .find(']')
                .map(|p| p + 1)
                .ok_or_else(|| invalid("mismatched square brackets"))?;
            let arguments = parse_arguments(&expr[1..close]).map_err(|e| invalid(&e.to_string()))?;
            let remainder = expr[close + 1..].trim();
            check_remainder(remainder).map_err(|()| invalid("unexpected text after indexer"))?;
            return Ok(Self {
                expression: expr,
                target: Target::Indexer,
                name: "",
                kind: CallKind::Indexer,
                arguments,
                remainder,
            });
        }

        let dot = root
            .find('.')
            .ok_or_else(|| invalid("expected \"Property.Member\""))?;
        let receiver = root[..dot].trim();
        if !chained && !names::is_valid_name(receiver) {
            return Err(invalid("the receiver is not a valid property name"));
        }
        let tail = Self::parse_member(expr, paren, dot + 1)?;
        let target = Target::Instance {
            receiver: (!chained).then_some(receiver),
        };
        Ok(Self::assemble(expr, target, tail))
    }

    fn parse_member(expr: &'b str, paren: Option<usize>, start: usize) -> Result<Tail<'b>> {
        let invalid = |message: &str| ExpandError::invalid_function(format!("$({expr})"), message);

        let tail = match paren {
            Some(open) if !expr[start..open].contains('.') => {
                let close = scan_for_closing_paren(expr, open + 1)
                    .ok_or_else(|| invalid("mismatched parenthesis"))?
                    .close;
                let arguments =
                    parse_arguments(&expr[open + 1..close]).map_err(|e| invalid(&e.to_string()))?;
                Tail {
                    name: expr[start..open].trim(),
                    kind: CallKind::Method,
                    arguments,
                    remainder: expr[close + 1..].trim(),
                }
            }
            _ => {
                let rest = &expr[start..];
                let end = rest.find(['.', '[']).unwrap_or(rest.len());
                Tail {
                    name: rest[..end].trim(),
                    kind: CallKind::Property,
                    arguments: Vec::new(),
                    remainder: rest[end..].trim(),
                }
            }
        };

        if tail.name.is_empty() {
            return Err(invalid("missing member name"));
        }
        check_remainder(tail.remainder).map_err(|()| invalid("unexpected text after call"))?;
        Ok(tail)
    }

    fn assemble(expression: &'b str, target: Target<'b>, tail: Tail<'b>) -> Self {
        Self {
            expression,
            target,
            name: tail.name,
            kind: tail.kind,
            arguments: tail.arguments,
            remainder: tail.remainder,
        }
    }

    /// The property named by the first call of a chain.
    pub fn receiver_name(&self) -> Option<&'b str> {
        match self.target {
            Target::Instance { receiver } => receiver,
            _ => None,
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self.target, Target::Static { .. })
    }
}

fn check_remainder(remainder: &str) -> std::result::Result<(), ()> {
    if remainder.is_empty() || remainder.starts_with(['.', '[']) {
        Ok(())
    } else {
        Err(())
    }
}
