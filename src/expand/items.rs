//! Item phase: resolves `@(...)` vectors against an [`ItemProvider`].

use std::borrow::Cow;
use std::path::Path;

use crate::base::escaping::{contains_wildcards, escape, unescape};
use crate::base::{ExpandError, ExpanderOptions, Result};
use crate::model::{Item, ItemFactory, ItemProvider};
use crate::scanner::{ItemExpressionCapture, item_vector_captures};

use super::context::ExpansionContext;
use super::transforms::{ItemPair, Pipeline};

/// Pipeline output plus whether it stopped early on a non-empty result.
pub(crate) struct CaptureOutput<'i, S> {
    pub(crate) pairs: Vec<ItemPair<'i, S>>,
    pub(crate) broke_early: bool,
}

pub(crate) struct ItemExpander<'i, 'x, I> {
    items: &'i I,
    options: ExpanderOptions,
    context: &'x ExpansionContext<'x>,
}

impl<'i, 'x, I: ItemProvider> ItemExpander<'i, 'x, I> {
    pub(crate) fn new(
        items: &'i I,
        options: ExpanderOptions,
        context: &'x ExpansionContext<'x>,
    ) -> Self {
        Self {
            items,
            options,
            context,
        }
    }

    /// Run the transforms of one capture over the items of its type.
    pub(crate) fn expand_capture(
        &self,
        capture: &ItemExpressionCapture<'_>,
        include_null_entries: bool,
    ) -> Result<CaptureOutput<'i, I::Item>> {
        let items = self.items.items(capture.item_type);
        if items.is_empty()
            && !capture.has_function("Count")
            && !capture.has_function("AnyHaveMetadataValue")
        {
            return Ok(CaptureOutput {
                pairs: Vec::new(),
                broke_early: false,
            });
        }

        let pipeline = Pipeline {
            context: self.context,
            include_null_entries,
            expression: capture.value,
        };
        let break_on_not_empty = self.options.contains(ExpanderOptions::BREAK_ON_NOT_EMPTY);
        let mut pairs = self.initial_batch(items)?;

        // With the break flag the final step stops at the first non-empty
        // entry; later items are never evaluated.
        let (leading, last) = match capture.transforms.split_last() {
            Some((last, leading)) if break_on_not_empty => (leading, Some(last)),
            _ => (capture.transforms.as_slice(), None),
        };
        for transform in leading {
            pairs = pipeline
                .apply(transform, pairs)
                .map_err(|err| err.with_location(&self.context.location))?;
        }
        let broke_early = match last {
            Some(last) => {
                let (out, found) = pipeline
                    .apply_until_not_empty(last, pairs)
                    .map_err(|err| err.with_location(&self.context.location))?;
                pairs = out;
                found
            }
            None => break_on_not_empty && pairs.iter().any(|pair| !pair.is_empty()),
        };
        if broke_early {
            tracing::trace!("[EXPAND] {} is non-empty, stopping", capture.value);
        }
        Ok(CaptureOutput { pairs, broke_early })
    }

    fn initial_batch(&self, items: &'i [I::Item]) -> Result<Vec<ItemPair<'i, I::Item>>> {
        let mut batch = Vec::with_capacity(items.len());
        for item in items {
            let spec = item.evaluated_include_escaped();
            if !(self.context.itemize_wildcards && contains_wildcards(spec)) {
                batch.push(ItemPair::new(spec, Some(item)));
                continue;
            }

            let pattern = unescape(spec);
            let base = match item.project_directory() {
                Some(directory) => directory.to_path_buf(),
                None => self
                    .context
                    .file_system
                    .current_directory()
                    .map_err(|err| ExpandError::file_system(".", &err))?,
            };
            let files = self
                .context
                .file_system
                .expand_wildcards(Path::new(&base), &pattern)
                .map_err(|err| ExpandError::file_system(&*pattern, &err))?;
            tracing::trace!("[EXPAND] '{}' matched {} file(s)", pattern, files.len());
            batch.extend(
                files
                    .iter()
                    .map(|file| ItemPair::new(escape(file), Some(item))),
            );
        }
        Ok(batch)
    }

    /// Replace every item vector in `expr` with its joined result.
    ///
    /// Placeholders become empty slots, so `@(A->'')` over two items is
    /// `;`. When a vector stops early the text after it is dropped.
    pub(crate) fn expand_into_string<'e>(&self, expr: &'e str) -> Result<Cow<'e, str>> {
        if !expr.contains("@(") {
            return Ok(Cow::Borrowed(expr));
        }
        let mut captures = item_vector_captures(expr, 0, expr.len()).peekable();
        if captures.peek().is_none() {
            return Ok(Cow::Borrowed(expr));
        }

        let mut out = String::with_capacity(expr.len());
        let mut last = 0;
        for capture in captures {
            out.push_str(&expr[last..capture.start()]);
            let output = self.expand_capture(&capture, true)?;
            let joined = join(&capture, &output.pairs);
            if self.options.contains(ExpanderOptions::TRUNCATE) {
                out.push_str(&self.context.truncate(joined));
            } else {
                out.push_str(&joined);
            }
            if output.broke_early {
                return Ok(Cow::Owned(out));
            }
            last = capture.end();
        }
        out.push_str(&expr[last..]);
        Ok(Cow::Owned(out))
    }

    /// Pairs for an expression that is exactly one item vector.
    ///
    /// `None` when items are not being expanded, when there is no vector,
    /// or when the pipeline stopped early.
    pub(crate) fn expand_single_into_pairs(
        &self,
        expr: &str,
        include_null_entries: bool,
    ) -> Result<Option<(Vec<ItemPair<'i, I::Item>>, Option<String>)>> {
        if !self.options.contains(ExpanderOptions::EXPAND_ITEMS) || !expr.contains('@') {
            return Ok(None);
        }
        let mut captures = item_vector_captures(expr, 0, expr.len());
        let Some(capture) = captures.next() else {
            return Ok(None);
        };
        if captures.next().is_some() || capture.value != expr.trim() {
            return Err(ExpandError::ItemVectorConcatenation {
                expression: expr.to_string(),
            }
            .with_location(&self.context.location));
        }

        let output = self.expand_capture(&capture, include_null_entries)?;
        if output.broke_early {
            return Ok(None);
        }
        let joined = capture.separator.map(|_| join(&capture, &output.pairs));
        Ok(Some((output.pairs, joined)))
    }

    /// Turn an exclusive item vector into items made by `factory`.
    pub(crate) fn expand_single_into_items<T, F>(
        &self,
        expr: &str,
        factory: &F,
        include_null_entries: bool,
    ) -> Result<Option<Vec<T>>>
    where
        F: ItemFactory<I::Item, T> + ?Sized,
    {
        let Some((pairs, joined)) = self.expand_single_into_pairs(expr, include_null_entries)? else {
            return Ok(None);
        };
        if let Some(joined) = joined {
            return Ok(Some(if joined.is_empty() {
                Vec::new()
            } else {
                vec![factory.bare(&joined)]
            }));
        }
        Ok(Some(materialize(pairs, factory)))
    }
}

fn join<S>(capture: &ItemExpressionCapture<'_>, pairs: &[ItemPair<'_, S>]) -> String {
    let separator = capture.separator.unwrap_or(";");
    let mut out = String::new();
    for (i, pair) in pairs.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        out.push_str(pair.spec());
    }
    out
}

/// Reuse the source item when the spec is unchanged, derive one when a
/// transform changed it, and make a bare item when there is no source.
fn materialize<S, T, F>(pairs: Vec<ItemPair<'_, S>>, factory: &F) -> Vec<T>
where
    S: Item,
    F: ItemFactory<S, T> + ?Sized,
{
    pairs
        .into_iter()
        .filter_map(|pair| {
            let spec = pair.spec.filter(|s| !s.is_empty())?;
            Some(match pair.source {
                Some(source) if source.evaluated_include_escaped() == spec => factory.reuse(source),
                Some(source) => factory.derive(&spec, source),
                None => factory.bare(&spec),
            })
        })
        .collect()
}
