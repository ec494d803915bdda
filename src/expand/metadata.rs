//! Metadata phase: rewrites `%(Name)` and `%(Type.Name)` references.

use std::borrow::Cow;

use crate::base::{ExpanderOptions, Result};
use crate::model::{ITEM_REFERENCING_SELF, MetadataTable, modifiers};
use crate::scanner::{ItemExpressionCapture, MetadataCapture, item_vector_captures, metadata_captures};

use super::context::ExpansionContext;

pub(crate) struct MetadataExpander<'x> {
    table: &'x dyn MetadataTable,
    options: ExpanderOptions,
    context: &'x ExpansionContext<'x>,
}

impl<'x> MetadataExpander<'x> {
    pub(crate) fn new(
        table: &'x dyn MetadataTable,
        options: ExpanderOptions,
        context: &'x ExpansionContext<'x>,
    ) -> Self {
        Self {
            table,
            options,
            context,
        }
    }

    /// Expand every metadata reference outside item-vector transforms.
    ///
    /// Quoted transform bodies are left alone: the item phase expands them
    /// per item. Separator literals are not transforms and are expanded here.
    pub(crate) fn expand<'e>(&self, expr: &'e str) -> Result<Cow<'e, str>> {
        if !expr.contains("%(") {
            return Ok(Cow::Borrowed(expr));
        }
        if !expr.contains("@(") {
            return self.replace_all(expr);
        }

        let mut out = String::with_capacity(expr.len());
        let mut last = 0;
        for capture in item_vector_captures(expr, 0, expr.len()) {
            out.push_str(&self.replace_all(&expr[last..capture.start()])?);
            self.push_item_vector(&mut out, &capture)?;
            last = capture.end();
        }
        out.push_str(&self.replace_all(&expr[last..])?);
        Ok(Cow::Owned(out))
    }

    fn push_item_vector(&self, out: &mut String, capture: &ItemExpressionCapture<'_>) -> Result<()> {
        match (capture.separator, capture.separator_start) {
            (Some(separator), Some(start)) if separator.contains("%(") => {
                let end = start + separator.len();
                out.push_str(&capture.value[..start]);
                out.push_str(&self.replace_all(separator)?);
                out.push_str(&capture.value[end..]);
            }
            _ => out.push_str(capture.value),
        }
        Ok(())
    }

    fn replace_all<'e>(&self, text: &'e str) -> Result<Cow<'e, str>> {
        let mut captures = metadata_captures(text).peekable();
        if captures.peek().is_none() {
            return Ok(Cow::Borrowed(text));
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for capture in captures {
            out.push_str(&text[last..capture.start()]);
            out.push_str(&self.substitute(&capture)?);
            last = capture.end();
        }
        out.push_str(&text[last..]);
        Ok(Cow::Owned(out))
    }

    fn substitute<'c>(&self, capture: &MetadataCapture<'c>) -> Result<Cow<'c, str>> {
        let gate = if modifiers::is_item_spec_modifier(capture.name) {
            ExpanderOptions::EXPAND_BUILT_IN_METADATA
        } else {
            ExpanderOptions::EXPAND_CUSTOM_METADATA
        };
        if !self.options.contains(gate) {
            return Ok(Cow::Borrowed(capture.value));
        }

        let value = self.table.escaped_value(capture.item_type, capture.name)?;
        tracing::trace!("[EXPAND] {} -> '{}'", capture.value, value);
        self.log_self_reference(capture);

        if self.options.contains(ExpanderOptions::TRUNCATE) {
            Ok(Cow::Owned(self.context.truncate(value)))
        } else {
            Ok(Cow::Owned(value))
        }
    }

    fn log_self_reference(&self, capture: &MetadataCapture<'_>) {
        if !self
            .options
            .contains(ExpanderOptions::LOG_ON_ITEM_METADATA_SELF_REFERENCE)
        {
            return;
        }
        let current = self
            .table
            .item_type()
            .or(self.context.batched_item_type.as_deref());
        // Item types compare exactly here, unlike lookups
        if let Some(current) = current {
            if capture.item_type.is_none_or(|referenced| referenced == current) {
                self.context
                    .logging
                    .log_low_importance(ITEM_REFERENCING_SELF, &[current, capture.name]);
            }
        }
    }
}
