//! The public façade over the three phases.

use std::borrow::Cow;

use crate::base::escaping::{split_semicolon_separated, unescape};
use crate::base::{ExpanderOptions, Result, Value};
use crate::model::{ItemFactory, ItemProvider, MetadataTable, ProjectItem, PropertyProvider};
use crate::scanner::ItemExpressionCapture;

use super::context::ExpansionContext;
use super::items::ItemExpander;
use super::metadata::MetadataExpander;
use super::properties::PropertyExpander;
use super::transforms::ItemPair;

/// An item provider with no items of any type.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoItems;

impl ItemProvider for NoItems {
    type Item = ProjectItem;

    fn items(&self, _item_type: &str) -> &[ProjectItem] {
        &[]
    }
}

#[derive(Clone, Copy)]
enum Phase {
    Metadata,
    Properties,
    Items,
}

/// Expands metadata, then properties, then items.
///
/// The order is fixed: text substituted by one phase is never rescanned by
/// an earlier one, so a property whose value looks like `%(X)` stays as is.
///
/// ```
/// use buildexpr::{Expander, ExpanderOptions, PropertyDictionary};
///
/// let properties = PropertyDictionary::new().with("Configuration", "Debug");
/// let expander = Expander::new(&properties);
/// let value = expander
///     .expand_into_string_and_unescape("bin/$(Configuration)/", ExpanderOptions::EXPAND_PROPERTIES)
///     .unwrap();
/// assert_eq!(value, "bin/Debug/");
/// ```
pub struct Expander<'a, I = NoItems> {
    properties: &'a dyn PropertyProvider,
    items: &'a I,
    metadata: Option<&'a dyn MetadataTable>,
    context: ExpansionContext<'a>,
}

impl<'a> Expander<'a, NoItems> {
    pub fn new(properties: &'a dyn PropertyProvider) -> Self {
        Self {
            properties,
            items: &NoItems,
            metadata: None,
            context: ExpansionContext::default(),
        }
    }
}

impl<'a, I: ItemProvider> Expander<'a, I> {
    pub fn with_items<J: ItemProvider>(self, items: &'a J) -> Expander<'a, J> {
        Expander {
            properties: self.properties,
            items,
            metadata: self.metadata,
            context: self.context,
        }
    }

    pub fn with_metadata(mut self, metadata: &'a dyn MetadataTable) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_context(mut self, context: ExpansionContext<'a>) -> Self {
        self.context = context;
        self
    }

    pub fn context(&self) -> &ExpansionContext<'a> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ExpansionContext<'a> {
        &mut self.context
    }

    /// Expand and unescape; the form for values handed outside the build.
    pub fn expand_into_string_and_unescape(
        &self,
        expr: &str,
        options: ExpanderOptions,
    ) -> Result<String> {
        let escaped = self.expand_into_string_leave_escaped(expr, options)?;
        Ok(unescape(&escaped).into_owned())
    }

    /// Expand to one escaped string.
    ///
    /// Text without anything to expand comes back borrowed.
    pub fn expand_into_string_leave_escaped<'e>(
        &self,
        expr: &'e str,
        options: ExpanderOptions,
    ) -> Result<Cow<'e, str>> {
        let expanded = self.run(Phase::Metadata, Cow::Borrowed(expr), options)?;
        let expanded = self.run(Phase::Properties, expanded, options)?;
        self.run(Phase::Items, expanded, options)
    }

    /// Expand, keeping the type of a lone property reference.
    pub fn expand_property_value(&self, expr: &str, options: ExpanderOptions) -> Result<Value> {
        let expanded = self.run(Phase::Metadata, Cow::Borrowed(expr), options)?;
        let value = if options.contains(ExpanderOptions::EXPAND_PROPERTIES) {
            PropertyExpander::new(self.properties, options, &self.context)
                .expand_typed(&expanded)?
        } else {
            Value::Str(expanded.into_owned())
        };
        match value {
            Value::Str(s) if options.contains(ExpanderOptions::EXPAND_ITEMS) => {
                Ok(Value::Str(self.phase(Phase::Items, &s, options)?.into_owned()))
            }
            other => Ok(other),
        }
    }

    /// Expand, then split on unescaped semicolons.
    pub fn expand_into_strings_leave_escaped(
        &self,
        expr: &str,
        options: ExpanderOptions,
    ) -> Result<Vec<String>> {
        let expanded = self.expand_into_string_leave_escaped(expr, options)?;
        Ok(split_semicolon_separated(&expanded)
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Expand into items with every category this expander has data for.
    pub fn expand_into_items<T, F>(&self, expr: &str, factory: &F) -> Result<Vec<T>>
    where
        F: ItemFactory<I::Item, T> + ?Sized,
    {
        let options = if self.metadata.is_some() {
            ExpanderOptions::EXPAND_ALL
        } else {
            ExpanderOptions::EXPAND_PROPERTIES_AND_ITEMS
        };
        self.expand_into_items_with_options(expr, factory, options)
    }

    /// Expand metadata and properties, split on semicolons, and turn each
    /// piece into items.
    ///
    /// A piece that is exactly one item vector yields that vector's items;
    /// any other piece becomes one item with the piece as its spec.
    pub fn expand_into_items_with_options<T, F>(
        &self,
        expr: &str,
        factory: &F,
        options: ExpanderOptions,
    ) -> Result<Vec<T>>
    where
        F: ItemFactory<I::Item, T> + ?Sized,
    {
        let expanded = self.run(Phase::Metadata, Cow::Borrowed(expr), options)?;
        let expanded = self.run(Phase::Properties, expanded, options)?;
        let items = ItemExpander::new(self.items, options, &self.context);

        let mut result = Vec::new();
        for piece in split_semicolon_separated(&expanded) {
            match items.expand_single_into_items(piece, factory, false)? {
                Some(expanded) => result.extend(expanded),
                None => result.push(factory.bare(piece)),
            }
        }
        Ok(result)
    }

    /// Items for an expression that must be exactly one `@(...)`.
    ///
    /// Returns `None` when `options` exclude items, when there is no item
    /// vector, or when `BREAK_ON_NOT_EMPTY` stopped on a non-empty result.
    /// The expression is not property- or metadata-expanded first.
    pub fn expand_single_item_vector_expression_into_items<T, F>(
        &self,
        expr: &str,
        factory: &F,
        options: ExpanderOptions,
        include_null_entries: bool,
    ) -> Result<Option<Vec<T>>>
    where
        F: ItemFactory<I::Item, T> + ?Sized,
    {
        ItemExpander::new(self.items, options, &self.context).expand_single_into_items(
            expr,
            factory,
            include_null_entries,
        )
    }

    /// Run the transform pipeline of `capture`.
    ///
    /// `None` when `BREAK_ON_NOT_EMPTY` stopped on a non-empty result. With
    /// `include_null_entries` the output keeps one entry per input item for
    /// the steps that can produce nothing.
    pub fn expand_expression_capture(
        &self,
        capture: &ItemExpressionCapture<'_>,
        options: ExpanderOptions,
        include_null_entries: bool,
    ) -> Result<Option<Vec<ItemPair<'a, I::Item>>>> {
        let output = ItemExpander::new(self.items, options, &self.context)
            .expand_capture(capture, include_null_entries)?;
        Ok((!output.broke_early).then_some(output.pairs))
    }

    /// Like [`Expander::expand_into_items_with_options`], but returns the
    /// escaped specs paired with the items they came from.
    pub fn expand_into_item_list_leave_escaped(
        &self,
        expr: &str,
        options: ExpanderOptions,
    ) -> Result<Vec<ItemPair<'a, I::Item>>> {
        let expanded = self.run(Phase::Metadata, Cow::Borrowed(expr), options)?;
        let expanded = self.run(Phase::Properties, expanded, options)?;
        let items = ItemExpander::new(self.items, options, &self.context);

        let mut result = Vec::new();
        for piece in split_semicolon_separated(&expanded) {
            match items.expand_single_into_pairs(piece, false)? {
                Some((_, Some(joined))) => {
                    if !joined.is_empty() {
                        result.push(ItemPair::new(joined, None));
                    }
                }
                Some((pairs, None)) => result.extend(pairs.into_iter().filter(|p| !p.is_empty())),
                None => result.push(ItemPair::new(piece, None)),
            }
        }
        Ok(result)
    }

    /// Apply one phase, keeping a borrowed input borrowed when nothing
    /// changed.
    fn run<'e>(
        &self,
        phase: Phase,
        input: Cow<'e, str>,
        options: ExpanderOptions,
    ) -> Result<Cow<'e, str>> {
        match input {
            Cow::Borrowed(s) => self.phase(phase, s, options),
            Cow::Owned(s) => {
                let changed = match self.phase(phase, &s, options)? {
                    Cow::Borrowed(_) => None,
                    Cow::Owned(out) => Some(out),
                };
                Ok(Cow::Owned(changed.unwrap_or(s)))
            }
        }
    }

    fn phase<'e>(&self, phase: Phase, expr: &'e str, options: ExpanderOptions) -> Result<Cow<'e, str>> {
        match phase {
            Phase::Metadata => {
                if !options.intersects(ExpanderOptions::EXPAND_METADATA) {
                    return Ok(Cow::Borrowed(expr));
                }
                let Some(table) = self.metadata else {
                    panic!("metadata expansion requested without a metadata table");
                };
                MetadataExpander::new(table, options, &self.context).expand(expr)
            }
            Phase::Properties => {
                if !options.contains(ExpanderOptions::EXPAND_PROPERTIES) {
                    return Ok(Cow::Borrowed(expr));
                }
                PropertyExpander::new(self.properties, options, &self.context).expand(expr)
            }
            Phase::Items => {
                if !options.contains(ExpanderOptions::EXPAND_ITEMS) {
                    return Ok(Cow::Borrowed(expr));
                }
                ItemExpander::new(self.items, options, &self.context).expand_into_string(expr)
            }
        }
    }
}
