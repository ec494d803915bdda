//! The `->` transform pipeline over one item vector.
//!
//! Each step consumes the whole batch produced by the previous one and
//! returns a new batch. A step is one of:
//!
//! - a quoted body, expanded per item (`->'%(Filename).obj'`)
//! - an item-spec modifier used as a function (`->FullPath()`)
//! - one of the [`Builtin`] list functions (`->Distinct()`)
//! - any other name, called as a string member on each spec
//!   (`->Replace('a', 'b')`)

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::escaping::{escape, split_semicolon_separated, unescape};
use crate::base::{ExpandError, ExpanderOptions, Result, Value};
use crate::functions::{Argument, CallKind, FunctionCall, LiteralArguments, Target, parse_arguments};
use crate::model::modifiers::{self, ModifierInput};
use crate::model::{FileSystem, Item, MetadataTable, metadata_value_escaped, paths};
use crate::scanner::{MetadataMatch, TransformCapture, TransformKind, classify_metadata_matches};

use super::context::ExpansionContext;
use super::metadata::MetadataExpander;

/// One pipeline element: the current escaped spec and the item it came
/// from.
///
/// `spec` is `None` for a placeholder kept only so the output lines up
/// with the input. `source` is `None` once a step has detached the value
/// from any single item.
pub struct ItemPair<'i, S> {
    pub spec: Option<String>,
    pub source: Option<&'i S>,
}

impl<'i, S> ItemPair<'i, S> {
    pub fn new(spec: impl Into<String>, source: Option<&'i S>) -> Self {
        Self {
            spec: Some(spec.into()),
            source,
        }
    }

    pub fn placeholder(source: Option<&'i S>) -> Self {
        Self { spec: None, source }
    }

    pub fn spec(&self) -> &str {
        self.spec.as_deref().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.spec.as_deref().is_none_or(str::is_empty)
    }
}

impl<S> Clone for ItemPair<'_, S> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            source: self.source,
        }
    }
}

impl<S: Item> fmt::Debug for ItemPair<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemPair")
            .field("spec", &self.spec)
            .field("source", &self.source.map(Item::evaluated_include_escaped))
            .finish()
    }
}

impl<S> PartialEq for ItemPair<'_, S> {
    fn eq(&self, other: &Self) -> bool {
        self.spec == other.spec
            && match (self.source, other.source) {
                (Some(a), Some(b)) => std::ptr::eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

/// Built-in list functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Count,
    Exists,
    Combine,
    GetPathsOfAllDirectoriesAbove,
    DirectoryName,
    Metadata,
    DistinctWithCase,
    Distinct,
    Reverse,
    ClearMetadata,
    HasMetadata,
    WithMetadataValue,
    WithoutMetadataValue,
    AnyHaveMetadataValue,
}

const BUILTINS: &[(&str, Builtin)] = &[
    ("Count", Builtin::Count),
    ("Exists", Builtin::Exists),
    ("Combine", Builtin::Combine),
    (
        "GetPathsOfAllDirectoriesAbove",
        Builtin::GetPathsOfAllDirectoriesAbove,
    ),
    ("DirectoryName", Builtin::DirectoryName),
    ("Metadata", Builtin::Metadata),
    ("DistinctWithCase", Builtin::DistinctWithCase),
    ("Distinct", Builtin::Distinct),
    ("Reverse", Builtin::Reverse),
    ("ClearMetadata", Builtin::ClearMetadata),
    ("HasMetadata", Builtin::HasMetadata),
    ("WithMetadataValue", Builtin::WithMetadataValue),
    ("WithoutMetadataValue", Builtin::WithoutMetadataValue),
    ("AnyHaveMetadataValue", Builtin::AnyHaveMetadataValue),
];

impl Builtin {
    /// Case-insensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        BUILTINS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, b)| *b)
    }

    pub fn name(self) -> &'static str {
        BUILTINS
            .iter()
            .find(|(_, b)| *b == self)
            .map(|(n, _)| *n)
            .unwrap_or_default()
    }

    pub fn arity(self) -> usize {
        match self {
            Self::Combine | Self::Metadata | Self::HasMetadata => 1,
            Self::WithMetadataValue | Self::WithoutMetadataValue | Self::AnyHaveMetadataValue => 2,
            _ => 0,
        }
    }
}

/// Metadata as seen by a quoted transform body.
///
/// Built-in modifiers are computed from the current spec, so they reflect
/// earlier transforms; custom metadata and `RecursiveDir` come from the
/// source item.
struct PairMetadata<'a, S> {
    spec: &'a str,
    source: Option<&'a S>,
    file_system: &'a dyn FileSystem,
}

impl<S: Item> MetadataTable for PairMetadata<'_, S> {
    fn escaped_value(&self, item_type: Option<&str>, name: &str) -> Result<String> {
        if let (Some(wanted), Some(source)) = (item_type, self.source) {
            if !wanted.eq_ignore_ascii_case(source.item_type()) {
                return Ok(String::new());
            }
        }
        match modifiers::canonical(name) {
            Some(modifiers::RECURSIVE_DIR) => match self.source {
                Some(source) => metadata_value_escaped(source, name, self.file_system),
                None => Ok(String::new()),
            },
            Some(modifier) => modifiers::evaluate(
                modifier,
                ModifierInput {
                    current_directory: self.source.and_then(Item::project_directory),
                    item_spec: self.spec,
                    defining_project: self.source.and_then(Item::defining_project_path),
                },
                self.file_system,
            ),
            None => Ok(self
                .source
                .and_then(|source| source.custom_metadata_escaped(name))
                .unwrap_or_default()
                .to_string()),
        }
    }

    fn item_type(&self) -> Option<&str> {
        self.source.map(Item::item_type)
    }
}

/// Whether a step maps each input on its own, so it can be fed one item
/// at a time.
fn runs_per_item(transform: &TransformCapture<'_>) -> bool {
    match transform.kind {
        TransformKind::Quoted { .. } => true,
        TransformKind::Function { name, .. } => !matches!(
            Builtin::from_name(name),
            Some(
                Builtin::Count
                    | Builtin::Reverse
                    | Builtin::Distinct
                    | Builtin::DistinctWithCase
                    | Builtin::GetPathsOfAllDirectoriesAbove
                    | Builtin::AnyHaveMetadataValue
            )
        ),
    }
}

/// Runs transforms for one capture.
pub(crate) struct Pipeline<'x> {
    pub(crate) context: &'x ExpansionContext<'x>,
    pub(crate) include_null_entries: bool,
    /// The whole `@(...)` text, for error messages.
    pub(crate) expression: &'x str,
}

type Batch<'i, S> = Vec<ItemPair<'i, S>>;

impl Pipeline<'_> {
    pub(crate) fn apply<'i, S: Item>(
        &self,
        transform: &TransformCapture<'_>,
        batch: Batch<'i, S>,
    ) -> Result<Batch<'i, S>> {
        match transform.kind {
            TransformKind::Quoted { body } => self.quoted(body, batch),
            TransformKind::Function { name, arguments } => {
                let args = self.arguments(name, arguments)?;
                if modifiers::is_item_spec_modifier(name) {
                    self.expect_arity(name, &args, 0)?;
                    return self.modifier(name, batch);
                }
                match Builtin::from_name(name) {
                    Some(builtin) => {
                        self.expect_arity(builtin.name(), &args, builtin.arity())?;
                        tracing::trace!(
                            "[EXPAND] {} over {} item(s)",
                            builtin.name(),
                            batch.len()
                        );
                        self.builtin(builtin, &args, batch)
                    }
                    None => self.string_function(transform, name, arguments, batch),
                }
            }
        }
    }

    /// Like [`apply`](Self::apply), but stops at the first input whose
    /// output has a non-empty entry. Returns the output so far and whether
    /// it stopped.
    ///
    /// Steps that need the whole batch (`Count()`, `Distinct()`, ...) run
    /// in full first.
    pub(crate) fn apply_until_not_empty<'i, S: Item>(
        &self,
        transform: &TransformCapture<'_>,
        batch: Batch<'i, S>,
    ) -> Result<(Batch<'i, S>, bool)> {
        if !runs_per_item(transform) {
            let out = self.apply(transform, batch)?;
            let found = out.iter().any(|pair| !pair.is_empty());
            return Ok((out, found));
        }
        let mut out = Vec::with_capacity(batch.len());
        for pair in batch {
            let produced = self.apply(transform, vec![pair])?;
            let found = produced.iter().any(|pair| !pair.is_empty());
            out.extend(produced);
            if found {
                return Ok((out, true));
            }
        }
        Ok((out, false))
    }

    fn arguments<'t>(&self, name: &str, arguments: Option<&'t str>) -> Result<Vec<&'t str>> {
        let parsed = parse_arguments(arguments.unwrap_or(""))
            .map_err(|err| ExpandError::invalid_transform(name, self.expression, err.to_string()))?;
        Ok(parsed
            .into_iter()
            .map(|argument| match argument {
                Argument::Text(text) => text,
                Argument::Null | Argument::Out => "",
            })
            .collect())
    }

    fn expect_arity(&self, name: &str, args: &[&str], arity: usize) -> Result<()> {
        if args.len() == arity {
            return Ok(());
        }
        Err(ExpandError::invalid_transform(
            name,
            self.expression,
            format!("expected {arity} argument(s) but found {}", args.len()),
        ))
    }

    /// Push `spec`, or a placeholder when it is empty and placeholders are
    /// wanted.
    fn emit<'i, S>(&self, out: &mut Batch<'i, S>, spec: Option<String>, source: Option<&'i S>) {
        match spec.filter(|s| !s.is_empty()) {
            Some(spec) => out.push(ItemPair::new(spec, source)),
            None if self.include_null_entries => out.push(ItemPair::placeholder(source)),
            None => {}
        }
    }

    /// Directory relative specs of `source` resolve against.
    fn base_directory<S: Item>(&self, source: Option<&S>) -> Result<String> {
        if let Some(directory) = source.and_then(Item::project_directory) {
            return Ok(directory.to_string_lossy().into_owned());
        }
        self.context
            .file_system
            .current_directory()
            .map(|cwd| cwd.to_string_lossy().into_owned())
            .map_err(|err| ExpandError::file_system(".", &err))
    }

    fn rooted<S: Item>(&self, spec: &str, source: Option<&S>) -> Result<String> {
        let unescaped = unescape(spec);
        if paths::is_rooted(&unescaped) {
            return Ok(unescaped.into_owned());
        }
        Ok(paths::combine(&self.base_directory(source)?, &unescaped))
    }

    fn quoted<'i, S: Item>(&self, body: &str, batch: Batch<'i, S>) -> Result<Batch<'i, S>> {
        let match_kind = classify_metadata_matches(body);
        let mut out = Vec::with_capacity(batch.len());
        for pair in batch {
            let Some(spec) = pair.spec.as_deref() else {
                self.emit(&mut out, None, pair.source);
                continue;
            };
            let table = PairMetadata {
                spec,
                source: pair.source,
                file_system: self.context.file_system,
            };
            let include = match match_kind {
                MetadataMatch::None => body.to_string(),
                MetadataMatch::WholeString | MetadataMatch::Partial | MetadataMatch::Multiple => {
                    MetadataExpander::new(&table, ExpanderOptions::EXPAND_METADATA, self.context)
                        .expand(body)?
                        .into_owned()
                }
            };
            self.emit(&mut out, Some(include), pair.source);
        }
        Ok(out)
    }

    fn modifier<'i, S: Item>(&self, name: &str, batch: Batch<'i, S>) -> Result<Batch<'i, S>> {
        let mut out = Vec::with_capacity(batch.len());
        for pair in batch {
            let Some(spec) = pair.spec.as_deref() else {
                self.emit(&mut out, None, pair.source);
                continue;
            };
            let table = PairMetadata {
                spec,
                source: pair.source,
                file_system: self.context.file_system,
            };
            let value = table.escaped_value(None, name)?;
            self.emit(&mut out, Some(value), pair.source);
        }
        Ok(out)
    }

    fn string_function<'i, S: Item>(
        &self,
        transform: &TransformCapture<'_>,
        name: &str,
        arguments: Option<&str>,
        batch: Batch<'i, S>,
    ) -> Result<Batch<'i, S>> {
        let location = &self.context.location;
        let call = FunctionCall {
            expression: transform.value,
            target: Target::Instance { receiver: None },
            name,
            kind: CallKind::Method,
            arguments: parse_arguments(arguments.unwrap_or("")).map_err(|err| {
                ExpandError::invalid_transform(name, self.expression, err.to_string())
            })?,
            remainder: "",
        };
        let env = self.context.call_env();
        tracing::trace!("[EXPAND] string function {} over {} item(s)", name, batch.len());

        let mut out = Vec::with_capacity(batch.len());
        for pair in batch {
            let Some(spec) = pair.spec else {
                self.emit(&mut out, None, pair.source);
                continue;
            };
            let result = self.context.resolver.execute_in(
                self.expression,
                &call,
                Some(Value::Str(spec)),
                &mut LiteralArguments,
                &env,
                location,
            )?;
            let result = match result {
                Value::Null => None,
                other => Some(other.into_escaped_string()),
            };
            self.emit(&mut out, result, pair.source);
        }
        Ok(out)
    }

    fn builtin<'i, S: Item>(
        &self,
        builtin: Builtin,
        args: &[&str],
        batch: Batch<'i, S>,
    ) -> Result<Batch<'i, S>> {
        let fs = self.context.file_system;
        match builtin {
            Builtin::Count => Ok(vec![ItemPair::new(batch.len().to_string(), None)]),
            Builtin::Reverse => Ok(batch.into_iter().rev().collect()),
            Builtin::ClearMetadata => Ok(batch
                .into_iter()
                .map(|pair| ItemPair {
                    spec: pair.spec,
                    source: None,
                })
                .collect()),
            Builtin::DistinctWithCase => {
                let mut seen = FxHashSet::default();
                Ok(batch
                    .into_iter()
                    .filter(|pair| seen.insert(pair.spec.clone()))
                    .collect())
            }
            Builtin::Distinct => {
                let mut seen = FxHashSet::default();
                Ok(batch
                    .into_iter()
                    .filter(|pair| seen.insert(pair.spec.as_deref().map(str::to_lowercase)))
                    .collect())
            }
            Builtin::Exists => {
                let mut out = Vec::with_capacity(batch.len());
                for pair in batch {
                    let exists = match pair.spec.as_deref() {
                        Some(spec) if !spec.is_empty() => {
                            fs.exists(Path::new(&self.rooted(spec, pair.source)?))
                        }
                        _ => false,
                    };
                    if exists {
                        out.push(pair);
                    }
                }
                Ok(out)
            }
            Builtin::Combine => {
                let relative = unescape(args[0]);
                Ok(batch
                    .into_iter()
                    .map(|pair| match pair.spec {
                        Some(spec) => {
                            let combined = paths::combine(&unescape(&spec), &relative);
                            ItemPair::new(escape(&combined).into_owned(), None)
                        }
                        None => pair,
                    })
                    .collect())
            }
            Builtin::GetPathsOfAllDirectoriesAbove => {
                // Keyed by uppercase: case-insensitive, sorted by the
                // uppercased text.
                let mut directories: BTreeMap<String, String> = BTreeMap::new();
                for pair in &batch {
                    let Some(spec) = pair.spec.as_deref().filter(|s| !s.is_empty()) else {
                        continue;
                    };
                    let full = paths::normalize(&self.rooted(spec, pair.source)?);
                    for directory in paths::ancestors(&full) {
                        directories
                            .entry(directory.to_uppercase())
                            .or_insert(directory);
                    }
                }
                Ok(directories
                    .into_values()
                    .map(|directory| ItemPair::new(escape(&directory).into_owned(), None))
                    .collect())
            }
            Builtin::DirectoryName => {
                let mut memo: FxHashMap<String, Option<String>> = FxHashMap::default();
                let mut out = Vec::with_capacity(batch.len());
                for pair in batch {
                    let Some(spec) = pair.spec.as_deref() else {
                        self.emit(&mut out, None, pair.source);
                        continue;
                    };
                    let key = unescape(spec).into_owned();
                    let directory = match memo.get(&key) {
                        Some(cached) => cached.clone(),
                        None => {
                            let rooted = self.rooted(spec, pair.source)?;
                            let directory = paths::directory_name(&rooted)
                                .map(|d| escape(&d).into_owned());
                            memo.insert(key, directory.clone());
                            directory
                        }
                    };
                    self.emit(&mut out, directory, pair.source);
                }
                Ok(out)
            }
            Builtin::Metadata => {
                let name = args[0];
                let mut out = Vec::with_capacity(batch.len());
                for pair in batch {
                    let value = match pair.source {
                        Some(source) => metadata_value_escaped(source, name, fs)?,
                        None => String::new(),
                    };
                    // Items without the metadata drop out; no placeholder
                    if value.contains(';') {
                        for part in split_semicolon_separated(&value) {
                            out.push(ItemPair::new(part, pair.source));
                        }
                    } else if !value.is_empty() {
                        out.push(ItemPair::new(value, pair.source));
                    }
                }
                Ok(out)
            }
            Builtin::HasMetadata => {
                let name = args[0];
                let mut out = Vec::with_capacity(batch.len());
                for pair in batch {
                    if !self.metadata_of(&pair, name)?.is_empty() {
                        out.push(pair);
                    }
                }
                Ok(out)
            }
            Builtin::WithMetadataValue | Builtin::WithoutMetadataValue => {
                let (name, wanted) = (args[0], args[1]);
                let keep_matches = builtin == Builtin::WithMetadataValue;
                let mut out = Vec::with_capacity(batch.len());
                for pair in batch {
                    let matches = pair.source.is_some()
                        && self.metadata_of(&pair, name)?.eq_ignore_ascii_case(wanted);
                    if matches == keep_matches {
                        out.push(pair);
                    }
                }
                Ok(out)
            }
            Builtin::AnyHaveMetadataValue => {
                let (name, wanted) = (args[0], args[1]);
                let mut found = false;
                for pair in &batch {
                    if pair.source.is_some()
                        && self.metadata_of(pair, name)?.eq_ignore_ascii_case(wanted)
                    {
                        found = true;
                        break;
                    }
                }
                Ok(vec![ItemPair::new(
                    if found { "true" } else { "false" },
                    None,
                )])
            }
        }
    }

    fn metadata_of<S: Item>(&self, pair: &ItemPair<'_, S>, name: &str) -> Result<Cow<'static, str>> {
        match pair.source {
            Some(source) => Ok(Cow::Owned(metadata_value_escaped(
                source,
                name,
                self.context.file_system,
            )?)),
            None => Ok(Cow::Borrowed("")),
        }
    }
}
