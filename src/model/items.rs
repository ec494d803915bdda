//! Items, item collections and item construction.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::Result;
use crate::base::escaping::contains_wildcards;

use super::fs::{FileSystem, WildcardPattern};
use super::modifiers::{self, ModifierInput};

/// An evaluated item as the expander sees it.
pub trait Item {
    fn item_type(&self) -> &str;

    /// The escaped include (item spec).
    fn evaluated_include_escaped(&self) -> &str;

    /// The escaped include as written, before wildcards were expanded.
    fn include_before_wildcard_escaped(&self) -> &str {
        self.evaluated_include_escaped()
    }

    /// Directory relative item specs are resolved against.
    fn project_directory(&self) -> Option<&Path>;

    /// Full path of the project file that defined the item.
    fn defining_project_path(&self) -> Option<&Path> {
        None
    }

    /// Escaped value of custom (user-declared) metadata.
    fn custom_metadata_escaped(&self, name: &str) -> Option<&str>;
}

/// Escaped metadata value of `item`, built-in or custom; `""` when unset.
pub fn metadata_value_escaped<I: Item + ?Sized>(
    item: &I,
    name: &str,
    fs: &dyn FileSystem,
) -> Result<String> {
    match modifiers::canonical(name) {
        Some(modifiers::RECURSIVE_DIR) => Ok(recursive_dir(item)),
        Some(modifier) => modifiers::evaluate(
            modifier,
            ModifierInput {
                current_directory: item.project_directory(),
                item_spec: item.evaluated_include_escaped(),
                defining_project: item.defining_project_path(),
            },
            fs,
        ),
        None => Ok(item
            .custom_metadata_escaped(name)
            .unwrap_or_default()
            .to_string()),
    }
}

/// What `**` matched for an item that came from a wildcard include.
fn recursive_dir<I: Item + ?Sized>(item: &I) -> String {
    let before = item.include_before_wildcard_escaped();
    if !contains_wildcards(before) {
        return String::new();
    }
    WildcardPattern::split(before).recursive_part(item.evaluated_include_escaped())
}

/// Items grouped by type.
pub trait ItemProvider {
    type Item: Item;

    /// All items of `item_type` (case-insensitive); empty when unknown.
    fn items(&self, item_type: &str) -> &[Self::Item];
}

/// Builds the items an item expansion returns.
///
/// `S` is the source item type, `T` the produced type.
pub trait ItemFactory<S, T> {
    /// The transform left the source item unchanged.
    fn reuse(&self, source: &S) -> T;

    /// A new spec that inherits the source item's metadata.
    fn derive(&self, spec: &str, source: &S) -> T;

    /// A spec with no source item.
    fn bare(&self, spec: &str) -> T;
}

/// An in-memory item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectItem {
    item_type: SmolStr,
    include: String,
    include_before_wildcard: Option<String>,
    project_directory: Option<PathBuf>,
    defining_project: Option<PathBuf>,
    /// Lowercased name → (name as written, escaped value)
    metadata: IndexMap<String, (String, String)>,
}

impl ProjectItem {
    /// A new item; `include` is escaped.
    pub fn new(item_type: impl Into<SmolStr>, include: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            include: include.into(),
            include_before_wildcard: None,
            project_directory: None,
            defining_project: None,
            metadata: IndexMap::new(),
        }
    }

    pub fn with_metadata(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_metadata(name, value);
        self
    }

    pub fn in_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.project_directory = Some(directory.into());
        self
    }

    pub fn defined_in(mut self, project: impl Into<PathBuf>) -> Self {
        self.defining_project = Some(project.into());
        self
    }

    pub fn with_include_before_wildcard(mut self, include: impl Into<String>) -> Self {
        self.include_before_wildcard = Some(include.into());
        self
    }

    pub fn set_metadata(&mut self, name: &str, value: impl Into<String>) {
        self.metadata
            .insert(name.to_ascii_lowercase(), (name.to_string(), value.into()));
    }

    /// Custom metadata in declaration order.
    pub fn metadata(&self) -> impl Iterator<Item = (&str, &str)> {
        self.metadata
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn metadata_count(&self) -> usize {
        self.metadata.len()
    }

    /// A copy with a new include and the same metadata.
    pub fn with_include(&self, include: impl Into<String>) -> Self {
        Self {
            include: include.into(),
            include_before_wildcard: None,
            ..self.clone()
        }
    }
}

impl Item for ProjectItem {
    fn item_type(&self) -> &str {
        &self.item_type
    }

    fn evaluated_include_escaped(&self) -> &str {
        &self.include
    }

    fn include_before_wildcard_escaped(&self) -> &str {
        self.include_before_wildcard.as_deref().unwrap_or(&self.include)
    }

    fn project_directory(&self) -> Option<&Path> {
        self.project_directory.as_deref()
    }

    fn defining_project_path(&self) -> Option<&Path> {
        self.defining_project.as_deref()
    }

    fn custom_metadata_escaped(&self, name: &str) -> Option<&str> {
        let found = if name.bytes().any(|b| b.is_ascii_uppercase()) {
            self.metadata.get(&name.to_ascii_lowercase())
        } else {
            self.metadata.get(name)
        };
        found.map(|(_, value)| value.as_str())
    }
}

/// Produces [`ProjectItem`]s of one item type.
#[derive(Debug, Clone, Default)]
pub struct ProjectItemFactory {
    item_type: SmolStr,
    project_directory: Option<PathBuf>,
}

impl ProjectItemFactory {
    pub fn new(item_type: impl Into<SmolStr>) -> Self {
        Self {
            item_type: item_type.into(),
            project_directory: None,
        }
    }

    pub fn in_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.project_directory = Some(directory.into());
        self
    }
}

impl ItemFactory<ProjectItem, ProjectItem> for ProjectItemFactory {
    fn reuse(&self, source: &ProjectItem) -> ProjectItem {
        let mut item = source.clone();
        item.item_type = self.item_type.clone();
        item
    }

    fn derive(&self, spec: &str, source: &ProjectItem) -> ProjectItem {
        let mut item = source.with_include(spec);
        item.item_type = self.item_type.clone();
        item
    }

    fn bare(&self, spec: &str) -> ProjectItem {
        let mut item = ProjectItem::new(self.item_type.clone(), spec);
        item.project_directory = self.project_directory.clone();
        item
    }
}

/// Produces plain escaped strings, for callers that only want specs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecFactory;

impl<S: Item> ItemFactory<S, String> for SpecFactory {
    fn reuse(&self, source: &S) -> String {
        source.evaluated_include_escaped().to_string()
    }

    fn derive(&self, spec: &str, _source: &S) -> String {
        spec.to_string()
    }

    fn bare(&self, spec: &str) -> String {
        spec.to_string()
    }
}

/// Items keyed by type, case-insensitively.
#[derive(Debug, Clone)]
pub struct ItemDictionary<I> {
    items: FxHashMap<String, Vec<I>>,
}

impl<I> Default for ItemDictionary<I> {
    fn default() -> Self {
        Self {
            items: FxHashMap::default(),
        }
    }
}

impl<I: Item> ItemDictionary<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: I) {
        self.items
            .entry(item.item_type().to_ascii_lowercase())
            .or_default()
            .push(item);
    }

    pub fn item_types(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.values().all(Vec::is_empty)
    }
}

impl<I: Item> FromIterator<I> for ItemDictionary<I> {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        let mut dictionary = Self::new();
        for item in iter {
            dictionary.add(item);
        }
        dictionary
    }
}

impl<I: Item> Extend<I> for ItemDictionary<I> {
    fn extend<T: IntoIterator<Item = I>>(&mut self, iter: T) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<I: Item> ItemProvider for ItemDictionary<I> {
    type Item = I;

    fn items(&self, item_type: &str) -> &[I] {
        let found = if item_type.bytes().any(|b| b.is_ascii_uppercase()) {
            self.items.get(&item_type.to_ascii_lowercase())
        } else {
            self.items.get(item_type)
        };
        found.map(Vec::as_slice).unwrap_or(&[])
    }
}
