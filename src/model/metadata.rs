//! Metadata tables consulted by `%(...)` expansion.

use indexmap::IndexMap;

use crate::base::Result;

use super::fs::FileSystem;
use super::items::{Item, metadata_value_escaped};

/// Supplies metadata values for one batch of expansion.
pub trait MetadataTable {
    /// Escaped value of `name`, optionally qualified by `item_type`.
    /// Unknown metadata is `""`.
    fn escaped_value(&self, item_type: Option<&str>, name: &str) -> Result<String>;

    /// The item type this table belongs to, when it belongs to one.
    fn item_type(&self) -> Option<&str> {
        None
    }
}

/// Metadata of a single item, built-in and custom.
///
/// A reference qualified with another item type yields `""`.
pub struct ItemMetadataTable<'a, I: Item> {
    item: &'a I,
    fs: &'a dyn FileSystem,
}

impl<'a, I: Item> ItemMetadataTable<'a, I> {
    pub fn new(item: &'a I, fs: &'a dyn FileSystem) -> Self {
        Self { item, fs }
    }
}

impl<I: Item> MetadataTable for ItemMetadataTable<'_, I> {
    fn escaped_value(&self, item_type: Option<&str>, name: &str) -> Result<String> {
        if item_type.is_some_and(|t| !t.eq_ignore_ascii_case(self.item.item_type())) {
            return Ok(String::new());
        }
        metadata_value_escaped(self.item, name, self.fs)
    }

    fn item_type(&self) -> Option<&str> {
        Some(self.item.item_type())
    }
}

/// Map-backed table keyed by `Type.Name` or plain `Name`.
#[derive(Debug, Clone, Default)]
pub struct StringMetadataTable {
    values: IndexMap<String, String>,
    item_type: Option<String>,
}

impl StringMetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` (`Type.Name` or `Name`) to an escaped value.
    pub fn set(&mut self, key: &str, escaped_value: impl Into<String>) {
        self.values
            .insert(key.to_ascii_lowercase(), escaped_value.into());
    }

    pub fn with(mut self, key: &str, escaped_value: impl Into<String>) -> Self {
        self.set(key, escaped_value);
        self
    }

    /// Mark the table as belonging to `item_type`.
    pub fn for_item_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }
}

impl MetadataTable for StringMetadataTable {
    fn escaped_value(&self, item_type: Option<&str>, name: &str) -> Result<String> {
        let key = match item_type {
            Some(item_type) => format!("{item_type}.{name}"),
            None => name.to_string(),
        };
        Ok(self
            .values
            .get(&key.to_ascii_lowercase())
            .cloned()
            .unwrap_or_default())
    }

    fn item_type(&self) -> Option<&str> {
        self.item_type.as_deref()
    }
}
