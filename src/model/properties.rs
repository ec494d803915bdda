//! Property lookup.

use std::borrow::Cow;

use rustc_hash::FxHashMap;

/// Source of property values for `$(Name)` references.
pub trait PropertyProvider {
    /// The escaped value of `name` (case-insensitive), if defined.
    fn escaped_value(&self, name: &str) -> Option<Cow<'_, str>>;
}

impl<P: PropertyProvider + ?Sized> PropertyProvider for &P {
    fn escaped_value(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).escaped_value(name)
    }
}

/// Case-insensitive in-memory property table.
#[derive(Debug, Clone, Default)]
pub struct PropertyDictionary {
    /// Lowercased name → (name as written, escaped value)
    properties: FxHashMap<String, (String, String)>,
}

impl PropertyDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property from an already escaped value.
    pub fn set(&mut self, name: &str, escaped_value: impl Into<String>) {
        self.properties.insert(
            name.to_ascii_lowercase(),
            (name.to_string(), escaped_value.into()),
        );
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, name: &str, escaped_value: impl Into<String>) -> Self {
        self.set(name, escaped_value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.properties
            .remove(&name.to_ascii_lowercase())
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Names as first written.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.values().map(|(name, _)| name.as_str())
    }

    fn get(&self, name: &str) -> Option<&str> {
        // Skip the allocation when the name is already lowercase.
        let found = if name.bytes().any(|b| b.is_ascii_uppercase()) {
            self.properties.get(&name.to_ascii_lowercase())
        } else {
            self.properties.get(name)
        };
        found.map(|(_, value)| value.as_str())
    }
}

impl PropertyProvider for PropertyDictionary {
    fn escaped_value(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(Cow::Borrowed)
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for PropertyDictionary {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut dictionary = Self::new();
        for (name, value) in iter {
            dictionary.set(name, value);
        }
        dictionary
    }
}

/// A provider with no properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProperties;

impl PropertyProvider for NoProperties {
    fn escaped_value(&self, _name: &str) -> Option<Cow<'_, str>> {
        None
    }
}
