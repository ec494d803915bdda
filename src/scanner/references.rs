//! Names referenced by expressions, collected without evaluating anything.
//!
//! Batching uses this to decide which item types and metadata an element
//! depends on.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::item_vector::{TransformKind, scan_item_vector};
use super::metadata::{metadata_captures_in, parse_metadata};

/// What [`ReferencedNames::collect`] looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShredderOptions(u8);

impl ShredderOptions {
    pub const ITEM_TYPES: Self = Self(0x1);
    pub const METADATA: Self = Self(0x2);
    /// Also collect metadata inside item-vector transforms.
    pub const METADATA_IN_TRANSFORMS: Self = Self(0x4);
    pub const ALL: Self = Self(0x1 | 0x2);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for ShredderOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A metadata reference, possibly qualified by an item type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataReference {
    pub item_type: Option<SmolStr>,
    pub name: SmolStr,
}

impl MetadataReference {
    /// `Type.Name` or `Name`.
    pub fn key(&self) -> String {
        match &self.item_type {
            Some(item_type) => format!("{item_type}.{}", self.name),
            None => self.name.to_string(),
        }
    }
}

/// Item types and metadata referenced by a set of expressions.
///
/// Names compare case-insensitively; the first spelling seen is kept.
#[derive(Debug, Clone, Default)]
pub struct ReferencedNames {
    item_types: IndexMap<SmolStr, SmolStr>,
    metadata: IndexMap<SmolStr, MetadataReference>,
}

impl ReferencedNames {
    /// Collect from every expression in one pass each.
    pub fn collect<'e>(
        expressions: impl IntoIterator<Item = &'e str>,
        options: ShredderOptions,
    ) -> Self {
        let mut names = Self::default();
        for expr in expressions {
            names.scan(expr, 0, expr.len(), options);
        }
        names
    }

    pub fn item_types(&self) -> impl Iterator<Item = &str> {
        self.item_types.values().map(SmolStr::as_str)
    }

    pub fn metadata(&self) -> impl Iterator<Item = &MetadataReference> {
        self.metadata.values()
    }

    pub fn contains_item_type(&self, name: &str) -> bool {
        self.item_types.contains_key(lower(name).as_str())
    }

    /// Look up by `Type.Name` or `Name` key.
    pub fn contains_metadata(&self, key: &str) -> bool {
        self.metadata.contains_key(lower(key).as_str())
    }

    pub fn has_item_types(&self) -> bool {
        !self.item_types.is_empty()
    }

    pub fn has_metadata(&self) -> bool {
        !self.metadata.is_empty()
    }

    fn scan(&mut self, expr: &str, start: usize, end: usize, options: ShredderOptions) {
        let bytes = expr.as_bytes();
        let mut i = start;
        while i + 1 < end {
            match (bytes[i], bytes[i + 1]) {
                (b'@', b'(') => {
                    let Some(vector) = scan_item_vector(expr, i, end) else {
                        i += 1;
                        continue;
                    };
                    if options.contains(ShredderOptions::METADATA_IN_TRANSFORMS) {
                        for transform in &vector.transforms {
                            let body = match transform.kind {
                                TransformKind::Quoted { body } => body,
                                TransformKind::Function { arguments, .. } => {
                                    arguments.unwrap_or("")
                                }
                            };
                            self.scan(body, 0, body.len(), ShredderOptions::METADATA);
                        }
                    }
                    // Separator metadata is expanded outside the transform.
                    if let Some((s, e)) = vector
                        .separator
                        .filter(|_| options.contains(ShredderOptions::METADATA))
                    {
                        self.scan(expr, s, e, ShredderOptions::METADATA);
                    }
                    if options.contains(ShredderOptions::ITEM_TYPES) {
                        let (s, e) = vector.name;
                        self.add_item_type(&expr[s..e]);
                    }
                    i = vector.end;
                }
                (b'%', b'(') => {
                    let Some(capture) = parse_metadata(expr, i, end) else {
                        i += 1;
                        continue;
                    };
                    if options.contains(ShredderOptions::METADATA) {
                        self.add_metadata(capture.item_type, capture.name);
                    }
                    i = capture.end();
                }
                _ => i += 1,
            }
        }
    }

    fn add_item_type(&mut self, name: &str) {
        self.item_types
            .entry(SmolStr::new(lower(name)))
            .or_insert_with(|| SmolStr::new(name));
    }

    fn add_metadata(&mut self, item_type: Option<&str>, name: &str) {
        let reference = MetadataReference {
            item_type: item_type.map(SmolStr::new),
            name: SmolStr::new(name),
        };
        self.metadata
            .entry(SmolStr::new(lower(&reference.key())))
            .or_insert(reference);
    }
}

fn lower(s: &str) -> String {
    s.to_ascii_lowercase()
}

/// Whether `expr` references metadata anywhere outside an item-vector
/// transform.
pub fn contains_metadata_outside_transform(expr: &str) -> bool {
    if !expr.contains("%(") {
        return false;
    }
    ReferencedNames::collect([expr], ShredderOptions::METADATA).has_metadata()
}

/// Whether `expr` holds any metadata reference at all.
pub fn contains_metadata(expr: &str) -> bool {
    metadata_captures_in(expr, 0, expr.len()).next().is_some()
}
