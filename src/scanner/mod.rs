//! Stateless expression scanners.
//!
//! Locates `@(...)` item vectors and `%(...)` metadata references inside
//! arbitrary text without evaluating anything. Captures borrow slices of the
//! scanned expression and carry their byte span as a [`TextRange`].
//!
//! Scanning is greedy and leftmost. An ill-formed candidate is abandoned and
//! the scan restarts one character after its `@` or `%`, so overlapping
//! candidates are still found and every scan terminates.
//!
//! [`TextRange`]: crate::base::TextRange

mod balanced;
mod item_vector;
mod metadata;
mod references;

pub use balanced::{
    ParenScan, SplitError, scan_for_closing_paren, scan_for_closing_quote,
    sink_arguments_in_parentheses, split_top_level_commas,
};
pub use item_vector::{
    ItemExpressionCapture, ItemVectorCaptures, TransformCapture, TransformKind,
    item_vector_captures,
};
pub use metadata::{
    MetadataCapture, MetadataCaptures, MetadataMatch, classify_metadata_matches,
    metadata_captures, metadata_captures_in,
};
pub use references::{
    MetadataReference, ReferencedNames, ShredderOptions, contains_metadata,
    contains_metadata_outside_transform,
};

/// Captures every item vector in the whole expression.
pub fn all_item_vectors(expr: &str) -> Vec<ItemExpressionCapture<'_>> {
    item_vector_captures(expr, 0, expr.len()).collect()
}
