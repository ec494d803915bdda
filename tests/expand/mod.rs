//! Expander tests
//!
//! End-to-end expansion through the public `Expander` surface:
//! - Fixed phase order and the no-op fast path
//! - Property references, typed values and property functions
//! - Item vectors, separators and the transform pipeline
//! - Itemization into new items
//! - Metadata references and truncation

pub mod tests_items;
pub mod tests_itemization;
pub mod tests_metadata;
pub mod tests_orchestrator;
pub mod tests_properties;
