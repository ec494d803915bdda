//! Scanner tests
//!
//! Reference collection over several expressions, as batching uses it.

pub mod tests_referenced_names;
