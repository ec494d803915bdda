//! Foundation types for the expander.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`ElementLocation`], [`Position`] - Where an expression came from
//! - [`ExpandError`], [`ErrorCode`] - Structured expansion failures
//! - [`ExpanderOptions`] - Which categories to expand and how
//! - [`Value`], [`Version`] - Typed results of property expansion
//! - [`escaping`] - The shared `%XX` escaping convention
//! - [`names`] - The name grammar for items, properties and metadata
//!
//! This module has NO dependencies on other buildexpr modules.

pub mod error;
pub mod escaping;
mod location;
pub mod names;
mod options;
mod position;
pub mod value;

pub use error::{ErrorCode, ExpandError, Result};
pub use location::ElementLocation;
pub use options::ExpanderOptions;
pub use position::Position;
pub use value::{Value, Version};

// Re-export text-size types for convenience
pub use text_size::{self, TextRange, TextSize};

/// Build a [`TextRange`] from byte offsets into an expression.
#[inline]
pub(crate) fn text_range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
}

#[cfg(test)]
mod tests;
