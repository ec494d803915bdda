//! Expression expansion.
//!
//! [`Expander`] runs up to three phases over an expression, always in this
//! order:
//!
//! 1. metadata: `%(Name)` and `%(Type.Name)` from a [`MetadataTable`]
//! 2. properties: `$(Name)`, property functions and `Registry:` references
//! 3. items: `@(Type->transform, 'separator')` from an [`ItemProvider`]
//!
//! Which phases run is chosen per call with [`ExpanderOptions`]. Everything
//! else the phases need (location, file system, logging, function policy)
//! travels in an [`ExpansionContext`].
//!
//! [`MetadataTable`]: crate::model::MetadataTable
//! [`ItemProvider`]: crate::model::ItemProvider
//! [`ExpanderOptions`]: crate::base::ExpanderOptions

mod context;
mod expander;
mod items;
mod metadata;
mod properties;
mod tracker;
mod transforms;

pub use context::{CHARACTER_LIMIT_PER_EXPANSION, ExpansionContext};
pub use expander::{Expander, NoItems};
pub use tracker::{PropertyUsage, PropertyUsageTracker};
pub use transforms::{Builtin, ItemPair};
