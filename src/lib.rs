//! # buildexpr
//!
//! Expansion of the expression language used by declarative build files:
//! `$(Property)` references and property functions, `@(Item->transform)`
//! item vectors and `%(Metadata)` references.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! expand     → Expander: metadata, then properties, then items
//!   ↓
//! functions  → Property function extraction, policy and invocation
//!   ↓
//! scanner    → Item vector and metadata reference scanners
//!   ↓
//! model      → Provider traits, items, file system, hooks
//!   ↓
//! base       → Primitives (options, errors, values, escaping, names)
//! ```

// ============================================================================
// MODULES (dependency order: base → model → scanner → functions → expand)
// ============================================================================

/// Foundation types: options, errors, values, escaping
pub mod base;

/// Inputs: properties, items, metadata tables, file system, hooks
pub mod model;

/// Stateless scanners for `@(...)` and `%(...)`
pub mod scanner;

/// Property functions behind a closed registration table
pub mod functions;

/// The three expansion phases and their façade
pub mod expand;

// Re-export foundation types
pub use base::{ElementLocation, ErrorCode, ExpandError, ExpanderOptions, Result, Value, Version};

// Re-export the expansion surface
pub use expand::{
    CHARACTER_LIMIT_PER_EXPANSION, Expander, ExpansionContext, ItemPair, NoItems,
    PropertyUsage, PropertyUsageTracker,
};
pub use functions::{FunctionPolicy, FunctionResolver};
pub use model::{
    FileSystem, Item, ItemDictionary, ItemFactory, ItemProvider, LoggingSink, MetadataTable,
    NoProperties, ProjectItem, ProjectItemFactory, PropertyDictionary, PropertyProvider,
    RegistryLookup, SpecFactory, StringMetadataTable,
};
