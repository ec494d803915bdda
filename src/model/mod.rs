//! Inputs of expansion.
//!
//! Provider traits the expander queries by name ([`PropertyProvider`],
//! [`ItemProvider`], [`MetadataTable`]), the file-system probe, the logging
//! and registry hooks, and in-memory implementations of each for callers
//! that do not bring their own object model.
//!
//! Built-in item metadata (`%(FullPath)`, `%(Filename)`, ...) lives in
//! [`modifiers`].

mod fs;
mod hooks;
mod items;
mod metadata;
pub mod modifiers;
pub mod paths;
mod properties;

pub use fs::{FileSystem, FileTimes, StdFileSystem, WildcardPattern, std_file_system};
pub use hooks::{ITEM_REFERENCING_SELF, LoggingSink, NullSink, RegistryLookup, TracingSink};
pub use items::{
    Item, ItemDictionary, ItemFactory, ItemProvider, ProjectItem, ProjectItemFactory,
    SpecFactory, metadata_value_escaped,
};
pub use metadata::{ItemMetadataTable, MetadataTable, StringMetadataTable};
pub use properties::{NoProperties, PropertyDictionary, PropertyProvider};

#[cfg(test)]
mod tests;
