//! Per-call inputs shared by the three expansion phases.

use std::fmt;

use crate::base::ElementLocation;
use crate::functions::{CallEnv, FunctionPolicy, FunctionResolver};
use crate::model::{FileSystem, LoggingSink, RegistryLookup, TracingSink, std_file_system};

use super::tracker::PropertyUsageTracker;

/// Maximum length of one truncated metadata value or item list.
pub const CHARACTER_LIMIT_PER_EXPANSION: usize = 1024;

/// Everything an expansion needs besides the expression and its data.
///
/// Built once per call (or per batch of calls on one element) and borrowed
/// by every phase. Nothing in here is mutated during expansion except the
/// usage tracker, which locks internally.
pub struct ExpansionContext<'a> {
    pub location: ElementLocation,
    pub file_system: &'a dyn FileSystem,
    pub logging: &'a dyn LoggingSink,
    pub resolver: FunctionResolver,
    pub registry: Option<&'a dyn RegistryLookup>,
    pub usage: Option<&'a PropertyUsageTracker>,
    /// Disables `TRUNCATE` regardless of the options passed in.
    pub suppress_truncation: bool,
    /// Item type currently being batched over, for self-reference messages.
    pub batched_item_type: Option<String>,
    /// Expand wildcard includes into files before running transforms.
    pub itemize_wildcards: bool,
}

impl Default for ExpansionContext<'static> {
    fn default() -> Self {
        Self {
            location: ElementLocation::in_memory(),
            file_system: std_file_system(),
            logging: &TracingSink,
            resolver: FunctionResolver::default(),
            registry: None,
            usage: None,
            suppress_truncation: false,
            batched_item_type: None,
            itemize_wildcards: false,
        }
    }
}

impl ExpansionContext<'static> {
    pub fn new(location: ElementLocation) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }
}

impl<'a> ExpansionContext<'a> {
    pub fn with_location(mut self, location: ElementLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_file_system<'b>(self, file_system: &'b dyn FileSystem) -> ExpansionContext<'b>
    where
        'a: 'b,
    {
        ExpansionContext {
            file_system,
            ..self
        }
    }

    pub fn with_logging<'b>(self, logging: &'b dyn LoggingSink) -> ExpansionContext<'b>
    where
        'a: 'b,
    {
        ExpansionContext { logging, ..self }
    }

    pub fn with_registry<'b>(self, registry: &'b dyn RegistryLookup) -> ExpansionContext<'b>
    where
        'a: 'b,
    {
        ExpansionContext {
            registry: Some(registry),
            ..self
        }
    }

    pub fn with_usage_tracker<'b>(self, usage: &'b PropertyUsageTracker) -> ExpansionContext<'b>
    where
        'a: 'b,
    {
        ExpansionContext {
            usage: Some(usage),
            ..self
        }
    }

    pub fn with_policy(mut self, policy: FunctionPolicy) -> Self {
        self.resolver = FunctionResolver::new(policy);
        self
    }

    pub fn with_resolver(mut self, resolver: FunctionResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn suppress_truncation(mut self, suppress: bool) -> Self {
        self.suppress_truncation = suppress;
        self
    }

    pub fn batching(mut self, item_type: impl Into<String>) -> Self {
        self.batched_item_type = Some(item_type.into());
        self
    }

    pub fn itemize_wildcards(mut self, itemize: bool) -> Self {
        self.itemize_wildcards = itemize;
        self
    }

    /// Environment handed to property functions.
    pub(crate) fn call_env(&self) -> CallEnv<'_> {
        CallEnv {
            file_system: self.file_system,
            this_file_directory: self.location.directory(),
        }
    }

    /// Cut `value` to the expansion limit, ending it with `...`.
    pub(crate) fn truncate(&self, value: String) -> String {
        if self.suppress_truncation || value.len() <= CHARACTER_LIMIT_PER_EXPANSION {
            return value;
        }
        if value.chars().count() <= CHARACTER_LIMIT_PER_EXPANSION {
            return value;
        }
        let mut cut: String = value
            .chars()
            .take(CHARACTER_LIMIT_PER_EXPANSION - 3)
            .collect();
        cut.push_str("...");
        cut
    }
}

impl fmt::Debug for ExpansionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpansionContext")
            .field("location", &self.location)
            .field("resolver", &self.resolver)
            .field("registry", &self.registry.is_some())
            .field("usage", &self.usage)
            .field("suppress_truncation", &self.suppress_truncation)
            .field("batched_item_type", &self.batched_item_type)
            .field("itemize_wildcards", &self.itemize_wildcards)
            .finish_non_exhaustive()
    }
}
