//! Hooks into the surrounding build: diagnostics and the registry.

/// Receives low-importance build messages.
pub trait LoggingSink {
    fn log_low_importance(&self, message_key: &str, args: &[&str]);
}

/// Forwards messages to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LoggingSink for TracingSink {
    fn log_low_importance(&self, message_key: &str, args: &[&str]) {
        tracing::debug!(key = message_key, ?args, "[EXPAND] {message_key}");
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LoggingSink for NullSink {
    fn log_low_importance(&self, _message_key: &str, _args: &[&str]) {}
}

/// Resolves `$(Registry:KEY@Value)` references.
pub trait RegistryLookup {
    /// The value, or `None` when the key or value is missing.
    fn value(&self, key_path: &str, value_name: &str) -> Option<String>;
}

/// Message key logged when an item's metadata references its own type.
pub const ITEM_REFERENCING_SELF: &str = "ItemReferencingSelfInTarget";
