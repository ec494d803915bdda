//! Which static types may be called, and how type names are resolved.

use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::catalog::{self, TypeEntry};

/// Environment variable that lifts the static-member allowlist.
pub const ENABLE_ALL_PROPERTY_FUNCTIONS: &str = "MSBUILDENABLEALLPROPERTYFUNCTIONS";

/// Environment variable that enables probing for additional types.
pub const PROBE_EXTERNAL_TYPES: &str = "MSBUILDPROBEEXTERNALTYPES";

/// Capabilities granted to property functions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunctionPolicy {
    /// Call any catalogued member, including `GetType` and static members
    /// outside the allowlist.
    pub allow_all: bool,
    /// Resolve type names the well-known catalog does not know through the
    /// installed [`TypeProbe`].
    pub probe_additional_types: bool,
}

impl FunctionPolicy {
    /// Everything enabled.
    pub fn unrestricted() -> Self {
        Self {
            allow_all: true,
            probe_additional_types: true,
        }
    }

    /// Read both toggles from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read both toggles through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = |name: &str| {
            lookup(name).is_some_and(|v| {
                let v = v.trim();
                v == "1" || v.eq_ignore_ascii_case("true")
            })
        };
        Self {
            allow_all: enabled(ENABLE_ALL_PROPERTY_FUNCTIONS),
            probe_additional_types: enabled(PROBE_EXTERNAL_TYPES),
        }
    }
}

/// Finds types beyond the well-known catalog.
pub trait TypeProbe: Send + Sync {
    fn probe(&self, type_name: &str) -> Option<&'static TypeEntry>;
}

/// Probes the crate's own additional types
/// (`System.Runtime.InteropServices.RuntimeInformation`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AdditionalTypes;

impl TypeProbe for AdditionalTypes {
    fn probe(&self, type_name: &str) -> Option<&'static TypeEntry> {
        catalog::find_additional_type(type_name)
    }
}

/// Resolved type names, keyed case-insensitively.
///
/// Well-known resolutions and probe results are kept apart so that a probed
/// type is never served when probing is off. Names that fail to resolve
/// are not remembered.
#[derive(Default)]
pub struct TypeCache {
    well_known: RwLock<FxHashMap<String, &'static TypeEntry>>,
    probed: RwLock<FxHashMap<String, &'static TypeEntry>>,
}

static GLOBAL: LazyLock<Arc<TypeCache>> = LazyLock::new(|| Arc::new(TypeCache::new()));

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> Arc<TypeCache> {
        Arc::clone(&GLOBAL)
    }

    /// Resolve `type_name`, consulting `probe` only when the well-known
    /// catalog has no such type.
    pub fn resolve(
        &self,
        type_name: &str,
        probe: Option<&dyn TypeProbe>,
    ) -> Option<&'static TypeEntry> {
        let key = type_name.to_ascii_lowercase();

        if let Some(entry) = self.well_known.read().get(&key).copied() {
            tracing::trace!("[FUNCTIONS] type cache hit for '{}'", type_name);
            return Some(entry);
        }
        if let Some(entry) = catalog::find_type(type_name) {
            self.well_known.write().insert(key, entry);
            return Some(entry);
        }

        let probe = probe?;
        if let Some(entry) = self.probed.read().get(&key).copied() {
            tracing::trace!("[FUNCTIONS] probe cache hit for '{}'", type_name);
            return Some(entry);
        }
        let entry = probe.probe(type_name)?;
        tracing::debug!("[FUNCTIONS] probed type '{}' -> {}", type_name, entry.name);
        self.probed.write().insert(key, entry);
        Some(entry)
    }

    /// Number of cached well-known and probed resolutions.
    pub fn len(&self) -> (usize, usize) {
        (self.well_known.read().len(), self.probed.read().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == (0, 0)
    }

    pub fn clear(&self) {
        self.well_known.write().clear();
        self.probed.write().clear();
    }
}

impl std::fmt::Debug for TypeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (well_known, probed) = self.len();
        f.debug_struct("TypeCache")
            .field("well_known", &well_known)
            .field("probed", &probed)
            .finish()
    }
}
