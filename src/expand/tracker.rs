//! Records property lookups for used-before-set diagnostics.

use parking_lot::Mutex;
use smol_str::SmolStr;

/// Outcome of one plain property lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyUsage {
    Found,
    NotFound,
    /// Answered by a reserved `MSBuildThisFile*` pseudo-property.
    Reserved,
}

/// Every plain `$(Name)` lookup, in the order it happened.
#[derive(Debug, Default)]
pub struct PropertyUsageTracker {
    records: Mutex<Vec<(SmolStr, PropertyUsage)>>,
}

impl PropertyUsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: &str, usage: PropertyUsage) {
        self.records.lock().push((SmolStr::new(name), usage));
    }

    pub fn records(&self) -> Vec<(SmolStr, PropertyUsage)> {
        self.records.lock().clone()
    }

    /// Names that were read while undefined, first occurrence only.
    ///
    /// Names compare case-insensitively; the spelling of the first read is
    /// kept.
    pub fn uninitialized(&self) -> Vec<SmolStr> {
        let records = self.records.lock();
        let mut names: Vec<SmolStr> = Vec::new();
        for (name, usage) in records.iter() {
            if *usage == PropertyUsage::NotFound
                && !names.iter().any(|seen| seen.eq_ignore_ascii_case(name))
            {
                names.push(name.clone());
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}
