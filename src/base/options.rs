//! Expansion option flags.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Which categories to expand, plus behavioural modifiers.
///
/// An immutable bit set. Combine flags with `|`:
///
/// ```
/// use buildexpr::ExpanderOptions;
///
/// let options = ExpanderOptions::EXPAND_PROPERTIES | ExpanderOptions::TRUNCATE;
/// assert!(options.contains(ExpanderOptions::EXPAND_PROPERTIES));
/// assert!(!options.contains(ExpanderOptions::EXPAND_ITEMS));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExpanderOptions(u32);

impl ExpanderOptions {
    pub const INVALID: Self = Self(0);
    pub const EXPAND_CUSTOM_METADATA: Self = Self(0x1);
    pub const EXPAND_BUILT_IN_METADATA: Self = Self(0x2);
    pub const EXPAND_METADATA: Self = Self(0x1 | 0x2);
    pub const EXPAND_PROPERTIES: Self = Self(0x4);
    pub const EXPAND_ITEMS: Self = Self(0x8);
    pub const EXPAND_PROPERTIES_AND_METADATA: Self = Self(0x1 | 0x2 | 0x4);
    pub const EXPAND_PROPERTIES_AND_ITEMS: Self = Self(0x4 | 0x8);
    pub const EXPAND_ALL: Self = Self(0x1 | 0x2 | 0x4 | 0x8);

    /// Stop as soon as the result is known to be non-empty.
    pub const BREAK_ON_NOT_EMPTY: Self = Self(0x10);
    /// Substitute the unexpanded `$(...)` text for a failed property function.
    pub const LEAVE_PROPERTIES_UNEXPANDED_ON_ERROR: Self = Self(0x20);
    /// Cap expanded metadata and item lists at 1024 characters.
    pub const TRUNCATE: Self = Self(0x40);
    /// Log when an item's metadata refers to its own item type.
    pub const LOG_ON_ITEM_METADATA_SELF_REFERENCE: Self = Self(0x80);

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True when every flag in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when any flag in `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for ExpanderOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for ExpanderOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ExpanderOptions {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for ExpanderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: &[(ExpanderOptions, &str)] = &[
            (ExpanderOptions::EXPAND_CUSTOM_METADATA, "ExpandCustomMetadata"),
            (ExpanderOptions::EXPAND_BUILT_IN_METADATA, "ExpandBuiltInMetadata"),
            (ExpanderOptions::EXPAND_PROPERTIES, "ExpandProperties"),
            (ExpanderOptions::EXPAND_ITEMS, "ExpandItems"),
            (ExpanderOptions::BREAK_ON_NOT_EMPTY, "BreakOnNotEmpty"),
            (
                ExpanderOptions::LEAVE_PROPERTIES_UNEXPANDED_ON_ERROR,
                "LeavePropertiesUnexpandedOnError",
            ),
            (ExpanderOptions::TRUNCATE, "Truncate"),
            (
                ExpanderOptions::LOG_ON_ITEM_METADATA_SELF_REFERENCE,
                "LogOnItemMetadataSelfReference",
            ),
        ];

        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            f.write_str("ExpanderOptions(Invalid)")
        } else {
            write!(f, "ExpanderOptions({})", set.join(" | "))
        }
    }
}
