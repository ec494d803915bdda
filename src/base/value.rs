//! Typed results of property expansion.
//!
//! A lone `$(...)` reference keeps whatever type its function produced, so a
//! caller asking for items can still see a list. Anything concatenated with
//! text collapses to its escaped string form.
//!
//! A top-level [`Value::Str`] is always engine-escaped. Strings nested inside
//! a [`Value::Seq`] or [`Value::Map`] are raw function output and are
//! escaped on the way out.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use super::escaping::escape;

/// `major.minor[.build[.revision]]`
///
/// Undefined components order before zero, so `1.0 < 1.0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
    pub revision: Option<u32>,
}

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            build: None,
            revision: None,
        }
    }

    pub const fn with_build(self, build: u32) -> Self {
        Self {
            build: Some(build),
            ..self
        }
    }

    pub const fn with_revision(self, revision: u32) -> Self {
        Self {
            revision: Some(revision),
            ..self
        }
    }

    /// Number of defined components (2 to 4).
    pub fn field_count(&self) -> usize {
        match (self.build, self.revision) {
            (None, _) => 2,
            (Some(_), None) => 3,
            (Some(_), Some(_)) => 4,
        }
    }

    /// Render the first `fields` components, or `None` if fewer are defined.
    pub fn to_string_fields(&self, fields: usize) -> Option<String> {
        if fields > self.field_count() {
            return None;
        }
        let parts = [
            Some(self.major),
            Some(self.minor),
            self.build,
            self.revision,
        ];
        Some(
            parts
                .iter()
                .take(fields)
                .flatten()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join("."),
        )
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.build.cmp(&other.build))
            .then(self.revision.cmp(&other.revision))
    }
}

/// Error returned when a string is not a version.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a valid version")]
pub struct ParseVersionError(pub String);

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError(s.to_string());
        let parts: Vec<&str> = s.trim().split('.').collect();
        if !(2..=4).contains(&parts.len()) {
            return Err(err());
        }

        let mut numbers = [0u32; 4];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            let part = part.trim();
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            *slot = part.parse().map_err(|_| err())?;
        }

        let mut version = Version::new(numbers[0], numbers[1]);
        if parts.len() > 2 {
            version = version.with_build(numbers[2]);
        }
        if parts.len() > 3 {
            version = version.with_revision(numbers[3]);
        }
        Ok(version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{build}")?;
            if let Some(revision) = self.revision {
                write!(f, ".{revision}")?;
            }
        }
        Ok(())
    }
}

/// The default date-time rendering (invariant culture general format).
pub const DEFAULT_DATE_TIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// A typed value produced by property expansion or a property function.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Str(String),
    Char(char),
    Bool(bool),
    Int(i64),
    Float(f64),
    Version(Version),
    DateTime(NaiveDateTime),
    Seq(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// True for `Null` and the empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Str(s) => s.is_empty(),
            _ => false,
        }
    }

    /// The escaped string form used when the value is concatenated.
    pub fn to_escaped_string(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Str(s) => Cow::Borrowed(s),
            Self::Seq(values) => Cow::Owned(
                values
                    .iter()
                    .map(|v| escape(&v.to_raw_string()).into_owned())
                    .collect::<Vec<_>>()
                    .join(";"),
            ),
            Self::Map(entries) => Cow::Owned(
                entries
                    .iter()
                    .map(|(k, v)| {
                        format!(
                            "{}={}",
                            escape(&k.to_raw_string()),
                            escape(&v.to_raw_string())
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(";"),
            ),
            other => Cow::Owned(escape(&other.to_raw_string()).into_owned()),
        }
    }

    /// Consume the value into its escaped string form.
    pub fn into_escaped_string(self) -> String {
        match self {
            Self::Str(s) => s,
            other => other.to_escaped_string().into_owned(),
        }
    }

    /// The string form without any escaping applied.
    pub fn to_raw_string(&self) -> String {
        self.to_string()
    }

    /// Runtime type name, as reported by `GetType()`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Str(_) => "System.String",
            Self::Char(_) => "System.Char",
            Self::Bool(_) => "System.Boolean",
            Self::Int(_) => "System.Int64",
            Self::Float(_) => "System.Double",
            Self::Version(_) => "System.Version",
            Self::DateTime(_) => "System.DateTime",
            Self::Seq(_) => "System.Object[]",
            Self::Map(_) => "System.Collections.IDictionary",
        }
    }
}

/// Culture-invariant rendering of a double.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if f != 0.0 && (f.abs() >= 1e15 || f.abs() < 1e-4) {
        scientific(f)
    } else if f.fract() == 0.0 {
        format!("{}", f as i64)
    } else {
        format!("{f}")
    }
}

/// `1.5E+20`, `1E-05`: at least two exponent digits, explicit sign.
fn scientific(f: f64) -> String {
    let formatted = format!("{f:E}");
    match formatted.split_once('E') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}E{sign}{digits:0>2}")
        }
        None => formatted,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Str(s) => f.write_str(s),
            Self::Char(c) => write!(f, "{c}"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => f.write_str(&format_float(*x)),
            Self::Version(v) => write!(f, "{v}"),
            Self::DateTime(dt) => write!(f, "{}", dt.format(DEFAULT_DATE_TIME_FORMAT)),
            Self::Seq(values) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(";")?;
                    }
                    write!(f, "{v}")?;
                }
                Ok(())
            }
            Self::Map(entries) => {
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(";")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

impl From<Version> for Value {
    fn from(v: Version) -> Self {
        Self::Version(v)
    }
}
