//! The registration table behind property functions.
//!
//! Every callable is an [`Overload`]: a fixed parameter list plus a plain
//! function pointer. Members group overloads by name; types group members
//! and declare which of them are allowed.

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::base::{Value, Version};
use crate::model::FileSystem;

use super::{instance, intrinsics, statics};

/// Failure raised by a function body.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    /// The function ran and failed.
    #[error("{0}")]
    Failed(String),
    /// An argument did not have the shape its parameter promised.
    #[error("argument {index} is not a {expected}")]
    BadArgument { index: usize, expected: &'static str },
}

impl CallError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

pub type CallResult = std::result::Result<Value, CallError>;

/// Services available to function bodies.
#[derive(Clone, Copy)]
pub struct CallEnv<'a> {
    pub file_system: &'a dyn FileSystem,
    /// Directory of the file the expression came from.
    pub this_file_directory: Option<&'a Path>,
}

impl fmt::Debug for CallEnv<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallEnv")
            .field("this_file_directory", &self.this_file_directory)
            .finish_non_exhaustive()
    }
}

impl CallEnv<'_> {
    /// Directory relative paths resolve against: the process directory.
    pub fn current_directory(&self) -> Result<String, CallError> {
        self.file_system
            .current_directory()
            .map(|dir| dir.to_string_lossy().into_owned())
            .map_err(|err| CallError::failed(err.to_string()))
    }

    /// Directory searches start from: this file's directory, else the
    /// process directory.
    pub fn starting_directory(&self) -> Result<String, CallError> {
        match self.this_file_directory {
            Some(dir) => Ok(dir.to_string_lossy().into_owned()),
            None => self.current_directory(),
        }
    }
}

/// One call: the (unescaped) receiver, coerced arguments, and services.
pub struct Invocation<'a> {
    pub receiver: Option<&'a Value>,
    pub args: &'a [Value],
    pub env: &'a CallEnv<'a>,
}

impl<'a> Invocation<'a> {
    pub fn arg(&self, index: usize) -> &'a Value {
        self.args.get(index).unwrap_or(&Value::Null)
    }

    /// String argument; `None` for a null argument.
    pub fn opt_str(&self, index: usize) -> Result<Option<&'a str>, CallError> {
        match self.arg(index) {
            Value::Null => Ok(None),
            Value::Str(s) => Ok(Some(s)),
            _ => Err(CallError::BadArgument {
                index,
                expected: "string",
            }),
        }
    }

    /// String argument, null read as empty.
    pub fn str(&self, index: usize) -> Result<&'a str, CallError> {
        Ok(self.opt_str(index)?.unwrap_or(""))
    }

    /// String argument that must not be null.
    pub fn required_str(&self, index: usize) -> Result<&'a str, CallError> {
        self.opt_str(index)?
            .ok_or_else(|| CallError::failed(format!("value cannot be null (argument {index})")))
    }

    pub fn int(&self, index: usize) -> Result<i64, CallError> {
        match self.arg(index) {
            Value::Int(i) => Ok(*i),
            _ => Err(CallError::BadArgument {
                index,
                expected: "integer",
            }),
        }
    }

    pub fn float(&self, index: usize) -> Result<f64, CallError> {
        match self.arg(index) {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            _ => Err(CallError::BadArgument {
                index,
                expected: "number",
            }),
        }
    }

    pub fn bool(&self, index: usize) -> Result<bool, CallError> {
        match self.arg(index) {
            Value::Bool(b) => Ok(*b),
            _ => Err(CallError::BadArgument {
                index,
                expected: "boolean",
            }),
        }
    }

    pub fn char(&self, index: usize) -> Result<char, CallError> {
        match self.arg(index) {
            Value::Char(c) => Ok(*c),
            _ => Err(CallError::BadArgument {
                index,
                expected: "character",
            }),
        }
    }

    pub fn chars(&self, index: usize) -> Result<Vec<char>, CallError> {
        match self.arg(index) {
            Value::Null => Ok(Vec::new()),
            Value::Seq(values) => values
                .iter()
                .map(|v| match v {
                    Value::Char(c) => Ok(*c),
                    _ => Err(CallError::BadArgument {
                        index,
                        expected: "character array",
                    }),
                })
                .collect(),
            _ => Err(CallError::BadArgument {
                index,
                expected: "character array",
            }),
        }
    }

    pub fn version(&self, index: usize) -> Result<Version, CallError> {
        match self.arg(index) {
            Value::Version(v) => Ok(*v),
            _ => Err(CallError::BadArgument {
                index,
                expected: "version",
            }),
        }
    }

    /// The receiver, which instance members always have.
    pub fn this(&self) -> Result<&'a Value, CallError> {
        self.receiver
            .ok_or_else(|| CallError::failed("instance member called without a receiver"))
    }

    /// The receiver as a string.
    pub fn this_str(&self) -> Result<&'a str, CallError> {
        match self.this()? {
            Value::Str(s) => Ok(s),
            other => Err(CallError::failed(format!(
                "expected a string receiver, found {}",
                other.type_name()
            ))),
        }
    }
}

/// A named enumeration accepted as a parameter.
#[derive(Debug, PartialEq)]
pub struct EnumType {
    pub name: &'static str,
    pub members: &'static [(&'static str, i64)],
    /// Values may be combined with `|`.
    pub flags: bool,
}

impl EnumType {
    pub fn value_of(&self, member: &str) -> Option<i64> {
        self.members
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(member))
            .map(|(_, value)| *value)
    }
}

pub static STRING_COMPARISON: EnumType = EnumType {
    name: "System.StringComparison",
    members: &[
        ("CurrentCulture", 0),
        ("CurrentCultureIgnoreCase", 1),
        ("InvariantCulture", 2),
        ("InvariantCultureIgnoreCase", 3),
        ("Ordinal", 4),
        ("OrdinalIgnoreCase", 5),
    ],
    flags: false,
};

pub static STRING_SPLIT_OPTIONS: EnumType = EnumType {
    name: "System.StringSplitOptions",
    members: &[("None", 0), ("RemoveEmptyEntries", 1), ("TrimEntries", 2)],
    flags: true,
};

/// Whether a `StringComparison` value ignores case.
pub fn comparison_ignores_case(value: i64) -> bool {
    value % 2 == 1
}

/// Parameter types an overload can declare.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamType {
    Str,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    Long,
    Float,
    Bool,
    Char,
    CharArray,
    Enum(&'static EnumType),
    Version,
    /// Any value, passed through unconverted.
    Any,
    /// An `out` parameter, matched only by the `out _` placeholder.
    Out,
}

impl ParamType {
    /// Ordering used to prefer integral overloads over floating ones.
    pub fn numeric_rank(self) -> u8 {
        match self {
            Self::Int => 1,
            Self::Long => 2,
            Self::Float => 3,
            _ => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Str => "System.String",
            Self::Int => "System.Int32",
            Self::Long => "System.Int64",
            Self::Float => "System.Double",
            Self::Bool => "System.Boolean",
            Self::Char => "System.Char",
            Self::CharArray => "System.Char[]",
            Self::Enum(e) => e.name,
            Self::Version => "System.Version",
            Self::Any => "System.Object",
            Self::Out => "out",
        }
    }
}

pub type Invoke = fn(&Invocation<'_>) -> CallResult;

#[derive(Clone, Copy)]
pub struct Overload {
    pub params: &'static [ParamType],
    pub invoke: Invoke,
}

impl Overload {
    pub const fn new(params: &'static [ParamType], invoke: Invoke) -> Self {
        Self { params, invoke }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn all_strings(&self) -> bool {
        self.params.iter().all(|p| *p == ParamType::Str)
    }
}

impl fmt::Debug for Overload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<_> = self.params.iter().map(|p| p.name()).collect();
        write!(f, "({})", params.join(", "))
    }
}

#[derive(Debug)]
pub struct Member {
    pub name: &'static str,
    pub overloads: &'static [Overload],
}

/// Which members of a type may be called without the allow-all policy.
#[derive(Debug)]
pub enum Allowed {
    All,
    Only(&'static [&'static str]),
}

#[derive(Debug)]
pub struct TypeEntry {
    /// Full name, e.g. `System.IO.Path`.
    pub name: &'static str,
    pub members: &'static [Member],
    pub allowed: Allowed,
}

impl TypeEntry {
    pub fn member(&self, name: &str) -> Option<&'static Member> {
        find_member(self.members, name)
    }

    pub fn allows(&self, member: &str) -> bool {
        match self.allowed {
            Allowed::All => true,
            Allowed::Only(names) => names.iter().any(|n| n.eq_ignore_ascii_case(member)),
        }
    }

    /// The engine's own intrinsic type, always callable.
    pub fn is_intrinsic(&self) -> bool {
        std::ptr::eq(self, &intrinsics::MSBUILD)
    }
}

pub fn find_member(members: &'static [Member], name: &str) -> Option<&'static Member> {
    members.iter().find(|m| m.name.eq_ignore_ascii_case(name))
}

/// Types resolvable without probing.
static TYPES: &[&TypeEntry] = &[
    &intrinsics::MSBUILD,
    &statics::STRING,
    &statics::PATH,
    &statics::MATH,
    &statics::ENVIRONMENT,
    &statics::FILE,
    &statics::DIRECTORY,
    &statics::CONVERT,
    &statics::CHAR,
    &statics::INT32,
    &statics::INT64,
    &statics::DOUBLE,
    &statics::BOOLEAN,
    &statics::GUID,
    &statics::VERSION,
    &statics::DATE_TIME,
    &statics::REGEX,
];

/// Types only found through the opt-in probe.
static ADDITIONAL_TYPES: &[&TypeEntry] = &[&statics::RUNTIME_INFORMATION];

fn find_in(types: &'static [&'static TypeEntry], name: &str) -> Option<&'static TypeEntry> {
    types
        .iter()
        .copied()
        .find(|t| t.name.eq_ignore_ascii_case(name))
}

/// Resolve a well-known type by full name (case-insensitive).
pub fn find_type(name: &str) -> Option<&'static TypeEntry> {
    find_in(TYPES, name)
}

/// Resolve one of the additional types behind the probe.
pub fn find_additional_type(name: &str) -> Option<&'static TypeEntry> {
    find_in(ADDITIONAL_TYPES, name)
}

/// Instance members available on a receiver of this shape.
pub fn instance_members(receiver: &Value) -> &'static [Member] {
    instance::members_for(receiver)
}
