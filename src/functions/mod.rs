//! Property functions.
//!
//! Extracts calls such as `[MSBuild]::Add(1, 2)`, `Name.Substring(1)` or
//! `[value][0]` from a `$(...)` body and runs them against a closed
//! registration table instead of open reflection:
//!
//! - [`FunctionCall`] - Syntax of one call plus its chained remainder
//! - [`FunctionResolver`] - Policy gate, overload binding and invocation
//! - [`FunctionPolicy`], [`TypeCache`] - Which static types may be called
//! - [`TypeEntry`], [`Overload`] - The registration table itself
//!
//! Arguments are de-quoted, expanded through an [`ArgumentExpander`] and
//! handed to functions unescaped. String results are escaped again, except
//! for the intrinsics whose result is already escaped.

mod catalog;
mod coerce;
mod instance;
mod intrinsics;
mod parse;
mod policy;
mod resolver;
mod statics;
mod well_known;

pub use catalog::{
    Allowed, CallEnv, CallError, CallResult, EnumType, Invocation, Member, Overload, ParamType,
    TypeEntry, find_type,
};
pub use coerce::{ArgValue, coerce, parse_enum};
pub use instance::{format_composite, format_date_time, format_number};
pub use intrinsics::{is_arithmetic, parse_simple_version, returns_escaped, stable_string_hash_of};
pub use parse::{Argument, CallKind, FunctionCall, Target, dequote, parse_arguments};
pub use policy::{
    AdditionalTypes, ENABLE_ALL_PROPERTY_FUNCTIONS, FunctionPolicy, PROBE_EXTERNAL_TYPES,
    TypeCache, TypeProbe,
};
pub use resolver::{ArgumentExpander, FunctionResolver, LiteralArguments, Resolution};
