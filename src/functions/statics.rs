//! Static members of the framework types reachable as `[Type]::Member`.

use std::path::Path;

use chrono::{Local, Utc};
use regex::Regex;

use crate::base::{Value, Version};
use crate::model::paths;

use super::catalog::ParamType as P;
use super::catalog::{
    Allowed, CallError, CallResult, Invocation, Member, Overload, STRING_COMPARISON, TypeEntry,
    comparison_ignores_case,
};
use super::coerce::{parse_bool, parse_float, parse_integer};
use super::instance::format_composite;

const NONE: &[P] = &[];
const S1: &[P] = &[P::Str];
const S2: &[P] = &[P::Str, P::Str];
const S3: &[P] = &[P::Str, P::Str, P::Str];
const S4: &[P] = &[P::Str, P::Str, P::Str, P::Str];
const TRY_PARSE: &[P] = &[P::Str, P::Out];

fn format_error() -> CallError {
    CallError::failed("Input string was not in a correct format.")
}

// ============================================================================
// System.String
// ============================================================================

pub static STRING: TypeEntry = TypeEntry {
    name: "System.String",
    allowed: Allowed::All,
    members: &[
        Member {
            name: "new",
            overloads: &[
                Overload::new(&[P::Char, P::Int], string_new_repeat),
                Overload::new(&[P::CharArray], string_new_chars),
            ],
        },
        Member {
            name: "IsNullOrEmpty",
            overloads: &[Overload::new(S1, is_null_or_empty)],
        },
        Member {
            name: "IsNullOrWhiteSpace",
            overloads: &[Overload::new(S1, is_null_or_white_space)],
        },
        Member {
            name: "Concat",
            overloads: &[
                Overload::new(S2, concat),
                Overload::new(S3, concat),
                Overload::new(S4, concat),
            ],
        },
        Member {
            name: "Copy",
            overloads: &[Overload::new(S1, copy)],
        },
        Member {
            name: "Equals",
            overloads: &[
                Overload::new(S2, string_equals),
                Overload::new(&[P::Str, P::Str, P::Enum(&STRING_COMPARISON)], string_equals),
            ],
        },
        Member {
            name: "Compare",
            overloads: &[
                Overload::new(S2, compare),
                Overload::new(&[P::Str, P::Str, P::Bool], compare_ignore_case),
                Overload::new(&[P::Str, P::Str, P::Enum(&STRING_COMPARISON)], compare),
            ],
        },
        Member {
            name: "Join",
            overloads: &[
                Overload::new(&[P::Str, P::Any], join),
                Overload::new(S3, join),
                Overload::new(S4, join),
            ],
        },
        Member {
            name: "Format",
            overloads: &[
                Overload::new(&[P::Str, P::Any], format),
                Overload::new(&[P::Str, P::Any, P::Any], format),
                Overload::new(&[P::Str, P::Any, P::Any, P::Any], format),
            ],
        },
    ],
};

fn string_new_repeat(inv: &Invocation<'_>) -> CallResult {
    let count = usize::try_from(inv.int(1)?)
        .map_err(|_| CallError::failed("count cannot be negative"))?;
    Ok(Value::Str(std::iter::repeat_n(inv.char(0)?, count).collect()))
}

fn string_new_chars(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Str(inv.chars(0)?.into_iter().collect()))
}

fn is_null_or_empty(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(inv.opt_str(0)?.is_none_or(str::is_empty)))
}

fn is_null_or_white_space(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(
        inv.opt_str(0)?.is_none_or(|s| s.trim().is_empty()),
    ))
}

fn concat(inv: &Invocation<'_>) -> CallResult {
    let mut out = String::new();
    for i in 0..inv.args.len() {
        out.push_str(inv.str(i)?);
    }
    Ok(Value::Str(out))
}

fn copy(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::string(inv.required_str(0)?))
}

/// Ordinal equality, case-insensitive for the `IgnoreCase` comparisons.
pub fn equals_with(a: &str, b: &str, comparison: i64) -> bool {
    if comparison_ignores_case(comparison) {
        a.to_lowercase() == b.to_lowercase()
    } else {
        a == b
    }
}

fn comparison_arg(inv: &Invocation<'_>, index: usize) -> Result<i64, CallError> {
    if inv.args.len() > index {
        inv.int(index)
    } else {
        Ok(4)
    }
}

fn string_equals(inv: &Invocation<'_>) -> CallResult {
    let comparison = comparison_arg(inv, 2)?;
    Ok(Value::Bool(match (inv.opt_str(0)?, inv.opt_str(1)?) {
        (Some(a), Some(b)) => equals_with(a, b, comparison),
        (a, b) => a == b,
    }))
}

/// Three-way compare, reported as -1, 0 or 1.
pub fn compare_with(a: &str, b: &str, ignore_case: bool) -> i64 {
    let ordering = if ignore_case {
        a.to_lowercase().cmp(&b.to_lowercase())
    } else {
        a.cmp(b)
    };
    ordering as i64
}

fn compare(inv: &Invocation<'_>) -> CallResult {
    let ignore_case = comparison_ignores_case(comparison_arg(inv, 2)?);
    Ok(Value::Int(compare_with(inv.str(0)?, inv.str(1)?, ignore_case)))
}

fn compare_ignore_case(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(compare_with(inv.str(0)?, inv.str(1)?, inv.bool(2)?)))
}

fn join(inv: &Invocation<'_>) -> CallResult {
    let separator = inv.str(0)?;
    let parts: Vec<String> = match &inv.args[1..] {
        [Value::Seq(items)] => items.iter().map(Value::to_raw_string).collect(),
        rest => rest.iter().map(Value::to_raw_string).collect(),
    };
    Ok(Value::Str(parts.join(separator)))
}

fn format(inv: &Invocation<'_>) -> CallResult {
    format_composite(inv.required_str(0)?, &inv.args[1..]).map(Value::Str)
}

// ============================================================================
// System.IO.Path
// ============================================================================

pub static PATH: TypeEntry = TypeEntry {
    name: "System.IO.Path",
    allowed: Allowed::All,
    members: &[
        Member {
            name: "Combine",
            overloads: &[
                Overload::new(S2, path_combine),
                Overload::new(S3, path_combine),
                Overload::new(S4, path_combine),
            ],
        },
        Member {
            name: "GetFileName",
            overloads: &[Overload::new(S1, get_file_name)],
        },
        Member {
            name: "GetFileNameWithoutExtension",
            overloads: &[Overload::new(S1, get_file_name_without_extension)],
        },
        Member {
            name: "GetExtension",
            overloads: &[Overload::new(S1, get_extension)],
        },
        Member {
            name: "GetDirectoryName",
            overloads: &[Overload::new(S1, get_directory_name)],
        },
        Member {
            name: "GetFullPath",
            overloads: &[Overload::new(S1, get_full_path)],
        },
        Member {
            name: "IsPathRooted",
            overloads: &[Overload::new(S1, is_path_rooted)],
        },
        Member {
            name: "ChangeExtension",
            overloads: &[Overload::new(S2, change_extension)],
        },
        Member {
            name: "HasExtension",
            overloads: &[Overload::new(S1, has_extension)],
        },
        Member {
            name: "GetPathRoot",
            overloads: &[Overload::new(S1, get_path_root)],
        },
        Member {
            name: "DirectorySeparatorChar",
            overloads: &[Overload::new(NONE, directory_separator_char)],
        },
        Member {
            name: "AltDirectorySeparatorChar",
            overloads: &[Overload::new(NONE, alt_directory_separator_char)],
        },
        Member {
            name: "PathSeparator",
            overloads: &[Overload::new(NONE, path_separator)],
        },
        Member {
            name: "GetTempPath",
            overloads: &[Overload::new(NONE, get_temp_path)],
        },
    ],
};

pub(super) fn path_combine(inv: &Invocation<'_>) -> CallResult {
    let mut combined = String::new();
    for i in 0..inv.args.len() {
        combined = paths::combine(&combined, inv.required_str(i)?);
    }
    Ok(Value::Str(combined))
}

/// Apply `f` to a path argument; a null path gives null.
fn map_path(inv: &Invocation<'_>, f: impl FnOnce(&str) -> Value) -> CallResult {
    Ok(inv.opt_str(0)?.map_or(Value::Null, f))
}

pub(super) fn get_file_name(inv: &Invocation<'_>) -> CallResult {
    map_path(inv, |p| Value::string(paths::file_name(p)))
}

pub(super) fn get_file_name_without_extension(inv: &Invocation<'_>) -> CallResult {
    map_path(inv, |p| Value::string(paths::file_name_without_extension(p)))
}

pub(super) fn get_extension(inv: &Invocation<'_>) -> CallResult {
    map_path(inv, |p| Value::string(paths::extension(p)))
}

pub(super) fn get_directory_name(inv: &Invocation<'_>) -> CallResult {
    map_path(inv, |p| {
        paths::directory_name(p).map_or(Value::Null, Value::Str)
    })
}

pub(super) fn get_full_path(inv: &Invocation<'_>) -> CallResult {
    let path = inv.required_str(0)?;
    if path.trim().is_empty() {
        return Err(CallError::failed("The path is empty."));
    }
    Ok(Value::Str(paths::full_path(
        path,
        &inv.env.current_directory()?,
    )))
}

pub(super) fn is_path_rooted(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(inv.opt_str(0)?.is_some_and(paths::is_rooted)))
}

fn change_extension(inv: &Invocation<'_>) -> CallResult {
    let extension = inv.opt_str(1)?;
    map_path(inv, |p| Value::Str(paths::change_extension(p, extension)))
}

fn has_extension(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(
        inv.opt_str(0)?.is_some_and(|p| !paths::extension(p).is_empty()),
    ))
}

fn get_path_root(inv: &Invocation<'_>) -> CallResult {
    map_path(inv, |p| Value::Str(paths::root(p)))
}

fn directory_separator_char(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Char(std::path::MAIN_SEPARATOR))
}

fn alt_directory_separator_char(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Char('/'))
}

fn path_separator(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Char(if cfg!(windows) { ';' } else { ':' }))
}

fn get_temp_path(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Str(paths::ensure_trailing_slash(
        &std::env::temp_dir().to_string_lossy(),
    )))
}

// ============================================================================
// System.Math
// ============================================================================

pub static MATH: TypeEntry = TypeEntry {
    name: "System.Math",
    allowed: Allowed::All,
    members: &[
        Member {
            name: "Abs",
            overloads: &[
                Overload::new(&[P::Long], abs_long),
                Overload::new(&[P::Float], abs_float),
            ],
        },
        Member {
            name: "Max",
            overloads: &[
                Overload::new(&[P::Long, P::Long], max_long),
                Overload::new(&[P::Float, P::Float], max_float),
            ],
        },
        Member {
            name: "Min",
            overloads: &[
                Overload::new(&[P::Long, P::Long], min_long),
                Overload::new(&[P::Float, P::Float], min_float),
            ],
        },
        Member {
            name: "Floor",
            overloads: &[Overload::new(&[P::Float], floor)],
        },
        Member {
            name: "Ceiling",
            overloads: &[Overload::new(&[P::Float], ceiling)],
        },
        Member {
            name: "Round",
            overloads: &[
                Overload::new(&[P::Float], round),
                Overload::new(&[P::Float, P::Int], round_digits),
            ],
        },
        Member {
            name: "Pow",
            overloads: &[Overload::new(&[P::Float, P::Float], pow)],
        },
        Member {
            name: "Sqrt",
            overloads: &[Overload::new(&[P::Float], sqrt)],
        },
        Member {
            name: "Truncate",
            overloads: &[Overload::new(&[P::Float], truncate)],
        },
        Member {
            name: "Sign",
            overloads: &[
                Overload::new(&[P::Long], sign_long),
                Overload::new(&[P::Float], sign_float),
            ],
        },
    ],
};

fn abs_long(inv: &Invocation<'_>) -> CallResult {
    inv.int(0)?
        .checked_abs()
        .map(Value::Int)
        .ok_or_else(|| CallError::failed("Negating the minimum value of a twos complement number is invalid."))
}

fn abs_float(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Float(inv.float(0)?.abs()))
}

fn max_long(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(inv.int(0)?.max(inv.int(1)?)))
}

fn max_float(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Float(inv.float(0)?.max(inv.float(1)?)))
}

fn min_long(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(inv.int(0)?.min(inv.int(1)?)))
}

fn min_float(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Float(inv.float(0)?.min(inv.float(1)?)))
}

fn floor(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Float(inv.float(0)?.floor()))
}

fn ceiling(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Float(inv.float(0)?.ceil()))
}

fn round(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Float(inv.float(0)?.round_ties_even()))
}

fn round_digits(inv: &Invocation<'_>) -> CallResult {
    let digits = inv.int(1)?;
    if !(0..=15).contains(&digits) {
        return Err(CallError::failed("Rounding digits must be between 0 and 15, inclusive."));
    }
    let scale = 10f64.powi(digits as i32);
    Ok(Value::Float((inv.float(0)? * scale).round_ties_even() / scale))
}

fn pow(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Float(inv.float(0)?.powf(inv.float(1)?)))
}

fn sqrt(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Float(inv.float(0)?.sqrt()))
}

fn truncate(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Float(inv.float(0)?.trunc()))
}

fn sign_long(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(inv.int(0)?.signum()))
}

fn sign_float(inv: &Invocation<'_>) -> CallResult {
    let value = inv.float(0)?;
    if value.is_nan() {
        return Err(CallError::failed("Function does not accept floating point Not-a-Number values."));
    }
    Ok(Value::Int(if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }))
}

// ============================================================================
// System.Environment
// ============================================================================

pub static ENVIRONMENT: TypeEntry = TypeEntry {
    name: "System.Environment",
    allowed: Allowed::Only(&[
        "GetEnvironmentVariable",
        "NewLine",
        "ProcessorCount",
        "MachineName",
        "UserName",
        "Is64BitOperatingSystem",
        "Is64BitProcess",
        "ExpandEnvironmentVariables",
    ]),
    members: &[
        Member {
            name: "GetEnvironmentVariable",
            overloads: &[Overload::new(S1, get_environment_variable)],
        },
        Member {
            name: "GetEnvironmentVariables",
            overloads: &[Overload::new(NONE, get_environment_variables)],
        },
        Member {
            name: "NewLine",
            overloads: &[Overload::new(NONE, new_line)],
        },
        Member {
            name: "ProcessorCount",
            overloads: &[Overload::new(NONE, processor_count)],
        },
        Member {
            name: "MachineName",
            overloads: &[Overload::new(NONE, machine_name)],
        },
        Member {
            name: "UserName",
            overloads: &[Overload::new(NONE, user_name)],
        },
        Member {
            name: "Is64BitOperatingSystem",
            overloads: &[Overload::new(NONE, is_64_bit)],
        },
        Member {
            name: "Is64BitProcess",
            overloads: &[Overload::new(NONE, is_64_bit)],
        },
        Member {
            name: "ExpandEnvironmentVariables",
            overloads: &[Overload::new(S1, expand_environment_variables)],
        },
    ],
};

pub(super) fn get_environment_variable(inv: &Invocation<'_>) -> CallResult {
    let name = inv.required_str(0)?;
    Ok(std::env::var(name).map_or(Value::Null, Value::Str))
}

fn get_environment_variables(_inv: &Invocation<'_>) -> CallResult {
    let mut vars: Vec<(String, String)> = std::env::vars().collect();
    vars.sort();
    Ok(Value::Map(
        vars.into_iter()
            .map(|(k, v)| (Value::Str(k), Value::Str(v)))
            .collect(),
    ))
}

fn new_line(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::string(if cfg!(windows) { "\r\n" } else { "\n" }))
}

fn processor_count(_inv: &Invocation<'_>) -> CallResult {
    let count = std::thread::available_parallelism().map_or(1, |n| n.get());
    Ok(Value::Int(count as i64))
}

fn machine_name(_inv: &Invocation<'_>) -> CallResult {
    let name = std::env::var("COMPUTERNAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .ok()
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .map(|s| s.trim().to_string())
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "localhost".to_string());
    Ok(Value::Str(name))
}

fn user_name(_inv: &Invocation<'_>) -> CallResult {
    let name = std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_default();
    Ok(Value::Str(name))
}

fn is_64_bit(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(cfg!(target_pointer_width = "64")))
}

/// Replace each `%NAME%` with the variable's value; unknown names are
/// left in place.
pub fn expand_environment_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('%') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('%') {
            Some(close) => match std::env::var(&after[..close]) {
                Ok(value) if close > 0 => {
                    out.push_str(&value);
                    rest = &after[close + 1..];
                }
                _ => {
                    out.push('%');
                    rest = after;
                }
            },
            None => {
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn expand_environment_variables(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Str(expand_environment_text(inv.required_str(0)?)))
}

// ============================================================================
// System.IO.File / System.IO.Directory
// ============================================================================

pub static FILE: TypeEntry = TypeEntry {
    name: "System.IO.File",
    allowed: Allowed::Only(&["Exists", "ReadAllText"]),
    members: &[
        Member {
            name: "Exists",
            overloads: &[Overload::new(S1, file_exists)],
        },
        Member {
            name: "ReadAllText",
            overloads: &[Overload::new(S1, read_all_text)],
        },
    ],
};

pub static DIRECTORY: TypeEntry = TypeEntry {
    name: "System.IO.Directory",
    allowed: Allowed::Only(&["Exists"]),
    members: &[
        Member {
            name: "Exists",
            overloads: &[Overload::new(S1, directory_exists)],
        },
        Member {
            name: "GetCurrentDirectory",
            overloads: &[Overload::new(NONE, get_current_directory)],
        },
    ],
};

fn resolve(inv: &Invocation<'_>, path: &str) -> Result<String, CallError> {
    Ok(paths::full_path(path, &inv.env.current_directory()?))
}

pub(super) fn file_exists(inv: &Invocation<'_>) -> CallResult {
    let Some(path) = inv.opt_str(0)?.filter(|p| !p.is_empty()) else {
        return Ok(Value::Bool(false));
    };
    let full = resolve(inv, path)?;
    Ok(Value::Bool(inv.env.file_system.file_exists(Path::new(&full))))
}

fn read_all_text(inv: &Invocation<'_>) -> CallResult {
    let full = resolve(inv, inv.required_str(0)?)?;
    inv.env
        .file_system
        .read_to_string(Path::new(&full))
        .map(Value::Str)
        .map_err(|err| CallError::failed(format!("{full}: {err}")))
}

pub(super) fn directory_exists(inv: &Invocation<'_>) -> CallResult {
    let Some(path) = inv.opt_str(0)?.filter(|p| !p.is_empty()) else {
        return Ok(Value::Bool(false));
    };
    let full = resolve(inv, path)?;
    Ok(Value::Bool(inv.env.file_system.directory_exists(Path::new(&full))))
}

fn get_current_directory(inv: &Invocation<'_>) -> CallResult {
    inv.env.current_directory().map(Value::Str)
}

// ============================================================================
// System.Convert
// ============================================================================

pub static CONVERT: TypeEntry = TypeEntry {
    name: "System.Convert",
    allowed: Allowed::All,
    members: &[
        Member {
            name: "ToInt32",
            overloads: &[Overload::new(&[P::Int], identity)],
        },
        Member {
            name: "ToInt64",
            overloads: &[Overload::new(&[P::Long], identity)],
        },
        Member {
            name: "ToDouble",
            overloads: &[Overload::new(&[P::Float], identity)],
        },
        Member {
            name: "ToBoolean",
            overloads: &[Overload::new(&[P::Bool], identity)],
        },
        Member {
            name: "ToString",
            overloads: &[Overload::new(&[P::Any], convert_to_string)],
        },
    ],
};

/// The coerced argument is already the answer.
fn identity(inv: &Invocation<'_>) -> CallResult {
    Ok(inv.arg(0).clone())
}

fn convert_to_string(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Str(inv.arg(0).to_raw_string()))
}

// ============================================================================
// System.Char
// ============================================================================

pub static CHAR: TypeEntry = TypeEntry {
    name: "System.Char",
    allowed: Allowed::All,
    members: &[
        Member {
            name: "IsDigit",
            overloads: &[
                Overload::new(&[P::Char], char_is_digit),
                Overload::new(&[P::Str, P::Int], char_is_digit),
            ],
        },
        Member {
            name: "IsLetter",
            overloads: &[
                Overload::new(&[P::Char], char_is_letter),
                Overload::new(&[P::Str, P::Int], char_is_letter),
            ],
        },
        Member {
            name: "IsLetterOrDigit",
            overloads: &[
                Overload::new(&[P::Char], char_is_letter_or_digit),
                Overload::new(&[P::Str, P::Int], char_is_letter_or_digit),
            ],
        },
        Member {
            name: "IsWhiteSpace",
            overloads: &[
                Overload::new(&[P::Char], char_is_white_space),
                Overload::new(&[P::Str, P::Int], char_is_white_space),
            ],
        },
        Member {
            name: "IsUpper",
            overloads: &[
                Overload::new(&[P::Char], char_is_upper),
                Overload::new(&[P::Str, P::Int], char_is_upper),
            ],
        },
        Member {
            name: "IsLower",
            overloads: &[
                Overload::new(&[P::Char], char_is_lower),
                Overload::new(&[P::Str, P::Int], char_is_lower),
            ],
        },
    ],
};

/// The character argument, or the character at an index of a string.
fn char_arg(inv: &Invocation<'_>) -> Result<char, CallError> {
    if inv.args.len() == 1 {
        return inv.char(0);
    }
    let s = inv.required_str(0)?;
    usize::try_from(inv.int(1)?)
        .ok()
        .and_then(|i| s.chars().nth(i))
        .ok_or_else(|| CallError::failed("Index was out of range."))
}

fn char_is_digit(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(char_arg(inv)?.is_numeric()))
}

fn char_is_letter(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(char_arg(inv)?.is_alphabetic()))
}

fn char_is_letter_or_digit(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(char_arg(inv)?.is_alphanumeric()))
}

fn char_is_white_space(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(char_arg(inv)?.is_whitespace()))
}

fn char_is_upper(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(char_arg(inv)?.is_uppercase()))
}

fn char_is_lower(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(char_arg(inv)?.is_lowercase()))
}

// ============================================================================
// System.Int32 / System.Int64 / System.Double / System.Boolean
// ============================================================================

pub static INT32: TypeEntry = TypeEntry {
    name: "System.Int32",
    allowed: Allowed::All,
    members: &[
        Member {
            name: "Parse",
            overloads: &[Overload::new(S1, int32_parse)],
        },
        Member {
            name: "TryParse",
            overloads: &[Overload::new(TRY_PARSE, int32_try_parse)],
        },
        Member {
            name: "MaxValue",
            overloads: &[Overload::new(NONE, int32_max)],
        },
        Member {
            name: "MinValue",
            overloads: &[Overload::new(NONE, int32_min)],
        },
    ],
};

fn parse_int32(text: &str) -> Option<i64> {
    parse_integer(text).filter(|i| i32::try_from(*i).is_ok())
}

fn int32_parse(inv: &Invocation<'_>) -> CallResult {
    parse_int32(inv.required_str(0)?)
        .map(Value::Int)
        .ok_or_else(format_error)
}

fn int32_try_parse(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(parse_int32(inv.str(0)?).is_some()))
}

fn int32_max(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(i64::from(i32::MAX)))
}

fn int32_min(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(i64::from(i32::MIN)))
}

pub static INT64: TypeEntry = TypeEntry {
    name: "System.Int64",
    allowed: Allowed::All,
    members: &[
        Member {
            name: "Parse",
            overloads: &[Overload::new(S1, int64_parse)],
        },
        Member {
            name: "TryParse",
            overloads: &[Overload::new(TRY_PARSE, int64_try_parse)],
        },
        Member {
            name: "MaxValue",
            overloads: &[Overload::new(NONE, int64_max)],
        },
        Member {
            name: "MinValue",
            overloads: &[Overload::new(NONE, int64_min)],
        },
    ],
};

fn int64_parse(inv: &Invocation<'_>) -> CallResult {
    parse_integer(inv.required_str(0)?)
        .map(Value::Int)
        .ok_or_else(format_error)
}

fn int64_try_parse(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(parse_integer(inv.str(0)?).is_some()))
}

fn int64_max(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(i64::MAX))
}

fn int64_min(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(i64::MIN))
}

pub static DOUBLE: TypeEntry = TypeEntry {
    name: "System.Double",
    allowed: Allowed::All,
    members: &[
        Member {
            name: "Parse",
            overloads: &[Overload::new(S1, double_parse)],
        },
        Member {
            name: "TryParse",
            overloads: &[Overload::new(TRY_PARSE, double_try_parse)],
        },
        Member {
            name: "MaxValue",
            overloads: &[Overload::new(NONE, double_max)],
        },
        Member {
            name: "MinValue",
            overloads: &[Overload::new(NONE, double_min)],
        },
    ],
};

fn double_parse(inv: &Invocation<'_>) -> CallResult {
    parse_float(inv.required_str(0)?)
        .map(Value::Float)
        .ok_or_else(format_error)
}

fn double_try_parse(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(parse_float(inv.str(0)?).is_some()))
}

fn double_max(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Float(f64::MAX))
}

fn double_min(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Float(f64::MIN))
}

pub static BOOLEAN: TypeEntry = TypeEntry {
    name: "System.Boolean",
    allowed: Allowed::All,
    members: &[
        Member {
            name: "Parse",
            overloads: &[Overload::new(S1, bool_parse)],
        },
        Member {
            name: "TryParse",
            overloads: &[Overload::new(TRY_PARSE, bool_try_parse)],
        },
    ],
};

fn bool_parse(inv: &Invocation<'_>) -> CallResult {
    parse_bool(inv.required_str(0)?)
        .map(Value::Bool)
        .ok_or_else(|| CallError::failed("String was not recognized as a valid Boolean."))
}

fn bool_try_parse(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(parse_bool(inv.str(0)?).is_some()))
}

// ============================================================================
// System.Guid / System.Version / System.DateTime
// ============================================================================

pub static GUID: TypeEntry = TypeEntry {
    name: "System.Guid",
    allowed: Allowed::All,
    members: &[
        Member {
            name: "NewGuid",
            overloads: &[Overload::new(NONE, new_guid)],
        },
        Member {
            name: "Empty",
            overloads: &[Overload::new(NONE, empty_guid)],
        },
    ],
};

fn new_guid(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Str(uuid::Uuid::new_v4().to_string()))
}

fn empty_guid(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Str(uuid::Uuid::nil().to_string()))
}

pub static VERSION: TypeEntry = TypeEntry {
    name: "System.Version",
    allowed: Allowed::All,
    members: &[
        Member {
            name: "new",
            overloads: &[
                Overload::new(S1, version_parse),
                Overload::new(&[P::Int, P::Int], version_new),
                Overload::new(&[P::Int, P::Int, P::Int], version_new),
                Overload::new(&[P::Int, P::Int, P::Int, P::Int], version_new),
            ],
        },
        Member {
            name: "Parse",
            overloads: &[Overload::new(S1, version_parse)],
        },
        Member {
            name: "TryParse",
            overloads: &[Overload::new(TRY_PARSE, version_try_parse)],
        },
    ],
};

fn version_parse(inv: &Invocation<'_>) -> CallResult {
    inv.required_str(0)?
        .parse::<Version>()
        .map(Value::Version)
        .map_err(|err| CallError::failed(err.to_string()))
}

fn version_try_parse(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(inv.str(0)?.parse::<Version>().is_ok()))
}

fn version_new(inv: &Invocation<'_>) -> CallResult {
    let mut parts = Vec::with_capacity(inv.args.len());
    for i in 0..inv.args.len() {
        let part = u32::try_from(inv.int(i)?).map_err(|_| {
            CallError::failed("Version's parameters must be greater than or equal to zero.")
        })?;
        parts.push(part);
    }
    let mut version = Version::new(parts[0], parts[1]);
    if let Some(&build) = parts.get(2) {
        version = version.with_build(build);
    }
    if let Some(&revision) = parts.get(3) {
        version = version.with_revision(revision);
    }
    Ok(Value::Version(version))
}

pub static DATE_TIME: TypeEntry = TypeEntry {
    name: "System.DateTime",
    allowed: Allowed::All,
    members: &[
        Member {
            name: "Now",
            overloads: &[Overload::new(NONE, now)],
        },
        Member {
            name: "UtcNow",
            overloads: &[Overload::new(NONE, utc_now)],
        },
        Member {
            name: "Today",
            overloads: &[Overload::new(NONE, today)],
        },
    ],
};

fn now(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::DateTime(Local::now().naive_local()))
}

fn utc_now(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::DateTime(Utc::now().naive_utc()))
}

fn today(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::DateTime(
        Local::now().date_naive().and_time(chrono::NaiveTime::MIN),
    ))
}

// ============================================================================
// System.Text.RegularExpressions.Regex
// ============================================================================

pub static REGEX: TypeEntry = TypeEntry {
    name: "System.Text.RegularExpressions.Regex",
    allowed: Allowed::All,
    members: &[
        Member {
            name: "IsMatch",
            overloads: &[Overload::new(S2, regex_is_match)],
        },
        Member {
            name: "Replace",
            overloads: &[Overload::new(S3, regex_replace)],
        },
        Member {
            name: "Escape",
            overloads: &[Overload::new(S1, regex_escape)],
        },
        Member {
            name: "Match",
            overloads: &[Overload::new(S2, regex_match)],
        },
        Member {
            name: "Split",
            overloads: &[Overload::new(S2, regex_split)],
        },
    ],
};

fn compile(pattern: &str) -> Result<Regex, CallError> {
    Regex::new(pattern).map_err(|err| CallError::failed(err.to_string()))
}

fn regex_is_match(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(compile(inv.required_str(1)?)?.is_match(inv.required_str(0)?)))
}

fn regex_replace(inv: &Invocation<'_>) -> CallResult {
    let regex = compile(inv.required_str(1)?)?;
    Ok(Value::Str(
        regex
            .replace_all(inv.required_str(0)?, inv.str(2)?)
            .into_owned(),
    ))
}

fn regex_escape(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Str(regex::escape(inv.required_str(0)?)))
}

fn regex_match(inv: &Invocation<'_>) -> CallResult {
    let regex = compile(inv.required_str(1)?)?;
    Ok(Value::string(
        regex
            .find(inv.required_str(0)?)
            .map_or("", |m| m.as_str()),
    ))
}

fn regex_split(inv: &Invocation<'_>) -> CallResult {
    let regex = compile(inv.required_str(1)?)?;
    Ok(Value::Seq(
        regex
            .split(inv.required_str(0)?)
            .map(Value::string)
            .collect(),
    ))
}

// ============================================================================
// Probe-only types
// ============================================================================

pub static RUNTIME_INFORMATION: TypeEntry = TypeEntry {
    name: "System.Runtime.InteropServices.RuntimeInformation",
    allowed: Allowed::All,
    members: &[
        Member {
            name: "OSDescription",
            overloads: &[Overload::new(NONE, os_description)],
        },
        Member {
            name: "OSArchitecture",
            overloads: &[Overload::new(NONE, architecture)],
        },
        Member {
            name: "ProcessArchitecture",
            overloads: &[Overload::new(NONE, architecture)],
        },
        Member {
            name: "FrameworkDescription",
            overloads: &[Overload::new(NONE, framework_description)],
        },
    ],
};

fn os_description(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::string(std::env::consts::OS))
}

fn architecture(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::string(match std::env::consts::ARCH {
        "x86_64" => "X64",
        "x86" => "X86",
        "aarch64" => "Arm64",
        "arm" => "Arm",
        other => other,
    }))
}

fn framework_description(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::string(concat!("buildexpr ", env!("CARGO_PKG_VERSION"))))
}
