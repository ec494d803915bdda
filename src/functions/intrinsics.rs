//! `[MSBuild]::` intrinsic functions.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::base::{Value, escaping};
use crate::model::paths;

use super::catalog::ParamType as P;
use super::catalog::{Allowed, CallError, CallResult, Invocation, Member, Overload, TypeEntry};

/// Names whose candidate overloads are ordered integral-first.
pub const ARITHMETIC: &[&str] = &["Add", "Subtract", "Multiply", "Divide", "Modulo"];

/// Intrinsics whose string result is already in escaped form.
pub const RETURNS_ESCAPED: &[&str] = &["Escape", "Unescape", "ConvertFromBase64"];

pub fn is_arithmetic(name: &str) -> bool {
    ARITHMETIC.iter().any(|n| n.eq_ignore_ascii_case(name))
}

pub fn returns_escaped(name: &str) -> bool {
    RETURNS_ESCAPED.iter().any(|n| n.eq_ignore_ascii_case(name))
}

const S1: &[P] = &[P::Str];
const S2: &[P] = &[P::Str, P::Str];
const S3: &[P] = &[P::Str, P::Str, P::Str];
const S4: &[P] = &[P::Str, P::Str, P::Str, P::Str];

pub static MSBUILD: TypeEntry = TypeEntry {
    name: "MSBuild",
    allowed: Allowed::All,
    members: &[
        Member {
            name: "Add",
            overloads: &[
                Overload::new(&[P::Long, P::Long], add_long),
                Overload::new(&[P::Float, P::Float], add_float),
            ],
        },
        Member {
            name: "Subtract",
            overloads: &[
                Overload::new(&[P::Long, P::Long], subtract_long),
                Overload::new(&[P::Float, P::Float], subtract_float),
            ],
        },
        Member {
            name: "Multiply",
            overloads: &[
                Overload::new(&[P::Long, P::Long], multiply_long),
                Overload::new(&[P::Float, P::Float], multiply_float),
            ],
        },
        Member {
            name: "Divide",
            overloads: &[
                Overload::new(&[P::Long, P::Long], divide_long),
                Overload::new(&[P::Float, P::Float], divide_float),
            ],
        },
        Member {
            name: "Modulo",
            overloads: &[
                Overload::new(&[P::Long, P::Long], modulo_long),
                Overload::new(&[P::Float, P::Float], modulo_float),
            ],
        },
        Member {
            name: "BitwiseOr",
            overloads: &[Overload::new(&[P::Int, P::Int], bitwise_or)],
        },
        Member {
            name: "BitwiseAnd",
            overloads: &[Overload::new(&[P::Int, P::Int], bitwise_and)],
        },
        Member {
            name: "BitwiseXor",
            overloads: &[Overload::new(&[P::Int, P::Int], bitwise_xor)],
        },
        Member {
            name: "BitwiseNot",
            overloads: &[Overload::new(&[P::Int], bitwise_not)],
        },
        Member {
            name: "Escape",
            overloads: &[Overload::new(S1, escape)],
        },
        Member {
            name: "Unescape",
            overloads: &[Overload::new(S1, unescape)],
        },
        Member {
            name: "ConvertToBase64",
            overloads: &[Overload::new(S1, convert_to_base64)],
        },
        Member {
            name: "ConvertFromBase64",
            overloads: &[Overload::new(S1, convert_from_base64)],
        },
        Member {
            name: "ValueOrDefault",
            overloads: &[Overload::new(S2, value_or_default)],
        },
        Member {
            name: "NormalizePath",
            overloads: &[
                Overload::new(S1, normalize_path),
                Overload::new(S2, normalize_path),
                Overload::new(S3, normalize_path),
                Overload::new(S4, normalize_path),
            ],
        },
        Member {
            name: "NormalizeDirectory",
            overloads: &[
                Overload::new(S1, normalize_directory),
                Overload::new(S2, normalize_directory),
                Overload::new(S3, normalize_directory),
                Overload::new(S4, normalize_directory),
            ],
        },
        Member {
            name: "EnsureTrailingSlash",
            overloads: &[Overload::new(S1, ensure_trailing_slash)],
        },
        Member {
            name: "MakeRelative",
            overloads: &[Overload::new(S2, make_relative)],
        },
        Member {
            name: "GetDirectoryNameOfFileAbove",
            overloads: &[Overload::new(S2, get_directory_name_of_file_above)],
        },
        Member {
            name: "GetPathOfFileAbove",
            overloads: &[
                Overload::new(S1, get_path_of_file_above),
                Overload::new(S2, get_path_of_file_above),
            ],
        },
        Member {
            name: "VersionEquals",
            overloads: &[Overload::new(S2, version_equals)],
        },
        Member {
            name: "VersionNotEquals",
            overloads: &[Overload::new(S2, version_not_equals)],
        },
        Member {
            name: "VersionGreaterThan",
            overloads: &[Overload::new(S2, version_greater_than)],
        },
        Member {
            name: "VersionGreaterThanOrEquals",
            overloads: &[Overload::new(S2, version_greater_than_or_equals)],
        },
        Member {
            name: "VersionLessThan",
            overloads: &[Overload::new(S2, version_less_than)],
        },
        Member {
            name: "VersionLessThanOrEquals",
            overloads: &[Overload::new(S2, version_less_than_or_equals)],
        },
        Member {
            name: "IsOSPlatform",
            overloads: &[Overload::new(S1, is_os_platform)],
        },
        Member {
            name: "IsOsUnixLike",
            overloads: &[Overload::new(&[], is_os_unix_like)],
        },
        Member {
            name: "IsOsBsdLike",
            overloads: &[Overload::new(&[], is_os_bsd_like)],
        },
        Member {
            name: "StableStringHash",
            overloads: &[Overload::new(S1, stable_string_hash)],
        },
        Member {
            name: "DoesTaskHostExist",
            overloads: &[Overload::new(S2, does_task_host_exist)],
        },
        Member {
            name: "SubstringByAsciiChars",
            overloads: &[Overload::new(
                &[P::Str, P::Int, P::Int],
                substring_by_ascii_chars,
            )],
        },
    ],
};

// ============================================================================
// Arithmetic
// ============================================================================

fn divide_by_zero() -> CallError {
    CallError::failed("Attempted to divide by zero.")
}

fn overflow() -> CallError {
    CallError::failed("Arithmetic operation resulted in an overflow.")
}

fn add_long(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(inv.int(0)?.wrapping_add(inv.int(1)?)))
}

fn add_float(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Float(inv.float(0)? + inv.float(1)?))
}

fn subtract_long(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(inv.int(0)?.wrapping_sub(inv.int(1)?)))
}

fn subtract_float(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Float(inv.float(0)? - inv.float(1)?))
}

fn multiply_long(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(inv.int(0)?.wrapping_mul(inv.int(1)?)))
}

fn multiply_float(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Float(inv.float(0)? * inv.float(1)?))
}

fn divide_long(inv: &Invocation<'_>) -> CallResult {
    let divisor = inv.int(1)?;
    if divisor == 0 {
        return Err(divide_by_zero());
    }
    inv.int(0)?.checked_div(divisor).map(Value::Int).ok_or_else(overflow)
}

fn divide_float(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Float(inv.float(0)? / inv.float(1)?))
}

fn modulo_long(inv: &Invocation<'_>) -> CallResult {
    let divisor = inv.int(1)?;
    if divisor == 0 {
        return Err(divide_by_zero());
    }
    inv.int(0)?.checked_rem(divisor).map(Value::Int).ok_or_else(overflow)
}

fn modulo_float(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Float(inv.float(0)? % inv.float(1)?))
}

fn int32(inv: &Invocation<'_>, index: usize) -> Result<i32, CallError> {
    i32::try_from(inv.int(index)?).map_err(|_| overflow())
}

fn bitwise_or(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(i64::from(int32(inv, 0)? | int32(inv, 1)?)))
}

fn bitwise_and(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(i64::from(int32(inv, 0)? & int32(inv, 1)?)))
}

fn bitwise_xor(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(i64::from(int32(inv, 0)? ^ int32(inv, 1)?)))
}

fn bitwise_not(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(i64::from(!int32(inv, 0)?)))
}

// ============================================================================
// Strings
// ============================================================================

pub(super) fn escape(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::string(escaping::escape(inv.str(0)?)))
}

pub(super) fn unescape(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::string(escaping::unescape(inv.str(0)?)))
}

fn convert_to_base64(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::string(BASE64.encode(inv.str(0)?)))
}

fn convert_from_base64(inv: &Invocation<'_>) -> CallResult {
    let bytes = BASE64
        .decode(inv.str(0)?.trim())
        .map_err(|err| CallError::failed(format!("The input is not a valid Base-64 string: {err}")))?;
    String::from_utf8(bytes)
        .map(Value::Str)
        .map_err(|err| CallError::failed(err.to_string()))
}

pub(super) fn value_or_default(inv: &Invocation<'_>) -> CallResult {
    let value = inv.str(0)?;
    Ok(Value::string(if value.is_empty() {
        inv.str(1)?
    } else {
        value
    }))
}

/// `SubstringByAsciiChars`: characters outside printable ASCII, and those
/// invalid in file names, become `_`.
fn substring_by_ascii_chars(inv: &Invocation<'_>) -> CallResult {
    const INVALID_FILE_NAME_CHARS: &str = "\"<>|:*?\\/";

    let input: Vec<char> = inv.str(0)?.chars().collect();
    let start = usize::try_from(inv.int(1)?)
        .map_err(|_| CallError::failed("start index cannot be negative"))?;
    let length = usize::try_from(inv.int(2)?)
        .map_err(|_| CallError::failed("length cannot be negative"))?;
    if start > input.len() {
        return Ok(Value::string(""));
    }
    let end = start.saturating_add(length).min(input.len());

    let result: String = input[start..end]
        .iter()
        .map(|&c| {
            if (' '..='~').contains(&c) && !INVALID_FILE_NAME_CHARS.contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect();
    Ok(Value::Str(result))
}

/// The hash MSBuild used for file names before string hashing was
/// randomized; stable across processes and platforms.
pub fn stable_string_hash_of(s: &str) -> i32 {
    let mut units: Vec<u16> = s.encode_utf16().collect();
    let len = units.len();
    units.resize(len + 4, 0);
    let word = |i: usize| i32::from(units[i]) | (i32::from(units[i + 1]) << 16);

    let mut hash1: i32 = (5381 << 16) + 5381;
    let mut hash2 = hash1;
    let mut remaining = len as isize;
    let mut pos = 0;
    while remaining > 0 {
        hash1 = (hash1 << 5).wrapping_add(hash1).wrapping_add(hash1 >> 27) ^ word(pos);
        if remaining <= 2 {
            break;
        }
        hash2 = (hash2 << 5).wrapping_add(hash2).wrapping_add(hash2 >> 27) ^ word(pos + 2);
        pos += 4;
        remaining -= 4;
    }
    hash1.wrapping_add(hash2.wrapping_mul(1_566_083_941))
}

fn stable_string_hash(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(i64::from(stable_string_hash_of(inv.str(0)?))))
}

// ============================================================================
// Paths
// ============================================================================

fn string_args<'a>(inv: &Invocation<'a>) -> Result<Vec<&'a str>, CallError> {
    (0..inv.args.len()).map(|i| inv.required_str(i)).collect()
}

pub(super) fn normalize_path(inv: &Invocation<'_>) -> CallResult {
    let parts = string_args(inv)?;
    let combined = parts
        .iter()
        .skip(1)
        .fold(parts.first().copied().unwrap_or("").to_string(), |acc, part| {
            paths::combine(&acc, part)
        });
    Ok(Value::Str(paths::full_path(
        &paths::fix_separators(&combined),
        &inv.env.current_directory()?,
    )))
}

pub(super) fn normalize_directory(inv: &Invocation<'_>) -> CallResult {
    let normalized = normalize_path(inv)?;
    Ok(Value::Str(paths::ensure_trailing_slash(&normalized.to_raw_string())))
}

pub(super) fn ensure_trailing_slash(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Str(paths::ensure_trailing_slash(inv.str(0)?)))
}

pub(super) fn make_relative(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Str(paths::make_relative(
        inv.str(0)?,
        inv.str(1)?,
        &inv.env.current_directory()?,
    )))
}

fn trim_trailing_separator(path: &str) -> &str {
    if paths::ends_with_separator(path) && path.len() > paths::root_len(path) {
        &path[..path.len() - 1]
    } else {
        path
    }
}

/// Directory at or above `start` containing `file`, or `""`.
fn directory_of_file_above(inv: &Invocation<'_>, start: &str, file: &str) -> Result<String, CallError> {
    let cwd = inv.env.current_directory()?;
    let mut dir = trim_trailing_separator(&paths::full_path(start, &cwd)).to_string();
    loop {
        let candidate = paths::combine(&dir, file);
        if inv.env.file_system.file_exists(Path::new(&candidate)) {
            return Ok(dir);
        }
        match paths::directory_name(&dir) {
            Some(parent) if !parent.is_empty() && parent != dir => dir = parent,
            _ => return Ok(String::new()),
        }
    }
}

pub(super) fn get_directory_name_of_file_above(inv: &Invocation<'_>) -> CallResult {
    directory_of_file_above(inv, inv.str(0)?, inv.required_str(1)?).map(Value::Str)
}

pub(super) fn get_path_of_file_above(inv: &Invocation<'_>) -> CallResult {
    let file = inv.required_str(0)?;
    if paths::file_name(file) != file {
        return Err(CallError::failed(format!(
            "\"{file}\" must be a file name without directory information"
        )));
    }
    let start = match inv.args.len() {
        1 => inv.env.starting_directory()?,
        _ => inv.str(1)?.to_string(),
    };
    let dir = directory_of_file_above(inv, &start, file)?;
    if dir.is_empty() {
        return Ok(Value::string(""));
    }
    Ok(Value::Str(paths::normalize(&paths::combine(&dir, file))))
}

// ============================================================================
// Versions
// ============================================================================

/// Lenient version parse: optional leading `v`, one to four numeric parts,
/// missing parts are zero, and anything after `-` or `+` is ignored.
pub fn parse_simple_version(text: &str) -> Result<[u32; 4], CallError> {
    let invalid = || CallError::failed(format!("\"{text}\" is not a valid version"));
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix(['v', 'V'])
        .unwrap_or(trimmed);
    let core = trimmed
        .split(['-', '+'])
        .next()
        .unwrap_or(trimmed);
    let parts: Vec<&str> = core.split('.').collect();
    if core.is_empty() || parts.len() > 4 {
        return Err(invalid());
    }

    let mut version = [0u32; 4];
    for (slot, part) in version.iter_mut().zip(parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        *slot = part.parse().map_err(|_| invalid())?;
    }
    Ok(version)
}

fn compare_versions(inv: &Invocation<'_>) -> Result<std::cmp::Ordering, CallError> {
    let a = parse_simple_version(inv.str(0)?)?;
    let b = parse_simple_version(inv.str(1)?)?;
    Ok(a.cmp(&b))
}

fn version_equals(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(compare_versions(inv)?.is_eq()))
}

fn version_not_equals(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(compare_versions(inv)?.is_ne()))
}

fn version_greater_than(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(compare_versions(inv)?.is_gt()))
}

fn version_greater_than_or_equals(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(compare_versions(inv)?.is_ge()))
}

fn version_less_than(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(compare_versions(inv)?.is_lt()))
}

fn version_less_than_or_equals(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(compare_versions(inv)?.is_le()))
}

// ============================================================================
// Platform
// ============================================================================

/// Whether `platform` (`Windows`, `Linux`, `OSX`, `FreeBSD`, ...) names the
/// current operating system.
pub fn is_current_platform(platform: &str) -> bool {
    let current = std::env::consts::OS;
    match platform.trim().to_ascii_lowercase().as_str() {
        "osx" | "macos" => current == "macos",
        other => other == current,
    }
}

fn is_os_platform(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(is_current_platform(inv.str(0)?)))
}

fn is_os_unix_like(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(cfg!(unix)))
}

fn is_os_bsd_like(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(matches!(
        std::env::consts::OS,
        "freebsd" | "netbsd" | "openbsd" | "dragonfly"
    )))
}

fn does_task_host_exist(_inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(false))
}
