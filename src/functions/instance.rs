//! Members callable on a property value or a previous call's result.
//!
//! String positions are counted in characters.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::base::Value;

use super::catalog::ParamType as P;
use super::catalog::{
    CallError, CallResult, Invocation, Member, Overload, STRING_COMPARISON, STRING_SPLIT_OPTIONS,
    comparison_ignores_case,
};
use super::statics::{compare_with, equals_with};

const NONE: &[P] = &[];
const S1: &[P] = &[P::Str];
const GET_TYPE: Member = Member {
    name: "GetType",
    overloads: &[Overload::new(NONE, get_type)],
};

/// Members available on `receiver`.
pub fn members_for(receiver: &Value) -> &'static [Member] {
    match receiver {
        Value::Str(_) => STRING_MEMBERS,
        Value::Seq(_) => SEQ_MEMBERS,
        Value::Map(_) => MAP_MEMBERS,
        Value::Version(_) => VERSION_MEMBERS,
        Value::Int(_) => INT_MEMBERS,
        Value::Float(_) => FLOAT_MEMBERS,
        Value::Bool(_) => BOOL_MEMBERS,
        Value::Char(_) => CHAR_MEMBERS,
        Value::DateTime(_) => DATE_TIME_MEMBERS,
        Value::Null => &[],
    }
}

/// Indexer member name for a receiver of this shape.
pub fn indexer_name(receiver: &Value) -> &'static str {
    match receiver {
        Value::Str(_) => "Chars",
        _ => "get_Item",
    }
}

fn get_type(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::string(inv.this()?.type_name()))
}

fn out_of_range() -> CallError {
    CallError::failed("Index and length must refer to a location within the string.")
}

fn index_arg(inv: &Invocation<'_>, index: usize) -> Result<usize, CallError> {
    usize::try_from(inv.int(index)?).map_err(|_| out_of_range())
}

// ============================================================================
// Strings
// ============================================================================

static STRING_MEMBERS: &[Member] = &[
    Member {
        name: "Length",
        overloads: &[Overload::new(NONE, length)],
    },
    Member {
        name: "Chars",
        overloads: &[Overload::new(&[P::Int], char_at)],
    },
    Member {
        name: "Substring",
        overloads: &[
            Overload::new(&[P::Int], substring),
            Overload::new(&[P::Int, P::Int], substring),
        ],
    },
    Member {
        name: "ToUpper",
        overloads: &[Overload::new(NONE, to_upper)],
    },
    Member {
        name: "ToLower",
        overloads: &[Overload::new(NONE, to_lower)],
    },
    Member {
        name: "ToUpperInvariant",
        overloads: &[Overload::new(NONE, to_upper)],
    },
    Member {
        name: "ToLowerInvariant",
        overloads: &[Overload::new(NONE, to_lower)],
    },
    Member {
        name: "Trim",
        overloads: &[
            Overload::new(NONE, trim),
            Overload::new(&[P::CharArray], trim),
        ],
    },
    Member {
        name: "TrimStart",
        overloads: &[
            Overload::new(NONE, trim_start),
            Overload::new(&[P::CharArray], trim_start),
        ],
    },
    Member {
        name: "TrimEnd",
        overloads: &[
            Overload::new(NONE, trim_end),
            Overload::new(&[P::CharArray], trim_end),
        ],
    },
    Member {
        name: "Replace",
        overloads: &[Overload::new(&[P::Str, P::Str], replace)],
    },
    Member {
        name: "Contains",
        overloads: &[Overload::new(S1, contains)],
    },
    Member {
        name: "StartsWith",
        overloads: &[
            Overload::new(S1, starts_with),
            Overload::new(&[P::Str, P::Enum(&STRING_COMPARISON)], starts_with),
        ],
    },
    Member {
        name: "EndsWith",
        overloads: &[
            Overload::new(S1, ends_with),
            Overload::new(&[P::Str, P::Enum(&STRING_COMPARISON)], ends_with),
        ],
    },
    Member {
        name: "Equals",
        overloads: &[
            Overload::new(S1, string_equals),
            Overload::new(&[P::Str, P::Enum(&STRING_COMPARISON)], string_equals),
        ],
    },
    Member {
        name: "IndexOf",
        overloads: &[
            Overload::new(S1, index_of),
            Overload::new(&[P::Str, P::Int], index_of_from),
            Overload::new(&[P::Str, P::Enum(&STRING_COMPARISON)], index_of),
        ],
    },
    Member {
        name: "LastIndexOf",
        overloads: &[
            Overload::new(S1, last_index_of),
            Overload::new(&[P::Str, P::Enum(&STRING_COMPARISON)], last_index_of),
        ],
    },
    Member {
        name: "IndexOfAny",
        overloads: &[Overload::new(&[P::CharArray], index_of_any)],
    },
    Member {
        name: "Split",
        overloads: &[
            Overload::new(&[P::CharArray], split),
            Overload::new(&[P::CharArray, P::Enum(&STRING_SPLIT_OPTIONS)], split),
            Overload::new(&[P::Str, P::Enum(&STRING_SPLIT_OPTIONS)], split_by_string),
        ],
    },
    Member {
        name: "PadLeft",
        overloads: &[
            Overload::new(&[P::Int], pad_left),
            Overload::new(&[P::Int, P::Char], pad_left),
        ],
    },
    Member {
        name: "PadRight",
        overloads: &[
            Overload::new(&[P::Int], pad_right),
            Overload::new(&[P::Int, P::Char], pad_right),
        ],
    },
    Member {
        name: "Insert",
        overloads: &[Overload::new(&[P::Int, P::Str], insert)],
    },
    Member {
        name: "Remove",
        overloads: &[
            Overload::new(&[P::Int], remove),
            Overload::new(&[P::Int, P::Int], remove),
        ],
    },
    Member {
        name: "CompareTo",
        overloads: &[Overload::new(S1, compare_to)],
    },
    Member {
        name: "ToString",
        overloads: &[Overload::new(NONE, to_string)],
    },
    Member {
        name: "ToCharArray",
        overloads: &[Overload::new(NONE, to_char_array)],
    },
    GET_TYPE,
];

fn length(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(inv.this_str()?.chars().count() as i64))
}

fn char_at(inv: &Invocation<'_>) -> CallResult {
    let index = index_arg(inv, 0)?;
    inv.this_str()?
        .chars()
        .nth(index)
        .map(Value::Char)
        .ok_or_else(|| CallError::failed("Index was outside the bounds of the array."))
}

/// `s.Substring(start[, length])` by characters.
pub fn substring_of(s: &str, start: usize, length: Option<usize>) -> Result<String, CallError> {
    let total = s.chars().count();
    let end = match length {
        Some(length) => start.checked_add(length).ok_or_else(out_of_range)?,
        None => total,
    };
    if start > total || end > total {
        return Err(out_of_range());
    }
    Ok(s.chars().skip(start).take(end - start).collect())
}

pub(super) fn substring(inv: &Invocation<'_>) -> CallResult {
    let start = index_arg(inv, 0)?;
    let length = match inv.args.len() {
        2 => Some(index_arg(inv, 1)?),
        _ => None,
    };
    substring_of(inv.this_str()?, start, length).map(Value::Str)
}

pub(super) fn to_upper(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Str(inv.this_str()?.to_uppercase()))
}

pub(super) fn to_lower(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Str(inv.this_str()?.to_lowercase()))
}

/// Trim set from an optional char-array argument; empty means whitespace.
fn trim_set(inv: &Invocation<'_>) -> Result<Vec<char>, CallError> {
    if inv.args.is_empty() {
        Ok(Vec::new())
    } else {
        inv.chars(0)
    }
}

fn matcher(set: &[char]) -> impl Fn(char) -> bool + '_ {
    move |c| {
        if set.is_empty() {
            c.is_whitespace()
        } else {
            set.contains(&c)
        }
    }
}

pub(super) fn trim(inv: &Invocation<'_>) -> CallResult {
    let set = trim_set(inv)?;
    Ok(Value::string(inv.this_str()?.trim_matches(matcher(&set))))
}

fn trim_start(inv: &Invocation<'_>) -> CallResult {
    let set = trim_set(inv)?;
    Ok(Value::string(inv.this_str()?.trim_start_matches(matcher(&set))))
}

fn trim_end(inv: &Invocation<'_>) -> CallResult {
    let set = trim_set(inv)?;
    Ok(Value::string(inv.this_str()?.trim_end_matches(matcher(&set))))
}

pub(super) fn replace(inv: &Invocation<'_>) -> CallResult {
    let from = inv.required_str(0)?;
    if from.is_empty() {
        return Err(CallError::failed("String cannot be of zero length."));
    }
    Ok(Value::Str(inv.this_str()?.replace(from, inv.str(1)?)))
}

pub(super) fn contains(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(inv.this_str()?.contains(inv.required_str(0)?)))
}

fn comparison(inv: &Invocation<'_>, index: usize) -> Result<bool, CallError> {
    if inv.args.len() > index {
        Ok(comparison_ignores_case(inv.int(index)?))
    } else {
        Ok(false)
    }
}

/// Fold both sides to lower case when comparing case-insensitively.
fn folded<'s>(s: &'s str, ignore_case: bool) -> std::borrow::Cow<'s, str> {
    if ignore_case {
        std::borrow::Cow::Owned(s.to_lowercase())
    } else {
        std::borrow::Cow::Borrowed(s)
    }
}

pub(super) fn starts_with(inv: &Invocation<'_>) -> CallResult {
    let ignore_case = comparison(inv, 1)?;
    let this = folded(inv.this_str()?, ignore_case);
    let prefix = folded(inv.required_str(0)?, ignore_case);
    Ok(Value::Bool(this.starts_with(prefix.as_ref())))
}

pub(super) fn ends_with(inv: &Invocation<'_>) -> CallResult {
    let ignore_case = comparison(inv, 1)?;
    let this = folded(inv.this_str()?, ignore_case);
    let suffix = folded(inv.required_str(0)?, ignore_case);
    Ok(Value::Bool(this.ends_with(suffix.as_ref())))
}

pub(super) fn string_equals(inv: &Invocation<'_>) -> CallResult {
    let comparison = if inv.args.len() > 1 { inv.int(1)? } else { 4 };
    Ok(Value::Bool(match inv.opt_str(0)? {
        Some(other) => equals_with(inv.this_str()?, other, comparison),
        None => false,
    }))
}

/// Character index of `needle` in `haystack` at or after `from`, or -1.
pub fn char_index_of(haystack: &str, needle: &str, from: usize) -> i64 {
    let offset = match haystack.char_indices().nth(from) {
        Some((offset, _)) => offset,
        None if from == haystack.chars().count() => haystack.len(),
        None => return -1,
    };
    match haystack[offset..].find(needle) {
        Some(pos) => (from + haystack[offset..offset + pos].chars().count()) as i64,
        None => -1,
    }
}

pub(super) fn index_of(inv: &Invocation<'_>) -> CallResult {
    let ignore_case = comparison(inv, 1)?;
    let this = folded(inv.this_str()?, ignore_case);
    let needle = folded(inv.required_str(0)?, ignore_case);
    Ok(Value::Int(char_index_of(&this, &needle, 0)))
}

fn index_of_from(inv: &Invocation<'_>) -> CallResult {
    let this = inv.this_str()?;
    let from = index_arg(inv, 1)?;
    if from > this.chars().count() {
        return Err(CallError::failed("Index was out of range."));
    }
    Ok(Value::Int(char_index_of(this, inv.required_str(0)?, from)))
}

fn last_index_of(inv: &Invocation<'_>) -> CallResult {
    let ignore_case = comparison(inv, 1)?;
    let this = folded(inv.this_str()?, ignore_case);
    let needle = folded(inv.required_str(0)?, ignore_case);
    Ok(Value::Int(match this.rfind(needle.as_ref()) {
        Some(pos) => this[..pos].chars().count() as i64,
        None => -1,
    }))
}

fn index_of_any(inv: &Invocation<'_>) -> CallResult {
    let set = inv.chars(0)?;
    Ok(Value::Int(
        inv.this_str()?
            .chars()
            .position(|c| set.contains(&c))
            .map_or(-1, |p| p as i64),
    ))
}

const REMOVE_EMPTY_ENTRIES: i64 = 1;
const TRIM_ENTRIES: i64 = 2;

fn split_options(inv: &Invocation<'_>) -> Result<i64, CallError> {
    if inv.args.len() > 1 {
        inv.int(1)
    } else {
        Ok(0)
    }
}

fn finish_split<'s>(pieces: impl Iterator<Item = &'s str>, options: i64) -> Value {
    Value::Seq(
        pieces
            .map(|p| if options & TRIM_ENTRIES != 0 { p.trim() } else { p })
            .filter(|p| options & REMOVE_EMPTY_ENTRIES == 0 || !p.is_empty())
            .map(Value::string)
            .collect(),
    )
}

fn split(inv: &Invocation<'_>) -> CallResult {
    let separators = inv.chars(0)?;
    let options = split_options(inv)?;
    let this = inv.this_str()?;
    Ok(finish_split(this.split(matcher(&separators)), options))
}

fn split_by_string(inv: &Invocation<'_>) -> CallResult {
    let separator = inv.str(0)?;
    let options = split_options(inv)?;
    let this = inv.this_str()?;
    if separator.is_empty() {
        return Ok(finish_split(std::iter::once(this), options));
    }
    Ok(finish_split(this.split(separator), options))
}

fn pad(inv: &Invocation<'_>, left: bool) -> CallResult {
    let width = usize::try_from(inv.int(0)?)
        .map_err(|_| CallError::failed("Non-negative number required."))?;
    let fill = if inv.args.len() > 1 { inv.char(1)? } else { ' ' };
    let this = inv.this_str()?;
    let missing = width.saturating_sub(this.chars().count());
    let padding: String = std::iter::repeat_n(fill, missing).collect();
    Ok(Value::Str(if left {
        padding + this
    } else {
        format!("{this}{padding}")
    }))
}

fn pad_left(inv: &Invocation<'_>) -> CallResult {
    pad(inv, true)
}

fn pad_right(inv: &Invocation<'_>) -> CallResult {
    pad(inv, false)
}

fn insert(inv: &Invocation<'_>) -> CallResult {
    let this = inv.this_str()?;
    let at = index_arg(inv, 0)?;
    let head = substring_of(this, 0, Some(at))?;
    let tail = substring_of(this, at, None)?;
    Ok(Value::Str(format!("{head}{}{tail}", inv.required_str(1)?)))
}

fn remove(inv: &Invocation<'_>) -> CallResult {
    let this = inv.this_str()?;
    let start = index_arg(inv, 0)?;
    let head = substring_of(this, 0, Some(start))?;
    let tail = match inv.args.len() {
        2 => {
            let count = index_arg(inv, 1)?;
            let skip = start.checked_add(count).ok_or_else(out_of_range)?;
            substring_of(this, skip, None)?
        }
        _ => String::new(),
    };
    Ok(Value::Str(head + &tail))
}

fn compare_to(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(match inv.opt_str(0)? {
        Some(other) => compare_with(inv.this_str()?, other, false),
        None => 1,
    }))
}

fn to_string(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Str(inv.this()?.to_raw_string()))
}

fn to_char_array(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Seq(inv.this_str()?.chars().map(Value::Char).collect()))
}

// ============================================================================
// Sequences and maps
// ============================================================================

static SEQ_MEMBERS: &[Member] = &[
    Member {
        name: "Length",
        overloads: &[Overload::new(NONE, count)],
    },
    Member {
        name: "Count",
        overloads: &[Overload::new(NONE, count)],
    },
    Member {
        name: "get_Item",
        overloads: &[Overload::new(&[P::Int], seq_item)],
    },
    Member {
        name: "GetValue",
        overloads: &[Overload::new(&[P::Int], seq_item)],
    },
    GET_TYPE,
];

static MAP_MEMBERS: &[Member] = &[
    Member {
        name: "Count",
        overloads: &[Overload::new(NONE, count)],
    },
    Member {
        name: "get_Item",
        overloads: &[Overload::new(&[P::Any], map_item)],
    },
    Member {
        name: "ContainsKey",
        overloads: &[Overload::new(&[P::Any], contains_key)],
    },
    GET_TYPE,
];

fn count(inv: &Invocation<'_>) -> CallResult {
    let len = match inv.this()? {
        Value::Seq(items) => items.len(),
        Value::Map(entries) => entries.len(),
        other => other.to_raw_string().chars().count(),
    };
    Ok(Value::Int(len as i64))
}

fn seq_item(inv: &Invocation<'_>) -> CallResult {
    let Value::Seq(items) = inv.this()? else {
        return Err(CallError::failed("receiver is not a sequence"));
    };
    usize::try_from(inv.int(0)?)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .ok_or_else(|| CallError::failed("Index was outside the bounds of the array."))
}

fn find_entry<'v>(entries: &'v [(Value, Value)], key: &Value) -> Option<&'v Value> {
    let key = key.to_raw_string();
    entries
        .iter()
        .find(|(k, _)| k.to_raw_string() == key)
        .map(|(_, v)| v)
}

fn map_item(inv: &Invocation<'_>) -> CallResult {
    let Value::Map(entries) = inv.this()? else {
        return Err(CallError::failed("receiver is not a dictionary"));
    };
    Ok(find_entry(entries, inv.arg(0)).cloned().unwrap_or_default())
}

fn contains_key(inv: &Invocation<'_>) -> CallResult {
    let Value::Map(entries) = inv.this()? else {
        return Err(CallError::failed("receiver is not a dictionary"));
    };
    Ok(Value::Bool(find_entry(entries, inv.arg(0)).is_some()))
}

// ============================================================================
// Versions
// ============================================================================

static VERSION_MEMBERS: &[Member] = &[
    Member {
        name: "Major",
        overloads: &[Overload::new(NONE, version_major)],
    },
    Member {
        name: "Minor",
        overloads: &[Overload::new(NONE, version_minor)],
    },
    Member {
        name: "Build",
        overloads: &[Overload::new(NONE, version_build)],
    },
    Member {
        name: "Revision",
        overloads: &[Overload::new(NONE, version_revision)],
    },
    Member {
        name: "ToString",
        overloads: &[
            Overload::new(NONE, to_string),
            Overload::new(&[P::Int], version_to_string_fields),
        ],
    },
    Member {
        name: "CompareTo",
        overloads: &[Overload::new(&[P::Version], version_compare_to)],
    },
    Member {
        name: "Equals",
        overloads: &[Overload::new(&[P::Version], version_equals)],
    },
    GET_TYPE,
];

fn this_version(inv: &Invocation<'_>) -> Result<crate::base::Version, CallError> {
    match inv.this()? {
        Value::Version(v) => Ok(*v),
        _ => Err(CallError::failed("receiver is not a version")),
    }
}

fn version_major(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(i64::from(this_version(inv)?.major)))
}

fn version_minor(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(i64::from(this_version(inv)?.minor)))
}

fn version_build(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(this_version(inv)?.build.map_or(-1, i64::from)))
}

fn version_revision(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(this_version(inv)?.revision.map_or(-1, i64::from)))
}

fn version_to_string_fields(inv: &Invocation<'_>) -> CallResult {
    let fields = usize::try_from(inv.int(0)?).unwrap_or(usize::MAX);
    this_version(inv)?
        .to_string_fields(fields)
        .map(Value::Str)
        .ok_or_else(|| CallError::failed("fieldCount exceeds the number of defined components"))
}

fn version_compare_to(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Int(this_version(inv)?.cmp(&inv.version(0)?) as i64))
}

fn version_equals(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(this_version(inv)? == inv.version(0)?))
}

// ============================================================================
// Scalars
// ============================================================================

static INT_MEMBERS: &[Member] = &[
    Member {
        name: "ToString",
        overloads: &[
            Overload::new(NONE, to_string),
            Overload::new(S1, scalar_to_string_formatted),
        ],
    },
    Member {
        name: "CompareTo",
        overloads: &[Overload::new(&[P::Long], scalar_compare_to)],
    },
    Member {
        name: "Equals",
        overloads: &[Overload::new(&[P::Long], scalar_equals)],
    },
    GET_TYPE,
];

static FLOAT_MEMBERS: &[Member] = &[
    Member {
        name: "ToString",
        overloads: &[
            Overload::new(NONE, to_string),
            Overload::new(S1, scalar_to_string_formatted),
        ],
    },
    Member {
        name: "CompareTo",
        overloads: &[Overload::new(&[P::Float], scalar_compare_to)],
    },
    Member {
        name: "Equals",
        overloads: &[Overload::new(&[P::Float], scalar_equals)],
    },
    GET_TYPE,
];

static BOOL_MEMBERS: &[Member] = &[
    Member {
        name: "ToString",
        overloads: &[Overload::new(NONE, to_string)],
    },
    Member {
        name: "CompareTo",
        overloads: &[Overload::new(&[P::Bool], scalar_compare_to)],
    },
    Member {
        name: "Equals",
        overloads: &[Overload::new(&[P::Bool], scalar_equals)],
    },
    GET_TYPE,
];

static CHAR_MEMBERS: &[Member] = &[
    Member {
        name: "ToString",
        overloads: &[Overload::new(NONE, to_string)],
    },
    Member {
        name: "CompareTo",
        overloads: &[Overload::new(&[P::Char], scalar_compare_to)],
    },
    Member {
        name: "Equals",
        overloads: &[Overload::new(&[P::Char], scalar_equals)],
    },
    GET_TYPE,
];

fn scalar_to_string_formatted(inv: &Invocation<'_>) -> CallResult {
    let this = inv.this()?;
    let spec = inv.str(0)?;
    Ok(Value::Str(
        format_number(this, spec).unwrap_or_else(|| this.to_raw_string()),
    ))
}

fn scalar_compare_to(inv: &Invocation<'_>) -> CallResult {
    let ordering = match (inv.this()?, inv.arg(0)) {
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Char(a), Value::Char(b)) => a.cmp(b),
        (this, other) => {
            return Err(CallError::failed(format!(
                "cannot compare {} with {}",
                this.type_name(),
                other.type_name()
            )));
        }
    };
    Ok(Value::Int(ordering as i64))
}

fn scalar_equals(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Bool(inv.this()? == inv.arg(0)))
}

/// Standard numeric format strings: `D`, `X`, `F`, `N` with an optional
/// precision, and all-zero custom patterns such as `000`.
pub fn format_number(value: &Value, spec: &str) -> Option<String> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Some(value.to_raw_string());
    }
    if spec.bytes().all(|b| b == b'0') {
        return match value {
            Value::Int(i) => Some(pad_integer(*i, spec.len())),
            Value::Float(f) => Some(pad_integer(f.round_ties_even() as i64, spec.len())),
            _ => None,
        };
    }

    let (kind, precision) = spec.split_at(1);
    let precision: Option<usize> = if precision.is_empty() {
        None
    } else {
        Some(precision.parse().ok()?)
    };
    match (kind, value) {
        ("D" | "d", Value::Int(i)) => Some(pad_integer(*i, precision.unwrap_or(1))),
        ("X", Value::Int(i)) => Some(format!("{:0width$X}", i, width = precision.unwrap_or(1))),
        ("x", Value::Int(i)) => Some(format!("{:0width$x}", i, width = precision.unwrap_or(1))),
        ("F" | "f", Value::Int(i)) => Some(format!("{:.*}", precision.unwrap_or(2), *i as f64)),
        ("F" | "f", Value::Float(x)) => Some(format!("{:.*}", precision.unwrap_or(2), x)),
        ("N" | "n", Value::Int(i)) => Some(group_thousands(&format!(
            "{:.*}",
            precision.unwrap_or(2),
            *i as f64
        ))),
        ("N" | "n", Value::Float(x)) => {
            Some(group_thousands(&format!("{:.*}", precision.unwrap_or(2), x)))
        }
        _ => None,
    }
}

fn pad_integer(value: i64, width: usize) -> String {
    let digits = format!("{:0width$}", value.unsigned_abs(), width = width);
    if value < 0 { format!("-{digits}") } else { digits }
}

fn group_thousands(fixed: &str) -> String {
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    match fraction {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

// ============================================================================
// Date-times
// ============================================================================

static DATE_TIME_MEMBERS: &[Member] = &[
    Member {
        name: "ToString",
        overloads: &[
            Overload::new(NONE, to_string),
            Overload::new(S1, date_time_to_string),
        ],
    },
    Member {
        name: "Year",
        overloads: &[Overload::new(NONE, date_year)],
    },
    Member {
        name: "Month",
        overloads: &[Overload::new(NONE, date_month)],
    },
    Member {
        name: "Day",
        overloads: &[Overload::new(NONE, date_day)],
    },
    Member {
        name: "Hour",
        overloads: &[Overload::new(NONE, date_hour)],
    },
    Member {
        name: "Minute",
        overloads: &[Overload::new(NONE, date_minute)],
    },
    Member {
        name: "Second",
        overloads: &[Overload::new(NONE, date_second)],
    },
    Member {
        name: "DayOfYear",
        overloads: &[Overload::new(NONE, date_day_of_year)],
    },
    Member {
        name: "AddDays",
        overloads: &[Overload::new(&[P::Float], add_days)],
    },
    GET_TYPE,
];

fn this_date_time(inv: &Invocation<'_>) -> Result<NaiveDateTime, CallError> {
    match inv.this()? {
        Value::DateTime(dt) => Ok(*dt),
        _ => Err(CallError::failed("receiver is not a date-time")),
    }
}

fn date_year(inv: &Invocation<'_>) -> CallResult {
    let d = this_date_time(inv)?;
    Ok(Value::Int(i64::from(d.year())))
}

fn date_month(inv: &Invocation<'_>) -> CallResult {
    let d = this_date_time(inv)?;
    Ok(Value::Int(i64::from(d.month())))
}

fn date_day(inv: &Invocation<'_>) -> CallResult {
    let d = this_date_time(inv)?;
    Ok(Value::Int(i64::from(d.day())))
}

fn date_hour(inv: &Invocation<'_>) -> CallResult {
    let d = this_date_time(inv)?;
    Ok(Value::Int(i64::from(d.hour())))
}

fn date_minute(inv: &Invocation<'_>) -> CallResult {
    let d = this_date_time(inv)?;
    Ok(Value::Int(i64::from(d.minute())))
}

fn date_second(inv: &Invocation<'_>) -> CallResult {
    let d = this_date_time(inv)?;
    Ok(Value::Int(i64::from(d.second())))
}

fn date_day_of_year(inv: &Invocation<'_>) -> CallResult {
    let d = this_date_time(inv)?;
    Ok(Value::Int(i64::from(d.ordinal())))
}

fn date_time_to_string(inv: &Invocation<'_>) -> CallResult {
    Ok(Value::Str(format_date_time(
        &this_date_time(inv)?,
        inv.str(0)?,
    )))
}

fn add_days(inv: &Invocation<'_>) -> CallResult {
    let millis = (inv.float(0)? * 86_400_000.0).round();
    let delta = chrono::TimeDelta::try_milliseconds(millis as i64)
        .ok_or_else(|| CallError::failed("The added or subtracted value results in an un-representable DateTime."))?;
    this_date_time(inv)?
        .checked_add_signed(delta)
        .map(Value::DateTime)
        .ok_or_else(|| CallError::failed("The added or subtracted value results in an un-representable DateTime."))
}

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const DAYS: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];

fn standard_pattern(spec: &str) -> Option<&'static str> {
    Some(match spec {
        "d" => "MM/dd/yyyy",
        "D" => "dddd, dd MMMM yyyy",
        "f" => "dddd, dd MMMM yyyy HH:mm",
        "F" => "dddd, dd MMMM yyyy HH:mm:ss",
        "g" => "MM/dd/yyyy HH:mm",
        "G" => "MM/dd/yyyy HH:mm:ss",
        "M" | "m" => "MMMM dd",
        "o" | "O" => "yyyy'-'MM'-'dd'T'HH':'mm':'ss'.'fffffff",
        "R" | "r" => "ddd, dd MMM yyyy HH':'mm':'ss 'GMT'",
        "s" => "yyyy'-'MM'-'dd'T'HH':'mm':'ss",
        "t" => "HH:mm",
        "T" => "HH:mm:ss",
        "u" => "yyyy'-'MM'-'dd HH':'mm':'ss'Z'",
        "y" | "Y" => "yyyy MMMM",
        _ => return None,
    })
}

/// Render with the invariant-culture subset of .NET date-time format
/// strings: single-letter standard formats and the custom specifiers
/// `y M d H h m s f F t`, quoted literals and `\` escapes.
pub fn format_date_time(dt: &NaiveDateTime, spec: &str) -> String {
    let pattern = match spec {
        "" => "MM/dd/yyyy HH:mm:ss",
        _ => standard_pattern(spec).unwrap_or(spec),
    };
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        match c {
            'y' => {
                let year = dt.year();
                match run {
                    1 => out.push_str(&(year % 100).to_string()),
                    2 => out.push_str(&format!("{:02}", year % 100)),
                    n => out.push_str(&format!("{year:0n$}")),
                }
            }
            'M' => match run {
                1 => out.push_str(&dt.month().to_string()),
                2 => out.push_str(&format!("{:02}", dt.month())),
                3 => out.push_str(&MONTHS[dt.month0() as usize][..3]),
                _ => out.push_str(MONTHS[dt.month0() as usize]),
            },
            'd' => {
                let day = DAYS[dt.weekday().num_days_from_sunday() as usize];
                match run {
                    1 => out.push_str(&dt.day().to_string()),
                    2 => out.push_str(&format!("{:02}", dt.day())),
                    3 => out.push_str(&day[..3]),
                    _ => out.push_str(day),
                }
            }
            'H' | 'h' | 'm' | 's' => {
                let value = match c {
                    'H' => dt.hour(),
                    'h' => match dt.hour() % 12 {
                        0 => 12,
                        h => h,
                    },
                    'm' => dt.minute(),
                    _ => dt.second(),
                };
                if run == 1 {
                    out.push_str(&value.to_string());
                } else {
                    out.push_str(&format!("{value:02}"));
                }
                run = run.min(2);
            }
            'f' | 'F' => {
                run = run.min(7);
                let fraction = dt.nanosecond() % 1_000_000_000 / 10u32.pow(9 - run as u32);
                let digits = format!("{fraction:0run$}");
                if c == 'F' {
                    out.push_str(digits.trim_end_matches('0'));
                } else {
                    out.push_str(&digits);
                }
            }
            't' => {
                let am = dt.hour() < 12;
                out.push_str(match (run, am) {
                    (1, true) => "A",
                    (1, false) => "P",
                    (_, true) => "AM",
                    (_, false) => "PM",
                });
            }
            '\'' | '"' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&q| q == c)
                    .map_or(chars.len(), |p| i + 1 + p);
                out.extend(&chars[i + 1..close]);
                i = close + 1;
                continue;
            }
            '\\' => {
                if let Some(&next) = chars.get(i + 1) {
                    out.push(next);
                }
                i += 2;
                continue;
            }
            '%' => {
                i += 1;
                continue;
            }
            _ => {
                out.push(c);
                run = 1;
            }
        }
        i += run;
    }
    out
}

/// `String.Format`-style composite formatting: `{index[,alignment][:format]}`
/// with `{{` and `}}` as literal braces.
pub fn format_composite(format: &str, args: &[Value]) -> Result<String, CallError> {
    let invalid = || CallError::failed("Input string was not in a correct format.");
    let mut out = String::with_capacity(format.len() + 16);
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(invalid()),
            '{' => {
                let mut item = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => item.push(c),
                        None => return Err(invalid()),
                    }
                }
                let (head, spec) = match item.split_once(':') {
                    Some((head, spec)) => (head, Some(spec)),
                    None => (item.as_str(), None),
                };
                let (index, alignment) = match head.split_once(',') {
                    Some((index, alignment)) => (
                        index,
                        Some(alignment.trim().parse::<i64>().map_err(|_| invalid())?),
                    ),
                    None => (head, None),
                };
                let index: usize = index.trim().parse().map_err(|_| invalid())?;
                let value = args.get(index).ok_or_else(|| {
                    CallError::failed(
                        "Index (zero based) must be greater than or equal to zero and less than the size of the argument list.",
                    )
                })?;

                let text = match (spec, value) {
                    (Some(spec), Value::DateTime(dt)) => format_date_time(dt, spec),
                    (Some(spec), other) => {
                        format_number(other, spec).unwrap_or_else(|| other.to_raw_string())
                    }
                    (None, other) => other.to_raw_string(),
                };
                match alignment {
                    Some(width) if width < 0 => {
                        out.push_str(&format!("{text:<w$}", w = width.unsigned_abs() as usize))
                    }
                    Some(width) => out.push_str(&format!("{text:>w$}", w = width as usize)),
                    None => out.push_str(&text),
                }
            }
            other => out.push(other),
        }
    }
    Ok(out)
}
