//! Conversion of evaluated arguments into overload parameter types.
//!
//! Conversions are culture-invariant. A null argument binds to reference
//! parameters as null and to value parameters as their default.

use crate::base::{Value, Version};

use super::catalog::{EnumType, ParamType};

/// An evaluated argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Value(Value),
    /// The `out _` placeholder.
    Out,
}

impl ArgValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Out => None,
        }
    }
}

/// Whether the argument already has exactly the parameter's type.
pub fn fits_exactly(arg: &ArgValue, param: ParamType) -> bool {
    let value = match (arg, param) {
        (ArgValue::Out, ParamType::Out) => return true,
        (ArgValue::Out, _) | (_, ParamType::Out) => return false,
        (ArgValue::Value(value), _) => value,
    };
    match param {
        ParamType::Any => true,
        ParamType::Str => matches!(value, Value::Str(_) | Value::Null),
        ParamType::Int => matches!(value, Value::Int(i) if i32::try_from(*i).is_ok()),
        ParamType::Long => matches!(value, Value::Int(_)),
        ParamType::Float => matches!(value, Value::Float(_)),
        ParamType::Bool => matches!(value, Value::Bool(_)),
        ParamType::Char => matches!(value, Value::Char(_)),
        ParamType::CharArray => {
            matches!(value, Value::Seq(items) if items.iter().all(|v| matches!(v, Value::Char(_))))
        }
        ParamType::Version => matches!(value, Value::Version(_)),
        ParamType::Enum(_) | ParamType::Out => false,
    }
}

/// Convert the argument, or `None` when it cannot take the parameter's type.
pub fn coerce(arg: &ArgValue, param: ParamType) -> Option<Value> {
    match (arg, param) {
        (ArgValue::Out, ParamType::Out) => Some(Value::Null),
        (ArgValue::Out, _) | (_, ParamType::Out) => None,
        (ArgValue::Value(value), param) => coerce_value(value, param),
    }
}

/// Coerce every argument for one overload's parameter list.
pub fn coerce_all(args: &[ArgValue], params: &[ParamType]) -> Option<Vec<Value>> {
    if args.len() != params.len() {
        return None;
    }
    args.iter()
        .zip(params)
        .map(|(arg, param)| coerce(arg, *param))
        .collect()
}

fn coerce_value(value: &Value, param: ParamType) -> Option<Value> {
    match param {
        ParamType::Any => Some(value.clone()),
        ParamType::Str => Some(match value {
            Value::Null => Value::Null,
            Value::Str(s) => Value::Str(s.clone()),
            other => Value::Str(other.to_raw_string()),
        }),
        ParamType::Int => to_integer(value)
            .filter(|i| i32::try_from(*i).is_ok())
            .map(Value::Int),
        ParamType::Long => to_integer(value).map(Value::Int),
        ParamType::Float => to_float(value).map(Value::Float),
        ParamType::Bool => to_bool(value).map(Value::Bool),
        ParamType::Char => to_char(value).map(Value::Char),
        ParamType::CharArray => match value {
            Value::Null => Some(Value::Null),
            Value::Str(s) => Some(Value::Seq(s.chars().map(Value::Char).collect())),
            Value::Char(c) => Some(Value::Seq(vec![Value::Char(*c)])),
            Value::Seq(items) if items.iter().all(|v| matches!(v, Value::Char(_))) => {
                Some(value.clone())
            }
            _ => None,
        },
        ParamType::Enum(enum_type) => match value {
            Value::Null => Some(Value::Int(0)),
            Value::Int(i) => Some(Value::Int(*i)),
            Value::Str(s) => parse_enum(s, enum_type).map(Value::Int),
            _ => None,
        },
        ParamType::Version => match value {
            Value::Version(v) => Some(Value::Version(*v)),
            Value::Str(s) => s.parse::<Version>().ok().map(Value::Version),
            _ => None,
        },
        ParamType::Out => None,
    }
}

/// Invariant integer parse; surrounding whitespace is allowed.
pub fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// Invariant floating-point parse; surrounding whitespace is allowed.
pub fn parse_float(text: &str) -> Option<f64> {
    let text = text.trim();
    match text {
        "NaN" => Some(f64::NAN),
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ if text.bytes().any(|b| b.is_ascii_alphabetic() && !matches!(b, b'e' | b'E')) => None,
        _ => text.parse().ok(),
    }
}

/// `True`/`False` in any case.
pub fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Null => Some(0),
        Value::Int(i) => Some(*i),
        Value::Float(f) if f.is_finite() => {
            let rounded = f.round_ties_even();
            (rounded >= i64::MIN as f64 && rounded <= i64::MAX as f64).then_some(rounded as i64)
        }
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Char(c) => Some(i64::from(u32::from(*c))),
        Value::Str(s) => parse_integer(s),
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Str(s) => parse_float(s),
        _ => None,
    }
}

fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Null => Some(false),
        Value::Bool(b) => Some(*b),
        Value::Int(i) => Some(*i != 0),
        Value::Float(f) => Some(*f != 0.0),
        Value::Str(s) => parse_bool(s),
        _ => None,
    }
}

fn to_char(value: &Value) -> Option<char> {
    match value {
        Value::Null => Some('\0'),
        Value::Char(c) => Some(*c),
        Value::Int(i) => u32::try_from(*i).ok().and_then(char::from_u32),
        Value::Str(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Parse enum text: a number, a member name, a qualified member name
/// (`StringComparison.Ordinal`), or for flags several joined by `|` or `,`.
pub fn parse_enum(text: &str, enum_type: &EnumType) -> Option<i64> {
    let text = text.trim();
    if let Some(number) = parse_integer(text) {
        return Some(number);
    }

    let short_name = enum_type
        .name
        .rsplit('.')
        .next()
        .unwrap_or(enum_type.name);
    let mut result = 0;
    let mut count = 0;
    for part in text.split(['|', ',']).map(str::trim) {
        let member = strip_qualifier(part, enum_type.name)
            .or_else(|| strip_qualifier(part, short_name))
            .unwrap_or(part);
        result |= enum_type.value_of(member)?;
        count += 1;
    }
    if count > 1 && !enum_type.flags {
        return None;
    }
    (count > 0).then_some(result)
}

fn strip_qualifier<'t>(part: &'t str, qualifier: &str) -> Option<&'t str> {
    let head = part.get(..qualifier.len())?;
    if !head.eq_ignore_ascii_case(qualifier) {
        return None;
    }
    part[qualifier.len()..].strip_prefix('.')
}
