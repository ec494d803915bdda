//! Direct dispatch for the most common calls.
//!
//! Each entry is recognised by name and argument count alone and invoked
//! without overload binding or coercion. Anything unrecognised, or called
//! with non-string arguments, reports [`Resolution::NotFound`] and goes
//! through the binder.

use crate::base::Value;

use super::catalog::{CallEnv, CallError, Invocation, Invoke, TypeEntry};
use super::coerce::{ArgValue, parse_integer};
use super::{Resolution, instance, intrinsics, statics};

fn string_values(args: &[ArgValue]) -> Option<Vec<Value>> {
    args.iter()
        .map(|arg| match arg {
            ArgValue::Value(v @ (Value::Str(_) | Value::Null)) => Some(v.clone()),
            _ => None,
        })
        .collect()
}

fn integer_values(args: &[ArgValue]) -> Option<Vec<Value>> {
    args.iter()
        .map(|arg| match arg {
            ArgValue::Value(Value::Int(i)) => Some(Value::Int(*i)),
            ArgValue::Value(Value::Str(s)) => parse_integer(s)
                .filter(|i| i32::try_from(*i).is_ok())
                .map(Value::Int),
            _ => None,
        })
        .collect()
}

fn run(
    invoke: Invoke,
    receiver: Option<&Value>,
    args: &[Value],
    env: &CallEnv<'_>,
) -> Result<Resolution, CallError> {
    let invocation = Invocation {
        receiver,
        args,
        env,
    };
    invoke(&invocation).map(Resolution::Found)
}

/// Static members of already-resolved (and permitted) types.
pub(super) fn try_static(
    entry: &TypeEntry,
    name: &str,
    args: &[ArgValue],
    env: &CallEnv<'_>,
) -> Result<Resolution, CallError> {
    let Some(values) = string_values(args) else {
        return Ok(Resolution::NotFound);
    };

    let name = name.to_ascii_lowercase();
    let invoke: Invoke = match (entry.name, name.as_str(), values.len()) {
        ("MSBuild", "escape", 1) => intrinsics::escape,
        ("MSBuild", "unescape", 1) => intrinsics::unescape,
        ("MSBuild", "valueordefault", 2) => intrinsics::value_or_default,
        ("MSBuild", "ensuretrailingslash", 1) => intrinsics::ensure_trailing_slash,
        ("MSBuild", "normalizepath", 1..=4) => intrinsics::normalize_path,
        ("MSBuild", "normalizedirectory", 1..=4) => intrinsics::normalize_directory,
        ("MSBuild", "makerelative", 2) => intrinsics::make_relative,
        ("MSBuild", "getdirectorynameoffileabove", 2) => {
            intrinsics::get_directory_name_of_file_above
        }
        ("MSBuild", "getpathoffileabove", 1 | 2) => intrinsics::get_path_of_file_above,
        ("System.IO.Path", "combine", 2..=4) => statics::path_combine,
        ("System.IO.Path", "getfilename", 1) => statics::get_file_name,
        ("System.IO.Path", "getfilenamewithoutextension", 1) => {
            statics::get_file_name_without_extension
        }
        ("System.IO.Path", "getextension", 1) => statics::get_extension,
        ("System.IO.Path", "getdirectoryname", 1) => statics::get_directory_name,
        ("System.IO.Path", "getfullpath", 1) => statics::get_full_path,
        ("System.IO.Path", "ispathrooted", 1) => statics::is_path_rooted,
        ("System.IO.File", "exists", 1) => statics::file_exists,
        ("System.IO.Directory", "exists", 1) => statics::directory_exists,
        ("System.Environment", "getenvironmentvariable", 1) => {
            statics::get_environment_variable
        }
        _ => return Ok(Resolution::NotFound),
    };
    run(invoke, None, &values, env)
}

/// Members of string receivers.
pub(super) fn try_instance(
    receiver: &Value,
    name: &str,
    args: &[ArgValue],
    env: &CallEnv<'_>,
) -> Result<Resolution, CallError> {
    if !matches!(receiver, Value::Str(_)) {
        return Ok(Resolution::NotFound);
    }
    let name = name.to_ascii_lowercase();

    if name == "substring" && matches!(args.len(), 1 | 2) {
        return match integer_values(args) {
            Some(values) => run(instance::substring, Some(receiver), &values, env),
            None => Ok(Resolution::NotFound),
        };
    }

    let Some(values) = string_values(args) else {
        return Ok(Resolution::NotFound);
    };
    let invoke: Invoke = match (name.as_str(), values.len()) {
        ("startswith", 1) => instance::starts_with,
        ("endswith", 1) => instance::ends_with,
        ("contains", 1) => instance::contains,
        ("equals", 1) => instance::string_equals,
        ("indexof", 1) => instance::index_of,
        ("replace", 2) => instance::replace,
        ("tolower", 0) | ("tolowerinvariant", 0) => instance::to_lower,
        ("toupper", 0) | ("toupperinvariant", 0) => instance::to_upper,
        ("trim", 0) => instance::trim,
        _ => return Ok(Resolution::NotFound),
    };
    run(invoke, Some(receiver), &values, env)
}
