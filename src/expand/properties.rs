//! Property phase: rewrites `$(...)` references.
//!
//! A body is one of, in priority order: empty, a `Registry:` reference, one
//! of the historical bodies that always expand to nothing, a property
//! function call, or a plain property name.

use std::borrow::Cow;

use crate::base::escaping::escape;
use crate::base::names::scan_name;
use crate::base::{ElementLocation, ExpandError, ExpanderOptions, Result, Value};
use crate::functions::{ArgumentExpander, FunctionCall};
use crate::model::{PropertyProvider, paths};
use crate::scanner::scan_for_closing_paren;

use super::context::ExpansionContext;
use super::tracker::PropertyUsage;

const REGISTRY_PREFIX: &str = "Registry:";

/// Bodies kept only so old project files still evaluate.
const EMPTY_COMPAT_BODIES: &[&str] = &["Solutions.VSVersion", "Solutions.VSVersion8.0"];

pub(crate) struct PropertyExpander<'x> {
    properties: &'x dyn PropertyProvider,
    options: ExpanderOptions,
    context: &'x ExpansionContext<'x>,
}

impl<'x> PropertyExpander<'x> {
    pub(crate) fn new(
        properties: &'x dyn PropertyProvider,
        options: ExpanderOptions,
        context: &'x ExpansionContext<'x>,
    ) -> Self {
        Self {
            properties,
            options,
            context,
        }
    }

    /// Expand to a string, keeping escapes.
    pub(crate) fn expand<'e>(&self, expr: &'e str) -> Result<Cow<'e, str>> {
        if !expr.contains("$(") {
            return Ok(Cow::Borrowed(expr));
        }
        Ok(Cow::Owned(match self.expand_typed(expr)? {
            Value::Str(s) => s,
            other => other.into_escaped_string(),
        }))
    }

    /// Expand, returning a lone reference's value unconverted.
    ///
    /// `$(X)` keeps whatever type `X` evaluated to; any surrounding text or
    /// a second reference turns the result into one string.
    ///
    /// Off Windows, `\` in a joined result becomes `/`.
    pub(crate) fn expand_typed(&self, expr: &str) -> Result<Value> {
        self.concatenate(expr, true)
    }

    fn concatenate(&self, expr: &str, adjust_paths: bool) -> Result<Value> {
        if !expr.contains("$(") {
            return Ok(Value::Str(expr.to_string()));
        }

        let mut result = Concatenator::default();
        let mut pos = 0;
        while let Some(found) = expr[pos..].find("$(") {
            let start = pos + found;
            let Some(scan) = scan_for_closing_paren(expr, start + 2) else {
                // Unbalanced: the rest is literal text
                break;
            };
            result.push_str(&expr[pos..start]);
            let reference = &expr[start..=scan.close];
            let body = &expr[start + 2..scan.close];
            result.push_value(self.expand_body(body, reference)?);
            pos = scan.close + 1;
        }
        result.push_str(&expr[pos..]);
        Ok(result.finish(adjust_paths))
    }

    fn expand_body(&self, body: &str, reference: &str) -> Result<Value> {
        let body = body.trim();
        if body.is_empty() {
            return Ok(Value::Str(String::new()));
        }
        if body.len() >= REGISTRY_PREFIX.len()
            && body[..REGISTRY_PREFIX.len()].eq_ignore_ascii_case(REGISTRY_PREFIX)
        {
            return self.expand_registry(&body[REGISTRY_PREFIX.len()..]);
        }
        if EMPTY_COMPAT_BODIES
            .iter()
            .any(|compat| compat.eq_ignore_ascii_case(body))
        {
            return Ok(Value::Str(String::new()));
        }

        let name_end = scan_name(body, 0);
        let rest = &body[name_end..];
        let evaluated = if body.starts_with('[') || rest.starts_with(['.', '[']) {
            self.expand_function(body, name_end, reference)
        } else if name_end == body.len() {
            Ok(self.lookup(body))
        } else {
            Err(ExpandError::invalid_expression(
                reference,
                format!("\"{body}\" is not a valid property name"),
            )
            .with_location(&self.context.location))
        };

        match evaluated {
            Ok(value) => Ok(value),
            Err(err)
                if self
                    .options
                    .contains(ExpanderOptions::LEAVE_PROPERTIES_UNEXPANDED_ON_ERROR) =>
            {
                tracing::debug!("[EXPAND] leaving '{}' unexpanded: {}", reference, err);
                Ok(Value::Str(reference.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    /// Errors name `reference`, the whole `$(...)` text.
    fn expand_function(&self, body: &str, name_end: usize, reference: &str) -> Result<Value> {
        let location = &self.context.location;
        let env = self.context.call_env();
        let resolver = &self.context.resolver;
        let mut arguments = Arguments(self);

        // `$(X[0])`: resolve X, then apply the indexer to its value
        if name_end > 0 && body[name_end..].starts_with('[') {
            let receiver = self.lookup(&body[..name_end]);
            let call = FunctionCall::extract_on(&body[name_end..], true, location)
                .map_err(|err| err.with_expression(reference))?;
            tracing::trace!("[EXPAND] indexing '{}'", &body[..name_end]);
            return resolver.execute_in(
                reference,
                &call,
                Some(receiver),
                &mut arguments,
                &env,
                location,
            );
        }

        let call = FunctionCall::extract(body, location)?;
        let receiver = call.receiver_name().map(|name| self.lookup(name));
        tracing::trace!("[EXPAND] property function '{}'", call.name);
        resolver.execute_in(reference, &call, receiver, &mut arguments, &env, location)
    }

    fn expand_registry(&self, reference: &str) -> Result<Value> {
        // Registry keys keep their backslashes
        let reference = self.concatenate(reference, false)?.into_escaped_string();
        let (key, value_name) = match reference.rfind('@') {
            Some(at) => (&reference[..at], &reference[at + 1..]),
            None => (&reference[..], ""),
        };
        let value = self
            .context
            .registry
            .and_then(|registry| registry.value(key, value_name))
            .map(|v| escape(&v).into_owned())
            .unwrap_or_default();
        Ok(Value::Str(value))
    }

    fn lookup(&self, name: &str) -> Value {
        if let Some(value) = self.properties.escaped_value(name) {
            self.track(name, PropertyUsage::Found);
            return Value::Str(value.into_owned());
        }
        match reserved_property(name, &self.context.location) {
            Some(value) => {
                self.track(name, PropertyUsage::Reserved);
                Value::Str(value)
            }
            None => {
                self.track(name, PropertyUsage::NotFound);
                Value::Str(String::new())
            }
        }
    }

    fn track(&self, name: &str, usage: PropertyUsage) {
        if let Some(tracker) = self.context.usage {
            tracker.record(name, usage);
        }
    }
}

/// Expands function arguments as property expressions.
struct Arguments<'p, 'x>(&'p PropertyExpander<'x>);

impl ArgumentExpander for Arguments<'_, '_> {
    fn expand_argument(&mut self, text: &str) -> Result<Value> {
        self.0.expand_typed(text)
    }
}

/// The `MSBuildThisFile*` family, computed from the element's file.
fn reserved_property(name: &str, location: &ElementLocation) -> Option<String> {
    let file = location.file()?.to_str()?;
    let value = match name.to_ascii_lowercase().as_str() {
        "msbuildthisfile" => paths::file_name(file).to_string(),
        "msbuildthisfilename" => paths::file_name_without_extension(file).to_string(),
        "msbuildthisfilefullpath" => file.to_string(),
        "msbuildthisfileextension" => paths::extension(file).to_string(),
        "msbuildthisfiledirectory" => paths::ensure_trailing_slash(&paths::directory_name(file)?),
        "msbuildthisfiledirectorynoroot" => {
            let directory = paths::directory_name(file)?;
            paths::ensure_trailing_slash(&directory[paths::root_len(&directory)..])
        }
        _ => return None,
    };
    Some(escape(&value).into_owned())
}

/// Accumulates literal text and reference values.
///
/// Holds a lone value as-is until a second piece arrives.
#[derive(Default)]
struct Concatenator {
    first: Option<Value>,
    text: Option<String>,
}

impl Concatenator {
    fn push_str(&mut self, s: &str) {
        if !s.is_empty() {
            self.text_mut().push_str(s);
        }
    }

    fn push_value(&mut self, value: Value) {
        if self.first.is_none() && self.text.is_none() {
            self.first = Some(value);
        } else {
            let s = value.into_escaped_string();
            self.text_mut().push_str(&s);
        }
    }

    fn text_mut(&mut self) -> &mut String {
        let first = &mut self.first;
        self.text.get_or_insert_with(|| {
            first
                .take()
                .map(Value::into_escaped_string)
                .unwrap_or_default()
        })
    }

    fn finish(self, adjust_paths: bool) -> Value {
        match (self.text, self.first) {
            (Some(text), _) if adjust_paths => Value::Str(paths::adjust_separators(text)),
            (Some(text), _) => Value::Str(text),
            (None, Some(value)) => value,
            (None, None) => Value::Str(String::new()),
        }
    }
}
