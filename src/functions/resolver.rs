//! Resolution and invocation of extracted calls.
//!
//! Each step reports [`Resolution::Found`] or [`Resolution::NotFound`] and
//! the next step runs only on `NotFound`:
//!
//! 1. the direct-dispatch table for common string calls,
//! 2. an overload whose parameters the arguments already fit,
//! 3. an overload taking only strings,
//! 4. the first overload every argument coerces to.
//!
//! Constructors (`new`) skip the first step.

use std::sync::Arc;

use crate::base::escaping::{escape, unescape};
use crate::base::{ElementLocation, ExpandError, Result, Value};

use super::catalog::{self, CallEnv, CallError, Invocation, Member, Overload, TypeEntry};
use super::coerce::{ArgValue, coerce_all, fits_exactly};
use super::parse::{Argument, CallKind, FunctionCall, Target};
use super::policy::{AdditionalTypes, FunctionPolicy, TypeCache, TypeProbe};
use super::{instance, intrinsics, well_known};

/// Outcome of one resolution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(Value),
    NotFound,
}

/// Expands the text of a call's arguments.
///
/// Implemented by the property expander so that arguments may themselves
/// contain `$(...)` references and nested calls.
pub trait ArgumentExpander {
    /// Expand one de-quoted argument. String results are escaped.
    fn expand_argument(&mut self, text: &str) -> Result<Value>;
}

/// Expands nothing; every argument is taken literally.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralArguments;

impl ArgumentExpander for LiteralArguments {
    fn expand_argument(&mut self, text: &str) -> Result<Value> {
        Ok(Value::string(text))
    }
}

enum BindError {
    NoMatch,
    Ambiguous,
    Call(CallError),
}

/// Runs property functions under a [`FunctionPolicy`].
#[derive(Clone)]
pub struct FunctionResolver {
    policy: FunctionPolicy,
    cache: Arc<TypeCache>,
    probe: Arc<dyn TypeProbe>,
}

impl Default for FunctionResolver {
    fn default() -> Self {
        Self::new(FunctionPolicy::from_env())
    }
}

impl std::fmt::Debug for FunctionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionResolver")
            .field("policy", &self.policy)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl FunctionResolver {
    /// A resolver sharing the process-wide type cache.
    pub fn new(policy: FunctionPolicy) -> Self {
        Self {
            policy,
            cache: TypeCache::global(),
            probe: Arc::new(AdditionalTypes),
        }
    }

    pub fn with_cache(mut self, cache: Arc<TypeCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn TypeProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn policy(&self) -> FunctionPolicy {
        self.policy
    }

    pub fn cache(&self) -> &TypeCache {
        &self.cache
    }

    /// Run `call` and any calls chained after it.
    ///
    /// `receiver` is the value of the named receiver property (escaped),
    /// or the previous result when `call` was extracted from a chain.
    pub fn execute(
        &self,
        call: &FunctionCall<'_>,
        receiver: Option<Value>,
        args: &mut dyn ArgumentExpander,
        env: &CallEnv<'_>,
        location: &ElementLocation,
    ) -> Result<Value> {
        let context = format!("$({})", call.expression);
        self.execute_in(&context, call, receiver, args, env, location)
    }

    /// Like [`FunctionResolver::execute`], but errors name `context`, the
    /// full expression the call was taken from.
    pub fn execute_in(
        &self,
        context: &str,
        call: &FunctionCall<'_>,
        receiver: Option<Value>,
        args: &mut dyn ArgumentExpander,
        env: &CallEnv<'_>,
        location: &ElementLocation,
    ) -> Result<Value> {
        self.execute_chain(call, receiver, args, env, location, context)
            .map_err(|err| err.with_location(location))
    }

    fn execute_chain(
        &self,
        call: &FunctionCall<'_>,
        receiver: Option<Value>,
        args: &mut dyn ArgumentExpander,
        env: &CallEnv<'_>,
        location: &ElementLocation,
        context: &str,
    ) -> Result<Value> {
        let arguments = evaluate_arguments(&call.arguments, args)?;

        let result = match call.target {
            Target::Static { type_name } => {
                self.call_static(type_name, call.name, &arguments, env, context)?
            }
            Target::Instance { .. } | Target::Indexer => {
                let receiver = receiver.ok_or_else(|| {
                    ExpandError::invalid_function(context, "the call has no receiver")
                })?;
                self.call_instance(call, receiver, &arguments, env, context)?
            }
        };

        if call.remainder.is_empty() {
            return Ok(result);
        }
        tracing::trace!("[FUNCTIONS] chaining '{}'", call.remainder);
        let next = FunctionCall::extract_on(call.remainder, true, location)
            .map_err(|err| err.with_expression(context))?;
        self.execute_chain(&next, Some(result), args, env, location, context)
    }

    fn resolve_type(&self, type_name: &str) -> Option<&'static TypeEntry> {
        let probe = self
            .policy
            .probe_additional_types
            .then(|| self.probe.as_ref());
        self.cache.resolve(type_name, probe)
    }

    fn call_static(
        &self,
        type_name: &str,
        name: &str,
        args: &[ArgValue],
        env: &CallEnv<'_>,
        context: &str,
    ) -> Result<Value> {
        let disallowed = |reason: &str| ExpandError::DisallowedFunction {
            type_name: type_name.to_string(),
            member: name.to_string(),
            expression: context.to_string(),
            reason: reason.to_string(),
        };

        let entry = self
            .resolve_type(type_name)
            .ok_or_else(|| disallowed("the type is not available"))?;
        if !(entry.is_intrinsic() || entry.allows(name) || self.policy.allow_all) {
            return Err(disallowed("the member is not in the allowlist"));
        }

        let escape_result = !(entry.is_intrinsic() && intrinsics::returns_escaped(name));

        if !name.eq_ignore_ascii_case("new") {
            match well_known::try_static(entry, name, args, env) {
                Ok(Resolution::Found(value)) => {
                    tracing::trace!("[FUNCTIONS] [{}]::{} via direct dispatch", entry.name, name);
                    return Ok(finish(value, escape_result));
                }
                Ok(Resolution::NotFound) => {}
                Err(err) => return Err(ExpandError::invalid_function(context, err.to_string())),
            }
        }

        let member = entry.member(name).ok_or_else(|| ExpandError::UnknownFunction {
            receiver: entry.name.to_string(),
            member: name.to_string(),
            expression: context.to_string(),
        })?;
        let arithmetic = entry.is_intrinsic() && intrinsics::is_arithmetic(name);

        match bind(member, None, args, env, arithmetic) {
            Ok(value) => Ok(finish(value, escape_result)),
            Err(err) => Err(bind_failure(err, entry.name, name, context)),
        }
    }

    fn call_instance(
        &self,
        call: &FunctionCall<'_>,
        receiver: Value,
        args: &[ArgValue],
        env: &CallEnv<'_>,
        context: &str,
    ) -> Result<Value> {
        let receiver = match receiver {
            Value::Str(s) => Value::Str(unescape(&s).into_owned()),
            Value::Null => {
                return Err(ExpandError::invalid_function(
                    context,
                    "cannot call a member on a null value",
                ));
            }
            other => other,
        };

        let name = match call.kind {
            CallKind::Indexer => instance::indexer_name(&receiver),
            CallKind::Method | CallKind::Property => call.name,
        };

        if name.eq_ignore_ascii_case("GetType") && !self.policy.allow_all {
            return Err(ExpandError::DisallowedFunction {
                type_name: receiver.type_name().to_string(),
                member: name.to_string(),
                expression: context.to_string(),
                reason: "type introspection is not allowed".to_string(),
            });
        }

        match well_known::try_instance(&receiver, name, args, env) {
            Ok(Resolution::Found(value)) => {
                tracing::trace!("[FUNCTIONS] .{} via direct dispatch", name);
                return Ok(finish(value, true));
            }
            Ok(Resolution::NotFound) => {}
            Err(err) => return Err(ExpandError::invalid_function(context, err.to_string())),
        }

        let type_name = receiver.type_name();
        let member = catalog::find_member(catalog::instance_members(&receiver), name)
            .ok_or_else(|| ExpandError::UnknownFunction {
                receiver: type_name.to_string(),
                member: name.to_string(),
                expression: context.to_string(),
            })?;

        match bind(member, Some(&receiver), args, env, false) {
            Ok(value) => Ok(finish(value, true)),
            Err(err) => Err(bind_failure(err, type_name, name, context)),
        }
    }
}

impl FunctionCall<'_> {
    /// Run this call through `resolver`.
    pub fn execute(
        &self,
        resolver: &FunctionResolver,
        receiver: Option<Value>,
        args: &mut dyn ArgumentExpander,
        env: &CallEnv<'_>,
        location: &ElementLocation,
    ) -> Result<Value> {
        resolver.execute(self, receiver, args, env, location)
    }
}

/// Arguments reach functions as unescaped strings, or null.
fn evaluate_arguments(
    arguments: &[Argument<'_>],
    expander: &mut dyn ArgumentExpander,
) -> Result<Vec<ArgValue>> {
    arguments
        .iter()
        .map(|argument| match argument {
            Argument::Null => Ok(ArgValue::Value(Value::Null)),
            Argument::Out => Ok(ArgValue::Out),
            Argument::Text(text) => {
                let value = expander.expand_argument(text)?;
                Ok(ArgValue::Value(match value {
                    Value::Null => Value::Null,
                    other => Value::Str(unescape(&other.to_escaped_string()).into_owned()),
                }))
            }
        })
        .collect()
}

fn finish(value: Value, escape_result: bool) -> Value {
    match value {
        Value::Str(s) if escape_result => Value::Str(escape(&s).into_owned()),
        other => other,
    }
}

fn bind_failure(err: BindError, receiver: &str, member: &str, context: &str) -> ExpandError {
    match err {
        BindError::NoMatch => ExpandError::UnknownFunction {
            receiver: receiver.to_string(),
            member: member.to_string(),
            expression: context.to_string(),
        },
        BindError::Ambiguous => ExpandError::invalid_function(
            context,
            format!("the overloads of \"{member}\" disagree on the result"),
        ),
        BindError::Call(err) => ExpandError::invalid_function(context, err.to_string()),
    }
}

fn invoke(
    overload: &Overload,
    receiver: Option<&Value>,
    values: &[Value],
    env: &CallEnv<'_>,
) -> std::result::Result<Value, BindError> {
    let invocation = Invocation {
        receiver,
        args: values,
        env,
    };
    (overload.invoke)(&invocation).map_err(BindError::Call)
}

fn bind(
    member: &Member,
    receiver: Option<&Value>,
    args: &[ArgValue],
    env: &CallEnv<'_>,
    arithmetic: bool,
) -> std::result::Result<Value, BindError> {
    let mut candidates: Vec<&Overload> = member
        .overloads
        .iter()
        .filter(|o| o.arity() == args.len())
        .collect();
    if candidates.is_empty() {
        return Err(BindError::NoMatch);
    }
    if arithmetic {
        candidates.sort_by_key(|o| {
            o.params
                .iter()
                .map(|p| u32::from(p.numeric_rank()))
                .sum::<u32>()
        });
    }

    if args.iter().any(|a| matches!(a, ArgValue::Out)) {
        return bind_with_placeholders(&candidates, receiver, args, env);
    }

    let exact = candidates.iter().find(|o| {
        args.iter()
            .zip(o.params)
            .all(|(arg, param)| fits_exactly(arg, *param))
    });
    if let Some(overload) = exact {
        let values: Vec<Value> = args.iter().filter_map(|a| a.as_value().cloned()).collect();
        tracing::trace!("[FUNCTIONS] {}{:?} bound exactly", member.name, overload);
        return invoke(overload, receiver, &values, env);
    }

    if let Some(overload) = candidates.iter().find(|o| o.all_strings()) {
        if let Some(values) = coerce_all(args, overload.params) {
            tracing::trace!("[FUNCTIONS] {}{:?} bound as strings", member.name, overload);
            return invoke(overload, receiver, &values, env);
        }
    }

    for overload in &candidates {
        if let Some(values) = coerce_all(args, overload.params) {
            tracing::trace!("[FUNCTIONS] {}{:?} bound by coercion", member.name, overload);
            return invoke(overload, receiver, &values, env);
        }
    }
    Err(BindError::NoMatch)
}

/// Every overload the arguments coerce to runs; all of them must agree.
fn bind_with_placeholders(
    candidates: &[&Overload],
    receiver: Option<&Value>,
    args: &[ArgValue],
    env: &CallEnv<'_>,
) -> std::result::Result<Value, BindError> {
    let mut agreed: Option<Value> = None;
    for overload in candidates {
        let Some(values) = coerce_all(args, overload.params) else {
            continue;
        };
        let result = invoke(overload, receiver, &values, env)?;
        match &agreed {
            None => agreed = Some(result),
            Some(previous) if *previous == result => {}
            Some(_) => return Err(BindError::Ambiguous),
        }
    }
    agreed.ok_or(BindError::NoMatch)
}
