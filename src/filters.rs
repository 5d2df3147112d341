//! Pipe-chain filters (`e | upper | default("n/a")`) and the builtin
//! function namespace `f(x, y)` expression calls dispatch into.
//!
//! User-registered filters overlay the builtins; on a name collision the
//! user's filter wins.

use crate::error::{ErrorContext, RenderError};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub type FilterFn = dyn Fn(&Value, &[Value]) -> Result<Value, RenderError> + Send + Sync;

#[derive(Clone)]
pub struct FilterRegistry {
    user: HashMap<String, Arc<FilterFn>>,
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self {
            user: HashMap::new(),
        }
    }

    /// Registers (or overrides) a named filter, usable both as a pipe stage
    /// and as a call-syntax function.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Value, &[Value]) -> Result<Value, RenderError> + Send + Sync + 'static,
    {
        self.user.insert(name.into(), Arc::new(f));
    }

    pub fn apply(&self, name: &str, input: &Value, args: &[Value]) -> Result<Value, RenderError> {
        if let Some(f) = self.user.get(name) {
            return f(input, args);
        }
        if let Some(f) = builtin(name) {
            return f(input, args);
        }
        Err(RenderError::Evaluate(
            ErrorContext::new(""),
            format!("unknown filter `{}`", name),
        ))
    }
}

fn builtin(name: &str) -> Option<fn(&Value, &[Value]) -> Result<Value, RenderError>> {
    Some(match name {
        "upper" => upper,
        "lower" => lower,
        "trim" => trim,
        "default" => default,
        "join" => join,
        "length" => length,
        "json" => json,
        _ => return None,
    })
}

fn upper(input: &Value, _args: &[Value]) -> Result<Value, RenderError> {
    Ok(Value::Str(input.stringify().to_uppercase()))
}

fn lower(input: &Value, _args: &[Value]) -> Result<Value, RenderError> {
    Ok(Value::Str(input.stringify().to_lowercase()))
}

fn trim(input: &Value, _args: &[Value]) -> Result<Value, RenderError> {
    Ok(Value::Str(input.stringify().trim().to_string()))
}

/// `x | default(fallback)` — substitutes `fallback` when `x` is nil or
/// would render as an empty string.
fn default(input: &Value, args: &[Value]) -> Result<Value, RenderError> {
    let fallback = args.first().cloned().unwrap_or(Value::Nil);
    if input.is_nil() || input.stringify().is_empty() {
        Ok(fallback)
    } else {
        Ok(input.clone())
    }
}

fn join(input: &Value, args: &[Value]) -> Result<Value, RenderError> {
    let sep = args.first().map(|v| v.stringify()).unwrap_or_default();
    let items = input.as_seq().map(|items| {
        items
            .iter()
            .map(Value::stringify)
            .collect::<Vec<_>>()
            .join(&sep)
    });
    Ok(Value::Str(items.unwrap_or_default()))
}

fn length(input: &Value, _args: &[Value]) -> Result<Value, RenderError> {
    let len = match input {
        Value::Seq(s) => s.len(),
        Value::Map(m) => m.len(),
        Value::Str(s) => s.chars().count(),
        Value::Nil => 0,
        _ => return Ok(Value::Int(0)),
    };
    Ok(Value::Int(len as i64))
}

fn json(input: &Value, _args: &[Value]) -> Result<Value, RenderError> {
    let json = serde_json::Value::from(input.clone());
    Ok(Value::Str(serde_json::to_string(&json).unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_round_trip() {
        let r = FilterRegistry::new();
        assert_eq!(
            r.apply("upper", &Value::Str("abc".into()), &[]).unwrap(),
            Value::Str("ABC".into())
        );
        assert_eq!(
            r.apply("default", &Value::Nil, &[Value::Str("n/a".into())])
                .unwrap(),
            Value::Str("n/a".into())
        );
        assert_eq!(
            r.apply(
                "join",
                &Value::Seq(vec![Value::Int(1), Value::Int(2)]),
                &[Value::Str(",".into())]
            )
            .unwrap(),
            Value::Str("1,2".into())
        );
        assert_eq!(
            r.apply("length", &Value::Str("héllo".into()), &[]).unwrap(),
            Value::Int(5)
        );
    }

    #[test]
    fn user_filter_overrides_builtin() {
        let mut r = FilterRegistry::new();
        r.register("upper", |v, _| Ok(Value::Str(format!("custom:{}", v.stringify()))));
        assert_eq!(
            r.apply("upper", &Value::Str("x".into()), &[]).unwrap(),
            Value::Str("custom:x".into())
        );
    }

    #[test]
    fn unknown_filter_is_an_evaluate_error() {
        let r = FilterRegistry::new();
        assert!(r.apply("nope", &Value::Nil, &[]).is_err());
    }
}
