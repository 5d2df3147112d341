//! Dynamically typed values flowing through the scope stack and expression
//! evaluator.
//!
//! Bridges through [`serde_json::Value`] so any `Serialize` Rust type
//! (including ones using `#[serde(rename = "...")]`) becomes resolvable by
//! field name without bespoke reflection.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Value, serde_json::Error> {
        let json = serde_json::to_value(value)?;
        Ok(Value::from(json))
    }

    /// `false` iff nil, `false`, empty string, string `"false"`, or numeric
    /// zero. Every other value — including empty sequences, maps, and
    /// structs — is truthy. This is a hard contract the engine's tests
    /// depend on.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Int(0) => false,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !(s.is_empty() || s == "false"),
            Value::Seq(_) | Value::Map(_) => true,
            Value::Int(_) => true,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Traverse a dotted path (`user.name`, `items.0.title`) from this value.
    /// Struct-like maps are matched by exact key, then sequences by decimal
    /// index. A miss at any step yields `Value::Nil`, never an error.
    pub fn resolve_path(&self, path: &str) -> Value {
        let mut current = self.clone();
        for part in path.split('.') {
            current = current.get_member(part);
        }
        current
    }

    pub fn get_member(&self, key: &str) -> Value {
        match self {
            Value::Map(map) => map.get(key).cloned().unwrap_or(Value::Nil),
            Value::Seq(seq) => key
                .parse::<usize>()
                .ok()
                .and_then(|i| seq.get(i).cloned())
                .unwrap_or(Value::Nil),
            _ => Value::Nil,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Stringifies as it would be interpolated into template text; never
    /// escaped here, escaping happens at the interpolation/binding site.
    pub fn stringify(&self) -> String {
        match self {
            Value::Nil => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.is_finite() {
                    format!("{}", *f as i64)
                } else {
                    f.to_string()
                }
            }
            Value::Str(s) => s.clone(),
            Value::Seq(_) | Value::Map(_) => {
                serde_json::to_string(&serde_json::Value::from(self.clone()))
                    .unwrap_or_default()
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(a) => Value::Seq(a.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(o) => {
                Value::Map(o.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Nil => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s),
            Value::Seq(s) => serde_json::Value::Array(s.into_iter().map(Into::into).collect()),
            Value::Map(m) => {
                serde_json::Value::Object(m.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Seq(v.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stringify())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_contract() {
        assert!(!Value::Nil.truthy());
        assert!(!Value::Bool(false).truthy());
        assert!(!Value::Str(String::new()).truthy());
        assert!(!Value::Str("false".into()).truthy());
        assert!(!Value::Int(0).truthy());
        assert!(Value::Seq(vec![]).truthy());
        assert!(Value::Map(IndexMap::new()).truthy());
        assert!(Value::Str("0".into()).truthy());
        assert!(!Value::Float(0.0).truthy());
    }

    #[test]
    fn resolve_path_nested() {
        let json = serde_json::json!({"user": {"name": "Ada"}, "items": ["a", "b"]});
        let v = Value::from(json);
        assert_eq!(v.resolve_path("user.name"), Value::Str("Ada".into()));
        assert_eq!(v.resolve_path("items.1"), Value::Str("b".into()));
        assert_eq!(v.resolve_path("items.5"), Value::Nil);
        assert_eq!(v.resolve_path("missing.path"), Value::Nil);
    }

    #[test]
    fn from_serializable_uses_serde_rename() {
        #[derive(Serialize)]
        struct S {
            #[serde(rename = "full_name")]
            name: String,
        }
        let v = Value::from_serializable(&S { name: "X".into() }).unwrap();
        assert_eq!(v.get_member("full_name"), Value::Str("X".into()));
    }
}
