//! Layered name-to-value frames: lookup, field traversal, and truthiness.
//!
//! One frame is pushed per iteration and per include (§3 "Scope Frame").
//! Lookup walks from the top of the stack to the bottom; the first match
//! wins, which is how `v-for` loop variables shadow outer bindings.

use crate::value::Value;
use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct Frame {
    bindings: IndexMap<String, Value>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.bindings.insert(name.into(), value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }
}

/// The lookup stack. The root frame is the caller-supplied data map;
/// everything pushed after it is an iteration or include frame.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new(root: Value) -> Self {
        let mut root_frame = Frame::new();
        if let Value::Map(map) = root {
            for (k, v) in map {
                root_frame.set(k, v);
            }
        }
        Self {
            frames: vec![root_frame],
        }
    }

    /// Push a fresh frame. Callers MUST pair this with [`Self::pop`] — every
    /// iteration and every include pushes exactly one frame.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) {
        // The root frame (index 0) is never popped; a pop with only the
        // root left is a caller bug, so it's a no-op rather than a panic
        // to keep render loops resilient to extra pops.
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Build a scope isolated from everything but `root` — used at include
    /// sites, where the callee must not see the caller's scope at all.
    pub fn isolated(root: Frame) -> Self {
        Self { frames: vec![root] }
    }

    /// Top-to-bottom search; first match wins. A miss yields `Value::Nil`,
    /// not an error — undefined identifiers are resolved at evaluation time.
    pub fn lookup(&self, name: &str) -> Value {
        for frame in self.frames.iter().rev() {
            if let Some(v) = frame.get(name) {
                return v.clone();
            }
        }
        Value::Nil
    }

    pub fn has(&self, name: &str) -> bool {
        self.frames.iter().rev().any(|f| f.get(name).is_some())
    }

    /// Dotted field-path resolution (`user.name`, `items.0.title`), rooted
    /// at whichever frame shadows the first path segment.
    pub fn resolve(&self, path: &str) -> Value {
        let mut parts = path.splitn(2, '.');
        let head = parts.next().unwrap_or(path);
        let base = self.lookup(head);
        match parts.next() {
            Some(rest) => base.resolve_path(rest),
            None => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadowing_top_to_bottom() {
        let mut stack = ScopeStack::new(Value::Map(
            [("x".to_string(), Value::Int(1))].into_iter().collect(),
        ));
        assert_eq!(stack.lookup("x"), Value::Int(1));

        stack.push(Frame::new().with("x", Value::Int(2)));
        assert_eq!(stack.lookup("x"), Value::Int(2));

        stack.pop();
        assert_eq!(stack.lookup("x"), Value::Int(1));
    }

    #[test]
    fn include_isolation_hides_parent_scope() {
        let mut stack = ScopeStack::new(Value::Map(
            [("secret".to_string(), Value::Int(1))]
                .into_iter()
                .collect(),
        ));
        stack.push(Frame::new().with("name", Value::Str("X".into())));
        let mut child = ScopeStack::isolated(Frame::new().with("name", Value::Str("X".into())));
        assert_eq!(child.lookup("secret"), Value::Nil);
        child.pop();
        assert_eq!(child.depth(), 1);
    }

    #[test]
    fn dotted_resolve() {
        let stack = ScopeStack::new(Value::from(serde_json::json!({
            "user": {"name": "Ada"}
        })));
        assert_eq!(stack.resolve("user.name"), Value::Str("Ada".into()));
        assert_eq!(stack.resolve("user.missing"), Value::Nil);
    }
}
