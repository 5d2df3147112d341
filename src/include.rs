//! Resolves `<template include="…">` / `<vuego include="…">` elements (and,
//! when enabled, shorthand component tags) into the callee's rendered
//! output, spliced in place of the include element.

use crate::directives::{self, RenderCtx};
use crate::dom::{self};
use crate::error::{ErrorContext, RenderError, RenderResult};
use crate::scope::{Frame, ScopeStack};
use markup5ever_rcdom::Handle;
use tracing::trace;

/// Per-render stack of include paths currently being resolved, for cycle
/// detection (A -> B -> ... -> A through the include graph is terminal).
#[derive(Debug, Default)]
pub struct IncludeStack {
    stack: Vec<String>,
}

impl IncludeStack {
    pub fn new() -> Self {
        Self::default()
    }

    fn enter(&mut self, path: &str) -> Result<(), String> {
        if self.stack.iter().any(|p| p == path) {
            let mut chain = self.stack.clone();
            chain.push(path.to_string());
            return Err(chain.join(" -> "));
        }
        self.stack.push(path.to_string());
        Ok(())
    }

    fn leave(&mut self) {
        self.stack.pop();
    }
}

pub fn resolve(
    node: &Handle,
    scope: &mut ScopeStack,
    ctx: &RenderCtx,
    shorthand_path: Option<String>,
) -> RenderResult<Vec<Handle>> {
    let tag = dom::tag_name(node).unwrap_or_default();
    let path = shorthand_path
        .or_else(|| dom::get_attr(node, "include"))
        .ok_or_else(|| {
            RenderError::Compile(
                ErrorContext::new(ctx.path).with_tag(tag.clone()),
                "include element missing `include` path".to_string(),
            )
        })?;

    trace!(parent = ctx.path, target = %path, "resolving include");

    // Build the callee's scope frame from the include site's own
    // attributes, evaluated in the *caller's* scope. No other name leaks
    // in — the callee's scope is otherwise empty.
    let mut frame = Frame::new();
    for (name, value) in dom::attrs(node) {
        if name == "include" {
            continue;
        }
        if let Some(prop) = name.strip_prefix(':') {
            let evaluated = directives::eval_in(ctx, node, scope, &value)?;
            frame.set(prop, evaluated);
        } else {
            frame.set(name, crate::value::Value::Str(value));
        }
    }

    ctx.includes
        .borrow_mut()
        .enter(&path)
        .map_err(|chain| RenderError::IncludeCycle(ErrorContext::new(ctx.path), chain))?;

    let result = (|| {
        let cached = ctx.cache.get_or_compile(&path)?;
        let roots = crate::frozen::thaw_all(&cached.roots);
        let mut child_scope = ScopeStack::isolated(frame);
        let child_ctx = ctx.with_path(&path);
        directives::walk(roots, &mut child_scope, &child_ctx)
    })();

    ctx.includes.borrow_mut().leave();
    result
}
