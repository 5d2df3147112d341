//! Walks a cloned template DOM and rewrites it in place per the fixed
//! per-element directive order (§4.6):
//!
//!   v-for -> v-if -> v-once -> include -> v-html -> v-bind/`:` ->
//!   text interpolation -> `<template>` unwrap
//!
//! The walk is pre-order depth-first: a `v-for` is expanded (and its clones
//! re-walked) before descending into a plain element's children.

use crate::cache::TemplateCache;
use crate::dom::{self};
use crate::error::{ErrorContext, RenderError, RenderResult};
use crate::expr::{self, Expr};
use crate::filters::FilterRegistry;
use crate::include::{self, IncludeStack};
use crate::scope::{Frame, ScopeStack};
use crate::value::Value;
use markup5ever_rcdom::Handle;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Per-render state threaded through the walk: shared immutable engine
/// config plus the per-render mutable bookkeeping (v-once dedup, include
/// cycle stack, cancellation). `once_seen`/`includes` are borrowed rather
/// than owned so that [`include::resolve`] can build a derived context for
/// the callee (different `path`) while sharing the same render-wide
/// bookkeeping.
#[derive(Clone, Copy)]
pub struct RenderCtx<'a> {
    pub filters: &'a FilterRegistry,
    pub cache: &'a TemplateCache,
    pub path: &'a str,
    pub components_enabled: bool,
    pub strict_undefined: bool,
    pub components: &'a indexmap::IndexMap<String, String>,
    pub cancel: &'a crate::cancel::CancellationToken,
    once_seen: &'a RefCell<HashSet<String>>,
    pub(crate) includes: &'a RefCell<IncludeStack>,
}

impl<'a> RenderCtx<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        filters: &'a FilterRegistry,
        cache: &'a TemplateCache,
        path: &'a str,
        components_enabled: bool,
        strict_undefined: bool,
        components: &'a indexmap::IndexMap<String, String>,
        cancel: &'a crate::cancel::CancellationToken,
        once_seen: &'a RefCell<HashSet<String>>,
        includes: &'a RefCell<IncludeStack>,
    ) -> Self {
        Self {
            filters,
            cache,
            path,
            components_enabled,
            strict_undefined,
            components,
            cancel,
            once_seen,
            includes,
        }
    }

    /// A context identical to this one but scoped to a different template
    /// path — used when descending into an included template. The
    /// returned context borrows `path` for as long as it's asked to, which
    /// may be shorter than this context's own lifetime.
    pub fn with_path<'b>(&'b self, path: &'b str) -> RenderCtx<'b>
    where
        'a: 'b,
    {
        RenderCtx {
            filters: self.filters,
            cache: self.cache,
            path,
            components_enabled: self.components_enabled,
            strict_undefined: self.strict_undefined,
            components: self.components,
            cancel: self.cancel,
            once_seen: self.once_seen,
            includes: self.includes,
        }
    }
}

fn node_identity(handle: &Handle) -> usize {
    Rc::as_ptr(handle) as usize
}

/// Walks `nodes` (siblings at one level), rewriting each in place and
/// returning the replacement list (a node may expand into zero or more
/// nodes: `v-for` iterations, an omitted `v-if` branch, an unwrapped
/// `<template>`).
pub fn walk(nodes: Vec<Handle>, scope: &mut ScopeStack, ctx: &RenderCtx) -> RenderResult<Vec<Handle>> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        ctx.cancel.check(ErrorContext::new(ctx.path))?;
        out.extend(walk_one(node, scope, ctx)?);
    }
    Ok(out)
}

fn walk_one(node: Handle, scope: &mut ScopeStack, ctx: &RenderCtx) -> RenderResult<Vec<Handle>> {
    if dom::is_text(&node) {
        if let Some(text) = dom::text_contents(&node) {
            let interpolated = interpolate(&text, scope, ctx, &node)?;
            dom::set_text_contents(&node, &interpolated);
        }
        return Ok(vec![node]);
    }

    if !dom::is_element(&node) {
        return Ok(vec![node]);
    }

    if let Some(for_expr) = dom::get_attr(&node, "v-for") {
        dom::remove_attr(&node, "v-for");
        return expand_for(&node, &for_expr, scope, ctx);
    }

    if let Some(if_expr) = dom::get_attr(&node, "v-if") {
        dom::remove_attr(&node, "v-if");
        let value = eval_in(ctx, &node, scope, &if_expr)?;
        if !value.truthy() {
            return Ok(vec![]);
        }
    }

    if dom::has_attr(&node, "v-once") {
        dom::remove_attr(&node, "v-once");
        // `stamp_once_ids` marks each v-once element once, on the
        // un-cloned v-for body, before per-iteration deep clones are made;
        // every iteration's copy of "the same" v-once element then carries
        // an identical marker, giving a dedup key stable across clones
        // (plain Rc-pointer identity isn't, since every iteration is its
        // own deep clone). Outside a v-for there's no marker, and pointer
        // identity alone is already unique.
        let key = dom::get_attr(&node, ONCE_MARKER)
            .map(|id| format!("m{}", id))
            .unwrap_or_else(|| format!("p{}", node_identity(&node)));
        dom::remove_attr(&node, ONCE_MARKER);
        let mut seen = ctx.once_seen.borrow_mut();
        if seen.contains(&key) {
            return Ok(vec![]);
        }
        seen.insert(key);
    }

    let tag = dom::tag_name(&node).unwrap_or_default();
    let is_include = (tag == "template" || tag == "vuego") && dom::has_attr(&node, "include");
    let shorthand = if !is_include && ctx.components_enabled {
        ctx.components.get(&tag).cloned()
    } else {
        None
    };
    if is_include || shorthand.is_some() {
        return include::resolve(&node, scope, ctx, shorthand);
    }

    if let Some(html_expr) = dom::get_attr(&node, "v-html") {
        dom::remove_attr(&node, "v-html");
        let value = eval_in(ctx, &node, scope, &html_expr)?;
        let parsed = crate::parser::parse(value.stringify().as_bytes(), ctx.path)?;
        dom::set_children(&node, parsed.roots);
        apply_bindings(&node, scope, ctx)?;
        if tag == "template" {
            return Ok(dom::children(&node));
        }
        return Ok(vec![node]);
    }

    apply_bindings(&node, scope, ctx)?;

    if dom::is_raw_text_element(&tag) {
        // script/style contents are never interpolated or descended into.
    } else {
        let children = dom::children(&node);
        let rewritten = walk(children, scope, ctx)?;
        dom::set_children(&node, rewritten);
    }

    if tag == "template" {
        return Ok(dom::children(&node));
    }

    Ok(vec![node])
}

/// Applies `v-bind`/`:attr`/`v-bind:attr` directives, then `{{ expr }}`
/// interpolation in any remaining plain attribute value, on `node`'s own
/// attributes. Called only with element handles — text-node interpolation
/// happens earlier, in [`walk_one`].
fn apply_bindings(node: &Handle, scope: &mut ScopeStack, ctx: &RenderCtx) -> RenderResult<()> {
    if let Some(required) = dom::get_attr(node, ":required") {
        dom::remove_attr(node, ":required");
        let missing: Vec<&str> = required
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .filter(|prop| scope.lookup(prop).is_nil())
            .collect();
        if !missing.is_empty() {
            return Err(RenderError::RequiredProp(
                ErrorContext::new(ctx.path).with_tag(dom::tag_name(node).unwrap_or_default()),
                missing.join(", "),
            ));
        }
    }

    // `:attr` and the equivalent long form `v-bind:attr` bind a single
    // attribute; bare `v-bind="obj"` spreads an object's keys instead.
    let bound =
        dom::filter_attrs(node, |name| name == "v-bind" || name.starts_with(':') || name.starts_with("v-bind:"));
    for (name, expr_src) in bound {
        if name == "v-bind" {
            let value = eval_in(ctx, node, scope, &expr_src)?;
            if let Some(map) = value.as_map() {
                for (k, v) in map {
                    apply_single_binding(node, k, v.clone());
                }
            }
            continue;
        }
        let attr_name = name
            .strip_prefix("v-bind:")
            .or_else(|| name.strip_prefix(':'))
            .unwrap_or(&name)
            .to_string();
        let value = eval_in(ctx, node, scope, &expr_src)?;
        apply_single_binding(node, &attr_name, value);
    }

    for (name, value) in dom::attrs(node) {
        if value.contains("{{") {
            let interpolated = interpolate(&value, scope, ctx, node)?;
            dom::set_attr(node, &name, &interpolated);
        }
    }
    Ok(())
}

fn apply_single_binding(node: &Handle, name: &str, value: Value) {
    if dom::is_boolean_attribute(name) {
        if value.truthy() {
            dom::set_attr(node, name, "");
        } else {
            dom::remove_attr(node, name);
        }
        return;
    }
    if name == "class" {
        if let Some(map) = value.as_map() {
            let classes: Vec<&str> = map
                .iter()
                .filter(|(_, v)| v.truthy())
                .map(|(k, _)| k.as_str())
                .collect();
            if classes.is_empty() {
                dom::remove_attr(node, "class");
            } else {
                dom::set_attr(node, "class", &classes.join(" "));
            }
            return;
        }
    }
    if value.is_nil() {
        dom::remove_attr(node, name);
    } else {
        dom::set_attr(node, name, &value.stringify());
    }
}

/// Replaces every `{{ expr }}` span in `text` with its evaluated,
/// *unescaped* result — escaping happens exactly once, downstream, at the
/// renderer (`render::render_node`'s text branch for text-node content,
/// `render::write_attr` for attribute values), so both an interpolated
/// value and the surrounding static text it sits in get escaped together
/// rather than the value being escaped twice.
fn interpolate(
    text: &str,
    scope: &mut ScopeStack,
    ctx: &RenderCtx,
    node: &Handle,
) -> RenderResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str("{{");
            rest = after;
            continue;
        };
        let expr_src = after[..end].trim();
        let value = eval_in(ctx, node, scope, expr_src)?;
        out.push_str(&value.stringify());
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Compiles (via the template cache) and evaluates `src` against `scope`,
/// attributing any error to `node`'s tag. Exposed for the include resolver,
/// which evaluates `:prop="expr"` bindings in the caller's scope.
pub fn eval_in(ctx: &RenderCtx, node: &Handle, scope: &ScopeStack, src: &str) -> RenderResult<Value> {
    let compiled = compile_cached(ctx, src)?;
    expr::eval_strict(&compiled, scope, ctx.filters, ctx.strict_undefined).map_err(|e| {
        e.with_context(ctx.path, dom::tag_name(node).as_deref())
    })
}

fn compile_cached(ctx: &RenderCtx, src: &str) -> RenderResult<Expr> {
    ctx.cache.compile_expr(src).map_err(|msg| {
        RenderError::Compile(
            ErrorContext::new(ctx.path).with_expression(src),
            msg,
        )
    })
}

/// `v-for="item in items"`, `v-for="(item, index) in items"`, or
/// `v-for="(value, key) in map"`.
fn expand_for(
    node: &Handle,
    for_expr: &str,
    scope: &mut ScopeStack,
    ctx: &RenderCtx,
) -> RenderResult<Vec<Handle>> {
    let (vars, iterable_src) = parse_for_expr(for_expr).ok_or_else(|| {
        RenderError::Compile(
            ErrorContext::new(ctx.path).with_expression(for_expr),
            "malformed v-for expression".to_string(),
        )
    })?;
    let iterable = eval_in(ctx, node, scope, &iterable_src)?;

    // Two-variable binding order depends on what's being iterated: seq
    // binds (item, index), map binds (key, value) — see §4.6 examples.
    let entries: Vec<(Value, Value)> = match &iterable {
        Value::Seq(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (v.clone(), Value::Int(i as i64)))
            .collect(),
        Value::Map(map) => map
            .iter()
            .map(|(k, v)| (Value::Str(k.clone()), v.clone()))
            .collect(),
        Value::Str(s) => s
            .chars()
            .enumerate()
            .map(|(i, c)| (Value::Str(c.to_string()), Value::Int(i as i64)))
            .collect(),
        _ => vec![],
    };

    // Stamp v-once identity markers on the shared, not-yet-cloned body
    // before it's deep-cloned once per iteration below, so every clone's
    // copy of "the same" v-once element carries the same marker value.
    let mut once_counter = 0usize;
    stamp_once_ids(node, &mut once_counter);

    let mut out = Vec::new();
    for (item, index) in entries {
        ctx.cancel.check(ErrorContext::new(ctx.path))?;
        let mut frame = Frame::new().with(vars.item.clone(), item);
        if let Some(index_name) = &vars.index {
            frame.set(index_name.clone(), index);
        }
        scope.push(frame);
        let clone = dom::clone_deep(node);
        let expanded = walk_one(clone, scope, ctx)?;
        scope.pop();
        out.extend(expanded);
    }
    Ok(out)
}

const ONCE_MARKER: &str = "data-vuego-once-id";

fn stamp_once_ids(node: &Handle, counter: &mut usize) {
    if !dom::is_element(node) {
        return;
    }
    if dom::has_attr(node, "v-once") && !dom::has_attr(node, ONCE_MARKER) {
        *counter += 1;
        dom::set_attr(node, ONCE_MARKER, &counter.to_string());
    }
    for child in dom::children(node) {
        stamp_once_ids(&child, counter);
    }
}

struct ForVars {
    item: String,
    index: Option<String>,
}

fn parse_for_expr(src: &str) -> Option<(ForVars, String)> {
    let (head, iterable) = src.split_once(" in ")?;
    let head = head.trim();
    let iterable = iterable.trim().to_string();
    if let Some(inner) = head.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        let mut parts = inner.split(',').map(str::trim);
        let item = parts.next()?.to_string();
        let index = parts.next().map(str::to_string);
        Some((ForVars { item, index }, iterable))
    } else {
        Some((
            ForVars {
                item: head.to_string(),
                index: None,
            },
            iterable,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_for() {
        let (vars, it) = parse_for_expr("item in items").unwrap();
        assert_eq!(vars.item, "item");
        assert_eq!(vars.index, None);
        assert_eq!(it, "items");
    }

    #[test]
    fn parses_indexed_for() {
        let (vars, it) = parse_for_expr("(item, i) in items").unwrap();
        assert_eq!(vars.item, "item");
        assert_eq!(vars.index.as_deref(), Some("i"));
        assert_eq!(it, "items");
    }
}
