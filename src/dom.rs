//! DOM primitives: node/attribute access, clone operations, and the static
//! element classification tables the renderer and directive walker consult.
//!
//! The tree itself is `markup5ever_rcdom`'s `Handle`/`NodeData` rather than a
//! hand-rolled arena — its parent/first-child/next-sibling node model already
//! gives us everything a directive rewrite needs, attribute order included.

use html5ever::{Attribute, LocalName, QualName, ns};
use markup5ever_rcdom::{Handle, Node, NodeData};
use std::cell::RefCell;
use std::rc::Rc;

pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// HTML boolean attributes (WHATWG "Boolean attribute" glossary entry):
/// present with no value means true, absent means false.
pub const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "allowfullscreen",
    "async",
    "autofocus",
    "autoplay",
    "checked",
    "controls",
    "default",
    "defer",
    "disabled",
    "formnovalidate",
    "hidden",
    "inert",
    "ismap",
    "itemscope",
    "loop",
    "multiple",
    "muted",
    "nomodule",
    "novalidate",
    "open",
    "playsinline",
    "readonly",
    "required",
    "reversed",
    "selected",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

pub fn is_boolean_attribute(name: &str) -> bool {
    BOOLEAN_ATTRIBUTES.contains(&name.to_ascii_lowercase().as_str())
}

pub fn tag_name(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

pub fn is_element(handle: &Handle) -> bool {
    matches!(handle.data, NodeData::Element { .. })
}

pub fn is_text(handle: &Handle) -> bool {
    matches!(handle.data, NodeData::Text { .. })
}

fn qualname(name: &str) -> QualName {
    QualName::new(None, ns!(), LocalName::from(name))
}

pub fn new_element(tag: &str, attrs: Vec<(String, String)>) -> Handle {
    let attrs = attrs
        .into_iter()
        .map(|(k, v)| Attribute {
            name: qualname(&k),
            value: v.into(),
        })
        .collect();
    Node::new(NodeData::Element {
        name: qualname(tag),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

pub fn new_text(content: impl Into<String>) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(content.into().into()),
    })
}

pub fn new_comment(content: impl Into<String>) -> Handle {
    Node::new(NodeData::Comment {
        contents: content.into().into(),
    })
}

/// `public_id`/`system_id` are never round-tripped (the renderer only ever
/// emits the bare `<!DOCTYPE name>` form), so `thaw`ing a cached doctype
/// node always reconstructs them as empty.
pub fn new_doctype(name: impl Into<String>) -> Handle {
    Node::new(NodeData::Doctype {
        name: name.into().into(),
        public_id: "".into(),
        system_id: "".into(),
    })
}

pub fn append_child(parent: &Handle, child: Handle) {
    *child.parent.borrow_mut() = Some(Rc::downgrade(parent));
    parent.children.borrow_mut().push(child);
}

/// Ordered list of (name, value) pairs in source order. Attribute values
/// on void/boolean attributes are returned verbatim; bareness is a render
/// concern, not a storage concern.
pub fn attrs(handle: &Handle) -> Vec<(String, String)> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .map(|a| (a.name.local.to_string(), a.value.to_string()))
            .collect(),
        _ => vec![],
    }
}

pub fn get_attr(handle: &Handle, name: &str) -> Option<String> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == name)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

pub fn has_attr(handle: &Handle, name: &str) -> bool {
    get_attr(handle, name).is_some()
}

/// Sets (or, if present, overwrites — "later wins") an attribute, preserving
/// first-insertion position in the ordered list.
pub fn set_attr(handle: &Handle, name: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &handle.data {
        let mut attrs = attrs.borrow_mut();
        if let Some(existing) = attrs.iter_mut().find(|a| &*a.name.local == name) {
            existing.value = value.into();
        } else {
            attrs.push(Attribute {
                name: qualname(name),
                value: value.into(),
            });
        }
    }
}

pub fn remove_attr(handle: &Handle, name: &str) -> Option<String> {
    if let NodeData::Element { attrs, .. } = &handle.data {
        let mut attrs = attrs.borrow_mut();
        let idx = attrs.iter().position(|a| &*a.name.local == name)?;
        Some(attrs.remove(idx).value.to_string())
    } else {
        None
    }
}

/// Removes and returns every attribute whose name matches `predicate`,
/// preserving the relative order they appeared in.
pub fn filter_attrs(handle: &Handle, predicate: impl Fn(&str) -> bool) -> Vec<(String, String)> {
    if let NodeData::Element { attrs, .. } = &handle.data {
        let mut attrs = attrs.borrow_mut();
        let mut taken = Vec::new();
        attrs.retain(|a| {
            let name = a.name.local.to_string();
            if predicate(&name) {
                taken.push((name, a.value.to_string()));
                false
            } else {
                true
            }
        });
        taken
    } else {
        vec![]
    }
}

pub fn count_children(handle: &Handle) -> usize {
    handle.children.borrow().len()
}

pub fn children(handle: &Handle) -> Vec<Handle> {
    handle.children.borrow().clone()
}

pub fn set_children(handle: &Handle, new_children: Vec<Handle>) {
    for child in &new_children {
        *child.parent.borrow_mut() = Some(Rc::downgrade(handle));
    }
    *handle.children.borrow_mut() = new_children;
}

/// Attributes shared, children discarded. `rcdom`'s `NodeData::Element`
/// owns a plain (non-`Rc`) `RefCell<Vec<Attribute>>`, so two distinct
/// `Handle`s can never literally alias one attribute list — there is no
/// live-mutation sharing to offer beyond what [`clone_with_attrs`] already
/// gives. What *is* shared, in both, is the expensive part: `Attribute`'s
/// `StrTendril` value and interned `QualName` are cheap, ref-counted clones,
/// so neither primitive ever duplicates attribute-string bytes. Kept as its
/// own named entry point (rather than only `clone_with_attrs`) so callers
/// that mean "I just want a shallow peer of this node" aren't reading
/// `clone_with_attrs` and wondering if it's the deep-clone helper.
pub fn clone_shallow(handle: &Handle) -> Handle {
    clone_with_attrs(handle)
}

/// Attributes copied, children discarded — used when a directive wants a
/// fresh element carrying its own attribute list but builds children itself.
pub fn clone_with_attrs(handle: &Handle) -> Handle {
    match &handle.data {
        NodeData::Element { name, attrs, .. } => Node::new(NodeData::Element {
            name: name.clone(),
            attrs: RefCell::new(attrs.borrow().clone()),
            template_contents: RefCell::new(None),
            mathml_annotation_xml_integration_point: false,
        }),
        NodeData::Text { contents } => Node::new(NodeData::Text {
            contents: RefCell::new(contents.borrow().clone()),
        }),
        NodeData::Comment { contents } => Node::new(NodeData::Comment {
            contents: contents.clone(),
        }),
        _ => Node::new(NodeData::Text {
            contents: RefCell::new("".into()),
        }),
    }
}

/// Full subtree copy with correct parent/sibling wiring. The parsed
/// template DOM is never mutated after publication — renders clone before
/// rewriting, which is what this is for.
pub fn clone_deep(handle: &Handle) -> Handle {
    let clone = clone_with_attrs(handle);
    let cloned_children: Vec<Handle> = handle.children.borrow().iter().map(clone_deep).collect();
    set_children(&clone, cloned_children);
    clone
}

pub fn text_contents(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

pub fn set_text_contents(handle: &Handle, text: &str) {
    if let NodeData::Text { contents } = &handle.data {
        *contents.borrow_mut() = text.into();
    }
}
