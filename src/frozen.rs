//! A plain, owned, `Send + Sync` mirror of a parsed template DOM — this is
//! what the Template Cache actually stores. `markup5ever_rcdom::Handle` is
//! `Rc`-based and can't cross a thread boundary, so a tree built by one
//! render can never be handed to another; `FrozenNode` can, and [`thaw`]
//! rebuilds a fresh, independent `Handle` tree from it for each render to
//! mutate freely. Grounded on `zenithbuild-zenith-compiler`'s
//! `TemplateNode`/`ElementNode`/`TextNode`/`DoctypeNode` IR (`validate.rs`),
//! which exists for the same reason there: an owned tree that can leave the
//! thread its `rcdom` parse happened on.

use crate::dom::{self};
use markup5ever_rcdom::{Handle, NodeData};

#[derive(Debug, Clone)]
pub enum FrozenNode {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<FrozenNode>,
    },
    Text(String),
    Comment(String),
    Doctype(String),
}

fn freeze(handle: &Handle) -> FrozenNode {
    match &handle.data {
        NodeData::Element { name, attrs, .. } => FrozenNode::Element {
            tag: name.local.to_string(),
            attrs: attrs
                .borrow()
                .iter()
                .map(|a| (a.name.local.to_string(), a.value.to_string()))
                .collect(),
            children: dom::children(handle).iter().map(freeze).collect(),
        },
        NodeData::Text { contents } => FrozenNode::Text(contents.borrow().to_string()),
        NodeData::Comment { contents } => FrozenNode::Comment(contents.to_string()),
        NodeData::Doctype { name, .. } => FrozenNode::Doctype(name.to_string()),
        // Document/ProcessingInstruction never appear among a parsed
        // template's roots or their descendants.
        _ => FrozenNode::Text(String::new()),
    }
}

fn thaw(frozen: &FrozenNode) -> Handle {
    match frozen {
        FrozenNode::Element { tag, attrs, children } => {
            let el = dom::new_element(tag, attrs.clone());
            let kids = children.iter().map(thaw).collect();
            dom::set_children(&el, kids);
            el
        }
        FrozenNode::Text(s) => dom::new_text(s.clone()),
        FrozenNode::Comment(s) => dom::new_comment(s.clone()),
        FrozenNode::Doctype(s) => dom::new_doctype(s.clone()),
    }
}

pub fn freeze_all(roots: &[Handle]) -> Vec<FrozenNode> {
    roots.iter().map(freeze).collect()
}

pub fn thaw_all(frozen: &[FrozenNode]) -> Vec<Handle> {
    frozen.iter().map(thaw).collect()
}
