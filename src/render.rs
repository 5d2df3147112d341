//! Serializes a post-rewrite DOM to a writer, honoring void elements,
//! raw-text verbatim content, `<pre>` whitespace, and attribute escaping.
//!
//! By the time a tree reaches here every `v-*`, `:…`, and `{{ … }}` token
//! has already been consumed by the Directive Engine — this module's only
//! job is mechanical HTML serialization.

use crate::dom::{self};
use markup5ever_rcdom::{Handle, NodeData};
use std::fmt::Write as _;

pub fn render_to_string(roots: &[Handle], insert_final_newline: bool) -> String {
    let mut out = String::new();
    for root in roots {
        render_node(root, &mut out);
    }
    if insert_final_newline && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// `<pre>`'s "preserve whitespace exactly" requirement needs no special
/// handling here: text nodes carry the source's literal whitespace and
/// nothing in this serializer collapses or reformats it. Only true raw-text
/// elements (`script`, `style`) skip escaping.
fn render_node(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Document => {
            for child in dom::children(handle) {
                render_node(&child, out);
            }
        }
        NodeData::Doctype { name, .. } => {
            let _ = write!(out, "<!DOCTYPE {}>", name);
        }
        NodeData::Comment { contents } => {
            let _ = write!(out, "<!--{}-->", contents);
        }
        NodeData::Text { contents } => {
            out.push_str(&crate::encode::html(&contents.borrow()));
        }
        NodeData::Element { name, .. } => {
            let tag = name.local.to_string();
            out.push('<');
            out.push_str(&tag);
            for (attr_name, value) in dom::attrs(handle) {
                write_attr(out, &attr_name, &value);
            }
            out.push('>');

            if dom::is_void_element(&tag) {
                return;
            }

            let raw = dom::is_raw_text_element(&tag);
            for child in dom::children(handle) {
                if raw {
                    if let Some(text) = dom::text_contents(&child) {
                        out.push_str(&text);
                        continue;
                    }
                }
                render_node(&child, out);
            }

            let _ = write!(out, "</{}>", tag);
        }
        NodeData::ProcessingInstruction { .. } => {}
    }
}

/// A boolean attribute with an empty value renders bare (`disabled`, not
/// `disabled=""`); everything else is double-quoted with `"` escaped.
fn write_attr(out: &mut String, name: &str, value: &str) {
    if dom::is_boolean_attribute(name) && value.is_empty() {
        out.push(' ');
        out.push_str(name);
        return;
    }
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&crate::encode::attr(value));
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{append_child, new_element, new_text};

    #[test]
    fn void_element_has_no_closing_tag() {
        let el = new_element("br", vec![]);
        assert_eq!(render_to_string(&[el], false), "<br>");
    }

    #[test]
    fn boolean_attribute_renders_bare() {
        let el = new_element("input", vec![("disabled".into(), "".into())]);
        assert_eq!(render_to_string(&[el], false), "<input disabled>");
    }

    #[test]
    fn raw_text_element_is_not_escaped() {
        let el = new_element("script", vec![]);
        append_child(&el, new_text("if (1 < 2) {}"));
        assert_eq!(
            render_to_string(&[el], false),
            "<script>if (1 < 2) {}</script>"
        );
    }

    #[test]
    fn ordinary_text_is_escaped() {
        let el = new_element("p", vec![]);
        append_child(&el, new_text("<b>"));
        assert_eq!(render_to_string(&[el], false), "<p>&lt;b&gt;</p>");
    }

    #[test]
    fn pre_preserves_whitespace_but_still_escapes() {
        let el = new_element("pre", vec![]);
        append_child(&el, new_text("  a < b\n  c  "));
        assert_eq!(
            render_to_string(&[el], false),
            "<pre>  a &lt; b\n  c  </pre>"
        );
    }

    #[test]
    fn final_newline_appended_when_requested() {
        let el = new_element("p", vec![]);
        assert_eq!(render_to_string(&[el], true), "<p></p>\n");
    }
}
