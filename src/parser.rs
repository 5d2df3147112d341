//! Parses template bytes into a DOM forest, auto-detecting full document vs.
//! fragment and stripping an optional YAML front-matter block.

use crate::error::{ErrorContext, RenderError, RenderResult};
use html5ever::driver::ParseOpts;
use html5ever::tendril::TendrilSink;
use html5ever::{local_name, namespace_url, ns, parse_document, parse_fragment, QualName};
use markup5ever_rcdom::{Handle, RcDom};

/// Front matter exposed to callers as a side structure; the engine itself
/// never reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter(pub serde_json::Value);

pub struct ParsedTemplate {
    pub roots: Vec<Handle>,
    pub front_matter: FrontMatter,
}

/// Strips a `---`-delimited YAML block at the very start of the source.
/// Returns the remaining bytes and the parsed front matter (empty object
/// when none is present).
fn strip_front_matter(source: &str) -> (&str, FrontMatter) {
    let Some(rest) = source.strip_prefix("---") else {
        return (source, FrontMatter(serde_json::Value::Null));
    };
    // Front matter must start on its own line.
    let rest = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n"));
    let Some(rest) = rest else {
        return (source, FrontMatter(serde_json::Value::Null));
    };
    let Some(end) = rest.find("\n---") else {
        return (source, FrontMatter(serde_json::Value::Null));
    };
    let yaml = &rest[..end];
    let after = &rest[end + 4..];
    let after = after.strip_prefix('\n').or_else(|| after.strip_prefix("\r\n")).unwrap_or(after);
    let value: serde_json::Value =
        serde_yaml::from_str(yaml).unwrap_or(serde_json::Value::Null);
    (after, FrontMatter(value))
}

/// Chooses the fragment context node per the leading tag (see spec §4.1):
/// table-scoped elements need a matching context or the HTML5 insertion
/// rules silently drop them.
fn fragment_context(source: &str) -> QualName {
    let lowered = source.trim_start().to_ascii_lowercase();
    let leading = |tag: &str| lowered.starts_with(&format!("<{}", tag));

    let local = if leading("td") || leading("th") {
        local_name!("tr")
    } else if leading("tr") {
        local_name!("tbody")
    } else if leading("thead")
        || leading("tbody")
        || leading("tfoot")
        || leading("caption")
        || leading("colgroup")
    {
        local_name!("table")
    } else if leading("col") {
        local_name!("colgroup")
    } else {
        local_name!("body")
    };
    QualName::new(None, ns!(html), local)
}

fn is_full_document(source: &str) -> bool {
    source.to_ascii_lowercase().contains("</html>")
}

pub fn parse(source_bytes: &[u8], path: &str) -> RenderResult<ParsedTemplate> {
    let source = String::from_utf8_lossy(source_bytes);
    let (body, front_matter) = strip_front_matter(&source);

    let ctx = || ErrorContext::new(path);
    let opts = ParseOpts::default();

    let roots = if is_full_document(body) {
        let dom = parse_document(RcDom::default(), opts)
            .from_utf8()
            .read_from(&mut body.as_bytes())
            .map_err(|e| RenderError::Parse(ctx(), e.to_string()))?;
        dom.document.children.borrow().clone()
    } else {
        let context = fragment_context(body);
        let dom = parse_fragment(RcDom::default(), opts, context, vec![])
            .from_utf8()
            .read_from(&mut body.as_bytes())
            .map_err(|e| RenderError::Parse(ctx(), e.to_string()))?;
        dom.document.children.borrow().clone()
    };

    Ok(ParsedTemplate { roots, front_matter })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_front_matter() {
        let src = "---\ntitle: Hi\n---\n<p>body</p>";
        let (rest, fm) = strip_front_matter(src);
        assert_eq!(rest.trim(), "<p>body</p>");
        assert_eq!(fm.0["title"], "Hi");
    }

    #[test]
    fn no_front_matter_passthrough() {
        let src = "<p>body</p>";
        let (rest, fm) = strip_front_matter(src);
        assert_eq!(rest, src);
        assert_eq!(fm.0, serde_json::Value::Null);
    }

    #[test]
    fn table_fragment_context_keeps_tr() {
        let parsed = parse(b"<tr><td>1</td></tr>", "t.vuego").unwrap();
        assert_eq!(parsed.roots.len(), 1);
        assert_eq!(crate::dom::tag_name(&parsed.roots[0]).as_deref(), Some("tr"));
    }

    #[test]
    fn simple_fragment_parses_as_body_children() {
        let parsed = parse(b"<p>Hello {{ name }}</p>", "t.vuego").unwrap();
        assert_eq!(parsed.roots.len(), 1);
        assert_eq!(crate::dom::tag_name(&parsed.roots[0]).as_deref(), Some("p"));
    }
}
