//! Public entry point: `Engine::new` plus `render`/`render_fragment`/
//! `render_source`, matching §6.2's `New`/`Register`/`RegisterComponent`/
//! `Render`/`RenderFragment`/`RenderSource` surface.

use crate::cache::TemplateCache;
use crate::cancel::CancellationToken;
use crate::directives::{self, RenderCtx};
use crate::error::RenderResult;
use crate::filters::FilterRegistry;
use crate::provider::FileProvider;
use crate::render::render_to_string;
use crate::scope::ScopeStack;
use crate::value::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Construction-time knobs; unset fields fall back to these defaults.
#[derive(Debug, Clone)]
pub struct Options {
    pub layout: Option<String>,
    pub strict_undefined: bool,
    pub insert_final_newline: bool,
    pub components_enabled: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            layout: None,
            strict_undefined: false,
            insert_final_newline: false,
            components_enabled: false,
        }
    }
}

pub struct Engine {
    provider: Arc<dyn FileProvider>,
    cache: TemplateCache,
    filters: FilterRegistry,
    components: IndexMap<String, String>,
    options: Options,
}

impl Engine {
    pub fn new(provider: Arc<dyn FileProvider>, options: Options) -> Self {
        Self {
            cache: TemplateCache::new(provider.clone()),
            provider,
            filters: FilterRegistry::new(),
            components: IndexMap::new(),
            options,
        }
    }

    pub fn register<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(&Value, &[Value]) -> Result<Value, crate::error::RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.filters.register(name, filter);
    }

    pub fn register_component(&mut self, tag_name: impl Into<String>, path: impl Into<String>) {
        self.components.insert(tag_name.into(), path.into());
    }

    /// Renders `path` as a full document, applying `options.layout` (if
    /// set) around the result.
    pub fn render(
        &self,
        path: &str,
        data: &Value,
        cancel: &CancellationToken,
    ) -> RenderResult<String> {
        let body = self.render_fragment(path, data, cancel)?;
        match &self.options.layout {
            Some(layout_path) => self.render_with_layout(layout_path, data, body, cancel),
            None => Ok(body),
        }
    }

    /// Renders `path` without ever applying `options.layout` — useful for
    /// partial re-renders that shouldn't be wrapped in page chrome.
    pub fn render_fragment(
        &self,
        path: &str,
        data: &Value,
        cancel: &CancellationToken,
    ) -> RenderResult<String> {
        debug!(template = path, "rendering template");
        let cached = self.cache.get_or_compile(path)?;
        let roots = crate::frozen::thaw_all(&cached.roots);
        self.render_roots(path, roots, data, cancel)
    }

    /// Renders template source passed directly as bytes, bypassing the
    /// file-backed cache entirely (still shares the expression cache). Not
    /// cacheable by path/fingerprint since there's no stable path to key on.
    pub fn render_source(
        &self,
        bytes: &[u8],
        data: &Value,
        cancel: &CancellationToken,
    ) -> RenderResult<String> {
        let parsed = crate::parser::parse(bytes, "<inline>")?;
        self.render_roots("<inline>", parsed.roots, data, cancel)
    }

    fn render_with_layout(
        &self,
        layout_path: &str,
        data: &Value,
        content: String,
        cancel: &CancellationToken,
    ) -> RenderResult<String> {
        let mut merged = match data {
            Value::Map(m) => m.clone(),
            _ => IndexMap::new(),
        };
        merged.insert("content".to_string(), Value::Str(content));
        self.render_fragment(layout_path, &Value::Map(merged), cancel)
    }

    fn render_roots(
        &self,
        path: &str,
        roots: Vec<markup5ever_rcdom::Handle>,
        data: &Value,
        cancel: &CancellationToken,
    ) -> RenderResult<String> {
        let mut scope = ScopeStack::new(data.clone());
        let once_seen = RefCell::new(HashSet::new());
        let includes = RefCell::new(crate::include::IncludeStack::new());
        let ctx = RenderCtx::new(
            &self.filters,
            &self.cache,
            path,
            self.options.components_enabled,
            self.options.strict_undefined,
            &self.components,
            cancel,
            &once_seen,
            &includes,
        );
        let rendered = directives::walk(roots, &mut scope, &ctx)?;
        Ok(render_to_string(&rendered, self.options.insert_final_newline))
    }

    pub fn provider(&self) -> &Arc<dyn FileProvider> {
        &self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MapProvider;
    use serde_json::json;

    fn engine_with(templates: &[(&str, &str)]) -> Engine {
        let mut provider = MapProvider::new();
        for (path, src) in templates {
            provider.insert(*path, *src);
        }
        Engine::new(Arc::new(provider), Options::default())
    }

    #[test]
    fn renders_interpolation() {
        let engine = engine_with(&[("t.vuego", "<p>Hello {{ name }}</p>")]);
        let data = Value::from(json!({"name": "World"}));
        let out = engine
            .render_fragment("t.vuego", &data, &CancellationToken::new())
            .unwrap();
        assert_eq!(out, "<p>Hello World</p>");
    }

    #[test]
    fn renders_v_for_with_index() {
        let engine = engine_with(&[(
            "t.vuego",
            "<ul><li v-for=\"(it,i) in xs\">{{ i }}:{{ it }}</li></ul>",
        )]);
        let data = Value::from(json!({"xs": ["a", "b"]}));
        let out = engine
            .render_fragment("t.vuego", &data, &CancellationToken::new())
            .unwrap();
        assert_eq!(out, "<ul><li>0:a</li><li>1:b</li></ul>");
    }

    #[test]
    fn v_once_inside_v_for_renders_once() {
        let engine = engine_with(&[(
            "t.vuego",
            "<div v-for=\"x in xs\"><script v-once>/*s*/</script><p>{{ x }}</p></div>",
        )]);
        let data = Value::from(json!({"xs": ["a", "b", "c"]}));
        let out = engine
            .render_fragment("t.vuego", &data, &CancellationToken::new())
            .unwrap();
        assert_eq!(out.matches("<script>").count(), 1);
        assert_eq!(out.matches("<p>").count(), 3);
    }

    #[test]
    fn component_prop_and_required() {
        let engine = engine_with(&[
            (
                "parent.vuego",
                "<template include=\"c.vuego\" :name=\"who\"></template>",
            ),
            ("c.vuego", "<span :required=\"name\">{{ name }}</span>"),
        ]);
        let ok = engine
            .render_fragment(
                "parent.vuego",
                &Value::from(json!({"who": "X"})),
                &CancellationToken::new(),
            )
            .unwrap();
        assert_eq!(ok, "<span>X</span>");

        let err = engine.render_fragment(
            "parent.vuego",
            &Value::from(json!({})),
            &CancellationToken::new(),
        );
        assert!(matches!(
            err,
            Err(crate::error::RenderError::RequiredProp(_, _))
        ));
    }

    #[test]
    fn pipe_filter() {
        let engine = engine_with(&[("t.vuego", "<p>{{ name | upper }}</p>")]);
        let out = engine
            .render_fragment(
                "t.vuego",
                &Value::from(json!({"name": "user"})),
                &CancellationToken::new(),
            )
            .unwrap();
        assert_eq!(out, "<p>USER</p>");
    }

    #[test]
    fn bound_boolean_attribute() {
        let engine = engine_with(&[("t.vuego", "<input :disabled=\"flag\">")]);
        let on = engine
            .render_fragment(
                "t.vuego",
                &Value::from(json!({"flag": true})),
                &CancellationToken::new(),
            )
            .unwrap();
        assert_eq!(on, "<input disabled>");
        let off = engine
            .render_fragment(
                "t.vuego",
                &Value::from(json!({"flag": false})),
                &CancellationToken::new(),
            )
            .unwrap();
        assert_eq!(off, "<input>");
    }

    #[test]
    fn include_cycle_is_detected() {
        let engine = engine_with(&[
            ("a.vuego", "<vuego include=\"b.vuego\"></vuego>"),
            ("b.vuego", "<vuego include=\"a.vuego\"></vuego>"),
        ]);
        let err = engine.render_fragment(
            "a.vuego",
            &Value::from(json!({})),
            &CancellationToken::new(),
        );
        assert!(matches!(
            err,
            Err(crate::error::RenderError::IncludeCycle(_, _))
        ));
    }
}
