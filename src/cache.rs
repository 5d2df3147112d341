//! Template cache, keyed by `(path, content fingerprint)`, with
//! single-flight compilation so concurrent renders of the same uncached
//! template block on one compile rather than racing duplicate work.
//!
//! The DOM type the directive walk rewrites (`markup5ever_rcdom::Handle`)
//! is `Rc`-based and therefore neither `Send` nor `Sync`, so the cache
//! can't hold an `Rc` tree across threads directly. It instead holds each
//! template's parsed tree frozen into [`crate::frozen::FrozenNode`] — a
//! plain, owned, `Send + Sync` mirror — and [`crate::frozen::thaw_all`]
//! rebuilds a fresh, independent `Handle` tree from it on every render. This
//! amortizes the expensive part (the `html5ever` parse itself) across
//! concurrent renders of the same template, not just the file read.
//!
//! Expression compilation (§4.4, "each distinct expression string
//! compiles once per Template") is cached separately by source string;
//! unlike template compilation this doesn't need single-flight since
//! compiling twice is merely wasted, never incorrect — it's a pure
//! function of the string.

use crate::error::RenderResult;
use crate::expr::{self, Expr};
use crate::frozen::FrozenNode;
use crate::parser::FrontMatter;
use crate::provider::FileProvider;
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub struct CachedTemplate {
    pub fingerprint: String,
    pub roots: Vec<FrozenNode>,
    pub front_matter: FrontMatter,
}

fn fingerprint(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{:x}", digest)
}

/// A single-flight compilation slot for one `(path, fingerprint)` key.
/// `OnceCell::get_or_try_init` blocks concurrent callers on the same slot
/// until the first one finishes, and — critically — leaves the cell
/// uninitialized if the initializer returns `Err`, so a compile failure is
/// never cached and the next caller retries from scratch.
type Slot = Arc<OnceCell<Arc<CachedTemplate>>>;

pub struct TemplateCache {
    provider: Arc<dyn FileProvider>,
    slots: RwLock<HashMap<String, Slot>>,
    expr_cache: RwLock<HashMap<String, Expr>>,
}

impl TemplateCache {
    pub fn new(provider: Arc<dyn FileProvider>) -> Self {
        Self {
            provider,
            slots: RwLock::new(HashMap::new()),
            expr_cache: RwLock::new(HashMap::new()),
        }
    }

    fn slot_for(&self, key: &str) -> Slot {
        if let Some(slot) = self.slots.read().unwrap().get(key) {
            return slot.clone();
        }
        self.slots
            .write()
            .unwrap()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Reads and fingerprints `path`, returning the cached, already-parsed
    /// entry if one already matches that exact content. Concurrent callers
    /// racing on a miss for the same `(path, fingerprint)` block on that
    /// key's slot and share the one parse; a compile failure is never
    /// stored, so the next caller retries.
    pub fn get_or_compile(&self, path: &str) -> RenderResult<Arc<CachedTemplate>> {
        let bytes = self.provider.read(path)?;
        let fp = fingerprint(&bytes);
        let key = format!("{}#{}", path, fp);
        let slot = self.slot_for(&key);

        slot.get_or_try_init(|| {
            let parsed = crate::parser::parse(&bytes, path)?;
            Ok(Arc::new(CachedTemplate {
                fingerprint: fp.clone(),
                roots: crate::frozen::freeze_all(&parsed.roots),
                front_matter: parsed.front_matter,
            }))
        })
        .map(Arc::clone)
    }

    pub fn compile_expr(&self, src: &str) -> Result<Expr, String> {
        if let Some(hit) = self.expr_cache.read().unwrap().get(src) {
            return Ok(hit.clone());
        }
        let compiled = expr::compile(src)?;
        self.expr_cache
            .write()
            .unwrap()
            .insert(src.to_string(), compiled.clone());
        Ok(compiled)
    }
}
