//! Template source lookup. `FileProvider` is the seam between the engine
//! and wherever template bytes actually live; `FsProvider` is the minimal
//! filesystem-backed implementation most callers reach for.

use crate::error::{ErrorContext, RenderError, RenderResult};
use std::path::{Path, PathBuf};

pub trait FileProvider: Send + Sync {
    /// Reads the raw bytes for `path`. `path` is whatever string appeared
    /// in an include directive or was passed to `Engine::render`; it is
    /// the provider's job to interpret it (join against a root, look up a
    /// map, etc).
    fn read(&self, path: &str) -> RenderResult<Vec<u8>>;
}

/// Resolves paths relative to a root directory on disk; `..` segments are
/// rejected so templates can't escape the root via a crafted include path.
pub struct FsProvider {
    root: PathBuf,
}

impl FsProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        if Path::new(path)
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return None;
        }
        Some(self.root.join(path))
    }
}

impl FileProvider for FsProvider {
    fn read(&self, path: &str) -> RenderResult<Vec<u8>> {
        let ctx = ErrorContext::new(path);
        let resolved = self
            .resolve(path)
            .ok_or_else(|| RenderError::NotFound(ctx.clone()))?;
        std::fs::read(&resolved).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RenderError::NotFound(ctx)
            } else {
                RenderError::io(ctx, e)
            }
        })
    }
}

/// In-memory provider, mainly for tests: templates keyed by path string.
#[derive(Default)]
pub struct MapProvider {
    templates: std::collections::HashMap<String, Vec<u8>>,
}

impl MapProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<Vec<u8>>) -> &mut Self {
        self.templates.insert(path.into(), source.into());
        self
    }
}

impl FileProvider for MapProvider {
    fn read(&self, path: &str) -> RenderResult<Vec<u8>> {
        self.templates
            .get(path)
            .cloned()
            .ok_or_else(|| RenderError::NotFound(ErrorContext::new(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_provider_round_trip() {
        let mut p = MapProvider::new();
        p.insert("a.vuego", "<p>hi</p>");
        assert_eq!(p.read("a.vuego").unwrap(), b"<p>hi</p>");
        assert!(p.read("missing.vuego").is_err());
    }

    #[test]
    fn fs_provider_rejects_parent_dir_escape() {
        let p = FsProvider::new("/tmp/vuego-root");
        assert!(p.read("../../etc/passwd").is_err());
    }
}
