//! Error kinds for the template engine.
//!
//! One variant per error kind named in the engine's error-handling design:
//! `NotFound`, `Parse`, `Compile`, `Evaluate`, `RequiredProp`, `IncludeCycle`,
//! `Cancelled`, `IO`. Every variant carries the source path and, where
//! available, the expression text and surrounding element tag.

use std::fmt;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Where in a template an error occurred, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    pub path: String,
    pub expression: Option<String>,
    pub tag: Option<String>,
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        if let Some(tag) = &self.tag {
            write!(f, " <{}>", tag)?;
        }
        if let Some(expr) = &self.expression {
            write!(f, " `{}`", expr)?;
        }
        Ok(())
    }
}

impl ErrorContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expression: None,
            tag: None,
        }
    }

    pub fn with_expression(mut self, expr: impl Into<String>) -> Self {
        self.expression = Some(expr.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

#[derive(Error, Debug, Clone)]
pub enum RenderError {
    #[error("template not found: {0}")]
    NotFound(ErrorContext),

    #[error("parse error in {0}: {1}")]
    Parse(ErrorContext, String),

    #[error("compile error in {0}: {1}")]
    Compile(ErrorContext, String),

    #[error("evaluation error in {0}: {1}")]
    Evaluate(ErrorContext, String),

    #[error("missing required prop(s) in {0}: {1}")]
    RequiredProp(ErrorContext, String),

    #[error("include cycle detected in {0}: {1}")]
    IncludeCycle(ErrorContext, String),

    #[error("render cancelled at {0}")]
    Cancelled(ErrorContext),

    #[error("io error in {0}: {1}")]
    Io(ErrorContext, Arc<io::Error>),
}

impl RenderError {
    pub fn context(&self) -> &ErrorContext {
        match self {
            RenderError::NotFound(c)
            | RenderError::Parse(c, _)
            | RenderError::Compile(c, _)
            | RenderError::Evaluate(c, _)
            | RenderError::RequiredProp(c, _)
            | RenderError::IncludeCycle(c, _)
            | RenderError::Cancelled(c)
            | RenderError::Io(c, _) => c,
        }
    }

    pub fn io(ctx: ErrorContext, err: io::Error) -> Self {
        RenderError::Io(ctx, Arc::new(err))
    }

    /// Fills in path/tag on an error raised without template context (e.g.
    /// from the expression evaluator, which doesn't know where it's being
    /// called from). Leaves an already-populated path untouched.
    pub fn with_context(mut self, path: &str, tag: Option<&str>) -> Self {
        let ctx = match &mut self {
            RenderError::NotFound(c)
            | RenderError::Parse(c, _)
            | RenderError::Compile(c, _)
            | RenderError::Evaluate(c, _)
            | RenderError::RequiredProp(c, _)
            | RenderError::IncludeCycle(c, _)
            | RenderError::Cancelled(c)
            | RenderError::Io(c, _) => c,
        };
        if ctx.path.is_empty() {
            ctx.path = path.to_string();
        }
        if ctx.tag.is_none() {
            ctx.tag = tag.map(|t| t.to_string());
        }
        self
    }
}

pub type RenderResult<T> = Result<T, RenderError>;
