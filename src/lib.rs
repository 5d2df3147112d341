//! `vuego` — a server-side HTML template engine with Vue-style directives
//! (`{{ expr }}` interpolation, `v-if`, `v-for`, `v-html`, `v-once`,
//! `v-bind`/`:attr` attribute binding, and `<template include>` /
//! `<vuego include>` component composition).
//!
//! Templates are parsed once into a DOM (via [`html5ever`]), compiled
//! expressions and directive rewrites are applied against a caller-supplied
//! data scope, and the result is serialized back to HTML.
//!
//! ```no_run
//! use std::sync::Arc;
//! use vuego::{CancellationToken, Engine, FsProvider, Options, Value};
//!
//! let provider = Arc::new(FsProvider::new("templates"));
//! let engine = Engine::new(provider, Options::default());
//! let data = Value::from(serde_json::json!({"name": "World"}));
//! let html = engine.render("index.vuego", &data, &CancellationToken::new()).unwrap();
//! ```

mod cache;
mod cancel;
mod directives;
mod dom;
mod encode;
mod engine;
mod error;
mod expr;
mod filters;
mod frozen;
mod include;
mod parser;
mod provider;
mod render;
mod scope;
mod value;

pub use cancel::CancellationToken;
pub use engine::{Engine, Options};
pub use error::{ErrorContext, RenderError, RenderResult};
pub use filters::FilterRegistry;
pub use provider::{FileProvider, FsProvider, MapProvider};
pub use value::Value;
