use std::error::Error;
use std::fs;
use std::sync::Arc;
use vuego::{CancellationToken, Engine, FsProvider, Options, Value};

fn main() -> Result<(), Box<dyn Error>> {
    let provider = Arc::new(FsProvider::new("demos/posthaven/templates"));
    let engine = Engine::new(provider, Options::default());

    let data = Value::from(serde_json::json!({
        "title": "Posthaven",
        "year": 2026,
        "nav_items": [
            {"label": "Features", "href": "#features"},
            {"label": "Screenshots", "href": "#screenshots"},
            {"label": "Our pledge", "href": "#pledge"},
            {"label": "Pricing", "href": "#pricing"},
            {"label": "Questions?", "href": "#questions"},
        ],
        "ctas": [
            {"label": "Login", "disabled": false},
            {"label": "Get Started", "disabled": false},
        ],
    }));

    let html = engine.render("index.vuego", &data, &CancellationToken::new())?;
    fs::write("posthaven.html", html)?;
    Ok(())
}
