//! §5's required safety property: N concurrent renders of the same template
//! against N distinct data inputs must produce output identical to the
//! serial composition of the same renders, exercised against a template with
//! nested includes and `v-for`.

use std::sync::Arc;
use std::thread;
use vuego::{CancellationToken, Engine, MapProvider, Options, Value};

fn build_engine() -> Engine {
    let mut provider = MapProvider::new();
    provider.insert(
        "page.vuego",
        "<article><template include=\"card.vuego\" :items=\"items\" :title=\"title\"></template></article>",
    );
    provider.insert(
        "card.vuego",
        "<section><h1>{{ title }}</h1><ul><li v-for=\"it in items\">{{ it }}</li></ul><template include=\"badge.vuego\" :n=\"items\"></template></section>",
    );
    provider.insert(
        "badge.vuego",
        "<span>{{ n | length }}</span>",
    );
    Engine::new(Arc::new(provider), Options::default())
}

fn render_for(engine: &Engine, n: usize) -> String {
    let data = Value::from(serde_json::json!({
        "title": format!("Title {}", n),
        "items": (0..n % 5 + 1).map(|i| format!("item-{}-{}", n, i)).collect::<Vec<_>>(),
    }));
    engine
        .render_fragment("page.vuego", &data, &CancellationToken::new())
        .expect("render should succeed")
}

#[test]
fn parallel_renders_match_serial_composition() {
    let engine = Arc::new(build_engine());

    let serial: Vec<String> = (0..64).map(|n| render_for(&engine, n)).collect();

    let handles: Vec<_> = (0..64)
        .map(|n| {
            let engine = engine.clone();
            thread::spawn(move || (n, render_for(&engine, n)))
        })
        .collect();

    let mut parallel = vec![String::new(); 64];
    for h in handles {
        let (n, out) = h.join().expect("render thread should not panic");
        parallel[n] = out;
    }

    for n in 0..64 {
        assert_eq!(
            parallel[n], serial[n],
            "render {} diverged between parallel and serial execution",
            n
        );
    }
}

#[test]
fn concurrent_first_compiles_share_one_cache_entry() {
    // All 64 threads race to compile the same uncached template; the single-
    // flight cache must still produce identical, correct output for each.
    let engine = Arc::new(build_engine());
    let handles: Vec<_> = (0..64)
        .map(|_| {
            let engine = engine.clone();
            thread::spawn(move || render_for(&engine, 3))
        })
        .collect();

    let expected = render_for(&engine, 3);
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}
