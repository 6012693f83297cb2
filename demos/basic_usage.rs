// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic sphinx-search usage example.
//!
//! Demonstrates:
//! 1. Connecting to a local Manticore/Sphinx daemon over SphinxQL
//! 2. Creating and loading a small RT index
//! 3. A single query, a filtered query and an extended sort, batched
//! 4. Keywords and snippets
//! 5. Displaying metrics
//!
//! # Prerequisites
//!
//! A daemon listening for SphinxQL on 127.0.0.1:9306:
//! ```bash
//! docker run -d -p 9306:9306 manticoresearch/manticore:6.3.6
//! ```
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! ```

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use sphinx_search::{
    FilterSpec, MySqlWire, QlConnection, Query, SearchCriteria, SortMode, SphinxConfig,
    SphinxConnection, SqlWire,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("failed to install metrics recorder");

    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║           sphinx-search: Basic Usage Example                  ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Connect
    // ─────────────────────────────────────────────────────────────────────────
    let config = SphinxConfig {
        port: 9306,
        query_timeout_ms: Some(3_000),
        ..Default::default()
    };
    println!("🔌 Connecting to {}...", config.server());
    let mut conn = QlConnection::from_config(&config, MySqlWire::new()?);
    conn.open()?;

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Load a demo index
    // ─────────────────────────────────────────────────────────────────────────
    println!("📝 Loading demo index...");
    conn.wire_mut().execute(&[
        "DROP TABLE IF EXISTS demo_articles".to_string(),
        "CREATE TABLE demo_articles(title text, user_id int, rating float)".to_string(),
        "INSERT INTO demo_articles(id, title, user_id, rating) VALUES \
         (1, 'First Article with Title', 1000, 1.4), \
         (2, 'Second Article with Title', 2000, 30.2), \
         (3, 'Third Article with Title', 3000, 0.4), \
         (4, 'Fourth Article with Title', 4000, 0.0)"
            .to_string(),
    ])?;

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Batch three queries into one round trip
    // ─────────────────────────────────────────────────────────────────────────
    let mut filtered = SearchCriteria::new();
    filtered.add_filter(FilterSpec::new("user_id", vec![1000, 2000]))?;

    let mut sorted = SearchCriteria::new();
    sorted.set_sort_mode(SortMode::Extended);
    sorted.add_orders([("rating", "desc"), ("id", "asc")])?;

    let queries = [
        Query::with_indexes("First Article with Title", "demo_articles"),
        Query::with_criteria("", "demo_articles", filtered),
        Query::with_criteria("Article", "demo_articles", sorted),
    ];
    println!("\n🔍 Running {} queries...", queries.len());
    for (query, result) in queries.iter().zip(conn.execute_queries(&queries)?) {
        println!(
            "   {:?}: {} of {} found",
            query.text(),
            result.found(),
            result.found_total()
        );
        for m in &result {
            println!(
                "      #{} weight={} user_id={} rating={}",
                m.id(),
                m.weight(),
                m.try_get_attribute("user_id").cloned().unwrap_or_default(),
                m.try_get_attribute("rating").cloned().unwrap_or_default(),
            );
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Keywords and snippets
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🔤 Keywords:");
    for kw in conn.build_keywords("First Articles", "demo_articles", true)? {
        println!("   {} → {} (docs={:?})", kw.tokenized, kw.normalized, kw.docs);
    }

    println!("\n✂️  Snippets:");
    let docs = vec!["The First Article with Title, and some more text".to_string()];
    for snippet in conn.build_excerpts(&docs, "demo_articles", "first", &Default::default())? {
        println!("   {snippet}");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 5. Metrics
    // ─────────────────────────────────────────────────────────────────────────
    dump_metrics(&snapshotter);

    conn.close()?;
    println!("\n✅ Done");
    Ok(())
}

fn dump_metrics(snapshotter: &Snapshotter) {
    let snapshot = snapshotter.snapshot();
    let mut lines = Vec::new();

    for (composite_key, _, _, value) in snapshot.into_vec() {
        let (_, key) = composite_key.into_parts();
        let labels: Vec<_> = key
            .labels()
            .map(|l| format!("{}={}", l.key(), l.value()))
            .collect();
        let rendered = match value {
            DebugValue::Counter(v) => format!("{v}"),
            DebugValue::Gauge(v) => format!("{}", v.into_inner()),
            DebugValue::Histogram(samples) => {
                let sum: f64 = samples.iter().map(|v| v.into_inner()).sum();
                format!("count={} sum={sum:.4}", samples.len())
            }
        };
        lines.push(format!("{}{{{}}} {rendered}", key.name(), labels.join(",")));
    }

    lines.sort();
    println!("\n📊 Metrics:");
    for line in lines {
        println!("   {line}");
    }
}
