//! Integration Tests against a real Manticore searchd
//!
//! These tests need Docker. They start a Manticore container, create an RT
//! index over SphinxQL, load the four article rows and then run the same
//! scenarios the in-process tests cover, through `QlConnection<MySqlWire>`.
//!
//! # Running Tests
//! ```bash
//! # Run all integration tests (requires Docker)
//! cargo test --test integration -- --ignored
//! ```
//!
//! The tests are plain `#[test]` functions: `MySqlWire` drives its own
//! current-thread runtime and must not be used from inside another one.

use std::time::Duration;

use serde_json::json;
use sphinx_search::{
    FilterSpec, MySqlWire, QlConnection, Query, SearchCriteria, SortDirection, SortMode,
    SphinxConfig, SphinxConnection, SphinxError, SqlWire,
};
use testcontainers::{clients::Cli, core::WaitFor, Container, GenericImage};

const SPHINXQL_PORT: u16 = 9306;

// =============================================================================
// Container Helpers
// =============================================================================

fn manticore_container(docker: &Cli) -> Container<'_, GenericImage> {
    let image = GenericImage::new("manticoresearch/manticore", "6.3.6")
        .with_exposed_port(SPHINXQL_PORT)
        .with_wait_for(WaitFor::message_on_stdout("accepting connections"));
    docker.run(image)
}

fn config_for(port: u16) -> SphinxConfig {
    SphinxConfig {
        host: "127.0.0.1".into(),
        port,
        connect_timeout_ms: 5_000,
        query_timeout_ms: Some(2_000),
    }
}

/// Opens a connection and loads the article fixtures.
fn seeded_connection(port: u16) -> QlConnection<MySqlWire> {
    let mut conn = QlConnection::from_config(&config_for(port), MySqlWire::new().unwrap());
    conn.open().unwrap();

    let setup = [
        "DROP TABLE IF EXISTS articles".to_string(),
        "CREATE TABLE articles(title text, user_id int, rating float)".to_string(),
        "INSERT INTO articles(id, title, user_id, rating) VALUES \
         (1, 'First Article with Title', 1000, 1.4), \
         (2, 'Second Article with Title', 2000, 30.2), \
         (3, 'Third Article with Title', 3000, 0.4), \
         (4, 'Fourth Article with Title', 4000, 0.0)"
            .to_string(),
    ];
    conn.wire_mut().execute(&setup).unwrap();
    conn
}

// =============================================================================
// Happy Path Tests
// =============================================================================

#[test]
#[ignore] // Requires Docker
fn happy_single_query() {
    let docker = Cli::default();
    let manticore = manticore_container(&docker);
    let mut conn = seeded_connection(manticore.get_host_port_ipv4(SPHINXQL_PORT));

    let result = conn
        .execute_query(&Query::with_indexes("First Article with Title", "articles"))
        .unwrap();

    assert_eq!(result.found(), 1);
    assert_eq!(result.found_total(), 1);
    let first = result.get(0).unwrap();
    assert_eq!(first.id(), 1);
    assert_eq!(first.get_attribute("user_id").unwrap(), &json!(1000));
    assert!(first.try_get_attribute("missing").is_none());
}

#[test]
#[ignore] // Requires Docker
fn happy_filter_batch_and_sort() {
    let docker = Cli::default();
    let manticore = manticore_container(&docker);
    let mut conn = seeded_connection(manticore.get_host_port_ipv4(SPHINXQL_PORT));

    let mut filtered = SearchCriteria::new();
    filtered
        .add_filter(FilterSpec::new("user_id", vec![1000, 2000]))
        .unwrap();

    let mut sorted = SearchCriteria::new();
    sorted.set_sort_mode(SortMode::Extended);
    sorted.add_order("user_id", SortDirection::Desc).unwrap();
    sorted.add_order("id", SortDirection::Asc).unwrap();

    let results = conn
        .execute_queries(&[
            Query::with_criteria("", "articles", filtered),
            Query::with_criteria("Article", "articles", sorted),
        ])
        .unwrap();

    assert_eq!(results.len(), 2);
    let mut ids = results[0].ids();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(results[1].ids(), vec![4, 3, 2, 1]);
    assert_eq!(results[1].found_total(), 4);
}

#[test]
#[ignore] // Requires Docker
fn happy_keywords_and_snippets() {
    let docker = Cli::default();
    let manticore = manticore_container(&docker);
    let mut conn = seeded_connection(manticore.get_host_port_ipv4(SPHINXQL_PORT));

    let keywords = conn.build_keywords("First Article", "articles", true).unwrap();
    assert_eq!(keywords.len(), 2);
    assert_eq!(keywords[0].normalized, "first");
    assert_eq!(keywords[1].docs, Some(4));

    let excerpts = conn
        .build_excerpts(
            &["First Article with Title".into()],
            "articles",
            "first",
            &Default::default(),
        )
        .unwrap();
    assert_eq!(excerpts.len(), 1);
    assert!(excerpts[0].contains("<b>First</b>"));
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
#[ignore] // Requires Docker
fn failure_unknown_index_fails_batch() {
    let docker = Cli::default();
    let manticore = manticore_container(&docker);
    let mut conn = seeded_connection(manticore.get_host_port_ipv4(SPHINXQL_PORT));

    let err = conn
        .execute_queries(&[
            Query::with_indexes("First", "articles"),
            Query::with_indexes("First", "no_such_index"),
        ])
        .unwrap_err();
    assert!(matches!(err, SphinxError::Backend(_)));

    // The connection stays usable.
    assert!(conn.is_connected());
    conn.execute_query(&Query::with_indexes("First", "articles"))
        .unwrap();
}

#[test]
#[ignore] // Requires Docker
fn failure_connect_to_closed_port() {
    let config = SphinxConfig {
        connect_timeout_ms: 500,
        ..config_for(1)
    };
    let mut conn = QlConnection::from_config(&config, MySqlWire::new().unwrap());
    let started = std::time::Instant::now();
    assert!(matches!(conn.open(), Err(SphinxError::Backend(_))));
    assert!(!conn.is_connected());
    assert!(started.elapsed() < Duration::from_secs(5));
}
