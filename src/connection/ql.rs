// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Connection over SphinxQL.
//!
//! Each query becomes a `SELECT` followed by `SHOW META`; a batch sends all
//! statement pairs in one `execute` call on the wire and pairs the returned
//! row sets back up positionally. Rows are reshaped into the same
//! `{id, weight, attrs}` form the binary protocol produces.

use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::traits::{ExcerptOptions, Keyword, SphinxConnection};
use crate::config::{ServerAddr, SphinxConfig};
use crate::error::{Result, SphinxError};
use crate::metrics::{self, LatencyTimer};
use crate::ql::statement::escape_query_text;
use crate::ql::translator::{batch_statements, keywords_statement, snippets_statement};
use crate::query::Query;
use crate::result::SearchResult;
use crate::transport::{RowSet, SqlWire};

const TRANSPORT: &str = "sphinxql";

/// Columns that carry the relevance weight, in lookup order.
const WEIGHT_COLUMNS: [&str; 3] = ["weight", "@weight", "weight()"];

pub struct QlConnection<W: SqlWire> {
    wire: W,
    server: ServerAddr,
    connect_timeout: Duration,
    query_timeout: Option<u32>,
}

impl<W: SqlWire> QlConnection<W> {
    pub fn new(wire: W) -> Self {
        Self::from_config(&SphinxConfig::default(), wire)
    }

    pub fn from_config(config: &SphinxConfig, wire: W) -> Self {
        let mut conn = Self {
            wire,
            server: config.server(),
            connect_timeout: config.connect_timeout(),
            query_timeout: None,
        };
        conn.set_query_timeout(config.query_timeout_ms);
        conn
    }

    pub fn server(&self) -> &ServerAddr {
        &self.server
    }

    pub fn wire(&self) -> &W {
        &self.wire
    }

    pub fn wire_mut(&mut self) -> &mut W {
        &mut self.wire
    }

    /// The wire's read deadline is the query timeout plus the connect timeout.
    fn apply_read_deadline(&mut self) {
        let deadline = self
            .query_timeout
            .map(|ms| Duration::from_millis(u64::from(ms)) + self.connect_timeout);
        self.wire.set_read_timeout(deadline);
    }

    fn ensure_open(&self) -> Result<()> {
        if !self.wire.is_active() {
            return Err(SphinxError::ConnectionState(
                "SphinxQL connection is not open".into(),
            ));
        }
        Ok(())
    }

    fn run(&mut self, statements: &[String]) -> Result<Vec<RowSet>> {
        let sets = self.wire.execute(statements)?;
        if sets.len() != statements.len() {
            return Err(SphinxError::Backend(format!(
                "expected {} row sets, got {}",
                statements.len(),
                sets.len()
            )));
        }
        Ok(sets)
    }
}

/// Builds `{...meta, matches}` from a select's rows and its `SHOW META` rows.
pub(crate) fn result_payload(rows: RowSet, meta_rows: RowSet) -> Value {
    let mut payload = Map::new();
    for row in meta_rows {
        let mut cells = row.into_iter();
        let name = match cells.next() {
            Some((_, Value::String(name))) => name,
            _ => continue,
        };
        let value = cells.next().map(|(_, v)| v).unwrap_or(Value::Null);
        payload.insert(name, value);
    }
    let matches = rows.into_iter().map(reshape_row).map(Value::Object).collect();
    payload.insert("matches".into(), Value::Array(matches));
    Value::Object(payload)
}

/// `{id, weight, col..}` → `{id, weight, attrs: {col..}}`.
fn reshape_row(mut row: Map<String, Value>) -> Map<String, Value> {
    let id = row.shift_remove("id").unwrap_or(Value::Null);
    let weight = WEIGHT_COLUMNS
        .iter()
        .find_map(|col| row.shift_remove(*col))
        .unwrap_or(Value::from(0));

    let mut shaped = Map::new();
    shaped.insert("id".into(), id);
    shaped.insert("weight".into(), weight);
    shaped.insert("attrs".into(), Value::Object(row));
    shaped
}

impl<W: SqlWire> SphinxConnection for QlConnection<W> {
    fn set_server(&mut self, server: ServerAddr) {
        self.server = server;
    }

    fn open(&mut self) -> Result<()> {
        if self.wire.is_active() {
            return Err(SphinxError::ConnectionState(
                "SphinxQL connection is already open".into(),
            ));
        }
        match self.wire.open(&self.server, self.connect_timeout) {
            Ok(()) => {
                metrics::record_connection_event(TRANSPORT, "opened");
                info!(server = %self.server, "SphinxQL connection ready");
                Ok(())
            }
            Err(e) => {
                metrics::record_connection_event(TRANSPORT, "failed");
                warn!(server = %self.server, error = %e, "Failed to open SphinxQL connection");
                Err(e)
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if !self.wire.is_active() {
            return Err(SphinxError::ConnectionState(
                "SphinxQL connection is already closed".into(),
            ));
        }
        self.wire.close()?;
        metrics::record_connection_event(TRANSPORT, "closed");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.wire.is_active()
    }

    fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
        self.apply_read_deadline();
    }

    /// Sent as `max_query_time`.
    fn set_query_timeout(&mut self, ms: Option<u32>) {
        self.query_timeout = ms;
        self.apply_read_deadline();
    }

    #[tracing::instrument(skip(self, queries), fields(count = queries.len()))]
    fn execute_queries(&mut self, queries: &[Query]) -> Result<Vec<SearchResult>> {
        self.ensure_open()?;
        if queries.is_empty() {
            return Ok(Vec::new());
        }
        let statements = batch_statements(queries, self.query_timeout)?;

        let _timer = LatencyTimer::new(TRANSPORT, "batch");
        metrics::record_batch_size(TRANSPORT, queries.len());
        let sets = match self.run(&statements) {
            Ok(sets) => sets,
            Err(e) => {
                metrics::record_query(TRANSPORT, "batch", "error");
                warn!(error = %e, "Batch failed");
                return Err(e);
            }
        };

        let mut results = Vec::with_capacity(queries.len());
        let mut sets = sets.into_iter();
        while let (Some(rows), Some(meta)) = (sets.next(), sets.next()) {
            results.push(SearchResult::new(result_payload(rows, meta))?);
        }
        let matches: usize = results.iter().map(SearchResult::len).sum();
        metrics::record_query(TRANSPORT, "batch", "success");
        metrics::record_matches(TRANSPORT, matches);
        debug!(matches, "Batch completed");
        Ok(results)
    }

    fn escape(&self, text: &str) -> String {
        escape_query_text(text)
    }

    fn build_excerpts(
        &mut self,
        docs: &[String],
        index: &str,
        words: &str,
        options: &ExcerptOptions,
    ) -> Result<Vec<String>> {
        self.ensure_open()?;
        if docs.is_empty() {
            return Ok(Vec::new());
        }
        let sql = snippets_statement(docs, index, words, options);
        let rows = self.run(&[sql])?.into_iter().next().unwrap_or_default();
        metrics::record_query(TRANSPORT, "excerpts", "success");
        rows.into_iter()
            .map(|row| match row.get("snippet").or_else(|| row.values().next()) {
                Some(Value::String(s)) => Ok(s.clone()),
                _ => Err(SphinxError::backend("snippet row has no text")),
            })
            .collect()
    }

    fn build_keywords(&mut self, query: &str, index: &str, hits: bool) -> Result<Vec<Keyword>> {
        self.ensure_open()?;
        let sql = keywords_statement(query, index, hits);
        let rows = self.run(&[sql])?.into_iter().next().unwrap_or_default();
        metrics::record_query(TRANSPORT, "keywords", "success");
        rows.iter().map(Keyword::from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(v: Value) -> RowSet {
        v.as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_result_payload_reshapes_rows_and_meta() {
        let payload = result_payload(
            rows(json!([{"id": 2, "weight": 1500, "user_id": 2000, "rating": 30.2}])),
            rows(json!([
                {"Variable_name": "total", "Value": "1"},
                {"Variable_name": "total_found", "Value": "1"},
                {"Variable_name": "time", "Value": "0.000"}
            ])),
        );
        assert_eq!(
            payload,
            json!({
                "total": "1",
                "total_found": "1",
                "time": "0.000",
                "matches": [{"id": 2, "weight": 1500, "attrs": {"user_id": 2000, "rating": 30.2}}]
            })
        );

        let result = SearchResult::new(payload).unwrap();
        assert_eq!(result.found_total(), 1);
        assert_eq!(result.get(0).unwrap().weight(), 1500);
    }

    #[test]
    fn test_weight_column_variants() {
        let shaped = reshape_row(rows(json!([{"id": 1, "weight()": 7}])).remove(0));
        assert_eq!(shaped["weight"], json!(7));
        let shaped = reshape_row(rows(json!([{"id": 1}])).remove(0));
        assert_eq!(shaped["weight"], json!(0));
    }
}
