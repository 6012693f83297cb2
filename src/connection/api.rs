// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Connection over the binary searchd protocol.
//!
//! The underlying [`SphinxApi`] client is stateful. Before each query is
//! queued the client is put back into a known baseline (no filters, no
//! grouping, default limits, extended2 matching, relevance sort), then the
//! query's criteria are applied on top. All queued queries go out in a
//! single `run_queries` round trip.

use std::time::Duration;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::traits::{ExcerptOptions, Keyword, SphinxConnection};
use crate::config::{ServerAddr, SphinxConfig};
use crate::criteria::{
    AttrValue, MatchMode, RangeBound, RankingMode, SearchCriteria, SortMode, DEFAULT_SELECT,
};
use crate::error::{Result, SphinxError};
use crate::metrics::{self, LatencyTimer};
use crate::query::Query;
use crate::result::SearchResult;
use crate::transport::SphinxApi;

const TRANSPORT: &str = "api";
const BACKEND: &str = "binary API";

pub const DEFAULT_API_HOST: &str = "localhost";
pub const DEFAULT_API_PORT: u16 = 3386;

pub struct ApiConnection<C: SphinxApi> {
    client: C,
    server: ServerAddr,
    connected: bool,
    query_timeout: Option<u32>,
}

impl<C: SphinxApi> ApiConnection<C> {
    pub fn new(client: C) -> Self {
        Self::with_server(client, ServerAddr::new(DEFAULT_API_HOST, DEFAULT_API_PORT))
    }

    pub fn from_config(config: &SphinxConfig, client: C) -> Self {
        let mut conn = Self::with_server(client, config.server());
        conn.set_connect_timeout(config.connect_timeout());
        conn.set_query_timeout(config.query_timeout_ms);
        conn
    }

    fn with_server(mut client: C, server: ServerAddr) -> Self {
        client.set_array_result(true);
        client.set_server(&server.host, server.port);
        Self {
            client,
            server,
            connected: false,
            query_timeout: None,
        }
    }

    pub fn server(&self) -> &ServerAddr {
        &self.server
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Updates attribute values of existing documents.
    ///
    /// `values` maps document id → one value per attribute in `attributes`
    /// (for MVA updates, the value list of the single attribute). Returns the
    /// number of updated documents.
    pub fn update_attributes(
        &mut self,
        index: &str,
        attributes: &[String],
        values: &IndexMap<u64, Vec<i64>>,
        mva: bool,
    ) -> Result<u64> {
        if attributes.is_empty() || attributes.iter().any(|a| a.trim().is_empty()) {
            return Err(SphinxError::validation("attribute names must be non-empty"));
        }
        if mva && attributes.len() != 1 {
            return Err(SphinxError::validation(
                "MVA updates take exactly one attribute",
            ));
        }
        if !mva {
            if let Some((id, row)) = values.iter().find(|(_, v)| v.len() != attributes.len()) {
                return Err(SphinxError::Validation(format!(
                    "document {id} has {} values for {} attributes",
                    row.len(),
                    attributes.len()
                )));
            }
        }

        let updated = self.client.update_attributes(index, attributes, values, mva);
        metrics::record_query(TRANSPORT, "update", if updated < 0 { "error" } else { "success" });
        u64::try_from(updated).map_err(|_| self.client_error("attribute update failed"))
    }

    fn client_error(&self, fallback: &str) -> SphinxError {
        let error = self.client.last_error();
        if error.is_empty() {
            SphinxError::backend(fallback)
        } else {
            SphinxError::Backend(error)
        }
    }

    /// Baseline client state applied before every query.
    fn reset_client(&mut self) {
        let c = &mut self.client;
        c.reset_filters();
        c.reset_group_by();
        c.reset_overrides();
        c.set_limits(0, 20, 0, 0);
        c.set_array_result(true);
        c.set_field_weights(&IndexMap::new());
        c.set_id_range(0, 0);
        c.set_index_weights(&IndexMap::new());
        c.set_match_mode(MatchMode::Extended2);
        c.set_ranking_mode(RankingMode::None, "");
        c.set_sort_mode(SortMode::Relevance, "");
        c.set_select(DEFAULT_SELECT);
    }

    fn apply_query(&mut self, query: &Query) {
        self.reset_client();
        let criteria = query.criteria();
        self.apply_criteria(criteria);

        let timeout = criteria.query_timeout().or(self.query_timeout).unwrap_or(0);
        self.client.set_max_query_time(timeout);

        let position = self
            .client
            .add_query(query.text(), query.indexes(), criteria.comment().unwrap_or(""));
        debug!(position, indexes = query.indexes(), "Queued query");
    }

    fn apply_criteria(&mut self, criteria: &SearchCriteria) {
        let c = &mut self.client;

        c.set_match_mode(criteria.match_mode());
        if let Some(mode) = criteria.ranking_mode() {
            c.set_ranking_mode(mode, criteria.ranking_expression());
        }
        c.set_sort_mode(criteria.sort_mode(), &sort_clause(criteria));
        if criteria.select() != DEFAULT_SELECT {
            c.set_select(criteria.select());
        }
        if criteria.is_limited() {
            c.set_limits(
                criteria.offset(),
                criteria.limit(),
                criteria.max_matches().unwrap_or(0),
                criteria.cut_off().unwrap_or(0),
            );
        }
        if let Some(group) = criteria.group_by().first() {
            c.set_group_by(&group.attribute, group.func, criteria.group_by_sort());
        }
        if let Some(distinct) = criteria.group_distinct() {
            c.set_group_distinct(distinct);
        }
        if let (Some(min), Some(max)) = (criteria.min_id(), criteria.max_id()) {
            c.set_id_range(min, max);
        }
        c.set_field_weights(criteria.field_weights());
        c.set_index_weights(criteria.index_weights());

        for exclude in [false, true] {
            for filter in criteria.filters().values().filter(|f| f.exclude == exclude) {
                let values: Vec<i64> = filter.values.iter().filter_map(AttrValue::as_i64).collect();
                c.set_filter(&filter.attribute, &values, exclude);
            }
        }
        for exclude in [false, true] {
            for range in criteria.range_filters().values().filter(|r| r.exclude == exclude) {
                match (range.min, range.max) {
                    (RangeBound::Int(min), RangeBound::Int(max)) => {
                        c.set_filter_range(&range.attribute, min, max, exclude)
                    }
                    (min, max) => c.set_filter_float_range(
                        &range.attribute,
                        min.as_f64(),
                        max.as_f64(),
                        exclude,
                    ),
                }
            }
        }
    }

    fn collect_results(&mut self, expected: usize) -> Result<Vec<SearchResult>> {
        let response = self.client.run_queries();

        let error = self.client.last_error();
        if !error.is_empty() {
            return Err(SphinxError::Backend(error));
        }
        let warning = self.client.last_warning();
        if !warning.is_empty() {
            return Err(SphinxError::Backend(warning));
        }
        let items = match response {
            Some(Value::Array(items)) => items,
            _ => return Err(SphinxError::backend("client returned a non-list response")),
        };
        if items.len() != expected {
            return Err(SphinxError::Backend(format!(
                "expected {expected} results, got {}",
                items.len()
            )));
        }

        for item in &items {
            for key in ["error", "warning"] {
                if let Some(msg) = item.get(key).and_then(Value::as_str).filter(|m| !m.is_empty()) {
                    return Err(SphinxError::Backend(msg.to_string()));
                }
            }
        }
        items.into_iter().map(SearchResult::new).collect()
    }
}

/// Checks that the binary protocol can express the query before any client
/// state is touched.
fn check_supported(query: &Query) -> Result<()> {
    let criteria = query.criteria();
    if criteria.ranking_mode() == Some(RankingMode::Expr)
        && criteria.ranking_expression().trim().is_empty()
    {
        return Err(SphinxError::validation(
            "expression ranking mode requires a ranking expression",
        ));
    }
    if criteria.group_by().len() > 1 {
        return Err(SphinxError::ProtocolLimit {
            backend: BACKEND,
            reason: format!("{} group-by entries, at most one supported", criteria.group_by().len()),
        });
    }
    for filter in criteria.filters().values() {
        if filter.values.iter().any(|v| v.as_i64().is_none()) {
            return Err(SphinxError::ProtocolLimit {
                backend: BACKEND,
                reason: format!("non-integer filter values on \"{}\"", filter.attribute),
            });
        }
    }
    Ok(())
}

/// Sort clause for `set_sort_mode`: the extended order list or `sort_by`.
fn sort_clause(criteria: &SearchCriteria) -> String {
    if criteria.sort_mode() == SortMode::Extended {
        return criteria
            .orders()
            .map(|orders| {
                orders
                    .iter()
                    .map(|(attr, dir)| format!("{attr} {dir}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
    }
    criteria
        .sort_by()
        .ok()
        .flatten()
        .unwrap_or_default()
        .to_string()
}

impl<C: SphinxApi> SphinxConnection for ApiConnection<C> {
    fn set_server(&mut self, server: ServerAddr) {
        self.client.set_server(&server.host, server.port);
        self.server = server;
    }

    fn open(&mut self) -> Result<()> {
        if self.connected {
            return Err(SphinxError::ConnectionState(
                "binary API connection is already open".into(),
            ));
        }
        if !self.client.open() || self.client.is_connect_error() {
            metrics::record_connection_event(TRANSPORT, "failed");
            warn!(server = %self.server, "Failed to open binary API connection");
            return Err(self.client_error("failed to open connection"));
        }
        self.connected = true;
        metrics::record_connection_event(TRANSPORT, "opened");
        info!(server = %self.server, "Binary API connection opened");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.connected {
            return Err(SphinxError::ConnectionState(
                "binary API connection is already closed".into(),
            ));
        }
        self.client.close();
        self.connected = false;
        metrics::record_connection_event(TRANSPORT, "closed");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn set_connect_timeout(&mut self, timeout: Duration) {
        self.client.set_connect_timeout(timeout);
    }

    fn set_query_timeout(&mut self, ms: Option<u32>) {
        self.query_timeout = ms;
        self.client.set_max_query_time(ms.unwrap_or(0));
    }

    #[tracing::instrument(skip(self, queries), fields(count = queries.len()))]
    fn execute_queries(&mut self, queries: &[Query]) -> Result<Vec<SearchResult>> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }
        queries.iter().try_for_each(check_supported)?;

        let _timer = LatencyTimer::new(TRANSPORT, "batch");
        metrics::record_batch_size(TRANSPORT, queries.len());
        for query in queries {
            self.apply_query(query);
        }

        match self.collect_results(queries.len()) {
            Ok(results) => {
                let matches: usize = results.iter().map(SearchResult::len).sum();
                metrics::record_query(TRANSPORT, "batch", "success");
                metrics::record_matches(TRANSPORT, matches);
                debug!(matches, "Batch completed");
                Ok(results)
            }
            Err(e) => {
                metrics::record_query(TRANSPORT, "batch", "error");
                warn!(error = %e, "Batch failed");
                Err(e)
            }
        }
    }

    fn escape(&self, text: &str) -> String {
        self.client.escape_string(text)
    }

    fn build_excerpts(
        &mut self,
        docs: &[String],
        index: &str,
        words: &str,
        options: &ExcerptOptions,
    ) -> Result<Vec<String>> {
        let excerpts = self.client.build_excerpts(docs, index, words, options);
        metrics::record_query(TRANSPORT, "excerpts", if excerpts.is_some() { "success" } else { "error" });
        excerpts.ok_or_else(|| self.client_error("excerpt build failed"))
    }

    fn build_keywords(&mut self, query: &str, index: &str, hits: bool) -> Result<Vec<Keyword>> {
        let response = self.client.build_keywords(query, index, hits);
        metrics::record_query(TRANSPORT, "keywords", if response.is_some() { "success" } else { "error" });
        match response {
            Some(Value::Array(rows)) => rows
                .iter()
                .map(|row| match row {
                    Value::Object(map) => Keyword::from_row(map),
                    _ => Err(SphinxError::backend("keyword entry must be a map")),
                })
                .collect(),
            Some(_) => Err(SphinxError::backend("client returned a non-list keyword response")),
            None => Err(self.client_error("keyword build failed")),
        }
    }
}
