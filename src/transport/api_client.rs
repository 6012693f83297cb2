// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use std::time::Duration;

use indexmap::IndexMap;
use serde_json::Value;

use crate::criteria::{AttrValue, GroupFunc, MatchMode, RankingMode, SortMode};

/// Binary searchd protocol client (the classic `SphinxClient` surface).
///
/// The client is stateful: setters configure the next `add_query`, and
/// `run_queries` sends every queued query in one round trip. Failures are
/// reported through `last_error` / `last_warning` rather than return values.
pub trait SphinxApi {
    fn set_server(&mut self, host: &str, port: u16);
    /// Opens a persistent connection. `false` on failure, see `last_error`.
    fn open(&mut self) -> bool;
    fn close(&mut self) -> bool;
    fn is_connect_error(&self) -> bool;
    fn set_connect_timeout(&mut self, timeout: Duration);
    fn set_max_query_time(&mut self, ms: u32);
    fn set_array_result(&mut self, on: bool);

    fn reset_filters(&mut self);
    fn reset_group_by(&mut self);
    fn reset_overrides(&mut self);

    /// `max_matches` and `cutoff` of zero leave the daemon defaults.
    fn set_limits(&mut self, offset: u32, limit: u32, max_matches: u32, cutoff: u32);
    fn set_field_weights(&mut self, weights: &IndexMap<String, u32>);
    fn set_index_weights(&mut self, weights: &IndexMap<String, u32>);
    /// `(0, 0)` disables the id range.
    fn set_id_range(&mut self, min: u64, max: u64);
    fn set_match_mode(&mut self, mode: MatchMode);
    fn set_ranking_mode(&mut self, mode: RankingMode, expression: &str);
    fn set_sort_mode(&mut self, mode: SortMode, sort_by: &str);
    fn set_select(&mut self, select: &str);
    fn set_group_by(&mut self, attribute: &str, func: GroupFunc, group_sort: &str);
    fn set_group_distinct(&mut self, attribute: &str);

    fn set_filter(&mut self, attribute: &str, values: &[i64], exclude: bool);
    fn set_filter_range(&mut self, attribute: &str, min: i64, max: i64, exclude: bool);
    fn set_filter_float_range(&mut self, attribute: &str, min: f64, max: f64, exclude: bool);

    /// Queues a query; returns its position in the batch.
    fn add_query(&mut self, text: &str, indexes: &str, comment: &str) -> usize;
    /// Sends every queued query. `None` on a transport-level failure.
    fn run_queries(&mut self) -> Option<Value>;

    fn build_excerpts(
        &mut self,
        docs: &[String],
        index: &str,
        words: &str,
        options: &IndexMap<String, AttrValue>,
    ) -> Option<Vec<String>>;
    fn build_keywords(&mut self, query: &str, index: &str, hits: bool) -> Option<Value>;
    fn escape_string(&self, s: &str) -> String;
    /// Returns the number of updated documents, or -1 on failure.
    fn update_attributes(
        &mut self,
        index: &str,
        attributes: &[String],
        values: &IndexMap<u64, Vec<i64>>,
        mva: bool,
    ) -> i64;

    fn last_error(&self) -> String;
    fn last_warning(&self) -> String;
}
