//! In-process fakes for both protocol seams.
//!
//! `ArticleIndex` is a tiny searchd that understands the binary client's
//! setter calls and evaluates them over four fixed article rows.
//! `ScriptedWire` replays canned row sets and records every statement.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use indexmap::IndexMap;
use serde_json::{json, Value};

use sphinx_search::{
    AttrValue, GroupFunc, MatchMode, RankingMode, RowSet, ServerAddr, SortMode, SphinxApi,
    SphinxError, SqlWire,
};

#[derive(Debug, Clone)]
pub struct Article {
    pub id: u64,
    pub title: &'static str,
    pub user_id: i64,
    pub rating: f64,
}

pub fn articles() -> Vec<Article> {
    vec![
        Article { id: 1, title: "First Article with Title", user_id: 1000, rating: 1.4 },
        Article { id: 2, title: "Second Article with Title", user_id: 2000, rating: 30.2 },
        Article { id: 3, title: "Third Article with Title", user_id: 3000, rating: 0.4 },
        Article { id: 4, title: "Fourth Article with Title", user_id: 4000, rating: 0.0 },
    ]
}

impl Article {
    fn attr(&self, name: &str) -> Option<f64> {
        match name {
            "id" | "@id" => Some(self.id as f64),
            "user_id" => Some(self.user_id as f64),
            "rating" => Some(self.rating),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
enum Cond {
    Values { attr: String, values: Vec<i64>, exclude: bool },
    Range { attr: String, min: f64, max: f64, exclude: bool },
}

/// Client state snapshot taken at `add_query` time.
#[derive(Debug, Clone, Default)]
struct Pending {
    text: String,
    indexes: String,
    offset: u32,
    limit: u32,
    match_mode: Option<MatchMode>,
    sort_mode: Option<SortMode>,
    sort_by: String,
    conds: Vec<Cond>,
    id_range: (u64, u64),
}

#[derive(Default)]
pub struct ArticleIndex {
    rows: Vec<Article>,
    state: Pending,
    queue: Vec<Pending>,
    pub opened: u32,
    pub error: String,
    pub warning: String,
    pub runs: u32,
}

impl ArticleIndex {
    pub fn new() -> Self {
        Self {
            rows: articles(),
            ..Default::default()
        }
    }

    fn evaluate(&self, q: &Pending) -> Value {
        let words: Vec<String> = q
            .text
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();
        let any = q.match_mode == Some(MatchMode::Any);

        let mut hits: Vec<(&Article, i64)> = self
            .rows
            .iter()
            .filter_map(|a| {
                let title = a.title.to_lowercase();
                let title_words: Vec<&str> = title.split_whitespace().collect();
                let matched = words.iter().filter(|w| title_words.contains(&w.as_str())).count();
                let ok = words.is_empty() || if any { matched > 0 } else { matched == words.len() };
                ok.then_some((a, 1000 * matched as i64 + 1))
            })
            .filter(|(a, _)| q.id_range == (0, 0) || (q.id_range.0..=q.id_range.1).contains(&a.id))
            .filter(|(a, _)| q.conds.iter().all(|c| passes(a, c)))
            .collect();

        match q.sort_mode {
            Some(SortMode::Extended) => {
                let clause = parse_clause(&q.sort_by);
                hits.sort_by(|(a, _), (b, _)| {
                    clause
                        .iter()
                        .map(|(attr, asc)| {
                            let ord = a
                                .attr(attr)
                                .partial_cmp(&b.attr(attr))
                                .unwrap_or(std::cmp::Ordering::Equal);
                            if *asc { ord } else { ord.reverse() }
                        })
                        .find(|o| o.is_ne())
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            }
            Some(SortMode::AttrAsc) | Some(SortMode::AttrDesc) => {
                let desc = q.sort_mode == Some(SortMode::AttrDesc);
                let attr = q.sort_by.clone();
                hits.sort_by(|(a, _), (b, _)| {
                    let ord = a.attr(&attr).partial_cmp(&b.attr(&attr)).unwrap_or(std::cmp::Ordering::Equal);
                    if desc { ord.reverse() } else { ord }
                });
            }
            _ => hits.sort_by(|(a, wa), (b, wb)| wb.cmp(wa).then(a.id.cmp(&b.id))),
        }

        let found = hits.len();
        let page: Vec<Value> = hits
            .into_iter()
            .skip(q.offset as usize)
            .take(q.limit as usize)
            .map(|(a, weight)| {
                json!({
                    "id": a.id,
                    "weight": weight,
                    "attrs": {"user_id": a.user_id, "rating": a.rating}
                })
            })
            .collect();

        json!({
            "error": "",
            "warning": "",
            "status": 0,
            "total": page.len(),
            "total_found": found,
            "time": "0.001",
            "words": {},
            "matches": page
        })
    }
}

fn passes(a: &Article, cond: &Cond) -> bool {
    match cond {
        Cond::Values { attr, values, exclude } => {
            let v = a.attr(attr).map(|v| v as i64);
            let hit = v.map(|v| values.contains(&v)).unwrap_or(false);
            hit != *exclude
        }
        Cond::Range { attr, min, max, exclude } => {
            let hit = a.attr(attr).map(|v| v >= *min && v <= *max).unwrap_or(false);
            hit != *exclude
        }
    }
}

/// `"user_id ASC, id DESC"` → `[("user_id", true), ("id", false)]`.
fn parse_clause(clause: &str) -> Vec<(String, bool)> {
    clause
        .split(',')
        .filter_map(|part| {
            let mut it = part.split_whitespace();
            let attr = it.next()?.to_string();
            let asc = !matches!(it.next(), Some(d) if d.eq_ignore_ascii_case("desc"));
            Some((attr, asc))
        })
        .collect()
}

impl SphinxApi for ArticleIndex {
    fn set_server(&mut self, _host: &str, _port: u16) {}
    fn open(&mut self) -> bool {
        self.opened += 1;
        true
    }
    fn close(&mut self) -> bool {
        true
    }
    fn is_connect_error(&self) -> bool {
        false
    }
    fn set_connect_timeout(&mut self, _timeout: Duration) {}
    fn set_max_query_time(&mut self, _ms: u32) {}
    fn set_array_result(&mut self, _on: bool) {}
    fn reset_filters(&mut self) {
        self.state.conds.clear();
    }
    fn reset_group_by(&mut self) {}
    fn reset_overrides(&mut self) {}
    fn set_limits(&mut self, offset: u32, limit: u32, _max_matches: u32, _cutoff: u32) {
        self.state.offset = offset;
        self.state.limit = limit;
    }
    fn set_field_weights(&mut self, _weights: &IndexMap<String, u32>) {}
    fn set_index_weights(&mut self, _weights: &IndexMap<String, u32>) {}
    fn set_id_range(&mut self, min: u64, max: u64) {
        self.state.id_range = (min, max);
    }
    fn set_match_mode(&mut self, mode: MatchMode) {
        self.state.match_mode = Some(mode);
    }
    fn set_ranking_mode(&mut self, _mode: RankingMode, _expression: &str) {}
    fn set_sort_mode(&mut self, mode: SortMode, sort_by: &str) {
        self.state.sort_mode = Some(mode);
        self.state.sort_by = sort_by.to_string();
    }
    fn set_select(&mut self, _select: &str) {}
    fn set_group_by(&mut self, _attribute: &str, _func: GroupFunc, _group_sort: &str) {}
    fn set_group_distinct(&mut self, _attribute: &str) {}
    fn set_filter(&mut self, attribute: &str, values: &[i64], exclude: bool) {
        self.state.conds.push(Cond::Values {
            attr: attribute.to_string(),
            values: values.to_vec(),
            exclude,
        });
    }
    fn set_filter_range(&mut self, attribute: &str, min: i64, max: i64, exclude: bool) {
        self.set_filter_float_range(attribute, min as f64, max as f64, exclude);
    }
    fn set_filter_float_range(&mut self, attribute: &str, min: f64, max: f64, exclude: bool) {
        self.state.conds.push(Cond::Range {
            attr: attribute.to_string(),
            min,
            max,
            exclude,
        });
    }
    fn add_query(&mut self, text: &str, indexes: &str, _comment: &str) -> usize {
        let mut pending = self.state.clone();
        pending.text = text.to_string();
        pending.indexes = indexes.to_string();
        self.queue.push(pending);
        self.queue.len() - 1
    }
    fn run_queries(&mut self) -> Option<Value> {
        self.runs += 1;
        let queue = std::mem::take(&mut self.queue);
        if !self.error.is_empty() {
            return None;
        }
        Some(Value::Array(queue.iter().map(|q| self.evaluate(q)).collect()))
    }
    fn build_excerpts(
        &mut self,
        docs: &[String],
        _index: &str,
        words: &str,
        options: &IndexMap<String, AttrValue>,
    ) -> Option<Vec<String>> {
        let before = options.get("before_match").map(|v| v.to_string()).unwrap_or("<b>".into());
        let after = options.get("after_match").map(|v| v.to_string()).unwrap_or("</b>".into());
        Some(
            docs.iter()
                .map(|d| d.replace(words, &format!("{before}{words}{after}")))
                .collect(),
        )
    }
    fn build_keywords(&mut self, query: &str, _index: &str, hits: bool) -> Option<Value> {
        let rows = query
            .split_whitespace()
            .map(|w| {
                let lower = w.to_lowercase();
                let docs = self.rows.iter().filter(|a| a.title.to_lowercase().contains(&lower)).count();
                let mut row = json!({"tokenized": lower, "normalized": lower});
                if hits {
                    row["docs"] = json!(docs);
                    row["hits"] = json!(docs);
                }
                row
            })
            .collect();
        Some(Value::Array(rows))
    }
    fn escape_string(&self, s: &str) -> String {
        sphinx_search::ql::escape_query_text(s)
    }
    fn update_attributes(
        &mut self,
        _index: &str,
        attributes: &[String],
        values: &IndexMap<u64, Vec<i64>>,
        _mva: bool,
    ) -> i64 {
        let mut updated = 0;
        for (id, row) in values {
            if let Some(article) = self.rows.iter_mut().find(|a| a.id == *id) {
                for (attr, v) in attributes.iter().zip(row) {
                    if attr == "user_id" {
                        article.user_id = *v;
                    }
                }
                updated += 1;
            }
        }
        updated
    }
    fn last_error(&self) -> String {
        self.error.clone()
    }
    fn last_warning(&self) -> String {
        self.warning.clone()
    }
}

/// Replays queued responses, one `Vec<RowSet>` per `execute` call.
#[derive(Default)]
pub struct ScriptedWire {
    pub active: bool,
    pub opened_with: Option<ServerAddr>,
    pub read_timeout: Option<Duration>,
    pub executed: Vec<Vec<String>>,
    pub responses: VecDeque<Result<Vec<RowSet>, SphinxError>>,
    pub refuse: bool,
}

impl ScriptedWire {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&mut self, sets: Vec<Value>) -> &mut Self {
        self.responses
            .push_back(Ok(sets.into_iter().map(row_set).collect()));
        self
    }

    pub fn fail(&mut self, error: SphinxError) -> &mut Self {
        self.responses.push_back(Err(error));
        self
    }

    pub fn statements(&self) -> Vec<&str> {
        self.executed.iter().flatten().map(String::as_str).collect()
    }
}

pub fn row_set(rows: Value) -> RowSet {
    rows.as_array()
        .expect("row set must be a JSON array")
        .iter()
        .map(|r| r.as_object().expect("row must be a JSON object").clone())
        .collect()
}

/// `SHOW META` rows for a result with `total` / `total_found`.
pub fn meta_rows(total: u64, total_found: u64) -> Value {
    json!([
        {"Variable_name": "total", "Value": total.to_string()},
        {"Variable_name": "total_found", "Value": total_found.to_string()},
        {"Variable_name": "time", "Value": "0.000"}
    ])
}

/// Select rows for the given articles, shaped as searchd returns them.
pub fn article_rows(ids: &[u64]) -> Value {
    let rows: Vec<Value> = articles()
        .into_iter()
        .filter(|a| ids.contains(&a.id))
        .map(|a| json!({"id": a.id, "weight": 1, "user_id": a.user_id, "rating": a.rating}))
        .collect();
    let mut ordered = Vec::new();
    for id in ids {
        if let Some(row) = rows.iter().find(|r| r["id"] == json!(id)) {
            ordered.push(row.clone());
        }
    }
    Value::Array(ordered)
}

impl SqlWire for ScriptedWire {
    fn open(&mut self, server: &ServerAddr, _timeout: Duration) -> Result<(), SphinxError> {
        if self.refuse {
            return Err(SphinxError::Backend("connection refused".into()));
        }
        self.active = true;
        self.opened_with = Some(server.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), SphinxError> {
        self.active = false;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.read_timeout = timeout;
    }

    fn execute(&mut self, statements: &[String]) -> Result<Vec<RowSet>, SphinxError> {
        self.executed.push(statements.to_vec());
        self.responses
            .pop_front()
            .unwrap_or_else(|| Err(SphinxError::Backend("no scripted response".into())))
    }
}
