// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use std::time::Duration;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::config::ServerAddr;
use crate::criteria::AttrValue;
use crate::error::{Result, SphinxError};
use crate::query::Query;
use crate::result::{uint_of, SearchResult};

/// Excerpt (snippet) options such as `before_match` or `limit`, in order.
pub type ExcerptOptions = IndexMap<String, AttrValue>;

/// One keyword as tokenized by an index.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub tokenized: String,
    pub normalized: String,
    /// Only present when hit statistics were requested.
    pub docs: Option<u64>,
    pub hits: Option<u64>,
}

impl Keyword {
    pub(crate) fn from_row(row: &Map<String, Value>) -> Result<Self> {
        let text = |key: &str| -> Result<String> {
            match row.get(key) {
                Some(Value::String(s)) => Ok(s.clone()),
                Some(other) if !other.is_null() => Ok(other.to_string()),
                _ => Err(SphinxError::Backend(format!(
                    "keyword row is missing \"{key}\""
                ))),
            }
        };
        let count = |key: &str| row.get(key).and_then(uint_of);
        Ok(Self {
            tokenized: text("tokenized")?,
            normalized: text("normalized")?,
            docs: count("docs"),
            hits: count("hits"),
        })
    }
}

/// A connection to searchd over one of its protocols.
///
/// Both implementations decode into the same [`SearchResult`] shape, and a
/// failed batch never yields partial results.
pub trait SphinxConnection {
    fn set_server(&mut self, server: ServerAddr);
    fn open(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
    fn is_connected(&self) -> bool;
    fn set_connect_timeout(&mut self, timeout: Duration);
    /// Default max query time for queries whose criteria set none.
    fn set_query_timeout(&mut self, ms: Option<u32>);

    fn execute_query(&mut self, query: &Query) -> Result<SearchResult> {
        self.execute_queries(std::slice::from_ref(query))?
            .pop()
            .ok_or_else(|| SphinxError::backend("no result returned for query"))
    }

    /// Runs every query in one round trip; results come back in query order.
    fn execute_queries(&mut self, queries: &[Query]) -> Result<Vec<SearchResult>>;

    /// Escapes full-text syntax characters in `text`.
    fn escape(&self, text: &str) -> String;

    fn build_excerpts(
        &mut self,
        docs: &[String],
        index: &str,
        words: &str,
        options: &ExcerptOptions,
    ) -> Result<Vec<String>>;

    fn build_keywords(&mut self, query: &str, index: &str, hits: bool) -> Result<Vec<Keyword>>;
}
