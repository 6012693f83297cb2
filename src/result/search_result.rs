// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Lazily decoded search result.
//!
//! Raw rows are kept as received; each [`SearchMatch`] is built on first
//! access and cached in a same-length slot vector, so repeated access
//! returns the same reference. `len()` never decodes anything.

use std::sync::OnceLock;

use serde_json::{Map, Value};

use super::uint_of;
use super::search_match::SearchMatch;
use crate::error::{Result, SphinxError};

#[derive(Debug, Clone)]
pub struct SearchResult {
    meta: Map<String, Value>,
    rows: Vec<Map<String, Value>>,
    slots: Vec<OnceLock<SearchMatch>>,
    found: OnceLock<u64>,
    found_total: OnceLock<u64>,
}

impl SearchResult {
    /// Wraps `{...metadata, matches: [row, ..]}`.
    ///
    /// A missing or `null` `matches` means no rows. Anything else that is not
    /// a list of maps is a malformed payload.
    pub fn new(payload: Value) -> Result<Self> {
        let mut meta = match payload {
            Value::Object(map) => map,
            other => {
                return Err(SphinxError::Backend(format!(
                    "result payload must be a map, got {}",
                    type_name(&other)
                )))
            }
        };
        let rows = match meta.remove("matches") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(rows)) => rows
                .into_iter()
                .map(|row| match row {
                    Value::Object(row) => Ok(row),
                    other => Err(SphinxError::Backend(format!(
                        "result row must be a map, got {}",
                        type_name(&other)
                    ))),
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(SphinxError::Backend(format!(
                    "result matches must be a list, got {}",
                    type_name(&other)
                )))
            }
        };
        let slots = rows.iter().map(|_| OnceLock::new()).collect();
        Ok(Self {
            meta,
            rows,
            slots,
            found: OnceLock::new(),
            found_total: OnceLock::new(),
        })
    }

    /// Number of matches returned for this page (`total`). Parsed once.
    pub fn found(&self) -> u64 {
        *self.found.get_or_init(|| self.meta_count("total"))
    }

    /// Number of documents matched overall (`total_found`). Parsed once.
    pub fn found_total(&self) -> u64 {
        *self.found_total.get_or_init(|| self.meta_count("total_found"))
    }

    fn meta_count(&self, key: &str) -> u64 {
        self.meta
            .get(key)
            .and_then(uint_of)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Match at `index`, decoded on first access. `None` past the end.
    pub fn get(&self, index: usize) -> Option<&SearchMatch> {
        let row = self.rows.get(index)?;
        Some(self.slots[index].get_or_init(|| SearchMatch::from_row(row)))
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            result: self,
            pos: 0,
        }
    }

    /// Values of one attribute across every match, in result order.
    pub fn attribute_list(&self, name: &str) -> Result<Vec<&Value>> {
        self.iter().map(|m| m.get_attribute(name)).collect()
    }

    pub fn ids(&self) -> Vec<u64> {
        self.iter().map(SearchMatch::id).collect()
    }

    /// Pass-through metadata (`time`, `words`, ..).
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    pub fn meta_map(&self) -> &Map<String, Value> {
        &self.meta
    }

    /// Replaces one metadata entry. Counts already read through `found()` /
    /// `found_total()` keep their first value.
    pub fn set_meta(&mut self, key: impl Into<String>, value: Value) {
        self.meta.insert(key.into(), value);
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Forward iterator over decoded matches.
pub struct Iter<'a> {
    result: &'a SearchResult,
    pos: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a SearchMatch;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.result.get(self.pos)?;
        self.pos += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.result.len().saturating_sub(self.pos);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a SearchResult {
    type Item = &'a SearchMatch;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "total": 2,
            "total_found": "4",
            "time": "0.001",
            "matches": [
                {"id": 1, "weight": 2, "attrs": {"user_id": 1000}},
                {"id": 2, "weight": 1, "attrs": {"user_id": 2000}}
            ]
        })
    }

    #[test]
    fn test_counts() {
        let r = SearchResult::new(payload()).unwrap();
        assert_eq!(r.found(), 2);
        assert_eq!(r.found_total(), 4);
        assert_eq!(r.len(), 2);
        assert_eq!(r.meta("time"), Some(&json!("0.001")));
    }

    #[test]
    fn test_found_is_memoized() {
        let mut r = SearchResult::new(payload()).unwrap();
        assert_eq!(r.found(), 2);
        assert_eq!(r.found_total(), 4);
        r.set_meta("total", json!(99));
        r.set_meta("total_found", json!(99));
        assert_eq!(r.found(), 2);
        assert_eq!(r.found_total(), 4);
    }

    #[test]
    fn test_get_is_lazy_and_identity_stable() {
        let r = SearchResult::new(payload()).unwrap();
        assert!(r.slots.iter().all(|s| s.get().is_none()));
        assert_eq!(r.len(), 2);

        let first = r.get(0).unwrap();
        assert!(r.slots[1].get().is_none());
        assert!(std::ptr::eq(first, r.get(0).unwrap()));
        assert!(r.get(2).is_none());
    }

    #[test]
    fn test_iteration_and_attribute_list() {
        let r = SearchResult::new(payload()).unwrap();
        assert_eq!(r.iter().len(), 2);
        assert_eq!(r.ids(), vec![1, 2]);
        let users = r.attribute_list("user_id").unwrap();
        assert_eq!(users, vec![&json!(1000), &json!(2000)]);
        assert!(matches!(
            r.attribute_list("rating"),
            Err(SphinxError::AttributeNotFound(_))
        ));

        let mut seen = 0;
        for m in &r {
            seen += m.id();
        }
        assert_eq!(seen, 3);
    }

    #[test]
    fn test_empty_and_malformed_payloads() {
        let r = SearchResult::new(json!({"total": 0})).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.found_total(), 0);

        assert!(matches!(
            SearchResult::new(json!({"matches": "nope"})),
            Err(SphinxError::Backend(_))
        ));
        assert!(SearchResult::new(json!({"matches": [1, 2]})).is_err());
        assert!(SearchResult::new(json!([])).is_err());
    }

    #[test]
    fn test_unsigned_ids_survive_decoding() {
        let r = SearchResult::new(json!({
            "total": "18446744073709551615",
            "matches": [
                {"id": 18446744073709551615u64, "weight": 1, "attrs": {}},
                {"id": 9223372036854775808u64, "weight": 1, "attrs": {}}
            ]
        }))
        .unwrap();
        assert_eq!(r.ids(), vec![u64::MAX, 9_223_372_036_854_775_808]);
        assert_eq!(r.found(), u64::MAX);
    }
}
