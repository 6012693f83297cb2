// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Uniform result view over both transports.

pub mod search_match;
pub mod search_result;

pub use search_match::SearchMatch;
pub use search_result::{Iter, SearchResult};

use serde_json::Value;

/// Lenient integer view: numbers, numeric strings and booleans.
/// Fractional values are truncated toward zero. Integers outside `i64`
/// yield `None`.
pub(crate) fn int_of(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) if n.is_f64() => n.as_f64().map(|f| f as i64),
        Value::Number(n) => n.as_i64(),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Unsigned view for document ids and counters. Covers the full `u64`
/// range; negative values yield `None`.
pub(crate) fn uint_of(v: &Value) -> Option<u64> {
    let non_negative = |f: f64| f.is_finite() && f >= 0.0;
    match v {
        Value::Number(n) if n.is_f64() => n.as_f64().filter(|f| non_negative(*f)).map(|f| f as u64),
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| non_negative(*f)).map(|f| f as u64))
        }
        Value::Bool(b) => Some(u64::from(*b)),
        _ => None,
    }
}
