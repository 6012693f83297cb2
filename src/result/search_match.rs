// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use serde_json::{Map, Value};

use super::{int_of, uint_of};
use crate::error::{Result, SphinxError};

/// One matched document.
///
/// Built from a raw row `{id, weight, attrs: {..}, ..}`. Attribute lookups
/// check `attrs` first and fall back to the other row columns. A `null`
/// value counts as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMatch {
    id: u64,
    weight: i64,
    attrs: Map<String, Value>,
    row: Map<String, Value>,
}

impl SearchMatch {
    pub(crate) fn from_row(row: &Map<String, Value>) -> Self {
        let mut row = row.clone();
        let attrs = match row.remove("attrs") {
            Some(Value::Object(attrs)) => attrs,
            _ => Map::new(),
        };
        let id = row.get("id").and_then(uint_of).unwrap_or(0);
        let weight = row.get("weight").and_then(int_of).unwrap_or(0);
        Self {
            id,
            weight,
            attrs,
            row,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn weight(&self) -> i64 {
        self.weight
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attrs
    }

    /// Attribute value, or `AttributeNotFound`.
    pub fn get_attribute(&self, name: &str) -> Result<&Value> {
        self.try_get_attribute(name)
            .ok_or_else(|| SphinxError::AttributeNotFound(name.to_string()))
    }

    pub fn try_get_attribute(&self, name: &str) -> Option<&Value> {
        self.attrs
            .get(name)
            .filter(|v| !v.is_null())
            .or_else(|| self.row.get(name).filter(|v| !v.is_null()))
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.try_get_attribute(name).is_some()
    }
}
