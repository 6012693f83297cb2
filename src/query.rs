// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Immutable search query: text, target indexes and criteria.

use serde_json::Value;

use crate::criteria::{CriteriaInit, SearchCriteria};
use crate::error::Result;

/// Index wildcard: search every index the daemon serves.
pub const ALL_INDEXES: &str = "*";

/// Target indexes, given either as one string or as a list.
#[derive(Debug, Clone, PartialEq)]
pub struct Indexes(String);

impl Indexes {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Individual index names, split on spaces and commas.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0
            .split(|c: char| c == ' ' || c == ',')
            .filter(|s| !s.is_empty())
    }
}

impl Default for Indexes {
    fn default() -> Self {
        Indexes(ALL_INDEXES.to_string())
    }
}

impl From<&str> for Indexes {
    fn from(v: &str) -> Self {
        Indexes(v.trim().to_string())
    }
}

impl From<String> for Indexes {
    fn from(v: String) -> Self {
        Indexes::from(v.as_str())
    }
}

impl<S: AsRef<str>> From<Vec<S>> for Indexes {
    fn from(v: Vec<S>) -> Self {
        Indexes::from(&v[..])
    }
}

impl<S: AsRef<str>> From<&[S]> for Indexes {
    fn from(v: &[S]) -> Self {
        let joined = v
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Indexes(joined)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    text: String,
    indexes: Indexes,
    criteria: SearchCriteria,
}

impl Query {
    /// Query over all indexes with default criteria.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_criteria(text, Indexes::default(), SearchCriteria::default())
    }

    pub fn with_indexes(text: impl Into<String>, indexes: impl Into<Indexes>) -> Self {
        Self::with_criteria(text, indexes, SearchCriteria::default())
    }

    pub fn with_criteria(
        text: impl Into<String>,
        indexes: impl Into<Indexes>,
        criteria: SearchCriteria,
    ) -> Self {
        Self {
            text: text.into(),
            indexes: indexes.into(),
            criteria,
        }
    }

    /// Builds the criteria from an untyped initializer map.
    pub fn from_init(
        text: impl Into<String>,
        indexes: impl Into<Indexes>,
        init: Value,
    ) -> Result<Self> {
        let criteria = SearchCriteria::try_from(CriteriaInit::from_json(init)?)?;
        Ok(Self::with_criteria(text, indexes, criteria))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Space-joined index list.
    pub fn indexes(&self) -> &str {
        self.indexes.as_str()
    }

    pub fn index_names(&self) -> impl Iterator<Item = &str> {
        self.indexes.names()
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }
}
