// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Untyped criteria initializer.
//!
//! Builds a [`SearchCriteria`] from a JSON-style key/value map such as one
//! read from configuration:
//!
//! ```
//! use serde_json::json;
//! use sphinx_search::SearchCriteria;
//!
//! let criteria = SearchCriteria::from_json(json!({
//!     "filters": [["user_id", [1000, 2000]]],
//!     "rangeFilters": [{"attribute": "rating", "min": 0, "max": 10.5}],
//!     "sortMode": "extended",
//!     "orders": {"rating": "desc"},
//!     "limit": 5,
//! }))
//! .unwrap();
//!
//! assert_eq!(criteria.limit(), 5);
//! assert!(criteria.orders().unwrap().contains_key("rating"));
//! ```
//!
//! Every entry goes through the typed `add_*`/`set_*` path, so the same
//! validation applies and getters return normalized values.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use super::enums::{GroupFunc, IdfMode, MatchMode, RankingMode, SortMethod, SortMode};
use super::filters::{AttrValue, FilterKey, FilterSpec, RangeBound, RangeSpec};
use super::search_criteria::SearchCriteria;
use crate::error::{Result, SphinxError};

/// A scalar or a list of scalars.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    Many(Vec<AttrValue>),
    One(AttrValue),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<AttrValue> {
        match self {
            OneOrMany::Many(values) => values,
            OneOrMany::One(value) => vec![value],
        }
    }
}

/// Explicit filter key as written in an initializer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InitKey {
    Position(usize),
    Named(String),
}

impl From<InitKey> for FilterKey {
    fn from(key: InitKey) -> Self {
        match key {
            InitKey::Position(pos) => FilterKey::Position(pos),
            InitKey::Named(name) => FilterKey::Named(name),
        }
    }
}

/// `["attr", value]` or `{"attribute": .., "values": .., "exclude": .., "key": ..}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FilterInit {
    Pair(String, OneOrMany),
    Entry {
        attribute: String,
        #[serde(alias = "value")]
        values: OneOrMany,
        #[serde(default)]
        exclude: bool,
        #[serde(default)]
        key: Option<InitKey>,
    },
}

impl From<FilterInit> for FilterSpec {
    fn from(init: FilterInit) -> Self {
        match init {
            FilterInit::Pair(attribute, values) => FilterSpec::new(attribute, values.into_vec()),
            FilterInit::Entry {
                attribute,
                values,
                exclude,
                key,
            } => {
                let mut spec = FilterSpec::new(attribute, values.into_vec());
                if exclude {
                    spec = spec.exclude();
                }
                if let Some(key) = key {
                    spec = spec.key(FilterKey::from(key));
                }
                spec
            }
        }
    }
}

/// `["attr", min, max]` or `{"attribute": .., "min": .., "max": .., "exclude": .., "key": ..}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RangeInit {
    Triple(String, RangeBound, RangeBound),
    Entry {
        attribute: String,
        min: RangeBound,
        max: RangeBound,
        #[serde(default)]
        exclude: bool,
        #[serde(default)]
        key: Option<InitKey>,
    },
}

impl From<RangeInit> for RangeSpec {
    fn from(init: RangeInit) -> Self {
        match init {
            RangeInit::Triple(attribute, min, max) => RangeSpec::new(attribute, min, max),
            RangeInit::Entry {
                attribute,
                min,
                max,
                exclude,
                key,
            } => {
                let mut spec = RangeSpec::new(attribute, min, max);
                if exclude {
                    spec = spec.exclude();
                }
                if let Some(key) = key {
                    spec = spec.key(FilterKey::from(key));
                }
                spec
            }
        }
    }
}

/// `"attr"` (grouped by attribute value) or `{"attribute": .., "func": ..}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GroupInit {
    Attribute(String),
    Entry {
        attribute: String,
        #[serde(default)]
        func: Option<GroupFunc>,
    },
}

/// Deserialized initializer map. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CriteriaInit {
    pub select: Option<String>,
    pub filters: Option<Vec<FilterInit>>,
    pub range_filters: Option<Vec<RangeInit>>,
    pub sort_mode: Option<SortMode>,
    pub sort_by: Option<String>,
    pub orders: Option<IndexMap<String, String>>,
    pub match_mode: Option<MatchMode>,
    pub ranking_mode: Option<RankingMode>,
    pub ranking_expression: Option<String>,
    pub field_weights: Option<IndexMap<String, i64>>,
    pub index_weights: Option<IndexMap<String, i64>>,
    pub group_by: Option<Vec<GroupInit>>,
    /// Default function for group-by entries that name none.
    pub group_by_func: Option<GroupFunc>,
    pub group_by_sort: Option<String>,
    pub group_distinct: Option<String>,
    pub min_id: Option<u64>,
    pub max_id: Option<u64>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub max_matches: Option<u32>,
    pub cut_off: Option<u32>,
    pub comment: Option<String>,
    pub boolean_simplify: Option<bool>,
    pub reverse_scan: Option<bool>,
    pub sort_method: Option<SortMethod>,
    pub global_idf: Option<bool>,
    pub idf: Option<IdfMode>,
    pub query_timeout: Option<u32>,
}

impl TryFrom<CriteriaInit> for SearchCriteria {
    type Error = SphinxError;

    fn try_from(init: CriteriaInit) -> Result<Self> {
        let mut c = SearchCriteria::new();

        if let Some(select) = init.select {
            c.set_select(select)?;
        }
        if let Some(filters) = init.filters {
            c.add_filters(filters.into_iter().map(FilterSpec::from))?;
        }
        if let Some(ranges) = init.range_filters {
            c.add_range_filters(ranges.into_iter().map(RangeSpec::from))?;
        }

        // Sort mode first: orders and sort_by are guarded by it
        if let Some(mode) = init.sort_mode {
            c.set_sort_mode(mode);
        }
        if let Some(sort_by) = init.sort_by {
            c.set_sort_by(sort_by)?;
        }
        if let Some(orders) = init.orders {
            c.add_orders(orders)?;
        }

        if let Some(mode) = init.match_mode {
            c.set_match_mode(mode);
        }
        if let Some(mode) = init.ranking_mode {
            c.set_ranking_mode(mode);
        }
        if let Some(expr) = init.ranking_expression {
            c.set_ranking_expression(expr);
        }
        if let Some(weights) = init.field_weights {
            c.add_field_weights(weights)?;
        }
        if let Some(weights) = init.index_weights {
            c.add_index_weights(weights)?;
        }

        let default_func = init.group_by_func.unwrap_or_default();
        for group in init.group_by.unwrap_or_default() {
            match group {
                GroupInit::Attribute(attribute) => c.add_group_by(attribute, default_func)?,
                GroupInit::Entry { attribute, func } => {
                    c.add_group_by(attribute, func.unwrap_or(default_func))?
                }
            }
        }
        if let Some(sort) = init.group_by_sort {
            c.set_group_by_sort(sort)?;
        }
        if let Some(distinct) = init.group_distinct {
            c.set_group_distinct(distinct)?;
        }

        match (init.min_id, init.max_id) {
            (Some(min), Some(max)) => {
                c.set_id_range(min, max)?;
            }
            (Some(min), None) => {
                c.set_min_id(min);
            }
            (None, Some(max)) => {
                c.set_max_id(max);
            }
            (None, None) => {}
        }

        if let Some(offset) = init.offset {
            c.set_offset(offset);
        }
        if let Some(limit) = init.limit {
            c.set_limit(limit);
        }
        if let Some(v) = init.max_matches {
            c.set_max_matches(v);
        }
        if let Some(v) = init.cut_off {
            c.set_cut_off(v);
        }
        if let Some(v) = init.comment {
            c.set_comment(v);
        }
        if let Some(v) = init.boolean_simplify {
            c.set_boolean_simplify(v);
        }
        if let Some(v) = init.reverse_scan {
            c.set_reverse_scan(v);
        }
        if let Some(v) = init.sort_method {
            c.set_sort_method(v);
        }
        if let Some(v) = init.global_idf {
            c.set_global_idf(v);
        }
        if let Some(v) = init.idf {
            c.set_idf(v);
        }
        if let Some(v) = init.query_timeout {
            c.set_query_timeout(v);
        }

        Ok(c)
    }
}

impl CriteriaInit {
    /// Deserializes an initializer; type errors surface as `Validation`.
    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| SphinxError::Validation(format!("invalid criteria initializer: {e}")))
    }
}

impl SearchCriteria {
    /// Builds criteria from an untyped key/value map.
    pub fn from_json(value: Value) -> Result<Self> {
        SearchCriteria::try_from(CriteriaInit::from_json(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::enums::SortDirection;
    use serde_json::json;

    #[test]
    fn test_initializer_round_trip() {
        let c = SearchCriteria::from_json(json!({
            "filters": [
                ["user_id", 1000],
                {"attribute": "rating", "values": [1, 2], "exclude": true, "key": "r"}
            ],
            "rangeFilters": [
                ["user_id", 1000, 3000],
                {"attribute": "rating", "min": 0, "max": 100.0}
            ],
            "sortMode": 4,
            "orders": {"user_id": "asc", "rating": "DESC"},
            "fieldWeights": {"title": 10, "content": 1},
            "groupBy": ["user_id"],
            "limit": 3,
            "offset": 1
        }))
        .unwrap();

        let filters: Vec<_> = c.filters().iter().collect();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].1.values, vec![AttrValue::Int(1000)]);
        assert_eq!(*filters[1].0, FilterKey::Named("r".into()));
        assert!(filters[1].1.exclude);

        let ranges: Vec<_> = c.range_filters().values().collect();
        assert!(!ranges[0].is_float());
        assert!(ranges[1].is_float());

        assert_eq!(c.sort_mode(), SortMode::Extended);
        let orders = c.orders().unwrap();
        assert_eq!(orders["user_id"], SortDirection::Asc);
        assert_eq!(orders["rating"], SortDirection::Desc);

        assert_eq!(c.field_weights()["title"], 10);
        assert_eq!(c.group_by()[0].func, GroupFunc::ByAttr);
        assert_eq!((c.offset(), c.limit()), (1, 3));
    }

    #[test]
    fn test_non_integer_weight_rejected() {
        let err = SearchCriteria::from_json(json!({"fieldWeights": {"title": 1.5}}));
        assert!(matches!(err, Err(SphinxError::Validation(_))));

        let err = SearchCriteria::from_json(json!({"indexWeights": {"articles": "2"}}));
        assert!(matches!(err, Err(SphinxError::Validation(_))));
    }

    #[test]
    fn test_invalid_enum_codes_rejected() {
        assert!(SearchCriteria::from_json(json!({"matchMode": 99})).is_err());
        assert!(SearchCriteria::from_json(json!({"rankingMode": "fancy"})).is_err());
        assert!(SearchCriteria::from_json(json!({"sortMethod": "heap"})).is_err());
    }

    #[test]
    fn test_orders_without_extended_mode_rejected() {
        let err = SearchCriteria::from_json(json!({"orders": {"rating": "asc"}}));
        assert!(matches!(err, Err(SphinxError::Validation(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(SearchCriteria::from_json(json!({"colour": "blue"})).is_err());
    }

    #[test]
    fn test_group_by_func_default() {
        let c = SearchCriteria::from_json(json!({
            "groupBy": ["date_updated", {"attribute": "user_id", "func": "attr"}],
            "groupByFunc": "day"
        }))
        .unwrap();
        assert_eq!(c.group_by()[0].func, GroupFunc::ByDay);
        assert_eq!(c.group_by()[1].func, GroupFunc::ByAttr);
    }
}
