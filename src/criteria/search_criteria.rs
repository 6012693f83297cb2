// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The search criteria model.
//!
//! Collections follow one pattern: `add_*` appends one validated entry,
//! `add_*s` appends a batch, `replace_*` is `reset_*` followed by `add_*s`,
//! and `reset_*` clears. Every failing call leaves the model unchanged; batch
//! calls validate the whole batch before touching any state.
//!
//! # Example
//!
//! ```
//! use sphinx_search::{FilterSpec, RangeSpec, SearchCriteria, SortDirection, SortMode};
//!
//! let mut criteria = SearchCriteria::new();
//! criteria.add_filter(FilterSpec::new("user_id", vec![1000, 2000])).unwrap();
//! criteria.add_range_filter(RangeSpec::new("rating", 0, 10.0)).unwrap();
//! criteria.set_sort_mode(SortMode::Extended);
//! criteria.add_order("rating", SortDirection::Desc).unwrap();
//! criteria.set_limits(0, 10);
//!
//! assert_eq!(criteria.filters().len(), 1);
//! assert!(criteria.range_filters().values().all(|r| r.is_float()));
//! ```

use indexmap::IndexMap;

use super::enums::{GroupFunc, IdfMode, MatchMode, RankingMode, SortDirection, SortMethod, SortMode};
use super::filters::{Filter, FilterKey, FilterSpec, KeyedMap, RangeFilter, RangeSpec};
use crate::error::{Result, SphinxError};

pub const DEFAULT_SELECT: &str = "*";
pub const DEFAULT_LIMIT: u32 = 20;
pub const DEFAULT_GROUP_BY_SORT: &str = "@groupby desc";

/// One grouping entry.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    pub attribute: String,
    pub func: GroupFunc,
}

/// Mutable description of one logical search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    select: String,
    filters: KeyedMap<Filter>,
    range_filters: KeyedMap<RangeFilter>,
    sort_mode: SortMode,
    sort_by: Option<String>,
    orders: IndexMap<String, SortDirection>,
    match_mode: MatchMode,
    ranking_mode: Option<RankingMode>,
    ranking_expression: String,
    field_weights: IndexMap<String, u32>,
    index_weights: IndexMap<String, u32>,
    group_by: Vec<GroupBy>,
    group_by_sort: String,
    group_distinct: Option<String>,
    min_id: Option<u64>,
    max_id: Option<u64>,
    offset: u32,
    limit: u32,
    max_matches: Option<u32>,
    cut_off: Option<u32>,
    comment: Option<String>,
    boolean_simplify: Option<bool>,
    reverse_scan: Option<bool>,
    sort_method: Option<SortMethod>,
    global_idf: Option<bool>,
    idf: Option<IdfMode>,
    query_timeout: Option<u32>,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            select: DEFAULT_SELECT.to_string(),
            filters: KeyedMap::default(),
            range_filters: KeyedMap::default(),
            sort_mode: SortMode::default(),
            sort_by: None,
            orders: IndexMap::new(),
            match_mode: MatchMode::default(),
            ranking_mode: None,
            ranking_expression: String::new(),
            field_weights: IndexMap::new(),
            index_weights: IndexMap::new(),
            group_by: Vec::new(),
            group_by_sort: DEFAULT_GROUP_BY_SORT.to_string(),
            group_distinct: None,
            min_id: None,
            max_id: None,
            offset: 0,
            limit: DEFAULT_LIMIT,
            max_matches: None,
            cut_off: None,
            comment: None,
            boolean_simplify: None,
            reverse_scan: None,
            sort_method: None,
            global_idf: None,
            idf: None,
            query_timeout: None,
        }
    }
}

fn non_empty(name: &str, what: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SphinxError::Validation(format!("{what} must not be empty")));
    }
    Ok(())
}

fn weight(name: &str, weight: i64, what: &str) -> Result<u32> {
    non_empty(name, what)?;
    match u32::try_from(weight) {
        Ok(w) if w > 0 => Ok(w),
        _ => Err(SphinxError::Validation(format!(
            "{what} weight for \"{name}\" must be a positive integer, got {weight}"
        ))),
    }
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Projection
    // ---------------------------------------------------------------------

    pub fn select(&self) -> &str {
        &self.select
    }

    pub fn set_select(&mut self, select: impl Into<String>) -> Result<&mut Self> {
        let select = select.into();
        non_empty(&select, "select expression")?;
        self.select = select;
        Ok(self)
    }

    // ---------------------------------------------------------------------
    // Value filters
    // ---------------------------------------------------------------------

    pub fn filters(&self) -> &KeyedMap<Filter> {
        &self.filters
    }

    /// Adds one filter and returns the key it was stored under.
    pub fn add_filter(&mut self, spec: FilterSpec) -> Result<FilterKey> {
        let (key, filter) = spec.validate()?;
        Ok(self.filters.insert(key, filter))
    }

    pub fn add_filters(&mut self, specs: impl IntoIterator<Item = FilterSpec>) -> Result<()> {
        for (key, filter) in validate_batch(specs, FilterSpec::validate, "filters")? {
            self.filters.insert(key, filter);
        }
        Ok(())
    }

    pub fn replace_filters(&mut self, specs: impl IntoIterator<Item = FilterSpec>) -> Result<()> {
        let validated = validate_batch(specs, FilterSpec::validate, "filters")?;
        self.reset_filters();
        for (key, filter) in validated {
            self.filters.insert(key, filter);
        }
        Ok(())
    }

    pub fn reset_filters(&mut self) {
        self.filters.clear();
    }

    pub fn delete_filter(&mut self, key: &FilterKey) -> Option<Filter> {
        self.filters.remove(key)
    }

    // ---------------------------------------------------------------------
    // Range filters
    // ---------------------------------------------------------------------

    pub fn range_filters(&self) -> &KeyedMap<RangeFilter> {
        &self.range_filters
    }

    /// Adds one range filter. If either bound is a float both are stored as floats.
    pub fn add_range_filter(&mut self, spec: RangeSpec) -> Result<FilterKey> {
        let (key, range) = spec.validate()?;
        Ok(self.range_filters.insert(key, range))
    }

    pub fn add_range_filters(&mut self, specs: impl IntoIterator<Item = RangeSpec>) -> Result<()> {
        for (key, range) in validate_batch(specs, RangeSpec::validate, "range filters")? {
            self.range_filters.insert(key, range);
        }
        Ok(())
    }

    pub fn replace_range_filters(
        &mut self,
        specs: impl IntoIterator<Item = RangeSpec>,
    ) -> Result<()> {
        let validated = validate_batch(specs, RangeSpec::validate, "range filters")?;
        self.reset_range_filters();
        for (key, range) in validated {
            self.range_filters.insert(key, range);
        }
        Ok(())
    }

    pub fn reset_range_filters(&mut self) {
        self.range_filters.clear();
    }

    pub fn delete_range_filter(&mut self, key: &FilterKey) -> Option<RangeFilter> {
        self.range_filters.remove(key)
    }

    // ---------------------------------------------------------------------
    // Sorting
    // ---------------------------------------------------------------------

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) -> &mut Self {
        self.sort_mode = mode;
        self
    }

    /// Single-field sort spec. Not available in [`SortMode::Extended`].
    pub fn sort_by(&self) -> Result<Option<&str>> {
        self.check_not_extended("sort_by")?;
        Ok(self.sort_by.as_deref())
    }

    pub fn set_sort_by(&mut self, sort_by: impl Into<String>) -> Result<&mut Self> {
        self.check_not_extended("set_sort_by")?;
        self.sort_by = Some(sort_by.into());
        Ok(self)
    }

    /// Extended-mode ordering. Only available in [`SortMode::Extended`].
    pub fn orders(&self) -> Result<&IndexMap<String, SortDirection>> {
        self.check_extended("orders")?;
        Ok(&self.orders)
    }

    pub fn add_order(&mut self, attribute: impl Into<String>, direction: SortDirection) -> Result<()> {
        self.check_extended("add_order")?;
        let attribute = attribute.into();
        non_empty(&attribute, "order attribute")?;
        self.orders.insert(attribute, direction);
        Ok(())
    }

    /// Adds orders from `(attribute, direction)` pairs; directions are parsed
    /// case-insensitively.
    pub fn add_orders<A, D>(&mut self, orders: impl IntoIterator<Item = (A, D)>) -> Result<()>
    where
        A: Into<String>,
        D: AsRef<str>,
    {
        self.check_extended("add_orders")?;
        let parsed = parse_orders(orders)?;
        self.orders.extend(parsed);
        Ok(())
    }

    pub fn replace_orders<A, D>(&mut self, orders: impl IntoIterator<Item = (A, D)>) -> Result<()>
    where
        A: Into<String>,
        D: AsRef<str>,
    {
        self.check_extended("replace_orders")?;
        let parsed = parse_orders(orders)?;
        self.orders = parsed.into_iter().collect();
        Ok(())
    }

    pub fn reset_orders(&mut self) -> Result<()> {
        self.check_extended("reset_orders")?;
        self.orders.clear();
        Ok(())
    }

    fn check_extended(&self, op: &str) -> Result<()> {
        if self.sort_mode != SortMode::Extended {
            return Err(SphinxError::Validation(format!(
                "{op} is only allowed in extended sort mode, use sort_by"
            )));
        }
        Ok(())
    }

    fn check_not_extended(&self, op: &str) -> Result<()> {
        if self.sort_mode == SortMode::Extended {
            return Err(SphinxError::Validation(format!(
                "{op} is not allowed in extended sort mode, use orders"
            )));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Matching and ranking
    // ---------------------------------------------------------------------

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    pub fn set_match_mode(&mut self, mode: MatchMode) -> &mut Self {
        self.match_mode = mode;
        self
    }

    pub fn ranking_mode(&self) -> Option<RankingMode> {
        self.ranking_mode
    }

    pub fn set_ranking_mode(&mut self, mode: RankingMode) -> &mut Self {
        self.ranking_mode = Some(mode);
        self
    }

    pub fn reset_ranking_mode(&mut self) -> &mut Self {
        self.ranking_mode = None;
        self
    }

    /// Expression used by [`RankingMode::Expr`].
    pub fn ranking_expression(&self) -> &str {
        &self.ranking_expression
    }

    pub fn set_ranking_expression(&mut self, expr: impl Into<String>) -> &mut Self {
        self.ranking_expression = expr.into();
        self
    }

    // ---------------------------------------------------------------------
    // Weights
    // ---------------------------------------------------------------------

    pub fn field_weights(&self) -> &IndexMap<String, u32> {
        &self.field_weights
    }

    pub fn add_field_weight(&mut self, field: impl Into<String>, value: i64) -> Result<()> {
        let field = field.into();
        let w = weight(&field, value, "field")?;
        self.field_weights.insert(field, w);
        Ok(())
    }

    pub fn add_field_weights<F: Into<String>>(
        &mut self,
        weights: impl IntoIterator<Item = (F, i64)>,
    ) -> Result<()> {
        let parsed = collect_weights(weights, "field")?;
        self.field_weights.extend(parsed);
        Ok(())
    }

    pub fn replace_field_weights<F: Into<String>>(
        &mut self,
        weights: impl IntoIterator<Item = (F, i64)>,
    ) -> Result<()> {
        let parsed = collect_weights(weights, "field")?;
        self.field_weights = parsed.into_iter().collect();
        Ok(())
    }

    pub fn reset_field_weights(&mut self) {
        self.field_weights.clear();
    }

    pub fn index_weights(&self) -> &IndexMap<String, u32> {
        &self.index_weights
    }

    pub fn add_index_weight(&mut self, index: impl Into<String>, value: i64) -> Result<()> {
        let index = index.into();
        let w = weight(&index, value, "index")?;
        self.index_weights.insert(index, w);
        Ok(())
    }

    pub fn add_index_weights<I: Into<String>>(
        &mut self,
        weights: impl IntoIterator<Item = (I, i64)>,
    ) -> Result<()> {
        let parsed = collect_weights(weights, "index")?;
        self.index_weights.extend(parsed);
        Ok(())
    }

    pub fn replace_index_weights<I: Into<String>>(
        &mut self,
        weights: impl IntoIterator<Item = (I, i64)>,
    ) -> Result<()> {
        let parsed = collect_weights(weights, "index")?;
        self.index_weights = parsed.into_iter().collect();
        Ok(())
    }

    pub fn reset_index_weights(&mut self) {
        self.index_weights.clear();
    }

    // ---------------------------------------------------------------------
    // Grouping
    // ---------------------------------------------------------------------

    pub fn group_by(&self) -> &[GroupBy] {
        &self.group_by
    }

    pub fn add_group_by(&mut self, attribute: impl Into<String>, func: GroupFunc) -> Result<()> {
        let attribute = attribute.into();
        non_empty(&attribute, "group-by attribute")?;
        self.group_by.push(GroupBy { attribute, func });
        Ok(())
    }

    /// Single-attribute grouping: replaces any existing group-by entries.
    pub fn set_group_by(&mut self, attribute: impl Into<String>, func: GroupFunc) -> Result<()> {
        let attribute = attribute.into();
        non_empty(&attribute, "group-by attribute")?;
        self.group_by = vec![GroupBy { attribute, func }];
        Ok(())
    }

    pub fn reset_group_by(&mut self) {
        self.group_by.clear();
    }

    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty()
    }

    /// Ordering of groups (`WITHIN GROUP ORDER BY` on SphinxQL).
    pub fn group_by_sort(&self) -> &str {
        &self.group_by_sort
    }

    pub fn set_group_by_sort(&mut self, sort: impl Into<String>) -> Result<&mut Self> {
        let sort = sort.into();
        non_empty(&sort, "group sort")?;
        self.group_by_sort = sort;
        Ok(self)
    }

    pub fn group_distinct(&self) -> Option<&str> {
        self.group_distinct.as_deref()
    }

    pub fn set_group_distinct(&mut self, attribute: impl Into<String>) -> Result<&mut Self> {
        let attribute = attribute.into();
        non_empty(&attribute, "group distinct attribute")?;
        self.group_distinct = Some(attribute);
        Ok(self)
    }

    pub fn reset_group_distinct(&mut self) {
        self.group_distinct = None;
    }

    // ---------------------------------------------------------------------
    // Document id range
    // ---------------------------------------------------------------------

    pub fn min_id(&self) -> Option<u64> {
        self.min_id
    }

    pub fn max_id(&self) -> Option<u64> {
        self.max_id
    }

    pub fn set_min_id(&mut self, min: u64) -> &mut Self {
        self.min_id = Some(min);
        self
    }

    pub fn set_max_id(&mut self, max: u64) -> &mut Self {
        self.max_id = Some(max);
        self
    }

    pub fn set_id_range(&mut self, min: u64, max: u64) -> Result<&mut Self> {
        if min > max {
            return Err(SphinxError::Validation(format!(
                "id range minimum {min} exceeds maximum {max}"
            )));
        }
        self.min_id = Some(min);
        self.max_id = Some(max);
        Ok(self)
    }

    pub fn reset_id_range(&mut self) {
        self.min_id = None;
        self.max_id = None;
    }

    /// The id range only applies once both bounds are set.
    pub fn is_id_range_set(&self) -> bool {
        self.min_id.is_some() && self.max_id.is_some()
    }

    // ---------------------------------------------------------------------
    // Paging
    // ---------------------------------------------------------------------

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn set_offset(&mut self, offset: u32) -> &mut Self {
        self.offset = offset;
        self
    }

    /// A limit of zero disables paging.
    pub fn set_limit(&mut self, limit: u32) -> &mut Self {
        self.limit = limit;
        self
    }

    pub fn set_limits(&mut self, offset: u32, limit: u32) -> &mut Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    pub fn is_limited(&self) -> bool {
        self.limit > 0
    }

    // ---------------------------------------------------------------------
    // Per-query options
    // ---------------------------------------------------------------------

    pub fn max_matches(&self) -> Option<u32> {
        self.max_matches
    }

    pub fn set_max_matches(&mut self, max_matches: u32) -> &mut Self {
        self.max_matches = Some(max_matches);
        self
    }

    pub fn cut_off(&self) -> Option<u32> {
        self.cut_off
    }

    pub fn set_cut_off(&mut self, cut_off: u32) -> &mut Self {
        self.cut_off = Some(cut_off);
        self
    }

    /// Comment copied verbatim into the daemon's query log.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn boolean_simplify(&self) -> Option<bool> {
        self.boolean_simplify
    }

    pub fn set_boolean_simplify(&mut self, on: bool) -> &mut Self {
        self.boolean_simplify = Some(on);
        self
    }

    pub fn reverse_scan(&self) -> Option<bool> {
        self.reverse_scan
    }

    pub fn set_reverse_scan(&mut self, on: bool) -> &mut Self {
        self.reverse_scan = Some(on);
        self
    }

    pub fn sort_method(&self) -> Option<SortMethod> {
        self.sort_method
    }

    pub fn set_sort_method(&mut self, method: SortMethod) -> &mut Self {
        self.sort_method = Some(method);
        self
    }

    pub fn global_idf(&self) -> Option<bool> {
        self.global_idf
    }

    pub fn set_global_idf(&mut self, on: bool) -> &mut Self {
        self.global_idf = Some(on);
        self
    }

    pub fn idf(&self) -> Option<IdfMode> {
        self.idf
    }

    pub fn set_idf(&mut self, idf: IdfMode) -> &mut Self {
        self.idf = Some(idf);
        self
    }

    /// Per-query timeout in milliseconds, overriding the connection's.
    pub fn query_timeout(&self) -> Option<u32> {
        self.query_timeout
    }

    pub fn set_query_timeout(&mut self, ms: u32) -> &mut Self {
        self.query_timeout = Some(ms);
        self
    }
}

fn validate_batch<S, T>(
    specs: impl IntoIterator<Item = S>,
    validate: fn(S) -> Result<(Option<FilterKey>, T)>,
    what: &str,
) -> Result<Vec<(Option<FilterKey>, T)>> {
    let validated = specs.into_iter().map(validate).collect::<Result<Vec<_>>>()?;
    if validated.is_empty() {
        return Err(SphinxError::Validation(format!("{what} must be a non-empty list")));
    }
    Ok(validated)
}

fn parse_orders<A, D>(orders: impl IntoIterator<Item = (A, D)>) -> Result<Vec<(String, SortDirection)>>
where
    A: Into<String>,
    D: AsRef<str>,
{
    let parsed = orders
        .into_iter()
        .map(|(attr, dir)| {
            let attr = attr.into();
            non_empty(&attr, "order attribute")?;
            Ok((attr, dir.as_ref().parse::<SortDirection>()?))
        })
        .collect::<Result<Vec<_>>>()?;
    if parsed.is_empty() {
        return Err(SphinxError::validation("orders must be a non-empty list"));
    }
    Ok(parsed)
}

fn collect_weights<N: Into<String>>(
    weights: impl IntoIterator<Item = (N, i64)>,
    what: &str,
) -> Result<Vec<(String, u32)>> {
    let parsed = weights
        .into_iter()
        .map(|(name, value)| {
            let name = name.into();
            let w = weight(&name, value, what)?;
            Ok((name, w))
        })
        .collect::<Result<Vec<_>>>()?;
    if parsed.is_empty() {
        return Err(SphinxError::Validation(format!(
            "{what} weights must be a non-empty list"
        )));
    }
    Ok(parsed)
}
