// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query → SphinxQL translation.
//!
//! # Rendered shape
//!
//! ```sql
//! SELECT <select> FROM <index>, <index>
//!   WHERE MATCH(?) AND id >= ? AND id <= ? AND attr IN (?, ..) AND attr BETWEEN ? AND ?
//!   GROUP BY DAY(attr) WITHIN GROUP ORDER BY @groupby desc
//!   ORDER BY a ASC, b DESC
//!   LIMIT <offset>, <limit>
//!   OPTION max_matches=.., field_weights=(title=10), ranker=bm25
//! ```

use tracing::debug;

use super::statement::{float_literal, quote, QlCriteria, QlStatement, SqlParam};
use crate::criteria::{AttrValue, RangeBound, RankingMode, SearchCriteria, SortMode};
use crate::error::{Result, SphinxError};
use crate::query::Query;

const BACKEND: &str = "SphinxQL";

/// Metadata statement sent after every select.
pub const SHOW_META: &str = "SHOW META";

/// Stateless SphinxQL translator.
pub struct QlTranslator;

impl QlTranslator {
    /// Translates one query. `default_timeout_ms` applies when the criteria
    /// carry no query timeout of their own.
    pub fn translate(query: &Query, default_timeout_ms: Option<u32>) -> Result<QlStatement> {
        let criteria = query.criteria();
        let mut ql = QlCriteria {
            select: Self::select(criteria),
            from: query.index_names().collect::<Vec<_>>().join(", "),
            ..Default::default()
        };

        if !query.text().is_empty() {
            ql.add_condition("MATCH(?)");
            ql.params.push(SqlParam::Text(query.text().to_string()));
        }
        if let (Some(min), Some(max)) = (criteria.min_id(), criteria.max_id()) {
            ql.add_condition("id >= ?");
            ql.params.push(SqlParam::UInt(min));
            ql.add_condition("id <= ?");
            ql.params.push(SqlParam::UInt(max));
        }

        for filter in criteria.filters().values() {
            let values = filter.values.iter().map(value_param).collect();
            ql.add_in_condition(&filter.attribute, values, filter.exclude);
        }
        for range in criteria.range_filters().values() {
            ql.add_between_condition(
                &range.attribute,
                bound_param(range.min),
                bound_param(range.max),
                range.exclude,
            );
        }

        Self::apply_group(&mut ql, criteria)?;
        ql.order = Self::order(criteria)?;
        if criteria.is_limited() {
            ql.limit = Some((criteria.offset(), criteria.limit()));
        }
        Self::apply_options(&mut ql, criteria, default_timeout_ms)?;

        let stmt = ql.into_statement();
        debug!(sql = %stmt.sql, params = stmt.params.len(), "Translated query to SphinxQL");
        Ok(stmt)
    }

    fn select(criteria: &SearchCriteria) -> String {
        match criteria.group_distinct() {
            Some(attr) => format!(
                "{}, COUNT(DISTINCT {attr}) AS distinct_count",
                criteria.select()
            ),
            None => criteria.select().to_string(),
        }
    }

    fn apply_group(ql: &mut QlCriteria, criteria: &SearchCriteria) -> Result<()> {
        let groups = criteria.group_by();
        if groups.len() > 1 {
            return Err(SphinxError::ProtocolLimit {
                backend: BACKEND,
                reason: format!("grouping by {} attributes, only one is allowed", groups.len()),
            });
        }
        if let Some(group) = groups.first() {
            ql.group = Some(group.func.ql_expression(&group.attribute));
            ql.within_group_order = Some(criteria.group_by_sort().to_string());
        }
        Ok(())
    }

    fn order(criteria: &SearchCriteria) -> Result<Option<String>> {
        if criteria.sort_mode() == SortMode::Extended {
            let orders = criteria.orders()?;
            if orders.is_empty() {
                return Ok(None);
            }
            let rendered: Vec<String> = orders
                .iter()
                .map(|(attr, dir)| format!("{attr} {dir}"))
                .collect();
            return Ok(Some(rendered.join(", ")));
        }

        let sort_by = match criteria.sort_by()? {
            Some(s) if !s.trim().is_empty() => s,
            _ => return Ok(None),
        };
        match criteria.sort_mode() {
            SortMode::AttrAsc => Ok(Some(format!("{sort_by} ASC"))),
            SortMode::AttrDesc => Ok(Some(format!("{sort_by} DESC"))),
            SortMode::Relevance => Ok(Some("@weight DESC".to_string())),
            other => Err(SphinxError::ProtocolLimit {
                backend: BACKEND,
                reason: format!("sort mode {other}"),
            }),
        }
    }

    fn apply_options(
        ql: &mut QlCriteria,
        criteria: &SearchCriteria,
        default_timeout_ms: Option<u32>,
    ) -> Result<()> {
        if let Some(v) = criteria.max_matches() {
            ql.add_option("max_matches", v.to_string());
        }
        if let Some(v) = criteria.cut_off() {
            ql.add_option("cutoff", v.to_string());
        }
        if !criteria.index_weights().is_empty() {
            ql.add_option("index_weights", weight_list(criteria.index_weights()));
        }
        if !criteria.field_weights().is_empty() {
            ql.add_option("field_weights", weight_list(criteria.field_weights()));
        }
        if let Some(comment) = criteria.comment().filter(|c| !c.is_empty()) {
            ql.add_option("comment", quote(comment));
        }
        if let Some(on) = criteria.boolean_simplify() {
            ql.add_option("boolean_simplify", flag(on));
        }
        if let Some(on) = criteria.reverse_scan() {
            ql.add_option("reverse_scan", flag(on));
        }
        if let Some(method) = criteria.sort_method() {
            ql.add_option("sort_method", method.as_str());
        }
        if let Some(on) = criteria.global_idf() {
            ql.add_option("global_idf", flag(on));
        }
        if let Some(idf) = criteria.idf() {
            ql.add_option("idf", idf.as_str());
        }
        if let Some(ms) = criteria.query_timeout().or(default_timeout_ms) {
            ql.add_option("max_query_time", ms.to_string());
        }
        if let Some(mode) = criteria.ranking_mode() {
            ql.add_option("ranker", ranker(mode, criteria.ranking_expression())?);
        }
        Ok(())
    }
}

/// `ranker` option value; `Expr` needs a non-empty expression.
pub(crate) fn ranker(mode: RankingMode, expression: &str) -> Result<String> {
    if mode != RankingMode::Expr {
        return Ok(mode.name().to_string());
    }
    if expression.trim().is_empty() {
        return Err(SphinxError::validation(
            "expression ranking mode requires a ranking expression",
        ));
    }
    Ok(format!("expr({})", quote(expression)))
}

fn weight_list(weights: &indexmap::IndexMap<String, u32>) -> String {
    let pairs: Vec<String> = weights.iter().map(|(k, w)| format!("{k}={w}")).collect();
    format!("({})", pairs.join(", "))
}

fn flag(on: bool) -> &'static str {
    if on {
        "1"
    } else {
        "0"
    }
}

fn value_param(value: &AttrValue) -> SqlParam {
    match value {
        AttrValue::Int(v) => SqlParam::Int(*v),
        AttrValue::Float(v) => SqlParam::Float(*v),
        AttrValue::Text(v) => SqlParam::Text(v.clone()),
    }
}

fn bound_param(bound: RangeBound) -> SqlParam {
    match bound {
        RangeBound::Int(v) => SqlParam::Int(v),
        RangeBound::Float(v) => SqlParam::Float(v),
    }
}

/// Builds the statement list for a batch: each select is followed by `SHOW META`.
pub fn batch_statements(queries: &[Query], default_timeout_ms: Option<u32>) -> Result<Vec<String>> {
    let mut statements = Vec::with_capacity(queries.len() * 2);
    for query in queries {
        statements.push(QlTranslator::translate(query, default_timeout_ms)?.bind());
        statements.push(SHOW_META.to_string());
    }
    Ok(statements)
}

/// Rendered `CALL SNIPPETS` statement.
pub fn snippets_statement(
    docs: &[String],
    index: &str,
    words: &str,
    options: &indexmap::IndexMap<String, AttrValue>,
) -> String {
    let docs: Vec<String> = docs.iter().map(|d| quote(d)).collect();
    let mut sql = format!(
        "CALL SNIPPETS(({}), {}, {}",
        docs.join(", "),
        quote(index),
        quote(words)
    );
    for (name, value) in options {
        let literal = match value {
            AttrValue::Int(v) => v.to_string(),
            AttrValue::Float(v) => float_literal(*v),
            AttrValue::Text(v) => quote(v),
        };
        sql.push_str(&format!(", {literal} AS {name}"));
    }
    sql.push(')');
    sql
}

/// Rendered `CALL KEYWORDS` statement.
pub fn keywords_statement(query: &str, index: &str, hits: bool) -> String {
    format!(
        "CALL KEYWORDS({}, {}, {})",
        quote(query),
        quote(index),
        flag(hits)
    )
}
