// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SphinxQL statement assembly and parameter binding.
//!
//! Statements are assembled with `?` placeholders and a typed parameter
//! list, then bound inline before they go over the wire:
//!
//! ```sql
//! SELECT * FROM articles WHERE MATCH('Title') AND rating BETWEEN 0.0 AND 1.5 LIMIT 0, 20
//! ```
//!
//! Floats are written as bare numeric literals, the same way integers are.
//! searchd rejects quoted floats in range conditions.

use std::fmt::Write as _;

/// Typed statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl SqlParam {
    /// Literal as it appears in the bound statement.
    pub fn to_literal(&self) -> String {
        match self {
            SqlParam::Text(s) => quote(s),
            SqlParam::Int(v) => v.to_string(),
            SqlParam::UInt(v) => v.to_string(),
            SqlParam::Float(v) => float_literal(*v),
        }
    }
}

/// Single-quoted string literal with MySQL backslash escaping.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{1a}' => out.push_str("\\Z"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Decimal float literal that always carries a fractional part.
pub fn float_literal(v: f64) -> String {
    let s = v.to_string();
    if s.contains('.') || !v.is_finite() {
        s
    } else {
        format!("{s}.0")
    }
}

/// Escapes full-text query syntax characters so `text` matches literally.
pub fn escape_query_text(text: &str) -> String {
    const SPECIAL: &[char] = &[
        '\\', '(', ')', '|', '-', '!', '@', '~', '"', '&', '/', '^', '$', '=', '<',
    ];
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// A parameterized statement.
#[derive(Debug, Clone, PartialEq)]
pub struct QlStatement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl QlStatement {
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Replaces each `?` placeholder with its literal, in order.
    ///
    /// Placeholders inside quoted literals of the template are left alone.
    pub fn bind(&self) -> String {
        let mut out = String::with_capacity(self.sql.len() + self.params.len() * 8);
        let mut params = self.params.iter();
        let mut in_quote = false;
        let mut escaped = false;
        for c in self.sql.chars() {
            if in_quote {
                out.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '\'' {
                    in_quote = false;
                }
                continue;
            }
            match c {
                '\'' => {
                    in_quote = true;
                    out.push(c);
                }
                '?' => match params.next() {
                    Some(param) => out.push_str(&param.to_literal()),
                    None => out.push('?'),
                },
                c => out.push(c),
            }
        }
        out
    }
}

/// Clause-by-clause builder for one `SELECT`.
#[derive(Debug, Clone, Default)]
pub struct QlCriteria {
    pub select: String,
    pub from: String,
    pub conditions: Vec<String>,
    pub group: Option<String>,
    pub within_group_order: Option<String>,
    pub order: Option<String>,
    pub limit: Option<(u32, u32)>,
    pub options: Vec<(String, String)>,
    pub params: Vec<SqlParam>,
}

impl QlCriteria {
    pub fn add_condition(&mut self, condition: impl Into<String>) {
        self.conditions.push(condition.into());
    }

    pub fn add_in_condition(&mut self, column: &str, values: Vec<SqlParam>, negate: bool) {
        let placeholders = vec!["?"; values.len()].join(", ");
        let op = if negate { "NOT IN" } else { "IN" };
        self.conditions.push(format!("{column} {op} ({placeholders})"));
        self.params.extend(values);
    }

    pub fn add_between_condition(&mut self, column: &str, min: SqlParam, max: SqlParam, negate: bool) {
        let op = if negate { "NOT BETWEEN" } else { "BETWEEN" };
        self.conditions.push(format!("{column} {op} ? AND ?"));
        self.params.push(min);
        self.params.push(max);
    }

    pub fn add_option(&mut self, name: &str, value: impl Into<String>) {
        self.options.push((name.to_string(), value.into()));
    }

    pub fn into_statement(self) -> QlStatement {
        let mut sql = format!("SELECT {} FROM {}", self.select, self.from);
        if !self.conditions.is_empty() {
            let _ = write!(sql, " WHERE {}", self.conditions.join(" AND "));
        }
        if let Some(group) = &self.group {
            let _ = write!(sql, " GROUP BY {group}");
        }
        if let Some(order) = &self.within_group_order {
            let _ = write!(sql, " WITHIN GROUP ORDER BY {order}");
        }
        if let Some(order) = &self.order {
            let _ = write!(sql, " ORDER BY {order}");
        }
        if let Some((offset, limit)) = self.limit {
            let _ = write!(sql, " LIMIT {offset}, {limit}");
        }
        if !self.options.is_empty() {
            let options: Vec<String> = self
                .options
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            let _ = write!(sql, " OPTION {}", options.join(", "));
        }
        QlStatement {
            sql,
            params: self.params,
        }
    }
}
