// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Closed protocol enums.
//!
//! Every enum with a wire code can be built from that code (`TryFrom<i64>`),
//! from its lower-case name (`FromStr`), or from either form when deserialized.
//! Those are the only entry points for untyped input and each one rejects
//! unknown tokens with [`SphinxError::Validation`].

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Result, SphinxError};

/// Untyped enum token as found in initializer maps: a protocol code or a name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumToken {
    Code(i64),
    Name(String),
}

macro_rules! protocol_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal => $token:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
        #[serde(try_from = "EnumToken")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Numeric code used by the binary protocol.
            pub fn code(self) -> i64 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }
        }

        impl TryFrom<i64> for $name {
            type Error = SphinxError;

            fn try_from(code: i64) -> Result<Self> {
                match code {
                    $($code => Ok($name::$variant),)+
                    other => Err(SphinxError::Validation(format!(
                        "invalid {} code {}",
                        $label, other
                    ))),
                }
            }
        }

        impl FromStr for $name {
            type Err = SphinxError;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($token => Ok($name::$variant),)+
                    _ => Err(SphinxError::Validation(format!(
                        "invalid {} \"{}\"",
                        $label, s
                    ))),
                }
            }
        }

        impl TryFrom<EnumToken> for $name {
            type Error = SphinxError;

            fn try_from(token: EnumToken) -> Result<Self> {
                match token {
                    EnumToken::Code(code) => $name::try_from(code),
                    EnumToken::Name(name) => name.parse(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

protocol_enum! {
    /// How query text is matched against documents.
    MatchMode ("match mode") {
        All = 0 => "all",
        Any = 1 => "any",
        Phrase = 2 => "phrase",
        Boolean = 3 => "boolean",
        Extended = 4 => "extended",
        FullScan = 5 => "fullscan",
        Extended2 = 6 => "extended2",
    }
}

protocol_enum! {
    /// Result ordering strategy.
    SortMode ("sort mode") {
        Relevance = 0 => "relevance",
        AttrDesc = 1 => "attr_desc",
        AttrAsc = 2 => "attr_asc",
        TimeSegments = 3 => "time_segments",
        /// SQL-like multi-field ordering, see `SearchCriteria::add_order`.
        Extended = 4 => "extended",
        Expr = 5 => "expr",
    }
}

protocol_enum! {
    /// Relevance ranking strategy. The name doubles as the SphinxQL `ranker` value.
    RankingMode ("ranking mode") {
        ProximityBm25 = 0 => "proximity_bm25",
        Bm25 = 1 => "bm25",
        None = 2 => "none",
        WordCount = 3 => "wordcount",
        Proximity = 4 => "proximity",
        MatchAny = 5 => "matchany",
        FieldMask = 6 => "fieldmask",
        Sph04 = 7 => "sph04",
        /// Requires a ranking expression.
        Expr = 8 => "expr",
    }
}

protocol_enum! {
    /// Grouping function applied to a group-by attribute.
    GroupFunc ("group function") {
        ByDay = 0 => "day",
        ByWeek = 1 => "week",
        ByMonth = 2 => "month",
        ByYear = 3 => "year",
        ByAttr = 4 => "attr",
    }
}

impl Default for MatchMode {
    fn default() -> Self {
        MatchMode::All
    }
}

impl Default for SortMode {
    fn default() -> Self {
        SortMode::Relevance
    }
}

impl Default for GroupFunc {
    fn default() -> Self {
        GroupFunc::ByAttr
    }
}

impl GroupFunc {
    /// SphinxQL rendering of `attr` grouped by this function.
    pub fn ql_expression(self, attr: &str) -> String {
        match self {
            GroupFunc::ByDay => format!("DAY({attr})"),
            GroupFunc::ByWeek => format!("WEEK({attr})"),
            GroupFunc::ByMonth => format!("MONTH({attr})"),
            GroupFunc::ByYear => format!("YEAR({attr})"),
            GroupFunc::ByAttr => attr.to_string(),
        }
    }
}

/// Direction of one extended-sort entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = SphinxError;

    /// Case-insensitive: `"asc"`, `"Desc"` and `"DESC"` are all accepted.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            _ => Err(SphinxError::Validation(format!(
                "sort direction must be ASC or DESC, got \"{s}\""
            ))),
        }
    }
}

impl TryFrom<String> for SortDirection {
    type Error = SphinxError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Match-sorting algorithm (`sort_method` option).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum SortMethod {
    /// Priority queue, the daemon default.
    Pq,
    KBuffer,
}

impl SortMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            SortMethod::Pq => "pq",
            SortMethod::KBuffer => "kbuffer",
        }
    }
}

impl FromStr for SortMethod {
    type Err = SphinxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pq" => Ok(SortMethod::Pq),
            "kbuffer" => Ok(SortMethod::KBuffer),
            _ => Err(SphinxError::Validation(format!(
                "sort method must be pq or kbuffer, got \"{s}\""
            ))),
        }
    }
}

impl TryFrom<String> for SortMethod {
    type Error = SphinxError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// IDF normalization (`idf` option).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum IdfMode {
    Normalized,
    Plain,
}

impl IdfMode {
    pub fn as_str(self) -> &'static str {
        match self {
            IdfMode::Normalized => "normalized",
            IdfMode::Plain => "plain",
        }
    }
}

impl FromStr for IdfMode {
    type Err = SphinxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normalized" => Ok(IdfMode::Normalized),
            "plain" => Ok(IdfMode::Plain),
            _ => Err(SphinxError::Validation(format!(
                "idf must be normalized or plain, got \"{s}\""
            ))),
        }
    }
}

impl TryFrom<String> for IdfMode {
    type Error = SphinxError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}
