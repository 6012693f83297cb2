// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search criteria: the protocol-neutral description of one search.

pub mod enums;
pub mod filters;
pub mod init;
pub mod search_criteria;

pub use enums::{
    EnumToken, GroupFunc, IdfMode, MatchMode, RankingMode, SortDirection, SortMethod, SortMode,
};
pub use filters::{
    AttrValue, Filter, FilterKey, FilterSpec, FilterValues, KeyedMap, RangeBound, RangeFilter,
    RangeSpec,
};
pub use init::CriteriaInit;
pub use search_criteria::{
    GroupBy, SearchCriteria, DEFAULT_GROUP_BY_SORT, DEFAULT_LIMIT, DEFAULT_SELECT,
};
