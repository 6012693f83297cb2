//! # Sphinx Search
//!
//! A client for Sphinx/Manticore `searchd` that speaks both of its protocols
//! behind one interface.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Query + SearchCriteria                   │
//! │  • Filters, ranges, orders, grouping, weights, paging      │
//! │  • Validated on every mutation, batch calls all-or-nothing │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//! ┌───────────────────────────┐   ┌───────────────────────────┐
//! │      ApiConnection        │   │       QlConnection        │
//! │  • Resets the stateful    │   │  • QlTranslator renders   │
//! │    SphinxApi client       │   │    SELECT + SHOW META     │
//! │  • Queues, one round trip │   │  • MySqlWire (sqlx) runs  │
//! └───────────────────────────┘   └───────────────────────────┘
//!              │                               │
//!              └───────────────┬───────────────┘
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SearchResult                         │
//! │  • found / found_total from meta                           │
//! │  • SearchMatch decoded lazily, once per slot               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sphinx_search::{
//!     FilterSpec, MySqlWire, QlConnection, Query, SearchCriteria, SphinxConfig,
//!     SphinxConnection,
//! };
//!
//! fn main() -> sphinx_search::Result<()> {
//!     let config = SphinxConfig::default();
//!     let mut conn = QlConnection::from_config(&config, MySqlWire::new()?);
//!     conn.open()?;
//!
//!     let mut criteria = SearchCriteria::new();
//!     criteria.add_filter(FilterSpec::new("user_id", vec![1000, 2000]))?;
//!     criteria.set_limit(10);
//!
//!     let result = conn.execute_query(&Query::with_criteria("Article", "articles", criteria))?;
//!     for m in &result {
//!         println!("{} ({}): {:?}", m.id(), m.weight(), m.try_get_attribute("user_id"));
//!     }
//!     println!("{} of {}", result.found(), result.found_total());
//!
//!     conn.close()
//! }
//! ```
//!
//! ## Modules
//!
//! - [`criteria`]: Search criteria, filter specs and protocol enums
//! - [`query`]: Query text + index list + criteria
//! - [`connection`]: The [`SphinxConnection`] trait and both adapters
//! - [`ql`]: SphinxQL statement building and translation
//! - [`transport`]: Raw protocol seams ([`SphinxApi`], [`SqlWire`])
//! - [`result`]: Lazily decoded result sets

pub mod config;
pub mod connection;
pub mod criteria;
pub mod error;
pub mod metrics;
pub mod ql;
pub mod query;
pub mod result;
pub mod transport;

pub use config::{ServerAddr, SphinxConfig};
pub use connection::{ApiConnection, ExcerptOptions, Keyword, QlConnection, SphinxConnection};
pub use criteria::{
    AttrValue, CriteriaInit, Filter, FilterKey, FilterSpec, FilterValues, GroupBy, GroupFunc,
    IdfMode, MatchMode, RangeBound, RangeFilter, RangeSpec, RankingMode, SearchCriteria,
    SortDirection, SortMethod, SortMode,
};
pub use error::{Result, SphinxError};
pub use metrics::LatencyTimer;
pub use query::{Indexes, Query};
pub use result::{SearchMatch, SearchResult};
pub use transport::{MySqlWire, RowSet, SphinxApi, SqlWire};
