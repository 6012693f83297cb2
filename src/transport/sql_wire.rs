// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::config::ServerAddr;
use crate::error::SphinxError;

/// Rows returned by one statement: ordered column → value maps.
pub type RowSet = Vec<Map<String, Value>>;

/// A MySQL-wire connection speaking SphinxQL.
///
/// Statements arrive fully bound. `execute` returns one row set per
/// statement, in statement order, or fails as a whole.
pub trait SqlWire {
    fn open(&mut self, server: &ServerAddr, connect_timeout: Duration) -> Result<(), SphinxError>;
    fn close(&mut self) -> Result<(), SphinxError>;
    fn is_active(&self) -> bool;
    /// Client-side limit on each statement round trip. Ignored by default.
    fn set_read_timeout(&mut self, _timeout: Option<Duration>) {}
    fn execute(&mut self, statements: &[String]) -> Result<Vec<RowSet>, SphinxError>;
}
