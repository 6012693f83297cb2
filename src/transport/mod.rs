// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Transport capabilities consumed by the connections.
//!
//! - [`SphinxApi`]: the binary searchd protocol client. No implementation
//!   ships with this crate; plug in a client binding.
//! - [`SqlWire`]: a MySQL-wire connection for SphinxQL, implemented by
//!   [`MySqlWire`].

pub mod api_client;
pub mod mysql;
pub mod sql_wire;

pub use api_client::SphinxApi;
pub use mysql::MySqlWire;
pub use sql_wire::{RowSet, SqlWire};
