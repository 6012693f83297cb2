// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SphinxQL over the MySQL wire, backed by sqlx.
//!
//! searchd speaks just enough of the MySQL protocol for the text query path,
//! so the connection is configured to skip every session setup statement
//! sqlx normally issues (`SET sql_mode`, `SET NAMES`, `SET time_zone`), and
//! statements are sent unprepared.
//!
//! sqlx is async; this wire owns a current-thread tokio runtime and blocks
//! on each call so callers stay synchronous. Calls made from inside another
//! tokio runtime fail with `ConnectionState` instead of blocking it.

use std::time::Duration;

use serde_json::{Map, Number, Value};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, ConnectOptions, Connection, Executor, Row, TypeInfo};
use tokio::runtime::{Handle, Runtime};
use tracing::{debug, info, warn};

use super::sql_wire::{RowSet, SqlWire};
use crate::config::ServerAddr;
use crate::error::SphinxError;
use crate::metrics;

pub struct MySqlWire {
    runtime: Option<Runtime>,
    conn: Option<MySqlConnection>,
    read_timeout: Option<Duration>,
}

impl MySqlWire {
    pub fn new() -> Result<Self, SphinxError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SphinxError::Backend(format!("failed to start runtime: {e}")))?;
        Ok(Self {
            runtime: Some(runtime),
            conn: None,
            read_timeout: None,
        })
    }

    fn connect_options(server: &ServerAddr) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&server.host)
            .port(server.port)
            .pipes_as_concat(false)
            .no_engine_substitution(false)
            .timezone(None::<String>)
            .set_names(false)
            .statement_cache_capacity(0)
            .disable_statement_logging()
    }
}

impl SqlWire for MySqlWire {
    fn open(&mut self, server: &ServerAddr, connect_timeout: Duration) -> Result<(), SphinxError> {
        let options = Self::connect_options(server);
        let conn = blocking_runtime(&self.runtime)?
            .block_on(async {
                tokio::time::timeout(connect_timeout, MySqlConnection::connect_with(&options)).await
            })
            .map_err(|_| {
                SphinxError::Backend(format!(
                    "connect to {server} timed out after {}ms",
                    connect_timeout.as_millis()
                ))
            })?
            .map_err(|e| SphinxError::Backend(format!("connect to {server} failed: {e}")))?;

        info!(%server, "SphinxQL connection opened");
        self.conn = Some(conn);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SphinxError> {
        let runtime = blocking_runtime(&self.runtime)?;
        let conn = self
            .conn
            .take()
            .ok_or_else(|| SphinxError::ConnectionState("SphinxQL connection is not open".into()))?;
        if let Err(e) = runtime.block_on(conn.close()) {
            // The handle is gone either way
            warn!(error = %e, "SphinxQL connection did not close cleanly");
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.conn.is_some()
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.read_timeout = timeout;
    }

    fn execute(&mut self, statements: &[String]) -> Result<Vec<RowSet>, SphinxError> {
        let runtime = blocking_runtime(&self.runtime)?;
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| SphinxError::ConnectionState("SphinxQL connection is not open".into()))?;
        let read_timeout = self.read_timeout;

        runtime.block_on(async move {
            let mut sets = Vec::with_capacity(statements.len());
            for sql in statements {
                debug!(sql = %sql, "Executing SphinxQL statement");
                let fetch = (&mut *conn).fetch_all(sql.as_str());
                let rows = match read_timeout {
                    Some(limit) => tokio::time::timeout(limit, fetch).await.map_err(|_| {
                        SphinxError::Backend(format!(
                            "statement timed out after {}ms",
                            limit.as_millis()
                        ))
                    })?,
                    None => fetch.await,
                }
                .map_err(|e| SphinxError::Backend(e.to_string()))?;
                sets.push(rows.iter().map(decode_row).collect());
            }
            Ok::<_, SphinxError>(sets)
        })
    }
}

impl Drop for MySqlWire {
    fn drop(&mut self) {
        let conn = self.conn.take();
        let Some(runtime) = self.runtime.take() else {
            return;
        };
        if conn.is_some() {
            metrics::record_connection_event("sphinxql", "dropped");
        }
        if Handle::try_current().is_ok() {
            // Blocking is forbidden here: drop the socket without the quit handshake
            drop(conn);
            runtime.shutdown_background();
            return;
        }
        if let Some(conn) = conn {
            let _ = runtime.block_on(conn.close());
        }
    }
}

/// The owned runtime, unless the caller is already inside a tokio runtime.
fn blocking_runtime(runtime: &Option<Runtime>) -> Result<&Runtime, SphinxError> {
    if Handle::try_current().is_ok() {
        return Err(SphinxError::ConnectionState(
            "MySqlWire blocks and cannot be driven from inside an async runtime".into(),
        ));
    }
    runtime
        .as_ref()
        .ok_or_else(|| SphinxError::ConnectionState("SphinxQL runtime has shut down".into()))
}

/// Decodes every column as text, then types it by the declared column type.
fn decode_row(row: &MySqlRow) -> Map<String, Value> {
    let mut map = Map::new();
    for (i, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_unchecked::<Option<String>, _>(i).ok().flatten();
        let value = match raw {
            None => Value::Null,
            Some(text) => typed_value(column.type_info().name(), text),
        };
        map.insert(column.name().to_string(), value);
    }
    map
}

fn typed_value(type_name: &str, text: String) -> Value {
    let upper = type_name.to_ascii_uppercase();
    if upper.contains("INT") {
        if let Ok(v) = text.parse::<i64>() {
            return Value::Number(v.into());
        }
        if let Ok(v) = text.parse::<u64>() {
            return Value::Number(v.into());
        }
    } else if upper.contains("FLOAT") || upper.contains("DOUBLE") || upper.contains("DECIMAL") {
        if let Some(n) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }
    Value::String(text)
}
