// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Connection configuration.
//!
//! # Example
//!
//! ```
//! use sphinx_search::SphinxConfig;
//!
//! // Minimal config (uses defaults)
//! let config = SphinxConfig::default();
//! assert_eq!(config.server().to_string(), "127.0.0.1:3314");
//!
//! // From a deserialized map, e.g. an application config section
//! let config: SphinxConfig = serde_json::from_value(serde_json::json!({
//!     "host": "search.internal",
//!     "port": 9306,
//!     "query_timeout_ms": 2000
//! }))
//! .unwrap();
//! assert_eq!(config.connect_timeout_ms, 1000);
//! ```

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, SphinxError};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3314;

/// Configuration shared by both connection kinds.
#[derive(Debug, Clone, Deserialize)]
pub struct SphinxConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect timeout (default: 1s)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Max query time sent to the daemon. `None` leaves the daemon default.
    #[serde(default)]
    pub query_timeout_ms: Option<u32>,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_connect_timeout_ms() -> u64 {
    1000
}

impl Default for SphinxConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            query_timeout_ms: None,
        }
    }
}

impl SphinxConfig {
    pub fn server(&self) -> ServerAddr {
        ServerAddr {
            host: self.host.clone(),
            port: self.port,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Daemon address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddr {
    pub host: String,
    pub port: u16,
}

impl Default for ServerAddr {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerAddr {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parses `"host"` or `"host:port"`; missing parts take the defaults.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (host, port) = match s.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    SphinxError::Validation(format!("invalid port in server address \"{s}\""))
                })?;
                (host, port)
            }
            None => (s, DEFAULT_PORT),
        };
        let host = if host.is_empty() { DEFAULT_HOST } else { host };
        Ok(Self::new(host, port))
    }
}

impl fmt::Display for ServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server() {
        assert_eq!(ServerAddr::parse("localhost").unwrap(), ServerAddr::new("localhost", 3314));
        assert_eq!(ServerAddr::parse("10.0.0.5:9306").unwrap(), ServerAddr::new("10.0.0.5", 9306));
        assert_eq!(ServerAddr::parse(":9306").unwrap(), ServerAddr::new("127.0.0.1", 9306));
        assert!(ServerAddr::parse("host:port").is_err());
    }

    #[test]
    fn test_config_defaults_from_empty_map() {
        let config: SphinxConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3314);
        assert_eq!(config.connect_timeout(), Duration::from_secs(1));
        assert_eq!(config.query_timeout_ms, None);
    }
}
