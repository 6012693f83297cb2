// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use thiserror::Error;

/// Every failure the client can surface.
///
/// Errors propagate immediately; there is no retry and a failed batch never
/// yields partial results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SphinxError {
    /// Malformed criteria input, an invalid enum token or a mode mismatch.
    #[error("Invalid argument: {0}")]
    Validation(String),

    /// The criteria describe a shape the selected backend cannot express.
    #[error("{backend} does not support {reason}")]
    ProtocolLimit {
        backend: &'static str,
        reason: String,
    },

    /// Open while open, close while closed, or use of a closed connection.
    #[error("Connection state error: {0}")]
    ConnectionState(String),

    /// The daemon or the transport reported a failure, or the payload was malformed.
    #[error("Search backend error: {0}")]
    Backend(String),

    #[error("Attribute \"{0}\" is not defined")]
    AttributeNotFound(String),
}

impl SphinxError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        SphinxError::Validation(msg.into())
    }

    pub(crate) fn backend(msg: impl Into<String>) -> Self {
        SphinxError::Backend(msg.into())
    }
}

pub type Result<T, E = SphinxError> = std::result::Result<T, E>;
