// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Connections: the two protocol adapters behind one trait.

pub mod api;
pub mod ql;
pub mod traits;

pub use api::ApiConnection;
pub use ql::QlConnection;
pub use traits::{ExcerptOptions, Keyword, SphinxConnection};
