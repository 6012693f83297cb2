// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SphinxQL rendering.

pub mod statement;
pub mod translator;

pub use statement::{escape_query_text, QlCriteria, QlStatement, SqlParam};
pub use translator::{QlTranslator, SHOW_META};
