// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task persistence for tally.
//!
//! Two [`TaskStore`](tally_core::TaskStore) implementations share identical
//! semantics: [`SqliteTaskStore`] persists to disk through tokio-rusqlite
//! with refinery migrations, [`MemoryTaskStore`] keeps everything in process
//! memory for tests and ephemeral runs.

pub mod adapter;
pub mod database;
pub mod memory;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteTaskStore;
pub use database::Database;
pub use memory::MemoryTaskStore;

/// Clamp a description to `max_len` characters. Long input is kept, never
/// rejected; the cut lands on a char boundary.
pub(crate) fn truncate_description(description: &str, max_len: usize) -> String {
    description.chars().take(max_len).collect()
}
