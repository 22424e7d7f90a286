// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tally task bot.

use thiserror::Error;

use crate::types::{ChatId, TaskId};

/// The primary error type used across all Tally adapter traits and core operations.
#[derive(Debug, Error)]
pub enum TallyError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter errors (connection failure, message format, send failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A task lookup missed: either the id does not exist for that chat or it
    /// belongs to a different chat. Always recovered into a user-facing reply,
    /// never propagated past the controller.
    #[error("task {task_id} not found for chat {chat_id}")]
    TaskNotFound { chat_id: ChatId, task_id: TaskId },

    /// A conversation-state invariant was violated (e.g. `WorkingOnTask` with
    /// no active task recorded). Indicates a bug in transition maintenance and
    /// must never be reinterpreted as a user-facing outcome.
    #[error("state invariant violated: {0}")]
    Inconsistency(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
