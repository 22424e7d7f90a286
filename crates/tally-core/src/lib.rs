// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tally task bot.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Tally workspace. The conversation
//! controller and all backends are written against the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TallyError;
pub use types::{
    AdapterType, BotMessage, ChatEvent, ChatId, EventKind, HealthStatus, InlineButton, Keyboard,
    Reply, SessionState, SummaryCounts, Task, TaskId, TextFormat,
};

// Re-export all adapter traits at crate root.
pub use traits::{PluginAdapter, ReplySink, SessionStore, TaskStore};
