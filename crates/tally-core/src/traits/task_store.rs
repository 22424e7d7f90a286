// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task repository trait: CRUD over tasks scoped by chat identity.

use async_trait::async_trait;

use crate::error::TallyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatId, SummaryCounts, Task, TaskId};

/// Repository of tasks, partitioned by chat.
///
/// Every operation is scoped by `chat_id`; an id from one chat must never
/// resolve to another chat's task. Implementations truncate descriptions to
/// their configured maximum length before storage and keep creation order
/// stable for listings. The controller is written against this trait only,
/// so durable and in-memory backends are interchangeable.
#[async_trait]
pub trait TaskStore: PluginAdapter {
    /// Creates a new incomplete task. The description is truncated, never
    /// rejected, when it exceeds the configured maximum length.
    async fn add(&self, chat_id: ChatId, description: &str) -> Result<Task, TallyError>;

    /// All incomplete tasks for the chat, in creation order.
    async fn list_incomplete(&self, chat_id: ChatId) -> Result<Vec<Task>, TallyError>;

    /// Looks up a task by `(chat_id, id)`. Returns `None` when the id does
    /// not exist for that chat.
    async fn get_by_id(&self, chat_id: ChatId, id: TaskId) -> Result<Option<Task>, TallyError>;

    /// Marks a task completed. Idempotent when already completed; returns
    /// [`TallyError::TaskNotFound`] when the task is absent for that chat.
    async fn complete(&self, chat_id: ChatId, id: TaskId) -> Result<(), TallyError>;

    /// Removes a task entirely. Returns [`TallyError::TaskNotFound`] when
    /// absent for that chat.
    async fn delete(&self, chat_id: ChatId, id: TaskId) -> Result<(), TallyError>;

    /// Number of incomplete tasks for the chat.
    async fn count_incomplete(&self, chat_id: ChatId) -> Result<i64, TallyError>;

    /// Completed and total task counts for the day summary.
    async fn summary_counts(&self, chat_id: ChatId) -> Result<SummaryCounts, TallyError>;

    /// Day-end rollover: deletes every completed task for the chat, leaving
    /// incomplete tasks untouched.
    async fn reset_completed(&self, chat_id: ChatId) -> Result<(), TallyError>;
}
