// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-chat session state: conversation state enum plus active task pointer.

use async_trait::async_trait;

use crate::error::TallyError;
use crate::types::{ChatId, SessionState, Task};

/// Store of per-chat conversation state.
///
/// Entries are created lazily on first contact and default to
/// [`SessionState::Idle`] with no active task. This store performs no
/// validation: the state/active-task invariant is enforced by the
/// conversation controller, the only component that mutates it.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Current state for the chat; `Idle` when unseen.
    async fn get_state(&self, chat_id: ChatId) -> Result<SessionState, TallyError>;

    /// Overwrites the state for the chat. Always succeeds.
    async fn set_state(&self, chat_id: ChatId, state: SessionState) -> Result<(), TallyError>;

    /// The task currently selected within the chat, if any.
    async fn get_active_task(&self, chat_id: ChatId) -> Result<Option<Task>, TallyError>;

    /// Records the task as active for the chat (last write wins).
    async fn set_active_task(&self, chat_id: ChatId, task: Task) -> Result<(), TallyError>;

    /// Clears the active task reference for the chat.
    async fn clear_active_task(&self, chat_id: ChatId) -> Result<(), TallyError>;
}
