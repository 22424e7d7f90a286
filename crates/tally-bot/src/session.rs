// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory session store.
//!
//! Conversation state is deliberately ephemeral. A restart drops every chat
//! back to `Idle` with no active task, which is always a safe place to land.

use async_trait::async_trait;
use dashmap::DashMap;

use tally_core::{ChatId, SessionState, SessionStore, TallyError, Task};

#[derive(Debug, Clone, Default)]
struct Session {
    state: SessionState,
    active_task: Option<Task>,
}

/// Per-chat session state held in a concurrent map.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<i64, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_state(&self, chat_id: ChatId) -> Result<SessionState, TallyError> {
        Ok(self
            .sessions
            .get(&chat_id.0)
            .map(|s| s.state)
            .unwrap_or_default())
    }

    async fn set_state(&self, chat_id: ChatId, state: SessionState) -> Result<(), TallyError> {
        self.sessions.entry(chat_id.0).or_default().state = state;
        Ok(())
    }

    async fn get_active_task(&self, chat_id: ChatId) -> Result<Option<Task>, TallyError> {
        Ok(self
            .sessions
            .get(&chat_id.0)
            .and_then(|s| s.active_task.clone()))
    }

    async fn set_active_task(&self, chat_id: ChatId, task: Task) -> Result<(), TallyError> {
        self.sessions.entry(chat_id.0).or_default().active_task = Some(task);
        Ok(())
    }

    async fn clear_active_task(&self, chat_id: ChatId) -> Result<(), TallyError> {
        if let Some(mut session) = self.sessions.get_mut(&chat_id.0) {
            session.active_task = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::TaskId;

    const CHAT: ChatId = ChatId(1);

    fn task(id: i64) -> Task {
        Task {
            id: TaskId(id),
            chat_id: CHAT,
            description: format!("task {id}"),
            completed: false,
        }
    }

    #[tokio::test]
    async fn unseen_chats_are_idle_with_no_active_task() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.get_state(CHAT).await.unwrap(), SessionState::Idle);
        assert!(store.get_active_task(CHAT).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_state_round_trips() {
        let store = InMemorySessionStore::new();
        store
            .set_state(CHAT, SessionState::EnteringTasks)
            .await
            .unwrap();
        assert_eq!(
            store.get_state(CHAT).await.unwrap(),
            SessionState::EnteringTasks
        );
    }

    #[tokio::test]
    async fn active_task_is_last_write_wins() {
        let store = InMemorySessionStore::new();
        store.set_active_task(CHAT, task(1)).await.unwrap();
        store.set_active_task(CHAT, task(2)).await.unwrap();
        let active = store.get_active_task(CHAT).await.unwrap().unwrap();
        assert_eq!(active.id, TaskId(2));

        store.clear_active_task(CHAT).await.unwrap();
        assert!(store.get_active_task(CHAT).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn chats_do_not_share_sessions() {
        let store = InMemorySessionStore::new();
        store
            .set_state(CHAT, SessionState::WorkingOnTask)
            .await
            .unwrap();
        assert_eq!(
            store.get_state(ChatId(2)).await.unwrap(),
            SessionState::Idle
        );
    }
}
