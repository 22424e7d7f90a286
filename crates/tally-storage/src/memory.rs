// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory task store for tests and ephemeral deployments.

use async_trait::async_trait;
use dashmap::DashMap;

use tally_config::TasksConfig;
use tally_core::{
    AdapterType, ChatId, HealthStatus, PluginAdapter, SummaryCounts, TallyError, Task, TaskId,
    TaskStore,
};

use crate::truncate_description;

#[derive(Default)]
struct ChatTasks {
    next_id: i64,
    tasks: Vec<Task>,
}

/// Task store that keeps everything in process memory, sharded per chat.
///
/// Ids are assigned per chat starting at 1. Semantics match
/// [`SqliteTaskStore`](crate::SqliteTaskStore) so the two are interchangeable
/// behind the [`TaskStore`] trait.
pub struct MemoryTaskStore {
    limits: TasksConfig,
    chats: DashMap<i64, ChatTasks>,
}

impl MemoryTaskStore {
    pub fn new(limits: TasksConfig) -> Self {
        Self {
            limits,
            chats: DashMap::new(),
        }
    }
}

#[async_trait]
impl PluginAdapter for MemoryTaskStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or(semver::Version::new(0, 0, 0))
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TallyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TallyError> {
        self.chats.clear();
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn add(&self, chat_id: ChatId, description: &str) -> Result<Task, TallyError> {
        let description = truncate_description(description, self.limits.max_description_len);
        let mut entry = self.chats.entry(chat_id.0).or_default();
        entry.next_id += 1;
        let task = Task {
            id: TaskId(entry.next_id),
            chat_id,
            description,
            completed: false,
        };
        entry.tasks.push(task.clone());
        Ok(task)
    }

    async fn list_incomplete(&self, chat_id: ChatId) -> Result<Vec<Task>, TallyError> {
        Ok(self
            .chats
            .get(&chat_id.0)
            .map(|entry| {
                entry
                    .tasks
                    .iter()
                    .filter(|t| !t.completed)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_by_id(&self, chat_id: ChatId, id: TaskId) -> Result<Option<Task>, TallyError> {
        Ok(self
            .chats
            .get(&chat_id.0)
            .and_then(|entry| entry.tasks.iter().find(|t| t.id == id).cloned()))
    }

    async fn complete(&self, chat_id: ChatId, id: TaskId) -> Result<(), TallyError> {
        let mut entry = self
            .chats
            .get_mut(&chat_id.0)
            .ok_or(TallyError::TaskNotFound {
                chat_id,
                task_id: id,
            })?;
        let task = entry
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TallyError::TaskNotFound {
                chat_id,
                task_id: id,
            })?;
        task.completed = true;
        Ok(())
    }

    async fn delete(&self, chat_id: ChatId, id: TaskId) -> Result<(), TallyError> {
        let mut entry = self
            .chats
            .get_mut(&chat_id.0)
            .ok_or(TallyError::TaskNotFound {
                chat_id,
                task_id: id,
            })?;
        let before = entry.tasks.len();
        entry.tasks.retain(|t| t.id != id);
        if entry.tasks.len() == before {
            return Err(TallyError::TaskNotFound {
                chat_id,
                task_id: id,
            });
        }
        Ok(())
    }

    async fn count_incomplete(&self, chat_id: ChatId) -> Result<i64, TallyError> {
        Ok(self
            .chats
            .get(&chat_id.0)
            .map(|entry| entry.tasks.iter().filter(|t| !t.completed).count() as i64)
            .unwrap_or(0))
    }

    async fn summary_counts(&self, chat_id: ChatId) -> Result<SummaryCounts, TallyError> {
        Ok(self
            .chats
            .get(&chat_id.0)
            .map(|entry| SummaryCounts {
                completed: entry.tasks.iter().filter(|t| t.completed).count() as i64,
                total: entry.tasks.len() as i64,
            })
            .unwrap_or_default())
    }

    async fn reset_completed(&self, chat_id: ChatId) -> Result<(), TallyError> {
        if let Some(mut entry) = self.chats.get_mut(&chat_id.0) {
            entry.tasks.retain(|t| !t.completed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryTaskStore {
        MemoryTaskStore::new(TasksConfig {
            max_pending: 15,
            max_description_len: 75,
        })
    }

    const CHAT: ChatId = ChatId(1);
    const OTHER_CHAT: ChatId = ChatId(2);

    #[tokio::test]
    async fn ids_are_assigned_per_chat() {
        let store = store();
        let a = store.add(CHAT, "a").await.unwrap();
        let b = store.add(OTHER_CHAT, "b").await.unwrap();
        assert_eq!(a.id, TaskId(1));
        assert_eq!(b.id, TaskId(1));
    }

    #[tokio::test]
    async fn chats_are_isolated() {
        let store = store();
        let task = store.add(CHAT, "mine").await.unwrap();
        assert!(store.get_by_id(OTHER_CHAT, task.id).await.unwrap().is_none());
        assert!(
            store
                .complete(OTHER_CHAT, task.id)
                .await
                .is_err_and(|e| matches!(e, TallyError::TaskNotFound { .. }))
        );
    }

    #[tokio::test]
    async fn complete_is_idempotent() {
        let store = store();
        let task = store.add(CHAT, "t").await.unwrap();
        store.complete(CHAT, task.id).await.unwrap();
        store.complete(CHAT, task.id).await.unwrap();
        assert_eq!(store.count_incomplete(CHAT).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reset_completed_keeps_pending_tasks() {
        let store = store();
        let done = store.add(CHAT, "done").await.unwrap();
        let _pending = store.add(CHAT, "pending").await.unwrap();
        store.complete(CHAT, done.id).await.unwrap();

        store.reset_completed(CHAT).await.unwrap();

        let counts = store.summary_counts(CHAT).await.unwrap();
        assert_eq!(counts, SummaryCounts { completed: 0, total: 1 });
    }

    #[tokio::test]
    async fn descriptions_are_truncated_at_char_boundaries() {
        let store = MemoryTaskStore::new(TasksConfig {
            max_pending: 15,
            max_description_len: 3,
        });
        let task = store.add(CHAT, "héllo").await.unwrap();
        assert_eq!(task.description, "hél");
    }
}
