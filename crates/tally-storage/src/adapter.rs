// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed task store adapter.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::info;

use tally_config::{StorageConfig, TasksConfig};
use tally_core::{
    AdapterType, ChatId, HealthStatus, PluginAdapter, SummaryCounts, TallyError, Task, TaskId,
    TaskStore,
};

use crate::database::Database;
use crate::queries;
use crate::truncate_description;

/// Persistent task store backed by SQLite via tokio-rusqlite.
///
/// The database is opened lazily on [`SqliteTaskStore::initialize`] so the
/// adapter can be constructed before configuration is fully resolved.
pub struct SqliteTaskStore {
    config: StorageConfig,
    limits: TasksConfig,
    db: OnceCell<Database>,
}

impl SqliteTaskStore {
    pub fn new(config: StorageConfig, limits: TasksConfig) -> Self {
        Self {
            config,
            limits,
            db: OnceCell::new(),
        }
    }

    /// Open the database and run migrations. Must be called before any
    /// [`TaskStore`] operation.
    pub async fn initialize(&self) -> Result<(), TallyError> {
        self.db
            .get_or_try_init(|| async {
                let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
                info!(path = %self.config.database_path, "sqlite task store initialized");
                Ok::<_, TallyError>(db)
            })
            .await?;
        Ok(())
    }

    fn db(&self) -> Result<&Database, TallyError> {
        self.db
            .get()
            .ok_or_else(|| TallyError::Internal("sqlite task store not initialized".into()))
    }
}

#[async_trait]
impl PluginAdapter for SqliteTaskStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or(semver::Version::new(0, 0, 0))
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TallyError> {
        match self.db() {
            Ok(db) => {
                db.connection()
                    .call(|conn| {
                        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
                        Ok(())
                    })
                    .await
                    .map_err(crate::database::map_tr_err)?;
                Ok(HealthStatus::Healthy)
            }
            Err(_) => Ok(HealthStatus::Unhealthy("not initialized".into())),
        }
    }

    async fn shutdown(&self) -> Result<(), TallyError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn add(&self, chat_id: ChatId, description: &str) -> Result<Task, TallyError> {
        let description = truncate_description(description, self.limits.max_description_len);
        queries::tasks::add(self.db()?, chat_id, &description).await
    }

    async fn list_incomplete(&self, chat_id: ChatId) -> Result<Vec<Task>, TallyError> {
        queries::tasks::list_incomplete(self.db()?, chat_id).await
    }

    async fn get_by_id(&self, chat_id: ChatId, id: TaskId) -> Result<Option<Task>, TallyError> {
        queries::tasks::get_by_id(self.db()?, chat_id, id).await
    }

    async fn complete(&self, chat_id: ChatId, id: TaskId) -> Result<(), TallyError> {
        let changed = queries::tasks::complete(self.db()?, chat_id, id).await?;
        if changed == 0 {
            return Err(TallyError::TaskNotFound {
                chat_id,
                task_id: id,
            });
        }
        Ok(())
    }

    async fn delete(&self, chat_id: ChatId, id: TaskId) -> Result<(), TallyError> {
        let changed = queries::tasks::delete(self.db()?, chat_id, id).await?;
        if changed == 0 {
            return Err(TallyError::TaskNotFound {
                chat_id,
                task_id: id,
            });
        }
        Ok(())
    }

    async fn count_incomplete(&self, chat_id: ChatId) -> Result<i64, TallyError> {
        queries::tasks::count_incomplete(self.db()?, chat_id).await
    }

    async fn summary_counts(&self, chat_id: ChatId) -> Result<SummaryCounts, TallyError> {
        queries::tasks::summary_counts(self.db()?, chat_id).await
    }

    async fn reset_completed(&self, chat_id: ChatId) -> Result<(), TallyError> {
        queries::tasks::reset_completed(self.db()?, chat_id).await?;
        Ok(())
    }
}
