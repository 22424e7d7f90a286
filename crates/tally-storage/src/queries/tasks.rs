// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task CRUD operations.
//!
//! Every statement filters by `chat_id` so ids can never resolve across
//! chats. Mutations return the affected row count; the adapter converts a
//! zero count into a not-found result.

use rusqlite::params;
use tally_core::{ChatId, SummaryCounts, TallyError, Task, TaskId};

use crate::database::Database;

fn row_to_task(row: &rusqlite::Row<'_>) -> Result<Task, rusqlite::Error> {
    Ok(Task {
        id: TaskId(row.get(0)?),
        chat_id: ChatId(row.get(1)?),
        description: row.get(2)?,
        completed: row.get::<_, i64>(3)? != 0,
    })
}

/// Insert a new incomplete task and return it with its assigned id.
pub async fn add(
    db: &Database,
    chat_id: ChatId,
    description: &str,
) -> Result<Task, TallyError> {
    let description = description.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tasks (chat_id, description, completed) VALUES (?1, ?2, 0)",
                params![chat_id.0, description],
            )?;
            Ok(Task {
                id: TaskId(conn.last_insert_rowid()),
                chat_id,
                description,
                completed: false,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All incomplete tasks for the chat, in creation order.
pub async fn list_incomplete(db: &Database, chat_id: ChatId) -> Result<Vec<Task>, TallyError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, chat_id, description, completed
                 FROM tasks WHERE chat_id = ?1 AND completed = 0
                 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![chat_id.0], |row| row_to_task(row))?;
            let mut tasks = Vec::new();
            for row in rows {
                tasks.push(row?);
            }
            Ok(tasks)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up a task by `(chat_id, id)`.
pub async fn get_by_id(
    db: &Database,
    chat_id: ChatId,
    id: TaskId,
) -> Result<Option<Task>, TallyError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, chat_id, description, completed
                 FROM tasks WHERE chat_id = ?1 AND id = ?2",
                params![chat_id.0, id.0],
                |row| row_to_task(row),
            );
            match result {
                Ok(task) => Ok(Some(task)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a task completed. Returns the number of rows updated (0 when the
/// task is absent for that chat).
pub async fn complete(db: &Database, chat_id: ChatId, id: TaskId) -> Result<usize, TallyError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE tasks SET completed = 1 WHERE chat_id = ?1 AND id = ?2",
                params![chat_id.0, id.0],
            )?;
            Ok(changed)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a task. Returns the number of rows removed (0 when absent).
pub async fn delete(db: &Database, chat_id: ChatId, id: TaskId) -> Result<usize, TallyError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "DELETE FROM tasks WHERE chat_id = ?1 AND id = ?2",
                params![chat_id.0, id.0],
            )?;
            Ok(changed)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of incomplete tasks for the chat.
pub async fn count_incomplete(db: &Database, chat_id: ChatId) -> Result<i64, TallyError> {
    db.connection()
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM tasks WHERE chat_id = ?1 AND completed = 0",
                params![chat_id.0],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Completed and total counts for the day summary.
pub async fn summary_counts(db: &Database, chat_id: ChatId) -> Result<SummaryCounts, TallyError> {
    db.connection()
        .call(move |conn| {
            let (completed, total) = conn.query_row(
                "SELECT COALESCE(SUM(completed), 0), COUNT(*)
                 FROM tasks WHERE chat_id = ?1",
                params![chat_id.0],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            Ok(SummaryCounts { completed, total })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete every completed task for the chat (day-end rollover). Returns the
/// number of rows removed.
pub async fn reset_completed(db: &Database, chat_id: ChatId) -> Result<usize, TallyError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "DELETE FROM tasks WHERE chat_id = ?1 AND completed = 1",
                params![chat_id.0],
            )?;
            Ok(changed)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    const CHAT: ChatId = ChatId(100);
    const OTHER_CHAT: ChatId = ChatId(200);

    #[tokio::test]
    async fn add_and_get_by_id_round_trips() {
        let (db, _dir) = setup_db().await;

        let task = add(&db, CHAT, "buy milk").await.unwrap();
        assert!(!task.completed);
        assert_eq!(task.chat_id, CHAT);

        let retrieved = get_by_id(&db, CHAT, task.id).await.unwrap();
        assert_eq!(retrieved, Some(task));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_by_id_never_crosses_chats() {
        let (db, _dir) = setup_db().await;

        let task = add(&db, CHAT, "secret").await.unwrap();
        let leaked = get_by_id(&db, OTHER_CHAT, task.id).await.unwrap();
        assert!(leaked.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_incomplete_preserves_creation_order() {
        let (db, _dir) = setup_db().await;

        let first = add(&db, CHAT, "first").await.unwrap();
        let second = add(&db, CHAT, "second").await.unwrap();
        complete(&db, CHAT, first.id).await.unwrap();
        let third = add(&db, CHAT, "third").await.unwrap();

        let listed = list_incomplete(&db, CHAT).await.unwrap();
        assert_eq!(
            listed.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![second.id, third.id]
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn complete_is_idempotent() {
        let (db, _dir) = setup_db().await;

        let task = add(&db, CHAT, "repeatable").await.unwrap();
        assert_eq!(complete(&db, CHAT, task.id).await.unwrap(), 1);
        assert_eq!(complete(&db, CHAT, task.id).await.unwrap(), 1);

        let retrieved = get_by_id(&db, CHAT, task.id).await.unwrap().unwrap();
        assert!(retrieved.completed);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn complete_missing_task_updates_nothing() {
        let (db, _dir) = setup_db().await;
        assert_eq!(complete(&db, CHAT, TaskId(999)).await.unwrap(), 0);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_removes_only_the_target() {
        let (db, _dir) = setup_db().await;

        let doomed = add(&db, CHAT, "doomed").await.unwrap();
        let kept = add(&db, CHAT, "kept").await.unwrap();

        assert_eq!(delete(&db, CHAT, doomed.id).await.unwrap(), 1);
        assert!(get_by_id(&db, CHAT, doomed.id).await.unwrap().is_none());
        assert!(get_by_id(&db, CHAT, kept.id).await.unwrap().is_some());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn summary_counts_and_reset_completed() {
        let (db, _dir) = setup_db().await;

        let t1 = add(&db, CHAT, "a").await.unwrap();
        let _t2 = add(&db, CHAT, "b").await.unwrap();
        let t3 = add(&db, CHAT, "c").await.unwrap();
        complete(&db, CHAT, t1.id).await.unwrap();
        complete(&db, CHAT, t3.id).await.unwrap();

        let counts = summary_counts(&db, CHAT).await.unwrap();
        assert_eq!(counts.completed, 2);
        assert_eq!(counts.total, 3);
        assert_eq!(count_incomplete(&db, CHAT).await.unwrap(), 1);

        // Rollover purges completed tasks only.
        assert_eq!(reset_completed(&db, CHAT).await.unwrap(), 2);
        let counts = summary_counts(&db, CHAT).await.unwrap();
        assert_eq!(counts.completed, 0);
        assert_eq!(counts.total, 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn summary_counts_empty_chat_is_zero() {
        let (db, _dir) = setup_db().await;
        let counts = summary_counts(&db, CHAT).await.unwrap();
        assert_eq!(counts, SummaryCounts::default());
        db.close().await.unwrap();
    }
}
