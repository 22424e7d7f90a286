// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation state machine.
//!
//! One inbound [`ChatEvent`] produces one [`Reply`] (possibly empty). The
//! controller owns every state transition and maintains the invariant that
//! `WorkingOnTask` always has an active task recorded. Not-found conditions
//! from the task store are converted to user-facing replies here; only
//! invariant violations and infrastructure errors escape as `Err`.

use std::sync::Arc;

use tracing::{debug, warn};

use tally_config::TasksConfig;
use tally_core::{
    BotMessage, ChatEvent, ChatId, EventKind, InlineButton, Keyboard, Reply, SessionState,
    SessionStore, TallyError, Task, TaskId, TaskStore, TextFormat,
};

use crate::summary::SummaryGenerator;
use crate::texts::{TextKey, TextResources};

/// Drives the Idle / EnteringTasks / WorkingOnTask state machine.
pub struct Controller {
    tasks: Arc<dyn TaskStore>,
    sessions: Arc<dyn SessionStore>,
    summary: SummaryGenerator,
    texts: Arc<TextResources>,
    limits: TasksConfig,
}

impl Controller {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        sessions: Arc<dyn SessionStore>,
        texts: Arc<TextResources>,
        limits: TasksConfig,
    ) -> Self {
        let summary = SummaryGenerator::new(tasks.clone(), texts.clone());
        Self {
            tasks,
            sessions,
            summary,
            texts,
            limits,
        }
    }

    /// Handle one conversation event and produce the outgoing reply.
    pub async fn handle_event(&self, event: ChatEvent) -> Result<Reply, TallyError> {
        let chat_id = event.chat_id;
        match event.kind {
            EventKind::Text(text) => self.handle_text(chat_id, &text).await,
            EventKind::Selection(task_id) => self.handle_selection(chat_id, task_id).await,
        }
    }

    async fn handle_text(&self, chat_id: ChatId, text: &str) -> Result<Reply, TallyError> {
        let state = self.sessions.get_state(chat_id).await?;
        debug!(chat_id = %chat_id, state = %state, "handling text event");

        // The greeting works from any state and changes none.
        if starts_with_ignore_case(text, "/start") {
            let mut reply = Reply::single(BotMessage::text(self.texts.get(TextKey::Hello)));
            if state == SessionState::Idle {
                reply = reply.then(self.actions_menu());
            }
            return Ok(reply);
        }

        match state {
            SessionState::Idle => self.handle_idle(chat_id, text).await,
            SessionState::EnteringTasks => self.handle_entering_tasks(chat_id, text).await,
            SessionState::WorkingOnTask => self.handle_working_on_task(chat_id, text).await,
        }
    }

    async fn handle_idle(&self, chat_id: ChatId, text: &str) -> Result<Reply, TallyError> {
        if self.texts.matches(TextKey::ActionAddTasks, text) {
            self.sessions
                .set_state(chat_id, SessionState::EnteringTasks)
                .await?;
            return Ok(Reply::single(BotMessage::text(
                self.texts.get(TextKey::EnterTasks),
            )));
        }

        if self.texts.matches(TextKey::ActionViewTasks, text) {
            return self.task_list(chat_id).await;
        }

        if self.texts.matches(TextKey::ActionFinishDay, text) {
            let summary = self.summary.day_summary(chat_id).await?;
            self.tasks.reset_completed(chat_id).await?;
            return Ok(Reply::single(
                BotMessage::text(summary).with_format(TextFormat::Html),
            ));
        }

        Ok(Reply::single(BotMessage::text(
            self.texts.get(TextKey::UnknownCommand),
        )))
    }

    async fn task_list(&self, chat_id: ChatId) -> Result<Reply, TallyError> {
        let incomplete = self.tasks.list_incomplete(chat_id).await?;
        if incomplete.is_empty() {
            return Ok(Reply::single(BotMessage::text(
                self.texts.get(TextKey::NoTasks),
            )));
        }

        let buttons = incomplete
            .into_iter()
            .map(|task| InlineButton {
                label: task.description,
                task_id: task.id,
            })
            .collect();
        Ok(Reply::single(
            BotMessage::text(self.texts.get(TextKey::ListOfTasks))
                .with_keyboard(Keyboard::Inline(buttons)),
        ))
    }

    async fn handle_entering_tasks(&self, chat_id: ChatId, text: &str) -> Result<Reply, TallyError> {
        let lines: Vec<&str> = text
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let pending = self.tasks.count_incomplete(chat_id).await?;
        if pending + lines.len() as i64 > self.limits.max_pending as i64 {
            // Whole batch rejected; the chat stays in EnteringTasks so a
            // shorter batch can be resent.
            debug!(chat_id = %chat_id, pending, batch = lines.len(), "task batch over limit");
            return Ok(Reply::single(BotMessage::text(
                self.texts.get(TextKey::TooManyTasks),
            )));
        }

        let mut reply = Reply::none();
        if !lines.is_empty() {
            for line in &lines {
                self.tasks.add(chat_id, line).await?;
            }
            reply = Reply::single(BotMessage::text(
                self.texts.format(TextKey::TasksAdded, &[&lines.len()]),
            ));
        }

        self.sessions.set_state(chat_id, SessionState::Idle).await?;
        Ok(reply)
    }

    async fn handle_working_on_task(
        &self,
        chat_id: ChatId,
        text: &str,
    ) -> Result<Reply, TallyError> {
        if self.texts.matches(TextKey::ActionReturn, text) {
            self.sessions.clear_active_task(chat_id).await?;
            self.sessions.set_state(chat_id, SessionState::Idle).await?;
            return Ok(
                Reply::single(BotMessage::text(self.texts.get(TextKey::TaskCanceled)))
                    .then(self.actions_menu()),
            );
        }

        if self.texts.matches(TextKey::ActionCompleteTask, text) {
            let active = self.active_task(chat_id).await?;
            let outcome = self.tasks.complete(chat_id, active.id).await;
            self.sessions.clear_active_task(chat_id).await?;
            self.sessions.set_state(chat_id, SessionState::Idle).await?;
            let text = match outcome {
                Ok(()) => self.texts.get(TextKey::TaskDone),
                Err(TallyError::TaskNotFound { .. }) => {
                    warn!(chat_id = %chat_id, task_id = %active.id, "active task vanished before completion");
                    self.texts.get(TextKey::TaskNotFound)
                }
                Err(e) => return Err(e),
            };
            return Ok(Reply::single(BotMessage::text(text)).then(self.actions_menu()));
        }

        if self.texts.matches(TextKey::ActionDeleteTask, text) {
            let active = self.active_task(chat_id).await?;
            // Clear the reference before the delete so it never dangles,
            // even transiently, once the delete begins.
            self.sessions.clear_active_task(chat_id).await?;
            let outcome = self.tasks.delete(chat_id, active.id).await;
            self.sessions.set_state(chat_id, SessionState::Idle).await?;
            let text = match outcome {
                Ok(()) => self
                    .texts
                    .format(TextKey::TaskDeleted, &[&active.description]),
                Err(TallyError::TaskNotFound { .. }) => {
                    warn!(chat_id = %chat_id, task_id = %active.id, "active task vanished before deletion");
                    self.texts.get(TextKey::TaskNotFound).to_string()
                }
                Err(e) => return Err(e),
            };
            return Ok(Reply::single(BotMessage::text(text)).then(self.actions_menu()));
        }

        // Unknown text keeps the chat in WorkingOnTask with its active task.
        Ok(Reply::single(BotMessage::text(
            self.texts.get(TextKey::UnknownCommand),
        )))
    }

    async fn handle_selection(
        &self,
        chat_id: ChatId,
        task_id: TaskId,
    ) -> Result<Reply, TallyError> {
        let task = self.tasks.get_by_id(chat_id, task_id).await?;
        match task {
            Some(task) if !task.completed => {
                debug!(chat_id = %chat_id, task_id = %task.id, "task selected");
                self.sessions.set_active_task(chat_id, task.clone()).await?;
                self.sessions
                    .set_state(chat_id, SessionState::WorkingOnTask)
                    .await?;
                Ok(Reply::single(
                    BotMessage::text(
                        self.texts
                            .format(TextKey::TaskSelected, &[&task.description]),
                    )
                    .with_keyboard(self.task_actions_keyboard())
                    .with_format(TextFormat::Html),
                ))
            }
            _ => Ok(Reply::single(BotMessage::text(
                self.texts.get(TextKey::TaskNotFound),
            ))),
        }
    }

    /// The active task for a chat in `WorkingOnTask`. Its absence is a bug
    /// in transition maintenance, never a user-facing outcome.
    async fn active_task(&self, chat_id: ChatId) -> Result<Task, TallyError> {
        self.sessions
            .get_active_task(chat_id)
            .await?
            .ok_or_else(|| {
                TallyError::Inconsistency(format!(
                    "chat {chat_id} is in WorkingOnTask with no active task"
                ))
            })
    }

    fn actions_menu(&self) -> BotMessage {
        BotMessage::text(self.texts.get(TextKey::AvailableActions))
            .with_format(TextFormat::Html)
            .with_keyboard(Keyboard::Reply(vec![
                vec![self.texts.get(TextKey::ActionAddTasks).to_string()],
                vec![self.texts.get(TextKey::ActionViewTasks).to_string()],
                vec![self.texts.get(TextKey::ActionFinishDay).to_string()],
            ]))
    }

    fn task_actions_keyboard(&self) -> Keyboard {
        Keyboard::Reply(vec![
            vec![self.texts.get(TextKey::ActionCompleteTask).to_string()],
            vec![self.texts.get(TextKey::ActionReturn).to_string()],
            vec![self.texts.get(TextKey::ActionDeleteTask).to_string()],
        ])
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    // `get` instead of slicing: the cut may not land on a char boundary.
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
