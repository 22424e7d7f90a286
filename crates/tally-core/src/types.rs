// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Tally bot.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identity of the chat that owns a task list and a session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a task, unique within its owning chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub i64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single to-do item scoped to one chat.
///
/// Tasks are always looked up by the `(chat_id, id)` pair; an id from one
/// chat must never resolve to another chat's task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub chat_id: ChatId,
    pub description: String,
    pub completed: bool,
}

/// Completed/total counts used by the day summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SummaryCounts {
    pub completed: i64,
    pub total: i64,
}

/// A chat's position in the conversation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// Waiting for a command; the default for unseen chats.
    #[default]
    Idle,
    /// The next text message is interpreted as a batch of new tasks.
    EnteringTasks,
    /// A task is selected; awaiting complete/return/delete.
    WorkingOnTask,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::EnteringTasks => write!(f, "entering_tasks"),
            SessionState::WorkingOnTask => write!(f, "working_on_task"),
        }
    }
}

/// An inbound conversation event, already mapped from the transport.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub chat_id: ChatId,
    pub kind: EventKind,
}

impl ChatEvent {
    /// A raw text message from the chat.
    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            kind: EventKind::Text(text.into()),
        }
    }

    /// A task selected from a list-style UI gesture.
    pub fn selection(chat_id: ChatId, task_id: TaskId) -> Self {
        Self {
            chat_id,
            kind: EventKind::Selection(task_id),
        }
    }
}

/// The two event kinds the controller dispatches on.
#[derive(Debug, Clone)]
pub enum EventKind {
    Text(String),
    Selection(TaskId),
}

/// Channel-agnostic keyboard layout attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Persistent reply keyboard: one label per button, rendered row by row.
    Reply(Vec<Vec<String>>),
    /// Inline selection keyboard: one button per row, tapping selects the task.
    Inline(Vec<InlineButton>),
}

/// A single inline keyboard button whose payload is a task id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub task_id: TaskId,
}

/// Rendering hint for an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Html,
}

/// One outbound message: text plus optional keyboard and format hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotMessage {
    pub text: String,
    pub keyboard: Option<Keyboard>,
    pub format: Option<TextFormat>,
}

impl BotMessage {
    /// Plain text message with no keyboard.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            format: None,
        }
    }

    /// Attach a keyboard layout.
    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// Attach a format hint.
    pub fn with_format(mut self, format: TextFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// The outgoing reply produced by one conversation event.
///
/// Most events produce a single message; a few paths (greeting, returning to
/// the actions menu) produce two. An empty reply is a deliberate silent no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub messages: Vec<BotMessage>,
}

impl Reply {
    /// A reply with no messages (silent no-op).
    pub fn none() -> Self {
        Self::default()
    }

    /// A reply consisting of a single message.
    pub fn single(message: BotMessage) -> Self {
        Self {
            messages: vec![message],
        }
    }

    /// Append a follow-up message.
    pub fn then(mut self, message: BotMessage) -> Self {
        self.messages.push(message);
        self
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Channel,
    Storage,
}
