// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end test harness: in-memory stores, controller, dispatcher, and a
//! recording sink wired together.

use std::sync::Arc;

use tally_bot::{Controller, Dispatcher, InMemorySessionStore, TextResources};
use tally_config::TasksConfig;
use tally_core::{ChatEvent, ChatId, TallyError, TaskId};
use tally_storage::MemoryTaskStore;

use crate::recording_sink::RecordingSink;

/// A fully wired bot over in-memory backends.
pub struct TestHarness {
    pub tasks: Arc<MemoryTaskStore>,
    pub sessions: Arc<InMemorySessionStore>,
    pub texts: Arc<TextResources>,
    pub sink: Arc<RecordingSink>,
    dispatcher: Arc<Dispatcher>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_limits(TasksConfig::default())
    }

    pub fn with_limits(limits: TasksConfig) -> Self {
        let texts = Arc::new(TextResources::english());
        let tasks = Arc::new(MemoryTaskStore::new(limits.clone()));
        let sessions = Arc::new(InMemorySessionStore::new());
        let controller = Controller::new(tasks.clone(), sessions.clone(), texts.clone(), limits);
        let dispatcher = Arc::new(Dispatcher::new(controller, texts.clone()));
        Self {
            tasks,
            sessions,
            texts,
            sink: Arc::new(RecordingSink::new()),
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.clone()
    }

    /// Send a text message from `chat` through the full dispatch path.
    pub async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TallyError> {
        self.dispatcher
            .process(ChatEvent::text(chat, text), self.sink.as_ref())
            .await
    }

    /// Tap an inline task button from `chat`.
    pub async fn select_task(&self, chat: ChatId, task: TaskId) -> Result<(), TallyError> {
        self.dispatcher
            .process(ChatEvent::selection(chat, task), self.sink.as_ref())
            .await
    }

    /// Texts delivered so far, oldest first.
    pub async fn delivered_texts(&self) -> Vec<String> {
        self.sink.texts().await
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
