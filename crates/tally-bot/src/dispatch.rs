// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-chat event serialization and the error envelope.
//!
//! Events for one chat run strictly one at a time, reply delivery included;
//! different chats proceed in parallel. The envelope converts controller
//! failures into a single best-effort notification and keeps one chat's
//! failure from affecting others.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{error, warn};

use tally_core::{BotMessage, ChatEvent, ReplySink, TallyError};

use crate::controller::Controller;
use crate::texts::{TextKey, TextResources};

/// Serializes events per chat and delivers controller replies.
pub struct Dispatcher {
    controller: Controller,
    texts: Arc<TextResources>,
    chat_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl Dispatcher {
    pub fn new(controller: Controller, texts: Arc<TextResources>) -> Self {
        Self {
            controller,
            texts,
            chat_locks: DashMap::new(),
        }
    }

    /// Process one event under the chat's lock and deliver the reply.
    ///
    /// Store mutations already committed are never rolled back when delivery
    /// fails; the sink gets at most one fallback notification. Only invariant
    /// violations and infrastructure errors are returned to the caller.
    pub async fn process(&self, event: ChatEvent, sink: &dyn ReplySink) -> Result<(), TallyError> {
        let chat_id = event.chat_id;
        let lock = self
            .chat_locks
            .entry(chat_id.0)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        match self.controller.handle_event(event).await {
            Ok(reply) => {
                for message in &reply.messages {
                    if let Err(e) = sink.deliver(chat_id, message).await {
                        warn!(chat_id = %chat_id, error = %e, "reply delivery failed");
                        self.notify_failure(chat_id, sink).await;
                        break;
                    }
                }
                Ok(())
            }
            Err(e) => {
                error!(chat_id = %chat_id, error = %e, "event handling failed");
                self.notify_failure(chat_id, sink).await;
                Err(e)
            }
        }
    }

    /// One best-effort failure notification; a second failure is only logged.
    async fn notify_failure(&self, chat_id: tally_core::ChatId, sink: &dyn ReplySink) {
        let message = BotMessage::text(self.texts.get(TextKey::Fail));
        if let Err(e) = sink.deliver(chat_id, &message).await {
            warn!(chat_id = %chat_id, error = %e, "failure notification not delivered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tally_config::TasksConfig;
    use tally_core::{ChatId, SessionState, SessionStore, TaskStore};
    use tally_storage::MemoryTaskStore;

    use crate::session::InMemorySessionStore;

    const CHAT: ChatId = ChatId(1);

    /// Sink that fails the first `failures` deliveries, recording the rest.
    struct FlakySink {
        failures: AtomicUsize,
        delivered: std::sync::Mutex<Vec<String>>,
        attempts: AtomicUsize,
    }

    impl FlakySink {
        fn new(failures: usize) -> Self {
            Self {
                failures: AtomicUsize::new(failures),
                delivered: std::sync::Mutex::new(Vec::new()),
                attempts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReplySink for FlakySink {
        async fn deliver(&self, _chat_id: ChatId, message: &BotMessage) -> Result<(), TallyError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(TallyError::Channel {
                    message: "send failed".into(),
                    source: None,
                });
            }
            self.delivered.lock().unwrap().push(message.text.clone());
            Ok(())
        }
    }

    struct Fixture {
        tasks: Arc<MemoryTaskStore>,
        sessions: Arc<InMemorySessionStore>,
        dispatcher: Dispatcher,
    }

    fn fixture() -> Fixture {
        let texts = Arc::new(TextResources::english());
        let tasks = Arc::new(MemoryTaskStore::new(TasksConfig::default()));
        let sessions = Arc::new(InMemorySessionStore::new());
        let controller = Controller::new(
            tasks.clone(),
            sessions.clone(),
            texts.clone(),
            TasksConfig::default(),
        );
        Fixture {
            tasks,
            sessions,
            dispatcher: Dispatcher::new(controller, texts),
        }
    }

    #[tokio::test]
    async fn delivers_every_reply_message_in_order() {
        let fx = fixture();
        let sink = FlakySink::new(0);
        fx.dispatcher
            .process(ChatEvent::text(CHAT, "/start"), &sink)
            .await
            .unwrap();

        let delivered = sink.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 2);
        assert!(delivered[0].contains("Hello"));
    }

    #[tokio::test]
    async fn send_failure_keeps_mutations_and_notifies_once() {
        let fx = fixture();
        fx.sessions
            .set_state(CHAT, SessionState::EnteringTasks)
            .await
            .unwrap();

        let sink = FlakySink::new(1);
        fx.dispatcher
            .process(ChatEvent::text(CHAT, "buy milk"), &sink)
            .await
            .unwrap();

        // The added task stays committed even though the reply was lost.
        assert_eq!(fx.tasks.count_incomplete(CHAT).await.unwrap(), 1);
        // One failed reply, one fallback notification.
        assert_eq!(sink.attempts.load(Ordering::SeqCst), 2);
        let delivered = sink.delivered.lock().unwrap();
        assert_eq!(delivered.as_slice(), ["Something went wrong. Please try again."]);
    }

    #[tokio::test]
    async fn fallback_failure_is_swallowed() {
        let fx = fixture();
        let sink = FlakySink::new(10);
        // Both the reply and the fallback fail; process still returns Ok.
        fx.dispatcher
            .process(ChatEvent::text(CHAT, "/start"), &sink)
            .await
            .unwrap();
        assert_eq!(sink.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn inconsistency_errors_propagate_after_notification() {
        let fx = fixture();
        fx.sessions
            .set_state(CHAT, SessionState::WorkingOnTask)
            .await
            .unwrap();

        let sink = FlakySink::new(0);
        let err = fx
            .dispatcher
            .process(ChatEvent::text(CHAT, "Complete task"), &sink)
            .await
            .unwrap_err();
        assert!(matches!(err, TallyError::Inconsistency(_)));

        let delivered = sink.delivered.lock().unwrap();
        assert_eq!(delivered.as_slice(), ["Something went wrong. Please try again."]);
    }

    #[tokio::test]
    async fn same_chat_events_are_serialized() {
        let fx = fixture();
        let dispatcher = Arc::new(fx.dispatcher);
        let sink = Arc::new(FlakySink::new(0));

        // A double-tap of "Add tasks" must not interleave: the second event
        // sees the EnteringTasks state the first one committed.
        let mut handles = Vec::new();
        for _ in 0..2 {
            let dispatcher = dispatcher.clone();
            let sink = sink.clone();
            handles.push(tokio::spawn(async move {
                dispatcher
                    .process(ChatEvent::text(CHAT, "Add tasks"), sink.as_ref())
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let delivered = sink.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 2);
        // One of the two taps lands in EnteringTasks and adds a task named
        // after the button label; exactly one admission happened.
        assert!(delivered.iter().any(|m| m.contains("Enter your tasks")));
    }
}
