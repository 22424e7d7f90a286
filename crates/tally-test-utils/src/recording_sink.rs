// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply sink that captures deliveries for assertion in tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tally_core::{BotMessage, ChatId, ReplySink, TallyError};

/// A delivered message together with the chat it targeted.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub chat_id: ChatId,
    pub message: BotMessage,
}

/// Captures everything delivered through it, optionally failing on demand.
pub struct RecordingSink {
    delivered: Arc<Mutex<Vec<Delivery>>>,
    fail_next: Arc<Mutex<usize>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            delivered: Arc::new(Mutex::new(Vec::new())),
            fail_next: Arc::new(Mutex::new(0)),
        }
    }

    /// Make the next `n` deliveries fail with a channel error.
    pub async fn fail_next(&self, n: usize) {
        *self.fail_next.lock().await = n;
    }

    /// Everything delivered so far, in order.
    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.delivered.lock().await.clone()
    }

    /// Just the message texts, in delivery order.
    pub async fn texts(&self) -> Vec<String> {
        self.delivered
            .lock()
            .await
            .iter()
            .map(|d| d.message.text.clone())
            .collect()
    }

    /// Number of successful deliveries.
    pub async fn count(&self) -> usize {
        self.delivered.lock().await.len()
    }

    /// Drop everything recorded so far.
    pub async fn clear(&self) {
        self.delivered.lock().await.clear();
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn deliver(&self, chat_id: ChatId, message: &BotMessage) -> Result<(), TallyError> {
        let mut fail_next = self.fail_next.lock().await;
        if *fail_next > 0 {
            *fail_next -= 1;
            return Err(TallyError::Channel {
                message: "mock delivery failure".into(),
                source: None,
            });
        }
        drop(fail_next);

        self.delivered.lock().await.push(Delivery {
            chat_id,
            message: message.clone(),
        });
        Ok(())
    }
}
