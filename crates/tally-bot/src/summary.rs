// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Day summary rendering.

use std::sync::Arc;

use tally_core::{ChatId, TallyError, TaskStore};

use crate::texts::{TextKey, TextResources};

/// Builds the end-of-day summary text from task store counts.
///
/// Reading the counts never mutates the store; the day-end reset is a
/// separate operation the controller performs after rendering.
pub struct SummaryGenerator {
    store: Arc<dyn TaskStore>,
    texts: Arc<TextResources>,
}

impl SummaryGenerator {
    pub fn new(store: Arc<dyn TaskStore>, texts: Arc<TextResources>) -> Self {
        Self { store, texts }
    }

    /// HTML-formatted summary for the chat. Percentage is rounded to the
    /// nearest whole percent and is 0 when there are no tasks at all.
    pub async fn day_summary(&self, chat_id: ChatId) -> Result<String, TallyError> {
        let counts = self.store.summary_counts(chat_id).await?;
        let percentage = if counts.total == 0 {
            0
        } else {
            (counts.completed as f64 / counts.total as f64 * 100.0).round() as i64
        };
        Ok(self.texts.format(
            TextKey::Summary,
            &[&counts.total, &counts.completed, &percentage],
        ))
    }
}
