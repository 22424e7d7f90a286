// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound reply delivery trait for messaging transports.

use async_trait::async_trait;

use crate::error::TallyError;
use crate::types::{BotMessage, ChatId};

/// Delivery target for outgoing replies.
///
/// The dispatcher sends each message of a reply through this trait while the
/// originating chat's event is still being processed, so delivery is part of
/// the per-chat serialization window. A failed delivery does not unwind
/// store mutations already committed by the event.
#[async_trait]
pub trait ReplySink: Send + Sync + 'static {
    /// Delivers one outbound message to the chat.
    async fn deliver(&self, chat_id: ChatId, message: &BotMessage) -> Result<(), TallyError>;
}
