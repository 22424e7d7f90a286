// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update filtering and mapping into channel-agnostic [`ChatEvent`]s.
//!
//! Authorization and chat-type checks happen here, before any event reaches
//! the dispatcher. Callback payloads that do not parse as a task id are
//! dropped silently.

use tally_core::{ChatEvent, ChatId, TaskId};
use teloxide::prelude::*;
use teloxide::types::ChatKind;

/// Checks whether the message sender is authorized.
///
/// Authorization passes if the sender's user ID (as string) or username
/// matches any entry in `allowed_users`. An empty list allows everyone;
/// this is a single-purpose personal bot and open access is the default.
///
/// Messages without a sender (e.g., channel posts) always return `false`
/// when a filter is configured.
pub fn is_authorized(user: Option<&teloxide::types::User>, allowed_users: &[String]) -> bool {
    if allowed_users.is_empty() {
        return true;
    }

    let user = match user {
        Some(u) => u,
        None => return false,
    };

    let user_id_str = user.id.0.to_string();

    for allowed in allowed_users {
        // Match by user ID
        if *allowed == user_id_str {
            return true;
        }
        // Match by username (with or without @ prefix)
        if let Some(ref username) = user.username {
            let allowed_clean = allowed.strip_prefix('@').unwrap_or(allowed);
            if username.eq_ignore_ascii_case(allowed_clean) {
                return true;
            }
        }
    }

    false
}

/// Checks whether the message is from a private (DM) chat.
///
/// Group, supergroup, and channel messages return `false`.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Maps a text message to a conversation event. `None` for non-text
/// messages (photos, stickers, voice, ...); the caller answers those with
/// the only-text notice.
pub fn message_to_event(msg: &Message) -> Option<ChatEvent> {
    msg.text()
        .map(|text| ChatEvent::text(ChatId(msg.chat.id.0), text))
}

/// Maps a callback query to a selection event.
///
/// Returns `None` when the query carries no message context or its data
/// does not parse as a task id; such queries are dropped without a reply.
pub fn callback_to_event(query: &CallbackQuery) -> Option<ChatEvent> {
    let chat_id = query.message.as_ref().map(|m| ChatId(m.chat().id.0))?;
    let task_id = query.data.as_deref()?.parse::<i64>().ok()?;
    Some(ChatEvent::selection(chat_id, TaskId(task_id)))
}
