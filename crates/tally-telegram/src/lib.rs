// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Tally task bot.
//!
//! Connects via long polling, maps text messages and callback queries into
//! [`ChatEvent`](tally_core::ChatEvent)s, and renders replies back to
//! Telegram: persistent reply keyboards for action menus, inline keyboards
//! (callback data = task id) for task lists, HTML parse mode on request.

pub mod handler;

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::dptree;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ParseMode,
    Recipient, ReplyMarkup,
};
use tracing::{debug, error, info, warn};

use tally_bot::Dispatcher as EventDispatcher;
use tally_bot::texts::{TextKey, TextResources};
use tally_config::TelegramConfig;
use tally_core::{
    AdapterType, BotMessage, HealthStatus, Keyboard, PluginAdapter, ReplySink, TallyError,
    TextFormat,
};

/// Telegram channel: long-polling event source and [`ReplySink`] in one.
pub struct TelegramChannel {
    bot: Bot,
    config: TelegramConfig,
    texts: Arc<TextResources>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: TelegramConfig, texts: Arc<TextResources>) -> Result<Self, TallyError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            TallyError::Config("telegram.bot_token is required for the Telegram channel".into())
        })?;

        if token.is_empty() {
            return Err(TallyError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        Ok(Self { bot, config, texts })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Long-poll Telegram and feed updates through the event dispatcher.
    ///
    /// Runs until the process receives a shutdown signal (teloxide's own
    /// Ctrl-C handler stops the polling loop).
    pub async fn run(self: Arc<Self>, dispatcher: Arc<EventDispatcher>) {
        info!("starting Telegram long polling");

        let message_branch = {
            let channel = self.clone();
            let dispatcher = dispatcher.clone();
            Update::filter_message().endpoint(move |msg: Message| {
                let channel = channel.clone();
                let dispatcher = dispatcher.clone();
                async move {
                    channel.handle_message(&dispatcher, msg).await;
                    respond(())
                }
            })
        };

        let callback_branch = {
            let channel = self.clone();
            Update::filter_callback_query().endpoint(move |query: CallbackQuery| {
                let channel = channel.clone();
                let dispatcher = dispatcher.clone();
                async move {
                    channel.handle_callback(&dispatcher, query).await;
                    respond(())
                }
            })
        };

        let handler = dptree::entry()
            .branch(message_branch)
            .branch(callback_branch);

        teloxide::dispatching::Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|_| async {}) // Silently ignore other update kinds
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    async fn handle_message(&self, dispatcher: &EventDispatcher, msg: Message) {
        if !handler::is_dm(&msg) {
            debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
            return;
        }
        if !handler::is_authorized(msg.from.as_ref(), &self.config.allowed_users) {
            debug!(chat_id = msg.chat.id.0, "ignoring unauthorized user");
            return;
        }

        match handler::message_to_event(&msg) {
            Some(event) => {
                if let Err(e) = dispatcher.process(event, self).await {
                    error!(chat_id = msg.chat.id.0, error = %e, "event processing failed");
                }
            }
            None => {
                let chat_id = tally_core::ChatId(msg.chat.id.0);
                let notice = BotMessage::text(self.texts.get(TextKey::OnlyTextAllowed));
                if let Err(e) = self.deliver(chat_id, &notice).await {
                    warn!(chat_id = chat_id.0, error = %e, "only-text notice not delivered");
                }
            }
        }
    }

    async fn handle_callback(&self, dispatcher: &EventDispatcher, query: CallbackQuery) {
        // Stop the client-side loading spinner regardless of the outcome.
        if let Err(e) = self.bot.answer_callback_query(query.id.clone()).await {
            debug!(error = %e, "failed to answer callback query");
        }

        if !handler::is_authorized(Some(&query.from), &self.config.allowed_users) {
            debug!(user_id = query.from.id.0, "ignoring unauthorized callback");
            return;
        }

        // Queries with unparsable or missing data are dropped silently.
        if let Some(event) = handler::callback_to_event(&query) {
            let chat_id = event.chat_id;
            if let Err(e) = dispatcher.process(event, self).await {
                error!(chat_id = chat_id.0, error = %e, "selection processing failed");
            }
        }
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, TallyError> {
        // Check if the bot token is valid by calling getMe.
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), TallyError> {
        debug!("Telegram channel shutting down");
        Ok(())
    }
}

#[async_trait]
impl ReplySink for TelegramChannel {
    async fn deliver(
        &self,
        chat_id: tally_core::ChatId,
        message: &BotMessage,
    ) -> Result<(), TallyError> {
        let recipient = Recipient::Id(ChatId(chat_id.0));
        let mut request = self.bot.send_message(recipient, &message.text);

        if let Some(TextFormat::Html) = message.format {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(keyboard) = &message.keyboard {
            request = request.reply_markup(render_keyboard(keyboard));
        }

        request.await.map_err(|e| TallyError::Channel {
            message: format!("failed to send message: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(())
    }
}

/// Renders the channel-agnostic keyboard into Telegram markup.
fn render_keyboard(keyboard: &Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::Reply(rows) => {
            let rows = rows.iter().map(|row| {
                row.iter()
                    .cloned()
                    .map(KeyboardButton::new)
                    .collect::<Vec<_>>()
            });
            ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard())
        }
        Keyboard::Inline(buttons) => {
            let rows = buttons
                .iter()
                .map(|b| vec![InlineKeyboardButton::callback(b.label.clone(), b.task_id.to_string())]);
            ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(rows))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{InlineButton, TaskId};

    fn texts() -> Arc<TextResources> {
        Arc::new(TextResources::english())
    }

    #[test]
    fn new_requires_bot_token() {
        let config = TelegramConfig {
            bot_token: None,
            allowed_users: vec![],
        };
        assert!(TelegramChannel::new(config, texts()).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        let config = TelegramConfig {
            bot_token: Some(String::new()),
            allowed_users: vec![],
        };
        assert!(TelegramChannel::new(config, texts()).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        let config = TelegramConfig {
            bot_token: Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11".into()),
            allowed_users: vec!["user1".into()],
        };
        assert!(TelegramChannel::new(config, texts()).is_ok());
    }

    #[test]
    fn plugin_adapter_metadata() {
        let config = TelegramConfig {
            bot_token: Some("test:token".into()),
            allowed_users: vec![],
        };
        let channel = TelegramChannel::new(config, texts()).unwrap();
        assert_eq!(channel.name(), "telegram");
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
    }

    #[test]
    fn reply_keyboard_renders_resized_rows() {
        let keyboard = Keyboard::Reply(vec![vec!["Add tasks".into()], vec!["View tasks".into()]]);
        let ReplyMarkup::Keyboard(markup) = render_keyboard(&keyboard) else {
            panic!("expected reply keyboard");
        };
        assert!(markup.resize_keyboard);
        assert_eq!(markup.keyboard.len(), 2);
        assert_eq!(markup.keyboard[0][0].text, "Add tasks");
    }

    #[test]
    fn inline_keyboard_carries_task_ids_as_callback_data() {
        let keyboard = Keyboard::Inline(vec![InlineButton {
            label: "buy milk".into(),
            task_id: TaskId(7),
        }]);
        let ReplyMarkup::InlineKeyboard(markup) = render_keyboard(&keyboard) else {
            panic!("expected inline keyboard");
        };
        assert_eq!(markup.inline_keyboard.len(), 1);
        let button = &markup.inline_keyboard[0][0];
        assert_eq!(button.text, "buy milk");
        assert!(matches!(
            &button.kind,
            teloxide::types::InlineKeyboardButtonKind::CallbackData(data) if data == "7"
        ));
    }
}
