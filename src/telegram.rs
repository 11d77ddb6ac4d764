//! Telegram notifier.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::{ApiError, RequestError};

use crate::account::UserId;
use crate::delivery::{DeliveryError, Notifier};
use crate::storage::AccountStore;

pub struct TelegramNotifier {
    bot: Bot,
    accounts: Arc<dyn AccountStore>,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, accounts: Arc<dyn AccountStore>) -> Self {
        Self { bot, accounts }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn deliver(&self, user_id: UserId, message: &str) -> Result<(), DeliveryError> {
        let account = self
            .accounts
            .get(user_id)
            .await
            .map_err(|err| DeliveryError::Transient(err.into()))?
            .ok_or(DeliveryError::Undeliverable(user_id))?;

        let chat_id = account
            .tg_chat_id
            .ok_or(DeliveryError::Undeliverable(user_id))?;

        self.bot
            .send_message(ChatId(chat_id), message)
            .await
            .map_err(|err| match err {
                RequestError::Api(
                    ApiError::BotBlocked
                    | ApiError::UserDeactivated
                    | ApiError::CantInitiateConversation,
                ) => DeliveryError::Undeliverable(user_id),
                other => DeliveryError::Transient(other.into()),
            })?;

        Ok(())
    }
}
