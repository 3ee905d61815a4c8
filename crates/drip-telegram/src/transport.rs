//! Outbound delivery over the Telegram Bot API.

use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use teloxide::{ApiError, RequestError};

use drip_core::{ContentItem, RecipientId};
use drip_scheduler::{DeliveryOutcome, Transport};

/// Sends content items to Telegram chats.
///
/// Media items go out as a photo with the text as caption; text-only
/// items as a plain message. Every send is bounded by `timeout`.
pub struct TelegramTransport {
    bot: Bot,
    timeout: Duration,
}

impl TelegramTransport {
    pub fn new(bot: Bot, timeout: Duration) -> Self {
        Self { bot, timeout }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn deliver(&self, to: &RecipientId, item: &ContentItem) -> DeliveryOutcome {
        let chat = match to.as_str().parse::<i64>() {
            Ok(id) => ChatId(id),
            Err(_) => {
                return DeliveryOutcome::Transient(format!("recipient id is not a chat id: {to}"))
            }
        };

        let send = async {
            match &item.media {
                Some(path) => self
                    .bot
                    .send_photo(chat, InputFile::file(path))
                    .caption(&item.text)
                    .await
                    .map(|_| ()),
                None => self.bot.send_message(chat, &item.text).await.map(|_| ()),
            }
        };

        match tokio::time::timeout(self.timeout, send).await {
            Err(_) => DeliveryOutcome::Transient(format!(
                "send timed out after {}s",
                self.timeout.as_secs()
            )),
            Ok(Ok(())) => DeliveryOutcome::Delivered,
            Ok(Err(e)) => classify(e),
        }
    }
}

/// Map a teloxide error to a delivery outcome.
///
/// Exactly one condition is permanent: the recipient revoked the bot's
/// access ("Forbidden: bot was blocked by the user"). Everything else —
/// rate limits, network errors, malformed responses, even errors that
/// look hopeless — is transient and retried on the normal cadence.
fn classify(err: RequestError) -> DeliveryOutcome {
    match err {
        RequestError::Api(ApiError::BotBlocked) => {
            DeliveryOutcome::Permanent("recipient blocked the bot".to_string())
        }
        other => DeliveryOutcome::Transient(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_blocked_is_the_only_permanent_api_error() {
        let outcome = classify(RequestError::Api(ApiError::BotBlocked));
        assert!(matches!(outcome, DeliveryOutcome::Permanent(_)));

        for err in [
            ApiError::MessageNotModified,
            ApiError::ChatNotFound,
            ApiError::UserDeactivated,
            ApiError::Unknown("Internal Server Error".to_string()),
        ] {
            let outcome = classify(RequestError::Api(err));
            assert!(
                matches!(outcome, DeliveryOutcome::Transient(_)),
                "expected transient, got {outcome:?}"
            );
        }
    }

    #[test]
    fn transient_reason_carries_the_original_error_text() {
        let outcome = classify(RequestError::Api(ApiError::Unknown("boom".to_string())));
        match outcome {
            DeliveryOutcome::Transient(reason) => assert!(reason.contains("boom")),
            other => panic!("expected transient, got {other:?}"),
        }
    }
}
