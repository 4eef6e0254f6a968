//! The thin bot-API client boundary (§7): only the trait and a minimal
//! send-text/long-poll implementation are provided, since the wire format of
//! the actual messaging-bot transport is explicitly out of scope.

use async_trait::async_trait;
use serde::Deserialize;

/// An inbound chat message, reduced to the fields `gateway::handle_incoming_message`
/// actually consumes.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub user_id: i64,
    pub text: String,
}

#[async_trait]
pub trait BotTransport: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()>;

    /// Long-polls for new messages since `offset`, returning them along with
    /// the next offset to poll from.
    async fn poll_updates(&self, offset: i64) -> anyhow::Result<(Vec<IncomingMessage>, i64)>;
}

pub struct TelegramBotTransport {
    bot_token: String,
    http: reqwest::Client,
}

impl TelegramBotTransport {
    pub fn new(bot_token: String, http: reqwest::Client) -> Self {
        Self { bot_token, http }
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.bot_token)
    }
}

#[derive(Debug, Deserialize)]
struct GetUpdatesResponse {
    result: Vec<TgUpdate>,
}

#[derive(Debug, Deserialize)]
struct TgUpdate {
    update_id: i64,
    message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
struct TgMessage {
    chat: TgChat,
    from: Option<TgUser>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct TgUser {
    id: i64,
}

#[async_trait]
impl BotTransport for TelegramBotTransport {
    async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.http
            .post(self.api_url("sendMessage"))
            .json(&serde_json::json!({"chat_id": chat_id, "text": text, "parse_mode": "HTML"}))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn poll_updates(&self, offset: i64) -> anyhow::Result<(Vec<IncomingMessage>, i64)> {
        let resp: GetUpdatesResponse = self
            .http
            .get(self.api_url("getUpdates"))
            .query(&[("offset", offset.to_string()), ("timeout", "20".to_string())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut next_offset = offset;
        let mut messages = Vec::new();
        for update in resp.result {
            next_offset = next_offset.max(update.update_id + 1);
            let Some(msg) = update.message else { continue };
            let (Some(from), Some(text)) = (msg.from, msg.text) else { continue };
            messages.push(IncomingMessage { chat_id: msg.chat.id, user_id: from.id, text });
        }
        Ok((messages, next_offset))
    }
}
