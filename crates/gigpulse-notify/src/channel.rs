//! Chat channel abstraction and the Telegram implementation

use crate::error::SendError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Rich-text dialect understood by the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    Markdown,
    #[serde(rename = "HTML")]
    Html,
}

impl ParseMode {
    /// Wire name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::Html => "HTML",
        }
    }
}

/// Something that can post one message
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Post `text`; `None` parse mode means plain text
    async fn send(&self, text: &str, parse_mode: Option<ParseMode>) -> Result<(), SendError>;
}

#[async_trait]
impl<T: ChatChannel + ?Sized> ChatChannel for Arc<T> {
    async fn send(&self, text: &str, parse_mode: Option<ParseMode>) -> Result<(), SendError> {
        (**self).send(text, parse_mode).await
    }
}

/// Telegram Bot API default endpoint
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram `sendMessage` client
#[derive(Clone)]
pub struct TelegramChannel {
    client: reqwest::Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl std::fmt::Debug for TelegramChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramChannel")
            .field("api_base", &self.api_base)
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramChannel {
    /// Client for `chat_id` with a per-request timeout
    pub fn new(
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SendError::from)?;
        Ok(Self {
            client,
            api_base: TELEGRAM_API_BASE.to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    /// Point at another API root (tests, proxies)
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.token
        )
    }
}

#[async_trait]
impl ChatChannel for TelegramChannel {
    async fn send(&self, text: &str, parse_mode: Option<ParseMode>) -> Result<(), SendError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: parse_mode.map(ParseMode::as_str),
        };
        let response = self.client.post(self.endpoint()).json(&body).send().await?;
        let status = response.status();
        let raw = response.text().await?;

        let parsed: Option<ApiResponse> = serde_json::from_str(&raw).ok();
        match parsed {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(ApiResponse { description, .. }) => {
                let description = description.unwrap_or_else(|| format!("http {status}"));
                if is_entity_parse_error(&description) {
                    Err(SendError::Format(description))
                } else {
                    Err(SendError::Api {
                        status: Some(status.as_u16()),
                        description,
                    })
                }
            }
            None => Err(SendError::Api {
                status: Some(status.as_u16()),
                description: format!("unreadable response (http {status})"),
            }),
        }
    }
}

fn is_entity_parse_error(description: &str) -> bool {
    description.to_ascii_lowercase().contains("parse entities")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_errors_are_detected() {
        assert!(is_entity_parse_error(
            "Bad Request: can't parse entities: Can't find end of the entity starting at byte offset 12"
        ));
        assert!(!is_entity_parse_error("Bad Request: chat not found"));
    }

    #[test]
    fn debug_hides_token() {
        let channel = TelegramChannel::new("123:SECRET", "42", Duration::from_secs(1)).unwrap();
        let shown = format!("{channel:?}");
        assert!(!shown.contains("SECRET"));
        assert!(channel.endpoint().ends_with("/bot123:SECRET/sendMessage"));
    }

    #[test]
    fn plain_text_omits_parse_mode() {
        let body = SendMessage { chat_id: "1", text: "hi", parse_mode: None };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("parse_mode").is_none());
    }
}
