//! LINE Messaging API adapter: webhook signatures, event payloads and replies.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

use crate::config::LineConfig;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the base64 HMAC-SHA256 of the request body
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// LINE rejects text messages longer than this
pub const MAX_TEXT_CHARS: usize = 5000;

#[derive(Debug, Error)]
pub enum LineError {
    #[error("LINE request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LINE API returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Check `signature` against the body signed with the channel secret
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Signature LINE would send for `body`
#[cfg(test)]
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes()).unwrap();
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Webhook request body
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Webhook event; only message events are handled
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    Message {
        #[serde(rename = "replyToken")]
        reply_token: Option<String>,
        message: Message,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    Text { text: String },
    #[serde(other)]
    Unsupported,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: [TextMessage<'a>; 1],
}

#[derive(Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

pub type ReplyFuture<'a> = Pin<Box<dyn Future<Output = Result<(), LineError>> + Send + 'a>>;

/// Sends a text reply for a webhook event
pub trait Replier: Send + Sync {
    fn reply_text<'a>(&'a self, reply_token: &'a str, text: &'a str) -> ReplyFuture<'a>;
}

/// Reply client for the LINE Messaging API
pub struct LineClient {
    client: Client,
    api_base: String,
    access_token: String,
}

impl LineClient {
    pub fn new(config: &LineConfig) -> Result<Self, LineError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token: config.channel_access_token.clone(),
        })
    }

    async fn send_reply(&self, reply_token: &str, text: &str) -> Result<(), LineError> {
        let url = format!("{}/v2/bot/message/reply", self.api_base);
        let request = ReplyRequest {
            reply_token,
            messages: [TextMessage {
                kind: "text",
                text: truncate_chars(text, MAX_TEXT_CHARS),
            }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LineError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

impl Replier for LineClient {
    fn reply_text<'a>(&'a self, reply_token: &'a str, text: &'a str) -> ReplyFuture<'a> {
        Box::pin(self.send_reply(reply_token, text))
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
