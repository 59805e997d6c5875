use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::ChatMessage;

/// Why an exchange produced no usable reply.
///
/// Every variant ends in the same fallback turn; the distinction only shows
/// up in the log.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("request to chat endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("chat endpoint responded with status {0}")]
    Status(StatusCode),
    #[error("chat endpoint reported an error")]
    Endpoint,
    #[error("reply had no usable content")]
    Malformed,
    #[error("exchange task did not complete: {0}")]
    Aborted(String),
}

/// One round trip to whatever generates assistant replies.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn exchange(&self, messages: Vec<ChatMessage>) -> Result<String, ExchangeError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ReplyContent {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<Vec<ReplyContent>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Pull `content[0].text` out of a reply body.
pub fn extract_reply(body: &[u8]) -> Result<String, ExchangeError> {
    let reply: ChatReply = serde_json::from_slice(body).map_err(|_| ExchangeError::Malformed)?;

    let text = reply
        .content
        .and_then(|content| content.into_iter().next())
        .and_then(|first| first.text)
        .filter(|text| !text.is_empty());

    match (text, reply.error) {
        (Some(text), _) => Ok(text),
        (None, Some(_)) => Err(ExchangeError::Endpoint),
        (None, None) => Err(ExchangeError::Malformed),
    }
}

/// HTTP client for the chat endpoint.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for ChatClient {
    async fn exchange(&self, messages: Vec<ChatMessage>) -> Result<String, ExchangeError> {
        tracing::debug!(endpoint = %self.endpoint, messages = messages.len(), "posting chat request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest {
                messages: &messages,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ExchangeError::Status(response.status()));
        }

        let body = response.bytes().await?;
        extract_reply(&body)
    }
}
