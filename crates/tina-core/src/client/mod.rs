//! HTTP client for the consultation backend.
//!
//! One endpoint: `POST <server_url>/chat` with `{sessionId, userResponse}`,
//! answered by the full conversation history.

mod errors;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::errors::{ChatError, ChatErrorKind};
use crate::core::conversation::Turn;
use crate::core::session::SessionId;

const CHAT_PATH: &str = "/chat";

/// User-Agent header sent with every request.
pub const USER_AGENT: &str = concat!("tina/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    session_id: &'a str,
    user_response: &'a str,
}

/// Successful response body.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub history: Vec<Turn>,
}

/// Client for the `/chat` endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    endpoint: String,
    http: Client,
}

impl ChatClient {
    /// Creates a client for `server_url` (without the `/chat` suffix).
    ///
    /// `timeout` of `None` leaves timing to the transport defaults.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(server_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("build HTTP client")?;

        Ok(Self {
            endpoint: format!("{}{}", server_url.trim_end_matches('/'), CHAT_PATH),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one message and returns the server's authoritative history.
    ///
    /// Exactly one request is issued; there are no retries.
    ///
    /// # Errors
    /// Returns a [`ChatError`] for transport failures, non-2xx responses and
    /// bodies that are not a chat history.
    pub async fn send(&self, session_id: &SessionId, text: &str) -> Result<Vec<Turn>, ChatError> {
        let request = ChatRequest {
            session_id: session_id.as_str(),
            user_response: text,
        };

        debug!(endpoint = %self.endpoint, session = %session_id, "POST chat");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::classify(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ChatError::classify(&e))?;

        if !status.is_success() {
            return Err(ChatError::http_status(status.as_u16(), &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ChatError::parse(format!("Invalid chat response: {e}")))?;

        debug!(turns = parsed.history.len(), "chat history received");
        Ok(parsed.history)
    }
}
