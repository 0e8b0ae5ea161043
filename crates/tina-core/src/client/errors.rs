use std::error::Error;
use std::fmt;

use serde::Deserialize;

/// Categories of chat errors for consistent handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    /// Connection refused, DNS failure, broken request
    Transport,
    /// Request timed out
    Timeout,
    /// Non-2xx response from the backend
    Api,
    /// 2xx response whose body is not a chat history
    Parse,
}

impl fmt::Display for ChatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatErrorKind::Transport => write!(f, "transport"),
            ChatErrorKind::Timeout => write!(f, "timeout"),
            ChatErrorKind::Api => write!(f, "api"),
            ChatErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error from a chat exchange.
#[derive(Debug, Clone)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    /// One-line summary suitable for the transcript
    pub message: String,
    /// HTTP status, when the backend answered
    pub status: Option<u16>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// Creates an error for a non-2xx response.
    ///
    /// Uses the backend's `error` field when present, otherwise a generic
    /// status line.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| format!("HTTP Error! Status: {status}"));

        Self {
            kind: ChatErrorKind::Api,
            message,
            status: Some(status),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Parse, message)
    }

    pub fn classify(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::new(ChatErrorKind::Timeout, format!("Request timed out: {e}"))
        } else if e.is_connect() {
            Self::new(ChatErrorKind::Transport, format!("Connection failed: {e}"))
        } else if e.is_request() {
            Self::new(ChatErrorKind::Transport, format!("Request error: {e}"))
        } else {
            Self::new(ChatErrorKind::Transport, format!("Network error: {e}"))
        }
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ChatError {}
