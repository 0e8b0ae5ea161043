//! Conversation state and its reducer.
//!
//! All mutations go through [`Conversation::apply`]. The server owns the
//! history: every successful exchange replaces the local turns wholesale.

use serde::{Deserialize, Serialize};

/// Who authored a turn.
///
/// On the wire any role other than `user` (the backend says `ai`)
/// is read as the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(other)]
    Assistant,
}

/// One chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Events that modify the conversation.
#[derive(Debug, Clone)]
pub enum ConversationEvent {
    /// The user submitted text; adds the optimistic turn.
    Submitted(String),
    /// The server answered with its authoritative history.
    HistoryReceived(Vec<Turn>),
    /// The exchange failed; the message is shown as an assistant turn.
    ExchangeFailed(String),
    /// A local notice (export result) shown as an assistant turn.
    Notice(String),
    /// Drop every turn (new session).
    Reset,
}

/// Ordered list of turns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The reducer.
    pub fn apply(&mut self, event: ConversationEvent) {
        match event {
            ConversationEvent::Submitted(text) => {
                // Blank text only bootstraps the greeting; it never shows up
                // as a user turn.
                if !text.trim().is_empty() {
                    self.turns.push(Turn::user(text));
                }
            }
            ConversationEvent::HistoryReceived(history) => {
                self.turns = history;
            }
            ConversationEvent::ExchangeFailed(message) => {
                self.turns.push(Turn::assistant(format!(
                    "Sorry, an error occurred: {message}. Please try again."
                )));
            }
            ConversationEvent::Notice(text) => {
                self.turns.push(Turn::assistant(text));
            }
            ConversationEvent::Reset => self.turns.clear(),
        }
    }
}
