//! Conversation controller.
//!
//! Owns the session id, the local conversation and the HTTP client. Every
//! state change is expressed as a [`ConversationEvent`] applied to the
//! conversation; this type only decides which events to emit.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::conversation::{Conversation, ConversationEvent, Turn};
use super::session::{SessionId, SessionStore, load_or_mint};
use crate::client::{ChatClient, ChatError};
use crate::transcript::{ExportError, TranscriptExporter};

pub const SAVE_FAILED_NOTICE: &str = "Failed to save PDF. Please try again.";

pub struct ChatController {
    client: ChatClient,
    store: Box<dyn SessionStore>,
    session: SessionId,
    conversation: Conversation,
    last_error: Option<ChatError>,
}

impl ChatController {
    /// Creates a controller with an initialized session and an empty
    /// conversation. No request is made.
    ///
    /// # Errors
    /// Returns an error if the session store cannot be read or written.
    pub fn open(client: ChatClient, mut store: Box<dyn SessionStore>) -> Result<Self> {
        let session = load_or_mint(store.as_mut()).context("Failed to initialize session")?;
        info!(session = %session, "session ready");
        Ok(Self {
            client,
            store,
            session,
            conversation: Conversation::new(),
            last_error: None,
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn turns(&self) -> &[Turn] {
        self.conversation.turns()
    }

    /// Error of the most recent exchange, if it failed.
    pub fn last_error(&self) -> Option<&ChatError> {
        self.last_error.as_ref()
    }

    /// Appends a local assistant notice.
    pub fn notice(&mut self, text: impl Into<String>) {
        self.conversation
            .apply(ConversationEvent::Notice(text.into()));
    }

    /// Reuses the stored id or mints one, and empties the conversation.
    ///
    /// # Errors
    /// Returns an error if the session store cannot be read or written.
    pub fn initialize_session(&mut self) -> Result<SessionId> {
        self.session =
            load_or_mint(self.store.as_mut()).context("Failed to initialize session")?;
        self.conversation.apply(ConversationEvent::Reset);
        Ok(self.session.clone())
    }

    /// First half of an exchange: the optimistic user turn.
    ///
    /// Split out so callers can render the pending turn before awaiting.
    pub fn begin_exchange(&mut self, text: &str) {
        self.conversation
            .apply(ConversationEvent::Submitted(text.to_string()));
    }

    /// Second half of an exchange: adopt the server history or record the
    /// failure inline.
    pub fn finish_exchange(&mut self, outcome: Result<Vec<Turn>, ChatError>) {
        match outcome {
            Ok(history) => {
                self.last_error = None;
                self.conversation
                    .apply(ConversationEvent::HistoryReceived(history));
            }
            Err(err) => {
                warn!(session = %self.session, kind = %err.kind, error = %err, "chat exchange failed");
                self.conversation
                    .apply(ConversationEvent::ExchangeFailed(err.message.clone()));
                self.last_error = Some(err);
            }
        }
    }

    /// One full exchange. Never fails: errors end up in the transcript.
    ///
    /// Empty `text` is the bootstrap message that fetches the greeting.
    pub async fn send(&mut self, text: &str) -> &[Turn] {
        self.begin_exchange(text);
        let outcome = self.client.send(&self.session, text).await;
        self.finish_exchange(outcome);
        self.conversation.turns()
    }

    /// Drops the stored id, starts a fresh session and fetches its greeting.
    ///
    /// The current session and conversation are only replaced once the new
    /// id is stored; on error the controller is left as it was.
    ///
    /// # Errors
    /// Returns an error if the session store cannot be cleared or written.
    pub async fn start_new_chat(&mut self) -> Result<&[Turn]> {
        let fresh = SessionId::mint();
        self.store.clear().context("Failed to clear session")?;
        if let Err(err) = self.store.save(&fresh) {
            // Keep the store in step with the session still in use.
            if let Err(restore) = self.store.save(&self.session) {
                warn!(session = %self.session, error = %restore, "failed to restore session");
            }
            return Err(err).context("Failed to store new session");
        }

        self.session = fresh;
        self.conversation.apply(ConversationEvent::Reset);
        info!(session = %self.session, "started new chat");
        Ok(self.send("").await)
    }

    /// Writes the transcript to `dir` and appends a notice describing the
    /// outcome.
    ///
    /// # Errors
    /// Returns the [`ExportError`] after the failure notice is appended.
    pub fn export_transcript(
        &mut self,
        exporter: &TranscriptExporter,
        dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        match exporter.export(self.session.as_str(), self.conversation.turns(), dir) {
            Ok(path) => {
                self.conversation.apply(ConversationEvent::Notice(format!(
                    "Chat history saved to {}",
                    path.display()
                )));
                Ok(path)
            }
            Err(err) => {
                warn!(kind = %err.kind, error = %err, "transcript export failed");
                self.conversation
                    .apply(ConversationEvent::Notice(SAVE_FAILED_NOTICE.to_string()));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::bail;
    use tempfile::tempdir;

    use super::*;
    use crate::client::ChatErrorKind;
    use crate::config::ExportConfig;
    use crate::core::conversation::Role;
    use crate::core::session::MemorySessionStore;

    /// Holds an id but refuses every write.
    struct ReadOnlyStore {
        id: Option<SessionId>,
        fail_clear: bool,
    }

    impl SessionStore for ReadOnlyStore {
        fn load(&self) -> Result<Option<SessionId>> {
            Ok(self.id.clone())
        }

        fn save(&mut self, _id: &SessionId) -> Result<()> {
            bail!("read-only store")
        }

        fn clear(&mut self) -> Result<()> {
            if self.fail_clear {
                bail!("read-only store");
            }
            self.id = None;
            Ok(())
        }
    }

    fn read_only_controller(fail_clear: bool) -> ChatController {
        let client = ChatClient::new("http://127.0.0.1:9", Some(Duration::from_millis(200))).unwrap();
        let store = ReadOnlyStore {
            id: SessionId::from_stored("session_1_abcdefghi"),
            fail_clear,
        };
        ChatController::open(client, Box::new(store)).unwrap()
    }

    fn offline_controller() -> ChatController {
        let client = ChatClient::new("http://127.0.0.1:9", Some(Duration::from_millis(200))).unwrap();
        ChatController::open(client, Box::new(MemorySessionStore::new())).unwrap()
    }

    #[test]
    fn test_blank_submission_adds_no_turn() {
        let mut controller = offline_controller();
        controller.begin_exchange("   ");
        assert!(controller.turns().is_empty());
    }

    #[test]
    fn test_failure_keeps_optimistic_turn() {
        let mut controller = offline_controller();
        controller.begin_exchange("hello");
        controller.finish_exchange(Err(ChatError::new(ChatErrorKind::Api, "boom")));

        let turns = controller.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0], Turn::user("hello"));
        assert_eq!(turns[1].role, Role::Assistant);
        assert!(turns[1].text.contains("boom"));
    }

    #[test]
    fn test_last_error_tracks_latest_exchange() {
        let mut controller = offline_controller();
        controller.finish_exchange(Err(ChatError::new(ChatErrorKind::Timeout, "slow")));
        assert_eq!(controller.last_error().unwrap().kind, ChatErrorKind::Timeout);

        controller.finish_exchange(Ok(vec![Turn::assistant("Hi")]));
        assert!(controller.last_error().is_none());
    }

    #[tokio::test]
    async fn test_new_chat_keeps_session_when_clear_fails() {
        let mut controller = read_only_controller(true);
        controller.finish_exchange(Ok(vec![Turn::assistant("Kia ora!")]));

        assert!(controller.start_new_chat().await.is_err());

        assert_eq!(controller.session_id().as_str(), "session_1_abcdefghi");
        assert_eq!(controller.turns(), &[Turn::assistant("Kia ora!")]);
    }

    #[tokio::test]
    async fn test_new_chat_keeps_session_when_save_fails() {
        let mut controller = read_only_controller(false);
        controller.finish_exchange(Ok(vec![Turn::assistant("Kia ora!")]));

        let err = controller.start_new_chat().await.unwrap_err();

        assert!(format!("{err:#}").contains("Failed to store new session"));
        assert_eq!(controller.session_id().as_str(), "session_1_abcdefghi");
        assert_eq!(controller.turns().len(), 1);
    }

    #[test]
    fn test_initialize_session_resets_conversation() {
        let mut controller = offline_controller();
        let first = controller.session_id().clone();
        controller.begin_exchange("hello");

        let again = controller.initialize_session().unwrap();
        assert_eq!(again, first);
        assert!(controller.turns().is_empty());
    }

    #[test]
    fn test_export_success_appends_notice() {
        let dir = tempdir().unwrap();
        let mut controller = offline_controller();
        controller.finish_exchange(Ok(vec![Turn::assistant("Kia ora!")]));

        let exporter = TranscriptExporter::new(&ExportConfig::default());
        let path = controller.export_transcript(&exporter, dir.path()).unwrap();

        assert!(path.exists());
        let notice = controller.conversation().last().unwrap();
        assert_eq!(notice.text, format!("Chat history saved to {}", path.display()));
    }

    #[test]
    fn test_export_failure_appends_notice() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let mut controller = offline_controller();

        let exporter = TranscriptExporter::new(&ExportConfig::default());
        assert!(controller.export_transcript(&exporter, &blocker).is_err());
        assert_eq!(
            controller.conversation().last().unwrap().text,
            SAVE_FAILED_NOTICE
        );
    }
}
