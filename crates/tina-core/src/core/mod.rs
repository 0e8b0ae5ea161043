pub mod controller;
pub mod conversation;
pub mod session;

pub use controller::ChatController;
pub use conversation::{Conversation, ConversationEvent, Role, Turn};
pub use session::{FileSessionStore, MemorySessionStore, SessionId, SessionStore};
