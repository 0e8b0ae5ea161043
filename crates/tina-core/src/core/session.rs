//! Client-side session identity.
//!
//! A session id is minted once and then reused until the user starts a new
//! chat. The file store keeps it across runs; the memory store forgets it
//! when the process exits.

use std::io::ErrorKind;
use std::{fmt, fs};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use uuid::Uuid;
use tracing::debug;

const SESSION_PREFIX: &str = "session_";
const SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque, non-empty session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Mints a fresh id: `session_<unix millis>_<9 base-36 chars>`.
    pub fn mint() -> Self {
        let millis = Utc::now().timestamp_millis();
        Self(format!("{SESSION_PREFIX}{millis}_{}", random_suffix()))
    }

    /// Wraps a previously stored id. Returns `None` for blank input.
    pub fn from_stored(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn random_suffix() -> String {
    let mut bits = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        suffix.push(BASE36[(bits % 36) as usize] as char);
        bits /= 36;
    }
    suffix
}

/// Where the session id lives between initializations.
pub trait SessionStore: Send {
    /// Returns the stored id, if any.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    fn load(&self) -> Result<Option<SessionId>>;

    /// Stores `id`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn save(&mut self, id: &SessionId) -> Result<()>;

    /// Forgets the stored id.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be cleared.
    fn clear(&mut self) -> Result<()>;
}

/// Session id persisted in a single file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionId>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read session id from {}", self.path.display()))?;
        Ok(SessionId::from_stored(&raw))
    }

    fn save(&mut self, id: &SessionId) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&self.path, id.as_str())
            .with_context(|| format!("write session id to {}", self.path.display()))
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("remove session file {}", self.path.display())),
        }
    }
}

/// Session id kept only for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    id: Option<SessionId>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionId>> {
        Ok(self.id.clone())
    }

    fn save(&mut self, id: &SessionId) -> Result<()> {
        self.id = Some(id.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.id = None;
        Ok(())
    }
}

/// Returns the stored id or mints and stores a new one.
///
/// # Errors
/// Returns an error if the store cannot be read or written.
pub fn load_or_mint(store: &mut dyn SessionStore) -> Result<SessionId> {
    if let Some(id) = store.load()? {
        debug!(session = %id, "reusing stored session");
        return Ok(id);
    }
    let id = SessionId::mint();
    store.save(&id)?;
    debug!(session = %id, "minted new session");
    Ok(id)
}
