//! Export command handler.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tina_core::client::ChatResponse;
use tina_core::config::{Config, paths};
use tina_core::core::{FileSessionStore, SessionId, SessionStore};
use tina_core::transcript::TranscriptExporter;

pub fn run(
    config: &Config,
    history: &Path,
    output: Option<&Path>,
    session: Option<&str>,
) -> Result<()> {
    let raw = fs::read_to_string(history)
        .with_context(|| format!("read history from {}", history.display()))?;
    let parsed: ChatResponse = serde_json::from_str(&raw)
        .with_context(|| format!("parse history in {}", history.display()))?;

    let session = match session {
        Some(id) => id.to_string(),
        None => FileSessionStore::new(paths::session_path())
            .load()
            .context("load session")?
            .unwrap_or_else(SessionId::mint)
            .to_string(),
    };

    let dir = output.map_or_else(|| config.export.output_dir(), Path::to_path_buf);
    let exporter = TranscriptExporter::new(&config.export);
    let path = exporter
        .export(&session, &parsed.history, &dir)
        .context("export transcript")?;

    println!("Chat history saved to {}", path.display());
    Ok(())
}
