//! Session command handlers.

use anyhow::{Context, Result};
use tina_core::config::paths;
use tina_core::core::{FileSessionStore, SessionStore};

pub fn show() -> Result<()> {
    let store = FileSessionStore::new(paths::session_path());
    match store.load().context("load session")? {
        Some(id) => println!("{id}"),
        None => println!("No session stored."),
    }
    Ok(())
}

pub fn clear() -> Result<()> {
    let mut store = FileSessionStore::new(paths::session_path());
    store.clear().context("clear session")?;
    println!("Session cleared.");
    Ok(())
}
