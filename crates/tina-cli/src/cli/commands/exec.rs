//! Exec command handler.

use anyhow::{Result, bail};
use tina_core::core::{ChatController, Role};

pub async fn run(mut controller: ChatController, prompt: &str) -> Result<()> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        bail!("Prompt must not be empty");
    }

    controller.send(prompt).await;
    if let Some(err) = controller.last_error() {
        bail!("Chat request failed: {err}");
    }

    let turns = controller.turns();
    match turns.iter().rev().find(|turn| turn.role == Role::Assistant) {
        Some(reply) => println!("{}", reply.text),
        None => bail!("No reply received"),
    }
    Ok(())
}
