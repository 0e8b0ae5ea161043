//! Chat command handler.

use std::io;

use anyhow::{Context, Result};
use tina_core::config::Config;
use tina_core::core::ChatController;
use tina_core::transcript::TranscriptExporter;

use crate::modes::repl::{Repl, ReplOptions};

pub async fn run(controller: ChatController, config: &Config) -> Result<()> {
    let options = ReplOptions {
        exporter: TranscriptExporter::new(&config.export),
        output_dir: config.export.output_dir(),
        user_label: config.export.user_label.clone(),
        assistant_label: config.export.assistant_label.clone(),
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    Repl::new(controller, options)
        .run(stdin.lock(), stdout.lock())
        .await
        .context("interactive chat failed")
}
