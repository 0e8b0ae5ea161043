//! Line-oriented interactive chat.
//!
//! Reads one message per line. Lines starting with `:` are local commands.
//! Nothing that goes wrong during a chat ends the loop; failures show up in
//! the transcript like any other assistant turn.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use tina_core::core::{ChatController, Role, Turn};
use tina_core::transcript::TranscriptExporter;
use tracing::{debug, warn};

const THINKING: &str = "Tina is thinking...";

const NEW_CHAT_FAILED_NOTICE: &str = "Could not start a new chat. Please try again.";

const HELP: &str = "\
Commands:
  :new   start a new chat
  :pdf   save the chat as a PDF
  :help  show this help
  :q     quit";

/// Things the REPL needs besides the controller.
pub struct ReplOptions {
    pub exporter: TranscriptExporter,
    pub output_dir: PathBuf,
    pub user_label: String,
    pub assistant_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Quit,
    NewChat,
    Export,
    Help,
    Blank,
    Message(String),
}

fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    match trimmed {
        ":q" | ":quit" => Input::Quit,
        ":new" => Input::NewChat,
        ":pdf" => Input::Export,
        ":help" => Input::Help,
        "" => Input::Blank,
        _ => Input::Message(trimmed.to_string()),
    }
}

pub struct Repl {
    controller: ChatController,
    options: ReplOptions,
}

impl Repl {
    pub fn new(controller: ChatController, options: ReplOptions) -> Self {
        Self {
            controller,
            options,
        }
    }

    /// Runs until `:q` or end of input.
    ///
    /// # Errors
    /// Returns an error when reading input or writing output fails.
    pub async fn run<R: BufRead, W: Write>(mut self, mut input: R, mut out: W) -> Result<()> {
        writeln!(out, "Tina Chat (session {})", self.controller.session_id())?;
        writeln!(out, "Type :help for commands.")?;

        if self.controller.conversation().is_empty() {
            self.exchange("", &mut out).await?;
        }

        let mut line = String::new();
        loop {
            write!(out, "{} ", self.options.user_label)?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }

            match parse_input(&line) {
                Input::Quit => break,
                Input::Help => writeln!(out, "{HELP}")?,
                Input::NewChat => self.new_chat(&mut out).await?,
                Input::Export => {
                    let before = self.controller.turns().to_vec();
                    // The outcome is reported through the appended notice.
                    let _ = self
                        .controller
                        .export_transcript(&self.options.exporter, &self.options.output_dir);
                    self.print_new_turns(&before, &mut out)?;
                }
                Input::Blank => {
                    if self.controller.conversation().is_empty() {
                        self.exchange("", &mut out).await?;
                    }
                }
                Input::Message(text) => self.exchange(&text, &mut out).await?,
            }
        }

        debug!(turns = self.controller.turns().len(), "chat ended");
        Ok(())
    }

    async fn exchange<W: Write>(&mut self, text: &str, out: &mut W) -> Result<()> {
        let before = self.controller.turns().to_vec();
        self.begin_wait(out)?;
        self.controller.send(text).await;
        self.end_wait(out)?;
        self.print_new_turns(&before, out)
    }

    async fn new_chat<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.begin_wait(out)?;
        let outcome = self.controller.start_new_chat().await.map(|_| ());
        self.end_wait(out)?;

        match outcome {
            Ok(()) => {
                writeln!(out, "New chat (session {})", self.controller.session_id())?;
                self.print_replies(0, out)
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "new chat failed");
                let before = self.controller.turns().to_vec();
                self.controller.notice(NEW_CHAT_FAILED_NOTICE);
                self.print_new_turns(&before, out)
            }
        }
    }

    fn begin_wait<W: Write>(&self, out: &mut W) -> Result<()> {
        write!(out, "{THINKING}")?;
        out.flush()?;
        Ok(())
    }

    fn end_wait<W: Write>(&self, out: &mut W) -> Result<()> {
        write!(out, "\r{}\r", " ".repeat(THINKING.len()))?;
        Ok(())
    }

    /// Prints the assistant turns past the prefix shared with `before`.
    ///
    /// The server history replaces the local one, so it may be shorter or
    /// differ from what was shown; anything after the shared prefix is new.
    fn print_new_turns<W: Write>(&self, before: &[Turn], out: &mut W) -> Result<()> {
        let shared = before
            .iter()
            .zip(self.controller.turns())
            .take_while(|(old, new)| old == new)
            .count();
        self.print_replies(shared, out)
    }

    /// Prints assistant turns from index `start` on.
    fn print_replies<W: Write>(&self, start: usize, out: &mut W) -> Result<()> {
        let turns = self.controller.turns();
        let start = start.min(turns.len());
        for turn in turns[start..].iter().filter(|t| t.role == Role::Assistant) {
            writeln!(out, "{}", self.format_turn(turn))?;
        }
        Ok(())
    }

    fn format_turn(&self, turn: &Turn) -> String {
        let label = match turn.role {
            Role::User => &self.options.user_label,
            Role::Assistant => &self.options.assistant_label,
        };
        format!("{label} {}", turn.text)
    }
}
