//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tina_core::client::ChatClient;
use tina_core::config::{self, paths};
use tina_core::core::{ChatController, FileSessionStore, MemorySessionStore, SessionStore};
use tina_core::logging;

mod commands;

#[derive(Parser)]
#[command(name = "tina")]
#[command(version = "0.1")]
#[command(about = "Chat with Tina, the insurance consultant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Chat server base URL (overrides config and TINA_SERVER_URL)
    #[arg(long, value_name = "URL")]
    server_url: Option<String>,

    /// Keep the session in memory only
    #[arg(long)]
    ephemeral: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sends one message and prints Tina's reply
    Exec {
        /// The message to send
        #[arg(short, long)]
        prompt: String,
    },
    /// Manage the stored session
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Render a saved chat history as a PDF
    Export {
        /// JSON file with a `history` array
        #[arg(long, value_name = "FILE")]
        history: PathBuf,

        /// Output directory (default: export.output_dir from config)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Tracking ID shown in the header (default: stored session)
        #[arg(long, value_name = "ID")]
        session: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum SessionCommands {
    /// Print the stored session id
    Show,
    /// Forget the stored session id
    Clear,
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = config::Config::load().context("load config")?;
    let _log_guard = logging::init(&paths::logs_dir(), &config.log_level).context("init logging")?;

    let Cli {
        command,
        server_url,
        ephemeral,
    } = cli;

    let persist = config.persist_session && !ephemeral;
    let open_controller = || -> Result<ChatController> {
        let url = config.effective_server_url(server_url.as_deref())?;
        let client = ChatClient::new(&url, config.request_timeout())?;
        let store: Box<dyn SessionStore> = if persist {
            Box::new(FileSessionStore::new(paths::session_path()))
        } else {
            Box::new(MemorySessionStore::new())
        };
        ChatController::open(client, store)
    };

    // default to chat mode
    let Some(command) = command else {
        return commands::chat::run(open_controller()?, &config).await;
    };

    match command {
        Commands::Exec { prompt } => commands::exec::run(open_controller()?, &prompt).await,
        Commands::Session { command } => match command {
            SessionCommands::Show => commands::session::show(),
            SessionCommands::Clear => commands::session::clear(),
        },
        Commands::Export {
            history,
            output,
            session,
        } => commands::export::run(&config, &history, output.as_deref(), session.as_deref()),
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
