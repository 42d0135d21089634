//! lochat - terminal chat for a locally hosted language model
//!
//! Streams replies from an Ollama-compatible server, keeps named chats
//! across restarts, and lets you stop a reply mid-stream.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use lochat_core::storage::MemoryBackend;
use lochat_core::{
    paths, AppConfig, ChatClient, ChatClientConfig, Database, PromptMode, RequestController,
    SessionStore,
};

mod repl;

/// lochat - chat with a local model server
#[derive(Parser)]
#[command(name = "lochat", version)]
#[command(about = "Terminal chat client for a local Ollama server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Model server URL (overrides config and OLLAMA_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Model to use
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Prompt mode (chat, creative, code, research, deep-research)
    #[arg(long, global = true)]
    mode: Option<PromptMode>,

    /// Chat history database
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,

    /// List installed models
    Models,

    /// Manage saved chats
    Sessions {
        #[command(subcommand)]
        action: Option<SessionCommands>,
    },

    /// List prompt modes
    Modes,
}

#[derive(Subcommand)]
enum SessionCommands {
    /// List saved chats
    List,
    /// Create a chat and make it current
    New { title: Option<String> },
    /// Delete a chat by list position or id
    Delete { target: String },
    /// Delete every chat
    ClearAll,
}

fn init_logging() {
    // Log to a file so output never interleaves with the chat
    let log_dir = paths::logs_dir();
    std::fs::create_dir_all(&log_dir).ok();

    let Ok(log_file) = std::fs::File::create(log_dir.join("lochat.log")) else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();
}

/// Open the SQLite-backed store, falling back to memory if the file is unusable
fn open_store(path: &Path, default_model: &str) -> SessionStore {
    match Database::new(path) {
        Ok(db) => {
            tracing::info!("Using chat database at {}", path.display());
            SessionStore::load(db, default_model)
        }
        Err(e) => {
            tracing::error!("Failed to open {}: {}", path.display(), e);
            eprintln!(
                "Warning: could not open {} ({}); chats will not be saved.",
                path.display(),
                e
            );
            SessionStore::load(MemoryBackend::new(), default_model)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let config = AppConfig::load()
        .with_context(|| format!("Failed to load {}", paths::config_file().display()))?
        .with_base_url_override(cli.base_url.clone());
    tracing::info!("Model server: {}", config.base_url);

    let db_path = cli.db.clone().unwrap_or_else(|| config.database_path());
    let mut store = open_store(&db_path, &config.default_model);
    if let Some(model) = cli.model.as_deref() {
        store.set_model(model);
    }
    if let Some(mode) = cli.mode {
        store.set_prompt_mode(mode);
    }

    let client = ChatClient::new(ChatClientConfig::from(&config));

    match cli.command {
        None | Some(Commands::Chat) => {
            repl::Repl::new(store, RequestController::new(client))
                .run()
                .await?;
        }
        Some(Commands::Models) => {
            let models = client.list_models().await;
            repl::print_models(&models, store.current_model());
        }
        Some(Commands::Modes) => repl::print_modes(store.current_prompt_mode()),
        Some(Commands::Sessions { action }) => {
            run_session_command(&mut store, action)?;
            if let Some(error) = store.last_persistence_error() {
                eprintln!("Warning: change not saved: {}", error);
            }
        }
    }

    Ok(())
}

fn run_session_command(store: &mut SessionStore, action: Option<SessionCommands>) -> Result<()> {
    match action {
        None | Some(SessionCommands::List) => repl::print_sessions(store),
        Some(SessionCommands::New { title }) => {
            let id = store.create_session(title.as_deref());
            println!("Created chat {}", id);
        }
        Some(SessionCommands::Delete { target }) => {
            let id = repl::resolve_session(store, &target)
                .with_context(|| format!("No chat matches '{}'", target))?;
            store.delete_session(&id);
            println!("Deleted chat {}", id);
        }
        Some(SessionCommands::ClearAll) => {
            let count = store.sessions().len();
            store.clear_all_sessions();
            println!("Deleted {} chats", count);
        }
    }
    Ok(())
}
