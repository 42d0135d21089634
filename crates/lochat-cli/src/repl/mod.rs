//! Interactive chat loop
//!
//! Reads lines from stdin, runs plain lines as chat turns and dispatches
//! `/commands`. Ctrl-C stops a running reply; pressed at the prompt it quits.

mod commands;
mod render;

use anyhow::Result;
use chrono::Local;
use crossterm::style::Stylize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;

use lochat_core::ai::models::fallback_models;
use lochat_core::ai::prompts::{analysis_prompt, research_prompt};
use lochat_core::ai::types::ModelInfo;
use lochat_core::{
    constants, is_thinking, run_turn, PromptMode, RequestController, SessionStore, TurnOutcome,
};

pub use commands::{SlashCommand, HELP};
use render::{
    print_assistant_prefix, print_error, print_notice, print_prompt, print_segments,
    print_session, ReasoningStream,
};

/// Resolve a 1-based list position, a full id or a unique id prefix
pub fn resolve_session(store: &SessionStore, target: &str) -> Option<String> {
    let sessions = store.sessions();
    if let Ok(n) = target.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| sessions.get(i))
            .map(|s| s.id.clone());
    }
    if let Some(session) = sessions.iter().find(|s| s.id == target) {
        return Some(session.id.clone());
    }
    let mut matches = sessions.iter().filter(|s| s.id.starts_with(target));
    match (matches.next(), matches.next()) {
        (Some(session), None) => Some(session.id.clone()),
        _ => None,
    }
}

/// First eight characters of an id
fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(end, _)| &id[..end])
}

pub fn print_sessions(store: &SessionStore) {
    if store.sessions().is_empty() {
        println!("No chats yet.");
        return;
    }
    let active = store.active_session_id();
    for (i, session) in store.sessions().iter().enumerate() {
        let marker = if Some(session.id.as_str()) == active { "*" } else { " " };
        println!(
            "{} {:>2}. {}  {}  {} messages  {}",
            marker,
            i + 1,
            session.title.as_str().bold(),
            short_id(&session.id).dark_grey(),
            session.messages.len(),
            session
                .updated_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
        );
    }
}

fn format_size(bytes: u64) -> String {
    const GB: f64 = 1024.0 * 1024.0 * 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    let bytes = bytes as f64;
    if bytes >= GB {
        format!("{:.1} GB", bytes / GB)
    } else if bytes >= MB {
        format!("{:.0} MB", bytes / MB)
    } else {
        "-".to_string()
    }
}

pub fn print_models(models: &[ModelInfo], current: &str) {
    for model in models {
        let marker = if model.name == current { "*" } else { " " };
        println!("{} {:<40} {}", marker, model.name, format_size(model.size));
    }
}

pub fn print_modes(current: PromptMode) {
    for mode in PromptMode::ALL {
        let marker = if mode == current { "*" } else { " " };
        println!(
            "{} {:<14} {:<14} {}",
            marker,
            mode.id(),
            mode.label(),
            mode.description().dark_grey()
        );
    }
}

/// Drop quit requests queued while a command was running
///
/// Ctrl-C only quits from the prompt. A press that lands between starting a
/// turn and arming its request finds nothing to cancel and is discarded here.
fn discard_pending_quits(quit_rx: &mut UnboundedReceiver<()>) -> usize {
    let mut dropped = 0;
    while quit_rx.try_recv().is_ok() {
        dropped += 1;
    }
    dropped
}

/// Interactive session state
pub struct Repl {
    store: SessionStore,
    controller: RequestController,
}

impl Repl {
    pub fn new(store: SessionStore, controller: RequestController) -> Self {
        Self { store, controller }
    }

    pub async fn run(mut self) -> Result<()> {
        self.store.ensure_session();
        println!(
            "{} model {}, type /help for commands",
            "lochat".bold(),
            self.store.current_model().cyan()
        );
        if let Some(session) = self.store.active_session() {
            if !session.messages.is_empty() {
                print_session(session);
            }
        }

        let handle = self.controller.cancel_handle();
        let (quit_tx, mut quit_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !handle.cancel() && quit_tx.send(()).is_err() {
                    break;
                }
            }
        });

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print_prompt(self.store.current_prompt_mode().id());
            let line = tokio::select! {
                _ = quit_rx.recv() => {
                    println!();
                    break;
                }
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                println!();
                break;
            };

            match SlashCommand::parse(&line) {
                Some(SlashCommand::Quit) => break,
                Some(command) => self.handle_command(command).await,
                None => self.send(&line).await,
            }

            let dropped = discard_pending_quits(&mut quit_rx);
            if dropped > 0 {
                info!("Ignored {} Ctrl-C presses outside the prompt", dropped);
            }
        }

        info!("Leaving interactive chat");
        Ok(())
    }

    async fn send(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        print_assistant_prefix();

        let mut stream = ReasoningStream::new();
        let outcome = run_turn(&mut self.store, &self.controller, text, |full| {
            print_segments(&stream.advance(full));
        })
        .await;

        match outcome {
            TurnOutcome::Skipped => {}
            TurnOutcome::Completed { text } => {
                print_segments(&stream.finish(&text));
                println!();
            }
            TurnOutcome::Cancelled { partial } => {
                print_segments(&stream.finish(&partial));
                println!();
                if is_thinking(&partial) {
                    print_notice("(stopped while thinking)");
                } else {
                    print_notice("(stopped)");
                }
            }
            TurnOutcome::Failed { error } => {
                println!();
                print_error(constants::ai::FAILED_RESPONSE_TEXT);
                println!("{}", error.to_string().dark_grey());
            }
        }

        if let Some(error) = self.store.last_persistence_error() {
            print_error(&format!("Warning: chat history not saved: {}", error));
        }
    }

    async fn handle_command(&mut self, command: SlashCommand) {
        match command {
            SlashCommand::New(title) => {
                self.store.create_session(title.as_deref());
                print_notice("Started a new chat.");
            }
            SlashCommand::Sessions => print_sessions(&self.store),
            SlashCommand::Switch(target) => match resolve_session(&self.store, &target) {
                Some(id) => {
                    self.store.select_session(&id);
                    if let Some(session) = self.store.active_session() {
                        print_session(session);
                    }
                }
                None => print_error(&format!("No chat matches '{}'", target)),
            },
            SlashCommand::Delete(target) => match resolve_session(&self.store, &target) {
                Some(id) => {
                    self.store.delete_session(&id);
                    print_notice("Chat deleted.");
                    if self.store.active_session().is_none() {
                        self.store.ensure_session();
                    }
                }
                None => print_error(&format!("No chat matches '{}'", target)),
            },
            SlashCommand::Rename(title) => {
                if let Some(id) = self.store.active_session_id().map(str::to_string) {
                    self.store.update_session_title(&id, &title);
                    print_notice(&format!("Renamed to '{}'.", title));
                }
            }
            SlashCommand::Clear => {
                self.store.clear_messages();
                print_notice("Messages cleared.");
            }
            SlashCommand::Model(None) => println!("Model: {}", self.store.current_model()),
            SlashCommand::Model(Some(name)) => {
                self.store.set_model(&name);
                print_notice(&format!("Model set to {}.", name));
            }
            SlashCommand::Models => {
                let models = match self.controller.client().try_list_models().await {
                    Ok(models) if !models.is_empty() => models,
                    Ok(_) => {
                        print_notice("The model server reports no models, showing defaults.");
                        fallback_models()
                    }
                    Err(e) => {
                        print_notice(&format!(
                            "Could not reach the model server ({}), showing defaults.",
                            e
                        ));
                        fallback_models()
                    }
                };
                print_models(&models, self.store.current_model());
            }
            SlashCommand::Mode(None) => {
                let mode = self.store.current_prompt_mode();
                println!("Mode: {} ({})", mode.id(), mode.description());
            }
            SlashCommand::Mode(Some(name)) => match name.parse::<PromptMode>() {
                Ok(mode) => {
                    self.store.set_prompt_mode(mode);
                    print_notice(&format!("Mode set to {}.", mode.label()));
                }
                Err(e) => print_error(&e.to_string()),
            },
            SlashCommand::Modes => print_modes(self.store.current_prompt_mode()),
            SlashCommand::Research(query) => self.send(&research_prompt(&query)).await,
            SlashCommand::Analyze { kind, content } => {
                self.send(&analysis_prompt(&content, &kind)).await
            }
            SlashCommand::Help => println!("{}", HELP),
            SlashCommand::Invalid(message) => print_error(&message),
            SlashCommand::Quit => {}
        }
    }
}
