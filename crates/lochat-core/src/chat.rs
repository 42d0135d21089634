//! Chat turns
//!
//! Glue between the session store and the request controller: record the
//! user's message, stream the reply into an assistant placeholder, and turn
//! failures into a visible error message.

use tracing::{info, warn};

use crate::ai::controller::{ChatOutcome, RequestController};
use crate::constants;
use crate::error::ChatError;
use crate::storage::{Message, SessionStore};

/// Result of [`run_turn`]
#[derive(Debug)]
pub enum TurnOutcome {
    /// Blank input, or a generation is already running
    Skipped,
    Completed { text: String },
    /// Partial reply is kept in the session
    Cancelled { partial: String },
    /// Placeholder now holds the failure text
    Failed { error: ChatError },
}

/// Run one turn against the active session (created if missing)
///
/// `on_update` receives the accumulated reply after every fragment. It is
/// not called with the failure text; that is reported through the outcome.
pub async fn run_turn<F>(
    store: &mut SessionStore,
    controller: &RequestController,
    text: &str,
    mut on_update: F,
) -> TurnOutcome
where
    F: FnMut(&str),
{
    let text = text.trim();
    if text.is_empty() {
        return TurnOutcome::Skipped;
    }
    if controller.is_generating() {
        warn!("Ignoring turn while a generation is running");
        return TurnOutcome::Skipped;
    }

    store.ensure_session();
    let history = store.history();
    let mode = store.current_prompt_mode();
    let model = store.current_model().to_string();

    store.append_message(Message::user(text, mode));
    store.append_message(Message::assistant_placeholder(mode));

    let mut full = String::new();
    let result = controller
        .start(&history, text, mode, &model, |fragment| {
            full.push_str(fragment);
            store.replace_last_message_content(&full);
            on_update(&full);
        })
        .await;

    match result {
        Ok(ChatOutcome::Completed { text }) => TurnOutcome::Completed { text },
        Ok(ChatOutcome::Cancelled { partial }) => {
            info!("Turn cancelled with {} chars kept", partial.len());
            TurnOutcome::Cancelled { partial }
        }
        Err(error) => {
            warn!("Turn failed: {}", error);
            store.replace_last_message_content(constants::ai::FAILED_RESPONSE_TEXT);
            TurnOutcome::Failed { error }
        }
    }
}
