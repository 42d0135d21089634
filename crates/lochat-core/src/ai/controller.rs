//! Request controller
//!
//! Owns the outstanding generation request: builds the message list, runs
//! the call, and lets the user stop it. Stopping is not a failure; the call
//! resolves with whatever text was already delivered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::client::ChatClient;
use super::prompts::PromptMode;
use super::types::{ChatRequest, WireMessage};
use crate::error::ChatError;

/// How a generation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// Server finished the reply
    Completed { text: String },
    /// Stopped by [`RequestController::cancel`]; `partial` is everything
    /// delivered before the stop
    Cancelled { partial: String },
}

struct ActiveRequest {
    generation: u64,
    token: CancellationToken,
}

type Slot = Arc<Mutex<Option<ActiveRequest>>>;

fn cancel_slot(slot: &Slot) -> bool {
    match slot.lock().as_ref() {
        Some(active) => {
            info!("Cancelling request #{}", active.generation);
            active.token.cancel();
            true
        }
        None => false,
    }
}

/// Cloneable handle that cancels the controller's current request
///
/// Hand it to a signal task so Ctrl-C can stop a generation.
#[derive(Clone)]
pub struct CancelHandle {
    slot: Slot,
}

impl CancelHandle {
    /// Cancel the current request; false when nothing is running
    pub fn cancel(&self) -> bool {
        cancel_slot(&self.slot)
    }

    pub fn is_generating(&self) -> bool {
        self.slot.lock().is_some()
    }
}

/// Clears the slot when its request ends, unless a newer request took it
struct SlotGuard {
    slot: Slot,
    generation: u64,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let mut slot = self.slot.lock();
        if slot.as_ref().map(|a| a.generation) == Some(self.generation) {
            *slot = None;
        }
    }
}

/// Issues generation requests, one cancellation slot per controller
pub struct RequestController {
    client: ChatClient,
    slot: Slot,
    generations: AtomicU64,
}

impl RequestController {
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            slot: Arc::new(Mutex::new(None)),
            generations: AtomicU64::new(0),
        }
    }

    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            slot: self.slot.clone(),
        }
    }

    /// Cancel the current request; false when nothing is running
    pub fn cancel(&self) -> bool {
        cancel_slot(&self.slot)
    }

    pub fn is_generating(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// `[system prompt for mode, ...history, new user turn]`
    pub fn build_messages(
        history: &[WireMessage],
        user_text: &str,
        mode: PromptMode,
    ) -> Vec<WireMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(WireMessage::system(mode.system_prompt()));
        messages.extend_from_slice(history);
        messages.push(WireMessage::user(user_text));
        messages
    }

    /// Install a fresh token, replacing the previous one
    fn arm(&self) -> (CancellationToken, SlotGuard) {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let token = CancellationToken::new();
        *self.slot.lock() = Some(ActiveRequest {
            generation,
            token: token.clone(),
        });
        debug!("Armed request #{}", generation);
        (
            token,
            SlotGuard {
                slot: self.slot.clone(),
                generation,
            },
        )
    }

    /// Stream a reply, calling `on_fragment` with each text delta in order
    ///
    /// Fragments already passed to `on_fragment` are never retracted, also
    /// when the call later fails.
    pub async fn start<F>(
        &self,
        history: &[WireMessage],
        user_text: &str,
        mode: PromptMode,
        model: &str,
        mut on_fragment: F,
    ) -> Result<ChatOutcome, ChatError>
    where
        F: FnMut(&str),
    {
        let (token, _guard) = self.arm();
        let call_start = Instant::now();
        let request = ChatRequest::new(
            model,
            Self::build_messages(history, user_text, mode),
            true,
            self.client.config().sampling(mode),
        );

        let mut stream = tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("Request cancelled before response");
                return Ok(ChatOutcome::Cancelled { partial: String::new() });
            }
            result = self.client.chat_stream(&request) => result?,
        };

        let mut text = String::new();
        let mut fragments = 0usize;
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!(
                        "Request cancelled after {} fragments, {:?}",
                        fragments,
                        call_start.elapsed()
                    );
                    return Ok(ChatOutcome::Cancelled { partial: text });
                }
                next = stream.next() => match next {
                    Some(Ok(fragment)) => {
                        fragments += 1;
                        text.push_str(&fragment);
                        on_fragment(&fragment);
                    }
                    Some(Err(e)) => {
                        error!("Stream failed after {} fragments: {}", fragments, e);
                        return Err(e);
                    }
                    None => break,
                }
            }
        }

        info!(
            "=== CHAT STREAM COMPLETE === {} fragments, {} chars in {:?}",
            fragments,
            text.len(),
            call_start.elapsed()
        );
        Ok(ChatOutcome::Completed { text })
    }

    /// Request the whole reply in one response
    pub async fn complete(
        &self,
        history: &[WireMessage],
        user_text: &str,
        mode: PromptMode,
        model: &str,
    ) -> Result<ChatOutcome, ChatError> {
        let (token, _guard) = self.arm();
        let request = ChatRequest::new(
            model,
            Self::build_messages(history, user_text, mode),
            false,
            self.client.config().sampling(mode),
        );

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("Request cancelled before response");
                Ok(ChatOutcome::Cancelled { partial: String::new() })
            }
            result = self.client.chat_complete(&request) => {
                Ok(ChatOutcome::Completed { text: result? })
            }
        }
    }
}
