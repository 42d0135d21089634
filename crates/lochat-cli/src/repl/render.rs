//! Terminal rendering of chat messages
//!
//! Streamed replies arrive as a growing string. [`ReasoningStream`] turns
//! each new suffix into styled segments, hiding the `<think>` tags and
//! dimming what is between them. Tags split across fragments are held back
//! until they are complete.

use std::io::Write;

use crossterm::style::Stylize;
use lochat_core::{split_reasoning, Message, MessageRole, Session};

const OPEN_TAG: &str = "<think>";
const CLOSE_TAG: &str = "</think>";

/// Piece of a reply ready to print
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub reasoning: bool,
}

/// Incremental splitter for a streaming reply
#[derive(Debug, Default)]
pub struct ReasoningStream {
    consumed: usize,
    in_reasoning: bool,
}

/// Length of the longest suffix of `text` that starts `tag`
fn partial_tag_len(text: &str, tag: &str) -> usize {
    (1..tag.len().min(text.len() + 1))
        .rev()
        .find(|&n| text.ends_with(&tag[..n]))
        .unwrap_or(0)
}

impl ReasoningStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Segments for the part of `full` not seen yet
    pub fn advance(&mut self, full: &str) -> Vec<Segment> {
        let mut segments = Vec::new();

        loop {
            let rest = &full[self.consumed..];
            if rest.is_empty() {
                break;
            }
            let tag = if self.in_reasoning { CLOSE_TAG } else { OPEN_TAG };
            // ASCII lowercasing keeps byte offsets intact
            let lowered = rest.to_ascii_lowercase();

            match lowered.find(tag) {
                Some(pos) => {
                    self.push(&mut segments, &rest[..pos]);
                    self.consumed += pos + tag.len();
                    self.in_reasoning = !self.in_reasoning;
                }
                None => {
                    let safe = rest.len() - partial_tag_len(&lowered, tag);
                    self.push(&mut segments, &rest[..safe]);
                    self.consumed += safe;
                    break;
                }
            }
        }
        segments
    }

    /// Release whatever was held back once the reply is over
    pub fn finish(&mut self, full: &str) -> Vec<Segment> {
        let mut segments = self.advance(full);
        let rest = &full[self.consumed.min(full.len())..];
        self.push(&mut segments, rest);
        self.consumed = full.len();
        segments
    }

    fn push(&self, segments: &mut Vec<Segment>, text: &str) {
        if !text.is_empty() {
            segments.push(Segment {
                text: text.to_string(),
                reasoning: self.in_reasoning,
            });
        }
    }
}

pub fn print_segments(segments: &[Segment]) {
    let mut out = std::io::stdout();
    for segment in segments {
        if segment.reasoning {
            let _ = write!(out, "{}", segment.text.as_str().dim().italic());
        } else {
            let _ = write!(out, "{}", segment.text);
        }
    }
    let _ = out.flush();
}

pub fn print_assistant_prefix() {
    print!("{} ", "assistant>".green().bold());
    let _ = std::io::stdout().flush();
}

pub fn print_prompt(mode: &str) {
    print!("{} ", format!("[{}] you>", mode).cyan().bold());
    let _ = std::io::stdout().flush();
}

pub fn print_notice(text: &str) {
    println!("{}", text.yellow());
}

pub fn print_error(text: &str) {
    println!("{}", text.red());
}

/// Print a stored message, reasoning first when present
pub fn print_message(message: &Message) {
    match message.role {
        MessageRole::User => {
            println!("{} {}", "you>".cyan().bold(), message.content);
        }
        MessageRole::Assistant => {
            let split = split_reasoning(&message.content);
            print_assistant_prefix();
            if let Some(reasoning) = split.reasoning.as_deref().filter(|r| !r.is_empty()) {
                println!("{}", format!("(thinking) {}", reasoning).dim().italic());
            }
            println!("{}", split.visible);
        }
    }
}

/// Print a whole session transcript
pub fn print_session(session: &Session) {
    println!(
        "{} {}",
        "==".dark_grey(),
        format!("{} ({})", session.title, session.model).bold()
    );
    for message in &session.messages {
        print_message(message);
    }
}
