//! Reasoning segment extraction
//!
//! Reasoning models emit their chain of thought inside `<think>...</think>`
//! before the answer. Renderers show it separately from the visible reply.
//! Called on every redraw of a streaming message, so the no-tag path does
//! not allocate.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

/// First closed reasoning region, interior captured
static RE_THINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<think>(.*?)</think>").expect("valid think regex"));

/// An opening tag, used to detect a still-open reasoning segment
static RE_THINK_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<think>").expect("valid think-open regex"));

/// Assistant text split into reasoning and visible answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningSplit<'a> {
    /// Trimmed interior of the first closed `<think>` region
    pub reasoning: Option<String>,
    /// Text with every closed region removed
    pub visible: Cow<'a, str>,
}

/// Split `text` into reasoning and visible answer
///
/// Without a closed region the input is returned unchanged, including a
/// dangling `<think>` whose closing tag has not streamed in yet.
pub fn split_reasoning(text: &str) -> ReasoningSplit<'_> {
    let Some(captures) = RE_THINK.captures(text) else {
        return ReasoningSplit {
            reasoning: None,
            visible: Cow::Borrowed(text),
        };
    };

    let reasoning = captures
        .get(1)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    let visible = RE_THINK.replace_all(text, "").trim().to_string();

    ReasoningSplit {
        reasoning: Some(reasoning),
        visible: Cow::Owned(visible),
    }
}

/// True while the text is inside an unclosed reasoning segment
pub fn is_thinking(text: &str) -> bool {
    let closed = RE_THINK.find_iter(text).last().map(|m| m.end()).unwrap_or(0);
    RE_THINK_OPEN.is_match(&text[closed..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_region_is_split() {
        let split = split_reasoning("<think>plan</think>answer");
        assert_eq!(split.reasoning.as_deref(), Some("plan"));
        assert_eq!(split.visible, "answer");
    }

    #[test]
    fn test_no_tag_returns_input_borrowed() {
        let input = "just an answer\n";
        let split = split_reasoning(input);
        assert!(split.reasoning.is_none());
        assert_eq!(split.visible, input);
        assert!(matches!(split.visible, Cow::Borrowed(_)));
    }

    #[test]
    fn test_unterminated_tag_does_not_match() {
        let input = "<think>still working it out";
        let split = split_reasoning(input);
        assert!(split.reasoning.is_none());
        assert_eq!(split.visible, input);
        assert!(is_thinking(input));
    }

    #[test]
    fn test_case_insensitive_and_multiline() {
        let split = split_reasoning("<THINK>\n  step one\n  step two\n</Think>\n\nThe answer.");
        assert_eq!(split.reasoning.as_deref(), Some("step one\n  step two"));
        assert_eq!(split.visible, "The answer.");
    }

    #[test]
    fn test_first_region_is_reasoning_all_regions_stripped() {
        let split = split_reasoning("<think>a</think>one <think>b</think>two");
        assert_eq!(split.reasoning.as_deref(), Some("a"));
        assert_eq!(split.visible, "one two");
    }

    #[test]
    fn test_idempotent_on_visible() {
        let first = split_reasoning("<think>x</think> answer ");
        let second = split_reasoning(&first.visible);
        assert_eq!(second.visible, first.visible);
        assert!(second.reasoning.is_none());
    }

    #[test]
    fn test_is_thinking_after_close() {
        assert!(!is_thinking("<think>done</think>answer"));
        assert!(!is_thinking("plain"));
        assert!(is_thinking("<think>a</think>b<think>again"));
    }
}
