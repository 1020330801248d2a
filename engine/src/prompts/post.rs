use super::{CONTENT_MARKER, TITLE_MARKER};
use crate::llm::clean_output;
use crate::memory::char_prefix;

/// Longest title kept from an explicit `TITLE:` line
const MAX_TITLE_CHARS: usize = 100;

/// Length of a title synthesized from the body
const FALLBACK_TITLE_CHARS: usize = 50;

/// A generated post split into title and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
}

/// Split generated post output into title and body
///
/// With a `CONTENT:` marker the text before it (minus any `TITLE:` prefix)
/// is the title and the text after it is the body. Without the marker the
/// whole output is the body. A missing or empty title is synthesized from
/// the first characters of the body.
pub fn parse_post(output: &str) -> PostDraft {
    let cleaned = clean_output(output);

    match cleaned.split_once(CONTENT_MARKER) {
        Some((head, tail)) => {
            let body = tail.trim().to_string();
            let explicit = head.replace(TITLE_MARKER, "");
            let explicit = explicit.trim();
            let title = if explicit.is_empty() {
                fallback_title(&body)
            } else {
                char_prefix(explicit, MAX_TITLE_CHARS).trim_end().to_string()
            };
            PostDraft { title, body }
        }
        None => PostDraft {
            title: fallback_title(&cleaned),
            body: cleaned,
        },
    }
}

fn fallback_title(text: &str) -> String {
    char_prefix(text, FALLBACK_TITLE_CHARS).trim().to_string()
}
