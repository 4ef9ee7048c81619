//! Text preparation for speech synthesis.
//!
//! Scripts are shaped before they reach the model: the whisper effect
//! stretches punctuation into pauses, and long scripts are cut into
//! sentence-sized chunks the model can handle in one pass.

use hushwave_core::VoiceStyle;

/// Maximum chunk length in bytes handed to the model in one call.
const MAX_CHUNK_CHARS: usize = 400;

/// Trigger key that turns the whisper effect on.
pub const WHISPER_TRIGGER: &str = "whispering";

/// Whether a request should get the whisper effect.
pub fn wants_whisper<'a>(
    style: Option<VoiceStyle>,
    triggers: impl IntoIterator<Item = &'a String>,
) -> bool {
    style.is_some_and(VoiceStyle::is_whisper)
        || triggers
            .into_iter()
            .any(|t| t.trim().eq_ignore_ascii_case(WHISPER_TRIGGER))
}

/// Lengthen pauses: every `.` becomes `... ` and every `,` becomes `, `.
/// Whitespace is collapsed afterwards.
#[must_use]
pub fn apply_whisper_effect(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        match c {
            '.' => out.push_str("... "),
            ',' => out.push_str(", "),
            other => out.push(other),
        }
    }
    collapse_whitespace(&out)
}

/// Split text into chunks of whole sentences, each at most
/// [`MAX_CHUNK_CHARS`] bytes where possible.
///
/// Sentences longer than the limit are split at clause boundaries, then at
/// word boundaries.
#[must_use]
pub fn split_into_chunks(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if text.len() <= MAX_CHUNK_CHARS {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        if sentence.len() > MAX_CHUNK_CHARS {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(split_long_sentence(&sentence));
            continue;
        }
        if !current.is_empty() && current.len() + 1 + sentence.len() > MAX_CHUNK_CHARS {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&sentence);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Collapse runs of whitespace into single spaces and trim.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sentence boundary: `.`, `!` or `?` followed by whitespace.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().is_some_and(|next| next.is_whitespace());
        if at_boundary {
            push_trimmed(&mut sentences, &current);
            current.clear();
        }
    }
    push_trimmed(&mut sentences, &current);
    sentences
}

fn split_long_sentence(sentence: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for clause in sentence.split_inclusive([',', ';', ':']) {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }
        if !current.is_empty() && current.len() + 1 + clause.len() > MAX_CHUNK_CHARS {
            pieces.push(std::mem::take(&mut current));
        }
        if clause.len() > MAX_CHUNK_CHARS {
            pieces.extend(split_at_words(clause));
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(clause);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

fn split_at_words(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > MAX_CHUNK_CHARS {
            pieces.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

fn push_trimmed(out: &mut Vec<String>, s: &str) {
    let trimmed = s.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}
