//! Text cleanup applied to titles, subtitles and descriptions.

use crate::config::defaults::{DEFAULT_TEXT, ELLIPSIS};

fn is_allowed(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | ',' | '-')
}

/// Keep ASCII letters, digits, `.`, `,` and `-`; collapse whitespace runs to
/// a single space and trim. Returns `None` when nothing survives.
pub fn clean_text(input: &str) -> Option<String> {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;

    for ch in input.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
        } else if is_allowed(ch) {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(ch);
        }
    }

    (!out.is_empty()).then_some(out)
}

/// [`clean_text`] with the literal "TBA" substituted for an empty result
pub fn sanitize(input: &str) -> String {
    clean_text(input).unwrap_or_else(|| DEFAULT_TEXT.to_string())
}

/// Cut `text` to `max_chars` characters, appending "..." only when
/// something was removed
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}
