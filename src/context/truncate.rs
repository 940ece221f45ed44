//! Context truncation

/// Appended after a cut so the model can tell the context was shortened
pub const TRUNCATION_MARKER: &str = "\n\n...[context truncated]...";

/// Cut `text` to at most `max_chars` characters, appending
/// [`TRUNCATION_MARKER`] when anything was removed.
///
/// Counts `char`s rather than bytes so the cut never lands inside a UTF-8
/// sequence. The cut ignores word boundaries.
pub fn truncate_context(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => {
            let mut truncated = String::with_capacity(cut + TRUNCATION_MARKER.len());
            truncated.push_str(&text[..cut]);
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
    }
}
