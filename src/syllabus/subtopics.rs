//! Subtopic extraction: break a unit body into short topic phrases that
//! steer the notes prompt.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

/// Fragments must be longer than this (in chars, after trimming)
pub const MIN_SUBTOPIC_CHARS: usize = 3;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("valid whitespace pattern");
    static ref SUBTOPIC_DELIMITER: Regex =
        Regex::new(r"[.,;]|\sand\s|\sor\s|\n").expect("valid delimiter pattern");
}

fn is_trim_char(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '–' | '—' | ':' | '•')
}

/// Extract the deduplicated subtopics of a unit body.
///
/// Iteration order is lexicographic only so prompts are reproducible;
/// treat the result as a set.
pub fn extract_subtopics(unit_body: &str) -> BTreeSet<String> {
    let collapsed = WHITESPACE_RUN.replace_all(unit_body, " ");

    SUBTOPIC_DELIMITER
        .split(&collapsed)
        .map(|fragment| fragment.trim_matches(is_trim_char))
        .filter(|fragment| fragment.chars().count() > MIN_SUBTOPIC_CHARS)
        .map(str::to_string)
        .collect()
}
