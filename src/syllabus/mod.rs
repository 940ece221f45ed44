//! Syllabus Parsing
//!
//! Turns raw syllabus text into titled units and short subtopic phrases.
//! Nothing in here can fail: any input yields at least one unit.

pub mod splitter;
pub mod subtopics;

pub use splitter::{split_units, unique_slugs, unit_slug, Unit, DEFAULT_UNIT_TITLE};
pub use subtopics::{extract_subtopics, MIN_SUBTOPIC_CHARS};
