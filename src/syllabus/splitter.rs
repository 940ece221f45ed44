//! Unit Splitting
//!
//! Splits a syllabus into units at "UNIT-1" / "Unit II" / "UNIT 3:" style
//! headings. The heading text becomes the unit title.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Title used when the syllabus has no recognizable heading
pub const DEFAULT_UNIT_TITLE: &str = "UNIT-I";

lazy_static! {
    // Word boundaries keep "community" or "unit is" from opening a unit.
    static ref UNIT_HEADING: Regex =
        Regex::new(r"(?i)\b(UNIT[\s\-]*(?:[IVX]+|\d+))\b[:\s]*").expect("valid unit heading pattern");
}

/// A titled slice of the syllabus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub title: String,
    pub body: String,
}

impl Unit {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Anchor id for this unit in the assembled document
    pub fn slug(&self) -> String {
        unit_slug(&self.title)
    }
}

/// Anchor slug for a unit title: lowercased, spaces to hyphens, colons dropped.
///
/// The table of contents and the section anchors both go through here, so
/// links always match their targets.
pub fn unit_slug(title: &str) -> String {
    title.to_lowercase().replace(' ', "-").replace(':', "")
}

/// Slugs for a run of titles, made unique within the run.
///
/// Repeats get `-2`, `-3`, ... appended in input order, so "Unit I" and
/// "UNIT I" map to `unit-i` and `unit-i-2`.
pub fn unique_slugs<'a, I>(titles: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    titles
        .into_iter()
        .map(|title| {
            let base = unit_slug(title);
            let mut slug = base.clone();
            let mut n = 2;
            while !seen.insert(slug.clone()) {
                slug = format!("{}-{}", base, n);
                n += 1;
            }
            slug
        })
        .collect()
}

fn normalize_title(raw: &str) -> String {
    raw.replace(':', "").trim().to_string()
}

/// Split syllabus text into units.
///
/// Never returns an empty vector. Text without headings, whitespace-only
/// text, and text whose headings all have empty bodies come back as a
/// single `UNIT-I` unit holding the trimmed input.
pub fn split_units(syllabus_text: &str) -> Vec<Unit> {
    let cleaned = syllabus_text.replace('\r', " ");
    let text = cleaned.trim();

    let markers: Vec<_> = UNIT_HEADING.captures_iter(text).collect();
    if markers.is_empty() {
        debug!("No unit headings found, using whole syllabus as one unit");
        return vec![Unit::new(DEFAULT_UNIT_TITLE, text)];
    }

    let mut units = Vec::with_capacity(markers.len());

    // Course titles and other text before the first heading are not a unit
    let first_start = markers[0].get(0).map(|m| m.start()).unwrap_or(0);
    let preamble = text[..first_start].trim();
    if !preamble.is_empty() {
        debug!(chars = preamble.chars().count(), "Dropping text before the first unit heading");
    }

    for (i, caps) in markers.iter().enumerate() {
        let (Some(heading), Some(title)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let body_end = markers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());

        let body = text[heading.end()..body_end].trim();
        if body.is_empty() {
            continue;
        }
        units.push(Unit::new(normalize_title(title.as_str()), body));
    }

    if units.is_empty() {
        debug!("Every unit heading had an empty body, falling back to one unit");
        return vec![Unit::new(DEFAULT_UNIT_TITLE, text)];
    }

    debug!(count = units.len(), "Split syllabus into units");
    units
}
