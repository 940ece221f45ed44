//! Final document assembly: header, table of contents, anchored unit
//! sections and footer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::unit::UnitNotes;

pub const DEFAULT_SUBJECT_HEADER: &str = "SUBJECT NOTES";

/// The assembled notes for a whole syllabus
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesDocument {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub subject_header: String,
    pub units: Vec<UnitNotes>,
    pub markdown: String,
}

impl NotesDocument {
    pub fn degraded_units(&self) -> usize {
        self.units.iter().filter(|u| u.is_degraded()).count()
    }
}

pub fn subject_header(subject: Option<&str>) -> String {
    subject
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .unwrap_or_else(|| DEFAULT_SUBJECT_HEADER.to_string())
}

pub fn table_of_contents(units: &[UnitNotes]) -> String {
    units
        .iter()
        .map(|u| format!("- [{}](#{})\n", u.title, u.slug))
        .collect()
}

pub fn assemble_document(subject: Option<&str>, units: &[UnitNotes]) -> String {
    let header = subject_header(subject);
    let sections: Vec<String> = units
        .iter()
        .map(|u| format!("<a id=\"{}\"></a>\n\n{}", u.slug, u.markdown.trim()))
        .collect();

    let mut doc = format!(
        "# {}\n**Comprehensive Study Notes & Exam Preparation**\n\n---\n\n## Table of Contents\n",
        header
    );
    doc.push_str(&table_of_contents(units));
    doc.push_str("\n---\n\n");
    doc.push_str(&sections.join("\n\n"));
    doc.push_str(&format!(
        "\n\n---\n**End of Notes**\n*Generated by SyllabusGPT | {}*\n",
        header
    ));
    doc
}
