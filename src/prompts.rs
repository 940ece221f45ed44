//! Prompt Templates
//!
//! System/user prompt pairs for every generation stage. Builders are pure
//! string assembly so they can be tested without a model.

use std::collections::BTreeSet;

/// Subject used in the HyDE seed when none is given
pub const DEFAULT_HYDE_SUBJECT: &str = "Data Science";
/// Subject shown in the unit notes prompt when none is given
pub const DEFAULT_PROMPT_SUBJECT: &str = "General";
/// Stands in for reference context when retrieval came back empty
pub const NO_CONTEXT_NOTICE: &str =
    "No relevant context was found in the knowledge base. Write the notes from general knowledge.";
/// Single context chunk used by single-topic notes when retrieval is empty
pub const RAG_NO_CONTEXT_CHUNK: &str = "No context found in KB, answer from general knowledge.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

impl PromptPair {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

// ============ HYDE ============

const HYDE_SYSTEM: &str = "You are an academic assistant. \
Given a topic, generate a short hypothetical explanation as if from a textbook. \
Keep it factual, structured, and instructional.";

/// Seed text for the HyDE passage of one unit
pub fn hyde_seed(unit_title: &str, subject: Option<&str>, unit_body: &str) -> String {
    format!(
        "Explain the concepts of {} in {}: {}",
        unit_title,
        subject.unwrap_or(DEFAULT_HYDE_SUBJECT),
        unit_body
    )
}

pub fn hyde_prompt(topic: &str) -> PromptPair {
    let user = format!(
        "Generate a hypothetical academic explanation for the topic:\n\n\
TOPIC:\n{}\n\n\
Write 1-2 paragraphs that resemble real study material.\n\
Do NOT mention that this is hypothetical.\n",
        topic
    );
    PromptPair::new(HYDE_SYSTEM, user)
}

// ============ TOPIC PARSING ============

const TOPICS_SYSTEM: &str = "You extract topics from syllabus text. \
Return ONLY a JSON list of clean topic names. No extra text.";

pub fn topics_prompt(syllabus_text: &str) -> PromptPair {
    let user = format!(
        "Extract the list of topics from this syllabus:\n\n{}\n\n\
Output MUST be a valid JSON list, for example:\n[\"Topic 1\", \"Topic 2\", \"Topic 3\"]\n",
        syllabus_text
    );
    PromptPair::new(TOPICS_SYSTEM, user)
}

// ============ UNIT NOTES ============

const UNIT_NOTES_SYSTEM: &str = "You are an expert academic author and university professor.
You write comprehensive study notes that read like a premium textbook.

**GOAL:** Turn the given syllabus unit into detailed, structured, easily scannable notes.

**FORMATTING RULES:**
1. **Hierarchy:** Markdown `#` for the unit, `##` for main topics, `###` for sub-sections.
2. **Visuals:** Use ASCII diagrams or Mermaid syntax for processes (e.g. `Input -> Processing -> Output`).
3. **Math:** Use LaTeX for every formula (e.g. `$y = mx + c$`).
4. **Tables:** Use Markdown tables to compare related concepts.
5. **No fluff:** Skip filler transitions. Write directly and professionally.

**TONE:** Educational, insightful and clear, like good university lecture notes.";

/// Everything the unit notes prompt is built from
#[derive(Debug, Clone)]
pub struct UnitPromptInput<'a> {
    pub subject: Option<&'a str>,
    pub unit_title: &'a str,
    pub unit_body: &'a str,
    pub reference_context: &'a str,
    pub past_exam_context: &'a str,
    pub subtopics: &'a BTreeSet<String>,
}

/// Wrap raw past-exam passages under their prompt header
pub fn past_exam_section(raw: &str) -> String {
    format!("\nRELEVANT PAST EXAM QUESTIONS:\n{}\n", raw)
}

fn subtopic_list(subtopics: &BTreeSet<String>) -> String {
    subtopics
        .iter()
        .map(|s| format!("- {}", s))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn unit_notes_prompt(input: &UnitPromptInput<'_>) -> PromptPair {
    let reference = if input.reference_context.trim().is_empty() {
        NO_CONTEXT_NOTICE
    } else {
        input.reference_context
    };
    let title = input.unit_title;

    let user = format!(
        r#"
**CONTEXT:**
Subject: {subject}
Unit: {title}
Syllabus Topics:
{body}

**RETRIEVED KNOWLEDGE BASE (Source Material):**
{reference}

{past_exam}

---

**TASK:** Write comprehensive study notes for **{title}**.

**REQUIRED STRUCTURE (follow exactly):**

# {title} - [Topic Name]

> **Unit Overview:** A 3-4 sentence summary of what this unit covers and why it matters in practice.

---

## [Topic 1 Name]

**1. Definition**
[A clear, formal definition in a blockquote]

**2. Conceptual Explanation**
[2-3 paragraphs explaining the concept in depth, including why it is needed, not only what it is.]

**3. Key Characteristics/Features**
[Bulleted list of properties]

**4. Process/Workflow (IF APPLICABLE)**
[For a process or algorithm, list the steps AND draw them]
*Example format:*
[Step 1] --> [Step 2] --> [Decision] --> [Outcome]

**5. Real-World Case Study**
[A specific scenario with a detailed explanation of how the concept applies.]

**6. Applications**
[Industries or areas where this is used]

---
*(Repeat the structure above for every major topic in the syllabus:
{subtopics})*
---

## Key Differences & Comparisons
[1 or 2 comparison tables for easily confused topics in this unit]

| Feature | Concept A | Concept B |
| :--- | :--- | :--- |
| ... | ... | ... |

---

## Chapter Summary & Revision
* **Key Takeaway 1:** ...
* **Key Takeaway 2:** ...
* **Important Formulae:** [Every equation used]

## Practice Questions (Based on Exam Patterns)
1. [Conceptual Question]
2. [Application Question]
3. [Problem Solving/Scenario Question]
"#,
        subject = input.subject.unwrap_or(DEFAULT_PROMPT_SUBJECT),
        title = title,
        body = input.unit_body,
        reference = reference,
        past_exam = input.past_exam_context,
        subtopics = subtopic_list(input.subtopics),
    );

    PromptPair::new(UNIT_NOTES_SYSTEM, user)
}

// ============ TOPIC-GUIDED NOTES ============

/// Title used when topic parsing found nothing
pub const DEFAULT_NOTES_TITLE: &str = "Generated Notes";

const FINAL_NOTES_SYSTEM: &str = "You are a university-level notes generator. \
You write extremely clean, well-structured Markdown notes.";

pub fn final_notes_prompt(topics: &[String], context: &str) -> PromptPair {
    let context = if context.trim().is_empty() {
        NO_CONTEXT_NOTICE
    } else {
        context
    };
    let title = topics.first().map(String::as_str).unwrap_or(DEFAULT_NOTES_TITLE);
    let covered = topics
        .iter()
        .map(|t| format!("- {}", t))
        .collect::<Vec<_>>()
        .join("\n");

    let user = format!(
        r#"Follow this format strictly:

# {title}

## Topics Covered
{covered}

---

## Detailed Notes
Use the context below to write accurate explanations.

### Context:
{context}

---

Now write the notes:

- Use proper headings
- Use bullet points
- Keep explanations clear and concise
- Add small examples where helpful
- Do NOT include the context directly
- Make it read like a handwritten guide for exam preparation
"#,
        title = title,
        covered = covered,
        context = context,
    );
    PromptPair::new(FINAL_NOTES_SYSTEM, user)
}

// ============ SINGLE-TOPIC NOTES ============

const RAG_NOTES_SYSTEM: &str = "You are an expert engineering mentor. \
You generate exam-focused, clear and well-structured notes for university students.";

pub fn rag_notes_prompt(topic: &str, context_chunks: &[String]) -> PromptPair {
    let user = format!(
        "Generate detailed, exam-ready study notes for the topic:\n\n\
TOPIC:\n{}\n\n\
USING ONLY the following context (books, notes, past exam questions):\n\n\
CONTEXT:\n{}\n\n\
Requirements:\n\
- Write in simple, clear English.\n\
- Structure the notes with headings and bullet points.\n\
- Include:\n    \
1. Short introduction\n    \
2. Explanation of concepts\n    \
3. Important formulas / definitions (if any)\n    \
4. Examples or explanations for common questions\n    \
5. Key points / summary\n\
- Focus on what matters for university exams.\n\
- Do NOT mention that you used context.\n",
        topic,
        context_chunks.join("\n\n")
    );
    PromptPair::new(RAG_NOTES_SYSTEM, user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subtopics(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_hyde_seed_defaults_subject() {
        assert_eq!(
            hyde_seed("UNIT-1", None, "Regression"),
            "Explain the concepts of UNIT-1 in Data Science: Regression"
        );
        assert_eq!(
            hyde_seed("UNIT-2", Some("DBMS"), "Joins"),
            "Explain the concepts of UNIT-2 in DBMS: Joins"
        );
    }

    #[test]
    fn test_hyde_prompt_embeds_topic() {
        let prompt = hyde_prompt("Normal forms");
        assert!(prompt.system.contains("academic assistant"));
        assert!(prompt.user.contains("TOPIC:\nNormal forms"));
        assert!(prompt.user.contains("Do NOT mention that this is hypothetical"));
    }

    #[test]
    fn test_topics_prompt_asks_for_json() {
        let prompt = topics_prompt("UNIT-1: Sorting");
        assert!(prompt.system.contains("JSON list"));
        assert!(prompt.user.contains("UNIT-1: Sorting"));
    }

    #[test]
    fn test_unit_prompt_contains_all_inputs() {
        let topics = subtopics(&["Bagging", "Boosting"]);
        let past = past_exam_section("Q. Compare bagging with boosting.");
        let input = UnitPromptInput {
            subject: Some("Machine Learning"),
            unit_title: "UNIT-3",
            unit_body: "Bagging, Boosting",
            reference_context: "Ensembles combine weak learners.",
            past_exam_context: &past,
            subtopics: &topics,
        };
        let prompt = unit_notes_prompt(&input);

        assert!(prompt.system.contains("university professor"));
        assert!(prompt.user.contains("Subject: Machine Learning"));
        assert!(prompt.user.contains("Unit: UNIT-3"));
        assert!(prompt.user.contains("Ensembles combine weak learners."));
        assert!(prompt.user.contains("RELEVANT PAST EXAM QUESTIONS:\nQ. Compare bagging with boosting."));
        assert!(prompt.user.contains("- Bagging\n- Boosting"));
        assert!(prompt.user.contains("# UNIT-3 - [Topic Name]"));
        assert!(prompt.user.contains("## Practice Questions"));
        assert!(!prompt.user.contains(NO_CONTEXT_NOTICE));
    }

    #[test]
    fn test_unit_prompt_empty_context_fallback() {
        let topics = BTreeSet::new();
        let input = UnitPromptInput {
            subject: None,
            unit_title: "UNIT-I",
            unit_body: "Intro",
            reference_context: "  \n",
            past_exam_context: "",
            subtopics: &topics,
        };
        let prompt = unit_notes_prompt(&input);
        assert!(prompt.user.contains("Subject: General"));
        assert!(prompt.user.contains(NO_CONTEXT_NOTICE));
    }

    #[test]
    fn test_final_notes_prompt_lists_topics() {
        let topics = vec!["Sorting".to_string(), "Hashing".to_string()];
        let prompt = final_notes_prompt(&topics, "retrieved text");
        assert!(prompt.system.contains("notes generator"));
        assert!(prompt.user.contains("# Sorting\n"));
        assert!(prompt.user.contains("- Sorting\n- Hashing"));
        assert!(prompt.user.contains("### Context:\nretrieved text"));

        let empty = final_notes_prompt(&[], "");
        assert!(empty.user.contains("# Generated Notes"));
    }

    #[test]
    fn test_final_notes_prompt_empty_context_fallback() {
        let topics = vec!["Paging".to_string()];
        let prompt = final_notes_prompt(&topics, " \n ");
        assert!(prompt.user.contains(&format!("### Context:\n{}\n", NO_CONTEXT_NOTICE)));
        assert!(!prompt.user.contains("### Context:\n\n"));
    }

    #[test]
    fn test_rag_prompt_joins_chunks() {
        let chunks = vec!["first chunk".to_string(), "second chunk".to_string()];
        let prompt = rag_notes_prompt("Deadlocks", &chunks);
        assert!(prompt.system.contains("engineering mentor"));
        assert!(prompt.user.contains("TOPIC:\nDeadlocks"));
        assert!(prompt.user.contains("first chunk\n\nsecond chunk"));
    }
}
