//! LLM prompt engineering for entity extraction and narratives

use crate::types::NarrativeRequest;
use chrono::NaiveDate;
use worklog_domain::EntityKind;

/// Builds the per-file entity extraction prompt
pub struct ExtractionPromptBuilder<'a> {
    date: NaiveDate,
    text: &'a str,
}

impl<'a> ExtractionPromptBuilder<'a> {
    /// Create a new prompt builder for one worklog
    pub fn new(date: NaiveDate, text: &'a str) -> Self {
        Self { date, text }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::with_capacity(self.text.len() + 1024);

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str(&format!(
            "Worklog date: {} ({})\n\n",
            self.date.format("%Y-%m-%d"),
            self.date.format("%A")
        ));

        prompt.push_str("Worklog:\n");
        prompt.push_str("---\n");
        prompt.push_str(self.text.trim_end());
        prompt.push_str("\n---\n\n");

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }
}

/// Builds the per-period narrative prompt
pub struct NarrativePromptBuilder<'a> {
    request: &'a NarrativeRequest,
}

impl<'a> NarrativePromptBuilder<'a> {
    /// Create a new prompt builder for one period
    pub fn new(request: &'a NarrativeRequest) -> Self {
        Self { request }
    }

    /// Build the complete narrative prompt
    pub fn build(&self) -> String {
        let req = self.request;
        let mut prompt = String::new();

        prompt.push_str(NARRATIVE_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str(&format!("Period: {} ({})\n", req.period.label(), req.period.range));
        prompt.push_str(&format!("Entries: {}\n", req.entry_count));
        if !req.entry_dates.is_empty() {
            let dates: Vec<String> = req
                .entry_dates
                .iter()
                .map(|d| d.format("%a %Y-%m-%d").to_string())
                .collect();
            prompt.push_str(&format!("Days logged: {}\n", dates.join(", ")));
        }
        prompt.push('\n');

        for kind in EntityKind::ALL {
            let set = req.entities.get(kind);
            prompt.push_str(&format!("{}:\n", kind.label()));
            if set.is_empty() {
                prompt.push_str("- (none)\n");
            }
            for name in set.iter().take(req.max_entities_per_kind) {
                prompt.push_str(&format!("- {}\n", name));
            }
            if set.len() > req.max_entities_per_kind {
                prompt.push_str(&format!(
                    "- ... and {} more\n",
                    set.len() - req.max_entities_per_kind
                ));
            }
            prompt.push('\n');
        }

        prompt.push_str(NARRATIVE_REMINDER);
        prompt
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"Extract structured information from the following personal work log.
Identify four kinds of entities:

- projects: named projects, products, systems or initiatives worked on
- participants: people or teams mentioned (use names as written)
- tasks: concrete pieces of work done or planned, phrased briefly ("fix login timeout")
- themes: recurring topics or areas of focus ("performance", "hiring")

Rules:
- Use short phrases, not sentences
- Do not invent entities that are not supported by the text
- List each entity once
- If a category has nothing, return an empty array for it; never omit a field
- Optionally include "confidence": a number between 0.0 and 1.0 for how clearly the log supports the extraction"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (a single JSON object only, no additional text):
{
  "projects": ["..."],
  "participants": ["..."],
  "tasks": ["..."],
  "themes": ["..."],
  "confidence": 0.0-1.0
}

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;

const NARRATIVE_INSTRUCTIONS: &str = r#"Write a concise narrative summary of a period of work, based on the entities extracted from the author's daily work logs.
Write in the second person ("You focused on ..."), past tense, as one to three short paragraphs."#;

const NARRATIVE_REMINDER: &str = r#"Guidelines:
- Mention the most significant projects and who was involved
- Group related tasks instead of listing them all
- Do not use headings, bullet points or markdown
- Do not invent work that is not listed above

Return only the narrative text."#;
