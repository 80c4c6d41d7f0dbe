//! Parse LLM output into entities and narrative text

use crate::error::ExtractorError;
use serde_json::Value;
use tracing::warn;
use worklog_domain::{Entities, EntityKind};

/// Entities and optional confidence parsed from one response
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExtraction {
    /// Deduplicated entities
    pub entities: Entities,
    /// Model-reported confidence, clamped to `[0, 1]`
    pub confidence: Option<f32>,
}

/// Parse an extraction response
///
/// The response must be (or contain) a JSON object with `projects`,
/// `participants`, `tasks` and `themes`, each an array. Non-string array
/// elements are skipped. Entity names are deduplicated case- and
/// whitespace-insensitively, keeping the first spelling.
pub fn parse_extraction(response: &str) -> Result<ParsedExtraction, ExtractorError> {
    let json_str = extract_json(response)?;
    let json: Value = serde_json::from_str(json_str)?;

    let obj = json
        .as_object()
        .ok_or_else(|| ExtractorError::InvalidFormat("Expected JSON object".to_string()))?;

    let mut entities = Entities::new();
    for kind in EntityKind::ALL {
        let field = kind.field_name();
        let items = obj
            .get(field)
            .ok_or_else(|| ExtractorError::InvalidFormat(format!("Missing field '{}'", field)))?
            .as_array()
            .ok_or_else(|| ExtractorError::InvalidFormat(format!("Field '{}' is not an array", field)))?;

        let set = entities.get_mut(kind);
        for (idx, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(name) => {
                    set.insert(name);
                }
                None => warn!("Skipping non-string {} entry {}", field, idx),
            }
        }
    }

    let confidence = obj
        .get("confidence")
        .and_then(Value::as_f64)
        .map(|c| c.clamp(0.0, 1.0) as f32);

    Ok(ParsedExtraction {
        entities,
        confidence,
    })
}

/// Clean a narrative response; fails when nothing is left
pub fn parse_narrative(response: &str) -> Result<String, ExtractorError> {
    let trimmed = response.trim();
    let body = strip_code_fence(trimmed).unwrap_or(trimmed).trim();
    if body.is_empty() {
        return Err(ExtractorError::InvalidFormat("Empty narrative".to_string()));
    }
    Ok(body.to_string())
}

/// Extract JSON from response, handling markdown code blocks and chatter
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let trimmed = response.trim();
    let body = strip_code_fence(trimmed).unwrap_or(trimmed);

    if body.starts_with('{') {
        return Ok(body);
    }

    // Prose around the object: take the outermost braces
    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&body[start..=end]),
        _ => Err(ExtractorError::InvalidFormat("No JSON object in response".to_string())),
    }
}

fn strip_code_fence(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("```")?;
    // Skip the language tag line
    let body_start = rest.find('\n')? + 1;
    let body = &rest[body_start..];
    let body = body.trim_end();
    Some(body.strip_suffix("```").unwrap_or(body).trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "projects": ["Atlas", "atlas ", "Billing API"],
        "participants": ["J. Smith", "j. smith"],
        "tasks": ["fix login timeout"],
        "themes": [],
        "confidence": 0.82
    }"#;

    #[test]
    fn test_parse_valid_json() {
        let parsed = parse_extraction(VALID).unwrap();
        assert_eq!(parsed.entities.projects.to_vec(), vec!["Atlas", "Billing API"]);
        assert_eq!(parsed.entities.participants.to_vec(), vec!["J. Smith"]);
        assert_eq!(parsed.entities.tasks.len(), 1);
        assert!(parsed.entities.themes.is_empty());
        assert_eq!(parsed.confidence, Some(0.82));
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let response = format!("```json\n{}\n```", VALID);
        let parsed = parse_extraction(&response).unwrap();
        assert_eq!(parsed.entities.projects.len(), 2);
    }

    #[test]
    fn test_parse_json_with_chatter() {
        let response = format!("Sure! Here is the result:\n{}\nLet me know if you need more.", VALID);
        let parsed = parse_extraction(&response).unwrap();
        assert_eq!(parsed.entities.tasks.to_vec(), vec!["fix login timeout"]);
    }

    #[test]
    fn test_missing_field_is_invalid() {
        let response = r#"{"projects": [], "participants": [], "tasks": []}"#;
        let err = parse_extraction(response).unwrap_err();
        assert_eq!(err, ExtractorError::InvalidFormat("Missing field 'themes'".to_string()));
    }

    #[test]
    fn test_non_array_field_is_invalid() {
        let response = r#"{"projects": "Atlas", "participants": [], "tasks": [], "themes": []}"#;
        assert!(matches!(parse_extraction(response), Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_array_top_level_is_invalid() {
        assert!(parse_extraction("[]").is_err());
    }

    #[test]
    fn test_not_json() {
        assert!(parse_extraction("This is not JSON").is_err());
        assert!(matches!(parse_extraction("{ broken"), Err(_)));
    }

    #[test]
    fn test_non_string_elements_skipped() {
        let response = r#"{"projects": ["Atlas", 3, null], "participants": [], "tasks": [], "themes": []}"#;
        let parsed = parse_extraction(response).unwrap();
        assert_eq!(parsed.entities.projects.to_vec(), vec!["Atlas"]);
    }

    #[test]
    fn test_confidence_clamped_and_optional() {
        let high = r#"{"projects": [], "participants": [], "tasks": [], "themes": [], "confidence": 7}"#;
        assert_eq!(parse_extraction(high).unwrap().confidence, Some(1.0));
        let low = r#"{"projects": [], "participants": [], "tasks": [], "themes": [], "confidence": -1}"#;
        assert_eq!(parse_extraction(low).unwrap().confidence, Some(0.0));
        let none = r#"{"projects": [], "participants": [], "tasks": [], "themes": []}"#;
        assert_eq!(parse_extraction(none).unwrap().confidence, None);
    }

    #[test]
    fn test_parse_narrative() {
        assert_eq!(parse_narrative("  You shipped Atlas.\n").unwrap(), "You shipped Atlas.");
        assert_eq!(parse_narrative("```\nYou shipped Atlas.\n```").unwrap(), "You shipped Atlas.");
        assert!(parse_narrative("   \n").is_err());
    }

    #[test]
    fn test_extract_json_from_markdown_without_language() {
        let response = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(response).unwrap(), "{\"key\": \"value\"}");
    }
}
