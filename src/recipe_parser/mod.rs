//! Turns a raw model completion into a [`ParsedRecipe`].
//!
//! The completion is untrusted text: it may be pure JSON, JSON wrapped in
//! prose or markdown fences, JSON with trailing commas or comments, or no
//! JSON at all. [`parse_response`] makes a single attempt at the JSON path
//! and otherwise falls back to plain-text segmentation, so it always returns
//! a complete record.

pub mod ingredient_tokenizer;
pub mod json_ext;
pub mod normalizer;
pub mod sanitizer;
pub mod segmenter;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use ingredient_tokenizer::tokenize_ingredient;
pub use normalizer::normalize_recipe;
pub use sanitizer::sanitize_json;
pub use segmenter::segment_plain_text;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ParsedIngredient {
    pub amount: String,
    pub item: String,
}

impl ParsedIngredient {
    pub fn new(amount: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            item: item.into(),
        }
    }
}

/// Canonical recipe record. Every field is always present; unknown values
/// are empty rather than absent.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecipe {
    pub name: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    pub servings: String,
    pub difficulty: String,
    pub ingredients: Vec<ParsedIngredient>,
    pub instructions: Vec<String>,
    pub tips: Vec<String>,
    pub tags: Vec<String>,
    pub nutrition: BTreeMap<String, String>,
}

/// Why the JSON path did not produce a recipe.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no brace-delimited span in response")]
    NoJsonSpan,
    #[error("candidate span is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("decoded JSON is not an object")]
    NotAnObject,
}

/// Leftmost `{` through rightmost `}`. This is not balanced matching: a stray
/// closing brace in trailing prose widens the span.
pub fn find_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// The JSON path on its own: locate, sanitize, decode, normalize.
pub fn extract_json_recipe(text: &str) -> Result<ParsedRecipe, ExtractError> {
    let span = find_json_span(text).ok_or(ExtractError::NoJsonSpan)?;
    let cleaned = sanitize_json(span);
    let value: serde_json::Value = serde_json::from_str(&cleaned)?;
    let obj = value.as_object().ok_or(ExtractError::NotAnObject)?;
    Ok(normalize_recipe(obj))
}

/// Parses a completion into a recipe. Never fails.
pub fn parse_response(text: &str) -> ParsedRecipe {
    match extract_json_recipe(text) {
        Ok(recipe) => {
            debug!(name = %recipe.name, "parsed recipe from JSON");
            recipe
        }
        Err(reason) => {
            debug!(%reason, "falling back to plain-text segmentation");
            segment_plain_text(text)
        }
    }
}

/// Reads a saved completion from disk and parses it.
pub async fn parse_response_file(path: &Path) -> Result<ParsedRecipe> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read response file '{}'", path.display()))?;
    Ok(parse_response(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_json_span_greedy() {
        assert_eq!(find_json_span(r#"Sure! {"a": 1} enjoy"#), Some(r#"{"a": 1}"#));
        assert_eq!(find_json_span(r#"{"a": 1} and {"b": 2}"#), Some(r#"{"a": 1} and {"b": 2}"#));
    }

    #[test]
    fn test_find_json_span_missing() {
        assert_eq!(find_json_span("no braces here"), None);
        assert_eq!(find_json_span("only { opening"), None);
        assert_eq!(find_json_span("} reversed {"), None);
    }

    #[test]
    fn test_extract_reports_reason() {
        assert!(matches!(extract_json_recipe("plain"), Err(ExtractError::NoJsonSpan)));
        assert!(matches!(
            extract_json_recipe("{not json}"),
            Err(ExtractError::Malformed(_))
        ));
    }

    #[test]
    fn test_markdown_fenced_json() {
        let text = "Here you go:\n```json\n{\"name\": \"Omelette\", \"servings\": 1}\n```\nEnjoy!";
        let recipe = parse_response(text);
        assert_eq!(recipe.name, "Omelette");
        assert_eq!(recipe.servings, "1");
    }

    #[test]
    fn test_stray_brace_triggers_fallback() {
        let text = "Try {\"name\": \"Toast\"} or skip it }\nIngredients:\n1 slice bread";
        let recipe = parse_response(text);
        assert_eq!(recipe.name, "Recipe");
        assert_eq!(recipe.ingredients, vec![ParsedIngredient::new("1 slice", "bread")]);
    }

    #[test]
    fn test_serialized_record_field_names() {
        let value = serde_json::to_value(ParsedRecipe::default()).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "name", "description", "prep_time", "cook_time", "servings", "difficulty",
            "ingredients", "instructions", "tips", "tags", "nutrition",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
    }
}
