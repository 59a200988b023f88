//! Textual repair of near-valid JSON before decoding.
//!
//! Every pass is a global replace over the whole candidate and is not aware
//! of string literals. A value that itself contains `//`, `/* */`, or a comma
//! right before a literal `}` or `]` can be altered.

use std::sync::LazyLock;

use regex::Regex;

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("Invalid trailing comma regex"));

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//.*?\n").expect("Invalid line comment regex"));

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("Invalid block comment regex"));

/// Removes trailing commas, then `//` line comments, then `/* */` block
/// comments.
pub fn sanitize_json(candidate: &str) -> String {
    let cleaned = TRAILING_COMMA.replace_all(candidate, "$1");
    let cleaned = LINE_COMMENT.replace_all(&cleaned, "\n");
    BLOCK_COMMENT.replace_all(&cleaned, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_comma_before_brace() {
        assert_eq!(sanitize_json(r#"{"a": 1,}"#), r#"{"a": 1}"#);
    }

    #[test]
    fn test_trailing_comma_across_newlines() {
        let input = "{\"tags\": [\"a\", \"b\",\n  ],\n}";
        assert_eq!(sanitize_json(input), "{\"tags\": [\"a\", \"b\"]}");
    }

    #[test]
    fn test_line_comment_removed_newline_kept() {
        let input = "{\"a\": 1 // the answer\n}";
        assert_eq!(sanitize_json(input), "{\"a\": 1 \n}");
    }

    #[test]
    fn test_block_comment_spanning_lines() {
        let input = "{/* first\nsecond */\"a\": 1}";
        assert_eq!(sanitize_json(input), "{\"a\": 1}");
    }

    #[test]
    fn test_valid_json_unchanged() {
        let input = r#"{"name": "Pancakes", "tags": ["quick", "easy"]}"#;
        assert_eq!(sanitize_json(input), input);
    }

    #[test]
    fn test_comment_markers_inside_strings_are_not_protected() {
        let input = "{\"url\": \"https://example.com\"\n}";
        assert_eq!(sanitize_json(input), "{\"url\": \"https:\n}");
    }
}
