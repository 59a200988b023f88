//! Plain-text fallback for completions that carry no usable JSON.
//!
//! Lines are routed into the ingredients, instructions or tips section based
//! on keyword headers. Anything before the first header is dropped.

use std::sync::LazyLock;

use regex::Regex;

use super::ingredient_tokenizer::tokenize_ingredient;
use super::ParsedRecipe;

pub const PLAIN_TEXT_TITLE: &str = "Recipe";

const TAG_KEYWORDS: &[&str] = &[
    "healthy",
    "quick",
    "easy",
    "vegetarian",
    "vegan",
    "gluten-free",
    "dairy-free",
    "low-carb",
    "keto",
    "paleo",
    "budget-friendly",
    "family-friendly",
    "meal-prep",
    "one-pot",
    "30-minute",
    "15-minute",
];

static BULLET_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-•*]\s*").expect("Invalid bullet regex"));

// Whitespace after the dot is optional, so "1.Preheat" loses its number and
// "1.5 cups" loses its leading "1.".
static NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("Invalid numbering regex"));

static STEP_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^step\s+\d+:?\s*").expect("Invalid step regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Ingredients,
    Instructions,
    Tips,
}

impl Section {
    /// Classifies a header line. Header lines carry no data themselves.
    fn from_header(line: &str) -> Option<Self> {
        let lower = line.to_lowercase();
        if lower.contains("ingredient") {
            Some(Section::Ingredients)
        } else if ["instruction", "direction", "step"]
            .iter()
            .any(|word| lower.contains(word))
        {
            Some(Section::Instructions)
        } else if lower.contains("tip") || lower.contains("note") {
            Some(Section::Tips)
        } else {
            None
        }
    }
}

fn strip_list_marker(line: &str) -> String {
    let line = BULLET_PREFIX.replace(line, "");
    NUMBER_PREFIX.replace(&line, "").into_owned()
}

pub fn segment_plain_text(raw: &str) -> ParsedRecipe {
    let mut recipe = ParsedRecipe {
        name: PLAIN_TEXT_TITLE.to_string(),
        ..Default::default()
    };
    let mut current: Option<Section> = None;

    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(section) = Section::from_header(line) {
            current = Some(section);
            continue;
        }

        let Some(section) = current else {
            continue;
        };

        let mut cleaned = strip_list_marker(line);
        if section == Section::Instructions {
            cleaned = STEP_PREFIX.replace(&cleaned, "").into_owned();
        }
        if cleaned.is_empty() {
            continue;
        }

        match section {
            Section::Ingredients => recipe.ingredients.push(tokenize_ingredient(&cleaned)),
            Section::Instructions => recipe.instructions.push(cleaned),
            Section::Tips => recipe.tips.push(cleaned),
        }
    }

    recipe.tags = keyword_tags(raw);
    recipe
}

/// One tag per vocabulary entry found anywhere in the text.
fn keyword_tags(raw: &str) -> Vec<String> {
    let lower = raw.to_lowercase();
    TAG_KEYWORDS
        .iter()
        .filter(|keyword| lower.contains(*keyword))
        .map(|keyword| title_case(keyword).replace('-', " "))
        .collect()
}

/// Uppercases every letter that follows a non-letter, lowercases the rest.
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev_is_letter = false;
    for c in word.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe_parser::ParsedIngredient;

    #[test]
    fn test_sections_and_headers() {
        let recipe = segment_plain_text(
            "Ingredients:\n2 cups flour\n1 tsp salt\nInstructions:\nMix well\n\nTips:\n- Rest the dough",
        );
        assert_eq!(
            recipe.ingredients,
            vec![
                ParsedIngredient::new("2 cups", "flour"),
                ParsedIngredient::new("1 tsp", "salt"),
            ]
        );
        assert_eq!(recipe.instructions, vec!["Mix well"]);
        assert_eq!(recipe.tips, vec!["Rest the dough"]);
        assert_eq!(recipe.name, "Recipe");
        assert!(recipe.description.is_empty());
    }

    #[test]
    fn test_lines_before_header_dropped() {
        let recipe = segment_plain_text("Here is a lovely soup.\nIngredients\n- 1 onion");
        assert_eq!(recipe.ingredients, vec![ParsedIngredient::new("1 onion", "onion")]);
        assert!(recipe.instructions.is_empty());
    }

    #[test]
    fn test_list_markers_stripped() {
        let recipe = segment_plain_text(
            "Directions\n1. Preheat the oven\n* Bake for 20 minutes\n• Cool",
        );
        assert_eq!(
            recipe.instructions,
            vec!["Preheat the oven", "Bake for 20 minutes", "Cool"]
        );
    }

    #[test]
    fn test_decimal_amount_loses_leading_number() {
        let recipe = segment_plain_text("Ingredients\n1.5 cups milk");
        assert_eq!(recipe.ingredients, vec![ParsedIngredient::new("5 cups", "milk")]);
    }

    #[test]
    fn test_numbering_without_space_stripped() {
        let recipe = segment_plain_text("Instructions:\n1.Preheat the oven\n2.Bake");
        assert_eq!(recipe.instructions, vec!["Preheat the oven", "Bake"]);
    }

    #[test]
    fn test_step_line_is_a_header() {
        let recipe = segment_plain_text("Method\nStep 1: Boil water\nAdd pasta");
        assert_eq!(recipe.instructions, vec!["Add pasta"]);
    }

    #[test]
    fn test_note_switches_to_tips() {
        let recipe = segment_plain_text("Ingredients\n1 lemon\nNotes\nUse fresh lemons");
        assert_eq!(recipe.tips, vec!["Use fresh lemons"]);
        assert_eq!(recipe.ingredients.len(), 1);
    }

    #[test]
    fn test_keyword_tags() {
        let recipe = segment_plain_text("A quick, healthy and gluten-free 30-minute vegan dinner");
        assert_eq!(
            recipe.tags,
            vec!["Healthy", "Quick", "Vegan", "Gluten Free", "30 Minute"]
        );
    }

    #[test]
    fn test_keyword_tags_are_case_insensitive() {
        let recipe = segment_plain_text("EASY Keto bites");
        assert_eq!(recipe.tags, vec!["Easy", "Keto"]);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("budget-friendly"), "Budget-Friendly");
        assert_eq!(title_case("15-minute"), "15-Minute");
    }

    #[test]
    fn test_empty_input() {
        let recipe = segment_plain_text("");
        assert_eq!(recipe.name, "Recipe");
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.tags.is_empty());
    }
}
