//! Maps a decoded JSON object of arbitrary shape onto [`ParsedRecipe`].
//!
//! Field names vary between models ("title" vs "name", "steps" vs
//! "instructions"), so each canonical field is looked up through a list of
//! synonyms. Missing or wrongly typed fields are defaulted, never rejected.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use super::ingredient_tokenizer::tokenize_ingredient;
use super::json_ext::{text_field, text_list_field, JsonValueExt};
use super::{ParsedIngredient, ParsedRecipe};

pub const UNTITLED_RECIPE: &str = "Untitled Recipe";

const NAME_KEYS: &[&str] = &["name", "title"];
const PREP_TIME_KEYS: &[&str] = &["prep_time", "prepTime"];
const COOK_TIME_KEYS: &[&str] = &["cook_time", "cookTime"];
const INSTRUCTION_KEYS: &[&str] = &["instructions", "steps"];
const TIP_KEYS: &[&str] = &["tips", "notes"];
const TAG_KEYS: &[&str] = &["tags", "categories"];

const AMOUNT_KEYS: &[&str] = &["amount", "quantity"];
const ITEM_KEYS: &[&str] = &["item", "name", "ingredient"];

pub fn normalize_recipe(obj: &Map<String, Value>) -> ParsedRecipe {
    let mut name = text_field(obj, NAME_KEYS);
    if name.trim().is_empty() {
        name = UNTITLED_RECIPE.to_string();
    }

    ParsedRecipe {
        name,
        description: text_field(obj, &["description"]),
        prep_time: text_field(obj, PREP_TIME_KEYS),
        cook_time: text_field(obj, COOK_TIME_KEYS),
        servings: text_field(obj, &["servings"]),
        difficulty: text_field(obj, &["difficulty"]),
        ingredients: normalize_ingredients(obj.get("ingredients")),
        instructions: text_list_field(obj, INSTRUCTION_KEYS),
        tips: text_list_field(obj, TIP_KEYS),
        tags: text_list_field(obj, TAG_KEYS),
        nutrition: normalize_nutrition(obj.get("nutrition")),
    }
}

fn normalize_ingredients(value: Option<&Value>) -> Vec<ParsedIngredient> {
    let Some(value) = value else {
        return Vec::new();
    };

    value
        .as_list()
        .iter()
        .filter_map(|entry| match entry {
            Value::Object(fields) => Some(ParsedIngredient::new(
                text_field(fields, AMOUNT_KEYS),
                text_field(fields, ITEM_KEYS),
            )),
            Value::String(line) => Some(tokenize_ingredient(line)),
            other => {
                debug!(entry = %other, "skipping ingredient entry that is neither text nor an object");
                None
            }
        })
        .collect()
}

fn normalize_nutrition(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(JsonValueExt::as_map)
        .map(|fields| {
            fields
                .iter()
                .map(|(key, value)| (key.clone(), value.as_item_text()))
                .collect()
        })
        .unwrap_or_default()
}
