use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use recipe_chat::recipe_parser::{
    extract_json_recipe, parse_response, parse_response_file, tokenize_ingredient, ExtractError,
    ParsedIngredient, ParsedRecipe,
};
use std::io::Write;

const CANONICAL_JSON: &str = r#"{
  "name": "Lemon Risotto",
  "description": "Creamy rice with lemon",
  "prep_time": "10 minutes",
  "cook_time": "25 minutes",
  "servings": "4",
  "difficulty": "Medium",
  "ingredients": [
    {"amount": "300 g", "item": "arborio rice"},
    {"amount": "1", "item": "lemon"}
  ],
  "instructions": ["Toast the rice", "Add stock slowly", "Finish with lemon"],
  "tips": ["Keep the stock hot"],
  "tags": ["vegetarian", "comfort"],
  "nutrition": {"calories": "420", "protein": "9g"}
}"#;

fn assert_well_formed(recipe: &ParsedRecipe) {
    assert!(!recipe.name.trim().is_empty());
    assert!(serde_json::to_value(recipe).unwrap().is_object());
}

#[test]
fn test_totality_on_edge_inputs() {
    let deep = format!("{}{}", "{".repeat(5000), "}".repeat(5000));
    let inputs = [
        String::new(),
        "   \n\t ".to_string(),
        deep,
        "{".to_string(),
        "}{".to_string(),
        "[1, 2, 3]".to_string(),
        r#"{"name": }"#.to_string(),
        "\u{0}\u{1}\u{7f}".to_string(),
        "Ingredients:\n\n\nInstructions:".to_string(),
    ];
    for input in &inputs {
        let recipe = parse_response(input);
        assert_well_formed(&recipe);
    }
}

#[test]
fn test_totality_on_random_bytes() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..500 {
        let len = rng.gen_range(0..256);
        let bytes: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let text = String::from_utf8_lossy(&bytes);
        assert_well_formed(&parse_response(&text));
    }
}

#[test]
fn test_totality_on_random_recipe_like_text() {
    const PIECES: &[&str] = &[
        "{", "}", "[", "]", ",", ":", "\"name\"", "\"ingredients\"", "Ingredients:\n",
        "Instructions:\n", "Tips\n", "2 cups flour\n", "1. Stir\n", "- salt\n", "null", "//", "/*",
        "*/", "\n", " ",
    ];
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..500 {
        let text: String = (0..rng.gen_range(0..40))
            .map(|_| PIECES[rng.gen_range(0..PIECES.len())])
            .collect();
        assert_well_formed(&parse_response(&text));
    }
}

#[test]
fn test_canonical_json_reproduced() {
    let recipe = parse_response(CANONICAL_JSON);
    assert_eq!(recipe.name, "Lemon Risotto");
    assert_eq!(recipe.description, "Creamy rice with lemon");
    assert_eq!(recipe.prep_time, "10 minutes");
    assert_eq!(recipe.cook_time, "25 minutes");
    assert_eq!(recipe.servings, "4");
    assert_eq!(recipe.difficulty, "Medium");
    assert_eq!(
        recipe.ingredients,
        vec![
            ParsedIngredient::new("300 g", "arborio rice"),
            ParsedIngredient::new("1", "lemon"),
        ]
    );
    assert_eq!(
        recipe.instructions,
        vec!["Toast the rice", "Add stock slowly", "Finish with lemon"]
    );
    assert_eq!(recipe.tips, vec!["Keep the stock hot"]);
    assert_eq!(recipe.tags, vec!["vegetarian", "comfort"]);
    assert_eq!(recipe.nutrition.get("calories").map(String::as_str), Some("420"));
    assert_eq!(recipe.nutrition.get("protein").map(String::as_str), Some("9g"));
}

#[test]
fn test_scalars_coerced_to_text() {
    let recipe = parse_response(
        r#"{"name": "Stew", "servings": 6, "nutrition": {"calories": 512.5, "vegan": false}}"#,
    );
    assert_eq!(recipe.servings, "6");
    assert_eq!(recipe.nutrition["calories"], "512.5");
    assert_eq!(recipe.nutrition["vegan"], "false");
}

#[test]
fn test_synonym_equivalence() {
    let from_synonyms = parse_response(r#"{"title": "X", "steps": ["a", "b"]}"#);
    let from_canonical = parse_response(r#"{"name": "X", "instructions": ["a", "b"]}"#);
    assert_eq!(from_synonyms, from_canonical);
    assert_eq!(from_synonyms.instructions, vec!["a", "b"]);
}

#[test]
fn test_trailing_comma_tolerated() {
    let recipe = extract_json_recipe(r#"{"name":"X","tags":["a","b",]}"#).unwrap();
    assert_eq!(recipe.name, "X");
    assert_eq!(recipe.tags, vec!["a", "b"]);
}

#[test]
fn test_json_inside_prose_and_comments() {
    let text = "Here is your recipe:\n```json\n{\n  \"name\": \"Toast\", // simple\n  /* bread */ \"ingredients\": [\"2 slices bread\",],\n}\n```\nEnjoy!";
    let recipe = parse_response(text);
    assert_eq!(recipe.name, "Toast");
    assert_eq!(recipe.ingredients, vec![ParsedIngredient::new("2 slices", "bread")]);
}

#[test]
fn test_fallback_triggering() {
    let recipe =
        parse_response("Ingredients:\n2 cups flour\n1 tsp salt\nInstructions:\nMix well");
    assert_eq!(
        recipe.ingredients,
        vec![
            ParsedIngredient::new("2 cups", "flour"),
            ParsedIngredient::new("1 tsp", "salt"),
        ]
    );
    assert_eq!(recipe.instructions, vec!["Mix well"]);
    assert_eq!(recipe.name, "Recipe");
}

#[test]
fn test_non_object_json_falls_back() {
    assert!(matches!(
        extract_json_recipe("no json at all"),
        Err(ExtractError::NoJsonSpan)
    ));
    assert!(matches!(
        extract_json_recipe("{not json}"),
        Err(ExtractError::Malformed(_))
    ));
    let recipe = parse_response("{oops}\nIngredients\n3 eggs");
    assert_eq!(recipe.ingredients, vec![ParsedIngredient::new("3 eggs", "eggs")]);
}

#[test]
fn test_tokenizer_edge_case() {
    assert_eq!(
        tokenize_ingredient("1 (15 oz) can tomatoes"),
        ParsedIngredient::new("1 (15 oz)", "can tomatoes")
    );
}

#[test]
fn test_idempotent_renormalization() {
    let samples = [
        parse_response(CANONICAL_JSON),
        parse_response("Ingredients:\n- 1/2 cup sugar\n- pinch of salt\nSteps\n1. Stir\nTips:\nServe warm. Quick and vegan."),
        parse_response(r#"{"title": "", "ingredients": ["2 eggs", {"quantity": "1 cup", "name": "milk"}]}"#),
    ];
    for recipe in samples {
        let encoded = serde_json::to_string(&recipe).unwrap();
        let again = parse_response(&encoded);
        assert_eq!(again, recipe);
    }
}

#[tokio::test]
async fn test_parse_response_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{CANONICAL_JSON}").unwrap();
    let recipe = parse_response_file(file.path()).await.unwrap();
    assert_eq!(recipe.name, "Lemon Risotto");

    let missing = file.path().with_extension("missing");
    let err = parse_response_file(&missing).await.unwrap_err();
    assert!(err.to_string().contains("Failed to read response file"));
}

#[test]
fn test_numbered_steps_without_space() {
    let recipe = parse_response("Instructions:\n1.Preheat the oven\n2.Bake");
    assert_eq!(recipe.instructions, vec!["Preheat the oven", "Bake"]);
}
