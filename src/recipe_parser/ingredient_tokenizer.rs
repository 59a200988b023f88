//! Splits a free-text ingredient line into an amount and an item.
//!
//! "2 cups flour" becomes `{amount: "2 cups", item: "flour"}`. Rules are tried
//! in order and the first match wins; a permissive catch-all guarantees every
//! line produces something displayable.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::ParsedIngredient;

struct AmountRule {
    pattern: Regex,
    build: fn(&Captures) -> ParsedIngredient,
}

fn quantity_unit(caps: &Captures) -> ParsedIngredient {
    ParsedIngredient::new(format!("{} {}", &caps[1], &caps[2]), &caps[3])
}

fn count_with_size(caps: &Captures) -> ParsedIngredient {
    ParsedIngredient::new(format!("{} ({})", &caps[1], &caps[2]), &caps[3])
}

static AMOUNT_RULES: LazyLock<Vec<AmountRule>> = LazyLock::new(|| {
    let rule = |pattern: &str, build: fn(&Captures) -> ParsedIngredient| AmountRule {
        pattern: Regex::new(pattern).expect("Invalid ingredient regex"),
        build,
    };
    vec![
        // "2 cups flour", "1.5 tbsp oil"
        rule(r"^(\d+(?:\.\d+)?(?:/\d+)?)\s+(\w+(?:\s+\w+)?)\s+(.+)$", quantity_unit),
        // "1/2 cup sugar"
        rule(r"^(\d+/\d+)\s+(\w+(?:\s+\w+)?)\s+(.+)$", quantity_unit),
        // "2-3 tablespoons oil"
        rule(r"^(\d+-\d+)\s+(\w+(?:\s+\w+)?)\s+(.+)$", quantity_unit),
        // "1 (15 oz) can tomatoes"
        rule(r"^(\d+)\s*\(([^)]+)\)\s+(.+)$", count_with_size),
    ]
});

static LEADING_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+(\S+)(?:\s+(.+))?$").expect("Invalid leading words regex")
});

pub fn tokenize_ingredient(line: &str) -> ParsedIngredient {
    let line = line.trim();

    for rule in AMOUNT_RULES.iter() {
        if let Some(caps) = rule.pattern.captures(line) {
            return (rule.build)(&caps);
        }
    }

    if line.starts_with(|c: char| c.is_ascii_digit()) {
        if let Some(caps) = LEADING_WORDS.captures(line) {
            let amount = format!("{} {}", &caps[1], &caps[2]);
            let item = caps.get(3).map_or(&caps[2], |rest| rest.as_str());
            return ParsedIngredient::new(amount, item);
        }
    }

    ParsedIngredient::new("", line)
}
