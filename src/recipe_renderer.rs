//! Plain-text layout of a [`ParsedRecipe`] for the terminal.
//!
//! Truncation happens here and only here; the parser never drops items.

use std::fmt;

use crate::recipe_parser::ParsedRecipe;

/// Maximum number of items shown per section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayLimits {
    pub ingredients: usize,
    pub instructions: usize,
    pub tips: usize,
    pub tags: usize,
}

impl Default for DisplayLimits {
    fn default() -> Self {
        Self {
            ingredients: 20,
            instructions: 20,
            tips: 5,
            tags: 8,
        }
    }
}

/// A recipe paired with the limits it is shown under.
pub struct RecipeView<'a> {
    pub recipe: &'a ParsedRecipe,
    pub limits: &'a DisplayLimits,
}

fn write_hidden(f: &mut fmt::Formatter<'_>, total: usize, limit: usize) -> fmt::Result {
    if total > limit {
        writeln!(f, "  … and {} more", total - limit)?;
    }
    Ok(())
}

fn write_heading(f: &mut fmt::Formatter<'_>, heading: &str) -> fmt::Result {
    writeln!(f, "\n{heading}")?;
    writeln!(f, "{}", "-".repeat(heading.chars().count()))
}

impl fmt::Display for RecipeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let RecipeView { recipe, limits } = *self;

        writeln!(f, "{}", recipe.name)?;
        writeln!(f, "{}", "=".repeat(recipe.name.chars().count()))?;
        if !recipe.description.is_empty() {
            writeln!(f, "{}", recipe.description)?;
        }

        let info: Vec<String> = [
            ("Prep", &recipe.prep_time),
            ("Cook", &recipe.cook_time),
            ("Servings", &recipe.servings),
            ("Level", &recipe.difficulty),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| format!("{label}: {value}"))
        .collect();
        if !info.is_empty() {
            writeln!(f, "{}", info.join(" | "))?;
        }

        if !recipe.tags.is_empty() {
            let shown: Vec<String> = recipe
                .tags
                .iter()
                .take(limits.tags)
                .map(|tag| format!("[{tag}]"))
                .collect();
            writeln!(f, "{}", shown.join(" "))?;
            write_hidden(f, recipe.tags.len(), limits.tags)?;
        }

        if !recipe.ingredients.is_empty() {
            write_heading(f, "Ingredients")?;
            for ingredient in recipe.ingredients.iter().take(limits.ingredients) {
                if ingredient.amount.is_empty() {
                    writeln!(f, "  • {}", ingredient.item)?;
                } else {
                    writeln!(f, "  • {} {}", ingredient.amount, ingredient.item)?;
                }
            }
            write_hidden(f, recipe.ingredients.len(), limits.ingredients)?;
        }

        if !recipe.instructions.is_empty() {
            write_heading(f, "Instructions")?;
            for (step, instruction) in recipe.instructions.iter().take(limits.instructions).enumerate() {
                writeln!(f, "  {}. {}", step + 1, instruction)?;
            }
            write_hidden(f, recipe.instructions.len(), limits.instructions)?;
        }

        if !recipe.tips.is_empty() {
            write_heading(f, "Tips & Notes")?;
            for tip in recipe.tips.iter().take(limits.tips) {
                writeln!(f, "  * {tip}")?;
            }
            write_hidden(f, recipe.tips.len(), limits.tips)?;
        }

        if !recipe.nutrition.is_empty() {
            write_heading(f, "Nutrition")?;
            let entries: Vec<String> = recipe
                .nutrition
                .iter()
                .map(|(key, value)| format!("{key}: {value}"))
                .collect();
            for row in entries.chunks(3) {
                writeln!(f, "  {}", row.join("   "))?;
            }
        }

        Ok(())
    }
}

pub fn render_recipe(recipe: &ParsedRecipe, limits: &DisplayLimits) -> String {
    RecipeView { recipe, limits }.to_string()
}
