use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::analysis::Ingredient;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRow {
    #[serde(flatten)]
    pub ingredient: Ingredient,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_grams: Option<f64>,
}

/// Parse a free-text weight such as `"120g"`, `"~1,2 kg"` or `"500 mg"`.
pub fn weight_in_grams(estimated: &str) -> Option<f64> {
    lazy_static! {
        static ref WEIGHT_RE: Regex = Regex::new(
            r"(?i)(\d+(?:[.,]\d+)?)\s*(kilograms?|kg|milligrams?|mg|grams?|gr|g)\b"
        )
        .unwrap();
    }
    let caps = WEIGHT_RE.captures(estimated)?;
    let amount: f64 = caps[1].replace(',', ".").parse().ok()?;
    let unit = caps[2].to_ascii_lowercase();
    let factor = if unit.starts_with('k') {
        1000.0
    } else if unit.starts_with('m') {
        0.001
    } else {
        1.0
    };
    Some(amount * factor)
}

/// Case-insensitive substring match on the name, whitespace included;
/// order is preserved and an empty filter keeps every row.
pub fn filter_ingredients(ingredients: &[Ingredient], query: &str) -> Vec<IngredientRow> {
    let needle = query.to_lowercase();
    ingredients
        .iter()
        .filter(|i| needle.is_empty() || i.name.to_lowercase().contains(&needle))
        .map(|i| IngredientRow {
            ingredient: i.clone(),
            weight_grams: weight_in_grams(&i.estimated_weight),
        })
        .collect()
}
