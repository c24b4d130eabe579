use thiserror::Error;
use tracing::warn;

use super::types::{AnalysisResult, Ingredient, NutritionalInfo};

pub const MAX_GLYCEMIC_INDEX: f64 = 110.0;

/// First rule a result breaks, with the JSON path of the offending field.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {rule}")]
pub struct ValidationError {
    pub field: String,
    pub rule: &'static str,
}

impl ValidationError {
    fn new(field: impl Into<String>, rule: &'static str) -> Self {
        Self {
            field: field.into(),
            rule,
        }
    }
}

pub fn validate_result(result: &AnalysisResult) -> Result<(), ValidationError> {
    if result.dish_name.trim().is_empty() {
        return Err(ValidationError::new("dishName", "must not be empty"));
    }

    for (i, ingredient) in result.ingredients.iter().enumerate() {
        let path = format!("ingredients[{}]", i);
        if ingredient.name.trim().is_empty() {
            return Err(ValidationError::new(
                format!("{}.name", path),
                "must not be empty",
            ));
        }
        if ingredient.estimated_weight.trim().is_empty() {
            return Err(ValidationError::new(
                format!("{}.estimatedWeight", path),
                "must not be empty",
            ));
        }
        validate_nutrition(&path, &ingredient.nutrition)?;

        let gi = ingredient.glycemic_index;
        if !gi.is_finite() || !(0.0..=MAX_GLYCEMIC_INDEX).contains(&gi) {
            return Err(ValidationError::new(
                format!("{}.glycemicIndex", path),
                "must be between 0 and 110",
            ));
        }
        non_negative(&format!("{}.glycemicLoad", path), ingredient.glycemic_load)?;
    }

    validate_nutrition("totals", &result.totals.nutrition)?;
    non_negative("totals.totalGlycemicLoad", result.totals.total_glycemic_load)?;

    Ok(())
}

fn validate_nutrition(path: &str, n: &NutritionalInfo) -> Result<(), ValidationError> {
    non_negative(&format!("{}.calories", path), n.calories)?;
    non_negative(&format!("{}.protein", path), n.protein)?;
    non_negative(&format!("{}.carbohydrates.total", path), n.carbohydrates.total)?;
    non_negative(&format!("{}.carbohydrates.sugars", path), n.carbohydrates.sugars)?;
    non_negative(&format!("{}.fat.total", path), n.fat.total)?;
    non_negative(&format!("{}.fat.saturated", path), n.fat.saturated)?;
    non_negative(&format!("{}.fiber", path), n.fiber)?;
    non_negative(&format!("{}.sodium", path), n.sodium)?;

    if n.carbohydrates.sugars > n.carbohydrates.total {
        return Err(ValidationError::new(
            format!("{}.carbohydrates.sugars", path),
            "must not exceed carbohydrates.total",
        ));
    }
    if n.fat.saturated > n.fat.total {
        return Err(ValidationError::new(
            format!("{}.fat.saturated", path),
            "must not exceed fat.total",
        ));
    }
    Ok(())
}

fn non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(field, "must be a finite number >= 0"));
    }
    Ok(())
}

/// Relative slack allowed between totals and the ingredient sum.
const DRIFT_RATIO: f64 = 0.15;
/// Absolute slack so that tiny meals don't trip the ratio.
const DRIFT_FLOOR: f64 = 1.0;

/// Totals fields that disagree with the per-ingredient sums.
///
/// Only ever used for logging: the model's totals stay authoritative.
pub fn totals_drift(result: &AnalysisResult) -> Vec<&'static str> {
    if result.ingredients.is_empty() {
        return Vec::new();
    }

    let items = &result.ingredients;
    let totals = &result.totals;
    let checks = [
        ("calories", totals.nutrition.calories, sum_by(items, |i| i.nutrition.calories)),
        ("protein", totals.nutrition.protein, sum_by(items, |i| i.nutrition.protein)),
        (
            "carbohydrates.total",
            totals.nutrition.carbohydrates.total,
            sum_by(items, |i| i.nutrition.carbohydrates.total),
        ),
        ("fat.total", totals.nutrition.fat.total, sum_by(items, |i| i.nutrition.fat.total)),
        ("totalGlycemicLoad", totals.total_glycemic_load, sum_by(items, |i| i.glycemic_load)),
    ];

    checks
        .into_iter()
        .filter(|(_, reported, summed)| {
            (reported - summed).abs() > summed.abs() * DRIFT_RATIO + DRIFT_FLOOR
        })
        .map(|(field, _, _)| field)
        .collect()
}

fn sum_by(ingredients: &[Ingredient], f: impl Fn(&Ingredient) -> f64) -> f64 {
    ingredients.iter().map(f).sum()
}

pub fn warn_on_totals_drift(result: &AnalysisResult) {
    let drift = totals_drift(result);
    if !drift.is_empty() {
        warn!(
            dish = %result.dish_name,
            fields = ?drift,
            "model totals differ from ingredient sums; keeping model totals"
        );
    }
}
