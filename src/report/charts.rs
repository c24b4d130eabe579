use serde::Serialize;

use crate::analysis::Totals;

pub const PROTEIN_KCAL_PER_G: f64 = 4.0;
pub const CARBS_KCAL_PER_G: f64 = 4.0;
pub const FAT_KCAL_PER_G: f64 = 9.0;

const GL_LOW_MAX: f64 = 10.0;
const GL_MEDIUM_MAX: f64 = 19.0;
const GL_AXIS_FLOOR: f64 = 30.0;
const GL_AXIS_HEADROOM: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Macro {
    Protein,
    Carbohydrates,
    Fat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalorieSlice {
    pub name: Macro,
    pub kcal: f64,
    /// 0..=100, share of the summed macro calories.
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GlycemicLoadCategory {
    Low,
    Medium,
    High,
}

impl GlycemicLoadCategory {
    pub fn of(load: f64) -> Self {
        if load <= GL_LOW_MAX {
            Self::Low
        } else if load <= GL_MEDIUM_MAX {
            Self::Medium
        } else {
            Self::High
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlycemicLoadBar {
    pub value: f64,
    pub category: GlycemicLoadCategory,
    pub axis_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
    pub calorie_distribution: Vec<CalorieSlice>,
    pub glycemic_load: GlycemicLoadBar,
}

/// Calories per macro, zero slices dropped.
pub fn calorie_distribution(totals: &Totals) -> Vec<CalorieSlice> {
    let n = &totals.nutrition;
    let raw = [
        (Macro::Protein, n.protein * PROTEIN_KCAL_PER_G),
        (Macro::Carbohydrates, n.carbohydrates.total * CARBS_KCAL_PER_G),
        (Macro::Fat, n.fat.total * FAT_KCAL_PER_G),
    ];
    let sum: f64 = raw.iter().map(|(_, kcal)| kcal).sum();

    raw.into_iter()
        .filter(|(_, kcal)| *kcal > 0.0)
        .map(|(name, kcal)| CalorieSlice {
            name,
            kcal,
            percent: kcal / sum * 100.0,
        })
        .collect()
}

pub fn glycemic_load_bar(load: f64) -> GlycemicLoadBar {
    GlycemicLoadBar {
        value: load,
        category: GlycemicLoadCategory::of(load),
        axis_max: GL_AXIS_FLOOR.max(load + GL_AXIS_HEADROOM),
    }
}

pub fn charts(totals: &Totals) -> Charts {
    Charts {
        calorie_distribution: calorie_distribution(totals),
        glycemic_load: glycemic_load_bar(totals.total_glycemic_load),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_result;

    #[test]
    fn distribution_drops_zero_slices() {
        // 36 g protein, 0 carbs, 4.3 g fat
        let slices = calorie_distribution(&sample_result().totals);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].name, Macro::Protein);
        assert_eq!(slices[0].kcal, 144.0);
        assert_eq!(slices[1].name, Macro::Fat);
        assert!((slices[1].kcal - 38.7).abs() < 1e-9);

        let total: f64 = slices.iter().map(|s| s.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn distribution_of_nothing_is_empty() {
        let mut totals = sample_result().totals;
        totals.nutrition.protein = 0.0;
        totals.nutrition.fat.total = 0.0;
        totals.nutrition.fat.saturated = 0.0;
        assert!(calorie_distribution(&totals).is_empty());
    }

    #[test]
    fn glycemic_load_thresholds() {
        assert_eq!(GlycemicLoadCategory::of(0.0), GlycemicLoadCategory::Low);
        assert_eq!(GlycemicLoadCategory::of(10.0), GlycemicLoadCategory::Low);
        assert_eq!(GlycemicLoadCategory::of(10.5), GlycemicLoadCategory::Medium);
        assert_eq!(GlycemicLoadCategory::of(19.0), GlycemicLoadCategory::Medium);
        assert_eq!(GlycemicLoadCategory::of(19.1), GlycemicLoadCategory::High);
    }

    #[test]
    fn axis_has_floor_and_headroom() {
        assert_eq!(glycemic_load_bar(12.0).axis_max, 30.0);
        assert_eq!(glycemic_load_bar(25.0).axis_max, 30.0);
        assert_eq!(glycemic_load_bar(40.0).axis_max, 45.0);
    }
}
