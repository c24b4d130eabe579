use serde::{Deserialize, Serialize};

/// Carbohydrate breakdown in grams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carbohydrates {
    pub total: f64,
    pub sugars: f64,
}

/// Fat breakdown in grams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fat {
    pub total: f64,
    pub saturated: f64,
}

/// Macro and micro values shared by ingredients and dish totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionalInfo {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: Carbohydrates,
    pub fat: Fat,
    pub fiber: f64,
    /// Milligrams.
    pub sodium: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    /// Mass with unit as the model wrote it, e.g. "150g".
    pub estimated_weight: String,
    #[serde(flatten)]
    pub nutrition: NutritionalInfo,
    /// 0 means not applicable (meat, oils, ...).
    pub glycemic_index: f64,
    /// Supplied by the model per portion, kept verbatim.
    pub glycemic_load: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    #[serde(flatten)]
    pub nutrition: NutritionalInfo,
    pub total_glycemic_load: f64,
}

/// Structured analysis of one meal photo.
///
/// `totals` is authoritative as returned by the model and is never
/// recomputed from `ingredients`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub dish_name: String,
    /// Detection order.
    pub ingredients: Vec<Ingredient>,
    pub totals: Totals,
    pub expert_comments: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_result;

    #[test]
    fn deserializes_wire_field_names() {
        let json = r#"{
            "dishName": "Porridge",
            "ingredients": [{
                "name": "Oats",
                "estimatedWeight": "60g",
                "calories": 228,
                "protein": 8,
                "carbohydrates": {"total": 40, "sugars": 0.6},
                "fat": {"total": 4, "saturated": 0.7},
                "fiber": 6,
                "sodium": 2,
                "glycemicIndex": 55,
                "glycemicLoad": 22
            }],
            "totals": {
                "calories": 228,
                "protein": 8,
                "carbohydrates": {"total": 40, "sugars": 0.6},
                "fat": {"total": 4, "saturated": 0.7},
                "fiber": 6,
                "sodium": 2,
                "totalGlycemicLoad": 22
            },
            "expertComments": "Good slow-release breakfast."
        }"#;

        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.dish_name, "Porridge");
        assert_eq!(result.ingredients[0].estimated_weight, "60g");
        assert_eq!(result.ingredients[0].nutrition.calories, 228.0);
        assert_eq!(result.ingredients[0].glycemic_load, 22.0);
        assert_eq!(result.totals.total_glycemic_load, 22.0);
        assert_eq!(result.totals.nutrition.carbohydrates.sugars, 0.6);
    }

    #[test]
    fn serializes_flat_camel_case() {
        let json = serde_json::to_value(sample_result()).unwrap();
        assert_eq!(json["dishName"], "Grilled Chicken Salad");
        assert_eq!(json["ingredients"][0]["estimatedWeight"], "120g");
        assert_eq!(json["ingredients"][0]["calories"], 198.0);
        assert!(json["ingredients"][0].get("nutrition").is_none());
        assert_eq!(json["totals"]["totalGlycemicLoad"], 0.0);
        assert_eq!(json["totals"]["fat"]["saturated"], 1.2);
    }

    #[test]
    fn missing_totals_is_rejected() {
        let json = r#"{"dishName":"Soup","ingredients":[],"expertComments":"ok"}"#;
        let err = serde_json::from_str::<AnalysisResult>(json).unwrap_err();
        assert!(err.to_string().contains("totals"));
    }
}
