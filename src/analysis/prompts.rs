//! Instruction text and structured-output schema sent with every photo.
//!
//! Field names, nesting and `required` sets mirror `analysis::types`
//! exactly; the provider is asked to constrain its output to this schema.

pub const ANALYSIS_PROMPT: &str = "Act as an expert nutritionist. Analyze the provided photo of a meal. \
Identify every visible ingredient and estimate its weight in grams. \
For each ingredient give a detailed nutritional breakdown: calories (kcal), protein (g), \
carbohydrates (g) of which sugars (g), fat (g) of which saturated (g), fiber (g) and sodium (mg). \
For each ingredient also include its glycemic index (GI) and compute the glycemic load (GL) \
for the estimated portion. If GI does not apply to an ingredient (e.g. meat, oil), set it to 0. \
Then compute the nutritional totals for the whole dish, including the total glycemic load \
(the sum of every ingredient's GL). \
Finally, write short expert comments on how healthy and balanced the meal is and how it could be improved. \
Reply ONLY with the JSON object matching the provided schema.";

fn number(description: &str) -> serde_json::Value {
    serde_json::json!({ "type": "NUMBER", "description": description })
}

fn carbohydrates_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "total": number("Total carbohydrates in grams."),
            "sugars": number("Sugars in grams.")
        },
        "required": ["total", "sugars"]
    })
}

fn fat_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "total": number("Total fat in grams."),
            "saturated": number("Saturated fat in grams.")
        },
        "required": ["total", "saturated"]
    })
}

/// Response schema in the provider's OpenAPI-subset dialect.
pub fn analysis_response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "dishName": {
                "type": "STRING",
                "description": "A descriptive name for the dish."
            },
            "ingredients": {
                "type": "ARRAY",
                "description": "Every ingredient identified in the dish.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "Ingredient name." },
                        "estimatedWeight": {
                            "type": "STRING",
                            "description": "Estimated weight in grams (e.g. '150g')."
                        },
                        "calories": number("Calories (kcal) for this ingredient's portion."),
                        "protein": number("Protein in grams."),
                        "carbohydrates": carbohydrates_schema(),
                        "fat": fat_schema(),
                        "fiber": number("Fiber in grams."),
                        "sodium": number("Sodium in milligrams."),
                        "glycemicIndex": number("Glycemic index (GI) of the food. 0 means not applicable."),
                        "glycemicLoad": number("Glycemic load (GL) for the portion.")
                    },
                    "required": [
                        "name", "estimatedWeight", "calories", "protein", "carbohydrates",
                        "fat", "fiber", "sodium", "glycemicIndex", "glycemicLoad"
                    ]
                }
            },
            "totals": {
                "type": "OBJECT",
                "description": "Sum of every nutritional value for the whole dish.",
                "properties": {
                    "calories": { "type": "NUMBER" },
                    "protein": { "type": "NUMBER" },
                    "carbohydrates": carbohydrates_schema(),
                    "fat": fat_schema(),
                    "fiber": { "type": "NUMBER" },
                    "sodium": { "type": "NUMBER" },
                    "totalGlycemicLoad": number("Total glycemic load for the whole meal.")
                },
                "required": [
                    "calories", "protein", "carbohydrates", "fat", "fiber", "sodium",
                    "totalGlycemicLoad"
                ]
            },
            "expertComments": {
                "type": "STRING",
                "description": "Short, insightful comments from an expert nutritionist on the healthiness, balance and possible improvements of the meal."
            }
        },
        "required": ["dishName", "ingredients", "totals", "expertComments"]
    })
}
