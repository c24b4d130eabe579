//! Read-only views over an analysis result, one per UI section.

mod charts;
mod ingredients;

use std::str::FromStr;

use serde::Serialize;

use crate::analysis::{AnalysisResult, Totals};

use charts::charts;
use ingredients::filter_ingredients;

pub use charts::Charts;
pub use ingredients::IngredientRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Comments,
    Totals,
    Charts,
    Ingredients,
    Instructions,
    Disclaimer,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Comments,
        Section::Totals,
        Section::Charts,
        Section::Ingredients,
        Section::Instructions,
        Section::Disclaimer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Comments => "comments",
            Section::Totals => "totals",
            Section::Charts => "charts",
            Section::Ingredients => "ingredients",
            Section::Instructions => "instructions",
            Section::Disclaimer => "disclaimer",
        }
    }
}

impl FromStr for Section {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsCard {
    pub label: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

pub fn totals_cards(totals: &Totals) -> Vec<TotalsCard> {
    let n = &totals.nutrition;
    vec![
        TotalsCard { label: "Calories", value: n.calories, unit: "kcal" },
        TotalsCard { label: "Protein", value: n.protein, unit: "g" },
        TotalsCard { label: "Carbohydrates", value: n.carbohydrates.total, unit: "g" },
        TotalsCard { label: "Fat", value: n.fat.total, unit: "g" },
        TotalsCard { label: "Glycemic load", value: totals.total_glycemic_load, unit: "" },
    ]
}

pub const INSTRUCTIONS: &[&str] = &[
    "Scan your meal: take a clear, well-lit photo of the plate or pick one from your gallery.",
    "Wait for the analysis: the AI nutritionist identifies the ingredients and estimates their values. This can take a few seconds.",
    "Explore the results: switch between comments, totals, charts and the ingredient table.",
    "Save the analysis: a saved analysis is reloaded automatically the next time the app starts.",
];

pub const DISCLAIMER: &[&str] = &[
    "The nutritional information shown here is generated by an AI model and must be treated as an estimate.",
    "Values vary with portion size, cooking method and the exact ingredients used. This app is not a substitute for professional medical advice; consult a doctor or a qualified dietitian for personal health and nutrition guidance.",
];

/// Body of one section, tagged by `section` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "section", rename_all = "lowercase")]
pub enum SectionView {
    Comments {
        #[serde(rename = "dishName")]
        dish_name: String,
        text: String,
    },
    Totals {
        cards: Vec<TotalsCard>,
    },
    Charts(Charts),
    Ingredients {
        query: String,
        rows: Vec<IngredientRow>,
    },
    Instructions {
        steps: &'static [&'static str],
    },
    Disclaimer {
        paragraphs: &'static [&'static str],
    },
}

/// Build the view for `section`. `query` only affects the ingredient table.
pub fn render(section: Section, result: &AnalysisResult, query: &str) -> SectionView {
    match section {
        Section::Comments => SectionView::Comments {
            dish_name: result.dish_name.clone(),
            text: result.expert_comments.clone(),
        },
        Section::Totals => SectionView::Totals {
            cards: totals_cards(&result.totals),
        },
        Section::Charts => SectionView::Charts(charts(&result.totals)),
        Section::Ingredients => SectionView::Ingredients {
            query: query.to_string(),
            rows: filter_ingredients(&result.ingredients, query),
        },
        Section::Instructions => SectionView::Instructions {
            steps: INSTRUCTIONS,
        },
        Section::Disclaimer => SectionView::Disclaimer {
            paragraphs: DISCLAIMER,
        },
    }
}
