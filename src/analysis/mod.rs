//! Meal photo analysis: wire types, the model contract and its validation.

mod client;
mod error;
mod parse;
mod prompts;
mod types;
mod validate;

pub use client::{GeminiAnalyzer, MealAnalyzer};
pub use error::AnalysisError;
pub use types::{AnalysisResult, Ingredient, Totals};
#[cfg(test)]
pub use types::{Carbohydrates, Fat, NutritionalInfo};
pub use validate::validate_result;
