//! Fixtures and fakes shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::analysis::{
    AnalysisError, AnalysisResult, Carbohydrates, Fat, Ingredient, MealAnalyzer, NutritionalInfo,
    Totals,
};
use crate::images::CapturedImage;
use crate::storage::KeyValueStore;

/// Wire form of `sample_result()`.
pub const SAMPLE_JSON: &str = r#"{"dishName":"Grilled Chicken Salad","ingredients":[{"name":"Chicken breast","estimatedWeight":"120g","calories":198,"protein":36,"carbohydrates":{"total":0,"sugars":0},"fat":{"total":4.3,"saturated":1.2},"fiber":0,"sodium":74,"glycemicIndex":0,"glycemicLoad":0}],"totals":{"calories":198,"protein":36,"carbohydrates":{"total":0,"sugars":0},"fat":{"total":4.3,"saturated":1.2},"fiber":0,"sodium":74,"totalGlycemicLoad":0},"expertComments":"Lean and low-carb."}"#;

fn sample_nutrition() -> NutritionalInfo {
    NutritionalInfo {
        calories: 198.0,
        protein: 36.0,
        carbohydrates: Carbohydrates {
            total: 0.0,
            sugars: 0.0,
        },
        fat: Fat {
            total: 4.3,
            saturated: 1.2,
        },
        fiber: 0.0,
        sodium: 74.0,
    }
}

pub fn sample_result() -> AnalysisResult {
    AnalysisResult {
        dish_name: "Grilled Chicken Salad".into(),
        ingredients: vec![Ingredient {
            name: "Chicken breast".into(),
            estimated_weight: "120g".into(),
            nutrition: sample_nutrition(),
            glycemic_index: 0.0,
            glycemic_load: 0.0,
        }],
        totals: Totals {
            nutrition: sample_nutrition(),
            total_glycemic_load: 0.0,
        },
        expert_comments: "Lean and low-carb.".into(),
    }
}

/// JPEG magic bytes, enough to stand in for a photo.
pub fn sample_image() -> CapturedImage {
    CapturedImage {
        mime_type: "image/jpeg".into(),
        bytes: Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]),
    }
}

/// Replays queued outcomes in order; an empty queue yields a malformed response.
pub struct ScriptedAnalyzer {
    outcomes: Mutex<VecDeque<Result<AnalysisResult, AnalysisError>>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedAnalyzer {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push(&self, outcome: Result<AnalysisResult, AnalysisError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MealAnalyzer for ScriptedAnalyzer {
    async fn analyze(&self, _image: &CapturedImage) -> Result<AnalysisResult, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.outcomes.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(AnalysisError::malformed("no scripted outcome")))
    }
}

/// A store whose every operation fails, like a full or unavailable disk.
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        anyhow::bail!("storage unavailable")
    }

    async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("storage unavailable")
    }

    async fn remove(&self, _key: &str) -> anyhow::Result<()> {
        anyhow::bail!("storage unavailable")
    }
}
