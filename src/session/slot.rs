//! The single persisted slot: last saved analysis plus its photo.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, error, warn};

use crate::analysis::{validate_result, AnalysisResult};
use crate::images::CapturedImage;
use crate::storage::KeyValueStore;

pub const SLOT_KEY: &str = "lastAnalysis";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SlotError {
    #[error("Could not save the analysis. Local storage may be full or unavailable.")]
    PersistenceFailure(String),

    #[error("saved analysis is unreadable: {0}")]
    CorruptPersistedState(String),
}

/// Wire form stored under `SLOT_KEY`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSlot {
    pub result: AnalysisResult,
    /// `data:<mime>;base64,...`
    pub image: String,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub saved_at: Option<OffsetDateTime>,
}

/// A slot that decoded and validated cleanly.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredSlot {
    pub result: AnalysisResult,
    pub image: CapturedImage,
    pub saved_at: Option<OffsetDateTime>,
}

pub fn encode(
    result: &AnalysisResult,
    image: &CapturedImage,
    saved_at: OffsetDateTime,
) -> Result<String, SlotError> {
    let slot = PersistedSlot {
        result: result.clone(),
        image: image.to_data_uri(),
        saved_at: Some(saved_at),
    };
    serde_json::to_string(&slot).map_err(|e| SlotError::PersistenceFailure(e.to_string()))
}

pub fn decode(raw: &str) -> Result<RestoredSlot, SlotError> {
    let slot: PersistedSlot = serde_json::from_str(raw)
        .map_err(|e| SlotError::CorruptPersistedState(e.to_string()))?;
    validate_result(&slot.result)
        .map_err(|e| SlotError::CorruptPersistedState(e.to_string()))?;
    let image = CapturedImage::from_data_uri(&slot.image)
        .map_err(|e| SlotError::CorruptPersistedState(e.to_string()))?;
    Ok(RestoredSlot {
        result: slot.result,
        image,
        saved_at: slot.saved_at,
    })
}

/// Read the slot at startup.
///
/// A corrupt slot is deleted and treated as absent. A store that cannot
/// be read is also treated as absent, but left in place.
pub async fn load(store: &dyn KeyValueStore) -> Option<RestoredSlot> {
    let raw = match store.get(SLOT_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("no saved analysis");
            return None;
        }
        Err(e) => {
            error!(error = %e, "failed to read saved analysis; starting idle");
            return None;
        }
    };

    match decode(&raw) {
        Ok(slot) => Some(slot),
        Err(e) => {
            warn!(error = %e, "discarding corrupt saved analysis");
            if let Err(e) = store.remove(SLOT_KEY).await {
                warn!(error = %e, "failed to delete corrupt saved analysis");
            }
            None
        }
    }
}

pub async fn write(
    store: &dyn KeyValueStore,
    result: &AnalysisResult,
    image: &CapturedImage,
    saved_at: OffsetDateTime,
) -> Result<(), SlotError> {
    let raw = encode(result, image, saved_at)?;
    store.set(SLOT_KEY, &raw).await.map_err(|e| {
        error!(error = %e, "failed to write saved analysis");
        SlotError::PersistenceFailure(e.to_string())
    })
}

pub async fn clear(store: &dyn KeyValueStore) -> Result<(), SlotError> {
    store.remove(SLOT_KEY).await.map_err(|e| {
        error!(error = %e, "failed to delete saved analysis");
        SlotError::PersistenceFailure(e.to_string())
    })
}
