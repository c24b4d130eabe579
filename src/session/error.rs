use axum::http::StatusCode;
use thiserror::Error;

use crate::images::ImageError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("An analysis is already in progress.")]
    AnalysisInProgress,

    #[error("There is no unsaved analysis to save.")]
    NothingToSave,

    #[error("No analysis result is available.")]
    NoResult,

    #[error("Unknown section {0:?}.")]
    UnknownSection(String),

    #[error("Invalid image: {0}")]
    InvalidImage(#[from] ImageError),
}

impl SessionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AnalysisInProgress | Self::NothingToSave | Self::NoResult => {
                StatusCode::CONFLICT
            }
            Self::UnknownSection(_) => StatusCode::NOT_FOUND,
            Self::InvalidImage(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<SessionError> for (StatusCode, String) {
    fn from(err: SessionError) -> Self {
        (err.status_code(), err.to_string())
    }
}
