use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::machine::{Session, Status};
use crate::analysis::AnalysisResult;

/// What the front end renders after every event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub is_saved: bool,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub saved_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl From<&Session> for SessionSnapshot {
    fn from(s: &Session) -> Self {
        Self {
            status: s.status(),
            image: s.image().map(|i| i.to_data_uri()),
            result: s.result().cloned(),
            error_message: s.error_message().map(str::to_string),
            is_saved: s.is_saved(),
            saved_at: s.saved_at(),
            notice: s.notice().map(str::to_string),
        }
    }
}

/// `POST /session/capture/base64`: a data URI, or bare base64 plus mime type.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureBase64Request {
    pub image: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SectionQuery {
    #[serde(default)]
    pub q: String,
}
