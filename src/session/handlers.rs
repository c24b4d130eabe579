use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use super::dto::{CaptureBase64Request, SectionQuery, SessionSnapshot};
use super::error::SessionError;
use crate::images::{mime_from_file_name, CapturedImage};
use crate::report::{self, Section, SectionView};
use crate::state::AppState;

const DEFAULT_BASE64_MIME: &str = "image/jpeg";

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/sections/:section", get(get_section))
}

pub fn write_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/session/capture", post(capture_multipart))
        .route("/session/capture/base64", post(capture_base64))
        .route("/session/save", post(save))
        .route("/session/reset", post(reset))
        .route("/session/retry", post(reset))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot().await)
}

#[instrument(skip(state, q))]
pub async fn get_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
    Query(q): Query<SectionQuery>,
) -> Result<Json<SectionView>, (StatusCode, String)> {
    let section: Section = section
        .parse()
        .map_err(|_| SessionError::UnknownSection(section.clone()))?;
    let view = state
        .session
        .with_result(|result| report::render(section, result, &q.q))
        .await?;
    Ok(Json(view))
}

/// POST /session/capture (multipart)
/// Field `file` (or `image`); the first one wins.
#[instrument(skip(state, mp))]
pub async fn capture_multipart(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<SessionSnapshot>, (StatusCode, String)> {
    let mut image = None;
    while let Some(field) = mp.next_field().await.map_err(bad_request)? {
        if !matches!(field.name(), Some("file") | Some("image")) {
            continue;
        }
        let mime = field
            .content_type()
            .map(str::to_string)
            .or_else(|| field.file_name().and_then(mime_from_file_name).map(str::to_string))
            .unwrap_or_else(|| "application/octet-stream".into());
        let data = field.bytes().await.map_err(bad_request)?;
        image = Some(CapturedImage::new(mime, data).map_err(SessionError::from)?);
        break;
    }
    let Some(image) = image else {
        return Err((StatusCode::BAD_REQUEST, "file is required".into()));
    };

    Ok(Json(state.session.capture(image).await?))
}

/// POST /session/capture/base64 { image: "data:...;base64,..." | "<base64>", mimeType? }
#[instrument(skip(state, body))]
pub async fn capture_base64(
    State(state): State<AppState>,
    Json(body): Json<CaptureBase64Request>,
) -> Result<Json<SessionSnapshot>, (StatusCode, String)> {
    let payload = body.image.trim();
    if payload.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "image is required".into()));
    }
    let image = if payload.starts_with("data:") {
        CapturedImage::from_data_uri(payload)
    } else {
        let mime = body.mime_type.as_deref().unwrap_or(DEFAULT_BASE64_MIME);
        CapturedImage::from_base64(payload, mime)
    }
    .map_err(SessionError::from)?;

    Ok(Json(state.session.capture(image).await?))
}

#[instrument(skip(state))]
pub async fn save(
    State(state): State<AppState>,
) -> Result<Json<SessionSnapshot>, (StatusCode, String)> {
    Ok(Json(state.session.save().await?))
}

#[instrument(skip(state))]
pub async fn reset(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.reset().await)
}

fn bad_request<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    warn!(error = %e, "rejected upload");
    (StatusCode::BAD_REQUEST, e.to_string())
}
