use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("image payload is empty")]
    Empty,
    #[error("image is not a base64 data URI")]
    NotDataUri,
    #[error("image payload is not valid base64")]
    InvalidBase64,
}

/// A photo as captured: raw bytes plus the mime type they were sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub mime_type: String,
    pub bytes: Bytes,
}

impl CapturedImage {
    pub fn new(mime_type: impl Into<String>, bytes: Bytes) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        Ok(Self {
            mime_type: mime_type.into(),
            bytes,
        })
    }

    /// Bare base64 payload, the form inline model parts expect.
    pub fn base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Display-ready `data:<mime>;base64,<payload>` form.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64())
    }

    pub fn from_data_uri(uri: &str) -> Result<Self, ImageError> {
        lazy_static! {
            static ref DATA_URI_RE: Regex =
                Regex::new(r"(?s)^data:([^;,]+)(?:;[^;,=]+=[^;,]*)*;base64,(.*)$").unwrap();
        }
        let caps = DATA_URI_RE
            .captures(uri.trim())
            .ok_or(ImageError::NotDataUri)?;
        Self::from_base64(&caps[2], &caps[1])
    }

    pub fn from_base64(payload: &str, mime_type: &str) -> Result<Self, ImageError> {
        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(cleaned)
            .map_err(|_| ImageError::InvalidBase64)?;
        Self::new(mime_type, Bytes::from(bytes))
    }
}

/// Best guess for uploads that arrive without a content type.
pub fn mime_from_file_name(name: &str) -> Option<&'static str> {
    let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
