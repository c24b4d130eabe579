//! The UI lifecycle as a plain value: idle → analyzing → result | error.
//!
//! No I/O happens here. `SessionService` performs the model call and slot
//! writes and feeds their outcomes back in.

use serde::Serialize;
use time::OffsetDateTime;

use super::error::SessionError;
use crate::analysis::{AnalysisError, AnalysisResult};
use crate::images::CapturedImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Analyzing,
    Result,
    Error,
}

/// Identifies one capture; stale completions carry an old ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
pub struct Session {
    status: Status,
    image: Option<CapturedImage>,
    result: Option<AnalysisResult>,
    error_message: Option<String>,
    is_saved: bool,
    saved_at: Option<OffsetDateTime>,
    notice: Option<String>,
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            status: Status::Idle,
            image: None,
            result: None,
            error_message: None,
            is_saved: false,
            saved_at: None,
            notice: None,
            generation: 0,
        }
    }

    /// Startup state when the persisted slot held a valid analysis.
    pub fn restored(
        result: AnalysisResult,
        image: CapturedImage,
        saved_at: Option<OffsetDateTime>,
    ) -> Self {
        Self {
            status: Status::Result,
            image: Some(image),
            result: Some(result),
            is_saved: true,
            saved_at,
            ..Self::new()
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn image(&self) -> Option<&CapturedImage> {
        self.image.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_saved(&self) -> bool {
        self.is_saved
    }

    pub fn saved_at(&self) -> Option<OffsetDateTime> {
        self.saved_at
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Enter `analyzing` with a new photo. Ignored while already analyzing.
    pub fn begin_capture(&mut self, image: CapturedImage) -> Result<Ticket, SessionError> {
        if self.status == Status::Analyzing {
            return Err(SessionError::AnalysisInProgress);
        }
        self.generation += 1;
        self.status = Status::Analyzing;
        self.image = Some(image);
        self.result = None;
        self.error_message = None;
        self.is_saved = false;
        self.saved_at = None;
        self.notice = None;
        Ok(Ticket(self.generation))
    }

    /// Apply the outcome of the analysis started with `ticket`.
    ///
    /// Returns false when the session moved on (reset or a newer capture)
    /// and the outcome was dropped.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> bool {
        if self.status != Status::Analyzing || ticket.0 != self.generation {
            return false;
        }
        match outcome {
            Ok(result) => {
                self.status = Status::Result;
                self.result = Some(result);
                self.is_saved = false;
            }
            Err(err) => {
                self.status = Status::Error;
                self.error_message = Some(err.to_string());
            }
        }
        true
    }

    pub fn reset(&mut self) {
        let generation = self.generation;
        *self = Self::new();
        self.generation = generation;
    }

    /// What a save would write, or `None` if it is already saved.
    pub fn pending_save(&self) -> Result<Option<(&AnalysisResult, &CapturedImage)>, SessionError> {
        match (self.status, &self.result, &self.image) {
            (Status::Result, Some(result), Some(image)) => {
                if self.is_saved {
                    Ok(None)
                } else {
                    Ok(Some((result, image)))
                }
            }
            _ => Err(SessionError::NothingToSave),
        }
    }

    pub fn mark_saved(&mut self, at: OffsetDateTime) {
        if self.status == Status::Result {
            self.is_saved = true;
            self.saved_at = Some(at);
            self.notice = None;
        }
    }

    /// Transient message that leaves the status untouched.
    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }
}
