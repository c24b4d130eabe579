use thiserror::Error;

/// Failure of one `analyze` call.
///
/// `Display` is what the user sees. Provider detail never goes in here;
/// it is logged where the failure happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("{0}")]
    ProviderFailure(String),

    #[error("{}", AnalysisError::GENERIC_PROVIDER_MESSAGE)]
    MalformedResponse(String),

    #[error("The analysis took too long to complete. Please try again.")]
    Timeout,
}

impl AnalysisError {
    pub const GENERIC_PROVIDER_MESSAGE: &'static str =
        "Meal analysis failed. The AI model may not be able to process this image; try a sharper photo.";

    pub fn provider(message: impl Into<String>) -> Self {
        Self::ProviderFailure(message.into())
    }

    pub fn generic_provider() -> Self {
        Self::ProviderFailure(Self::GENERIC_PROVIDER_MESSAGE.to_string())
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse(reason.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProviderFailure(_) => "provider_failure",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Timeout => "timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_hides_reason() {
        let err = AnalysisError::malformed("totals: missing field");
        assert!(!err.to_string().contains("totals"));
        assert_eq!(err.kind(), "malformed_response");
    }

    #[test]
    fn provider_message_is_displayed() {
        let err = AnalysisError::provider("The analysis service is busy.");
        assert_eq!(err.to_string(), "The analysis service is busy.");
    }
}
