use tracing::warn;

use super::error::AnalysisError;
use super::types::AnalysisResult;
use super::validate::{validate_result, warn_on_totals_drift};

/// Turn raw model text into a validated result.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, AnalysisError> {
    let json = strip_code_fence(raw.trim());
    if json.is_empty() {
        return Err(AnalysisError::malformed("empty response text"));
    }

    let result: AnalysisResult = serde_json::from_str(json).map_err(|e| {
        warn!(error = %e, "model output does not match the analysis schema");
        AnalysisError::malformed(e.to_string())
    })?;

    validate_result(&result).map_err(|e| {
        warn!(error = %e, "model output failed validation");
        AnalysisError::malformed(e.to_string())
    })?;

    warn_on_totals_drift(&result);
    Ok(result)
}

/// JSON mode should return bare JSON, but some models still wrap it in a
/// Markdown fence.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
