//! Risk predictor port: Trait for the external prediction service.
//!
//! This trait abstracts the HTTP service from the wizard controller so the
//! controller can be driven by any backend (or a test double).

use crate::domain::{AssessmentInput, Prediction, Step};

/// Failure of a prediction request.
///
/// `Display` yields the message surfaced to the clinician.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    /// The service answered with a non-success status.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        suggestion: Option<String>,
    },

    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("Invalid response from risk service: {0}")]
    Decode(String),
}

impl RequestError {
    /// Build a status error, falling back to the generic HTTP message.
    #[must_use]
    pub fn status(status: u16, message: Option<String>, suggestion: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP error! status: {status}"));
        Self::Status {
            status,
            message,
            suggestion,
        }
    }
}

/// Trait for risk prediction.
pub trait RiskPredictor: Send + Sync {
    /// Request a risk score for `input` as of wizard `step`.
    ///
    /// # Errors
    /// Returns `RequestError` if the service is unreachable, rejects the
    /// request, or answers with an undecodable body.
    fn predict_risk(&self, step: Step, input: &AssessmentInput) -> Result<Prediction, RequestError>;

    /// Issue one fixed synthetic request to check the service is reachable.
    fn test_connection(&self) -> bool {
        match self.predict_risk(Step::LAST, &AssessmentInput::sample()) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("API connection test failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_fallback() {
        let err = RequestError::status(502, None, None);
        assert_eq!(err.to_string(), "HTTP error! status: 502");

        let err = RequestError::status(
            500,
            Some("Model not loaded.".to_string()),
            Some("Run: pip install --upgrade scikit-learn".to_string()),
        );
        assert_eq!(err.to_string(), "Model not loaded.");
    }

    struct Unreachable;

    impl RiskPredictor for Unreachable {
        fn predict_risk(&self, _: Step, _: &AssessmentInput) -> Result<Prediction, RequestError> {
            Err(RequestError::Transport("connection refused".to_string()))
        }
    }

    #[test]
    fn test_connection_check_swallows_errors() {
        assert!(!Unreachable.test_connection());
    }
}
