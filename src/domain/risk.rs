//! Readmission risk results.
//!
//! Represents the score returned by the prediction service and its
//! qualitative interpretation.

use serde::{Deserialize, Serialize};

/// Scores below this are low risk.
pub const MODERATE_THRESHOLD: f64 = 20.0;
/// Scores at or above this are high risk.
pub const HIGH_THRESHOLD: f64 = 40.0;

/// Qualitative 30-day readmission risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Classify a 0-100 score.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score < MODERATE_THRESHOLD {
            Self::Low
        } else if score < HIGH_THRESHOLD {
            Self::Moderate
        } else {
            Self::High
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Moderate => "Moderate Risk",
            Self::High => "High Risk",
        }
    }

    /// Suggested follow-up for this level.
    #[must_use]
    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Low => "Consider standard discharge protocols with routine follow-up.",
            Self::Moderate => "Enhanced monitoring and targeted interventions recommended.",
            Self::High => "Urgent care coordination and comprehensive follow-up required.",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129),      // Emerald (#10B981)
            Self::Moderate => (245, 158, 11), // Amber (#F59E0B)
            Self::High => (239, 68, 68),      // Red (#EF4444)
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A score returned by the prediction service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Step the prediction was requested for.
    pub step: u8,

    /// Readmission probability as a percentage (0.0 to 100.0)
    pub risk_score: f64,
}

impl Prediction {
    #[must_use]
    pub fn new(step: u8, risk_score: f64) -> Self {
        Self { step, risk_score }
    }

    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }
}

/// Format a score the way it is shown to clinicians (`42.3%`).
#[must_use]
pub fn format_score(score: f64) -> String {
    format!("{score:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_thresholds() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(19.99), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(20.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(39.9), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(40.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(99.0), RiskLevel::High);
    }

    #[test]
    fn test_prediction_display() {
        let p = Prediction::new(5, 42.3);
        assert_eq!(p.risk_level().to_string(), "High Risk");
        assert_eq!(format_score(p.risk_score), "42.3%");
        assert_eq!(format_score(0.0), "0.0%");
    }
}
