//! Derived clinical indicators shown alongside the form.
//!
//! These mirror the composite features the prediction model is trained on,
//! so clinicians can see what the service will compute from their inputs.

use super::assessment::AssessmentInput;
use super::field::Field;

/// Highest possible criticality score (4 × 4).
pub const MAX_CRITICALITY: f64 = 16.0;

/// Previous admissions multiplied by length of stay.
#[must_use]
pub fn chronicity_index(input: &AssessmentInput) -> i64 {
    input
        .int(Field::NumberOfPreviousAdmissions)
        .saturating_mul(input.int(Field::LengthOfStay))
}

/// DRG mortality multiplied by DRG severity.
#[must_use]
pub fn criticality_score(input: &AssessmentInput) -> f64 {
    input.float(Field::DrgMortalityRisk) * input.float(Field::DrgSeverity)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriticalityLevel {
    Low,
    Moderate,
    High,
}

impl CriticalityLevel {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score < 4.0 {
            Self::Low
        } else if score < 9.0 {
            Self::Moderate
        } else {
            Self::High
        }
    }
}

impl std::fmt::Display for CriticalityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Moderate => write!(f, "Moderate"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Criticality as a fraction of the maximum, clamped to `0.0..=1.0`.
#[must_use]
pub fn criticality_ratio(score: f64) -> f64 {
    (score / MAX_CRITICALITY).clamp(0.0, 1.0)
}

/// One bar of the lab utilisation profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPoint {
    pub label: &'static str,
    pub value: u64,
}

/// Procedures and lab test counts, or `None` until one of them is entered.
#[must_use]
pub fn lab_profile(input: &AssessmentInput) -> Option<[DataPoint; 3]> {
    let any = [
        &input.total_procedures,
        &input.total_lab_tests,
        &input.unique_lab_tests,
    ]
    .iter()
    .any(|s| !s.is_empty());
    if !any {
        return None;
    }

    let point = |label, field| DataPoint {
        label,
        value: u64::try_from(input.int(field)).unwrap_or(0),
    };
    Some([
        point("Procedures", Field::TotalProcedures),
        point("Total Tests", Field::TotalLabTests),
        point("Unique Tests", Field::UniqueLabTests),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chronicity_index() {
        let mut input = AssessmentInput::default();
        assert_eq!(chronicity_index(&input), 0);
        input.number_of_previous_admissions = "3".to_string();
        input.length_of_stay = "5".to_string();
        assert_eq!(chronicity_index(&input), 15);
    }

    #[test]
    fn test_criticality() {
        let input = AssessmentInput::sample();
        let score = criticality_score(&input);
        assert!((score - 2.0).abs() < 1e-9);
        assert_eq!(CriticalityLevel::from_score(score), CriticalityLevel::Low);
        assert_eq!(CriticalityLevel::from_score(8.0), CriticalityLevel::Moderate);
        assert_eq!(CriticalityLevel::from_score(16.0), CriticalityLevel::High);
        assert!((criticality_ratio(16.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lab_profile_hidden_until_entered() {
        let mut input = AssessmentInput::default();
        assert!(lab_profile(&input).is_none());

        input.total_lab_tests = "9".to_string();
        let profile = lab_profile(&input).expect("profile once a value exists");
        assert_eq!(profile[1].value, 9);
        assert_eq!(profile[0].value, 0);
    }
}
