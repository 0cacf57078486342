//! Per-field input validation.
//!
//! Validators never reject an edit outright: out-of-range numbers are clamped
//! to the nearest legal value and reported, unparseable text is kept as typed
//! and reported.

use std::collections::BTreeMap;

use super::assessment::{
    parse_float, parse_int, AdmissionType, AssessmentInput, ChoiceOption, DischargeLocation,
    Gender, Insurance,
};
use super::field::{Field, FieldKind};

pub const INVALID_NUMBER: &str = "Please enter a valid number";
pub const INVALID_OPTION: &str = "Please select a valid option";

pub const AGE_MAX: i64 = 150;
pub const TOTAL_DIAGNOSES_MAX: i64 = 10;
pub const DRG_SCALE_MAX: f64 = 4.0;

/// Result of validating one edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    /// Value to store in the record.
    pub value: String,
    /// Message to show next to the field, if any.
    pub error: Option<String>,
}

impl Validated {
    fn ok(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            error: None,
        }
    }

    fn flagged(value: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            error: Some(error.into()),
        }
    }
}

/// Field → message map for the fields currently in error.
pub type FieldErrors = BTreeMap<Field, String>;

/// Validate a raw edit of `field` against the rest of the record.
///
/// `record` supplies the values other fields depend on (unique lab tests are
/// bounded by total lab tests).
#[must_use]
pub fn validate_field(field: Field, raw: &str, record: &AssessmentInput) -> Validated {
    match field.kind() {
        FieldKind::Choice => validate_choice(field, raw, record),
        FieldKind::Scale => validate_scale(field, raw),
        FieldKind::Numeric => validate_count(field, raw, record),
    }
}

fn validate_count(field: Field, raw: &str, record: &AssessmentInput) -> Validated {
    let Some(n) = parse_int(raw) else {
        return Validated::flagged(raw, INVALID_NUMBER);
    };

    if n < 0 {
        let message = match field {
            Field::Age => "Age cannot be negative".to_string(),
            other => format!("{} must be greater than or equal to 0", floor_subject(other)),
        };
        return Validated::flagged("0", message);
    }

    match field {
        Field::Age if n > AGE_MAX => {
            Validated::flagged(AGE_MAX.to_string(), format!("Age cannot exceed {AGE_MAX}"))
        }
        Field::TotalDiagnoses if n > TOTAL_DIAGNOSES_MAX => Validated::flagged(
            TOTAL_DIAGNOSES_MAX.to_string(),
            format!("Total diagnoses cannot exceed {TOTAL_DIAGNOSES_MAX}"),
        ),
        Field::UniqueLabTests => {
            let total = record.int(Field::TotalLabTests);
            if n > total {
                Validated::flagged(
                    total.to_string(),
                    "Unique lab tests cannot exceed total lab tests",
                )
            } else {
                Validated::ok(raw)
            }
        }
        _ => Validated::ok(raw),
    }
}

/// Sentence subject used in "must be greater than or equal to 0" messages.
fn floor_subject(field: Field) -> &'static str {
    match field {
        Field::NumberOfPreviousAdmissions => "Number of previous admissions",
        Field::LengthOfStay => "Length of stay",
        Field::DaysSinceLastAdmission => "Days since last admission",
        Field::TotalProcedures => "Total procedures",
        Field::TotalLabTests => "Total lab tests",
        Field::UniqueLabTests => "Unique lab tests",
        Field::TotalDiagnoses => "Total diagnoses",
        other => other.label(),
    }
}

fn validate_scale(field: Field, raw: &str) -> Validated {
    let Some(v) = parse_float(raw) else {
        return Validated::flagged(raw, INVALID_NUMBER);
    };
    let message = || format!("{} must be between 0 and 4", field.label());
    if v < 0.0 {
        Validated::flagged("0", message())
    } else if v > DRG_SCALE_MAX {
        Validated::flagged("4", message())
    } else {
        Validated::ok(raw)
    }
}

fn validate_choice(field: Field, raw: &str, record: &AssessmentInput) -> Validated {
    let known = match field {
        Field::Gender => Gender::parse(raw).map(|v| v.as_str()),
        Field::AdmissionType => AdmissionType::parse(raw).map(|v| v.as_str()),
        Field::DischargeType => DischargeLocation::parse(raw).map(|v| v.as_str()),
        Field::Insurance => Insurance::parse(raw).map(|v| v.as_str()),
        _ => None,
    };
    match known {
        Some(value) => Validated::ok(value),
        None => Validated::flagged(record.value(field), INVALID_OPTION),
    }
}

/// Fields whose validity depends on `field`.
#[must_use]
pub fn dependents(field: Field) -> &'static [Field] {
    match field {
        Field::TotalLabTests => &[Field::UniqueLabTests],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> AssessmentInput {
        AssessmentInput::default()
    }

    #[test]
    fn test_age_clamping() {
        let v = validate_field(Field::Age, "200", &blank());
        assert_eq!(v.value, "150");
        assert_eq!(v.error.as_deref(), Some("Age cannot exceed 150"));

        let v = validate_field(Field::Age, "-5", &blank());
        assert_eq!(v.value, "0");
        assert_eq!(v.error.as_deref(), Some("Age cannot be negative"));

        let v = validate_field(Field::Age, "65", &blank());
        assert_eq!(v, Validated::ok("65"));
    }

    #[test]
    fn test_negative_counts_clamp_to_zero() {
        let floor_fields = [
            Field::TotalDiagnoses,
            Field::NumberOfPreviousAdmissions,
            Field::LengthOfStay,
            Field::DaysSinceLastAdmission,
            Field::TotalProcedures,
            Field::TotalLabTests,
            Field::UniqueLabTests,
        ];
        for field in floor_fields {
            let v = validate_field(field, "-3", &blank());
            assert_eq!(v.value, "0", "{field:?}");
            assert!(v.error.as_deref().is_some_and(|e| !e.is_empty()), "{field:?}");
        }

        let v = validate_field(Field::LengthOfStay, "-1", &blank());
        assert_eq!(
            v.error.as_deref(),
            Some("Length of stay must be greater than or equal to 0")
        );
    }

    #[test]
    fn test_non_numeric_is_kept_and_flagged() {
        let v = validate_field(Field::TotalProcedures, "abc", &blank());
        assert_eq!(v.value, "abc");
        assert_eq!(v.error.as_deref(), Some(INVALID_NUMBER));

        let v = validate_field(Field::Age, "", &blank());
        assert_eq!(v.error.as_deref(), Some(INVALID_NUMBER));
    }

    #[test]
    fn test_unique_lab_tests_bounded_by_total() {
        let mut record = blank();
        record.total_lab_tests = "10".to_string();

        let v = validate_field(Field::UniqueLabTests, "15", &record);
        assert_eq!(v.value, "10");
        assert_eq!(
            v.error.as_deref(),
            Some("Unique lab tests cannot exceed total lab tests")
        );

        let v = validate_field(Field::UniqueLabTests, "7", &record);
        assert_eq!(v, Validated::ok("7"));

        // Missing total counts as zero.
        let v = validate_field(Field::UniqueLabTests, "2", &blank());
        assert_eq!(v.value, "0");
    }

    #[test]
    fn test_total_diagnoses_maximum() {
        let v = validate_field(Field::TotalDiagnoses, "12", &blank());
        assert_eq!(v.value, "10");
        assert!(v.error.is_some());
    }

    #[test]
    fn test_drg_scale_bounds() {
        let v = validate_field(Field::DrgSeverity, "7", &blank());
        assert_eq!(v.value, "4");
        let v = validate_field(Field::DrgMortalityRisk, "-1", &blank());
        assert_eq!(v.value, "0");
        assert_eq!(validate_field(Field::DrgSeverity, "2.5", &blank()).error, None);
    }

    #[test]
    fn test_choice_validation() {
        let v = validate_field(Field::Insurance, "Medicare", &blank());
        assert_eq!(v, Validated::ok("Medicare"));

        let v = validate_field(Field::Gender, "O", &blank());
        assert_eq!(v.value, "M");
        assert_eq!(v.error.as_deref(), Some(INVALID_OPTION));
    }
}
