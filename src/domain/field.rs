//! Form fields and wizard steps.
//!
//! Every column of the assessment record is addressed through [`Field`], so
//! validation messages, UI metadata and wire names live in one place.

use serde::{Deserialize, Serialize};

/// How a field is edited and interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text interpreted as an integer.
    Numeric,
    /// Ordinal 0..=4 scale, adjusted with arrow keys.
    Scale,
    /// One of a fixed set of options.
    Choice,
}

/// Identifier for every field of the assessment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Age,
    Gender,
    AdmissionType,
    TotalDiagnoses,
    NumberOfPreviousAdmissions,
    LengthOfStay,
    DaysSinceLastAdmission,
    TotalProcedures,
    TotalLabTests,
    UniqueLabTests,
    DrgMortalityRisk,
    DrgSeverity,
    DischargeType,
    Insurance,
}

impl Field {
    /// All fields in form order.
    pub const ALL: [Field; 14] = [
        Field::Age,
        Field::Gender,
        Field::AdmissionType,
        Field::TotalDiagnoses,
        Field::NumberOfPreviousAdmissions,
        Field::LengthOfStay,
        Field::DaysSinceLastAdmission,
        Field::TotalProcedures,
        Field::TotalLabTests,
        Field::UniqueLabTests,
        Field::DrgMortalityRisk,
        Field::DrgSeverity,
        Field::DischargeType,
        Field::Insurance,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Age => "Age at Admission",
            Self::Gender => "Gender",
            Self::AdmissionType => "Admission Type",
            Self::TotalDiagnoses => "Total Diagnoses",
            Self::NumberOfPreviousAdmissions => "Number of Previous Admissions",
            Self::LengthOfStay => "Length of Current Stay",
            Self::DaysSinceLastAdmission => "Days Since Last Admission",
            Self::TotalProcedures => "Total Procedures",
            Self::TotalLabTests => "Total Lab Tests",
            Self::UniqueLabTests => "Unique Lab Tests",
            Self::DrgMortalityRisk => "DRG Mortality Risk",
            Self::DrgSeverity => "DRG Severity",
            Self::DischargeType => "Discharge Destination",
            Self::Insurance => "Insurance",
        }
    }

    /// Placeholder shown while the field is empty.
    #[must_use]
    pub fn hint(self) -> &'static str {
        match self {
            Self::Age => "years (0-150)",
            Self::TotalDiagnoses => "count (0-10)",
            Self::NumberOfPreviousAdmissions => "count",
            Self::LengthOfStay | Self::DaysSinceLastAdmission => "days",
            Self::TotalProcedures | Self::TotalLabTests => "count",
            Self::UniqueLabTests => "count (<= total lab tests)",
            Self::DrgMortalityRisk | Self::DrgSeverity => "scale 0-4",
            Self::Gender | Self::AdmissionType | Self::DischargeType | Self::Insurance => {
                "[←→] to change"
            }
        }
    }

    #[must_use]
    pub fn kind(self) -> FieldKind {
        match self {
            Self::Gender | Self::AdmissionType | Self::DischargeType | Self::Insurance => {
                FieldKind::Choice
            }
            Self::DrgMortalityRisk | Self::DrgSeverity => FieldKind::Scale,
            _ => FieldKind::Numeric,
        }
    }

    /// Wizard step this field is collected on.
    #[must_use]
    pub fn step(self) -> Step {
        let n = match self {
            Self::Age | Self::Gender => 1,
            Self::AdmissionType
            | Self::TotalDiagnoses
            | Self::NumberOfPreviousAdmissions
            | Self::LengthOfStay
            | Self::DaysSinceLastAdmission => 2,
            Self::TotalProcedures | Self::TotalLabTests | Self::UniqueLabTests => 3,
            Self::DrgMortalityRisk | Self::DrgSeverity => 4,
            Self::DischargeType | Self::Insurance => 5,
        };
        Step(n)
    }

    /// Key used for this field in the prediction request body.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Gender => "gender",
            Self::AdmissionType => "admission_type",
            Self::TotalDiagnoses => "total_diagnoses",
            Self::NumberOfPreviousAdmissions => "no_prev_adm",
            Self::LengthOfStay => "length_of_stay",
            Self::DaysSinceLastAdmission => "days_since_last_adm",
            Self::TotalProcedures => "total_procedures",
            Self::TotalLabTests => "total_lab_tests",
            Self::UniqueLabTests => "unique_lab_tests",
            Self::DrgMortalityRisk => "drg_mortality",
            Self::DrgSeverity => "drg_severity",
            Self::DischargeType => "discharge_location",
            Self::Insurance => "insurance",
        }
    }
}

/// A wizard step, always within `1..=Step::COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Step(u8);

impl Step {
    pub const COUNT: u8 = 5;
    pub const FIRST: Step = Step(1);
    pub const LAST: Step = Step(Self::COUNT);

    /// Build a step from its 1-based number.
    #[must_use]
    pub fn new(n: u8) -> Option<Self> {
        (1..=Self::COUNT).contains(&n).then_some(Self(n))
    }

    #[must_use]
    pub fn number(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_first(self) -> bool {
        self.0 == 1
    }

    #[must_use]
    pub fn is_last(self) -> bool {
        self.0 == Self::COUNT
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    #[must_use]
    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).and_then(Self::new)
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self.0 {
            1 => "Patient Demographics",
            2 => "Clinical History",
            3 => "Current Admission",
            4 => "Severity Assessment",
            _ => "Discharge Planning",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self.0 {
            1 => "Basic patient information",
            2 => "Admission type & medical history",
            3 => "Procedures & lab tests",
            4 => "DRG risk & severity scores",
            _ => "Discharge & insurance planning",
        }
    }

    /// Fields collected on this step, in display order.
    pub fn fields(self) -> impl Iterator<Item = Field> {
        Field::ALL.into_iter().filter(move |f| f.step() == self)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_bounds() {
        assert!(Step::new(0).is_none());
        assert!(Step::new(6).is_none());
        assert_eq!(Step::FIRST.prev(), None);
        assert_eq!(Step::LAST.next(), None);
        assert_eq!(Step::FIRST.next(), Step::new(2));
    }

    #[test]
    fn test_every_step_has_fields() {
        let total: usize = (1..=Step::COUNT)
            .filter_map(Step::new)
            .map(|s| s.fields().count())
            .sum();
        assert_eq!(total, Field::ALL.len());

        let step3: Vec<Field> = Step::new(3).expect("valid step").fields().collect();
        assert_eq!(
            step3,
            vec![Field::TotalProcedures, Field::TotalLabTests, Field::UniqueLabTests]
        );
    }

    #[test]
    fn test_wire_names_are_unique() {
        let mut names: Vec<&str> = Field::ALL.iter().map(|f| f.wire_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Field::ALL.len());
    }
}
