//! Assessment record collected by the wizard.
//!
//! Numeric columns are kept as the text the clinician typed; they are only
//! interpreted when validated or mapped onto the prediction request.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::field::Field;

/// A field whose value is one of a fixed list of options.
pub trait ChoiceOption: Copy + PartialEq + Sized + 'static {
    /// Options in display order.
    const OPTIONS: &'static [Self];

    /// Value as sent to the prediction service.
    fn as_str(&self) -> &'static str;

    /// Human-readable label.
    fn label(&self) -> &'static str {
        self.as_str()
    }

    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::OPTIONS.iter().copied().find(|o| o.as_str() == raw)
    }

    /// The neighbouring option, wrapping at both ends.
    #[must_use]
    fn cycled(self, forward: bool) -> Self {
        let len = Self::OPTIONS.len();
        let idx = Self::OPTIONS.iter().position(|o| *o == self).unwrap_or(0);
        let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
        Self::OPTIONS[next]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    M,
    F,
}

impl ChoiceOption for Gender {
    const OPTIONS: &'static [Self] = &[Self::M, Self::F];

    fn as_str(&self) -> &'static str {
        match self {
            Self::M => "M",
            Self::F => "F",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::M => "Male",
            Self::F => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AdmissionType {
    #[default]
    Urgent,
    Emergency,
}

impl ChoiceOption for AdmissionType {
    const OPTIONS: &'static [Self] = &[Self::Urgent, Self::Emergency];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "Urgent",
            Self::Emergency => "Emergency",
        }
    }
}

/// Where the patient goes after discharge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DischargeLocation {
    #[default]
    Home,
    Rehabilitation,
    SkilledNursingFacility,
    HomeHealthCare,
    LongTermCare,
    Other,
}

impl ChoiceOption for DischargeLocation {
    const OPTIONS: &'static [Self] = &[
        Self::Home,
        Self::Rehabilitation,
        Self::SkilledNursingFacility,
        Self::HomeHealthCare,
        Self::LongTermCare,
        Self::Other,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Rehabilitation => "Rehabilitation part of hospital",
            Self::SkilledNursingFacility => "Skilled Nursing Facility (SNF)",
            Self::HomeHealthCare => "Home Health Care",
            Self::LongTermCare => "Long Term Care in Hospital",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Insurance {
    #[default]
    SelfPay,
    Private,
    Medicaid,
    Medicare,
    Government,
}

impl ChoiceOption for Insurance {
    const OPTIONS: &'static [Self] = &[
        Self::SelfPay,
        Self::Private,
        Self::Medicaid,
        Self::Medicare,
        Self::Government,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::SelfPay => "Self pay",
            Self::Private => "Private",
            Self::Medicaid => "Medicaid",
            Self::Medicare => "Medicare",
            Self::Government => "Government",
        }
    }
}

/// Parse the leading integer of `raw`.
///
/// Accepts leading whitespace and an optional sign, then reads digits until
/// the first non-digit (`"12abc"` is 12, `"3.7"` is 3). Returns `None` when no
/// digit is present.
#[must_use]
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }

    seen.then_some(if negative { -value } else { value })
}

/// Parse the leading decimal number of `raw` (`"2.5kg"` is 2.5).
#[must_use]
pub fn parse_float(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let mut end = 0;
    let bytes = s.as_bytes();
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end = 1;
    }
    let mut digits = 0;
    let mut dot = false;
    while let Some(&b) = bytes.get(end) {
        if b.is_ascii_digit() {
            digits += 1;
        } else if b == b'.' && !dot {
            dot = true;
        } else {
            break;
        }
        end += 1;
    }
    if digits == 0 {
        return None;
    }
    s[..end].trim_end_matches('.').parse().ok()
}

/// Everything the clinician has entered during one assessment session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentInput {
    pub age: String,
    pub gender: Gender,
    pub admission_type: AdmissionType,
    pub total_diagnoses: String,
    pub number_of_previous_admissions: String,
    pub length_of_stay: String,
    pub days_since_last_admission: String,
    pub total_procedures: String,
    pub total_lab_tests: String,
    pub unique_lab_tests: String,
    pub drg_mortality_risk: String,
    pub drg_severity: String,
    pub discharge_type: DischargeLocation,
    pub insurance: Insurance,
}

impl Default for AssessmentInput {
    fn default() -> Self {
        Self {
            age: String::new(),
            gender: Gender::default(),
            admission_type: AdmissionType::default(),
            total_diagnoses: String::new(),
            number_of_previous_admissions: String::new(),
            length_of_stay: String::new(),
            days_since_last_admission: String::new(),
            total_procedures: String::new(),
            total_lab_tests: String::new(),
            unique_lab_tests: String::new(),
            drg_mortality_risk: "0".to_string(),
            drg_severity: "0".to_string(),
            discharge_type: DischargeLocation::default(),
            insurance: Insurance::default(),
        }
    }
}

impl AssessmentInput {
    /// Fixed synthetic patient used for connectivity checks and sample data.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            age: "65".to_string(),
            gender: Gender::M,
            admission_type: AdmissionType::Emergency,
            total_diagnoses: "3".to_string(),
            number_of_previous_admissions: "2".to_string(),
            length_of_stay: "5".to_string(),
            days_since_last_admission: "30".to_string(),
            total_procedures: "8".to_string(),
            total_lab_tests: "15".to_string(),
            unique_lab_tests: "12".to_string(),
            drg_mortality_risk: "0.8".to_string(),
            drg_severity: "2.5".to_string(),
            discharge_type: DischargeLocation::Home,
            insurance: Insurance::Medicare,
        }
    }

    /// Text buffer backing a numeric or scale field. `None` for choice fields.
    #[must_use]
    pub fn text(&self, field: Field) -> Option<&str> {
        let s = match field {
            Field::Age => &self.age,
            Field::TotalDiagnoses => &self.total_diagnoses,
            Field::NumberOfPreviousAdmissions => &self.number_of_previous_admissions,
            Field::LengthOfStay => &self.length_of_stay,
            Field::DaysSinceLastAdmission => &self.days_since_last_admission,
            Field::TotalProcedures => &self.total_procedures,
            Field::TotalLabTests => &self.total_lab_tests,
            Field::UniqueLabTests => &self.unique_lab_tests,
            Field::DrgMortalityRisk => &self.drg_mortality_risk,
            Field::DrgSeverity => &self.drg_severity,
            Field::Gender | Field::AdmissionType | Field::DischargeType | Field::Insurance => {
                return None
            }
        };
        Some(s.as_str())
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        let s = match field {
            Field::Age => &mut self.age,
            Field::TotalDiagnoses => &mut self.total_diagnoses,
            Field::NumberOfPreviousAdmissions => &mut self.number_of_previous_admissions,
            Field::LengthOfStay => &mut self.length_of_stay,
            Field::DaysSinceLastAdmission => &mut self.days_since_last_admission,
            Field::TotalProcedures => &mut self.total_procedures,
            Field::TotalLabTests => &mut self.total_lab_tests,
            Field::UniqueLabTests => &mut self.unique_lab_tests,
            Field::DrgMortalityRisk => &mut self.drg_mortality_risk,
            Field::DrgSeverity => &mut self.drg_severity,
            Field::Gender | Field::AdmissionType | Field::DischargeType | Field::Insurance => {
                return None
            }
        };
        Some(s)
    }

    /// Current value of any field as text (wire string for choices).
    #[must_use]
    pub fn value(&self, field: Field) -> String {
        match field {
            Field::Gender => self.gender.as_str().to_string(),
            Field::AdmissionType => self.admission_type.as_str().to_string(),
            Field::DischargeType => self.discharge_type.as_str().to_string(),
            Field::Insurance => self.insurance.as_str().to_string(),
            other => self.text(other).unwrap_or_default().to_string(),
        }
    }

    /// Display label for a field's current value.
    #[must_use]
    pub fn display_value(&self, field: Field) -> String {
        match field {
            Field::Gender => self.gender.label().to_string(),
            Field::AdmissionType => self.admission_type.label().to_string(),
            Field::DischargeType => self.discharge_type.label().to_string(),
            Field::Insurance => self.insurance.label().to_string(),
            other => self.text(other).unwrap_or_default().to_string(),
        }
    }

    /// Store an already-validated value.
    ///
    /// Returns `false` if a choice field was given an unknown option; the
    /// record is left unchanged in that case.
    pub fn set(&mut self, field: Field, value: &str) -> bool {
        match field {
            Field::Gender => Gender::parse(value).map(|v| self.gender = v).is_some(),
            Field::AdmissionType => AdmissionType::parse(value)
                .map(|v| self.admission_type = v)
                .is_some(),
            Field::DischargeType => DischargeLocation::parse(value)
                .map(|v| self.discharge_type = v)
                .is_some(),
            Field::Insurance => Insurance::parse(value).map(|v| self.insurance = v).is_some(),
            other => match self.text_mut(other) {
                Some(buf) => {
                    buf.zeroize();
                    buf.push_str(value);
                    true
                }
                None => false,
            },
        }
    }

    /// Integer interpretation of a text field, 0 when unparseable.
    #[must_use]
    pub fn int(&self, field: Field) -> i64 {
        self.text(field).and_then(parse_int).unwrap_or(0)
    }

    /// Decimal interpretation of a text field, 0.0 when unparseable.
    #[must_use]
    pub fn float(&self, field: Field) -> f64 {
        self.text(field).and_then(parse_float).unwrap_or(0.0)
    }
}

impl Zeroize for AssessmentInput {
    fn zeroize(&mut self) {
        for field in Field::ALL {
            if let Some(buf) = self.text_mut(field) {
                buf.zeroize();
            }
        }
    }
}
