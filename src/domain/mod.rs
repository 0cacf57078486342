//! Domain layer: Core assessment types and logic.
//!
//! This module contains pure Rust types with no I/O.
//! Validation is local and synchronous.

mod assessment;
mod field;
pub mod indicators;
mod risk;
pub mod validation;

pub use assessment::{
    parse_float, parse_int, AdmissionType, AssessmentInput, ChoiceOption, DischargeLocation,
    Gender, Insurance,
};
pub use field::{Field, FieldKind, Step};
pub use risk::{format_score, Prediction, RiskLevel};
pub use validation::{validate_field, FieldErrors, Validated};
