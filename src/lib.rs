//! # Recure
//!
//! Heart-failure 30-day readmission risk assessment.
//!
//! This crate provides:
//! - A five-step assessment wizard with per-field validation
//! - A client for the remote risk prediction service
//! - Terminal UI for clinicians
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (assessment record, fields, risk levels, validators)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (reqwest client, log sanitizer)
//! - `application`: Wizard controller and request workers
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use application::{WizardController, WizardError};
pub use config::Config;
pub use domain::{AssessmentInput, Field, Prediction, RiskLevel, Step};
pub use ports::{RequestError, RiskPredictor};

/// Result type for Recure operations
pub type Result<T> = std::result::Result<T, RecureError>;

/// Main error type for Recure
#[derive(Debug, thiserror::Error)]
pub enum RecureError {
    #[error("Risk prediction failed: {0}")]
    Request(#[from] RequestError),

    #[error("Wizard operation rejected: {0}")]
    Wizard(#[from] WizardError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
