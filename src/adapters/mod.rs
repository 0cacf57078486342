//! Adapters layer: Concrete implementations of ports.
//!
//! - `http`: reqwest client for the remote prediction service
//! - `sanitize`: clinical-value and credential filtering for logs

pub mod http;
pub mod sanitize;

pub use http::{ApiInputs, HttpRiskClient, PredictRequest};
