//! Application layer: Use cases and services.
//!
//! This module drives the assessment wizard: it owns session state,
//! validates edits, and schedules predictions through the `RiskPredictor`
//! port on background threads.

mod wizard;
mod worker;

pub use wizard::{
    ApiStatus, SessionInfo, Transition, WizardController, WizardError, API_UNREACHABLE,
};
pub use worker::{PredictionWorker, WorkerEvent};
