//! Wizard controller: state machine behind the assessment form.
//!
//! Owns:
//! - The active step (1..=5) and the terminal "complete" flag
//! - The assessment record and per-field validation messages
//! - The last risk score and API connectivity / error state
//!
//! Every accepted edit issues a prediction for the current step when the
//! service is reachable. Requests carry a sequence number and only the answer
//! to the most recent one is applied; older answers are dropped. `next` and
//! `complete` park the transition until that answer arrives.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use zeroize::Zeroize;

use crate::domain::validation::dependents;
use crate::domain::{
    validate_field, AssessmentInput, ChoiceOption, Field, FieldErrors, FieldKind, Prediction,
    RiskLevel, Step,
};
use crate::ports::RiskPredictor;

use super::worker::{PredictionWorker, WorkerEvent};

/// Banner shown when the connectivity check fails.
pub const API_UNREACHABLE: &str =
    "Unable to connect to risk assessment API. Please ensure the backend server is running.";

/// Reachability of the prediction service for this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    /// Connectivity check in flight
    Checking,
    Connected,
    Unreachable,
}

/// A step change waiting on a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Next,
    Complete,
}

/// Rejected controller operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Assessment is complete; start a new one to make changes")]
    AssessmentComplete,

    #[error("Waiting for the risk service before changing step")]
    TransitionPending,

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Already at the last step")]
    AtLastStep,

    #[error("Assessment can only be completed from step {}", Step::COUNT)]
    NotAtFinalStep,
}

/// Metadata for one open-to-close assessment.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// Random identifier used to correlate log lines
    pub id: String,
    pub opened_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Prediction requests issued (connectivity check excluded)
    pub requests_issued: u64,
}

impl SessionInfo {
    fn new() -> Self {
        Self {
            id: session_id(),
            opened_at: Utc::now(),
            completed_at: None,
            requests_issued: 0,
        }
    }
}

/// Controller for one assessment session.
pub struct WizardController<P>
where
    P: RiskPredictor + 'static,
{
    predictor: Arc<P>,
    skip_connection_check: bool,

    tx: Sender<WorkerEvent>,
    rx: Receiver<WorkerEvent>,

    session: SessionInfo,
    step: Step,
    input: AssessmentInput,
    errors: FieldErrors,
    /// Text last typed into each field, used when a dependent is re-checked
    entered: BTreeMap<Field, String>,

    risk_score: f64,
    last_prediction: Option<Prediction>,
    api_status: ApiStatus,
    api_error: Option<String>,

    /// Sequence number of the most recently issued request
    last_seq: u64,
    /// Set while the most recent request is unanswered
    awaiting: Option<u64>,
    pending: Option<Transition>,
    complete: bool,
}

impl<P> WizardController<P>
where
    P: RiskPredictor + 'static,
{
    /// Open a session and start the connectivity check.
    ///
    /// With `skip_connection_check` the service is assumed reachable.
    pub fn open(predictor: Arc<P>, skip_connection_check: bool) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut controller = Self {
            predictor,
            skip_connection_check,
            tx,
            rx,
            session: SessionInfo::new(),
            step: Step::FIRST,
            input: AssessmentInput::default(),
            errors: FieldErrors::new(),
            entered: BTreeMap::new(),
            risk_score: 0.0,
            last_prediction: None,
            api_status: ApiStatus::Checking,
            api_error: None,
            last_seq: 0,
            awaiting: None,
            pending: None,
            complete: false,
        };
        controller.start_connection_check();
        controller
    }

    /// Close the session and open a fresh one.
    ///
    /// Answers to requests from the old session are never applied.
    pub fn reset(&mut self) {
        self.close();

        let (tx, rx) = mpsc::channel();
        self.tx = tx;
        self.rx = rx;
        self.session = SessionInfo::new();
        self.step = Step::FIRST;
        self.input = AssessmentInput::default();
        self.risk_score = 0.0;
        self.last_prediction = None;
        self.api_error = None;
        self.awaiting = None;
        self.pending = None;
        self.complete = false;

        self.start_connection_check();
    }

    /// Wipe the clinical inputs held by this session.
    pub fn close(&mut self) {
        self.wipe_inputs();
        tracing::info!(
            session = %self.session.id,
            requests = self.session.requests_issued,
            "Assessment session closed"
        );
    }

    fn start_connection_check(&mut self) {
        tracing::info!(session = %self.session.id, "Assessment session opened");
        if self.skip_connection_check {
            self.api_status = ApiStatus::Connected;
            return;
        }
        self.api_status = ApiStatus::Checking;
        PredictionWorker::spawn_connection_check(Arc::clone(&self.predictor), self.tx.clone());
    }

    // === Accessors ===

    #[must_use]
    pub fn step(&self) -> Step {
        self.step
    }

    #[must_use]
    pub fn input(&self) -> &AssessmentInput {
        &self.input
    }

    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[must_use]
    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn risk_score(&self) -> f64 {
        self.risk_score
    }

    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }

    #[must_use]
    pub fn last_prediction(&self) -> Option<Prediction> {
        self.last_prediction
    }

    #[must_use]
    pub fn api_status(&self) -> ApiStatus {
        self.api_status
    }

    #[must_use]
    pub fn is_api_connected(&self) -> bool {
        self.api_status == ApiStatus::Connected
    }

    #[must_use]
    pub fn api_error(&self) -> Option<&str> {
        self.api_error.as_deref()
    }

    /// Whether the latest prediction is still outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.awaiting.is_some()
    }

    #[must_use]
    pub fn pending_transition(&self) -> Option<Transition> {
        self.pending
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    #[must_use]
    pub fn session(&self) -> &SessionInfo {
        &self.session
    }

    // === Edits ===

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.complete {
            return Err(WizardError::AssessmentComplete);
        }
        if self.pending.is_some() {
            return Err(WizardError::TransitionPending);
        }
        Ok(())
    }

    /// Validate and store a new raw value for `field`.
    ///
    /// Fields that depend on `field` are re-validated against the new value.
    ///
    /// # Errors
    /// Returns error if the assessment is complete or a step change is pending.
    pub fn edit(&mut self, field: Field, raw: &str) -> Result<(), WizardError> {
        self.ensure_editable()?;

        self.apply_validated(field, raw);
        self.entered.insert(field, raw.to_string());
        for &dependent in dependents(field) {
            // Re-checked from the text last typed, never from an earlier clamp.
            let typed = match self.entered.get(&dependent) {
                Some(text) => text.clone(),
                None => self.input.value(dependent),
            };
            if !typed.is_empty() {
                self.apply_validated(dependent, &typed);
            }
        }

        tracing::debug!(session = %self.session.id, field = ?field, "Field edited");

        if self.is_api_connected() {
            self.dispatch_prediction();
        }
        Ok(())
    }

    fn wipe_inputs(&mut self) {
        self.input.zeroize();
        for text in self.entered.values_mut() {
            text.zeroize();
        }
        self.entered.clear();
        self.errors.clear();
    }

    fn apply_validated(&mut self, field: Field, raw: &str) {
        let validated = validate_field(field, raw, &self.input);
        self.input.set(field, &validated.value);
        match validated.error {
            Some(message) => {
                self.errors.insert(field, message);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }

    /// Move a choice to its neighbouring option or a scale by one point.
    ///
    /// Numeric text fields are left untouched.
    ///
    /// # Errors
    /// Same as [`Self::edit`].
    pub fn step_value(&mut self, field: Field, forward: bool) -> Result<(), WizardError> {
        let next = match field {
            Field::Gender => self.input.gender.cycled(forward).as_str().to_string(),
            Field::AdmissionType => self.input.admission_type.cycled(forward).as_str().to_string(),
            Field::DischargeType => self.input.discharge_type.cycled(forward).as_str().to_string(),
            Field::Insurance => self.input.insurance.cycled(forward).as_str().to_string(),
            f if f.kind() == FieldKind::Scale => {
                let current = self.input.float(f).round() as i64;
                let delta = if forward { 1 } else { -1 };
                (current + delta).clamp(0, 4).to_string()
            }
            _ => return self.ensure_editable(),
        };
        self.edit(field, &next)
    }

    /// Replace the record with the built-in sample patient.
    ///
    /// # Errors
    /// Same as [`Self::edit`].
    pub fn load_sample(&mut self) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.wipe_inputs();
        self.input = AssessmentInput::sample();
        if self.is_api_connected() {
            self.dispatch_prediction();
        }
        Ok(())
    }

    // === Navigation ===

    /// Advance one step once the current record has been scored.
    ///
    /// # Errors
    /// Returns error at the last step, after completion, or while another
    /// transition is pending.
    pub fn next(&mut self) -> Result<(), WizardError> {
        self.ensure_editable()?;
        if self.step.is_last() {
            return Err(WizardError::AtLastStep);
        }
        self.begin_transition(Transition::Next);
        Ok(())
    }

    /// Go back one step. No request is issued.
    ///
    /// # Errors
    /// Returns error at the first step, after completion, or while a
    /// transition is pending.
    pub fn previous(&mut self) -> Result<(), WizardError> {
        self.ensure_editable()?;
        let prev = self.step.prev().ok_or(WizardError::AtFirstStep)?;
        self.step = prev;
        Ok(())
    }

    /// Request the final score and finish the assessment.
    ///
    /// # Errors
    /// Returns error before the last step, after completion, or while a
    /// transition is pending.
    pub fn complete(&mut self) -> Result<(), WizardError> {
        self.ensure_editable()?;
        if !self.step.is_last() {
            return Err(WizardError::NotAtFinalStep);
        }
        self.begin_transition(Transition::Complete);
        Ok(())
    }

    /// `next` before the last step, `complete` on it.
    ///
    /// # Errors
    /// Same as [`Self::next`] and [`Self::complete`].
    pub fn advance(&mut self) -> Result<(), WizardError> {
        if self.step.is_last() {
            self.complete()
        } else {
            self.next()
        }
    }

    fn begin_transition(&mut self, transition: Transition) {
        if self.is_api_connected() {
            self.dispatch_prediction();
            self.pending = Some(transition);
        } else {
            self.apply_transition(transition);
        }
    }

    fn apply_transition(&mut self, transition: Transition) {
        match transition {
            Transition::Next => {
                if let Some(next) = self.step.next() {
                    self.step = next;
                }
            }
            Transition::Complete => {
                self.complete = true;
                self.session.completed_at = Some(Utc::now());
                self.wipe_inputs();
                tracing::info!(
                    session = %self.session.id,
                    risk = %self.risk_level(),
                    "Assessment complete"
                );
            }
        }
    }

    // === Requests ===

    fn dispatch_prediction(&mut self) {
        self.last_seq += 1;
        let seq = self.last_seq;
        self.awaiting = Some(seq);
        self.api_error = None;
        self.session.requests_issued += 1;

        PredictionWorker::spawn_prediction(
            Arc::clone(&self.predictor),
            seq,
            self.step,
            self.input.clone(),
            self.tx.clone(),
        );
    }

    /// Apply all worker results that have arrived. Returns `true` if state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.rx.try_recv() {
            changed |= self.handle_event(event);
        }
        changed
    }

    /// Block until the connectivity check and the latest request are resolved.
    ///
    /// Returns `false` if `timeout` elapsed first.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.poll();
            if !self.is_busy() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(event) => {
                    self.handle_event(event);
                }
                Err(RecvTimeoutError::Timeout) => return !self.is_busy(),
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
    }

    fn is_busy(&self) -> bool {
        self.api_status == ApiStatus::Checking || self.awaiting.is_some()
    }

    fn handle_event(&mut self, event: WorkerEvent) -> bool {
        match event {
            WorkerEvent::ConnectionChecked { reachable } => {
                if reachable {
                    self.api_status = ApiStatus::Connected;
                    tracing::info!(session = %self.session.id, "Risk service reachable");
                } else {
                    self.api_status = ApiStatus::Unreachable;
                    self.api_error = Some(API_UNREACHABLE.to_string());
                    tracing::warn!(session = %self.session.id, "Risk service unreachable");
                }
                true
            }
            WorkerEvent::Prediction { seq, step, result } => {
                if self.awaiting != Some(seq) {
                    tracing::debug!(seq, latest = self.last_seq, "Discarding stale prediction");
                    return false;
                }
                self.awaiting = None;

                match result {
                    Ok(prediction) => {
                        self.risk_score = prediction.risk_score;
                        self.last_prediction = Some(prediction);
                        tracing::info!(
                            session = %self.session.id,
                            step = step.number(),
                            risk = %prediction.risk_level(),
                            "Risk score updated"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            session = %self.session.id,
                            step = step.number(),
                            "Risk prediction failed: {}",
                            e
                        );
                        self.api_error = Some(e.to_string());
                    }
                }

                if let Some(transition) = self.pending.take() {
                    self.apply_transition(transition);
                }
                true
            }
        }
    }
}

impl<P> Drop for WizardController<P>
where
    P: RiskPredictor + 'static,
{
    fn drop(&mut self) {
        self.wipe_inputs();
    }
}

/// Generate a random session identifier using a CSPRNG.
fn session_id() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 8] = rng.gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
