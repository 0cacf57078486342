//! Background workers for prediction requests.
//!
//! Each request runs on its own thread and reports back over an `mpsc`
//! channel, so the UI loop never blocks on the network.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use zeroize::Zeroize;

use crate::domain::{AssessmentInput, Prediction, Step};
use crate::ports::{RequestError, RiskPredictor};

/// Messages from workers to the controller.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// Connectivity check finished
    ConnectionChecked { reachable: bool },
    /// A prediction request finished
    Prediction {
        seq: u64,
        step: Step,
        result: Result<Prediction, RequestError>,
    },
}

/// Spawns request threads.
pub struct PredictionWorker;

impl PredictionWorker {
    /// Run one prediction for a snapshot of the record.
    ///
    /// The snapshot is wiped once the request completes.
    pub fn spawn_prediction<P>(
        predictor: Arc<P>,
        seq: u64,
        step: Step,
        mut input: AssessmentInput,
        tx: Sender<WorkerEvent>,
    ) -> JoinHandle<()>
    where
        P: RiskPredictor + 'static,
    {
        thread::spawn(move || {
            let started = Instant::now();
            let result = predictor.predict_risk(step, &input);
            input.zeroize();

            tracing::debug!(
                seq,
                step = step.number(),
                ok = result.is_ok(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Prediction request finished"
            );

            // The receiver is gone when the session was closed meanwhile.
            let _ = tx.send(WorkerEvent::Prediction { seq, step, result });
        })
    }

    /// Run the synthetic connectivity request.
    pub fn spawn_connection_check<P>(predictor: Arc<P>, tx: Sender<WorkerEvent>) -> JoinHandle<()>
    where
        P: RiskPredictor + 'static,
    {
        thread::spawn(move || {
            let reachable = predictor.test_connection();
            let _ = tx.send(WorkerEvent::ConnectionChecked { reachable });
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    struct Fixed;

    impl RiskPredictor for Fixed {
        fn predict_risk(
            &self,
            step: Step,
            _: &AssessmentInput,
        ) -> Result<Prediction, RequestError> {
            Ok(Prediction::new(step.number(), 12.0))
        }
    }

    #[test]
    fn test_prediction_reports_sequence_number() {
        let (tx, rx) = mpsc::channel();
        let input = AssessmentInput::default();
        PredictionWorker::spawn_prediction(Arc::new(Fixed), 7, Step::FIRST, input, tx)
            .join()
            .expect("worker thread");

        match rx.recv_timeout(Duration::from_secs(1)).expect("event") {
            WorkerEvent::Prediction { seq, step, result } => {
                assert_eq!(seq, 7);
                assert_eq!(step, Step::FIRST);
                assert_eq!(result, Ok(Prediction::new(1, 12.0)));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_connection_check_event() {
        let (tx, rx) = mpsc::channel();
        PredictionWorker::spawn_connection_check(Arc::new(Fixed), tx)
            .join()
            .expect("worker thread");
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(1)).expect("event"),
            WorkerEvent::ConnectionChecked { reachable: true }
        ));
    }
}
