//! HTTP adapter for the remote prediction service.
//!
//! Translates the assessment record into the service's request shape
//! (`POST {base}/predict-risk`) and the service's answers back into
//! [`Prediction`] or [`RequestError`].

use std::time::Instant;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::domain::{AssessmentInput, ChoiceOption, Field, Prediction, Step};
use crate::ports::{RequestError, RiskPredictor};

/// Model inputs as the prediction service names and types them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInputs {
    pub age: i64,
    pub gender: String,
    pub admission_type: String,
    pub total_diagnoses: i64,
    pub no_prev_adm: i64,
    pub length_of_stay: i64,
    pub days_since_last_adm: i64,
    pub total_procedures: i64,
    pub total_lab_tests: i64,
    pub unique_lab_tests: i64,
    pub drg_mortality: f64,
    pub drg_severity: f64,
    pub discharge_location: String,
    pub insurance: String,
}

impl ApiInputs {
    /// Map form values onto the wire shape. Unparseable numbers become 0.
    #[must_use]
    pub fn from_input(input: &AssessmentInput) -> Self {
        Self {
            age: input.int(Field::Age),
            gender: input.gender.as_str().to_string(),
            admission_type: input.admission_type.as_str().to_string(),
            total_diagnoses: input.int(Field::TotalDiagnoses),
            no_prev_adm: input.int(Field::NumberOfPreviousAdmissions),
            length_of_stay: input.int(Field::LengthOfStay),
            days_since_last_adm: input.int(Field::DaysSinceLastAdmission),
            total_procedures: input.int(Field::TotalProcedures),
            total_lab_tests: input.int(Field::TotalLabTests),
            unique_lab_tests: input.int(Field::UniqueLabTests),
            drg_mortality: input.float(Field::DrgMortalityRisk),
            drg_severity: input.float(Field::DrgSeverity),
            discharge_location: input.discharge_type.as_str().to_string(),
            insurance: input.insurance.as_str().to_string(),
        }
    }
}

/// Request body for `/predict-risk`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub step: u8,
    pub inputs: ApiInputs,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    step: Option<u8>,
    risk_score: f64,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    suggestion: Option<String>,
}

/// Interpret a response from the prediction service.
///
/// # Errors
/// `RequestError::Status` for non-2xx statuses, `RequestError::Decode` for a
/// success body that is not a prediction.
pub fn decode_response(
    requested: Step,
    status: u16,
    body: &str,
) -> Result<Prediction, RequestError> {
    if !(200..300).contains(&status) {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        return Err(RequestError::status(status, parsed.error, parsed.suggestion));
    }

    let parsed: PredictResponse =
        serde_json::from_str(body).map_err(|e| RequestError::Decode(e.to_string()))?;
    if !parsed.risk_score.is_finite() {
        return Err(RequestError::Decode("risk_score is not a number".to_string()));
    }

    Ok(Prediction::new(
        parsed.step.unwrap_or(requested.number()),
        parsed.risk_score,
    ))
}

/// Blocking HTTP client for the prediction service.
#[derive(Debug, Clone)]
pub struct HttpRiskClient {
    client: Client,
    url: String,
}

impl HttpRiskClient {
    /// Build a client for the endpoint described by `config`.
    ///
    /// # Errors
    /// Returns error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &Config) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("recure/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: config.predict_url(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RiskPredictor for HttpRiskClient {
    fn predict_risk(
        &self,
        step: Step,
        input: &AssessmentInput,
    ) -> Result<Prediction, RequestError> {
        let body = PredictRequest {
            step: step.number(),
            inputs: ApiInputs::from_input(input),
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .map_err(|e| {
                tracing::error!("Risk assessment API error: {}", e);
                RequestError::Transport(e.to_string())
            })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        tracing::debug!(
            step = step.number(),
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Prediction response received"
        );

        let result = decode_response(step, status, &text);
        if let Err(e) = &result {
            tracing::error!("Risk assessment API error: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AdmissionType, FieldKind, Insurance};
    use std::collections::BTreeSet;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Accept one connection, answer it, and hand back the request body.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let request_body = read_request_body(&mut stream);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).expect("write response");
            request_body
        });

        (format!("http://{addr}"), handle)
    }

    fn read_request_body(stream: &mut std::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).expect("read request");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let len = headers
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + len {
                    return String::from_utf8_lossy(&buf[end + 4..end + 4 + len]).to_string();
                }
            }
        }
        String::new()
    }

    fn client_for(base: &str) -> HttpRiskClient {
        let config = Config {
            api_base_url: base.to_string(),
            ..Config::default()
        };
        HttpRiskClient::new(&config).expect("client builds")
    }

    #[test]
    fn test_mapping_parses_numbers() {
        let mut input = AssessmentInput::sample();
        input.total_procedures = "lots".to_string();
        input.age = "70 years".to_string();

        let mapped = ApiInputs::from_input(&input);
        assert_eq!(mapped.age, 70);
        assert_eq!(mapped.total_procedures, 0);
        assert_eq!(mapped.no_prev_adm, 2);
        assert!((mapped.drg_mortality - 0.8).abs() < f64::EPSILON);
        assert!((mapped.drg_severity - 2.5).abs() < f64::EPSILON);
        assert_eq!(mapped.admission_type, AdmissionType::Emergency.as_str());
        assert_eq!(mapped.insurance, Insurance::Medicare.as_str());
    }

    #[test]
    fn test_mapped_payload_has_no_numeric_strings() {
        let body = PredictRequest {
            step: 3,
            inputs: ApiInputs::from_input(&AssessmentInput::default()),
        };
        let json = serde_json::to_value(&body).expect("serializes");
        let inputs = json["inputs"].as_object().expect("inputs object");

        assert_eq!(inputs.len(), 14);
        let numeric = Field::ALL.into_iter().filter(|f| f.kind() != FieldKind::Choice);
        for key in numeric.map(Field::wire_name) {
            assert!(inputs[key].is_number(), "{key} should be a number");
            assert_eq!(inputs[key].as_f64(), Some(0.0), "{key} should default to 0");
        }
        assert_eq!(inputs["gender"], "M");
        assert_eq!(inputs["discharge_location"], "Home");
        assert_eq!(json["step"], 3);
    }

    #[test]
    fn test_payload_keys_match_field_wire_names() {
        let json = serde_json::to_value(ApiInputs::from_input(&AssessmentInput::sample()))
            .expect("serializes");
        let keys: BTreeSet<&str> = json
            .as_object()
            .expect("inputs object")
            .keys()
            .map(String::as_str)
            .collect();
        let expected: BTreeSet<&str> = Field::ALL.into_iter().map(Field::wire_name).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_decode_success() {
        let p = decode_response(Step::LAST, 200, r#"{"step": 5, "risk_score": 42.3}"#)
            .expect("decodes");
        assert_eq!(p, Prediction::new(5, 42.3));

        let p = decode_response(Step::FIRST, 200, r#"{"risk_score": 12.5}"#).expect("decodes");
        assert_eq!(p.step, 1);
    }

    #[test]
    fn test_decode_errors() {
        let err = decode_response(
            Step::FIRST,
            500,
            r#"{"error": "Model not loaded.", "suggestion": "Upgrade"}"#,
        )
        .expect_err("status error");
        assert_eq!(err.to_string(), "Model not loaded.");
        assert!(matches!(
            err,
            RequestError::Status { status: 500, suggestion: Some(_), .. }
        ));

        let err = decode_response(Step::FIRST, 404, "<html>nope</html>").expect_err("status error");
        assert_eq!(err.to_string(), "HTTP error! status: 404");

        let err = decode_response(Step::FIRST, 200, r#"{"score": 1}"#).expect_err("decode error");
        assert!(matches!(err, RequestError::Decode(_)));
    }

    #[test]
    fn test_predict_risk_over_http() {
        let (base, server) = serve_once("200 OK", r#"{"step": 2, "risk_score": 18.75}"#);
        let client = client_for(&base);

        let mut input = AssessmentInput::default();
        input.age = "65".to_string();
        input.number_of_previous_admissions = "3".to_string();

        let prediction = client
            .predict_risk(Step::new(2).expect("valid step"), &input)
            .expect("prediction succeeds");
        assert_eq!(prediction, Prediction::new(2, 18.75));

        let sent: PredictRequest =
            serde_json::from_str(&server.join().expect("server thread")).expect("json body");
        assert_eq!(sent.step, 2);
        assert_eq!(sent.inputs.age, 65);
        assert_eq!(sent.inputs.no_prev_adm, 3);
    }

    #[test]
    fn test_predict_risk_surfaces_server_error() {
        let (base, server) = serve_once(
            "500 Internal Server Error",
            r#"{"error": "Model not loaded. Please check scikit-learn version compatibility."}"#,
        );
        let client = client_for(&base);

        let err = client
            .predict_risk(Step::FIRST, &AssessmentInput::default())
            .expect_err("server error");
        assert_eq!(
            err.to_string(),
            "Model not loaded. Please check scikit-learn version compatibility."
        );
        server.join().expect("server thread");
    }

    #[test]
    fn test_connection_check_against_closed_port() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let client = client_for(&format!("http://{addr}"));
        assert!(!client.test_connection());
    }
}
