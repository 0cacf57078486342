//! Runtime configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `RECURE_API_BASE_URL` | `http://127.0.0.1:5000` |
//! | `RECURE_HTTP_TIMEOUT_SECS` | `10` |
//! | `RECURE_CONNECT_TIMEOUT_SECS` | `5` |
//! | `RECURE_SKIP_CONNECTION_CHECK` | `false` |

use std::time::Duration;

use crate::{RecureError, Result};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the prediction service, without trailing slash.
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Treat the service as reachable without issuing the synthetic request.
    pub skip_connection_check: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            skip_connection_check: false,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `RecureError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let api_base_url = match get("RECURE_API_BASE_URL") {
            Some(raw) => normalize_base_url(&raw)?,
            None => defaults.api_base_url,
        };

        let request_timeout = get("RECURE_HTTP_TIMEOUT_SECS")
            .map(|raw| parse_secs("RECURE_HTTP_TIMEOUT_SECS", &raw))
            .transpose()?
            .unwrap_or(defaults.request_timeout);

        let connect_timeout = get("RECURE_CONNECT_TIMEOUT_SECS")
            .map(|raw| parse_secs("RECURE_CONNECT_TIMEOUT_SECS", &raw))
            .transpose()?
            .unwrap_or(defaults.connect_timeout);

        let skip_connection_check = get("RECURE_SKIP_CONNECTION_CHECK")
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
            .unwrap_or(false);

        Ok(Self {
            api_base_url,
            request_timeout,
            connect_timeout,
            skip_connection_check,
        })
    }

    /// Full URL of the prediction endpoint.
    #[must_use]
    pub fn predict_url(&self) -> String {
        format!("{}/predict-risk", self.api_base_url)
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed)
        .map_err(|e| RecureError::Config(format!("RECURE_API_BASE_URL {trimmed:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RecureError::Config(format!(
            "RECURE_API_BASE_URL must use http or https, got {:?}",
            url.scheme()
        )));
    }
    Ok(trimmed.to_string())
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|&v| v > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            RecureError::Config(format!("{key} must be a positive integer, got {raw:?}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).expect("defaults are valid");
        assert_eq!(config, Config::default());
        assert_eq!(config.predict_url(), "http://127.0.0.1:5000/predict-risk");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("RECURE_API_BASE_URL", "https://risk.example.org/api/"),
            ("RECURE_HTTP_TIMEOUT_SECS", "30"),
            ("RECURE_SKIP_CONNECTION_CHECK", "yes"),
        ]))
        .expect("valid overrides");

        assert_eq!(config.api_base_url, "https://risk.example.org/api");
        assert_eq!(config.predict_url(), "https://risk.example.org/api/predict-risk");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.skip_connection_check);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Config::from_lookup(lookup(&[("RECURE_API_BASE_URL", "not a url")])).is_err());
        assert!(Config::from_lookup(lookup(&[("RECURE_API_BASE_URL", "ftp://host")])).is_err());
        assert!(Config::from_lookup(lookup(&[("RECURE_HTTP_TIMEOUT_SECS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("RECURE_CONNECT_TIMEOUT_SECS", "soon")])).is_err());
    }
}
