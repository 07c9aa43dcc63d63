use std::time::Duration;

use anyhow::Context;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::AppConfig;
use crate::result_view::RawCalculationResult;
use crate::validation::MatchInput;

pub const GENERIC_FAILURE: &str = "Error calculating NRR";
const USER_AGENT: &str = concat!("nrr_terminal/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Non-2xx response carrying an `error` message.
    Service,
    /// Non-2xx response without a usable message.
    Status,
    Transport,
    Timeout,
    /// 2xx response whose body is not a calculation result.
    Decode,
}

/// A failed call to the calculation service. `message` is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteFailure {
    pub kind: FailureKind,
    pub status: Option<u16>,
    pub message: String,
}

impl RemoteFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status.as_u16());
        self
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Picks the message for a non-success response: the service's `error`
/// field, then the transport's status text, then a generic fallback.
pub fn failure_message(body: &str, transport: Option<&str>) -> (FailureKind, String) {
    let service = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    if let Some(msg) = service {
        return (FailureKind::Service, msg);
    }
    match transport.map(str::trim).filter(|t| !t.is_empty()) {
        Some(msg) => (FailureKind::Status, msg.to_string()),
        None => (FailureKind::Status, GENERIC_FAILURE.to_string()),
    }
}

/// Client for the remote NRR calculation service.
#[derive(Debug, Clone)]
pub struct CalcClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl CalcClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/calculate", base_url.trim().trim_end_matches('/')),
            timeout,
        })
    }

    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        Self::new(&cfg.api_url, cfg.timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one request. No retry.
    pub fn calculate(&self, input: &MatchInput) -> Result<RawCalculationResult, RemoteFailure> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(input)
            .send()
            .map_err(|err| self.transport_failure(err))?;

        let status = resp.status();
        if !status.is_success() {
            let transport = resp
                .error_for_status_ref()
                .err()
                .map(|err| err.without_url().to_string());
            let body = resp.text().unwrap_or_default();
            let (kind, message) = failure_message(&body, transport.as_deref());
            return Err(RemoteFailure::new(kind, message).with_status(status));
        }

        let body = resp.text().map_err(|err| self.transport_failure(err))?;
        serde_json::from_str::<RawCalculationResult>(&body).map_err(|err| {
            RemoteFailure::new(FailureKind::Decode, format!("invalid response from service: {err}"))
                .with_status(status)
        })
    }

    fn transport_failure(&self, err: reqwest::Error) -> RemoteFailure {
        if err.is_timeout() {
            return RemoteFailure::new(
                FailureKind::Timeout,
                format!("request timed out after {}s", self.timeout.as_secs()),
            );
        }
        let text = err.without_url().to_string();
        if text.trim().is_empty() {
            RemoteFailure::new(FailureKind::Transport, GENERIC_FAILURE)
        } else {
            RemoteFailure::new(FailureKind::Transport, text)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{CalcClient, FailureKind, GENERIC_FAILURE, failure_message};

    #[test]
    fn endpoint_ignores_trailing_slash_and_whitespace() {
        let client = CalcClient::new(" http://calc.local:8080/ ", Duration::from_secs(3))
            .expect("client builds");
        assert_eq!(client.endpoint(), "http://calc.local:8080/calculate");
        assert_eq!(client.timeout, Duration::from_secs(3));
    }

    #[test]
    fn service_error_field_wins() {
        let (kind, msg) = failure_message(r#"{"error":"service unavailable"}"#, Some("HTTP 503"));
        assert_eq!(kind, FailureKind::Service);
        assert_eq!(msg, "service unavailable");
    }

    #[test]
    fn blank_service_error_falls_back_to_transport_text() {
        let (kind, msg) = failure_message(r#"{"error":"  "}"#, Some("HTTP status 500"));
        assert_eq!(kind, FailureKind::Status);
        assert_eq!(msg, "HTTP status 500");
    }

    #[test]
    fn non_json_body_without_transport_text_is_generic() {
        let (_, msg) = failure_message("<html>oops</html>", None);
        assert_eq!(msg, GENERIC_FAILURE);
    }
}
