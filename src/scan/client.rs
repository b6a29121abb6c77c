/// Recognition service client
///
/// This module sends one label photo to the remote recognition endpoint
/// and classifies the outcome. The four failure kinds stay distinguishable
/// all the way up to the orchestrator; flattening to a user-facing message
/// happens only at the display edge, after the kind has been logged.

use std::time::Duration;

use reqwest::multipart;
use serde::Deserialize;
use thiserror::Error;

use crate::state::data::Candidate;

/// Default recognition endpoint (the bundled backend listens on 8888)
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8888/api/recognize";

/// Environment variable overriding the recognition endpoint
pub const ENDPOINT_ENV: &str = "WHISKY_SCANNER_ENDPOINT";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Generic user-facing message for transport-level failures
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to process image. Please try again.";

/// Fallback when the service reports failure without giving a reason
const DEFAULT_LOGICAL_MESSAGE: &str = "Recognition failed";

/// Classified recognition failure
///
/// The four kinds are distinct by contract and must not be collapsed:
/// callers log `kind()` and the full error to the diagnostic sink, then
/// surface `user_message()` in the UI.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecognitionError {
    /// Service reachable but replied with a non-success HTTP status
    #[error("recognition service returned HTTP {status}: {body}")]
    Service { status: u16, body: String },

    /// Request was sent but no response came back (timeout, connect failure)
    #[error("no response from recognition service: {0}")]
    NoResponse(String),

    /// The request could not be constructed in the first place
    #[error("failed to build recognition request: {0}")]
    RequestSetup(String),

    /// Service executed but found no valid result (payload success=false)
    #[error("recognition failed: {0}")]
    Logical(String),
}

impl RecognitionError {
    /// Stable label for the diagnostic sink
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Service { .. } => "service_error",
            Self::NoResponse(_) => "no_response",
            Self::RequestSetup(_) => "request_setup_error",
            Self::Logical(_) => "logical_failure",
        }
    }

    /// Message suitable for the error surface in the UI.
    ///
    /// Logical failures carry a human-readable reason from the service
    /// and are shown verbatim; everything else flattens to a generic
    /// "try again" message. The classified detail is never lost — it is
    /// logged where the error is applied to the session.
    pub fn user_message(&self) -> String {
        match self {
            Self::Logical(message) => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Wire format of the recognition response
#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    success: bool,
    #[serde(default)]
    results: Option<Vec<Candidate>>,
    #[serde(default)]
    error: Option<String>,
}

/// Map a parsed response payload to the classified outcome.
///
/// `success=false` is a logical failure carrying the service message;
/// `success=true` with no `results` field counts as an empty result set.
/// Candidate order is kept exactly as received.
fn classify_response(response: RecognitionResponse) -> Result<Vec<Candidate>, RecognitionError> {
    if !response.success {
        let message = response
            .error
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_LOGICAL_MESSAGE.to_string());
        return Err(RecognitionError::Logical(message));
    }

    Ok(response.results.unwrap_or_default())
}

/// HTTP client for the recognition backend
#[derive(Debug, Clone)]
pub struct RecognitionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RecognitionClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, RecognitionError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RecognitionError::RequestSetup(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Build a client for the endpoint configured in the environment,
    /// falling back to the bundled backend's default address.
    pub fn from_env() -> Result<Self, RecognitionError> {
        let endpoint =
            std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::new(endpoint)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one label photo for recognition.
    ///
    /// The image goes up as multipart/form-data under the single part
    /// name `image`, raw bytes, original filename preserved.
    pub async fn recognize(
        &self,
        image: Vec<u8>,
        filename: String,
    ) -> Result<Vec<Candidate>, RecognitionError> {
        tracing::debug!(
            bytes = image.len(),
            filename = %filename,
            endpoint = %self.endpoint,
            "Sending label photo for recognition"
        );

        let part = multipart::Part::bytes(image).file_name(filename);
        let form = multipart::Form::new().part("image", part);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    RecognitionError::RequestSetup(e.to_string())
                } else {
                    RecognitionError::NoResponse(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecognitionError::Service {
                status: status.as_u16(),
                body,
            });
        }

        // A 2xx body that is not the expected JSON yields no valid result:
        // same terminal state as the service saying success=false.
        let payload: RecognitionResponse = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Recognition response was not valid JSON");
                return Err(RecognitionError::Logical(DEFAULT_LOGICAL_MESSAGE.to_string()));
            }
        };

        let candidates = classify_response(payload)?;

        tracing::info!(
            candidates = candidates.len(),
            "Recognition succeeded"
        );

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RecognitionResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_logical_failure_carries_service_message() {
        let outcome = classify_response(parse(r#"{"success": false, "error": "not found"}"#));
        assert_eq!(
            outcome,
            Err(RecognitionError::Logical("not found".to_string()))
        );
    }

    #[test]
    fn test_logical_failure_without_message_uses_default() {
        let outcome = classify_response(parse(r#"{"success": false}"#));
        assert_eq!(
            outcome,
            Err(RecognitionError::Logical(DEFAULT_LOGICAL_MESSAGE.to_string()))
        );
    }

    #[test]
    fn test_empty_results_is_success_not_failure() {
        let outcome = classify_response(parse(r#"{"success": true, "results": []}"#));
        assert_eq!(outcome, Ok(vec![]));

        // Omitted results field counts the same as an empty list
        let outcome = classify_response(parse(r#"{"success": true}"#));
        assert_eq!(outcome, Ok(vec![]));
    }

    #[test]
    fn test_result_order_preserved_as_received() {
        let json = r#"{"success": true, "results": [
            {"name": "B", "type": "Blend", "abv": 40, "size_ml": 700, "msrp": 30, "confidence": 0.4},
            {"name": "A", "type": "Single Malt", "abv": 46, "size_ml": 700, "msrp": 60, "confidence": 0.9}
        ]}"#;

        let candidates = classify_response(parse(json)).unwrap();
        // Lower-confidence entry first: kept exactly as the service sent it
        assert_eq!(candidates[0].name, "B");
        assert_eq!(candidates[1].name, "A");
    }

    #[test]
    fn test_failure_kinds_stay_distinguishable() {
        let kinds = [
            RecognitionError::Service { status: 500, body: String::new() }.kind(),
            RecognitionError::NoResponse("refused".to_string()).kind(),
            RecognitionError::RequestSetup("bad url".to_string()).kind(),
            RecognitionError::Logical("no match".to_string()).kind(),
        ];

        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_user_message_flattens_transport_errors_only() {
        let service = RecognitionError::Service { status: 502, body: "bad gateway".to_string() };
        assert_eq!(service.user_message(), GENERIC_FAILURE_MESSAGE);

        let logical = RecognitionError::Logical("not found".to_string());
        assert_eq!(logical.user_message(), "not found");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_classified_as_no_response() {
        // Nothing listens on the discard port; the connect attempt fails
        let client = RecognitionClient::new("http://127.0.0.1:9/api/recognize").unwrap();
        let outcome = client.recognize(vec![0u8; 4], "label.jpg".to_string()).await;

        match outcome {
            Err(RecognitionError::NoResponse(_)) => {}
            other => panic!("expected NoResponse, got {:?}", other),
        }
    }
}
