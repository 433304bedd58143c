/// Form relay client
///
/// The relay is a third-party HTTP endpoint that forwards form submissions
/// as email. It accepts a JSON object and answers with `{"success": bool}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ContactFields;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("could not reach the relay: {0}")]
    Transport(String),
    #[error("the relay rejected the message: {0}")]
    Rejected(String),
    #[error("unexpected relay response: {0}")]
    InvalidResponse(String),
}

/// Body posted to the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayPayload {
    pub access_key: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl RelayPayload {
    pub fn new(access_key: &str, fields: &ContactFields) -> Self {
        Self {
            access_key: access_key.to_string(),
            name: fields.name.trim().to_string(),
            email: fields.email.trim().to_string(),
            subject: fields.subject.trim().to_string(),
            message: fields.message.trim().to_string(),
        }
    }
}

/// What the relay answers
#[derive(Debug, Clone, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl RelayResponse {
    /// Branch on the relay's success flag
    pub fn into_result(self) -> Result<(), SubmitError> {
        if self.success {
            Ok(())
        } else {
            Err(SubmitError::Rejected(
                self.message.unwrap_or_else(|| "Server error".to_string()),
            ))
        }
    }
}

/// Interpret a raw relay response body
pub fn parse_response(body: &str) -> Result<(), SubmitError> {
    serde_json::from_str::<RelayResponse>(body)
        .map_err(|e| SubmitError::InvalidResponse(e.to_string()))?
        .into_result()
}

/// HTTP client for the relay endpoint
#[derive(Debug, Clone)]
pub struct RelayClient {
    endpoint: String,
    http: reqwest::Client,
}

impl RelayClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Post the payload and wait for the relay's verdict
    pub async fn submit(self, payload: RelayPayload) -> Result<(), SubmitError> {
        tracing::info!(endpoint = %self.endpoint, "submitting contact form");

        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        // The relay reports failures in the body, sometimes with a non-2xx status
        let body = response
            .text()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success() {
        assert_eq!(parse_response(r#"{"success": true, "message": "Email sent"}"#), Ok(()));
    }

    #[test]
    fn test_parse_failure() {
        assert_eq!(
            parse_response(r#"{"success": false, "message": "Invalid access key"}"#),
            Err(SubmitError::Rejected("Invalid access key".into()))
        );
        assert_eq!(
            parse_response(r#"{"success": false}"#),
            Err(SubmitError::Rejected("Server error".into()))
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_response("<html>502</html>"),
            Err(SubmitError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_payload_shape() {
        let fields = ContactFields {
            name: " Ada ".into(),
            email: "ada@example.com".into(),
            subject: "Commission".into(),
            message: "Hello!\n".into(),
        };
        let payload = RelayPayload::new("key-1", &fields);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["access_key"], "key-1");
        assert_eq!(json["name"], "Ada");
        assert_eq!(json["message"], "Hello!");
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_transport_error() {
        let client = RelayClient::new("http://127.0.0.1:9/submit");
        let payload = RelayPayload::new("key", &ContactFields::default());
        assert!(matches!(
            client.submit(payload).await,
            Err(SubmitError::Transport(_))
        ));
    }
}
