//! The upload/response exchange with the extraction service.
//!
//! [`Extractor`] is the seam between the controller and the network:
//! [`HttpExtractor`] is the production implementation, tests substitute a
//! scripted one. Response interpretation lives in [`parse_response`] so it
//! can be tested without a server.
//!
//! ## Response contract
//!
//! | Status | Body | Outcome |
//! |--------|------|---------|
//! | 2xx | `{ "data": { … } }` | `Ok(ExtractionResult)` |
//! | 2xx | `{ "error": "msg" }` | `Application("msg")` |
//! | 2xx | anything else | `InvalidResponse` |
//! | other | `{ "error": "msg" }` | `Application("msg")` |
//! | other | anything else | `Application("Failed to process invoice")` |

use crate::config::ClientConfig;
use crate::error::ExtractError;
use crate::file::SelectedFile;
use crate::output::ExtractionResult;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Message used when a failed response carries no usable `error` text.
pub const GENERIC_FAILURE: &str = "Failed to process invoice";

/// Performs one upload of a file and returns the parsed result.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, file: &SelectedFile) -> Result<ExtractionResult, ExtractError>;

    /// Where uploads go; used in log lines and error messages.
    fn endpoint(&self) -> &str;
}

/// Convenience alias for the type held by the controller.
pub type SharedExtractor = Arc<dyn Extractor>;

/// Uploads files as multipart form data over HTTP.
#[derive(Debug, Clone)]
pub struct HttpExtractor {
    client: reqwest::Client,
    endpoint: String,
    field_name: String,
}

impl HttpExtractor {
    pub fn new(config: &ClientConfig) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("invoice-extract/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExtractError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self::with_client(client, config))
    }

    /// Use a pre-built `reqwest::Client` (proxies, custom TLS roots, …).
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            field_name: config.field_name.clone(),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> ExtractError {
        ExtractError::Transport {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl Extractor for HttpExtractor {
    async fn extract(&self, file: &SelectedFile) -> Result<ExtractionResult, ExtractError> {
        let bytes = file.read_bytes().await?;
        let mut part = Part::bytes(bytes).file_name(file.name().to_string());
        if !file.mime().is_empty() {
            part = part
                .mime_str(file.mime())
                .map_err(|_| ExtractError::UnsupportedType {
                    name: file.name().to_string(),
                    mime: file.mime().to_string(),
                })?;
        }
        let form = Form::new().part(self.field_name.clone(), part);

        info!("Uploading '{}' to {}", file.name(), self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        debug!("Response: HTTP {} ({} bytes)", status, body.len());

        parse_response(status.as_u16(), &body)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Interpret an HTTP status and body per the response contract.
pub fn parse_response(status: u16, body: &[u8]) -> Result<ExtractionResult, ExtractError> {
    let success = (200..300).contains(&status);
    let json: Option<Value> = serde_json::from_slice(body).ok();

    let error_message = json
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(error_text);

    if !success {
        let message = error_message.unwrap_or_else(|| GENERIC_FAILURE.to_string());
        warn!("Extraction failed with HTTP {}: {}", status, message);
        return Err(ExtractError::Application {
            status: Some(status),
            message,
        });
    }

    let Some(json) = json else {
        return Err(ExtractError::InvalidResponse {
            reason: "body is not valid JSON".into(),
        });
    };
    if let Some(message) = error_message {
        warn!("Extraction reported an error with HTTP {}: {}", status, message);
        return Err(ExtractError::Application {
            status: Some(status),
            message,
        });
    }

    match json {
        Value::Object(mut root) => match root.remove("data") {
            Some(Value::Object(data)) => Ok(ExtractionResult::from_object(data)),
            Some(Value::Null) | None => Err(ExtractError::InvalidResponse {
                reason: "missing `data` field".into(),
            }),
            Some(other) => Err(ExtractError::InvalidResponse {
                reason: format!("`data` is {}, expected an object", json_type(&other)),
            }),
        },
        other => Err(ExtractError::InvalidResponse {
            reason: format!("body is {}, expected an object", json_type(&other)),
        }),
    }
}

/// Text of an `error` field, if it carries any.
fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| Some(value.to_string())),
        other => Some(other.to_string()),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_message(err: ExtractError) -> String {
        match err {
            ExtractError::Application { message, .. } => message,
            other => panic!("expected application error, got {other:?}"),
        }
    }

    #[test]
    fn success_with_data() {
        let r = parse_response(200, br#"{"data":{"vendor_name":"Acme","line_items":[]}}"#).unwrap();
        assert_eq!(r.vendor_name.unwrap().to_string(), "Acme");
    }

    #[test]
    fn non_success_uses_server_message() {
        let err = parse_response(400, br#"{"error":"bad file"}"#).unwrap_err();
        assert_eq!(app_message(err), "bad file");
    }

    #[test]
    fn non_success_without_message_uses_fallback() {
        let bodies: [&[u8]; 4] = [
            br#"{}"#,
            br#"{"error":""}"#,
            b"<html>502 Bad Gateway</html>",
            b"",
        ];
        for body in bodies {
            let err = parse_response(502, body).unwrap_err();
            assert_eq!(app_message(err), GENERIC_FAILURE);
        }
    }

    #[test]
    fn success_with_error_field_is_application_error() {
        let err = parse_response(200, br#"{"error":"could not read invoice"}"#).unwrap_err();
        assert_eq!(app_message(err), "could not read invoice");
    }

    #[test]
    fn nested_error_object_message() {
        let err = parse_response(500, br#"{"error":{"message":"model overloaded"}}"#).unwrap_err();
        assert_eq!(app_message(err), "model overloaded");
    }

    #[test]
    fn success_without_data_is_invalid() {
        let err = parse_response(200, br#"{"ok":true}"#).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidResponse { .. }), "{err:?}");

        let err = parse_response(200, br#"{"data":null}"#).unwrap_err();
        assert!(err.to_string().contains("missing `data`"), "{err}");

        let err = parse_response(200, br#"{"data":"oops"}"#).unwrap_err();
        assert!(err.to_string().contains("a string"), "{err}");
    }

    #[test]
    fn success_with_non_json_body_is_invalid() {
        let err = parse_response(200, b"OK").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"), "{err}");

        let err = parse_response(201, b"[1,2]").unwrap_err();
        assert!(err.to_string().contains("an array"), "{err}");
    }

    #[test]
    fn http_extractor_keeps_endpoint() {
        let config = ClientConfig::builder()
            .endpoint("http://127.0.0.1:9/api/upload")
            .build()
            .unwrap();
        let extractor = HttpExtractor::new(&config).unwrap();
        assert_eq!(extractor.endpoint(), "http://127.0.0.1:9/api/upload");
    }
}
