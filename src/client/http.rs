//! HTTP transport
//!
//! Executes one CRUD request against a fully-resolved URL and classifies the
//! response. Classification order: network failure, non-2xx with a decodable
//! `error`/`message` body, non-2xx without one, then 2xx bodies that still
//! encode an application-level failure (`errors`, or exactly `code` +
//! `message`). Empty and undecodable 2xx bodies count as success with no
//! payload.

use crate::error::{ExplorerError, Operation};
use indexmap::IndexMap;
use reqwest::{Client, Method};
use serde_json::Value;

/// Thin wrapper around a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ExplorerError> {
        let client = Client::builder()
            .user_agent(concat!("aep-explorer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExplorerError::ClientInit(e.to_string()))?;
        Ok(Self { client })
    }

    /// Send one request. `Ok(None)` means a success with no decodable body.
    pub async fn execute(
        &self,
        op: Operation,
        method: Method,
        url: &str,
        headers: &IndexMap<String, String>,
        body: Option<&Value>,
    ) -> Result<Option<Value>, ExplorerError> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        for (key, value) in headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| ExplorerError::Network {
            op,
            cause: e.to_string(),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ExplorerError::Network {
            op,
            cause: e.to_string(),
        })?;

        if !status.is_success() {
            tracing::error!("{} {} -> {}", op, url, status);
            if let Ok(parsed) = serde_json::from_str::<Value>(&text) {
                if let Some(message) = error_message(&parsed) {
                    return Err(ExplorerError::Status { op, message });
                }
            }
            return Err(ExplorerError::HttpStatus {
                op,
                code: status.as_u16(),
            });
        }

        if text.is_empty() {
            return Ok(None);
        }
        let Ok(parsed) = serde_json::from_str::<Value>(&text) else {
            // Undecodable body on a successful status: treat as empty.
            return Ok(None);
        };
        check_application_error(&parsed)?;
        Ok(Some(parsed))
    }
}

/// Message carried by a non-2xx body: an `error` field (string, or an object
/// with its own `message`), falling back to a top-level `message`.
fn error_message(body: &Value) -> Option<String> {
    match body.get("error") {
        Some(Value::String(s)) => return Some(s.clone()),
        Some(Value::Object(obj)) => {
            return match obj.get("message").and_then(Value::as_str) {
                Some(message) => Some(message.to_string()),
                None => Some(Value::Object(obj.clone()).to_string()),
            };
        }
        _ => {}
    }
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// A 2xx body encodes a failure when it carries an `errors` field, or when it
/// consists of exactly `code` + `message`. Bodies with additional fields are
/// ordinary payloads.
fn check_application_error(body: &Value) -> Result<(), ExplorerError> {
    let Some(obj) = body.as_object() else {
        return Ok(());
    };

    match obj.get("errors") {
        Some(Value::String(message)) => return Err(ExplorerError::Api(message.clone())),
        Some(Value::Array(items)) => {
            let joined = items
                .iter()
                .map(plain_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ExplorerError::Api(joined));
        }
        _ => {}
    }

    if obj.len() == 2 {
        if let (Some(code), Some(message)) = (obj.get("code"), obj.get("message")) {
            return Err(ExplorerError::Application {
                code: plain_string(code),
                message: plain_string(message),
            });
        }
    }

    Ok(())
}

fn plain_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
