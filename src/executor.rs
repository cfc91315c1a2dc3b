use serde::Deserialize;
use serde_json::json;

use crate::error::{ExecutionCause, Result, ScribeError};
use crate::languages;

const BASE_URL: &str = "https://api.jdoodle.com/v1/execute";

/// Relays a script to the remote interpreter service. The language key is
/// resolved against the fixed table before anything touches the wire, and
/// the call is a single round-trip with no retries.
#[derive(Debug, Clone)]
pub struct Executor {
    client_id: String,
    client_secret: String,
    endpoint: String,
}

impl Executor {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            endpoint: BASE_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        if !endpoint.trim().is_empty() {
            self.endpoint = endpoint;
        }
        self
    }

    pub async fn execute(&self, script: &str, language_key: &str) -> Result<String> {
        let lang = languages::resolve(language_key)
            .ok_or_else(|| ScribeError::UnsupportedLanguage(language_key.to_string()))?;

        let body = json!({
            "clientId": self.client_id,
            "clientSecret": self.client_secret,
            "script": script,
            "language": lang.engine_id,
            "versionIndex": lang.version_index
        });

        tracing::debug!("executing {} ({})", language_key, lang.engine_id);
        let client = reqwest::Client::new();
        let response = client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| ScribeError::execution(ExecutionCause::Network, err.to_string()))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if status != reqwest::StatusCode::OK {
            return Err(ScribeError::execution(
                ExecutionCause::BadStatus,
                format!("execute endpoint returned {}", status),
            ));
        }

        let payload: ExecuteResponse = serde_json::from_str(&text).map_err(|err| {
            ScribeError::execution(
                ExecutionCause::MalformedResponse,
                format!("failed to parse execute response: {}", err),
            )
        })?;
        payload.output.ok_or_else(|| {
            ScribeError::execution(
                ExecutionCause::MalformedResponse,
                "execute response has no output field",
            )
        })
    }
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    output: Option<String>,
}
