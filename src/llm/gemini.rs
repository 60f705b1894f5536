//! Direct REST transport for the Gemini `generateContent` endpoint.
//!
//! The model may only be published under some API versions, so a 404 on one
//! version moves on to the next before giving up.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::GenerationConfig;
use crate::error::LlmError;
use crate::llm::provider::LlmProvider;

const PROVIDER: &str = "gemini";

/// API versions tried in order. `v1beta` carries more models.
pub const API_VERSIONS: [&str; 2] = ["v1beta", "v1"];

/// Gemini REST provider.
pub struct GeminiRestProvider {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiRestProvider {
    /// Build the provider. An empty key is refused up front.
    pub fn new(config: &GenerationConfig) -> Result<Self, LlmError> {
        if config.api_key.expose_secret().trim().is_empty() {
            return Err(LlmError::NotInitialized);
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
        })
    }

    fn endpoint(&self, version: &str) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, version, self.model
        )
    }

    /// Map a reqwest failure without echoing the URL.
    fn transport_error(&self, e: reqwest::Error, context: &str) -> LlmError {
        let reason = if e.is_timeout() {
            format!("{context}: timed out after {:?}", self.timeout)
        } else {
            format!("{context}: {}", e.without_url())
        };
        LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason,
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiRestProvider {
    fn provider_name(&self) -> &str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let payload = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        for (idx, version) in API_VERSIONS.iter().enumerate() {
            let is_last = idx + 1 == API_VERSIONS.len();

            let response = self
                .client
                .post(self.endpoint(version))
                .header("x-goog-api-key", self.api_key.expose_secret())
                .json(&payload)
                .send()
                .await
                .map_err(|e| self.transport_error(e, "request failed"))?;

            let status = response.status();

            if status == reqwest::StatusCode::NOT_FOUND && !is_last {
                warn!(version, model = %self.model, "Gemini API version not found, trying next");
                continue;
            }

            let body = response
                .text()
                .await
                .map_err(|e| self.transport_error(e, "failed to read response body"))?;

            if !status.is_success() {
                return Err(LlmError::Upstream {
                    provider: PROVIDER.to_string(),
                    status: status.as_u16(),
                    body,
                });
            }

            debug!(version, bytes = body.len(), "Gemini completion received");
            return extract_candidate_text(&body);
        }

        Err(LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: "All API versions failed".to_string(),
        })
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a response body.
fn extract_candidate_text(body: &str) -> Result<String, LlmError> {
    let value: Value = serde_json::from_str(body).map_err(|e| LlmError::InvalidResponse {
        provider: PROVIDER.to_string(),
        reason: format!("response body is not JSON: {e}"),
    })?;

    value
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: "Unexpected response format from Gemini API".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_empty_key() {
        let config = GenerationConfig::with_api_key("  ");
        assert!(matches!(
            GeminiRestProvider::new(&config),
            Err(LlmError::NotInitialized)
        ));
    }

    #[test]
    fn endpoint_includes_version_and_model() {
        let mut config = GenerationConfig::with_api_key("k");
        config.base_url = "http://localhost:1234/".into();
        let provider = GeminiRestProvider::new(&config).unwrap();
        assert_eq!(
            provider.endpoint("v1beta"),
            "http://localhost:1234/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(provider.model_name(), "gemini-2.5-flash");
    }

    #[test]
    fn candidate_text_extracted() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"ok\":true}"}]}}]}"#;
        assert_eq!(extract_candidate_text(body).unwrap(), r#"{"ok":true}"#);
    }

    #[test]
    fn missing_candidates_is_invalid_response() {
        let err = extract_candidate_text(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse { .. }));
    }

    #[test]
    fn non_json_body_is_invalid_response() {
        let err = extract_candidate_text("<html>oops</html>").unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse { .. }));
    }
}
