//! LLM integration for ReplyWise.
//!
//! Two call paths reach the same Gemini model:
//! - **REST**: direct `generateContent` calls with API version fallback
//! - **SDK**: rig-core's Gemini client, used when the REST path fails
//!
//! `JsonAdapter` sits on top and turns raw completions into validated JSON.

pub mod gemini;
pub mod json_adapter;
pub mod provider;
mod rig_adapter;

pub use gemini::GeminiRestProvider;
pub use json_adapter::{JsonAdapter, extract_json};
pub use provider::LlmProvider;
pub use rig_adapter::RigAdapter;

use std::sync::Arc;

use rig::client::CompletionClient;
use secrecy::ExposeSecret;
use tracing::{info, warn};

use crate::config::GenerationConfig;
use crate::error::LlmError;

/// Build the adapter: REST primary, rig-core alternate path when available.
pub fn create_adapter(config: &GenerationConfig) -> Result<Arc<JsonAdapter>, LlmError> {
    let primary: Arc<dyn LlmProvider> = Arc::new(GeminiRestProvider::new(config)?);
    let mut adapter = JsonAdapter::new(primary).with_repair(config.json_repair);

    match create_sdk_provider(config) {
        Ok(fallback) => adapter = adapter.with_fallback(fallback),
        Err(e) => warn!(error = %e, "Alternate Gemini client unavailable, REST path only"),
    }

    info!(
        "Using Gemini (model: {}, repair: {})",
        config.model, config.json_repair
    );
    Ok(Arc::new(adapter))
}

fn create_sdk_provider(config: &GenerationConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::gemini;

    let client: rig::client::Client<gemini::client::GeminiExt> =
        gemini::Client::new(config.api_key.expose_secret()).map_err(|e| {
            LlmError::RequestFailed {
                provider: "gemini-sdk".to_string(),
                reason: format!("Failed to create Gemini client: {}", e),
            }
        })?;

    let model = client.completion_model(config.model.as_str());
    Ok(Arc::new(RigAdapter::new(
        model,
        &config.model,
        config.request_timeout,
    )))
}
