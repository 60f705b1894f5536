//! Alternate call path through rig-core's Gemini client.
//!
//! Used only when the REST transport fails outright.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rig::OneOrMany;
use rig::completion::CompletionModel;
use rig::completion::message::AssistantContent;

use crate::error::LlmError;
use crate::llm::provider::LlmProvider;

const PROVIDER: &str = "gemini-sdk";

/// Bridges a rig [`CompletionModel`] to [`LlmProvider`].
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
    timeout: Duration,
}

impl<M> RigAdapter<M> {
    pub fn new(model: M, model_name: &str, timeout: Duration) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel,
{
    fn provider_name(&self) -> &str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = self.model.completion_request(prompt.to_string()).send();
        let response = bounded(self.timeout, request).await?;

        let text = assistant_text(&response.choice);
        if text.trim().is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: "completion contained no text".to_string(),
            });
        }
        Ok(text)
    }
}

/// Await `request` for at most `timeout`, mapping both failure modes.
async fn bounded<T, E, F>(timeout: Duration, request: F) -> Result<T, LlmError>
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(timeout, request).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Err(LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: format!("timed out after {timeout:?}"),
        }),
    }
}

/// Concatenate the text parts of a completion, skipping tool calls and the like.
fn assistant_text(choice: &OneOrMany<AssistantContent>) -> String {
    choice
        .iter()
        .filter_map(|content| match content {
            AssistantContent::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
        .collect()
}
