//! Provider trait: one raw text completion per prompt.

use async_trait::async_trait;

use crate::error::LlmError;

/// A text-generation backend.
///
/// Implementations return the model's completion untouched. JSON extraction,
/// validation and repair live in [`crate::llm::JsonAdapter`].
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider label used in errors and logs.
    fn provider_name(&self) -> &str;

    /// Model identifier.
    fn model_name(&self) -> &str;

    /// Send a prompt and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
