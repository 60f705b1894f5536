//! JSON-producing adapter around the raw providers.
//!
//! `invoke` makes at most two sequential calls: the primary completion plus
//! either one repair request (primary answered with broken JSON) or one
//! alternate-path request (primary transport failed).

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::LlmError;
use crate::llm::provider::LlmProvider;
use crate::pipeline::prompts::build_repair_prompt;

pub struct JsonAdapter {
    primary: Arc<dyn LlmProvider>,
    fallback: Option<Arc<dyn LlmProvider>>,
    repair: bool,
}

impl JsonAdapter {
    /// Adapter with repair enabled and no alternate path.
    pub fn new(primary: Arc<dyn LlmProvider>) -> Self {
        Self {
            primary,
            fallback: None,
            repair: true,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn LlmProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_repair(mut self, enabled: bool) -> Self {
        self.repair = enabled;
        self
    }

    pub fn model_name(&self) -> &str {
        self.primary.model_name()
    }

    /// Return the model's answer to `prompt` as syntactically valid JSON text.
    pub async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        let raw = match self.primary.complete(prompt).await {
            Ok(raw) => raw,
            Err(primary_err) => return self.invoke_fallback(prompt, primary_err).await,
        };

        let text = extract_json(&raw);
        let first_err = match validate_json(&text) {
            Ok(()) => return Ok(text),
            Err(e) => e,
        };

        if !self.repair {
            return Err(LlmError::InvalidJson(first_err));
        }

        warn!(error = %first_err, "JSON parsing failed, requesting repair");
        let repaired_raw = self.primary.complete(&build_repair_prompt(&text)).await?;
        let repaired = extract_json(&repaired_raw);

        match validate_json(&repaired) {
            Ok(()) => {
                info!("Model output repaired");
                Ok(repaired)
            }
            Err(repair_err) => Err(LlmError::MalformedResponse {
                first: first_err,
                repair: repair_err,
            }),
        }
    }

    async fn invoke_fallback(&self, prompt: &str, primary_err: LlmError) -> Result<String, LlmError> {
        let Some(fallback) = &self.fallback else {
            return Err(primary_err);
        };

        warn!(
            error = %primary_err,
            fallback = fallback.provider_name(),
            "Primary provider failed, trying alternate path"
        );

        let attempt = async {
            let raw = fallback.complete(prompt).await?;
            let text = extract_json(&raw);
            validate_json(&text).map_err(LlmError::InvalidJson)?;
            Ok::<_, LlmError>(text)
        };

        attempt.await.map_err(|fallback_err| LlmError::AllPathsFailed {
            primary: primary_err.to_string(),
            fallback: fallback_err.to_string(),
        })
    }
}

/// Strip markdown fences and cut out the outermost `{...}` span.
///
/// Falls back to the trimmed text when no object boundaries are present.
pub fn extract_json(text: &str) -> String {
    let stripped = strip_code_fences(text);
    match (stripped.find('{'), stripped.rfind('}')) {
        (Some(start), Some(end)) if end > start => stripped[start..=end].to_string(),
        _ => stripped.trim().to_string(),
    }
}

/// Remove every "```json" / "```" marker together with one trailing newline.
fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find("```") {
        out.push_str(&rest[..idx]);
        rest = &rest[idx + 3..];
        rest = rest.strip_prefix("json").unwrap_or(rest);
        rest = rest.strip_prefix('\n').unwrap_or(rest);
    }
    out.push_str(rest);
    out
}

fn validate_json(text: &str) -> Result<(), String> {
    serde_json::from_str::<serde_json::Value>(text)
        .map(|_| ())
        .map_err(|e| e.to_string())
}
