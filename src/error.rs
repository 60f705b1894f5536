//! Error types for ReplyWise.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} returned {status}: {body}")]
    Upstream {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Failed to parse JSON after retry: {first}; repair attempt: {repair}")]
    MalformedResponse { first: String, repair: String },

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("All call paths failed. Primary: {primary}. Fallback: {fallback}")]
    AllPathsFailed { primary: String, fallback: String },

    #[error("Generative provider not initialized. Set GEMINI_API_KEY before use.")]
    NotInitialized,
}

impl LlmError {
    /// Whether this error came from the model's output rather than the transport.
    pub fn is_malformed_output(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. } | Self::InvalidJson(_))
    }
}

/// Pipeline-related errors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Unusable model output: {0}")]
    Parse(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}
