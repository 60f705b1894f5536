//! Shared types for the drafting pipeline.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

// ── Risk ────────────────────────────────────────────────────────────

/// A named risk indicator. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    Urgency,
    Commitment,
    Sensitive,
    Financial,
    Phishing,
}

impl RiskFlag {
    pub const ALL: [RiskFlag; 5] = [
        Self::Urgency,
        Self::Commitment,
        Self::Sensitive,
        Self::Financial,
        Self::Phishing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgency => "urgency",
            Self::Commitment => "commitment",
            Self::Sensitive => "sensitive",
            Self::Financial => "financial",
            Self::Phishing => "phishing",
        }
    }

    /// Map a model-reported flag name onto the closed set.
    ///
    /// Case and surrounding whitespace are ignored; anything else returns `None`.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|flag| flag.as_str() == name)
    }
}

/// Local heuristic assessment of one email.
///
/// `flags` and `notes` keep detection order. `confidence` is in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub flags: Vec<RiskFlag>,
    pub notes: Vec<String>,
    pub confidence: f64,
}

impl RiskAssessment {
    pub fn has(&self, flag: RiskFlag) -> bool {
        self.flags.contains(&flag)
    }
}

/// Merged flag set as returned to callers: one boolean per flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFlags {
    pub urgency: bool,
    pub commitment: bool,
    pub sensitive: bool,
    pub financial: bool,
    pub phishing: bool,
}

impl RiskFlags {
    pub fn set(&mut self, flag: RiskFlag) {
        match flag {
            RiskFlag::Urgency => self.urgency = true,
            RiskFlag::Commitment => self.commitment = true,
            RiskFlag::Sensitive => self.sensitive = true,
            RiskFlag::Financial => self.financial = true,
            RiskFlag::Phishing => self.phishing = true,
        }
    }
}

impl FromIterator<RiskFlag> for RiskFlags {
    fn from_iter<I: IntoIterator<Item = RiskFlag>>(iter: I) -> Self {
        let mut flags = Self::default();
        for flag in iter {
            flags.set(flag);
        }
        flags
    }
}

/// Model and heuristic risk merged. `confidence` is on a 0–100 scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub flags: RiskFlags,
    pub notes: Vec<String>,
    pub confidence: f64,
}

// ── Drafts ──────────────────────────────────────────────────────────

/// Tone of a reply draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStyle {
    Short,
    Friendly,
    Formal,
}

impl DraftStyle {
    /// Canonical order of drafts in every response.
    pub const ALL: [DraftStyle; 3] = [Self::Short, Self::Friendly, Self::Formal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Friendly => "friendly",
            Self::Formal => "formal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyDraft {
    pub style: DraftStyle,
    pub subject: String,
    pub body: String,
}

/// Full answer to a generation request.
///
/// `reply_drafts` is a fixed-size array in `DraftStyle::ALL` order, so a
/// result with a missing or reordered style cannot be constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub intent_summary: Vec<String>,
    pub reply_drafts: [ReplyDraft; 3],
    pub questions_to_ask: Vec<String>,
    pub risk: RiskSummary,
}

// ── Rewrite ─────────────────────────────────────────────────────────

/// Edit applied to an existing draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteAction {
    Shorter,
    MoreFormal,
    Regenerate,
}

impl RewriteAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Shorter => "shorter",
            Self::MoreFormal => "more_formal",
            Self::Regenerate => "regenerate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub body: String,
}

// ── Requests ────────────────────────────────────────────────────────

/// Inbound generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub email_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl GenerateRequest {
    pub fn new(email_text: impl Into<String>) -> Self {
        Self {
            email_text: email_text.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Reject requests that cannot produce a meaningful prompt.
    pub fn validate(&self) -> Result<(), PipelineError> {
        require_text(&self.email_text, "Email text is required")
    }
}

/// Inbound rewrite request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteRequest {
    pub action: RewriteAction,
    pub selected_draft_body: String,
    pub original_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl RewriteRequest {
    pub fn validate(&self) -> Result<(), PipelineError> {
        require_text(&self.selected_draft_body, "Draft body is required")?;
        require_text(&self.original_email, "Original email is required")
    }
}

fn require_text(value: &str, message: &str) -> Result<(), PipelineError> {
    if value.trim().is_empty() {
        Err(PipelineError::Validation(message.to_string()))
    } else {
        Ok(())
    }
}
