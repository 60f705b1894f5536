//! Draft generation pipeline.
//!
//! Every generation request flows through:
//! 1. `risk::assess()`: keyword heuristics (no LLM)
//! 2. `prompts`: fixed instruction templates
//! 3. `llm::JsonAdapter`: model call, JSON extraction and repair
//! 4. `ReplyDrafter`: merge and normalization into a `GenerationResult`

pub mod drafter;
pub mod prompts;
pub mod risk;
pub mod types;

pub use drafter::ReplyDrafter;
pub use types::{
    DraftStyle, GenerateRequest, GenerationResult, ReplyDraft, RewriteAction, RewriteRequest,
    RewriteResult, RiskAssessment, RiskFlag, RiskFlags, RiskSummary,
};
