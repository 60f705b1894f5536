//! Reply drafter: turns an email into three validated reply drafts.
//!
//! Flow for `generate`:
//! 1. Validate input (no network call on failure)
//! 2. Heuristic risk scoring (local, no LLM)
//! 3. Prompt → `JsonAdapter::invoke` → lenient parse of the model output
//! 4. Merge model risk with heuristic risk, normalize drafts
//!
//! All-or-nothing: any adapter or parse failure fails the whole request.

use std::sync::Arc;

use serde_json::Value;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::llm::JsonAdapter;
use crate::pipeline::prompts::{build_generate_prompt, build_rewrite_prompt};
use crate::pipeline::risk;
use crate::pipeline::types::{
    DraftStyle, GenerateRequest, GenerationResult, ReplyDraft, RewriteRequest, RewriteResult,
    RiskAssessment, RiskFlag, RiskFlags, RiskSummary,
};

/// Subject used when the model leaves a draft's subject out.
pub const DEFAULT_SUBJECT: &str = "Re: Email";

pub struct ReplyDrafter {
    adapter: Arc<JsonAdapter>,
}

impl ReplyDrafter {
    pub fn new(adapter: Arc<JsonAdapter>) -> Self {
        Self { adapter }
    }

    /// Generate three reply drafts plus intent, questions and merged risk.
    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerationResult, PipelineError> {
        request.validate()?;

        let span = info_span!("generate", request_id = %Uuid::new_v4());
        async {
            info!(chars = request.email_text.len(), "Generating reply drafts");

            let heuristic = risk::assess(&request.email_text);

            let prompt = build_generate_prompt(&request.email_text, request.context.as_deref());
            let text = self.adapter.invoke(&prompt).await.inspect_err(|e| {
                if e.is_malformed_output() {
                    warn!(error = %e, "Model output was not usable JSON");
                } else {
                    error!(error = %e, "Draft generation failed");
                }
            })?;

            let output = ModelOutput::parse(&text)?;
            let result = merge(output, &heuristic);

            info!(
                heuristic_flags = ?heuristic.flags,
                confidence = result.risk.confidence,
                "Reply drafts generated"
            );
            Ok::<_, PipelineError>(result)
        }
        .instrument(span)
        .await
    }

    /// Rewrite one draft according to `request.action`.
    pub async fn rewrite(&self, request: &RewriteRequest) -> Result<RewriteResult, PipelineError> {
        request.validate()?;

        let span = info_span!(
            "rewrite",
            request_id = %Uuid::new_v4(),
            action = request.action.label()
        );
        async {
            info!("Rewriting draft");

            let prompt = build_rewrite_prompt(
                request.action,
                &request.selected_draft_body,
                &request.original_email,
                request.context.as_deref(),
            );
            let text = self.adapter.invoke(&prompt).await.inspect_err(|e| {
                error!(error = %e, "Draft rewrite failed");
            })?;

            let value = parse_object(&text)?;
            let subject = string_field(&value, "subject");
            let body = match string_field(&value, "body") {
                Some(body) if !body.trim().is_empty() => body,
                _ => {
                    debug!("Model omitted rewritten body, keeping original draft");
                    request.selected_draft_body.clone()
                }
            };

            Ok::<_, PipelineError>(RewriteResult { subject, body })
        }
        .instrument(span)
        .await
    }
}

// ── Model output ────────────────────────────────────────────────────

/// What the model returned, read leniently. Every field is optional on the
/// wire; absent or wrongly typed fields come back empty.
#[derive(Debug, Default)]
struct ModelOutput {
    intent_summary: Vec<String>,
    drafts: Vec<(DraftStyle, Option<String>, Option<String>)>,
    questions_to_ask: Vec<String>,
    risk_flags: Vec<String>,
    risk_notes: Vec<String>,
    risk_confidence: f64,
}

impl ModelOutput {
    fn parse(text: &str) -> Result<Self, PipelineError> {
        let value = parse_object(text)?;

        let drafts = DraftStyle::ALL
            .into_iter()
            .filter_map(|style| {
                draft_entry(value.get("reply_drafts"), style).map(|entry| {
                    (
                        style,
                        string_field(entry, "subject"),
                        string_field(entry, "body"),
                    )
                })
            })
            .collect();

        let risk = value.get("risk");

        Ok(Self {
            intent_summary: string_list(value.get("intent_summary")),
            drafts,
            questions_to_ask: string_list(value.get("questions_to_ask")),
            risk_flags: string_list(risk.and_then(|r| r.get("flags"))),
            risk_notes: string_list(risk.and_then(|r| r.get("notes"))),
            risk_confidence: risk
                .and_then(|r| r.get("confidence"))
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
        })
    }
}

/// Find the entry for `style` in either an object keyed by style or an
/// array of `{style, subject, body}` objects.
fn draft_entry(drafts: Option<&Value>, style: DraftStyle) -> Option<&Value> {
    match drafts? {
        Value::Object(map) => map.get(style.as_str()).filter(|v| v.is_object()),
        Value::Array(items) => items
            .iter()
            .find(|item| item.get("style").and_then(Value::as_str) == Some(style.as_str())),
        _ => None,
    }
}

fn parse_object(text: &str) -> Result<Value, PipelineError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| PipelineError::Parse(format!("invalid JSON: {e}")))?;
    if !value.is_object() {
        return Err(PipelineError::Parse(
            "expected a JSON object at the top level".to_string(),
        ));
    }
    Ok(value)
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

// ── Merge ───────────────────────────────────────────────────────────

/// Combine the model output with the heuristic assessment.
fn merge(output: ModelOutput, heuristic: &RiskAssessment) -> GenerationResult {
    let flags: RiskFlags = output
        .risk_flags
        .iter()
        .filter_map(|name| RiskFlag::parse(name))
        .chain(heuristic.flags.iter().copied())
        .collect();

    let mut notes = output.risk_notes;
    notes.extend(heuristic.notes.iter().cloned());

    let confidence = merge_confidence(output.risk_confidence, heuristic.confidence);

    let reply_drafts = DraftStyle::ALL.map(|style| {
        let (subject, body) = output
            .drafts
            .iter()
            .find(|(s, _, _)| *s == style)
            .map(|(_, subject, body)| (subject.clone(), body.clone()))
            .unwrap_or_default();
        ReplyDraft {
            style,
            subject: subject
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            body: body.unwrap_or_default(),
        }
    });

    let missing: Vec<&str> = reply_drafts
        .iter()
        .filter(|d| d.body.is_empty())
        .map(|d| d.style.as_str())
        .collect();
    if !missing.is_empty() {
        warn!(styles = ?missing, "Model returned no body for some draft styles");
    }

    GenerationResult {
        intent_summary: output.intent_summary,
        reply_drafts,
        questions_to_ask: output.questions_to_ask,
        risk: RiskSummary {
            flags,
            notes,
            confidence,
        },
    }
}

/// Scale both 0–1 confidences to 0–100 and keep the larger, clamped.
pub fn merge_confidence(model: f64, heuristic: f64) -> f64 {
    let merged = (model * 100.0).max(heuristic * 100.0);
    if merged.is_nan() {
        0.0
    } else {
        merged.clamp(0.0, 100.0)
    }
}
