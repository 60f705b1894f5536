//! Prompt templates for draft generation, rewriting and JSON repair.

use crate::pipeline::types::RewriteAction;

/// Build the prompt asking the model for the full generation payload.
pub fn build_generate_prompt(email_text: &str, context: Option<&str>) -> String {
    let context_block = match non_empty(context) {
        Some(ctx) => format!(
            "\n\nUser Context/Instructions: {ctx}\n\
             Please follow these instructions when generating replies."
        ),
        None => String::new(),
    };

    format!(
        "You are an AI email assistant that helps users draft professional email replies. \
         Analyze the following email and return ONLY valid JSON (no markdown, no code blocks, \
         no commentary).\n\n\
         Email to analyze:\n\
         {email_text}\n\
         {context_block}\n\n\
         Return a JSON object with this exact structure:\n\
         {{\n\
         \x20 \"intent_summary\": [\"bullet 1\", \"bullet 2\", \"bullet 3\"],\n\
         \x20 \"reply_drafts\": {{\n\
         \x20   \"short\": {{\n\
         \x20     \"subject\": \"Re: [original subject]\",\n\
         \x20     \"body\": \"Brief, concise reply (2-3 sentences max)\"\n\
         \x20   }},\n\
         \x20   \"friendly\": {{\n\
         \x20     \"subject\": \"Re: [original subject]\",\n\
         \x20     \"body\": \"Warm, casual but professional reply (3-5 sentences)\"\n\
         \x20   }},\n\
         \x20   \"formal\": {{\n\
         \x20     \"subject\": \"Re: [original subject]\",\n\
         \x20     \"body\": \"Formal, professional reply (4-6 sentences)\"\n\
         \x20   }}\n\
         \x20 }},\n\
         \x20 \"questions_to_ask\": [\"question 1\", \"question 2\", \"question 3\"],\n\
         \x20 \"risk\": {{\n\
         \x20   \"flags\": [\"flag1\", \"flag2\"],\n\
         \x20   \"notes\": [\"note 1\", \"note 2\"],\n\
         \x20   \"confidence\": 0.75\n\
         \x20 }}\n\
         }}\n\n\
         Requirements:\n\
         - intent_summary: 2-5 bullet points summarizing what the sender wants\n\
         - reply_drafts: Three versions (short, friendly, formal) - keep them practical and email-safe\n\
         - questions_to_ask: 2-6 relevant questions the user might want to ask\n\
         - risk.flags: Array of risk indicators (e.g., \"urgency\", \"commitment\", \"financial\", \"sensitive\", \"phishing\")\n\
         - risk.notes: Array of risk-related notes or warnings\n\
         - risk.confidence: Number between 0 and 1 indicating confidence in risk assessment\n\n\
         IMPORTANT: Return ONLY valid JSON. No markdown formatting. No code blocks. \
         No explanatory text. Just the JSON object."
    )
}

/// One instruction sentence per rewrite action.
pub fn rewrite_instruction(action: RewriteAction) -> &'static str {
    match action {
        RewriteAction::Shorter => {
            "Make this email reply significantly shorter while keeping the key message. \
             Aim for 2-3 sentences maximum."
        }
        RewriteAction::MoreFormal => {
            "Rewrite this email reply in a more formal, professional tone. \
             Use formal language and structure."
        }
        RewriteAction::Regenerate => {
            "Regenerate this email reply with a fresh approach while maintaining \
             the same intent and key points."
        }
    }
}

/// Build the prompt for rewriting a single draft.
pub fn build_rewrite_prompt(
    action: RewriteAction,
    draft_body: &str,
    original_email: &str,
    context: Option<&str>,
) -> String {
    let context_block = match non_empty(context) {
        Some(ctx) => format!("\n\nUser Context: {ctx}"),
        None => String::new(),
    };

    format!(
        "You are an AI email assistant. {instruction}\n\n\
         Original email:\n\
         {original_email}\n\n\
         Current draft to modify:\n\
         {draft_body}\n\
         {context_block}\n\n\
         Return ONLY valid JSON with this structure:\n\
         {{\n\
         \x20 \"subject\": \"Re: [subject]\",\n\
         \x20 \"body\": \"[rewritten email body]\"\n\
         }}\n\n\
         IMPORTANT: Return ONLY valid JSON. No markdown. No code blocks. No commentary. \
         Just the JSON object.",
        instruction = rewrite_instruction(action),
    )
}

/// Ask the model to fix text that should have been JSON.
pub fn build_repair_prompt(broken: &str) -> String {
    format!(
        "The following text should be valid JSON but has errors. \
         Fix it and return ONLY the corrected JSON, nothing else:\n\n{broken}"
    )
}

fn non_empty(context: Option<&str>) -> Option<&str> {
    context.map(str::trim).filter(|c| !c.is_empty())
}
