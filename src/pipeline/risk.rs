//! Heuristic risk scorer.
//!
//! Runs alongside the model call on every generation request. Matching is
//! plain case-insensitive substring search against fixed keyword lists; each
//! list that matches contributes a flag, a note and a fixed weight.

use tracing::debug;

use crate::pipeline::types::{RiskAssessment, RiskFlag};

/// One keyword class.
struct KeywordRule {
    flag: RiskFlag,
    keywords: &'static [&'static str],
    note: &'static str,
    weight: f64,
}

/// Rules in detection order. Notes are emitted in this order.
const RULES: &[KeywordRule] = &[
    KeywordRule {
        flag: RiskFlag::Urgency,
        keywords: &[
            "urgent",
            "asap",
            "immediately",
            "right away",
            "hurry",
            "deadline",
            "expires",
        ],
        note: "Email contains urgency indicators",
        weight: 0.2,
    },
    KeywordRule {
        flag: RiskFlag::Commitment,
        keywords: &[
            "commit",
            "promise",
            "guarantee",
            "agree",
            "contract",
            "sign",
            "approve",
        ],
        note: "Email may require commitments or agreements",
        weight: 0.2,
    },
    KeywordRule {
        flag: RiskFlag::Sensitive,
        keywords: &[
            "confidential",
            "private",
            "secret",
            "classified",
            "nda",
            "non-disclosure",
        ],
        note: "Email contains sensitive information markers",
        weight: 0.15,
    },
    KeywordRule {
        flag: RiskFlag::Financial,
        keywords: &[
            "wire",
            "transfer",
            "payment",
            "invoice",
            "bank",
            "account",
            "credit card",
            "gift card",
            "refund",
            "money",
            "dollar",
            "$",
        ],
        note: "Email mentions financial transactions or requests",
        weight: 0.3,
    },
    KeywordRule {
        flag: RiskFlag::Phishing,
        keywords: &[
            "click",
            "verify",
            "update",
            "suspended",
            "locked",
            "expired",
            "action required",
            "urgent action",
        ],
        note: "Email contains potential phishing indicators",
        weight: 0.35,
    },
];

const ATTACHMENT_NOTE: &str = "Warning: Financial request with attachment - verify sender";
const LINK_NOTE: &str = "Email contains links - verify before clicking";

/// Score an email with the keyword heuristics.
pub fn assess(email_text: &str) -> RiskAssessment {
    let lower = email_text.to_lowercase();

    let mut assessment = RiskAssessment::default();
    let mut score = 0.0_f64;

    for rule in RULES {
        if rule.keywords.iter().any(|kw| lower.contains(kw)) {
            assessment.flags.push(rule.flag);
            assessment.notes.push(rule.note.to_string());
            score += rule.weight;
        }
    }

    // Contextual notes, unscored.
    if lower.contains("attachment") && assessment.has(RiskFlag::Financial) {
        assessment.notes.push(ATTACHMENT_NOTE.to_string());
    }
    if lower.contains("link") || lower.contains("http") {
        assessment.notes.push(LINK_NOTE.to_string());
    }

    assessment.confidence = score.min(1.0);

    debug!(
        flags = ?assessment.flags,
        confidence = assessment.confidence,
        "Heuristic risk assessed"
    );

    assessment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_input_is_clean() {
        let risk = assess("");
        assert!(risk.flags.is_empty());
        assert!(risk.notes.is_empty());
        assert_eq!(risk.confidence, 0.0);
    }

    #[test]
    fn benign_email_is_clean() {
        let risk = assess("Hi Sam, thanks for lunch yesterday. See you soon!");
        assert!(risk.flags.is_empty());
        assert_eq!(risk.confidence, 0.0);
    }

    #[test]
    fn urgent_wire_payment() {
        let risk = assess("URGENT: please wire payment immediately");
        assert!(risk.has(RiskFlag::Urgency));
        assert!(risk.has(RiskFlag::Financial));
        assert!(!risk.has(RiskFlag::Phishing));
        assert!(risk.confidence >= 0.5 - 1e-9);
        assert!(approx_eq(risk.confidence, 0.5));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let risk = assess("This is CONFIDENTIAL");
        assert_eq!(risk.flags, vec![RiskFlag::Sensitive]);
        assert!(approx_eq(risk.confidence, 0.15));
    }

    #[test]
    fn flags_and_notes_follow_detection_order() {
        let risk = assess("Please verify the invoice and sign the contract asap. Keep it secret.");
        assert_eq!(
            risk.flags,
            vec![
                RiskFlag::Urgency,
                RiskFlag::Commitment,
                RiskFlag::Sensitive,
                RiskFlag::Financial,
                RiskFlag::Phishing,
            ]
        );
        assert_eq!(risk.notes[0], "Email contains urgency indicators");
        assert_eq!(risk.notes[4], "Email contains potential phishing indicators");
    }

    #[test]
    fn confidence_capped_at_one() {
        // 0.2 + 0.2 + 0.15 + 0.3 + 0.35 = 1.2 before the cap.
        let risk = assess("Urgent: sign this confidential wire transfer, click to verify");
        assert_eq!(risk.flags.len(), 5);
        assert_eq!(risk.confidence, 1.0);
    }

    #[test]
    fn attachment_note_requires_financial() {
        let risk = assess("See the attachment for the invoice");
        assert!(risk.notes.iter().any(|n| n == ATTACHMENT_NOTE));
        assert!(approx_eq(risk.confidence, 0.3));

        let risk = assess("See the attachment for the slides");
        assert!(!risk.notes.iter().any(|n| n == ATTACHMENT_NOTE));
    }

    #[test]
    fn link_note_is_unscored() {
        let risk = assess("Here is the link: http://example.com");
        assert_eq!(risk.notes, vec![LINK_NOTE.to_string()]);
        assert!(risk.flags.is_empty());
        assert_eq!(risk.confidence, 0.0);
    }

    #[test]
    fn contextual_notes_come_after_flag_notes() {
        let risk = assess("Refund details in the attachment, link inside");
        assert_eq!(
            risk.notes,
            vec![
                "Email mentions financial transactions or requests".to_string(),
                ATTACHMENT_NOTE.to_string(),
                LINK_NOTE.to_string(),
            ]
        );
    }

    #[test]
    fn confidence_always_in_unit_range() {
        let samples = [
            "",
            "hello",
            "$$$ urgent urgent urgent",
            "click here to verify your locked account, wire money asap, nda, sign",
            "ÜRGENT ünicode ✉️ payment",
        ];
        for sample in samples {
            let risk = assess(sample);
            assert!((0.0..=1.0).contains(&risk.confidence), "{sample}");
            assert!(risk.flags.iter().all(|f| RiskFlag::ALL.contains(f)));
        }
    }
}
