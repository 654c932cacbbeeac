//! Keyword-driven call triage.
//!
//! Pure functions deriving the processed summary, urgency level and
//! key-concern tags written by the post-call webhook. This is substring
//! matching over lowercased text, not language understanding; the keyword
//! tables below are the behavior, so treat any change as a contract change.

use database::UrgencyLevel;

/// Insight lines appended to the processed summary when their keyword
/// appears in the transcript.
const INSIGHTS: &[(&str, &str)] = &[
    ("pain", "Patient reported pain"),
    ("medication", "Medication discussed"),
    ("appointment", "Appointment requested"),
];

/// High-urgency keywords. Any hit wins regardless of other tiers.
const HIGH_URGENCY: &[&str] = &["emergency", "urgent", "severe pain"];

/// Medium-urgency keywords, checked only when no high keyword hit.
const MEDIUM_URGENCY: &[&str] = &["soon", "concern", "worried"];

/// Build the processed summary stored on the call log: the caller-supplied
/// summary (with fallbacks) plus any keyword-triggered insight lines.
pub fn process_call_summary(summary: &str, transcript: &str) -> String {
    if summary.is_empty() && transcript.is_empty() {
        return "No summary available".to_string();
    }

    let processed = if summary.is_empty() {
        "Call completed - transcript available"
    } else {
        summary
    };

    let transcript = transcript.to_lowercase();
    let insights: Vec<&str> = INSIGHTS
        .iter()
        .filter(|(keyword, _)| transcript.contains(keyword))
        .map(|(_, insight)| *insight)
        .collect();

    if insights.is_empty() {
        processed.to_string()
    } else {
        format!("{processed}\n\nKey insights: {}", insights.join(", "))
    }
}

/// Classify urgency from transcript and summary text.
///
/// Tier order is fixed: a transcript containing both "emergency" and "soon"
/// is high, never medium.
pub fn extract_urgency_level(transcript: &str, summary: &str) -> UrgencyLevel {
    let text = format!("{transcript} {summary}").to_lowercase();

    if HIGH_URGENCY.iter().any(|keyword| text.contains(keyword)) {
        UrgencyLevel::High
    } else if MEDIUM_URGENCY.iter().any(|keyword| text.contains(keyword)) {
        UrgencyLevel::Medium
    } else {
        UrgencyLevel::Low
    }
}

/// Extract key-concern tags from transcript and summary text.
///
/// Output order follows the fixed check order below, not input order.
pub fn extract_key_concerns(transcript: &str, summary: &str) -> Vec<String> {
    let text = format!("{transcript} {summary}").to_lowercase();
    let mut concerns = Vec::new();

    if text.contains("pain") {
        concerns.push("Pain management".to_string());
    }
    if text.contains("medication") {
        concerns.push("Medication review".to_string());
    }
    if text.contains("allergy") {
        concerns.push("Allergy concerns".to_string());
    }
    if text.contains("appointment") {
        concerns.push("Scheduling".to_string());
    }
    if text.contains("test") || text.contains("lab") {
        concerns.push("Test results".to_string());
    }

    concerns
}

/// Whether the processed summary indicates a follow-up is required.
pub fn follow_up_required(processed_summary: &str) -> bool {
    processed_summary.contains("follow-up") || processed_summary.contains("appointment")
}

/// Whether a follow-up check should be logged for a medical call.
pub fn needs_follow_up(processed_summary: &str, transcript: &str) -> bool {
    let summary = processed_summary.to_lowercase();
    summary.contains("follow-up")
        || summary.contains("appointment")
        || transcript.to_lowercase().contains("schedule")
}
