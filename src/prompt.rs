use crate::core::models::LearnedPair;

/// The reply the model gives when it wants a human to take over. Also the
/// text customers receive when their message is escalated.
pub const ESCALATION_SENTINEL: &str = "Let me forward this to a manager.";

/// Max length of a single learned question or answer inside the prompt
pub const MAX_LEARNED_TEXT_LEN: usize = 800;

/// Instruction preamble used when `SYSTEM_PROMPT` is not configured.
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful SMS assistant for a small business. \
Answer customer questions briefly and politely, in plain text suitable for a text message. \
Only answer questions using the information you have been given below. \
If a question falls outside this scope, respond exactly: \"Let me forward this to a manager.\"";

/// Builds the system prompt: instruction preamble followed by every learned
/// pair as a `Q:`/`A:` block, oldest first.
#[must_use]
pub fn build_system_prompt(instructions: &str, learned: &[LearnedPair]) -> String {
    let mut prompt = instructions.trim_end().to_string();

    if learned.is_empty() {
        return prompt;
    }

    prompt.push_str("\n\nPreviously answered questions:");
    for pair in learned {
        prompt.push_str(&format!(
            "\n\nQ: {}\nA: {}",
            sanitize_learned_text(&pair.question),
            sanitize_learned_text(&pair.answer)
        ));
    }

    prompt
}

/// Remove control characters (newlines become spaces) and hard-truncate so a
/// learned pair always renders as exactly one `Q:` line and one `A:` line.
#[must_use]
pub fn sanitize_learned_text(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c == '\n' || c == '\r' || c == '\t' { ' ' } else { c })
        .filter(|c| !c.is_control())
        .take(MAX_LEARNED_TEXT_LEN)
        .collect()
}

/// Whether a completion is the model asking to escalate.
///
/// Tolerates surrounding whitespace and quotes, letter case, collapsed
/// internal whitespace and trailing punctuation drift.
#[must_use]
pub fn is_escalation_sentinel(text: &str) -> bool {
    normalize_sentinel(text) == normalize_sentinel(ESCALATION_SENTINEL)
}

fn normalize_sentinel(text: &str) -> String {
    let trimmed = text
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
        .trim()
        .trim_end_matches(|c: char| c == '.' || c == '!')
        .trim();

    trimmed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
