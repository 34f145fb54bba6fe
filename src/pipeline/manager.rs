use once_cell::sync::Lazy;
use regex::Regex;

static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*#(\d+)(?:\s*[:,.-]\s*|\s+|$)(.*)$").expect("static regex compile")
});

/// Splits an optional leading `#<id>` escalation reference off a manager reply.
///
/// Returns the referenced conversation id (if any) and the trimmed text to
/// forward to the customer. The id must be followed by whitespace, a
/// separator or the end of the reply. Whether it names a real escalation is
/// for the caller to decide.
#[must_use]
pub fn parse_manager_reply(body: &str) -> (Option<i64>, String) {
    if let Some(caps) = REFERENCE_RE.captures(body) {
        if let Ok(id) = caps[1].parse::<i64>() {
            return (Some(id), caps[2].trim().to_string());
        }
    }
    (None, body.trim().to_string())
}
