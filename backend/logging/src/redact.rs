//! Log Redaction
//!
//! Scrubs subscription keys and bearer tokens from strings before they reach
//! a log line. Service error bodies and request dumps go through here.

use regex::Regex;
use std::sync::LazyLock;

/// `Ocp-Apim-Subscription-Key: value` / `"subscriptionKey":"value"` pairs.
static KEY_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)((?:ocp-apim-subscription-key|subscription[-_]?key)["']?\s*[:=]\s*["']?)[^\s"',;}]+"#)
        .unwrap()
});

/// Bare 32-hex-digit Cognitive Services keys.
static HEX_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[0-9a-fA-F]{32}\b").unwrap());

static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = KEY_PAIR_RE.replace_all(input, "${1}[REDACTED_KEY]");
    let redacted = HEX_KEY_RE.replace_all(&redacted, "[REDACTED_KEY]");
    BEARER_RE.replace_all(&redacted, "[REDACTED_TOKEN]").into_owned()
}

/// Redact and cap a string for logging; long service bodies are cut at a
/// char boundary and marked.
pub fn redact_for_log(input: &str, max_chars: usize) -> String {
    let redacted = redact_sensitive_data(input);
    if redacted.chars().count() <= max_chars {
        return redacted;
    }
    let mut cut: String = redacted.chars().take(max_chars).collect();
    cut.push_str("…[truncated]");
    cut
}
