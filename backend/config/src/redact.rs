//! Config redaction: safe-to-print snapshots with secrets masked.

use serde_json::Value;

/// Field names whose string values are secrets.
static SENSITIVE_KEYS: &[&str] = &[
    "key",
    "apiKey",
    "api_key",
    "subscriptionKey",
    "subscription_key",
    "token",
    "secret",
    "password",
];

/// Redact a config JSON value, masking every sensitive field.
///
/// The first four characters survive so two different keys can still be told
/// apart in `cardread check` output.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn mask(s: &str) -> String {
    if s.chars().count() > 8 {
        format!("{}***", s.chars().take(4).collect::<String>())
    } else {
        "***".to_string()
    }
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => Value::String(mask(s)),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}
