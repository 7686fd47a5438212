//! Config validation: schema checks with user-friendly error messages.

use crate::schema::CardreadConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return every error and warning found.
pub fn validate(config: &CardreadConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_vision(config, &mut report);
    validate_poll(config, &mut report);
    report
}

/// Credentials are optional (OCR is then disabled), but half a pair or a
/// malformed endpoint is almost certainly a mistake.
fn validate_vision(config: &CardreadConfig, report: &mut ValidationReport) {
    let Some(vision) = &config.vision else { return };

    let has_key = vision.key.as_deref().is_some_and(|k| !k.trim().is_empty());
    let has_endpoint = vision.endpoint.as_deref().is_some_and(|e| !e.trim().is_empty());
    match (has_key, has_endpoint) {
        (true, false) => report.warn("vision.endpoint", "Key is set but endpoint is missing; OCR is disabled"),
        (false, true) => report.warn("vision.key", "Endpoint is set but key is missing; OCR is disabled"),
        _ => {}
    }

    if let Some(endpoint) = vision.endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
        match url::Url::parse(endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                if url.scheme() == "http" {
                    report.warn("vision.endpoint", "Endpoint uses plain http; the key will be sent unencrypted");
                }
            }
            Ok(url) => report.error(
                "vision.endpoint",
                format!("Unsupported scheme '{}'. Use http or https", url.scheme()),
            ),
            Err(e) => report.error("vision.endpoint", format!("Not a valid URL: {e}")),
        }
    }

    if vision.api_path.as_deref().is_some_and(|p| p.trim().is_empty()) {
        report.error("vision.apiPath", "apiPath cannot be empty");
    }
    if vision.request_timeout_ms == Some(0) {
        report.error("vision.requestTimeoutMs", "requestTimeoutMs must be > 0");
    }
}

fn validate_poll(config: &CardreadConfig, report: &mut ValidationReport) {
    let Some(poll) = config.vision.as_ref().and_then(|v| v.poll.as_ref()) else { return };

    if poll.max_attempts == Some(0) {
        report.error("vision.poll.maxAttempts", "maxAttempts must be >= 1");
    }
    if let Some(factor) = poll.backoff_factor {
        if !factor.is_finite() || factor < 1.0 {
            report.error("vision.poll.backoffFactor", "backoffFactor must be a finite number >= 1.0");
        }
    }
    if let (Some(delay), Some(max)) = (poll.delay_ms, poll.max_delay_ms) {
        if max < delay {
            report.warn(
                "vision.poll.maxDelayMs",
                format!("maxDelayMs ({max}) is below delayMs ({delay}); every wait is capped at {max}"),
            );
        }
    }
}
