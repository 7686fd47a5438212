//! cardread configuration schema.
//!
//! Every field is optional so a partial YAML file (or no file at all) still
//! deserializes; `defaults::apply_all_defaults` fills in the rest.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for cardread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardreadConfig {
    /// Remote OCR (Azure Computer Vision Read API) settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<VisionConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

impl CardreadConfig {
    /// Vision section, or an empty one when the file omits it.
    pub fn vision(&self) -> VisionConfig {
        self.vision.clone().unwrap_or_default()
    }

    /// Logging section, or an empty one when the file omits it.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Vision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionConfig {
    /// Subscription key sent as `Ocp-Apim-Subscription-Key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Resource endpoint, e.g. `https://myres.cognitiveservices.azure.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Path of the analyze call relative to the endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_path: Option<String>,

    /// Per-request HTTP timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,

    /// Polling cadence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll: Option<PollConfig>,
}

impl VisionConfig {
    /// Key and endpoint, only when both are present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        usable_credentials(self.key.as_deref(), self.endpoint.as_deref())
    }
}

/// Pair up a key and endpoint; blank values count as missing.
pub fn usable_credentials<'a>(key: Option<&'a str>, endpoint: Option<&'a str>) -> Option<(&'a str, &'a str)> {
    let key = key.filter(|k| !k.trim().is_empty())?;
    let endpoint = endpoint.filter(|e| !e.trim().is_empty())?;
    Some((key, endpoint))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
    /// 1.0 keeps the delay constant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<bool>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `cardread_understanding=debug`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Directory for rolling NDJSON log files; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    /// Emit JSON on the console instead of human-readable lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}
