//! Environment handling for config values.
//!
//! Two jobs:
//! - `${VAR_NAME}` substitution inside string values of the YAML file,
//!   resolved at load time. Only uppercase `[A-Z_][A-Z0-9_]*` names match and
//!   `$${VAR}` escapes to a literal `${VAR}`.
//! - Direct overrides from well-known variables (`AZURE_VISION_KEY`, ...),
//!   which win over whatever the file says.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::{CardreadConfig, LoggingConfig, VisionConfig};

pub const ENV_VISION_KEY: &str = "AZURE_VISION_KEY";
pub const ENV_VISION_ENDPOINT: &str = "AZURE_VISION_ENDPOINT";
pub const ENV_LOG_LEVEL: &str = "CARDREAD_LOG_LEVEL";

/// `$${NAME}` (escaped, group 1 is `$`) or `${NAME}`.
static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\$?)\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Snapshot of the process environment.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Substitute `${VAR}` references throughout a config value tree.
///
/// Returns an error naming the first variable that is unset or empty.
pub fn resolve_env_vars(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute(value, env, "")
}

fn substitute(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    Ok(match value {
        Value::String(s) => Value::String(substitute_str(s, env, path)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| substitute(v, env, &format!("{path}[{i}]")))
                .collect::<Result<_>>()?,
        ),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let child = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                out.insert(k.clone(), substitute(v, env, &child)?);
            }
            Value::Object(out)
        }
        other => other.clone(),
    })
}

fn substitute_str(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut missing: Option<String> = None;
    let replaced = REFERENCE.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    if let Some(var_name) = missing {
        bail!(MissingEnvVarError {
            var_name,
            config_path: path.to_string(),
        });
    }
    Ok(replaced.into_owned())
}

/// Collect every variable name referenced in a value tree (for `check` output).
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    fn walk(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::String(s) => out.extend(
                REFERENCE
                    .captures_iter(s)
                    .filter(|c| c[1].is_empty())
                    .map(|c| c[2].to_string()),
            ),
            Value::Array(items) => items.iter().for_each(|v| walk(v, out)),
            Value::Object(map) => map.values().for_each(|v| walk(v, out)),
            _ => {}
        }
    }

    let mut vars = Vec::new();
    walk(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

/// Apply direct environment overrides on top of the file config.
///
/// Empty values are ignored so an exported-but-blank variable does not wipe
/// out a key set in the file.
pub fn apply_env_overrides(mut config: CardreadConfig, env: &HashMap<String, String>) -> CardreadConfig {
    let lookup = |name: &str| env.get(name).filter(|v| !v.trim().is_empty()).cloned();

    if let Some(key) = lookup(ENV_VISION_KEY) {
        config.vision.get_or_insert_with(VisionConfig::default).key = Some(key);
    }
    if let Some(endpoint) = lookup(ENV_VISION_ENDPOINT) {
        config.vision.get_or_insert_with(VisionConfig::default).endpoint = Some(endpoint);
    }
    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        config.logging.get_or_insert_with(LoggingConfig::default).level = Some(level);
    }
    config
}
