//! `cardread-config` — runtime configuration for cardread.
//!
//! Provides:
//! - Typed config schema (vision credentials, poll cadence, logging)
//! - YAML loading from the config directory
//! - `${ENV_VAR}` substitution and direct env overrides
//! - Default value application
//! - Validation report
//! - Redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{
    apply_env_overrides, collect_referenced_vars, process_env, resolve_env_vars, MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_config, load_raw};
pub use redact::redact;
pub use schema::{usable_credentials, CardreadConfig, LoggingConfig, PollConfig, VisionConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Load, substitute env vars, apply env overrides and defaults, then validate.
///
/// This is the main entry point for loading a config at runtime. Validation
/// problems are logged; errors in the report abort the load.
pub async fn load_and_prepare(path: &Path, env: &HashMap<String, String>) -> Result<CardreadConfig> {
    let (config, report) = load_with_report(path, env).await?;
    log_report(&report)?;
    Ok(config)
}

/// Same pipeline as [`load_and_prepare`] but hands the validation report
/// back untouched, for callers that set up logging from the config itself.
pub async fn load_with_report(
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<(CardreadConfig, ValidationReport)> {
    let raw = load_raw(path).await?;
    let value = resolve_env_vars(&raw, env).context("Failed to resolve env vars in config")?;

    let config: CardreadConfig = serde_json::from_value(value)
        .with_context(|| format!("Config at {} does not match the schema", path.display()))?;
    let config = apply_env_overrides(config, env);
    let config = apply_all_defaults(config);

    let report = validate(&config);
    Ok((config, report))
}

/// Log every warning and error; fail with the first error, if any.
pub fn log_report(report: &ValidationReport) -> Result<()> {
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    match report.errors.first() {
        Some(first) => anyhow::bail!("{first}"),
        None => Ok(()),
    }
}
