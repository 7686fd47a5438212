use std::path::{Path, PathBuf};

use anyhow::Result;
use cardread_config::{CardreadConfig, config_dir, config_file_path, load_with_report, log_report, process_env};
use cardread_logging::{init_logger, LoggerOptions};

/// Config file to read: `--config` if given, else the default location.
pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config_file_path(&config_dir()))
}

/// Load the config, start logging from it, then report validation results.
pub async fn load(path: &Path) -> Result<CardreadConfig> {
    let (config, report) = load_with_report(path, &process_env()).await?;
    init_logger(&logger_options(&config));
    log_report(&report)?;
    Ok(config)
}

pub fn logger_options(config: &CardreadConfig) -> LoggerOptions {
    let logging = config.logging();
    let base = LoggerOptions::default();
    LoggerOptions {
        level: logging.level.unwrap_or(base.level),
        dir: logging.dir.map(PathBuf::from),
        json: logging.json.unwrap_or(base.json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardread_config::LoggingConfig;

    #[test]
    fn explicit_path_wins() {
        let path = resolve_path(Some(Path::new("/tmp/custom.yaml")));
        assert_eq!(path, PathBuf::from("/tmp/custom.yaml"));
    }

    #[test]
    fn default_path_is_config_yaml() {
        assert!(resolve_path(None).ends_with("config.yaml"));
    }

    #[test]
    fn logger_options_follow_config() {
        let config = CardreadConfig {
            logging: Some(LoggingConfig {
                level: Some("debug".into()),
                dir: Some("/var/log/cardread".into()),
                json: Some(true),
            }),
            ..Default::default()
        };
        let options = logger_options(&config);
        assert_eq!(options.level, "debug");
        assert_eq!(options.dir, Some(PathBuf::from("/var/log/cardread")));
        assert!(options.json);
    }
}
