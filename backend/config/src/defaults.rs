//! Config defaults: fills unset fields after loading and env overrides.

use crate::schema::{CardreadConfig, LoggingConfig, PollConfig, VisionConfig};

/// Read API path appended to the endpoint.
pub const DEFAULT_API_PATH: &str = "vision/v3.2/read/analyze";

/// Polls made before giving up on a queued operation.
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 10;

/// Fixed wait before each poll.
pub const DEFAULT_POLL_DELAY_MS: u64 = 1_000;

/// Constant cadence unless overridden.
pub const DEFAULT_POLL_BACKOFF_FACTOR: f64 = 1.0;

pub const DEFAULT_POLL_MAX_DELAY_MS: u64 = 30_000;

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a loaded config.
pub fn apply_all_defaults(config: CardreadConfig) -> CardreadConfig {
    let config = apply_vision_defaults(config);
    apply_logging_defaults(config)
}

fn apply_vision_defaults(mut config: CardreadConfig) -> CardreadConfig {
    let vision = config.vision.get_or_insert_with(VisionConfig::default);
    if vision.api_path.is_none() {
        vision.api_path = Some(DEFAULT_API_PATH.to_string());
    }
    if vision.request_timeout_ms.is_none() {
        vision.request_timeout_ms = Some(DEFAULT_REQUEST_TIMEOUT_MS);
    }

    let poll = vision.poll.get_or_insert_with(PollConfig::default);
    poll.max_attempts.get_or_insert(DEFAULT_POLL_MAX_ATTEMPTS);
    poll.delay_ms.get_or_insert(DEFAULT_POLL_DELAY_MS);
    poll.backoff_factor.get_or_insert(DEFAULT_POLL_BACKOFF_FACTOR);
    poll.max_delay_ms.get_or_insert(DEFAULT_POLL_MAX_DELAY_MS);
    poll.jitter.get_or_insert(false);
    config
}

fn apply_logging_defaults(mut config: CardreadConfig) -> CardreadConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.json.is_none() {
        logging.json = Some(false);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_poll_cadence() {
        let cfg = apply_all_defaults(CardreadConfig::default());
        let poll = cfg.vision().poll.unwrap();
        assert_eq!(poll.max_attempts, Some(DEFAULT_POLL_MAX_ATTEMPTS));
        assert_eq!(poll.delay_ms, Some(DEFAULT_POLL_DELAY_MS));
        assert_eq!(poll.jitter, Some(false));
        assert_eq!(cfg.vision().api_path.as_deref(), Some(DEFAULT_API_PATH));
    }

    #[test]
    fn does_not_override_user_values() {
        let cfg = CardreadConfig {
            vision: Some(VisionConfig {
                poll: Some(PollConfig {
                    max_attempts: Some(3),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            logging: Some(LoggingConfig {
                level: Some("debug".into()),
                ..Default::default()
            }),
        };
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.vision().poll.unwrap().max_attempts, Some(3));
        assert_eq!(cfg.logging().level.as_deref(), Some("debug"));
    }

    #[test]
    fn leaves_credentials_unset() {
        let cfg = apply_all_defaults(CardreadConfig::default());
        assert!(cfg.vision().credentials().is_none());
    }
}
