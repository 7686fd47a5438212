//! Structured logging for cardread.
//!
//! Subscriber setup (console + rolling NDJSON file) and secret scrubbing for
//! strings that end up in log fields.

pub mod logger;
pub mod redact;

pub use logger::{build_filter, init_logger, LoggerOptions};
pub use redact::{redact_for_log, redact_sensitive_data};
