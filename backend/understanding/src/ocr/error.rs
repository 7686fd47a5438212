//! OCR error taxonomy.

use super::wire::PollStatus;

/// Which leg of the protocol a failure happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Submit,
    Poll,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Submit => "submit",
            Self::Poll => "poll",
        })
    }
}

/// Coarse classification callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrErrorKind {
    NotConfigured,
    Transport,
    Protocol,
    Timeout,
    ServiceFailure,
    Cancelled,
}

/// Failure from the network layer, before any HTTP status is known.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR is not configured (missing key or endpoint)")]
    NotConfigured,

    #[error("{phase} request failed: {source}")]
    Transport {
        phase: Phase,
        #[source]
        source: TransportError,
    },

    #[error("{phase} request returned HTTP {status}: {body}")]
    HttpStatus { phase: Phase, status: u16, body: String },

    #[error("service did not return an Operation-Location header")]
    MissingOperationLocation,

    #[error("malformed poll response: {0}")]
    MalformedResponse(String),

    #[error("timed out after {attempts} polls (last status: {last_status})")]
    TimedOut { attempts: u32, last_status: PollStatus },

    #[error("OCR failed with status: {status}")]
    ServiceFailed { status: PollStatus },

    #[error("OCR request cancelled")]
    Cancelled,
}

impl OcrError {
    pub fn kind(&self) -> OcrErrorKind {
        match self {
            Self::NotConfigured => OcrErrorKind::NotConfigured,
            Self::Transport { .. } | Self::HttpStatus { .. } => OcrErrorKind::Transport,
            Self::MissingOperationLocation | Self::MalformedResponse(_) => OcrErrorKind::Protocol,
            Self::TimedOut { .. } => OcrErrorKind::Timeout,
            Self::ServiceFailed { .. } => OcrErrorKind::ServiceFailure,
            Self::Cancelled => OcrErrorKind::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_counts_as_transport() {
        let err = OcrError::HttpStatus { phase: Phase::Poll, status: 401, body: String::new() };
        assert_eq!(err.kind(), OcrErrorKind::Transport);
        assert!(err.to_string().starts_with("poll request returned HTTP 401"));
    }

    #[test]
    fn timeout_message_carries_status() {
        let err = OcrError::TimedOut { attempts: 10, last_status: PollStatus::Running };
        assert_eq!(err.to_string(), "timed out after 10 polls (last status: running)");
    }
}
