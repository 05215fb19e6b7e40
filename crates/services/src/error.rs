//! Shared error types for the services crate.

use std::fmt;
use thiserror::Error;

use vocab_core::model::SessionError;

/// Failure classes for the word-generation endpoint.
///
/// The class drives the caller's retry policy, so `timeout` is kept distinct
/// from a generic `network` failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    /// Transport-level failure reaching the endpoint.
    Network,
    /// The endpoint did not respond within the bound.
    Timeout,
    /// Caller-supplied or server-returned data failed shape checks.
    Validation,
    /// Endpoint reachable but returned an error status or an empty or
    /// malformed payload.
    Generation,
}

impl fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Validation => "validation",
            Self::Generation => "generation",
        };
        write!(f, "{name}")
    }
}

/// Typed failure surfaced by session creation when word generation fails.
///
/// Carries the flags the calling UI needs: offer a retry when `retryable` and
/// an offline option when `fallback_available`. The core only classifies; it
/// renders nothing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("word generation failed ({kind}): {message}")]
pub struct GenerationError {
    kind: GenerationErrorKind,
    message: String,
}

impl GenerationError {
    #[must_use]
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Network, message)
    }

    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Timeout, message)
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Validation, message)
    }

    #[must_use]
    pub fn generation(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Generation, message)
    }

    /// Classify an HTTP status from the generation endpoint.
    ///
    /// 400-class responses mean the request itself was rejected, so they
    /// land in `Validation`; everything else non-2xx is `Generation`.
    #[must_use]
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        if status.is_client_error() {
            Self::validation(format!("endpoint rejected request with {status}"))
        } else {
            Self::generation(format!("endpoint returned {status}"))
        }
    }

    /// Last-resort classification from free-text failure messages.
    ///
    /// Only used for third-party errors that carry no structured code;
    /// structured signals (timeout flags, status codes) always win.
    #[must_use]
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("timeout") || lower.contains("timed out") || lower.contains("expired") {
            Self::timeout(message)
        } else if lower.contains("network") || lower.contains("connection") {
            Self::network(message)
        } else {
            // covers "rate limit" and anything else unrecognized
            Self::generation(message)
        }
    }

    #[must_use]
    pub fn kind(&self) -> GenerationErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether an immediate retry (with backoff) is worth offering.
    #[must_use]
    pub fn retryable(&self) -> bool {
        !matches!(self.kind, GenerationErrorKind::Validation)
    }

    /// Whether the offline fallback word list is a sensible alternative.
    /// A validation failure means the request itself was malformed, and a
    /// fallback list would not address that.
    #[must_use]
    pub fn fallback_available(&self) -> bool {
        !matches!(self.kind, GenerationErrorKind::Validation)
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            Self::network(err.to_string())
        } else if let Some(status) = err.status() {
            Self::from_status(status)
        } else {
            Self::from_message(&err.to_string())
        }
    }
}

/// Errors emitted by `SessionManager::create_*` operations.
///
/// Generation failures are the one case propagated to the caller; storage
/// failures on the best-effort persistence paths are logged instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CreateSessionError {
    #[error("word generator is not configured")]
    GeneratorUnavailable,
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_status_classifies_as_validation() {
        let err = GenerationError::from_status(reqwest::StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), GenerationErrorKind::Validation);
        assert!(!err.retryable());
        assert!(!err.fallback_available());
    }

    #[test]
    fn server_error_status_classifies_as_generation() {
        let err = GenerationError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), GenerationErrorKind::Generation);
        assert!(err.retryable());
        assert!(err.fallback_available());
    }

    #[test]
    fn network_errors_are_retryable_with_fallback() {
        let err = GenerationError::network("connection refused");
        assert_eq!(err.kind(), GenerationErrorKind::Network);
        assert!(err.retryable());
        assert!(err.fallback_available());
    }

    #[test]
    fn free_text_classification_recognizes_known_phrases() {
        assert_eq!(
            GenerationError::from_message("request timed out after 10s").kind(),
            GenerationErrorKind::Timeout
        );
        assert_eq!(
            GenerationError::from_message("token expired").kind(),
            GenerationErrorKind::Timeout
        );
        assert_eq!(
            GenerationError::from_message("connection reset by peer").kind(),
            GenerationErrorKind::Network
        );
        assert_eq!(
            GenerationError::from_message("rate limit exceeded").kind(),
            GenerationErrorKind::Generation
        );
        assert_eq!(
            GenerationError::from_message("something odd").kind(),
            GenerationErrorKind::Generation
        );
    }
}
