//! Typed failures returned by the acquisition pipeline, the cache and the
//! query engine.
//!
//! The core never prints; callers (the CLI) decide how each variant is
//! presented and which exit code it maps to.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, OnThisDayError>;

#[derive(Debug, Error)]
pub enum OnThisDayError {
    /// The remote source could not be reached or answered with a failure status.
    #[error("source unavailable: {url}: {reason}")]
    SourceUnavailable {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// The upstream document no longer has the shape the parser expects.
    #[error("upstream structure changed: {0}")]
    Parse(String),

    #[error("no cached events for {0}")]
    CacheMiss(String),

    #[error("invalid category: {0}")]
    InvalidCategory(String),

    #[error("no events found for {0}")]
    NoEventsFound(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("cache I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt cache entry at {}: {source}", path.display())]
    CorruptEntry {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl OnThisDayError {
    /// Returns true for transient errors that may succeed on retry.
    ///
    /// Only network-level failures qualify; a parse failure will not fix
    /// itself by asking again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a `SourceUnavailable` from a transport error.
    pub(crate) fn transport(url: &str, err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            format!("timed out: {err}")
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        Self::SourceUnavailable {
            url: url.to_string(),
            status: err.status().map(|s| s.as_u16()),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_source_failures_are_retryable() {
        let unavailable = OnThisDayError::SourceUnavailable {
            url: "https://example.org".to_string(),
            status: Some(503),
            reason: "HTTP 503".to_string(),
        };
        assert!(unavailable.is_retryable());
        assert!(!OnThisDayError::Parse("no Events heading".into()).is_retryable());
        assert!(!OnThisDayError::CacheMiss("July 4".into()).is_retryable());
    }

    #[test]
    fn io_error_message_names_path() {
        let err = OnThisDayError::io(
            "/tmp/cache/July_4.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/cache/July_4.json"));
        assert!(msg.contains("denied"));
    }
}
