//! Crate-level error type.
//!
//! The generation-loop variants (`Network`, `Http`, `EmptyResponse`,
//! `RejectedContent`) are all non-fatal to the auto-pilot: the loop logs
//! them and treats the tick as a no-op. The persistence and config
//! variants are surfaced to the user and abort the command.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DraftError {
    /// The request could not complete at the transport level.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote endpoint replied with a non-2xx HTTP status code.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// The request succeeded but no text could be extracted from the
    /// response body under any known shape.
    #[error("no text found in upstream response")]
    EmptyResponse,

    /// Text was extracted but fell below the minimum acceptable length.
    #[error("generated text too short: {words} words (minimum {min})")]
    RejectedContent { words: usize, min: usize },

    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid project file {path}: {source}")]
    Project {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("no chapter matches '{0}'")]
    UnknownChapter(String),

    /// A project always keeps at least one chapter.
    #[error("cannot delete the only chapter")]
    LastChapter,
}

impl DraftError {
    /// Whether the auto-pilot loop should swallow this error and keep
    /// scheduling ticks.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DraftError::Network { .. }
                | DraftError::Http { .. }
                | DraftError::EmptyResponse
                | DraftError::RejectedContent { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_display_includes_status_and_url() {
        let err = DraftError::Http {
            status: 503,
            url: "http://localhost:8000/chat/message".to_string(),
        };
        let s = err.to_string();
        assert!(s.contains("503"), "status in display: {s}");
        assert!(s.contains("/chat/message"), "url in display: {s}");
    }

    #[test]
    fn test_rejected_content_display() {
        let err = DraftError::RejectedContent { words: 37, min: 100 };
        let s = err.to_string();
        assert!(s.contains("37"), "word count in display: {s}");
        assert!(s.contains("100"), "minimum in display: {s}");
    }

    #[test]
    fn test_generation_errors_are_transient() {
        assert!(DraftError::EmptyResponse.is_transient());
        assert!(DraftError::RejectedContent { words: 1, min: 100 }.is_transient());
        assert!(DraftError::Http { status: 500, url: "x".into() }.is_transient());
    }

    #[test]
    fn test_persistence_errors_are_not_transient() {
        let err = DraftError::Io {
            path: "novel.json".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(!err.is_transient());
        assert!(!DraftError::LastChapter.is_transient());
    }

    #[test]
    fn test_is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&DraftError::EmptyResponse);
    }
}
