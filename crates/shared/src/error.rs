use std::path::PathBuf;

use thiserror::Error;

/// Everything the headline and drafting pipelines can fail with.
///
/// `SourceFetch` and `Selector` only ever show up in log lines from the bulk
/// headline loop; every other variant is returned to the caller.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to fetch headlines from {source_name}: {reason}")]
    SourceFetch { source_name: String, reason: String },

    #[error("failed to fetch article {url}: {reason}")]
    ArticleFetch { url: String, reason: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unexpected model response: {0}")]
    UnexpectedResponse(String),

    #[error("malformed model response: {reason}")]
    MalformedResponse { reason: String },

    #[error("Claude API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid selector '{0}'")]
    Selector(String),

    #[error("invalid source '{name}': {reason}")]
    InvalidSource { name: String, reason: String },

    #[error("invalid planning context: {0}")]
    InvalidContext(String),

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    pub fn article(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::ArticleFetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures a user can reasonably fix by asking again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedResponse(_)
                | Self::MalformedResponse { .. }
                | Self::Api { .. }
                | Self::Http(_)
                | Self::ArticleFetch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = PipelineError::article("https://example.test/a", "HTTP 404");
        assert_eq!(
            err.to_string(),
            "failed to fetch article https://example.test/a: HTTP 404"
        );

        let err = PipelineError::Configuration("ANTHROPIC_API_KEY is not set".into());
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn configuration_errors_are_not_retryable() {
        assert!(!PipelineError::Configuration("missing key".into()).is_retryable());
        assert!(PipelineError::malformed("expected value at line 1").is_retryable());
    }
}
