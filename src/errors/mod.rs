//! Unified error handling for report generation and publishing.

use std::path::PathBuf;

/// Application error type.
///
/// Malformed input *content* never produces an error; only inaccessible
/// inputs, bad configuration and publishing failures do.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Cannot read input file {}: {source}", .path.display())]
    InputAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No related pull request found for branch {0}")]
    NoPullRequest(String),

    #[error("Comment publishing failed: {0}")]
    Publish(String),

    #[error("Artifact upload failed: {0}")]
    Upload(String),

    #[error("Report rendering failed: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Check if this error aborts the run before any report exists.
    pub fn is_input_access(&self) -> bool {
        matches!(self, Self::InputAccess { .. })
    }

    /// Check if this error comes from the publishing side only.
    pub fn is_publish_failure(&self) -> bool {
        matches!(
            self,
            Self::NoPullRequest(_) | Self::Publish(_) | Self::Upload(_) | Self::Http(_)
        )
    }
}

/// Pipeline stage a top-level failure belongs to. Artifacts are already
/// written when the stage is `publish`.
pub fn failure_stage(err: &anyhow::Error) -> &'static str {
    let publish_only = err
        .downcast_ref::<AppError>()
        .is_some_and(AppError::is_publish_failure);
    if publish_only {
        "publish"
    } else {
        "generate"
    }
}
