use std::path::PathBuf;

use thiserror::Error;

use crate::artifact::ArtifactKind;

/// Errors that can occur while producing or consuming pipeline artifacts.
#[derive(Debug, Error)]
pub enum TanrenError {
    /// A predecessor artifact required by a stage is absent.
    #[error("missing {artifact} artifact: {}", path.display())]
    MissingArtifact {
        /// Which artifact was expected.
        artifact: ArtifactKind,
        /// Where it was expected.
        path: PathBuf,
    },

    /// An artifact exists but violates one of its invariants.
    #[error("invalid {artifact} artifact: {reason}")]
    InvalidArtifact {
        /// Which artifact is malformed.
        artifact: ArtifactKind,
        /// Human-readable description of the violation.
        reason: String,
    },

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in an artifact.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TanrenError {
    /// Shorthand for [`TanrenError::InvalidArtifact`].
    pub fn invalid(artifact: ArtifactKind, reason: impl Into<String>) -> Self {
        Self::InvalidArtifact {
            artifact,
            reason: reason.into(),
        }
    }

    /// Returns `true` if a stage aborted because its input was absent.
    #[must_use]
    pub fn is_missing_artifact(&self) -> bool {
        matches!(self, Self::MissingArtifact { .. })
    }
}

/// Result type alias for tanren operations.
pub type Result<T> = std::result::Result<T, TanrenError>;
