//! Error taxonomy for the fetch pipeline
//!
//! Loading, building and executing fail fast with a single [`FetchError`].
//! Artifact persistence never aborts on the first failure: every write task
//! reports its own [`PersistError`] and the orchestrator folds them into
//! [`FetchError::Persist`] once all tasks have finished.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to read {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid cookie file {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("cannot build request: {0}")]
    Build(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("malformed response: {0}")]
    Protocol(#[source] reqwest::Error),

    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{} artifact(s) failed to persist: {}", .0.len(), summarize(.0))]
    Persist(Vec<PersistError>),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// The three artifacts written after a request completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    Body,
    Redirects,
    Cookies,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Artifact::Body => "response body",
            Artifact::Redirects => "redirect history",
            Artifact::Cookies => "cookie jar",
        };
        f.write_str(name)
    }
}

/// A single failed persistence task
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("failed to save {artifact} to {}: {source}", path.display())]
    Storage {
        artifact: Artifact,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {artifact}: {source}")]
    Serialization {
        artifact: Artifact,
        #[source]
        source: serde_json::Error,
    },

    #[error("{artifact} task aborted: {reason}")]
    Aborted { artifact: Artifact, reason: String },
}

impl PersistError {
    /// Artifact this failure belongs to
    pub fn artifact(&self) -> Artifact {
        match self {
            PersistError::Storage { artifact, .. }
            | PersistError::Serialization { artifact, .. }
            | PersistError::Aborted { artifact, .. } => *artifact,
        }
    }
}

fn summarize(errors: &[PersistError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_error_lists_every_failure() {
        let err = FetchError::Persist(vec![
            PersistError::Aborted {
                artifact: Artifact::Body,
                reason: "panicked".to_string(),
            },
            PersistError::Storage {
                artifact: Artifact::Cookies,
                path: PathBuf::from("/tmp/out/cookies.json"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            },
        ]);

        let message = err.to_string();
        assert!(message.starts_with("2 artifact(s) failed to persist"));
        assert!(message.contains("response body task aborted"));
        assert!(message.contains("cookie jar"));
        assert!(message.contains("/tmp/out/cookies.json"));
    }

    #[test]
    fn artifact_accessor_matches_variant() {
        let err = PersistError::Aborted {
            artifact: Artifact::Redirects,
            reason: String::new(),
        };
        assert_eq!(err.artifact(), Artifact::Redirects);
    }
}
