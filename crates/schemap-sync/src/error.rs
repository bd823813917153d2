//! Error types for synchronization, notification and persistence.

use std::path::PathBuf;

use schemap_model::ModelError;
use thiserror::Error;

/// Errors from [`crate::MappingService`] and [`crate::MappingWorkflow`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    /// A workflow request arrived without one of its schemas.
    #[error("mapping request has no {role} schema")]
    MissingSchema { role: &'static str },

    #[error("invalid {role} schema")]
    InvalidSchema {
        role: &'static str,
        #[source]
        source: ModelError,
    },

    /// Event payload could not be turned into JSON.
    #[error("failed to encode {event_type} payload")]
    Encode {
        event_type: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Errors returned by a [`crate::NotificationSink`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PublishError {
    #[error("sink rejected message for topic {topic}: {reason}")]
    Rejected { topic: String, reason: String },
}

/// Errors from [`crate::MappingRepository`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize mapping set for {path}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse mapping set from {path}")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl RepositoryError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
