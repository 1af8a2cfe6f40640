use thiserror::Error;

use missive_shared::MissiveError;
use missive_store::StoreError;

/// Errors surfaced by edit requests and edit notification processing.
#[derive(Error, Debug)]
pub enum EditError {
    /// The message or conversation does not exist locally.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// The target message never received a server sequence number.
    #[error("message {client_msg_id} was not acknowledged by the server in time")]
    NotSynced { client_msg_id: String },

    /// The target message is in a state that does not allow the operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A collaborator (store, directory, group service, network) failed.
    #[error("{service} call failed: {source}")]
    Upstream {
        service: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A notification payload could not be decoded.
    #[error("Malformed notification: {0}")]
    Deserialization(#[from] MissiveError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EditError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn upstream(service: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Upstream {
            service,
            source: source.into(),
        }
    }

    /// Map a store error, turning a missing row into [`EditError::NotFound`].
    pub(crate) fn from_store(err: StoreError, entity: &'static str, key: impl Into<String>) -> Self {
        match err {
            StoreError::NotFound => Self::not_found(entity, key),
            other => Self::upstream("store", other),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EditError>;
