use std::error::Error;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or rejected the operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// What the backend was doing.
        message: String,
        /// Driver error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A stored record could not be decoded into its entity.
    #[error("stored {kind} `{id}` is corrupted: {reason}")]
    Corrupted {
        /// Entity name, e.g. `game`.
        kind: &'static str,
        /// Identifier of the record.
        id: Uuid,
        /// Decoding failure.
        reason: String,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a decoding error for the record `id` of the given kind.
    pub fn corrupted(kind: &'static str, id: Uuid, reason: impl Into<String>) -> Self {
        StorageError::Corrupted {
            kind,
            id,
            reason: reason.into(),
        }
    }
}
