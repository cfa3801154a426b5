//! Error types for the condenser and the interactive server.

use polyglot_common::TextKey;
use polyglot_store::StoreError;
use uuid::Uuid;

/// Server-specific error type.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A subscriber failed to receive its modifications.
    #[error("Subscriber {id} failed: {message}")]
    Subscriber {
        /// Registration id of the subscriber.
        id: Uuid,
        /// What the subscriber reported.
        message: String,
    },

    /// Whether a subscriber sees a modification could not be decided; the
    /// subscriber got none of the batch.
    #[error("Subscriber {id} skipped, visibility of {key} unknown: {source}")]
    Visibility {
        /// Registration id of the subscriber.
        id: Uuid,
        /// Key of the modification being checked.
        key: TextKey,
        /// The store failure.
        #[source]
        source: StoreError,
    },
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
