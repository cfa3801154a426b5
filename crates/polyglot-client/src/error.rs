//! Error types for the client.

use polyglot_common::Locale;

/// Client-specific error type.
///
/// Cloneable so that one batch outcome can be handed to every caller
/// waiting on it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The condense function failed.
    #[error("Condense failed: {0}")]
    Condense(String),

    /// The batch was cancelled before it started fetching.
    #[error("Loading was cancelled")]
    Cancelled,

    /// Zone loading needs a running Tokio runtime.
    #[error("No Tokio runtime available to load zones")]
    NoRuntime,

    /// The condense function returned a different number of dictionaries
    /// than zones requested.
    #[error("Expected {expected} condensed dictionaries, received {received}")]
    ZoneCount {
        /// Zones requested.
        expected: usize,
        /// Dictionaries received.
        received: usize,
    },

    /// A configuration value cannot be used.
    #[error("Invalid client configuration: {0}")]
    Config(String),

    /// A partial load was exported for other locales.
    #[error("Partial load for {received:?} cannot seed a client using {expected:?}")]
    LocaleMismatch {
        /// Locales of this client.
        expected: Vec<Locale>,
        /// Locales of the partial load.
        received: Vec<Locale>,
    },
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
