//! Error types for translation stores.

use polyglot_common::{PolyglotError, TextKey};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-specific error type.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The key does not exist.
    #[error("Key not found: {0}")]
    KeyNotFound(TextKey),

    /// A rename targets a key that already exists.
    #[error("Key already exists: {0}")]
    KeyExists(TextKey),

    /// A key or locale failed validation.
    #[error(transparent)]
    Invalid(#[from] PolyglotError),

    /// Serialized dictionary content could not be parsed.
    #[error("Unparsable data at line {line}: {excerpt}")]
    Unparsable {
        /// 1-based line of the failure.
        line: usize,
        /// Text found at the failure position.
        excerpt: String,
    },

    /// File content is not valid UTF-16LE.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by an external storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}
