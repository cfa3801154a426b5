//! Common type definitions shared by the store, server and client crates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A BCP-47-like locale tag such as `fr-BE`. The empty string is the
/// universal, locale-independent locale.
pub type Locale = String;

/// A zone identifier. The empty string is the always-loaded root zone.
pub type Zone = String;

/// A dot-separated text key such as `cmd.save`.
pub type TextKey = String;

/// A translation template.
pub type Translation = String;

/// Free-form metadata attached to a dictionary, a key or a single text.
pub type Infos = serde_json::Map<String, serde_json::Value>;

/// Common result type for the application.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Result type for operations that fail with a [`PolyglotError`].
pub type PolyglotResult<T> = std::result::Result<T, PolyglotError>;

/// The best translation found for each key of a zone: `key -> (locale, text)`.
///
/// Keys iterate in lexicographic order, so a key is always visited after
/// every one of its prefixes.
pub type RawDictionary = BTreeMap<TextKey, (Locale, Translation)>;

/// Live changes pushed to a client: the new text and zone of each key, or
/// `None` when the key no longer resolves for that client.
pub type ModifiedEntries = BTreeMap<TextKey, Option<(Translation, Zone)>>;

/// Shared error type for dictionary-level failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PolyglotError {
    /// A text key contains forbidden characters or a reserved segment.
    #[error("Bad key format: {0}")]
    InvalidKey(String),

    /// A locale tag contains forbidden characters.
    #[error("Bad locale format: {0}")]
    InvalidLocale(String),

    /// Object-literal notation could not be parsed.
    #[error("Unparsable literal at offset {offset}: {message}")]
    Literal {
        /// Byte offset of the failure in the parsed input.
        offset: usize,
        /// What the parser expected.
        message: String,
    },

    /// Two condensed dictionaries disagree on a key.
    #[error("Conflict while merging condensed dictionaries at key: {0}")]
    Conflict(TextKey),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// One locale's text for a key, as seen by translation tooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkText {
    /// The translation, absent when only metadata exists for this locale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Translation>,
    /// Per-text metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infos: Option<Infos>,
}

/// Everything known about a key, for translation tooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkEntry {
    /// Texts indexed by locale.
    pub texts: BTreeMap<Locale, WorkText>,
    /// The zone the key belongs to.
    pub zone: Zone,
    /// Per-key metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infos: Option<Infos>,
}

/// Full view of a store for a set of locales.
pub type WorkDictionary = BTreeMap<TextKey, WorkEntry>;
