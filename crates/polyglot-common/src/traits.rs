//! Trait seams between the client and whatever produces condensed dictionaries.

use crate::condensed::CondensedDictionary;
use crate::types::{Locale, Result, Zone};
use async_trait::async_trait;
use std::sync::Arc;

/// Produces one condensed dictionary per requested zone, in the same order
/// as `zones`, for the given locale preference list.
///
/// Implemented by the server crate; clients only ever see this trait, so a
/// network transport can stand in for a local server.
#[async_trait]
pub trait Condense: Send + Sync {
    /// Condenses the translations of `zones` for `locales`.
    async fn condense(&self, locales: &[Locale], zones: &[Zone])
        -> Result<Vec<CondensedDictionary>>;
}

#[async_trait]
impl<T: Condense + ?Sized> Condense for Arc<T> {
    async fn condense(
        &self,
        locales: &[Locale],
        zones: &[Zone],
    ) -> Result<Vec<CondensedDictionary>> {
        (**self).condense(locales, zones).await
    }
}
