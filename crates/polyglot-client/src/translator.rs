//! Translators: key path builders bound to a client and a set of zones.
//!
//! `translator.child("fld").child("name").call(&[])` and
//! `translator.t("fld.name", &[])` resolve the same text.

use crate::args::TranslationArg;
use crate::client::I18nClient;
use crate::dictionary::ClientDictionary;
use crate::internals::INTERNALS_KEY;
use crate::interpolation::Resolver;
use polyglot_common::{TextKey, Zone};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Translates keys under an optional key prefix.
#[derive(Clone)]
pub struct Translator {
    client: I18nClient,
    zones: Arc<[Zone]>,
    key: Option<TextKey>,
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("zones", &self.zones)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl Translator {
    pub(crate) fn new(client: I18nClient, zones: Vec<Zone>) -> Self {
        Self {
            client,
            zones: zones.into(),
            key: None,
        }
    }

    /// Key this translator points at; `None` for the root translator.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Zones this translator was entered with.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// The client behind this translator.
    pub const fn client(&self) -> &I18nClient {
        &self.client
    }

    fn path(&self, key: &str) -> TextKey {
        match &self.key {
            Some(prefix) if !key.is_empty() => format!("{prefix}.{key}"),
            Some(prefix) => prefix.clone(),
            None => key.to_string(),
        }
    }

    /// Translator for `segment` under this one's key.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        Self {
            client: self.client.clone(),
            zones: Arc::clone(&self.zones),
            key: Some(self.path(segment)),
        }
    }

    /// Translates this translator's key.
    pub fn call(&self, args: &[TranslationArg]) -> String {
        match &self.key {
            Some(key) => self.client.translate(&self.zones, key, args),
            None => self.client.with_resolver(&self.zones, |resolver| {
                resolver.error("", "Root translator called without key", &Value::Null)
            }),
        }
    }

    /// Translates `key`, relative to this translator's key.
    pub fn t(&self, key: &str, args: &[TranslationArg]) -> String {
        self.client.translate(&self.zones, &self.path(key), args)
    }
}

impl fmt::Display for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.call(&[]))
    }
}

/// Replaces every string of `source` by its translation, taken as a key
/// relative to `translator`. Arrays and objects are walked; other values are
/// kept.
pub fn bulk_object(translator: &Translator, source: &Value, args: &[TranslationArg]) -> Value {
    match source {
        Value::String(key) => Value::String(translator.t(key, args)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| bulk_object(translator, item, args))
                .collect(),
        ),
        Value::Object(members) => Value::Object(
            members
                .iter()
                .map(|(name, value)| (name.clone(), bulk_object(translator, value, args)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Every text under the translator's key, interpolated with `args`, as
/// nested objects. A node's own text is stored under `""`; `internals` are
/// left out.
pub fn bulk_dictionary(translator: &Translator, args: &[TranslationArg]) -> Value {
    let root = translator.key().unwrap_or_default();
    translator
        .client()
        .with_resolver(translator.zones(), |resolver| match resolver.dictionary.get(root) {
            Some(node) => dictionary_value(resolver, node, root, args),
            None => Value::String(resolver.missing(root, None)),
        })
}

fn dictionary_value(
    resolver: &Resolver<'_>,
    node: &ClientDictionary,
    path: &str,
    args: &[TranslationArg],
) -> Value {
    let mut object = Map::new();
    if let Some(entry) = &node.entry {
        let text = if entry.fallback {
            resolver.missing(path, Some(&entry.text))
        } else {
            entry.text.clone()
        };
        object.insert(String::new(), Value::String(resolver.interpolate(path, &text, args)));
    }
    for (segment, child) in &node.children {
        if path.is_empty() && segment == INTERNALS_KEY {
            continue;
        }
        let child_path = if path.is_empty() {
            segment.clone()
        } else {
            format!("{path}.{segment}")
        };
        object.insert(segment.clone(), dictionary_value(resolver, child, &child_path, args));
    }
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use polyglot_common::{Condense, CondensedDictionary, Locale};
    use serde_json::json;

    struct Fixed(CondensedDictionary);

    #[async_trait]
    impl Condense for Fixed {
        async fn condense(
            &self,
            _locales: &[Locale],
            zones: &[Zone],
        ) -> polyglot_common::Result<Vec<CondensedDictionary>> {
            Ok(zones
                .iter()
                .map(|zone| {
                    if zone.is_empty() {
                        self.0.clone()
                    } else {
                        CondensedDictionary::default()
                    }
                })
                .collect())
        }
    }

    async fn translator() -> Translator {
        let mut dictionary = CondensedDictionary::default();
        dictionary.insert("fld.name", "Name", false);
        dictionary.insert("fld.name.short", "N.", false);
        dictionary.insert("fld.bdate", "Birthday", true);
        dictionary.insert("msg.greet", "Hello {$1|here}", false);
        dictionary.insert("internals.plurals", "{one: '$', other: '$s'}", false);
        let client = I18nClient::new(&["en"], Arc::new(Fixed(dictionary)));
        client.enter(Vec::<Zone>::new()).await.unwrap()
    }

    #[tokio::test]
    async fn test_path_building() {
        let root = translator().await;
        let field = root.child("fld");
        assert_eq!(field.key(), Some("fld"));
        assert_eq!(field.child("name").call(&[]), "Name");
        assert_eq!(field.t("name.short", &[]), "N.");
        assert_eq!(root.t("msg.greet", &["Ann".into()]), "Hello Ann");
        assert_eq!(root.child("msg").child("greet").to_string(), "Hello here");
        assert_eq!(root.zones(), &[String::new()]);
    }

    #[tokio::test]
    async fn test_root_call_is_an_error() {
        let root = translator().await;
        assert_eq!(root.call(&[]), "[!Root translator called without key!]");
    }

    #[tokio::test]
    async fn test_bulk_object() {
        let root = translator().await;
        let source = json!({
            "title": "fld.name",
            "items": ["fld.bdate", "msg.greet"],
            "count": 3,
        });
        assert_eq!(
            bulk_object(&root, &source, &["Bob".into()]),
            json!({
                "title": "Name",
                "items": ["Birthday", "Hello Bob"],
                "count": 3,
            })
        );
    }

    #[tokio::test]
    async fn test_bulk_dictionary() {
        let root = translator().await;
        assert_eq!(
            bulk_dictionary(&root.child("fld"), &[]),
            json!({
                "name": { "": "Name", "short": { "": "N." } },
                "bdate": { "": "Birthday" },
            })
        );
        let whole = bulk_dictionary(&root, &[]);
        assert!(whole.get("internals").is_none());
        assert_eq!(whole["msg"]["greet"][""], "Hello here");
        assert_eq!(bulk_dictionary(&root.child("nope"), &[]), json!("[nope]"));
    }
}
