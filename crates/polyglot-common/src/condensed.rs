//! The condensed dictionary: the tree shipped from the condenser to clients.
//!
//! On the wire a node is either a bare string (a leaf carrying only a text)
//! or an object whose `""` entry holds the node's own text, whose `"."`
//! entry marks that text as a fallback, and whose other entries are child
//! segments.

use crate::types::{PolyglotError, PolyglotResult, TextKey, Translation};
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Wire key holding a node's own text.
pub const TEXT_ENTRY: &str = "";

/// Wire key marking a node's text as coming from a fallback locale.
pub const FALLBACK_MARKER: &str = ".";

/// A tree of translations for one zone, keyed by key segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CondensedDictionary {
    /// Text stored at this exact path.
    pub text: Option<Translation>,
    /// Whether `text` comes from a locale outside the requested locale's tree.
    pub fallback: bool,
    /// Child nodes indexed by the next key segment.
    pub children: BTreeMap<String, CondensedDictionary>,
}

impl CondensedDictionary {
    /// Creates a leaf holding a non-fallback text.
    pub fn leaf(text: impl Into<Translation>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// True when the node carries neither text nor children.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.children.is_empty()
    }

    /// Returns the node at `key`, if the path exists.
    pub fn get(&self, key: &str) -> Option<&Self> {
        key.split('.')
            .try_fold(self, |node, segment| node.children.get(segment))
    }

    /// Returns the node at `key`, creating every missing node on the way.
    pub fn entry(&mut self, key: &str) -> &mut Self {
        key.split('.').fold(self, |node, segment| {
            node.children.entry(segment.to_string()).or_default()
        })
    }

    /// Stores `text` at `key`.
    pub fn insert(&mut self, key: &str, text: impl Into<Translation>, fallback: bool) {
        let node = self.entry(key);
        node.text = Some(text.into());
        node.fallback = fallback;
    }

    /// Lists every key carrying a text, in tree order.
    pub fn long_key_list(&self) -> Vec<TextKey> {
        fn recur(node: &CondensedDictionary, prefix: &str, keys: &mut Vec<TextKey>) {
            if !prefix.is_empty() && node.text.is_some() {
                keys.push(prefix.to_string());
            }
            for (segment, child) in &node.children {
                let path = if prefix.is_empty() {
                    segment.clone()
                } else {
                    format!("{prefix}.{segment}")
                };
                recur(child, &path, keys);
            }
        }
        let mut keys = Vec::new();
        recur(self, "", &mut keys);
        keys
    }

    /// Merges `other` into `self`. Two texts at the same path are a conflict.
    pub fn merge(&mut self, other: &Self) -> PolyglotResult<()> {
        self.merge_at(other, "")
    }

    fn merge_at(&mut self, other: &Self, path: &str) -> PolyglotResult<()> {
        if let Some(text) = &other.text {
            if self.text.is_some() {
                return Err(PolyglotError::Conflict(path.to_string()));
            }
            self.text = Some(text.clone());
            self.fallback = other.fallback;
        }
        for (segment, child) in &other.children {
            let child_path = if path.is_empty() {
                segment.clone()
            } else {
                format!("{path}.{segment}")
            };
            self.children
                .entry(segment.clone())
                .or_default()
                .merge_at(child, &child_path)?;
        }
        Ok(())
    }
}

/// Merges several condensed dictionaries into one, failing on conflicting texts.
pub fn merge_condensed<'a>(
    dictionaries: impl IntoIterator<Item = &'a CondensedDictionary>,
) -> PolyglotResult<CondensedDictionary> {
    let mut merged = CondensedDictionary::default();
    for dictionary in dictionaries {
        merged.merge(dictionary)?;
    }
    Ok(merged)
}

impl Serialize for CondensedDictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.children.is_empty() && !self.fallback {
            if let Some(text) = &self.text {
                return serializer.serialize_str(text);
            }
        }
        let len = self.children.len()
            + usize::from(self.text.is_some())
            + usize::from(self.text.is_some() && self.fallback);
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(text) = &self.text {
            map.serialize_entry(TEXT_ENTRY, text)?;
            if self.fallback {
                map.serialize_entry(FALLBACK_MARKER, FALLBACK_MARKER)?;
            }
        }
        for (segment, child) in &self.children {
            map.serialize_entry(segment, child)?;
        }
        map.end()
    }
}

struct CondensedVisitor;

impl<'de> Visitor<'de> for CondensedVisitor {
    type Value = CondensedDictionary;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a translation string or a condensed dictionary node")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(CondensedDictionary::leaf(value))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(CondensedDictionary::leaf(value))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut node = CondensedDictionary::default();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                TEXT_ENTRY => node.text = Some(map.next_value()?),
                FALLBACK_MARKER => {
                    map.next_value::<IgnoredAny>()?;
                    node.fallback = true;
                }
                _ => {
                    let child = map.next_value()?;
                    node.children.insert(key, child);
                }
            }
        }
        Ok(node)
    }
}

impl<'de> Deserialize<'de> for CondensedDictionary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CondensedVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_uses_bare_strings_for_plain_leaves() {
        let mut dictionary = CondensedDictionary::default();
        dictionary.insert("fld.name", "Nom", false);
        dictionary.insert("fld.name.short", "Name", true);
        dictionary.insert("cmd", "Commandes", false);

        let json = serde_json::to_value(&dictionary).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cmd": "Commandes",
                "fld": { "name": { "": "Nom", "short": { "": "Name", ".": "." } } }
            })
        );

        let back: CondensedDictionary = serde_json::from_value(json).unwrap();
        assert_eq!(back, dictionary);
    }

    #[test]
    fn test_long_key_list() {
        let dictionary: CondensedDictionary = serde_json::from_value(serde_json::json!({
            "fld": { "": "Field", "name": "Name" },
            "cmd": { "save": "Save" }
        }))
        .unwrap();
        assert_eq!(dictionary.long_key_list(), vec!["cmd.save", "fld", "fld.name"]);
    }

    #[test]
    fn test_merge_promotes_leaves_and_detects_conflicts() {
        let mut left = CondensedDictionary::default();
        left.insert("fld", "Field", false);
        let mut right = CondensedDictionary::default();
        right.insert("fld.name", "Name", false);

        let merged = merge_condensed([&left, &right]).unwrap();
        assert_eq!(merged.get("fld").and_then(|n| n.text.as_deref()), Some("Field"));
        assert_eq!(merged.get("fld.name").and_then(|n| n.text.as_deref()), Some("Name"));

        assert_eq!(
            merge_condensed([&left, &left]),
            Err(PolyglotError::Conflict("fld".to_string()))
        );
    }
}
