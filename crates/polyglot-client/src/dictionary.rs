//! The client-side dictionary: condensed payloads merged together, each text
//! remembering the zone it came from.

use polyglot_common::{CondensedDictionary, TextKey, Translation, Zone};
use std::collections::{BTreeMap, BTreeSet};

/// A text held by the client dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// The text.
    pub text: Translation,
    /// Zone the text was loaded from.
    pub zone: Zone,
    /// Whether the text comes from a less preferred locale.
    pub fallback: bool,
}

/// A node of the client dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientDictionary {
    /// Text stored at this exact path.
    pub entry: Option<DictionaryEntry>,
    /// Child nodes indexed by key segment.
    pub children: BTreeMap<String, ClientDictionary>,
}

impl ClientDictionary {
    /// True when the node has neither text nor children.
    pub fn is_empty(&self) -> bool {
        self.entry.is_none() && self.children.is_empty()
    }

    /// Overlays a condensed payload of `zone`. Texts of the payload replace
    /// the texts found at the same paths.
    pub fn merge(&mut self, condensed: &CondensedDictionary, zone: &str) {
        if let Some(text) = &condensed.text {
            self.entry = Some(DictionaryEntry {
                text: text.clone(),
                zone: zone.to_string(),
                fallback: condensed.fallback,
            });
        }
        for (segment, child) in &condensed.children {
            self.children
                .entry(segment.clone())
                .or_default()
                .merge(child, zone);
        }
    }

    /// Returns the node at `key`, if the path exists.
    pub fn get(&self, key: &str) -> Option<&Self> {
        if key.is_empty() {
            return Some(self);
        }
        key.split('.')
            .try_fold(self, |node, segment| node.children.get(segment))
    }

    /// Finds the text of the longest prefix of `key` that has one.
    pub fn resolve(&self, key: &str) -> Option<&DictionaryEntry> {
        let mut candidate = None;
        let mut node = self;
        for segment in key.split('.') {
            match node.children.get(segment) {
                Some(child) => {
                    if child.entry.is_some() {
                        candidate = child.entry.as_ref();
                    }
                    node = child;
                }
                None => break,
            }
        }
        candidate
    }

    /// Sets the text of `key` from a live modification, or removes it when
    /// `value` is `None`. Nodes left empty by a removal are pruned.
    pub fn apply(&mut self, key: &str, value: Option<(&str, &str)>) {
        let segments: Vec<&str> = key.split('.').collect();
        match value {
            Some((text, zone)) => {
                let node = segments.iter().fold(self, |node, segment| {
                    node.children.entry((*segment).to_string()).or_default()
                });
                node.entry = Some(DictionaryEntry {
                    text: text.to_string(),
                    zone: zone.to_string(),
                    fallback: false,
                });
            }
            None => {
                self.remove(&segments);
            }
        }
    }

    fn remove(&mut self, segments: &[&str]) -> bool {
        match segments.split_first() {
            None => {
                self.entry = None;
            }
            Some((segment, rest)) => {
                if let Some(child) = self.children.get_mut(*segment) {
                    if child.remove(rest) {
                        self.children.remove(*segment);
                    }
                }
            }
        }
        self.is_empty()
    }

    /// Splits the dictionary back into one condensed payload per zone,
    /// leaving out the zones of `excluded`.
    pub fn export(&self, excluded: &BTreeSet<Zone>) -> BTreeMap<Zone, CondensedDictionary> {
        fn recur(
            node: &ClientDictionary,
            path: &str,
            excluded: &BTreeSet<Zone>,
            out: &mut BTreeMap<Zone, CondensedDictionary>,
        ) {
            if let Some(entry) = &node.entry {
                if !excluded.contains(&entry.zone) {
                    out.entry(entry.zone.clone()).or_default().insert(
                        path,
                        entry.text.clone(),
                        entry.fallback,
                    );
                }
            }
            for (segment, child) in &node.children {
                let child_path = if path.is_empty() {
                    segment.clone()
                } else {
                    format!("{path}.{segment}")
                };
                recur(child, &child_path, excluded, out);
            }
        }
        let mut out = BTreeMap::new();
        recur(self, "", excluded, &mut out);
        out
    }

    /// Lists every key carrying a text.
    pub fn keys(&self) -> Vec<TextKey> {
        fn recur(node: &ClientDictionary, path: &str, keys: &mut Vec<TextKey>) {
            if !path.is_empty() && node.entry.is_some() {
                keys.push(path.to_string());
            }
            for (segment, child) in &node.children {
                let child_path = if path.is_empty() {
                    segment.clone()
                } else {
                    format!("{path}.{segment}")
                };
                recur(child, &child_path, keys);
            }
        }
        let mut keys = Vec::new();
        recur(self, "", &mut keys);
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condensed(entries: &[(&str, &str, bool)]) -> CondensedDictionary {
        let mut dictionary = CondensedDictionary::default();
        for (key, text, fallback) in entries {
            dictionary.insert(key, *text, *fallback);
        }
        dictionary
    }

    #[test]
    fn test_merge_tags_zone_and_fallback() {
        let mut dictionary = ClientDictionary::default();
        dictionary.merge(&condensed(&[("fld.name", "Name", true)]), "");
        dictionary.merge(&condensed(&[("cmd.ban", "Bannir", false)]), "adm");

        let name = dictionary.resolve("fld.name").unwrap();
        assert!(name.fallback);
        assert_eq!(name.zone, "");
        assert_eq!(dictionary.resolve("cmd.ban").unwrap().zone, "adm");
    }

    #[test]
    fn test_leaf_becomes_branch() {
        let mut dictionary = ClientDictionary::default();
        dictionary.merge(&condensed(&[("fld.bdate", "Birthday", false)]), "");
        dictionary.merge(&condensed(&[("fld.bdate.short", "B-dy", false)]), "");
        assert_eq!(dictionary.resolve("fld.bdate").unwrap().text, "Birthday");
        assert_eq!(dictionary.resolve("fld.bdate.short").unwrap().text, "B-dy");
    }

    #[test]
    fn test_resolve_uses_deepest_prefix() {
        let mut dictionary = ClientDictionary::default();
        dictionary.merge(&condensed(&[("fld.name", "Name", false)]), "");
        assert_eq!(dictionary.resolve("fld.name.short").unwrap().text, "Name");
        assert!(dictionary.resolve("fld").is_none());
        assert!(dictionary.resolve("fld.other").is_none());
    }

    #[test]
    fn test_apply_prunes_empty_nodes() {
        let mut dictionary = ClientDictionary::default();
        dictionary.merge(&condensed(&[("fld.name", "Name", false)]), "");
        dictionary.apply("cmd.save", Some(("Save", "adm")));
        assert_eq!(dictionary.resolve("cmd.save").unwrap().zone, "adm");

        dictionary.apply("cmd.save", None);
        assert!(dictionary.get("cmd").is_none());
        assert!(dictionary.get("fld.name").is_some());
    }

    #[test]
    fn test_export_splits_by_zone() {
        let mut dictionary = ClientDictionary::default();
        dictionary.merge(&condensed(&[("fld.name", "Name", false)]), "");
        dictionary.merge(&condensed(&[("cmd.ban", "Ban", false)]), "adm");

        let all = dictionary.export(&BTreeSet::new());
        assert_eq!(all.len(), 2);
        assert_eq!(all["adm"].get("cmd.ban").unwrap().text.as_deref(), Some("Ban"));

        let partial = dictionary.export(&BTreeSet::from([String::new()]));
        assert_eq!(partial.keys().collect::<Vec<_>>(), vec!["adm"]);
        assert_eq!(dictionary.keys(), vec!["cmd.ban", "fld.name"]);
    }
}
