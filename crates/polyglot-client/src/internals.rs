//! Locale data shipped as translations under the `internals` key.
//!
//! Each text of the subtree is an object literal; child keys become nested
//! objects. `internals.ordinals` maps plural categories to ordinal patterns
//! (`{one: '$st', other: '$th'}`) and `internals.plurals` maps them to noun
//! patterns (`{one: '$', other: '$s'}`).

use crate::dictionary::ClientDictionary;
use polyglot_common::literal;
use serde_json::{Map, Value};
use tracing::warn;

/// Top-level key holding the internals.
pub const INTERNALS_KEY: &str = "internals";

/// Parsed internals of the loaded locale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Internals {
    tree: Map<String, Value>,
}

impl Internals {
    /// Parses the `internals` subtree of a dictionary. Texts that do not
    /// parse as object literals are logged and ignored.
    pub fn from_dictionary(dictionary: &ClientDictionary) -> Self {
        let tree = dictionary
            .get(INTERNALS_KEY)
            .map(|node| parse_node(node, INTERNALS_KEY))
            .unwrap_or_default();
        Self { tree }
    }

    /// The raw parsed tree.
    pub const fn tree(&self) -> &Map<String, Value> {
        &self.tree
    }

    /// The table stored under `name`, if it is an object.
    pub fn table(&self, name: &str) -> Option<&Map<String, Value>> {
        self.tree.get(name).and_then(Value::as_object)
    }

    /// The pattern of `category` in table `name`, falling back to `other`.
    pub fn pattern(&self, name: &str, category: &str) -> Option<&str> {
        let table = self.table(name)?;
        table
            .get(category)
            .or_else(|| table.get("other"))
            .and_then(Value::as_str)
    }
}

fn parse_node(node: &ClientDictionary, path: &str) -> Map<String, Value> {
    let mut result = Map::new();
    if let Some(entry) = &node.entry {
        match literal::parse(&entry.text) {
            Ok(Value::Object(members)) => result.extend(members),
            Ok(_) => warn!("Internals '{}' is not an object literal", path),
            Err(e) => warn!("Unparsable internals '{}': {}", path, e),
        }
    }
    for (segment, child) in &node.children {
        let child_path = format!("{path}.{segment}");
        result.insert(segment.clone(), Value::Object(parse_node(child, &child_path)));
    }
    result
}
