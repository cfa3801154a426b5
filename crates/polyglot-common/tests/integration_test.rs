//! Integration tests for polyglot-common crate.

use polyglot_common::literal;
use polyglot_common::{
    locale_tree, merge_condensed, search_locales, validate_key, CondensedDictionary,
    PolyglotError,
};
use serde_json::json;

#[test]
fn test_locale_tree_of_regional_variant() {
    assert_eq!(locale_tree("fr-BE-WA"), vec!["fr-BE-WA", "fr-BE", "fr", ""]);
}

#[test]
fn test_search_locales_deduplicates_shared_ancestors() {
    assert_eq!(search_locales(&["en-GB", "en-US"]), vec!["en-GB", "en", "en-US", ""]);
    assert_eq!(search_locales::<&str>(&[]), vec![""]);
}

#[test]
fn test_invalid_key_error_message() {
    let error = validate_key("a.then").unwrap_err();
    assert!(matches!(error, PolyglotError::InvalidKey(_)));
    assert!(error.to_string().starts_with("Bad key format: a.then"));
}

#[test]
fn test_condensed_dictionary_from_client_payload() {
    let payload = r#"[{"fld":{"bdate":{"":"Birthday","short":"B-dy"},"name":"Name"}},{"cmd":{"ban":{"":"Ban user",".":"."}}}]"#;
    let zones: Vec<CondensedDictionary> = serde_json::from_str(payload).unwrap();
    assert_eq!(zones.len(), 2);
    assert_eq!(
        zones[0].get("fld.bdate.short").and_then(|n| n.text.as_deref()),
        Some("B-dy")
    );
    let ban = zones[1].get("cmd.ban").unwrap();
    assert!(ban.fallback);

    let merged = merge_condensed(&zones).unwrap();
    assert_eq!(
        merged.long_key_list(),
        vec!["cmd.ban", "fld.bdate", "fld.bdate.short", "fld.name"]
    );
    assert_eq!(serde_json::to_string(&zones).unwrap(), payload);
}

#[test]
fn test_literal_internals_document() {
    let parsed = literal::parse(
        "{\n\t// English ordinal suffixes\n\tone: '$st', two: '$nd',\n\tfew: '$rd', other: '$th'\n}",
    )
    .unwrap();
    assert_eq!(parsed["few"], json!("$rd"));
    let written = literal::stringify(&parsed, literal::DEFAULT_MAX_LENGTH);
    assert_eq!(written, "{few: '$rd', one: '$st', other: '$th', two: '$nd'}");
}
