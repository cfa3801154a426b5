//! Property tests for the locale and key helpers.

use polyglot_common::{dedup_locales, is_in_locale_tree, locale_tree, search_locales, validate_key};
use proptest::prelude::*;

fn locale_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        r"[a-z]{2}".prop_map(|s| s.to_string()),
        r"[a-z]{2}-[A-Z]{2}(-[A-Z]{2})?".prop_map(|s| s.to_string()),
    ]
}

fn key_strategy() -> impl Strategy<Value = String> {
    r"[a-z_+*-]{1,6}(\.[a-z0-9]{1,6}){0,3}"
        .prop_map(|s| s.to_string())
        .prop_filter("reserved segment", |key| !key.split('.').any(|s| s == "then"))
}

proptest! {
    #[test]
    fn test_property_tree_members_are_ancestors(locale in locale_strategy()) {
        let tree = locale_tree(&locale);
        prop_assert_eq!(tree.last().map(String::as_str), Some(""));
        prop_assert_eq!(tree.first(), Some(&locale));
        for ancestor in &tree {
            prop_assert!(is_in_locale_tree(ancestor, &locale));
        }
    }

    #[test]
    fn test_property_search_list_ends_with_universal(locales in prop::collection::vec(locale_strategy(), 0..4)) {
        let list = search_locales(&locales);
        prop_assert_eq!(list.last().map(String::as_str), Some(""));
        prop_assert_eq!(list.iter().filter(|l| l.is_empty()).count(), 1);
        prop_assert_eq!(dedup_locales(&list), list.clone());
    }

    #[test]
    fn test_property_generated_keys_validate(key in key_strategy()) {
        prop_assert!(validate_key(&key).is_ok());
    }
}
