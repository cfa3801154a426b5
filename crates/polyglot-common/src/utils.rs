//! Locale and key utilities shared by every layer.

use crate::types::{Locale, PolyglotError, PolyglotResult};

/// Returns the chain of a locale from most to least specific, ending with
/// the universal locale `""`.
///
/// `locale_tree("fr-BE-WA")` is `["fr-BE-WA", "fr-BE", "fr", ""]`.
pub fn locale_tree(locale: &str) -> Vec<Locale> {
    let mut tree: Vec<Locale> = locale
        .char_indices()
        .filter(|&(_, c)| c == '-')
        .map(|(index, _)| locale[..index].to_string())
        .filter(|prefix| !prefix.is_empty())
        .collect();
    tree.reverse();
    if !locale.is_empty() {
        tree.insert(0, locale.to_string());
    }
    tree.push(String::new());
    tree
}

/// Builds the ordered search list for a locale preference list: the
/// deduplicated concatenation of each locale's tree, with `""` always last.
pub fn search_locales<S: AsRef<str>>(locales: &[S]) -> Vec<Locale> {
    let mut list: Vec<Locale> = Vec::new();
    for locale in locales {
        for candidate in locale_tree(locale.as_ref()) {
            if !candidate.is_empty() && !list.contains(&candidate) {
                list.push(candidate);
            }
        }
    }
    list.push(String::new());
    list
}

/// True when `candidate` is `locale` itself or one of its ancestors
/// (including the universal locale).
pub fn is_in_locale_tree(candidate: &str, locale: &str) -> bool {
    candidate.is_empty()
        || locale == candidate
        || (locale.starts_with(candidate) && locale[candidate.len()..].starts_with('-'))
}

/// Removes duplicates while keeping the first occurrence of each locale.
pub fn dedup_locales<S: AsRef<str>>(locales: &[S]) -> Vec<Locale> {
    let mut list: Vec<Locale> = Vec::with_capacity(locales.len());
    for locale in locales {
        let locale = locale.as_ref();
        if !list.iter().any(|known| known == locale) {
            list.push(locale.to_string());
        }
    }
    list
}

/// Checks that a text key only uses letters, digits and `_-+*.`, and has no
/// `then` segment (a key resolving to a `then` member would make translators
/// look awaitable).
pub fn validate_key(key: &str) -> PolyglotResult<()> {
    let charset_ok = key
        .chars()
        .all(|c| c.is_alphanumeric() || "_-+*.".contains(c));
    if !charset_ok || key.split('.').any(|segment| segment == "then") {
        return Err(PolyglotError::InvalidKey(format!(
            "{key} (only letters, digits, \"_+-*.\" allowed, and no \"then\" part)"
        )));
    }
    Ok(())
}

/// Checks that a locale only uses letters, digits, `_` and `-`.
pub fn validate_locale(locale: &str) -> PolyglotResult<()> {
    if locale.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        Ok(())
    } else {
        Err(PolyglotError::InvalidLocale(format!(
            "{locale} (only letters, digits, \"_\" and \"-\" allowed)"
        )))
    }
}

/// Splits `s` at the first occurrence of `separator`.
pub fn split_first<'a>(s: &'a str, separator: &str) -> (&'a str, Option<&'a str>) {
    match s.split_once(separator) {
        Some((head, tail)) => (head, Some(tail)),
        None => (s, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_tree() {
        assert_eq!(locale_tree("fr-BE"), vec!["fr-BE", "fr", ""]);
        assert_eq!(locale_tree("en"), vec!["en", ""]);
        assert_eq!(locale_tree(""), vec![""]);
    }

    #[test]
    fn test_search_locales_keeps_universal_last() {
        assert_eq!(
            search_locales(&["fr-BE", "en-GB", "fr"]),
            vec!["fr-BE", "fr", "en-GB", "en", ""]
        );
    }

    #[test]
    fn test_is_in_locale_tree() {
        assert!(is_in_locale_tree("en", "en-GB"));
        assert!(is_in_locale_tree("", "en-GB"));
        assert!(is_in_locale_tree("en-GB", "en-GB"));
        assert!(!is_in_locale_tree("e", "en-GB"));
        assert!(!is_in_locale_tree("fr", "en-GB"));
        assert!(!is_in_locale_tree("en-GB", "en"));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("cmd.save").is_ok());
        assert!(validate_key("a-b+c*d_e").is_ok());
        assert!(validate_key("cmd.then.save").is_err());
        assert!(validate_key("then").is_err());
        assert!(validate_key("thenable.ok").is_ok());
        assert!(validate_key("bad key").is_err());
        assert!(validate_key("bad:key").is_err());
    }

    #[test]
    fn test_validate_locale() {
        assert!(validate_locale("fr-BE").is_ok());
        assert!(validate_locale("").is_ok());
        assert!(validate_locale("fr BE").is_err());
    }
}
