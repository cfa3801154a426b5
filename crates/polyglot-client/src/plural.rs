//! CLDR plural categories of the client's primary locale.

use intl_pluralrules::{PluralCategory, PluralRuleType, PluralRules};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use unic_langid::LanguageIdentifier;

const DEFAULT_LANGUAGE: &str = "en";

/// Cardinal and ordinal plural rules for one locale.
#[derive(Clone)]
pub struct PluralRulesSet {
    locale: String,
    cardinal: Option<Arc<PluralRules>>,
    ordinal: Option<Arc<PluralRules>>,
}

impl fmt::Debug for PluralRulesSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluralRulesSet")
            .field("locale", &self.locale)
            .field("cardinal", &self.cardinal.is_some())
            .field("ordinal", &self.ordinal.is_some())
            .finish()
    }
}

impl Default for PluralRulesSet {
    fn default() -> Self {
        Self::for_locale(DEFAULT_LANGUAGE)
    }
}

impl PluralRulesSet {
    /// Loads the rules of `locale`, trying the full tag, then its language,
    /// then English.
    pub fn for_locale(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            cardinal: create(locale, PluralRuleType::CARDINAL),
            ordinal: create(locale, PluralRuleType::ORDINAL),
        }
    }

    /// The locale these rules were requested for.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Cardinal category of `number` (`one`, `other`, ...).
    pub fn cardinal(&self, number: f64) -> &'static str {
        select(self.cardinal.as_deref(), number)
    }

    /// Ordinal category of `number` (`one`, `two`, `few`, `other`, ...).
    pub fn ordinal(&self, number: f64) -> &'static str {
        select(self.ordinal.as_deref(), number)
    }
}

fn create(locale: &str, rule_type: PluralRuleType) -> Option<Arc<PluralRules>> {
    let language = locale.split(['-', '_']).next().unwrap_or_default();
    [locale, language, DEFAULT_LANGUAGE]
        .into_iter()
        .filter_map(|tag| tag.parse::<LanguageIdentifier>().ok())
        .find_map(|langid| PluralRules::create(langid, rule_type).ok())
        .map(Arc::new)
        .or_else(|| {
            debug!("No plural rules available for '{}'", locale);
            None
        })
}

fn select(rules: Option<&PluralRules>, number: f64) -> &'static str {
    let Some(rules) = rules else {
        return "other";
    };
    match rules.select(number.abs()) {
        Ok(category) => category_name(category),
        Err(_) => "other",
    }
}

const fn category_name(category: PluralCategory) -> &'static str {
    match category {
        PluralCategory::ZERO => "zero",
        PluralCategory::ONE => "one",
        PluralCategory::TWO => "two",
        PluralCategory::FEW => "few",
        PluralCategory::MANY => "many",
        PluralCategory::OTHER => "other",
    }
}
