//! Processors: the named functions of placeholders, as in `{plural|$1|ox|oxen}`.
//!
//! A [`ProcessorRegistry`] is handed to each client; the default one holds
//! the built-in processors and can be extended or overridden per client.

use crate::args::TranslationArg;
use crate::duration::{format_duration, DurationOptions};
use crate::formats::FormatRegistry;
use crate::formatting::{
    display_name, format_date, format_list, format_number, format_relative, DateOptions,
    ListKind, NameKind, NumberOptions, NumberStyle, OptionMembers, RelativeOptions, RelativeUnit,
};
use crate::internals::Internals;
use crate::locale_data::{locale_data, LocaleData};
use crate::plural::PluralRulesSet;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use polyglot_common::{Locale, TextKey};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// A processor parameter: plain text, or `key: value` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// Text.
    Text(String),
    /// An object written as `key: value, key2: value2`.
    Object(OptionMembers),
}

impl Param {
    /// The text, if this is not an object.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Object(_) => None,
        }
    }

    /// The members, if this is an object.
    pub const fn as_object(&self) -> Option<&OptionMembers> {
        match self {
            Self::Object(members) => Some(members),
            Self::Text(_) => None,
        }
    }

    /// True for empty text.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }

    /// Converts to a translation argument, for nested translations.
    pub fn to_arg(&self) -> TranslationArg {
        match self {
            Self::Text(text) => TranslationArg::Text(text.clone()),
            Self::Object(members) => TranslationArg::Object(
                members
                    .iter()
                    .map(|(name, value)| (name.clone(), TranslationArg::Text(value.clone())))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Object(members) => {
                for (index, (name, value)) in members.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                Ok(())
            }
        }
    }
}

/// Why a processor produced no text.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorFailure {
    /// Locale data the processor needs is not translated.
    Missing {
        /// Key of the missing data, such as `internals.ordinals`.
        key: TextKey,
    },
    /// The parameters cannot be processed.
    Error {
        /// Short reason, rendered in the error marker.
        reason: String,
        /// Details for the reporter.
        detail: Value,
    },
}

impl ProcessorFailure {
    /// An error with details.
    pub fn error(reason: impl Into<String>, detail: Value) -> Self {
        Self::Error {
            reason: reason.into(),
            detail,
        }
    }

    /// Missing locale data.
    pub fn missing(key: impl Into<TextKey>) -> Self {
        Self::Missing { key: key.into() }
    }
}

/// Outcome of a processor call.
pub type ProcessorResult = Result<String, ProcessorFailure>;

/// What a processor knows about the client calling it.
#[derive(Debug, Clone, Copy)]
pub struct ProcessorContext<'a> {
    /// Key being translated.
    pub key: &'a str,
    /// Locales of the client, most preferred first.
    pub locales: &'a [Locale],
    /// Parsed internals.
    pub internals: &'a Internals,
    /// Plural rules of the primary locale.
    pub plurals: &'a PluralRulesSet,
    /// Format presets.
    pub formats: &'a FormatRegistry,
    /// Time zone for dates.
    pub time_zone: Tz,
    /// Currency used when a currency format names none.
    pub currency: Option<&'a str>,
}

impl ProcessorContext<'_> {
    /// The most preferred locale.
    pub fn locale(&self) -> &str {
        self.locales.first().map_or("", String::as_str)
    }

    /// Formatting conventions of the most preferred locale.
    pub fn data(&self) -> &'static LocaleData {
        locale_data(self.locale())
    }
}

/// A processor function.
pub type Processor =
    Arc<dyn Fn(&ProcessorContext<'_>, &[Param]) -> ProcessorResult + Send + Sync>;

/// The processors available to placeholders.
#[derive(Clone)]
pub struct ProcessorRegistry {
    processors: HashMap<String, Processor>,
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.processors.keys().collect();
        names.sort();
        f.debug_struct("ProcessorRegistry")
            .field("processors", &names)
            .finish()
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .insert("upper", |_, params| Ok(text(params, 0, "upper")?.to_uppercase()))
            .insert("lower", |_, params| Ok(text(params, 0, "lower")?.to_lowercase()))
            .insert("title", |_, params| Ok(title_case(text(params, 0, "title")?)))
            .insert("ordinal", ordinal)
            .insert("plural", plural)
            .insert("number", number)
            .insert("date", date)
            .insert("relative", relative)
            .insert("region", |ctx, params| name(ctx, params, NameKind::Region, "region"))
            .insert("language", |ctx, params| name(ctx, params, NameKind::Language, "language"))
            .insert("script", |ctx, params| name(ctx, params, NameKind::Script, "script"))
            .insert("currency", |ctx, params| name(ctx, params, NameKind::Currency, "currency"))
            .insert("list", list)
            .insert("duration", duration);
        registry
    }
}

impl ProcessorRegistry {
    /// A registry without any processor.
    pub fn empty() -> Self {
        Self {
            processors: HashMap::new(),
        }
    }

    /// Registers `processor` under `name`, replacing any previous one.
    pub fn insert<F>(&mut self, name: impl Into<String>, processor: F) -> &mut Self
    where
        F: Fn(&ProcessorContext<'_>, &[Param]) -> ProcessorResult + Send + Sync + 'static,
    {
        self.processors.insert(name.into(), Arc::new(processor));
        self
    }

    /// Builder form of [`Self::insert`].
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, processor: F) -> Self
    where
        F: Fn(&ProcessorContext<'_>, &[Param]) -> ProcessorResult + Send + Sync + 'static,
    {
        self.insert(name, processor);
        self
    }

    /// Removes a processor.
    pub fn remove(&mut self, name: &str) -> Option<Processor> {
        self.processors.remove(name)
    }

    /// The processor registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Processor> {
        self.processors.get(name)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.processors.contains_key(name)
    }
}

fn detail(processor: &str, params: &[Param]) -> Value {
    json!({
        "processor": processor,
        "params": params.iter().map(ToString::to_string).collect::<Vec<_>>(),
    })
}

fn text<'a>(params: &'a [Param], index: usize, processor: &str) -> Result<&'a str, ProcessorFailure> {
    match params.get(index) {
        Some(Param::Text(text)) => Ok(text),
        Some(Param::Object(_)) => Err(ProcessorFailure::error(
            "Object argument",
            detail(processor, params),
        )),
        None => Err(ProcessorFailure::error(
            "Missing argument",
            detail(processor, params),
        )),
    }
}

fn numeric(params: &[Param], processor: &str) -> Result<f64, ProcessorFailure> {
    text(params, 0, processor)?
        .trim()
        .parse::<f64>()
        .map_err(|_| ProcessorFailure::error("NaN", detail(processor, params)))
}

/// Upper-cases every ASCII word character that follows a non-word one.
/// Word characters are `[A-Za-z0-9_]`; other letters are left as they are
/// and count as word boundaries.
fn title_case(text: &str) -> String {
    let mut previous_is_word = false;
    text.chars()
        .map(|c| {
            let word = c.is_ascii_alphanumeric() || c == '_';
            let mapped = if word && !previous_is_word {
                c.to_ascii_uppercase()
            } else {
                c
            };
            previous_is_word = word;
            mapped
        })
        .collect()
}

fn ordinal(ctx: &ProcessorContext<'_>, params: &[Param]) -> ProcessorResult {
    let number = numeric(params, "ordinal")?;
    if ctx.internals.table("ordinals").is_none() {
        return Err(ProcessorFailure::missing("internals.ordinals"));
    }
    let category = ctx.plurals.ordinal(number);
    let pattern = ctx
        .internals
        .pattern("ordinals", category)
        .ok_or_else(|| ProcessorFailure::error("Missing rule in ordinals", json!(category)))?;
    Ok(pattern.replace('$', text(params, 0, "ordinal")?.trim()))
}

fn plural(ctx: &ProcessorContext<'_>, params: &[Param]) -> ProcessorResult {
    let number = numeric(params, "plural")?;
    let category = ctx.plurals.cardinal(number);
    match (params.get(1), params.get(2)) {
        (Some(Param::Text(one)), Some(other)) => Ok(if category == "one" {
            one.clone()
        } else {
            other.to_string()
        }),
        (Some(Param::Object(cases)), _) => cases
            .get(category)
            .or_else(|| cases.get("other"))
            .cloned()
            .ok_or_else(|| ProcessorFailure::error("Case not found", detail("plural", params))),
        (Some(Param::Text(designation)), None) => {
            if ctx.internals.table("plurals").is_none() {
                return Err(ProcessorFailure::missing("internals.plurals"));
            }
            let pattern = ctx.internals.pattern("plurals", category).ok_or_else(|| {
                ProcessorFailure::error("Missing rule in plurals", json!(category))
            })?;
            Ok(pattern.replace('$', designation))
        }
        (None, _) => Err(ProcessorFailure::error(
            "Missing argument",
            detail("plural", params),
        )),
    }
}

fn options_of<'a, T: Clone>(
    presets: &'a BTreeMap<String, T>,
    param: Option<&'a Param>,
    parse: impl Fn(&OptionMembers) -> Result<T, String>,
    processor: &str,
) -> Result<Option<T>, ProcessorFailure> {
    match param {
        None => Ok(None),
        Some(Param::Text(name)) if name.trim().is_empty() => Ok(None),
        Some(Param::Text(name)) => presets.get(name.trim()).cloned().map(Some).ok_or_else(|| {
            ProcessorFailure::error(
                format!("Invalid {processor} format"),
                json!({ "processor": processor, "format": name }),
            )
        }),
        Some(Param::Object(members)) => parse(members).map(Some).map_err(|reason| {
            ProcessorFailure::error(reason, json!({ "processor": processor, "options": members }))
        }),
    }
}

fn number(ctx: &ProcessorContext<'_>, params: &[Param]) -> ProcessorResult {
    let value = numeric(params, "number")?;
    let mut options = options_of(
        &ctx.formats.number,
        params.get(1),
        NumberOptions::from_members,
        "number",
    )?
    .unwrap_or_default();
    if options.style == NumberStyle::Currency && options.currency.is_none() {
        options.currency = ctx.currency.map(str::to_ascii_uppercase);
    }
    format_number(value, &options, ctx.data())
        .map_err(|reason| ProcessorFailure::error(reason, detail("number", params)))
}

#[allow(clippy::cast_possible_truncation)]
fn date(ctx: &ProcessorContext<'_>, params: &[Param]) -> ProcessorResult {
    let raw = text(params, 0, "date")?.trim();
    let millis = raw
        .parse::<i64>()
        .ok()
        .or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v as i64)
        })
        .ok_or_else(|| ProcessorFailure::error("Invalid date", detail("date", params)))?;
    let moment = DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| ProcessorFailure::error("Invalid date", detail("date", params)))?;
    let options = options_of(&ctx.formats.date, params.get(1), DateOptions::from_members, "date")?
        .unwrap_or_default();
    Ok(format_date(&moment, &options, ctx.time_zone, ctx.data()))
}

fn relative(ctx: &ProcessorContext<'_>, params: &[Param]) -> ProcessorResult {
    let raw = text(params, 0, "relative")?.trim();
    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '-' || c == '+'))
        .unwrap_or(raw.len());
    let value = raw[..split]
        .parse::<i64>()
        .map_err(|_| ProcessorFailure::error("Invalid relative", detail("relative", params)))?;
    let unit = RelativeUnit::parse(raw[split..].trim())
        .ok_or_else(|| ProcessorFailure::error("Invalid relative", detail("relative", params)))?;
    let options = options_of(
        &ctx.formats.relative,
        params.get(1),
        RelativeOptions::from_members,
        "relative",
    )?
    .unwrap_or_default();
    Ok(format_relative(value, unit, options, ctx.data(), ctx.plurals))
}

fn name(
    ctx: &ProcessorContext<'_>,
    params: &[Param],
    kind: NameKind,
    processor: &str,
) -> ProcessorResult {
    let code = text(params, 0, processor)?.trim();
    display_name(kind, code, ctx.data()).ok_or_else(|| {
        ProcessorFailure::error(format!("Invalid {processor}"), detail(processor, params))
    })
}

fn list(ctx: &ProcessorContext<'_>, params: &[Param]) -> ProcessorResult {
    let (items, kind) = match params.split_last() {
        Some((Param::Object(options), items)) => {
            let kind = match options.get("type") {
                Some(kind) => ListKind::parse(kind)
                    .map_err(|reason| ProcessorFailure::error(reason, detail("list", params)))?,
                None => ListKind::default(),
            };
            (items, kind)
        }
        _ => (params, ListKind::default()),
    };
    let items = items
        .iter()
        .enumerate()
        .map(|(index, _)| text(items, index, "list").map(str::to_string))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format_list(&items, kind, ctx.data()))
}

fn duration(ctx: &ProcessorContext<'_>, params: &[Param]) -> ProcessorResult {
    let description = params
        .first()
        .and_then(Param::as_object)
        .ok_or_else(|| ProcessorFailure::error("Invalid duration", detail("duration", params)))?;
    let options = match params.get(1) {
        Some(Param::Object(members)) => DurationOptions::from_members(members)
            .map_err(|reason| ProcessorFailure::error(reason, detail("duration", params)))?,
        Some(Param::Text(text)) if !text.trim().is_empty() => {
            return Err(ProcessorFailure::error(
                "Invalid duration options",
                detail("duration", params),
            ))
        }
        _ => DurationOptions::default(),
    };
    format_duration(description, &options, ctx.data(), ctx.plurals)
        .map_err(|reason| ProcessorFailure::error(reason, detail("duration", params)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::ClientDictionary;
    use polyglot_common::CondensedDictionary;

    struct Fixture {
        locales: Vec<Locale>,
        internals: Internals,
        plurals: PluralRulesSet,
        formats: FormatRegistry,
    }

    impl Fixture {
        fn new(locale: &str, internals: &[(&str, &str)]) -> Self {
            let mut condensed = CondensedDictionary::default();
            for (key, text) in internals {
                condensed.insert(key, *text, false);
            }
            let mut dictionary = ClientDictionary::default();
            dictionary.merge(&condensed, "");
            Self {
                locales: vec![locale.to_string()],
                internals: Internals::from_dictionary(&dictionary),
                plurals: PluralRulesSet::for_locale(locale),
                formats: FormatRegistry::default(),
            }
        }

        fn call(&self, processor: &str, params: &[Param]) -> ProcessorResult {
            let ctx = ProcessorContext {
                key: "test",
                locales: &self.locales,
                internals: &self.internals,
                plurals: &self.plurals,
                formats: &self.formats,
                time_zone: Tz::UTC,
                currency: Some("eur"),
            };
            let registry = ProcessorRegistry::default();
            registry.get(processor).unwrap()(&ctx, params)
        }
    }

    fn t(text: &str) -> Param {
        Param::Text(text.to_string())
    }

    fn o(pairs: &[(&str, &str)]) -> Param {
        Param::Object(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_case_processors() {
        let en = Fixture::new("en", &[]);
        assert_eq!(en.call("upper", &[t("ox")]).unwrap(), "OX");
        assert_eq!(en.call("lower", &[t("OX")]).unwrap(), "ox");
        assert_eq!(en.call("title", &[t("the big ox-cart")]).unwrap(), "The Big Ox-Cart");
        assert_eq!(en.call("title", &[t("naïve café")]).unwrap(), "NaïVe Café");
        assert_eq!(en.call("title", &[t("élan")]).unwrap(), "éLan");
        assert!(matches!(
            en.call("upper", &[]),
            Err(ProcessorFailure::Error { reason, .. }) if reason == "Missing argument"
        ));
    }

    #[test]
    fn test_ordinals() {
        let en = Fixture::new(
            "en",
            &[("internals.ordinals", "{one: '$st', two: '$nd', few: '$rd', other: '$th'}")],
        );
        let rendered: Vec<String> = ["1", "2", "3", "4", "11", "12", "13", "21", "22", "23", "111"]
            .iter()
            .map(|n| en.call("ordinal", &[t(n)]).unwrap())
            .collect();
        assert_eq!(
            rendered,
            vec!["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "23rd", "111th"]
        );

        let fr = Fixture::new("fr", &[("internals.ordinals", "{one: '$er', other: '$ème'}")]);
        assert_eq!(fr.call("ordinal", &[t("1")]).unwrap(), "1er");
        assert_eq!(fr.call("ordinal", &[t("2")]).unwrap(), "2ème");
    }

    #[test]
    fn test_ordinal_failures() {
        let bare = Fixture::new("en", &[]);
        assert_eq!(
            bare.call("ordinal", &[t("1")]),
            Err(ProcessorFailure::missing("internals.ordinals"))
        );
        assert!(matches!(
            bare.call("ordinal", &[t("one")]),
            Err(ProcessorFailure::Error { reason, .. }) if reason == "NaN"
        ));
    }

    #[test]
    fn test_plural_forms() {
        let en = Fixture::new("en", &[("internals.plurals", "{one: '$', other: '$s'}")]);
        assert_eq!(en.call("plural", &[t("1"), t("ox"), t("oxen")]).unwrap(), "ox");
        assert_eq!(en.call("plural", &[t("2"), t("ox"), t("oxen")]).unwrap(), "oxen");
        assert_eq!(en.call("plural", &[t("2"), t("cat")]).unwrap(), "cats");
        assert_eq!(
            en.call("plural", &[t("5"), o(&[("one", "goose"), ("other", "geese")])])
                .unwrap(),
            "geese"
        );

        let fr = Fixture::new("fr", &[]);
        let horse = o(&[("one", "cheval"), ("other", "chevaux")]);
        assert_eq!(fr.call("plural", &[t("1"), horse.clone()]).unwrap(), "cheval");
        assert_eq!(fr.call("plural", &[t("2"), horse]).unwrap(), "chevaux");
        assert_eq!(
            fr.call("plural", &[t("2"), t("chat")]),
            Err(ProcessorFailure::missing("internals.plurals"))
        );
    }

    #[test]
    fn test_number_and_currency_default() {
        let en = Fixture::new("en", &[]);
        assert_eq!(en.call("number", &[t("1234.5")]).unwrap(), "1,234.5");
        assert_eq!(en.call("number", &[t("0.5"), t("percent")]).unwrap(), "50%");
        assert_eq!(
            en.call("number", &[t("12"), o(&[("style", "currency")])]).unwrap(),
            "€12.00"
        );
        assert!(en.call("number", &[t("12"), t("money")]).is_err());
        assert!(en.call("number", &[t("twelve")]).is_err());
    }

    #[test]
    fn test_dates() {
        let en = Fixture::new("en", &[]);
        assert_eq!(en.call("date", &[t("1619883296000"), t("date")]).unwrap(), "5/1/21");
        assert_eq!(en.call("date", &[t("1619883296000"), t("time")]).unwrap(), "3:34 PM");
        assert_eq!(
            en.call(
                "date",
                &[t("1619883296000"), o(&[("timeStyle", "short"), ("timeZone", "Asia/Tokyo")])]
            )
            .unwrap(),
            "12:34 AM"
        );
        assert!(en.call("date", &[t("yesterday")]).is_err());
    }

    #[test]
    fn test_relative() {
        let en = Fixture::new("en", &[]);
        assert_eq!(en.call("relative", &[t("-1 month"), t("short")]).unwrap(), "1 mo. ago");
        assert_eq!(en.call("relative", &[t("-1 month")]).unwrap(), "1 month ago");
        assert_eq!(en.call("relative", &[t("3days")]).unwrap(), "in 3 days");
        let fr = Fixture::new("fr", &[]);
        assert_eq!(fr.call("relative", &[t("2 seconds")]).unwrap(), "dans 2 secondes");
        assert!(en.call("relative", &[t("soon")]).is_err());
    }

    #[test]
    fn test_display_names() {
        let en = Fixture::new("en", &[]);
        assert_eq!(en.call("region", &[t("HU")]).unwrap(), "Hungary");
        assert_eq!(en.call("language", &[t("en-GB")]).unwrap(), "British English");
        assert_eq!(en.call("script", &[t("Cyrl")]).unwrap(), "Cyrillic");
        assert_eq!(en.call("currency", &[t("USD")]).unwrap(), "US Dollar");
        let fr = Fixture::new("fr", &[]);
        assert_eq!(fr.call("region", &[t("US")]).unwrap(), "États-Unis");
        assert!(matches!(
            en.call("region", &[t("XX")]),
            Err(ProcessorFailure::Error { reason, .. }) if reason == "Invalid region"
        ));
    }

    #[test]
    fn test_lists() {
        let en = Fixture::new("en", &[]);
        assert_eq!(
            en.call("list", &[t("red"), t("green"), t("blue")]).unwrap(),
            "red, green, and blue"
        );
        assert_eq!(
            en.call("list", &[t("tea"), t("coffee"), o(&[("type", "disjunction")])])
                .unwrap(),
            "tea or coffee"
        );
    }

    #[test]
    fn test_duration() {
        let en = Fixture::new("en", &[]);
        assert_eq!(
            en.call("duration", &[o(&[("seconds", "130")])]).unwrap(),
            "2 minutes, 10 seconds"
        );
        assert_eq!(
            en.call("duration", &[o(&[("seconds", "130")]), o(&[("calculate", "false")])])
                .unwrap(),
            "130 seconds"
        );
        assert!(en.call("duration", &[t("130")]).is_err());
    }

    #[test]
    fn test_custom_processor() {
        let registry = ProcessorRegistry::default()
            .with("reverse", |_, params| {
                Ok(params
                    .first()
                    .map(ToString::to_string)
                    .unwrap_or_default()
                    .chars()
                    .rev()
                    .collect())
            });
        assert!(registry.contains("reverse"));
        assert!(registry.contains("plural"));
        assert!(!ProcessorRegistry::empty().contains("plural"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_property_title_only_changes_case(input in "\\PC{0,40}") {
                let titled = title_case(&input);
                prop_assert_eq!(titled.to_ascii_lowercase(), input.to_ascii_lowercase());
                prop_assert_eq!(title_case(&titled), titled.clone());
            }

            #[test]
            fn test_property_title_capitalizes_words(words in prop::collection::vec("[a-z][a-z0-9_]{0,8}", 1..6)) {
                let titled = title_case(&words.join(" "));
                for word in titled.split(' ') {
                    prop_assert!(word.starts_with(|c: char| c.is_ascii_uppercase()));
                }
            }
        }
    }
}
