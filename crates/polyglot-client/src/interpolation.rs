//! Key resolution and placeholder expansion.
//!
//! A text is scanned for `{...}` placeholders (`\{` and `\}` stay literal).
//! A placeholder body is a pipeline of stages separated by `::`, each stage
//! being `|`-separated parts:
//!
//! - `{$1}`, `{$name}`, `{$2[default]}`, `{0}` insert arguments
//! - `{plural|$1|ox|oxen}` calls a processor with the other parts
//! - `{cnv.naming|$1}` translates another key with the other parts as arguments
//! - `{m: he, f: she, default: they :: $1}` switches on a value
//! - `{upper :: $1}` feeds the result of the right stage to the left one
//!
//! Inserted values are never parsed again, and a failing placeholder only
//! affects its own rendering.

use crate::args::TranslationArg;
use crate::dictionary::ClientDictionary;
use crate::processors::{Param, ProcessorContext, ProcessorFailure, ProcessorRegistry};
use crate::reports::{ReportContext, Reporter};
use polyglot_common::Zone;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Rendered for keys requested while their zone is still loading.
pub const LOADING_TEXT: &str = "...";

/// Nested translations deeper than this are reported as errors.
pub const MAX_DEPTH: usize = 16;

const TOKEN_OPEN: char = '\u{e000}';
const TOKEN_CLOSE: char = '\u{e001}';

/// Stores literal values behind private-use tokens so that the separators
/// they contain are not interpreted.
#[derive(Debug, Default)]
struct Protector {
    values: Vec<String>,
}

impl Protector {
    fn protect(&mut self, value: impl Into<String>) -> String {
        self.values.push(value.into());
        format!("{TOKEN_OPEN}{}{TOKEN_CLOSE}", self.values.len() - 1)
    }

    /// Protects every backslash-escaped character.
    fn escape(&mut self, body: &str) -> String {
        let mut out = String::with_capacity(body.len());
        let mut chars = body.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some(escaped) => {
                        let token = self.protect(escaped);
                        out.push_str(&token);
                    }
                    None => out.push('\\'),
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    fn restore(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c != TOKEN_OPEN {
                out.push(c);
                continue;
            }
            let index: String = chars.by_ref().take_while(|c| *c != TOKEN_CLOSE).collect();
            if let Some(value) = index.parse::<usize>().ok().and_then(|i| self.values.get(i)) {
                out.push_str(value);
            }
        }
        out
    }
}

/// Finds the end of a placeholder body starting right after `{`. Returns the
/// body, escapes included, and the bytes consumed with the closing brace.
fn placeholder_body(text: &str) -> Option<(&str, usize)> {
    let mut chars = text.char_indices();
    while let Some((index, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '}' => return Some((&text[..index], index + 1)),
            _ => {}
        }
    }
    None
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_key_char(c: char) -> bool {
    is_word(c) || matches!(c, '.' | '-' | '+' | '*')
}

/// Resolves keys of one dictionary for one translator.
pub struct Resolver<'a> {
    /// The dictionary to read.
    pub dictionary: &'a ClientDictionary,
    /// Available processors.
    pub processors: &'a ProcessorRegistry,
    /// Where missing texts and errors go.
    pub reporter: &'a dyn Reporter,
    /// Zones of the translator, for reports.
    pub zones: &'a [Zone],
    /// Whether zones are still loading: missing keys then render as
    /// [`LOADING_TEXT`] without being reported.
    pub loading: bool,
    /// Context handed to processors; its key is replaced per call.
    pub context: ProcessorContext<'a>,
}

impl Resolver<'_> {
    /// Translates `key` with `args`.
    pub fn translate(&self, key: &str, args: &[TranslationArg]) -> String {
        self.translate_at(key, args, 0)
    }

    /// Expands the placeholders of `text`, reports naming `key`.
    pub fn interpolate(&self, key: &str, text: &str, args: &[TranslationArg]) -> String {
        self.interpolate_at(key, text, args, 0)
    }

    /// Reports `key` as missing and returns its rendering.
    pub fn missing(&self, key: &str, fallback: Option<&str>) -> String {
        self.reporter.missing(&self.report_context(key), fallback)
    }

    /// Reports an error while translating `key` and returns its rendering.
    pub fn error(&self, key: &str, error: &str, detail: &Value) -> String {
        self.reporter.error(&self.report_context(key), error, detail)
    }

    fn report_context<'b>(&'b self, key: &'b str) -> ReportContext<'b> {
        ReportContext {
            key,
            locales: self.context.locales,
            zones: self.zones,
        }
    }

    fn translate_at(&self, key: &str, args: &[TranslationArg], depth: usize) -> String {
        if depth > MAX_DEPTH {
            return self.error(key, "Recursion too deep", &json!({ "depth": depth }));
        }
        match self.dictionary.resolve(key) {
            Some(entry) if entry.fallback => {
                let text = self.missing(key, Some(&entry.text));
                self.interpolate_at(key, &text, args, depth)
            }
            Some(entry) => self.interpolate_at(key, &entry.text, args, depth),
            None if self.loading => LOADING_TEXT.to_string(),
            None => self.missing(key, None),
        }
    }

    fn interpolate_at(&self, key: &str, text: &str, args: &[TranslationArg], depth: usize) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(position) = rest.find(['{', '\\']) {
            out.push_str(&rest[..position]);
            let tail = &rest[position..];
            if let Some(escaped) = tail.strip_prefix('\\') {
                match escaped.chars().next() {
                    Some(brace @ ('{' | '}')) => {
                        out.push(brace);
                        rest = &escaped[1..];
                    }
                    _ => {
                        out.push('\\');
                        rest = escaped;
                    }
                }
                continue;
            }
            match placeholder_body(&tail[1..]) {
                Some((body, consumed)) => {
                    out.push_str(&self.placeholder(key, body, args, depth));
                    rest = &tail[1 + consumed..];
                }
                None => {
                    out.push_str(tail);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    fn placeholder(&self, key: &str, body: &str, args: &[TranslationArg], depth: usize) -> String {
        let mut protector = Protector::default();
        let body = protector.escape(body);
        match self.evaluate(key, &body, args, depth, &mut protector) {
            Ok(text) => text,
            Err(ProcessorFailure::Missing { key: missing }) => self.missing(&missing, None),
            Err(ProcessorFailure::Error { reason, detail }) => self.error(key, &reason, &detail),
        }
    }

    fn evaluate(
        &self,
        key: &str,
        body: &str,
        args: &[TranslationArg],
        depth: usize,
        protector: &mut Protector,
    ) -> Result<String, ProcessorFailure> {
        let mut stages: Vec<&str> = body.split("::").collect();
        let last = stages.pop().unwrap_or_default();
        let parts: Vec<&str> = last.split('|').map(str::trim).collect();

        if stages.is_empty() {
            let head = parts[0];
            if parts.len() == 1 && !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()) {
                return Ok(use_argument(head, args).map(ToString::to_string).unwrap_or_default());
            }
            let params = self.substitute_all(&parts, args, depth, protector);
            if self.is_applicable(head, &params[0]) {
                return self.apply(key, head, &params[0], &params[1..], depth, protector);
            }
            return Ok(first_non_empty(&params));
        }

        let mut params = self.substitute_all(&parts, args, depth, protector);
        while let Some(stage) = stages.pop() {
            let parts: Vec<&str> = stage.split('|').map(str::trim).collect();
            let stage_params = self.substitute_all(&parts, args, depth, protector);
            let processed = self.apply(key, parts[0], &stage_params[0], &params, depth, protector)?;
            params = std::iter::once(Param::Text(processed))
                .chain(stage_params.into_iter().skip(1))
                .collect();
        }
        Ok(first_non_empty(&params))
    }

    /// Whether the head of a single-stage placeholder is applied to the
    /// other parts rather than being a value itself.
    fn is_applicable(&self, raw_head: &str, head: &Param) -> bool {
        match head {
            Param::Object(_) => true,
            Param::Text(text) => {
                !raw_head.contains('$')
                    && (self.processors.contains(text) || is_nested_key(text))
            }
        }
    }

    fn apply(
        &self,
        key: &str,
        raw_head: &str,
        head: &Param,
        params: &[Param],
        depth: usize,
        protector: &Protector,
    ) -> Result<String, ProcessorFailure> {
        let name = match head {
            Param::Object(cases) => return switch(cases, params),
            Param::Text(name) => name,
        };
        if is_nested_key(name) && !raw_head.contains('$') {
            let args: Vec<TranslationArg> = params.iter().map(Param::to_arg).collect();
            return Ok(self.translate_at(name, &args, depth + 1));
        }
        let Some(processor) = self.processors.get(name) else {
            return Err(ProcessorFailure::error(
                "Unknown processor",
                json!({ "processor": protector.restore(raw_head) }),
            ));
        };
        let context = ProcessorContext { key, ..self.context };
        processor(&context, params)
    }

    fn substitute_all(
        &self,
        parts: &[&str],
        args: &[TranslationArg],
        depth: usize,
        protector: &mut Protector,
    ) -> Vec<Param> {
        parts
            .iter()
            .map(|part| {
                let substituted = self.substitute(part, args, depth, protector);
                to_param(&substituted, protector)
            })
            .collect()
    }

    /// Replaces `$` references of a part by protected argument values.
    fn substitute(
        &self,
        part: &str,
        args: &[TranslationArg],
        depth: usize,
        protector: &mut Protector,
    ) -> String {
        let mut out = String::with_capacity(part.len());
        let mut rest = part;
        while let Some(position) = rest.find('$') {
            out.push_str(&rest[..position]);
            rest = &rest[position + 1..];

            if let Some(path) = rest.strip_prefix('.') {
                let end = path.find(|c| !is_key_char(c)).unwrap_or(path.len());
                let nested = self.translate_at(&path[..end], args, depth + 1);
                out.push_str(&protector.protect(nested));
                rest = &path[end..];
                continue;
            }

            let end = rest.find(|c| !is_word(c)).unwrap_or(rest.len());
            let name = &rest[..end];
            rest = &rest[end..];
            let mut default = None;
            if let Some(bracketed) = rest.strip_prefix('[') {
                if let Some(close) = bracketed.find(']') {
                    default = Some(&bracketed[..close]);
                    rest = &bracketed[close + 1..];
                }
            }
            match use_argument(name, args) {
                Some(arg) => out.push_str(&render_argument(arg, protector)),
                None => out.push_str(default.unwrap_or_default()),
            }
        }
        out.push_str(rest);
        out
    }
}

/// Selects an argument: `""` and `"0"` are the last argument, `"1"` the
/// first, and a name is a member of the last argument.
fn use_argument<'a>(name: &str, args: &'a [TranslationArg]) -> Option<&'a TranslationArg> {
    match name.parse::<usize>() {
        _ if name.is_empty() => args.last(),
        Ok(0) => args.last(),
        Ok(index) => args.get(index - 1),
        Err(_) => args.last().and_then(|arg| arg.member(name)),
    }
}

/// Objects keep their separators readable so the part becomes an object
/// parameter; everything else is a single protected value.
fn render_argument(arg: &TranslationArg, protector: &mut Protector) -> String {
    match arg {
        TranslationArg::Object(members) => members
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}: {}",
                    protector.protect(name.clone()),
                    protector.protect(value.to_string())
                )
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => protector.protect(other.to_string()),
    }
}

fn to_param(part: &str, protector: &Protector) -> Param {
    let part = part.trim();
    if !part.contains(':') {
        return Param::Text(protector.restore(part));
    }
    let members: BTreeMap<String, String> = part
        .split(',')
        .filter(|piece| !piece.trim().is_empty())
        .map(|piece| {
            let (name, value) = piece.split_once(':').unwrap_or((piece, ""));
            (
                protector.restore(name.trim()),
                protector.restore(value.trim()),
            )
        })
        .collect();
    Param::Object(members)
}

fn is_nested_key(text: &str) -> bool {
    text.contains('.')
        && !text.starts_with('.')
        && !text.ends_with('.')
        && text.chars().all(is_key_char)
}

fn switch(cases: &BTreeMap<String, String>, params: &[Param]) -> Result<String, ProcessorFailure> {
    let Some(Param::Text(value)) = params.first() else {
        return Err(ProcessorFailure::error(
            "Case switch needs a string",
            json!({ "cases": cases }),
        ));
    };
    cases
        .get(value.as_str())
        .or_else(|| cases.get("default"))
        .cloned()
        .ok_or_else(|| {
            ProcessorFailure::error("Case not found", json!({ "case": value, "cases": cases }))
        })
}

fn first_non_empty(params: &[Param]) -> String {
    params
        .iter()
        .find(|param| !param.is_empty())
        .map(ToString::to_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::FormatRegistry;
    use crate::internals::Internals;
    use crate::plural::PluralRulesSet;
    use chrono_tz::Tz;
    use parking_lot::Mutex;
    use polyglot_common::{CondensedDictionary, Locale};

    #[derive(Default)]
    struct Collect {
        missing: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
    }

    impl Reporter for Collect {
        fn missing(&self, context: &ReportContext<'_>, fallback: Option<&str>) -> String {
            self.missing.lock().push(context.key.to_string());
            crate::reports::render_missing(context, fallback)
        }

        fn error(&self, _context: &ReportContext<'_>, error: &str, _detail: &Value) -> String {
            self.errors.lock().push(error.to_string());
            crate::reports::render_error(error)
        }
    }

    struct Fixture {
        dictionary: ClientDictionary,
        internals: Internals,
        locales: Vec<Locale>,
        plurals: PluralRulesSet,
        processors: ProcessorRegistry,
        formats: FormatRegistry,
        reporter: Collect,
    }

    impl Fixture {
        fn new(locale: &str, entries: &[(&str, &str, bool)]) -> Self {
            let mut condensed = CondensedDictionary::default();
            for (key, text, fallback) in entries {
                condensed.insert(key, *text, *fallback);
            }
            let mut dictionary = ClientDictionary::default();
            dictionary.merge(&condensed, "");
            Self {
                internals: Internals::from_dictionary(&dictionary),
                dictionary,
                locales: vec![locale.to_string()],
                plurals: PluralRulesSet::for_locale(locale),
                processors: ProcessorRegistry::default(),
                formats: FormatRegistry::default(),
                reporter: Collect::default(),
            }
        }

        fn resolver(&self, loading: bool) -> Resolver<'_> {
            Resolver {
                dictionary: &self.dictionary,
                processors: &self.processors,
                reporter: &self.reporter,
                zones: &[],
                loading,
                context: ProcessorContext {
                    key: "",
                    locales: &self.locales,
                    internals: &self.internals,
                    plurals: &self.plurals,
                    formats: &self.formats,
                    time_zone: Tz::UTC,
                    currency: None,
                },
            }
        }

        fn t(&self, key: &str, args: &[TranslationArg]) -> String {
            self.resolver(false).translate(key, args)
        }

        fn text(&self, text: &str, args: &[TranslationArg]) -> String {
            self.resolver(false).interpolate("test", text, args)
        }
    }

    fn english() -> Fixture {
        Fixture::new(
            "en",
            &[
                ("fld.name", "Name", false),
                ("fld.bdate", "Birthday", true),
                ("msg.greet", "Hello {$1|here}", false),
                ("specs.animal", "{$1} {plural|$1|ox|oxen}", false),
                ("specs.cat", "{$1} {plural|$1|cat}", false),
                ("cnv.naming", "{$last}, {$first}", false),
                ("cnv.subNaming", "{cnv.naming|first: $first, last: $last}", false),
                ("loop.self", "<{loop.self}>", false),
                ("internals.plurals", "{one: '$', other: '$s'}", false),
            ],
        )
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    #[test]
    fn test_resolution_and_reports() {
        let en = english();
        assert_eq!(en.t("fld.name", &[]), "Name");
        assert_eq!(en.t("fld.name.short", &[]), "Name");
        assert_eq!(en.t("fld.bdate", &[]), "Birthday");
        assert_eq!(en.t("fld.unknown", &[]), "[fld.unknown]");
        assert_eq!(*en.reporter.missing.lock(), vec!["fld.bdate", "fld.unknown"]);
    }

    #[test]
    fn test_loading_renders_ellipsis_silently() {
        let en = english();
        assert_eq!(en.resolver(true).translate("cmd.save", &[]), LOADING_TEXT);
        assert_eq!(en.resolver(true).translate("fld.name", &[]), "Name");
        assert!(en.reporter.missing.lock().is_empty());
    }

    #[test]
    fn test_recursion_is_bounded() {
        let en = english();
        assert_eq!(en.t("loop.self", &[]).matches("[!Recursion too deep!]").count(), 1);
        assert!(en.reporter.errors.lock().contains(&"Recursion too deep".to_string()));
    }

    // ========================================================================
    // Arguments
    // ========================================================================

    #[test]
    fn test_arguments_and_defaults() {
        let en = english();
        assert_eq!(en.t("msg.greet", &[]), "Hello here");
        assert_eq!(en.t("msg.greet", &["Bob".into()]), "Hello Bob");
        assert_eq!(en.text("{$2[nobody]} and {$1}", &["Ann".into()]), "nobody and Ann");
        assert_eq!(en.text("{0} / {1} / {3}", &["a".into(), "b".into()]), "b / a / ");
        assert_eq!(en.text("[{$}]", &[2.into()]), "[2]");
    }

    #[test]
    fn test_named_arguments() {
        let en = english();
        let person = TranslationArg::object([("first", "John"), ("last", "Doe")]);
        assert_eq!(en.t("cnv.naming", &[person.clone()]), "Doe, John");
        assert_eq!(en.t("cnv.subNaming", &[person]), "Doe, John");
    }

    #[test]
    fn test_inserted_values_are_not_parsed() {
        let en = english();
        assert_eq!(en.text("{upper|$1}", &["a|b: c".into()]), "A|B: C");
        assert_eq!(en.text("{$1}", &["{$2}".into(), "x".into()]), "{$2}");
    }

    #[test]
    fn test_escapes() {
        let en = english();
        assert_eq!(en.text(r"\{$1\} {$1}", &["x".into()]), "{$1} x");
        assert_eq!(en.text(r"{upper|a\|b}", &[]), "A|B");
        assert_eq!(en.text(r"{upper|a\:b}", &[]), "A:B");
        assert_eq!(en.text(r"a\b {unclosed", &[]), r"a\b {unclosed");
    }

    // ========================================================================
    // Processors and stages
    // ========================================================================

    #[test]
    fn test_plurals() {
        let en = english();
        assert_eq!(en.t("specs.animal", &[1.into()]), "1 ox");
        assert_eq!(en.t("specs.animal", &[2.into()]), "2 oxen");
        assert_eq!(en.t("specs.cat", &[2.into()]), "2 cats");
        assert_eq!(en.text("{0} {plural|$0|ox|oxen}", &[2.into()]), "2 oxen");
    }

    #[test]
    fn test_stages_and_case_switch() {
        let en = english();
        assert_eq!(en.text("{upper :: $1}", &["shout".into()]), "SHOUT");
        assert_eq!(
            en.text("{m: he, f: she, default: they :: $1}", &["f".into()]),
            "she"
        );
        assert_eq!(
            en.text("{m: he, f: she, default: they :: $1}", &["x".into()]),
            "they"
        );
        assert_eq!(en.text("{title :: lower :: $1}", &["BIG OX".into()]), "Big Ox");
        assert_eq!(en.text("{m: he :: $1}", &["x".into()]), "[!Case not found!]");
    }

    #[test]
    fn test_nested_translations() {
        let en = english();
        assert_eq!(en.text("{fld.name}: {$1}", &["Ann".into()]), "Name: Ann");
        assert_eq!(en.text("<{upper|$.fld.name}>", &[]), "<NAME>");
    }

    #[test]
    fn test_errors_stay_local() {
        let en = english();
        assert_eq!(
            en.text("a {nope :: $1} b {upper|$1}", &["x".into()]),
            "a [!Unknown processor!] b X"
        );
        assert_eq!(en.text("{ordinal|2}", &[]), "[internals.ordinals]");
        assert_eq!(en.text("{number|many}", &[]), "[!NaN!]");
        assert_eq!(*en.reporter.errors.lock(), vec!["Unknown processor", "NaN"]);
    }

    #[test]
    fn test_plain_head_is_a_value() {
        let en = english();
        assert_eq!(en.text("{|fallback}", &[]), "fallback");
        assert_eq!(en.text("{just text}", &[]), "just text");
    }
}
