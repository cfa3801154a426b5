//! Locale-aware formatting of numbers, dates, relative times, lists, unit
//! quantities and display names, driven by [`crate::locale_data`].

use crate::locale_data::{
    currency_symbol, lookup_name, LocaleData, NumberSymbols, CURRENCIES, LANGUAGES, REGIONS,
    SCRIPTS,
};
use crate::plural::PluralRulesSet;
use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Members of an options object, as written in a placeholder.
pub type OptionMembers = BTreeMap<String, String>;

fn parse_flag(name: &str, value: &str) -> Result<bool, String> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!("Invalid {name}: {value}")),
    }
}

fn parse_digits(name: &str, value: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .ok()
        .filter(|digits| *digits <= 20)
        .ok_or_else(|| format!("Invalid {name}: {value}"))
}

// ============================================================================
// Numbers
// ============================================================================

/// What a formatted number represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberStyle {
    /// A plain number.
    #[default]
    Decimal,
    /// A ratio shown as a percentage.
    Percent,
    /// An amount of money.
    Currency,
}

/// How the magnitude of a number is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Notation {
    /// All digits.
    #[default]
    Standard,
    /// One integer digit and a power of ten.
    Scientific,
    /// Powers of ten that are multiples of three.
    Engineering,
    /// Short magnitude suffixes (`1.2K`).
    Compact,
}

/// Options of the `number` processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberOptions {
    /// Style.
    pub style: NumberStyle,
    /// Notation.
    pub notation: Notation,
    /// ISO 4217 code, required by the currency style.
    pub currency: Option<String>,
    /// Fraction digits always shown.
    pub minimum_fraction_digits: Option<usize>,
    /// Fraction digits at most shown.
    pub maximum_fraction_digits: Option<usize>,
    /// Whether to separate digit groups.
    pub use_grouping: bool,
}

impl Default for NumberOptions {
    fn default() -> Self {
        Self {
            style: NumberStyle::Decimal,
            notation: Notation::Standard,
            currency: None,
            minimum_fraction_digits: None,
            maximum_fraction_digits: None,
            use_grouping: true,
        }
    }
}

impl NumberOptions {
    /// Reads options written as `style: currency, currency: EUR`.
    pub fn from_members(members: &OptionMembers) -> Result<Self, String> {
        let mut options = Self::default();
        for (name, value) in members {
            match name.as_str() {
                "style" => {
                    options.style = match value.as_str() {
                        "decimal" => NumberStyle::Decimal,
                        "percent" => NumberStyle::Percent,
                        "currency" => NumberStyle::Currency,
                        _ => return Err(format!("Invalid style: {value}")),
                    }
                }
                "notation" => {
                    options.notation = match value.as_str() {
                        "standard" => Notation::Standard,
                        "scientific" => Notation::Scientific,
                        "engineering" => Notation::Engineering,
                        "compact" => Notation::Compact,
                        _ => return Err(format!("Invalid notation: {value}")),
                    }
                }
                "currency" => options.currency = Some(value.to_ascii_uppercase()),
                "minimumFractionDigits" => {
                    options.minimum_fraction_digits = Some(parse_digits(name, value)?);
                }
                "maximumFractionDigits" => {
                    options.maximum_fraction_digits = Some(parse_digits(name, value)?);
                }
                "useGrouping" => options.use_grouping = parse_flag(name, value)?,
                _ => return Err(format!("Unknown number option: {name}")),
            }
        }
        Ok(options)
    }
}

fn group_digits(integer: &str, symbols: &NumberSymbols) -> String {
    if integer.len() < 3 + symbols.min_grouping {
        return integer.to_string();
    }
    let mut grouped = String::with_capacity(integer.len() * 2);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push_str(symbols.group);
        }
        grouped.push(digit);
    }
    grouped
}

fn fixed(value: f64, min: usize, max: usize, grouping: bool, symbols: &NumberSymbols) -> String {
    let text = format!("{value:.max$}");
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let mut fraction = fraction.trim_end_matches('0').to_string();
    while fraction.len() < min {
        fraction.push('0');
    }
    let integer = if grouping {
        group_digits(integer, symbols)
    } else {
        integer.to_string()
    };
    if fraction.is_empty() {
        integer
    } else {
        format!("{integer}{}{fraction}", symbols.decimal)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn exponential(value: f64, step: i32, max: usize, symbols: &NumberSymbols) -> String {
    if value == 0.0 {
        return "0E0".to_string();
    }
    let mut exponent = value.log10().floor() as i32;
    exponent -= exponent.rem_euclid(step);
    let mut mantissa = value / 10f64.powi(exponent);
    let factor = 10f64.powi(i32::try_from(max).unwrap_or(20));
    if (mantissa * factor).round() / factor >= 10f64.powi(step) {
        mantissa /= 10f64.powi(step);
        exponent += step;
    }
    format!("{}E{exponent}", fixed(mantissa, 0, max, false, symbols))
}

fn compact(value: f64, symbols: &NumberSymbols) -> String {
    let short = |scaled: f64| fixed(scaled, 0, usize::from(scaled < 10.0), false, symbols);
    let mut magnitude = 0;
    let mut scaled = value;
    while scaled >= 1000.0 && magnitude < 4 {
        scaled /= 1000.0;
        magnitude += 1;
    }
    let mut text = short(scaled);
    if text == "1000" && magnitude < 4 {
        scaled /= 1000.0;
        magnitude += 1;
        text = short(scaled);
    }
    if magnitude == 0 {
        return text;
    }
    let suffix = symbols.compact[magnitude - 1];
    if suffix.is_empty() {
        return fixed(value, 0, 0, true, symbols);
    }
    format!("{text}{suffix}")
}

/// Formats `value` for the language of `data`.
pub fn format_number(
    value: f64,
    options: &NumberOptions,
    data: &LocaleData,
) -> Result<String, String> {
    if value.is_nan() {
        return Ok("NaN".to_string());
    }
    let symbols = &data.numbers;
    let (scaled, default_min, default_max, currency) = match options.style {
        NumberStyle::Decimal => (value, 0, 3, None),
        NumberStyle::Percent => (value * 100.0, 0, 0, None),
        NumberStyle::Currency => {
            let code = options
                .currency
                .as_deref()
                .ok_or_else(|| "Currency code required".to_string())?;
            let (symbol, digits) = currency_symbol(code);
            (value, digits, digits, Some(symbol))
        }
    };
    let min = options.minimum_fraction_digits.unwrap_or(default_min);
    let max = options.maximum_fraction_digits.unwrap_or(default_max).max(min);
    let magnitude = scaled.abs();
    let body = if magnitude.is_infinite() {
        "∞".to_string()
    } else {
        match options.notation {
            Notation::Standard => fixed(magnitude, min, max, options.use_grouping, symbols),
            Notation::Scientific => exponential(magnitude, 1, max.max(3), symbols),
            Notation::Engineering => exponential(magnitude, 3, max.max(3), symbols),
            Notation::Compact => compact(magnitude, symbols),
        }
    };
    let negative = scaled < 0.0 && body.chars().any(|c| (c.is_ascii_digit() && c != '0') || c == '∞');
    let sign = if negative { "-" } else { "" };
    Ok(match (options.style, currency) {
        (NumberStyle::Percent, _) => format!("{sign}{body}{}%", symbols.percent_space),
        (_, Some(symbol)) if symbols.currency_after => {
            format!("{sign}{body}{}{symbol}", symbols.currency_space)
        }
        (_, Some(symbol)) => format!("{sign}{symbol}{body}"),
        _ => format!("{sign}{body}"),
    })
}

// ============================================================================
// Dates
// ============================================================================

/// Length of a date or time style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// Numeric.
    Short,
    /// Abbreviated month names, seconds.
    Medium,
    /// Full month names, time zone.
    Long,
    /// Weekday included.
    Full,
}

impl DateStyle {
    fn parse(value: &str) -> Result<Self, String> {
        match value {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            "full" => Ok(Self::Full),
            _ => Err(format!("Invalid date style: {value}")),
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Options of the `date` processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateOptions {
    /// How to write the date part, omitted when `None` and a time style is set.
    pub date_style: Option<DateStyle>,
    /// How to write the time part, omitted when `None` and a date style is set.
    pub time_style: Option<DateStyle>,
    /// Time zone overriding the client's.
    pub time_zone: Option<Tz>,
}

impl DateOptions {
    /// Reads options written as `dateStyle: long, timeZone: Europe/Paris`.
    pub fn from_members(members: &OptionMembers) -> Result<Self, String> {
        let mut options = Self::default();
        for (name, value) in members {
            match name.as_str() {
                "dateStyle" => options.date_style = Some(DateStyle::parse(value)?),
                "timeStyle" => options.time_style = Some(DateStyle::parse(value)?),
                "timeZone" => {
                    options.time_zone = Some(
                        value
                            .parse::<Tz>()
                            .map_err(|_| format!("Invalid time zone: {value}"))?,
                    );
                }
                _ => return Err(format!("Unknown date option: {name}")),
            }
        }
        Ok(options)
    }
}

/// Formats `date` in `time_zone` (unless the options name another one).
pub fn format_date(
    date: &DateTime<Utc>,
    options: &DateOptions,
    time_zone: Tz,
    data: &LocaleData,
) -> String {
    let pattern = match (options.date_style, options.time_style) {
        (Some(date_style), Some(time_style)) => format!(
            "{}{}{}",
            data.date_patterns[date_style.index()],
            data.date_time_joiner,
            data.time_patterns[time_style.index()]
        ),
        (Some(date_style), None) => data.date_patterns[date_style.index()].to_string(),
        (None, Some(time_style)) => data.time_patterns[time_style.index()].to_string(),
        (None, None) => data.default_pattern.to_string(),
    };
    let local = date.with_timezone(&options.time_zone.unwrap_or(time_zone));
    render_pattern(&pattern, &local, data)
}

fn render_pattern(pattern: &str, date: &DateTime<Tz>, data: &LocaleData) -> String {
    let mut out = String::new();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            for quoted in chars.by_ref() {
                if quoted == '\'' {
                    break;
                }
                out.push(quoted);
            }
            continue;
        }
        if !c.is_ascii_alphabetic() {
            out.push(c);
            continue;
        }
        let mut count = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            count += 1;
        }
        let month = date.month0() as usize;
        let _ = match (c, count) {
            ('y', 2) => write!(out, "{:02}", date.year().rem_euclid(100)),
            ('y', _) => write!(out, "{}", date.year()),
            ('M', 1) => write!(out, "{}", date.month()),
            ('M', 2) => write!(out, "{:02}", date.month()),
            ('M', 3) => write!(out, "{}", data.months_short[month]),
            ('M', _) => write!(out, "{}", data.months[month]),
            ('d', 1) => write!(out, "{}", date.day()),
            ('d', _) => write!(out, "{:02}", date.day()),
            ('E', _) => write!(
                out,
                "{}",
                data.weekdays[date.weekday().num_days_from_monday() as usize]
            ),
            ('H', 1) => write!(out, "{}", date.hour()),
            ('H', _) => write!(out, "{:02}", date.hour()),
            ('h', _) => write!(out, "{}", (date.hour() + 11) % 12 + 1),
            ('m', _) => write!(out, "{:02}", date.minute()),
            ('s', _) => write!(out, "{:02}", date.second()),
            ('a', _) => write!(out, "{}", data.day_periods[usize::from(date.hour() >= 12)]),
            ('z', _) => write!(out, "{}", date.format("%Z")),
            _ => {
                for _ in 0..count {
                    out.push(c);
                }
                Ok(())
            }
        };
    }
    out
}

// ============================================================================
// Relative time
// ============================================================================

/// Unit of a relative time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeUnit {
    /// Seconds.
    Second,
    /// Minutes.
    Minute,
    /// Hours.
    Hour,
    /// Days.
    Day,
    /// Weeks.
    Week,
    /// Months.
    Month,
    /// Years.
    Year,
}

impl RelativeUnit {
    /// Parses a unit name, singular or plural.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        let singular = name.strip_suffix('s').unwrap_or(&name);
        Some(match singular {
            "second" => Self::Second,
            "minute" => Self::Minute,
            "hour" => Self::Hour,
            "day" => Self::Day,
            "week" => Self::Week,
            "month" => Self::Month,
            "year" => Self::Year,
            _ => return None,
        })
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Options of the `relative` processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelativeOptions {
    /// Abbreviated unit names.
    pub short: bool,
    /// Use words like "yesterday" when one exists.
    pub auto: bool,
}

impl RelativeOptions {
    /// Reads options written as `style: short, numeric: auto`.
    pub fn from_members(members: &OptionMembers) -> Result<Self, String> {
        let mut options = Self::default();
        for (name, value) in members {
            match (name.as_str(), value.as_str()) {
                ("style", "long") => options.short = false,
                ("style", "short" | "narrow") => options.short = true,
                ("numeric", "always") => options.auto = false,
                ("numeric", "auto") => options.auto = true,
                ("style" | "numeric", _) => return Err(format!("Invalid {name}: {value}")),
                _ => return Err(format!("Unknown relative option: {name}")),
            }
        }
        Ok(options)
    }
}

/// Formats `value` units from now: negative values are in the past.
pub fn format_relative(
    value: i64,
    unit: RelativeUnit,
    options: RelativeOptions,
    data: &LocaleData,
    plurals: &PluralRulesSet,
) -> String {
    let words = &data.relative;
    if options.auto && unit == RelativeUnit::Day && (-1..=1).contains(&value) {
        let index = usize::try_from(value + 1).unwrap_or(1);
        return words.days[index].to_string();
    }
    #[allow(clippy::cast_precision_loss)]
    let magnitude = value.unsigned_abs() as f64;
    let names = if options.short {
        words.short[unit.index()]
    } else {
        words.long[unit.index()]
    };
    let name = if plurals.cardinal(magnitude) == "one" {
        names.0
    } else {
        names.1
    };
    let quantity = format!("{} {name}", fixed(magnitude, 0, 0, true, &data.numbers));
    let pattern = if value < 0 { words.past } else { words.future };
    pattern.replace("{0}", &quantity)
}

// ============================================================================
// Lists
// ============================================================================

/// How list items relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListKind {
    /// All items ("a, b, and c").
    #[default]
    Conjunction,
    /// Any item ("a, b, or c").
    Disjunction,
    /// Parts of one quantity ("2 minutes, 10 seconds").
    Unit,
}

impl ListKind {
    /// Parses `conjunction`, `disjunction` or `unit`.
    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "conjunction" => Ok(Self::Conjunction),
            "disjunction" => Ok(Self::Disjunction),
            "unit" => Ok(Self::Unit),
            _ => Err(format!("Invalid list type: {value}")),
        }
    }
}

/// Joins `items` the way the language of `data` lists things.
pub fn format_list(items: &[String], kind: ListKind, data: &LocaleData) -> String {
    let words = match kind {
        ListKind::Conjunction => &data.and,
        ListKind::Disjunction => &data.or,
        ListKind::Unit => &data.units_list,
    };
    match items {
        [] => String::new(),
        [single] => single.clone(),
        [first, second] => format!("{first}{}{second}", words.pair),
        [init @ .., last] => format!("{}{}{last}", init.join(words.middle), words.end),
    }
}

// ============================================================================
// Units
// ============================================================================

/// Length of unit names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitStyle {
    /// Full words.
    #[default]
    Long,
    /// Abbreviations.
    Short,
    /// Shortest symbols, glued to the number.
    Narrow,
}

impl UnitStyle {
    /// Parses `long`, `short` or `narrow`.
    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            "narrow" => Ok(Self::Narrow),
            _ => Err(format!("Invalid style: {value}")),
        }
    }
}

/// Formats a quantity of the duration unit at `unit_index` (years first).
pub fn format_unit(
    value: f64,
    unit_index: usize,
    style: UnitStyle,
    data: &LocaleData,
    plurals: &PluralRulesSet,
) -> String {
    let number = fixed(value, 0, 3, true, &data.numbers);
    let singular = plurals.cardinal(value) == "one";
    let pick = |(one, other): (&'static str, &'static str)| if singular { one } else { other };
    match style {
        UnitStyle::Long => format!("{number} {}", pick(data.units.long[unit_index])),
        UnitStyle::Short => format!("{number} {}", pick(data.units.short[unit_index])),
        UnitStyle::Narrow => format!("{number}{}", data.units.narrow[unit_index]),
    }
}

// ============================================================================
// Display names
// ============================================================================

/// What a code designates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// ISO 3166 region.
    Region,
    /// BCP 47 language tag.
    Language,
    /// ISO 15924 script.
    Script,
    /// ISO 4217 currency.
    Currency,
}

/// Name of `code` in the language of `data`, `None` when unknown.
pub fn display_name(kind: NameKind, code: &str, data: &LocaleData) -> Option<String> {
    let column = data.names_column;
    let name = match kind {
        NameKind::Region => lookup_name(REGIONS, &code.to_ascii_uppercase(), column),
        NameKind::Currency => lookup_name(CURRENCIES, &code.to_ascii_uppercase(), column),
        NameKind::Script => {
            let mut chars = code.chars();
            let normalized: String = chars
                .next()
                .map(|first| first.to_ascii_uppercase())
                .into_iter()
                .chain(chars.map(|c| c.to_ascii_lowercase()))
                .collect();
            lookup_name(SCRIPTS, &normalized, column)
        }
        NameKind::Language => {
            let (language, region) = code
                .split_once(['-', '_'])
                .map_or((code, None), |(language, region)| (language, Some(region)));
            let language = language.to_ascii_lowercase();
            let Some(region) = region else {
                return lookup_name(LANGUAGES, &language, column).map(str::to_string);
            };
            let region = region.to_ascii_uppercase();
            if let Some(name) = lookup_name(LANGUAGES, &format!("{language}-{region}"), column) {
                return Some(name.to_string());
            }
            let language_name = lookup_name(LANGUAGES, &language, column)?;
            let region_name = lookup_name(REGIONS, &region, column)?;
            return Some(format!("{language_name} ({region_name})"));
        }
    };
    name.map(str::to_string)
}
