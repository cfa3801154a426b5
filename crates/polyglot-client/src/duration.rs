//! Multi-unit durations: `{duration|hours: 1, seconds: 130}` renders
//! "1 hour, 2 minutes, 10 seconds".

use crate::formatting::{format_list, format_unit, ListKind, OptionMembers, UnitStyle};
use crate::locale_data::LocaleData;
use crate::plural::PluralRulesSet;

/// Duration units, largest first.
pub const DURATION_UNITS: [&str; 10] = [
    "years",
    "months",
    "weeks",
    "days",
    "hours",
    "minutes",
    "seconds",
    "milliseconds",
    "microseconds",
    "nanoseconds",
];

const WEEKS: usize = 2;
const DAYS: usize = 3;
const SECONDS: usize = 6;

/// Overflow carried from a unit to the next larger one.
const CARRIES: [(usize, usize, f64); 7] = [
    (9, 8, 1000.0),
    (8, 7, 1000.0),
    (7, 6, 1000.0),
    (6, 5, 60.0),
    (5, 4, 60.0),
    (4, 3, 24.0),
    (1, 0, 12.0),
];

/// Index of a unit name, singular or plural.
pub fn unit_index(name: &str) -> Option<usize> {
    let name = name.trim();
    DURATION_UNITS
        .iter()
        .position(|unit| *unit == name || unit.strip_suffix('s') == Some(name))
}

/// Options of the `duration` processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationOptions {
    /// Carry overflow to larger units (130 seconds become 2 minutes 10 seconds).
    pub calculate: bool,
    /// Smallest unit shown; smaller units are dropped.
    pub min_unit: Option<usize>,
    /// Keep weeks; otherwise they are counted as days.
    pub use_weeks: bool,
    /// Unit name length.
    pub style: UnitStyle,
    /// How the parts are joined.
    pub list: ListKind,
}

impl Default for DurationOptions {
    fn default() -> Self {
        Self {
            calculate: true,
            min_unit: None,
            use_weeks: false,
            style: UnitStyle::Long,
            list: ListKind::Unit,
        }
    }
}

impl DurationOptions {
    /// Reads options written as `minUnit: minutes, style: short`.
    pub fn from_members(members: &OptionMembers) -> Result<Self, String> {
        let mut options = Self::default();
        for (name, value) in members {
            match name.as_str() {
                "calculate" => options.calculate = value != "false",
                "useWeeks" => options.use_weeks = value == "true",
                "minUnit" => {
                    options.min_unit =
                        Some(unit_index(value).ok_or_else(|| format!("Invalid unit: {value}"))?);
                }
                "style" => options.style = UnitStyle::parse(value)?,
                "list" => options.list = ListKind::parse(value)?,
                _ => return Err(format!("Unknown duration option: {name}")),
            }
        }
        Ok(options)
    }
}

/// Reads the unit amounts of a duration description.
pub fn parse_duration(members: &OptionMembers) -> Result<[f64; 10], String> {
    let mut values = [0.0; 10];
    for (name, value) in members {
        let index = unit_index(name).ok_or_else(|| format!("Invalid unit: {name}"))?;
        values[index] = value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("NaN: {value}"))?;
    }
    Ok(values)
}

/// Folds weeks and carries overflow as the options ask.
pub fn normalize(mut values: [f64; 10], options: &DurationOptions) -> [f64; 10] {
    if !options.use_weeks {
        values[DAYS] += values[WEEKS] * 7.0;
        values[WEEKS] = 0.0;
    }
    if options.calculate {
        for (from, to, factor) in CARRIES {
            carry(&mut values, from, to, factor);
            if from == 4 && options.use_weeks {
                carry(&mut values, DAYS, WEEKS, 7.0);
            }
        }
    }
    values
}

fn carry(values: &mut [f64; 10], from: usize, to: usize, factor: f64) {
    if values[from] >= factor {
        let whole = (values[from] / factor).floor();
        values[to] += whole;
        values[from] -= whole * factor;
    }
}

/// Units to display: from the first to the last non-zero unit, none smaller
/// than the minimum unit. An empty duration shows its smallest unit.
pub fn visible_units(values: &[f64; 10], options: &DurationOptions) -> Vec<usize> {
    let last_allowed = options.min_unit.unwrap_or(DURATION_UNITS.len() - 1);
    let non_zero: Vec<usize> = (0..=last_allowed).filter(|i| values[*i] != 0.0).collect();
    match (non_zero.first(), non_zero.last()) {
        (Some(first), Some(last)) => (*first..=*last).collect(),
        _ => vec![options.min_unit.unwrap_or(SECONDS)],
    }
}

/// Renders a duration description.
pub fn format_duration(
    members: &OptionMembers,
    options: &DurationOptions,
    data: &LocaleData,
    plurals: &PluralRulesSet,
) -> Result<String, String> {
    let values = normalize(parse_duration(members)?, options);
    let parts: Vec<String> = visible_units(&values, options)
        .into_iter()
        .map(|index| format_unit(values[index], index, options.style, data, plurals))
        .collect();
    Ok(format_list(&parts, options.list, data))
}
