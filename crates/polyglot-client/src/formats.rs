//! Named option presets of the formatting processors, so that texts can
//! write `{number|$1|percent}` instead of spelling out the options.

use crate::formatting::{DateOptions, DateStyle, Notation, NumberOptions, NumberStyle, RelativeOptions};
use std::collections::BTreeMap;

/// Presets of the `number`, `date` and `relative` processors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatRegistry {
    /// `number` presets.
    pub number: BTreeMap<String, NumberOptions>,
    /// `date` presets.
    pub date: BTreeMap<String, DateOptions>,
    /// `relative` presets.
    pub relative: BTreeMap<String, RelativeOptions>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        let notation = |notation| NumberOptions {
            notation,
            ..NumberOptions::default()
        };
        let number = BTreeMap::from([
            ("decimal".to_string(), NumberOptions::default()),
            (
                "percent".to_string(),
                NumberOptions {
                    style: NumberStyle::Percent,
                    ..NumberOptions::default()
                },
            ),
            ("scientific".to_string(), notation(Notation::Scientific)),
            ("engineering".to_string(), notation(Notation::Engineering)),
            ("compact".to_string(), notation(Notation::Compact)),
        ]);
        let date = BTreeMap::from([
            (
                "date".to_string(),
                DateOptions {
                    date_style: Some(DateStyle::Short),
                    ..DateOptions::default()
                },
            ),
            (
                "time".to_string(),
                DateOptions {
                    time_style: Some(DateStyle::Short),
                    ..DateOptions::default()
                },
            ),
        ]);
        let relative = BTreeMap::from([
            (
                "short".to_string(),
                RelativeOptions {
                    short: true,
                    auto: false,
                },
            ),
            ("long".to_string(), RelativeOptions::default()),
        ]);
        Self {
            number,
            date,
            relative,
        }
    }
}

impl FormatRegistry {
    /// Adds or replaces a `number` preset.
    #[must_use]
    pub fn with_number(mut self, name: impl Into<String>, options: NumberOptions) -> Self {
        self.number.insert(name.into(), options);
        self
    }

    /// Adds or replaces a `date` preset.
    #[must_use]
    pub fn with_date(mut self, name: impl Into<String>, options: DateOptions) -> Self {
        self.date.insert(name.into(), options);
        self
    }

    /// Adds or replaces a `relative` preset.
    #[must_use]
    pub fn with_relative(mut self, name: impl Into<String>, options: RelativeOptions) -> Self {
        self.relative.insert(name.into(), options);
        self
    }
}
