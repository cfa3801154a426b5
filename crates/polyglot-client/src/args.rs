//! Arguments passed to translations.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// One argument of a translation call.
///
/// Texts are inserted verbatim, numbers with their shortest decimal form,
/// dates as epoch milliseconds (what the `date` processor expects) and
/// objects as `key: value` pairs so named placeholders can reach into them.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationArg {
    /// A plain string.
    Text(String),
    /// A number.
    Number(f64),
    /// A point in time.
    Date(DateTime<Utc>),
    /// Named values, reachable with `$name`.
    Object(BTreeMap<String, TranslationArg>),
}

impl TranslationArg {
    /// Builds an object argument from name/value pairs.
    pub fn object<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Self>,
    {
        Self::Object(
            pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }

    /// Returns the named member of an object argument.
    pub fn member(&self, name: &str) -> Option<&Self> {
        match self {
            Self::Object(members) => members.get(name),
            _ => None,
        }
    }
}

impl fmt::Display for TranslationArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
            Self::Date(date) => write!(f, "{}", date.timestamp_millis()),
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

impl From<&str> for TranslationArg {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TranslationArg {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for TranslationArg {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<f64> for TranslationArg {
    fn from(number: f64) -> Self {
        Self::Number(number)
    }
}

impl From<i32> for TranslationArg {
    fn from(number: i32) -> Self {
        Self::Number(f64::from(number))
    }
}

impl From<u32> for TranslationArg {
    fn from(number: u32) -> Self {
        Self::Number(f64::from(number))
    }
}

impl From<i64> for TranslationArg {
    #[allow(clippy::cast_precision_loss)]
    fn from(number: i64) -> Self {
        Self::Number(number as f64)
    }
}

impl From<DateTime<Utc>> for TranslationArg {
    fn from(date: DateTime<Utc>) -> Self {
        Self::Date(date)
    }
}

impl From<BTreeMap<String, Self>> for TranslationArg {
    fn from(members: BTreeMap<String, Self>) -> Self {
        Self::Object(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display() {
        assert_eq!(TranslationArg::from(2).to_string(), "2");
        assert_eq!(TranslationArg::from(2.5).to_string(), "2.5");
        assert_eq!(TranslationArg::from("x").to_string(), "x");
        let date = Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(TranslationArg::from(date).to_string(), "1619827200000");
    }

    #[test]
    fn test_object_display_and_members() {
        let person = TranslationArg::object([("last", "Doe"), ("first", "John")]);
        assert_eq!(person.to_string(), "first: John, last: Doe");
        assert_eq!(person.member("last"), Some(&TranslationArg::from("Doe")));
        assert_eq!(TranslationArg::from(1).member("last"), None);
    }
}
