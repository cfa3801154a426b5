//! Configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::schema::Config;
use chrono_tz::Tz;
use polyglot_common::validate_locale;

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, reporting every problem at once.
    pub fn validate(config: &Config) -> ConfigResult<()> {
        let mut problems = Vec::new();

        if config.client.locales.is_empty() {
            problems.push("client.locales cannot be empty".to_string());
        }
        let locales = config.client.locales.iter().map(|l| ("client.locales", l));
        let extracted = config.extract.locales.iter().map(|l| ("extract.locales", l));
        for (field, locale) in locales.chain(extracted) {
            if let Err(e) = validate_locale(locale) {
                problems.push(format!("{field}: {e}"));
            }
        }
        if let Some(time_zone) = &config.client.time_zone {
            if let Err(e) = validate_time_zone(time_zone) {
                problems.push(format!("client.time_zone: {e}"));
            }
        }
        if let Some(currency) = &config.client.currency {
            if let Err(e) = validate_currency(currency) {
                problems.push(format!("client.currency: {e}"));
            }
        }
        if let Err(e) = validate_pattern(&config.extract.pattern) {
            problems.push(format!("extract.pattern: {e}"));
        }
        if config.extract.global.is_empty() {
            problems.push("extract.global cannot be empty".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems))
        }
    }
}

/// Checks that `time_zone` is an IANA time zone name.
pub fn validate_time_zone(time_zone: &str) -> Result<(), String> {
    time_zone
        .parse::<Tz>()
        .map(|_| ())
        .map_err(|_| format!("unknown time zone {time_zone:?}"))
}

/// Checks that `currency` looks like an ISO 4217 code.
pub fn validate_currency(currency: &str) -> Result<(), String> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(format!("{currency:?} is not a three-letter currency code"))
    }
}

/// Checks that a file pattern has a `$` for the locale.
pub fn validate_pattern(pattern: &str) -> Result<(), String> {
    if pattern.contains('$') {
        Ok(())
    } else {
        Err(format!("{pattern:?} has no '$' to stand for the locale"))
    }
}
