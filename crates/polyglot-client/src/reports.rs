//! Reporting of missing translations and processor errors.
//!
//! Both are recovered where they happen: the reporter decides what the
//! affected placeholder or key renders as, and may forward the event to
//! logging or telemetry.

use polyglot_common::{Locale, Zone};
use serde_json::Value;
use tracing::{debug, warn};

/// Where a report comes from.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    /// Key being translated.
    pub key: &'a str,
    /// Locales of the client.
    pub locales: &'a [Locale],
    /// Zones of the translator in use.
    pub zones: &'a [Zone],
}

/// Renders a missing translation: the fallback text when there is one,
/// `[key]` otherwise.
pub fn render_missing(context: &ReportContext<'_>, fallback: Option<&str>) -> String {
    fallback.map_or_else(|| format!("[{}]", context.key), str::to_string)
}

/// Renders a processor error as `[!error!]`.
pub fn render_error(error: &str) -> String {
    format!("[!{error}!]")
}

/// Receives every recovered failure and returns its rendering.
pub trait Reporter: Send + Sync {
    /// A key has no translation in the client locales. `fallback` is the
    /// text found in a less preferred locale, if any.
    fn missing(&self, context: &ReportContext<'_>, fallback: Option<&str>) -> String {
        render_missing(context, fallback)
    }

    /// A placeholder could not be evaluated.
    fn error(&self, context: &ReportContext<'_>, error: &str, detail: &Value) -> String {
        let _ = (context, detail);
        render_error(error)
    }
}

/// Default reporter, logging missing texts at debug level and errors as
/// warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn missing(&self, context: &ReportContext<'_>, fallback: Option<&str>) -> String {
        match fallback {
            Some(_) => debug!(
                "Fallback used for '{}' (locales: {:?}, zones: {:?})",
                context.key, context.locales, context.zones
            ),
            None => debug!(
                "Missing translation '{}' (locales: {:?}, zones: {:?})",
                context.key, context.locales, context.zones
            ),
        }
        render_missing(context, fallback)
    }

    fn error(&self, context: &ReportContext<'_>, error: &str, detail: &Value) -> String {
        warn!(
            "Interpolation error in '{}': {} ({})",
            context.key, error, detail
        );
        render_error(error)
    }
}
