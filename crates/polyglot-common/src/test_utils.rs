//! Test utilities and shared test helpers for Polyglot.
//!
//! This module provides common testing utilities, fixtures, and helper functions
//! that can be used across all crates in the workspace for unit and integration testing.

use std::sync::Once;

#[cfg(feature = "tracing-subscriber")]
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
#[cfg(feature = "tracing-subscriber")]
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        fmt().with_test_writer().with_env_filter(filter).init();
    });
}

/// No-op version when tracing-subscriber is not available
#[cfg(not(feature = "tracing-subscriber"))]
pub fn init_test_logging() {
    INIT.call_once(|| {});
}

/// Create a tokio runtime for testing async functions from a synchronous test.
#[cfg(feature = "tokio")]
pub fn create_test_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().expect("Failed to create test runtime")
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Sample translation sets shared by store, server and client tests.
pub mod dictionary_fixtures {
    /// One row of a fixture: `(key, zone, [(locale, text)])`.
    pub type FixtureEntry = (&'static str, &'static str, &'static [(&'static str, &'static str)]);

    /// Fields and commands used by the fallback and zone scenarios.
    pub const BASIC_ENTRIES: &[FixtureEntry] = &[
        ("fld.name", "", &[("en", "Name"), ("fr", "Nom")]),
        ("fld.bdate", "", &[("en", "Birthday"), ("fr", "Date de naissance")]),
        ("fld.bdate.short", "", &[("en", "B-dy")]),
        (
            "msg.greet",
            "",
            &[
                ("en", "Hello {$1|here}"),
                ("fr", "Salut {$1|tout le monde}"),
                ("fr-BE", "Salut {$1|m'fi}"),
            ],
        ),
        ("cmd.ban", "adm", &[("en", "Ban user"), ("fr", "Bannir l'utilisateur")]),
    ];

    /// Texts exercising processors and the locale data they rely on.
    pub const PROCESSOR_ENTRIES: &[FixtureEntry] = &[
        (
            "specs.animal",
            "",
            &[
                ("en", "{$1} {plural|$1|ox|oxen}"),
                ("fr", "{$1} {plural|$1|one:cheval,other:chevaux}"),
            ],
        ),
        ("specs.cat", "", &[("en", "{$1} {plural|$1|cat}"), ("fr", "{$1} {plural|$1|chat}")]),
        ("specs.ordinal", "", &[("", "{ordinal|$1}")]),
        (
            "cnv.naming",
            "",
            &[("en", "{$last}, {$first}"), ("fr", "{$first} {$last}")],
        ),
        (
            "cnv.subNaming",
            "",
            &[("en", "{cnv.naming|first: $first, last: $last}"), ("fr", "{cnv.naming|$}")],
        ),
        (
            "internals.ordinals",
            "",
            &[
                ("en", "{one: '$st', two: '$nd', few: '$rd', other: '$th'}"),
                ("fr", "{one: '$er', other: '$ème'}"),
            ],
        ),
        (
            "internals.plurals",
            "",
            &[("en", "{one: '$', other: '$s'}"), ("fr", "{one: '$', other: '$s'}")],
        ),
    ];
}

/// Configuration-related test utilities.
pub mod config_fixtures {
    /// Create a minimal valid test configuration as TOML string.
    pub const fn minimal_config_toml() -> &'static str {
        r#"
[client]
locales = ["en-US"]
"#
    }

    /// Create a full test configuration as YAML string.
    pub const fn full_config_yaml() -> &'static str {
        concat!(
            "client:\n",
            "  locales: [\"fr-BE\", \"en\"]\n",
            "  zones: [\"\", \"adm\"]\n",
            "  time_zone: \"Europe/Brussels\"\n",
            "  currency: \"EUR\"\n",
            "\n",
            "store:\n",
            "  path: \"dictionary.db\"\n",
            "  save_delay_ms: 500\n",
            "\n",
            "extract:\n",
            "  output: \"public/i18n\"\n",
            "  pattern: \"$.js\"\n",
            "  grouped: false\n",
            "  watch: false\n",
            "  locales: [\"en\", \"fr\"]\n",
            "\n",
            "logging:\n",
            "  filter: \"polyglot=debug\"\n",
            "  json: false\n"
        )
    }
}

/// Property-based testing utilities using proptest.
#[cfg(feature = "proptest")]
pub mod property_testing {
    use proptest::prelude::*;

    /// Strategy for generating valid text keys.
    pub fn key_strategy() -> impl Strategy<Value = String> {
        r"[a-z][a-z0-9_]{0,5}(\.[a-z][a-z0-9_]{0,5}){0,2}"
            .prop_map(|s| s.to_string())
            .prop_filter("reserved segment", |key| !key.split('.').any(|s| s == "then"))
    }

    /// Strategy for generating locales, including the universal one.
    pub fn locale_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            r"[a-z]{2}".prop_map(|s| s.to_string()),
            r"[a-z]{2}-[A-Z]{2}".prop_map(|s| s.to_string()),
        ]
    }

    /// Strategy for generating zone names.
    pub fn zone_strategy() -> impl Strategy<Value = String> {
        r"[a-z]{0,4}".prop_map(|s| s.to_string())
    }

    /// Strategy for generating translation texts, line breaks and markup included.
    pub fn text_strategy() -> impl Strategy<Value = String> {
        r#"[a-zA-Z0-9 \n\t{}:|$'"`éß]{0,24}"#.prop_map(|s| s.to_string())
    }
}
