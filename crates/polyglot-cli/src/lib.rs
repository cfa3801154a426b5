//! # Polyglot CLI
//!
//! The `polyglot-extract` tool: condenses a dictionary file for a list of
//! locales and writes one preload script per locale (or a single grouped
//! one), optionally re-exporting whenever the dictionary changes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod args;
pub mod export;
pub mod watch;

pub use args::Cli;
pub use export::{export_locales, preload_script, ExtractSettings, GROUPED_NAME};
pub use watch::watch_input;
