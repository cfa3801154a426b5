//! # Polyglot Client
//!
//! Client side of Polyglot.
//!
//! This crate provides:
//! - The client dictionary, loaded zone by zone through a [`Condense`]
//!   implementation and kept up to date by server modifications
//! - Key resolution with locale fallbacks and the placeholder language
//! - Built-in processors (plurals, ordinals, numbers, dates, relative times,
//!   lists, durations, display names) backed by CLDR plural rules
//! - Translators, the key path builders handed to application code
//!
//! [`Condense`]: polyglot_common::Condense

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod args;
pub mod client;
pub mod dictionary;
pub mod duration;
pub mod error;
pub mod formats;
pub mod formatting;
pub mod internals;
pub mod interpolation;
pub mod locale_data;
pub mod plural;
pub mod processors;
pub mod reports;
pub mod translator;

pub use args::TranslationArg;
pub use client::{Entering, I18nClient, I18nClientBuilder, Loading, ModificationCallback, PartialLoad};
pub use dictionary::{ClientDictionary, DictionaryEntry};
pub use error::*;
pub use formats::FormatRegistry;
pub use interpolation::{LOADING_TEXT, MAX_DEPTH};
pub use processors::{Param, ProcessorContext, ProcessorFailure, ProcessorRegistry, ProcessorResult};
pub use reports::{ReportContext, Reporter, TracingReporter};
pub use translator::{bulk_dictionary, bulk_object, Translator};
