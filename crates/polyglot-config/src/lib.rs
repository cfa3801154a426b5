//! # Polyglot Config
//!
//! Type-safe configuration management with hot-reloading for Polyglot.
//!
//! This crate provides configuration loading from TOML or YAML files,
//! environment overrides, validation, and a lock-free cache that can follow
//! a configuration file as it changes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod defaults;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validator;

pub use cache::{ConfigCache, ConfigWatcher};
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader};
pub use schema::*;
pub use validator::ConfigValidator;
