//! # Polyglot Server
//!
//! Server side of Polyglot.
//!
//! This crate provides:
//! - The condenser, building per-zone condensed dictionaries from a store
//! - The interactive server, logging edits and pushing the visible ones to
//!   subscribed clients

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod condenser;
pub mod error;
pub mod interactive;

pub use condenser::*;
pub use error::*;
pub use interactive::*;
