//! # Polyglot Common
//!
//! Shared types, utilities, and common functionality for Polyglot.
//!
//! This crate provides the dictionary shapes exchanged between the store,
//! the server and the client, the locale-tree helpers every layer relies on,
//! and the relaxed object-literal notation used for metadata.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod condensed;
pub mod literal;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use condensed::*;
pub use traits::*;
pub use types::*;
pub use utils::*;
