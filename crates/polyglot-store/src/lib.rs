//! # Polyglot Store
//!
//! Translation storage for Polyglot.
//!
//! This crate provides:
//! - The store trait hierarchy, from read-only listing to interactive editing
//! - An in-memory store
//! - A file store persisting the line-oriented dictionary format as UTF-16LE
//! - Adapters for backends queried per locale or in one pass

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod file;
pub mod helpers;
pub mod memory;
pub mod serialization;
pub mod traits;

pub use error::*;
pub use file::{FileStore, DEFAULT_SAVE_DELAY};
pub use helpers::*;
pub use memory::{MemDictionary, MemEntry, MemStore};
pub use traits::*;
