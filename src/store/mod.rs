//! Store module — ordered artifact persistence
//!
//! A collection is a directory of numbered files. The store owns the naming
//! scheme, the replace-all write path and the ordered read path; it knows
//! nothing about what the payloads mean.

pub mod numbered;

pub use numbered::{parse_index, IndexedItem, NumberedFileStore};
