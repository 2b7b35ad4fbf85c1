//! Snapshot export and import
//!
//! JSON is the interchange format for backups and cross-machine sync;
//! imports always go through the merge reconciler.

pub mod json;

pub use json::{export_snapshot, import_snapshot, read_snapshot};
