//! grant-ledger - Budget allocation and spend tracking for grant-funded work
//!
//! This library is the engine behind the grantled CLI: grants with a
//! hierarchical allocation tree (deliverables, sub-recipients, budget
//! categories), an append-style expenditure ledger with derived
//! indirect-cost-recovery entries, allocation math computed live from the
//! expenditure list, and snapshot export/import with a current-wins merge.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (grants, expenditures, templates)
//! - `storage`: JSON file storage layer with atomic writes
//! - `services`: Business logic layer
//! - `export`: Snapshot export and import
//! - `reports`: Terminal and CSV reporting
//! - `cli`: clap command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use grant_ledger::config::{paths::LedgerPaths, settings::Settings};
//!
//! let paths = LedgerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{GrantError, GrantResult};
