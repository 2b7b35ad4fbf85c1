//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod expenditure;
pub mod grant;
pub mod report;
pub mod snapshot;

pub use expenditure::{handle_expenditure_command, ExpenditureCommands};
pub use grant::{handle_grant_command, GrantCommands};
pub use report::{handle_report_command, ReportCommands};
pub use snapshot::{handle_snapshot_command, SnapshotCommands};
