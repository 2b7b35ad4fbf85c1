//! Snapshot CLI commands
//!
//! Export the full data set to a JSON snapshot, and import snapshots from
//! other machines through the merge reconciler.

use std::path::PathBuf;

use clap::Subcommand;

use crate::error::GrantResult;
use crate::export::{export_snapshot, import_snapshot};
use crate::storage::Storage;

/// Snapshot subcommands
#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// Export everything to a JSON snapshot file
    Export {
        /// Destination path
        path: PathBuf,
    },

    /// Merge a snapshot file into the local data set
    ///
    /// Records already present locally are kept; only new records are added.
    Import {
        /// Snapshot file to import
        path: PathBuf,
    },
}

/// Handle a snapshot command
pub fn handle_snapshot_command(storage: &Storage, cmd: SnapshotCommands) -> GrantResult<()> {
    match cmd {
        SnapshotCommands::Export { path } => {
            let snapshot = export_snapshot(storage, &path)?;
            println!(
                "Exported {} grant(s), {} expenditure(s), {} template(s) to {}",
                snapshot.grants.len(),
                snapshot.expenditures.len(),
                snapshot.templates.len(),
                path.display()
            );
        }

        SnapshotCommands::Import { path } => {
            let report = import_snapshot(storage, &path)?;
            println!("Merged snapshot from {}", path.display());
            println!(
                "  Grants:       {} added, {} already present",
                report.grants.inserted, report.grants.skipped
            );
            println!(
                "  Expenditures: {} added, {} already present",
                report.expenditures.inserted, report.expenditures.skipped
            );
            println!(
                "  Templates:    {} added, {} already present",
                report.templates.inserted, report.templates.skipped
            );
        }
    }

    Ok(())
}
