//! Report CLI commands

use std::fs::File;
use std::path::PathBuf;

use clap::Subcommand;

use crate::error::GrantResult;
use crate::reports::GrantSummaryReport;
use crate::services::GrantService;
use crate::storage::Storage;

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Full allocation-and-spending summary for one grant
    Summary {
        /// Grant name
        grant: String,
        /// Write the report as CSV to this path instead of printing it
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

/// Handle a report command
pub fn handle_report_command(storage: &Storage, cmd: ReportCommands) -> GrantResult<()> {
    match cmd {
        ReportCommands::Summary { grant, csv } => {
            let target = GrantService::new(storage).get_by_name(&grant)?;
            let report = GrantSummaryReport::generate(storage, target.id)?;

            match csv {
                Some(path) => {
                    let mut file = File::create(&path)?;
                    report.export_csv(&mut file)?;
                    println!("Wrote CSV report to {}", path.display());
                }
                None => print!("{}", report.format_terminal()),
            }
        }
    }

    Ok(())
}
