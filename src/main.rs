use anyhow::Result;
use clap::{Parser, Subcommand};

use grant_ledger::cli::{
    handle_expenditure_command, handle_grant_command, handle_report_command,
    handle_snapshot_command, ExpenditureCommands, GrantCommands, ReportCommands,
    SnapshotCommands,
};
use grant_ledger::config::{paths::LedgerPaths, settings::Settings};
use grant_ledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "grantled",
    version,
    about = "Budget allocation and spend tracking for grant-funded programs",
    long_about = "grantled tracks grant awards, their allocation trees \
                  (deliverables, sub-recipients, budget categories), and the \
                  expenditures posted against them, including automatic \
                  indirect-cost-recovery entries."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Grant and allocation-tree management
    #[command(subcommand)]
    Grant(GrantCommands),

    /// Expenditure posting and auditing
    #[command(subcommand, alias = "exp")]
    Expenditure(ExpenditureCommands),

    /// Reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Snapshot export and import
    #[command(subcommand)]
    Snapshot(SnapshotCommands),

    /// Initialize the data directory with default templates
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = LedgerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Grant(cmd)) => {
            handle_grant_command(&storage, cmd)?;
        }
        Some(Commands::Expenditure(cmd)) => {
            handle_expenditure_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Report(cmd)) => {
            handle_report_command(&storage, cmd)?;
        }
        Some(Commands::Snapshot(cmd)) => {
            handle_snapshot_command(&storage, cmd)?;
        }
        Some(Commands::Init) => {
            println!("Initializing grantled at: {}", paths.data_dir().display());
            grant_ledger::storage::init::initialize_storage(&paths)?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Default email templates have been created.");
            println!("Run 'grantled grant create <name> <award>' to add your first grant.");
        }
        Some(Commands::Config) => {
            println!("grantled Configuration");
            println!("======================");
            println!("Data directory:        {}", paths.data_dir().display());
            println!("Attachments directory: {}", paths.attachments_dir().display());
            println!("Settings file:         {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:  {}", settings.currency_symbol);
            println!("  Date format:      {}", settings.date_format);
            println!(
                "  Apply IDC by default: {}",
                settings.apply_indirect_cost_by_default
            );
        }
        None => {
            println!("grantled - budget tracking for grant-funded programs");
            println!();
            println!("Run 'grantled --help' for usage information.");
            println!("Run 'grantled init' to set up the data directory.");
        }
    }

    Ok(())
}
