//! Expenditure CLI commands
//!
//! Posting, listing, and deleting expenditures, including the derived
//! indirect-cost entry and the orphan audit.

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::error::{GrantError, GrantResult};
use crate::models::FundingSource;
use crate::services::{ExpenditureDraft, ExpenditureService, GrantService, PostOptions};
use crate::storage::Storage;

use super::grant::{find_deliverable, find_sub_recipient, parse_money};

/// Expenditure subcommands
#[derive(Subcommand)]
pub enum ExpenditureCommands {
    /// Post an expenditure against a budget category
    Add {
        /// Grant name
        grant: String,
        /// Deliverable description
        deliverable: String,
        /// Budget category name
        category: String,
        /// Amount (e.g., "45.99")
        amount: String,
        /// Vendor name
        #[arg(short, long)]
        vendor: String,
        /// Expenditure date (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Sub-recipient name, when posting under a carve-out
        #[arg(short, long)]
        sub: Option<String>,
        /// Who made the purchase
        #[arg(long)]
        purchaser: Option<String>,
        /// Why the purchase was made
        #[arg(short, long)]
        justification: Option<String>,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
        /// Funding source: grant, match, third-party
        #[arg(long, default_value = "grant")]
        source: String,
        /// Also post the indirect-cost-recovery entry
        #[arg(long)]
        apply_idc: bool,
        /// Suppress the indirect-cost entry even if settings enable it
        #[arg(long, conflicts_with = "apply_idc")]
        no_idc: bool,
    },

    /// List expenditures
    List {
        /// Filter by grant name
        #[arg(short, long)]
        grant: Option<String>,
        /// Number of expenditures to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Delete an expenditure by id
    Delete {
        /// Expenditure id (exp-xxxxxxxx or full UUID)
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// List expenditures whose deliverable no longer exists
    Orphans,
}

/// Handle an expenditure command
pub fn handle_expenditure_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExpenditureCommands,
) -> GrantResult<()> {
    let service = ExpenditureService::new(storage);

    match cmd {
        ExpenditureCommands::Add {
            grant,
            deliverable,
            category,
            amount,
            vendor,
            date,
            sub,
            purchaser,
            justification,
            notes,
            source,
            apply_idc,
            no_idc,
        } => {
            let target = GrantService::new(storage).get_by_name(&grant)?;
            let del = find_deliverable(&target, &deliverable)?;
            let cat = del
                .budget_categories
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(&category))
                .ok_or_else(|| GrantError::category_not_found(category.as_str()))?;

            let mut draft = ExpenditureDraft::new(
                target.id,
                del.id,
                cat.id,
                parse_date(date.as_deref(), settings)?,
                vendor,
                parse_money(&amount)?,
            );
            if let Some(sub_name) = sub {
                draft.sub_recipient_id = Some(find_sub_recipient(&target, &sub_name)?.id);
            }
            draft.purchaser = purchaser.unwrap_or_default();
            draft.justification = justification.unwrap_or_default();
            draft.notes = notes.unwrap_or_default();
            draft.funding_source = parse_funding_source(&source)?;

            let apply_indirect_cost = if no_idc {
                false
            } else {
                apply_idc || settings.apply_indirect_cost_by_default
            };

            let posting = service.post(draft, PostOptions { apply_indirect_cost })?;
            println!(
                "Posted {} to {} / {} ({})",
                posting.primary.amount, deliverable, category, posting.primary.id
            );
            if let Some(indirect) = posting.indirect {
                println!(
                    "Posted indirect-cost entry {} at {}% ({})",
                    indirect.amount, target.indirect_cost_rate, indirect.id
                );
            }
        }

        ExpenditureCommands::List { grant, limit } => {
            let expenditures = match grant {
                Some(name) => {
                    let target = GrantService::new(storage).get_by_name(&name)?;
                    storage.expenditures.get_by_grant(target.id)?
                }
                None => storage.expenditures.get_all()?,
            };

            if expenditures.is_empty() {
                println!("No expenditures.");
                return Ok(());
            }

            println!(
                "{:<12} {:<24} {:>12}  {:<10}  {}",
                "Date", "Vendor", "Amount", "Status", "ID"
            );
            println!("{}", "-".repeat(84));
            for exp in expenditures.iter().take(limit) {
                let vendor = if exp.is_indirect() {
                    format!("{} (IDC)", exp.vendor)
                } else {
                    exp.vendor.clone()
                };
                println!(
                    "{:<12} {:<24} {:>12}  {:<10}  {}",
                    exp.date.format(&settings.date_format).to_string(),
                    vendor,
                    exp.amount.to_string(),
                    exp.status.to_string(),
                    exp.id
                );
            }
        }

        ExpenditureCommands::Delete { id, yes } => {
            let target = resolve_expenditure_id(storage, &id)?;
            if !yes {
                println!(
                    "This will delete {} {} ({}). Re-run with --yes to confirm.",
                    target.amount, target.vendor, target.id
                );
                return Ok(());
            }
            let deleted = service.delete(target.id)?;
            println!("Deleted {} {} ({})", deleted.amount, deleted.vendor, deleted.id);
        }

        ExpenditureCommands::Orphans => {
            let orphans = service.orphaned()?;
            if orphans.is_empty() {
                println!("No orphaned expenditures.");
                return Ok(());
            }
            println!("{} orphaned expenditure(s):", orphans.len());
            for exp in orphans {
                println!("  {} {} {} ({})", exp.date, exp.amount, exp.vendor, exp.id);
            }
        }
    }

    Ok(())
}

fn parse_date(arg: Option<&str>, settings: &Settings) -> GrantResult<NaiveDate> {
    match arg {
        Some(s) => NaiveDate::parse_from_str(s, &settings.date_format).map_err(|e| {
            GrantError::Validation(format!(
                "invalid date '{}' (expected {}): {}",
                s, settings.date_format, e
            ))
        }),
        None => Ok(Local::now().date_naive()),
    }
}

fn parse_funding_source(s: &str) -> GrantResult<FundingSource> {
    match s.to_lowercase().as_str() {
        "grant" => Ok(FundingSource::Grant),
        "match" => Ok(FundingSource::Match),
        "third-party" | "third_party" | "thirdparty" => Ok(FundingSource::ThirdParty),
        other => Err(GrantError::Validation(format!(
            "unknown funding source '{}' (expected grant, match, or third-party)",
            other
        ))),
    }
}

/// Resolve an expenditure by display prefix or full UUID
fn resolve_expenditure_id(
    storage: &Storage,
    id: &str,
) -> GrantResult<crate::models::Expenditure> {
    let all = storage.expenditures.get_all()?;
    let needle = id.trim();
    all.into_iter()
        .find(|e| e.id.to_string() == needle || e.id.as_uuid().to_string() == needle)
        .ok_or_else(|| GrantError::expenditure_not_found(needle))
}
