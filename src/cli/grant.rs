//! Grant CLI commands
//!
//! Implements CLI commands for grant and allocation-tree management:
//! creating grants, carving out sub-recipients, and building deliverable
//! and category structures.

use clap::Subcommand;

use crate::error::{GrantError, GrantResult};
use crate::models::{
    BudgetCategory, Deliverable, Grant, GrantStatus, Money, SubRecipient,
};
use crate::services::{grant_stats, GrantService};
use crate::storage::Storage;

/// Grant subcommands
#[derive(Subcommand)]
pub enum GrantCommands {
    /// Create a new grant
    Create {
        /// Grant name
        name: String,
        /// Total award amount (e.g., "50000" or "50000.00")
        award: String,
        /// Funding organization
        #[arg(short, long)]
        funder: Option<String>,
        /// Indirect-cost-recovery rate as a percentage (e.g., "10")
        #[arg(long, default_value = "0")]
        idc_rate: f64,
    },

    /// List all grants
    List,

    /// Show one grant's allocation tree
    Show {
        /// Grant name
        name: String,
    },

    /// Change a grant's lifecycle status
    Status {
        /// Grant name
        name: String,
        /// New status: draft, pending, active, closed, archived
        status: String,
    },

    /// Add a deliverable to a grant (or to one of its sub-recipients)
    AddDeliverable {
        /// Grant name
        grant: String,
        /// Deliverable description
        description: String,
        /// Allocated amount
        amount: String,
        /// Sub-recipient name (omit for a primary deliverable)
        #[arg(short, long)]
        sub: Option<String>,
        /// Section reference in the grant agreement (e.g., "2.1.a")
        #[arg(long)]
        section: Option<String>,
    },

    /// Add a sub-recipient carve-out to a grant
    AddSub {
        /// Grant name
        grant: String,
        /// Partner organization name
        name: String,
        /// Carve-out amount
        amount: String,
    },

    /// Add a budget category to a deliverable
    AddCategory {
        /// Grant name
        grant: String,
        /// Deliverable description
        deliverable: String,
        /// Category name
        name: String,
        /// Allocated amount
        amount: String,
        /// Free-text purpose
        #[arg(short, long)]
        purpose: Option<String>,
    },

    /// Delete a grant (expenditures are left in place)
    Delete {
        /// Grant name
        name: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Handle a grant command
pub fn handle_grant_command(storage: &Storage, cmd: GrantCommands) -> GrantResult<()> {
    let service = GrantService::new(storage);

    match cmd {
        GrantCommands::Create {
            name,
            award,
            funder,
            idc_rate,
        } => {
            let mut grant = Grant::new(name, parse_money(&award)?);
            grant.funder = funder.unwrap_or_default();
            grant.indirect_cost_rate = idc_rate;
            let grant = service.create(grant)?;
            println!("Created grant: {}", grant);
            println!("  ID: {}", grant.id);
        }

        GrantCommands::List => {
            let grants = service.list()?;
            if grants.is_empty() {
                println!("No grants yet. Run 'grantled grant create <name> <award>'.");
                return Ok(());
            }
            let expenditures = storage.expenditures.get_all()?;
            println!(
                "{:<32} {:>14} {:>14} {:>14}  {}",
                "Name", "Award", "Spent", "Remaining", "Status"
            );
            println!("{}", "-".repeat(88));
            for grant in grants {
                let stats = grant_stats(&grant, &expenditures);
                println!(
                    "{:<32} {:>14} {:>14} {:>14}  {}",
                    grant.name,
                    grant.total_award.to_string(),
                    stats.spent.to_string(),
                    stats.remaining.to_string(),
                    grant.status
                );
            }
        }

        GrantCommands::Show { name } => {
            let grant = service.get_by_name(&name)?;
            let expenditures = storage.expenditures.get_all()?;
            let stats = grant_stats(&grant, &expenditures);

            println!("{}", grant.name);
            if !grant.funder.is_empty() {
                println!("Funder: {}", grant.funder);
            }
            println!("Status: {}", grant.status);
            println!("Award: {}  Spent: {}  Remaining: {}", grant.total_award, stats.spent, stats.remaining);
            println!("IDC rate: {}%", grant.indirect_cost_rate);
            println!("Unassigned: {}", stats.unassigned);
            println!();
            for del in &grant.deliverables {
                println!("  {} [{}] {}", del.description, del.status, del.allocated_value);
                for cat in &del.budget_categories {
                    println!("    {} {}", cat.name, cat.allocation);
                }
            }
            for sub in &grant.sub_recipients {
                println!("  {} (sub-recipient) {}", sub.name, sub.allocated_amount);
                for del in &sub.deliverables {
                    println!("    {} [{}] {}", del.description, del.status, del.allocated_value);
                    for cat in &del.budget_categories {
                        println!("      {} {}", cat.name, cat.allocation);
                    }
                }
            }
        }

        GrantCommands::Status { name, status } => {
            let mut grant = service.get_by_name(&name)?;
            grant.status = parse_status(&status)?;
            let grant = service.update(grant.id, grant.clone())?;
            println!("{} is now {}", grant.name, grant.status);
        }

        GrantCommands::AddDeliverable {
            grant,
            description,
            amount,
            sub,
            section,
        } => {
            let target = service.get_by_name(&grant)?;
            let mut del = Deliverable::new(description.clone(), parse_money(&amount)?);
            if let Some(section) = section {
                del.section_reference = section;
            }
            match sub {
                Some(sub_name) => {
                    let sub = find_sub_recipient(&target, &sub_name)?;
                    service.add_sub_deliverable(target.id, sub.id, del)?;
                    println!("Added '{}' under {}", description, sub_name);
                }
                None => {
                    service.add_deliverable(target.id, del)?;
                    println!("Added '{}' to {}", description, grant);
                }
            }
        }

        GrantCommands::AddSub {
            grant,
            name,
            amount,
        } => {
            let target = service.get_by_name(&grant)?;
            let sub = SubRecipient::new(name.clone(), parse_money(&amount)?);
            service.add_sub_recipient(target.id, sub)?;
            println!("Added sub-recipient '{}' to {}", name, grant);
        }

        GrantCommands::AddCategory {
            grant,
            deliverable,
            name,
            amount,
            purpose,
        } => {
            let target = service.get_by_name(&grant)?;
            let del = find_deliverable(&target, &deliverable)?;
            let cat = match purpose {
                Some(purpose) => BudgetCategory::with_purpose(name.clone(), parse_money(&amount)?, purpose),
                None => BudgetCategory::new(name.clone(), parse_money(&amount)?),
            };
            service.add_category(target.id, del.id, cat)?;
            println!("Added category '{}' to '{}'", name, deliverable);
        }

        GrantCommands::Delete { name, yes } => {
            let grant = service.get_by_name(&name)?;
            if !yes {
                println!(
                    "This will delete '{}'. Its expenditures stay in the ledger as orphans.",
                    grant.name
                );
                println!("Re-run with --yes to confirm.");
                return Ok(());
            }
            service.delete(grant.id)?;
            println!("Deleted grant '{}'", name);
        }
    }

    Ok(())
}

/// Parse a money argument
pub(crate) fn parse_money(s: &str) -> GrantResult<Money> {
    Money::parse(s).map_err(|e| GrantError::Validation(e.to_string()))
}

fn parse_status(s: &str) -> GrantResult<GrantStatus> {
    match s.to_lowercase().as_str() {
        "draft" => Ok(GrantStatus::Draft),
        "pending" => Ok(GrantStatus::Pending),
        "active" => Ok(GrantStatus::Active),
        "closed" => Ok(GrantStatus::Closed),
        "archived" => Ok(GrantStatus::Archived),
        other => Err(GrantError::Validation(format!(
            "unknown status '{}' (expected draft, pending, active, closed, or archived)",
            other
        ))),
    }
}

/// Find a sub-recipient by name (case-insensitive)
pub(crate) fn find_sub_recipient<'a>(
    grant: &'a Grant,
    name: &str,
) -> GrantResult<&'a SubRecipient> {
    grant
        .sub_recipients
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| GrantError::sub_recipient_not_found(name))
}

/// Find a deliverable by description anywhere in the tree (case-insensitive)
pub(crate) fn find_deliverable<'a>(
    grant: &'a Grant,
    description: &str,
) -> GrantResult<&'a Deliverable> {
    grant
        .deliverables
        .iter()
        .chain(grant.sub_recipients.iter().flat_map(|s| &s.deliverables))
        .find(|d| d.description.eq_ignore_ascii_case(description))
        .ok_or_else(|| GrantError::deliverable_not_found(description))
}
