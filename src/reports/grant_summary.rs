//! Grant Summary Report
//!
//! Generates a full allocation-and-spending picture for one grant: primary
//! deliverables with their budget categories, sub-recipient carve-outs with
//! community deliverables, and grant-level totals. All figures are derived
//! from the live expenditure list at generation time.

use std::io::Write;

use crate::error::{GrantError, GrantResult};
use crate::models::{BudgetCategoryId, DeliverableId, GrantId, Money, SubRecipientId};
use crate::services::{
    deliverable_stats, grant_stats, sub_recipient_stats, GrantService, GrantStats,
};
use crate::storage::Storage;

/// A row for a single budget category
#[derive(Debug, Clone)]
pub struct CategoryReportRow {
    /// Category ID
    pub category_id: BudgetCategoryId,
    /// Category name
    pub category_name: String,
    /// Amount allocated to the category
    pub allocated: Money,
    /// Amount spent against the category
    pub spent: Money,
    /// Allocation minus spend
    pub remaining: Money,
}

impl CategoryReportRow {
    /// Check if this category is overspent
    pub fn is_overspent(&self) -> bool {
        self.remaining.is_negative()
    }
}

/// A row for a deliverable with its category rows
#[derive(Debug, Clone)]
pub struct DeliverableReportRow {
    /// Deliverable ID
    pub deliverable_id: DeliverableId,
    /// Deliverable description
    pub description: String,
    /// Progress status, for display
    pub status: String,
    /// Amount allocated to the deliverable
    pub allocated: Money,
    /// Amount allocated onward to categories
    pub allocated_to_categories: Money,
    /// Amount spent against the deliverable
    pub spent: Money,
    /// Allocation minus spend
    pub remaining: Money,
    /// Deliverable allocation not yet carved into categories
    pub unassigned: Money,
    /// Category rows
    pub categories: Vec<CategoryReportRow>,
}

impl DeliverableReportRow {
    /// Check if the deliverable or any of its categories is overspent
    pub fn has_overspent(&self) -> bool {
        self.remaining.is_negative() || self.categories.iter().any(|c| c.is_overspent())
    }
}

/// A row for a sub-recipient with its community deliverables
#[derive(Debug, Clone)]
pub struct SubRecipientReportRow {
    /// Sub-recipient ID
    pub sub_recipient_id: SubRecipientId,
    /// Partner organization name
    pub name: String,
    /// Carve-out from the grant award
    pub allocated: Money,
    /// Amount delegated onward to community deliverables
    pub allocated_to_deliverables: Money,
    /// Amount spent under this sub-recipient
    pub spent: Money,
    /// Carve-out not yet delegated to deliverables
    pub unassigned: Money,
    /// Community deliverable rows
    pub deliverables: Vec<DeliverableReportRow>,
}

/// Grant Summary Report
#[derive(Debug, Clone)]
pub struct GrantSummaryReport {
    /// Grant name
    pub grant_name: String,
    /// Funding organization
    pub funder: String,
    /// Total award amount
    pub total_award: Money,
    /// Grant-level derived figures
    pub totals: GrantStats,
    /// Primary deliverables
    pub deliverables: Vec<DeliverableReportRow>,
    /// Sub-recipients with their community deliverables
    pub sub_recipients: Vec<SubRecipientReportRow>,
}

impl GrantSummaryReport {
    /// Generate a summary report for a grant
    pub fn generate(storage: &Storage, grant_id: GrantId) -> GrantResult<Self> {
        let grant = GrantService::new(storage).get(grant_id)?;
        let expenditures = storage.expenditures.get_all()?;

        let totals = grant_stats(&grant, &expenditures);

        let deliverable_row = |del: &crate::models::Deliverable| {
            let stats = deliverable_stats(del, &expenditures);
            let categories = del
                .budget_categories
                .iter()
                .map(|cat| {
                    let cat_stats =
                        crate::services::category_stats(cat.id, del.id, &expenditures);
                    CategoryReportRow {
                        category_id: cat.id,
                        category_name: cat.name.clone(),
                        allocated: cat.allocation,
                        spent: cat_stats.spent,
                        remaining: cat.allocation - cat_stats.spent,
                    }
                })
                .collect();

            DeliverableReportRow {
                deliverable_id: del.id,
                description: del.description.clone(),
                status: del.status.to_string(),
                allocated: del.allocated_value,
                allocated_to_categories: del.allocated_to_categories(),
                spent: stats.spent,
                remaining: stats.remaining,
                unassigned: stats.unassigned,
                categories,
            }
        };

        let deliverables = grant.deliverables.iter().map(|d| deliverable_row(d)).collect();

        let sub_recipients = grant
            .sub_recipients
            .iter()
            .map(|sub| {
                let stats = sub_recipient_stats(sub, grant.id, &expenditures);
                SubRecipientReportRow {
                    sub_recipient_id: sub.id,
                    name: sub.name.clone(),
                    allocated: sub.allocated_amount,
                    allocated_to_deliverables: sub.allocated_to_deliverables(),
                    spent: stats.spent,
                    unassigned: stats.unassigned,
                    deliverables: sub.deliverables.iter().map(|d| deliverable_row(d)).collect(),
                }
            })
            .collect();

        Ok(Self {
            grant_name: grant.name,
            funder: grant.funder,
            total_award: grant.total_award,
            totals,
            deliverables,
            sub_recipients,
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Grant Summary - {}\n", self.grant_name));
        if !self.funder.is_empty() {
            output.push_str(&format!("Funder: {}\n", self.funder));
        }
        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str(&format!("Total Award:  {}\n", self.total_award));
        output.push_str(&format!("Total Spent:  {}\n", self.totals.spent));
        output.push_str(&format!("Remaining:    {}\n", self.totals.remaining));
        output.push_str(&format!("Unassigned:   {}\n\n", self.totals.unassigned));

        output.push_str(&format!(
            "{:<40} {:>12} {:>12} {:>12}\n",
            "Deliverable / Category", "Allocated", "Spent", "Remaining"
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for del in &self.deliverables {
            Self::push_deliverable(&mut output, del, "");
        }

        for sub in &self.sub_recipients {
            output.push_str(&format!(
                "\n{} (sub-recipient)\n",
                sub.name.to_uppercase()
            ));
            output.push_str(&format!(
                "  {:<38} {:>12} {:>12} {:>12}\n",
                "Carve-out:",
                sub.allocated,
                sub.spent,
                sub.allocated - sub.spent
            ));
            for del in &sub.deliverables {
                Self::push_deliverable(&mut output, del, "  ");
            }
        }

        output.push_str(&"-".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "{:<40} {:>12} {:>12} {:>12}\n",
            "TOTAL", self.total_award, self.totals.spent, self.totals.remaining
        ));
        output.push_str("\n* = Overspent\n");

        output
    }

    fn push_deliverable(output: &mut String, del: &DeliverableReportRow, indent: &str) {
        let remaining = if del.remaining.is_negative() {
            format!("{} *", del.remaining)
        } else {
            del.remaining.to_string()
        };
        output.push_str(&format!(
            "{}{:<40} {:>12} {:>12} {:>12}\n",
            indent,
            format!("{} [{}]", del.description, del.status),
            del.allocated,
            del.spent,
            remaining
        ));
        for cat in &del.categories {
            let remaining = if cat.is_overspent() {
                format!("{} *", cat.remaining)
            } else {
                cat.remaining.to_string()
            };
            output.push_str(&format!(
                "{}  {:<38} {:>12} {:>12} {:>12}\n",
                indent, cat.category_name, cat.allocated, cat.spent, remaining
            ));
        }
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> GrantResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        let export_err = |e: csv::Error| GrantError::Export(e.to_string());

        wtr.write_record([
            "Grant",
            "Sub-Recipient",
            "Deliverable",
            "Category",
            "Allocated",
            "Spent",
            "Remaining",
        ])
        .map_err(export_err)?;

        let mut write_deliverable = |sub_name: &str, del: &DeliverableReportRow| {
            wtr.write_record([
                self.grant_name.as_str(),
                sub_name,
                del.description.as_str(),
                "",
                &del.allocated.to_string(),
                &del.spent.to_string(),
                &del.remaining.to_string(),
            ])
            .map_err(export_err)?;
            for cat in &del.categories {
                wtr.write_record([
                    self.grant_name.as_str(),
                    sub_name,
                    del.description.as_str(),
                    cat.category_name.as_str(),
                    &cat.allocated.to_string(),
                    &cat.spent.to_string(),
                    &cat.remaining.to_string(),
                ])
                .map_err(export_err)?;
            }
            Ok::<(), GrantError>(())
        };

        for del in &self.deliverables {
            write_deliverable("", del)?;
        }
        for sub in &self.sub_recipients {
            for del in &sub.deliverables {
                write_deliverable(&sub.name, del)?;
            }
        }

        wtr.flush().map_err(|e| GrantError::Export(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{
        BudgetCategory, Deliverable, Expenditure, Grant, SubRecipient,
    };
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn seeded_storage() -> (TempDir, Storage, GrantId) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let mut grant = Grant::new("Summer Meals", Money::from_dollars(40_000));
        grant.funder = "County Health Dept".to_string();

        let mut del = Deliverable::new("Meal sites", Money::from_dollars(18_000));
        del.budget_categories
            .push(BudgetCategory::new("Food", Money::from_dollars(12_000)));
        let del_id = del.id;
        let cat_id = del.budget_categories[0].id;
        grant.deliverables.push(del);

        let mut sub = SubRecipient::new("Parkside Pantry", Money::from_dollars(10_000));
        sub.deliverables
            .push(Deliverable::new("Delivery route", Money::from_dollars(8_000)));
        grant.sub_recipients.push(sub);

        let grant_id = grant.id;
        storage.grants.put(grant).unwrap();

        let mut exp = Expenditure::new(
            grant_id,
            del_id,
            cat_id,
            NaiveDate::from_ymd_opt(2026, 6, 10).unwrap(),
            "Grocer",
            Money::from_dollars(2_500),
        );
        exp.status = crate::models::ExpenditureStatus::Approved;
        storage.expenditures.put(exp).unwrap();

        (temp_dir, storage, grant_id)
    }

    #[test]
    fn test_generate_rolls_up_tree() {
        let (_temp_dir, storage, grant_id) = seeded_storage();
        let report = GrantSummaryReport::generate(&storage, grant_id).unwrap();

        assert_eq!(report.totals.spent, Money::from_dollars(2_500));
        assert_eq!(report.deliverables.len(), 1);
        assert_eq!(report.deliverables[0].spent, Money::from_dollars(2_500));
        assert_eq!(
            report.deliverables[0].categories[0].remaining,
            Money::from_dollars(9_500)
        );
        assert_eq!(report.sub_recipients.len(), 1);
        assert_eq!(report.sub_recipients[0].spent, Money::zero());
        assert_eq!(
            report.sub_recipients[0].unassigned,
            Money::from_dollars(2_000)
        );
    }

    #[test]
    fn test_format_terminal_contains_sections() {
        let (_temp_dir, storage, grant_id) = seeded_storage();
        let report = GrantSummaryReport::generate(&storage, grant_id).unwrap();
        let text = report.format_terminal();

        assert!(text.contains("Grant Summary - Summer Meals"));
        assert!(text.contains("County Health Dept"));
        assert!(text.contains("Meal sites"));
        assert!(text.contains("PARKSIDE PANTRY"));
        assert!(text.contains("$2500.00"));
    }

    #[test]
    fn test_csv_export_has_category_rows() {
        let (_temp_dir, storage, grant_id) = seeded_storage();
        let report = GrantSummaryReport::generate(&storage, grant_id).unwrap();

        let mut buf = Vec::new();
        report.export_csv(&mut buf).unwrap();
        let csv = String::from_utf8(buf).unwrap();

        assert!(csv.starts_with("Grant,Sub-Recipient,Deliverable,Category"));
        assert!(csv.contains("Food"));
        assert!(csv.contains("Parkside Pantry"));
    }

    #[test]
    fn test_unknown_grant_errors() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let err = GrantSummaryReport::generate(&storage, GrantId::new()).unwrap_err();
        assert!(err.is_not_found());
    }
}
