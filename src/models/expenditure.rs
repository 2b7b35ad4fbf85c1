//! Expenditure model
//!
//! A single recorded spend event tied to a grant, deliverable, and budget
//! category by weak references (relation only, no ownership). Deleting a
//! deliverable does not delete its expenditures.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetCategoryId, DeliverableId, ExpenditureId, GrantId, SubRecipientId};
use super::money::Money;

/// Which pot of money the expenditure draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FundingSource {
    #[default]
    Grant,
    Match,
    ThirdParty,
}

impl fmt::Display for FundingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grant => write!(f, "Grant"),
            Self::Match => write!(f, "Match"),
            Self::ThirdParty => write!(f, "Third-Party"),
        }
    }
}

/// Review status of an expenditure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpenditureStatus {
    #[default]
    Pending,
    Approved,
    Flagged,
}

impl fmt::Display for ExpenditureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Approved => write!(f, "Approved"),
            Self::Flagged => write!(f, "Flagged"),
        }
    }
}

/// How the entry came to exist
///
/// Indirect-cost entries used to be distinguishable only by the
/// "Internal Transfer" vendor string; the tagged variant makes the link to
/// the originating expenditure structural. Legacy files without the field
/// deserialize as Manual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    #[default]
    Manual,
    IndirectCostRecovery { source: ExpenditureId },
}

impl EntryKind {
    /// Check if this entry was derived by indirect-cost recovery
    pub fn is_indirect(&self) -> bool {
        matches!(self, Self::IndirectCostRecovery { .. })
    }
}

/// Vendor string written on derived indirect-cost entries, kept for
/// compatibility with data files that predate the EntryKind tag.
pub const INTERNAL_TRANSFER_VENDOR: &str = "Internal Transfer";

/// A single recorded spend event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expenditure {
    /// Unique identifier
    pub id: ExpenditureId,

    /// The grant this spend counts against
    pub grant_id: GrantId,

    /// The sub-recipient, if the spend is against a community deliverable
    pub sub_recipient_id: Option<SubRecipientId>,

    /// The deliverable this spend counts against
    pub deliverable_id: DeliverableId,

    /// The budget category this spend posts to
    pub category_id: BudgetCategoryId,

    /// Date of the spend
    pub date: NaiveDate,

    /// Vendor name
    pub vendor: String,

    /// Amount (> 0)
    pub amount: Money,

    /// Who made the purchase
    #[serde(default)]
    pub purchaser: String,

    /// Why the purchase was necessary
    #[serde(default)]
    pub justification: String,

    /// Free-form notes
    #[serde(default)]
    pub notes: String,

    /// Funding pot
    #[serde(default)]
    pub funding_source: FundingSource,

    /// Review status
    #[serde(default)]
    pub status: ExpenditureStatus,

    /// Stored path of an attached receipt, if any
    pub receipt_path: Option<String>,

    /// Manual entry or derived indirect-cost entry
    #[serde(default)]
    pub kind: EntryKind,

    /// When the expenditure was created
    pub created_at: DateTime<Utc>,

    /// When the expenditure was last modified
    pub updated_at: DateTime<Utc>,
}

impl Expenditure {
    /// Create a new expenditure
    pub fn new(
        grant_id: GrantId,
        deliverable_id: DeliverableId,
        category_id: BudgetCategoryId,
        date: NaiveDate,
        vendor: impl Into<String>,
        amount: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenditureId::new(),
            grant_id,
            sub_recipient_id: None,
            deliverable_id,
            category_id,
            date,
            vendor: vendor.into(),
            amount,
            purchaser: String::new(),
            justification: String::new(),
            notes: String::new(),
            funding_source: FundingSource::Grant,
            status: ExpenditureStatus::Pending,
            receipt_path: None,
            kind: EntryKind::Manual,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this entry was derived by indirect-cost recovery
    pub fn is_indirect(&self) -> bool {
        self.kind.is_indirect()
    }

    /// Touch the updated_at timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for Expenditure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.vendor,
            self.amount
        )
    }
}
