//! Grant model and its owned allocation tree
//!
//! A Grant exclusively owns its deliverables and sub-recipients; a
//! sub-recipient in turn owns its own deliverables. Budget categories are
//! the leaves of the tree and the posting target for expenditures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetCategoryId, DeliverableId, GrantId, SubRecipientId};
use super::money::Money;

/// Lifecycle status of a grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GrantStatus {
    #[default]
    Draft,
    Pending,
    Active,
    Closed,
    Archived,
}

impl fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "Draft"),
            Self::Pending => write!(f, "Pending"),
            Self::Active => write!(f, "Active"),
            Self::Closed => write!(f, "Closed"),
            Self::Archived => write!(f, "Archived"),
        }
    }
}

/// Status of a deliverable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliverableStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Deferred,
}

impl fmt::Display for DeliverableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Completed => write!(f, "Completed"),
            Self::Deferred => write!(f, "Deferred"),
        }
    }
}

/// A line-item bucket within a deliverable; expenditures post against it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetCategory {
    /// Unique identifier (not guaranteed unique across deliverables)
    pub id: BudgetCategoryId,

    /// Category name (e.g. "Personnel", "Supplies")
    pub name: String,

    /// Amount allocated to this category
    pub allocation: Money,

    /// Free-text purpose description
    #[serde(default)]
    pub purpose: String,
}

impl BudgetCategory {
    /// Create a new budget category
    pub fn new(name: impl Into<String>, allocation: Money) -> Self {
        Self {
            id: BudgetCategoryId::new(),
            name: name.into(),
            allocation,
            purpose: String::new(),
        }
    }

    /// Create a category with a purpose note
    pub fn with_purpose(
        name: impl Into<String>,
        allocation: Money,
        purpose: impl Into<String>,
    ) -> Self {
        Self {
            purpose: purpose.into(),
            ..Self::new(name, allocation)
        }
    }
}

/// A budgeted work item under a grant (primary) or a sub-recipient (community)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deliverable {
    /// Unique identifier
    pub id: DeliverableId,

    /// Section reference into the grant agreement (e.g. "2.1.a")
    #[serde(default)]
    pub section_reference: String,

    /// What the deliverable is
    pub description: String,

    /// Amount allocated to this deliverable
    pub allocated_value: Money,

    /// Progress status
    #[serde(default)]
    pub status: DeliverableStatus,

    /// Line-item buckets carved out of the allocated value
    #[serde(default)]
    pub budget_categories: Vec<BudgetCategory>,
}

impl Deliverable {
    /// Create a new deliverable
    pub fn new(description: impl Into<String>, allocated_value: Money) -> Self {
        Self {
            id: DeliverableId::new(),
            section_reference: String::new(),
            description: description.into(),
            allocated_value,
            status: DeliverableStatus::Pending,
            budget_categories: Vec::new(),
        }
    }

    /// Find a budget category by id
    pub fn category(&self, id: BudgetCategoryId) -> Option<&BudgetCategory> {
        self.budget_categories.iter().find(|c| c.id == id)
    }

    /// Sum of all category allocations
    pub fn allocated_to_categories(&self) -> Money {
        self.budget_categories.iter().map(|c| c.allocation).sum()
    }
}

/// A community partner receiving a carved-out portion of a grant's funds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubRecipient {
    /// Unique identifier
    pub id: SubRecipientId,

    /// Partner organization name
    pub name: String,

    /// Amount carved out of the grant's total award for this partner
    pub allocated_amount: Money,

    /// Community deliverables funded from the carve-out
    #[serde(default)]
    pub deliverables: Vec<Deliverable>,
}

impl SubRecipient {
    /// Create a new sub-recipient
    pub fn new(name: impl Into<String>, allocated_amount: Money) -> Self {
        Self {
            id: SubRecipientId::new(),
            name: name.into(),
            allocated_amount,
            deliverables: Vec::new(),
        }
    }

    /// Sum of deliverable allocations delegated to this partner
    pub fn allocated_to_deliverables(&self) -> Money {
        self.deliverables.iter().map(|d| d.allocated_value).sum()
    }
}

/// A funding award with a total budget and reporting obligations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grant {
    /// Unique identifier
    pub id: GrantId,

    /// Grant name
    pub name: String,

    /// Funding organization
    #[serde(default)]
    pub funder: String,

    /// Total award amount (expected >= 0; never enforced at write time)
    pub total_award: Money,

    /// Indirect-cost-recovery rate as a percentage (0-100)
    #[serde(default)]
    pub indirect_cost_rate: f64,

    /// Lifecycle status
    #[serde(default)]
    pub status: GrantStatus,

    /// Primary deliverables (directly under the grant)
    #[serde(default)]
    pub deliverables: Vec<Deliverable>,

    /// Community partners with carved-out allocations
    #[serde(default)]
    pub sub_recipients: Vec<SubRecipient>,

    /// When the grant was created
    pub created_at: DateTime<Utc>,

    /// When the grant was last modified
    pub updated_at: DateTime<Utc>,
}

impl Grant {
    /// Create a new grant
    pub fn new(name: impl Into<String>, total_award: Money) -> Self {
        let now = Utc::now();
        Self {
            id: GrantId::new(),
            name: name.into(),
            funder: String::new(),
            total_award,
            indirect_cost_rate: 0.0,
            status: GrantStatus::Draft,
            deliverables: Vec::new(),
            sub_recipients: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of primary deliverable allocations
    pub fn primary_allocated(&self) -> Money {
        self.deliverables.iter().map(|d| d.allocated_value).sum()
    }

    /// Sum of sub-recipient carve-outs
    pub fn subs_allocated(&self) -> Money {
        self.sub_recipients.iter().map(|s| s.allocated_amount).sum()
    }

    /// Find a sub-recipient by id
    pub fn sub_recipient(&self, id: SubRecipientId) -> Option<&SubRecipient> {
        self.sub_recipients.iter().find(|s| s.id == id)
    }

    /// Find a deliverable anywhere in the tree (primary or community)
    ///
    /// A deliverable lives either directly under the grant or under exactly
    /// one sub-recipient, never both.
    pub fn deliverable(&self, id: DeliverableId) -> Option<&Deliverable> {
        self.deliverables
            .iter()
            .find(|d| d.id == id)
            .or_else(|| {
                self.sub_recipients
                    .iter()
                    .flat_map(|s| &s.deliverables)
                    .find(|d| d.id == id)
            })
    }

    /// Mutable lookup of a deliverable anywhere in the tree
    pub fn deliverable_mut(&mut self, id: DeliverableId) -> Option<&mut Deliverable> {
        if self.deliverables.iter().any(|d| d.id == id) {
            return self.deliverables.iter_mut().find(|d| d.id == id);
        }
        self.sub_recipients
            .iter_mut()
            .flat_map(|s| &mut s.deliverables)
            .find(|d| d.id == id)
    }

    /// Touch the updated_at timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.total_award, self.status)
    }
}
