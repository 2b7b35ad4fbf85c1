//! Core data models for grant-ledger
//!
//! This module contains all the data structures that represent the
//! grant-management domain: grants, sub-recipients, deliverables, budget
//! categories, expenditures, and email templates.

pub mod expenditure;
pub mod grant;
pub mod ids;
pub mod money;
pub mod snapshot;
pub mod template;

pub use expenditure::{
    EntryKind, Expenditure, ExpenditureStatus, FundingSource, INTERNAL_TRANSFER_VENDOR,
};
pub use grant::{BudgetCategory, Deliverable, DeliverableStatus, Grant, GrantStatus, SubRecipient};
pub use ids::{
    BudgetCategoryId, DeliverableId, ExpenditureId, GrantId, SubRecipientId, TemplateId,
};
pub use money::Money;
pub use snapshot::{Snapshot, SNAPSHOT_SCHEMA_VERSION};
pub use template::EmailTemplate;
