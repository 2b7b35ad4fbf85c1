//! Expenditure posting service
//!
//! Applies a new or edited expenditure to the ledger, including the derived
//! indirect-cost-recovery side entry. There is no multi-entity transaction:
//! the primary expenditure is durably persisted before the side entry is
//! attempted, so a partial failure always leaves the primary intact and only
//! the derived entry missing, never the reverse.

use chrono::NaiveDate;

use crate::error::{GrantError, GrantResult};
use crate::models::{
    BudgetCategoryId, DeliverableId, EntryKind, Expenditure, ExpenditureId, ExpenditureStatus,
    FundingSource, Grant, GrantId, Money, SubRecipientId, INTERNAL_TRANSFER_VENDOR,
};
use crate::storage::Storage;

/// A proposed expenditure, as collected from the UI or a parsed receipt
#[derive(Debug, Clone)]
pub struct ExpenditureDraft {
    pub grant_id: Option<GrantId>,
    pub sub_recipient_id: Option<SubRecipientId>,
    pub deliverable_id: Option<DeliverableId>,
    pub category_id: Option<BudgetCategoryId>,
    pub date: NaiveDate,
    pub vendor: String,
    pub amount: Money,
    pub purchaser: String,
    pub justification: String,
    pub notes: String,
    pub funding_source: FundingSource,
    pub receipt_path: Option<String>,
}

impl ExpenditureDraft {
    /// Create a draft with the required posting context
    pub fn new(
        grant_id: GrantId,
        deliverable_id: DeliverableId,
        category_id: BudgetCategoryId,
        date: NaiveDate,
        vendor: impl Into<String>,
        amount: Money,
    ) -> Self {
        Self {
            grant_id: Some(grant_id),
            sub_recipient_id: None,
            deliverable_id: Some(deliverable_id),
            category_id: Some(category_id),
            date,
            vendor: vendor.into(),
            amount,
            purchaser: String::new(),
            justification: String::new(),
            notes: String::new(),
            funding_source: FundingSource::Grant,
            receipt_path: None,
        }
    }

    /// Collect the names of missing or invalid required fields
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.grant_id.is_none() {
            missing.push("grant_id");
        }
        if self.deliverable_id.is_none() {
            missing.push("deliverable_id");
        }
        if self.category_id.is_none() {
            missing.push("category_id");
        }
        if self.vendor.trim().is_empty() {
            missing.push("vendor");
        }
        if !self.amount.is_positive() {
            missing.push("amount");
        }
        missing
    }
}

/// Options for posting
#[derive(Debug, Clone, Copy, Default)]
pub struct PostOptions {
    /// Also post the derived indirect-cost-recovery entry
    pub apply_indirect_cost: bool,
}

/// Result of a successful post
#[derive(Debug, Clone)]
pub struct Posting {
    /// The expenditure as stored
    pub primary: Expenditure,
    /// The derived indirect-cost entry, if one was posted
    pub indirect: Option<Expenditure>,
}

/// Service for expenditure posting and editing
pub struct ExpenditureService<'a> {
    storage: &'a Storage,
}

impl<'a> ExpenditureService<'a> {
    /// Create a new expenditure service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Validate and post a draft expenditure
    ///
    /// Validation failures name every missing field and leave the store
    /// untouched. On success the stored entity gets a fresh id and defaults
    /// to Approved.
    pub fn post(&self, draft: ExpenditureDraft, options: PostOptions) -> GrantResult<Posting> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(GrantError::MissingFields { fields: missing });
        }
        let (Some(grant_id), Some(deliverable_id), Some(category_id)) =
            (draft.grant_id, draft.deliverable_id, draft.category_id)
        else {
            return Err(GrantError::MissingFields {
                fields: vec!["grant_id", "deliverable_id", "category_id"],
            });
        };

        // Resolve the grant up front when the indirect-cost entry is
        // requested, so a dangling grant id fails before anything is stored.
        let grant: Option<Grant> = if options.apply_indirect_cost {
            Some(
                self.storage
                    .grants
                    .get(grant_id)?
                    .ok_or_else(|| GrantError::grant_not_found(grant_id.to_string()))?,
            )
        } else {
            None
        };

        let mut primary = Expenditure::new(
            grant_id,
            deliverable_id,
            category_id,
            draft.date,
            draft.vendor.trim(),
            draft.amount,
        );
        primary.sub_recipient_id = draft.sub_recipient_id;
        primary.purchaser = draft.purchaser;
        primary.justification = draft.justification;
        primary.notes = draft.notes;
        primary.funding_source = draft.funding_source;
        primary.receipt_path = draft.receipt_path;
        primary.status = ExpenditureStatus::Approved;

        // Primary must be durable before the derived entry is attempted
        self.storage.expenditures.put(primary.clone())?;

        let indirect = match grant {
            Some(grant) => self
                .post_indirect_cost(&primary, &grant)
                .map_err(|e| GrantError::IndirectCostFailed {
                    primary: primary.id,
                    reason: e.to_string(),
                })?,
            None => None,
        };

        Ok(Posting { primary, indirect })
    }

    /// Post the derived indirect-cost entry, if the grant and draft qualify
    fn post_indirect_cost(
        &self,
        primary: &Expenditure,
        grant: &Grant,
    ) -> GrantResult<Option<Expenditure>> {
        if grant.indirect_cost_rate <= 0.0 || primary.funding_source != FundingSource::Grant {
            return Ok(None);
        }

        let idc_amount = primary.amount.percent_of(grant.indirect_cost_rate);
        if !idc_amount.is_positive() {
            return Ok(None);
        }

        let mut entry = Expenditure::new(
            primary.grant_id,
            primary.deliverable_id,
            primary.category_id,
            primary.date,
            INTERNAL_TRANSFER_VENDOR,
            idc_amount,
        );
        entry.sub_recipient_id = primary.sub_recipient_id;
        entry.purchaser = "System".to_string();
        entry.justification = format!("Indirect cost recovery for expenditure {}", primary.id);
        entry.funding_source = FundingSource::Grant;
        entry.status = ExpenditureStatus::Approved;
        entry.kind = EntryKind::IndirectCostRecovery { source: primary.id };

        self.storage.expenditures.put(entry.clone())?;
        Ok(Some(entry))
    }

    /// Get an expenditure by id
    pub fn get(&self, id: ExpenditureId) -> GrantResult<Option<Expenditure>> {
        self.storage.expenditures.get(id)
    }

    /// Replace a stored expenditure wholesale
    ///
    /// All edits are full-entity replacements; there are no partial-update
    /// semantics. The replacement must carry the same id.
    pub fn update(&self, id: ExpenditureId, mut replacement: Expenditure) -> GrantResult<Expenditure> {
        if replacement.id != id {
            return Err(GrantError::Validation(format!(
                "replacement id {} does not match target id {}",
                replacement.id, id
            )));
        }

        self.storage
            .expenditures
            .get(id)?
            .ok_or_else(|| GrantError::expenditure_not_found(id.to_string()))?;

        replacement.touch();
        self.storage.expenditures.put(replacement.clone())?;
        Ok(replacement)
    }

    /// Delete an expenditure
    ///
    /// Unconditional given a valid id; confirmation is an upstream concern.
    pub fn delete(&self, id: ExpenditureId) -> GrantResult<Expenditure> {
        let exp = self
            .storage
            .expenditures
            .get(id)?
            .ok_or_else(|| GrantError::expenditure_not_found(id.to_string()))?;

        self.storage.expenditures.delete(id)?;
        Ok(exp)
    }

    /// List expenditures whose deliverable no longer exists in any grant
    ///
    /// Deleting a deliverable leaves its expenditures in place; this query
    /// surfaces them for manual cleanup.
    pub fn orphaned(&self) -> GrantResult<Vec<Expenditure>> {
        let grants = self.storage.grants.get_all()?;
        let all = self.storage.expenditures.get_all()?;

        Ok(all
            .into_iter()
            .filter(|e| {
                !grants
                    .iter()
                    .any(|g| g.deliverable(e.deliverable_id).is_some())
            })
            .collect())
    }

    /// Count expenditures
    pub fn count(&self) -> GrantResult<usize> {
        self.storage.expenditures.count()
    }
}
