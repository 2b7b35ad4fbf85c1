//! Grant management service
//!
//! CRUD over grants and their owned allocation trees. Every edit is a
//! whole-object replacement persisted through the grant repository; there
//! are no partial-update semantics. Deleting any node in the tree leaves
//! its expenditures in place (see `ExpenditureService::orphaned`).

use crate::error::{GrantError, GrantResult};
use crate::models::{
    BudgetCategory, BudgetCategoryId, Deliverable, DeliverableId, Grant, GrantId, SubRecipient,
    SubRecipientId,
};
use crate::storage::Storage;

/// Service for grant and allocation-tree management
pub struct GrantService<'a> {
    storage: &'a Storage,
}

impl<'a> GrantService<'a> {
    /// Create a new grant service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new grant
    pub fn create(&self, grant: Grant) -> GrantResult<Grant> {
        if grant.name.trim().is_empty() {
            return Err(GrantError::MissingFields {
                fields: vec!["name"],
            });
        }
        if self.storage.grants.get_by_name(&grant.name)?.is_some() {
            return Err(GrantError::Duplicate {
                entity_type: "Grant",
                identifier: grant.name.clone(),
            });
        }
        self.storage.grants.put(grant.clone())?;
        Ok(grant)
    }

    /// Get a grant by id
    pub fn get(&self, id: GrantId) -> GrantResult<Grant> {
        self.storage
            .grants
            .get(id)?
            .ok_or_else(|| GrantError::grant_not_found(id.to_string()))
    }

    /// Get a grant by name
    pub fn get_by_name(&self, name: &str) -> GrantResult<Grant> {
        self.storage
            .grants
            .get_by_name(name)?
            .ok_or_else(|| GrantError::grant_not_found(name))
    }

    /// List all grants
    pub fn list(&self) -> GrantResult<Vec<Grant>> {
        self.storage.grants.get_all()
    }

    /// Replace a stored grant wholesale
    pub fn update(&self, id: GrantId, mut replacement: Grant) -> GrantResult<Grant> {
        if replacement.id != id {
            return Err(GrantError::Validation(format!(
                "replacement id {} does not match target id {}",
                replacement.id, id
            )));
        }
        self.get(id)?;
        replacement.touch();
        self.storage.grants.put(replacement.clone())?;
        Ok(replacement)
    }

    /// Delete a grant
    ///
    /// Expenditures referencing the grant are left in place.
    pub fn delete(&self, id: GrantId) -> GrantResult<Grant> {
        let grant = self.get(id)?;
        self.storage.grants.delete(id)?;
        Ok(grant)
    }

    /// Add a primary deliverable to a grant
    pub fn add_deliverable(
        &self,
        grant_id: GrantId,
        deliverable: Deliverable,
    ) -> GrantResult<Grant> {
        self.edit(grant_id, |grant| {
            grant.deliverables.push(deliverable);
            Ok(())
        })
    }

    /// Add a community deliverable under a sub-recipient
    pub fn add_sub_deliverable(
        &self,
        grant_id: GrantId,
        sub_id: SubRecipientId,
        deliverable: Deliverable,
    ) -> GrantResult<Grant> {
        self.edit(grant_id, |grant| {
            let sub = grant
                .sub_recipients
                .iter_mut()
                .find(|s| s.id == sub_id)
                .ok_or_else(|| GrantError::sub_recipient_not_found(sub_id.to_string()))?;
            sub.deliverables.push(deliverable);
            Ok(())
        })
    }

    /// Replace a deliverable anywhere in the tree
    pub fn update_deliverable(
        &self,
        grant_id: GrantId,
        replacement: Deliverable,
    ) -> GrantResult<Grant> {
        self.edit(grant_id, |grant| {
            let slot = grant
                .deliverable_mut(replacement.id)
                .ok_or_else(|| GrantError::deliverable_not_found(replacement.id.to_string()))?;
            *slot = replacement;
            Ok(())
        })
    }

    /// Remove a deliverable anywhere in the tree
    ///
    /// Expenditures posted against it are left in place.
    pub fn remove_deliverable(
        &self,
        grant_id: GrantId,
        del_id: DeliverableId,
    ) -> GrantResult<Grant> {
        self.edit(grant_id, |grant| {
            let before = grant.deliverables.len();
            grant.deliverables.retain(|d| d.id != del_id);
            if grant.deliverables.len() < before {
                return Ok(());
            }
            for sub in &mut grant.sub_recipients {
                let before = sub.deliverables.len();
                sub.deliverables.retain(|d| d.id != del_id);
                if sub.deliverables.len() < before {
                    return Ok(());
                }
            }
            Err(GrantError::deliverable_not_found(del_id.to_string()))
        })
    }

    /// Add a sub-recipient to a grant
    pub fn add_sub_recipient(&self, grant_id: GrantId, sub: SubRecipient) -> GrantResult<Grant> {
        self.edit(grant_id, |grant| {
            grant.sub_recipients.push(sub);
            Ok(())
        })
    }

    /// Replace a sub-recipient wholesale
    pub fn update_sub_recipient(
        &self,
        grant_id: GrantId,
        replacement: SubRecipient,
    ) -> GrantResult<Grant> {
        self.edit(grant_id, |grant| {
            let slot = grant
                .sub_recipients
                .iter_mut()
                .find(|s| s.id == replacement.id)
                .ok_or_else(|| GrantError::sub_recipient_not_found(replacement.id.to_string()))?;
            *slot = replacement;
            Ok(())
        })
    }

    /// Remove a sub-recipient and its deliverables from the tree
    ///
    /// Expenditures referencing it are left in place.
    pub fn remove_sub_recipient(
        &self,
        grant_id: GrantId,
        sub_id: SubRecipientId,
    ) -> GrantResult<Grant> {
        self.edit(grant_id, |grant| {
            let before = grant.sub_recipients.len();
            grant.sub_recipients.retain(|s| s.id != sub_id);
            if grant.sub_recipients.len() == before {
                return Err(GrantError::sub_recipient_not_found(sub_id.to_string()));
            }
            Ok(())
        })
    }

    /// Add a budget category to a deliverable
    pub fn add_category(
        &self,
        grant_id: GrantId,
        del_id: DeliverableId,
        category: BudgetCategory,
    ) -> GrantResult<Grant> {
        self.edit(grant_id, |grant| {
            let del = grant
                .deliverable_mut(del_id)
                .ok_or_else(|| GrantError::deliverable_not_found(del_id.to_string()))?;
            del.budget_categories.push(category);
            Ok(())
        })
    }

    /// Replace a budget category wholesale
    pub fn update_category(
        &self,
        grant_id: GrantId,
        del_id: DeliverableId,
        replacement: BudgetCategory,
    ) -> GrantResult<Grant> {
        self.edit(grant_id, |grant| {
            let del = grant
                .deliverable_mut(del_id)
                .ok_or_else(|| GrantError::deliverable_not_found(del_id.to_string()))?;
            let slot = del
                .budget_categories
                .iter_mut()
                .find(|c| c.id == replacement.id)
                .ok_or_else(|| GrantError::category_not_found(replacement.id.to_string()))?;
            *slot = replacement;
            Ok(())
        })
    }

    /// Remove a budget category from a deliverable
    ///
    /// Expenditures posted against it are left in place.
    pub fn remove_category(
        &self,
        grant_id: GrantId,
        del_id: DeliverableId,
        cat_id: BudgetCategoryId,
    ) -> GrantResult<Grant> {
        self.edit(grant_id, |grant| {
            let del = grant
                .deliverable_mut(del_id)
                .ok_or_else(|| GrantError::deliverable_not_found(del_id.to_string()))?;
            let before = del.budget_categories.len();
            del.budget_categories.retain(|c| c.id != cat_id);
            if del.budget_categories.len() == before {
                return Err(GrantError::category_not_found(cat_id.to_string()));
            }
            Ok(())
        })
    }

    /// Fetch, mutate, and durably persist a grant in one step
    ///
    /// The edit only takes effect if both the closure and the write succeed.
    fn edit<F>(&self, grant_id: GrantId, f: F) -> GrantResult<Grant>
    where
        F: FnOnce(&mut Grant) -> GrantResult<()>,
    {
        let mut grant = self.get(grant_id)?;
        f(&mut grant)?;
        grant.touch();
        self.storage.grants.put(grant.clone())?;
        Ok(grant)
    }
}
