//! Allocation calculator
//!
//! Pure, stateless aggregation over the ledger. Every function derives its
//! result by filtering the full expenditure list against the entity's ids;
//! nothing here reads or writes shared counters, and nothing is cached, so
//! the numbers are always re-derivable from the stored entities.
//!
//! Negative `unassigned` and `remaining` values are valid signals of
//! over-allocation or overspend, never clamped and never an error.

use crate::models::{
    BudgetCategoryId, Deliverable, DeliverableId, Expenditure, Grant, GrantId, Money, SubRecipient,
};

/// Aggregates for a grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantStats {
    /// Total of expenditures posted against the grant
    pub spent: Money,
    /// Sum of primary deliverable allocations
    pub primary_allocated: Money,
    /// Sum of sub-recipient carve-outs
    pub subs_allocated: Money,
    /// Award not yet delegated to deliverables or sub-recipients
    pub unassigned: Money,
    /// Award minus spend
    pub remaining: Money,
}

/// Aggregates for a sub-recipient within a grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubRecipientStats {
    /// Total of expenditures posted against this sub-recipient in the grant
    pub spent: Money,
    /// Sum of the sub-recipient's deliverable allocations
    pub allocated_to_deliverables: Money,
    /// Carve-out not yet delegated to deliverables
    pub unassigned: Money,
}

/// Aggregates for a deliverable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliverableStats {
    /// Total of expenditures posted against this deliverable
    pub spent: Money,
    /// Sum of the deliverable's category allocations
    pub allocated_to_categories: Money,
    /// Allocation minus spend
    pub remaining: Money,
    /// Allocation not yet delegated to categories
    pub unassigned: Money,
}

/// Aggregates for a budget category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStats {
    /// Total of expenditures posted against this category in this deliverable
    pub spent: Money,
}

/// Compute the display aggregates for a grant
pub fn grant_stats(grant: &Grant, expenditures: &[Expenditure]) -> GrantStats {
    let spent: Money = expenditures
        .iter()
        .filter(|e| e.grant_id == grant.id)
        .map(|e| e.amount)
        .sum();

    let primary_allocated = grant.primary_allocated();
    let subs_allocated = grant.subs_allocated();

    GrantStats {
        spent,
        primary_allocated,
        subs_allocated,
        unassigned: grant.total_award - primary_allocated - subs_allocated,
        remaining: grant.total_award - spent,
    }
}

/// Compute the display aggregates for a sub-recipient
///
/// Spend matches on grant AND sub-recipient jointly: the sub-recipient id on
/// an expenditure is only meaningful within its grant.
pub fn sub_recipient_stats(
    sub: &SubRecipient,
    grant_id: GrantId,
    expenditures: &[Expenditure],
) -> SubRecipientStats {
    let spent: Money = expenditures
        .iter()
        .filter(|e| e.grant_id == grant_id && e.sub_recipient_id == Some(sub.id))
        .map(|e| e.amount)
        .sum();

    let allocated_to_deliverables = sub.allocated_to_deliverables();

    SubRecipientStats {
        spent,
        allocated_to_deliverables,
        unassigned: sub.allocated_amount - allocated_to_deliverables,
    }
}

/// Compute the display aggregates for a deliverable
pub fn deliverable_stats(del: &Deliverable, expenditures: &[Expenditure]) -> DeliverableStats {
    let spent: Money = expenditures
        .iter()
        .filter(|e| e.deliverable_id == del.id)
        .map(|e| e.amount)
        .sum();

    let allocated_to_categories = del.allocated_to_categories();

    DeliverableStats {
        spent,
        allocated_to_categories,
        remaining: del.allocated_value - spent,
        unassigned: del.allocated_value - allocated_to_categories,
    }
}

/// Compute spend for a budget category
///
/// Both ids are required jointly because category ids are not guaranteed
/// globally unique across deliverables.
pub fn category_stats(
    category_id: BudgetCategoryId,
    deliverable_id: DeliverableId,
    expenditures: &[Expenditure],
) -> CategoryStats {
    let spent: Money = expenditures
        .iter()
        .filter(|e| e.category_id == category_id && e.deliverable_id == deliverable_id)
        .map(|e| e.amount)
        .sum();

    CategoryStats { spent }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetCategory;
    use chrono::NaiveDate;

    fn expenditure(
        grant_id: GrantId,
        deliverable_id: DeliverableId,
        category_id: BudgetCategoryId,
        cents: i64,
    ) -> Expenditure {
        Expenditure::new(
            grant_id,
            deliverable_id,
            category_id,
            NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
            "Vendor",
            Money::from_cents(cents),
        )
    }

    #[test]
    fn test_grant_spent_is_additive() {
        let grant = Grant::new("Additive", Money::from_dollars(10_000));
        let del = DeliverableId::new();
        let cat = BudgetCategoryId::new();

        let expenditures = vec![
            expenditure(grant.id, del, cat, 10_000),
            expenditure(grant.id, del, cat, 25_050),
            expenditure(grant.id, del, cat, 4_950),
        ];

        let stats = grant_stats(&grant, &expenditures);
        assert_eq!(stats.spent, Money::from_cents(40_000));

        // Removing any one entry decreases spent by exactly that amount
        for skip in 0..expenditures.len() {
            let subset: Vec<_> = expenditures
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, e)| e.clone())
                .collect();
            let reduced = grant_stats(&grant, &subset);
            assert_eq!(
                stats.spent - reduced.spent,
                expenditures[skip].amount
            );
        }
    }

    #[test]
    fn test_grant_spend_ignores_other_grants() {
        let grant = Grant::new("Mine", Money::from_dollars(1_000));
        let del = DeliverableId::new();
        let cat = BudgetCategoryId::new();

        let expenditures = vec![
            expenditure(grant.id, del, cat, 500),
            expenditure(GrantId::new(), del, cat, 99_999),
        ];

        assert_eq!(
            grant_stats(&grant, &expenditures).spent,
            Money::from_cents(500)
        );
    }

    #[test]
    fn test_grant_unassigned_and_remaining() {
        let mut grant = Grant::new("Split award", Money::from_dollars(50_000));
        grant
            .deliverables
            .push(Deliverable::new("Primary", Money::from_dollars(10_000)));
        grant
            .sub_recipients
            .push(SubRecipient::new("Partner", Money::from_dollars(15_000)));

        let del = grant.deliverables[0].id;
        let cat = BudgetCategoryId::new();
        let expenditures = vec![expenditure(grant.id, del, cat, 200_000)];

        let stats = grant_stats(&grant, &expenditures);
        assert_eq!(stats.primary_allocated, Money::from_dollars(10_000));
        assert_eq!(stats.subs_allocated, Money::from_dollars(15_000));
        assert_eq!(stats.unassigned, Money::from_dollars(25_000));
        assert_eq!(stats.remaining, Money::from_dollars(48_000));
    }

    #[test]
    fn test_deliverable_unassigned_algebra() {
        // allocatedValue 1000, categories summing to 700 -> unassigned 300
        let mut del = Deliverable::new("Workshops", Money::from_dollars(1_000));
        del.budget_categories
            .push(BudgetCategory::new("Personnel", Money::from_dollars(400)));
        del.budget_categories
            .push(BudgetCategory::new("Supplies", Money::from_dollars(300)));

        let stats = deliverable_stats(&del, &[]);
        assert_eq!(stats.unassigned, Money::from_dollars(300));

        // Adding a 400 category over-allocates to -100; not clamped
        del.budget_categories
            .push(BudgetCategory::new("Travel", Money::from_dollars(400)));
        let stats = deliverable_stats(&del, &[]);
        assert_eq!(stats.unassigned, Money::from_dollars(-100));
        assert!(stats.unassigned.is_negative());
    }

    #[test]
    fn test_deliverable_remaining_can_go_negative() {
        let del = Deliverable::new("Small budget", Money::from_dollars(100));
        let grant_id = GrantId::new();
        let cat = BudgetCategoryId::new();

        let expenditures = vec![expenditure(grant_id, del.id, cat, 15_000)];
        let stats = deliverable_stats(&del, &expenditures);
        assert_eq!(stats.spent, Money::from_cents(15_000));
        assert_eq!(stats.remaining, Money::from_cents(-5_000));
    }

    #[test]
    fn test_sub_recipient_stats_match_grant_and_sub_jointly() {
        let grant_id = GrantId::new();
        let other_grant = GrantId::new();
        let mut sub = SubRecipient::new("Partner", Money::from_dollars(5_000));
        sub.deliverables
            .push(Deliverable::new("Community work", Money::from_dollars(3_000)));

        let del = sub.deliverables[0].id;
        let cat = BudgetCategoryId::new();

        let mut in_scope = expenditure(grant_id, del, cat, 1_000);
        in_scope.sub_recipient_id = Some(sub.id);

        // Same sub id but a different grant must not count
        let mut wrong_grant = expenditure(other_grant, del, cat, 9_999);
        wrong_grant.sub_recipient_id = Some(sub.id);

        // Same grant but no sub id must not count
        let no_sub = expenditure(grant_id, del, cat, 7_777);

        let stats = sub_recipient_stats(&sub, grant_id, &[in_scope, wrong_grant, no_sub]);
        assert_eq!(stats.spent, Money::from_cents(1_000));
        assert_eq!(stats.allocated_to_deliverables, Money::from_dollars(3_000));
        assert_eq!(stats.unassigned, Money::from_dollars(2_000));
    }

    #[test]
    fn test_category_stats_require_both_ids() {
        let grant_id = GrantId::new();
        let del1 = DeliverableId::new();
        let del2 = DeliverableId::new();
        // Same category id reused under two deliverables
        let cat = BudgetCategoryId::new();

        let expenditures = vec![
            expenditure(grant_id, del1, cat, 300),
            expenditure(grant_id, del2, cat, 500),
        ];

        assert_eq!(
            category_stats(cat, del1, &expenditures).spent,
            Money::from_cents(300)
        );
        assert_eq!(
            category_stats(cat, del2, &expenditures).spent,
            Money::from_cents(500)
        );
    }

    #[test]
    fn test_empty_expenditures() {
        let grant = Grant::new("Empty", Money::from_dollars(100));
        let stats = grant_stats(&grant, &[]);
        assert_eq!(stats.spent, Money::zero());
        assert_eq!(stats.remaining, Money::from_dollars(100));
        assert_eq!(stats.unassigned, Money::from_dollars(100));
    }
}
