//! Snapshot merge reconciler
//!
//! Combines an incoming snapshot (an import, a synced copy, a backup) with
//! the current store. Identity is the entity id: an incoming record whose id
//! already exists locally is skipped wholesale, so the local copy always
//! wins. The merge itself is pure; `apply` persists the result.

use std::collections::HashSet;
use std::fmt;

use crate::error::GrantResult;
use crate::models::Snapshot;
use crate::storage::Storage;

/// Per-collection outcome counts for a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeCounts {
    /// Incoming records that were new and kept
    pub inserted: usize,
    /// Incoming records whose id already existed locally
    pub skipped: usize,
}

/// What a merge did, per collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub grants: MergeCounts,
    pub expenditures: MergeCounts,
    pub templates: MergeCounts,
}

impl MergeReport {
    /// Total records added across all collections
    pub fn total_inserted(&self) -> usize {
        self.grants.inserted + self.expenditures.inserted + self.templates.inserted
    }

    /// Total records skipped across all collections
    pub fn total_skipped(&self) -> usize {
        self.grants.skipped + self.expenditures.skipped + self.templates.skipped
    }
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "grants: +{}/~{}, expenditures: +{}/~{}, templates: +{}/~{}",
            self.grants.inserted,
            self.grants.skipped,
            self.expenditures.inserted,
            self.expenditures.skipped,
            self.templates.inserted,
            self.templates.skipped
        )
    }
}

/// Merge an incoming snapshot into the current one
///
/// Pure function: neither input is persisted. Current-side records are kept
/// verbatim; incoming records are appended only when their id is new.
pub fn merge(current: Snapshot, incoming: Snapshot) -> (Snapshot, MergeReport) {
    let mut report = MergeReport::default();
    let mut merged = current;

    let known: HashSet<_> = merged.grants.iter().map(|g| g.id).collect();
    for grant in incoming.grants {
        if known.contains(&grant.id) {
            report.grants.skipped += 1;
        } else {
            merged.grants.push(grant);
            report.grants.inserted += 1;
        }
    }

    let known: HashSet<_> = merged.expenditures.iter().map(|e| e.id).collect();
    for exp in incoming.expenditures {
        if known.contains(&exp.id) {
            report.expenditures.skipped += 1;
        } else {
            merged.expenditures.push(exp);
            report.expenditures.inserted += 1;
        }
    }

    let known: HashSet<_> = merged.templates.iter().map(|t| t.id).collect();
    for tpl in incoming.templates {
        if known.contains(&tpl.id) {
            report.templates.skipped += 1;
        } else {
            merged.templates.push(tpl);
            report.templates.inserted += 1;
        }
    }

    (merged, report)
}

/// Merge an incoming snapshot into the store and persist the result
pub fn apply(storage: &Storage, incoming: Snapshot) -> GrantResult<MergeReport> {
    let current = storage.snapshot()?;
    let (merged, report) = merge(current, incoming);

    storage.grants.replace_all(merged.grants)?;
    storage.expenditures.replace_all(merged.expenditures)?;
    storage.templates.replace_all(merged.templates)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{
        BudgetCategoryId, DeliverableId, EmailTemplate, Expenditure, Grant, Money,
    };
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn expenditure(grant: &Grant, cents: i64) -> Expenditure {
        Expenditure::new(
            grant.id,
            DeliverableId::new(),
            BudgetCategoryId::new(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            "Vendor",
            Money::from_cents(cents),
        )
    }

    #[test]
    fn test_merge_skips_duplicates_current_wins() {
        let shared = Grant::new("Shared Grant", Money::from_dollars(10_000));
        let local_only = Grant::new("Local Grant", Money::from_dollars(5_000));
        let remote_only = Grant::new("Remote Grant", Money::from_dollars(7_000));

        // The incoming copy of the shared grant has diverged
        let mut remote_shared = shared.clone();
        remote_shared.total_award = Money::from_dollars(99_999);

        let current = Snapshot {
            grants: vec![shared.clone(), local_only.clone()],
            ..Snapshot::default()
        };
        let incoming = Snapshot {
            grants: vec![remote_shared, remote_only.clone()],
            ..Snapshot::default()
        };

        let (merged, report) = merge(current, incoming);

        assert_eq!(report.grants.inserted, 1);
        assert_eq!(report.grants.skipped, 1);
        assert_eq!(merged.grants.len(), 3);

        // Local version of the shared grant survives untouched
        let kept = merged.grants.iter().find(|g| g.id == shared.id).unwrap();
        assert_eq!(kept.total_award, Money::from_dollars(10_000));
        assert!(merged.grants.iter().any(|g| g.id == remote_only.id));
    }

    #[test]
    fn test_merge_counts_all_collections() {
        let grant = Grant::new("G", Money::from_dollars(1_000));
        let e1 = expenditure(&grant, 100);
        let e2 = expenditure(&grant, 200);
        let tpl = EmailTemplate::new("Reminder", "Subject", "Body");

        let current = Snapshot {
            grants: vec![grant.clone()],
            expenditures: vec![e1.clone()],
            ..Snapshot::default()
        };
        let incoming = Snapshot {
            grants: vec![grant],
            expenditures: vec![e1, e2],
            templates: vec![tpl],
            ..Snapshot::default()
        };

        let (merged, report) = merge(current, incoming);

        assert_eq!(report.grants.skipped, 1);
        assert_eq!(report.expenditures.inserted, 1);
        assert_eq!(report.expenditures.skipped, 1);
        assert_eq!(report.templates.inserted, 1);
        assert_eq!(report.total_inserted(), 2);
        assert_eq!(report.total_skipped(), 2);
        assert_eq!(merged.expenditures.len(), 2);
        assert_eq!(merged.templates.len(), 1);
    }

    #[test]
    fn test_merge_into_empty_takes_everything() {
        let grant = Grant::new("G", Money::from_dollars(1_000));
        let incoming = Snapshot {
            grants: vec![grant.clone()],
            expenditures: vec![expenditure(&grant, 100)],
            ..Snapshot::default()
        };

        let (merged, report) = merge(Snapshot::default(), incoming);
        assert_eq!(report.total_inserted(), 2);
        assert_eq!(report.total_skipped(), 0);
        assert_eq!(merged.grants.len(), 1);
        assert_eq!(merged.expenditures.len(), 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let grant = Grant::new("G", Money::from_dollars(1_000));
        let snapshot = Snapshot {
            grants: vec![grant.clone()],
            expenditures: vec![expenditure(&grant, 100)],
            ..Snapshot::default()
        };

        let (first, _) = merge(Snapshot::default(), snapshot.clone());
        let (second, report) = merge(first.clone(), snapshot);

        assert_eq!(report.total_inserted(), 0);
        assert_eq!(second.grants.len(), first.grants.len());
        assert_eq!(second.expenditures.len(), first.expenditures.len());
    }

    #[test]
    fn test_apply_persists_merge() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let local = Grant::new("Local", Money::from_dollars(5_000));
        storage.grants.put(local.clone()).unwrap();

        let remote = Grant::new("Remote", Money::from_dollars(7_000));
        let incoming = Snapshot {
            grants: vec![local.clone(), remote.clone()],
            expenditures: vec![expenditure(&remote, 2_500)],
            ..Snapshot::default()
        };

        let report = apply(&storage, incoming).unwrap();
        assert_eq!(report.grants.inserted, 1);
        assert_eq!(report.grants.skipped, 1);
        assert_eq!(report.expenditures.inserted, 1);

        assert_eq!(storage.grants.count().unwrap(), 2);
        assert_eq!(storage.expenditures.count().unwrap(), 1);
    }
}
