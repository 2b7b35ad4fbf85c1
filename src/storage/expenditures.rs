//! Expenditure repository for JSON storage
//!
//! Manages loading and saving expenditures to expenditures.json, with
//! secondary indexes by grant and by deliverable. As with grants, every
//! mutation is durably written before the in-memory state advances.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{GrantError, GrantResult};
use crate::models::{DeliverableId, Expenditure, ExpenditureId, GrantId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable expenditure collection
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenditureData {
    expenditures: Vec<Expenditure>,
}

/// Repository for expenditure persistence with indexing
pub struct ExpenditureRepository {
    path: PathBuf,
    data: RwLock<HashMap<ExpenditureId, Expenditure>>,
    /// Index: grant_id -> expenditure_ids
    by_grant: RwLock<HashMap<GrantId, Vec<ExpenditureId>>>,
    /// Index: deliverable_id -> expenditure_ids
    by_deliverable: RwLock<HashMap<DeliverableId, Vec<ExpenditureId>>>,
    /// Remaining puts before a simulated write failure; usize::MAX disables
    #[cfg(test)]
    puts_until_failure: std::sync::atomic::AtomicUsize,
}

impl ExpenditureRepository {
    /// Create a new expenditure repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_grant: RwLock::new(HashMap::new()),
            by_deliverable: RwLock::new(HashMap::new()),
            #[cfg(test)]
            puts_until_failure: std::sync::atomic::AtomicUsize::new(usize::MAX),
        }
    }

    /// Make the durable write fail after the next `successes` puts
    #[cfg(test)]
    pub(crate) fn fail_puts_after(&self, successes: usize) {
        self.puts_until_failure
            .store(successes, std::sync::atomic::Ordering::SeqCst);
    }

    #[cfg(test)]
    fn check_write_fault(&self) -> GrantResult<()> {
        use std::sync::atomic::Ordering;
        let remaining = self.puts_until_failure.load(Ordering::SeqCst);
        if remaining == usize::MAX {
            return Ok(());
        }
        if remaining == 0 {
            return Err(GrantError::storage("save expenditures", "write refused"));
        }
        self.puts_until_failure.store(remaining - 1, Ordering::SeqCst);
        Ok(())
    }

    /// Load expenditures from disk and build indexes
    pub fn load(&self) -> GrantResult<()> {
        let file_data: ExpenditureData = read_json(&self.path)
            .map_err(|e| GrantError::storage("load expenditures", e.to_string()))?;

        let mut data = self.write_data("load expenditures")?;
        let mut by_grant = self.write_by_grant("load expenditures")?;
        let mut by_deliverable = self.write_by_deliverable("load expenditures")?;

        data.clear();
        by_grant.clear();
        by_deliverable.clear();

        for exp in file_data.expenditures {
            by_grant.entry(exp.grant_id).or_default().push(exp.id);
            by_deliverable
                .entry(exp.deliverable_id)
                .or_default()
                .push(exp.id);
            data.insert(exp.id, exp);
        }

        Ok(())
    }

    /// Get an expenditure by ID
    pub fn get(&self, id: ExpenditureId) -> GrantResult<Option<Expenditure>> {
        let data = self.read_data("read expenditures")?;
        Ok(data.get(&id).cloned())
    }

    /// Get all expenditures, newest first
    pub fn get_all(&self) -> GrantResult<Vec<Expenditure>> {
        let data = self.read_data("read expenditures")?;

        let mut expenditures: Vec<_> = data.values().cloned().collect();
        expenditures.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(expenditures)
    }

    /// Get expenditures for a grant
    pub fn get_by_grant(&self, grant_id: GrantId) -> GrantResult<Vec<Expenditure>> {
        let data = self.read_data("read expenditures")?;
        let by_grant = self
            .by_grant
            .read()
            .map_err(|e| GrantError::storage("read expenditures", format!("lock poisoned: {}", e)))?;

        let ids = by_grant.get(&grant_id).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut expenditures: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        expenditures.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(expenditures)
    }

    /// Get expenditures for a deliverable
    pub fn get_by_deliverable(&self, deliverable_id: DeliverableId) -> GrantResult<Vec<Expenditure>> {
        let data = self.read_data("read expenditures")?;
        let by_deliverable = self
            .by_deliverable
            .read()
            .map_err(|e| GrantError::storage("read expenditures", format!("lock poisoned: {}", e)))?;

        let ids = by_deliverable
            .get(&deliverable_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut expenditures: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        expenditures.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(expenditures)
    }

    /// Insert or replace an expenditure (upsert by id), durably
    pub fn put(&self, exp: Expenditure) -> GrantResult<()> {
        #[cfg(test)]
        self.check_write_fault()?;

        let mut data = self.write_data("save expenditures")?;
        let mut by_grant = self.write_by_grant("save expenditures")?;
        let mut by_deliverable = self.write_by_deliverable("save expenditures")?;

        let mut next: Vec<Expenditure> = data.values().cloned().collect();
        match next.iter_mut().find(|e| e.id == exp.id) {
            Some(existing) => *existing = exp.clone(),
            None => next.push(exp.clone()),
        }
        persist(&self.path, next)?;

        // Durable write succeeded; now update memory and indexes
        if let Some(old) = data.get(&exp.id) {
            if let Some(ids) = by_grant.get_mut(&old.grant_id) {
                ids.retain(|&id| id != exp.id);
            }
            if let Some(ids) = by_deliverable.get_mut(&old.deliverable_id) {
                ids.retain(|&id| id != exp.id);
            }
        }
        by_grant.entry(exp.grant_id).or_default().push(exp.id);
        by_deliverable
            .entry(exp.deliverable_id)
            .or_default()
            .push(exp.id);
        data.insert(exp.id, exp);

        Ok(())
    }

    /// Delete an expenditure by id, durably; no-op if absent
    pub fn delete(&self, id: ExpenditureId) -> GrantResult<bool> {
        let mut data = self.write_data("delete expenditure")?;
        let mut by_grant = self.write_by_grant("delete expenditure")?;
        let mut by_deliverable = self.write_by_deliverable("delete expenditure")?;

        if !data.contains_key(&id) {
            return Ok(false);
        }

        let next: Vec<Expenditure> = data.values().filter(|e| e.id != id).cloned().collect();
        persist(&self.path, next)?;

        if let Some(exp) = data.remove(&id) {
            if let Some(ids) = by_grant.get_mut(&exp.grant_id) {
                ids.retain(|&eid| eid != id);
            }
            if let Some(ids) = by_deliverable.get_mut(&exp.deliverable_id) {
                ids.retain(|&eid| eid != id);
            }
        }
        Ok(true)
    }

    /// Replace the whole collection (merge/import), durably
    pub fn replace_all(&self, expenditures: Vec<Expenditure>) -> GrantResult<()> {
        let mut data = self.write_data("save expenditures")?;
        let mut by_grant = self.write_by_grant("save expenditures")?;
        let mut by_deliverable = self.write_by_deliverable("save expenditures")?;

        persist(&self.path, expenditures.clone())?;

        data.clear();
        by_grant.clear();
        by_deliverable.clear();
        for exp in expenditures {
            by_grant.entry(exp.grant_id).or_default().push(exp.id);
            by_deliverable
                .entry(exp.deliverable_id)
                .or_default()
                .push(exp.id);
            data.insert(exp.id, exp);
        }
        Ok(())
    }

    /// Count expenditures
    pub fn count(&self) -> GrantResult<usize> {
        let data = self.read_data("read expenditures")?;
        Ok(data.len())
    }

    fn read_data(
        &self,
        op: &'static str,
    ) -> GrantResult<std::sync::RwLockReadGuard<'_, HashMap<ExpenditureId, Expenditure>>> {
        self.data
            .read()
            .map_err(|e| GrantError::storage(op, format!("lock poisoned: {}", e)))
    }

    fn write_data(
        &self,
        op: &'static str,
    ) -> GrantResult<std::sync::RwLockWriteGuard<'_, HashMap<ExpenditureId, Expenditure>>> {
        self.data
            .write()
            .map_err(|e| GrantError::storage(op, format!("lock poisoned: {}", e)))
    }

    fn write_by_grant(
        &self,
        op: &'static str,
    ) -> GrantResult<std::sync::RwLockWriteGuard<'_, HashMap<GrantId, Vec<ExpenditureId>>>> {
        self.by_grant
            .write()
            .map_err(|e| GrantError::storage(op, format!("lock poisoned: {}", e)))
    }

    fn write_by_deliverable(
        &self,
        op: &'static str,
    ) -> GrantResult<std::sync::RwLockWriteGuard<'_, HashMap<DeliverableId, Vec<ExpenditureId>>>>
    {
        self.by_deliverable
            .write()
            .map_err(|e| GrantError::storage(op, format!("lock poisoned: {}", e)))
    }
}

fn persist(path: &PathBuf, mut expenditures: Vec<Expenditure>) -> GrantResult<()> {
    expenditures.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
    write_json_atomic(path, &ExpenditureData { expenditures })
        .map_err(|e| GrantError::storage("save expenditures", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetCategoryId, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, ExpenditureRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("expenditures.json");
        let repo = ExpenditureRepository::new(path);
        (temp_dir, repo)
    }

    fn sample(grant_id: GrantId, deliverable_id: DeliverableId, cents: i64) -> Expenditure {
        Expenditure::new(
            grant_id,
            deliverable_id,
            BudgetCategoryId::new(),
            NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            "Vendor",
            Money::from_cents(cents),
        )
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_put_and_get() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let exp = sample(GrantId::new(), DeliverableId::new(), 5000);
        let id = exp.id;
        repo.put(exp).unwrap();

        let retrieved = repo.get(id).unwrap().unwrap();
        assert_eq!(retrieved.amount.cents(), 5000);
    }

    #[test]
    fn test_get_by_grant() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let grant1 = GrantId::new();
        let grant2 = GrantId::new();
        let del = DeliverableId::new();

        repo.put(sample(grant1, del, 100)).unwrap();
        repo.put(sample(grant1, del, 200)).unwrap();
        repo.put(sample(grant2, del, 300)).unwrap();

        assert_eq!(repo.get_by_grant(grant1).unwrap().len(), 2);
        assert_eq!(repo.get_by_grant(grant2).unwrap().len(), 1);
    }

    #[test]
    fn test_get_by_deliverable() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let grant = GrantId::new();
        let del1 = DeliverableId::new();
        let del2 = DeliverableId::new();

        repo.put(sample(grant, del1, 100)).unwrap();
        repo.put(sample(grant, del2, 200)).unwrap();

        assert_eq!(repo.get_by_deliverable(del1).unwrap().len(), 1);
        assert_eq!(repo.get_by_deliverable(del2).unwrap().len(), 1);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let exp = sample(GrantId::new(), DeliverableId::new(), 5000);
        let id = exp.id;
        repo.put(exp).unwrap();

        let repo2 = ExpenditureRepository::new(temp_dir.path().join("expenditures.json"));
        repo2.load().unwrap();

        assert_eq!(repo2.count().unwrap(), 1);
        assert_eq!(repo2.get(id).unwrap().unwrap().amount.cents(), 5000);
    }

    #[test]
    fn test_delete_updates_indexes() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let grant = GrantId::new();
        let del = DeliverableId::new();
        let exp = sample(grant, del, 5000);
        let id = exp.id;
        repo.put(exp).unwrap();

        assert!(repo.delete(id).unwrap());
        assert_eq!(repo.count().unwrap(), 0);
        assert!(repo.get_by_grant(grant).unwrap().is_empty());
        assert!(repo.get_by_deliverable(del).unwrap().is_empty());

        // Deleting again is a no-op
        assert!(!repo.delete(id).unwrap());
    }

    #[test]
    fn test_put_moves_between_indexes_on_update() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let grant = GrantId::new();
        let del1 = DeliverableId::new();
        let del2 = DeliverableId::new();

        let mut exp = sample(grant, del1, 100);
        repo.put(exp.clone()).unwrap();

        // Whole-object replacement pointing at a different deliverable
        exp.deliverable_id = del2;
        repo.put(exp).unwrap();

        assert!(repo.get_by_deliverable(del1).unwrap().is_empty());
        assert_eq!(repo.get_by_deliverable(del2).unwrap().len(), 1);
    }
}
