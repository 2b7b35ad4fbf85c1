//! Grant repository for JSON storage
//!
//! Manages loading and saving grants to grants.json. Every mutation performs
//! a durable whole-collection write before the in-memory map is updated, so
//! memory never reflects state that was not saved.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{GrantError, GrantResult};
use crate::models::{Grant, GrantId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable grant collection
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct GrantData {
    grants: Vec<Grant>,
}

/// Repository for grant persistence
pub struct GrantRepository {
    path: PathBuf,
    data: RwLock<HashMap<GrantId, Grant>>,
}

impl GrantRepository {
    /// Create a new grant repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load grants from disk
    pub fn load(&self) -> GrantResult<()> {
        let file_data: GrantData = read_json(&self.path)
            .map_err(|e| GrantError::storage("load grants", e.to_string()))?;

        let mut data = self
            .data
            .write()
            .map_err(|e| GrantError::storage("load grants", format!("lock poisoned: {}", e)))?;

        data.clear();
        for grant in file_data.grants {
            data.insert(grant.id, grant);
        }

        Ok(())
    }

    /// Get a grant by ID
    pub fn get(&self, id: GrantId) -> GrantResult<Option<Grant>> {
        let data = self
            .data
            .read()
            .map_err(|e| GrantError::storage("read grants", format!("lock poisoned: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all grants, oldest first
    pub fn get_all(&self) -> GrantResult<Vec<Grant>> {
        let data = self
            .data
            .read()
            .map_err(|e| GrantError::storage("read grants", format!("lock poisoned: {}", e)))?;

        let mut grants: Vec<_> = data.values().cloned().collect();
        grants.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));
        Ok(grants)
    }

    /// Find a grant by exact name
    pub fn get_by_name(&self, name: &str) -> GrantResult<Option<Grant>> {
        let data = self
            .data
            .read()
            .map_err(|e| GrantError::storage("read grants", format!("lock poisoned: {}", e)))?;

        Ok(data.values().find(|g| g.name == name).cloned())
    }

    /// Insert or replace a grant (upsert by id), durably
    pub fn put(&self, grant: Grant) -> GrantResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| GrantError::storage("save grants", format!("lock poisoned: {}", e)))?;

        let mut next: Vec<Grant> = data.values().cloned().collect();
        match next.iter_mut().find(|g| g.id == grant.id) {
            Some(existing) => *existing = grant.clone(),
            None => next.push(grant.clone()),
        }
        persist(&self.path, next)?;

        // Commit to memory only after the durable write succeeded
        data.insert(grant.id, grant);
        Ok(())
    }

    /// Delete a grant by id, durably
    ///
    /// No-op (and no write) if the id is absent. No cascade: expenditures
    /// referencing the grant are left in place.
    pub fn delete(&self, id: GrantId) -> GrantResult<bool> {
        let mut data = self
            .data
            .write()
            .map_err(|e| GrantError::storage("delete grant", format!("lock poisoned: {}", e)))?;

        if !data.contains_key(&id) {
            return Ok(false);
        }

        let next: Vec<Grant> = data.values().filter(|g| g.id != id).cloned().collect();
        persist(&self.path, next)?;

        data.remove(&id);
        Ok(true)
    }

    /// Replace the whole collection (merge/import), durably
    pub fn replace_all(&self, grants: Vec<Grant>) -> GrantResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| GrantError::storage("save grants", format!("lock poisoned: {}", e)))?;

        persist(&self.path, grants.clone())?;

        data.clear();
        for grant in grants {
            data.insert(grant.id, grant);
        }
        Ok(())
    }

    /// Count grants
    pub fn count(&self) -> GrantResult<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| GrantError::storage("read grants", format!("lock poisoned: {}", e)))?;

        Ok(data.len())
    }
}

fn persist(path: &PathBuf, mut grants: Vec<Grant>) -> GrantResult<()> {
    grants.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));
    write_json_atomic(path, &GrantData { grants })
        .map_err(|e| GrantError::storage("save grants", e.to_string()))
}
