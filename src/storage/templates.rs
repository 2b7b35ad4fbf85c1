//! Email template repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{GrantError, GrantResult};
use crate::models::{EmailTemplate, TemplateId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable template collection
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TemplateData {
    templates: Vec<EmailTemplate>,
}

/// Repository for email template persistence
pub struct TemplateRepository {
    path: PathBuf,
    data: RwLock<HashMap<TemplateId, EmailTemplate>>,
}

impl TemplateRepository {
    /// Create a new template repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load templates from disk
    pub fn load(&self) -> GrantResult<()> {
        let file_data: TemplateData = read_json(&self.path)
            .map_err(|e| GrantError::storage("load templates", e.to_string()))?;

        let mut data = self
            .data
            .write()
            .map_err(|e| GrantError::storage("load templates", format!("lock poisoned: {}", e)))?;

        data.clear();
        for tpl in file_data.templates {
            data.insert(tpl.id, tpl);
        }
        Ok(())
    }

    /// Get a template by ID
    pub fn get(&self, id: TemplateId) -> GrantResult<Option<EmailTemplate>> {
        let data = self
            .data
            .read()
            .map_err(|e| GrantError::storage("read templates", format!("lock poisoned: {}", e)))?;
        Ok(data.get(&id).cloned())
    }

    /// Get all templates sorted by name
    pub fn get_all(&self) -> GrantResult<Vec<EmailTemplate>> {
        let data = self
            .data
            .read()
            .map_err(|e| GrantError::storage("read templates", format!("lock poisoned: {}", e)))?;

        let mut templates: Vec<_> = data.values().cloned().collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    /// Insert or replace a template (upsert by id), durably
    pub fn put(&self, tpl: EmailTemplate) -> GrantResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| GrantError::storage("save templates", format!("lock poisoned: {}", e)))?;

        let mut next: Vec<EmailTemplate> = data.values().cloned().collect();
        match next.iter_mut().find(|t| t.id == tpl.id) {
            Some(existing) => *existing = tpl.clone(),
            None => next.push(tpl.clone()),
        }
        persist(&self.path, next)?;

        data.insert(tpl.id, tpl);
        Ok(())
    }

    /// Delete a template by id, durably; no-op if absent
    pub fn delete(&self, id: TemplateId) -> GrantResult<bool> {
        let mut data = self
            .data
            .write()
            .map_err(|e| GrantError::storage("delete template", format!("lock poisoned: {}", e)))?;

        if !data.contains_key(&id) {
            return Ok(false);
        }

        let next: Vec<EmailTemplate> = data.values().filter(|t| t.id != id).cloned().collect();
        persist(&self.path, next)?;

        data.remove(&id);
        Ok(true)
    }

    /// Replace the whole collection (merge/import), durably
    pub fn replace_all(&self, templates: Vec<EmailTemplate>) -> GrantResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| GrantError::storage("save templates", format!("lock poisoned: {}", e)))?;

        persist(&self.path, templates.clone())?;

        data.clear();
        for tpl in templates {
            data.insert(tpl.id, tpl);
        }
        Ok(())
    }

    /// Count templates
    pub fn count(&self) -> GrantResult<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| GrantError::storage("read templates", format!("lock poisoned: {}", e)))?;
        Ok(data.len())
    }
}

fn persist(path: &PathBuf, mut templates: Vec<EmailTemplate>) -> GrantResult<()> {
    templates.sort_by(|a, b| a.name.cmp(&b.name));
    write_json_atomic(path, &TemplateData { templates })
        .map_err(|e| GrantError::storage("save templates", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TemplateRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TemplateRepository::new(temp_dir.path().join("templates.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_put_get_delete() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let tpl = EmailTemplate::new("Status update", "Re: {{grant_name}}", "Body");
        let id = tpl.id;
        repo.put(tpl).unwrap();

        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(repo.get(id).unwrap().unwrap().name, "Status update");

        assert!(repo.delete(id).unwrap());
        assert!(!repo.delete(id).unwrap());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_sorted_by_name() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        repo.put(EmailTemplate::new("Zeta", "", "b")).unwrap();
        repo.put(EmailTemplate::new("Alpha", "", "b")).unwrap();

        let all = repo.get_all().unwrap();
        assert_eq!(all[0].name, "Alpha");
        assert_eq!(all[1].name, "Zeta");
    }
}
