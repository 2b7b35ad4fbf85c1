//! Whole-database snapshot
//!
//! The snapshot is the unit of export, backup, import, and merge: every
//! top-level collection plus a timestamp, serialized as pretty-printed JSON
//! so backups stay human-diffable. Field order is insignificant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::expenditure::Expenditure;
use super::grant::Grant;
use super::template::EmailTemplate;

/// Current snapshot schema version
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// A complete copy of the ledger at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Schema version for compatibility checking
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// All grants with their owned allocation trees
    #[serde(default)]
    pub grants: Vec<Grant>,

    /// All expenditures
    #[serde(default)]
    pub expenditures: Vec<Expenditure>,

    /// All email templates
    #[serde(default)]
    pub templates: Vec<EmailTemplate>,

    /// When the snapshot was taken
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

fn default_schema_version() -> u32 {
    SNAPSHOT_SCHEMA_VERSION
}

impl Snapshot {
    /// Create an empty snapshot stamped now
    pub fn new() -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            grants: Vec::new(),
            expenditures: Vec::new(),
            templates: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Check if the snapshot holds no entities at all
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty() && self.expenditures.is_empty() && self.templates.is_empty()
    }
}

// Not derived: a derived Default would zero schema_version
impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;

    #[test]
    fn test_empty_snapshot() {
        let snap = Snapshot::new();
        assert!(snap.is_empty());
        assert_eq!(snap.schema_version, SNAPSHOT_SCHEMA_VERSION);
    }

    #[test]
    fn test_default_carries_current_schema_version() {
        assert_eq!(Snapshot::default().schema_version, SNAPSHOT_SCHEMA_VERSION);
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        // A minimal hand-written file should still parse
        let snap: Snapshot = serde_json::from_str("{}").unwrap();
        assert!(snap.is_empty());
        assert_eq!(snap.schema_version, SNAPSHOT_SCHEMA_VERSION);
    }

    #[test]
    fn test_round_trip() {
        let mut snap = Snapshot::new();
        snap.grants
            .push(Grant::new("Food Pantry Expansion", Money::from_dollars(20_000)));

        let json = serde_json::to_string_pretty(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.grants.len(), 1);
        assert_eq!(back.grants[0].name, "Food Pantry Expansion");
    }
}
