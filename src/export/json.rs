//! JSON snapshot export and import
//!
//! A snapshot is the sync and backup unit: the full data set in one JSON
//! document. Export writes atomically through the storage layer's file
//! helpers; import parses the same shape and hands it to the merge
//! reconciler, so an import can never clobber local records.

use std::path::Path;

use crate::error::{GrantError, GrantResult};
use crate::models::Snapshot;
use crate::services::merge::{apply, MergeReport};
use crate::storage::file_io::{read_json_required, write_json_atomic};
use crate::storage::Storage;

/// Export the full data set as a JSON snapshot
pub fn export_snapshot(storage: &Storage, path: &Path) -> GrantResult<Snapshot> {
    let snapshot = storage.snapshot()?;
    write_json_atomic(path, &snapshot)?;
    Ok(snapshot)
}

/// Read a snapshot file without applying it
pub fn read_snapshot(path: &Path) -> GrantResult<Snapshot> {
    let snapshot: Snapshot = read_json_required(path)?;
    if snapshot.schema_version > crate::models::SNAPSHOT_SCHEMA_VERSION {
        return Err(GrantError::Import(format!(
            "snapshot schema version {} is newer than this build supports",
            snapshot.schema_version
        )));
    }
    Ok(snapshot)
}

/// Import a snapshot file and merge it into the store
///
/// Local records always win on id collisions.
pub fn import_snapshot(storage: &Storage, path: &Path) -> GrantResult<MergeReport> {
    let incoming = read_snapshot(path)?;
    apply(storage, incoming)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{Grant, Money};
    use tempfile::TempDir;

    fn create_test_storage(dir: &TempDir) -> Storage {
        let paths = LedgerPaths::with_base_dir(dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        storage
    }

    #[test]
    fn test_export_import_round_trip_between_stores() {
        let dir_a = TempDir::new().unwrap();
        let dir_b = TempDir::new().unwrap();
        let store_a = create_test_storage(&dir_a);
        let store_b = create_test_storage(&dir_b);

        store_a
            .grants
            .put(Grant::new("Shared Grant", Money::from_dollars(9_000)))
            .unwrap();

        let export_path = dir_a.path().join("snapshot.json");
        let exported = export_snapshot(&store_a, &export_path).unwrap();
        assert_eq!(exported.grants.len(), 1);

        let report = import_snapshot(&store_b, &export_path).unwrap();
        assert_eq!(report.grants.inserted, 1);
        assert_eq!(store_b.grants.count().unwrap(), 1);

        // A second import is a no-op
        let report = import_snapshot(&store_b, &export_path).unwrap();
        assert_eq!(report.grants.inserted, 0);
        assert_eq!(report.grants.skipped, 1);
    }

    #[test]
    fn test_import_missing_file_errors() {
        let dir = TempDir::new().unwrap();
        let storage = create_test_storage(&dir);

        let err = import_snapshot(&storage, &dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, GrantError::Io(_) | GrantError::Storage { .. }));
    }

    #[test]
    fn test_import_rejects_newer_schema() {
        let dir = TempDir::new().unwrap();
        let storage = create_test_storage(&dir);

        let path = dir.path().join("future.json");
        std::fs::write(&path, r#"{"schema_version": 99}"#).unwrap();

        let err = import_snapshot(&storage, &path).unwrap_err();
        assert!(matches!(err, GrantError::Import(_)));
    }
}
