//! Storage layer for grant-ledger
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation. Each top-level collection (grants, expenditures, templates)
//! lives in its own file and is rewritten wholesale on every mutation.

pub mod expenditures;
pub mod file_io;
pub mod grants;
pub mod init;
pub mod templates;

pub use expenditures::ExpenditureRepository;
pub use file_io::{read_json, read_json_required, write_json_atomic};
pub use grants::GrantRepository;
pub use init::initialize_storage;
pub use templates::TemplateRepository;

use crate::config::paths::LedgerPaths;
use crate::error::GrantResult;
use crate::models::Snapshot;

/// Main storage coordinator that provides access to all repositories
///
/// The in-memory state of the repositories is the single source of truth for
/// one process; it only ever advances after a durable write.
pub struct Storage {
    paths: LedgerPaths,
    pub grants: GrantRepository,
    pub expenditures: ExpenditureRepository,
    pub templates: TemplateRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: LedgerPaths) -> GrantResult<Self> {
        // Ensure directories exist
        paths.ensure_directories()?;

        Ok(Self {
            grants: GrantRepository::new(paths.grants_file()),
            expenditures: ExpenditureRepository::new(paths.expenditures_file()),
            templates: TemplateRepository::new(paths.templates_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> GrantResult<()> {
        self.grants.load()?;
        self.expenditures.load()?;
        self.templates.load()?;
        Ok(())
    }

    /// Take a snapshot of every collection, stamped now
    pub fn snapshot(&self) -> GrantResult<Snapshot> {
        let mut snap = Snapshot::new();
        snap.grants = self.grants.get_all()?;
        snap.expenditures = self.expenditures.get_all()?;
        snap.templates = self.templates.get_all()?;
        Ok(snap)
    }

    /// Check if storage has been initialized (has a settings file)
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}
