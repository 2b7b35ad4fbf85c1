//! Path management for grant-ledger
//!
//! Provides XDG-compliant path resolution for configuration, data, and
//! exported snapshots.
//!
//! ## Path Resolution Order
//!
//! 1. `GRANT_LEDGER_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/grant-ledger` or `~/.config/grant-ledger`
//! 3. Windows: `%APPDATA%\grant-ledger`

use std::path::PathBuf;

use crate::error::GrantError;

/// Manages all paths used by grant-ledger
#[derive(Debug, Clone)]
pub struct LedgerPaths {
    /// Base directory for all grant-ledger data
    base_dir: PathBuf,
}

impl LedgerPaths {
    /// Create a new LedgerPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, GrantError> {
        let base_dir = if let Ok(custom) = std::env::var("GRANT_LEDGER_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create LedgerPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/grant-ledger/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (~/.config/grant-ledger/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the attachments directory (stored receipts)
    pub fn attachments_dir(&self) -> PathBuf {
        self.base_dir.join("attachments")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to grants.json
    pub fn grants_file(&self) -> PathBuf {
        self.data_dir().join("grants.json")
    }

    /// Get the path to expenditures.json
    pub fn expenditures_file(&self) -> PathBuf {
        self.data_dir().join("expenditures.json")
    }

    /// Get the path to templates.json
    pub fn templates_file(&self) -> PathBuf {
        self.data_dir().join("templates.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), GrantError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| GrantError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| GrantError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.attachments_dir())
            .map_err(|e| GrantError::Io(format!("Failed to create attachments directory: {}", e)))?;

        Ok(())
    }

    /// Check if grant-ledger has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, GrantError> {
    // Unix (Linux/macOS): Use XDG_CONFIG_HOME if set, otherwise ~/.config
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let home = std::env::var("HOME")
                .map_err(|_| GrantError::Config("Could not determine home directory".into()))?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("grant-ledger"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, GrantError> {
    // Windows: Use APPDATA
    let appdata = std::env::var("APPDATA")
        .map_err(|_| GrantError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("grant-ledger"))
}
