//! Host platform integration
//!
//! File dialogs, attachment storage, and raw file access sit behind a trait
//! so the rest of the crate never touches the filesystem directly for
//! user-driven operations. `NativePlatform` is the real implementation;
//! `NoPlatform` is the headless fallback where every capability reports
//! itself unavailable instead of panicking.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GrantError, GrantResult};

/// Host capabilities the application needs
pub trait Platform {
    /// Ask the user where to save a file; `None` means cancelled
    fn select_save_path(&self, suggested_name: &str) -> GrantResult<Option<PathBuf>>;

    /// Open a file with the system default handler
    fn open_file(&self, path: &Path) -> GrantResult<()>;

    /// Read a file's bytes
    fn read_file(&self, path: &Path) -> GrantResult<Vec<u8>>;

    /// Write bytes to a file, creating parent directories as needed
    fn write_file(&self, path: &Path, contents: &[u8]) -> GrantResult<()>;

    /// Copy a receipt or document into the attachments directory and return
    /// its new path
    fn save_attachment(&self, source: &Path) -> GrantResult<PathBuf>;
}

/// Filesystem-backed platform
pub struct NativePlatform {
    attachments_dir: PathBuf,
}

impl NativePlatform {
    /// Create a platform rooted at the given attachments directory
    pub fn new(attachments_dir: PathBuf) -> Self {
        Self { attachments_dir }
    }
}

impl Platform for NativePlatform {
    fn select_save_path(&self, suggested_name: &str) -> GrantResult<Option<PathBuf>> {
        // Headless build: no dialog toolkit, the suggested name lands in the
        // current directory. The desktop shell overrides this.
        Ok(Some(PathBuf::from(suggested_name)))
    }

    fn open_file(&self, path: &Path) -> GrantResult<()> {
        if !path.exists() {
            return Err(GrantError::storage(
                "open file",
                format!("{} does not exist", path.display()),
            ));
        }

        #[cfg(target_os = "macos")]
        let launcher = "open";
        #[cfg(target_os = "windows")]
        let launcher = "explorer";
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let launcher = "xdg-open";

        let status = std::process::Command::new(launcher).arg(path).status()?;
        if !status.success() {
            return Err(GrantError::ExternalService(format!(
                "{} exited with {}",
                launcher, status
            )));
        }
        Ok(())
    }

    fn read_file(&self, path: &Path) -> GrantResult<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> GrantResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }

    fn save_attachment(&self, source: &Path) -> GrantResult<PathBuf> {
        let file_name = source
            .file_name()
            .ok_or_else(|| GrantError::Validation(format!(
                "{} has no file name",
                source.display()
            )))?;

        fs::create_dir_all(&self.attachments_dir)?;

        // Avoid clobbering an existing attachment with the same name
        let mut dest = self.attachments_dir.join(file_name);
        let mut counter = 1u32;
        while dest.exists() {
            let stem = source
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("attachment");
            let ext = source.extension().and_then(|e| e.to_str());
            let renamed = match ext {
                Some(ext) => format!("{}-{}.{}", stem, counter, ext),
                None => format!("{}-{}", stem, counter),
            };
            dest = self.attachments_dir.join(renamed);
            counter += 1;
        }

        fs::copy(source, &dest)?;
        Ok(dest)
    }
}

/// Platform stub for environments with no host integration
///
/// Every call fails with `FeatureUnavailable`; callers surface that to the
/// user rather than crashing.
pub struct NoPlatform;

impl Platform for NoPlatform {
    fn select_save_path(&self, _suggested_name: &str) -> GrantResult<Option<PathBuf>> {
        Err(GrantError::FeatureUnavailable("file dialogs"))
    }

    fn open_file(&self, _path: &Path) -> GrantResult<()> {
        Err(GrantError::FeatureUnavailable("opening files"))
    }

    fn read_file(&self, _path: &Path) -> GrantResult<Vec<u8>> {
        Err(GrantError::FeatureUnavailable("reading files"))
    }

    fn write_file(&self, _path: &Path, _contents: &[u8]) -> GrantResult<()> {
        Err(GrantError::FeatureUnavailable("writing files"))
    }

    fn save_attachment(&self, _source: &Path) -> GrantResult<PathBuf> {
        Err(GrantError::FeatureUnavailable("attachments"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_attachment_copies_into_dir() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("receipt.pdf");
        fs::write(&source, b"pdf bytes").unwrap();

        let platform = NativePlatform::new(temp_dir.path().join("attachments"));
        let dest = platform.save_attachment(&source).unwrap();

        assert!(dest.starts_with(temp_dir.path().join("attachments")));
        assert_eq!(fs::read(&dest).unwrap(), b"pdf bytes");
    }

    #[test]
    fn test_save_attachment_avoids_name_collisions() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("receipt.pdf");
        fs::write(&source, b"first").unwrap();

        let platform = NativePlatform::new(temp_dir.path().join("attachments"));
        let first = platform.save_attachment(&source).unwrap();

        fs::write(&source, b"second").unwrap();
        let second = platform.save_attachment(&source).unwrap();

        assert_ne!(first, second);
        assert_eq!(fs::read(&first).unwrap(), b"first");
        assert_eq!(fs::read(&second).unwrap(), b"second");
    }

    #[test]
    fn test_write_file_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let platform = NativePlatform::new(temp_dir.path().to_path_buf());
        let path = temp_dir.path().join("a/b/c.txt");

        platform.write_file(&path, b"hello").unwrap();
        assert_eq!(platform.read_file(&path).unwrap(), b"hello");
    }

    #[test]
    fn test_no_platform_reports_unavailable() {
        let err = NoPlatform.select_save_path("export.json").unwrap_err();
        assert!(matches!(err, GrantError::FeatureUnavailable(_)));
        let err = NoPlatform.save_attachment(Path::new("x")).unwrap_err();
        assert!(matches!(err, GrantError::FeatureUnavailable(_)));
    }
}
