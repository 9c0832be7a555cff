use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::errors::CoreError;

/// One app-private local cache file holding raw text.
///
/// Used for both persistence slots: the portfolio document cache and the
/// price cache. A missing file or an unreadable one is reported as "no
/// cache" — callers fall back to their defaults.
///
/// Concurrent processes writing the same path are not coordinated; the
/// design assumes one writer per cache path.
pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the cached text, or `None` if the file is missing or unreadable.
    #[must_use]
    pub fn read(&self) -> Option<String> {
        if !self.path.exists() {
            return None;
        }
        match fs::read_to_string(&self.path) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cache read failed");
                None
            }
        }
    }

    /// Replace the cached text, creating parent directories as needed.
    pub fn write(&self, text: &str) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, text)?;
        Ok(())
    }
}
