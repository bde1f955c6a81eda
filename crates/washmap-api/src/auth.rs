//! File-backed persistence for the mobile-style login token.
//!
//! A single file at the configured token path stands in for the browser's
//! localStorage. The file holds the bare token string, nothing else.

use std::path::{Path, PathBuf};

use crate::error::ApiError;

pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted token, if one exists. A missing file is simply
    /// "not logged in", not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::TokenStore`] on any I/O failure other than the
    /// file not existing.
    pub fn load(&self) -> Result<Option<String>, ApiError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_owned()))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Persists the token, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::TokenStore`] on I/O failure.
    pub fn save(&self, token: &str) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        std::fs::write(&self.path, token).map_err(|e| self.io_error(e))
    }

    /// Removes the persisted token. Idempotent: clearing an absent token is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::TokenStore`] on any other I/O failure.
    pub fn clear(&self) -> Result<(), ApiError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> ApiError {
        ApiError::TokenStore {
            path: self.path.display().to_string(),
            source,
        }
    }
}
