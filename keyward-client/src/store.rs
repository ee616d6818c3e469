//! Persistence of the local token.

use crate::config::ClientConfig;
use crate::error::{LicenseError, LicenseResult};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Reads and writes the single cached token.
pub trait TokenStore {
    /// Returns the stored token, trimmed, or None if nothing is stored.
    fn load(&self) -> LicenseResult<Option<String>>;

    /// Replaces the stored token.
    fn save(&self, token: &str) -> LicenseResult<()>;

    /// Removes the stored token. Succeeds if nothing was stored.
    fn clear(&self) -> LicenseResult<()>;
}

impl<S: TokenStore + ?Sized> TokenStore for &S {
    fn load(&self) -> LicenseResult<Option<String>> {
        (**self).load()
    }

    fn save(&self, token: &str) -> LicenseResult<()> {
        (**self).save(token)
    }

    fn clear(&self) -> LicenseResult<()> {
        (**self).clear()
    }
}

/// Stores the token as a plain text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Stores the token at `dir/file_name`.
    pub fn new(dir: impl AsRef<Path>, file_name: &str) -> Self {
        Self {
            path: dir.as_ref().join(file_name),
        }
    }

    /// Stores the token at the path named by `config`.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            path: config.token_path(),
        }
    }

    /// Returns the token file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> LicenseResult<Option<String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no token file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(LicenseError::Storage(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let token = contents.trim();
        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(token.to_string()))
        }
    }

    /// Writes to a temporary file in the same directory and renames it over
    /// the token file, so readers never see a partial token.
    fn save(&self, token: &str) -> LicenseResult<()> {
        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|e| {
                    LicenseError::Storage(format!("failed to create {}: {e}", parent.display()))
                })?;
                parent
            }
            None => Path::new("."),
        };

        let write_err = |e: std::io::Error| {
            LicenseError::Storage(format!("failed to write {}: {e}", self.path.display()))
        };

        let mut staged = NamedTempFile::new_in(parent).map_err(write_err)?;
        staged.write_all(token.as_bytes()).map_err(write_err)?;
        staged.as_file().sync_all().map_err(write_err)?;
        staged.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!("token written to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> LicenseResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LicenseError::Storage(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}
