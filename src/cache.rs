//! Persisted credential and choice cache.
//!
//! One file per cached category under a stable cache root. Presence of an
//! entry means "previously resolved"; refresh flags at the workflow level
//! supersede cached values by re-prompting and overwriting.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ShipError};

/// Cached category names. Each maps to a single-value file under the root.
pub const SERVER: &str = "server";
pub const TOKEN: &str = "token";
pub const OWNER: &str = "owner";
pub const LOGIN: &str = "login";
pub const PUBLISHER: &str = "publisher";

/// Environment variable overriding the default cache root location.
pub const HOME_ENV: &str = "GIT_SHIP_HOME";

/// File-backed store for resolved workflow choices (host, token, owner, ...).
pub struct CredentialStore {
    root: PathBuf,
}

impl CredentialStore {
    /// Open the store, resolving and creating the cache root.
    ///
    /// Resolution order: explicit override, `GIT_SHIP_HOME`, then
    /// `~/.git-ship`. An unresolvable or uncreatable root is fatal.
    pub fn open(override_root: Option<PathBuf>) -> Result<Self> {
        let root = match override_root {
            Some(path) => path,
            None => match env::var_os(HOME_ENV) {
                Some(dir) => PathBuf::from(dir),
                None => dirs::home_dir()
                    .ok_or_else(|| ShipError::home("home directory could not be determined"))?
                    .join(".git-ship"),
            },
        };

        fs::create_dir_all(&root).map_err(|e| {
            ShipError::home(format!("cannot create {}: {}", root.display(), e))
        })?;

        Ok(CredentialStore { root })
    }

    /// Read a cached entry. Missing or empty entries read as absent.
    pub fn read(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.root.join(name))
            .ok()
            .map(|value| value.trim_end().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Write an entry, overwriting any previous value.
    pub fn write(&self, name: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.root.join(name), value)?;
        Ok(())
    }

    /// The resolved cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
