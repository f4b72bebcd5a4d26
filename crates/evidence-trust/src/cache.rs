//! On-disk trust-root cache
//!
//! Fetched trust roots are cached under a per-provider subdirectory of a
//! platform-appropriate cache location. Concurrent CLI invocations may race
//! on this cache; the writer uses fetch-then-atomic-replace (temp file plus
//! rename) so a lost race costs a re-fetch, never a corrupt cache file.

use crate::error::{Error, Result};
use crate::provider::TrustProvider;
use std::fs;
use std::path::{Path, PathBuf};

const TRUST_ROOT_FILE: &str = "trusted_root.json";

/// Per-provider on-disk cache of trust-root documents
#[derive(Debug, Clone)]
pub struct TrustRootCache {
    base_dir: PathBuf,
}

impl TrustRootCache {
    /// Cache rooted at an explicit directory
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Cache at the platform cache location for this tool
    pub fn default_location() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("io", "evidence", "evidence")
            .ok_or_else(|| Error::Cache("could not determine cache directory".to_string()))?;
        Ok(Self::new(dirs.cache_dir().join("trust-roots")))
    }

    /// Path of the cached document for a provider
    pub fn path_for(&self, provider: TrustProvider) -> PathBuf {
        self.base_dir.join(provider.name()).join(TRUST_ROOT_FILE)
    }

    /// Store a freshly fetched document, atomically replacing any old one
    pub fn store(&self, provider: TrustProvider, bytes: &[u8]) -> Result<PathBuf> {
        let target = self.path_for(provider);
        let parent = target
            .parent()
            .ok_or_else(|| Error::Cache("cache path has no parent".to_string()))?;
        fs::create_dir_all(parent)
            .map_err(|e| Error::Cache(format!("creating {}: {}", parent.display(), e)))?;

        let temp = parent.join(format!("{}.tmp.{}", TRUST_ROOT_FILE, std::process::id()));
        fs::write(&temp, bytes)
            .map_err(|e| Error::Cache(format!("writing {}: {}", temp.display(), e)))?;
        fs::rename(&temp, &target).map_err(|e| {
            let _ = fs::remove_file(&temp);
            Error::Cache(format!("replacing {}: {}", target.display(), e))
        })?;
        tracing::debug!(provider = provider.name(), path = %target.display(), "trust root cached");
        Ok(target)
    }

    /// Read the cached document, if one exists
    pub fn load(&self, provider: TrustProvider) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(provider);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Cache(format!("reading {}: {}", path.display(), e))),
        }
    }
}
