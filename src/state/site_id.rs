//! Site identification and hashing.
//!
//! A site is identified by the SHA256 hash of its canonical root path. The
//! hash names the directory that holds its progress record.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::error::{KickoffError, Result};

/// Unique identifier for a provisioned site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteId {
    /// SHA256 hash of the canonical path.
    hash: String,
    /// Absolute path to the site root.
    path: PathBuf,
}

impl SiteId {
    /// Create a SiteId from a site root.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be canonicalized (e.g., doesn't exist).
    pub fn from_path(path: &Path) -> Result<Self> {
        let abs_path = path.canonicalize().map_err(KickoffError::Io)?;
        let hash = Self::compute_hash(&abs_path);

        Ok(Self {
            hash,
            path: abs_path,
        })
    }

    /// This is a 16-character hex string (8 bytes of SHA256).
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Canonical site root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory name of the site root.
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
    }

    /// Default state directory: `~/.kickoff/sites/<hash>`.
    pub fn default_state_dir(&self) -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("~"))
            .join(".kickoff")
            .join("sites")
            .join(&self.hash)
    }

    fn compute_hash(path: &Path) -> String {
        let mut hasher = Sha256::new();
        hasher.update(path.to_string_lossy().as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn site_id_from_path() {
        let temp = TempDir::new().unwrap();
        let site = SiteId::from_path(temp.path()).unwrap();

        assert_eq!(site.hash().len(), 16);
        assert!(site.hash().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn same_path_same_hash() {
        let temp = TempDir::new().unwrap();
        let a = SiteId::from_path(temp.path()).unwrap();
        let b = SiteId::from_path(temp.path()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_paths_different_hashes() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        assert_ne!(
            SiteId::from_path(a.path()).unwrap().hash(),
            SiteId::from_path(b.path()).unwrap().hash()
        );
    }

    #[test]
    fn relative_paths_are_canonicalized() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("site");
        std::fs::create_dir(&nested).unwrap();

        let direct = SiteId::from_path(&nested).unwrap();
        let dotted = SiteId::from_path(&nested.join("..").join("site")).unwrap();
        assert_eq!(direct.hash(), dotted.hash());
        assert_eq!(direct.name(), "site");
    }

    #[test]
    fn missing_path_is_an_error() {
        assert!(SiteId::from_path(Path::new("/definitely/not/here/kickoff")).is_err());
    }

    #[test]
    fn default_state_dir_ends_with_hash() {
        let temp = TempDir::new().unwrap();
        let site = SiteId::from_path(temp.path()).unwrap();
        let dir = site.default_state_dir();
        assert!(dir.ends_with(Path::new("sites").join(site.hash())));
    }
}
