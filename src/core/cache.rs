//! Local key/value cache for serialized documents
//!
//! Each key maps to one JSON file in the application's data directory. The
//! cache backs fast startup and serves as the fallback for shared snapshots
//! when the remote store cannot be reached.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// Slot holding the owner's last saved document
pub const PORTFOLIO_KEY: &str = "portfolio-data";

/// Slot holding a fetched shared snapshot
pub fn shared_key(snapshot_id: &str) -> String {
    format!("shared_portfolio_{snapshot_id}")
}

/// Directory-backed cache
#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    /// Cache rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache in the platform data directory
    pub fn open_default() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "folio", "Folio")
            .context("Could not determine data directory")?;
        Ok(Self::new(dirs.data_dir().join("cache")))
    }

    /// File for `key`; bytes outside `[A-Za-z0-9._-]` become `%XX`, so
    /// distinct keys never share a file and no key leaves the directory
    fn slot_path(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.') {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("%{byte:02X}"));
            }
        }
        self.dir.join(format!("{name}.json"))
    }

    /// Read the slot for `key`, `None` when it was never written
    pub fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache slot: {}", path.display()))?;
        Ok(Some(content))
    }

    /// Replace the slot for `key`
    pub fn write(&self, key: &str, content: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create cache dir: {}", self.dir.display()))?;

        let path = self.slot_path(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, content)
            .with_context(|| format!("Failed to write cache slot: {}", staging.display()))?;
        fs::rename(&staging, &path)
            .with_context(|| format!("Failed to replace cache slot: {}", path.display()))?;

        tracing::debug!("Cached {} bytes under {}", content.len(), key);
        Ok(())
    }

    /// Drop the slot for `key` if present
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.slot_path(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove cache slot: {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_slot_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path().join("cache"));
        assert_eq!(cache.read(PORTFOLIO_KEY).unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path().join("nested/cache"));

        cache.write(PORTFOLIO_KEY, r#"{"name":"Ada"}"#).unwrap();
        cache.write(PORTFOLIO_KEY, r#"{"name":"Grace"}"#).unwrap();

        assert_eq!(
            cache.read(PORTFOLIO_KEY).unwrap().as_deref(),
            Some(r#"{"name":"Grace"}"#)
        );
    }

    #[test]
    fn test_keys_cannot_escape_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path());

        let key = shared_key("../../etc/passwd");
        cache.write(&key, "{}").unwrap();

        let slot = cache.slot_path(&key);
        assert_eq!(slot.parent(), Some(dir.path()));
        assert_eq!(cache.read(&key).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_similar_keys_use_separate_slots() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path());

        cache.write(&shared_key("a_b"), r#"{"name":"Alice B"}"#).unwrap();
        assert_eq!(cache.read(&shared_key("a.b")).unwrap(), None);

        cache.write(&shared_key("a.b"), r#"{"name":"Ada B"}"#).unwrap();
        cache.remove(&shared_key("a.b")).unwrap();
        assert_eq!(
            cache.read(&shared_key("a_b")).unwrap().as_deref(),
            Some(r#"{"name":"Alice B"}"#)
        );
        assert_ne!(cache.slot_path("a%2Fb"), cache.slot_path("a/b"));
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path());
        cache.write("slot", "{}").unwrap();
        cache.remove("slot").unwrap();
        cache.remove("slot").unwrap();
        assert_eq!(cache.read("slot").unwrap(), None);
    }
}
