//! On-disk cache of extraction fragments.
//!
//! Entries are keyed by a SHA-256 of everything that determines the
//! collaborator's answer, so a rerun over an unchanged transcript reuses
//! every fragment. The cache never fails a run: unreadable entries are
//! misses and write errors are only logged.

use std::path::{Path, PathBuf};

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use bandsite_shared::Variant;

#[derive(Debug, Clone)]
pub struct FragmentCache {
    dir: PathBuf,
}

impl FragmentCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache key for one extraction call.
    pub fn key(variant: Variant, model: &str, system_prompt: &str, user_prompt: &str) -> String {
        let mut hasher = Sha256::new();
        for part in [variant.as_str(), model, system_prompt, user_prompt] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Cached fragment, or `None` when absent or unreadable.
    pub fn get(&self, key: &str) -> Option<Value> {
        let path = self.entry_path(key);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "ignoring corrupt cache entry");
                None
            }
        }
    }

    /// Store a fragment. Written to a temp file and renamed into place.
    pub fn put(&self, key: &str, fragment: &Value) {
        if let Err(e) = self.try_put(key, fragment) {
            warn!(dir = %self.dir.display(), error = %e, "failed to write cache entry");
        }
    }

    fn try_put(&self, key: &str, fragment: &Value) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let target = self.entry_path(key);
        let temp = self.dir.join(format!(".{key}.tmp"));
        std::fs::write(&temp, serde_json::to_vec(fragment)?)?;
        std::fs::rename(&temp, &target)
    }
}
