//! JSON file cache mirroring the in-memory collections.
//!
//! Each key maps to `<dir>/<key>.json`. Reads never fail: a missing or
//! malformed file means there is no cached data.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Cache key of the card collection.
pub const CARDS_KEY: &str = "flashcards";
/// Cache key of the paraphrase collection.
pub const PARAPHRASES_KEY: &str = "paraphrases";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Cache encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    /// Open the cache rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read the list stored under `key`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        let path = self.path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read cache");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(items) => Some(items),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring malformed cache entry");
                None
            }
        }
    }

    /// Replace the list stored under `key`.
    pub fn store<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), CacheError> {
        let content = serde_json::to_string(items)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::open(dir.path()).unwrap();

        cache.store(CARDS_KEY, &["a".to_string(), "b".to_string()]).unwrap();
        let loaded: Option<Vec<String>> = cache.load(CARDS_KEY);
        assert_eq!(loaded, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(dir.path().join("flashcards.json").exists());
    }

    #[test]
    fn missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::open(dir.path().join("nested")).unwrap();
        let loaded: Option<Vec<String>> = cache.load(PARAPHRASES_KEY);
        assert_eq!(loaded, None);
    }

    #[test]
    fn malformed_content_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::open(dir.path()).unwrap();
        fs::write(dir.path().join("flashcards.json"), "{not json").unwrap();

        let loaded: Option<Vec<String>> = cache.load(CARDS_KEY);
        assert_eq!(loaded, None);
    }
}
