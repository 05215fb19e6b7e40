use async_trait::async_trait;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::repository::{LocalStore, StoreError};

/// On-device `LocalStore` keeping one JSON file per key under a directory.
///
/// Payloads are small (one session snapshot, one progress record, one word
/// list), so writes go through a temp file rename for atomicity rather than
/// anything heavier.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(connection)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys come from the fixed `keys` namespace; escape separators so a
        // hostile student id cannot traverse out of the store directory.
        let safe: String = key
            .chars()
            .map(|c| if c == '/' || c == '\\' || c == '.' { '_' } else { c })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

fn connection(err: io::Error) -> StoreError {
    StoreError::Connection(err.to_string())
}

#[async_trait]
impl LocalStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(connection(err)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(connection)?;
        fs::rename(&tmp, &path).map_err(connection)
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(connection(err)),
        }
    }
}

impl AsRef<Path> for JsonFileStore {
    fn as_ref(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn values_survive_reopening_the_store() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonFileStore::open(dir.path()).unwrap();
            store.set("vocabulary_session", "{\"a\":1}").await.unwrap();
        }
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(
            store.get("vocabulary_session").await.unwrap().as_deref(),
            Some("{\"a\":1}")
        );
    }

    #[tokio::test]
    async fn absent_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert!(store.get("missing").await.unwrap().is_none());
        store.remove("missing").await.unwrap();
    }

    #[tokio::test]
    async fn hostile_key_stays_inside_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        store.set("../escape", "x").await.unwrap();
        assert_eq!(store.get("../escape").await.unwrap().as_deref(), Some("x"));
        assert!(store.path_for("../escape").starts_with(dir.path()));
    }
}
