use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

/// Query parameter that mirrors the dashboard's search box.
pub const SEARCH_PARAM: &str = "search";

/// The dashboard's location query string, kept across reloads.
pub trait QueryStore: Send {
    fn get(&self, key: &str) -> Option<String>;

    /// Replaces the whole query with `params`, like assigning a new query
    /// string to the location.
    fn replace(&mut self, params: &[(&str, &str)]) -> Result<()>;

    fn to_query_string(&self) -> String;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryQueryStore {
    params: Vec<(String, String)>,
}

impl MemoryQueryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `a=1&b=2`; a leading `?` is accepted.
    pub fn from_query(query: &str) -> Result<Self> {
        let query = query.trim().trim_start_matches('?');
        let params: Vec<(String, String)> =
            serde_urlencoded::from_str(query).context("Malformed query string")?;
        Ok(Self { params })
    }
}

impl QueryStore for MemoryQueryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    fn replace(&mut self, params: &[(&str, &str)]) -> Result<()> {
        self.params = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Ok(())
    }

    fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(&self.params).unwrap_or_default()
    }
}

/// Query store persisted as an urlencoded line in a file.
#[derive(Debug)]
pub struct FileQueryStore {
    path: PathBuf,
    inner: MemoryQueryStore,
}

impl FileQueryStore {
    /// Opens the store at `path`. A missing file is an empty query; an
    /// unreadable one is logged and treated as empty.
    pub fn open(path: &Path) -> Result<Self> {
        let inner = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            MemoryQueryStore::from_query(&contents).unwrap_or_else(|e| {
                debug!("Ignoring stored location {}: {}", path.display(), e);
                MemoryQueryStore::new()
            })
        } else {
            MemoryQueryStore::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QueryStore for FileQueryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn replace(&mut self, params: &[(&str, &str)]) -> Result<()> {
        self.inner.replace(params)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, self.inner.to_query_string() + "\n")
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    fn to_query_string(&self) -> String {
        self.inner.to_query_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_parse_and_replace() {
        let mut store = MemoryQueryStore::from_query("?search=road+map&page=2").unwrap();
        assert_eq!(store.get(SEARCH_PARAM).as_deref(), Some("road map"));
        assert_eq!(store.get("page").as_deref(), Some("2"));

        store.replace(&[(SEARCH_PARAM, "q&a")]).unwrap();
        assert_eq!(store.get(SEARCH_PARAM).as_deref(), Some("q&a"));
        assert_eq!(store.get("page"), None);
        assert_eq!(store.to_query_string(), "search=q%26a");
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("location");

        let mut store = FileQueryStore::open(&path).unwrap();
        assert_eq!(store.get(SEARCH_PARAM), None);
        store.replace(&[(SEARCH_PARAM, "launch plan")]).unwrap();

        let reopened = FileQueryStore::open(&path).unwrap();
        assert_eq!(reopened.get(SEARCH_PARAM).as_deref(), Some("launch plan"));
    }

    #[test]
    fn test_file_store_tolerates_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("location");
        std::fs::write(&path, "%%%=\u{0}&&").unwrap();

        let store = FileQueryStore::open(&path).unwrap();
        assert_eq!(store.get(SEARCH_PARAM), None);
    }
}
