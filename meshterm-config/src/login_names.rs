//! Persisted login names keyed by device display identity.
//!
//! The store is best-effort: a missing, unreadable or corrupt file behaves
//! like an empty store, and write failures are logged and otherwise ignored.
//! Callers never see an error from this module.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Remembered login names used to prefill the credential prompt.
#[derive(Debug, Default)]
pub struct LoginNameStore {
    /// Backing file, or `None` for an in-memory store
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl LoginNameStore {
    /// Open a file-backed store. Unreadable or corrupt files start empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("Ignoring corrupt login name store {:?}: {}", path, e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!("Failed to read login name store {:?}: {}", path, e);
                BTreeMap::new()
            }
        };

        Self {
            path: Some(path),
            entries,
        }
    }

    /// Create a store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Remembered login name for a device.
    pub fn get(&self, device: &str) -> Option<&str> {
        self.entries.get(device).map(String::as_str)
    }

    /// Remember a login name for a device. Empty names are ignored.
    pub fn set(&mut self, device: &str, login: &str) {
        if device.is_empty() || login.is_empty() {
            return;
        }
        if self.get(device) == Some(login) {
            return;
        }
        self.entries.insert(device.to_string(), login.to_string());
        self.persist();
    }

    /// Forget the login name for a device.
    pub fn delete(&mut self, device: &str) {
        if self.entries.remove(device).is_some() {
            self.persist();
        }
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_entries(path, &self.entries) {
            log::warn!("Failed to persist login names to {:?}: {}", path, e);
        }
    }
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(entries)?;
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, json)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn set_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("login_names.json");

        let mut store = LoginNameStore::open(&path);
        store.set("web-1.tail.ts.net", "deploy");

        let reopened = LoginNameStore::open(&path);
        assert_eq!(reopened.get("web-1.tail.ts.net"), Some("deploy"));
    }

    #[test]
    fn delete_forgets_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("login_names.json");

        let mut store = LoginNameStore::open(&path);
        store.set("db", "postgres");
        store.delete("db");
        assert_eq!(store.get("db"), None);
        assert_eq!(LoginNameStore::open(&path).get("db"), None);
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("login_names.json");
        fs::write(&path, "{not json").unwrap();

        let store = LoginNameStore::open(&path);
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn unwritable_location_does_not_fail() {
        let dir = TempDir::new().unwrap();
        // A regular file where the parent directory should be makes writes fail.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let mut store = LoginNameStore::open(blocker.join("login_names.json"));
        store.set("host", "admin");
        assert_eq!(store.get("host"), Some("admin"));
    }

    #[test]
    fn empty_values_are_ignored() {
        let mut store = LoginNameStore::in_memory();
        store.set("host", "");
        store.set("", "root");
        assert_eq!(store.get("host"), None);
        assert_eq!(store.path(), None);
    }
}
