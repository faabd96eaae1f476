//! Persistent tag storage
//!
//! Tags map a short name to a filesystem path. The store is a flat file
//! of `name=path` lines terminated by a single blank line; the blank
//! line is a sentinel, not a record. The file is rewritten in full on
//! every mutation, inside the daemon's critical section.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub path: String,
}

pub struct TagStore {
    entries: Vec<Tag>,
    file: PathBuf,
}

impl TagStore {
    /// Load the store from a tag file. A missing file is an empty
    /// store; an unreadable file refuses to load.
    pub fn load(file: impl Into<PathBuf>) -> Result<Self> {
        let file = file.into();
        let mut store = Self {
            entries: Vec::new(),
            file,
        };

        let content = match fs::read_to_string(&store.file) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No tag file at {}, starting empty", store.file.display());
                return Ok(store);
            }
            Err(e) => {
                return Err(Error::Storage(format!(
                    "cannot read {}: {}",
                    store.file.display(),
                    e
                )));
            }
        };

        for line in content.lines() {
            // Blank line terminates the file
            if line.is_empty() {
                break;
            }

            let Some((name, path)) = line.split_once('=') else {
                warn!("Skipping malformed tag line: {line:?}");
                continue;
            };
            store.upsert(name.trim(), path.trim());
        }

        info!(
            count = store.entries.len(),
            "Loaded tags from {}",
            store.file.display()
        );

        Ok(store)
    }

    fn upsert(&mut self, name: &str, path: &str) -> bool {
        match self.entries.iter_mut().find(|t| t.name == name) {
            Some(tag) => {
                tag.path = path.to_string();
                true
            }
            None => {
                self.entries.push(Tag {
                    name: name.to_string(),
                    path: path.to_string(),
                });
                false
            }
        }
    }

    /// Upsert a tag and persist. The in-memory store is rolled back if
    /// the write fails, so no unacknowledged mutation survives.
    pub fn add(&mut self, name: &str, path: &str) -> Result<()> {
        let snapshot = self.entries.clone();
        let updated = self.upsert(name, path);

        if let Err(e) = self.persist() {
            self.entries = snapshot;
            return Err(e);
        }

        if updated {
            info!("Tag '{name}' updated --> {path}");
        } else {
            info!("Tag '{name}' added --> {path}");
        }
        Ok(())
    }

    /// Look up a tag by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.path.as_str())
    }

    /// Remove a tag and persist. Returns false if the name was absent,
    /// which is a well-defined negative outcome rather than an error.
    pub fn delete(&mut self, name: &str) -> Result<bool> {
        let snapshot = self.entries.clone();
        let before = self.entries.len();
        self.entries.retain(|t| t.name != name);
        if self.entries.len() == before {
            return Ok(false);
        }

        if let Err(e) = self.persist() {
            self.entries = snapshot;
            return Err(e);
        }

        info!("Tag '{name}' deleted");
        Ok(true)
    }

    /// All pairs as `name --> path` lines, insertion order
    pub fn format_all(&self) -> String {
        self.entries
            .iter()
            .map(|t| format!("{} --> {}", t.name, t.path))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Tag names, space separated, insertion order
    pub fn names(&self) -> String {
        self.entries
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Atomically rewrite the tag file: all entries in order, then the
    /// blank-line sentinel. Goes through a temp file and a rename so a
    /// concurrent reader never sees a partial write.
    pub fn persist(&self) -> Result<()> {
        let tmp = self.file.with_extension("tmp");

        let write = || -> std::io::Result<()> {
            let mut f = fs::File::create(&tmp)?;
            for tag in &self.entries {
                writeln!(f, "{}={}", tag.name, tag.path)?;
            }
            writeln!(f)?;
            f.sync_all()?;
            fs::rename(&tmp, &self.file)
        };

        write().map_err(|e| {
            let _ = fs::remove_file(&tmp);
            Error::Storage(format!("cannot write {}: {}", self.file.display(), e))
        })
    }

    #[cfg(test)]
    pub(crate) fn file_path(&self) -> &std::path::Path {
        &self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_store() -> (tempfile::TempDir, TagStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TagStore::load(dir.path().join("tags")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let (_dir, store) = scratch_store();
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_get_delete() {
        let (_dir, mut store) = scratch_store();

        store.add("test", "/tmp/").unwrap();
        assert_eq!(store.get("test"), Some("/tmp/"));

        assert!(store.delete("test").unwrap());
        assert_eq!(store.get("test"), None);
    }

    #[test]
    fn test_delete_absent_is_negative_not_error() {
        let (_dir, mut store) = scratch_store();
        assert!(!store.delete("nope").unwrap());
    }

    #[test]
    fn test_add_overwrites_existing_name() {
        let (_dir, mut store) = scratch_store();

        store.add("proj", "/home/a").unwrap();
        store.add("proj", "/home/b").unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("proj"), Some("/home/b"));
    }

    #[test]
    fn test_format_all_preserves_insertion_order() {
        let (_dir, mut store) = scratch_store();

        store.add("b", "/2").unwrap();
        store.add("a", "/1").unwrap();

        assert_eq!(store.format_all(), "b --> /2\na --> /1");
        assert_eq!(store.names(), "b a");
    }

    #[test]
    fn test_file_ends_with_single_blank_line() {
        let (_dir, mut store) = scratch_store();

        // Zero entries
        store.persist().unwrap();
        let content = std::fs::read_to_string(store.file_path()).unwrap();
        assert_eq!(content, "\n");

        // One entry
        store.add("test", "/tmp/").unwrap();
        let content = std::fs::read_to_string(store.file_path()).unwrap();
        assert_eq!(content, "test=/tmp/\n\n");

        // Several entries
        store.add("home", "/home/").unwrap();
        let content = std::fs::read_to_string(store.file_path()).unwrap();
        assert_eq!(content, "test=/tmp/\nhome=/home/\n\n");
    }

    #[test]
    fn test_failed_persist_rolls_back_memory() {
        let (dir, mut store) = scratch_store();
        store.add("home", "/home/").unwrap();

        // Block the temp file path so the next rewrite cannot start
        std::fs::create_dir(dir.path().join("tags.tmp")).unwrap();

        assert!(store.add("new", "/tmp/").is_err());
        assert_eq!(store.get("new"), None);
        assert_eq!(store.get("home"), Some("/home/"));
        assert_eq!(store.len(), 1);

        assert!(store.delete("home").is_err());
        assert_eq!(store.get("home"), Some("/home/"));

        // Disk still holds the last acknowledged state
        let content = std::fs::read_to_string(store.file_path()).unwrap();
        assert_eq!(content, "home=/home/\n\n");
    }

    #[test]
    fn test_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tags");

        let mut store = TagStore::load(&file).unwrap();
        store.add("test", "/tmp/").unwrap();
        store.add("home", "/home/").unwrap();

        let reloaded = TagStore::load(&file).unwrap();
        assert_eq!(reloaded.get("test"), Some("/tmp/"));
        assert_eq!(reloaded.get("home"), Some("/home/"));
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_load_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tags");
        std::fs::write(&file, "good=/tmp/\nno separator here\n\n").unwrap();

        let store = TagStore::load(&file).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("good"), Some("/tmp/"));
    }

    #[test]
    fn test_load_stops_at_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tags");
        std::fs::write(&file, "kept=/tmp/\n\nignored=/home/\n").unwrap();

        let store = TagStore::load(&file).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("ignored"), None);
    }
}
