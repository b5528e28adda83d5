// Generic JSON-file backed record store shared by the hotel, customer and
// reservation managers.
//
// The file holds a single object mapping id -> record. Loading is all or
// nothing: any problem with the file or with a single record leaves the store
// empty rather than partially populated.

use std::{
    collections::{btree_map, BTreeMap},
    fs, io,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{EntityKind, StoreError};

/// A record that can live in a [`JsonStore`].
pub trait Record: Serialize + DeserializeOwned {
    const KIND: EntityKind;

    /// The unique key this record is stored under.
    fn id(&self) -> &str;

    /// Consistency check run on every record read from disk.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct JsonStore<T> {
    path: PathBuf,
    records: BTreeMap<String, T>,
}

impl<T: Record> JsonStore<T> {
    /// Opens the store at `path` and loads whatever it currently holds.
    ///
    /// A missing file yields an empty store. A malformed file is logged and
    /// also yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            path: path.into(),
            records: BTreeMap::new(),
        };
        store.reload();
        store
    }

    /// Replaces the in-memory records with the contents of the backing file.
    pub fn reload(&mut self) {
        self.records = match self.try_load() {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    kind = %T::KIND,
                    path = %self.path.display(),
                    error = %err,
                    "discarding stored records"
                );
                BTreeMap::new()
            }
        };
    }

    /// Reads the backing file without touching the in-memory records.
    pub fn try_load(&self) -> Result<BTreeMap<String, T>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(kind = %T::KIND, path = %self.path.display(), "no backing file yet");
                return Ok(BTreeMap::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let value: Value = serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let Value::Object(entries) = value else {
            return Err(StoreError::NotAnObject {
                path: self.path.clone(),
            });
        };

        let mut records = BTreeMap::new();
        let mut first_problem = None;

        for (id, raw) in entries {
            match decode::<T>(&id, raw) {
                Ok(record) => {
                    records.insert(id, record);
                }
                Err(reason) => {
                    warn!(
                        kind = %T::KIND,
                        path = %self.path.display(),
                        id = %id,
                        %reason,
                        "could not load record"
                    );
                    if first_problem.is_none() {
                        first_problem = Some(StoreError::InvalidRecord {
                            path: self.path.clone(),
                            id,
                            reason,
                        });
                    }
                }
            }
        }

        match first_problem {
            Some(err) => Err(err),
            None => {
                debug!(kind = %T::KIND, count = records.len(), "loaded records");
                Ok(records)
            }
        }
    }

    /// Writes every record to the backing file, replacing its contents.
    pub fn save(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let contents =
            serde_json::to_string_pretty(&self.records).map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, contents).map_err(io_err)?;

        debug!(kind = %T::KIND, count = self.records.len(), path = %self.path.display(), "saved records");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.records.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Inserts `record` under its own id, returning the record it replaced.
    pub fn insert(&mut self, record: T) -> Option<T> {
        self.records.insert(record.id().to_string(), record)
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        self.records.remove(id)
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, T> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn decode<T: Record>(key: &str, raw: Value) -> Result<T, String> {
    let record: T = serde_json::from_value(raw).map_err(|e| e.to_string())?;
    if record.id() != key {
        return Err(format!("key does not match record id '{}'", record.id()));
    }
    record.check()?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TempDir;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        note_id: String,
        text: String,
    }

    impl Record for Note {
        const KIND: EntityKind = EntityKind::Customer;

        fn id(&self) -> &str {
            &self.note_id
        }

        fn check(&self) -> Result<(), String> {
            if self.text.is_empty() {
                return Err("text is empty".to_string());
            }
            Ok(())
        }
    }

    fn note(id: &str, text: &str) -> Note {
        Note {
            note_id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = TempDir::new("store-missing");
        let store: JsonStore<Note> = JsonStore::open(dir.join("notes.json"));

        assert!(store.is_empty());
        assert!(!dir.join("notes.json").exists());
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = TempDir::new("store-roundtrip");
        let path = dir.join("notes.json");

        let mut store: JsonStore<Note> = JsonStore::open(&path);
        store.insert(note("n1", "first"));
        store.insert(note("n2", "second"));
        store.save().unwrap();

        let reopened: JsonStore<Note> = JsonStore::open(&path);
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get("n1"), Some(&note("n1", "first")));
        assert_eq!(reopened.get("n2"), Some(&note("n2", "second")));
    }

    #[test]
    fn test_saved_file_is_keyed_by_id() {
        let dir = TempDir::new("store-layout");
        let path = dir.join("notes.json");

        let mut store: JsonStore<Note> = JsonStore::open(&path);
        store.insert(note("n1", "first"));
        store.save().unwrap();

        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["n1"]["note_id"], "n1");
        assert_eq!(value["n1"]["text"], "first");
    }

    #[test]
    fn test_invalid_json_loads_empty() {
        let dir = TempDir::new("store-badjson");
        let path = dir.join("notes.json");
        fs::write(&path, "{ not json").unwrap();

        let store: JsonStore<Note> = JsonStore::open(&path);
        assert!(store.is_empty());
        assert!(matches!(store.try_load(), Err(StoreError::Json { .. })));
    }

    #[test]
    fn test_non_object_loads_empty() {
        let dir = TempDir::new("store-array");
        let path = dir.join("notes.json");
        fs::write(&path, r#"[{"note_id": "n1", "text": "x"}]"#).unwrap();

        let store: JsonStore<Note> = JsonStore::open(&path);
        assert!(store.is_empty());
        assert!(matches!(store.try_load(), Err(StoreError::NotAnObject { .. })));
    }

    #[test]
    fn test_one_bad_record_discards_everything() {
        let dir = TempDir::new("store-partial");
        let path = dir.join("notes.json");
        fs::write(
            &path,
            r#"{
                "n1": {"note_id": "n1", "text": "fine"},
                "n2": {"note_id": "n2"}
            }"#,
        )
        .unwrap();

        let store: JsonStore<Note> = JsonStore::open(&path);
        assert!(store.is_empty());

        match store.try_load() {
            Err(StoreError::InvalidRecord { id, .. }) => assert_eq!(id, "n2"),
            other => panic!("expected invalid record, got {:?}", other),
        }
    }

    #[test]
    fn test_key_mismatch_is_rejected() {
        let dir = TempDir::new("store-key");
        let path = dir.join("notes.json");
        fs::write(&path, r#"{"n1": {"note_id": "other", "text": "x"}}"#).unwrap();

        let store: JsonStore<Note> = JsonStore::open(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_check_is_rejected() {
        let dir = TempDir::new("store-check");
        let path = dir.join("notes.json");
        fs::write(&path, r#"{"n1": {"note_id": "n1", "text": ""}}"#).unwrap();

        let store: JsonStore<Note> = JsonStore::open(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = TempDir::new("store-parent");
        let path = dir.join("nested").join("notes.json");

        let mut store: JsonStore<Note> = JsonStore::open(&path);
        store.insert(note("n1", "first"));
        store.save().unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_save_to_directory_fails() {
        let dir = TempDir::new("store-unwritable");
        let path = dir.join("notes.json");
        fs::create_dir_all(&path).unwrap();

        let mut store: JsonStore<Note> = JsonStore::open(&path);
        assert!(store.is_empty());

        store.insert(note("n1", "first"));
        assert!(matches!(store.save(), Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_reload_discards_unsaved_changes() {
        let dir = TempDir::new("store-reload");
        let path = dir.join("notes.json");

        let mut store: JsonStore<Note> = JsonStore::open(&path);
        store.insert(note("n1", "saved"));
        store.save().unwrap();

        store.insert(note("n2", "unsaved"));
        store.remove("n1");
        store.reload();

        assert_eq!(store.len(), 1);
        assert!(store.contains("n1"));
        assert!(!store.contains("n2"));
    }
}
