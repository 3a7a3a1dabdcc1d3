// src/utils/storage.rs
use crate::models::ServiceError;
use lazy_static::lazy_static;
use log::{error, info, warn};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

lazy_static! {
    static ref RECORD_ID: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,128}$").unwrap();
}

pub const USERS: &str = "users";
pub const DOCUMENTS: &str = "documents";
pub const COLLABORATORS: &str = "collaborators";
pub const SHARE_LINKS: &str = "share_links";
pub const WORKSPACES: &str = "workspaces";
pub const MEMBERSHIPS: &str = "memberships";
pub const REFRESH_TOKENS: &str = "refresh_tokens";
pub const RESET_TOKENS: &str = "reset_tokens";

const COLLECTIONS: [&str; 8] = [
    USERS,
    DOCUMENTS,
    COLLABORATORS,
    SHARE_LINKS,
    WORKSPACES,
    MEMBERSHIPS,
    REFRESH_TOKENS,
    RESET_TOKENS,
];

/// JSON-file record store: one directory per collection, one file per record.
///
/// Services take `lock()` around read-modify-write sequences; the record
/// helpers themselves never lock.
#[derive(Clone)]
pub struct Storage {
    root: PathBuf,
    guard: Arc<Mutex<()>>,
}

pub fn is_valid_record_id(id: &str) -> bool {
    RECORD_ID.is_match(id)
}

fn io_error(context: &str, path: &Path, e: io::Error) -> ServiceError {
    error!("Failed to {} {}: {:?}", context, path.display(), e);
    ServiceError::InternalServerError
}

impl Storage {
    // Open the store, creating the collection directories
    pub fn open<P: Into<PathBuf>>(root: P) -> io::Result<Self> {
        let root = root.into();
        for collection in COLLECTIONS {
            let dir = root.join(collection);
            if !dir.exists() {
                info!("Creating storage directory {}", dir.display());
                fs::create_dir_all(&dir)?;
            }
        }
        Ok(Self {
            root,
            guard: Arc::new(Mutex::new(())),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, ()>, ServiceError> {
        self.guard.lock().map_err(|e| {
            error!("Storage lock poisoned: {:?}", e);
            ServiceError::InternalServerError
        })
    }

    fn record_path(&self, collection: &str, id: &str) -> PathBuf {
        self.root.join(collection).join(format!("{}.json", id))
    }

    pub(crate) fn write_record<T: Serialize>(
        &self,
        collection: &str,
        id: &str,
        record: &T,
    ) -> Result<(), ServiceError> {
        if !is_valid_record_id(id) {
            error!("Refusing to write record with unsafe id: {:?}", id);
            return Err(ServiceError::BadRequest("Invalid identifier".to_string()));
        }
        let path = self.record_path(collection, id);
        let json = serde_json::to_string_pretty(record).map_err(|e| {
            error!("Failed to serialize {} record {}: {:?}", collection, id, e);
            ServiceError::InternalServerError
        })?;

        // Write then rename so readers never see a half-written file
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| io_error("write", &tmp_path, e))?;
        fs::rename(&tmp_path, &path).map_err(|e| io_error("replace", &path, e))
    }

    pub(crate) fn read_record<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>, ServiceError> {
        if !is_valid_record_id(id) {
            return Ok(None);
        }
        let path = self.record_path(collection, id);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| io_error("read", &path, e))?;
        let record = serde_json::from_str(&content).map_err(|e| {
            error!("Failed to parse {}: {:?}", path.display(), e);
            ServiceError::InternalServerError
        })?;
        Ok(Some(record))
    }

    pub(crate) fn delete_record(&self, collection: &str, id: &str) -> Result<bool, ServiceError> {
        if !is_valid_record_id(id) {
            return Ok(false);
        }
        let path = self.record_path(collection, id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| io_error("delete", &path, e))?;
        Ok(true)
    }

    // Every parseable record in a collection; corrupt files are skipped
    pub(crate) fn list_records<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Vec<T>, ServiceError> {
        let dir = self.root.join(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry_result in fs::read_dir(&dir).map_err(|e| io_error("list", &dir, e))? {
            let entry = entry_result.map_err(|e| io_error("list", &dir, e))?;
            let path = entry.path();
            if !path.is_file() || path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            let content = fs::read_to_string(&path).map_err(|e| io_error("read", &path, e))?;
            match serde_json::from_str(&content) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable record {}: {:?}", path.display(), e),
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Note {
        id: String,
        body: String,
    }

    #[test]
    fn write_read_delete_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let note = Note {
            id: "n1".to_string(),
            body: "hello".to_string(),
        };

        storage.write_record(DOCUMENTS, &note.id, &note).unwrap();
        let loaded: Option<Note> = storage.read_record(DOCUMENTS, "n1").unwrap();
        assert_eq!(loaded, Some(note));

        assert!(storage.delete_record(DOCUMENTS, "n1").unwrap());
        assert!(!storage.delete_record(DOCUMENTS, "n1").unwrap());
    }

    #[test]
    fn traversal_ids_are_never_touched() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let loaded: Option<Note> = storage.read_record(USERS, "../users/x").unwrap();
        assert!(loaded.is_none());
        let written = storage.write_record(USERS, "../escape", &"x");
        assert!(matches!(written, Err(ServiceError::BadRequest(_))));
    }

    #[test]
    fn corrupt_records_are_skipped_when_listing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        storage
            .write_record(
                DOCUMENTS,
                "good",
                &Note {
                    id: "good".to_string(),
                    body: "ok".to_string(),
                },
            )
            .unwrap();
        fs::write(dir.path().join(DOCUMENTS).join("bad.json"), "{not json").unwrap();

        let notes: Vec<Note> = storage.list_records(DOCUMENTS).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, "good");
    }
}
