//! JSON persistence for editor state.
//!
//! Layout under the data directory:
//!
//! ```text
//! positions.json          list of positions
//! events/{id}.json        one file per event instance, with its assignments
//! person_photos.json      person name -> image file name
//! published.json          last published snapshot
//! ```
//!
//! Missing files load as empty state. Writes go to a temporary file that is
//! renamed over the target, so a crash never leaves half a JSON document.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use vox_core::models::{EventInstance, Position};
use vox_core::snapshot::PublishedSnapshot;
use vox_core::types::EventId;

use crate::error::StorageError;

const POSITIONS_FILE: &str = "positions.json";
const PERSON_PHOTOS_FILE: &str = "person_photos.json";
const PUBLISHED_FILE: &str = "published.json";
const EVENTS_DIR: &str = "events";

/// Persisted editor state rooted at one data directory.
#[derive(Debug, Clone)]
pub struct StateStore {
    root: PathBuf,
}

impl StateStore {
    /// Open (and create if needed) a data directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(root.join(EVENTS_DIR))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // -- Positions ----------------------------------------------------------

    pub fn load_positions(&self) -> Result<Vec<Position>, StorageError> {
        Ok(read_json(&self.root.join(POSITIONS_FILE))?.unwrap_or_default())
    }

    pub fn save_positions(&self, positions: &[Position]) -> Result<(), StorageError> {
        write_json(&self.root.join(POSITIONS_FILE), &positions)
    }

    // -- Events -------------------------------------------------------------

    /// Load every event file. Unreadable files are skipped with a warning.
    pub fn load_events(&self) -> Result<Vec<EventInstance>, StorageError> {
        let mut events = Vec::new();

        for entry in fs::read_dir(self.root.join(EVENTS_DIR))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_json::<EventInstance>(&path) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Skipping unreadable event file"
                    );
                }
            }
        }

        events.sort_by_key(|e| e.service_date);
        Ok(events)
    }

    pub fn save_event(&self, event: &EventInstance) -> Result<(), StorageError> {
        write_json(&self.event_path(event.id), event)
    }

    fn event_path(&self, id: EventId) -> PathBuf {
        self.root.join(EVENTS_DIR).join(format!("{id}.json"))
    }

    // -- Person photos ------------------------------------------------------

    pub fn load_person_photos(&self) -> Result<BTreeMap<String, String>, StorageError> {
        Ok(read_json(&self.root.join(PERSON_PHOTOS_FILE))?.unwrap_or_default())
    }

    pub fn save_person_photos(
        &self,
        photos: &BTreeMap<String, String>,
    ) -> Result<(), StorageError> {
        write_json(&self.root.join(PERSON_PHOTOS_FILE), photos)
    }

    // -- Published snapshot -------------------------------------------------

    pub fn load_published(&self) -> Result<Option<PublishedSnapshot>, StorageError> {
        read_json(&self.root.join(PUBLISHED_FILE))
    }

    pub fn save_published(&self, snapshot: &PublishedSnapshot) -> Result<(), StorageError> {
        write_json(&self.root.join(PUBLISHED_FILE), snapshot)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read and parse a JSON file; a missing file is `Ok(None)`.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Serialize to a sibling temp file, then rename over `path`.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use vox_core::models::Assignment;
    use vox_core::snapshot::project;

    use super::*;

    fn store() -> (tempfile::TempDir, StateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::open(dir.path().join("data")).unwrap();
        (dir, store)
    }

    #[test]
    fn empty_directory_loads_empty_state() {
        let (_dir, store) = store();
        assert!(store.load_positions().unwrap().is_empty());
        assert!(store.load_events().unwrap().is_empty());
        assert!(store.load_person_photos().unwrap().is_empty());
        assert!(store.load_published().unwrap().is_none());
    }

    #[test]
    fn positions_and_photos_persist() {
        let (_dir, store) = store();
        let mut position = Position::new(1);
        position.label = Some("Soprano".into());
        store.save_positions(&[position.clone()]).unwrap();

        let photos = BTreeMap::from([("Alice".to_string(), "a.jpg".to_string())]);
        store.save_person_photos(&photos).unwrap();

        assert_eq!(store.load_positions().unwrap(), vec![position]);
        assert_eq!(store.load_person_photos().unwrap(), photos);
    }

    #[test]
    fn events_persist_one_file_each_sorted_by_date() {
        let (_dir, store) = store();
        let later =
            EventInstance::new("Later", Utc.with_ymd_and_hms(2026, 11, 1, 9, 0, 0).unwrap());
        let mut sooner =
            EventInstance::new("Sooner", Utc.with_ymd_and_hms(2026, 10, 25, 9, 0, 0).unwrap());
        let position = Position::new(1);
        let mut assignment = Assignment::empty(position.id);
        assignment.operator_name = Some("Alice".into());
        sooner.assignments.push(assignment);

        store.save_event(&later).unwrap();
        store.save_event(&sooner).unwrap();
        // Saving again overwrites rather than duplicating.
        store.save_event(&sooner).unwrap();

        let events = store.load_events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], sooner);
        assert_eq!(events[1], later);
    }

    #[test]
    fn corrupt_event_file_is_skipped() {
        let (_dir, store) = store();
        let good = EventInstance::new("Good", Utc.with_ymd_and_hms(2026, 10, 25, 9, 0, 0).unwrap());
        store.save_event(&good).unwrap();
        fs::write(store.root().join(EVENTS_DIR).join("broken.json"), b"{ not json").unwrap();

        let events = store.load_events().unwrap();
        assert_eq!(events, vec![good]);
    }

    #[test]
    fn published_snapshot_round_trips() {
        let (_dir, store) = store();
        let positions = vec![Position::new(1)];
        let event =
            EventInstance::new("Sunday", Utc.with_ymd_and_hms(2026, 10, 25, 9, 0, 0).unwrap());
        let snapshot = project(&event, &positions, &BTreeMap::new());

        store.save_published(&snapshot).unwrap();

        assert_eq!(store.load_published().unwrap(), Some(snapshot));
    }

    #[test]
    fn corrupt_positions_file_is_an_error() {
        let (_dir, store) = store();
        fs::write(store.root().join(POSITIONS_FILE), b"[{").unwrap();
        assert_matches!(store.load_positions(), Err(StorageError::Json(_)));
    }
}
