//! Local event storage.
//!
//! Events live in a single JSON file. The store owns id assignment: ids are
//! never reused while the file exists, and the counter resumes at
//! `max(id) + 1` after a reload.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{CalibridgeError, CalibridgeResult};
use crate::event::{Event, NewEvent};

/// Result of importing decoded events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Nothing importable was found; the store is unchanged
    NothingFound,
    /// Ids assigned to the imported events, in file order
    Imported(Vec<u64>),
}

impl ImportOutcome {
    pub fn count(&self) -> usize {
        match self {
            ImportOutcome::NothingFound => 0,
            ImportOutcome::Imported(ids) => ids.len(),
        }
    }
}

pub struct EventStore {
    path: PathBuf,
    events: Vec<Event>,
    next_id: u64,
}

impl EventStore {
    /// Load the store at `path`. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> CalibridgeResult<Self> {
        let path = path.into();

        let events: Vec<Event> = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|e| {
                CalibridgeError::Serialization(format!("{}: {e}", path.display()))
            })?
        } else {
            Vec::new()
        };

        let next_id = events.iter().map(|e| e.id).max().map_or(1, |max| max + 1);
        debug!(path = %path.display(), events = events.len(), "Loaded event store");

        Ok(EventStore {
            path,
            events,
            next_id,
        })
    }

    /// Write all events back to disk, creating the parent directory if needed.
    pub fn save(&self) -> CalibridgeResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.events)
            .map_err(|e| CalibridgeError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, content)?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All events, ordered by start time.
    pub fn events(&self) -> Vec<&Event> {
        let mut events: Vec<&Event> = self.events.iter().collect();
        events.sort_by_key(|e| (e.start(), e.id));
        events
    }

    /// All events, cloned, in storage order (for export).
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.clone()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: u64) -> CalibridgeResult<&Event> {
        self.events
            .iter()
            .find(|e| e.id == id)
            .ok_or(CalibridgeError::EventNotFound(id))
    }

    /// Validate and insert a new event, returning its id.
    pub fn add(&mut self, details: NewEvent) -> CalibridgeResult<u64> {
        let details = validate(details)?;
        Ok(self.insert(details))
    }

    /// Replace the details of an existing event, keeping its id.
    pub fn update(&mut self, id: u64, details: NewEvent) -> CalibridgeResult<()> {
        let details = validate(details)?;
        let event = self
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(CalibridgeError::EventNotFound(id))?;

        event.details = details;
        Ok(())
    }

    pub fn delete(&mut self, id: u64) -> CalibridgeResult<Event> {
        let index = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or(CalibridgeError::EventNotFound(id))?;

        Ok(self.events.remove(index))
    }

    /// Copy an event under a new id, with " (Copy)" appended to its name.
    pub fn duplicate(&mut self, id: u64) -> CalibridgeResult<u64> {
        let mut details = self.get(id)?.details.clone();
        details.name.push_str(" (Copy)");
        Ok(self.insert(details))
    }

    /// Remove every event, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.events.len();
        self.events.clear();
        count
    }

    /// Add decoded events, all at once.
    ///
    /// Decoded events are inserted as-is; the decoder already guarantees a
    /// start and an end.
    pub fn import(&mut self, decoded: Vec<NewEvent>) -> ImportOutcome {
        if decoded.is_empty() {
            return ImportOutcome::NothingFound;
        }

        let ids: Vec<u64> = decoded.into_iter().map(|d| self.insert(d)).collect();
        info!(count = ids.len(), "Imported events");
        ImportOutcome::Imported(ids)
    }

    fn insert(&mut self, details: NewEvent) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.events.push(details.with_id(id));
        id
    }
}

/// Name is required and trimmed; the end may not precede the start.
fn validate(mut details: NewEvent) -> CalibridgeResult<NewEvent> {
    details.name = details.name.trim().to_string();
    if details.name.is_empty() {
        return Err(CalibridgeError::Validation("name is required".into()));
    }

    if details.datetime_end < details.datetime_start {
        return Err(CalibridgeError::Validation(
            "end date cannot be before start".into(),
        ));
    }

    Ok(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn empty_store() -> (tempfile::TempDir, EventStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::load(dir.path().join("events.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_add_assigns_increasing_ids() {
        let (_dir, mut store) = empty_store();
        let a = store.add(NewEvent::new("A", at(2, 9), at(2, 10))).unwrap();
        let b = store.add(NewEvent::new("B", at(1, 9), at(1, 10))).unwrap();

        assert_eq!((a, b), (1, 2));
        let names: Vec<&str> = store.events().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["B", "A"], "events() is sorted by start");
    }

    #[test]
    fn test_add_validates() {
        let (_dir, mut store) = empty_store();

        let err = store.add(NewEvent::new("  ", at(2, 9), at(2, 10))).unwrap_err();
        assert!(matches!(err, CalibridgeError::Validation(_)));

        let err = store.add(NewEvent::new("Backwards", at(2, 10), at(2, 9))).unwrap_err();
        assert!(matches!(err, CalibridgeError::Validation(_)));

        let id = store.add(NewEvent::new("  Trimmed ", at(2, 9), at(2, 9))).unwrap();
        assert_eq!(store.get(id).unwrap().name(), "Trimmed");
    }

    #[test]
    fn test_save_and_reload_resumes_counter() {
        let (dir, mut store) = empty_store();
        store.add(NewEvent::new("A", at(2, 9), at(2, 10))).unwrap();
        let b = store.add(NewEvent::new("B", at(2, 9), at(2, 10))).unwrap();
        store.delete(1).unwrap();
        store.save().unwrap();

        let mut reloaded = EventStore::load(dir.path().join("events.json")).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get(b).unwrap().name(), "B");
        assert_eq!(reloaded.add(NewEvent::new("C", at(2, 9), at(2, 10))).unwrap(), 3);
    }

    #[test]
    fn test_update_delete_unknown_id() {
        let (_dir, mut store) = empty_store();
        let details = NewEvent::new("A", at(2, 9), at(2, 10));

        assert!(matches!(
            store.update(9, details),
            Err(CalibridgeError::EventNotFound(9))
        ));
        assert!(matches!(store.delete(9), Err(CalibridgeError::EventNotFound(9))));
    }

    #[test]
    fn test_update_keeps_id() {
        let (_dir, mut store) = empty_store();
        let id = store.add(NewEvent::new("A", at(2, 9), at(2, 10))).unwrap();
        store.update(id, NewEvent::new("Renamed", at(3, 9), at(3, 10))).unwrap();

        let event = store.get(id).unwrap();
        assert_eq!(event.name(), "Renamed");
        assert_eq!(event.start(), at(3, 9));
    }

    #[test]
    fn test_duplicate_copies_reminders_under_new_id() {
        let (_dir, mut store) = empty_store();
        let mut details = NewEvent::new("Standup", at(2, 9), at(2, 10));
        details.reminders = vec!["-PT5M".into()];
        let id = store.add(details).unwrap();

        let copy = store.duplicate(id).unwrap();
        assert_ne!(copy, id);
        let copied = store.get(copy).unwrap();
        assert_eq!(copied.name(), "Standup (Copy)");
        assert_eq!(copied.details.reminders, vec!["-PT5M"]);
    }

    #[test]
    fn test_import_empty_is_nothing_found() {
        let (_dir, mut store) = empty_store();
        assert_eq!(store.import(Vec::new()), ImportOutcome::NothingFound);
        assert!(store.is_empty());
    }

    #[test]
    fn test_import_assigns_ids() {
        let (_dir, mut store) = empty_store();
        store.add(NewEvent::new("Existing", at(2, 9), at(2, 10))).unwrap();

        let outcome = store.import(vec![
            NewEvent::new("One", at(3, 9), at(3, 10)),
            NewEvent::new("Two", at(4, 9), at(4, 10)),
        ]);

        assert_eq!(outcome, ImportOutcome::Imported(vec![2, 3]));
        assert_eq!(outcome.count(), 2);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_clear() {
        let (_dir, mut store) = empty_store();
        store.add(NewEvent::new("A", at(2, 9), at(2, 10))).unwrap();
        store.add(NewEvent::new("B", at(2, 9), at(2, 10))).unwrap();

        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            EventStore::load(&path),
            Err(CalibridgeError::Serialization(_))
        ));
    }
}
