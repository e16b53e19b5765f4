//! Generic CRUD-with-index engine shared by the three repositories.

use std::marker::PhantomData;
use std::sync::Arc;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::DataError;
use crate::storage::DataStorage;

/// A record type persistable through an [`IndexedRepository`].
///
/// Binds the three per-collection parameters: the well-known index key, the
/// not-found message, and the rule deriving a storage key from a record.
pub trait StoredRecord: Serialize + DeserializeOwned {
    /// Fixed storage key of the collection's index record.
    ///
    /// Must never change once data has been persisted under it.
    const INDEX_KEY: &'static str;

    /// Message raised when a lookup by natural key finds nothing.
    const NOT_FOUND_MESSAGE: &'static str;

    /// Derives the record's storage key from its natural identifier.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the key-deriving field is missing or
    /// empty; called before any storage write, so an invalid record never
    /// reaches the backend.
    fn storage_key(&self) -> Result<String, DataError>;
}

/// Generic indexed repository over a key-value storage port.
///
/// Every member record is stored under its own key; the index record under
/// [`StoredRecord::INDEX_KEY`] holds the ordered list of member keys
/// (insertion order, no duplicates). Every key in the index has a member
/// record, and every member record this collection tracks appears in the
/// index — except transiently between the two writes of a save.
///
/// The engine provides no mutual exclusion: two concurrent saves race on
/// the shared index record and the second write-back can clobber the
/// first's append (classic lost-update). Callers with genuinely concurrent
/// writers must serialize calls externally.
pub struct IndexedRepository<R> {
    storage: Arc<dyn DataStorage>,
    _record: PhantomData<R>,
}

impl<R: StoredRecord> IndexedRepository<R> {
    /// Creates a repository over the given storage port.
    #[must_use]
    pub fn new(storage: Arc<dyn DataStorage>) -> Self {
        Self {
            storage,
            _record: PhantomData,
        }
    }

    /// Reads the collection's index: the ordered member keys.
    ///
    /// An index record that was never written reads as empty, not as an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns storage failures unchanged, and a serialization error when
    /// the stored index is not an array of strings.
    pub fn read_index(&self) -> Result<Vec<String>, DataError> {
        match self.storage.get(R::INDEX_KEY)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    /// Finds the member record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotFound`] with the collection's message when
    /// no value is stored under `key`; malformed stored values propagate as
    /// serialization errors, unwrapped.
    pub fn find_one(&self, key: &str) -> Result<R, DataError> {
        match self.storage.get(key)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Err(DataError::not_found(R::NOT_FOUND_MESSAGE)),
        }
    }

    /// Finds every member record, in index (insertion) order.
    ///
    /// # Errors
    ///
    /// Returns storage and serialization failures unchanged. Keys are
    /// resolved one at a time; the first failure aborts the scan.
    pub fn find_all(&self) -> Result<Vec<R>, DataError> {
        let keys = self.read_index()?;
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            records.push(self.find_one(&key)?);
        }
        Ok(records)
    }

    /// Finds every member record matching `predicate`, in index order.
    ///
    /// Full-collection scan; the index carries no filter support. Results
    /// are not deduplicated (keys are unique in the index, so neither are
    /// they duplicated).
    ///
    /// # Errors
    ///
    /// Same failure modes as [`find_all`](Self::find_all).
    pub fn find_all_where<P>(&self, predicate: P) -> Result<Vec<R>, DataError>
    where
        P: Fn(&R) -> bool,
    {
        let mut records = self.find_all()?;
        records.retain(|record| predicate(record));
        Ok(records)
    }

    /// Persists `record` under its derived key, overwriting any prior
    /// value, and appends the key to the index when not already present.
    ///
    /// The member write and the index write are two separate storage calls;
    /// a crash between them leaves a member record the index does not list
    /// yet. The conditional append is a read-modify-write on the shared
    /// index record, raced by concurrent saves (see the type docs).
    ///
    /// # Errors
    ///
    /// Returns a validation error (before touching storage) when the
    /// record's key cannot be derived; storage failures propagate
    /// unchanged.
    pub fn save_one(&self, record: &R) -> Result<(), DataError> {
        let key = record.storage_key()?;
        let mut keys = self.read_index()?;

        self.storage.set(&key, serde_json::to_value(record)?)?;
        if !keys.contains(&key) {
            keys.push(key.clone());
            self.storage
                .set(R::INDEX_KEY, serde_json::to_value(&keys)?)?;
        }
        debug!("saved {} record under key {key}", R::INDEX_KEY);
        Ok(())
    }

    /// Saves each record in input order.
    ///
    /// Not atomic as a whole: a failure partway through leaves earlier
    /// saves persisted and later ones absent.
    ///
    /// # Errors
    ///
    /// Returns the first per-record failure and aborts the remainder.
    pub fn save_multiple(&self, records: &[R]) -> Result<(), DataError> {
        for record in records {
            self.save_one(record)?;
        }
        Ok(())
    }

    /// Removes every member record (in index order) and then the index
    /// record itself.
    ///
    /// Safe to call on an empty or already-cleared collection: removals of
    /// absent keys are no-ops per the storage contract, and an absent index
    /// degenerates to a single removal of the index key.
    ///
    /// # Errors
    ///
    /// Returns storage failures unchanged; the first failing removal aborts
    /// the remainder, leaving the index record in place.
    pub fn clear_all(&self) -> Result<(), DataError> {
        let keys = self.read_index()?;
        for key in &keys {
            self.storage.remove(key)?;
        }
        self.storage.remove(R::INDEX_KEY)?;
        debug!("cleared {} records from {}", keys.len(), R::INDEX_KEY);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use crate::storage::MemoryDataStorage;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Note {
        key: String,
        body: String,
    }

    impl Note {
        fn new(key: &str, body: &str) -> Self {
            Self {
                key: key.to_owned(),
                body: body.to_owned(),
            }
        }
    }

    impl StoredRecord for Note {
        const INDEX_KEY: &'static str = "notes";
        const NOT_FOUND_MESSAGE: &'static str = "No note found";

        fn storage_key(&self) -> Result<String, DataError> {
            if self.key.is_empty() {
                return Err(DataError::validation("Note does not contain a key"));
            }
            Ok(self.key.clone())
        }
    }

    fn repo() -> (Arc<MemoryDataStorage>, IndexedRepository<Note>) {
        let storage = Arc::new(MemoryDataStorage::new());
        let repo = IndexedRepository::new(Arc::clone(&storage) as Arc<dyn DataStorage>);
        (storage, repo)
    }

    #[test]
    fn test_read_index_absent_is_empty() {
        let (_, repo) = repo();
        assert_eq!(repo.read_index().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_find_all_on_empty_store_is_empty() {
        let (_, repo) = repo();
        assert_eq!(repo.find_all().unwrap(), Vec::<Note>::new());
    }

    #[test]
    fn test_find_one_on_empty_store_is_not_found() {
        let (_, repo) = repo();
        let err = repo.find_one("anything").unwrap_err();
        assert_eq!(format!("{err}"), "No note found");
    }

    #[test]
    fn test_save_order_is_preserved() {
        let (_, repo) = repo();
        let notes = [
            Note::new("c", "third letter"),
            Note::new("a", "first letter"),
            Note::new("b", "second letter"),
        ];
        repo.save_multiple(&notes).unwrap();

        assert_eq!(repo.read_index().unwrap(), vec!["c", "a", "b"]);
        assert_eq!(repo.find_all().unwrap(), notes.to_vec());
    }

    #[test]
    fn test_resave_keeps_single_index_entry_and_last_content() {
        let (_, repo) = repo();
        repo.save_one(&Note::new("a", "old")).unwrap();
        repo.save_one(&Note::new("b", "other")).unwrap();
        repo.save_one(&Note::new("a", "new")).unwrap();

        assert_eq!(repo.read_index().unwrap(), vec!["a", "b"]);
        assert_eq!(repo.find_one("a").unwrap().body, "new");
    }

    #[test]
    fn test_save_validation_never_touches_storage() {
        let (storage, repo) = repo();
        let err = repo.save_one(&Note::new("", "keyless")).unwrap_err();
        assert!(matches!(err, DataError::Validation { .. }));
        assert_eq!(storage.set_count(), 0);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_save_multiple_aborts_on_first_failure() {
        let (_, repo) = repo();
        let batch = [
            Note::new("a", "saved"),
            Note::new("", "invalid"),
            Note::new("b", "never reached"),
        ];
        repo.save_multiple(&batch).unwrap_err();

        assert_eq!(repo.read_index().unwrap(), vec!["a"]);
        assert_eq!(
            format!("{}", repo.find_one("b").unwrap_err()),
            "No note found"
        );
    }

    #[test]
    fn test_clear_all_removes_members_and_index() {
        let (storage, repo) = repo();
        repo.save_one(&Note::new("a", "one")).unwrap();
        repo.save_one(&Note::new("b", "two")).unwrap();

        repo.clear_all().unwrap();
        assert!(storage.is_empty());
        assert_eq!(repo.find_all().unwrap(), Vec::<Note>::new());
    }

    #[test]
    fn test_clear_all_is_idempotent() {
        let (_, repo) = repo();
        repo.save_one(&Note::new("a", "one")).unwrap();
        repo.clear_all().unwrap();
        repo.clear_all().unwrap();
    }

    #[test]
    fn test_malformed_stored_value_propagates() {
        let (storage, repo) = repo();
        storage.set("a", json!("not an object")).unwrap();
        let err = repo.find_one("a").unwrap_err();
        assert!(matches!(err, DataError::Serialization(_)));
    }

    #[test]
    fn test_find_all_where_filters_in_index_order() {
        let (_, repo) = repo();
        repo.save_one(&Note::new("a", "keep")).unwrap();
        repo.save_one(&Note::new("b", "drop")).unwrap();
        repo.save_one(&Note::new("c", "keep")).unwrap();

        let kept = repo.find_all_where(|note| note.body == "keep").unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].key, "a");
        assert_eq!(kept[1].key, "c");
    }
}
