//! Shared local copy of the fetched applications, and the in-flight set.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{ClientError, Result};
use crate::models::{ApplicationRecord, RecordKey};

use super::optimistic::RecordPatch;

/// The applications a dashboard currently shows.
///
/// Fetches replace the whole set; actions patch single records in place.
/// Records are addressed by [`RecordKey`], the first match wins.
#[derive(Debug, Default)]
pub struct ApplicationBoard {
    records: Mutex<Vec<ApplicationRecord>>,
    in_flight: InFlight,
}

impl ApplicationBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ApplicationRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            in_flight: InFlight::default(),
        }
    }

    fn records(&self) -> MutexGuard<'_, Vec<ApplicationRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace everything with a fresh fetch.
    pub fn replace(&self, records: Vec<ApplicationRecord>) {
        *self.records() = records;
    }

    pub fn snapshot(&self) -> Vec<ApplicationRecord> {
        self.records().clone()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    pub fn get(&self, key: &RecordKey) -> Option<ApplicationRecord> {
        self.records().iter().find(|r| r.key() == *key).cloned()
    }

    pub fn get_by_id(&self, id: &str) -> Option<ApplicationRecord> {
        self.records().iter().find(|r| r.id == id).cloned()
    }

    /// Run `f` on the record with `id`.
    pub fn update_by_id<R>(&self, id: &str, f: impl FnOnce(&mut ApplicationRecord) -> R) -> Option<R> {
        self.records().iter_mut().find(|r| r.id == id).map(f)
    }

    /// Run `f` on the record with `key`.
    pub fn update<R>(&self, key: &RecordKey, f: impl FnOnce(&mut ApplicationRecord) -> R) -> Option<R> {
        self.records().iter_mut().find(|r| r.key() == *key).map(f)
    }

    pub fn remove_by_id(&self, id: &str) -> Option<ApplicationRecord> {
        let mut records = self.records();
        let index = records.iter().position(|r| r.id == id)?;
        Some(records.remove(index))
    }

    /// Apply `patch` to the record with `key` and return its inverse.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record has this key
    /// - `InvalidTransition` if the patch does not apply to the record's status
    pub fn apply(&self, key: &RecordKey, patch: &RecordPatch) -> Result<RecordPatch> {
        self.update(key, |record| patch.apply(record))
            .ok_or_else(|| ClientError::NotFound(key.to_string()))?
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }
}

/// Records with an action waiting on the backend.
#[derive(Debug, Default)]
pub struct InFlight {
    keys: Mutex<HashSet<RecordKey>>,
}

impl InFlight {
    fn keys(&self) -> MutexGuard<'_, HashSet<RecordKey>> {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `key` busy until the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// `ActionInFlight` if the key is already busy.
    pub fn begin(&self, key: &RecordKey) -> Result<InFlightGuard<'_>> {
        if !self.keys().insert(key.clone()) {
            return Err(ClientError::ActionInFlight(key.to_string()));
        }
        Ok(InFlightGuard {
            set: self,
            key: key.clone(),
        })
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.keys().contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }
}

/// Releases its key on drop, whether the action finished, failed or was
/// cancelled.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    set: &'a InFlight,
    key: RecordKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.keys().remove(&self.key);
    }
}
