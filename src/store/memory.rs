//! In-memory reference implementation of the record store.

use std::sync::{Mutex, PoisonError};

use crate::error::EngineResult;

use super::{RecordStore, Records};

/// A [`RecordStore`] backed by a mutex-guarded in-memory document.
///
/// Transactions run against a working copy of the records while holding the
/// lock; the copy replaces the shared document only when the closure
/// succeeds, which gives both rollback-on-error and fully serialized
/// check-then-write sequences. Two concurrent check-ins for the same user
/// therefore always resolve to one success and one conflict.
///
/// # Example
///
/// ```
/// use timeclock_engine::store::{InMemoryStore, RecordStore};
///
/// let store = InMemoryStore::new();
/// let open_sessions = store.read(|records| records.audit_log().len());
/// assert_eq!(open_sessions, 0);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<Records>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        InMemoryStore::default()
    }
}

impl RecordStore for InMemoryStore {
    fn read<T>(&self, f: impl FnOnce(&Records) -> T) -> T {
        let guard = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn transaction<T>(&self, f: impl FnOnce(&mut Records) -> EngineResult<T>) -> EngineResult<T> {
        let mut guard = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut working = guard.clone();
        let value = f(&mut working)?;
        *guard = working;
        Ok(value)
    }
}
