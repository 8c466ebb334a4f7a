//! Shared, bounded record store

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::CallRecord;

/// Default number of records kept per process
pub const DEFAULT_CAPACITY: usize = 1024;

/// Append-only call log shared by all threads.
///
/// Records past `capacity` are discarded and counted.
#[derive(Debug)]
pub struct CallLog {
    records: Mutex<Vec<CallRecord>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl CallLog {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Append `record`; returns false if the log is full.
    pub fn push(&self, record: CallRecord) -> bool {
        let mut records = self.lock();
        if records.len() >= self.capacity {
            drop(records);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        records.push(record);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Copy of all records in append order
    #[must_use]
    pub fn snapshot(&self) -> Vec<CallRecord> {
        self.lock().clone()
    }

    /// Run `f` over the records while holding the lock
    pub fn with_records<T>(&self, f: impl FnOnce(&[CallRecord]) -> T) -> T {
        f(&self.lock())
    }

    // A poisoned log still holds only complete records
    fn lock(&self) -> MutexGuard<'_, Vec<CallRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
