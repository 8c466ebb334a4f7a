//! # Counter Subsystem
//!
//! The collector measures calls through two capabilities:
//!
//! - [`CounterBackend`]: process-wide setup, name resolution, event-set creation
//! - [`EventSet`]: one thread's group of counters, started and read per call
//!
//! [`perf::PerfBackend`] implements both on Linux `perf_event_open`, with
//! [`catalog`] mapping perf-style and PAPI preset names to kernel events.

pub mod catalog;
pub mod perf;

pub use catalog::{lookup, CatalogEntry, CATALOG};
pub use perf::{PerfBackend, PerfEventSet};

use fnprobe_common::MAX_EVENTS;

use crate::domain::{CounterError, EventCode};

/// Process-wide access to a hardware counter facility
pub trait CounterBackend: Send + Sync + 'static {
    type Set: EventSet + 'static;

    /// One-time setup and availability check.
    ///
    /// # Errors
    /// Returns [`CounterError::Unavailable`] when counters cannot be used.
    fn init(&self) -> Result<(), CounterError>;

    /// # Errors
    /// Returns [`CounterError::UnknownEvent`] for names outside the catalog.
    fn resolve(&self, name: &str) -> Result<EventCode, CounterError>;

    /// A new, empty event set observing the calling thread.
    ///
    /// # Errors
    /// Returns [`CounterError::EventSetCreation`] on failure.
    fn create_event_set(&self) -> Result<Self::Set, CounterError>;

    /// Release process-wide resources. Event sets still alive stay usable
    /// until dropped.
    fn shutdown(&self);
}

/// A group of counters measured together
pub trait EventSet {
    /// # Errors
    /// Returns an error if the set would exceed [`MAX_EVENTS`] or an event
    /// cannot be registered.
    fn add_events(&mut self, codes: &[EventCode]) -> Result<(), CounterError>;

    /// Reset and start counting.
    ///
    /// # Errors
    /// Returns [`CounterError::Start`] on failure.
    fn start(&mut self) -> Result<(), CounterError>;

    /// Write current values into `out`, one per registered event.
    ///
    /// # Errors
    /// Returns [`CounterError::Read`] on failure.
    fn read(&mut self, out: &mut [u64]) -> Result<(), CounterError>;

    /// # Errors
    /// Returns [`CounterError::Stop`] on failure.
    fn stop(&mut self) -> Result<(), CounterError>;
}

/// Check that `adding` more events fit next to `registered` ones.
///
/// # Errors
/// Returns [`CounterError::TooManyEvents`] past [`MAX_EVENTS`].
pub fn ensure_capacity(registered: usize, adding: usize) -> Result<(), CounterError> {
    let count = registered + adding;
    if count > MAX_EVENTS {
        return Err(CounterError::TooManyEvents { count });
    }
    Ok(())
}
