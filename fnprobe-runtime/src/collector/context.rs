//! Per-thread probe state
//!
//! Thread-local slots keyed by runtime id, so several runtimes (as in
//! tests) never see each other's calls.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::counters::EventSet;
use crate::domain::{CounterSnapshot, FunctionName, Timestamp};

/// A call whose entry probe has fired and whose exit has not
#[derive(Debug, Clone)]
pub struct InFlightCall {
    pub function_name: FunctionName,
    pub start: Timestamp,
    pub start_counters: CounterSnapshot,
}

#[derive(Default)]
pub struct ThreadSlot {
    pub call: Option<InFlightCall>,
    /// Created on the thread's first entry; counters observe this thread only
    pub events: Option<Box<dyn EventSet>>,
}

thread_local! {
    static SLOTS: RefCell<HashMap<u64, ThreadSlot>> = RefCell::new(HashMap::new());
}

/// Run `f` on this thread's slot for `runtime_id`.
///
/// Returns `None` once the thread's locals have been destroyed (probes
/// fired from late destructors).
pub fn with_slot<T>(runtime_id: u64, f: impl FnOnce(&mut ThreadSlot) -> T) -> Option<T> {
    SLOTS
        .try_with(|slots| {
            let mut slots = slots.borrow_mut();
            f(slots.entry(runtime_id).or_default())
        })
        .ok()
}

/// Forget this thread's slot for `runtime_id`, closing its event set.
pub fn release_slot(runtime_id: u64) {
    let _ = SLOTS.try_with(|slots| slots.borrow_mut().remove(&runtime_id));
}
