//! Linux `perf_event_open` backend
//!
//! Each event set is a `perf_event::Group` created on, and observing, the
//! thread that measures with it. Counting excludes kernel mode, so the
//! default `perf_event_paranoid` level of 2 is enough.

#![allow(unsafe_code)] // geteuid() requires unsafe

use log::debug;
use perf_event::{Builder, Counter, Group};

use super::catalog;
use super::{ensure_capacity, CounterBackend, EventSet};
use crate::domain::{CounterError, EventCode};

const PARANOID_PATH: &str = "/proc/sys/kernel/perf_event_paranoid";

/// Highest paranoid level that still permits self-monitoring without privileges
const MAX_UNPRIVILEGED_PARANOID: i32 = 2;

#[derive(Debug, Default)]
pub struct PerfBackend;

impl PerfBackend {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CounterBackend for PerfBackend {
    type Set = PerfEventSet;

    fn init(&self) -> Result<(), CounterError> {
        check_perf_access()
    }

    fn resolve(&self, name: &str) -> Result<EventCode, CounterError> {
        catalog::lookup(name).ok_or_else(|| CounterError::UnknownEvent(name.to_string()))
    }

    fn create_event_set(&self) -> Result<PerfEventSet, CounterError> {
        let group = Group::new().map_err(|e| CounterError::EventSetCreation(e.to_string()))?;
        Ok(PerfEventSet {
            group,
            counters: Vec::new(),
        })
    }

    fn shutdown(&self) {
        // Groups close their descriptors when the owning threads drop them
        debug!("perf backend shut down");
    }
}

/// Check that this process may open self-monitoring counters
fn check_perf_access() -> Result<(), CounterError> {
    let level = std::fs::read_to_string(PARANOID_PATH).map_err(|e| {
        CounterError::Unavailable(format!("{PARANOID_PATH}: {e} (kernel without perf events?)"))
    })?;
    let level: i32 = level.trim().parse().map_err(|_| {
        CounterError::Unavailable(format!("unexpected {PARANOID_PATH} value {level:?}"))
    })?;

    if level > MAX_UNPRIVILEGED_PARANOID && unsafe { libc::geteuid() } != 0 {
        return Err(CounterError::Unavailable(format!(
            "perf_event_paranoid is {level}; run as root or lower it to {MAX_UNPRIVILEGED_PARANOID}"
        )));
    }
    debug!("perf_event_paranoid = {level}");
    Ok(())
}

pub struct PerfEventSet {
    group: Group,
    counters: Vec<Counter>,
}

impl EventSet for PerfEventSet {
    fn add_events(&mut self, codes: &[EventCode]) -> Result<(), CounterError> {
        ensure_capacity(self.counters.len(), codes.len())?;
        for &code in codes {
            let entry =
                catalog::entry(code).ok_or_else(|| CounterError::UnknownEvent(code.to_string()))?;
            let counter = Builder::new()
                .group(&mut self.group)
                .kind(entry.event())
                .build()
                .map_err(|e| CounterError::Registration {
                    event: entry.name.to_string(),
                    error: e.to_string(),
                })?;
            self.counters.push(counter);
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), CounterError> {
        self.group
            .reset()
            .and_then(|()| self.group.enable())
            .map_err(|e| CounterError::Start(e.to_string()))
    }

    fn read(&mut self, out: &mut [u64]) -> Result<(), CounterError> {
        let counts = self
            .group
            .read()
            .map_err(|e| CounterError::Read(e.to_string()))?;
        for (value, counter) in out.iter_mut().zip(&self.counters) {
            *value = counts[counter];
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CounterError> {
        self.group
            .disable()
            .map_err(|e| CounterError::Stop(e.to_string()))
    }
}
