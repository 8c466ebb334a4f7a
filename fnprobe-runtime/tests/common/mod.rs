//! Deterministic counter backend for collector tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fnprobe_common::EventList;
use fnprobe_runtime::counters::{ensure_capacity, CounterBackend, EventSet};
use fnprobe_runtime::domain::{CounterError, EventCode};
use fnprobe_runtime::Runtime;

pub const KNOWN_EVENTS: [&str; 5] = [
    "instructions",
    "cycles",
    "L1-dcache-load-misses",
    "branch-misses",
    "cache-misses",
];

/// Counts calls so tests can assert on lifecycle
#[derive(Default)]
pub struct Calls {
    pub init: AtomicUsize,
    pub event_sets: AtomicUsize,
    pub shutdown: AtomicUsize,
}

#[derive(Default, Clone)]
pub struct FakeBackend {
    pub calls: Arc<Calls>,
    pub unavailable: bool,
    /// Time each `stop` takes
    pub stop_delay: Option<Duration>,
}

impl CounterBackend for FakeBackend {
    type Set = FakeEventSet;

    fn init(&self) -> Result<(), CounterError> {
        self.calls.init.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(CounterError::Unavailable("no counters in test".into()));
        }
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<EventCode, CounterError> {
        KNOWN_EVENTS
            .iter()
            .position(|known| *known == name)
            .map(|index| EventCode(u32::try_from(index).unwrap()))
            .ok_or_else(|| CounterError::UnknownEvent(name.to_string()))
    }

    fn create_event_set(&self) -> Result<FakeEventSet, CounterError> {
        self.calls.event_sets.fetch_add(1, Ordering::SeqCst);
        Ok(FakeEventSet {
            codes: Vec::new(),
            ticks: 0,
            stop_delay: self.stop_delay,
        })
    }

    fn shutdown(&self) {
        self.calls.shutdown.fetch_add(1, Ordering::SeqCst);
    }
}

/// Every read advances each counter by `(event index + 1) * 10`
pub struct FakeEventSet {
    codes: Vec<EventCode>,
    ticks: u64,
    stop_delay: Option<Duration>,
}

impl EventSet for FakeEventSet {
    fn add_events(&mut self, codes: &[EventCode]) -> Result<(), CounterError> {
        ensure_capacity(self.codes.len(), codes.len())?;
        self.codes.extend_from_slice(codes);
        Ok(())
    }

    fn start(&mut self) -> Result<(), CounterError> {
        Ok(())
    }

    fn read(&mut self, out: &mut [u64]) -> Result<(), CounterError> {
        self.ticks += 1;
        for (i, value) in (1u64..).zip(out.iter_mut()) {
            *value = self.ticks * i * 10;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CounterError> {
        if let Some(delay) = self.stop_delay {
            std::thread::sleep(delay);
        }
        Ok(())
    }
}

pub fn runtime(events: &str, capacity: usize) -> Runtime<FakeBackend> {
    Runtime::builder(FakeBackend::default())
        .events(EventList::parse(events).unwrap())
        .capacity(capacity)
        .build()
}
