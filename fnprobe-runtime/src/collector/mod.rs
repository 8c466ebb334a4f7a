//! # Call Collector
//!
//! [`Runtime`] turns probe calls into [`CallRecord`]s:
//!
//! ```text
//!            entry(name)                     exit(name)
//!   IDLE ───────────────────▶ IN_CALL ───────────────────▶ IDLE
//!         time, start set,              read, time, stop,
//!         read snapshot                 append to CallLog
//! ```
//!
//! Each thread keeps at most one call in flight and owns its own counter
//! event set; only the [`CallLog`] is shared. The event selection is
//! resolved once, on the first probe, and never changes afterwards.

pub mod call_log;
pub mod clock;
pub mod context;

pub use call_log::{CallLog, DEFAULT_CAPACITY};

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

use fnprobe_common::{
    EventList, DEFAULT_OUTPUT_FILE, EVENTS_ENV_VAR, MAX_EVENTS, OUTPUT_ENV_VAR,
};
use log::{debug, info, warn};

use crate::counters::{CounterBackend, EventSet};
use crate::domain::{
    CallRecord, CounterError, CounterSnapshot, EventSpec, FunctionName, RuntimeError,
};
use crate::export::CsvExporter;
use context::InFlightCall;

static NEXT_RUNTIME_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Explicit selection; `None` reads `FNPROBE_EVENTS` at initialization
    pub events: Option<EventList>,
    pub capacity: usize,
    /// Result file written by [`Runtime::shutdown`]
    pub output: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            events: None,
            capacity: DEFAULT_CAPACITY,
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

impl RuntimeConfig {
    /// Defaults, with the output path taken from `FNPROBE_OUTPUT` when set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = std::env::var_os(OUTPUT_ENV_VAR).filter(|p| !p.is_empty()) {
            config.output = PathBuf::from(path);
        }
        config
    }
}

/// Pick the event list: explicit, else the environment value, else the default pair.
///
/// An environment list longer than [`MAX_EVENTS`] is cut to its first entries.
///
/// # Errors
/// Returns an error if the environment value names no events or a malformed one.
pub fn select_events(
    explicit: Option<&EventList>,
    env_value: Option<&str>,
) -> Result<EventList, RuntimeError> {
    if let Some(list) = explicit {
        return Ok(list.clone());
    }
    match env_value.filter(|value| !value.trim().is_empty()) {
        Some(value) => {
            let (list, dropped) = EventList::parse_truncating(value)?;
            if dropped > 0 {
                warn!(
                    "{EVENTS_ENV_VAR} names {} events, measuring only the first {MAX_EVENTS}",
                    list.len() + dropped
                );
            }
            Ok(list)
        }
        None => Ok(EventList::default_pair()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    Started,
    /// A call was already open on this thread and has been discarded
    Replaced,
    /// Runtime already shut down
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Recorded,
    /// No open call; a zero-length record was appended under the exit label
    Unpaired,
    /// Call log full
    Dropped,
    /// Runtime not initialized or already shut down
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeStats {
    pub recorded: u64,
    pub dropped: u64,
    pub replaced: u64,
    pub unpaired: u64,
}

pub struct RuntimeBuilder<B> {
    backend: B,
    config: RuntimeConfig,
}

impl<B: CounterBackend> RuntimeBuilder<B> {
    #[must_use]
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn events(mut self, events: EventList) -> Self {
        self.config.events = Some(events);
        self
    }

    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    #[must_use]
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = path.into();
        self
    }

    pub fn build(self) -> Runtime<B> {
        Runtime {
            id: NEXT_RUNTIME_ID.fetch_add(1, Ordering::Relaxed),
            backend: self.backend,
            log: CallLog::with_capacity(self.config.capacity),
            config: self.config,
            spec: OnceLock::new(),
            init_lock: Mutex::new(()),
            shut_down: AtomicBool::new(false),
            recorded: AtomicU64::new(0),
            replaced: AtomicU64::new(0),
            unpaired: AtomicU64::new(0),
        }
    }
}

/// Profiling context shared by every thread of the instrumented program
pub struct Runtime<B: CounterBackend> {
    id: u64,
    backend: B,
    config: RuntimeConfig,
    spec: OnceLock<EventSpec>,
    init_lock: Mutex<()>,
    log: CallLog,
    shut_down: AtomicBool,
    recorded: AtomicU64,
    replaced: AtomicU64,
    unpaired: AtomicU64,
}

impl<B: CounterBackend> Runtime<B> {
    pub fn builder(backend: B) -> RuntimeBuilder<B> {
        RuntimeBuilder {
            backend,
            config: RuntimeConfig::default(),
        }
    }

    /// Initialize the backend and resolve the event selection, once.
    ///
    /// Later calls return the already resolved selection. The calling
    /// thread's event set is created here too.
    ///
    /// # Errors
    /// Returns an error if counters are unavailable, an event is unknown, or
    /// the event set cannot be built. Callers treat these as fatal.
    pub fn init(&self) -> Result<&EventSpec, RuntimeError> {
        if let Some(spec) = self.spec.get() {
            return Ok(spec);
        }
        let _guard = self
            .init_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(spec) = self.spec.get() {
            return Ok(spec);
        }

        self.backend.init()?;
        let env_value = std::env::var(EVENTS_ENV_VAR).ok();
        let list = select_events(self.config.events.as_ref(), env_value.as_deref())?;
        let entries = list
            .names()
            .iter()
            .map(|name| self.backend.resolve(name).map(|code| (name.clone(), code)))
            .collect::<Result<Vec<_>, CounterError>>()?;
        let spec = EventSpec::new(entries);

        let set = self.create_event_set(&spec)?;
        context::with_slot(self.id, |slot| slot.events = Some(set));

        info!("measuring {list} for up to {} calls", self.log.capacity());
        Ok(self.spec.get_or_init(|| spec))
    }

    /// Entry probe: open a call on this thread.
    ///
    /// Counter start and read failures are logged and leave zeros in the
    /// snapshot.
    ///
    /// # Errors
    /// Returns an error only when initialization or this thread's event-set
    /// creation fails.
    pub fn entry(&self, name: &str) -> Result<EntryOutcome, RuntimeError> {
        if self.is_shut_down() {
            return Ok(EntryOutcome::Ignored);
        }
        let spec = self.init()?;

        let outcome = context::with_slot(self.id, |slot| -> Result<EntryOutcome, RuntimeError> {
            let set = match slot.events.take() {
                Some(set) => set,
                None => self.create_event_set(spec)?,
            };
            let set = slot.events.insert(set);

            let start = clock::now();
            if let Err(e) = set.start() {
                warn!("{name}: {e}");
            }
            let mut start_counters = CounterSnapshot::zeroed(spec.len());
            if let Err(e) = set.read(start_counters.values_mut()) {
                warn!("{name}: {e}");
            }

            let call = InFlightCall {
                function_name: FunctionName::new(name),
                start,
                start_counters,
            };
            Ok(match slot.call.replace(call) {
                Some(open) => {
                    warn!(
                        "{name} entered while {} is still open on this thread",
                        open.function_name
                    );
                    self.replaced.fetch_add(1, Ordering::Relaxed);
                    EntryOutcome::Replaced
                }
                None => EntryOutcome::Started,
            })
        });
        outcome.unwrap_or(Ok(EntryOutcome::Ignored))
    }

    /// Exit probe: close this thread's call and append its record.
    pub fn exit(&self, name: &str) -> ExitOutcome {
        if self.is_shut_down() {
            return ExitOutcome::Ignored;
        }
        let Some(spec) = self.spec.get() else {
            return ExitOutcome::Ignored;
        };

        let closed = context::with_slot(self.id, |slot| {
            let mut end_counters = CounterSnapshot::zeroed(spec.len());
            if let Some(set) = slot.events.as_mut() {
                if let Err(e) = set.read(end_counters.values_mut()) {
                    warn!("{name}: {e}");
                }
            }
            let end = clock::now();
            if let Some(set) = slot.events.as_mut() {
                if let Err(e) = set.stop() {
                    warn!("{name}: {e}");
                }
            }

            match slot.call.take() {
                Some(call) => (
                    CallRecord {
                        function_name: call.function_name,
                        start: call.start,
                        end,
                        start_counters: call.start_counters,
                        end_counters,
                    },
                    true,
                ),
                None => (
                    CallRecord {
                        function_name: FunctionName::new(name),
                        start: end,
                        end,
                        start_counters: end_counters,
                        end_counters,
                    },
                    false,
                ),
            }
        });
        let Some((record, paired)) = closed else {
            return ExitOutcome::Ignored;
        };

        if !paired {
            debug!("exit from {name} without a matching entry");
            self.unpaired.fetch_add(1, Ordering::Relaxed);
        }
        if !self.log.push(record) {
            return ExitOutcome::Dropped;
        }
        self.recorded.fetch_add(1, Ordering::Relaxed);
        if paired {
            ExitOutcome::Recorded
        } else {
            ExitOutcome::Unpaired
        }
    }

    /// Write all records collected so far to `path`, replacing its content.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn persist(&self, path: &Path) -> Result<usize, RuntimeError> {
        let event_names = self.spec.get().map_or(&[][..], EventSpec::names);
        let exporter = CsvExporter::new(event_names);
        let writer = BufWriter::new(File::create(path)?);
        let written = self
            .log
            .with_records(|records| exporter.export(writer, records))?;
        debug!("wrote {written} records to {}", path.display());
        Ok(written)
    }

    /// Persist to the configured output and release the backend.
    ///
    /// Runs once; later calls return `Ok(None)` and all later probes are
    /// ignored.
    ///
    /// # Errors
    /// Returns the persistence error; the backend is released regardless.
    pub fn shutdown(&self) -> Result<Option<usize>, RuntimeError> {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return Ok(None);
        }
        let written = self.persist(&self.config.output);
        if self.spec.get().is_some() {
            self.backend.shutdown();
        }

        let stats = self.stats();
        if stats.dropped > 0 {
            debug!("call log full: {} calls were not recorded", stats.dropped);
        }
        info!(
            "shutdown: {} recorded, {} dropped, {} replaced, {} unpaired",
            stats.recorded, stats.dropped, stats.replaced, stats.unpaired
        );
        written.map(Some)
    }

    fn create_event_set(&self, spec: &EventSpec) -> Result<Box<dyn EventSet>, RuntimeError> {
        let mut set = self.backend.create_event_set()?;
        set.add_events(spec.codes())?;
        Ok(Box::new(set))
    }

    #[must_use]
    pub fn event_spec(&self) -> Option<&EventSpec> {
        self.spec.get()
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Copy of the collected records in append order
    #[must_use]
    pub fn records(&self) -> Vec<CallRecord> {
        self.log.snapshot()
    }

    #[must_use]
    pub fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            recorded: self.recorded.load(Ordering::Relaxed),
            dropped: self.log.dropped(),
            replaced: self.replaced.load(Ordering::Relaxed),
            unpaired: self.unpaired.load(Ordering::Relaxed),
        }
    }
}

impl<B: CounterBackend> Drop for Runtime<B> {
    fn drop(&mut self) {
        context::release_slot(self.id);
    }
}
