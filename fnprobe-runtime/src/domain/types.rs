//! Domain types providing compile-time safety and self-documentation

use std::fmt;

use fnprobe_common::{MAX_EVENTS, MAX_NAME_LEN};

/// Identifier of an entry in a counter backend's event catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventCode(pub u32);

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event#{}", self.0)
    }
}

/// Monotonic clock reading in nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    #[must_use]
    pub fn as_nanos(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn saturating_sub(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Seconds with nine fractional digits, exact to the nanosecond
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (secs, nanos) = (self.0 / 1_000_000_000, self.0 % 1_000_000_000);
        write!(f, "{secs}.{nanos:09}")
    }
}

/// Function label as reported by a probe, at most [`MAX_NAME_LEN`] bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionName(String);

impl FunctionName {
    /// Store `name`, cutting it at the last character boundary within the limit.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let mut end = name.len().min(MAX_NAME_LEN);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        Self(name[..end].to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Counter values for up to [`MAX_EVENTS`] events, in measurement order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    values: [u64; MAX_EVENTS],
    len: usize,
}

impl CounterSnapshot {
    #[must_use]
    pub fn zeroed(len: usize) -> Self {
        Self {
            values: [0; MAX_EVENTS],
            len: len.min(MAX_EVENTS),
        }
    }

    #[must_use]
    pub fn from_values(values: &[u64]) -> Self {
        let mut snapshot = Self::zeroed(values.len());
        let len = snapshot.len;
        snapshot.values[..len].copy_from_slice(&values[..len]);
        snapshot
    }

    #[must_use]
    pub fn values(&self) -> &[u64] {
        &self.values[..self.len]
    }

    pub fn values_mut(&mut self) -> &mut [u64] {
        &mut self.values[..self.len]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// The resolved event selection, fixed for the lifetime of a runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSpec {
    names: Vec<String>,
    codes: Vec<EventCode>,
}

impl EventSpec {
    /// Pairs of event name and catalog code, in measurement order.
    #[must_use]
    pub fn new(entries: Vec<(String, EventCode)>) -> Self {
        let (names, codes) = entries.into_iter().unzip();
        Self { names, codes }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn codes(&self) -> &[EventCode] {
        &self.codes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// One completed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub function_name: FunctionName,
    pub start: Timestamp,
    pub end: Timestamp,
    pub start_counters: CounterSnapshot,
    pub end_counters: CounterSnapshot,
}

impl CallRecord {
    /// Wall time spent in the call, in nanoseconds
    #[must_use]
    pub fn duration_nanos(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Per-event `end - start`, wrapping on counter overflow.
    #[allow(clippy::cast_possible_wrap)]
    pub fn deltas(&self) -> impl Iterator<Item = i64> + '_ {
        self.end_counters
            .values()
            .iter()
            .zip(self.start_counters.values())
            .map(|(end, start)| end.wrapping_sub(*start) as i64)
    }
}
