//! # Shared Contract (Transformer ↔ Runtime)
//!
//! Defines the names and limits that the source transformer bakes into
//! instrumented programs and that the profiling runtime expects to find at
//! run time. Both sides depend on this crate so the probe symbols, the
//! configuration variable and the event capacity can never drift apart.
//!
//! ## Key Items
//!
//! - [`ENTRY_PROBE_SYMBOL`] / [`EXIT_PROBE_SYMBOL`] - C-ABI probe functions
//! - [`EVENTS_ENV_VAR`] - comma-separated event selection
//! - [`EventList`] - parsed, validated event selection

use std::fmt;

use thiserror::Error;

// ============================================================================
// Probe ABI
// ============================================================================

/// Symbol called as the first statement of every instrumented function body.
///
/// Signature on the C side: `void fnprobe_entry(const char *func_name)`.
pub const ENTRY_PROBE_SYMBOL: &str = "fnprobe_entry";

/// Symbol called immediately before every exit point of an instrumented function.
///
/// Signature on the C side: `void fnprobe_exit(const char *func_name)`.
pub const EXIT_PROBE_SYMBOL: &str = "fnprobe_exit";

// ============================================================================
// Configuration
// ============================================================================

/// Environment variable holding the comma-separated counter event selection.
///
/// Written by the startup hook the transformer emits, read once by the
/// runtime during initialization.
pub const EVENTS_ENV_VAR: &str = "FNPROBE_EVENTS";

/// Environment variable overriding the result file path.
pub const OUTPUT_ENV_VAR: &str = "FNPROBE_OUTPUT";

/// Environment variable holding the runtime's `env_logger` filter.
pub const LOG_ENV_VAR: &str = "FNPROBE_LOG";

/// Result file written to the working directory at process exit.
pub const DEFAULT_OUTPUT_FILE: &str = "function_metrics.csv";

/// Event pair used when no selection is configured.
pub const DEFAULT_EVENTS: [&str; 2] = ["instructions", "L1-dcache-load-misses"];

/// Maximum number of counter events measured per call.
pub const MAX_EVENTS: usize = 4;

/// Maximum stored length of a function name, in bytes.
pub const MAX_NAME_LEN: usize = 127;

// ============================================================================
// Event selection
// ============================================================================

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EventListError {
    #[error("event list is empty")]
    Empty,

    #[error("too many events: {count} given, at most {MAX_EVENTS} supported")]
    TooMany { count: usize },

    #[error("invalid event name {0:?}: only letters, digits and _ . : - are allowed")]
    InvalidName(String),
}

/// An ordered selection of 1 to [`MAX_EVENTS`] counter event names.
///
/// Names are only checked syntactically here; whether a name maps to a real
/// counter is decided by the runtime's event catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventList(Vec<String>);

impl EventList {
    /// Parse a comma-separated list, rejecting more than [`MAX_EVENTS`] names.
    ///
    /// Whitespace around names is trimmed and empty tokens are skipped.
    ///
    /// # Errors
    /// Returns an error if no names remain, if there are too many, or if a
    /// name contains characters that cannot be embedded in a C string literal.
    pub fn parse(list: &str) -> Result<Self, EventListError> {
        let names = split_names(list);
        if names.len() > MAX_EVENTS {
            return Err(EventListError::TooMany { count: names.len() });
        }
        Self::from_names(names)
    }

    /// Parse a comma-separated list, keeping only the first [`MAX_EVENTS`] names.
    ///
    /// Returns the list together with the number of names that were cut off.
    ///
    /// # Errors
    /// Returns an error if no names remain or if a name is malformed.
    pub fn parse_truncating(list: &str) -> Result<(Self, usize), EventListError> {
        let mut names = split_names(list);
        let dropped = names.len().saturating_sub(MAX_EVENTS);
        names.truncate(MAX_EVENTS);
        Ok((Self::from_names(names)?, dropped))
    }

    /// The built-in default selection.
    #[must_use]
    pub fn default_pair() -> Self {
        Self(Vec::from(DEFAULT_EVENTS.map(String::from)))
    }

    fn from_names(names: Vec<String>) -> Result<Self, EventListError> {
        if names.is_empty() {
            return Err(EventListError::Empty);
        }
        if let Some(bad) = names.iter().find(|name| !is_valid_event_name(name)) {
            return Err(EventListError::InvalidName(bad.clone()));
        }
        Ok(Self(names))
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EventList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_valid_event_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '-'))
}
