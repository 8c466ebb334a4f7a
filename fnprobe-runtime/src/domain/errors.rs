//! Structured error types for fnprobe-runtime
//!
//! Using thiserror for automatic Display implementation and error chaining.

use fnprobe_common::{EventListError, MAX_EVENTS};
use thiserror::Error;

/// Failures of the hardware counter subsystem
#[derive(Error, Debug)]
pub enum CounterError {
    #[error("Hardware counters unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown counter event {0:?}")]
    UnknownEvent(String),

    #[error("Too many counter events: {count} requested, at most {MAX_EVENTS} supported")]
    TooManyEvents { count: usize },

    #[error("Failed to create event set: {0}")]
    EventSetCreation(String),

    #[error("Failed to add event {event}: {error}")]
    Registration { event: String, error: String },

    #[error("Failed to start counters: {0}")]
    Start(String),

    #[error("Failed to read counters: {0}")]
    Read(String),

    #[error("Failed to stop counters: {0}")]
    Stop(String),
}

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Counter(#[from] CounterError),

    #[error("No counter events configured")]
    NoEvents,

    #[error("Invalid event selection: {0}")]
    InvalidEvents(EventListError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<EventListError> for RuntimeError {
    fn from(err: EventListError) -> Self {
        match err {
            EventListError::Empty => RuntimeError::NoEvents,
            other => RuntimeError::InvalidEvents(other),
        }
    }
}
