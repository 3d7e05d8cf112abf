//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events in the mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Bootstrap
    /// Configuration loaded from disk
    ConfigLoaded,
    /// Database handle opened
    DatabaseOpened,

    // Document lifecycle
    /// Document created by Save
    DocumentCreated,
    /// Document read
    DocumentRead,
    /// Document updated
    DocumentUpdated,
    /// Document deleted
    DocumentDeleted,
}

impl Event {
    /// Returns the string representation (UPPER_SNAKE_CASE)
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::DatabaseOpened => "DATABASE_OPENED",
            Event::DocumentCreated => "DOCUMENT_CREATED",
            Event::DocumentRead => "DOCUMENT_READ",
            Event::DocumentUpdated => "DOCUMENT_UPDATED",
            Event::DocumentDeleted => "DOCUMENT_DELETED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ConfigLoaded | Event::DatabaseOpened => Severity::Info,
            _ => Severity::Trace,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
