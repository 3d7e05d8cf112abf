//! Observability for the mapper
//!
//! - Structured logging (JSON lines)
//! - Lifecycle events
//! - Operation counters
//!
//! Observability is read-only: it never changes the outcome of an
//! operation, and errors are returned to callers rather than logged.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{LogSink, Logger, Severity};

#[cfg(test)]
pub(crate) use logger::capture as capture_logger;
pub use metrics::{MetricsSnapshot, OrmMetrics};

/// Log a lifecycle event at its own severity
pub fn log_event(logger: &Logger, event: Event, fields: &[(&str, &str)]) {
    logger.log(event.severity(), event.as_str(), fields);
}
