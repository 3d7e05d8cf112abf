//! Structured JSON logger
//!
//! - One log line = one JSON object
//! - `event` first, then `severity`, then fields sorted by key
//! - Synchronous, no buffering
//! - Lines below the configured threshold are dropped

use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Log severity levels
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Per-document lifecycle detail
    Trace = 0,
    /// Normal operations
    #[default]
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where log lines go
#[derive(Debug, Clone, Default)]
pub enum LogSink {
    /// INFO and below to stdout, WARN and above to stderr
    #[default]
    Console,
    /// Every line to stderr, leaving stdout to the caller
    Stderr,
    /// In-memory buffer
    #[cfg(test)]
    Capture(std::sync::Arc<std::sync::Mutex<Vec<u8>>>),
}

/// A structured logger that writes JSON lines
#[derive(Debug, Clone)]
pub struct Logger {
    threshold: Severity,
    sink: LogSink,
}

impl Logger {
    /// Create a console logger that drops lines below `threshold`
    pub fn new(threshold: Severity) -> Self {
        Self {
            threshold,
            sink: LogSink::default(),
        }
    }

    pub fn with_sink(mut self, sink: LogSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.threshold
    }

    /// Log an event with the given severity and fields
    pub fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !self.enabled(severity) {
            return;
        }

        let line = render_line(severity, event, fields);
        match &self.sink {
            LogSink::Console if severity < Severity::Warn => write_line(&mut io::stdout(), &line),
            LogSink::Console | LogSink::Stderr => write_line(&mut io::stderr(), &line),
            #[cfg(test)]
            LogSink::Capture(buffer) => {
                if let Ok(mut buffer) = buffer.lock() {
                    buffer.extend_from_slice(line.as_bytes());
                }
            }
        }
    }
}

/// Logging never fails the caller
fn write_line<W: Write>(writer: &mut W, line: &str) {
    let _ = writer.write_all(line.as_bytes());
    let _ = writer.flush();
}

/// `{"event":..,"severity":..,<fields sorted by key>}` plus a newline
fn render_line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut sorted: Vec<_> = fields.iter().collect();
    sorted.sort_by_key(|(key, _)| *key);

    let mut members = Vec::with_capacity(sorted.len() + 2);
    members.push(member("event", event));
    members.push(member("severity", severity.as_str()));
    members.extend(sorted.into_iter().map(|(key, value)| member(key, value)));

    format!("{{{}}}\n", members.join(","))
}

fn member(key: &str, value: &str) -> String {
    format!("{}:{}", Value::from(key), Value::from(value))
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(Severity::default())
    }
}

/// Logger writing into a shared buffer, plus a reader for that buffer
#[cfg(test)]
pub(crate) fn capture(threshold: Severity) -> (Logger, impl Fn() -> String) {
    let buffer = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let logger = Logger::new(threshold).with_sink(LogSink::Capture(buffer.clone()));
    let read = move || String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    (logger, read)
}
