use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A log event as handed over by the host logging framework.
///
/// All fields are copied into the record unchanged; the layout only
/// formats the timestamp.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub thread: String,
    pub logger: String,
    /// Message with arguments already substituted.
    pub message: String,
    /// Message template, if the host keeps it separately.
    pub raw_message: Option<String>,
    pub mdc: BTreeMap<String, String>,
    pub exception: Option<String>,
    /// Top-level marker name only; child markers are not carried.
    pub marker: Option<String>,
}

impl LogEvent {
    /// Create an event stamped now, on the current thread.
    pub fn new(level: impl Into<String>, logger: impl Into<String>, message: impl Into<String>) -> Self {
        LogEvent {
            timestamp: Utc::now(),
            level: level.into(),
            thread: current_thread_name(),
            logger: logger.into(),
            message: message.into(),
            raw_message: None,
            mdc: BTreeMap::new(),
            exception: None,
            marker: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn on_thread(mut self, thread: impl Into<String>) -> Self {
        self.thread = thread.into();
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn with_mdc(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.mdc.insert(key.into(), value.into());
        self
    }

    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exception = Some(exception.into());
        self
    }

    pub fn with_raw_message(mut self, raw: impl Into<String>) -> Self {
        self.raw_message = Some(raw.into());
        self
    }
}

/// Name of the current thread, or its id for unnamed threads.
pub fn current_thread_name() -> String {
    let thread = std::thread::current();
    match thread.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", thread.id()),
    }
}
