//! Timestamped, newest-first log shown to the operator.

use std::collections::VecDeque;

use chrono::{DateTime, Local, TimeZone};

const TIME_FORMAT: &str = "%H:%M:%S";

/// Render a local wall-clock time the way log lines show it.
pub(crate) fn local_time(at: &DateTime<Local>) -> String {
    at.format(TIME_FORMAT).to_string()
}

/// Local time of a unix timestamp given in milliseconds.
pub(crate) fn local_time_of_millis(ms: i64) -> Option<String> {
    Local.timestamp_millis_opt(ms).single().map(|at| local_time(&at))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LogEntry {
    pub(crate) timestamp: String,
    pub(crate) message: String,
}

impl LogEntry {
    pub(crate) fn line(&self) -> String {
        format!("{}: {}", self.timestamp, self.message)
    }
}

/// Ring buffer of log entries; index 0 is the newest.
#[derive(Debug)]
pub(crate) struct LogPanel {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl LogPanel {
    /// `capacity == 0` keeps every entry.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    pub(crate) fn append(&mut self, message: impl Into<String>) {
        self.append_at(&Local::now(), message);
    }

    /// Line breaks in `message` are folded so every entry renders as one line.
    pub(crate) fn append_at(&mut self, at: &DateTime<Local>, message: impl Into<String>) {
        let mut message = message.into();
        if message.contains(['\r', '\n']) {
            message = message.split_whitespace().collect::<Vec<_>>().join(" ");
        }
        self.entries.push_front(LogEntry {
            timestamp: local_time(at),
            message,
        });
        if self.capacity > 0 {
            self.entries.truncate(self.capacity);
        }
    }

    /// Entries newest first.
    pub(crate) fn entries(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Full panel text: one line per entry, newest first.
    pub(crate) fn text(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}\n", entry.line()))
            .collect()
    }
}
