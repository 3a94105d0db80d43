//! Operator status line
//!
//! The session reports every cursor transition as a single status line of
//! the form `(position of total) name - verb`. The terminal sink rewrites the
//! previous line in place so the console shows one live line per run.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing::debug;

/// What the session is doing with the asset at the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusVerb {
    Cropping,
    Saving,
}

impl fmt::Display for StatusVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusVerb::Cropping => f.write_str("Cropping"),
            StatusVerb::Saving => f.write_str("Saving"),
        }
    }
}

/// One status update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// 1-based position in the queue
    pub position: usize,
    pub total: usize,
    pub name: String,
    pub verb: StatusVerb,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({} of {}) {} - {}",
            self.position, self.total, self.name, self.verb
        )
    }
}

/// Receiver of status updates
pub trait StatusSink: Send {
    fn report(&mut self, line: &StatusLine);
}

/// Writes status lines to stdout, replacing the previous one
#[derive(Debug, Default)]
pub struct TerminalStatusSink {
    has_status: bool,
}

impl TerminalStatusSink {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Move up one line and clear it
const CLEAR_PREVIOUS_LINE: &str = "\x1b[1A\x1b[2K";

impl StatusSink for TerminalStatusSink {
    fn report(&mut self, line: &StatusLine) {
        let mut out = std::io::stdout().lock();
        let prefix = if self.has_status { CLEAR_PREVIOUS_LINE } else { "" };
        // Console output is best effort; a closed stdout must not fail a step
        if writeln!(out, "{}{}", prefix, line).and_then(|_| out.flush()).is_ok() {
            self.has_status = true;
        }
        debug!("status: {}", line);
    }
}

/// Keeps every reported line in memory
///
/// Clones share the same buffer, so a test can hand one clone to the session
/// and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingStatusSink {
    lines: Arc<Mutex<Vec<StatusLine>>>,
}

impl RecordingStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<StatusLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Rendered text of the most recent line (what the terminal would show)
    pub fn current(&self) -> Option<String> {
        self.lines().last().map(ToString::to_string)
    }
}

impl StatusSink for RecordingStatusSink {
    fn report(&mut self, line: &StatusLine) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_format() {
        let line = StatusLine {
            position: 2,
            total: 5,
            name: "ArrowIcon.svg".to_string(),
            verb: StatusVerb::Saving,
        };
        assert_eq!(line.to_string(), "(2 of 5) ArrowIcon.svg - Saving");
    }

    #[test]
    fn test_recording_sink_shares_buffer() {
        let sink = RecordingStatusSink::new();
        let mut handle = sink.clone();
        handle.report(&StatusLine {
            position: 1,
            total: 1,
            name: "a.svg".to_string(),
            verb: StatusVerb::Cropping,
        });
        assert_eq!(sink.lines().len(), 1);
        assert_eq!(sink.current().as_deref(), Some("(1 of 1) a.svg - Cropping"));
    }
}
