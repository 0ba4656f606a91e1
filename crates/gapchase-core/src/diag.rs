use std::collections::VecDeque;

use crate::events::{Severity, SimEvent};

/// Default number of lines retained before the oldest are dropped.
pub const DEFAULT_LOG_CAPACITY: usize = 512;

/// Line-oriented diagnostic stream fed from typed simulation events.
///
/// This is the compatibility boundary for consumers that match on log text.
/// Lines are recorded synchronously, in event order, during the tick that
/// produced them.
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    lines: VecDeque<DiagnosticLine>,
    capacity: usize,
    min_severity: Severity,
}

/// A single recorded line.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticLine {
    pub text: String,
    pub severity: Severity,
    /// Simulation time (seconds since round start) when the line was recorded.
    pub sim_time: f32,
}

impl DiagnosticLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity: capacity.max(1),
            min_severity: Severity::Ambient,
        }
    }

    /// Drop events below `severity` instead of recording them.
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    /// Record one event.
    pub fn record(&mut self, event: &SimEvent, sim_time: f32) {
        let severity = event.severity();
        if severity < self.min_severity {
            return;
        }
        let text = event.diagnostic_line();
        tracing::trace!(?severity, sim_time, "{text}");
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(DiagnosticLine {
            text,
            severity,
            sim_time,
        });
    }

    pub fn record_all(&mut self, events: &[SimEvent], sim_time: f32) {
        for event in events {
            self.record(event, sim_time);
        }
    }

    /// Retained lines, oldest first.
    pub fn lines(&self) -> &VecDeque<DiagnosticLine> {
        &self.lines
    }

    /// Whether any retained line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.text.contains(needle))
    }

    /// Number of retained lines containing `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.lines.iter().filter(|l| l.text.contains(needle)).count()
    }

    /// Take every retained line, leaving the log empty.
    pub fn drain(&mut self) -> Vec<DiagnosticLine> {
        self.lines.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// All retained lines joined with newlines.
    pub fn display_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
