//! Session statistics.
//!
//! One `SessionStats` instance exists per capture run and is mutated only
//! by the session loop, so plain fields are enough; there is no cross-thread
//! access to synchronize.

use chrono::{DateTime, Local};

/// Keystroke counter and timing for one capture session.
#[derive(Debug, Default)]
pub struct SessionStats {
    start: Option<DateTime<Local>>,
    end: Option<DateTime<Local>>,
    event_count: u64,
    running: bool,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the session start.
    ///
    /// Callable exactly once per instance; a second call is a programming
    /// error and trips a debug assertion.
    pub fn start(&mut self) {
        debug_assert!(self.start.is_none(), "session stats started twice");
        self.start = Some(Local::now());
        self.event_count = 0;
        self.running = true;
    }

    /// Count one processed key-down event.
    pub fn record_event(&mut self) {
        debug_assert!(self.running, "event recorded outside a running session");
        if self.running {
            self.event_count += 1;
        }
    }

    /// Mark the session end and return the final numbers.
    pub fn stop(&mut self) -> Summary {
        debug_assert!(self.running, "session stats stopped before start");
        let end = Local::now();
        self.end = Some(end);
        self.running = false;

        Summary {
            start_time: self.start.unwrap_or(end),
            end_time: end,
            event_count: self.event_count,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }
}

/// Final numbers for a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub event_count: u64,
}

impl Summary {
    /// Session length in whole seconds, clamped to zero if the clock moved
    /// backwards between start and stop.
    pub fn duration_secs(&self) -> u64 {
        (self.end_time - self.start_time).num_seconds().max(0) as u64
    }

    /// Session length as `MM:SS`, or `HH:MM:SS` from one hour up.
    pub fn duration_display(&self) -> String {
        format_duration(self.duration_secs())
    }

    /// Average keystrokes per minute over the whole session.
    ///
    /// A session stopped within the second it started has zero measured
    /// duration; the division is guarded and reports 0.0 rather than a
    /// non-finite value.
    pub fn events_per_minute(&self) -> f64 {
        let secs = self.duration_secs();
        if secs == 0 {
            return 0.0;
        }
        self.event_count as f64 / (secs as f64 / 60.0)
    }
}

/// Format a duration in seconds as zero-padded `MM:SS`, switching to
/// `HH:MM:SS` from one hour up.
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
