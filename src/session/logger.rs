//! Transcript logging.
//!
//! The logger owns nothing but a writable sink. Every write is flushed
//! immediately: the event rate is human typing speed, and a transcript that
//! survives abrupt termination is worth more than write throughput.
//!
//! Transcript entries are appended exactly as given, with no separator; the
//! `[ENTER]` token carries the only line break, so a transcript line shows
//! everything typed up to the Enter press.

use chrono::{DateTime, Local};
use std::io::{self, Write};
use std::path::PathBuf;
use uuid::Uuid;

use crate::session::stats::Summary;
use crate::session::StopReason;

const BANNER_RULE: &str = "═══════════════════════════════════════════════════";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Identity of one capture session, shown in the start banner and on the
/// console.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub pid: u32,
    pub machine: String,
    pub user: String,
    pub log_path: PathBuf,
    pub started: DateTime<Local>,
}

impl SessionInfo {
    /// Gather session identity from the environment.
    pub fn gather(log_path: PathBuf) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            pid: std::process::id(),
            machine: hostname::get()
                .map(|h| h.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "unknown".to_string()),
            user: std::env::var("USERNAME")
                .or_else(|_| std::env::var("USER"))
                .unwrap_or_else(|_| "unknown".to_string()),
            log_path,
            started: Local::now(),
        }
    }
}

/// Appends banners and keystroke entries to the transcript sink.
pub struct SessionLogger<W: Write> {
    sink: W,
}

impl<W: Write> SessionLogger<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Write the block that opens a session in the transcript.
    ///
    /// A leading blank line separates this session from whatever an earlier
    /// run appended to the same file.
    pub fn write_start_banner(&mut self, info: &SessionInfo) -> io::Result<()> {
        writeln!(self.sink)?;
        writeln!(self.sink, "{BANNER_RULE}")?;
        writeln!(self.sink, "CAPTURE SESSION STARTED")?;
        writeln!(self.sink, "{BANNER_RULE}")?;
        writeln!(self.sink, "Date: {}", info.started.format(TIME_FORMAT))?;
        writeln!(self.sink, "Session: {}", info.session_id)?;
        writeln!(self.sink, "Process ID: {}", info.pid)?;
        writeln!(self.sink, "Machine: {}", info.machine)?;
        writeln!(self.sink, "User: {}", info.user)?;
        writeln!(self.sink, "Log file: {}", info.log_path.display())?;
        writeln!(self.sink, "{BANNER_RULE}")?;
        writeln!(self.sink, "KEYSTROKE LOG:")?;
        writeln!(self.sink, "{BANNER_RULE}")?;
        self.sink.flush()
    }

    /// Append one keystroke entry verbatim and flush.
    pub fn write_entry(&mut self, entry: &str) -> io::Result<()> {
        self.sink.write_all(entry.as_bytes())?;
        self.sink.flush()
    }

    /// Write the block that closes a session in the transcript.
    ///
    /// Starts with a line break to terminate a partial transcript line (the
    /// final entry rarely ends in a newline) and ends with a blank line.
    pub fn write_end_banner(&mut self, summary: &Summary, reason: StopReason) -> io::Result<()> {
        writeln!(self.sink)?;
        writeln!(self.sink, "{BANNER_RULE}")?;
        writeln!(self.sink, "CAPTURE SESSION ENDED")?;
        writeln!(self.sink, "{BANNER_RULE}")?;
        writeln!(self.sink, "Stop trigger: {reason}")?;
        writeln!(self.sink, "Start time: {}", summary.start_time.format(TIME_FORMAT))?;
        writeln!(self.sink, "End time: {}", summary.end_time.format(TIME_FORMAT))?;
        writeln!(self.sink, "Duration: {}", summary.duration_display())?;
        writeln!(self.sink, "Total keystrokes: {}", summary.event_count)?;
        writeln!(
            self.sink,
            "Average rate: {:.2} keys/min",
            summary.events_per_minute()
        )?;
        writeln!(self.sink, "{BANNER_RULE}")?;
        writeln!(self.sink)?;
        self.sink.flush()
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }
}
