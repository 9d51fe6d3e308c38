//! Capture session lifecycle.
//!
//! A `CaptureSession` owns the whole pipeline for one run: the capture
//! backend, the translator, the statistics, and the transcript logger.
//! Events arrive over the capture channel and are processed one at a time
//! on the caller's thread, so the statistics and the log sink each have a
//! single writer and need no locking.

pub mod logger;
pub mod stats;

pub use logger::{SessionInfo, SessionLogger};
pub use stats::{format_duration, SessionStats, Summary};

use crossbeam_channel::RecvTimeoutError;
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

use crate::capture::{key_disposition, CaptureError, KeyCapture, KeyDisposition, KeyEvent};
use crate::translate::KeyTranslator;

/// What ended a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured stop key was pressed (and withheld system-wide)
    StopKey,
    /// The operator interrupt signal (Ctrl+C)
    Interrupt,
    /// The capture backend closed its channel
    Shutdown,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::StopKey => write!(f, "stop key"),
            StopReason::Interrupt => write!(f, "Ctrl+C"),
            StopReason::Shutdown => write!(f, "event source closed"),
        }
    }
}

/// Errors that can occur while running a capture session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("Log sink error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session already started")]
    AlreadyStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    Capturing,
    Stopped,
}

/// One capture run from start banner to end banner.
pub struct CaptureSession<W: Write> {
    capture: KeyCapture,
    translator: KeyTranslator,
    stats: SessionStats,
    logger: SessionLogger<W>,
    info: SessionInfo,
    stop_key: u32,
    state: SessionState,
    summary: Option<Summary>,
}

impl<W: Write> CaptureSession<W> {
    pub fn new(
        capture: KeyCapture,
        translator: KeyTranslator,
        logger: SessionLogger<W>,
        info: SessionInfo,
    ) -> Self {
        let stop_key = capture.stop_key();
        Self {
            capture,
            translator,
            stats: SessionStats::new(),
            logger,
            info,
            stop_key,
            state: SessionState::Idle,
            summary: None,
        }
    }

    /// Run the session to completion: begin capturing unless `begin` was
    /// already called, process events until a stop condition, close out,
    /// and return the summary.
    ///
    /// `interrupt` is the operator cancellation token (set from the Ctrl+C
    /// handler); it is polled at the top of each loop iteration, so
    /// cancellation latency is bounded by the receive timeout.
    pub fn run(&mut self, interrupt: &AtomicBool) -> Result<Summary, SessionError> {
        if self.state == SessionState::Idle {
            self.begin()?;
        }

        let receiver = self.capture.receiver().clone();
        let reason = loop {
            if interrupt.load(Ordering::SeqCst) {
                break StopReason::Interrupt;
            }

            match receiver.recv_timeout(Duration::from_millis(100)) {
                Ok(event) => {
                    if self.handle_event(&event) == KeyDisposition::Block {
                        break StopReason::StopKey;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    // The callback deactivates the backend when it swallows
                    // the stop key; if that event was dropped by a full
                    // channel, the cleared flag is the only remaining stop
                    // signal
                    if !self.capture.is_running() {
                        break StopReason::StopKey;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break StopReason::Shutdown,
            }
        };

        Ok(self.finish(reason))
    }

    /// Transition from idle to capturing.
    ///
    /// The hook is registered before the start banner is written, so a
    /// registration failure leaves no half-open session in the transcript.
    pub fn begin(&mut self) -> Result<(), SessionError> {
        debug_assert!(
            self.state == SessionState::Idle,
            "capture session started twice"
        );
        if self.state != SessionState::Idle {
            return Err(SessionError::AlreadyStarted);
        }

        self.capture.start()?;

        if let Err(e) = self.logger.write_start_banner(&self.info) {
            self.capture.stop();
            return Err(SessionError::Io(e));
        }

        self.stats.start();
        self.state = SessionState::Capturing;
        Ok(())
    }

    /// Process one captured event: translate it, append the transcript
    /// entry, count it, and report what the hook did with the key.
    pub fn handle_event(&mut self, event: &KeyEvent) -> KeyDisposition {
        let token = self
            .translator
            .translate(event.vk_code, event.scan_code, &event.key_state);
        let entry = format!(
            "[{}] {}",
            event.timestamp.format("%H:%M:%S%.3f"),
            token.as_str()
        );

        // A failed append goes to the side channel; the count tracks what
        // was captured, not what reached the disk
        if let Err(e) = self.logger.write_entry(&entry) {
            log::warn!("transcript write failed: {e}");
        }
        self.stats.record_event();

        key_disposition(event.vk_code, self.stop_key)
    }

    /// Stop capturing and close out the session.
    ///
    /// The first call wins; later calls return the same summary without
    /// writing a second end banner.
    pub fn finish(&mut self, reason: StopReason) -> Summary {
        if let Some(ref summary) = self.summary {
            return summary.clone();
        }

        self.capture.stop();

        // Events already queued when the hook came down still belong to
        // this session; process them before the books close
        let receiver = self.capture.receiver().clone();
        while let Ok(event) = receiver.try_recv() {
            let _ = self.handle_event(&event);
        }

        let summary = self.stats.stop();
        if let Err(e) = self.logger.write_end_banner(&summary, reason) {
            log::warn!("end banner write failed: {e}");
        }
        log::debug!("capture session ended: {reason}");

        self.state = SessionState::Stopped;
        self.summary = Some(summary.clone());
        summary
    }

    /// Access the transcript logger.
    pub fn logger(&self) -> &SessionLogger<W> {
        &self.logger
    }
}
