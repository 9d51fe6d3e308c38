//! Non-Windows (noop) implementation of keystroke capture.
//!
//! This exists so the crate (and binary) can compile on targets without a
//! low-level keyboard hook facility. No system events are produced, but the
//! event channel is real: `sender()` feeds it, which is how the session
//! pipeline is exercised in tests.

use crate::capture::types::{CaptureConfig, CaptureError, KeyEvent};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A capture backend that never produces system events.
pub struct NoopCapture {
    config: CaptureConfig,
    sender: Sender<KeyEvent>,
    receiver: Receiver<KeyEvent>,
    running: Arc<AtomicBool>,
}

impl NoopCapture {
    /// Create a new noop capture backend.
    pub fn new(config: CaptureConfig) -> Self {
        // Use a bounded channel to prevent unbounded memory growth
        let (sender, receiver) = bounded(1024);
        Self {
            config,
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start capturing events.
    ///
    /// On targets without a hook facility this only marks the backend as
    /// running.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CaptureError::AlreadyRunning);
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Stop capturing events.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the backend is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The virtual-key code that ends the session.
    pub fn stop_key(&self) -> u32 {
        self.config.stop_key
    }

    /// Get the receiver for key events.
    pub fn receiver(&self) -> &Receiver<KeyEvent> {
        &self.receiver
    }

    /// Get a sender connected to the event channel.
    ///
    /// Events pushed here reach the session loop exactly as captured ones
    /// would.
    pub fn sender(&self) -> Sender<KeyEvent> {
        self.sender.clone()
    }
}
