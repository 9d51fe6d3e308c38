//! Event types shared by the capture backends.

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::translate::vk;

/// A single key-down notification, copied out of the OS hook data before the
/// callback returns.
///
/// The keyboard-state snapshot is taken at event time so translation later
/// sees the modifier state that was active when the key went down, not the
/// state at translation time.
#[derive(Debug, Clone)]
pub struct KeyEvent {
    /// Virtual-key code reported by the hook
    pub vk_code: u32,
    /// Hardware scan code reported by the hook
    pub scan_code: u32,
    /// Wall-clock time when the event was captured
    pub timestamp: DateTime<Local>,
    /// 256-entry keyboard state (modifier and toggle keys) at capture time
    pub key_state: [u8; 256],
}

impl KeyEvent {
    pub fn new(vk_code: u32, scan_code: u32, key_state: [u8; 256]) -> Self {
        Self {
            vk_code,
            scan_code,
            timestamp: Local::now(),
            key_state,
        }
    }
}

/// Configuration for the capture backend.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Virtual-key code that ends the session; this key is withheld from
    /// other applications when captured
    pub stop_key: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            stop_key: vk::F12,
        }
    }
}

/// What the hook does with a key after capturing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Deliver the key to the rest of the system as usual
    Forward,
    /// Withhold the key from other applications
    Block,
}

/// Decide whether a captured key is forwarded or blocked.
///
/// Only the configured stop key is ever blocked.
pub fn key_disposition(vk_code: u32, stop_key: u32) -> KeyDisposition {
    if vk_code == stop_key {
        KeyDisposition::Block
    } else {
        KeyDisposition::Forward
    }
}

/// Errors that can occur during keystroke capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Capture is already running")]
    AlreadyRunning,
    #[error("Failed to install keyboard hook: {0}")]
    HookInstall(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_event_copies_fields() {
        let mut state = [0u8; 256];
        state[vk::SHIFT as usize] = 0x80;

        let event = KeyEvent::new(0x41, 30, state);
        assert_eq!(event.vk_code, 0x41);
        assert_eq!(event.scan_code, 30);
        assert_eq!(event.key_state[vk::SHIFT as usize], 0x80);
    }

    #[test]
    fn test_default_stop_key_is_f12() {
        assert_eq!(CaptureConfig::default().stop_key, vk::F12);
    }

    #[test]
    fn test_only_the_stop_key_is_blocked() {
        assert_eq!(key_disposition(vk::F12, vk::F12), KeyDisposition::Block);
        assert_eq!(key_disposition(vk::F11, vk::F12), KeyDisposition::Forward);
        assert_eq!(key_disposition(0x41, vk::F12), KeyDisposition::Forward);
        assert_eq!(key_disposition(vk::ENTER, vk::F12), KeyDisposition::Forward);

        // The rule follows the configured key, not F12 specifically
        assert_eq!(key_disposition(vk::F5, vk::F5), KeyDisposition::Block);
        assert_eq!(key_disposition(vk::F12, vk::F5), KeyDisposition::Forward);
    }
}
