//! Keystroke capture module.
//!
//! Platform backends deliver key-down events over a bounded channel.
//! Windows installs a low-level keyboard hook; every other target gets a
//! noop backend so the platform-independent parts build and test anywhere.

pub mod types;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(not(target_os = "windows"))]
pub mod noop;

// Re-export commonly used types
pub use types::{key_disposition, CaptureConfig, CaptureError, KeyDisposition, KeyEvent};

#[cfg(target_os = "windows")]
pub use self::windows::WindowsCapture;

/// Platform-agnostic capture type alias
#[cfg(target_os = "windows")]
pub type KeyCapture = WindowsCapture;

#[cfg(not(target_os = "windows"))]
pub use noop::NoopCapture;

/// Platform-agnostic capture type alias
#[cfg(not(target_os = "windows"))]
pub type KeyCapture = NoopCapture;
