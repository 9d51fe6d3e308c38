//! keytrace - transparent keystroke transcript recorder.
//!
//! This library captures system-wide key-down events through the platform's
//! low-level keyboard hook, translates each virtual key into a readable
//! token, and appends a timestamped transcript to a local log file together
//! with session statistics.
//!
//! It is built for a single local operator watching their own machine: the
//! tool runs as a visible foreground process, announces what it records and
//! where, writes only to a local file, and contains no network code.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          keytrace                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐     ┌─────────────┐     ┌────────────────┐   │
//! │  │  Capture   │────▶│  Translate  │────▶│    Session     │   │
//! │  │ (OS hook)  │     │ (vk→token)  │     │ stats + log    │   │
//! │  └────────────┘     └─────────────┘     └────────────────┘   │
//! │        │                                        │            │
//! │        ▼                                        ▼            │
//! │  bounded channel                         transcript file     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use keytrace::capture::{CaptureConfig, KeyCapture};
//! use keytrace::session::{CaptureSession, SessionInfo, SessionLogger};
//! use keytrace::translate::KeyTranslator;
//! use std::sync::atomic::AtomicBool;
//!
//! let capture = KeyCapture::new(CaptureConfig::default());
//! let logger = SessionLogger::new(Vec::new());
//! let info = SessionInfo::gather("keylog.txt".into());
//! let mut session = CaptureSession::new(capture, KeyTranslator::new(), logger, info);
//!
//! let interrupt = AtomicBool::new(false);
//! let summary = session.run(&interrupt).expect("capture failed");
//! println!("{} keystrokes", summary.event_count);
//! ```

pub mod capture;
pub mod config;
pub mod session;
pub mod translate;

// Re-export key types at crate root for convenience
pub use capture::{CaptureConfig, CaptureError, KeyCapture, KeyDisposition, KeyEvent};
pub use config::Config;
pub use session::{
    CaptureSession, SessionError, SessionInfo, SessionLogger, SessionStats, StopReason, Summary,
};
pub use translate::{KeyTranslator, TranslatedToken};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Operator notice that can be displayed to users.
pub const OPERATOR_NOTICE: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║                    KEYTRACE - OPERATOR NOTICE                    ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  This tool records EVERY keystroke typed on this machine,        ║
║  including passwords and private messages, while it runs.        ║
║                                                                  ║
║  WHAT IT DOES:                                                   ║
║    • Runs as a visible foreground console process                ║
║    • Appends the transcript to one local file                    ║
║    • Withholds only the stop key from other applications         ║
║                                                                  ║
║  WHAT IT NEVER DOES:                                             ║
║    • No network code: nothing ever leaves this machine           ║
║    • No hiding: no background service, no disguised process      ║
║    • No capture after the stop key or Ctrl+C                     ║
║                                                                  ║
║  Use it only on a machine you own or administer, to record       ║
║  your own typing. Recording other people without their           ║
║  consent is illegal in most jurisdictions.                       ║
║                                                                  ║
║  The transcript location is printed at startup and shown by:     ║
║    keytrace config                                               ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
