//! Integration tests for the capture session pipeline.
//!
//! Events are seeded through the capture channel exactly as the hook
//! thread would deliver them, and transcripts go to in-memory or temp-file
//! sinks, so the full pipeline runs without any real typing.

use keytrace::capture::{CaptureConfig, KeyCapture, KeyEvent};
use keytrace::session::{CaptureSession, SessionError, SessionInfo, SessionLogger, StopReason};
use keytrace::translate::{vk, Compose, KeyTranslator};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Composer with a one-letter layout: VK 0x41 composes to "a".
struct MapComposer;

impl Compose for MapComposer {
    fn compose(&self, vk_code: u32, _scan_code: u32, _key_state: &[u8; 256]) -> Option<String> {
        match vk_code {
            0x41 => Some("a".to_string()),
            _ => None,
        }
    }
}

/// Sink that drops writes while the flag is set.
struct FlakySink {
    failing: Arc<AtomicBool>,
    written: Vec<u8>,
}

impl Write for FlakySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn key(vk_code: u32) -> KeyEvent {
    KeyEvent::new(vk_code, 0, [0u8; 256])
}

fn temp_log_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("keytrace-test-{name}-{}.txt", std::process::id()))
}

#[test]
fn test_stop_key_ends_session_and_is_logged() {
    let capture = KeyCapture::new(CaptureConfig::default());
    let sender = capture.sender();

    let mut session = CaptureSession::new(
        capture,
        KeyTranslator::with_composer(Box::new(MapComposer)),
        SessionLogger::new(Vec::new()),
        SessionInfo::gather(PathBuf::from("keylog.txt")),
    );

    // Queue a letter, Enter, then the stop key, as the hook would deliver them
    sender.send(key(0x41)).expect("send failed");
    sender.send(key(vk::ENTER)).expect("send failed");
    sender.send(key(vk::F12)).expect("send failed");

    let interrupt = AtomicBool::new(false);
    let summary = session.run(&interrupt).expect("session failed");

    // The stop key itself is the last counted event
    assert_eq!(summary.event_count, 3);

    let transcript = String::from_utf8(session.logger().get_ref().clone()).unwrap();
    assert_eq!(transcript.matches("CAPTURE SESSION STARTED").count(), 1);
    assert_eq!(transcript.matches("CAPTURE SESSION ENDED").count(), 1);

    // Entries are appended verbatim: only Enter's token breaks the line
    assert!(transcript.contains("] a["));
    assert!(transcript.contains("[ENTER]\n"));
    assert!(transcript.contains("] [F12]"));
    assert!(transcript.contains("Stop trigger: stop key"));
}

#[test]
fn test_interrupt_drains_queued_events() {
    let capture = KeyCapture::new(CaptureConfig::default());
    let sender = capture.sender();

    let mut session = CaptureSession::new(
        capture,
        KeyTranslator::with_composer(Box::new(MapComposer)),
        SessionLogger::new(Vec::new()),
        SessionInfo::gather(PathBuf::from("keylog.txt")),
    );

    sender.send(key(0x41)).expect("send failed");
    sender.send(key(0x41)).expect("send failed");

    // Ctrl+C raised before the loop ever runs
    let interrupt = AtomicBool::new(true);
    let summary = session.run(&interrupt).expect("session failed");

    // Queued events still belong to the session
    assert_eq!(summary.event_count, 2);

    let transcript = String::from_utf8(session.logger().get_ref().clone()).unwrap();
    assert!(transcript.contains("Stop trigger: Ctrl+C"));
}

#[test]
fn test_failed_append_still_counts_the_event() {
    let failing = Arc::new(AtomicBool::new(false));
    let capture = KeyCapture::new(CaptureConfig::default());

    let sink = FlakySink {
        failing: failing.clone(),
        written: Vec::new(),
    };
    let mut session = CaptureSession::new(
        capture,
        KeyTranslator::with_composer(Box::new(MapComposer)),
        SessionLogger::new(sink),
        SessionInfo::gather(PathBuf::from("keylog.txt")),
    );

    session.begin().expect("begin failed");

    // The sink goes down for one keystroke, then recovers
    failing.store(true, Ordering::SeqCst);
    session.handle_event(&key(0x41));
    failing.store(false, Ordering::SeqCst);
    session.handle_event(&key(0x41));

    let summary = session.finish(StopReason::Interrupt);
    assert_eq!(summary.event_count, 2);

    let text = String::from_utf8(session.logger().get_ref().written.clone()).unwrap();
    assert!(text.contains("Total keystrokes: 2"));
}

#[test]
fn test_start_banner_failure_aborts_the_session() {
    let failing = Arc::new(AtomicBool::new(true));
    let capture = KeyCapture::new(CaptureConfig::default());

    let sink = FlakySink {
        failing: failing.clone(),
        written: Vec::new(),
    };
    let mut session = CaptureSession::new(
        capture,
        KeyTranslator::with_composer(Box::new(MapComposer)),
        SessionLogger::new(sink),
        SessionInfo::gather(PathBuf::from("keylog.txt")),
    );

    // The sink rejects the start banner, so the session must not come up
    assert!(matches!(session.begin(), Err(SessionError::Io(_))));
    assert!(session.logger().get_ref().written.is_empty());

    // The failed start released the capture: once the sink recovers, a
    // fresh begin does not trip the already-running guard
    failing.store(false, Ordering::SeqCst);
    session.begin().expect("begin after recovery failed");

    let summary = session.finish(StopReason::Interrupt);
    assert_eq!(summary.event_count, 0);
}

#[test]
fn test_end_banner_failure_still_yields_the_summary() {
    let failing = Arc::new(AtomicBool::new(false));
    let capture = KeyCapture::new(CaptureConfig::default());

    let sink = FlakySink {
        failing: failing.clone(),
        written: Vec::new(),
    };
    let mut session = CaptureSession::new(
        capture,
        KeyTranslator::with_composer(Box::new(MapComposer)),
        SessionLogger::new(sink),
        SessionInfo::gather(PathBuf::from("keylog.txt")),
    );

    session.begin().expect("begin failed");
    session.handle_event(&key(0x41));

    // The sink dies before the end banner; closing out must still work
    failing.store(true, Ordering::SeqCst);
    let summary = session.finish(StopReason::Interrupt);
    assert_eq!(summary.event_count, 1);

    // Still idempotent in the degraded state
    let again = session.finish(StopReason::StopKey);
    assert_eq!(again, summary);

    let text = String::from_utf8(session.logger().get_ref().written.clone()).unwrap();
    assert!(text.contains("CAPTURE SESSION STARTED"));
    assert!(!text.contains("CAPTURE SESSION ENDED"));
}

#[test]
fn test_repeated_runs_append_to_the_same_transcript() {
    let path = temp_log_path("append");
    let _ = std::fs::remove_file(&path);

    for _ in 0..2 {
        let capture = KeyCapture::new(CaptureConfig::default());
        let sender = capture.sender();
        sender.send(key(vk::F12)).expect("send failed");

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .expect("open failed");
        let mut session = CaptureSession::new(
            capture,
            KeyTranslator::with_composer(Box::new(MapComposer)),
            SessionLogger::new(file),
            SessionInfo::gather(path.clone()),
        );
        session.run(&AtomicBool::new(false)).expect("session failed");
    }

    let text = std::fs::read_to_string(&path).expect("read failed");
    assert_eq!(text.matches("CAPTURE SESSION STARTED").count(), 2);
    assert_eq!(text.matches("CAPTURE SESSION ENDED").count(), 2);

    let _ = std::fs::remove_file(&path);
}
