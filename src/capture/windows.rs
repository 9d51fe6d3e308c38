//! Windows implementation of keystroke capture using a low-level keyboard
//! hook.
//!
//! A dedicated thread installs `WH_KEYBOARD_LL` and pumps messages; the OS
//! delivers key-down notifications to the hook callback on that thread. The
//! callback copies each event out of OS-owned memory, snapshots the keyboard
//! state, and hands the event over a bounded channel. The configured stop
//! key is the one key the callback withholds from the rest of the system.

use crate::capture::types::{
    key_disposition, CaptureConfig, CaptureError, KeyDisposition, KeyEvent,
};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::Input::KeyboardAndMouse::GetKeyboardState;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, PeekMessageW, SetWindowsHookExW, TranslateMessage,
    UnhookWindowsHookEx, HHOOK, KBDLLHOOKSTRUCT, MSG, PM_REMOVE, WH_KEYBOARD_LL, WM_KEYDOWN,
    WM_SYSKEYDOWN,
};

/// The Windows capture backend.
pub struct WindowsCapture {
    config: CaptureConfig,
    sender: Sender<KeyEvent>,
    receiver: Receiver<KeyEvent>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl WindowsCapture {
    /// Create a new Windows capture backend with the given configuration.
    pub fn new(config: CaptureConfig) -> Self {
        // Use a bounded channel to prevent unbounded memory growth
        let (sender, receiver) = bounded(1024);

        Self {
            config,
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// Start capturing events in a background thread.
    ///
    /// Blocks until the hook is installed so a registration failure is
    /// reported here rather than lost inside the thread.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CaptureError::AlreadyRunning);
        }

        self.running.store(true, Ordering::SeqCst);

        let sender = self.sender.clone();
        let running = self.running.clone();
        let stop_key = self.config.stop_key;

        // One-shot handshake carrying the hook installation result
        let (ready_sender, ready_receiver) = bounded::<Result<(), CaptureError>>(1);

        let handle = thread::spawn(move || {
            run_hook_loop(sender, running.clone(), stop_key, ready_sender);
            running.store(false, Ordering::SeqCst);
        });

        match ready_receiver.recv() {
            Ok(Ok(())) => {
                self.thread_handle = Some(handle);
                Ok(())
            }
            Ok(Err(e)) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(CaptureError::HookInstall(
                    "hook thread exited before reporting".to_string(),
                ))
            }
        }
    }

    /// Stop capturing events.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            // The thread exits within one pump interval of the flag clearing
            let _ = handle.join();
        }
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

impl Drop for WindowsCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// State consulted by the hook callback.
struct HookShared {
    sender: Sender<KeyEvent>,
    active: Arc<AtomicBool>,
    stop_key: u32,
}

// The callback has no argument channel, so its state lives in thread-local
// storage on the hook thread rather than in true globals.
thread_local! {
    static HOOK_SHARED: RefCell<Option<HookShared>> = const { RefCell::new(None) };
}

/// Low-level keyboard hook callback.
///
/// Runs under the OS hook timeout, so the work here is fixed and small:
/// copy the event, snapshot keyboard state, try_send, decide forward or
/// block. All translation and file I/O happens on the session thread.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code >= 0 {
        let w_param_u32 = w_param.0 as u32;

        // Only the down-edge is recorded; key-up notifications pass through
        if matches!(w_param_u32, WM_KEYDOWN | WM_SYSKEYDOWN) {
            // Copy everything out of OS-owned memory before the callback
            // returns
            let kb_struct = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
            let vk_code = kb_struct.vkCode;
            let scan_code = kb_struct.scanCode;

            let mut key_state = [0u8; 256];
            let _ = GetKeyboardState(&mut key_state);

            let blocked = HOOK_SHARED.with(|shared| {
                if let Some(ref hook) = *shared.borrow() {
                    if !hook.active.load(Ordering::SeqCst) {
                        return false;
                    }

                    let event = KeyEvent::new(vk_code, scan_code, key_state);
                    let _ = hook.sender.try_send(event);

                    if key_disposition(vk_code, hook.stop_key) == KeyDisposition::Block {
                        // The stop key is the last captured event and is not
                        // delivered to other applications
                        hook.active.store(false, Ordering::SeqCst);
                        return true;
                    }
                }
                false
            });

            if blocked {
                return LRESULT(1);
            }
        }
    }

    // Pass the event to the next hook
    CallNextHookEx(HHOOK::default(), n_code, w_param, l_param)
}

/// Install the hook and pump messages until the running flag clears.
fn run_hook_loop(
    sender: Sender<KeyEvent>,
    running: Arc<AtomicBool>,
    stop_key: u32,
    ready: Sender<Result<(), CaptureError>>,
) {
    HOOK_SHARED.with(|shared| {
        *shared.borrow_mut() = Some(HookShared {
            sender,
            active: running.clone(),
            stop_key,
        });
    });

    unsafe {
        match SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), None, 0) {
            Ok(hook) => {
                let _ = ready.send(Ok(()));
                log::debug!("keyboard hook installed");

                // Hook callbacks are delivered while this thread retrieves
                // messages. The pump stays non-blocking so the running flag
                // is observed within one sleep interval.
                let mut msg = MSG::default();
                while running.load(Ordering::SeqCst) {
                    while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).as_bool() {
                        let _ = TranslateMessage(&msg);
                        DispatchMessageW(&msg);
                    }
                    thread::sleep(Duration::from_millis(10));
                }

                let _ = UnhookWindowsHookEx(hook);
                log::debug!("keyboard hook removed");
            }
            Err(e) => {
                let _ = ready.send(Err(CaptureError::HookInstall(e.to_string())));
            }
        }
    }

    HOOK_SHARED.with(|shared| {
        *shared.borrow_mut() = None;
    });
}
