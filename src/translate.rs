//! Virtual-key translation.
//!
//! Every key-down event becomes exactly one token: a fixed label for named
//! keys, text composed from the active keyboard layout for printable keys,
//! or a hex fallback for anything the layout cannot compose. Translation
//! never fails.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Virtual-key codes used by the named-key table and the stop-key logic.
///
/// Kept as plain `u32` constants so the table and the stop-key handling
/// compile on targets without the platform key definitions.
pub mod vk {
    pub const BACKSPACE: u32 = 0x08;
    pub const TAB: u32 = 0x09;
    pub const ENTER: u32 = 0x0D;
    pub const SHIFT: u32 = 0x10;
    pub const CONTROL: u32 = 0x11;
    pub const ALT: u32 = 0x12;
    pub const CAPS_LOCK: u32 = 0x14;
    pub const ESCAPE: u32 = 0x1B;
    pub const SPACE: u32 = 0x20;
    pub const PAGE_UP: u32 = 0x21;
    pub const PAGE_DOWN: u32 = 0x22;
    pub const END: u32 = 0x23;
    pub const HOME: u32 = 0x24;
    pub const LEFT: u32 = 0x25;
    pub const UP: u32 = 0x26;
    pub const RIGHT: u32 = 0x27;
    pub const DOWN: u32 = 0x28;
    pub const PRINT_SCREEN: u32 = 0x2C;
    pub const INSERT: u32 = 0x2D;
    pub const DELETE: u32 = 0x2E;
    pub const LEFT_WIN: u32 = 0x5B;
    pub const RIGHT_WIN: u32 = 0x5C;
    pub const NUMPAD0: u32 = 0x60;
    pub const NUMPAD1: u32 = 0x61;
    pub const NUMPAD2: u32 = 0x62;
    pub const NUMPAD3: u32 = 0x63;
    pub const NUMPAD4: u32 = 0x64;
    pub const NUMPAD5: u32 = 0x65;
    pub const NUMPAD6: u32 = 0x66;
    pub const NUMPAD7: u32 = 0x67;
    pub const NUMPAD8: u32 = 0x68;
    pub const NUMPAD9: u32 = 0x69;
    pub const MULTIPLY: u32 = 0x6A;
    pub const ADD: u32 = 0x6B;
    pub const SEPARATOR: u32 = 0x6C;
    pub const SUBTRACT: u32 = 0x6D;
    pub const DECIMAL: u32 = 0x6E;
    pub const DIVIDE: u32 = 0x6F;
    pub const F1: u32 = 0x70;
    pub const F2: u32 = 0x71;
    pub const F3: u32 = 0x72;
    pub const F4: u32 = 0x73;
    pub const F5: u32 = 0x74;
    pub const F6: u32 = 0x75;
    pub const F7: u32 = 0x76;
    pub const F8: u32 = 0x77;
    pub const F9: u32 = 0x78;
    pub const F10: u32 = 0x79;
    pub const F11: u32 = 0x7A;
    pub const F12: u32 = 0x7B;
    pub const NUM_LOCK: u32 = 0x90;
    pub const SCROLL_LOCK: u32 = 0x91;
}

/// Fixed labels for named keys, built once on first use.
///
/// Letters and punctuation are deliberately absent; those go through the
/// active layout so the transcript shows the characters actually typed.
static NAMED_TOKENS: LazyLock<HashMap<u32, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Editing and whitespace
    map.insert(vk::BACKSPACE, "[BACKSPACE]");
    map.insert(vk::TAB, "[TAB]");
    // The trailing newline breaks the transcript line where Enter was pressed
    map.insert(vk::ENTER, "[ENTER]\n");
    map.insert(vk::SPACE, " ");
    map.insert(vk::INSERT, "[INSERT]");
    map.insert(vk::DELETE, "[DELETE]");

    // Modifiers and locks
    map.insert(vk::SHIFT, "[SHIFT]");
    map.insert(vk::CONTROL, "[CTRL]");
    map.insert(vk::ALT, "[ALT]");
    map.insert(vk::CAPS_LOCK, "[CAPS_LOCK]");
    map.insert(vk::NUM_LOCK, "[NUM_LOCK]");
    map.insert(vk::SCROLL_LOCK, "[SCROLL_LOCK]");
    map.insert(vk::LEFT_WIN, "[LEFT_WIN]");
    map.insert(vk::RIGHT_WIN, "[RIGHT_WIN]");

    // Navigation
    map.insert(vk::ESCAPE, "[ESC]");
    map.insert(vk::PAGE_UP, "[PAGE_UP]");
    map.insert(vk::PAGE_DOWN, "[PAGE_DOWN]");
    map.insert(vk::END, "[END]");
    map.insert(vk::HOME, "[HOME]");
    map.insert(vk::LEFT, "[LEFT]");
    map.insert(vk::UP, "[UP]");
    map.insert(vk::RIGHT, "[RIGHT]");
    map.insert(vk::DOWN, "[DOWN]");
    map.insert(vk::PRINT_SCREEN, "[PRINT_SCREEN]");

    // Numeric keypad
    map.insert(vk::NUMPAD0, "0");
    map.insert(vk::NUMPAD1, "1");
    map.insert(vk::NUMPAD2, "2");
    map.insert(vk::NUMPAD3, "3");
    map.insert(vk::NUMPAD4, "4");
    map.insert(vk::NUMPAD5, "5");
    map.insert(vk::NUMPAD6, "6");
    map.insert(vk::NUMPAD7, "7");
    map.insert(vk::NUMPAD8, "8");
    map.insert(vk::NUMPAD9, "9");
    map.insert(vk::MULTIPLY, "*");
    map.insert(vk::ADD, "+");
    map.insert(vk::SEPARATOR, "-");
    map.insert(vk::SUBTRACT, "-");
    map.insert(vk::DECIMAL, ".");
    map.insert(vk::DIVIDE, "/");

    // Function keys
    map.insert(vk::F1, "[F1]");
    map.insert(vk::F2, "[F2]");
    map.insert(vk::F3, "[F3]");
    map.insert(vk::F4, "[F4]");
    map.insert(vk::F5, "[F5]");
    map.insert(vk::F6, "[F6]");
    map.insert(vk::F7, "[F7]");
    map.insert(vk::F8, "[F8]");
    map.insert(vk::F9, "[F9]");
    map.insert(vk::F10, "[F10]");
    map.insert(vk::F11, "[F11]");
    map.insert(vk::F12, "[F12]");

    map
});

/// A translated keystroke as it appears in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslatedToken {
    /// Fixed label such as `[TAB]`, or the `[VK:0xHH]` fallback
    Named(String),
    /// One or more characters composed from the active keyboard layout
    Text(String),
}

impl TranslatedToken {
    /// The token text exactly as it is written to the transcript.
    pub fn as_str(&self) -> &str {
        match self {
            TranslatedToken::Named(s) | TranslatedToken::Text(s) => s,
        }
    }
}

/// Turns a key press into the characters the active keyboard layout would
/// produce for it, if any.
///
/// The keyboard-state snapshot is the one taken when the key went down, so
/// shift/caps/dead-key handling reflects that moment rather than the state
/// at translation time.
pub trait Compose {
    /// Compose up to 4 UTF-16 units for the key. `None` for dead keys,
    /// non-printable keys, and codes the layout has no mapping for.
    fn compose(&self, vk_code: u32, scan_code: u32, key_state: &[u8; 256]) -> Option<String>;
}

/// Composer backed by the active keyboard layout.
#[cfg(target_os = "windows")]
#[derive(Debug, Default)]
pub struct LayoutComposer;

#[cfg(target_os = "windows")]
impl Compose for LayoutComposer {
    fn compose(&self, vk_code: u32, scan_code: u32, key_state: &[u8; 256]) -> Option<String> {
        use windows::Win32::UI::Input::KeyboardAndMouse::{GetKeyboardLayout, ToUnicodeEx};

        unsafe {
            let layout = GetKeyboardLayout(0);
            let mut buffer = [0u16; 4];
            let written = ToUnicodeEx(vk_code, scan_code, key_state, &mut buffer, 0, layout);
            if written <= 0 {
                return None;
            }
            Some(String::from_utf16_lossy(&buffer[..written as usize]))
        }
    }
}

/// Composer that never produces characters.
///
/// Used on targets without a composition facility; every unnamed key falls
/// through to its hex token.
#[derive(Debug, Default)]
pub struct NullComposer;

impl Compose for NullComposer {
    fn compose(&self, _vk_code: u32, _scan_code: u32, _key_state: &[u8; 256]) -> Option<String> {
        None
    }
}

/// Translates raw key codes into transcript tokens.
pub struct KeyTranslator {
    composer: Box<dyn Compose + Send>,
}

impl KeyTranslator {
    /// Create a translator using the platform composition facility where one
    /// exists.
    pub fn new() -> Self {
        #[cfg(target_os = "windows")]
        {
            Self::with_composer(Box::new(LayoutComposer))
        }
        #[cfg(not(target_os = "windows"))]
        {
            Self::with_composer(Box::new(NullComposer))
        }
    }

    /// Create a translator with an explicit composer.
    pub fn with_composer(composer: Box<dyn Compose + Send>) -> Self {
        Self { composer }
    }

    /// Translate one key-down event.
    ///
    /// Named keys take precedence over composition even when composition
    /// would also produce output (Space maps to its fixed token, not a
    /// composed character). Keys that are neither named nor composable
    /// degrade to `[VK:0xHH]`.
    pub fn translate(&self, vk_code: u32, scan_code: u32, key_state: &[u8; 256]) -> TranslatedToken {
        if let Some(label) = NAMED_TOKENS.get(&vk_code) {
            return TranslatedToken::Named((*label).to_string());
        }

        if let Some(text) = self.composer.compose(vk_code, scan_code, key_state) {
            if !text.is_empty() {
                return TranslatedToken::Text(text);
            }
        }

        TranslatedToken::Named(format!("[VK:0x{vk_code:02X}]"))
    }
}

impl Default for KeyTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Composer that answers every request with the same text.
    struct FixedComposer(Option<&'static str>);

    impl Compose for FixedComposer {
        fn compose(&self, _vk_code: u32, _scan_code: u32, _key_state: &[u8; 256]) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    const NO_STATE: [u8; 256] = [0u8; 256];

    fn translator_without_composition() -> KeyTranslator {
        KeyTranslator::with_composer(Box::new(NullComposer))
    }

    #[test]
    fn test_named_keys_use_fixed_labels() {
        let t = translator_without_composition();
        assert_eq!(t.translate(vk::BACKSPACE, 0, &NO_STATE).as_str(), "[BACKSPACE]");
        assert_eq!(t.translate(vk::TAB, 0, &NO_STATE).as_str(), "[TAB]");
        assert_eq!(t.translate(vk::ESCAPE, 0, &NO_STATE).as_str(), "[ESC]");
        assert_eq!(t.translate(vk::PAGE_UP, 0, &NO_STATE).as_str(), "[PAGE_UP]");
        assert_eq!(t.translate(vk::F1, 0, &NO_STATE).as_str(), "[F1]");
        assert_eq!(t.translate(vk::F12, 0, &NO_STATE).as_str(), "[F12]");
        assert_eq!(t.translate(vk::NUM_LOCK, 0, &NO_STATE).as_str(), "[NUM_LOCK]");
        assert_eq!(t.translate(vk::PRINT_SCREEN, 0, &NO_STATE).as_str(), "[PRINT_SCREEN]");
    }

    #[test]
    fn test_named_lookup_wins_over_composition() {
        // Space composes to a character on a real layout; the fixed token
        // must win anyway
        let t = KeyTranslator::with_composer(Box::new(FixedComposer(Some("?"))));
        assert_eq!(t.translate(vk::SPACE, 0, &NO_STATE).as_str(), " ");
        assert_eq!(t.translate(vk::TAB, 0, &NO_STATE).as_str(), "[TAB]");
    }

    #[test]
    fn test_enter_label_carries_a_line_break() {
        let t = translator_without_composition();
        assert_eq!(t.translate(vk::ENTER, 0, &NO_STATE).as_str(), "[ENTER]\n");
    }

    #[test]
    fn test_numpad_keys_translate_to_bare_characters() {
        let t = translator_without_composition();
        assert_eq!(t.translate(vk::NUMPAD0, 0, &NO_STATE).as_str(), "0");
        assert_eq!(t.translate(vk::NUMPAD9, 0, &NO_STATE).as_str(), "9");
        assert_eq!(t.translate(vk::MULTIPLY, 0, &NO_STATE).as_str(), "*");
        assert_eq!(t.translate(vk::ADD, 0, &NO_STATE).as_str(), "+");
        assert_eq!(t.translate(vk::SEPARATOR, 0, &NO_STATE).as_str(), "-");
        assert_eq!(t.translate(vk::SUBTRACT, 0, &NO_STATE).as_str(), "-");
        assert_eq!(t.translate(vk::DECIMAL, 0, &NO_STATE).as_str(), ".");
        assert_eq!(t.translate(vk::DIVIDE, 0, &NO_STATE).as_str(), "/");
    }

    #[test]
    fn test_unnamed_keys_use_composed_text() {
        let t = KeyTranslator::with_composer(Box::new(FixedComposer(Some("é"))));
        assert_eq!(
            t.translate(0x41, 30, &NO_STATE),
            TranslatedToken::Text("é".to_string())
        );
    }

    #[test]
    fn test_uncomposable_keys_fall_back_to_hex() {
        let t = translator_without_composition();
        assert_eq!(t.translate(0x41, 0, &NO_STATE).as_str(), "[VK:0x41]");
        // Codes below 0x10 pad to two digits
        assert_eq!(t.translate(0x05, 0, &NO_STATE).as_str(), "[VK:0x05]");
        // Hex digits are uppercase
        assert_eq!(t.translate(0xE8, 0, &NO_STATE).as_str(), "[VK:0xE8]");
    }

    #[test]
    fn test_empty_composition_falls_back_to_hex() {
        let t = KeyTranslator::with_composer(Box::new(FixedComposer(Some(""))));
        assert_eq!(t.translate(0x41, 0, &NO_STATE).as_str(), "[VK:0x41]");
    }

    #[test]
    fn test_named_table_size() {
        assert_eq!(NAMED_TOKENS.len(), 52);
    }
}
