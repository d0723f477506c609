//! Virtual key codes, modifiers and key combinations.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::error::{Error, Result};

bitflags! {
    /// Modifier and lock-key state carried by every event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const CTRL = 0b0000_0010;
        const ALT = 0b0000_0100;
        /// Command on macOS, Windows key elsewhere.
        const META = 0b0000_1000;
        const CAPS_LOCK = 0b0001_0000;
        const NUM_LOCK = 0b0010_0000;
        const SCROLL_LOCK = 0b0100_0000;
    }
}

impl Modifiers {
    /// Modifiers that take part in hotkey matching. Lock states are ignored.
    pub const HOTKEY_MASK: Self = Self::SHIFT.union(Self::CTRL).union(Self::ALT).union(Self::META);

    /// Only the hotkey-relevant bits.
    #[must_use]
    pub fn chord(self) -> Self {
        self & Self::HOTKEY_MASK
    }

    /// Ctrl, Alt or Meta is held (Shift alone still types characters).
    #[must_use]
    pub fn has_command(self) -> bool {
        self.intersects(Self::CTRL | Self::ALT | Self::META)
    }
}

macro_rules! key_codes {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Exhaustive virtual key enum.
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum KeyCode {
            #[default]
            Unknown,
            $($variant,)*
        }

        impl KeyCode {
            /// Every key except `Unknown`.
            pub const ALL: &'static [KeyCode] = &[$(KeyCode::$variant,)*];

            /// Canonical human-readable name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    Self::Unknown => "Unknown",
                    $(Self::$variant => $name,)*
                }
            }
        }
    };
}

key_codes! {
    A => "A", B => "B", C => "C", D => "D", E => "E", F => "F", G => "G",
    H => "H", I => "I", J => "J", K => "K", L => "L", M => "M", N => "N",
    O => "O", P => "P", Q => "Q", R => "R", S => "S", T => "T", U => "U",
    V => "V", W => "W", X => "X", Y => "Y", Z => "Z",
    Digit0 => "0", Digit1 => "1", Digit2 => "2", Digit3 => "3", Digit4 => "4",
    Digit5 => "5", Digit6 => "6", Digit7 => "7", Digit8 => "8", Digit9 => "9",
    Space => "Space", Minus => "-", Equal => "=", LeftBracket => "[",
    RightBracket => "]", Backslash => "\\", Semicolon => ";", Quote => "'",
    Backquote => "`", Comma => ",", Period => ".", Slash => "/",
    F1 => "F1", F2 => "F2", F3 => "F3", F4 => "F4", F5 => "F5", F6 => "F6",
    F7 => "F7", F8 => "F8", F9 => "F9", F10 => "F10", F11 => "F11", F12 => "F12",
    F13 => "F13", F14 => "F14", F15 => "F15", F16 => "F16", F17 => "F17",
    F18 => "F18", F19 => "F19", F20 => "F20", F21 => "F21", F22 => "F22",
    F23 => "F23", F24 => "F24",
    Up => "Up", Down => "Down", Left => "Left", Right => "Right",
    Home => "Home", End => "End", PageUp => "PageUp", PageDown => "PageDown",
    Insert => "Insert", Delete => "Delete",
    Backspace => "Backspace", Tab => "Tab", Enter => "Enter", Escape => "Escape",
    LeftShift => "LeftShift", RightShift => "RightShift",
    LeftCtrl => "LeftCtrl", RightCtrl => "RightCtrl",
    LeftAlt => "LeftAlt", RightAlt => "RightAlt",
    LeftMeta => "LeftMeta", RightMeta => "RightMeta",
    CapsLock => "CapsLock", NumLock => "NumLock", ScrollLock => "ScrollLock",
    PrintScreen => "PrintScreen", Pause => "Pause", Menu => "Menu",
    Numpad0 => "Numpad0", Numpad1 => "Numpad1", Numpad2 => "Numpad2",
    Numpad3 => "Numpad3", Numpad4 => "Numpad4", Numpad5 => "Numpad5",
    Numpad6 => "Numpad6", Numpad7 => "Numpad7", Numpad8 => "Numpad8",
    Numpad9 => "Numpad9", NumpadAdd => "NumpadAdd", NumpadSubtract => "NumpadSubtract",
    NumpadMultiply => "NumpadMultiply", NumpadDivide => "NumpadDivide",
    NumpadDecimal => "NumpadDecimal", NumpadEnter => "NumpadEnter",
    NumpadEqual => "NumpadEqual",
    MediaPlayPause => "MediaPlayPause", MediaStop => "MediaStop",
    MediaNext => "MediaNext", MediaPrevious => "MediaPrevious",
    VolumeUp => "VolumeUp", VolumeDown => "VolumeDown", VolumeMute => "VolumeMute",
    BrowserBack => "BrowserBack", BrowserForward => "BrowserForward",
    BrowserRefresh => "BrowserRefresh", BrowserHome => "BrowserHome",
    BrowserSearch => "BrowserSearch",
}

const LETTERS: [KeyCode; 26] = [
    KeyCode::A, KeyCode::B, KeyCode::C, KeyCode::D, KeyCode::E, KeyCode::F, KeyCode::G,
    KeyCode::H, KeyCode::I, KeyCode::J, KeyCode::K, KeyCode::L, KeyCode::M, KeyCode::N,
    KeyCode::O, KeyCode::P, KeyCode::Q, KeyCode::R, KeyCode::S, KeyCode::T, KeyCode::U,
    KeyCode::V, KeyCode::W, KeyCode::X, KeyCode::Y, KeyCode::Z,
];

const DIGITS: [KeyCode; 10] = [
    KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
    KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
];

const NUMPAD_DIGITS: [KeyCode; 10] = [
    KeyCode::Numpad0, KeyCode::Numpad1, KeyCode::Numpad2, KeyCode::Numpad3, KeyCode::Numpad4,
    KeyCode::Numpad5, KeyCode::Numpad6, KeyCode::Numpad7, KeyCode::Numpad8, KeyCode::Numpad9,
];

const F_KEYS: [KeyCode; 24] = [
    KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
    KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
    KeyCode::F13, KeyCode::F14, KeyCode::F15, KeyCode::F16, KeyCode::F17, KeyCode::F18,
    KeyCode::F19, KeyCode::F20, KeyCode::F21, KeyCode::F22, KeyCode::F23, KeyCode::F24,
];

impl KeyCode {
    /// Parse a key name, case-insensitively, accepting common aliases.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let alias = match name.to_ascii_lowercase().as_str() {
            "esc" => Some(Self::Escape),
            "return" => Some(Self::Enter),
            "del" => Some(Self::Delete),
            "ins" => Some(Self::Insert),
            "pgup" => Some(Self::PageUp),
            "pgdn" | "pgdown" => Some(Self::PageDown),
            "spacebar" => Some(Self::Space),
            "arrowup" => Some(Self::Up),
            "arrowdown" => Some(Self::Down),
            "arrowleft" => Some(Self::Left),
            "arrowright" => Some(Self::Right),
            "shift" => Some(Self::LeftShift),
            "ctrl" | "control" => Some(Self::LeftCtrl),
            "alt" | "option" => Some(Self::LeftAlt),
            "meta" | "cmd" | "super" | "win" => Some(Self::LeftMeta),
            _ => None,
        };
        alias.or_else(|| {
            Self::ALL
                .iter()
                .copied()
                .find(|key| key.name().eq_ignore_ascii_case(name))
        })
    }

    /// Key that produces `ch` on a US layout (ignoring Shift).
    #[must_use]
    pub fn from_char(ch: char) -> Self {
        let lower = ch.to_ascii_lowercase();
        match lower {
            'a'..='z' => LETTERS[(lower as u8 - b'a') as usize],
            '0'..='9' => DIGITS[(lower as u8 - b'0') as usize],
            ' ' => Self::Space,
            '-' | '_' => Self::Minus,
            '=' | '+' => Self::Equal,
            '[' | '{' => Self::LeftBracket,
            ']' | '}' => Self::RightBracket,
            '\\' | '|' => Self::Backslash,
            ';' | ':' => Self::Semicolon,
            '\'' | '"' => Self::Quote,
            '`' | '~' => Self::Backquote,
            ',' | '<' => Self::Comma,
            '.' | '>' => Self::Period,
            '/' | '?' => Self::Slash,
            '\t' => Self::Tab,
            '\n' | '\r' => Self::Enter,
            _ => Self::Unknown,
        }
    }

    /// Map a DOM `KeyboardEvent.code` (physical key) value.
    #[must_use]
    pub fn from_dom_code(code: &str) -> Self {
        if let Some(letter) = code.strip_prefix("Key") {
            if let [b] = letter.as_bytes() {
                return Self::from_char(*b as char);
            }
        }
        if let Some(digit) = code.strip_prefix("Digit") {
            if let Some(d) = digit.parse::<usize>().ok().filter(|d| *d < 10) {
                return DIGITS[d];
            }
        }
        if let Some(rest) = code.strip_prefix("Numpad") {
            if let Some(d) = rest.parse::<usize>().ok().filter(|d| *d < 10) {
                return NUMPAD_DIGITS[d];
            }
        }
        match code {
            "ShiftLeft" => Self::LeftShift,
            "ShiftRight" => Self::RightShift,
            "ControlLeft" => Self::LeftCtrl,
            "ControlRight" => Self::RightCtrl,
            "AltLeft" => Self::LeftAlt,
            "AltRight" => Self::RightAlt,
            "MetaLeft" | "OSLeft" => Self::LeftMeta,
            "MetaRight" | "OSRight" => Self::RightMeta,
            "BracketLeft" => Self::LeftBracket,
            "BracketRight" => Self::RightBracket,
            "ContextMenu" => Self::Menu,
            "AudioVolumeUp" => Self::VolumeUp,
            "AudioVolumeDown" => Self::VolumeDown,
            "AudioVolumeMute" => Self::VolumeMute,
            "MediaTrackNext" => Self::MediaNext,
            "MediaTrackPrevious" => Self::MediaPrevious,
            "MediaPlayPause" => Self::MediaPlayPause,
            "MediaStop" => Self::MediaStop,
            _ => Self::from_dom_key(code),
        }
    }

    /// Map a DOM `KeyboardEvent.key` (logical key) value.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        let mut chars = key.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Self::from_char(ch);
        }
        match key {
            "Shift" => Self::LeftShift,
            "Control" => Self::LeftCtrl,
            "Alt" | "AltGraph" => Self::LeftAlt,
            "Meta" | "OS" => Self::LeftMeta,
            "Escape" | "Esc" => Self::Escape,
            "ArrowUp" => Self::Up,
            "ArrowDown" => Self::Down,
            "ArrowLeft" => Self::Left,
            "ArrowRight" => Self::Right,
            "ContextMenu" => Self::Menu,
            "AudioVolumeUp" => Self::VolumeUp,
            "AudioVolumeDown" => Self::VolumeDown,
            "AudioVolumeMute" => Self::VolumeMute,
            "MediaTrackNext" => Self::MediaNext,
            "MediaTrackPrevious" => Self::MediaPrevious,
            "Backquote" => Self::Backquote,
            "Backslash" => Self::Backslash,
            "Comma" => Self::Comma,
            "Period" => Self::Period,
            "Semicolon" => Self::Semicolon,
            "Slash" => Self::Slash,
            "Equal" => Self::Equal,
            "Minus" => Self::Minus,
            "Quote" => Self::Quote,
            _ => Self::ALL
                .iter()
                .copied()
                .find(|k| k.name() == key)
                .unwrap_or(Self::Unknown),
        }
    }

    /// Function key `F(n)` for `n` in 1..=24.
    #[must_use]
    pub fn function(n: u8) -> Option<Self> {
        F_KEYS.get(usize::from(n).checked_sub(1)?).copied()
    }

    /// Modifier flag for modifier keys.
    #[must_use]
    pub const fn modifier_flag(self) -> Option<Modifiers> {
        match self {
            Self::LeftShift | Self::RightShift => Some(Modifiers::SHIFT),
            Self::LeftCtrl | Self::RightCtrl => Some(Modifiers::CTRL),
            Self::LeftAlt | Self::RightAlt => Some(Modifiers::ALT),
            Self::LeftMeta | Self::RightMeta => Some(Modifiers::META),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_modifier(self) -> bool {
        self.modifier_flag().is_some()
    }

    #[must_use]
    pub const fn is_function_key(self) -> bool {
        matches!(
            self,
            Self::F1 | Self::F2 | Self::F3 | Self::F4 | Self::F5 | Self::F6
                | Self::F7 | Self::F8 | Self::F9 | Self::F10 | Self::F11 | Self::F12
                | Self::F13 | Self::F14 | Self::F15 | Self::F16 | Self::F17 | Self::F18
                | Self::F19 | Self::F20 | Self::F21 | Self::F22 | Self::F23 | Self::F24
        )
    }

    /// Keys that type a character when no command modifier is held.
    #[must_use]
    pub fn is_printable(self) -> bool {
        LETTERS.contains(&self)
            || DIGITS.contains(&self)
            || NUMPAD_DIGITS.contains(&self)
            || matches!(
                self,
                Self::Space
                    | Self::Minus
                    | Self::Equal
                    | Self::LeftBracket
                    | Self::RightBracket
                    | Self::Backslash
                    | Self::Semicolon
                    | Self::Quote
                    | Self::Backquote
                    | Self::Comma
                    | Self::Period
                    | Self::Slash
                    | Self::NumpadAdd
                    | Self::NumpadSubtract
                    | Self::NumpadMultiply
                    | Self::NumpadDivide
                    | Self::NumpadDecimal
                    | Self::NumpadEqual
            )
    }

    /// Arrows and the navigation cluster.
    #[must_use]
    pub const fn is_navigation(self) -> bool {
        matches!(
            self,
            Self::Left
                | Self::Right
                | Self::Up
                | Self::Down
                | Self::Home
                | Self::End
                | Self::PageUp
                | Self::PageDown
        )
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A key plus the exact modifier chord, e.g. `Ctrl+Shift+Z`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    /// Create a combo; lock bits in `modifiers` are dropped.
    #[must_use]
    pub fn new(key: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers: modifiers.chord(),
        }
    }

    /// Combo without modifiers.
    #[must_use]
    pub fn key(key: KeyCode) -> Self {
        Self::new(key, Modifiers::empty())
    }

    /// Parse `"Ctrl+Shift+Z"`-style names.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || Error::InvalidKeyName(text.to_string());
        let parts: Vec<&str> = text.split('+').map(str::trim).collect();
        let (key_name, modifier_names) = parts.split_last().ok_or_else(invalid)?;

        let mut modifiers = Modifiers::empty();
        for name in modifier_names {
            let flag = match name.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => Modifiers::CTRL,
                "shift" => Modifiers::SHIFT,
                "alt" | "option" => Modifiers::ALT,
                "meta" | "cmd" | "command" | "super" | "win" => Modifiers::META,
                _ => return Err(invalid()),
            };
            modifiers |= flag;
        }
        let key = KeyCode::from_name(key_name).ok_or_else(invalid)?;
        Ok(Self::new(key, modifiers))
    }

    /// Check whether a key with the given (unmasked) modifiers matches exactly.
    #[must_use]
    pub fn matches(&self, key: KeyCode, modifiers: Modifiers) -> bool {
        self.key == key && self.modifiers == modifiers.chord()
    }
}

impl FromStr for KeyCombo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (Modifiers::CTRL, "Ctrl"),
            (Modifiers::SHIFT, "Shift"),
            (Modifiers::ALT, "Alt"),
            (Modifiers::META, "Meta"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        f.write_str(self.key.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for &key in KeyCode::ALL {
            assert_eq!(KeyCode::from_name(key.name()), Some(key), "{key:?}");
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(KeyCode::from_name("esc"), Some(KeyCode::Escape));
        assert_eq!(KeyCode::from_name("pgdn"), Some(KeyCode::PageDown));
        assert_eq!(KeyCode::from_name("z"), Some(KeyCode::Z));
        assert_eq!(KeyCode::from_name("f12"), Some(KeyCode::F12));
        assert_eq!(KeyCode::from_name(""), None);
        assert_eq!(KeyCode::from_name("NotAKey"), None);
    }

    #[test]
    fn test_combo_parse_and_display() {
        let combo = KeyCombo::parse("Ctrl+Shift+Z").unwrap();
        assert_eq!(combo.key, KeyCode::Z);
        assert_eq!(combo.modifiers, Modifiers::CTRL | Modifiers::SHIFT);
        assert_eq!(combo.to_string(), "Ctrl+Shift+Z");
        assert_eq!(KeyCombo::parse("shift + ctrl + z").unwrap(), combo);
        assert_eq!("F5".parse::<KeyCombo>().unwrap(), KeyCombo::key(KeyCode::F5));
    }

    #[test]
    fn test_combo_parse_errors() {
        assert!(matches!(KeyCombo::parse("Hyper+A"), Err(Error::InvalidKeyName(_))));
        assert!(KeyCombo::parse("Ctrl+").is_err());
        assert!(KeyCombo::parse("Ctrl+Nope").is_err());
    }

    #[test]
    fn test_combo_ignores_locks() {
        let combo = KeyCombo::parse("Ctrl+S").unwrap();
        assert!(combo.matches(KeyCode::S, Modifiers::CTRL | Modifiers::NUM_LOCK));
        assert!(!combo.matches(KeyCode::S, Modifiers::CTRL | Modifiers::SHIFT));
    }

    #[test]
    fn test_dom_mapping() {
        assert_eq!(KeyCode::from_dom_code("KeyA"), KeyCode::A);
        assert_eq!(KeyCode::from_dom_code("Digit7"), KeyCode::Digit7);
        assert_eq!(KeyCode::from_dom_code("Numpad3"), KeyCode::Numpad3);
        assert_eq!(KeyCode::from_dom_code("ShiftRight"), KeyCode::RightShift);
        assert_eq!(KeyCode::from_dom_code("ArrowLeft"), KeyCode::Left);
        assert_eq!(KeyCode::from_dom_code("F11"), KeyCode::F11);
        assert_eq!(KeyCode::from_dom_key("a"), KeyCode::A);
        assert_eq!(KeyCode::from_dom_key("Enter"), KeyCode::Enter);
        assert_eq!(KeyCode::from_dom_key(" "), KeyCode::Space);
        assert_eq!(KeyCode::from_dom_key("Dead"), KeyCode::Unknown);
    }

    #[test]
    fn test_classification() {
        assert_eq!(KeyCode::function(24), Some(KeyCode::F24));
        assert_eq!(KeyCode::function(0), None);
        assert!(KeyCode::F3.is_function_key());
        assert!(KeyCode::RightAlt.is_modifier());
        assert_eq!(KeyCode::LeftMeta.modifier_flag(), Some(Modifiers::META));
        assert!(KeyCode::PageUp.is_navigation());
        assert!(!KeyCode::Enter.is_navigation());
    }
}
