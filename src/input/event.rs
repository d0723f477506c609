//! The unified input event.

use crate::geometry::{Point, PointF, Size};
use crate::input::keyboard::{KeyCode, Modifiers};

/// Kind of an [`Event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    MouseDown,
    MouseUp,
    MouseMove,
    MouseEnter,
    MouseLeave,
    MouseWheel,
    MouseDoubleClick,
    KeyDown,
    KeyUp,
    /// Synthesised by the keyboard engine while a key is held.
    KeyRepeat,
    TextInput,
    FocusGained,
    FocusLost,
    WindowResize,
    WindowClose,
    WindowMove,
    WindowVisibility,
    TouchStart,
    TouchMove,
    TouchEnd,
}

impl EventKind {
    /// Events positioned by the pointer and routed by hit-testing.
    #[must_use]
    pub const fn is_pointer(self) -> bool {
        matches!(
            self,
            Self::MouseDown
                | Self::MouseUp
                | Self::MouseMove
                | Self::MouseWheel
                | Self::MouseDoubleClick
                | Self::TouchStart
                | Self::TouchMove
                | Self::TouchEnd
        )
    }

    #[must_use]
    pub const fn is_keyboard(self) -> bool {
        matches!(self, Self::KeyDown | Self::KeyUp | Self::KeyRepeat)
    }

    #[must_use]
    pub const fn is_window(self) -> bool {
        matches!(
            self,
            Self::WindowResize | Self::WindowClose | Self::WindowMove | Self::WindowVisibility
        )
    }
}

/// Mouse button identity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MouseButton {
    #[default]
    None,
    Left,
    Middle,
    Right,
    Back,
    Forward,
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` value.
    #[must_use]
    pub const fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Left,
            1 => Self::Middle,
            2 => Self::Right,
            3 => Self::Back,
            4 => Self::Forward,
            _ => Self::None,
        }
    }
}

/// A single input or window event.
///
/// `position` is in window coordinates; `local` is filled in by the router
/// with the position relative to the receiving element's origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub position: Point,
    pub local: Point,
    /// Wheel scroll amount; positive y scrolls down.
    pub wheel_delta: PointF,
    pub key: KeyCode,
    /// Platform key code, kept unchanged from the native event.
    pub native_key_code: u32,
    pub character: Option<char>,
    pub text: String,
    pub modifiers: Modifiers,
    pub button: MouseButton,
    pub repeat: bool,
    /// New size for `WindowResize`.
    pub size: Size,
    /// New visibility for `WindowVisibility`.
    pub visible: bool,
    pub touch_id: u32,
    /// Milliseconds on the platform clock.
    pub timestamp: u64,
}

impl Event {
    /// Create an event of `kind` with every payload field empty.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            position: Point::ZERO,
            local: Point::ZERO,
            wheel_delta: PointF::default(),
            key: KeyCode::Unknown,
            native_key_code: 0,
            character: None,
            text: String::new(),
            modifiers: Modifiers::empty(),
            button: MouseButton::None,
            repeat: false,
            size: Size::default(),
            visible: true,
            touch_id: 0,
            timestamp: 0,
        }
    }

    fn pointer(kind: EventKind, position: Point) -> Self {
        Self {
            position,
            local: position,
            ..Self::new(kind)
        }
    }

    #[must_use]
    pub fn mouse_down(position: Point, button: MouseButton) -> Self {
        Self {
            button,
            ..Self::pointer(EventKind::MouseDown, position)
        }
    }

    #[must_use]
    pub fn mouse_up(position: Point, button: MouseButton) -> Self {
        Self {
            button,
            ..Self::pointer(EventKind::MouseUp, position)
        }
    }

    #[must_use]
    pub fn mouse_move(position: Point) -> Self {
        Self::pointer(EventKind::MouseMove, position)
    }

    #[must_use]
    pub fn double_click(position: Point, button: MouseButton) -> Self {
        Self {
            button,
            ..Self::pointer(EventKind::MouseDoubleClick, position)
        }
    }

    #[must_use]
    pub fn mouse_wheel(position: Point, dx: f64, dy: f64) -> Self {
        Self {
            wheel_delta: PointF::new(dx, dy),
            ..Self::pointer(EventKind::MouseWheel, position)
        }
    }

    #[must_use]
    pub fn key_down(key: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            ..Self::new(EventKind::KeyDown)
        }
    }

    #[must_use]
    pub fn key_up(key: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            ..Self::new(EventKind::KeyUp)
        }
    }

    #[must_use]
    pub fn key_repeat(key: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            repeat: true,
            ..Self::new(EventKind::KeyRepeat)
        }
    }

    /// Text produced by the keyboard or an input method.
    #[must_use]
    pub fn text_input(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut chars = text.chars();
        let character = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        };
        Self {
            text,
            character,
            ..Self::new(EventKind::TextInput)
        }
    }

    #[must_use]
    pub fn focus_gained() -> Self {
        Self::new(EventKind::FocusGained)
    }

    #[must_use]
    pub fn focus_lost() -> Self {
        Self::new(EventKind::FocusLost)
    }

    #[must_use]
    pub fn window_resize(size: Size) -> Self {
        Self {
            size,
            ..Self::new(EventKind::WindowResize)
        }
    }

    #[must_use]
    pub fn window_close() -> Self {
        Self::new(EventKind::WindowClose)
    }

    #[must_use]
    pub fn window_move(position: Point) -> Self {
        Self {
            position,
            ..Self::new(EventKind::WindowMove)
        }
    }

    #[must_use]
    pub fn window_visibility(visible: bool) -> Self {
        Self {
            visible,
            ..Self::new(EventKind::WindowVisibility)
        }
    }

    #[must_use]
    pub fn touch(kind: EventKind, id: u32, position: Point) -> Self {
        debug_assert!(matches!(
            kind,
            EventKind::TouchStart | EventKind::TouchMove | EventKind::TouchEnd
        ));
        Self {
            touch_id: id,
            ..Self::pointer(kind, position)
        }
    }

    /// Return a copy with different modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Return a copy carrying the produced character.
    #[must_use]
    pub fn with_character(mut self, ch: char) -> Self {
        self.character = Some(ch);
        self.text = ch.to_string();
        self
    }

    /// Return a copy carrying the native key code.
    #[must_use]
    pub fn with_native_code(mut self, code: u32) -> Self {
        self.native_key_code = code;
        self
    }

    /// Return a copy with a timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, millis: u64) -> Self {
        self.timestamp = millis;
        self
    }

    #[must_use]
    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    #[must_use]
    pub fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    #[must_use]
    pub fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    #[must_use]
    pub fn meta(&self) -> bool {
        self.modifiers.contains(Modifiers::META)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_constructors() {
        let ev = Event::mouse_down(Point::new(3, 4), MouseButton::Left);
        assert_eq!(ev.kind, EventKind::MouseDown);
        assert_eq!(ev.position, Point::new(3, 4));
        assert_eq!(ev.local, ev.position);
        assert!(ev.kind.is_pointer());
        assert!(!ev.kind.is_keyboard());
    }

    #[test]
    fn test_key_event_fields() {
        let ev = Event::key_down(KeyCode::S, Modifiers::CTRL).with_native_code(0x53);
        assert!(ev.ctrl());
        assert!(!ev.shift());
        assert_eq!(ev.native_key_code, 0x53);
        assert!(!ev.repeat);
        assert!(Event::key_repeat(KeyCode::S, Modifiers::empty()).repeat);
    }

    #[test]
    fn test_text_input_single_char() {
        assert_eq!(Event::text_input("é").character, Some('é'));
        let ev = Event::text_input("ab");
        assert_eq!(ev.character, None);
        assert_eq!(ev.text, "ab");
    }

    #[test]
    fn test_window_events() {
        let ev = Event::window_resize(Size::new(640, 480));
        assert!(ev.kind.is_window());
        assert_eq!(ev.size, Size::new(640, 480));
        assert!(!Event::window_visibility(false).visible);
    }

    #[test]
    fn test_dom_buttons() {
        assert_eq!(MouseButton::from_dom(0), MouseButton::Left);
        assert_eq!(MouseButton::from_dom(2), MouseButton::Right);
        assert_eq!(MouseButton::from_dom(9), MouseButton::None);
    }
}
