//! Keyboard state engine.
//!
//! [`KeyboardState`] tracks which keys are down this frame and last frame,
//! the modifier mask, per-key repeat timing and a short trailing sequence of
//! presses for multi-key hotkeys. Time is always passed in explicitly, so the
//! engine is deterministic under test.
//!
//! Frame protocol:
//!
//! 1. [`KeyboardState::begin_frame`] snapshots the pressed set as "previous".
//! 2. [`KeyboardState::process_event`] for every keyboard event in arrival
//!    order. Global handlers see the event first.
//! 3. [`KeyboardState::update`] returns the synthetic `KeyRepeat` events due.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use paneforge::input::{Event, KeyCode, Modifiers};
//! use paneforge::keyboard::KeyboardState;
//!
//! let mut kb = KeyboardState::default();
//! let now = Duration::ZERO;
//! kb.begin_frame();
//! kb.process_event(&Event::key_down(KeyCode::A, Modifiers::empty()), now);
//! assert!(kb.is_just_pressed(KeyCode::A));
//! kb.begin_frame();
//! assert!(kb.is_key_pressed(KeyCode::A));
//! assert!(!kb.is_just_pressed(KeyCode::A));
//! ```

mod hotkey;

pub use hotkey::{HotkeyId, HotkeyInfo, HotkeyTable, HotkeyTrigger};

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use crate::input::{Event, EventKind, KeyCode, KeyCombo, Modifiers};

/// Repeat and sequence timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyRepeatConfig {
    /// Hold time before a key starts repeating.
    pub initial_delay: Duration,
    /// Time between repeats once repeating.
    pub repeat_interval: Duration,
    /// Presses older than this drop out of the sequence buffer.
    pub sequence_timeout: Duration,
    /// Maximum presses kept in the sequence buffer.
    pub sequence_length: usize,
}

impl Default for KeyRepeatConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            repeat_interval: Duration::from_millis(33),
            sequence_timeout: Duration::from_secs(2),
            sequence_length: 8,
        }
    }
}

impl KeyRepeatConfig {
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    #[must_use]
    pub fn with_repeat_interval(mut self, interval: Duration) -> Self {
        self.repeat_interval = interval;
        self
    }

    #[must_use]
    pub fn with_sequence_timeout(mut self, timeout: Duration) -> Self {
        self.sequence_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_sequence_length(mut self, len: usize) -> Self {
        self.sequence_length = len.max(1);
        self
    }
}

#[derive(Clone, Copy, Debug)]
struct KeyTiming {
    first_press: Duration,
    last_repeat: Option<Duration>,
    repeat_count: u32,
    /// Character the press produced; repeats type it again.
    character: Option<char>,
}

/// Identifier of a global keyboard handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type GlobalHandler = Box<dyn FnMut(&Event) -> bool>;

/// Result of feeding one event to the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    /// A global handler consumed the event; it must not be routed further.
    pub consumed: bool,
    /// The event was a `KeyDown` for a key that was not already held.
    pub press_edge: bool,
}

/// Pressed-key state, repeat timing, sequences and global hotkeys.
pub struct KeyboardState {
    config: KeyRepeatConfig,
    pressed: HashSet<KeyCode>,
    previous: HashSet<KeyCode>,
    timing: HashMap<KeyCode, KeyTiming>,
    modifiers: Modifiers,
    sequence: VecDeque<(KeyCombo, Duration)>,
    hotkeys: HotkeyTable,
    handlers: Vec<(HandlerId, GlobalHandler)>,
    next_handler: u64,
    last_edge: Option<KeyCode>,
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self::new(KeyRepeatConfig::default())
    }
}

impl std::fmt::Debug for KeyboardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardState")
            .field("pressed", &self.pressed_keys())
            .field("modifiers", &self.modifiers)
            .field("hotkeys", &self.hotkeys.len())
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

impl KeyboardState {
    #[must_use]
    pub fn new(config: KeyRepeatConfig) -> Self {
        Self {
            config,
            pressed: HashSet::new(),
            previous: HashSet::new(),
            timing: HashMap::new(),
            modifiers: Modifiers::empty(),
            sequence: VecDeque::new(),
            hotkeys: HotkeyTable::new(),
            handlers: Vec::new(),
            next_handler: 1,
            last_edge: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &KeyRepeatConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: KeyRepeatConfig) {
        self.config = config;
    }

    /// Start a frame: the current pressed set becomes the previous one.
    pub fn begin_frame(&mut self) {
        self.previous.clone_from(&self.pressed);
    }

    /// Feed a keyboard event. Non-keyboard events are ignored.
    pub fn process_event(&mut self, event: &Event, now: Duration) -> KeyOutcome {
        self.last_edge = None;
        if !event.kind.is_keyboard() {
            return KeyOutcome::default();
        }

        let mut consumed = false;
        for (_, handler) in &mut self.handlers {
            if handler(event) {
                consumed = true;
                break;
            }
        }

        self.modifiers = event.modifiers;
        let mut press_edge = false;
        match event.kind {
            EventKind::KeyDown => {
                if self.pressed.insert(event.key) {
                    press_edge = true;
                    self.last_edge = Some(event.key);
                    self.timing.insert(
                        event.key,
                        KeyTiming {
                            first_press: now,
                            last_repeat: None,
                            repeat_count: 0,
                            character: event.character,
                        },
                    );
                    if !event.key.is_modifier() {
                        self.push_sequence(KeyCombo::new(event.key, event.modifiers), now);
                    }
                }
            }
            EventKind::KeyUp => {
                self.pressed.remove(&event.key);
                self.timing.remove(&event.key);
            }
            _ => {}
        }
        KeyOutcome {
            consumed,
            press_edge,
        }
    }

    fn expire_sequence(&mut self, now: Duration) {
        let timeout = self.config.sequence_timeout;
        while let Some(&(_, at)) = self.sequence.front() {
            if now.saturating_sub(at) > timeout {
                self.sequence.pop_front();
            } else {
                break;
            }
        }
    }

    fn push_sequence(&mut self, combo: KeyCombo, now: Duration) {
        self.expire_sequence(now);
        self.sequence.push_back((combo, now));
        while self.sequence.len() > self.config.sequence_length.max(1) {
            self.sequence.pop_front();
        }
    }

    /// Recent presses, oldest first, excluding expired ones.
    #[must_use]
    pub fn recent_sequence(&self, now: Duration) -> Vec<KeyCombo> {
        self.sequence
            .iter()
            .filter(|(_, at)| now.saturating_sub(*at) <= self.config.sequence_timeout)
            .map(|(c, _)| *c)
            .collect()
    }

    pub fn clear_sequence(&mut self) {
        self.sequence.clear();
    }

    /// Offer the event to a hotkey table.
    ///
    /// Only the press edge of a `KeyDown` is offered; held-key repeats and
    /// re-sent `KeyDown`s never re-fire. A fired sequence clears the buffer.
    pub fn dispatch_hotkeys(&mut self, table: &mut HotkeyTable, event: &Event, now: Duration) -> bool {
        if event.kind != EventKind::KeyDown || self.last_edge != Some(event.key) {
            return false;
        }
        let recent = self.recent_sequence(now);
        let fired = table.dispatch(event.key, event.modifiers, &recent);
        if fired.sequence {
            self.clear_sequence();
        }
        fired.any
    }

    /// Offer the event to the engine's own hotkey table.
    pub fn dispatch_global_hotkeys(&mut self, event: &Event, now: Duration) -> bool {
        let mut table = std::mem::take(&mut self.hotkeys);
        let fired = self.dispatch_hotkeys(&mut table, event, now);
        self.hotkeys = table;
        fired
    }

    /// Engine-wide hotkeys, consulted after the window table.
    pub fn hotkeys(&mut self) -> &mut HotkeyTable {
        &mut self.hotkeys
    }

    /// Resolve repeats due at `now`.
    ///
    /// A held key starts repeating once `initial_delay` has elapsed since
    /// its press, then repeats every `repeat_interval`. At most one repeat
    /// per key is emitted per call. Modifier keys never repeat. A repeat
    /// carries the character of the original `KeyDown`, if any.
    pub fn update(&mut self, now: Duration) -> Vec<Event> {
        self.expire_sequence(now);
        let mut keys: Vec<KeyCode> = self.pressed.iter().copied().filter(|k| !k.is_modifier()).collect();
        keys.sort_unstable();

        let mut events = Vec::new();
        for key in keys {
            let Some(timing) = self.timing.get_mut(&key) else {
                continue;
            };
            let due = match timing.last_repeat {
                None => now.saturating_sub(timing.first_press) >= self.config.initial_delay,
                Some(last) => now.saturating_sub(last) >= self.config.repeat_interval,
            };
            if due {
                timing.last_repeat = Some(now);
                timing.repeat_count += 1;
                let mut repeat = Event::key_repeat(key, self.modifiers);
                if let Some(ch) = timing.character {
                    repeat = repeat.with_character(ch);
                }
                events.push(repeat);
            }
        }
        events
    }

    /// Release every key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.pressed.clear();
        self.timing.clear();
        self.modifiers = Modifiers::empty();
    }

    /// Register a global handler that sees every keyboard event first.
    pub fn add_global_handler<F>(&mut self, handler: F) -> HandlerId
    where
        F: FnMut(&Event) -> bool + 'static,
    {
        let id = HandlerId(self.next_handler);
        self.next_handler += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    pub fn remove_global_handler(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _)| *h != id);
        self.handlers.len() != before
    }

    #[must_use]
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Down now but not at the start of the frame.
    #[must_use]
    pub fn is_just_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key) && !self.previous.contains(&key)
    }

    /// Down at the start of the frame but not now.
    #[must_use]
    pub fn is_just_released(&self, key: KeyCode) -> bool {
        !self.pressed.contains(&key) && self.previous.contains(&key)
    }

    /// Down at the start of the frame.
    #[must_use]
    pub fn was_key_pressed(&self, key: KeyCode) -> bool {
        self.previous.contains(&key)
    }

    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[must_use]
    pub fn is_repeating(&self, key: KeyCode) -> bool {
        self.timing.get(&key).is_some_and(|t| t.last_repeat.is_some())
    }

    #[must_use]
    pub fn repeat_count(&self, key: KeyCode) -> u32 {
        self.timing.get(&key).map_or(0, |t| t.repeat_count)
    }

    /// How long `key` has been held.
    #[must_use]
    pub fn held_for(&self, key: KeyCode, now: Duration) -> Option<Duration> {
        self.timing
            .get(&key)
            .map(|t| now.saturating_sub(t.first_press))
    }

    /// Pressed keys in a stable order.
    #[must_use]
    pub fn pressed_keys(&self) -> Vec<KeyCode> {
        let mut keys: Vec<KeyCode> = self.pressed.iter().copied().collect();
        keys.sort_unstable();
        keys
    }
}
