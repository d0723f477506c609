//! Hotkey registration and matching.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};
use crate::input::{KeyCode, KeyCombo, Modifiers};

static NEXT_HOTKEY_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque hotkey identifier, unique across all tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HotkeyId(u64);

impl HotkeyId {
    fn next() -> Self {
        Self(NEXT_HOTKEY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// What must be pressed for a hotkey to fire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HotkeyTrigger {
    Combo(KeyCombo),
    /// Consecutive presses, e.g. `G` then `G`.
    Sequence(Vec<KeyCombo>),
}

impl HotkeyTrigger {
    /// Parse `"Ctrl+S"` or a comma separated sequence such as `"G, G"`.
    pub fn parse(text: &str) -> Result<Self> {
        let combos = text
            .split(',')
            .map(KeyCombo::parse)
            .collect::<Result<Vec<_>>>()?;
        match combos.as_slice() {
            [] => Err(Error::InvalidKeyName(text.to_string())),
            [single] => Ok(Self::Combo(*single)),
            _ => Ok(Self::Sequence(combos)),
        }
    }

    fn last(&self) -> Option<&KeyCombo> {
        match self {
            Self::Combo(c) => Some(c),
            Self::Sequence(seq) => seq.last(),
        }
    }
}

impl fmt::Display for HotkeyTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Combo(c) => write!(f, "{c}"),
            Self::Sequence(seq) => {
                for (i, c) in seq.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{c}")?;
                }
                Ok(())
            }
        }
    }
}

/// Enumerable description of a registered hotkey.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HotkeyInfo {
    pub id: HotkeyId,
    pub trigger: String,
    pub description: String,
    pub enabled: bool,
}

struct Hotkey {
    id: HotkeyId,
    trigger: HotkeyTrigger,
    description: String,
    enabled: bool,
    callback: Box<dyn FnMut()>,
}

/// Outcome of offering a key press to a table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Fired {
    pub any: bool,
    pub sequence: bool,
}

/// Ordered set of hotkeys.
#[derive(Default)]
pub struct HotkeyTable {
    entries: Vec<Hotkey>,
}

impl fmt::Debug for HotkeyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.descriptions()).finish()
    }
}

impl HotkeyTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single-combination hotkey.
    pub fn register<F>(&mut self, combo: KeyCombo, description: impl Into<String>, callback: F) -> HotkeyId
    where
        F: FnMut() + 'static,
    {
        self.insert(HotkeyTrigger::Combo(combo), description.into(), Box::new(callback))
    }

    /// Register a key sequence such as `G, G`.
    pub fn register_sequence<F>(
        &mut self,
        sequence: Vec<KeyCombo>,
        description: impl Into<String>,
        callback: F,
    ) -> Result<HotkeyId>
    where
        F: FnMut() + 'static,
    {
        if sequence.is_empty() {
            return Err(Error::InvalidKeyName(String::new()));
        }
        let trigger = if sequence.len() == 1 {
            HotkeyTrigger::Combo(sequence[0])
        } else {
            HotkeyTrigger::Sequence(sequence)
        };
        Ok(self.insert(trigger, description.into(), Box::new(callback)))
    }

    /// Register from a textual trigger (`"Ctrl+Shift+Z"`, `"G, G"`).
    pub fn register_str<F>(&mut self, trigger: &str, description: impl Into<String>, callback: F) -> Result<HotkeyId>
    where
        F: FnMut() + 'static,
    {
        let trigger = HotkeyTrigger::parse(trigger)?;
        Ok(self.insert(trigger, description.into(), Box::new(callback)))
    }

    fn insert(&mut self, trigger: HotkeyTrigger, description: String, callback: Box<dyn FnMut()>) -> HotkeyId {
        let id = HotkeyId::next();
        self.entries.push(Hotkey {
            id,
            trigger,
            description,
            enabled: true,
            callback,
        });
        id
    }

    /// Remove by id. Returns whether a hotkey was removed.
    pub fn unregister(&mut self, id: HotkeyId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|h| h.id != id);
        self.entries.len() != before
    }

    /// Remove every single-combination hotkey bound to `combo`.
    pub fn unregister_combo(&mut self, combo: KeyCombo) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|h| h.trigger != HotkeyTrigger::Combo(combo));
        before - self.entries.len()
    }

    /// Enable or disable a hotkey. Returns `false` for unknown ids.
    pub fn set_enabled(&mut self, id: HotkeyId, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|h| h.id == id) {
            Some(h) => {
                h.enabled = enabled;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, id: HotkeyId) -> bool {
        self.entries.iter().any(|h| h.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptions in registration order, for shortcut help screens.
    #[must_use]
    pub fn descriptions(&self) -> Vec<HotkeyInfo> {
        self.entries
            .iter()
            .map(|h| HotkeyInfo {
                id: h.id,
                trigger: h.trigger.to_string(),
                description: h.description.clone(),
                enabled: h.enabled,
            })
            .collect()
    }

    /// Fire every enabled hotkey matching a fresh press.
    ///
    /// `recent` is the trailing press sequence, ending with this press.
    pub(crate) fn dispatch(&mut self, key: KeyCode, modifiers: Modifiers, recent: &[KeyCombo]) -> Fired {
        let mut fired = Fired::default();
        for hotkey in self.entries.iter_mut().filter(|h| h.enabled) {
            let Some(last) = hotkey.trigger.last() else {
                continue;
            };
            if !last.matches(key, modifiers) {
                continue;
            }
            let matched = match &hotkey.trigger {
                HotkeyTrigger::Combo(_) => true,
                HotkeyTrigger::Sequence(seq) => recent.ends_with(seq),
            };
            if matched {
                (hotkey.callback)();
                fired.any = true;
                fired.sequence |= matches!(hotkey.trigger, HotkeyTrigger::Sequence(_));
            }
        }
        fired
    }
}
