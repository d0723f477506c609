//! Clipboard bridge.
//!
//! Platform glue installs a [`Clipboard`] implementation for the current
//! thread; text inputs reach it through [`with_clipboard`]. When nothing is
//! installed, an in-memory clipboard is created on first use.

use std::cell::RefCell;

/// Plain-text clipboard provided by the platform.
pub trait Clipboard {
    fn set_text(&mut self, text: &str);
    fn text(&self) -> Option<String>;

    fn has_text(&self) -> bool {
        self.text().is_some_and(|t| !t.is_empty())
    }
}

/// Clipboard held in process memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) {
        self.contents = Some(text.to_string());
    }

    fn text(&self) -> Option<String> {
        self.contents.clone()
    }
}

thread_local! {
    static BRIDGE: RefCell<Option<Box<dyn Clipboard>>> = const { RefCell::new(None) };
}

/// Install `clipboard` for this thread, returning the previous one.
pub fn install(clipboard: Box<dyn Clipboard>) -> Option<Box<dyn Clipboard>> {
    BRIDGE.with(|b| b.borrow_mut().replace(clipboard))
}

/// Remove the installed clipboard.
pub fn uninstall() -> Option<Box<dyn Clipboard>> {
    BRIDGE.with(|b| b.borrow_mut().take())
}

#[must_use]
pub fn is_installed() -> bool {
    BRIDGE.with(|b| b.borrow().is_some())
}

/// Run `f` against the installed clipboard.
pub fn with_clipboard<R>(f: impl FnOnce(&mut dyn Clipboard) -> R) -> R {
    BRIDGE.with(|b| {
        let mut slot = b.borrow_mut();
        let clipboard = slot.get_or_insert_with(|| Box::new(MemoryClipboard::new()));
        f(clipboard.as_mut())
    })
}

/// Copy `text` to the clipboard.
pub fn copy(text: &str) {
    with_clipboard(|c| c.set_text(text));
}

/// Current clipboard text, if any.
#[must_use]
pub fn paste() -> Option<String> {
    with_clipboard(|c| c.text())
}
