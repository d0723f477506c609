//! Shared helpers for integration tests.

#![allow(dead_code)]
#![allow(clippy::nursery)] // Test infra prioritizes clarity over pedantry
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use paneforge::element::{Element, ElementBase, ElementRef};
use paneforge::input::{Event, EventKind};
use paneforge::keyboard::KeyboardState;
use paneforge::platform::headless::{HeadlessHandle, HeadlessPlatform};
use paneforge::{LogLevel, Rect, Window, WindowConfig};

/// Route crate diagnostics into `tracing` and install a test subscriber.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(true)
        .with_test_writer()
        .try_init();
    paneforge::set_log_callback(|level, message| match level {
        LogLevel::Debug => tracing::debug!(target: "paneforge", "{message}"),
        LogLevel::Info => tracing::info!(target: "paneforge", "{message}"),
        LogLevel::Warn => tracing::warn!(target: "paneforge", "{message}"),
        LogLevel::Error => tracing::error!(target: "paneforge", "{message}"),
    });
    paneforge::set_event_callback(|name, data| {
        tracing::debug!(target: "paneforge::event", name, data);
    });
}

/// A headless platform, one shown window of `width` x `height`, and the
/// handle of that window's native side.
pub fn headless_window(width: u32, height: u32) -> (HeadlessPlatform, Window, HeadlessHandle) {
    let mut platform = HeadlessPlatform::new();
    let mut window = Window::create(&mut platform, WindowConfig::new("test").with_size(width, height))
        .expect("headless window");
    window.show();
    let handle = platform.handle(0).expect("handle of the first window");
    (platform, window, handle)
}

/// Feed events through a window with a fresh frame per event.
pub fn send_all(window: &mut Window, keyboard: &mut KeyboardState, events: &[Event]) {
    for (i, event) in events.iter().enumerate() {
        keyboard.begin_frame();
        window.handle_event(event, keyboard, Duration::from_millis(i as u64 * 16));
    }
}

/// Element that records every event kind it receives.
pub struct Probe {
    base: ElementBase,
    pub log: Rc<RefCell<Vec<EventKind>>>,
    consume: bool,
}

impl Probe {
    pub fn new(id: &str, bounds: Rect) -> Self {
        let mut base = ElementBase::new(id);
        base.set_bounds(bounds);
        base.set_focusable(true);
        Self {
            base,
            log: Rc::new(RefCell::new(Vec::new())),
            consume: true,
        }
    }

    pub fn passive(mut self) -> Self {
        self.consume = false;
        self
    }

    /// Shared log plus the element handle.
    pub fn build(self) -> (ElementRef, Rc<RefCell<Vec<EventKind>>>) {
        let log = Rc::clone(&self.log);
        (self.into_ref(), log)
    }
}

impl Element for Probe {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn on_event(&mut self, event: &Event) -> bool {
        self.log.borrow_mut().push(event.kind);
        self.consume
    }
}
