//! Top-level windows.
//!
//! A [`Window`] ties a platform window and its surface to a root
//! [`Container`], a [`Router`], a window-local hotkey table and the redraw
//! signal shared by every attached element.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::color::Color;
use crate::element::{self, Container, Element, ElementRef, RedrawSignal};
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect, Size};
use crate::input::{Event, EventKind};
use crate::keyboard::{HotkeyTable, KeyboardState};
use crate::log::{self, LogLevel};
use crate::platform::{Platform, PlatformWindow, WindowState};
use crate::router::Router;

/// Kind of top-level window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WindowType {
    #[default]
    Standard,
    Tool,
    Fullscreen,
    Popup,
}

/// Window creation parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub always_on_top: bool,
    pub window_type: WindowType,
    pub background_color: Color,
    /// Backend-specific string, e.g. the canvas element id on the web.
    pub platform_data: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::from("paneforge"),
            x: 0,
            y: 0,
            width: 800,
            height: 600,
            resizable: true,
            always_on_top: false,
            window_type: WindowType::Standard,
            background_color: Color::WHITE,
            platform_data: String::new(),
        }
    }
}

impl WindowConfig {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    #[must_use]
    pub fn with_always_on_top(mut self, on_top: bool) -> Self {
        self.always_on_top = on_top;
        self
    }

    #[must_use]
    pub fn with_type(mut self, window_type: WindowType) -> Self {
        self.window_type = window_type;
        self
    }

    #[must_use]
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    #[must_use]
    pub fn with_platform_data(mut self, data: impl Into<String>) -> Self {
        self.platform_data = data.into();
        self
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Application-unique window identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

type CloseHandler = Box<dyn FnMut(&Event) -> bool>;

/// A top-level window.
pub struct Window {
    id: WindowId,
    config: WindowConfig,
    native: Box<dyn PlatformWindow>,
    root: ElementRef,
    visible: bool,
    closed: bool,
    active: bool,
    redraw: RedrawSignal,
    router: Router,
    hotkeys: HotkeyTable,
    close_handler: Option<CloseHandler>,
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("title", &self.config.title)
            .field("visible", &self.visible)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl Window {
    /// Create the platform window and a root container sized to `config`.
    pub fn create(platform: &mut dyn Platform, config: WindowConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(Error::InvalidDimensions {
                width: config.width,
                height: config.height,
            });
        }
        let native = platform.create_window(&config)?;
        let root = Container::new("root")
            .with_bounds(Rect::from_size(config.size()))
            .into_ref();
        let redraw = RedrawSignal::new();
        element::attach_root(&root, &redraw);
        redraw.request();

        let id = WindowId(NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed));
        log::emit_event("window.create", &format!("{} {}", id.0, config.title));
        Ok(Self {
            id,
            config,
            native,
            root,
            visible: false,
            closed: false,
            active: false,
            redraw,
            router: Router::new(),
            hotkeys: HotkeyTable::new(),
            close_handler: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> WindowId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.config.title
    }

    /// Root container of the element tree.
    #[must_use]
    pub fn root(&self) -> &ElementRef {
        &self.root
    }

    /// Attach an element to the root container.
    pub fn add_element(&mut self, element: ElementRef) -> bool {
        element::add_child(&self.root, element)
    }

    pub fn remove_element(&mut self, element: &ElementRef) -> bool {
        element::remove_child(&self.root, element)
    }

    pub fn show(&mut self) {
        self.native.show();
        self.visible = true;
        self.redraw.request();
    }

    pub fn hide(&mut self) {
        self.native.hide();
        self.visible = false;
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible && !self.closed
    }

    pub fn minimize(&mut self) {
        self.native.minimize();
    }

    pub fn maximize(&mut self) {
        self.native.maximize();
        self.sync_size();
    }

    pub fn restore(&mut self) {
        self.native.restore();
        self.sync_size();
    }

    #[must_use]
    pub fn state(&self) -> WindowState {
        self.native.state()
    }

    /// Install the close handler. Returning `false` vetoes the close.
    pub fn on_close<F>(&mut self, handler: F)
    where
        F: FnMut(&Event) -> bool + 'static,
    {
        self.close_handler = Some(Box::new(handler));
    }

    /// Request a close.
    ///
    /// The close handler sees a `WindowClose` event first and may veto.
    /// Returns whether the window is now closed.
    pub fn close(&mut self) -> bool {
        if self.closed {
            return true;
        }
        let event = Event::window_close();
        if let Some(handler) = &mut self.close_handler {
            if !handler(&event) {
                log::emit_event("window.close_vetoed", &self.id.0.to_string());
                return false;
            }
        }
        self.native.close();
        self.closed = true;
        self.visible = false;
        self.router.reset_pointer();
        log::emit_event("window.close", &self.id.0.to_string());
        true
    }

    /// Whether the window holds keyboard focus on its platform.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active && !self.closed
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.config.title = title.into();
        self.native.set_title(&self.config.title);
    }

    pub fn set_position(&mut self, position: Point) {
        self.config.x = position.x;
        self.config.y = position.y;
        self.native.set_position(position);
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.config.x, self.config.y)
    }

    /// Resize the native window, its surface and the root container.
    pub fn set_size(&mut self, size: Size) -> Result<()> {
        if size.is_empty() {
            return Err(Error::InvalidDimensions {
                width: size.width,
                height: size.height,
            });
        }
        self.native.set_size(size)?;
        self.apply_size(size);
        Ok(())
    }

    fn sync_size(&mut self) {
        let size = self.native.size();
        if size != self.size() && !size.is_empty() {
            self.apply_size(size);
        }
    }

    fn apply_size(&mut self, size: Size) {
        self.config.width = size.width;
        self.config.height = size.height;
        let mut root = self.root.borrow_mut();
        root.base_mut().set_size(size);
        root.base_mut().mark_layout_dirty();
        drop(root);
        self.redraw.request();
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.config.size()
    }

    pub fn set_background(&mut self, color: Color) {
        self.config.background_color = color;
        self.redraw.request();
    }

    #[must_use]
    pub fn background(&self) -> Color {
        self.config.background_color
    }

    pub fn request_redraw(&self) {
        self.redraw.request();
    }

    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.redraw.is_requested()
    }

    #[must_use]
    pub fn redraw_signal(&self) -> &RedrawSignal {
        &self.redraw
    }

    /// Window-local hotkeys, consulted after the focused element chain.
    pub fn hotkeys(&mut self) -> &mut HotkeyTable {
        &mut self.hotkeys
    }

    #[must_use]
    pub fn focused(&self) -> Option<ElementRef> {
        self.router.focused()
    }

    /// Move focus to `element` (or clear it).
    pub fn set_focus(&mut self, element: Option<&ElementRef>) -> bool {
        self.router.set_focus(&self.root, element)
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Handle one normalised event. Returns whether it was consumed.
    pub fn handle_event(&mut self, event: &Event, keyboard: &mut KeyboardState, now: Duration) -> bool {
        if self.closed {
            return false;
        }
        match event.kind {
            EventKind::WindowResize => {
                if event.size.is_empty() {
                    log::warn("ignoring resize to an empty surface");
                    return false;
                }
                if let Err(err) = self.native.set_size(event.size) {
                    log::emit_log(LogLevel::Error, &format!("surface resize failed: {err}"));
                    return false;
                }
                self.apply_size(event.size);
                true
            }
            EventKind::WindowClose => self.close(),
            EventKind::WindowMove => {
                self.config.x = event.position.x;
                self.config.y = event.position.y;
                true
            }
            EventKind::WindowVisibility => {
                self.visible = event.visible;
                if event.visible {
                    self.redraw.request();
                }
                true
            }
            EventKind::FocusLost => {
                self.active = false;
                keyboard.release_all();
                self.router.clear_hover(event);
                false
            }
            EventKind::FocusGained => {
                self.active = true;
                false
            }
            _ => self
                .router
                .route(&self.root, event, keyboard, &mut self.hotkeys, now),
        }
    }

    /// Drain and handle pending platform events in arrival order.
    pub fn pump_events(&mut self, keyboard: &mut KeyboardState, now: Duration) -> usize {
        let events = self.native.poll_events();
        for event in &events {
            self.handle_event(event, keyboard, now);
        }
        events.len()
    }

    /// Advance time-driven element state.
    pub fn tick(&mut self, now: Duration) {
        if !self.closed {
            element::tick_tree(&self.root, now);
        }
    }

    /// Lay out, clear and paint when a redraw is pending.
    ///
    /// Returns `Ok(true)` when a frame was presented.
    pub fn paint(&mut self) -> Result<bool> {
        if !self.is_visible() || !self.redraw.is_requested() {
            return Ok(false);
        }
        element::layout_tree(&self.root);
        let background = self.config.background_color;
        // Requests made while painting belong to the next frame.
        self.redraw.take();
        self.native.begin_frame();
        {
            let ctx = self.native.render_context();
            ctx.clear(background);
            element::render_element(&self.root, ctx);
        }
        self.native.present()?;
        Ok(true)
    }

    /// Immediate access to the surface's render context.
    pub fn render_context(&mut self) -> &mut dyn crate::render::RenderContext {
        self.native.render_context()
    }

    /// Find an element by id anywhere in this window.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<ElementRef> {
        element::find_by_id(&self.root, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::HeadlessPlatform;

    fn window() -> (HeadlessPlatform, Window) {
        let mut platform = HeadlessPlatform::new();
        let win = Window::create(&mut platform, WindowConfig::new("test").with_size(100, 80)).unwrap();
        (platform, win)
    }

    #[test]
    fn test_config_builder() {
        let cfg = WindowConfig::new("t")
            .with_position(5, 6)
            .with_size(10, 20)
            .with_type(WindowType::Popup)
            .with_platform_data("canvas-1");
        assert_eq!(cfg.size(), Size::new(10, 20));
        assert_eq!(cfg.window_type, WindowType::Popup);
        assert_eq!(cfg.platform_data, "canvas-1");
        assert!(cfg.resizable);
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut platform = HeadlessPlatform::new();
        let err = Window::create(&mut platform, WindowConfig::new("z").with_size(0, 10)).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }));
    }

    #[test]
    fn test_close_veto() {
        let (_p, mut win) = window();
        let mut allow = false;
        win.on_close(move |ev| {
            assert_eq!(ev.kind, EventKind::WindowClose);
            let ok = allow;
            allow = true;
            ok
        });
        assert!(!win.close());
        assert!(!win.is_closed());
        assert!(win.close());
        assert!(win.is_closed());
    }

    #[test]
    fn test_resize_event_resizes_root() {
        let (_p, mut win) = window();
        let mut kb = KeyboardState::default();
        win.show();
        win.paint().unwrap();
        assert!(!win.needs_redraw());
        assert!(win.handle_event(&Event::window_resize(Size::new(200, 100)), &mut kb, Duration::ZERO));
        assert_eq!(win.root().borrow().base().bounds().size(), Size::new(200, 100));
        assert!(win.needs_redraw());
        assert_eq!(win.size(), Size::new(200, 100));
    }

    #[test]
    fn test_paint_only_when_needed() {
        let (_p, mut win) = window();
        assert!(!win.paint().unwrap());
        win.show();
        assert!(win.paint().unwrap());
        assert!(!win.paint().unwrap());
        win.request_redraw();
        assert!(win.paint().unwrap());
    }
}
