//! Platform backed by in-memory raster surfaces.
//!
//! Each window renders into a [`RasterContext`]. Events are injected through
//! a [`HeadlessHandle`] shared with the window, which also records what the
//! window glue was asked to do (title, visibility, presented frames).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::geometry::{Point, Size};
use crate::input::Event;
use crate::render::{PixelSurface, RasterContext, RenderContext};
use crate::window::WindowConfig;

use super::{Platform, PlatformWindow, WindowState};

#[derive(Debug, Default)]
struct Shared {
    queue: VecDeque<Event>,
    title: String,
    visible: bool,
    closed: bool,
    position: Point,
    state: WindowState,
    frames: u64,
    last_frame: Option<PixelSurface>,
    fail_present: bool,
}

/// Test and embedding handle onto a headless window.
#[derive(Clone, Debug, Default)]
pub struct HeadlessHandle(Rc<RefCell<Shared>>);

impl HeadlessHandle {
    /// Queue an event for the next pump.
    pub fn inject(&self, event: Event) {
        self.0.borrow_mut().queue.push_back(event);
    }

    pub fn inject_all(&self, events: impl IntoIterator<Item = Event>) {
        self.0.borrow_mut().queue.extend(events);
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.0.borrow().queue.len()
    }

    #[must_use]
    pub fn title(&self) -> String {
        self.0.borrow().title.clone()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.0.borrow().visible
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.0.borrow().closed
    }

    #[must_use]
    pub fn position(&self) -> Point {
        self.0.borrow().position
    }

    #[must_use]
    pub fn state(&self) -> WindowState {
        self.0.borrow().state
    }

    /// Number of presented frames.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.0.borrow().frames
    }

    /// Copy of the most recently presented frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<PixelSurface> {
        self.0.borrow().last_frame.clone()
    }

    /// Make the next presents fail with a backend error.
    pub fn set_fail_present(&self, fail: bool) {
        self.0.borrow_mut().fail_present = fail;
    }
}

/// Handles of every window a [`HeadlessPlatform`] created, in creation order.
///
/// Stays usable after the platform has been moved into an application.
#[derive(Clone, Debug, Default)]
pub struct HeadlessHandles(Rc<RefCell<Vec<HeadlessHandle>>>);

impl HeadlessHandles {
    #[must_use]
    pub fn get(&self, index: usize) -> Option<HeadlessHandle> {
        self.0.borrow().get(index).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// A window rendering into memory.
pub struct HeadlessWindow {
    ctx: RasterContext,
    handle: HeadlessHandle,
    restore_size: Option<Size>,
    maximized_size: Size,
}

impl PlatformWindow for HeadlessWindow {
    fn show(&mut self) {
        self.handle.0.borrow_mut().visible = true;
    }

    fn hide(&mut self) {
        self.handle.0.borrow_mut().visible = false;
    }

    fn minimize(&mut self) {
        self.handle.0.borrow_mut().state = WindowState::Minimized;
    }

    fn maximize(&mut self) {
        if self.restore_size.is_none() {
            self.restore_size = Some(self.size());
        }
        let max = self.maximized_size;
        self.ctx.resize(max.width, max.height);
        self.handle.0.borrow_mut().state = WindowState::Maximized;
    }

    fn restore(&mut self) {
        if let Some(size) = self.restore_size.take() {
            self.ctx.resize(size.width, size.height);
        }
        self.handle.0.borrow_mut().state = WindowState::Normal;
    }

    fn close(&mut self) {
        let mut shared = self.handle.0.borrow_mut();
        shared.closed = true;
        shared.visible = false;
        shared.queue.clear();
    }

    fn set_title(&mut self, title: &str) {
        self.handle.0.borrow_mut().title = title.to_string();
    }

    fn set_position(&mut self, position: Point) {
        self.handle.0.borrow_mut().position = position;
    }

    fn set_size(&mut self, size: Size) -> Result<()> {
        if size.is_empty() {
            return Err(Error::InvalidDimensions {
                width: size.width,
                height: size.height,
            });
        }
        self.ctx.resize(size.width, size.height);
        Ok(())
    }

    fn size(&self) -> Size {
        self.ctx.surface().size()
    }

    fn state(&self) -> WindowState {
        self.handle.0.borrow().state
    }

    fn poll_events(&mut self) -> Vec<Event> {
        self.handle.0.borrow_mut().queue.drain(..).collect()
    }

    fn begin_frame(&mut self) {
        self.ctx.begin_frame();
    }

    fn render_context(&mut self) -> &mut dyn RenderContext {
        &mut self.ctx
    }

    fn present(&mut self) -> Result<()> {
        let mut shared = self.handle.0.borrow_mut();
        if shared.fail_present {
            return Err(Error::Backend(String::from("present failed")));
        }
        shared.frames += 1;
        shared.last_frame = Some(self.ctx.surface().clone());
        Ok(())
    }
}

/// Platform creating [`HeadlessWindow`]s.
#[derive(Debug)]
pub struct HeadlessPlatform {
    origin: Instant,
    handles: HeadlessHandles,
    max_size: Size,
    screen: Size,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            handles: HeadlessHandles::default(),
            max_size: Size::new(16_384, 16_384),
            screen: Size::new(1920, 1080),
        }
    }

    /// Surfaces larger than this fail to create.
    #[must_use]
    pub fn with_max_surface(mut self, size: Size) -> Self {
        self.max_size = size;
        self
    }

    /// Size windows take when maximized.
    #[must_use]
    pub fn with_screen_size(mut self, size: Size) -> Self {
        self.screen = size;
        self
    }

    /// Handle of the `index`-th created window.
    #[must_use]
    pub fn handle(&self, index: usize) -> Option<HeadlessHandle> {
        self.handles.get(index)
    }

    /// Shared view of all window handles.
    #[must_use]
    pub fn handles(&self) -> HeadlessHandles {
        self.handles.clone()
    }

    #[must_use]
    pub fn window_count(&self) -> usize {
        self.handles.len()
    }
}

impl Platform for HeadlessPlatform {
    fn name(&self) -> &str {
        "headless"
    }

    fn create_window(&mut self, config: &WindowConfig) -> Result<Box<dyn PlatformWindow>> {
        if config.width > self.max_size.width || config.height > self.max_size.height {
            return Err(Error::Setup(format!(
                "surface {}x{} exceeds the {}x{} limit",
                config.width, config.height, self.max_size.width, self.max_size.height
            )));
        }
        let ctx = RasterContext::new(config.width, config.height)
            .map_err(|e| Error::Setup(format!("raster surface: {e}")))?;
        let handle = HeadlessHandle::default();
        {
            let mut shared = handle.0.borrow_mut();
            shared.title.clone_from(&config.title);
            shared.position = Point::new(config.x, config.y);
        }
        self.handles.0.borrow_mut().push(handle.clone());
        Ok(Box::new(HeadlessWindow {
            ctx,
            handle,
            restore_size: None,
            maximized_size: self.screen,
        }))
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn test_setup_failure() {
        let mut platform = HeadlessPlatform::new().with_max_surface(Size::new(100, 100));
        let err = platform
            .create_window(&WindowConfig::new("big").with_size(200, 50))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Setup(_)));
        assert_eq!(platform.window_count(), 0);
    }

    #[test]
    fn test_inject_and_poll() {
        let mut platform = HeadlessPlatform::new();
        let mut win = platform
            .create_window(&WindowConfig::new("w").with_size(10, 10))
            .unwrap();
        let handle = platform.handle(0).unwrap();
        handle.inject(Event::focus_gained());
        handle.inject(Event::focus_lost());
        let events = win.poll_events();
        assert_eq!(events.len(), 2);
        assert_eq!(handle.pending(), 0);
    }

    #[test]
    fn test_present_snapshots_surface() {
        let mut platform = HeadlessPlatform::new();
        let mut win = platform
            .create_window(&WindowConfig::new("w").with_size(4, 4))
            .unwrap();
        win.render_context().clear(Color::RED);
        win.present().unwrap();
        let handle = platform.handle(0).unwrap();
        assert_eq!(handle.frames(), 1);
        assert_eq!(handle.last_frame().unwrap().get(0, 0), Some(Color::RED));
        handle.set_fail_present(true);
        assert!(win.present().is_err());
    }

    #[test]
    fn test_maximize_restore() {
        let mut platform = HeadlessPlatform::new().with_screen_size(Size::new(50, 40));
        let mut win = platform
            .create_window(&WindowConfig::new("w").with_size(10, 10))
            .unwrap();
        win.maximize();
        assert_eq!(win.size(), Size::new(50, 40));
        assert_eq!(win.state(), WindowState::Maximized);
        win.restore();
        assert_eq!(win.size(), Size::new(10, 10));
    }
}
