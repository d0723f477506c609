//! Platform contracts.
//!
//! A [`Platform`] creates [`PlatformWindow`]s; each platform window owns a
//! drawing surface exposed as a [`RenderContext`] and a queue of normalised
//! [`Event`]s. Two implementations ship with the crate:
//!
//! - [`headless::HeadlessPlatform`]: software raster surfaces and injected
//!   events, for native embedding glue and tests
//! - [`web::WebPlatform`]: HTML canvas surfaces keyed by canvas id, with DOM
//!   event normalisation

pub mod headless;
pub mod web;

use std::time::Duration;

use crate::error::Result;
use crate::geometry::{Point, Size};
use crate::input::Event;
use crate::render::RenderContext;
use crate::window::WindowConfig;

/// Presentation state of a platform window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

/// A native window and its surface.
pub trait PlatformWindow {
    fn show(&mut self);
    fn hide(&mut self);
    fn minimize(&mut self);
    fn maximize(&mut self);
    fn restore(&mut self);
    /// Destroy the native window and its surface.
    fn close(&mut self);
    fn set_title(&mut self, title: &str);
    fn set_position(&mut self, position: Point);
    /// Resize the native window and its surface.
    fn set_size(&mut self, size: Size) -> Result<()>;

    fn size(&self) -> Size;
    fn state(&self) -> WindowState;

    /// Drain pending events in arrival order.
    fn poll_events(&mut self) -> Vec<Event>;

    /// Prepare the surface for a new paint pass.
    fn begin_frame(&mut self);
    fn render_context(&mut self) -> &mut dyn RenderContext;
    /// Make the painted frame visible.
    fn present(&mut self) -> Result<()>;
}

/// Window factory and clock.
pub trait Platform {
    fn name(&self) -> &str;

    /// Create a native window for `config`. Failures are `Error::Setup`.
    fn create_window(&mut self, config: &WindowConfig) -> Result<Box<dyn PlatformWindow>>;

    /// Monotonic time since the platform's origin.
    fn now(&self) -> Duration;

    /// Block until `deadline` on the platform clock. Hosts that drive the
    /// frame loop themselves return immediately.
    fn wait_until(&mut self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }

    /// Adopt a timestamp supplied by the host's frame callback.
    fn sync_clock(&mut self, _host_time: Duration) {}

    /// Whether the host drives frames (the main loop must return after setup).
    fn host_driven(&self) -> bool {
        false
    }
}
