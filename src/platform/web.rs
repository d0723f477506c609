//! Platform backed by HTML canvases.
//!
//! Windows map to canvas elements named by `WindowConfig::platform_data`.
//! Drawing goes through a [`CanvasContext`]; on `wasm32` its sink is the
//! `paneforge_canvas` import module, elsewhere a [`RecordingSink`].
//!
//! DOM events are normalised here: `KeyboardEvent.code` (falling back to
//! `key`) gives the virtual key, printable keys also produce a `TextInput`
//! event, DOM auto-repeat `keydown`s are dropped in favour of synthesised
//! repeats, and page visibility/resize become window events.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::geometry::{Point, Size};
use crate::input::{Event, EventKind, KeyCode, Modifiers, MouseButton};
use crate::render::{CanvasContext, CanvasSink, RecordingSink, RenderContext};
use crate::window::WindowConfig;

use super::{Platform, PlatformWindow, WindowState};

/// Canvas id used when the config does not name one.
pub const DEFAULT_CANVAS_ID: &str = "canvas";

/// Build a modifier set from DOM event fields.
#[must_use]
pub fn modifiers_from_dom(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    let mut mods = Modifiers::empty();
    mods.set(Modifiers::SHIFT, shift);
    mods.set(Modifiers::CTRL, ctrl);
    mods.set(Modifiers::ALT, alt);
    mods.set(Modifiers::META, meta);
    mods
}

/// Normalise a DOM `keydown`/`keyup`.
///
/// `key_code` is the legacy `KeyboardEvent.keyCode`, kept as the native
/// code. A typing key's `KeyDown` carries its character, followed by the
/// `TextInput` event. Auto-repeat `keydown`s yield nothing; the keyboard
/// engine synthesises repeats from the held key.
#[must_use]
pub fn key_events_from_dom(
    down: bool,
    key: &str,
    code: &str,
    key_code: u32,
    modifiers: Modifiers,
    repeat: bool,
) -> Vec<Event> {
    let mut vk = KeyCode::from_dom_code(code);
    if vk == KeyCode::Unknown {
        vk = KeyCode::from_dom_key(key);
    }
    let mut out = Vec::with_capacity(2);
    if !down {
        out.push(Event::key_up(vk, modifiers).with_native_code(key_code));
        return out;
    }
    // The keyboard engine synthesizes repeats for held keys.
    if repeat {
        return out;
    }
    let mut press = Event::key_down(vk, modifiers).with_native_code(key_code);
    let mut chars = key.chars();
    let typed = match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() && !modifiers.intersects(Modifiers::CTRL | Modifiers::META) => Some(c),
        _ => None,
    };
    if let Some(ch) = typed {
        press = press.with_character(ch);
    }
    out.push(press);
    if typed.is_some() {
        out.push(Event::text_input(key));
    }
    out
}

/// Normalise a DOM mouse event. `event_type` is the DOM event name.
#[must_use]
pub fn mouse_event_from_dom(event_type: &str, x: i32, y: i32, button: i16, modifiers: Modifiers) -> Option<Event> {
    let pos = Point::new(x, y);
    let button = MouseButton::from_dom(button);
    let event = match event_type {
        "mousedown" | "pointerdown" => Event::mouse_down(pos, button),
        "mouseup" | "pointerup" => Event::mouse_up(pos, button),
        "mousemove" | "pointermove" => Event::mouse_move(pos),
        "dblclick" => Event::double_click(pos, button),
        "mouseleave" | "pointerleave" => Event {
            position: pos,
            ..Event::new(EventKind::MouseLeave)
        },
        _ => return None,
    };
    Some(event.with_modifiers(modifiers))
}

/// Normalise a DOM `wheel` event. Line and page deltas are scaled to pixels.
#[must_use]
pub fn wheel_event_from_dom(x: i32, y: i32, dx: f64, dy: f64, delta_mode: u32, modifiers: Modifiers) -> Event {
    let scale = match delta_mode {
        1 => 16.0,
        2 => 800.0,
        _ => 1.0,
    };
    Event::mouse_wheel(Point::new(x, y), dx * scale, dy * scale).with_modifiers(modifiers)
}

/// Event queue shared between the host callbacks and one web window.
#[derive(Clone, Debug, Default)]
pub struct WebHandle {
    queue: Rc<RefCell<VecDeque<Event>>>,
    closed: Rc<Cell<bool>>,
}

impl WebHandle {
    pub fn push(&self, event: Event) {
        if !self.closed.get() {
            self.queue.borrow_mut().push_back(event);
        }
    }

    pub fn push_all(&self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.push(event);
        }
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

thread_local! {
    static HANDLES: RefCell<HashMap<String, WebHandle>> = RefCell::new(HashMap::new());
}

/// Queue events for the window on `canvas_id`. Returns `false` if no such window exists.
pub fn dispatch_to_canvas(canvas_id: &str, events: Vec<Event>) -> bool {
    HANDLES.with(|h| match h.borrow().get(canvas_id) {
        Some(handle) => {
            handle.push_all(events);
            true
        }
        None => false,
    })
}

/// A window drawing into an HTML canvas.
pub struct WebWindow {
    ctx: CanvasContext,
    handle: WebHandle,
    canvas_id: String,
    state: WindowState,
    visible: bool,
}

impl WebWindow {
    #[must_use]
    pub fn canvas_id(&self) -> &str {
        &self.canvas_id
    }

    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.visible
    }
}

impl PlatformWindow for WebWindow {
    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    // The page owns the canvas geometry; only the state is tracked.
    fn minimize(&mut self) {
        self.state = WindowState::Minimized;
    }

    fn maximize(&mut self) {
        self.state = WindowState::Maximized;
    }

    fn restore(&mut self) {
        self.state = WindowState::Normal;
    }

    fn close(&mut self) {
        self.handle.closed.set(true);
        self.handle.queue.borrow_mut().clear();
        HANDLES.with(|h| h.borrow_mut().remove(&self.canvas_id));
    }

    fn set_title(&mut self, _title: &str) {}

    fn set_position(&mut self, _position: Point) {}

    fn set_size(&mut self, size: Size) -> Result<()> {
        if size.is_empty() {
            return Err(Error::InvalidDimensions {
                width: size.width,
                height: size.height,
            });
        }
        self.ctx.resize(size);
        Ok(())
    }

    fn size(&self) -> Size {
        self.ctx.size()
    }

    fn state(&self) -> WindowState {
        self.state
    }

    fn poll_events(&mut self) -> Vec<Event> {
        self.handle.queue.borrow_mut().drain(..).collect()
    }

    fn begin_frame(&mut self) {
        self.ctx.begin_frame();
    }

    fn render_context(&mut self) -> &mut dyn RenderContext {
        &mut self.ctx
    }

    fn present(&mut self) -> Result<()> {
        // The browser composites the canvas after the frame callback returns.
        Ok(())
    }
}

type SinkFactory = Box<dyn FnMut(&str) -> Box<dyn CanvasSink>>;

/// Platform creating canvas-backed windows.
pub struct WebPlatform {
    clock: Rc<Cell<Duration>>,
    sink_factory: SinkFactory,
}

impl std::fmt::Debug for WebPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebPlatform")
            .field("clock", &self.clock.get())
            .finish_non_exhaustive()
    }
}

impl Default for WebPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl WebPlatform {
    /// Platform forwarding to the JavaScript host.
    #[cfg(target_arch = "wasm32")]
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink_factory(|_| Box::new(crate::render::canvas::HostSink))
    }

    /// Platform recording into a fresh [`RecordingSink`].
    #[cfg(not(target_arch = "wasm32"))]
    #[must_use]
    pub fn new() -> Self {
        Self::with_recording(RecordingSink::new())
    }

    /// Every canvas records into clones of `sink`.
    #[must_use]
    pub fn with_recording(sink: RecordingSink) -> Self {
        Self::with_sink_factory(move |_| Box::new(sink.clone()))
    }

    #[must_use]
    pub fn with_sink_factory<F>(factory: F) -> Self
    where
        F: FnMut(&str) -> Box<dyn CanvasSink> + 'static,
    {
        Self {
            clock: Rc::new(Cell::new(Duration::ZERO)),
            sink_factory: Box::new(factory),
        }
    }

    /// Set the clock from a host timestamp (`performance.now()` milliseconds).
    pub fn set_time_ms(&self, millis: f64) {
        let millis = if millis.is_finite() { millis.max(0.0) } else { 0.0 };
        self.clock.set(Duration::from_secs_f64(millis / 1000.0));
    }

    /// Event handle for a created canvas window.
    #[must_use]
    pub fn handle(&self, canvas_id: &str) -> Option<WebHandle> {
        HANDLES.with(|h| h.borrow().get(canvas_id).cloned())
    }
}

impl Platform for WebPlatform {
    fn name(&self) -> &str {
        "web"
    }

    fn create_window(&mut self, config: &WindowConfig) -> Result<Box<dyn PlatformWindow>> {
        let canvas_id = if config.platform_data.is_empty() {
            DEFAULT_CANVAS_ID.to_string()
        } else {
            config.platform_data.clone()
        };
        let taken = HANDLES.with(|h| h.borrow().contains_key(&canvas_id));
        if taken {
            return Err(Error::Setup(format!("canvas '{canvas_id}' already has a window")));
        }
        let sink = (self.sink_factory)(&canvas_id);
        let ctx = CanvasContext::new(canvas_id.clone(), config.size(), sink);
        let handle = WebHandle::default();
        HANDLES.with(|h| h.borrow_mut().insert(canvas_id.clone(), handle.clone()));
        Ok(Box::new(WebWindow {
            ctx,
            handle,
            canvas_id,
            state: WindowState::Normal,
            visible: false,
        }))
    }

    fn now(&self) -> Duration {
        self.clock.get()
    }

    fn wait_until(&mut self, _deadline: Duration) {}

    fn sync_clock(&mut self, host_time: Duration) {
        self.clock.set(host_time);
    }

    fn host_driven(&self) -> bool {
        true
    }
}

/// Entry points called by the JavaScript host.
#[cfg(target_arch = "wasm32")]
#[allow(unsafe_code)]
mod exports {
    use super::{dispatch_to_canvas, key_events_from_dom, mouse_event_from_dom, wheel_event_from_dom};
    use crate::geometry::Size;
    use crate::input::{Event, Modifiers};

    /// # Safety
    /// `ptr` must reference `len` readable bytes for the duration of the call.
    unsafe fn host_str<'a>(ptr: *const u8, len: usize) -> std::borrow::Cow<'a, str> {
        if ptr.is_null() || len == 0 {
            return std::borrow::Cow::Borrowed("");
        }
        // SAFETY: guaranteed by the caller.
        let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
        String::from_utf8_lossy(bytes)
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn paneforge_key_event(
        canvas_ptr: *const u8,
        canvas_len: usize,
        key_ptr: *const u8,
        key_len: usize,
        code_ptr: *const u8,
        code_len: usize,
        key_code: u32,
        modifiers: u32,
        flags: u32,
    ) {
        // SAFETY: the host passes pointers into wasm memory it just wrote.
        let (canvas, key, code) = unsafe {
            (
                host_str(canvas_ptr, canvas_len),
                host_str(key_ptr, key_len),
                host_str(code_ptr, code_len),
            )
        };
        let mods = Modifiers::from_bits_truncate(modifiers as u8);
        let events = key_events_from_dom(flags & 1 != 0, &key, &code, key_code, mods, flags & 2 != 0);
        dispatch_to_canvas(&canvas, events);
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn paneforge_mouse_event(
        canvas_ptr: *const u8,
        canvas_len: usize,
        type_ptr: *const u8,
        type_len: usize,
        x: i32,
        y: i32,
        button: i32,
        modifiers: u32,
    ) {
        // SAFETY: as above.
        let (canvas, kind) = unsafe { (host_str(canvas_ptr, canvas_len), host_str(type_ptr, type_len)) };
        let mods = Modifiers::from_bits_truncate(modifiers as u8);
        if let Some(event) = mouse_event_from_dom(&kind, x, y, button as i16, mods) {
            dispatch_to_canvas(&canvas, vec![event]);
        }
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn paneforge_wheel_event(
        canvas_ptr: *const u8,
        canvas_len: usize,
        x: i32,
        y: i32,
        dx: f64,
        dy: f64,
        delta_mode: u32,
        modifiers: u32,
    ) {
        // SAFETY: as above.
        let canvas = unsafe { host_str(canvas_ptr, canvas_len) };
        let mods = Modifiers::from_bits_truncate(modifiers as u8);
        dispatch_to_canvas(&canvas, vec![wheel_event_from_dom(x, y, dx, dy, delta_mode, mods)]);
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn paneforge_resize(canvas_ptr: *const u8, canvas_len: usize, width: u32, height: u32) {
        // SAFETY: as above.
        let canvas = unsafe { host_str(canvas_ptr, canvas_len) };
        dispatch_to_canvas(&canvas, vec![Event::window_resize(Size::new(width, height))]);
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn paneforge_visibility(canvas_ptr: *const u8, canvas_len: usize, visible: u32) {
        // SAFETY: as above.
        let canvas = unsafe { host_str(canvas_ptr, canvas_len) };
        dispatch_to_canvas(&canvas, vec![Event::window_visibility(visible != 0)]);
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn paneforge_text_input(canvas_ptr: *const u8, canvas_len: usize, text_ptr: *const u8, text_len: usize) {
        // SAFETY: as above.
        let (canvas, text) = unsafe { (host_str(canvas_ptr, canvas_len), host_str(text_ptr, text_len)) };
        if !text.is_empty() {
            dispatch_to_canvas(&canvas, vec![Event::text_input(text.into_owned())]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CanvasCommand;

    #[test]
    fn test_printable_key_adds_text() {
        let events = key_events_from_dom(true, "a", "KeyA", 65, Modifiers::empty(), false);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::KeyDown);
        assert_eq!(events[0].key, KeyCode::A);
        assert_eq!(events[0].native_key_code, 65);
        assert_eq!(events[0].character, Some('a'));
        assert_eq!(events[1].kind, EventKind::TextInput);
        assert_eq!(events[1].text, "a");
    }

    #[test]
    fn test_shortcut_has_no_text() {
        let events = key_events_from_dom(true, "s", "KeyS", 83, Modifiers::CTRL, false);
        assert_eq!(events.len(), 1);
        assert!(events[0].ctrl());
        assert_eq!(events[0].character, None);
    }

    #[test]
    fn test_dom_repeat_is_dropped() {
        let events = key_events_from_dom(true, "x", "KeyX", 88, Modifiers::empty(), true);
        assert!(events.is_empty());
        let nav = key_events_from_dom(true, "ArrowLeft", "ArrowLeft", 37, Modifiers::empty(), true);
        assert!(nav.is_empty());
    }

    #[test]
    fn test_key_fallback_to_key_name() {
        let events = key_events_from_dom(false, "Enter", "", 13, Modifiers::empty(), false);
        assert_eq!(events[0].kind, EventKind::KeyUp);
        assert_eq!(events[0].key, KeyCode::Enter);
    }

    #[test]
    fn test_mouse_and_wheel() {
        let ev = mouse_event_from_dom("mousedown", 3, 4, 2, Modifiers::SHIFT).unwrap();
        assert_eq!(ev.button, MouseButton::Right);
        assert!(ev.shift());
        assert!(mouse_event_from_dom("contextmenu", 0, 0, 0, Modifiers::empty()).is_none());
        let wheel = wheel_event_from_dom(0, 0, 0.0, 3.0, 1, Modifiers::empty());
        assert_eq!(wheel.wheel_delta.y, 48.0);
    }

    #[test]
    fn test_window_on_named_canvas() {
        let sink = RecordingSink::new();
        let mut platform = WebPlatform::with_recording(sink.clone());
        let cfg = WindowConfig::new("w").with_size(20, 10).with_platform_data("web-test-canvas");
        let mut win = platform.create_window(&cfg).unwrap();
        assert!(platform.create_window(&cfg).is_err());

        assert!(dispatch_to_canvas("web-test-canvas", vec![Event::focus_gained()]));
        assert_eq!(win.poll_events().len(), 1);

        win.render_context().clear(crate::color::Color::BLACK);
        assert!(sink.canvas_ids().iter().all(|id| id == "web-test-canvas"));
        assert!(sink.commands().iter().any(|c| matches!(c, CanvasCommand::Clear(_))));

        win.close();
        assert!(!dispatch_to_canvas("web-test-canvas", vec![Event::focus_gained()]));
    }

    #[test]
    fn test_clock_from_host() {
        let platform = WebPlatform::new();
        platform.set_time_ms(1500.0);
        assert_eq!(platform.now(), Duration::from_millis(1500));
        assert!(platform.host_driven());
    }
}
