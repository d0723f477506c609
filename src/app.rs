//! Application singleton and main loop.
//!
//! One [`Application`] lives per thread between [`Application::initialize`]
//! and [`Application::shutdown`]. It owns the platform, the windows and the
//! keyboard engine. Native platforms run the loop in [`Application::run`];
//! host-driven platforms (the web) return from `run` and call
//! [`Application::tick`] from their frame callback.
//!
//! Code running inside a frame (element hooks, hotkey callbacks) must not
//! re-enter the instance: [`Application::with_instance`] reports
//! `Error::Lifecycle` while a frame is in progress. [`Application::exit`]
//! only raises a flag and is safe to call from anywhere.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use crate::clipboard;
use crate::error::{Error, Result};
use crate::input::Event;
use crate::keyboard::{KeyRepeatConfig, KeyboardState};
use crate::log::{self, LogLevel};
use crate::platform::Platform;
use crate::window::{Window, WindowConfig, WindowId};

const MAX_FPS: u32 = 1000;
const FPS_WINDOW: Duration = Duration::from_secs(1);

/// Application configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Frames per second the native loop aims for.
    pub target_fps: u32,
    pub key_repeat: KeyRepeatConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            key_repeat: KeyRepeatConfig::default(),
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    #[must_use]
    pub fn with_key_repeat(mut self, key_repeat: KeyRepeatConfig) -> Self {
        self.key_repeat = key_repeat;
        self
    }
}

/// Frame rate measured over one-second windows.
#[derive(Clone, Copy, Debug, Default)]
struct FrameStats {
    window_start: Option<Duration>,
    frames: u32,
    fps: f64,
}

impl FrameStats {
    fn record(&mut self, now: Duration) {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        let elapsed = now.saturating_sub(start);
        if elapsed >= FPS_WINDOW {
            self.fps = f64::from(self.frames) / elapsed.as_secs_f64();
            self.window_start = Some(now);
            self.frames = 0;
        }
    }
}

thread_local! {
    static INSTANCE: RefCell<Option<Application>> = const { RefCell::new(None) };
    static EXIT_REQUESTED: Cell<bool> = const { Cell::new(false) };
}

/// The per-thread application.
pub struct Application {
    platform: Box<dyn Platform>,
    windows: Vec<Window>,
    keyboard: KeyboardState,
    target_fps: u32,
    frame_interval: Duration,
    stats: FrameStats,
    running: bool,
    exited: bool,
    had_windows: bool,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("platform", &self.platform.name())
            .field("windows", &self.windows.len())
            .field("target_fps", &self.target_fps)
            .field("running", &self.running)
            .field("exited", &self.exited)
            .finish_non_exhaustive()
    }
}

impl Application {
    /// Create and install the instance for this thread.
    ///
    /// On error nothing is installed and [`Application::run`] will fail.
    pub fn initialize(platform: Box<dyn Platform>, config: AppConfig) -> Result<()> {
        if Self::is_initialized() {
            return Err(Error::Lifecycle("application already initialized"));
        }
        if config.target_fps == 0 {
            return Err(Error::Setup(String::from("target fps must be positive")));
        }
        if config.key_repeat.sequence_length == 0 {
            return Err(Error::Setup(String::from("key sequence length must be positive")));
        }
        let mut app = Self {
            platform,
            windows: Vec::new(),
            keyboard: KeyboardState::new(config.key_repeat),
            target_fps: 0,
            frame_interval: Duration::ZERO,
            stats: FrameStats::default(),
            running: false,
            exited: false,
            had_windows: false,
        };
        app.set_target_fps(config.target_fps);
        if !clipboard::is_installed() {
            clipboard::install(Box::new(clipboard::MemoryClipboard::new()));
        }
        let name = app.platform.name().to_string();
        INSTANCE.with(|slot| {
            slot.try_borrow_mut()
                .map(|mut slot| *slot = Some(app))
                .map_err(|_| Error::Lifecycle("application instance is busy"))
        })?;
        EXIT_REQUESTED.with(|flag| flag.set(false));
        log::emit_event("app.initialize", &name);
        Ok(())
    }

    #[must_use]
    pub fn is_initialized() -> bool {
        INSTANCE.with(|slot| slot.try_borrow().map_or(true, |slot| slot.is_some()))
    }

    /// Run `f` with the installed instance.
    pub fn with_instance<R>(f: impl FnOnce(&mut Application) -> R) -> Result<R> {
        INSTANCE.with(|slot| {
            let mut slot = slot
                .try_borrow_mut()
                .map_err(|_| Error::Lifecycle("application instance is busy"))?;
            let app = slot
                .as_mut()
                .ok_or(Error::Lifecycle("application not initialized"))?;
            Ok(f(app))
        })
    }

    /// Run the main loop until [`Application::exit`] or the last window closes.
    ///
    /// Host-driven platforms return immediately after marking the
    /// application running; frames then arrive through [`Application::tick`].
    pub fn run() -> Result<()> {
        let host_driven = Self::with_instance(|app| {
            if app.exited {
                return Err(Error::Lifecycle("application already exited"));
            }
            if app.running {
                return Err(Error::Lifecycle("application already running"));
            }
            app.running = true;
            Ok(app.platform.host_driven())
        })??;
        log::emit_event("app.run", "");
        if host_driven {
            return Ok(());
        }
        loop {
            let keep_going = Self::with_instance(|app| {
                let now = app.platform.now();
                app.run_frame(now);
                if !app.running {
                    return false;
                }
                let deadline = now + app.frame_interval;
                app.platform.wait_until(deadline);
                true
            })?;
            if !keep_going {
                return Ok(());
            }
        }
    }

    /// One host-driven frame at host time `host_time`.
    ///
    /// Returns whether the host should schedule another frame.
    pub fn tick(host_time: Duration) -> Result<bool> {
        Self::with_instance(|app| {
            app.platform.sync_clock(host_time);
            let now = app.platform.now();
            app.run_frame(now);
            app.running
        })
    }

    /// Request the main loop to stop after the current frame.
    pub fn exit() {
        EXIT_REQUESTED.with(|flag| flag.set(true));
    }

    /// Uninstall the instance, closing every window.
    pub fn shutdown() -> Result<()> {
        let app = INSTANCE.with(|slot| {
            slot.try_borrow_mut()
                .map(|mut slot| slot.take())
                .map_err(|_| Error::Lifecycle("application instance is busy"))
        })?;
        let Some(mut app) = app else {
            return Err(Error::Lifecycle("application not initialized"));
        };
        app.finish();
        for window in &mut app.windows {
            window.close();
        }
        EXIT_REQUESTED.with(|flag| flag.set(false));
        log::emit_event("app.shutdown", "");
        Ok(())
    }

    /// Create a window on the platform.
    pub fn create_window(&mut self, config: WindowConfig) -> Result<WindowId> {
        if self.exited || EXIT_REQUESTED.with(Cell::get) {
            return Err(Error::Lifecycle("window created after exit"));
        }
        let window = Window::create(self.platform.as_mut(), config)?;
        let id = window.id();
        self.windows.push(window);
        self.had_windows = true;
        Ok(id)
    }

    #[must_use]
    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.iter().find(|w| w.id() == id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.id() == id)
    }

    /// Open windows in creation order.
    #[must_use]
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn windows_mut(&mut self) -> &mut [Window] {
        &mut self.windows
    }

    /// One main-loop iteration. Returns the number of windows presented.
    pub fn run_frame(&mut self, now: Duration) -> usize {
        if EXIT_REQUESTED.with(Cell::get) {
            self.finish();
            return 0;
        }
        self.keyboard.begin_frame();
        for window in &mut self.windows {
            if !window.is_closed() {
                window.pump_events(&mut self.keyboard, now);
            }
        }

        let repeats = self.keyboard.update(now);
        if !repeats.is_empty() {
            self.route_repeats(&repeats, now);
        }

        let mut presented = 0;
        for window in &mut self.windows {
            window.tick(now);
            match window.paint() {
                Ok(true) => presented += 1,
                Ok(false) => {}
                Err(err) => {
                    log::emit_log(LogLevel::Error, &format!("paint failed: {err}"));
                }
            }
        }

        self.windows.retain(|w| !w.is_closed());
        self.stats.record(now);

        if EXIT_REQUESTED.with(Cell::get) || (self.had_windows && self.windows.is_empty()) {
            self.finish();
        }
        presented
    }

    fn route_repeats(&mut self, repeats: &[Event], now: Duration) {
        let target = self
            .windows
            .iter()
            .position(Window::is_active)
            .or_else(|| self.windows.iter().position(Window::is_visible));
        let Some(index) = target else {
            return;
        };
        let window = &mut self.windows[index];
        for event in repeats {
            window.handle_event(event, &mut self.keyboard, now);
        }
    }

    fn finish(&mut self) {
        if self.exited {
            return;
        }
        self.running = false;
        self.exited = true;
        self.keyboard.release_all();
        log::emit_event("app.exit", "");
    }

    /// Clamp and apply a new frame rate target.
    pub fn set_target_fps(&mut self, fps: u32) {
        self.target_fps = fps.clamp(1, MAX_FPS);
        self.frame_interval = Duration::from_secs(1) / self.target_fps;
    }

    #[must_use]
    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Frames per second over the last complete one-second window.
    #[must_use]
    pub fn actual_fps(&self) -> f64 {
        self.stats.fps
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn has_exited(&self) -> bool {
        self.exited
    }

    #[must_use]
    pub fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut KeyboardState {
        &mut self.keyboard
    }

    #[must_use]
    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    /// Current platform time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.platform.now()
    }
}

/// Frame callback exported to the JavaScript host.
///
/// Returns 1 while the application wants more frames.
#[cfg(target_arch = "wasm32")]
#[allow(unsafe_code)]
#[unsafe(no_mangle)]
pub extern "C" fn paneforge_tick(timestamp_ms: f64) -> u32 {
    let millis = if timestamp_ms.is_finite() { timestamp_ms.max(0.0) } else { 0.0 };
    match Application::tick(Duration::from_secs_f64(millis / 1000.0)) {
        Ok(true) => 1,
        Ok(false) => 0,
        Err(err) => {
            log::emit_log(LogLevel::Error, &format!("tick failed: {err}"));
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::input::{KeyCode, KeyCombo, Modifiers};
    use crate::platform::headless::HeadlessPlatform;

    fn fresh(config: AppConfig) {
        let _ = Application::shutdown();
        Application::initialize(Box::new(HeadlessPlatform::new()), config).unwrap();
    }

    #[test]
    fn test_lifecycle_errors() {
        let _ = Application::shutdown();
        assert!(matches!(Application::run(), Err(Error::Lifecycle(_))));
        let err = Application::initialize(Box::new(HeadlessPlatform::new()), AppConfig::new().with_target_fps(0));
        assert!(matches!(err, Err(Error::Setup(_))));
        assert!(!Application::is_initialized());
        assert!(Application::run().is_err());

        fresh(AppConfig::default());
        assert!(matches!(
            Application::initialize(Box::new(HeadlessPlatform::new()), AppConfig::default()),
            Err(Error::Lifecycle(_))
        ));
        Application::shutdown().unwrap();
    }

    #[test]
    fn test_target_fps_clamped() {
        fresh(AppConfig::default());
        Application::with_instance(|app| {
            assert_eq!(app.frame_interval(), Duration::from_secs(1) / 60);
            app.set_target_fps(0);
            assert_eq!(app.target_fps(), 1);
            app.set_target_fps(5000);
            assert_eq!(app.target_fps(), MAX_FPS);
        })
        .unwrap();
        Application::shutdown().unwrap();
    }

    #[test]
    fn test_frame_paints_and_measures() {
        fresh(AppConfig::default());
        Application::with_instance(|app| {
            let id = app
                .create_window(WindowConfig::new("a").with_size(8, 8).with_background(Color::BLUE))
                .unwrap();
            app.window_mut(id).unwrap().show();
            assert_eq!(app.run_frame(Duration::ZERO), 1);
            // Nothing changed, nothing to present.
            assert_eq!(app.run_frame(Duration::from_millis(10)), 0);
            for i in 2..=101 {
                app.run_frame(Duration::from_millis(i * 10));
            }
            assert!(app.actual_fps() > 90.0 && app.actual_fps() < 110.0);
        })
        .unwrap();
        Application::shutdown().unwrap();
    }

    #[test]
    fn test_reentry_is_rejected() {
        fresh(AppConfig::default());
        let nested = Application::with_instance(|_| Application::with_instance(|_| ())).unwrap();
        assert!(matches!(nested, Err(Error::Lifecycle(_))));
        Application::shutdown().unwrap();
    }

    #[test]
    fn test_exit_from_hotkey_stops_run() {
        let _ = Application::shutdown();
        let platform = HeadlessPlatform::new();
        let handles = platform.handles();
        Application::initialize(Box::new(platform), AppConfig::new().with_target_fps(1000)).unwrap();
        Application::with_instance(|app| {
            let id = app.create_window(WindowConfig::new("main").with_size(16, 16)).unwrap();
            let window = app.window_mut(id).unwrap();
            window.show();
            window
                .hotkeys()
                .register(KeyCombo::key(KeyCode::Escape), "quit", Application::exit);
        })
        .unwrap();
        handles
            .get(0)
            .unwrap()
            .inject(Event::key_down(KeyCode::Escape, Modifiers::empty()));

        Application::run().unwrap();
        Application::with_instance(|app| {
            assert!(app.has_exited());
            assert!(!app.is_running());
            assert!(app.create_window(WindowConfig::new("late").with_size(4, 4)).is_err());
        })
        .unwrap();
        assert!(handles.get(0).unwrap().frames() >= 1);
        Application::shutdown().unwrap();
        assert!(handles.get(0).unwrap().is_closed());
    }

    #[test]
    fn test_last_window_closing_ends_loop() {
        let _ = Application::shutdown();
        let platform = HeadlessPlatform::new();
        let handles = platform.handles();
        Application::initialize(Box::new(platform), AppConfig::default()).unwrap();
        Application::with_instance(|app| {
            app.create_window(WindowConfig::new("only").with_size(4, 4)).unwrap();
        })
        .unwrap();
        handles.get(0).unwrap().inject(Event::window_close());
        Application::run().unwrap();
        Application::with_instance(|app| assert!(app.windows().is_empty())).unwrap();
        Application::shutdown().unwrap();
    }

    #[test]
    fn test_repeats_reach_active_window() {
        fresh(AppConfig::default());
        Application::with_instance(|app| {
            let id = app.create_window(WindowConfig::new("r").with_size(8, 8)).unwrap();
            app.window_mut(id).unwrap().show();
            let hits = std::rc::Rc::new(Cell::new(0));
            let seen = std::rc::Rc::clone(&hits);
            app.keyboard_mut().add_global_handler(move |ev| {
                if ev.kind == crate::input::EventKind::KeyRepeat {
                    seen.set(seen.get() + 1);
                }
                false
            });
            let down = Event::key_down(KeyCode::Left, Modifiers::empty());
            app.window_mut(id)
                .unwrap()
                .handle_event(&Event::focus_gained(), &mut KeyboardState::default(), Duration::ZERO);
            app.keyboard_mut().process_event(&down, Duration::ZERO);
            app.run_frame(Duration::from_millis(600));
            assert_eq!(hits.get(), 1);
        })
        .unwrap();
        Application::shutdown().unwrap();
    }
}
