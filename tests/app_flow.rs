//! Application-level flows over the headless and web platforms.

mod common;

use std::rc::Rc;
use std::time::Duration;

use paneforge::element::downcast;
use paneforge::input::{Event, KeyCode, Modifiers, MouseButton};
use paneforge::platform::headless::HeadlessPlatform;
use paneforge::platform::web::{self, WebPlatform};
use paneforge::render::RecordingSink;
use paneforge::text_input::{InputType, TextInput};
use paneforge::{AppConfig, Application, Element, Point, Rect, WindowConfig};

#[test]
fn headless_frames_drive_a_text_input() {
    common::init_logging();
    let _ = Application::shutdown();
    let platform = HeadlessPlatform::new();
    let handles = platform.handles();
    Application::initialize(Box::new(platform), AppConfig::default()).unwrap();

    let input = TextInput::new("email", InputType::Email)
        .with_bounds(Rect::new(10, 10, 150, 24))
        .into_ref();
    Application::with_instance(|app| {
        let id = app.create_window(WindowConfig::new("form").with_size(200, 60)).unwrap();
        let window = app.window_mut(id).unwrap();
        window.add_element(Rc::clone(&input));
        window.show();
    })
    .unwrap();

    let native = handles.get(0).unwrap();
    native.inject(Event::mouse_down(Point::new(20, 20), MouseButton::Left));
    native.inject(Event::mouse_up(Point::new(20, 20), MouseButton::Left));
    native.inject_all("me@example.com".chars().map(|c| Event::text_input(c.to_string())));

    Application::with_instance(|app| app.run_frame(Duration::from_millis(16))).unwrap();
    {
        let input = downcast::<TextInput>(&input).unwrap();
        assert!(input.base().is_focused());
        assert_eq!(input.text(), "me@example.com");
        assert!(input.validation().is_valid());
    }
    assert!(native.frames() >= 1);

    // Ctrl+Backspace drops the last word; clicking the background clears focus.
    native.inject(Event::key_down(KeyCode::Backspace, Modifiers::CTRL));
    native.inject(Event::key_up(KeyCode::Backspace, Modifiers::CTRL));
    native.inject(Event::mouse_down(Point::new(190, 50), MouseButton::Left));
    Application::with_instance(|app| app.run_frame(Duration::from_millis(32))).unwrap();
    {
        let input = downcast::<TextInput>(&input).unwrap();
        assert!(!input.base().is_focused());
        assert_ne!(input.text(), "me@example.com");
    }

    Application::shutdown().unwrap();
    assert!(native.is_closed());
}

#[test]
fn web_host_ticks_paint_into_the_canvas() {
    common::init_logging();
    let _ = Application::shutdown();
    let sink = RecordingSink::new();
    Application::initialize(Box::new(WebPlatform::with_recording(sink.clone())), AppConfig::default()).unwrap();
    Application::run().unwrap();

    let input = TextInput::new("name", InputType::Text)
        .with_bounds(Rect::new(0, 0, 120, 24))
        .into_ref();
    Application::with_instance(|app| {
        let id = app
            .create_window(
                WindowConfig::new("web")
                    .with_size(160, 40)
                    .with_platform_data("flow-canvas"),
            )
            .unwrap();
        let window = app.window_mut(id).unwrap();
        window.add_element(Rc::clone(&input));
        window.set_focus(Some(&input));
        window.show();
    })
    .unwrap();

    let mods = web::modifiers_from_dom(false, false, false, false);
    assert!(web::dispatch_to_canvas(
        "flow-canvas",
        web::key_events_from_dom(true, "a", "KeyA", 65, mods, false),
    ));
    assert!(!web::dispatch_to_canvas("missing", Vec::new()));

    assert!(Application::tick(Duration::from_millis(16)).unwrap());
    assert_eq!(downcast::<TextInput>(&input).unwrap().text(), "a");
    assert!(sink.canvas_ids().iter().all(|id| id == "flow-canvas"));
    assert!(
        sink.transcript()
            .lines()
            .any(|line| line.starts_with("fillText") && line.ends_with(" a"))
    );

    Application::exit();
    assert!(!Application::tick(Duration::from_millis(32)).unwrap());
    Application::shutdown().unwrap();
    assert!(!web::dispatch_to_canvas("flow-canvas", Vec::new()));
}
