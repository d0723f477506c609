//! Fuzz target for key names, hotkey strings and DOM key normalisation.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use paneforge::input::{EventKind, KeyCode, KeyCombo, Modifiers};
use paneforge::platform::web::{key_events_from_dom, mouse_event_from_dom};

#[derive(Arbitrary, Debug)]
struct DomKey<'a> {
    down: bool,
    repeat: bool,
    key: &'a str,
    code: &'a str,
    key_code: u32,
    modifiers: u8,
    mouse_type: &'a str,
    button: i16,
}

fuzz_target!(|input: DomKey<'_>| {
    // Hotkey strings either parse to a combo that prints back, or error.
    if let Ok(combo) = KeyCombo::parse(input.key) {
        let again = KeyCombo::parse(&combo.to_string()).expect("printed combo parses");
        assert_eq!(again, combo);
    }
    let _ = KeyCode::from_name(input.code);

    let mods = Modifiers::from_bits_truncate(input.modifiers);
    let events = key_events_from_dom(input.down, input.key, input.code, input.key_code, mods, input.repeat);
    assert!(events.len() <= 2);
    for event in &events {
        match event.kind {
            EventKind::KeyDown => assert!(input.down && !input.repeat),
            EventKind::KeyUp => assert!(!input.down),
            EventKind::TextInput => assert_eq!(event.text.chars().count(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    if let Some(event) = mouse_event_from_dom(input.mouse_type, 0, 0, input.button, mods) {
        assert!(event.kind.is_pointer() || event.kind == EventKind::MouseLeave);
    }
});
