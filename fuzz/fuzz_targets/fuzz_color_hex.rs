//! Fuzz target for color hex parsing.
//!
//! `Color::from_hex` must return `None` for invalid input, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use paneforge::Color;

fuzz_target!(|data: &str| {
    let parsed = Color::from_hex(data);

    if !data.starts_with('#') {
        let _ = Color::from_hex(&format!("#{data}"));
    }

    // Successful parses survive a round trip through the display form.
    if let Some(color) = parsed {
        assert_eq!(Color::from_hex(&color.to_string()), Some(color));
    }

    for (i, _) in data.char_indices().take(10) {
        let _ = Color::from_hex(&data[i..]);
        let _ = Color::from_hex(&data[..i]);
    }
});
