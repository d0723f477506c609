//! Input path benchmarks: DOM normalisation, keyboard engine and text input editing.

#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use paneforge::input::{Event, KeyCode, KeyCombo, Modifiers};
use paneforge::keyboard::{HotkeyTable, KeyboardState};
use paneforge::platform::web::{key_events_from_dom, mouse_event_from_dom};
use paneforge::text_input::{InputType, TextInput};
use paneforge::Element;
use std::hint::black_box;
use std::time::Duration;

/// Benchmark DOM key and mouse event normalisation.
fn bench_dom_normalisation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dom_normalise");

    let keys: &[(&str, &str, &str)] = &[
        ("a", "KeyA", "letter"),
        ("ArrowLeft", "ArrowLeft", "arrow"),
        ("Enter", "Enter", "enter"),
        ("é", "", "unmapped_text"),
        ("F5", "F5", "function"),
    ];
    for (key, code, name) in keys {
        group.bench_function(*name, |b| {
            b.iter(|| key_events_from_dom(true, black_box(key), black_box(code), 65, Modifiers::empty(), false));
        });
    }
    group.bench_function("mousemove", |b| {
        b.iter(|| mouse_event_from_dom(black_box("mousemove"), 10, 20, 0, Modifiers::empty()));
    });

    group.finish();
}

/// Benchmark a frame of keyboard traffic through the engine and hotkey table.
fn bench_keyboard_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyboard");

    group.bench_function("press_release_cycle", |b| {
        let mut kb = KeyboardState::default();
        let mut table = HotkeyTable::new();
        for key in [KeyCode::S, KeyCode::O, KeyCode::N, KeyCode::Q] {
            table.register(KeyCombo::new(key, Modifiers::CTRL), "bench", || {});
        }
        let down = Event::key_down(KeyCode::S, Modifiers::CTRL);
        let up = Event::key_up(KeyCode::S, Modifiers::CTRL);
        let mut t = 0u64;
        b.iter(|| {
            t += 16;
            let now = Duration::from_millis(t);
            kb.begin_frame();
            kb.process_event(&down, now);
            let fired = kb.dispatch_hotkeys(&mut table, &down, now);
            kb.process_event(&up, now);
            black_box(fired)
        });
    });

    group.bench_function("update_with_held_keys", |b| {
        let mut kb = KeyboardState::default();
        for key in [KeyCode::A, KeyCode::B, KeyCode::Left, KeyCode::Space] {
            kb.process_event(&Event::key_down(key, Modifiers::empty()), Duration::ZERO);
        }
        let mut t = 500u64;
        b.iter(|| {
            t += 33;
            black_box(kb.update(Duration::from_millis(t)))
        });
    });

    group.finish();
}

/// Benchmark text input editing at various text lengths.
fn bench_text_input(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_input");

    for len in [16usize, 256, 4096] {
        let text = "lorem ipsum ".repeat(len / 12 + 1);
        group.bench_with_input(BenchmarkId::new("type_and_undo", len), &text, |b, text| {
            let mut input = TextInput::new("bench", InputType::Multiline).with_text(text);
            let typed = Event::text_input("x");
            b.iter(|| {
                input.on_event(&typed);
                black_box(input.undo())
            });
        });
        group.bench_with_input(BenchmarkId::new("word_navigation", len), &text, |b, text| {
            let mut input = TextInput::new("bench", InputType::Text).with_text(text);
            let left = Event::key_down(KeyCode::Left, Modifiers::CTRL);
            let end = Event::key_down(KeyCode::End, Modifiers::empty());
            b.iter(|| {
                input.on_event(&left);
                input.on_event(&left);
                input.on_event(&end);
                black_box(input.caret())
            });
        });
    }

    group.bench_function("phone_format_typing", |b| {
        b.iter(|| {
            let mut input = TextInput::new("phone", InputType::Phone);
            for ch in "5551234567".chars() {
                input.insert_text(black_box(&ch.to_string()));
            }
            black_box(input.display_text().len())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_dom_normalisation, bench_keyboard_engine, bench_text_input);
criterion_main!(benches);
