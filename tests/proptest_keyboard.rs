//! Property-based tests for the keyboard engine and hotkey table.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use paneforge::input::{Event, KeyCode, KeyCombo, Modifiers};
use paneforge::keyboard::{HotkeyTable, KeyboardState};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn key_strategy() -> impl Strategy<Value = KeyCode> {
    prop::sample::select(vec![
        KeyCode::A,
        KeyCode::B,
        KeyCode::S,
        KeyCode::Space,
        KeyCode::Enter,
        KeyCode::Left,
        KeyCode::F5,
        KeyCode::LeftShift,
    ])
}

/// A frame is a list of (key, pressed) transitions.
fn frames_strategy() -> impl Strategy<Value = Vec<Vec<(KeyCode, bool)>>> {
    prop::collection::vec(
        prop::collection::vec((key_strategy(), any::<bool>()), 0..6),
        1..12,
    )
}

fn modifiers_strategy() -> impl Strategy<Value = Modifiers> {
    (0u8..16).prop_map(Modifiers::from_bits_truncate)
}

// ============================================================================
// Frame edges
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn just_pressed_matches_frame_model(frames in frames_strategy()) {
        let mut kb = KeyboardState::default();
        let mut model: HashSet<KeyCode> = HashSet::new();
        for (i, frame) in frames.iter().enumerate() {
            let previous = model.clone();
            kb.begin_frame();
            let now = Duration::from_millis(i as u64 * 16);
            for &(key, down) in frame {
                let event = if down {
                    model.insert(key);
                    Event::key_down(key, Modifiers::empty())
                } else {
                    model.remove(&key);
                    Event::key_up(key, Modifiers::empty())
                };
                kb.process_event(&event, now);
            }
            for key in KeyCode::ALL {
                let held = model.contains(key);
                let was = previous.contains(key);
                prop_assert_eq!(kb.is_key_pressed(*key), held);
                prop_assert_eq!(kb.was_key_pressed(*key), was);
                prop_assert_eq!(kb.is_just_pressed(*key), held && !was);
                prop_assert_eq!(kb.is_just_released(*key), !held && was);
            }
        }
    }

    #[test]
    fn repeats_are_at_most_one_per_key_per_update(
        hold_ms in 0u64..3000,
        steps in 1usize..10,
    ) {
        let mut kb = KeyboardState::default();
        kb.process_event(&Event::key_down(KeyCode::A, Modifiers::empty()), Duration::ZERO);
        kb.process_event(&Event::key_down(KeyCode::LeftShift, Modifiers::SHIFT), Duration::ZERO);
        for step in 1..=steps {
            let now = Duration::from_millis(hold_ms * step as u64);
            let repeats = kb.update(now);
            prop_assert!(repeats.len() <= 1);
            prop_assert!(repeats.iter().all(|e| e.key == KeyCode::A));
        }
    }
}

// ============================================================================
// Hotkey table
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn registered_hotkey_fires_until_unregistered(
        key in key_strategy().prop_filter("not a modifier", |k| !k.is_modifier()),
        mods in modifiers_strategy(),
    ) {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let mut table = HotkeyTable::new();
        let id = table.register(KeyCombo::new(key, mods), "probe", move || seen.set(seen.get() + 1));
        prop_assert!(table.contains(id));

        let mut kb = KeyboardState::default();
        let press = Event::key_down(key, mods);
        let release = Event::key_up(key, mods);
        let mut t = 0;
        let mut cycle = |kb: &mut KeyboardState, table: &mut HotkeyTable| {
            t += 16;
            let now = Duration::from_millis(t);
            kb.begin_frame();
            kb.process_event(&press, now);
            let fired = kb.dispatch_hotkeys(table, &press, now);
            kb.process_event(&release, now);
            fired
        };
        prop_assert!(cycle(&mut kb, &mut table));
        prop_assert_eq!(count.get(), 1);

        prop_assert!(table.unregister(id));
        prop_assert!(!table.unregister(id));
        prop_assert!(table.is_empty());
        prop_assert!(!cycle(&mut kb, &mut table));
        prop_assert_eq!(count.get(), 1);
    }

    #[test]
    fn combo_names_parse_back(key in key_strategy(), mods in modifiers_strategy()) {
        let combo = KeyCombo::new(key, mods);
        let parsed: KeyCombo = combo.to_string().parse().unwrap();
        prop_assert_eq!(parsed, combo);
    }
}
