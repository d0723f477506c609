//! Fuzz target for text input editing.
//!
//! Replays arbitrary edit scripts and checks that the caret and selection
//! stay in range and the display text tracks the formatter.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use paneforge::Element;
use paneforge::input::{Event, KeyCode, Modifiers};
use paneforge::text_input::{InputType, TextInput};

#[derive(Arbitrary, Debug)]
enum Op {
    Type(String),
    Key { index: u8, modifiers: u8 },
    Select { anchor: u16, caret: u16 },
    Undo,
    Redo,
    ReadOnly(bool),
}

const KINDS: [InputType; 8] = [
    InputType::Text,
    InputType::Password,
    InputType::Phone,
    InputType::Currency,
    InputType::Decimal,
    InputType::DateTime,
    InputType::Email,
    InputType::Multiline,
];

#[derive(Arbitrary, Debug)]
struct Script {
    kind: u8,
    ops: Vec<Op>,
}

fuzz_target!(|script: Script| {
    let kind = KINDS[usize::from(script.kind) % KINDS.len()];
    let mut input = TextInput::new("fuzz", kind);
    for op in script.ops.iter().take(256) {
        match op {
            Op::Type(text) => {
                input.on_event(&Event::text_input(text.clone()));
            }
            Op::Key { index, modifiers } => {
                let key = KeyCode::ALL[usize::from(*index) % KeyCode::ALL.len()];
                let mods = Modifiers::from_bits_truncate(*modifiers);
                input.on_event(&Event::key_down(key, mods));
            }
            Op::Select { anchor, caret } => {
                let len = input.len();
                input.select(usize::from(*anchor).min(len), usize::from(*caret).min(len));
            }
            Op::Undo => {
                input.undo();
            }
            Op::Redo => {
                input.redo();
            }
            Op::ReadOnly(on) => input.set_read_only(*on),
        }
        let len = input.len();
        let (start, end) = input.selection();
        assert!(input.caret() <= len && start <= end && end <= len);
        assert_eq!(input.display_text(), input.formatter().format(&input.text()));
    }
});
