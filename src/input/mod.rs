//! Input value types.
//!
//! Platforms normalise native input into [`Event`] values; the router and
//! the keyboard engine consume them. Key identity is the virtual
//! [`KeyCode`], with the native code preserved on the event.

mod event;
mod keyboard;

pub use event::{Event, EventKind, MouseButton};
pub use keyboard::{KeyCode, KeyCombo, Modifiers};
