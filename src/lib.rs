//! `paneforge` - core runtime of a cross-platform GUI toolkit
//!
//! Element tree with container layout, focus and hit-test routing, a
//! frame-based keyboard engine with hotkeys, two render backends behind one
//! [`RenderContext`] trait (software raster and HTML canvas command stream),
//! and a formatted, validated text input.

// Crate-level lint configuration
#![warn(unsafe_code)] // Unsafe code needs justification (required for wasm exports)
#![allow(dead_code)] // Public API functions not yet used internally
#![allow(clippy::cast_possible_truncation)] // Intentional pixel coordinate casts
#![allow(clippy::cast_sign_loss)] // Intentional coordinate conversions
#![allow(clippy::cast_precision_loss)] // Intentional for color and layout math
#![allow(clippy::cast_possible_wrap)] // Intentional coordinate conversions
#![allow(clippy::module_name_repetitions)] // Allow input::InputType etc
#![allow(clippy::struct_excessive_bools)] // Widget state needs multiple flags
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::format_push_string)] // format! with push_str is fine
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::suboptimal_flops)] // Standard math notation is clearer than mul_add
#![allow(clippy::branches_sharing_code)] // Code clarity over DRY in branching
#![allow(clippy::inherent_to_string)] // to_string methods are convenient
#![allow(clippy::should_implement_trait)] // from_str naming is intentional
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference
#![allow(clippy::needless_collect)] // Collect for assertions is clear

pub mod app;
pub mod clipboard;
pub mod color;
pub mod element;
pub mod error;
pub mod geometry;
pub mod input;
pub mod keyboard;
pub mod log;
pub mod platform;
pub mod render;
pub mod router;
pub mod style;
pub mod text;
pub mod text_input;
pub mod window;

// Re-export core types at crate root
pub use color::Color;
pub use error::{Error, Result};
pub use geometry::{Insets, Point, PointF, Rect, RectF, Size};
pub use log::{LogLevel, emit_event, emit_log, set_event_callback, set_log_callback};
pub use style::{FontStyle, TextStyle};

// Re-export input types
pub use input::{Event, EventKind, KeyCode, KeyCombo, Modifiers, MouseButton};
pub use keyboard::{HotkeyTable, KeyRepeatConfig, KeyboardState};

// Re-export the element tree
pub use element::{Container, Element, ElementBase, ElementRef};
pub use text_input::{InputType, TextInput};

// Re-export runtime types
pub use app::{AppConfig, Application};
pub use platform::{Platform, PlatformWindow};
pub use render::{CanvasContext, RasterContext, RenderContext};
pub use router::Router;
pub use window::{Window, WindowConfig, WindowId};
