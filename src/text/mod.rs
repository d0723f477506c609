//! Text measurement, layout and word navigation.
//!
//! - [`FontMetrics`]: the measurement model shared by every backend and the
//!   text input, so layout and painting agree on extents
//! - [`layout_in_rect`]: wrapping and alignment used by `draw_text_in_rect`
//! - [`next_word_boundary`] / [`prev_word_boundary`]: word motion
//!
//! # Examples
//!
//! ```
//! use paneforge::style::FontStyle;
//! use paneforge::text::FontMetrics;
//!
//! let metrics = FontMetrics::for_font(&FontStyle::new("Mono", 10.0));
//! assert_eq!(metrics.text_width("abc"), 18.0);
//! assert_eq!(metrics.index_at_x("abc", 13.0), 2);
//! ```

mod layout;
mod metrics;
mod words;

pub use layout::{LineSpan, TextRun, break_lines, layout_in_rect};
pub use metrics::{FontMetrics, TAB_WIDTH, TextMetrics};
pub use words::{next_word_boundary, prev_word_boundary, word_range_at};
