//! Font metrics shared by every backend.
//!
//! Layout and drawing must agree on text extents, so both render backends
//! and the text input measure through [`FontMetrics`] rather than asking the
//! platform. The model is fixed-advance: each code point advances by a
//! fraction of the font size scaled by its Unicode display width (0 for
//! combining marks and controls, 2 for wide CJK and emoji).

use crate::style::{FontStyle, FontWeight};
use unicode_width::UnicodeWidthChar;

/// Advance of a narrow glyph relative to the font size.
const ADVANCE_RATIO: f64 = 0.6;
/// Extra advance applied to bold and heavier weights.
const BOLD_ADVANCE_RATIO: f64 = 0.05;
const ASCENT_RATIO: f64 = 0.8;
const DESCENT_RATIO: f64 = 0.2;
const LINE_HEIGHT_RATIO: f64 = 1.2;
/// Tab stops are this many narrow advances wide.
pub const TAB_WIDTH: usize = 4;

/// Measured extents of a string.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// Width of the widest line.
    pub width: f64,
    /// Total height of all lines.
    pub height: f64,
    pub ascent: f64,
    pub descent: f64,
    pub line_height: f64,
    pub line_count: usize,
}

/// Per-font measurement model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMetrics {
    size: f64,
    advance: f64,
    line_spacing: f64,
}

impl FontMetrics {
    /// Metrics for a font face.
    ///
    /// An empty family or a non-positive size is reported through the
    /// diagnostic sink and substituted with the default font.
    #[must_use]
    pub fn for_font(font: &FontStyle) -> Self {
        let mut size = font.size;
        if font.family.trim().is_empty() {
            crate::log::warn(&format!(
                "font family missing, substituting {}",
                FontStyle::DEFAULT_FAMILY
            ));
        }
        if !(size.is_finite() && size > 0.0) {
            crate::log::warn(&format!("invalid font size {size}, substituting default"));
            size = FontStyle::default().size;
        }
        let ratio = if font.weight >= FontWeight::SemiBold {
            ADVANCE_RATIO + BOLD_ADVANCE_RATIO
        } else {
            ADVANCE_RATIO
        };
        Self {
            size,
            advance: size * ratio,
            line_spacing: 1.0,
        }
    }

    /// Return a copy with a line spacing multiplier.
    #[must_use]
    pub fn with_line_spacing(mut self, spacing: f64) -> Self {
        self.line_spacing = if spacing > 0.0 { spacing } else { 1.0 };
        self
    }

    /// Font size in pixels.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Advance of a narrow glyph.
    #[must_use]
    pub fn narrow_advance(&self) -> f64 {
        self.advance
    }

    /// Distance from the baseline to the top of the line box.
    #[must_use]
    pub fn ascent(&self) -> f64 {
        self.size * ASCENT_RATIO
    }

    /// Distance from the baseline to the bottom of the line box.
    #[must_use]
    pub fn descent(&self) -> f64 {
        self.size * DESCENT_RATIO
    }

    /// Height of one line including spacing.
    #[must_use]
    pub fn line_height(&self) -> f64 {
        self.size * LINE_HEIGHT_RATIO * self.line_spacing
    }

    /// Horizontal advance of a single code point.
    #[must_use]
    pub fn char_advance(&self, ch: char) -> f64 {
        if ch == '\t' {
            return self.advance * TAB_WIDTH as f64;
        }
        if ch.is_ascii() && (' '..='~').contains(&ch) {
            return self.advance;
        }
        let cols = UnicodeWidthChar::width(ch).unwrap_or(0);
        self.advance * cols as f64
    }

    /// Width of a single line (newlines are ignored).
    #[must_use]
    pub fn text_width(&self, text: &str) -> f64 {
        text.chars()
            .filter(|&c| c != '\n' && c != '\r')
            .map(|c| self.char_advance(c))
            .sum()
    }

    /// Width of the first `chars` code points of `line`.
    #[must_use]
    pub fn prefix_width(&self, line: &str, chars: usize) -> f64 {
        line.chars().take(chars).map(|c| self.char_advance(c)).sum()
    }

    /// Cumulative widths: element `i` is the width of the first `i` code points.
    #[must_use]
    pub fn prefix_widths(&self, line: &str) -> Vec<f64> {
        let mut widths = Vec::with_capacity(line.len() + 1);
        let mut acc = 0.0;
        widths.push(acc);
        for ch in line.chars() {
            acc += self.char_advance(ch);
            widths.push(acc);
        }
        widths
    }

    /// Largest prefix length whose width is ≤ `x`.
    ///
    /// Binary search over the cumulative widths; negative `x` yields 0.
    #[must_use]
    pub fn index_at_x(&self, line: &str, x: f64) -> usize {
        let widths = self.prefix_widths(line);
        if x <= 0.0 {
            return 0;
        }
        // partition_point returns the first index whose width exceeds x.
        let first_over = widths.partition_point(|&w| w <= x);
        first_over.saturating_sub(1)
    }

    /// Measure possibly multi-line text.
    #[must_use]
    pub fn measure(&self, text: &str) -> TextMetrics {
        let mut width: f64 = 0.0;
        let mut line_count = 0;
        for line in text.split('\n') {
            width = width.max(self.text_width(line));
            line_count += 1;
        }
        TextMetrics {
            width,
            height: self.line_height() * line_count as f64,
            ascent: self.ascent(),
            descent: self.descent(),
            line_height: self.line_height(),
            line_count,
        }
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::for_font(&FontStyle::default())
    }
}
