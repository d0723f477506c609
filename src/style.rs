//! Font, text and paint styling values.
//!
//! Styling is per-element struct values; there is no style language. All
//! types here are cheap to clone and compare.
//!
//! # Examples
//!
//! ```
//! use paneforge::style::{FontStyle, FontWeight, TextAlign, TextStyle};
//! use paneforge::Color;
//!
//! let heading = TextStyle::builder()
//!     .font(FontStyle::new("Sans", 18.0).with_weight(FontWeight::Bold))
//!     .color(Color::WHITE)
//!     .align(TextAlign::Center)
//!     .build();
//! assert_eq!(heading.font.size, 18.0);
//! ```

use crate::color::Color;
use crate::geometry::PointF;

/// Font weight from thin to black (CSS numeric scale).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontWeight {
    Thin,
    ExtraLight,
    Light,
    #[default]
    Normal,
    Medium,
    SemiBold,
    Bold,
    ExtraBold,
    Black,
}

impl FontWeight {
    /// CSS numeric weight (100..=900).
    #[must_use]
    pub const fn css_value(self) -> u16 {
        match self {
            Self::Thin => 100,
            Self::ExtraLight => 200,
            Self::Light => 300,
            Self::Normal => 400,
            Self::Medium => 500,
            Self::SemiBold => 600,
            Self::Bold => 700,
            Self::ExtraBold => 800,
            Self::Black => 900,
        }
    }
}

/// Font slant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontSlant {
    #[default]
    Normal,
    Italic,
    Oblique,
}

/// Font face description.
#[derive(Clone, Debug, PartialEq)]
pub struct FontStyle {
    pub family: String,
    /// Size in pixels.
    pub size: f64,
    pub weight: FontWeight,
    pub slant: FontSlant,
}

impl FontStyle {
    /// Default family used when none is specified or the requested family is
    /// unavailable.
    pub const DEFAULT_FAMILY: &'static str = "Sans";

    /// Create a font style with normal weight and slant.
    #[must_use]
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
            weight: FontWeight::Normal,
            slant: FontSlant::Normal,
        }
    }

    /// Return a copy with a different weight.
    #[must_use]
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Return a copy with a different slant.
    #[must_use]
    pub fn with_slant(mut self, slant: FontSlant) -> Self {
        self.slant = slant;
        self
    }

    /// Return a copy with a different size.
    #[must_use]
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// CSS `font` shorthand, used by the canvas backend.
    #[must_use]
    pub fn to_css(&self) -> String {
        let slant = match self.slant {
            FontSlant::Normal => "",
            FontSlant::Italic => "italic ",
            FontSlant::Oblique => "oblique ",
        };
        format!(
            "{slant}{} {}px {}",
            self.weight.css_value(),
            self.size,
            self.family
        )
    }
}

impl Default for FontStyle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FAMILY, 13.0)
    }
}

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Vertical text alignment inside a layout rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Text wrapping mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// No wrapping; lines may overflow.
    #[default]
    None,
    /// Wrap at word boundaries, falling back to characters for long words.
    Word,
    /// Wrap at any character.
    Char,
}

/// Complete text style.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub font: FontStyle,
    pub color: Color,
    pub align: TextAlign,
    pub vertical_align: VerticalAlign,
    pub wrap: WrapMode,
    /// Multiplier applied to the font's natural line height.
    pub line_spacing: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: FontStyle::default(),
            color: Color::BLACK,
            align: TextAlign::Left,
            vertical_align: VerticalAlign::Top,
            wrap: WrapMode::None,
            line_spacing: 1.0,
        }
    }
}

impl TextStyle {
    /// Create a new text style builder.
    #[must_use]
    pub fn builder() -> TextStyleBuilder {
        TextStyleBuilder::default()
    }
}

/// Builder for creating text styles fluently.
#[derive(Clone, Debug, Default)]
pub struct TextStyleBuilder {
    style: TextStyle,
}

impl TextStyleBuilder {
    /// Set the font.
    #[must_use]
    pub fn font(mut self, font: FontStyle) -> Self {
        self.style.font = font;
        self
    }

    /// Set the text color.
    #[must_use]
    pub fn color(mut self, color: Color) -> Self {
        self.style.color = color;
        self
    }

    /// Set horizontal alignment.
    #[must_use]
    pub fn align(mut self, align: TextAlign) -> Self {
        self.style.align = align;
        self
    }

    /// Set vertical alignment.
    #[must_use]
    pub fn vertical_align(mut self, align: VerticalAlign) -> Self {
        self.style.vertical_align = align;
        self
    }

    /// Set the wrap mode.
    #[must_use]
    pub fn wrap(mut self, wrap: WrapMode) -> Self {
        self.style.wrap = wrap;
        self
    }

    /// Set the line spacing multiplier.
    #[must_use]
    pub fn line_spacing(mut self, spacing: f64) -> Self {
        self.style.line_spacing = spacing;
        self
    }

    /// Build the style.
    #[must_use]
    pub fn build(self) -> TextStyle {
        self.style
    }
}

/// A color stop of a gradient, `offset` in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

/// Fill or stroke source.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Color),
    LinearGradient {
        start: PointF,
        end: PointF,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    /// Build a two-stop linear gradient.
    #[must_use]
    pub fn linear(start: PointF, end: PointF, from: Color, to: Color) -> Self {
        Self::LinearGradient {
            start,
            end,
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: from,
                },
                GradientStop {
                    offset: 1.0,
                    color: to,
                },
            ],
        }
    }

    /// Color of the paint at parameter `t` along the gradient axis.
    ///
    /// Solid paints ignore `t`.
    #[must_use]
    pub fn color_at(&self, t: f32) -> Color {
        match self {
            Self::Solid(c) => *c,
            Self::LinearGradient { stops, .. } => {
                let Some(first) = stops.first() else {
                    return Color::TRANSPARENT;
                };
                if t <= first.offset {
                    return first.color;
                }
                for pair in stops.windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    if t <= b.offset {
                        let span = (b.offset - a.offset).max(f32::EPSILON);
                        return a.color.lerp(b.color, (t - a.offset) / span);
                    }
                }
                stops.last().map_or(first.color, |s| s.color)
            }
        }
    }

    /// Representative solid color (first stop for gradients).
    #[must_use]
    pub fn base_color(&self) -> Color {
        self.color_at(0.0)
    }
}

impl Default for Paint {
    fn default() -> Self {
        Self::Solid(Color::BLACK)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Self::Solid(color)
    }
}

/// Drop shadow applied to fills and strokes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub offset: PointF,
    pub blur: f64,
    pub color: Color,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_css() {
        let font = FontStyle::new("Mono", 12.0)
            .with_weight(FontWeight::Bold)
            .with_slant(FontSlant::Italic);
        assert_eq!(font.to_css(), "italic 700 12px Mono");
        assert_eq!(FontStyle::default().family, "Sans");
    }

    #[test]
    fn test_weight_order() {
        assert!(FontWeight::Thin < FontWeight::Black);
        assert_eq!(FontWeight::default().css_value(), 400);
    }

    #[test]
    fn test_gradient_color_at() {
        let paint = Paint::linear(
            PointF::new(0.0, 0.0),
            PointF::new(10.0, 0.0),
            Color::BLACK,
            Color::WHITE,
        );
        assert_eq!(paint.color_at(0.0), Color::BLACK);
        assert_eq!(paint.color_at(1.0), Color::WHITE);
        assert_eq!(paint.color_at(0.5).r, 128);
        assert_eq!(paint.color_at(2.0), Color::WHITE);
    }

    #[test]
    fn test_solid_paint() {
        let paint: Paint = Color::RED.into();
        assert_eq!(paint.color_at(0.7), Color::RED);
        assert_eq!(paint.base_color(), Color::RED);
    }

    #[test]
    fn test_text_style_builder() {
        let style = TextStyle::builder()
            .wrap(WrapMode::Word)
            .vertical_align(VerticalAlign::Middle)
            .line_spacing(1.5)
            .build();
        assert_eq!(style.wrap, WrapMode::Word);
        assert_eq!(style.vertical_align, VerticalAlign::Middle);
        assert!((style.line_spacing - 1.5).abs() < f64::EPSILON);
        assert_eq!(style.align, TextAlign::Left);
    }
}
