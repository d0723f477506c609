//! 8-bit RGBA color type with compositing helpers.
//!
//! [`Color`] is the single color value used by styles, paints, window
//! backgrounds and pixel surfaces. Channels are 8-bit; compositing math is
//! done in f32 and rounded back.
//!
//! # Examples
//!
//! ```
//! use paneforge::Color;
//!
//! let accent = Color::from_hex("#3c78d8").unwrap();
//! assert_eq!(Color::from_argb(accent.to_argb()), accent);
//!
//! let overlay = Color::BLACK.with_alpha(128);
//! let shaded = overlay.blend_over(Color::WHITE);
//! assert!(shaded.r < 200);
//! ```

use std::fmt;

/// RGBA color with 8-bit channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// Opaque mid gray.
    pub const GRAY: Self = Self::rgb(128, 128, 128);
    /// Light gray used for default borders.
    pub const LIGHT_GRAY: Self = Self::rgb(200, 200, 200);

    /// Create a color from all four channels.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color from a packed `0xAARRGGBB` value.
    #[must_use]
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Pack into a `0xAARRGGBB` value.
    #[must_use]
    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Create a color from f32 components in [0, 1].
    #[must_use]
    pub fn from_f32(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: unit_to_u8(r),
            g: unit_to_u8(g),
            b: unit_to_u8(b),
            a: unit_to_u8(a),
        }
    }

    /// Components as f32 in [0, 1].
    #[must_use]
    pub fn to_f32(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }

    /// Parse a hex color string (e.g., "#FF0000" or "FF0000").
    ///
    /// Supports 3-char (#RGB), 6-char (#RRGGBB), and 8-char (#RRGGBBAA) formats.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        let byte = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();

        match hex.len() {
            3 => {
                let r = byte(0..1)?;
                let g = byte(1..2)?;
                let b = byte(2..3)?;
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => Some(Self::rgb(byte(0..2)?, byte(2..4)?, byte(4..6)?)),
            8 => Some(Self::rgba(byte(0..2)?, byte(2..4)?, byte(4..6)?, byte(6..8)?)),
            _ => None,
        }
    }

    /// Return the color with a different alpha channel.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Multiply the alpha channel by `factor` (clamped to [0, 1]).
    #[must_use]
    pub fn scale_alpha(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        self.with_alpha((f32::from(self.a) * factor).round() as u8)
    }

    /// Check if this color is fully transparent.
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Check if this color is fully opaque.
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Blend this color over another (Porter-Duff "over").
    ///
    /// `self` is the foreground, `other` is the background.
    #[must_use]
    pub fn blend_over(self, other: Self) -> Self {
        if self.a == 255 {
            return self;
        }
        if self.a == 0 {
            return other;
        }

        let [sr, sg, sb, sa] = self.to_f32();
        let [dr, dg, db, da] = other.to_f32();
        let inv = 1.0 - sa;
        let out_a = da.mul_add(inv, sa);
        if out_a <= f32::EPSILON {
            return Self::TRANSPARENT;
        }
        let channel = |s: f32, d: f32| (d * da).mul_add(inv, s * sa) / out_a;
        Self::from_f32(
            channel(sr, dr),
            channel(sg, dg),
            channel(sb, db),
            out_a,
        )
    }

    /// Linearly interpolate between two colors.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| {
            (f32::from(b) - f32::from(a))
                .mul_add(t, f32::from(a))
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Perceived brightness (ITU-R BT.601), in [0, 1].
    #[must_use]
    pub fn luminance(self) -> f32 {
        let [r, g, b, _] = self.to_f32();
        0.299 * r + 0.587 * g + 0.114 * b
    }

    /// CSS color string (`rgba(r,g,b,a)`), used by the canvas backend.
    #[must_use]
    pub fn to_css(self) -> String {
        let alpha = f32::from(self.a) / 255.0;
        format!("rgba({},{},{},{alpha:.3})", self.r, self.g, self.b)
    }
}

fn unit_to_u8(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<u32> for Color {
    fn from(argb: u32) -> Self {
        Self::from_argb(argb)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.to_argb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#FF0000"), Some(Color::RED));
        assert_eq!(Color::from_hex("0f0"), Some(Color::GREEN));
        assert_eq!(
            Color::from_hex("#11223344"),
            Some(Color::rgba(0x11, 0x22, 0x33, 0x44))
        );
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
        assert_eq!(Color::from_hex("ééé"), None);
    }

    #[test]
    fn test_argb_layout() {
        let c = Color::rgba(0x11, 0x22, 0x33, 0x44);
        assert_eq!(c.to_argb(), 0x4411_2233);
        assert_eq!(Color::from_argb(0x4411_2233), c);
    }

    #[test]
    fn test_blend_over_extremes() {
        assert_eq!(Color::RED.blend_over(Color::BLUE), Color::RED);
        assert_eq!(Color::TRANSPARENT.blend_over(Color::BLUE), Color::BLUE);
    }

    #[test]
    fn test_blend_half_black_over_white() {
        let c = Color::BLACK.with_alpha(128).blend_over(Color::WHITE);
        assert_eq!(c.a, 255);
        assert!((i32::from(c.r) - 127).abs() <= 1);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 0.0), Color::BLACK);
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 1.0), Color::WHITE);
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 0.5).r, 128);
    }

    #[test]
    fn test_scale_alpha() {
        assert_eq!(Color::WHITE.scale_alpha(0.5).a, 128);
        assert_eq!(Color::WHITE.scale_alpha(2.0).a, 255);
        assert_eq!(Color::WHITE.scale_alpha(-1.0).a, 0);
    }

    #[test]
    fn test_display_and_css() {
        assert_eq!(Color::RED.to_string(), "#ff0000");
        assert_eq!(Color::RED.with_alpha(0).to_string(), "#ff000000");
        assert_eq!(Color::WHITE.to_css(), "rgba(255,255,255,1.000)");
    }

    proptest! {
        #[test]
        fn argb_roundtrip(argb in any::<u32>()) {
            prop_assert_eq!(Color::from_argb(argb).to_argb(), argb);
        }

        #[test]
        fn hex_roundtrip(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), a in any::<u8>()) {
            let c = Color::rgba(r, g, b, a);
            let text = format!("#{r:02x}{g:02x}{b:02x}{a:02x}");
            prop_assert_eq!(Color::from_hex(&text), Some(c));
        }

        #[test]
        fn blend_over_opaque_background_is_opaque(
            r in any::<u8>(), a in any::<u8>(), bg in any::<u8>()
        ) {
            let out = Color::rgba(r, 0, 0, a).blend_over(Color::rgb(bg, bg, bg));
            prop_assert_eq!(out.a, 255);
        }
    }
}
