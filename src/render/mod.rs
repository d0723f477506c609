//! Backend-agnostic 2D drawing.
//!
//! [`RenderContext`] is the surface every element paints through. It is
//! object safe; elements receive `&mut dyn RenderContext` for the duration of
//! one paint pass. Two backends implement it:
//!
//! - [`RasterContext`]: software rasterizer over a [`PixelSurface`], used by
//!   the host-native and headless platforms
//! - [`CanvasContext`]: marshals each call as a [`CanvasCommand`] to an HTML
//!   canvas 2D context identified by a canvas id
//!
//! # State
//!
//! `push_state`/`pop_state` save and restore the complete [`DrawState`]. An
//! unmatched pop is reported through the diagnostic sink and resets to the
//! base state. A clip change (including a pop that restores a different clip)
//! discards the current path on both backends.
//!
//! # Text
//!
//! All measurement uses [`FontMetrics`], so `measure_text` agrees with what
//! `draw_text` and `draw_text_in_rect` place. Text is painted with the color
//! of the current [`TextStyle`], not the fill paint.

pub mod canvas;
pub mod path;
pub mod raster;
pub mod state;
pub mod surface;

pub use canvas::{CanvasCommand, CanvasContext, CanvasSink, CanvasStyle, RecordingSink};
pub use path::PathBuilder;
pub use raster::RasterContext;
pub use state::{DrawState, StateStack};
pub use surface::{PixelImage, PixelSurface};

use crate::color::Color;
use crate::geometry::{PointF, Rect, RectF, Size};
use crate::style::{FontStyle, Paint, TextStyle};
use crate::text::{FontMetrics, TextMetrics, layout_in_rect};
use kurbo::{Affine, BezPath, Circle, Ellipse, Line, RoundedRect, Shape};

/// Handle to an image held by a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub(crate) u32);

impl ImageHandle {
    /// Backend-assigned id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// Color used for the placeholder drawn in place of a missing image.
pub const PLACEHOLDER_COLOR: Color = Color::LIGHT_GRAY;

/// Abstract 2D drawing surface.
pub trait RenderContext {
    /// Surface size in device pixels.
    fn size(&self) -> Size;

    /// Current drawable state.
    fn state(&self) -> &DrawState;

    /// Number of saved states.
    fn state_depth(&self) -> usize;

    fn push_state(&mut self);
    fn pop_state(&mut self);

    /// Replace the current transform.
    fn set_transform(&mut self, transform: Affine);

    /// Intersect the clip with a user-space rectangle.
    fn clip_rect(&mut self, rect: RectF);

    /// Reset the clip to the surface bounds.
    fn clear_clip_rect(&mut self);

    fn set_fill_paint(&mut self, paint: Paint);
    fn set_stroke_paint(&mut self, paint: Paint);
    fn set_stroke_width(&mut self, width: f64);
    fn set_text_style(&mut self, style: TextStyle);

    /// Global alpha in [0, 1] multiplied into subsequent paints.
    fn set_alpha(&mut self, alpha: f32);

    fn set_shadow(&mut self, offset: PointF, blur: f64, color: Color);
    fn clear_shadow(&mut self);

    fn begin_path(&mut self);
    fn move_to(&mut self, p: PointF);
    fn line_to(&mut self, p: PointF);
    fn quadratic_curve_to(&mut self, control: PointF, p: PointF);
    fn bezier_curve_to(&mut self, c1: PointF, c2: PointF, p: PointF);
    fn arc_to(&mut self, p1: PointF, p2: PointF, radius: f64);
    fn arc(&mut self, center: PointF, radius: f64, start_angle: f64, end_angle: f64, ccw: bool);
    fn close_path(&mut self);

    /// Append a user-space path to the current path.
    fn append_path(&mut self, path: &BezPath);

    fn fill_path(&mut self);
    fn stroke_path(&mut self);

    /// Draw a single line of text with its baseline at `pos`.
    fn draw_text(&mut self, text: &str, pos: PointF);

    /// Blit raw pixels. `src` defaults to the whole image.
    fn draw_pixels(&mut self, image: &PixelImage, src: Option<RectF>, dst: RectF);

    /// Hand an image to the backend for repeated drawing.
    fn load_image(&mut self, image: PixelImage) -> ImageHandle;

    /// Draw a loaded image; unknown handles draw a placeholder.
    fn draw_image(&mut self, handle: ImageHandle, src: Option<RectF>, dst: RectF);

    /// Fill the whole surface, ignoring transform and clip.
    fn clear(&mut self, color: Color);

    // ---- provided ----

    fn transform(&self) -> Affine {
        self.state().transform
    }

    /// Current clip in device space.
    fn clip_bounds(&self) -> Rect {
        self.state().clip
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        let t = self.transform() * Affine::translate((dx, dy));
        self.set_transform(t);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        let t = self.transform() * Affine::scale_non_uniform(sx, sy);
        self.set_transform(t);
    }

    fn rotate(&mut self, radians: f64) {
        let t = self.transform() * Affine::rotate(radians);
        self.set_transform(t);
    }

    fn reset_transform(&mut self) {
        self.set_transform(Affine::IDENTITY);
    }

    fn set_fill_color(&mut self, color: Color) {
        self.set_fill_paint(Paint::Solid(color));
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.set_stroke_paint(Paint::Solid(color));
    }

    /// Change only the font of the current text style.
    fn set_font_style(&mut self, font: FontStyle) {
        let mut style = self.state().text.clone();
        style.font = font;
        self.set_text_style(style);
    }

    /// Metrics of the current font.
    fn font_metrics(&self) -> FontMetrics {
        let text = &self.state().text;
        FontMetrics::for_font(&text.font).with_line_spacing(text.line_spacing)
    }

    fn measure_text(&self, text: &str) -> TextMetrics {
        self.font_metrics().measure(text)
    }

    fn text_width(&self, text: &str) -> f64 {
        self.font_metrics().text_width(text)
    }

    /// Width and line height of a single line.
    fn text_line_dimensions(&self, text: &str) -> (f64, f64) {
        let metrics = self.font_metrics();
        (metrics.text_width(text), metrics.line_height())
    }

    /// Lay out text inside `rect` using the current text style.
    fn draw_text_in_rect(&mut self, text: &str, rect: RectF) {
        let runs = layout_in_rect(text, &self.state().text, rect);
        for run in runs {
            self.draw_text(&run.text, PointF::new(run.x, run.baseline));
        }
    }

    /// Replace the current path with a shape.
    fn set_shape_path(&mut self, path: &BezPath) {
        self.begin_path();
        self.append_path(path);
    }

    fn fill_rectangle(&mut self, rect: RectF) {
        self.set_shape_path(&kurbo::Rect::from(rect).to_path(path::TOLERANCE));
        self.fill_path();
    }

    fn draw_rectangle(&mut self, rect: RectF) {
        self.set_shape_path(&kurbo::Rect::from(rect).to_path(path::TOLERANCE));
        self.stroke_path();
    }

    fn fill_rounded_rectangle(&mut self, rect: RectF, radius: f64) {
        let shape = RoundedRect::from_rect(rect.into(), radius.max(0.0));
        self.set_shape_path(&shape.to_path(path::TOLERANCE));
        self.fill_path();
    }

    fn draw_rounded_rectangle(&mut self, rect: RectF, radius: f64) {
        let shape = RoundedRect::from_rect(rect.into(), radius.max(0.0));
        self.set_shape_path(&shape.to_path(path::TOLERANCE));
        self.stroke_path();
    }

    fn fill_circle(&mut self, center: PointF, radius: f64) {
        let shape = Circle::new(kurbo::Point::from(center), radius.abs());
        self.set_shape_path(&shape.to_path(path::TOLERANCE));
        self.fill_path();
    }

    fn draw_circle(&mut self, center: PointF, radius: f64) {
        let shape = Circle::new(kurbo::Point::from(center), radius.abs());
        self.set_shape_path(&shape.to_path(path::TOLERANCE));
        self.stroke_path();
    }

    /// Fill the ellipse inscribed in `rect`.
    fn fill_ellipse(&mut self, rect: RectF) {
        let shape = Ellipse::from_rect(rect.into());
        self.set_shape_path(&shape.to_path(path::TOLERANCE));
        self.fill_path();
    }

    fn draw_ellipse(&mut self, rect: RectF) {
        let shape = Ellipse::from_rect(rect.into());
        self.set_shape_path(&shape.to_path(path::TOLERANCE));
        self.stroke_path();
    }

    fn draw_line(&mut self, from: PointF, to: PointF) {
        let shape = Line::new(kurbo::Point::from(from), kurbo::Point::from(to));
        self.set_shape_path(&shape.to_path(path::TOLERANCE));
        self.stroke_path();
    }
}

/// Map a gradient's user-space axis into device space with the transform.
pub(crate) fn device_paint(paint: &Paint, transform: Affine) -> Paint {
    match paint {
        Paint::Solid(c) => Paint::Solid(*c),
        Paint::LinearGradient { start, end, stops } => Paint::LinearGradient {
            start: (transform * kurbo::Point::from(*start)).into(),
            end: (transform * kurbo::Point::from(*end)).into(),
            stops: stops.clone(),
        },
    }
}
