//! Software rasterizer backend.
//!
//! Paths are flattened with kurbo and scan converted with the non-zero
//! winding rule. Each pixel row is sampled at [`SAMPLES`] sub-scanlines with
//! exact horizontal span coverage, which gives anti-aliased edges without a
//! full supersampled buffer. Strokes expand every flattened segment into a
//! quad plus a round join; the pieces are merged into one coverage mask with
//! `max` so overlaps never double-blend.
//!
//! Text is rendered as one box per visible glyph using the shared font
//! metrics; no outline fonts are bundled.

use std::collections::HashMap;

use kurbo::{Affine, BezPath, Point, Vec2};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::geometry::{PointF, Rect, RectF, Size};
use crate::render::path::{self, PathBuilder};
use crate::render::{
    DrawState, ImageHandle, PLACEHOLDER_COLOR, PixelImage, PixelSurface, RenderContext,
    StateStack, device_paint,
};
use crate::style::{Paint, Shadow, TextStyle};

/// Sub-scanlines per pixel row.
pub const SAMPLES: usize = 4;
/// Segments used to approximate a round stroke join.
const JOIN_SEGMENTS: usize = 12;

/// Per-pixel coverage over a device rectangle.
struct Mask {
    area: Rect,
    data: Vec<f32>,
}

impl Mask {
    fn new(area: Rect) -> Self {
        Self {
            area,
            data: vec![0.0; area.width as usize * area.height as usize],
        }
    }

    fn coverage(&self, x: i32, y: i32) -> f32 {
        let cx = (x - self.area.x) as usize;
        let cy = (y - self.area.y) as usize;
        self.data[cy * self.area.width as usize + cx]
    }

    /// Scan convert polygons (non-zero rule) and merge with `max`.
    fn add_polygons(&mut self, polygons: &[Vec<Point>]) {
        let edges: Vec<(Point, Point)> = polygons
            .iter()
            .filter(|poly| poly.len() > 2)
            .flat_map(|poly| {
                poly.iter()
                    .zip(poly.iter().cycle().skip(1))
                    .map(|(&a, &b)| (a, b))
            })
            .filter(|(a, b)| a.y != b.y)
            .collect();
        if edges.is_empty() {
            return;
        }

        let (min_y, max_y) = edges.iter().fold((f64::MAX, f64::MIN), |(lo, hi), (a, b)| {
            (lo.min(a.y).min(b.y), hi.max(a.y).max(b.y))
        });
        let row_start = (min_y.floor() as i32).max(self.area.y);
        let row_end = (max_y.ceil() as i32).min(self.area.bottom());
        let width = self.area.width as usize;
        let weight = 1.0 / SAMPLES as f64;

        let mut acc = vec![0.0_f64; width];
        let mut crossings: Vec<(f64, i32)> = Vec::new();
        for y in row_start..row_end {
            acc.iter_mut().for_each(|v| *v = 0.0);
            for s in 0..SAMPLES {
                let sy = f64::from(y) + (s as f64 + 0.5) * weight;
                crossings.clear();
                for &(a, b) in &edges {
                    let (top, bottom, dir) = if a.y < b.y { (a, b, 1) } else { (b, a, -1) };
                    if sy >= top.y && sy < bottom.y {
                        let x = top.x + (sy - top.y) * (bottom.x - top.x) / (bottom.y - top.y);
                        crossings.push((x, dir));
                    }
                }
                crossings.sort_by(|l, r| l.0.total_cmp(&r.0));
                let mut winding = 0;
                for pair in crossings.windows(2) {
                    winding += pair[0].1;
                    if winding != 0 {
                        self.add_span(&mut acc, pair[0].0, pair[1].0, weight);
                    }
                }
            }
            let row = (y - self.area.y) as usize * width;
            for (i, &v) in acc.iter().enumerate() {
                let cell = &mut self.data[row + i];
                *cell = cell.max(v.min(1.0) as f32);
            }
        }
    }

    fn add_span(&self, acc: &mut [f64], xa: f64, xb: f64, weight: f64) {
        let width = acc.len() as f64;
        let origin = f64::from(self.area.x);
        let xa = (xa - origin).clamp(0.0, width);
        let xb = (xb - origin).clamp(0.0, width);
        if xb <= xa {
            return;
        }
        let ia = xa.floor() as usize;
        let ib = xb.floor() as usize;
        if ia == ib {
            acc[ia] += (xb - xa) * weight;
            return;
        }
        acc[ia] += (ia as f64 + 1.0 - xa) * weight;
        for v in &mut acc[ia + 1..ib] {
            *v += weight;
        }
        if ib < acc.len() {
            acc[ib] += (xb - ib as f64) * weight;
        }
    }
}

fn polygon_bounds(polygons: &[Vec<Point>]) -> Option<RectF> {
    let mut bbox: Option<kurbo::Rect> = None;
    for p in polygons.iter().flatten() {
        bbox = Some(match bbox {
            Some(r) => r.union_pt(*p),
            None => kurbo::Rect::from_points(*p, *p),
        });
    }
    bbox.map(RectF::from)
}

/// Evaluate a device-space paint at a device point.
fn paint_at(paint: &Paint, p: Point) -> Color {
    match paint {
        Paint::Solid(c) => *c,
        Paint::LinearGradient { start, end, .. } => {
            let s = Point::from(*start);
            let axis = Point::from(*end) - s;
            let len2 = axis.hypot2();
            let t = if len2 <= f64::EPSILON {
                0.0
            } else {
                (p - s).dot(axis) / len2
            };
            paint.color_at(t as f32)
        }
    }
}

/// Round-join polygon approximating a circle.
fn disc(center: Point, radius: f64) -> Vec<Point> {
    (0..JOIN_SEGMENTS)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / JOIN_SEGMENTS as f64;
            center + Vec2::from_angle(angle) * radius
        })
        .collect()
}

/// Expand flattened polylines into stroke pieces.
fn stroke_polygons(lines: &[path::Polyline], half_width: f64) -> Vec<Vec<Point>> {
    let mut pieces = Vec::new();
    for line in lines {
        let pts = &line.points;
        let mut segments: Vec<(Point, Point)> = pts.windows(2).map(|w| (w[0], w[1])).collect();
        if line.closed {
            if let (Some(&last), Some(&first)) = (pts.last(), pts.first()) {
                segments.push((last, first));
            }
        }
        for (a, b) in &segments {
            let d = *b - *a;
            if d.hypot() < f64::EPSILON {
                continue;
            }
            let n = Vec2::new(-d.y, d.x).normalize() * half_width;
            pieces.push(vec![*a + n, *b + n, *b - n, *a - n]);
        }
        let joins = if line.closed { &pts[..] } else { &pts[1..pts.len().saturating_sub(1)] };
        if half_width > 0.75 {
            pieces.extend(joins.iter().map(|&p| disc(p, half_width)));
        }
    }
    pieces
}

/// Host-native render context over a pixel surface.
pub struct RasterContext {
    surface: PixelSurface,
    states: StateStack,
    path: PathBuilder,
    images: HashMap<u32, PixelImage>,
    next_image: u32,
}

impl RasterContext {
    /// Create a context with a transparent surface.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Self {
            surface: PixelSurface::new(width, height),
            states: StateStack::new(Size::new(width, height)),
            path: PathBuilder::new(),
            images: HashMap::new(),
            next_image: 1,
        })
    }

    #[must_use]
    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut PixelSurface {
        &mut self.surface
    }

    /// Resize the surface; contents are cleared and the state stack reset.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
        self.states.resize(Size::new(width, height));
        self.path.clear();
    }

    /// Reset state and path at the start of a paint pass.
    pub fn begin_frame(&mut self) {
        if self.states.depth() > 0 {
            crate::log::warn("render state stack not balanced at frame start");
        }
        self.states.reset();
        self.path.clear();
    }

    fn current(&self) -> &DrawState {
        self.states.current()
    }

    /// Empty mask covering the polygons' bounds inside the current clip.
    fn mask_for(&self, polygons: &[Vec<Point>], pad: f64) -> Option<Mask> {
        let bounds = polygon_bounds(polygons)?;
        let grown = RectF::new(
            bounds.x - pad,
            bounds.y - pad,
            bounds.width + 2.0 * pad,
            bounds.height + 2.0 * pad,
        )
        .round_out();
        let area = grown.intersect(&self.current().clip)?;
        Some(Mask::new(area))
    }

    fn composite(&mut self, mask: &Mask, paint: &Paint) {
        let state = self.states.current().clone();
        let alpha = state.alpha.clamp(0.0, 1.0);
        if let Some(shadow) = state.shadow {
            self.composite_shadow(mask, shadow, alpha, state.clip);
        }
        let area = mask.area;
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let cov = mask.coverage(x, y);
                if cov <= 0.0 {
                    continue;
                }
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let color = paint_at(paint, center).scale_alpha(alpha);
                self.surface.blend(x as u32, y as u32, color, cov);
            }
        }
    }

    fn composite_shadow(&mut self, mask: &Mask, shadow: Shadow, alpha: f32, clip: Rect) {
        let dx = shadow.offset.x.round() as i32;
        let dy = shadow.offset.y.round() as i32;
        // Blur widens the falloff; approximated by softening coverage.
        let softness = (1.0 / (1.0 + shadow.blur.max(0.0) / 4.0)) as f32;
        let color = shadow.color.scale_alpha(alpha);
        let area = mask.area;
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let cov = mask.coverage(x, y);
                let (tx, ty) = (x + dx, y + dy);
                if cov <= 0.0 || !clip.contains(crate::geometry::Point::new(tx, ty)) {
                    continue;
                }
                self.surface.blend(tx as u32, ty as u32, color, cov * softness);
            }
        }
    }

    fn fill_device(&mut self, device: &BezPath, paint: &Paint) {
        let polygons: Vec<Vec<Point>> = path::flatten(device)
            .into_iter()
            .map(|line| line.points)
            .collect();
        if let Some(mut mask) = self.mask_for(&polygons, 0.0) {
            mask.add_polygons(&polygons);
            self.composite(&mask, paint);
        }
    }

    fn placeholder(&mut self, dst: RectF) {
        let t = self.current().transform;
        let device = t * kurbo::Shape::to_path(&kurbo::Rect::from(dst), path::TOLERANCE);
        self.fill_device(&device, &Paint::Solid(PLACEHOLDER_COLOR));
    }

    fn blit(&mut self, image: &PixelImage, src: Option<RectF>, dst: RectF) {
        if dst.width <= 0.0 || dst.height <= 0.0 || image.width() == 0 || image.height() == 0 {
            return;
        }
        let state = self.current().clone();
        if state.transform.determinant().abs() < f64::EPSILON {
            return;
        }
        let src = src.unwrap_or_else(|| RectF::new(0.0, 0.0, f64::from(image.width()), f64::from(image.height())));
        let inverse = state.transform.inverse();
        let device = RectF::from(state.transform.transform_rect_bbox(dst.into())).round_out();
        let Some(area) = device.intersect(&state.clip) else {
            return;
        };
        let alpha = state.alpha.clamp(0.0, 1.0);
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let user = inverse * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if !dst.contains(user.into()) {
                    continue;
                }
                let sx = src.x + (user.x - dst.x) / dst.width * src.width;
                let sy = src.y + (user.y - dst.y) / dst.height * src.height;
                if sx < 0.0 || sy < 0.0 {
                    continue;
                }
                if let Some(color) = image.get(sx.floor() as u32, sy.floor() as u32) {
                    self.surface.blend(x as u32, y as u32, color.scale_alpha(alpha), 1.0);
                }
            }
        }
    }

    fn clip_changed(&mut self, before: Rect) {
        if self.current().clip != before {
            self.path.clear();
        }
    }
}

impl RenderContext for RasterContext {
    fn size(&self) -> Size {
        self.surface.size()
    }

    fn state(&self) -> &DrawState {
        self.states.current()
    }

    fn state_depth(&self) -> usize {
        self.states.depth()
    }

    fn push_state(&mut self) {
        self.states.push();
    }

    fn pop_state(&mut self) {
        let before = self.current().clip;
        self.states.pop();
        self.clip_changed(before);
    }

    fn set_transform(&mut self, transform: Affine) {
        self.states.current_mut().transform = transform;
    }

    fn clip_rect(&mut self, rect: RectF) {
        let before = self.current().clip;
        self.states.clip(rect);
        self.clip_changed(before);
    }

    fn clear_clip_rect(&mut self) {
        let before = self.current().clip;
        self.states.clear_clip();
        self.clip_changed(before);
    }

    fn set_fill_paint(&mut self, paint: Paint) {
        self.states.current_mut().fill = paint;
    }

    fn set_stroke_paint(&mut self, paint: Paint) {
        self.states.current_mut().stroke = paint;
    }

    fn set_stroke_width(&mut self, width: f64) {
        self.states.current_mut().stroke_width = width.max(0.0);
    }

    fn set_text_style(&mut self, style: TextStyle) {
        self.states.current_mut().text = style;
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.states.current_mut().alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_shadow(&mut self, offset: PointF, blur: f64, color: Color) {
        self.states.current_mut().shadow = Some(Shadow { offset, blur, color });
    }

    fn clear_shadow(&mut self) {
        self.states.current_mut().shadow = None;
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, p: PointF) {
        let t = self.current().transform;
        self.path.move_to(t, p.into());
    }

    fn line_to(&mut self, p: PointF) {
        let t = self.current().transform;
        self.path.line_to(t, p.into());
    }

    fn quadratic_curve_to(&mut self, control: PointF, p: PointF) {
        let t = self.current().transform;
        self.path.quad_to(t, control.into(), p.into());
    }

    fn bezier_curve_to(&mut self, c1: PointF, c2: PointF, p: PointF) {
        let t = self.current().transform;
        self.path.curve_to(t, c1.into(), c2.into(), p.into());
    }

    fn arc_to(&mut self, p1: PointF, p2: PointF, radius: f64) {
        let t = self.current().transform;
        self.path.arc_to(t, p1.into(), p2.into(), radius);
    }

    fn arc(&mut self, center: PointF, radius: f64, start_angle: f64, end_angle: f64, ccw: bool) {
        let t = self.current().transform;
        self.path.arc(t, center.into(), radius, start_angle, end_angle, ccw);
    }

    fn close_path(&mut self) {
        self.path.close();
    }

    fn append_path(&mut self, path: &BezPath) {
        let t = self.current().transform;
        self.path.append(t, path);
    }

    fn fill_path(&mut self) {
        let state = self.current();
        let paint = device_paint(&state.fill, state.transform);
        let device = self.path.device_path().clone();
        self.fill_device(&device, &paint);
    }

    fn stroke_path(&mut self) {
        let state = self.current();
        let scale = state.transform.determinant().abs().sqrt();
        let half = (state.stroke_width * scale / 2.0).max(0.5);
        let paint = device_paint(&state.stroke, state.transform);
        let lines = path::flatten(self.path.device_path());
        let pieces = stroke_polygons(&lines, half);
        if pieces.is_empty() {
            return;
        }
        let Some(mut mask) = self.mask_for(&pieces, 1.0) else {
            return;
        };
        for piece in &pieces {
            mask.add_polygons(std::slice::from_ref(piece));
        }
        self.composite(&mask, &paint);
    }

    fn draw_text(&mut self, text: &str, pos: PointF) {
        let metrics = self.font_metrics();
        let state = self.current();
        let color = state.text.color;
        let glyph_height = metrics.ascent() * 0.7;
        let mut boxes = BezPath::new();
        let mut x = pos.x;
        for ch in text.chars() {
            let advance = metrics.char_advance(ch);
            if !ch.is_whitespace() && advance > 0.0 {
                let glyph = kurbo::Rect::new(
                    x + advance * 0.1,
                    pos.y - glyph_height,
                    x + advance * 0.9,
                    pos.y,
                );
                boxes.extend(kurbo::Shape::path_elements(&glyph, path::TOLERANCE));
            }
            x += advance;
        }
        let device = state.transform * boxes;
        self.fill_device(&device, &Paint::Solid(color));
    }

    fn draw_pixels(&mut self, image: &PixelImage, src: Option<RectF>, dst: RectF) {
        self.blit(image, src, dst);
    }

    fn load_image(&mut self, image: PixelImage) -> ImageHandle {
        let id = self.next_image;
        self.next_image += 1;
        self.images.insert(id, image);
        ImageHandle(id)
    }

    fn draw_image(&mut self, handle: ImageHandle, src: Option<RectF>, dst: RectF) {
        // Temporarily take the image so the blit can borrow the surface.
        let Some(image) = self.images.remove(&handle.0) else {
            crate::log::warn(&format!("image handle {} not loaded; drawing placeholder", handle.0));
            self.placeholder(dst);
            return;
        };
        self.blit(&image, src, dst);
        self.images.insert(handle.0, image);
    }

    fn clear(&mut self, color: Color) {
        self.surface.fill(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point as IPoint;

    fn ctx() -> RasterContext {
        let mut c = RasterContext::new(40, 30).unwrap();
        c.clear(Color::WHITE);
        c
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(RasterContext::new(0, 10).is_err());
    }

    #[test]
    fn test_fill_rectangle_exact_pixels() {
        let mut c = ctx();
        c.set_fill_color(Color::RED);
        c.fill_rectangle(RectF::new(2.0, 3.0, 4.0, 5.0));
        let s = c.surface();
        assert_eq!(s.count_in(Rect::new(0, 0, 40, 30), Color::RED), 20);
        assert_eq!(s.get(2, 3), Some(Color::RED));
        assert_eq!(s.get(5, 7), Some(Color::RED));
        assert_eq!(s.get(6, 7), Some(Color::WHITE));
    }

    #[test]
    fn test_clip_limits_fill() {
        let mut c = ctx();
        c.set_fill_color(Color::BLUE);
        c.clip_rect(RectF::new(0.0, 0.0, 10.0, 10.0));
        c.fill_rectangle(RectF::new(0.0, 0.0, 40.0, 30.0));
        assert_eq!(c.surface().count_in(Rect::new(0, 0, 40, 30), Color::BLUE), 100);
    }

    #[test]
    fn test_translate_moves_fill() {
        let mut c = ctx();
        c.set_fill_color(Color::BLACK);
        c.translate(10.0, 10.0);
        c.fill_rectangle(RectF::new(0.0, 0.0, 2.0, 2.0));
        assert_eq!(c.surface().get(10, 10), Some(Color::BLACK));
        assert_eq!(c.surface().get(0, 0), Some(Color::WHITE));
    }

    #[test]
    fn test_circle_partial_coverage() {
        let mut c = ctx();
        c.set_fill_color(Color::BLACK);
        c.fill_circle(PointF::new(20.0, 15.0), 8.0);
        assert_eq!(c.surface().get(20, 15), Some(Color::BLACK));
        assert_eq!(c.surface().get(0, 0), Some(Color::WHITE));
        // Edge pixels are blended, not hard.
        let edge = c.surface().get(27, 15).unwrap();
        assert!(edge != Color::WHITE);
    }

    #[test]
    fn test_stroke_line() {
        let mut c = ctx();
        c.set_stroke_color(Color::GREEN);
        c.set_stroke_width(2.0);
        c.draw_line(PointF::new(5.0, 10.0), PointF::new(30.0, 10.0));
        assert_eq!(c.surface().get(15, 9), Some(Color::GREEN));
        assert_eq!(c.surface().get(15, 10), Some(Color::GREEN));
        assert_eq!(c.surface().get(15, 12), Some(Color::WHITE));
    }

    #[test]
    fn test_alpha_multiplies_paint() {
        let mut c = ctx();
        c.set_fill_color(Color::BLACK);
        c.set_alpha(0.5);
        c.fill_rectangle(RectF::new(0.0, 0.0, 1.0, 1.0));
        let px = c.surface().get(0, 0).unwrap();
        assert!(px.r > 100 && px.r < 160, "{px:?}");
    }

    #[test]
    fn test_text_draws_inside_line_box() {
        let mut c = ctx();
        c.set_font_style(crate::style::FontStyle::new("Mono", 10.0));
        c.draw_text("ab", PointF::new(2.0, 20.0));
        let s = c.surface();
        let inked = s.pixels().iter().filter(|&&p| p != Color::WHITE).count();
        assert!(inked > 0);
        // Nothing is drawn below the baseline.
        assert_eq!(s.count_in(Rect::new(0, 20, 40, 10), Color::WHITE), 400);
    }

    #[test]
    fn test_missing_image_draws_placeholder() {
        let mut c = ctx();
        c.draw_image(ImageHandle(99), None, RectF::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(c.surface().get(1, 1), Some(PLACEHOLDER_COLOR));
    }

    #[test]
    fn test_loaded_image_blit_scaled() {
        let mut c = ctx();
        let img = PixelSurface::filled(2, 2, Color::RED);
        let handle = c.load_image(img);
        c.draw_image(handle, None, RectF::new(10.0, 10.0, 4.0, 4.0));
        assert_eq!(c.surface().count_in(Rect::new(0, 0, 40, 30), Color::RED), 16);
    }

    #[test]
    fn test_shadow_offset() {
        let mut c = ctx();
        c.set_fill_color(Color::BLUE);
        c.set_shadow(PointF::new(5.0, 0.0), 0.0, Color::BLACK);
        c.fill_rectangle(RectF::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(c.surface().get(1, 1), Some(Color::BLUE));
        assert_eq!(c.surface().get(7, 1), Some(Color::BLACK));
    }

    #[test]
    fn test_pop_restores_clip() {
        let mut c = ctx();
        c.push_state();
        c.clip_rect(RectF::new(0.0, 0.0, 5.0, 5.0));
        c.pop_state();
        assert_eq!(c.clip_bounds(), Rect::new(0, 0, 40, 30));
        assert!(c.clip_bounds().contains(IPoint::new(39, 29)));
    }
}
