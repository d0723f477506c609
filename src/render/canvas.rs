//! HTML canvas 2D backend.
//!
//! Every drawing call becomes a [`CanvasCommand`] submitted to a
//! [`CanvasSink`] together with the canvas id the context was created for.
//! On `wasm32` the default sink forwards the textual form of each command to
//! the `paneforge_canvas` import module; the host-side shim replays it on the
//! `CanvasRenderingContext2D` of the element with that id. Elsewhere a
//! [`RecordingSink`] captures the stream.
//!
//! The context mirrors the full [`DrawState`] stack locally so state queries
//! and text measurement never need a host round trip.
//!
//! Canvas can only remove a clip by restoring a saved state, so the host
//! context is kept exactly one `save()` level deep: whenever the clip
//! changes the context emits `restore`, `save`, the new device-space clip,
//! and then re-applies every other state field.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use kurbo::{Affine, BezPath, PathEl};

use crate::color::Color;
use crate::geometry::{PointF, Rect, RectF, Size};
use crate::render::{DrawState, ImageHandle, PLACEHOLDER_COLOR, PixelImage, RenderContext, StateStack};
use crate::style::{Paint, Shadow, TextStyle};

/// Fill or stroke style as understood by the canvas.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasStyle {
    Color(Color),
    LinearGradient {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        stops: Vec<(f32, Color)>,
    },
}

impl From<&Paint> for CanvasStyle {
    fn from(paint: &Paint) -> Self {
        match paint {
            Paint::Solid(c) => Self::Color(*c),
            Paint::LinearGradient { start, end, stops } => Self::LinearGradient {
                x0: start.x,
                y0: start.y,
                x1: end.x,
                y1: end.y,
                stops: stops.iter().map(|s| (s.offset, s.color)).collect(),
            },
        }
    }
}

impl fmt::Display for CanvasStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color(c) => write!(f, "{}", c.to_css()),
            Self::LinearGradient {
                x0,
                y0,
                x1,
                y1,
                stops,
            } => {
                write!(f, "linear({x0},{y0},{x1},{y1}")?;
                for (offset, color) in stops {
                    write!(f, ";{offset}:{}", color.to_css())?;
                }
                write!(f, ")")
            }
        }
    }
}

/// One canvas 2D call.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasCommand {
    Save,
    Restore,
    /// `setTransform(a, b, c, d, e, f)`.
    SetTransform([f64; 6]),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    QuadraticCurveTo(f64, f64, f64, f64),
    BezierCurveTo(f64, f64, f64, f64, f64, f64),
    ArcTo(f64, f64, f64, f64, f64),
    Arc {
        x: f64,
        y: f64,
        radius: f64,
        start: f64,
        end: f64,
        ccw: bool,
    },
    Rect(f64, f64, f64, f64),
    ClosePath,
    Clip,
    Fill,
    Stroke,
    FillStyle(CanvasStyle),
    StrokeStyle(CanvasStyle),
    LineWidth(f64),
    /// CSS font shorthand.
    Font(String),
    GlobalAlpha(f32),
    ShadowColor(Color),
    ShadowOffset(f64, f64),
    ShadowBlur(f64),
    FillText { text: String, x: f64, y: f64 },
    /// Upload an image into the host cache under `id`.
    PutImage {
        id: u32,
        width: u32,
        height: u32,
        argb: Vec<u32>,
    },
    /// Draw a cached image: source rect then destination rect.
    DrawImage { id: u32, src: RectF, dst: RectF },
    /// Release a transient image.
    DropImage(u32),
    /// Fill the whole canvas ignoring transform and clip.
    Clear(Color),
    /// Resize the backing canvas.
    Resize(u32, u32),
}

impl fmt::Display for CanvasCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Save => write!(f, "save"),
            Self::Restore => write!(f, "restore"),
            Self::SetTransform([a, b, c, d, e, g]) => {
                write!(f, "setTransform {a} {b} {c} {d} {e} {g}")
            }
            Self::BeginPath => write!(f, "beginPath"),
            Self::MoveTo(x, y) => write!(f, "moveTo {x} {y}"),
            Self::LineTo(x, y) => write!(f, "lineTo {x} {y}"),
            Self::QuadraticCurveTo(cx, cy, x, y) => write!(f, "quadraticCurveTo {cx} {cy} {x} {y}"),
            Self::BezierCurveTo(c1x, c1y, c2x, c2y, x, y) => {
                write!(f, "bezierCurveTo {c1x} {c1y} {c2x} {c2y} {x} {y}")
            }
            Self::ArcTo(x1, y1, x2, y2, r) => write!(f, "arcTo {x1} {y1} {x2} {y2} {r}"),
            Self::Arc {
                x,
                y,
                radius,
                start,
                end,
                ccw,
            } => write!(f, "arc {x} {y} {radius} {start} {end} {ccw}"),
            Self::Rect(x, y, w, h) => write!(f, "rect {x} {y} {w} {h}"),
            Self::ClosePath => write!(f, "closePath"),
            Self::Clip => write!(f, "clip"),
            Self::Fill => write!(f, "fill"),
            Self::Stroke => write!(f, "stroke"),
            Self::FillStyle(style) => write!(f, "fillStyle {style}"),
            Self::StrokeStyle(style) => write!(f, "strokeStyle {style}"),
            Self::LineWidth(w) => write!(f, "lineWidth {w}"),
            Self::Font(font) => write!(f, "font {font}"),
            Self::GlobalAlpha(a) => write!(f, "globalAlpha {a}"),
            Self::ShadowColor(c) => write!(f, "shadowColor {}", c.to_css()),
            Self::ShadowOffset(x, y) => write!(f, "shadowOffset {x} {y}"),
            Self::ShadowBlur(b) => write!(f, "shadowBlur {b}"),
            Self::FillText { text, x, y } => write!(f, "fillText {x} {y} {text}"),
            Self::PutImage {
                id,
                width,
                height,
                argb,
            } => {
                write!(f, "putImage {id} {width} {height} ")?;
                for (i, px) in argb.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{px:08x}")?;
                }
                Ok(())
            }
            Self::DrawImage { id, src, dst } => write!(
                f,
                "drawImage {id} {} {} {} {} {} {} {} {}",
                src.x, src.y, src.width, src.height, dst.x, dst.y, dst.width, dst.height
            ),
            Self::DropImage(id) => write!(f, "dropImage {id}"),
            Self::Clear(c) => write!(f, "clear {}", c.to_css()),
            Self::Resize(w, h) => write!(f, "resize {w} {h}"),
        }
    }
}

/// Receiver of canvas commands.
pub trait CanvasSink {
    fn submit(&mut self, canvas_id: &str, command: &CanvasCommand);
}

/// Sink that records commands in memory.
///
/// Clones share the same log, so a test can keep one clone and hand the
/// other to a [`CanvasContext`].
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    log: Rc<RefCell<Vec<(String, CanvasCommand)>>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded commands, oldest first.
    #[must_use]
    pub fn commands(&self) -> Vec<CanvasCommand> {
        self.log.borrow().iter().map(|(_, c)| c.clone()).collect()
    }

    /// Canvas ids the commands were addressed to.
    #[must_use]
    pub fn canvas_ids(&self) -> Vec<String> {
        self.log.borrow().iter().map(|(id, _)| id.clone()).collect()
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    /// One command per line in textual form.
    #[must_use]
    pub fn transcript(&self) -> String {
        self.log
            .borrow()
            .iter()
            .map(|(_, c)| c.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl CanvasSink for RecordingSink {
    fn submit(&mut self, canvas_id: &str, command: &CanvasCommand) {
        self.log.borrow_mut().push((canvas_id.to_string(), command.clone()));
    }
}

#[cfg(target_arch = "wasm32")]
mod host {
    use super::{CanvasCommand, CanvasSink};

    #[link(wasm_import_module = "paneforge_canvas")]
    unsafe extern "C" {
        fn submit(id_ptr: *const u8, id_len: usize, cmd_ptr: *const u8, cmd_len: usize);
    }

    /// Sink that forwards commands to the JavaScript host.
    #[derive(Debug, Default)]
    pub struct HostSink;

    impl CanvasSink for HostSink {
        fn submit(&mut self, canvas_id: &str, command: &CanvasCommand) {
            let text = command.to_string();
            // SAFETY: both pointers reference live UTF-8 buffers for the
            // duration of the call and the host copies them before returning.
            #[allow(unsafe_code)]
            unsafe {
                submit(canvas_id.as_ptr(), canvas_id.len(), text.as_ptr(), text.len());
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use host::HostSink;

/// Transient image id used by `draw_pixels`.
const TRANSIENT_IMAGE: u32 = 0;

/// Render context that marshals calls to an HTML canvas.
pub struct CanvasContext {
    canvas_id: String,
    sink: Box<dyn CanvasSink>,
    states: StateStack,
    images: HashMap<u32, Size>,
    next_image: u32,
}

impl CanvasContext {
    /// Create a context for the canvas element `canvas_id`.
    pub fn new(canvas_id: impl Into<String>, size: Size, sink: Box<dyn CanvasSink>) -> Self {
        let mut ctx = Self {
            canvas_id: canvas_id.into(),
            sink,
            states: StateStack::new(size),
            images: HashMap::new(),
            next_image: 1,
        };
        ctx.emit(CanvasCommand::Save);
        ctx
    }

    /// Create a context forwarding to the JavaScript host.
    #[cfg(target_arch = "wasm32")]
    pub fn for_host(canvas_id: impl Into<String>, size: Size) -> Self {
        Self::new(canvas_id, size, Box::new(HostSink))
    }

    #[must_use]
    pub fn canvas_id(&self) -> &str {
        &self.canvas_id
    }

    fn emit(&mut self, command: CanvasCommand) {
        self.sink.submit(&self.canvas_id, &command);
    }

    fn current(&self) -> &DrawState {
        self.states.current()
    }

    /// Resize the canvas and reset all state.
    pub fn resize(&mut self, size: Size) {
        self.emit(CanvasCommand::Resize(size.width, size.height));
        self.states.resize(size);
        self.sync(true);
    }

    /// Reset state at the start of a paint pass.
    pub fn begin_frame(&mut self) {
        if self.states.depth() > 0 {
            crate::log::warn("render state stack not balanced at frame start");
        }
        self.states.reset();
        self.sync(true);
    }

    /// Re-apply local state to the host context.
    fn sync(&mut self, clip_changed: bool) {
        let state = self.current().clone();
        if clip_changed {
            self.emit(CanvasCommand::Restore);
            self.emit(CanvasCommand::Save);
            self.emit(CanvasCommand::BeginPath);
            if state.clip != Rect::from_size(self.states.surface()) {
                let c = state.clip.to_f64();
                self.emit(CanvasCommand::SetTransform(affine_coeffs(Affine::IDENTITY)));
                self.emit(CanvasCommand::Rect(c.x, c.y, c.width, c.height));
                self.emit(CanvasCommand::Clip);
                self.emit(CanvasCommand::BeginPath);
            }
        }
        self.emit(CanvasCommand::SetTransform(affine_coeffs(state.transform)));
        self.emit(CanvasCommand::FillStyle((&state.fill).into()));
        self.emit(CanvasCommand::StrokeStyle((&state.stroke).into()));
        self.emit(CanvasCommand::LineWidth(state.stroke_width));
        self.emit(CanvasCommand::Font(state.text.font.to_css()));
        self.emit(CanvasCommand::GlobalAlpha(state.alpha));
        self.emit_shadow(state.shadow);
    }

    fn emit_shadow(&mut self, shadow: Option<Shadow>) {
        let shadow = shadow.unwrap_or(Shadow {
            offset: PointF::default(),
            blur: 0.0,
            color: Color::TRANSPARENT,
        });
        self.emit(CanvasCommand::ShadowColor(shadow.color));
        self.emit(CanvasCommand::ShadowOffset(shadow.offset.x, shadow.offset.y));
        self.emit(CanvasCommand::ShadowBlur(shadow.blur));
    }

    fn image_source(size: Size, src: Option<RectF>) -> RectF {
        src.unwrap_or_else(|| RectF::new(0.0, 0.0, f64::from(size.width), f64::from(size.height)))
    }
}

fn affine_coeffs(t: Affine) -> [f64; 6] {
    t.as_coeffs()
}

impl RenderContext for CanvasContext {
    fn size(&self) -> Size {
        self.states.surface()
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
        let before = self.current().clone();
        self.states.pop();
        if *self.current() != before {
            let clip_changed = self.current().clip != before.clip;
            self.sync(clip_changed);
        }
    }

    fn set_transform(&mut self, transform: Affine) {
        self.states.current_mut().transform = transform;
        self.emit(CanvasCommand::SetTransform(affine_coeffs(transform)));
    }

    fn clip_rect(&mut self, rect: RectF) {
        let before = self.current().clip;
        self.states.clip(rect);
        if self.current().clip != before {
            self.sync(true);
        }
    }

    fn clear_clip_rect(&mut self) {
        let before = self.current().clip;
        self.states.clear_clip();
        if self.current().clip != before {
            self.sync(true);
        }
    }

    fn set_fill_paint(&mut self, paint: Paint) {
        self.emit(CanvasCommand::FillStyle((&paint).into()));
        self.states.current_mut().fill = paint;
    }

    fn set_stroke_paint(&mut self, paint: Paint) {
        self.emit(CanvasCommand::StrokeStyle((&paint).into()));
        self.states.current_mut().stroke = paint;
    }

    fn set_stroke_width(&mut self, width: f64) {
        let width = width.max(0.0);
        self.states.current_mut().stroke_width = width;
        self.emit(CanvasCommand::LineWidth(width));
    }

    fn set_text_style(&mut self, style: TextStyle) {
        self.emit(CanvasCommand::Font(style.font.to_css()));
        self.states.current_mut().text = style;
    }

    fn set_alpha(&mut self, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        self.states.current_mut().alpha = alpha;
        self.emit(CanvasCommand::GlobalAlpha(alpha));
    }

    fn set_shadow(&mut self, offset: PointF, blur: f64, color: Color) {
        let shadow = Shadow { offset, blur, color };
        self.states.current_mut().shadow = Some(shadow);
        self.emit_shadow(Some(shadow));
    }

    fn clear_shadow(&mut self) {
        self.states.current_mut().shadow = None;
        self.emit_shadow(None);
    }

    fn begin_path(&mut self) {
        self.emit(CanvasCommand::BeginPath);
    }

    fn move_to(&mut self, p: PointF) {
        self.emit(CanvasCommand::MoveTo(p.x, p.y));
    }

    fn line_to(&mut self, p: PointF) {
        self.emit(CanvasCommand::LineTo(p.x, p.y));
    }

    fn quadratic_curve_to(&mut self, control: PointF, p: PointF) {
        self.emit(CanvasCommand::QuadraticCurveTo(control.x, control.y, p.x, p.y));
    }

    fn bezier_curve_to(&mut self, c1: PointF, c2: PointF, p: PointF) {
        self.emit(CanvasCommand::BezierCurveTo(c1.x, c1.y, c2.x, c2.y, p.x, p.y));
    }

    fn arc_to(&mut self, p1: PointF, p2: PointF, radius: f64) {
        self.emit(CanvasCommand::ArcTo(p1.x, p1.y, p2.x, p2.y, radius.max(0.0)));
    }

    fn arc(&mut self, center: PointF, radius: f64, start_angle: f64, end_angle: f64, ccw: bool) {
        self.emit(CanvasCommand::Arc {
            x: center.x,
            y: center.y,
            radius: radius.abs(),
            start: start_angle,
            end: end_angle,
            ccw,
        });
    }

    fn close_path(&mut self) {
        self.emit(CanvasCommand::ClosePath);
    }

    fn append_path(&mut self, path: &BezPath) {
        for el in path.elements() {
            let command = match *el {
                PathEl::MoveTo(p) => CanvasCommand::MoveTo(p.x, p.y),
                PathEl::LineTo(p) => CanvasCommand::LineTo(p.x, p.y),
                PathEl::QuadTo(c, p) => CanvasCommand::QuadraticCurveTo(c.x, c.y, p.x, p.y),
                PathEl::CurveTo(c1, c2, p) => {
                    CanvasCommand::BezierCurveTo(c1.x, c1.y, c2.x, c2.y, p.x, p.y)
                }
                PathEl::ClosePath => CanvasCommand::ClosePath,
            };
            self.emit(command);
        }
    }

    fn fill_path(&mut self) {
        self.emit(CanvasCommand::Fill);
    }

    fn stroke_path(&mut self) {
        self.emit(CanvasCommand::Stroke);
    }

    fn draw_text(&mut self, text: &str, pos: PointF) {
        let text_color = self.current().text.color;
        let fill = CanvasStyle::from(&self.current().fill);
        self.emit(CanvasCommand::FillStyle(CanvasStyle::Color(text_color)));
        self.emit(CanvasCommand::FillText {
            text: text.to_string(),
            x: pos.x,
            y: pos.y,
        });
        self.emit(CanvasCommand::FillStyle(fill));
    }

    fn draw_pixels(&mut self, image: &PixelImage, src: Option<RectF>, dst: RectF) {
        let src = Self::image_source(image.size(), src);
        self.emit(CanvasCommand::PutImage {
            id: TRANSIENT_IMAGE,
            width: image.width(),
            height: image.height(),
            argb: image.to_argb_vec(),
        });
        self.emit(CanvasCommand::DrawImage {
            id: TRANSIENT_IMAGE,
            src,
            dst,
        });
        self.emit(CanvasCommand::DropImage(TRANSIENT_IMAGE));
    }

    fn load_image(&mut self, image: PixelImage) -> ImageHandle {
        let id = self.next_image;
        self.next_image += 1;
        self.emit(CanvasCommand::PutImage {
            id,
            width: image.width(),
            height: image.height(),
            argb: image.to_argb_vec(),
        });
        self.images.insert(id, image.size());
        ImageHandle(id)
    }

    fn draw_image(&mut self, handle: ImageHandle, src: Option<RectF>, dst: RectF) {
        let Some(&size) = self.images.get(&handle.0) else {
            crate::log::warn(&format!("image handle {} not loaded; drawing placeholder", handle.0));
            let fill = CanvasStyle::from(&self.current().fill);
            self.emit(CanvasCommand::FillStyle(CanvasStyle::Color(PLACEHOLDER_COLOR)));
            self.emit(CanvasCommand::BeginPath);
            self.emit(CanvasCommand::Rect(dst.x, dst.y, dst.width, dst.height));
            self.emit(CanvasCommand::Fill);
            self.emit(CanvasCommand::FillStyle(fill));
            return;
        };
        let src = Self::image_source(size, src);
        self.emit(CanvasCommand::DrawImage {
            id: handle.0,
            src,
            dst,
        });
    }

    fn clear(&mut self, color: Color) {
        self.emit(CanvasCommand::Clear(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> (CanvasContext, RecordingSink) {
        let sink = RecordingSink::new();
        let ctx = CanvasContext::new("main", Size::new(100, 50), Box::new(sink.clone()));
        sink.clear();
        (ctx, sink)
    }

    #[test]
    fn test_commands_addressed_to_canvas_id() {
        let (mut c, sink) = ctx();
        c.fill_rectangle(RectF::new(0.0, 0.0, 10.0, 10.0));
        assert!(sink.canvas_ids().iter().all(|id| id == "main"));
        assert_eq!(sink.commands().last(), Some(&CanvasCommand::Fill));
    }

    #[test]
    fn test_clip_resets_host_state() {
        let (mut c, sink) = ctx();
        c.translate(5.0, 5.0);
        sink.clear();
        c.clip_rect(RectF::new(0.0, 0.0, 10.0, 10.0));
        let cmds = sink.commands();
        assert_eq!(cmds[0], CanvasCommand::Restore);
        assert_eq!(cmds[1], CanvasCommand::Save);
        assert!(cmds.contains(&CanvasCommand::Rect(5.0, 5.0, 10.0, 10.0)));
        assert!(cmds.contains(&CanvasCommand::Clip));
        // The transform is re-applied after the clip.
        assert!(cmds.contains(&CanvasCommand::SetTransform([1.0, 0.0, 0.0, 1.0, 5.0, 5.0])));
    }

    #[test]
    fn test_pop_without_change_emits_nothing() {
        let (mut c, sink) = ctx();
        c.push_state();
        c.pop_state();
        assert!(sink.commands().is_empty());
    }

    #[test]
    fn test_text_uses_text_color() {
        let (mut c, sink) = ctx();
        c.set_fill_color(Color::RED);
        sink.clear();
        c.draw_text("hi", PointF::new(1.0, 2.0));
        let cmds = sink.commands();
        assert_eq!(cmds[0], CanvasCommand::FillStyle(CanvasStyle::Color(Color::BLACK)));
        assert_eq!(cmds[2], CanvasCommand::FillStyle(CanvasStyle::Color(Color::RED)));
    }

    #[test]
    fn test_missing_image_placeholder() {
        let (mut c, sink) = ctx();
        c.draw_image(ImageHandle(7), None, RectF::new(0.0, 0.0, 4.0, 4.0));
        assert!(sink.commands().contains(&CanvasCommand::Rect(0.0, 0.0, 4.0, 4.0)));
    }

    #[test]
    fn test_command_text_form() {
        assert_eq!(CanvasCommand::MoveTo(1.5, 2.0).to_string(), "moveTo 1.5 2");
        assert_eq!(
            CanvasCommand::FillStyle(CanvasStyle::Color(Color::WHITE)).to_string(),
            "fillStyle rgba(255,255,255,1.000)"
        );
        let gradient = CanvasStyle::from(&Paint::linear(
            PointF::new(0.0, 0.0),
            PointF::new(10.0, 0.0),
            Color::BLACK,
            Color::WHITE,
        ));
        assert_eq!(
            gradient.to_string(),
            "linear(0,0,10,0;0:rgba(0,0,0,1.000);1:rgba(255,255,255,1.000))"
        );
    }
}
