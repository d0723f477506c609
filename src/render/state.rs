//! Drawable state and the save/restore stack.
//!
//! [`StateStack`] generalises a scissor stack to the whole drawable state:
//! `push` snapshots everything (transform, clip, paints, stroke width, text
//! style, alpha, shadow) and `pop` restores it. The clip is a device-space
//! rectangle that only ever shrinks until it is explicitly cleared or popped.

use crate::geometry::{Rect, RectF, Size};
use crate::style::{FontStyle, Paint, Shadow, TextStyle};
use kurbo::Affine;

/// Complete drawable state of a render context.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawState {
    pub transform: Affine,
    /// Device-space clip rectangle.
    pub clip: Rect,
    pub fill: Paint,
    pub stroke: Paint,
    pub stroke_width: f64,
    pub text: TextStyle,
    /// Global alpha in [0, 1], multiplied into every paint.
    pub alpha: f32,
    pub shadow: Option<Shadow>,
}

impl DrawState {
    /// Base state for a surface of the given size.
    #[must_use]
    pub fn base(surface: Size) -> Self {
        Self {
            transform: Affine::IDENTITY,
            clip: Rect::from_size(surface),
            fill: Paint::default(),
            stroke: Paint::default(),
            stroke_width: 1.0,
            text: TextStyle::default(),
            alpha: 1.0,
            shadow: None,
        }
    }

    /// Current font.
    #[must_use]
    pub fn font(&self) -> &FontStyle {
        &self.text.font
    }
}

/// Stack of drawable states.
#[derive(Clone, Debug)]
pub struct StateStack {
    stack: Vec<DrawState>,
    current: DrawState,
    surface: Size,
}

impl StateStack {
    /// Create a stack in the base state for a surface.
    #[must_use]
    pub fn new(surface: Size) -> Self {
        Self {
            stack: Vec::new(),
            current: DrawState::base(surface),
            surface,
        }
    }

    /// Save the current state.
    pub fn push(&mut self) {
        self.stack.push(self.current.clone());
    }

    /// Restore the most recently saved state.
    ///
    /// Returns `false` on underflow; the state is then clamped to the base
    /// state and the underflow is reported through the diagnostic sink.
    pub fn pop(&mut self) -> bool {
        if let Some(state) = self.stack.pop() {
            self.current = state;
            true
        } else {
            crate::log::warn("render state pop without matching push; resetting to base state");
            crate::log::emit_event("render.pop_underflow", "");
            self.current = DrawState::base(self.surface);
            false
        }
    }

    /// Number of saved states.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Drop all saved states and return to the base state.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.current = DrawState::base(self.surface);
    }

    /// Resize the surface; the base clip follows, saved states are dropped.
    pub fn resize(&mut self, surface: Size) {
        self.surface = surface;
        self.reset();
    }

    /// Surface size.
    #[must_use]
    pub fn surface(&self) -> Size {
        self.surface
    }

    /// Current state.
    #[must_use]
    pub fn current(&self) -> &DrawState {
        &self.current
    }

    /// Mutable current state.
    pub fn current_mut(&mut self) -> &mut DrawState {
        &mut self.current
    }

    /// Intersect the clip with a user-space rectangle.
    ///
    /// The rectangle is mapped through the current transform and its device
    /// bounding box is intersected with the current clip.
    pub fn clip(&mut self, rect: RectF) {
        let device = self
            .current
            .transform
            .transform_rect_bbox(kurbo::Rect::from(rect));
        let device = RectF::from(device).round_out();
        self.current.clip = self
            .current
            .clip
            .intersect(&device)
            .unwrap_or(Rect::new(device.x, device.y, 0, 0));
    }

    /// Reset the clip to the surface bounds.
    pub fn clear_clip(&mut self) {
        self.current.clip = Rect::from_size(self.surface);
    }

    /// Right-multiply the current transform.
    pub fn transform(&mut self, affine: Affine) {
        self.current.transform *= affine;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::color::Color;

    fn stack() -> StateStack {
        StateStack::new(Size::new(200, 100))
    }

    #[test]
    fn test_base_clip_is_surface() {
        let s = stack();
        assert_eq!(s.current().clip, Rect::new(0, 0, 200, 100));
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn test_push_pop_restores_everything() {
        let mut s = stack();
        let before = s.current().clone();
        s.push();
        s.transform(Affine::translate((10.0, 5.0)));
        s.clip(RectF::new(0.0, 0.0, 20.0, 20.0));
        s.current_mut().fill = Paint::Solid(Color::RED);
        s.current_mut().alpha = 0.5;
        assert_ne!(s.current(), &before);
        assert!(s.pop());
        assert_eq!(s.current(), &before);
    }

    #[test]
    fn test_clip_uses_transform_and_intersects() {
        let mut s = stack();
        s.transform(Affine::translate((10.0, 10.0)));
        s.clip(RectF::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(s.current().clip, Rect::new(10, 10, 50, 50));
        s.clip(RectF::new(30.0, 30.0, 100.0, 100.0));
        assert_eq!(s.current().clip, Rect::new(40, 40, 20, 20));
    }

    #[test]
    fn test_disjoint_clip_is_empty() {
        let mut s = stack();
        s.clip(RectF::new(0.0, 0.0, 10.0, 10.0));
        s.clip(RectF::new(50.0, 50.0, 10.0, 10.0));
        assert!(s.current().clip.is_empty());
    }

    #[test]
    fn test_clear_clip() {
        let mut s = stack();
        s.clip(RectF::new(0.0, 0.0, 10.0, 10.0));
        s.clear_clip();
        assert_eq!(s.current().clip, Rect::new(0, 0, 200, 100));
    }

    #[test]
    fn test_pop_underflow_clamps_to_base() {
        let mut s = stack();
        s.transform(Affine::scale(2.0));
        assert!(!s.pop());
        assert_eq!(s.current(), &DrawState::base(Size::new(200, 100)));
    }

    #[test]
    fn test_transform_right_multiplies() {
        let mut s = stack();
        s.transform(Affine::translate((10.0, 0.0)));
        s.transform(Affine::scale(2.0));
        let p = s.current().transform * kurbo::Point::new(1.0, 1.0);
        assert_eq!((p.x, p.y), (12.0, 2.0));
    }
}
