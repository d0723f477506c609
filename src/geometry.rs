//! Geometry primitives.
//!
//! Integer types ([`Point`], [`Size`], [`Rect`]) are used for element bounds
//! and layout; float types ([`PointF`], [`RectF`]) for rendering. Rectangles
//! are half-open on their max edges: a rect at `x = 0` with `width = 100`
//! contains `x = 99` but not `x = 100`, so adjacent regions never both claim a
//! boundary pixel.

use std::ops::{Add, Sub};

/// Integer point in some coordinate space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert to a float point.
    #[must_use]
    pub fn to_f64(self) -> PointF {
        PointF::new(f64::from(self.x), f64::from(self.y))
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

/// Non-negative integer size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check if either dimension is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned integer rectangle.
///
/// The extent is unsigned, so the "width/height ≥ 0" invariant holds by
/// construction. Use [`Rect::from_signed`] to clamp untrusted signed extents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from signed extents, clamping negatives to zero.
    #[must_use]
    pub fn from_signed(x: i32, y: i32, width: i32, height: i32) -> Self {
        debug_assert!(width >= 0 && height >= 0, "negative rect extent");
        if width < 0 || height < 0 {
            crate::log::warn(&format!(
                "negative rect extent {width}x{height} clamped to zero"
            ));
        }
        Self::new(x, y, width.max(0) as u32, height.max(0) as u32)
    }

    /// Create a rectangle at the origin.
    #[must_use]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Extent.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Exclusive right edge.
    #[must_use]
    pub fn right(&self) -> i32 {
        self.x.saturating_add_unsigned(self.width)
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add_unsigned(self.height)
    }

    /// Center point (rounded toward the origin).
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            self.x.saturating_add_unsigned(self.width / 2),
            self.y.saturating_add_unsigned(self.height / 2),
        )
    }

    /// Check if a point is inside this rectangle (half-open on max edges).
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.y >= self.y && p.x < self.right() && p.y < self.bottom()
    }

    /// Check if this rectangle is empty (zero area).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Compute intersection with another rectangle.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 > x1 && y2 > y1 {
            Some(Self::new(x1, y1, x2.abs_diff(x1), y2.abs_diff(y1)))
        } else {
            None
        }
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Self::new(x1, y1, x2.abs_diff(x1), y2.abs_diff(y1))
    }

    /// Move the rectangle by an offset.
    #[must_use]
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Shrink by per-side insets; never produces a negative extent.
    #[must_use]
    pub fn inset(&self, insets: Insets) -> Self {
        let horizontal = insets.left.saturating_add(insets.right);
        let vertical = insets.top.saturating_add(insets.bottom);
        Self::new(
            self.x.saturating_add_unsigned(insets.left),
            self.y.saturating_add_unsigned(insets.top),
            self.width.saturating_sub(horizontal),
            self.height.saturating_sub(vertical),
        )
    }

    /// Convert to a float rectangle.
    #[must_use]
    pub fn to_f64(&self) -> RectF {
        RectF::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.width),
            f64::from(self.height),
        )
    }
}

/// Per-side padding or margin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Insets {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Insets {
    /// Create insets from all four sides.
    #[must_use]
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Same inset on every side.
    #[must_use]
    pub const fn uniform(value: u32) -> Self {
        Self::new(value, value, value, value)
    }
}

/// Floating point position used by the render context.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<PointF> for kurbo::Point {
    fn from(p: PointF) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<kurbo::Point> for PointF {
    fn from(p: kurbo::Point) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<Point> for PointF {
    fn from(p: Point) -> Self {
        p.to_f64()
    }
}

/// Floating point rectangle used by the render context.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectF {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if a point lies inside (half-open on max edges).
    #[must_use]
    pub fn contains(&self, p: PointF) -> bool {
        p.x >= self.x && p.y >= self.y && p.x < self.right() && p.y < self.bottom()
    }

    /// Round outward to the integer grid.
    #[must_use]
    pub fn round_out(&self) -> Rect {
        let x1 = self.x.floor();
        let y1 = self.y.floor();
        let x2 = self.right().ceil();
        let y2 = self.bottom().ceil();
        Rect::new(
            x1 as i32,
            y1 as i32,
            (x2 - x1).max(0.0) as u32,
            (y2 - y1).max(0.0) as u32,
        )
    }
}

impl From<Rect> for RectF {
    fn from(r: Rect) -> Self {
        r.to_f64()
    }
}

impl From<RectF> for kurbo::Rect {
    fn from(r: RectF) -> Self {
        Self::new(r.x, r.y, r.right(), r.bottom())
    }
}

impl From<kurbo::Rect> for RectF {
    fn from(r: kurbo::Rect) -> Self {
        Self::new(r.x0, r.y0, r.width(), r.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_half_open() {
        let a = Rect::new(0, 0, 100, 50);
        let b = Rect::new(100, 0, 100, 50);
        let edge = Point::new(100, 25);
        assert!(!a.contains(edge));
        assert!(b.contains(edge));
        assert!(a.contains(Point::new(99, 49)));
        assert!(!a.contains(Point::new(99, 50)));
    }

    #[test]
    fn test_intersect_and_union() {
        let a = Rect::new(0, 0, 20, 20);
        let b = Rect::new(10, 10, 20, 20);
        assert_eq!(a.intersect(&b), Some(Rect::new(10, 10, 10, 10)));
        assert_eq!(a.union(&b), Rect::new(0, 0, 30, 30));
        assert_eq!(a.intersect(&Rect::new(20, 0, 5, 5)), None);
        assert_eq!(Rect::default().union(&a), a);
    }

    #[test]
    fn test_intersect_and_union_at_extremes() {
        let all = Rect::new(i32::MIN, i32::MIN, u32::MAX, u32::MAX);
        let small = Rect::new(-10, -10, 20, 20);
        assert_eq!(all.intersect(&small), Some(small));
        assert_eq!(all.intersect(&all), Some(all));
        assert_eq!(all.union(&small), all);

        let left = Rect::new(i32::MIN, 0, 1, 1);
        let right = Rect::new(i32::MAX - 1, 0, 1, 1);
        assert_eq!(left.union(&right), Rect::new(i32::MIN, 0, u32::MAX, 1));
    }

    #[test]
    fn test_from_signed_clamps() {
        let r = Rect::from_signed(5, 5, 10, 3);
        assert_eq!(r, Rect::new(5, 5, 10, 3));
    }

    #[test]
    fn test_inset_never_negative() {
        let r = Rect::new(0, 0, 10, 10).inset(Insets::uniform(8));
        assert_eq!(r, Rect::new(8, 8, 0, 0));
        assert!(r.is_empty());
    }

    #[test]
    fn test_center_and_translate() {
        let r = Rect::new(10, 20, 30, 40);
        assert_eq!(r.center(), Point::new(25, 40));
        assert_eq!(r.translate(-10, 5), Rect::new(0, 25, 30, 40));
    }

    #[test]
    fn test_rectf_round_out() {
        let r = RectF::new(0.5, 1.2, 2.0, 2.0).round_out();
        assert_eq!(r, Rect::new(0, 1, 3, 3));
    }

    #[test]
    fn test_point_arith() {
        assert_eq!(Point::new(3, 4) + Point::new(1, 1), Point::new(4, 5));
        assert_eq!(Point::new(3, 4) - Point::new(1, 1), Point::new(2, 3));
    }
}
