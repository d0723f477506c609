//! Path construction in user space, stored in device space.
//!
//! Every point is mapped through the transform that is current at the time of
//! the call, matching canvas 2D semantics: changing the transform in the
//! middle of a path does not move the segments already added.

use kurbo::{Affine, Arc, BezPath, PathEl, Point, Vec2};
use std::f64::consts::{PI, TAU};

/// Flattening tolerance in device pixels.
pub const TOLERANCE: f64 = 0.1;

/// Current path of a render context.
#[derive(Clone, Debug, Default)]
pub struct PathBuilder {
    path: BezPath,
    /// Current point in user space.
    current: Option<Point>,
    /// Start of the current subpath in user space.
    start: Option<Point>,
}

impl PathBuilder {
    /// Create an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all subpaths.
    pub fn clear(&mut self) {
        self.path = BezPath::new();
        self.current = None;
        self.start = None;
    }

    /// Check if no segments have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.elements().is_empty()
    }

    /// The path in device space.
    #[must_use]
    pub fn device_path(&self) -> &BezPath {
        &self.path
    }

    /// Current point in user space.
    #[must_use]
    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    pub fn move_to(&mut self, t: Affine, p: Point) {
        self.path.move_to(t * p);
        self.current = Some(p);
        self.start = Some(p);
    }

    /// Line to `p`; starts a subpath at `p` when there is no current point.
    pub fn line_to(&mut self, t: Affine, p: Point) {
        if self.current.is_none() {
            self.move_to(t, p);
            return;
        }
        self.path.line_to(t * p);
        self.current = Some(p);
    }

    pub fn quad_to(&mut self, t: Affine, c: Point, p: Point) {
        if self.current.is_none() {
            self.move_to(t, c);
        }
        self.path.quad_to(t * c, t * p);
        self.current = Some(p);
    }

    pub fn curve_to(&mut self, t: Affine, c1: Point, c2: Point, p: Point) {
        if self.current.is_none() {
            self.move_to(t, c1);
        }
        self.path.curve_to(t * c1, t * c2, t * p);
        self.current = Some(p);
    }

    /// Close the current subpath; the current point returns to its start.
    pub fn close(&mut self) {
        if let Some(start) = self.start {
            self.path.close_path();
            self.current = Some(start);
        }
    }

    /// Circular arc around `center`, angles in radians.
    ///
    /// A straight segment joins the current point to the arc start. Sweeps of
    /// a full turn or more draw a complete circle.
    pub fn arc(&mut self, t: Affine, center: Point, radius: f64, start_angle: f64, end_angle: f64, ccw: bool) {
        let radius = radius.abs();
        let mut sweep = end_angle - start_angle;
        if sweep.abs() >= TAU {
            sweep = if ccw { -TAU } else { TAU };
        } else if ccw {
            while sweep > 0.0 {
                sweep -= TAU;
            }
        } else {
            while sweep < 0.0 {
                sweep += TAU;
            }
        }
        let first = center + Vec2::from_angle(start_angle) * radius;
        self.line_to(t, first);
        self.push_arc(t, center, radius, start_angle, sweep);
    }

    /// Tangent arc from the current point toward `p1` then `p2` (canvas `arcTo`).
    ///
    /// Degenerate input (coincident points, collinear points, zero radius)
    /// degrades to a straight line to `p1`.
    pub fn arc_to(&mut self, t: Affine, p1: Point, p2: Point, radius: f64) {
        let Some(p0) = self.current else {
            self.move_to(t, p1);
            return;
        };
        let v1 = p0 - p1;
        let v2 = p2 - p1;
        if radius <= 0.0 || v1.hypot() < f64::EPSILON || v2.hypot() < f64::EPSILON {
            self.line_to(t, p1);
            return;
        }
        let (u1, u2) = (v1.normalize(), v2.normalize());
        let cross = u1.cross(u2);
        if cross.abs() < 1e-9 {
            self.line_to(t, p1);
            return;
        }

        let theta = u1.dot(u2).clamp(-1.0, 1.0).acos();
        let tangent_dist = radius / (theta / 2.0).tan();
        let center_dist = radius / (theta / 2.0).sin();
        let t1 = p1 + u1 * tangent_dist;
        let t2 = p1 + u2 * tangent_dist;
        let center = p1 + (u1 + u2).normalize() * center_dist;

        let start_angle = (t1 - center).atan2();
        let end_angle = (t2 - center).atan2();
        let mut sweep = end_angle - start_angle;
        if sweep > PI {
            sweep -= TAU;
        } else if sweep <= -PI {
            sweep += TAU;
        }

        self.line_to(t, t1);
        self.push_arc(t, center, radius, start_angle, sweep);
    }

    fn push_arc(&mut self, t: Affine, center: Point, radius: f64, start_angle: f64, sweep: f64) {
        let arc = Arc::new(center, (radius, radius), start_angle, sweep, 0.0);
        for el in arc.append_iter(TOLERANCE) {
            self.path.push(t * el);
        }
        self.current = Some(center + Vec2::from_angle(start_angle + sweep) * radius);
    }

    /// Append a user-space path (used by the shape helpers).
    pub fn append(&mut self, t: Affine, path: &BezPath) {
        for &el in path.elements() {
            match el {
                PathEl::MoveTo(p) => {
                    self.start = Some(p);
                    self.current = Some(p);
                }
                PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => {
                    if self.current.is_none() {
                        self.start = Some(p);
                    }
                    self.current = Some(p);
                }
                PathEl::ClosePath => self.current = self.start,
            }
            self.path.push(t * el);
        }
    }
}

/// A flattened subpath.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

/// Flatten a device-space path into polylines.
#[must_use]
pub fn flatten(path: &BezPath) -> Vec<Polyline> {
    let mut out: Vec<Polyline> = Vec::new();
    path.flatten(TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => out.push(Polyline {
            points: vec![p],
            closed: false,
        }),
        PathEl::LineTo(p) => match out.last_mut() {
            Some(line) if !line.closed => line.points.push(p),
            _ => out.push(Polyline {
                points: vec![p],
                closed: false,
            }),
        },
        PathEl::ClosePath => {
            if let Some(line) = out.last_mut() {
                let start = line.points[0];
                line.closed = true;
                // Subsequent segments continue from the closed subpath start.
                out.push(Polyline {
                    points: vec![start],
                    closed: false,
                });
            }
        }
        PathEl::QuadTo(..) | PathEl::CurveTo(..) => {}
    });
    out.retain(|line| line.points.len() > 1);
    out
}
