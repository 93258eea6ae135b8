//! Elliptic arc related maths and tools.

use crate::scalar::Scalar;
use crate::{point, vector, Angle, CubicBezierSegment, Point, Vector};

/// An elliptic arc curve segment using the SVG's end-point notation.
///
/// See section F.6 of the SVG specification.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct SvgArc<S> {
    pub from: Point<S>,
    pub to: Point<S>,
    pub radii: Vector<S>,
    pub x_rotation: Angle<S>,
    pub flags: ArcFlags,
}

/// Flag parameters for arcs as described by the SVG specification.
///
/// For most situations using the SVG arc notation, there are four different arcs
/// (two different ellipses, each with two different arc sweeps) that satisfy the
/// arc parameters. The `large_arc` and `sweep` flags indicate which one of the
/// four arcs are drawn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ArcFlags {
    /// Of the four candidate arc sweeps, two will represent an arc sweep of greater
    /// than or equal to 180 degrees (the "large-arc"), and two will represent an arc
    /// sweep of less than or equal to 180 degrees (the "small arc"). If `large_arc`
    /// is `true`, then one of the two larger arc sweeps will be chosen; otherwise, if
    /// `large_arc` is `false`, one of the smaller arc sweeps will be chosen.
    pub large_arc: bool,
    /// If `sweep` is `true`, then the arc will be drawn in a "positive-angle" direction
    /// (the angle grows as the arc is drawn).
    pub sweep: bool,
}

/// An elliptic arc curve segment using the center notation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Arc<S> {
    pub center: Point<S>,
    pub radii: Vector<S>,
    pub start_angle: Angle<S>,
    pub sweep_angle: Angle<S>,
    pub x_rotation: Angle<S>,
}

impl<S: Scalar> SvgArc<S> {
    /// Whether the arc degenerates into a straight line segment.
    ///
    /// This happens when one of the radii is zero.
    pub fn is_straight_line(&self) -> bool {
        self.radii.x.abs() <= S::EPSILON || self.radii.y.abs() <= S::EPSILON
    }

    /// Whether the arc should be omitted entirely because its endpoints coincide.
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// Converts to the center parameterization.
    ///
    /// Radii that are too small to join the endpoints are scaled up uniformly
    /// (section F.6.6 of the SVG specification). Must not be called on a
    /// straight-line or empty arc.
    pub fn to_arc(&self) -> Arc<S> {
        Arc::from_svg_arc(self)
    }

    /// Approximates the arc with a sequence of cubic bézier segments.
    pub fn for_each_cubic_bezier<F>(&self, cb: &mut F)
    where
        F: FnMut(&CubicBezierSegment<S>),
    {
        if self.is_empty() {
            return;
        }

        if self.is_straight_line() {
            cb(&CubicBezierSegment::from_line(self.from, self.to));
            return;
        }

        self.to_arc().for_each_cubic_bezier_between(self.from, self.to, cb);
    }
}

impl<S: Scalar> Arc<S> {
    /// Create a simple circle arc.
    pub fn circle(center: Point<S>, radius: S) -> Self {
        Arc {
            center,
            radii: vector(radius, radius),
            start_angle: Angle::radians(S::ZERO),
            sweep_angle: Angle::radians(S::TWO * S::PI()),
            x_rotation: Angle::radians(S::ZERO),
        }
    }

    pub fn from_svg_arc(arc: &SvgArc<S>) -> Arc<S> {
        debug_assert!(!arc.from.x.is_nan());
        debug_assert!(!arc.from.y.is_nan());
        debug_assert!(!arc.to.x.is_nan());
        debug_assert!(!arc.to.y.is_nan());
        debug_assert!(!arc.is_straight_line());
        debug_assert!(!arc.is_empty());

        let mut rx = arc.radii.x.abs();
        let mut ry = arc.radii.y.abs();

        let (sin_phi, cos_phi) = arc.x_rotation.radians.sin_cos();
        let hd_x = (arc.from.x - arc.to.x) / S::TWO;
        let hd_y = (arc.from.y - arc.to.y) / S::TWO;
        let hs_x = (arc.from.x + arc.to.x) / S::TWO;
        let hs_y = (arc.from.y + arc.to.y) / S::TWO;

        // F6.5.1
        let p = point(
            cos_phi * hd_x + sin_phi * hd_y,
            -sin_phi * hd_x + cos_phi * hd_y,
        );

        // F6.6.2
        let lambda = (p.x * p.x) / (rx * rx) + (p.y * p.y) / (ry * ry);
        if lambda > S::ONE {
            let s = lambda.sqrt();
            rx *= s;
            ry *= s;
        }

        let rxry = rx * ry;
        let rxpy = rx * p.y;
        let rypx = ry * p.x;
        let sum_of_sq = rxpy * rxpy + rypx * rypx;

        debug_assert!(sum_of_sq != S::ZERO);

        // F6.5.2
        let sign_coe = if arc.flags.large_arc == arc.flags.sweep {
            -S::ONE
        } else {
            S::ONE
        };
        let coe = sign_coe * ((rxry * rxry - sum_of_sq) / sum_of_sq).max(S::ZERO).sqrt();
        let transformed_cx = coe * rxpy / ry;
        let transformed_cy = -coe * rypx / rx;

        // F6.5.3
        let center = point(
            cos_phi * transformed_cx - sin_phi * transformed_cy + hs_x,
            sin_phi * transformed_cx + cos_phi * transformed_cy + hs_y,
        );

        // F6.5.5
        let start = vector((p.x - transformed_cx) / rx, (p.y - transformed_cy) / ry);
        let end = vector((-p.x - transformed_cx) / rx, (-p.y - transformed_cy) / ry);

        let start_angle = start.y.atan2(start.x);

        // F6.5.6
        let mut sweep_angle = start.cross(end).atan2(start.dot(end));
        let two_pi = S::TWO * S::PI();
        if arc.flags.sweep && sweep_angle < S::ZERO {
            sweep_angle += two_pi;
        } else if !arc.flags.sweep && sweep_angle > S::ZERO {
            sweep_angle -= two_pi;
        }

        Arc {
            center,
            radii: vector(rx, ry),
            start_angle: Angle::radians(start_angle),
            sweep_angle: Angle::radians(sweep_angle),
            x_rotation: arc.x_rotation,
        }
    }

    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: S) -> Point<S> {
        self.point_at_angle(self.start_angle.radians + self.sweep_angle.radians * t)
    }

    #[inline]
    pub fn from(&self) -> Point<S> {
        self.sample(S::ZERO)
    }

    #[inline]
    pub fn to(&self) -> Point<S> {
        self.sample(S::ONE)
    }

    fn point_at_angle(&self, angle: S) -> Point<S> {
        let (sin, cos) = angle.sin_cos();
        self.center + self.rotate(vector(self.radii.x * cos, self.radii.y * sin))
    }

    // Derivative with respect to the angle.
    fn tangent_at_angle(&self, angle: S) -> Vector<S> {
        let (sin, cos) = angle.sin_cos();
        self.rotate(vector(-self.radii.x * sin, self.radii.y * cos))
    }

    fn rotate(&self, v: Vector<S>) -> Vector<S> {
        let (sin, cos) = self.x_rotation.radians.sin_cos();
        vector(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
    }

    /// Approximates the arc with cubic bézier segments spanning at most 120 degrees each.
    ///
    /// Each sub-arc of angle `δ` uses control points at a distance of
    /// `4/3 * tan(δ/4)` times the tangent from its endpoints.
    pub fn for_each_cubic_bezier<F>(&self, cb: &mut F)
    where
        F: FnMut(&CubicBezierSegment<S>),
    {
        self.for_each_cubic_bezier_between(self.from(), self.to(), cb);
    }

    // Same as for_each_cubic_bezier but snaps the first and last endpoints to
    // the provided points, so that float error does not open gaps in a path.
    fn for_each_cubic_bezier_between<F>(&self, first: Point<S>, last: Point<S>, cb: &mut F)
    where
        F: FnMut(&CubicBezierSegment<S>),
    {
        let max_step = S::TWO * S::PI() / S::THREE;
        let sweep = self.sweep_angle.radians;
        // The small bias keeps float error from adding a sliver segment.
        let count = (sweep.abs() / max_step - S::value(1.0e-4)).ceil().max(S::ONE);
        let n = count.to_u32().unwrap_or(1).max(1);
        let step = sweep / count;
        let k = S::FOUR / S::THREE * (step / S::FOUR).tan();

        let mut a0 = self.start_angle.radians;
        let mut from = first;
        for i in 0..n {
            let a1 = if i + 1 == n {
                self.start_angle.radians + sweep
            } else {
                a0 + step
            };
            let to = if i + 1 == n {
                last
            } else {
                self.point_at_angle(a1)
            };

            cb(&CubicBezierSegment {
                from,
                ctrl1: from + self.tangent_at_angle(a0) * k,
                ctrl2: to - self.tangent_at_angle(a1) * k,
                to,
            });

            a0 = a1;
            from = to;
        }
    }
}

#[cfg(test)]
use std::vec::Vec;

#[cfg(test)]
fn approx_eq(a: Point<f64>, b: Point<f64>) -> bool {
    (a - b).length() < 1e-6
}

#[test]
fn from_svg_arc_center() {
    let arc: Arc<f64> = SvgArc {
        from: point(10.0, 0.0),
        to: point(-10.0, 0.0),
        radii: vector(10.0, 10.0),
        x_rotation: Angle::radians(0.0),
        flags: ArcFlags {
            large_arc: true,
            sweep: true,
        },
    }
    .to_arc();

    assert!(approx_eq(arc.center, point(0.0, 0.0)));
    assert!((arc.sweep_angle.radians - core::f64::consts::PI).abs() < 1e-9);
    assert!(approx_eq(arc.from(), point(10.0, 0.0)));
    assert!(approx_eq(arc.to(), point(-10.0, 0.0)));
    // Sweeping in the positive direction passes through +y.
    assert!(approx_eq(arc.sample(0.5), point(0.0, 10.0)));
}

#[test]
fn radii_are_scaled_up_when_too_small() {
    let arc: Arc<f64> = SvgArc {
        from: point(0.0, 0.0),
        to: point(20.0, 0.0),
        radii: vector(2.0, 2.0),
        x_rotation: Angle::radians(0.0),
        flags: ArcFlags::default(),
    }
    .to_arc();

    assert!((arc.radii.x - 10.0).abs() < 1e-9);
    assert!(approx_eq(arc.center, point(10.0, 0.0)));
    assert!(approx_eq(arc.to(), point(20.0, 0.0)));
}

#[test]
fn small_and_large_arcs() {
    let make = |large_arc, sweep| -> Arc<f64> {
        SvgArc {
            from: point(0.0, 0.0),
            to: point(10.0, 0.0),
            radii: vector(10.0, 10.0),
            x_rotation: Angle::radians(0.0),
            flags: ArcFlags { large_arc, sweep },
        }
        .to_arc()
    };

    let pi = core::f64::consts::PI;
    assert!(make(false, true).sweep_angle.radians.abs() < pi);
    assert!(make(true, true).sweep_angle.radians.abs() > pi);
    assert!(make(false, false).sweep_angle.radians < 0.0);
    assert!(make(true, true).sweep_angle.radians > 0.0);
}

#[test]
fn cubic_approximation_of_a_circle() {
    let circle: Arc<f64> = Arc::circle(point(5.0, 5.0), 10.0);
    let mut curves = Vec::new();
    circle.for_each_cubic_bezier(&mut |c| curves.push(*c));

    // 360 degrees in pieces of at most 120 degrees.
    assert_eq!(curves.len(), 3);
    for w in curves.windows(2) {
        assert_eq!(w[0].to, w[1].from);
    }
    for c in &curves {
        for i in 0..=10 {
            let d = (c.sample(i as f64 / 10.0) - point(5.0, 5.0)).length();
            assert!((d - 10.0).abs() < 0.05, "radius error {}", d - 10.0);
        }
    }
}

#[test]
fn degenerate_svg_arcs() {
    let mut curves = Vec::new();
    let line = SvgArc {
        from: point(0.0, 0.0),
        to: point(10.0, 5.0),
        radii: vector(0.0, 4.0),
        x_rotation: Angle::radians(0.0),
        flags: ArcFlags::default(),
    };
    line.for_each_cubic_bezier(&mut |c| curves.push(*c));
    assert_eq!(curves.len(), 1);
    assert_eq!(curves[0].ctrl1, point(0.0, 0.0));
    assert_eq!(curves[0].ctrl2, point(10.0, 5.0));

    curves.clear();
    let empty = SvgArc {
        from: point(3.0, 3.0),
        to: point(3.0, 3.0),
        radii: vector(4.0, 4.0),
        x_rotation: Angle::radians(0.0),
        flags: ArcFlags::default(),
    };
    empty.for_each_cubic_bezier(&mut |c| curves.push(*c));
    assert!(curves.is_empty());
}
