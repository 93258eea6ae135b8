//! Adaptive flattening of cubic bézier curves.
//!
//! The curve is recursively split at its midpoint. At each level the flatness is
//! estimated from the distance of the control points to the chord, with special
//! handling when one or both control points are collinear with the endpoints.

use crate::scalar::Scalar;
use crate::{CubicBezierSegment, Point};

/// Parameters controlling the adaptive cubic flattener.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FlatteningOptions<S> {
    /// Maximum distance between the curve and its approximation, before scaling.
    ///
    /// Default value: `1.0`.
    pub path_epsilon: S,

    /// The distance tolerance is `path_epsilon / scale`.
    ///
    /// Default value: `1.0`.
    pub scale: S,

    /// Maximum sum of the turning angles (in radians) of a flat piece.
    ///
    /// Values below `FlatteningOptions::angle_tolerance_epsilon()` disable the angle test.
    ///
    /// Default value: `0.0`.
    pub angle_tolerance: S,

    /// Turning angle (in radians) above which a piece is considered a cusp.
    ///
    /// Zero disables cusp handling.
    ///
    /// Default value: `0.0`.
    pub cusp_limit: S,

    /// Maximum recursion depth.
    ///
    /// Default value: `FlatteningOptions::DEFAULT_RECURSION_LIMIT`.
    pub recursion_limit: u32,
}

impl<S: Scalar> FlatteningOptions<S> {
    pub const DEFAULT_RECURSION_LIMIT: u32 = 8;

    pub fn default_path_epsilon() -> S {
        S::ONE
    }

    pub fn angle_tolerance_epsilon() -> S {
        S::value(0.01)
    }

    /// The default options with a given distance tolerance.
    pub fn tolerance(path_epsilon: S) -> Self {
        FlatteningOptions {
            path_epsilon,
            scale: S::ONE,
            angle_tolerance: S::ZERO,
            cusp_limit: S::ZERO,
            recursion_limit: Self::DEFAULT_RECURSION_LIMIT,
        }
    }

    #[inline]
    pub fn with_scale(mut self, scale: S) -> Self {
        self.scale = scale;
        self
    }

    #[inline]
    pub fn with_angle_tolerance(mut self, angle: S) -> Self {
        self.angle_tolerance = angle;
        self
    }

    #[inline]
    pub fn with_cusp_limit(mut self, angle: S) -> Self {
        self.cusp_limit = angle;
        self
    }

    #[inline]
    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Squared distance tolerance used by the flatness tests.
    #[inline]
    pub fn square_distance_tolerance(&self) -> S {
        let d = self.path_epsilon / self.scale;
        d * d
    }
}

impl<S: Scalar> Default for FlatteningOptions<S> {
    fn default() -> Self {
        Self::tolerance(Self::default_path_epsilon())
    }
}

struct Flattener<'l, S, F> {
    square_tolerance: S,
    angle_tolerance: S,
    cusp_limit: S,
    recursion_limit: u32,
    output: &'l mut F,
}

pub(crate) fn flatten_cubic_bezier_adaptive<S: Scalar, F>(
    curve: &CubicBezierSegment<S>,
    options: &FlatteningOptions<S>,
    callback: &mut F,
) where
    F: FnMut(Point<S>),
{
    callback(curve.from);

    let mut flattener = Flattener {
        square_tolerance: options.square_distance_tolerance(),
        angle_tolerance: options.angle_tolerance,
        cusp_limit: options.cusp_limit,
        recursion_limit: options.recursion_limit,
        output: &mut *callback,
    };
    flattener.recurse(curve.from, curve.ctrl1, curve.ctrl2, curve.to, 0);

    callback(curve.to);
}

// Absolute difference between two directions, folded into [0, pi].
fn angle_between<S: Scalar>(a: S, b: S) -> S {
    let mut da = (a - b).abs();
    if da >= S::PI() {
        da = S::TWO * S::PI() - da;
    }
    da
}

impl<'l, S: Scalar, F: FnMut(Point<S>)> Flattener<'l, S, F> {
    fn angle_test_disabled(&self) -> bool {
        self.angle_tolerance < FlatteningOptions::<S>::angle_tolerance_epsilon()
    }

    fn recurse(&mut self, p1: Point<S>, p2: Point<S>, p3: Point<S>, p4: Point<S>, level: u32) {
        if level > self.recursion_limit {
            return;
        }

        let p12 = p1.lerp(p2, S::HALF);
        let p23 = p2.lerp(p3, S::HALF);
        let p34 = p3.lerp(p4, S::HALF);
        let p123 = p12.lerp(p23, S::HALF);
        let p234 = p23.lerp(p34, S::HALF);
        let p1234 = p123.lerp(p234, S::HALF);

        if level > 0 && self.try_emit_flat(p1, p2, p3, p4, p1234) {
            return;
        }

        self.recurse(p1, p12, p123, p1234, level + 1);
        self.recurse(p1234, p234, p34, p4, level + 1);
    }

    // Returns true if the piece is flat enough and its approximation was emitted.
    fn try_emit_flat(
        &mut self,
        p1: Point<S>,
        p2: Point<S>,
        p3: Point<S>,
        p4: Point<S>,
        mid: Point<S>,
    ) -> bool {
        let eps = S::EPSILON;
        let d = p4 - p1;
        let chord_sq = d.x * d.x + d.y * d.y;
        let d2 = ((p2.x - p4.x) * d.y - (p2.y - p4.y) * d.x).abs();
        let d3 = ((p3.x - p4.x) * d.y - (p3.y - p4.y) * d.x).abs();

        let dir = |a: Point<S>, b: Point<S>| (b.y - a.y).atan2(b.x - a.x);

        if d2 > eps && d3 > eps {
            if (d2 + d3) * (d2 + d3) > self.square_tolerance * chord_sq {
                return false;
            }
            if self.angle_test_disabled() {
                (self.output)(mid);
                return true;
            }

            let a23 = dir(p2, p3);
            let da1 = angle_between(a23, dir(p1, p2));
            let da2 = angle_between(dir(p3, p4), a23);

            if da1 + da2 < self.angle_tolerance {
                (self.output)(mid);
                return true;
            }

            if self.cusp_limit != S::ZERO {
                if da1 > self.cusp_limit {
                    (self.output)(p2);
                    return true;
                }
                if da2 > self.cusp_limit {
                    (self.output)(p3);
                    return true;
                }
            }

            return false;
        }

        if d2 > eps || d3 > eps {
            // One control point is collinear with the endpoints.
            let (dist, da1) = if d2 > eps {
                (d2, angle_between(dir(p2, p3), dir(p1, p2)))
            } else {
                (d3, angle_between(dir(p3, p4), dir(p2, p3)))
            };

            if dist * dist > self.square_tolerance * chord_sq {
                return false;
            }
            if self.angle_test_disabled() {
                (self.output)(mid);
                return true;
            }
            if da1 < self.angle_tolerance {
                (self.output)(p2);
                (self.output)(p3);
                return true;
            }
            if self.cusp_limit != S::ZERO && da1 > self.cusp_limit {
                (self.output)(if d2 > eps { p2 } else { p3 });
                return true;
            }

            return false;
        }

        // Fully collinear, or a degenerate chord.
        let (d2, d3) = if chord_sq == S::ZERO {
            let d2 = (p2 - p1).square_length();
            let d3 = (p3 - p4).square_length();
            if d2 == S::ZERO && d3 == S::ZERO {
                // A single point.
                return true;
            }
            (d2, d3)
        } else {
            let t2 = (p2 - p1).dot(d) / chord_sq;
            let t3 = (p3 - p1).dot(d) / chord_sq;
            let inside = |t: S| t >= S::ZERO && t <= S::ONE;
            if inside(t2) && inside(t3) {
                // Both control points lie on the chord, the endpoints are enough.
                return true;
            }
            (
                square_distance_to_chord(p1, p4, p2, t2),
                square_distance_to_chord(p1, p4, p3, t3),
            )
        };

        if d2 > d3 {
            if d2 < self.square_tolerance {
                (self.output)(p2);
                return true;
            }
        } else if d3 < self.square_tolerance {
            (self.output)(p3);
            return true;
        }

        false
    }
}

// Squared distance from `p` to the chord `from..to`, where `t` is the
// parameter of the projection of `p` on the chord's line.
fn square_distance_to_chord<S: Scalar>(from: Point<S>, to: Point<S>, p: Point<S>, t: S) -> S {
    if t <= S::ZERO {
        (p - from).square_length()
    } else if t >= S::ONE {
        (p - to).square_length()
    } else {
        (p - from.lerp(to, t)).square_length()
    }
}

#[cfg(test)]
use crate::point;
#[cfg(test)]
use std::vec::Vec;

#[cfg(test)]
fn flatten(curve: &CubicBezierSegment<f64>, options: &FlatteningOptions<f64>) -> Vec<Point<f64>> {
    let mut points = Vec::new();
    curve.for_each_flattened_adaptive(options, &mut |p| points.push(p));
    points
}

#[test]
fn flattened_points_stay_close_to_the_curve() {
    let curve = CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(0.0, 100.0),
        ctrl2: point(100.0, 100.0),
        to: point(100.0, 0.0),
    };

    for &tolerance in &[2.0, 0.5, 0.1] {
        let points = flatten(&curve, &FlatteningOptions::tolerance(tolerance));
        assert_eq!(points[0], curve.from);
        assert_eq!(*points.last().unwrap(), curve.to);
        assert!(points.len() > 3);

        // Every emitted point lies on (or within tolerance of) the curve.
        for p in &points {
            let mut best = f64::MAX;
            for i in 0..=2000 {
                let d = (curve.sample(i as f64 / 2000.0) - *p).length();
                best = best.min(d);
            }
            assert!(best <= tolerance, "{:?} is {} away from the curve", p, best);
        }

        // Every point of the curve is close to the polyline.
        for i in 0..=200 {
            let c = curve.sample(i as f64 / 200.0);
            let mut best = f64::MAX;
            for w in points.windows(2) {
                let segment = crate::LineSegment { from: w[0], to: w[1] };
                best = best.min(segment.distance_to_point(c));
            }
            assert!(best <= 2.0 * tolerance, "curve point {:?} is {} away", c, best);
        }
    }
}

#[test]
fn smaller_tolerance_produces_more_points() {
    let curve = CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(30.0, 80.0),
        ctrl2: point(70.0, -80.0),
        to: point(100.0, 0.0),
    };

    let coarse = flatten(&curve, &FlatteningOptions::tolerance(4.0));
    let fine = flatten(&curve, &FlatteningOptions::tolerance(0.05));
    assert!(fine.len() > coarse.len());

    let scaled = flatten(&curve, &FlatteningOptions::tolerance(4.0).with_scale(80.0));
    assert!(scaled.len() > coarse.len());
}

#[test]
fn straight_cubic_flattens_to_few_points() {
    let curve = CubicBezierSegment::from_line(point(0.0, 0.0), point(10.0, 0.0));
    let points = flatten(&curve, &FlatteningOptions::default());
    assert_eq!(points, [point(0.0, 0.0), point(10.0, 0.0)]);
}

#[test]
fn straight_cubic_keeps_only_its_endpoints_at_any_tolerance() {
    // Control points on the endpoints, or spread along the chord.
    let curves = [
        CubicBezierSegment::from_line(point(0.0, 0.0), point(30.0, 0.0)),
        CubicBezierSegment::from_line(point(30.0, 0.0), point(30.0, 30.0)),
        CubicBezierSegment::from_line(point(0.0, 0.0), point(10.0, 10.0)),
        CubicBezierSegment {
            from: point(0.0, 0.0),
            ctrl1: point(10.0, 0.0),
            ctrl2: point(20.0, 0.0),
            to: point(30.0, 0.0),
        },
    ];
    for curve in &curves {
        for &tolerance in &[1.0, 0.1, 0.01] {
            let points = flatten(curve, &FlatteningOptions::tolerance(tolerance));
            assert_eq!(points, [curve.from, curve.to]);
        }
    }
}

#[test]
fn point_cubic_adds_no_samples() {
    let curve = CubicBezierSegment::from_line(point(3.0, 4.0), point(3.0, 4.0));
    let points = flatten(&curve, &FlatteningOptions::tolerance(0.1));
    assert_eq!(points, [point(3.0, 4.0), point(3.0, 4.0)]);
}

#[test]
fn collinear_overshoot_keeps_the_turning_point() {
    // The curve runs past `to` along the chord before coming back.
    let curve = CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(40.0, 0.0),
        ctrl2: point(40.0, 0.0),
        to: point(10.0, 0.0),
    };
    let points = flatten(&curve, &FlatteningOptions::tolerance(0.1));
    assert_eq!(points[0], curve.from);
    assert_eq!(*points.last().unwrap(), curve.to);
    let max_x = points.iter().fold(0.0f64, |m, p| m.max(p.x));
    assert!(max_x > 25.0, "{:?}", points);
    for p in &points {
        assert_eq!(p.y, 0.0);
    }
}

#[test]
fn recursion_limit_bounds_output() {
    let curve = CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(0.0, 1.0e6),
        ctrl2: point(1.0e6, 1.0e6),
        to: point(1.0e6, 0.0),
    };
    let points = flatten(&curve, &FlatteningOptions::tolerance(1.0e-6));
    // At most one point per leaf of a tree of depth limit + 1, plus both endpoints.
    assert!(points.len() <= (1 << (FlatteningOptions::<f64>::DEFAULT_RECURSION_LIMIT + 1)) + 2);
}

#[test]
fn angle_tolerance_limits_turning() {
    let curve = CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(0.0, 50.0),
        ctrl2: point(50.0, 50.0),
        to: point(50.0, 0.0),
    };
    let plain = flatten(&curve, &FlatteningOptions::tolerance(1.0));
    let with_angle = flatten(
        &curve,
        &FlatteningOptions::tolerance(1.0).with_angle_tolerance(0.05),
    );
    assert!(with_angle.len() >= plain.len());
}
