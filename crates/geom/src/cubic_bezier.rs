use crate::flatten_cubic::{flatten_cubic_bezier_adaptive, FlatteningOptions};
use crate::scalar::Scalar;
use crate::{LineSegment, Point};

/// A 2d curve segment defined by four points: the beginning of the segment, two control
/// points and the end of the segment.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = (1 - t)³ * from + 3 * (1 - t)² * t * ctrl1 + 3 * t² * (1 - t) * ctrl2 + t³ * to```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CubicBezierSegment<S> {
    pub from: Point<S>,
    pub ctrl1: Point<S>,
    pub ctrl2: Point<S>,
    pub to: Point<S>,
}

impl<S: Scalar> CubicBezierSegment<S> {
    /// A cubic segment that describes the straight line between two points.
    ///
    /// The control points sit on the endpoints.
    pub fn from_line(from: Point<S>, to: Point<S>) -> Self {
        CubicBezierSegment {
            from,
            ctrl1: from,
            ctrl2: to,
            to,
        }
    }

    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: S) -> Point<S> {
        let t2 = t * t;
        let t3 = t2 * t;
        let one_t = S::ONE - t;
        let one_t2 = one_t * one_t;
        let one_t3 = one_t2 * one_t;

        self.from * one_t3
            + self.ctrl1.to_vector() * S::THREE * one_t2 * t
            + self.ctrl2.to_vector() * S::THREE * one_t * t2
            + self.to.to_vector() * t3
    }

    /// Split this curve into two sub-curves.
    pub fn split(&self, t: S) -> (CubicBezierSegment<S>, CubicBezierSegment<S>) {
        let ctrl1a = self.from + (self.ctrl1 - self.from) * t;
        let ctrl2a = self.ctrl1 + (self.ctrl2 - self.ctrl1) * t;
        let ctrl1aa = ctrl1a + (ctrl2a - ctrl1a) * t;
        let ctrl3a = self.ctrl2 + (self.to - self.ctrl2) * t;
        let ctrl2aa = ctrl2a + (ctrl3a - ctrl2a) * t;
        let ctrl1aaa = ctrl1aa + (ctrl2aa - ctrl1aa) * t;

        (
            CubicBezierSegment {
                from: self.from,
                ctrl1: ctrl1a,
                ctrl2: ctrl1aa,
                to: ctrl1aaa,
            },
            CubicBezierSegment {
                from: ctrl1aaa,
                ctrl1: ctrl2aa,
                ctrl2: ctrl3a,
                to: self.to,
            },
        )
    }

    #[inline]
    pub fn baseline(&self) -> LineSegment<S> {
        LineSegment {
            from: self.from,
            to: self.to,
        }
    }

    /// Approximates the curve with a sequence of points using recursive midpoint
    /// subdivision.
    ///
    /// The callback receives the start point first and the end point last, with the
    /// subdivision points in between, so consecutive points form the polyline.
    pub fn for_each_flattened_adaptive<F>(&self, options: &FlatteningOptions<S>, callback: &mut F)
    where
        F: FnMut(Point<S>),
    {
        flatten_cubic_bezier_adaptive(self, options, callback);
    }
}

#[cfg(test)]
use crate::point;

#[test]
fn split_matches_sample() {
    let curve = CubicBezierSegment {
        from: point(0.0f64, 0.0),
        ctrl1: point(2.0, 8.0),
        ctrl2: point(9.0, -3.0),
        to: point(12.0, 4.0),
    };

    let (a, b) = curve.split(0.5);
    assert_eq!(a.from, curve.from);
    assert_eq!(b.to, curve.to);
    assert!((a.to - curve.sample(0.5)).length() < 1e-12);
    assert!((a.sample(0.5) - curve.sample(0.25)).length() < 1e-12);
    assert!((b.sample(0.5) - curve.sample(0.75)).length() < 1e-12);
}

#[test]
fn from_line_is_straight() {
    let line = CubicBezierSegment::from_line(point(1.0f32, 1.0), point(5.0, 3.0));
    for i in 0..=4 {
        let p = line.sample(i as f32 / 4.0);
        assert!(line.baseline().distance_to_point(p) < 1e-5);
    }
}
