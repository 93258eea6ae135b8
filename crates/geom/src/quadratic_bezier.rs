use crate::scalar::Scalar;
use crate::{CubicBezierSegment, LineSegment, Point};

/// A 2d curve segment defined by three points: the beginning of the segment, a control
/// point and the end of the segment.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = (1 - t)² * from + 2 * (1 - t) * t * ctrl + t² * to```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct QuadraticBezierSegment<S> {
    pub from: Point<S>,
    pub ctrl: Point<S>,
    pub to: Point<S>,
}

impl<S: Scalar> QuadraticBezierSegment<S> {
    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: S) -> Point<S> {
        let t2 = t * t;
        let one_t = S::ONE - t;
        let one_t2 = one_t * one_t;

        self.from * one_t2 + self.ctrl.to_vector() * S::TWO * one_t * t + self.to.to_vector() * t2
    }

    /// Elevate this curve to a third order bézier.
    ///
    /// The resulting cubic describes exactly the same curve.
    pub fn to_cubic(&self) -> CubicBezierSegment<S> {
        let two_thirds = S::TWO / S::THREE;
        CubicBezierSegment {
            from: self.from,
            ctrl1: self.from + (self.ctrl - self.from) * two_thirds,
            ctrl2: self.to + (self.ctrl - self.to) * two_thirds,
            to: self.to,
        }
    }

    #[inline]
    pub fn baseline(&self) -> LineSegment<S> {
        LineSegment {
            from: self.from,
            to: self.to,
        }
    }
}

#[cfg(test)]
use crate::point;

#[test]
fn to_cubic_preserves_the_curve() {
    let quadratic = QuadraticBezierSegment {
        from: point(0.0f64, 0.0),
        ctrl: point(6.0, 9.0),
        to: point(12.0, 0.0),
    };
    let cubic = quadratic.to_cubic();

    assert_eq!(cubic.from, quadratic.from);
    assert_eq!(cubic.to, quadratic.to);
    assert!((cubic.ctrl1 - point(4.0, 6.0)).length() < 1e-12);
    assert!((cubic.ctrl2 - point(8.0, 6.0)).length() < 1e-12);

    for i in 0..=10 {
        let t = i as f64 / 10.0;
        assert!((cubic.sample(t) - quadratic.sample(t)).length() < 1e-9);
    }
}
