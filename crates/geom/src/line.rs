use crate::scalar::Scalar;
use crate::{Point, Vector};

/// A linear segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct LineSegment<S> {
    pub from: Point<S>,
    pub to: Point<S>,
}

impl<S: Scalar> LineSegment<S> {
    /// Sample the segment at t (expecting t between 0 and 1).
    #[inline]
    pub fn sample(&self, t: S) -> Point<S> {
        self.from.lerp(self.to, t)
    }

    /// Returns an inverted version of this segment where the beginning and the end
    /// points are swapped.
    #[inline]
    pub fn flip(&self) -> Self {
        LineSegment {
            from: self.to,
            to: self.from,
        }
    }

    #[inline]
    pub fn to_vector(&self) -> Vector<S> {
        self.to - self.from
    }

    /// Computes the length of this segment.
    #[inline]
    pub fn length(&self) -> S {
        self.to_vector().length()
    }

    /// Computes the squared length of this segment.
    #[inline]
    pub fn square_length(&self) -> S {
        self.to_vector().square_length()
    }

    #[inline]
    pub fn mid_point(&self) -> Point<S> {
        (self.from + self.to.to_vector()) / S::TWO
    }

    /// Returns the point of the segment that is closest to `p`.
    ///
    /// Degenerate segments (where both endpoints are equal) return their start point.
    pub fn closest_point(&self, p: Point<S>) -> Point<S> {
        let v = self.to_vector();
        let square_length = v.square_length();
        if square_length == S::ZERO {
            return self.from;
        }

        let t = (p - self.from).dot(v) / square_length;
        if t <= S::ZERO {
            self.from
        } else if t >= S::ONE {
            self.to
        } else {
            self.from + v * t
        }
    }

    /// Squared distance between `p` and the closest point of the segment.
    #[inline]
    pub fn square_distance_to_point(&self, p: Point<S>) -> S {
        (self.closest_point(p) - p).square_length()
    }

    #[inline]
    pub fn distance_to_point(&self, p: Point<S>) -> S {
        self.square_distance_to_point(p).sqrt()
    }
}

#[cfg(test)]
use crate::point;

#[test]
fn distance_to_point() {
    let l = LineSegment {
        from: point(0.0f32, 0.0),
        to: point(10.0, 0.0),
    };

    assert_eq!(l.distance_to_point(point(5.0, 3.0)), 3.0);
    assert_eq!(l.distance_to_point(point(-4.0, 3.0)), 5.0);
    assert_eq!(l.distance_to_point(point(13.0, 4.0)), 5.0);
    assert_eq!(l.square_distance_to_point(point(2.0, -2.0)), 4.0);

    let degenerate = LineSegment {
        from: point(1.0f32, 1.0),
        to: point(1.0, 1.0),
    };
    assert_eq!(degenerate.distance_to_point(point(4.0, 5.0)), 5.0);
}

#[test]
fn mid_point() {
    let l = LineSegment {
        from: point(2.0f64, -2.0),
        to: point(4.0, 6.0),
    };
    assert_eq!(l.mid_point(), point(3.0, 2.0));
    assert_eq!(l.sample(0.5), point(3.0, 2.0));
    assert_eq!(l.flip().from, point(4.0, 6.0));
}
