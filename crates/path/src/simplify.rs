//! Polyline simplification.
//!
//! A radial distance pass removes points that are too close to the previous kept
//! point, then a Ramer-Douglas-Peucker pass removes points that are too close to
//! the chord of the range they belong to.

use crate::geom::LineSegment;
use crate::math::Point;

/// Simplifies a polyline, keeping its first and last points.
///
/// `tolerance` is a distance in the same unit as the coordinates. Both passes are
/// repeated until they stop removing points, so that the result is a fix point:
/// `simplify(&simplify(p, t), t) == simplify(p, t)`.
pub fn simplify(points: &[Point], tolerance: f32) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let square_tolerance = tolerance * tolerance;
    let mut result = points.to_vec();
    loop {
        let n = result.len();
        result = simplify_radial_distance(&result, square_tolerance);
        result = simplify_douglas_peucker(&result, square_tolerance);

        if result.len() == n || result.len() <= 2 {
            return result;
        }
    }
}

/// Keeps a point only if it is farther than the tolerance from the last kept point.
///
/// The first and last points are always kept. When a point is within the
/// tolerance of the last kept point but turns more sharply, it takes that
/// point's place, so corners are not replaced by nearby curve samples.
pub fn simplify_radial_distance(points: &[Point], square_tolerance: f32) -> Vec<Point> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }

    let mut output = Vec::with_capacity(n);
    output.push(points[0]);

    // Index of the last kept point.
    let mut kept = 0;
    for i in 1..n - 1 {
        let p = points[i];
        if (p - points[kept]).square_length() > square_tolerance {
            output.push(p);
            kept = i;
        } else if kept != 0 && turn_angle(points, i) > turn_angle(points, kept) {
            if let Some(last) = output.last_mut() {
                *last = p;
            }
            kept = i;
        }
    }

    output.push(points[n - 1]);

    output
}

// Absolute angle between the incoming and outgoing edges of an interior point.
fn turn_angle(points: &[Point], i: usize) -> f32 {
    let incoming = points[i] - points[i - 1];
    let outgoing = points[i + 1] - points[i];
    incoming.cross(outgoing).atan2(incoming.dot(outgoing)).abs()
}

/// Ramer-Douglas-Peucker simplification with squared distances to the chord segment.
pub fn simplify_douglas_peucker(points: &[Point], square_tolerance: f32) -> Vec<Point> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0, n - 1)];
    while let Some((first, last)) = stack.pop() {
        let chord = LineSegment {
            from: points[first],
            to: points[last],
        };

        let mut max_dist = square_tolerance;
        let mut index = None;
        for (i, p) in points.iter().enumerate().take(last).skip(first + 1) {
            let d = chord.square_distance_to_point(*p);
            if d > max_dist {
                max_dist = d;
                index = Some(i);
            }
        }

        if let Some(index) = index {
            keep[index] = true;
            if index - first > 1 {
                stack.push((first, index));
            }
            if last - index > 1 {
                stack.push((index, last));
            }
        }
    }

    points
        .iter()
        .zip(keep.iter())
        .filter(|(_, keep)| **keep)
        .map(|(p, _)| *p)
        .collect()
}

#[cfg(test)]
use crate::math::point;

#[cfg(test)]
fn zigzag(n: usize, amplitude: f32) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let x = i as f32 * 0.7;
            let y = (i as f32 * 1.3).sin() * amplitude + (i % 3) as f32 * 0.2;
            point(x, y)
        })
        .collect()
}

#[test]
fn keeps_endpoints_and_never_grows() {
    for &tolerance in &[0.0, 0.1, 0.5, 1.0, 3.0, 50.0] {
        for n in 0..40 {
            let points = zigzag(n, 2.0);
            let simplified = simplify(&points, tolerance);
            assert!(simplified.len() <= points.len());
            if n > 0 {
                assert_eq!(simplified[0], points[0]);
                assert_eq!(simplified.last(), points.last());
            }
        }
    }
}

#[test]
fn idempotent() {
    for &tolerance in &[0.0, 0.05, 0.3, 1.0, 2.5] {
        for &amplitude in &[0.1, 1.0, 4.0] {
            let points = zigzag(60, amplitude);
            let once = simplify(&points, tolerance);
            let twice = simplify(&once, tolerance);
            assert_eq!(once, twice);
        }
    }
}

#[test]
fn collinear_points_are_removed() {
    let points: Vec<Point> = (0..11).map(|i| point(i as f32, 0.0)).collect();
    assert_eq!(
        simplify(&points, 0.1),
        vec![point(0.0, 0.0), point(10.0, 0.0)]
    );
}

#[test]
fn radial_pass() {
    let points = vec![
        point(0.0, 0.0),
        point(0.5, 0.0),
        point(2.0, 0.0),
        point(2.5, 0.0),
        point(2.6, 0.0),
    ];
    assert_eq!(
        simplify_radial_distance(&points, 1.0),
        vec![point(0.0, 0.0), point(2.0, 0.0), point(2.6, 0.0)]
    );
}

#[test]
fn corners_win_over_nearby_samples() {
    // A sample just before the corner.
    let before = vec![
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(19.95, 0.0),
        point(20.0, 0.0),
        point(20.0, 10.0),
    ];
    assert_eq!(
        simplify_radial_distance(&before, 0.01),
        vec![point(0.0, 0.0), point(10.0, 0.0), point(20.0, 0.0), point(20.0, 10.0)]
    );
    assert_eq!(
        simplify(&before, 0.1),
        vec![point(0.0, 0.0), point(20.0, 0.0), point(20.0, 10.0)]
    );

    // A sample just after the corner.
    let after = vec![
        point(0.0, 0.0),
        point(20.0, 0.0),
        point(20.0, 0.05),
        point(20.0, 10.0),
    ];
    assert_eq!(
        simplify(&after, 0.1),
        vec![point(0.0, 0.0), point(20.0, 0.0), point(20.0, 10.0)]
    );
}

#[test]
fn douglas_peucker_keeps_far_points() {
    let points = vec![
        point(0.0, 0.0),
        point(5.0, 2.4),
        point(10.0, 5.0),
        point(15.0, 2.6),
        point(20.0, 0.0),
    ];
    assert_eq!(
        simplify_douglas_peucker(&points, 1.0),
        vec![point(0.0, 0.0), point(10.0, 5.0), point(20.0, 0.0)]
    );
}

#[test]
fn zero_tolerance_removes_duplicates_only() {
    let points = vec![
        point(0.0, 0.0),
        point(1.0, 1.0),
        point(1.0, 1.0),
        point(2.0, 0.0),
    ];
    assert_eq!(
        simplify(&points, 0.0),
        vec![point(0.0, 0.0), point(1.0, 1.0), point(2.0, 0.0)]
    );
}
