//! Geometric predicates on vertices projected on the sweep plane.
//!
//! Coordinates are `(s, t)` pairs. The sweep goes in increasing `s` order, ties
//! broken by increasing `t`.

pub(crate) type St = (f64, f64);

#[inline]
pub(crate) fn vert_leq(u: St, v: St) -> bool {
    u.0 < v.0 || (u.0 == v.0 && u.1 <= v.1)
}

#[inline]
pub(crate) fn trans_leq(u: St, v: St) -> bool {
    u.1 < v.1 || (u.1 == v.1 && u.0 <= v.0)
}

#[inline]
pub(crate) fn edge_goes_left(org: St, dst: St) -> bool {
    vert_leq(dst, org)
}

#[inline]
pub(crate) fn edge_goes_right(org: St, dst: St) -> bool {
    vert_leq(org, dst)
}

#[inline]
pub(crate) fn vert_l1_dist(u: St, v: St) -> f64 {
    (u.0 - v.0).abs() + (u.1 - v.1).abs()
}

/// Given three vertices `u`, `v`, `w` such that `vert_leq(u, v) && vert_leq(v, w)`,
/// evaluates the t-coord of the edge `uw` at the s-coord of the vertex `v`.
///
/// Returns `v.t - (uw)(v.s)`, the signed distance from `uw` to `v`.
/// If `uw` is vertical (and thus passes through `v`), the result is zero.
pub(crate) fn edge_eval(u: St, v: St, w: St) -> f64 {
    let gap_l = v.0 - u.0;
    let gap_r = w.0 - v.0;

    if gap_l + gap_r > 0.0 {
        if gap_l < gap_r {
            return (v.1 - u.1) + (u.1 - w.1) * (gap_l / (gap_l + gap_r));
        } else {
            return (v.1 - w.1) + (w.1 - u.1) * (gap_r / (gap_l + gap_r));
        }
    }

    0.0
}

/// Same sign as `edge_eval(u, v, w)` but cheaper to evaluate.
pub(crate) fn edge_sign(u: St, v: St, w: St) -> f64 {
    let gap_l = v.0 - u.0;
    let gap_r = w.0 - v.0;

    if gap_l + gap_r > 0.0 {
        return (v.1 - w.1) * gap_l + (v.1 - u.1) * gap_r;
    }

    0.0
}

// The same with the roles of s and t swapped.

fn trans_eval(u: St, v: St, w: St) -> f64 {
    edge_eval((u.1, u.0), (v.1, v.0), (w.1, w.0))
}

fn trans_sign(u: St, v: St, w: St) -> f64 {
    edge_sign((u.1, u.0), (v.1, v.0), (w.1, w.0))
}

/// True if the triangle `u`, `v`, `w` is counter-clockwise or degenerate.
#[inline]
pub(crate) fn vert_ccw(u: St, v: St, w: St) -> bool {
    u.0 * (v.1 - w.1) + v.0 * (w.1 - u.1) + w.0 * (u.1 - v.1) >= 0.0
}

// Interpolates between x and y with weights a and b. Negative weights are
// clamped to zero.
fn interpolate(a: f64, x: f64, b: f64, y: f64) -> f64 {
    let a = if a < 0.0 { 0.0 } else { a };
    let b = if b < 0.0 { 0.0 } else { b };
    if a <= b {
        if b == 0.0 {
            (x + y) / 2.0
        } else {
            x + (y - x) * (a / (a + b))
        }
    } else {
        y + (x - y) * (b / (a + b))
    }
}

/// Computes the intersection point of the edges `(o1, d1)` and `(o2, d2)`.
///
/// The computed point is guaranteed to lie in the intersection of the bounding
/// rectangles defined by each edge.
///
/// This is not the most efficient way to find the intersection of two line
/// segments, but it is very numerically stable: find the two middle vertices in
/// the `vert_leq` ordering and interpolate the intersection s-value from these,
/// then repeat using the `trans_leq` ordering to find the t-value.
pub(crate) fn edge_intersect(o1: St, d1: St, o2: St, d2: St) -> St {
    let s = intersect_coord(o1, d1, o2, d2, vert_leq, edge_eval, edge_sign, |p| p.0);
    let t = intersect_coord(o1, d1, o2, d2, trans_leq, trans_eval, trans_sign, |p| p.1);
    (s, t)
}

#[allow(clippy::too_many_arguments)]
fn intersect_coord(
    mut o1: St,
    mut d1: St,
    mut o2: St,
    mut d2: St,
    leq: fn(St, St) -> bool,
    eval: fn(St, St, St) -> f64,
    sign: fn(St, St, St) -> f64,
    coord: fn(St) -> f64,
) -> f64 {
    if !leq(o1, d1) {
        core::mem::swap(&mut o1, &mut d1);
    }
    if !leq(o2, d2) {
        core::mem::swap(&mut o2, &mut d2);
    }
    if !leq(o1, o2) {
        core::mem::swap(&mut o1, &mut o2);
        core::mem::swap(&mut d1, &mut d2);
    }

    if !leq(o2, d1) {
        // Technically, no intersection -- do our best.
        (coord(o2) + coord(d1)) / 2.0
    } else if leq(d1, d2) {
        // Interpolate between o2 and d1.
        let mut z1 = eval(o1, o2, d1);
        let mut z2 = eval(o2, d1, d2);
        if z1 + z2 < 0.0 {
            z1 = -z1;
            z2 = -z2;
        }
        interpolate(z1, coord(o2), z2, coord(d1))
    } else {
        // Interpolate between o2 and d2.
        let mut z1 = sign(o1, o2, d1);
        let mut z2 = -sign(o1, d2, d1);
        if z1 + z2 < 0.0 {
            z1 = -z1;
            z2 = -z2;
        }
        interpolate(z1, coord(o2), z2, coord(d2))
    }
}

#[inline]
pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Index of the component with the largest magnitude.
pub(crate) fn long_axis(v: [f64; 3]) -> usize {
    let mut i = 0;
    if v[1].abs() > v[0].abs() {
        i = 1;
    }
    if v[2].abs() > v[i].abs() {
        i = 2;
    }
    i
}

/// Index of the component with the smallest magnitude.
pub(crate) fn short_axis(v: [f64; 3]) -> usize {
    let mut i = 0;
    if v[1].abs() < v[0].abs() {
        i = 1;
    }
    if v[2].abs() < v[i].abs() {
        i = 2;
    }
    i
}

#[test]
fn ordering() {
    assert!(vert_leq((0.0, 0.0), (1.0, -5.0)));
    assert!(vert_leq((1.0, 0.0), (1.0, 1.0)));
    assert!(vert_leq((1.0, 1.0), (1.0, 1.0)));
    assert!(!vert_leq((1.0, 2.0), (1.0, 1.0)));

    assert!(trans_leq((5.0, 0.0), (0.0, 1.0)));
    assert!(!trans_leq((5.0, 1.0), (0.0, 1.0)));
}

#[test]
fn edge_evaluation() {
    // v is one unit above the horizontal edge uw.
    assert_eq!(edge_eval((0.0, 0.0), (1.0, 1.0), (4.0, 0.0)), 1.0);
    assert!(edge_sign((0.0, 0.0), (1.0, 1.0), (4.0, 0.0)) > 0.0);
    assert!(edge_sign((0.0, 0.0), (1.0, -1.0), (4.0, 0.0)) < 0.0);
    // On the edge.
    assert_eq!(edge_eval((0.0, 0.0), (2.0, 2.0), (4.0, 4.0)), 0.0);
    assert_eq!(edge_sign((0.0, 0.0), (2.0, 2.0), (4.0, 4.0)), 0.0);
    // Vertical edge.
    assert_eq!(edge_eval((1.0, 0.0), (1.0, 3.0), (1.0, 5.0)), 0.0);
}

#[test]
fn ccw() {
    assert!(vert_ccw((0.0, 0.0), (1.0, 0.0), (0.0, 1.0)));
    assert!(!vert_ccw((0.0, 0.0), (0.0, 1.0), (1.0, 0.0)));
    assert!(vert_ccw((0.0, 0.0), (1.0, 1.0), (2.0, 2.0)));
}

#[test]
fn intersection() {
    let (s, t) = edge_intersect((0.0, 0.0), (4.0, 4.0), (0.0, 4.0), (4.0, 0.0));
    assert_eq!((s, t), (2.0, 2.0));

    let (s, t) = edge_intersect((0.0, 1.0), (10.0, 1.0), (3.0, -5.0), (3.0, 5.0));
    assert_eq!((s, t), (3.0, 1.0));
}

#[test]
fn axes() {
    assert_eq!(long_axis([0.0, 0.0, 1.0]), 2);
    assert_eq!(long_axis([0.0, -3.0, 1.0]), 1);
    assert_eq!(short_axis([1.0, 2.0, 3.0]), 0);
    assert_eq!(short_axis([1.0, 0.0, 3.0]), 1);
}
