//! Annular sectors.
//!
//! Angles are in radians, clockwise from the 12 o'clock direction.

use super::writer::PathWriter;
use crate::math::point;

use std::f32::consts::{FRAC_PI_2, PI};

const EPSILON: f32 = 1e-6;
const TAU: f32 = PI * 2.0;

/// Parameters of an arc mark.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ArcParams {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub start_angle: f32,
    pub end_angle: f32,
    /// Angular gap between adjacent arcs, measured at the pad radius
    /// `sqrt(inner² + outer²)`.
    pub pad_angle: f32,
}

fn clamped_asin(x: f32) -> f32 {
    if x >= 1.0 {
        FRAC_PI_2
    } else if x <= -1.0 {
        -FRAC_PI_2
    } else {
        x.asin()
    }
}

/// An annular sector centered on the origin.
pub fn arc(params: &ArcParams) -> PathWriter {
    let mut out = PathWriter::new();

    let mut r0 = params.inner_radius.max(0.0);
    let mut r1 = params.outer_radius.max(0.0);
    if r1 < r0 {
        std::mem::swap(&mut r0, &mut r1);
    }

    let a0 = params.start_angle - FRAC_PI_2;
    let a1 = params.end_angle - FRAC_PI_2;
    let da = (a1 - a0).abs();
    let cw = a1 > a0;

    if !(r1 > EPSILON) {
        out.move_to(point(0.0, 0.0));
        return out;
    }

    if da > TAU - EPSILON {
        // A full circle or annulus. The inner circle goes the other way around.
        out.move_to(point(r1 * a0.cos(), r1 * a0.sin()));
        out.arc(point(0.0, 0.0), r1, a0, a1, !cw);
        if r0 > EPSILON {
            out.move_to(point(r0 * a1.cos(), r0 * a1.sin()));
            out.arc(point(0.0, 0.0), r0, a1, a0, cw);
        }
        return out;
    }

    let (mut a00, mut a10) = (a0, a1);
    let (mut a01, mut a11) = (a0, a1);
    let mut da0 = da;
    let mut da1 = da;

    let ap = params.pad_angle * 0.5;
    let rp = if ap > EPSILON {
        (r0 * r0 + r1 * r1).sqrt()
    } else {
        0.0
    };

    if rp > EPSILON {
        let dir = if cw { 1.0 } else { -1.0 };
        let p0 = if r0 > 0.0 {
            clamped_asin(rp / r0 * ap.sin())
        } else {
            FRAC_PI_2
        };
        let p1 = clamped_asin(rp / r1 * ap.sin());

        da0 -= p0 * 2.0;
        if da0 > EPSILON {
            a00 += p0 * dir;
            a10 -= p0 * dir;
        } else {
            da0 = 0.0;
            a00 = (a0 + a1) * 0.5;
            a10 = a00;
        }

        da1 -= p1 * 2.0;
        if da1 > EPSILON {
            a01 += p1 * dir;
            a11 -= p1 * dir;
        } else {
            da1 = 0.0;
            a01 = (a0 + a1) * 0.5;
            a11 = a01;
        }
    }

    out.move_to(point(r1 * a01.cos(), r1 * a01.sin()));
    if da1 > EPSILON {
        out.arc(point(0.0, 0.0), r1, a01, a11, !cw);
    }

    if !(r0 > EPSILON) || !(da0 > EPSILON) {
        out.line_to(point(r0 * a10.cos(), r0 * a10.sin()));
    } else {
        out.arc(point(0.0, 0.0), r0, a10, a00, cw);
    }
    out.close();

    out
}

#[cfg(test)]
fn area_of(out: &PathWriter) -> f32 {
    use crate::path::{contours_for_path, FlatteningOptions};
    let contours = contours_for_path(&out.to_string(), &FlatteningOptions::tolerance(0.001)).unwrap();
    contours.iter().map(|c| c.signed_area()).sum::<f32>().abs()
}

#[test]
fn pie_slice() {
    let out = arc(&ArcParams {
        inner_radius: 0.0,
        outer_radius: 10.0,
        start_angle: 0.0,
        end_angle: FRAC_PI_2,
        pad_angle: 0.0,
    });
    let path = out.to_string();
    // Starts at 12 o'clock and ends at the center.
    let start = &out.commands()[0];
    assert!(start.operands[0].abs() < 1e-4 && (start.operands[1] + 10.0).abs() < 1e-4);
    assert!(path.ends_with("A10,10,0,0,1,10,0L0,0Z"), "{}", path);

    let expected = PI * 100.0 / 4.0;
    assert!((area_of(&out) - expected).abs() < expected * 0.01);
}

#[test]
fn annulus() {
    let out = arc(&ArcParams {
        inner_radius: 5.0,
        outer_radius: 10.0,
        start_angle: 0.0,
        end_angle: TAU,
        pad_angle: 0.0,
    });
    let expected = PI * (100.0 - 25.0);
    assert!((area_of(&out) - expected).abs() < expected * 0.01);
}

#[test]
fn annular_sector() {
    let params = ArcParams {
        inner_radius: 5.0,
        outer_radius: 10.0,
        start_angle: PI,
        end_angle: PI * 1.5,
        pad_angle: 0.0,
    };
    let expected = PI * 75.0 / 4.0;
    assert!((area_of(&arc(&params)) - expected).abs() < expected * 0.01);

    // Padding removes some area.
    let padded = arc(&ArcParams { pad_angle: 0.1, ..params });
    assert!(area_of(&padded) < expected * 0.99);
}

#[test]
fn empty_arc() {
    let out = arc(&ArcParams {
        inner_radius: 0.0,
        outer_radius: 0.0,
        start_angle: 0.0,
        end_angle: 1.0,
        pad_angle: 0.0,
    });
    assert_eq!(out.to_string(), "M0,0");
}
