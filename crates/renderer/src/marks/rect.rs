use super::writer::PathWriter;
use crate::math::{point, vector};

/// A rectangle with its top-left corner at the origin, optionally with rounded
/// corners.
///
/// Negative sizes extend the rectangle to the left or to the top. The corner
/// radius is clamped to half of the smallest side.
pub fn rect(width: f32, height: f32, corner_radius: f32) -> PathWriter {
    let x = width.min(0.0);
    let y = height.min(0.0);
    let w = width.abs();
    let h = height.abs();

    let mut out = PathWriter::new();
    let r = corner_radius.max(0.0).min(w * 0.5).min(h * 0.5);
    if !(r > 0.0) {
        out.rect(point(x, y), vector(w, h));
        return out;
    }

    out.move_to(point(x + r, y));
    out.line_to(point(x + w - r, y));
    out.arc_to(r, false, true, point(x + w, y + r));
    out.line_to(point(x + w, y + h - r));
    out.arc_to(r, false, true, point(x + w - r, y + h));
    out.line_to(point(x + r, y + h));
    out.arc_to(r, false, true, point(x, y + h - r));
    out.line_to(point(x, y + r));
    out.arc_to(r, false, true, point(x + r, y));
    out.close();

    out
}

/// A line segment from the origin.
pub fn rule(dx: f32, dy: f32) -> PathWriter {
    let mut out = PathWriter::new();
    out.move_to(point(0.0, 0.0));
    out.line_to(point(dx, dy));
    out
}

#[test]
fn plain_rect() {
    assert_eq!(rect(10.0, 5.0, 0.0).to_string(), "M0,0L10,0L10,5L0,5Z");
    assert_eq!(rect(-10.0, 5.0, 0.0).to_string(), "M-10,0L0,0L0,5L-10,5Z");
}

#[test]
fn rounded_rect() {
    let path = rect(10.0, 4.0, 5.0).to_string();
    // The radius is clamped to 2.
    assert!(path.starts_with("M2,0L8,0A2,2,0,0,1,10,2"), "{}", path);
    assert!(path.ends_with("A2,2,0,0,1,2,0Z"), "{}", path);
}

#[test]
fn rule_segment() {
    assert_eq!(rule(3.0, -4.0).to_string(), "M0,0L3,-4");
}
