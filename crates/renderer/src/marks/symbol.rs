//! Symbol shapes, centered on the origin and sized by area.

use super::writer::PathWriter;
use crate::math::{point, Point};
use crate::path::{commands::ends_with_close, normalize, parse, NormalizedCommand, ParseError};

use std::f32::consts::PI;

const TAU: f32 = PI * 2.0;
const SQRT3: f32 = 1.732_050_8;

/// The default area of a symbol.
pub const DEFAULT_SIZE: f32 = 64.0;

/// The built-in symbol shapes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolShape {
    Circle,
    Square,
    Cross,
    Diamond,
    /// Equilateral triangle pointing up, centered on its centroid.
    Triangle,
    TriangleUp,
    TriangleDown,
    TriangleLeft,
    TriangleRight,
    Star,
    Wye,
}

impl SymbolShape {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "circle" => SymbolShape::Circle,
            "square" => SymbolShape::Square,
            "cross" => SymbolShape::Cross,
            "diamond" => SymbolShape::Diamond,
            "triangle" => SymbolShape::Triangle,
            "triangle-up" => SymbolShape::TriangleUp,
            "triangle-down" => SymbolShape::TriangleDown,
            "triangle-left" => SymbolShape::TriangleLeft,
            "triangle-right" => SymbolShape::TriangleRight,
            "star" => SymbolShape::Star,
            "wye" => SymbolShape::Wye,
            _ => {
                return None;
            }
        })
    }
}

fn polygon(out: &mut PathWriter, points: &[Point]) {
    for (i, &p) in points.iter().enumerate() {
        if i == 0 {
            out.move_to(p);
        } else {
            out.line_to(p);
        }
    }
    out.close();
}

/// A built-in symbol with the given area.
pub fn symbol(shape: SymbolShape, size: f32) -> PathWriter {
    let size = size.max(0.0);
    let mut out = PathWriter::new();

    match shape {
        SymbolShape::Circle => {
            let r = (size / PI).sqrt();
            out.move_to(point(r, 0.0));
            out.arc(point(0.0, 0.0), r, 0.0, TAU, false);
            out.close();
        }
        SymbolShape::Square => {
            let w = size.sqrt();
            let x = -w * 0.5;
            out.rect(point(x, x), crate::math::vector(w, w));
        }
        SymbolShape::Cross => {
            let r = (size / 5.0).sqrt() * 0.5;
            polygon(
                &mut out,
                &[
                    point(-3.0 * r, -r),
                    point(-r, -r),
                    point(-r, -3.0 * r),
                    point(r, -3.0 * r),
                    point(r, -r),
                    point(3.0 * r, -r),
                    point(3.0 * r, r),
                    point(r, r),
                    point(r, 3.0 * r),
                    point(-r, 3.0 * r),
                    point(-r, r),
                    point(-3.0 * r, r),
                ],
            );
        }
        SymbolShape::Diamond => {
            let tan30 = (1.0f32 / 3.0).sqrt();
            let y = (size / (tan30 * 2.0)).sqrt();
            let x = y * tan30;
            polygon(
                &mut out,
                &[point(0.0, -y), point(x, 0.0), point(0.0, y), point(-x, 0.0)],
            );
        }
        SymbolShape::Triangle => {
            let y = -(size / (SQRT3 * 3.0)).sqrt();
            polygon(
                &mut out,
                &[
                    point(0.0, y * 2.0),
                    point(-SQRT3 * y, -y),
                    point(SQRT3 * y, -y),
                ],
            );
        }
        SymbolShape::TriangleUp
        | SymbolShape::TriangleDown
        | SymbolShape::TriangleLeft
        | SymbolShape::TriangleRight => {
            let r = size.sqrt() * 0.5;
            let h = SQRT3 * 0.5 * r;
            let points = match shape {
                SymbolShape::TriangleUp => [point(0.0, -h), point(-r, h), point(r, h)],
                SymbolShape::TriangleDown => [point(0.0, h), point(-r, -h), point(r, -h)],
                SymbolShape::TriangleLeft => [point(-h, 0.0), point(h, -r), point(h, r)],
                _ => [point(h, 0.0), point(-h, -r), point(-h, r)],
            };
            polygon(&mut out, &points);
        }
        SymbolShape::Star => {
            let ka = 0.890_813_1;
            let kr = (PI / 10.0).sin() / (7.0 * PI / 10.0).sin();
            let kx = (TAU / 10.0).sin() * kr;
            let ky = -(TAU / 10.0).cos() * kr;

            let r = (size * ka).sqrt();
            let x = kx * r;
            let y = ky * r;
            let mut points = vec![point(0.0, -r), point(x, y)];
            for i in 1..5 {
                let (s, c) = (TAU * i as f32 / 5.0).sin_cos();
                points.push(point(s * r, -c * r));
                points.push(point(c * x - s * y, s * x + c * y));
            }
            polygon(&mut out, &points);
        }
        SymbolShape::Wye => {
            let c = -0.5;
            let s = SQRT3 * 0.5;
            let k = 1.0 / 12.0f32.sqrt();
            let a = (k / 2.0 + 1.0) * 3.0;

            let r = (size / a).sqrt();
            let (x0, y0) = (r / 2.0, r * k);
            let (x1, y1) = (x0, r * k + r);
            let (x2, y2) = (-x1, y1);
            polygon(
                &mut out,
                &[
                    point(x0, y0),
                    point(x1, y1),
                    point(x2, y2),
                    point(c * x0 - s * y0, s * x0 + c * y0),
                    point(c * x1 - s * y1, s * x1 + c * y1),
                    point(c * x2 - s * y2, s * x2 + c * y2),
                    point(c * x0 + s * y0, c * y0 - s * x0),
                    point(c * x1 + s * y1, c * y1 - s * x1),
                    point(c * x2 + s * y2, c * y2 - s * x2),
                ],
            );
        }
    }

    out
}

/// A custom symbol from path data.
///
/// The path is expected to fit in the `[-1, 1]` square and is scaled so that this
/// square has the requested area.
pub fn custom_symbol(path: &str, size: f32) -> Result<PathWriter, ParseError> {
    let commands = parse(path)?;
    let closed = ends_with_close(&commands);
    let scale = size.max(0.0).sqrt() * 0.5;

    let mut out = PathWriter::new();
    let mut first = true;
    for cmd in normalize(&commands) {
        match cmd {
            NormalizedCommand::MoveTo(to) => {
                if closed && !first {
                    out.close();
                }
                first = false;
                out.move_to(to * scale);
            }
            NormalizedCommand::CubicTo { ctrl1, ctrl2, to } => {
                out.cubic_bezier_to(ctrl1 * scale, ctrl2 * scale, to * scale);
            }
        }
    }
    if closed {
        out.close();
    }

    Ok(out)
}

#[cfg(test)]
fn area_of(out: &PathWriter) -> f32 {
    use crate::path::{contours_for_path, FlatteningOptions};
    let contours = contours_for_path(&out.to_string(), &FlatteningOptions::tolerance(0.001)).unwrap();
    contours.iter().map(|c| c.signed_area().abs()).sum()
}

#[test]
fn shapes_have_the_requested_area() {
    let shapes = [
        SymbolShape::Circle,
        SymbolShape::Square,
        SymbolShape::Cross,
        SymbolShape::Diamond,
        SymbolShape::Triangle,
        SymbolShape::Star,
        SymbolShape::Wye,
    ];
    for &shape in &shapes {
        let area = area_of(&symbol(shape, 100.0));
        assert!((area - 100.0).abs() < 1.0, "{:?}: {}", shape, area);
    }
}

#[test]
fn oriented_triangles() {
    let up = symbol(SymbolShape::TriangleUp, 100.0);
    // r = 5, h = 5 * sqrt(3) / 2
    let apex = &up.commands()[0];
    assert_eq!(apex.operands[0], 0.0);
    assert!((apex.operands[1] + 4.330127).abs() < 1e-4);

    let area = area_of(&symbol(SymbolShape::TriangleLeft, 100.0));
    // Base 2r, height 2h.
    assert!((area - 5.0 * 2.0 * 4.330127).abs() < 1e-2);
}

#[test]
fn shape_names() {
    assert_eq!(SymbolShape::from_name("triangle-left"), Some(SymbolShape::TriangleLeft));
    assert_eq!(SymbolShape::from_name("M0,0"), None);
}

#[test]
fn custom_shape() {
    let out = custom_symbol("M-1,-1 L1,-1 L1,1 L-1,1 Z", 16.0).unwrap();
    // The unit square is scaled by sqrt(16) / 2.
    assert!((area_of(&out) - 16.0).abs() < 1e-3);
    assert!(out.to_string().ends_with('Z'));

    assert!(custom_symbol("M0,0 L1", 16.0).is_err());
}
