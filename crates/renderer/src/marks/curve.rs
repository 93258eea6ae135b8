//! Curve interpolators for line and area marks.
//!
//! A curve receives a stream of points between `line_start` and `line_end` calls
//! and writes path commands. Areas wrap two lines (the top line, then the
//! baseline in reverse order) between `area_start` and `area_end`: the second
//! line continues the first one instead of starting a new sub-path, and closes
//! the shape.

use super::writer::PathWriter;
use crate::math::{point, Point};

/// The interpolation methods of line and area marks.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Interpolate {
    Linear,
    LinearClosed,
    /// Steps at the midpoint between two points.
    Step,
    StepBefore,
    StepAfter,
    /// Cubic B-spline.
    Basis,
    /// Cardinal spline with the given tension in `[0, 1]`.
    Cardinal(f32),
    /// Monotone in x.
    Monotone,
}

impl Interpolate {
    pub const DEFAULT_TENSION: f32 = 0.0;

    /// Parses an interpolation name. Unknown names map to `Linear`.
    pub fn from_name(name: &str, tension: Option<f32>) -> Self {
        match name {
            "linear-closed" => Interpolate::LinearClosed,
            "step" => Interpolate::Step,
            "step-before" => Interpolate::StepBefore,
            "step-after" => Interpolate::StepAfter,
            "basis" => Interpolate::Basis,
            "cardinal" => Interpolate::Cardinal(tension.unwrap_or(Self::DEFAULT_TENSION)),
            "monotone" => Interpolate::Monotone,
            _ => Interpolate::Linear,
        }
    }

    pub fn curve(self) -> Box<dyn Curve> {
        match self {
            Interpolate::Linear => Box::new(Linear::default()),
            Interpolate::LinearClosed => Box::new(LinearClosed::default()),
            Interpolate::Step => Box::new(Step::new(0.5)),
            Interpolate::StepBefore => Box::new(Step::new(0.0)),
            Interpolate::StepAfter => Box::new(Step::new(1.0)),
            Interpolate::Basis => Box::new(Basis::new()),
            Interpolate::Cardinal(tension) => Box::new(Cardinal::new(tension)),
            Interpolate::Monotone => Box::new(Monotone::new()),
        }
    }
}

pub trait Curve {
    fn area_start(&mut self);
    fn area_end(&mut self);
    fn line_start(&mut self);
    fn line_end(&mut self, out: &mut PathWriter);
    fn point(&mut self, out: &mut PathWriter, p: Point);
}

/// Which line of a shape is being written.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Pass {
    Line,
    AreaTop,
    AreaBaseline,
}

impl Default for Pass {
    fn default() -> Self {
        Pass::Line
    }
}

impl Pass {
    fn begin(self, out: &mut PathWriter, p: Point) {
        if self == Pass::AreaBaseline {
            out.line_to(p);
        } else {
            out.move_to(p);
        }
    }

    fn end(self, out: &mut PathWriter, single_point: bool) -> Pass {
        match self {
            Pass::Line => {
                if single_point {
                    out.close();
                }
                Pass::Line
            }
            Pass::AreaTop => Pass::AreaBaseline,
            Pass::AreaBaseline => {
                out.close();
                Pass::AreaTop
            }
        }
    }
}

#[derive(Default)]
struct Linear {
    pass: Pass,
    count: u32,
}

impl Curve for Linear {
    fn area_start(&mut self) {
        self.pass = Pass::AreaTop;
    }

    fn area_end(&mut self) {
        self.pass = Pass::Line;
    }

    fn line_start(&mut self) {
        self.count = 0;
    }

    fn line_end(&mut self, out: &mut PathWriter) {
        self.pass = self.pass.end(out, self.count == 1);
    }

    fn point(&mut self, out: &mut PathWriter, p: Point) {
        if self.count == 0 {
            self.pass.begin(out, p);
        } else {
            out.line_to(p);
        }
        self.count = (self.count + 1).min(2);
    }
}

#[derive(Default)]
struct LinearClosed {
    started: bool,
}

impl Curve for LinearClosed {
    fn area_start(&mut self) {}

    fn area_end(&mut self) {}

    fn line_start(&mut self) {
        self.started = false;
    }

    fn line_end(&mut self, out: &mut PathWriter) {
        if self.started {
            out.close();
        }
    }

    fn point(&mut self, out: &mut PathWriter, p: Point) {
        if self.started {
            out.line_to(p);
        } else {
            self.started = true;
            out.move_to(p);
        }
    }
}

struct Step {
    t: f32,
    pass: Pass,
    count: u32,
    prev: Point,
}

impl Step {
    fn new(t: f32) -> Self {
        Step {
            t,
            pass: Pass::Line,
            count: 0,
            prev: point(0.0, 0.0),
        }
    }
}

impl Curve for Step {
    fn area_start(&mut self) {
        self.pass = Pass::AreaTop;
    }

    fn area_end(&mut self) {
        self.pass = Pass::Line;
    }

    fn line_start(&mut self) {
        self.count = 0;
    }

    fn line_end(&mut self, out: &mut PathWriter) {
        if 0.0 < self.t && self.t < 1.0 && self.count == 2 {
            out.line_to(self.prev);
        }
        if self.pass != Pass::Line {
            // The baseline is walked backwards.
            self.t = 1.0 - self.t;
        }
        self.pass = self.pass.end(out, self.count == 1);
    }

    fn point(&mut self, out: &mut PathWriter, p: Point) {
        match self.count {
            0 => {
                self.count = 1;
                self.pass.begin(out, p);
            }
            _ => {
                self.count = 2;
                if self.t <= 0.0 {
                    out.line_to(point(self.prev.x, p.y));
                    out.line_to(p);
                } else {
                    let x = self.prev.x * (1.0 - self.t) + p.x * self.t;
                    out.line_to(point(x, self.prev.y));
                    out.line_to(point(x, p.y));
                }
            }
        }
        self.prev = p;
    }
}

struct Basis {
    pass: Pass,
    count: u32,
    p0: Point,
    p1: Point,
}

impl Basis {
    fn new() -> Self {
        Basis {
            pass: Pass::Line,
            count: 0,
            p0: point(0.0, 0.0),
            p1: point(0.0, 0.0),
        }
    }

    fn segment(&self, out: &mut PathWriter, p: Point) {
        let (p0, p1) = (self.p0, self.p1);
        out.cubic_bezier_to(
            point((2.0 * p0.x + p1.x) / 3.0, (2.0 * p0.y + p1.y) / 3.0),
            point((p0.x + 2.0 * p1.x) / 3.0, (p0.y + 2.0 * p1.y) / 3.0),
            point((p0.x + 4.0 * p1.x + p.x) / 6.0, (p0.y + 4.0 * p1.y + p.y) / 6.0),
        );
    }
}

impl Curve for Basis {
    fn area_start(&mut self) {
        self.pass = Pass::AreaTop;
    }

    fn area_end(&mut self) {
        self.pass = Pass::Line;
    }

    fn line_start(&mut self) {
        self.count = 0;
    }

    fn line_end(&mut self, out: &mut PathWriter) {
        match self.count {
            3 => {
                self.segment(out, self.p1);
                out.line_to(self.p1);
            }
            2 => {
                out.line_to(self.p1);
            }
            _ => {}
        }
        self.pass = self.pass.end(out, self.count == 1);
    }

    fn point(&mut self, out: &mut PathWriter, p: Point) {
        match self.count {
            0 => {
                self.count = 1;
                self.pass.begin(out, p);
            }
            1 => {
                self.count = 2;
            }
            2 => {
                self.count = 3;
                out.line_to(point(
                    (5.0 * self.p0.x + self.p1.x) / 6.0,
                    (5.0 * self.p0.y + self.p1.y) / 6.0,
                ));
                self.segment(out, p);
            }
            _ => {
                self.segment(out, p);
            }
        }
        self.p0 = self.p1;
        self.p1 = p;
    }
}

struct Cardinal {
    k: f32,
    pass: Pass,
    count: u32,
    p0: Point,
    p1: Point,
    p2: Point,
}

impl Cardinal {
    fn new(tension: f32) -> Self {
        Cardinal {
            k: (1.0 - tension) / 6.0,
            pass: Pass::Line,
            count: 0,
            p0: point(0.0, 0.0),
            p1: point(0.0, 0.0),
            p2: point(0.0, 0.0),
        }
    }

    fn segment(&self, out: &mut PathWriter, p: Point) {
        let k = self.k;
        let (p0, p1, p2) = (self.p0, self.p1, self.p2);
        out.cubic_bezier_to(
            point(p1.x + k * (p2.x - p0.x), p1.y + k * (p2.y - p0.y)),
            point(p2.x + k * (p1.x - p.x), p2.y + k * (p1.y - p.y)),
            p2,
        );
    }
}

impl Curve for Cardinal {
    fn area_start(&mut self) {
        self.pass = Pass::AreaTop;
    }

    fn area_end(&mut self) {
        self.pass = Pass::Line;
    }

    fn line_start(&mut self) {
        self.count = 0;
    }

    fn line_end(&mut self, out: &mut PathWriter) {
        match self.count {
            2 => out.line_to(self.p2),
            3 => self.segment(out, self.p1),
            _ => {}
        }
        self.pass = self.pass.end(out, self.count == 1);
    }

    fn point(&mut self, out: &mut PathWriter, p: Point) {
        match self.count {
            0 => {
                self.count = 1;
                self.pass.begin(out, p);
            }
            1 => {
                self.count = 2;
                // The first segment mirrors the second point.
                self.p1 = p;
            }
            _ => {
                self.count = 3;
                self.segment(out, p);
            }
        }
        self.p0 = self.p1;
        self.p1 = self.p2;
        self.p2 = p;
    }
}

struct Monotone {
    pass: Pass,
    count: u32,
    p0: Point,
    p1: Point,
    t0: f32,
}

fn sign(x: f32) -> f32 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

impl Monotone {
    fn new() -> Self {
        Monotone {
            pass: Pass::Line,
            count: 0,
            p0: point(0.0, 0.0),
            p1: point(0.0, 0.0),
            t0: f32::NAN,
        }
    }

    // Steffen's method for the tangent at p1, given the next point.
    fn slope3(&self, p2: Point) -> f32 {
        let h0 = self.p1.x - self.p0.x;
        let h1 = p2.x - self.p1.x;
        let d0 = if h0 != 0.0 { h0 } else if h1 < 0.0 { -0.0 } else { 0.0 };
        let d1 = if h1 != 0.0 { h1 } else if h0 < 0.0 { -0.0 } else { 0.0 };
        let s0 = (self.p1.y - self.p0.y) / d0;
        let s1 = (p2.y - self.p1.y) / d1;
        let p = (s0 * h1 + s1 * h0) / (h0 + h1);
        if s0.is_nan() || s1.is_nan() || p.is_nan() {
            return 0.0;
        }
        let slope = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
        if slope.is_nan() {
            0.0
        } else {
            slope
        }
    }

    // The tangent at an end point, given the tangent at the other end.
    fn slope2(&self, t: f32) -> f32 {
        let h = self.p1.x - self.p0.x;
        if h != 0.0 {
            (3.0 * (self.p1.y - self.p0.y) / h - t) / 2.0
        } else {
            t
        }
    }

    fn segment(&self, out: &mut PathWriter, t0: f32, t1: f32) {
        let (p0, p1) = (self.p0, self.p1);
        let dx = (p1.x - p0.x) / 3.0;
        out.cubic_bezier_to(
            point(p0.x + dx, p0.y + dx * t0),
            point(p1.x - dx, p1.y - dx * t1),
            p1,
        );
    }
}

impl Curve for Monotone {
    fn area_start(&mut self) {
        self.pass = Pass::AreaTop;
    }

    fn area_end(&mut self) {
        self.pass = Pass::Line;
    }

    fn line_start(&mut self) {
        self.count = 0;
    }

    fn line_end(&mut self, out: &mut PathWriter) {
        match self.count {
            2 => out.line_to(self.p1),
            3 => {
                let t0 = self.t0;
                self.segment(out, t0, self.slope2(t0));
            }
            _ => {}
        }
        self.pass = self.pass.end(out, self.count == 1);
    }

    fn point(&mut self, out: &mut PathWriter, p: Point) {
        if self.count > 0 && p == self.p1 {
            return;
        }

        let mut t1 = f32::NAN;
        match self.count {
            0 => {
                self.count = 1;
                self.pass.begin(out, p);
            }
            1 => {
                self.count = 2;
            }
            2 => {
                self.count = 3;
                t1 = self.slope3(p);
                self.segment(out, self.slope2(t1), t1);
            }
            _ => {
                t1 = self.slope3(p);
                self.segment(out, self.t0, t1);
            }
        }
        self.p0 = self.p1;
        self.p1 = p;
        self.t0 = t1;
    }
}

/// Writes a line through the points, interrupted at undefined points.
pub fn line(points: &[(Point, bool)], interpolate: Interpolate) -> PathWriter {
    let mut out = PathWriter::new();
    let mut curve = interpolate.curve();
    let mut defined = false;

    for i in 0..=points.len() {
        let d = points.get(i).map_or(false, |&(_, d)| d);
        if d != defined {
            defined = d;
            if defined {
                curve.line_start();
            } else {
                curve.line_end(&mut out);
            }
        }
        if defined {
            curve.point(&mut out, points[i].0);
        }
    }

    out
}

/// One point of an area: on the top line and on the baseline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AreaPoint {
    pub top: Point,
    pub base: Point,
    pub defined: bool,
}

/// Writes a closed shape between the top line and the baseline of each run of
/// defined points.
pub fn area(points: &[AreaPoint], interpolate: Interpolate) -> PathWriter {
    let mut out = PathWriter::new();
    let mut curve = interpolate.curve();
    let mut defined = false;
    let mut run_start = 0;

    for i in 0..=points.len() {
        let d = points.get(i).map_or(false, |p| p.defined);
        if d != defined {
            defined = d;
            if defined {
                run_start = i;
                curve.area_start();
                curve.line_start();
            } else {
                curve.line_end(&mut out);
                curve.line_start();
                for p in points[run_start..i].iter().rev() {
                    curve.point(&mut out, p.base);
                }
                curve.line_end(&mut out);
                curve.area_end();
            }
        }
        if defined {
            curve.point(&mut out, points[i].top);
        }
    }

    out
}

#[cfg(test)]
fn pts(coords: &[(f32, f32)]) -> Vec<(Point, bool)> {
    coords.iter().map(|&(x, y)| (point(x, y), true)).collect()
}

#[test]
fn linear_line() {
    let path = line(&pts(&[(0.0, 0.0), (10.0, 5.0), (20.0, 0.0)]), Interpolate::Linear);
    assert_eq!(path.to_string(), "M0,0L10,5L20,0");
}

#[test]
fn single_point_line() {
    let path = line(&pts(&[(3.0, 4.0)]), Interpolate::Linear);
    assert_eq!(path.to_string(), "M3,4Z");
}

#[test]
fn line_with_gaps() {
    let mut points = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (4.0, 4.0)]);
    points[2].1 = false;
    let path = line(&points, Interpolate::Linear);
    assert_eq!(path.to_string(), "M0,0L1,1M3,3L4,4");
}

#[test]
fn linear_closed() {
    let path = line(&pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]), Interpolate::LinearClosed);
    assert_eq!(path.to_string(), "M0,0L10,0L10,10Z");
}

#[test]
fn steps() {
    let points = pts(&[(0.0, 0.0), (10.0, 10.0)]);
    assert_eq!(
        line(&points, Interpolate::Step).to_string(),
        "M0,0L5,0L5,10L10,10"
    );
    assert_eq!(
        line(&points, Interpolate::StepBefore).to_string(),
        "M0,0L0,10L10,10"
    );
    assert_eq!(
        line(&points, Interpolate::StepAfter).to_string(),
        "M0,0L10,0L10,10"
    );
}

#[test]
fn basis() {
    let path = line(&pts(&[(0.0, 0.0), (6.0, 6.0), (12.0, 0.0)]), Interpolate::Basis);
    assert_eq!(path.to_string(), "M0,0L1,1C2,2,4,4,6,4C8,4,10,2,11,1L12,0");
}

#[test]
fn cardinal_goes_through_points() {
    let points = pts(&[(0.0, 0.0), (10.0, 10.0), (20.0, 0.0), (30.0, 10.0)]);
    let path = line(&points, Interpolate::Cardinal(0.0));
    let cmds = path.commands();
    assert_eq!(cmds.len(), 4);
    let ends: Vec<(f32, f32)> = cmds
        .iter()
        .map(|c| {
            let n = c.operands.len();
            (c.operands[n - 2], c.operands[n - 1])
        })
        .collect();
    assert_eq!(ends, vec![(0.0, 0.0), (10.0, 10.0), (20.0, 0.0), (30.0, 10.0)]);

    // Two points make a straight line.
    let path = line(&pts(&[(0.0, 0.0), (10.0, 10.0)]), Interpolate::Cardinal(0.5));
    assert_eq!(path.to_string(), "M0,0L10,10");
}

#[test]
fn monotone_does_not_overshoot() {
    let points = pts(&[(0.0, 0.0), (1.0, 10.0), (2.0, 10.0), (3.0, 0.0)]);
    let path = line(&points, Interpolate::Monotone);
    for cmd in path.commands() {
        for pair in cmd.operands.chunks(2) {
            assert!(pair[1] >= 0.0 && pair[1] <= 10.0, "{}", path);
        }
    }

    // Coincident points are ignored.
    let points = pts(&[(0.0, 0.0), (0.0, 0.0), (1.0, 1.0)]);
    assert_eq!(line(&points, Interpolate::Monotone).to_string(), "M0,0L1,1");
}

#[test]
fn linear_area() {
    let points = [
        AreaPoint { top: point(0.0, 0.0), base: point(0.0, 10.0), defined: true },
        AreaPoint { top: point(10.0, 2.0), base: point(10.0, 10.0), defined: true },
    ];
    let path = area(&points, Interpolate::Linear);
    assert_eq!(path.to_string(), "M0,0L10,2L10,10L0,10Z");
}

#[test]
fn area_with_gap() {
    let mut points: Vec<AreaPoint> = (0..5)
        .map(|i| AreaPoint {
            top: point(i as f32, 0.0),
            base: point(i as f32, 1.0),
            defined: true,
        })
        .collect();
    points[2].defined = false;
    let path = area(&points, Interpolate::Linear);
    assert_eq!(path.to_string(), "M0,0L1,0L1,1L0,1ZM3,0L4,0L4,1L3,1Z");
}

#[test]
fn step_area() {
    let points = [
        AreaPoint { top: point(0.0, 0.0), base: point(0.0, 10.0), defined: true },
        AreaPoint { top: point(10.0, 4.0), base: point(10.0, 10.0), defined: true },
    ];
    let path = area(&points, Interpolate::StepAfter);
    assert_eq!(path.to_string(), "M0,0L10,0L10,4L10,10L10,10L0,10Z");
}
