use crate::math::{point, Point, Vector};
use crate::path::{PathCommand, Verb};

use std::f32::consts::PI;
use std::fmt;

const TAU: f32 = PI * 2.0;
const EPSILON: f32 = 1e-6;

/// Accumulates absolute path commands and prints them as SVG path data.
///
/// The arc helper follows the conventions of the canvas `arc` function.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathWriter {
    commands: Vec<PathCommand>,
    start: Option<Point>,
    current: Option<Point>,
}

impl PathWriter {
    pub fn new() -> Self {
        PathWriter::default()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn current_position(&self) -> Option<Point> {
        self.current
    }

    pub fn move_to(&mut self, to: Point) {
        self.push(Verb::MoveTo, &[to.x, to.y]);
        self.start = Some(to);
        self.current = Some(to);
    }

    /// Starts a sub-path if there is no current position.
    pub fn line_to(&mut self, to: Point) {
        if self.current.is_none() {
            self.move_to(to);
            return;
        }
        self.push(Verb::LineTo, &[to.x, to.y]);
        self.current = Some(to);
    }

    pub fn quadratic_bezier_to(&mut self, ctrl: Point, to: Point) {
        if self.current.is_none() {
            self.move_to(ctrl);
        }
        self.push(Verb::QuadraticTo, &[ctrl.x, ctrl.y, to.x, to.y]);
        self.current = Some(to);
    }

    pub fn cubic_bezier_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        if self.current.is_none() {
            self.move_to(ctrl1);
        }
        self.push(
            Verb::CubicTo,
            &[ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y],
        );
        self.current = Some(to);
    }

    /// SVG elliptical arc with identical radii and no rotation.
    pub fn arc_to(&mut self, radius: f32, large_arc: bool, sweep: bool, to: Point) {
        if self.current.is_none() {
            self.move_to(to);
            return;
        }
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        self.push(
            Verb::ArcTo,
            &[radius, radius, 0.0, flag(large_arc), flag(sweep), to.x, to.y],
        );
        self.current = Some(to);
    }

    /// Adds a circular arc around `center` from `start_angle` to `end_angle`.
    ///
    /// Angles are in radians, measured from the positive x axis towards the
    /// positive y axis. A line connects the current position to the start of the
    /// arc. Sweeps of a full turn or more draw a complete circle.
    pub fn arc(
        &mut self,
        center: Point,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        counter_clockwise: bool,
    ) {
        let r = radius.abs();
        let (sin0, cos0) = start_angle.sin_cos();
        let start = point(center.x + r * cos0, center.y + r * sin0);

        match self.current {
            None => self.move_to(start),
            Some(current) => {
                if (current - start).square_length() > EPSILON * EPSILON {
                    self.line_to(start);
                }
            }
        }

        if r < EPSILON {
            return;
        }

        let cw = !counter_clockwise;
        let mut da = if cw {
            end_angle - start_angle
        } else {
            start_angle - end_angle
        };

        if da > TAU - EPSILON {
            // Full circle, drawn as two half circles.
            let opposite = point(center.x - (start.x - center.x), center.y - (start.y - center.y));
            self.arc_to(r, true, cw, opposite);
            self.arc_to(r, true, cw, start);
            return;
        }

        if da < 0.0 {
            da = da.rem_euclid(TAU);
        }

        if da > EPSILON {
            let (sin1, cos1) = end_angle.sin_cos();
            let end = point(center.x + r * cos1, center.y + r * sin1);
            self.arc_to(r, da >= PI, cw, end);
        }
    }

    /// Adds a closed axis-aligned rectangle.
    pub fn rect(&mut self, origin: Point, size: Vector) {
        self.move_to(origin);
        self.line_to(point(origin.x + size.x, origin.y));
        self.line_to(point(origin.x + size.x, origin.y + size.y));
        self.line_to(point(origin.x, origin.y + size.y));
        self.close();
    }

    pub fn close(&mut self) {
        if self.current.is_none() {
            return;
        }
        self.push(Verb::Close, &[]);
        self.current = self.start;
    }

    fn push(&mut self, verb: Verb, operands: &[f32]) {
        self.commands.push(PathCommand::new(verb, false, operands));
    }

    pub fn into_string(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PathWriter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for cmd in &self.commands {
            write!(f, "{}", cmd)?;
        }
        Ok(())
    }
}

#[test]
fn lines() {
    let mut w = PathWriter::new();
    w.line_to(point(1.0, 2.0));
    w.line_to(point(3.5, -4.0));
    w.close();
    assert_eq!(w.to_string(), "M1,2L3.5,-4Z");
}

#[test]
fn close_without_position() {
    let mut w = PathWriter::new();
    w.close();
    assert!(w.is_empty());
    assert_eq!(w.into_string(), "");
}

#[test]
fn rect() {
    let mut w = PathWriter::new();
    w.rect(point(0.0, 0.0), crate::math::vector(10.0, 5.0));
    assert_eq!(w.to_string(), "M0,0L10,0L10,5L0,5Z");
}

#[test]
fn full_circle() {
    let mut w = PathWriter::new();
    w.arc(point(0.0, 0.0), 10.0, 0.0, TAU, false);
    let s = w.to_string();
    assert!(s.starts_with("M10,0A10,10,0,1,1,-10,"));
    assert_eq!(w.commands().len(), 3);
    assert_eq!(w.current_position(), Some(point(10.0, 0.0)));
}

#[test]
fn quarter_arc() {
    let mut w = PathWriter::new();
    w.move_to(point(0.0, 0.0));
    w.arc(point(0.0, 0.0), 2.0, 0.0, PI * 0.5, false);
    let cmds = w.commands();
    assert_eq!(cmds.len(), 3);
    assert_eq!(cmds[1].verb, Verb::LineTo);
    assert_eq!(cmds[2].verb, Verb::ArcTo);
    // Small arc, positive sweep.
    assert_eq!(cmds[2].operands[3], 0.0);
    assert_eq!(cmds[2].operands[4], 1.0);
}
