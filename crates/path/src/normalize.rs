//! Rewrites parsed commands into absolute move-to and cubic bézier commands.
//!
//! Normalization runs in two passes:
//!
//! - [`to_absolute`] resolves relative operands against the current point and the
//!   start of the current sub-path. The commands keep their verb.
//! - [`expand`] replaces every drawing command with one or more cubic béziers
//!   describing the same geometry: lines get control points on their endpoints,
//!   quadratics are degree-elevated, arcs are split into pieces of at most 120
//!   degrees, and `Z` becomes a line back to the sub-path start.

use crate::commands::{NormalizedCommand, PathCommand, Verb};
use crate::geom::{Angle, ArcFlags, CubicBezierSegment, QuadraticBezierSegment, SvgArc};
use crate::math::{point, vector, Point};

/// Runs both normalization passes.
pub fn normalize(commands: &[PathCommand]) -> Vec<NormalizedCommand> {
    expand(&to_absolute(commands))
}

/// Converts every command to its absolute form.
///
/// Horizontal and vertical line-tos keep their single operand. A leading relative
/// move-to is relative to the origin. Commands whose operand count does not match
/// the arity of their verb are dropped.
pub fn to_absolute(commands: &[PathCommand]) -> Vec<PathCommand> {
    let mut output = Vec::with_capacity(commands.len());
    let mut current = point(0.0, 0.0);
    let mut start = point(0.0, 0.0);

    for cmd in commands.iter().filter(|cmd| has_arity(cmd)) {
        let mut abs = cmd.clone();
        abs.relative = false;
        let ops = &mut abs.operands;

        if cmd.relative {
            match cmd.verb {
                Verb::HorizontalLineTo => {
                    ops[0] += current.x;
                }
                Verb::VerticalLineTo => {
                    ops[0] += current.y;
                }
                Verb::ArcTo => {
                    ops[5] += current.x;
                    ops[6] += current.y;
                }
                Verb::Close => {}
                _ => {
                    // Every other command is a list of points.
                    for pair in ops.chunks_mut(2) {
                        pair[0] += current.x;
                        pair[1] += current.y;
                    }
                }
            }
        }

        match abs.verb {
            Verb::Close => {
                current = start;
            }
            Verb::HorizontalLineTo => {
                current.x = ops[0];
            }
            Verb::VerticalLineTo => {
                current.y = ops[0];
            }
            _ => {
                let n = ops.len();
                current = point(ops[n - 2], ops[n - 1]);
                if abs.verb == Verb::MoveTo {
                    start = current;
                }
            }
        }

        output.push(abs);
    }

    output
}

fn has_arity(cmd: &PathCommand) -> bool {
    cmd.operands.len() == cmd.verb.arity()
}

// The control point a smooth command reflects, tagged with its family.
#[derive(Copy, Clone, Debug, PartialEq)]
enum PreviousCtrl {
    None,
    Cubic(Point),
    Quadratic(Point),
}

struct Expander {
    output: Vec<NormalizedCommand>,
    current: Point,
    start: Point,
}

impl Expander {
    fn cubic(&mut self, curve: &CubicBezierSegment<f32>) {
        self.output.push(NormalizedCommand::CubicTo {
            ctrl1: curve.ctrl1,
            ctrl2: curve.ctrl2,
            to: curve.to,
        });
        self.current = curve.to;
    }

    fn line_to(&mut self, to: Point) {
        let line = CubicBezierSegment::from_line(self.current, to);
        self.cubic(&line);
    }

    // Reflection of the previous control point about the current point.
    fn reflect(&self, ctrl: Point) -> Point {
        self.current + (self.current - ctrl)
    }
}

/// Expands absolute commands into move-tos and cubic béziers.
///
/// The input must come from [`to_absolute`]; relative commands are read as absolute.
/// Commands with the wrong number of operands are skipped.
pub fn expand(commands: &[PathCommand]) -> Vec<NormalizedCommand> {
    let mut expander = Expander {
        output: Vec::with_capacity(commands.len()),
        current: point(0.0, 0.0),
        start: point(0.0, 0.0),
    };
    let mut prev_ctrl = PreviousCtrl::None;

    for cmd in commands.iter().filter(|cmd| has_arity(cmd)) {
        debug_assert!(!cmd.relative);
        let ops = &cmd.operands;
        let mut next_ctrl = PreviousCtrl::None;

        match cmd.verb {
            Verb::MoveTo => {
                let to = point(ops[0], ops[1]);
                expander.output.push(NormalizedCommand::MoveTo(to));
                expander.current = to;
                expander.start = to;
            }
            Verb::LineTo => {
                expander.line_to(point(ops[0], ops[1]));
            }
            Verb::HorizontalLineTo => {
                let to = point(ops[0], expander.current.y);
                expander.line_to(to);
            }
            Verb::VerticalLineTo => {
                let to = point(expander.current.x, ops[0]);
                expander.line_to(to);
            }
            Verb::CubicTo | Verb::SmoothCubicTo => {
                let (ctrl1, rest) = if cmd.verb == Verb::CubicTo {
                    (point(ops[0], ops[1]), &ops[2..])
                } else {
                    let ctrl1 = match prev_ctrl {
                        PreviousCtrl::Cubic(ctrl) => expander.reflect(ctrl),
                        _ => expander.current,
                    };
                    (ctrl1, &ops[..])
                };
                let ctrl2 = point(rest[0], rest[1]);
                let to = point(rest[2], rest[3]);

                let curve = CubicBezierSegment {
                    from: expander.current,
                    ctrl1,
                    ctrl2,
                    to,
                };
                expander.cubic(&curve);
                next_ctrl = PreviousCtrl::Cubic(ctrl2);
            }
            Verb::QuadraticTo | Verb::SmoothQuadraticTo => {
                let (ctrl, rest) = if cmd.verb == Verb::QuadraticTo {
                    (point(ops[0], ops[1]), &ops[2..])
                } else {
                    let ctrl = match prev_ctrl {
                        PreviousCtrl::Quadratic(ctrl) => expander.reflect(ctrl),
                        _ => expander.current,
                    };
                    (ctrl, &ops[..])
                };

                let quadratic = QuadraticBezierSegment {
                    from: expander.current,
                    ctrl,
                    to: point(rest[0], rest[1]),
                };
                expander.cubic(&quadratic.to_cubic());
                next_ctrl = PreviousCtrl::Quadratic(ctrl);
            }
            Verb::ArcTo => {
                let arc = SvgArc {
                    from: expander.current,
                    to: point(ops[5], ops[6]),
                    radii: vector(ops[0], ops[1]),
                    x_rotation: Angle::degrees(ops[2]),
                    flags: ArcFlags {
                        large_arc: ops[3] != 0.0,
                        sweep: ops[4] != 0.0,
                    },
                };
                arc.for_each_cubic_bezier(&mut |curve| expander.cubic(curve));
            }
            Verb::Close => {
                let start = expander.start;
                expander.line_to(start);
            }
        }

        prev_ctrl = next_ctrl;
    }

    expander.output
}

#[cfg(test)]
use crate::parser::parse;

#[cfg(test)]
fn normalized(src: &str) -> Vec<NormalizedCommand> {
    normalize(&parse(src).unwrap())
}

#[cfg(test)]
fn cubic(ctrl1: (f32, f32), ctrl2: (f32, f32), to: (f32, f32)) -> NormalizedCommand {
    NormalizedCommand::CubicTo {
        ctrl1: point(ctrl1.0, ctrl1.1),
        ctrl2: point(ctrl2.0, ctrl2.1),
        to: point(to.0, to.1),
    }
}

#[test]
fn absolute_pass() {
    let abs = to_absolute(&parse("m1 1 l2 0 h3 v4 z l1 1").unwrap());
    let ops: Vec<Vec<f32>> = abs.iter().map(|c| c.operands.to_vec()).collect();
    assert!(abs.iter().all(|c| !c.relative));
    assert_eq!(
        ops,
        vec![
            vec![1.0, 1.0],
            vec![3.0, 1.0],
            vec![6.0],
            vec![5.0],
            vec![],
            // After closing, the current point is back at the sub-path start.
            vec![2.0, 2.0],
        ]
    );
}

#[test]
fn malformed_operand_lists_are_dropped() {
    use crate::geom::arrayvec::ArrayVec;

    let malformed = |verb, relative, ops: &[f32]| {
        let mut operands = ArrayVec::new();
        operands.extend(ops.iter().cloned());
        PathCommand {
            verb,
            relative,
            operands,
        }
    };

    let commands = vec![
        PathCommand::new(Verb::MoveTo, false, &[1.0, 1.0]),
        malformed(Verb::LineTo, true, &[]),
        malformed(Verb::HorizontalLineTo, true, &[]),
        malformed(Verb::ArcTo, true, &[5.0, 5.0, 0.0]),
        malformed(Verb::CubicTo, false, &[1.0, 2.0, 3.0]),
        PathCommand::new(Verb::LineTo, true, &[2.0, 0.0]),
    ];

    let abs = to_absolute(&commands);
    assert_eq!(abs.len(), 2);
    assert_eq!(abs[1].operands.to_vec(), vec![3.0, 1.0]);

    assert_eq!(
        normalize(&commands),
        vec![
            NormalizedCommand::MoveTo(point(1.0, 1.0)),
            cubic((1.0, 1.0), (3.0, 1.0), (3.0, 1.0)),
        ]
    );
    assert!(expand(&commands[4..5]).is_empty());
}

#[test]
fn lines_become_degenerate_cubics() {
    assert_eq!(
        normalized("M0,0 L10,0 H10 V5 Z"),
        vec![
            NormalizedCommand::MoveTo(point(0.0, 0.0)),
            cubic((0.0, 0.0), (10.0, 0.0), (10.0, 0.0)),
            cubic((10.0, 0.0), (10.0, 0.0), (10.0, 0.0)),
            cubic((10.0, 0.0), (10.0, 5.0), (10.0, 5.0)),
            cubic((10.0, 5.0), (0.0, 0.0), (0.0, 0.0)),
        ]
    );
}

#[test]
fn smooth_cubic_reflects_previous_control_point() {
    let commands = normalized("M0 0 C0 10 10 10 10 0 S20 -10 20 0");
    assert_eq!(commands[2], cubic((10.0, -10.0), (20.0, -10.0), (20.0, 0.0)));

    // Not preceded by a cubic: the implicit control point is the current point.
    let commands = normalized("M0 0 L10 0 S20 -10 20 0");
    assert_eq!(commands[2], cubic((10.0, 0.0), (20.0, -10.0), (20.0, 0.0)));

    // A quadratic does not count as the same family.
    let commands = normalized("M0 0 Q5 5 10 0 S20 -10 20 0");
    assert_eq!(commands[2], cubic((10.0, 0.0), (20.0, -10.0), (20.0, 0.0)));
}

#[test]
fn quadratics_are_elevated() {
    let commands = normalized("M0 0 Q6 9 12 0 T24 0");
    assert_eq!(commands[1], cubic((4.0, 6.0), (8.0, 6.0), (12.0, 0.0)));
    // The implicit control point of T is (18, -9).
    assert_eq!(commands[2], cubic((16.0, -6.0), (20.0, -6.0), (24.0, 0.0)));

    let commands = normalized("M0 0 C1 1 2 2 3 0 T9 0");
    assert_eq!(commands[2], cubic((3.0, 0.0), (5.0, 0.0), (9.0, 0.0)));
}

#[test]
fn arcs_become_cubics() {
    let commands = normalized("M10,0 A10,10 0 1,1 -10,0 A10,10 0 1,1 10,0 Z");
    // Two half circles of two pieces each, plus the closing line.
    assert_eq!(commands.len(), 6);

    let mut current = point(10.0, 0.0);
    for cmd in &commands[1..5] {
        if let NormalizedCommand::CubicTo { ctrl1, ctrl2, to } = *cmd {
            let curve = CubicBezierSegment {
                from: current,
                ctrl1,
                ctrl2,
                to,
            };
            for i in 0..=8 {
                let r = curve.sample(i as f32 / 8.0).to_vector().length();
                assert!((r - 10.0).abs() < 0.01, "radius {}", r);
            }
            current = to;
        } else {
            panic!("expected a cubic");
        }
    }
    assert_eq!(current, point(10.0, 0.0));
}

#[test]
fn degenerate_arcs() {
    // Zero radius: a straight line.
    assert_eq!(
        normalized("M0 0 A0 5 0 0 1 10 0"),
        vec![
            NormalizedCommand::MoveTo(point(0.0, 0.0)),
            cubic((0.0, 0.0), (10.0, 0.0), (10.0, 0.0)),
        ]
    );
    // Same endpoints: omitted.
    assert_eq!(
        normalized("M3 3 a5 5 0 0 1 0 0"),
        vec![NormalizedCommand::MoveTo(point(3.0, 3.0))]
    );
}

#[test]
fn relative_commands() {
    assert_eq!(
        normalized("m5 5 c0 10 10 10 10 0 l0 -5"),
        normalized("M5 5 C5 15 15 15 15 5 L15 0")
    );
}
