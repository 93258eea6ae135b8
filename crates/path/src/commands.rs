//! The command types produced by the parser and the normalizer.

use crate::geom::arrayvec::ArrayVec;
use crate::math::Point;
use std::fmt;

/// The kind of a path data command, independently of whether its operands are
/// relative or absolute.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Verb {
    MoveTo,
    LineTo,
    HorizontalLineTo,
    VerticalLineTo,
    CubicTo,
    SmoothCubicTo,
    QuadraticTo,
    SmoothQuadraticTo,
    ArcTo,
    Close,
}

impl Verb {
    /// Number of operands consumed by one occurrence of the command.
    pub fn arity(self) -> usize {
        match self {
            Verb::MoveTo => 2,
            Verb::LineTo => 2,
            Verb::HorizontalLineTo => 1,
            Verb::VerticalLineTo => 1,
            Verb::CubicTo => 6,
            Verb::SmoothCubicTo => 4,
            Verb::QuadraticTo => 4,
            Verb::SmoothQuadraticTo => 2,
            Verb::ArcTo => 7,
            Verb::Close => 0,
        }
    }

    /// Decodes a command letter. Lower case letters are relative commands.
    pub fn from_char(c: char) -> Option<(Verb, bool)> {
        let verb = match c.to_ascii_uppercase() {
            'M' => Verb::MoveTo,
            'L' => Verb::LineTo,
            'H' => Verb::HorizontalLineTo,
            'V' => Verb::VerticalLineTo,
            'C' => Verb::CubicTo,
            'S' => Verb::SmoothCubicTo,
            'Q' => Verb::QuadraticTo,
            'T' => Verb::SmoothQuadraticTo,
            'A' => Verb::ArcTo,
            'Z' => Verb::Close,
            _ => {
                return None;
            }
        };

        Some((verb, c.is_ascii_lowercase()))
    }

    pub fn to_char(self, relative: bool) -> char {
        let c = match self {
            Verb::MoveTo => 'M',
            Verb::LineTo => 'L',
            Verb::HorizontalLineTo => 'H',
            Verb::VerticalLineTo => 'V',
            Verb::CubicTo => 'C',
            Verb::SmoothCubicTo => 'S',
            Verb::QuadraticTo => 'Q',
            Verb::SmoothQuadraticTo => 'T',
            Verb::ArcTo => 'A',
            Verb::Close => 'Z',
        };

        if relative {
            c.to_ascii_lowercase()
        } else {
            c
        }
    }
}

/// One parsed path data command with exactly `verb.arity()` operands.
#[derive(Clone, Debug, PartialEq)]
pub struct PathCommand {
    pub verb: Verb,
    pub relative: bool,
    pub operands: ArrayVec<f32, 7>,
}

impl PathCommand {
    /// Creates a command from its operands.
    ///
    /// Panics if the number of operands does not match the verb's arity.
    pub fn new(verb: Verb, relative: bool, operands: &[f32]) -> Self {
        assert_eq!(operands.len(), verb.arity());
        let mut v = ArrayVec::new();
        v.extend(operands.iter().cloned());
        PathCommand {
            verb,
            relative,
            operands: v,
        }
    }

    #[inline]
    pub fn is_close(&self) -> bool {
        self.verb == Verb::Close
    }
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.verb.to_char(self.relative))?;
        for (i, v) in self.operands.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

/// Whether the last command of a path closes it.
pub fn ends_with_close(commands: &[PathCommand]) -> bool {
    commands.last().map_or(false, PathCommand::is_close)
}

/// A command of a normalized path: only absolute moves and cubic béziers remain.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum NormalizedCommand {
    MoveTo(Point),
    CubicTo {
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    },
}

#[test]
fn verb_chars() {
    for &c in &['M', 'l', 'H', 'v', 'C', 's', 'Q', 't', 'A', 'z'] {
        let (verb, relative) = Verb::from_char(c).unwrap();
        assert_eq!(verb.to_char(relative), c);
    }
    assert_eq!(Verb::from_char('x'), None);
    assert_eq!(Verb::from_char('e'), None);
}

#[test]
fn display() {
    let cmd = PathCommand::new(Verb::CubicTo, true, &[1.0, 2.0, 3.5, 4.0, 5.0, 6.0]);
    assert_eq!(format!("{}", cmd), "c1,2,3.5,4,5,6");
    assert_eq!(format!("{}", PathCommand::new(Verb::Close, false, &[])), "Z");
}
