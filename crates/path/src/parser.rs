//! A parser for the SVG path data syntax.
//!
//! The parser only tokenizes and groups operands. It produces one [`PathCommand`]
//! per command occurrence, expanding implicit repetitions: a command letter
//! followed by several times its arity in operands repeats, and the repetitions of a
//! move-to are line-tos.

use crate::commands::{PathCommand, Verb};

use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ParseError {
    #[error("Line {line} Column {column}: Expected number, got {src:?}.")]
    Number { src: String, line: i32, column: i32 },
    #[error("Line {line} Column {column}: Expected flag (0/1), got {src:?}.")]
    Flag { src: char, line: i32, column: i32 },
    #[error("Line {line} Column {column}: Invalid command {command:?}.")]
    Command {
        command: char,
        line: i32,
        column: i32,
    },
    #[error("Line {line} Column {column}: Expected move-to command, got {command:?}.")]
    MissingMoveTo {
        command: char,
        line: i32,
        column: i32,
    },
    #[error(
        "Line {line} Column {column}: Command {command:?} takes a multiple of {arity} operands, got {count}."
    )]
    OperandCount {
        command: char,
        count: usize,
        arity: usize,
        line: i32,
        column: i32,
    },
}

// A buffered iterator of characters keeping track of line and column.
pub struct Source<Iter> {
    src: Iter,
    current: char,
    line: i32,
    col: i32,
    finished: bool,
}

impl<Iter: Iterator<Item = char>> Source<Iter> {
    pub fn new<IntoIter>(src: IntoIter) -> Self
    where
        IntoIter: IntoIterator<IntoIter = Iter>,
    {
        let mut src = src.into_iter();

        let (current, finished) = match src.next() {
            Some(c) => (c, false),
            None => (' ', true),
        };

        let line = if current == '\n' { 1 } else { 0 };

        Source {
            current,
            finished,
            src,
            line,
            col: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.finished && (self.current.is_whitespace() || self.current == ',') {
            self.advance_one();
        }
    }

    fn advance_one(&mut self) {
        if self.finished {
            return;
        }
        match self.src.next() {
            Some('\n') => {
                self.current = '\n';
                self.line += 1;
                self.col = -1;
            }
            Some(c) => {
                self.current = c;
                self.col += 1;
            }
            None => {
                self.current = '~';
                self.finished = true;
            }
        }
    }

    fn at_command(&self) -> bool {
        !self.finished && self.current.is_ascii_alphabetic()
    }
}

/// Parses a path data string.
///
/// An empty (or blank) string yields no commands.
pub fn parse(src: &str) -> Result<Vec<PathCommand>, ParseError> {
    let mut output = Vec::new();
    PathParser::new().parse(&mut Source::new(src.chars()), &mut output)?;

    Ok(output)
}

/// A reusable parser context, to avoid reallocating its buffers for each path.
#[derive(Debug, Default)]
pub struct PathParser {
    float_buffer: String,
    operands: Vec<f32>,
}

impl PathParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses commands from `src` and appends them to `output`.
    pub fn parse<Iter>(
        &mut self,
        src: &mut Source<Iter>,
        output: &mut Vec<PathCommand>,
    ) -> Result<(), ParseError>
    where
        Iter: Iterator<Item = char>,
    {
        let mut first = true;

        src.skip_whitespace();

        while !src.finished {
            let c = src.current;
            let line = src.line;
            let column = src.col;

            let (verb, relative) = match Verb::from_char(c) {
                Some(cmd) => cmd,
                None => {
                    return Err(ParseError::Command {
                        command: c,
                        line,
                        column,
                    });
                }
            };

            if first && verb != Verb::MoveTo {
                return Err(ParseError::MissingMoveTo {
                    command: c,
                    line,
                    column,
                });
            }
            first = false;

            src.advance_one();
            self.parse_operands(verb, src)?;

            let arity = verb.arity();
            let count = self.operands.len();
            let valid = if arity == 0 {
                count == 0
            } else {
                count > 0 && count % arity == 0
            };

            if !valid {
                return Err(ParseError::OperandCount {
                    command: c,
                    count,
                    arity,
                    line,
                    column,
                });
            }

            if arity == 0 {
                output.push(PathCommand::new(verb, relative, &[]));
            } else {
                for (i, chunk) in self.operands.chunks(arity).enumerate() {
                    let verb = if i > 0 && verb == Verb::MoveTo {
                        Verb::LineTo
                    } else {
                        verb
                    };
                    output.push(PathCommand::new(verb, relative, chunk));
                }
            }

            src.skip_whitespace();
        }

        Ok(())
    }

    fn parse_operands(
        &mut self,
        verb: Verb,
        src: &mut Source<impl Iterator<Item = char>>,
    ) -> Result<(), ParseError> {
        self.operands.clear();

        loop {
            src.skip_whitespace();
            if src.finished || src.at_command() {
                return Ok(());
            }

            // The large-arc and sweep flags are single characters and may be
            // written without separators ("a10 10 0 0110 10").
            let index = self.operands.len() % 7;
            let value = if verb == Verb::ArcTo && (index == 3 || index == 4) {
                if self.parse_flag(src)? {
                    1.0
                } else {
                    0.0
                }
            } else {
                self.parse_number(src)?
            };

            self.operands.push(value);
        }
    }

    fn parse_number(
        &mut self,
        src: &mut Source<impl Iterator<Item = char>>,
    ) -> Result<f32, ParseError> {
        self.float_buffer.clear();

        src.skip_whitespace();

        let line = src.line;
        let column = src.col;

        if src.current == '-' || src.current == '+' {
            self.float_buffer.push(src.current);
            src.advance_one();
        }

        while src.current.is_ascii_digit() {
            self.float_buffer.push(src.current);
            src.advance_one();
        }

        if src.current == '.' {
            self.float_buffer.push('.');
            src.advance_one();

            while src.current.is_ascii_digit() {
                self.float_buffer.push(src.current);
                src.advance_one();
            }
        }

        if src.current == 'e' || src.current == 'E' {
            self.float_buffer.push(src.current);
            src.advance_one();

            if src.current == '-' || src.current == '+' {
                self.float_buffer.push(src.current);
                src.advance_one();
            }

            while src.current.is_ascii_digit() {
                self.float_buffer.push(src.current);
                src.advance_one();
            }
        }

        match self.float_buffer.parse::<f32>() {
            Ok(val) if val.is_finite() => Ok(val),
            _ => Err(ParseError::Number {
                src: std::mem::take(&mut self.float_buffer),
                line,
                column,
            }),
        }
    }

    fn parse_flag(
        &mut self,
        src: &mut Source<impl Iterator<Item = char>>,
    ) -> Result<bool, ParseError> {
        src.skip_whitespace();
        match src.current {
            '1' => {
                src.advance_one();
                Ok(true)
            }
            '0' => {
                src.advance_one();
                Ok(false)
            }
            _ => Err(ParseError::Flag {
                src: src.current,
                line: src.line,
                column: src.col,
            }),
        }
    }
}

#[cfg(test)]
fn verbs(commands: &[PathCommand]) -> Vec<(Verb, bool)> {
    commands.iter().map(|c| (c.verb, c.relative)).collect()
}

#[test]
fn empty() {
    assert_eq!(parse("").unwrap(), Vec::new());
    assert_eq!(parse("  \n ").unwrap(), Vec::new());
}

#[test]
fn simple_square() {
    let commands = parse("M0,0 L10,0 L10,10 L0,10 Z").unwrap();
    assert_eq!(
        verbs(&commands),
        vec![
            (Verb::MoveTo, false),
            (Verb::LineTo, false),
            (Verb::LineTo, false),
            (Verb::LineTo, false),
            (Verb::Close, false),
        ]
    );
    assert_eq!(&commands[2].operands[..], &[10.0, 10.0]);
}

#[test]
fn implicit_repetition() {
    let commands = parse("M0 0 L1 1 2 2 3 3 4 4 5 5").unwrap();
    assert_eq!(commands.len(), 6);
    for cmd in &commands[1..] {
        assert_eq!(cmd.verb, Verb::LineTo);
    }
    assert_eq!(&commands[5].operands[..], &[5.0, 5.0]);
}

#[test]
fn move_to_repeats_as_line_to() {
    let commands = parse("m1 2 3 4 5 6z").unwrap();
    assert_eq!(
        verbs(&commands),
        vec![
            (Verb::MoveTo, true),
            (Verb::LineTo, true),
            (Verb::LineTo, true),
            (Verb::Close, true),
        ]
    );
}

#[test]
fn operand_count_must_match_arity() {
    match parse("M0 0 L1 2 3") {
        Err(ParseError::OperandCount {
            command: 'L',
            count: 3,
            arity: 2,
            ..
        }) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert!(matches!(
        parse("M0 0 C1 2 3 4 5 6 7"),
        Err(ParseError::OperandCount { .. })
    ));
    assert!(matches!(parse("M"), Err(ParseError::OperandCount { .. })));
    assert!(matches!(
        parse("M0 0 Z 1"),
        Err(ParseError::OperandCount { .. })
    ));
}

#[test]
fn compact_numbers() {
    // In path data, "0.6.5" is two numbers and a minus sign starts a new one.
    let commands = parse("M0.6.5l-1-2e1").unwrap();
    assert_eq!(&commands[0].operands[..], &[0.6, 0.5]);
    assert_eq!(&commands[1].operands[..], &[-1.0, -20.0]);

    let commands = parse("M 1e-2 -1E3 h+4 v.5").unwrap();
    assert_eq!(&commands[0].operands[..], &[0.01, -1000.0]);
    assert_eq!(commands[1].verb, Verb::HorizontalLineTo);
    assert_eq!(&commands[1].operands[..], &[4.0]);
    assert_eq!(&commands[2].operands[..], &[0.5]);
}

#[test]
fn arc_flags() {
    let commands = parse("M0 0 a10 10 0 0110 10 A5,5,30,1,0,20,20").unwrap();
    assert_eq!(&commands[1].operands[..], &[10.0, 10.0, 0.0, 0.0, 1.0, 10.0, 10.0]);
    assert_eq!(&commands[2].operands[..], &[5.0, 5.0, 30.0, 1.0, 0.0, 20.0, 20.0]);

    assert!(matches!(
        parse("M0 0 A10 10 0 2 1 10 10"),
        Err(ParseError::Flag { src: '2', .. })
    ));
}

#[test]
fn invalid_command() {
    assert_eq!(
        parse("M 0 0 x 1 1"),
        Err(ParseError::Command {
            command: 'x',
            line: 0,
            column: 6,
        })
    );
    assert_eq!(
        parse("\n M 0 \n0 x 1 1 1"),
        Err(ParseError::Command {
            command: 'x',
            line: 2,
            column: 2,
        })
    );
}

#[test]
fn missing_move_to() {
    assert!(matches!(
        parse("L 1 1"),
        Err(ParseError::MissingMoveTo { command: 'L', .. })
    ));
}

#[test]
fn bad_numbers() {
    let bad_number = |src: &str| match parse(src) {
        Err(ParseError::Number { .. }) => true,
        r => {
            println!("{:?}", r);
            false
        }
    };

    assert!(bad_number("M 0 --1"));
    assert!(bad_number("M 0 1e--1"));
    assert!(bad_number("M 0 *2"));
    assert!(bad_number("M 0 1e"));
    assert!(bad_number("M 0 -"));
}

#[test]
fn reusable_parser() {
    let mut parser = PathParser::new();
    let mut output = Vec::new();
    parser
        .parse(&mut Source::new("M0 0 L1 1".chars()), &mut output)
        .unwrap();
    parser
        .parse(&mut Source::new("M2 2 L3 3".chars()), &mut output)
        .unwrap();
    assert_eq!(output.len(), 4);
}
