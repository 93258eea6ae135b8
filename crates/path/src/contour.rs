//! Flattening normalized commands into polylines.

use crate::commands::NormalizedCommand;
use crate::geom::{CubicBezierSegment, FlatteningOptions};
use crate::math::{Box2D, Point};
use crate::simplify::simplify;

/// One polyline of a flattened path.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Contour {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Contour {
    pub fn new(points: Vec<Point>, closed: bool) -> Self {
        Contour { points, closed }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A copy of this contour with its points simplified.
    pub fn simplified(&self, tolerance: f32) -> Contour {
        Contour {
            points: simplify(&self.points, tolerance),
            closed: self.closed,
        }
    }

    /// Signed area of the polygon formed by the points (shoelace formula).
    ///
    /// Positive for counter-clockwise contours in a y-up coordinate system.
    pub fn signed_area(&self) -> f32 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }

        let mut area = 0.0;
        let mut prev = self.points[n - 1];
        for &p in &self.points {
            area += prev.x * p.y - p.x * prev.y;
            prev = p;
        }

        area * 0.5
    }

    pub fn bounding_box(&self) -> Box2D {
        Box2D::from_points(self.points.iter())
    }
}

/// Groups a normalized command stream into contours, flattening every cubic.
///
/// Each move-to starts a new contour. A cubic appends its flattened points,
/// except for its start point which is already the last point of the contour.
/// `closed` is applied to every contour: a path is closed if its last command
/// was a close command.
pub fn build_contours(
    commands: &[NormalizedCommand],
    closed: bool,
    options: &FlatteningOptions<f32>,
) -> Vec<Contour> {
    let mut contours: Vec<Contour> = Vec::new();
    let mut current = Point::origin();

    for cmd in commands {
        match *cmd {
            NormalizedCommand::MoveTo(to) => {
                contours.push(Contour::new(vec![to], closed));
                current = to;
            }
            NormalizedCommand::CubicTo { ctrl1, ctrl2, to } => {
                if contours.is_empty() {
                    contours.push(Contour::new(vec![current], closed));
                }
                let contour = match contours.last_mut() {
                    Some(contour) => contour,
                    None => continue,
                };

                let curve = CubicBezierSegment {
                    from: current,
                    ctrl1,
                    ctrl2,
                    to,
                };
                let mut first = true;
                curve.for_each_flattened_adaptive(options, &mut |p| {
                    if !first {
                        contour.points.push(p);
                    }
                    first = false;
                });

                current = to;
            }
        }
    }

    contours
}

#[cfg(test)]
use crate::math::point;
#[cfg(test)]
use crate::{contours_for_path, normalize, parse};

#[test]
fn rectangle_contour() {
    let contours = contours_for_path(
        "M0,0 L10,0 L10,10 L0,10 Z",
        &FlatteningOptions::tolerance(1.0),
    )
    .unwrap();

    assert_eq!(contours.len(), 1);
    let contour = &contours[0];
    assert!(contour.closed);
    // Lines flatten to their endpoints only.
    let corners = vec![
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(0.0, 10.0),
        point(0.0, 0.0),
    ];
    assert_eq!(contour.points, corners);
    assert_eq!(contour.signed_area(), 100.0);
    assert_eq!(contour.simplified(1.0).points, corners);
}

#[test]
fn straight_lines_keep_their_corners() {
    let options = FlatteningOptions::tolerance(0.1);
    let line = contours_for_path("M0,0 L30,0", &options).unwrap();
    assert_eq!(line[0].points, vec![point(0.0, 0.0), point(30.0, 0.0)]);

    let contours = contours_for_path(
        "M0,0 L30,0 L30,30 L0,30 Z M10,10 L10,20 L20,20 L20,10 Z",
        &options,
    )
    .unwrap();
    assert_eq!(contours.len(), 2);
    for contour in &contours {
        assert_eq!(contour.simplified(0.1), *contour);
    }
    assert_eq!(
        contours[0].points,
        vec![
            point(0.0, 0.0),
            point(30.0, 0.0),
            point(30.0, 30.0),
            point(0.0, 30.0),
            point(0.0, 0.0),
        ]
    );
    assert_eq!(
        contours[1].points,
        vec![
            point(10.0, 10.0),
            point(10.0, 20.0),
            point(20.0, 20.0),
            point(20.0, 10.0),
            point(10.0, 10.0),
        ]
    );
    assert_eq!(contours[0].signed_area() + contours[1].signed_area(), 800.0);

    // The diagonals of a bowtie.
    let bowtie = contours_for_path("M0,0 L10,10 L10,0 L0,10 Z", &options).unwrap();
    assert_eq!(
        bowtie[0].points,
        vec![
            point(0.0, 0.0),
            point(10.0, 10.0),
            point(10.0, 0.0),
            point(0.0, 10.0),
            point(0.0, 0.0),
        ]
    );
}

#[test]
fn one_contour_per_move_to() {
    let contours = contours_for_path(
        "M0,0 L1,0 L1,1 M5,5 L6,5 M9,9",
        &FlatteningOptions::default(),
    )
    .unwrap();

    assert_eq!(contours.len(), 3);
    assert_eq!(contours[0].points[0], point(0.0, 0.0));
    assert_eq!(*contours[0].points.last().unwrap(), point(1.0, 1.0));
    assert_eq!(contours[1].points[0], point(5.0, 5.0));
    assert_eq!(contours[2].points, vec![point(9.0, 9.0)]);
    for c in &contours {
        assert!(!c.closed);
    }
}

#[test]
fn closedness_follows_the_last_command() {
    let options = FlatteningOptions::default();
    let closed = contours_for_path("M0,0 L1,0 L1,1 Z", &options).unwrap();
    assert!(closed[0].closed);

    let open = contours_for_path("M0,0 L1,0 L1,1 Z M3,3 L4,4", &options).unwrap();
    assert!(!open[0].closed);
    assert!(!open[1].closed);
}

#[test]
fn curves_are_flattened() {
    let commands = normalize(&parse("M0,0 C0,100 100,100 100,0").unwrap());
    let coarse = build_contours(&commands, false, &FlatteningOptions::tolerance(5.0));
    let fine = build_contours(&commands, false, &FlatteningOptions::tolerance(0.1));

    assert!(fine[0].len() > coarse[0].len());
    assert_eq!(*fine[0].points.last().unwrap(), point(100.0, 0.0));
    for w in fine[0].points.windows(2) {
        assert_ne!(w[0], w[1]);
    }
}

#[test]
fn bounding_box() {
    let contour = Contour::new(vec![point(1.0, 2.0), point(-3.0, 5.0), point(4.0, 0.0)], true);
    let b = contour.bounding_box();
    assert_eq!(b.min, point(-3.0, 0.0));
    assert_eq!(b.max, point(4.0, 5.0));
}
