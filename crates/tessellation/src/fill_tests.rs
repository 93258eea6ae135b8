use crate::math::*;
use crate::path::{contours_for_path, FlatteningOptions};
use crate::{
    ElementType, FillOptions, FillOutput, FillTessellator, TessellationError,
    TessellationResult, UnsupportedParameter, WindingRule,
};

use core::f32::consts::PI;

fn tessellate(
    contours: &[Vec<Point>],
    options: &FillOptions,
    log: bool,
) -> TessellationResult<FillOutput> {
    let mut tess = FillTessellator::new();
    tess.set_logging(log);
    for contour in contours {
        tess.add_contour_2d(contour)?;
    }

    tess.tessellate(options)
}

fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();
}

fn test_contours(
    contours: &[Vec<Point>],
    options: &FillOptions,
    expected_triangle_count: Option<usize>,
) -> FillOutput {
    let add_logging = std::env::var("SCENEGL_ENABLE_LOGGING").is_ok();

    match tessellate(contours, options, false) {
        Ok(output) => {
            if let Some(expected_triangles) = expected_triangle_count {
                let num_triangles = output.triangles().count();
                if num_triangles != expected_triangles {
                    if add_logging {
                        init_logging();
                        let _ = tessellate(contours, options, true);
                    }
                    panic!(
                        "expected {} triangles, got {}",
                        expected_triangles, num_triangles
                    );
                }
            }
            output
        }
        Err(e) => {
            if add_logging {
                init_logging();
                let _ = tessellate(contours, options, true);
            }
            panic!(
                "Test failed with winding rule {:?}: {}.",
                options.winding_rule, e
            );
        }
    }
}

fn triangle_area(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> f32 {
    ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])) * 0.5
}

fn triangle_area_3d(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> f32 {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt() * 0.5
}

fn fill_area(output: &FillOutput) -> f32 {
    let v = &output.vertices;
    output
        .triangles()
        .map(|[a, b, c]| triangle_area(v[a as usize], v[b as usize], v[c as usize]).abs())
        .sum()
}

fn shoelace(points: &[[f32; 3]]) -> f32 {
    let mut area = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        area += a[0] * b[1] - b[0] * a[1];
    }
    area * 0.5
}

fn covers(output: &FillOutput, p: Point) -> bool {
    let q = [p.x, p.y, 0.0];
    let v = &output.vertices;
    output.triangles().any(|[a, b, c]| {
        let (a, b, c) = (v[a as usize], v[b as usize], v[c as usize]);
        let d1 = triangle_area(q, a, b);
        let d2 = triangle_area(q, b, c);
        let d3 = triangle_area(q, c, a);
        (d1 >= 0.0 && d2 >= 0.0 && d3 >= 0.0) || (d1 <= 0.0 && d2 <= 0.0 && d3 <= 0.0)
    })
}

fn square(x: f32, y: f32, size: f32) -> Vec<Point> {
    vec![
        point(x, y),
        point(x + size, y),
        point(x + size, y + size),
        point(x, y + size),
    ]
}

fn reversed(mut contour: Vec<Point>) -> Vec<Point> {
    contour.reverse();
    contour
}

fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() <= epsilon
}

#[test]
fn test_rectangle() {
    let output = test_contours(&[square(0.0, 0.0, 10.0)], &FillOptions::DEFAULT, Some(2));

    assert!(approx_eq(fill_area(&output), 100.0, 1e-4));
    assert_eq!(output.vertices.len(), 4);
    assert_eq!(output.elements.len(), 6);
}

#[test]
fn test_rectangle_both_orientations() {
    let cw = reversed(square(0.0, 0.0, 10.0));
    for rule in &[WindingRule::Odd, WindingRule::NonZero, WindingRule::Positive] {
        // Without a normal the contours are oriented counter-clockwise.
        let output = test_contours(&[cw.clone()], &FillOptions::DEFAULT.with_winding_rule(*rule), Some(2));
        assert!(approx_eq(fill_area(&output), 100.0, 1e-4));
    }
}

#[test]
fn test_input_indices() {
    let input = square(0.0, 0.0, 10.0);
    let output = test_contours(&[input.clone()], &FillOptions::DEFAULT, Some(2));

    let mut indices: Vec<u32> = output
        .vertex_indices
        .iter()
        .map(|idx| idx.unwrap())
        .collect();
    for (vertex, idx) in output.vertices.iter().zip(indices.iter()) {
        let p = input[*idx as usize];
        assert_eq!((vertex[0], vertex[1]), (p.x, p.y));
    }
    indices.sort();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn test_annulus() {
    // Outer contour counter-clockwise, hole clockwise.
    let contours = [square(0.0, 0.0, 10.0), reversed(square(3.0, 3.0, 4.0))];

    for rule in &[WindingRule::Odd, WindingRule::NonZero] {
        let options = FillOptions::DEFAULT.with_winding_rule(*rule);
        let output = test_contours(&contours, &options, Some(8));

        assert!(approx_eq(fill_area(&output), 84.0, 1e-3));
        assert!(!covers(&output, point(5.0, 5.0)));
        assert!(covers(&output, point(1.0, 1.0)));
    }
}

#[test]
fn test_nested_same_orientation() {
    let contours = [square(0.0, 0.0, 10.0), square(3.0, 3.0, 4.0)];

    let output = test_contours(&contours, &FillOptions::non_zero(), None);
    assert!(approx_eq(fill_area(&output), 100.0, 1e-3));
    assert!(covers(&output, point(5.0, 5.0)));

    let output = test_contours(&contours, &FillOptions::odd(), Some(8));
    assert!(approx_eq(fill_area(&output), 84.0, 1e-3));
    assert!(!covers(&output, point(5.0, 5.0)));

    let options = FillOptions::DEFAULT.with_winding_rule(WindingRule::AbsGeqTwo);
    let output = test_contours(&contours, &options, Some(2));
    assert!(approx_eq(fill_area(&output), 16.0, 1e-3));
}

#[test]
fn test_abs_geq_two_overlap() {
    let contours = [square(0.0, 0.0, 10.0), square(5.0, 5.0, 10.0)];

    let options = FillOptions::DEFAULT.with_winding_rule(WindingRule::AbsGeqTwo);
    let output = test_contours(&contours, &options, Some(2));
    assert!(approx_eq(fill_area(&output), 25.0, 1e-3));
    assert!(covers(&output, point(7.5, 7.5)));
    assert!(!covers(&output, point(2.0, 2.0)));

    // The two corners of the overlap are created at edge intersections.
    let synthesized: Vec<&[f32; 3]> = output
        .vertices
        .iter()
        .zip(output.vertex_indices.iter())
        .filter(|(_, idx)| idx.is_none())
        .map(|(v, _)| v)
        .collect();
    assert_eq!(synthesized.len(), 2);
    for v in synthesized {
        let at_corner = (approx_eq(v[0], 10.0, 1e-4) && approx_eq(v[1], 5.0, 1e-4))
            || (approx_eq(v[0], 5.0, 1e-4) && approx_eq(v[1], 10.0, 1e-4));
        assert!(at_corner, "unexpected intersection {:?}", v);
    }

    // The union.
    let output = test_contours(&contours, &FillOptions::non_zero(), None);
    assert!(approx_eq(fill_area(&output), 175.0, 1e-3));
}

#[test]
fn test_bowtie() {
    // A single contour crossing itself at (5, 5). The two lobes have opposite
    // orientations.
    let bowtie = vec![
        point(0.0, 0.0),
        point(10.0, 10.0),
        point(10.0, 0.0),
        point(0.0, 10.0),
    ];

    for rule in &[WindingRule::Odd, WindingRule::NonZero] {
        let options = FillOptions::DEFAULT.with_winding_rule(*rule);
        let output = test_contours(&[bowtie.clone()], &options, Some(2));
        assert!(approx_eq(fill_area(&output), 50.0, 1e-3));
        assert!(covers(&output, point(1.0, 5.0)));
        assert!(covers(&output, point(9.0, 5.0)));
        assert!(!covers(&output, point(5.0, 1.0)));
        assert!(!covers(&output, point(5.0, 9.0)));
    }

    // With an explicit normal, the orientation of each lobe is kept.
    let positive = FillOptions::DEFAULT
        .with_winding_rule(WindingRule::Positive)
        .with_normal([0.0, 0.0, 1.0]);
    let output = test_contours(&[bowtie.clone()], &positive, Some(1));
    assert!(approx_eq(fill_area(&output), 25.0, 1e-3));
    assert!(covers(&output, point(1.0, 5.0)));

    let negative = positive.with_winding_rule(WindingRule::Negative);
    let output = test_contours(&[bowtie], &negative, Some(1));
    assert!(covers(&output, point(9.0, 5.0)));
}

#[test]
fn test_self_overlapping_star() {
    // A pentagram: the pentagon in the middle is covered twice by the contour.
    let star: Vec<Point> = (0..5)
        .map(|i| {
            let angle = PI * 0.5 + i as f32 * PI * 0.8;
            point(10.0 * angle.cos(), 10.0 * angle.sin())
        })
        .collect();

    let non_zero = test_contours(&[star.clone()], &FillOptions::non_zero(), None);
    let odd = test_contours(&[star.clone()], &FillOptions::odd(), None);

    assert!(covers(&non_zero, point(0.0, 0.0)));
    assert!(!covers(&odd, point(0.0, 0.0)));
    assert!(covers(&non_zero, point(0.0, 8.0)));
    assert!(covers(&odd, point(0.0, 8.0)));
    assert!(fill_area(&odd) < fill_area(&non_zero));

    let options = FillOptions::DEFAULT.with_winding_rule(WindingRule::AbsGeqTwo);
    let center = test_contours(&[star], &options, Some(3));
    assert!(approx_eq(
        fill_area(&center) + fill_area(&odd),
        fill_area(&non_zero),
        1e-2
    ));
}

#[test]
fn test_duplicated_contour() {
    let contours = [square(0.0, 0.0, 10.0), square(0.0, 0.0, 10.0)];

    let output = test_contours(&contours, &FillOptions::non_zero(), Some(2));
    assert!(approx_eq(fill_area(&output), 100.0, 1e-3));

    let output = test_contours(&contours, &FillOptions::odd(), Some(0));
    assert!(output.is_empty());

    let options = FillOptions::DEFAULT.with_winding_rule(WindingRule::AbsGeqTwo);
    let output = test_contours(&contours, &options, Some(2));
    assert!(approx_eq(fill_area(&output), 100.0, 1e-3));
}

#[test]
fn test_simple_polygon_area() {
    // A star shaped, non self-intersecting polygon.
    let n = 20;
    let star: Vec<Point> = (0..n)
        .map(|i| {
            let angle = i as f32 * 2.0 * PI / n as f32;
            let radius = if i % 2 == 0 { 10.0 } else { 4.0 };
            point(radius * angle.cos(), radius * angle.sin())
        })
        .collect();

    let expected: f32 = {
        let points: Vec<[f32; 3]> = star.iter().map(|p| [p.x, p.y, 0.0]).collect();
        shoelace(&points)
    };

    let output = test_contours(&[star], &FillOptions::non_zero(), Some(n - 2));
    assert!(approx_eq(fill_area(&output), expected, expected * 1e-4));
}

#[test]
fn test_overlapping_rotated_squares() {
    let mut contours = Vec::new();
    for i in 0..12 {
        let (sin, cos) = (i as f32 * PI / 12.0).sin_cos();
        contours.push(
            square(-5.0, -5.0, 10.0)
                .into_iter()
                .map(|p| point(p.x * cos - p.y * sin, p.x * sin + p.y * cos))
                .collect::<Vec<Point>>(),
        );
    }

    for rule in &[WindingRule::Odd, WindingRule::NonZero, WindingRule::AbsGeqTwo] {
        let options = FillOptions::DEFAULT.with_winding_rule(*rule);
        let output = test_contours(&contours, &options, None);
        assert!(fill_area(&output) <= PI * 50.0 + 1e-2);
    }

    let output = test_contours(&contours, &FillOptions::non_zero(), None);
    assert!(fill_area(&output) > 100.0);
    assert!(covers(&output, point(0.0, 0.0)));
}

#[test]
fn test_circle_area() {
    let contours = contours_for_path(
        "M10,0 A10,10 0 1,1 -10,0 A10,10 0 1,1 10,0 Z",
        &FlatteningOptions::tolerance(0.1),
    )
    .unwrap();

    let mut tess = FillTessellator::new();
    let output = tess
        .tessellate_contours(&contours, &FillOptions::non_zero())
        .unwrap();

    let expected = PI * 100.0;
    assert!((fill_area(&output) - expected).abs() < expected * 0.01);
}

#[test]
fn test_boundary_contours() {
    let contours = [square(0.0, 0.0, 10.0), reversed(square(3.0, 3.0, 4.0))];
    let options = FillOptions::DEFAULT.with_element(ElementType::BoundaryContours);
    let output = test_contours(&contours, &options, Some(0));

    assert_eq!(output.element_count, 2);
    let mut areas: Vec<f32> = output.contours().map(|c| shoelace(c).abs()).collect();
    areas.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert!(approx_eq(areas[0], 16.0, 1e-3));
    assert!(approx_eq(areas[1], 100.0, 1e-3));
    for contour in output.contours() {
        assert_eq!(contour.len(), 4);
    }

    // Overlapping squares merge into a single outline.
    let contours = [square(0.0, 0.0, 10.0), square(5.0, 5.0, 10.0)];
    let output = test_contours(&contours, &options, Some(0));
    assert_eq!(output.element_count, 1);
    let outline: Vec<&[[f32; 3]]> = output.contours().collect();
    assert_eq!(outline[0].len(), 8);
    assert!(approx_eq(shoelace(outline[0]).abs(), 175.0, 1e-3));
}

#[test]
fn test_convex_polygons() {
    let options = FillOptions::DEFAULT.with_element(ElementType::Polygons(6));

    let output = test_contours(&[square(0.0, 0.0, 10.0)], &options, Some(2));
    assert_eq!(output.element_count, 1);
    assert_eq!(output.elements.len(), 6);
    let polygon: Vec<&[u32]> = output.polygons().collect();
    assert_eq!(polygon[0].len(), 4);
    assert_eq!(&output.elements[4..], &[crate::UNDEF, crate::UNDEF]);

    // A regular hexagon fits in a single polygon, an octagon does not.
    let polygon = |n: usize| -> Vec<Point> {
        (0..n)
            .map(|i| {
                let angle = i as f32 * 2.0 * PI / n as f32;
                point(10.0 * angle.cos(), 10.0 * angle.sin())
            })
            .collect()
    };
    let output = test_contours(&[polygon(6)], &options, Some(4));
    assert_eq!(output.element_count, 1);

    let output = test_contours(&[polygon(8)], &options, Some(6));
    assert!(output.element_count >= 2);
    for p in output.polygons() {
        assert!(p.len() >= 3 && p.len() <= 6);
    }
}

#[test]
fn test_3d_projection() {
    // A square in the x = 5 plane.
    let mut tess = FillTessellator::new();
    tess.add_contour(&[
        [5.0, 0.0, 0.0],
        [5.0, 10.0, 0.0],
        [5.0, 10.0, 10.0],
        [5.0, 0.0, 10.0],
    ])
    .unwrap();
    let output = tess.tessellate(&FillOptions::DEFAULT).unwrap();

    assert_eq!(output.triangles().count(), 2);
    for v in &output.vertices {
        assert_eq!(v[0], 5.0);
    }

    // A tilted square in the z = x plane.
    tess.add_contour(&[
        [0.0, 0.0, 0.0],
        [10.0, 0.0, 10.0],
        [10.0, 10.0, 10.0],
        [0.0, 10.0, 0.0],
    ])
    .unwrap();
    let output = tess.tessellate(&FillOptions::DEFAULT).unwrap();

    let v = &output.vertices;
    let area: f32 = output
        .triangles()
        .map(|[a, b, c]| triangle_area_3d(v[a as usize], v[b as usize], v[c as usize]))
        .sum();
    assert_eq!(output.triangles().count(), 2);
    assert!(approx_eq(area, 100.0 * 2.0f32.sqrt(), 1e-3));
}

#[test]
fn test_degenerate_input() {
    // Empty.
    let output = test_contours(&[], &FillOptions::DEFAULT, Some(0));
    assert!(output.vertices.is_empty());

    // Not enough points.
    let contours = [vec![point(1.0, 1.0)], vec![point(0.0, 0.0), point(5.0, 5.0)]];
    test_contours(&contours, &FillOptions::DEFAULT, Some(0));

    // Collinear points.
    let contours = [vec![point(0.0, 0.0), point(5.0, 0.0), point(10.0, 0.0)]];
    test_contours(&contours, &FillOptions::DEFAULT, Some(0));

    // Repeated points.
    let contours = [vec![
        point(0.0, 0.0),
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(10.0, 10.0),
        point(0.0, 0.0),
    ]];
    let output = test_contours(&contours, &FillOptions::DEFAULT, Some(1));
    assert!(approx_eq(fill_area(&output), 50.0, 1e-4));
}

#[test]
fn test_nan() {
    let mut tess = FillTessellator::new();
    assert_eq!(
        tess.add_contour_2d(&[point(0.0, 0.0), point(f32::NAN, 1.0), point(1.0, 0.0)]),
        Err(TessellationError::UnsupportedParameter(
            UnsupportedParameter::PositionIsNaN
        ))
    );

    tess.add_contour_2d(&square(0.0, 0.0, 1.0)).unwrap();
    assert_eq!(
        tess.tessellate(&FillOptions::DEFAULT.with_normal([f32::NAN as f64, 0.0, 1.0])),
        Err(TessellationError::UnsupportedParameter(
            UnsupportedParameter::NormalIsNaN
        ))
    );

    // The tessellator is empty and usable after a failure.
    assert!(tess.tessellate(&FillOptions::DEFAULT).unwrap().is_empty());
    tess.add_contour_2d(&square(0.0, 0.0, 1.0)).unwrap();
    assert_eq!(tess.tessellate(&FillOptions::DEFAULT).unwrap().triangles().count(), 2);
}

#[test]
fn test_reuse_is_deterministic() {
    let contours = [square(0.0, 0.0, 10.0), square(5.0, 5.0, 10.0)];
    let mut tess = FillTessellator::new();

    tess.add_contours(&[]).unwrap();
    let first = {
        for c in &contours {
            tess.add_contour_2d(c).unwrap();
        }
        tess.tessellate(&FillOptions::odd()).unwrap()
    };
    let second = {
        for c in &contours {
            tess.add_contour_2d(c).unwrap();
        }
        tess.tessellate(&FillOptions::odd()).unwrap()
    };

    assert_eq!(first, second);
    assert!(approx_eq(fill_area(&first), 150.0, 1e-3));
}
