use crate::gpu::*;
use crate::math::{point, vector, Box2D, Vector};
use crate::scene::{Item, Mark, MarkType, Paint};
use crate::RenderError;

use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Create(BufferId),
    Upload(BufferId),
    Delete(BufferId),
    Translate(Vector),
    Clip(Option<Box2D>),
    Draw(BufferId, BufferId, u32),
}

#[derive(Default)]
struct RecordingContext {
    next_id: u32,
    buffers: HashMap<BufferId, Vec<u8>>,
    calls: Vec<Call>,
    frames: usize,
}

impl RecordingContext {
    fn floats(&self, buffer: BufferId) -> Vec<f32> {
        self.buffers[&buffer]
            .chunks(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    fn draws(&self) -> Vec<(BufferId, BufferId, u32)> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                Call::Draw(v, c, n) => Some((v, c, n)),
                _ => None,
            })
            .collect()
    }

    fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| f(call)).count()
    }
}

impl GpuContext for RecordingContext {
    fn resize(&mut self, _: u32, _: u32, _: f32) {}

    fn begin_frame(&mut self, _: bool) {
        self.frames += 1;
        self.calls.clear();
    }

    fn end_frame(&mut self) {}

    fn create_buffer(&mut self) -> BufferId {
        let id = BufferId(self.next_id);
        self.next_id += 1;
        self.buffers.insert(id, Vec::new());
        self.calls.push(Call::Create(id));
        id
    }

    fn buffer_data(&mut self, buffer: BufferId, data: &[u8]) {
        self.buffers.insert(buffer, data.to_vec());
        self.calls.push(Call::Upload(buffer));
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
        self.calls.push(Call::Delete(buffer));
    }

    fn set_translate(&mut self, offset: Vector) {
        self.calls.push(Call::Translate(offset));
    }

    fn set_clip(&mut self, clip: Option<Box2D>) {
        self.calls.push(Call::Clip(clip));
    }

    fn draw_triangles(&mut self, vertices: BufferId, colors: BufferId, vertex_count: u32) {
        self.calls.push(Call::Draw(vertices, colors, vertex_count));
    }
}

#[derive(Default)]
struct RecordingFallback {
    draws: Vec<(MarkType, usize, Vector)>,
}

impl FallbackLayer for RecordingFallback {
    fn resize(&mut self, _: u32, _: u32, _: f32) {}
    fn clear(&mut self) {
        self.draws.clear();
    }
    fn draw(&mut self, marktype: MarkType, items: &[Item], translate: Vector) {
        self.draws.push((marktype, items.len(), translate));
    }
}

type TestRenderer = GpuRenderer<RecordingContext, RecordingFallback>;

fn renderer() -> TestRenderer {
    let mut renderer = GpuRenderer::new(RecordingContext::default(), RecordingFallback::default());
    renderer.initialize(200, 100, vector(0.0, 0.0));
    renderer
}

fn rects(items: Vec<Item>) -> Mark {
    Mark::group(vec![Mark::new(MarkType::Rect, items)])
}

fn triangle_area(positions: &[f32]) -> f32 {
    positions
        .chunks(9)
        .map(|t| {
            let a = point(t[0], t[1]);
            let b = point(t[3], t[4]);
            let c = point(t[6], t[7]);
            ((b - a).cross(c - a) * 0.5).abs()
        })
        .sum()
}

#[test]
fn render_before_initialize() {
    let mut renderer = GpuRenderer::new(RecordingContext::default(), NoFallback);
    assert_eq!(
        renderer.render(&Mark::group(Vec::new())),
        Err(RenderError::NotInitialized)
    );
}

#[test]
fn filled_rect() {
    let mut renderer = renderer();
    let scene = rects(vec![Item::at(10.0, 20.0).with_size(10.0, 10.0).with_fill("red")]);

    assert_eq!(
        renderer.render(&scene),
        Ok(RenderStatus::Rendered { draw_calls: 1 })
    );

    let ctx = renderer.context();
    let draws = ctx.draws();
    assert_eq!(draws.len(), 1);
    let (vertices, colors, count) = draws[0];
    assert_eq!(count, 6);
    assert!(ctx.calls.contains(&Call::Translate(vector(10.0, 20.0))));

    let positions = ctx.floats(vertices);
    assert_eq!(positions.len(), 18);
    assert!((triangle_area(&positions) - 100.0).abs() < 1e-3);

    let rgba = ctx.floats(colors);
    assert_eq!(rgba.len(), 24);
    for color in rgba.chunks(4) {
        assert_eq!(color, &[1.0, 0.0, 0.0, 1.0]);
    }
}

#[test]
fn origin_offsets_the_scene() {
    let mut renderer = GpuRenderer::new(RecordingContext::default(), RecordingFallback::default());
    renderer.initialize(200, 100, vector(3.0, 4.0));
    let scene = rects(vec![Item::at(10.0, 20.0).with_size(10.0, 10.0).with_fill("red")]);
    renderer.render(&scene).unwrap();
    assert!(renderer
        .context()
        .calls
        .contains(&Call::Translate(vector(13.0, 24.0))));
}

#[test]
fn buffers_are_reused_until_the_item_changes() {
    let mut renderer = renderer();
    let mut item = Item::at(0.0, 0.0).with_size(10.0, 10.0).with_fill("red");

    renderer.render(&rects(vec![item.clone()])).unwrap();
    assert_eq!(renderer.context().count(|c| matches!(c, Call::Create(_))), 2);
    assert_eq!(renderer.live_buffers(), 1);

    // Same item, moved: the buffers are kept.
    item.x = 50.0;
    renderer.render(&rects(vec![item.clone()])).unwrap();
    let ctx = renderer.context();
    assert_eq!(ctx.count(|c| matches!(c, Call::Create(_) | Call::Upload(_))), 0);
    assert_eq!(ctx.draws().len(), 1);
    assert!(ctx.calls.contains(&Call::Translate(vector(50.0, 0.0))));

    // New color: the old buffers are replaced.
    item.fill = Some(Paint::color("blue"));
    renderer.render(&rects(vec![item])).unwrap();
    let ctx = renderer.context();
    assert_eq!(ctx.count(|c| matches!(c, Call::Delete(_))), 2);
    assert_eq!(ctx.count(|c| matches!(c, Call::Create(_))), 2);
    let (_, colors, _) = ctx.draws()[0];
    assert_eq!(&ctx.floats(colors)[..4], &[0.0, 0.0, 1.0, 1.0]);
    assert_eq!(renderer.live_buffers(), 1);
    // Both items share the cached shape.
    assert_eq!(renderer.cache().len(), 1);
}

#[test]
fn removed_items_release_their_buffers() {
    let mut renderer = renderer();
    let a = Item::at(0.0, 0.0).with_size(10.0, 10.0).with_fill("red");
    let b = Item::at(20.0, 0.0).with_size(5.0, 5.0).with_fill("red");

    renderer.render(&rects(vec![a.clone(), b])).unwrap();
    assert_eq!(renderer.live_buffers(), 2);

    renderer.render(&rects(vec![a])).unwrap();
    assert_eq!(renderer.live_buffers(), 1);
    assert_eq!(renderer.context().count(|c| matches!(c, Call::Delete(_))), 2);

    renderer.release_buffers();
    assert_eq!(renderer.live_buffers(), 0);
    assert!(renderer.context().buffers.is_empty());
}

#[test]
fn groups_translate_and_clip() {
    let mut renderer = renderer();
    let inner = Item {
        clip: true,
        items: vec![Mark::new(
            MarkType::Rect,
            vec![Item::at(1.0, 1.0).with_size(20.0, 20.0).with_fill("red")],
        )],
        ..Item::at(5.0, 5.0).with_size(10.0, 10.0).with_fill("blue")
    };
    let scene = Mark::group(vec![Mark::new(MarkType::Group, vec![inner])]);

    assert_eq!(
        renderer.render(&scene),
        Ok(RenderStatus::Rendered { draw_calls: 2 })
    );

    let calls = &renderer.context().calls;
    let clip = Box2D::new(point(5.0, 5.0), point(15.0, 15.0));
    let clip_at = calls.iter().position(|c| *c == Call::Clip(Some(clip))).unwrap();
    let child_at = calls
        .iter()
        .position(|c| *c == Call::Translate(vector(6.0, 6.0)))
        .unwrap();
    let restored_at = calls.iter().rposition(|c| *c == Call::Clip(None)).unwrap();
    assert!(clip_at < child_at);
    assert!(child_at < restored_at);

    // The background is drawn before the clip is set.
    let background_at = calls
        .iter()
        .position(|c| *c == Call::Translate(vector(5.0, 5.0)))
        .unwrap();
    assert!(background_at < clip_at);
}

#[test]
fn nested_clips_intersect() {
    let mut renderer = renderer();
    let inner = Item {
        clip: true,
        items: vec![Mark::new(
            MarkType::Rect,
            vec![Item::new().with_size(1.0, 1.0).with_fill("red")],
        )],
        ..Item::at(5.0, 5.0).with_size(20.0, 20.0)
    };
    let outer = Item {
        clip: true,
        items: vec![Mark::new(MarkType::Group, vec![inner])],
        ..Item::at(0.0, 0.0).with_size(10.0, 10.0)
    };
    let scene = Mark::new(MarkType::Group, vec![outer]);
    renderer.render(&scene).unwrap();

    let expected = Box2D::new(point(5.0, 5.0), point(10.0, 10.0));
    assert!(renderer.context().calls.contains(&Call::Clip(Some(expected))));
}

#[test]
fn fallback_items() {
    let mut renderer = renderer();
    let gradient = Item {
        fill: Some(Paint::Gradient {
            gradient: "g0".to_string(),
        }),
        ..Item::new().with_size(10.0, 10.0)
    };
    let group = Item {
        items: vec![
            Mark::new(MarkType::Text, vec![Item::new(), Item::new()]),
            Mark::new(MarkType::Image, vec![Item::new()]),
            Mark::new(MarkType::Rect, vec![gradient]),
        ],
        ..Item::at(7.0, 8.0)
    };

    let status = renderer.render(&Mark::new(MarkType::Group, vec![group])).unwrap();
    assert_eq!(status, RenderStatus::Rendered { draw_calls: 0 });

    let offset = vector(7.0, 8.0);
    assert_eq!(
        renderer.fallback().draws,
        vec![
            (MarkType::Text, 2, offset),
            (MarkType::Image, 1, offset),
            (MarkType::Rect, 1, offset),
        ]
    );
}

#[test]
fn rendering_waits_for_images() {
    let mut renderer = renderer();
    let scene = rects(vec![Item::new().with_size(10.0, 10.0).with_fill("red")]);

    renderer.image_loading();
    renderer.image_loading();
    assert_eq!(renderer.render(&scene), Ok(RenderStatus::Deferred));
    assert_eq!(renderer.context().frames, 0);

    renderer.image_loaded();
    assert_eq!(renderer.render(&scene), Ok(RenderStatus::Deferred));
    renderer.image_loaded();
    assert_eq!(
        renderer.render(&scene),
        Ok(RenderStatus::Rendered { draw_calls: 1 })
    );
}

#[test]
fn invisible_items_are_skipped() {
    let mut renderer = renderer();
    let items = vec![
        Item::new().with_size(10.0, 10.0),
        Item::new().with_size(10.0, 10.0).with_fill("none"),
        Item::new().with_size(10.0, 10.0).with_fill("not-a-color"),
        Item {
            opacity: Some(0.0),
            ..Item::new().with_size(10.0, 10.0).with_fill("red")
        },
        Item::new().with_size(10.0, 10.0).with_stroke("red", 0.0),
    ];
    assert_eq!(
        renderer.render(&rects(items)),
        Ok(RenderStatus::Rendered { draw_calls: 0 })
    );
    assert_eq!(renderer.live_buffers(), 0);
}

#[test]
fn opacity_scales_alpha() {
    let mut renderer = renderer();
    let item = Item {
        opacity: Some(0.5),
        fill_opacity: Some(0.5),
        ..Item::new().with_size(10.0, 10.0).with_fill("red")
    };
    renderer.render(&rects(vec![item])).unwrap();
    let ctx = renderer.context();
    let (_, colors, _) = ctx.draws()[0];
    assert_eq!(&ctx.floats(colors)[..4], &[1.0, 0.0, 0.0, 0.25]);
}

#[test]
fn line_marks_use_a_single_draw_call() {
    let mut renderer = renderer();
    let items: Vec<Item> = (0..4)
        .map(|i| Item::at(i as f32 * 10.0, (i % 2) as f32 * 10.0).with_stroke("red", 2.0))
        .collect();
    let scene = Mark::group(vec![Mark::new(MarkType::Line, items)]);

    assert_eq!(
        renderer.render(&scene),
        Ok(RenderStatus::Rendered { draw_calls: 1 })
    );
    let (_, _, count) = renderer.context().draws()[0];
    assert!(count >= 18);
}

#[test]
fn invalid_path_data() {
    let mut renderer = renderer();
    let scene = Mark::group(vec![Mark::new(
        MarkType::Path,
        vec![Item::new().with_path("M0,0 L10").with_fill("red")],
    )]);

    match renderer.render(&scene) {
        Err(RenderError::Path { mark, .. }) => assert_eq!(mark, MarkType::Path),
        other => panic!("unexpected {:?}", other),
    }

    // The renderer is still usable.
    let scene = rects(vec![Item::new().with_size(10.0, 10.0).with_fill("red")]);
    assert_eq!(
        renderer.render(&scene),
        Ok(RenderStatus::Rendered { draw_calls: 1 })
    );
}
