//! Conversion of scene items into path data.
//!
//! Each mark type has a builder producing SVG path data in the item's local
//! coordinates, along with the translation placing it in the scene. Keeping the
//! path local lets identical shapes at different positions share their
//! tessellation in the geometry cache.

pub mod arc;
pub mod curve;
pub mod rect;
pub mod symbol;
pub mod writer;

pub use self::arc::ArcParams;
pub use self::curve::{AreaPoint, Interpolate};
pub use self::symbol::SymbolShape;
pub use self::writer::PathWriter;

use crate::math::{point, vector, Vector};
use crate::scene::{Item, MarkType, Orient};
use crate::RenderError;

/// The path of a shape and its position.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkPath {
    pub path: String,
    pub translate: Vector,
}

impl MarkPath {
    fn new(path: PathWriter, translate: Vector) -> Self {
        MarkPath {
            path: path.into_string(),
            translate,
        }
    }
}

/// The path of an item drawn on its own.
///
/// Returns `None` for item types that produce no path (text, images, and the
/// items of line and area marks which are drawn together by [`mark_path`]).
pub fn item_path(marktype: MarkType, item: &Item) -> Result<Option<MarkPath>, RenderError> {
    let translate = vector(item.x, item.y);

    let path = match marktype {
        MarkType::Rect | MarkType::Group => {
            rect::rect(item.width, item.height, item.corner_radius)
        }
        MarkType::Rule => {
            let x2 = item.x2.unwrap_or(item.x);
            let y2 = item.y2.unwrap_or(item.y);
            rect::rule(x2 - item.x, y2 - item.y)
        }
        MarkType::Arc => arc::arc(&ArcParams {
            inner_radius: item.inner_radius,
            outer_radius: item.outer_radius,
            start_angle: item.start_angle,
            end_angle: item.end_angle,
            pad_angle: item.pad_angle,
        }),
        MarkType::Symbol => {
            let size = item.size.unwrap_or(symbol::DEFAULT_SIZE);
            let name = item.shape.as_deref().unwrap_or("circle");
            match SymbolShape::from_name(name) {
                Some(shape) => symbol::symbol(shape, size),
                None => symbol::custom_symbol(name, size)
                    .map_err(|e| RenderError::from(e).in_mark(marktype))?,
            }
        }
        MarkType::Path => {
            return Ok(item.path.as_ref().map(|path| MarkPath {
                path: path.clone(),
                translate,
            }));
        }
        MarkType::Line | MarkType::Area | MarkType::Image | MarkType::Text => {
            return Ok(None);
        }
    };

    if path.is_empty() {
        return Ok(None);
    }

    Ok(Some(MarkPath::new(path, translate)))
}

/// The single path of a line or area mark, using the style of the first item.
pub fn mark_path(marktype: MarkType, items: &[Item]) -> Option<MarkPath> {
    let first = items.first()?;
    let interpolate = Interpolate::from_name(
        first.interpolate.as_deref().unwrap_or("linear"),
        first.tension,
    );

    let path = match marktype {
        MarkType::Line => {
            let points: Vec<_> = items
                .iter()
                .map(|item| (point(item.x, item.y), item.defined))
                .collect();
            curve::line(&points, interpolate)
        }
        MarkType::Area => {
            let points: Vec<AreaPoint> = items
                .iter()
                .map(|item| {
                    let base = match first.orient {
                        Orient::Vertical => point(item.x, item.y2.unwrap_or(0.0)),
                        Orient::Horizontal => point(item.x2.unwrap_or(0.0), item.y),
                    };
                    AreaPoint {
                        top: point(item.x, item.y),
                        base,
                        defined: item.defined,
                    }
                })
                .collect();
            curve::area(&points, interpolate)
        }
        _ => {
            return None;
        }
    };

    if path.is_empty() {
        return None;
    }

    Some(MarkPath::new(path, vector(0.0, 0.0)))
}

#[test]
fn rect_items_are_local() {
    let item = Item::at(5.0, 6.0).with_size(10.0, 20.0);
    let p = item_path(MarkType::Rect, &item).unwrap().unwrap();
    assert_eq!(p.path, "M0,0L10,0L10,20L0,20Z");
    assert_eq!(p.translate, vector(5.0, 6.0));

    // Same size, same path.
    let other = Item::at(50.0, 0.0).with_size(10.0, 20.0);
    assert_eq!(item_path(MarkType::Rect, &other).unwrap().unwrap().path, p.path);
}

#[test]
fn rule_item() {
    let item = Item {
        x2: Some(4.0),
        y2: Some(-1.0),
        ..Item::at(1.0, 2.0)
    };
    let p = item_path(MarkType::Rule, &item).unwrap().unwrap();
    assert_eq!(p.path, "M0,0L3,-3");
}

#[test]
fn path_items_keep_their_path() {
    let item = Item::at(1.0, 1.0).with_path("M0,0 L10,0 L10,10 Z");
    let p = item_path(MarkType::Path, &item).unwrap().unwrap();
    assert_eq!(p.path, "M0,0 L10,0 L10,10 Z");
    assert_eq!(p.translate, vector(1.0, 1.0));

    assert_eq!(item_path(MarkType::Path, &Item::new()).unwrap(), None);
    assert_eq!(item_path(MarkType::Text, &Item::new()).unwrap(), None);
}

#[test]
fn invalid_custom_symbol() {
    let item = Item {
        shape: Some("M0,0 L".to_string()),
        ..Item::new()
    };
    match item_path(MarkType::Symbol, &item) {
        Err(RenderError::Path { mark, .. }) => assert_eq!(mark, MarkType::Symbol),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn line_and_area_marks() {
    let items: Vec<Item> = (0..3)
        .map(|i| Item {
            y2: Some(10.0),
            ..Item::at(i as f32 * 10.0, i as f32)
        })
        .collect();

    let line = mark_path(MarkType::Line, &items).unwrap();
    assert_eq!(line.path, "M0,0L10,1L20,2");

    let area = mark_path(MarkType::Area, &items).unwrap();
    assert_eq!(area.path, "M0,0L10,1L20,2L20,10L10,10L0,10Z");

    let mut horizontal = items.clone();
    horizontal[0].orient = Orient::Horizontal;
    let area = mark_path(MarkType::Area, &horizontal).unwrap();
    assert_eq!(area.path, "M0,0L10,1L20,2L0,2L0,1L0,0Z");

    assert_eq!(mark_path(MarkType::Line, &[]), None);
    assert_eq!(mark_path(MarkType::Rect, &items), None);
}
