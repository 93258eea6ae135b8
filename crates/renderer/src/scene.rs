//! The scene items consumed by the renderer.
//!
//! A scene is a tree of [`Mark`]s. Each mark holds items of a single type. Group
//! items hold child marks, positioned relative to the group's origin.
//!
//! The renderer only reads the scene. Unset optional fields take the same default
//! values as the visualization grammar producing them.

use crate::path::{LineCap, LineJoin};

/// The type of the items of a mark.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(rename_all = "lowercase"))]
pub enum MarkType {
    Arc,
    Area,
    Group,
    Image,
    Line,
    Path,
    Rect,
    Rule,
    Symbol,
    Text,
}

impl MarkType {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "arc" => MarkType::Arc,
            "area" => MarkType::Area,
            "group" => MarkType::Group,
            "image" => MarkType::Image,
            "line" => MarkType::Line,
            "path" => MarkType::Path,
            "rect" => MarkType::Rect,
            "rule" => MarkType::Rule,
            "symbol" => MarkType::Symbol,
            "text" => MarkType::Text,
            _ => {
                return None;
            }
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            MarkType::Arc => "arc",
            MarkType::Area => "area",
            MarkType::Group => "group",
            MarkType::Image => "image",
            MarkType::Line => "line",
            MarkType::Path => "path",
            MarkType::Rect => "rect",
            MarkType::Rule => "rule",
            MarkType::Symbol => "symbol",
            MarkType::Text => "text",
        }
    }

    /// Line and area marks draw all of their items as a single shape.
    pub fn is_single_shape(self) -> bool {
        matches!(self, MarkType::Line | MarkType::Area)
    }
}

/// How a fill or stroke is painted.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(untagged))]
pub enum Paint {
    /// A CSS color.
    Color(String),
    /// A gradient, referenced by id. Gradients are not drawn on the GPU.
    Gradient { gradient: String },
}

impl Paint {
    pub fn color(color: &str) -> Self {
        Paint::Color(color.to_string())
    }

    pub fn is_gradient(&self) -> bool {
        matches!(self, Paint::Gradient { .. })
    }
}

/// The direction of an area mark.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(rename_all = "lowercase"))]
pub enum Orient {
    /// The area spans vertically between `y` and `y2`.
    Vertical,
    /// The area spans horizontally between `x` and `x2`.
    Horizontal,
}

impl Default for Orient {
    fn default() -> Self {
        Orient::Vertical
    }
}

/// A drawable scene item.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(default, rename_all = "camelCase"))]
pub struct Item {
    pub x: f32,
    pub y: f32,
    pub x2: Option<f32>,
    pub y2: Option<f32>,
    pub width: f32,
    pub height: f32,

    pub fill: Option<Paint>,
    pub stroke: Option<Paint>,
    pub fill_opacity: Option<f32>,
    pub stroke_opacity: Option<f32>,
    pub opacity: Option<f32>,
    pub stroke_width: Option<f32>,
    pub stroke_cap: LineCap,
    pub stroke_join: LineJoin,
    pub stroke_miter_limit: Option<f32>,

    /// Path data of path marks.
    pub path: Option<String>,
    /// Rect marks.
    pub corner_radius: f32,

    /// Symbol marks: a symbol name or custom path data.
    pub shape: Option<String>,
    /// Symbol marks: the area of the symbol.
    pub size: Option<f32>,

    pub inner_radius: f32,
    pub outer_radius: f32,
    pub start_angle: f32,
    pub end_angle: f32,
    pub pad_angle: f32,

    /// Line and area marks: the name of the curve interpolator.
    pub interpolate: Option<String>,
    pub tension: Option<f32>,
    pub orient: Orient,
    /// Line and area marks: undefined items break the shape.
    pub defined: bool,

    /// Group marks: clip the children to the group's bounds.
    pub clip: bool,
    /// Group marks.
    pub items: Vec<Mark>,

    pub text: Option<String>,
    pub url: Option<String>,
}

impl Default for Item {
    fn default() -> Self {
        Item {
            x: 0.0,
            y: 0.0,
            x2: None,
            y2: None,
            width: 0.0,
            height: 0.0,
            fill: None,
            stroke: None,
            fill_opacity: None,
            stroke_opacity: None,
            opacity: None,
            stroke_width: None,
            stroke_cap: LineCap::Butt,
            stroke_join: LineJoin::Miter,
            stroke_miter_limit: None,
            path: None,
            corner_radius: 0.0,
            shape: None,
            size: None,
            inner_radius: 0.0,
            outer_radius: 0.0,
            start_angle: 0.0,
            end_angle: 0.0,
            pad_angle: 0.0,
            interpolate: None,
            tension: None,
            orient: Orient::Vertical,
            defined: true,
            clip: false,
            items: Vec::new(),
            text: None,
            url: None,
        }
    }
}

impl Item {
    pub const DEFAULT_STROKE_WIDTH: f32 = 1.0;

    pub fn new() -> Self {
        Item::default()
    }

    pub fn at(x: f32, y: f32) -> Self {
        Item {
            x,
            y,
            ..Item::default()
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_fill(mut self, color: &str) -> Self {
        self.fill = Some(Paint::color(color));
        self
    }

    pub fn with_stroke(mut self, color: &str, width: f32) -> Self {
        self.stroke = Some(Paint::color(color));
        self.stroke_width = Some(width);
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width.unwrap_or(Self::DEFAULT_STROKE_WIDTH)
    }

    /// The overall opacity, in `[0, 1]`.
    pub fn opacity(&self) -> f32 {
        clamp_unit(self.opacity.unwrap_or(1.0))
    }

    pub fn fill_opacity(&self) -> f32 {
        clamp_unit(self.fill_opacity.unwrap_or(1.0)) * self.opacity()
    }

    pub fn stroke_opacity(&self) -> f32 {
        clamp_unit(self.stroke_opacity.unwrap_or(1.0)) * self.opacity()
    }

    pub fn has_gradient(&self) -> bool {
        self.fill.as_ref().map_or(false, Paint::is_gradient)
            || self.stroke.as_ref().map_or(false, Paint::is_gradient)
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        return 0.0;
    }
    v.max(0.0).min(1.0)
}

/// A set of items of the same type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Mark {
    pub marktype: MarkType,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub items: Vec<Item>,
}

impl Mark {
    pub fn new(marktype: MarkType, items: Vec<Item>) -> Self {
        Mark { marktype, items }
    }

    /// A group mark with a single group item at the origin.
    pub fn group(children: Vec<Mark>) -> Self {
        Mark::new(
            MarkType::Group,
            vec![Item {
                items: children,
                ..Item::default()
            }],
        )
    }
}

#[test]
fn mark_type_names() {
    for name in &["arc", "area", "group", "image", "line", "path", "rect", "rule", "symbol", "text"] {
        assert_eq!(MarkType::from_name(name).unwrap().name(), *name);
    }
    assert_eq!(MarkType::from_name("trail"), None);
}

#[test]
fn opacities() {
    let mut item = Item::new();
    assert_eq!(item.fill_opacity(), 1.0);

    item.opacity = Some(0.5);
    item.fill_opacity = Some(0.5);
    item.stroke_opacity = Some(2.0);
    assert_eq!(item.fill_opacity(), 0.25);
    assert_eq!(item.stroke_opacity(), 0.5);

    item.opacity = Some(f32::NAN);
    assert_eq!(item.fill_opacity(), 0.0);
}
