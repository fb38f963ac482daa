//! Core types of the draw list

use glam::DVec2;

use crate::model::ElementId;
use crate::types::{Degrees, Rect};

use super::defaults;

/// Fill or stroke paint.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Paint {
    #[default]
    None,
    Color(String),
    Gradient(Gradient),
}

impl Paint {
    /// Colour paint; `"none"` and empty strings become [`Paint::None`].
    pub fn color(color: impl Into<String>) -> Self {
        let color = color.into();
        if color.trim().is_empty() || color == defaults::NONE {
            Paint::None
        } else {
            Paint::Color(color)
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Paint::None)
    }
}

/// Which way a linear gradient runs, from offset 0 to offset 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientDirection {
    LeftToRight,
    BottomToTop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: String,
}

impl GradientStop {
    pub fn new(offset: f64, color: impl Into<String>) -> Self {
        Self {
            offset,
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub direction: GradientDirection,
    pub stops: Vec<GradientStop>,
}

/// Fill and stroke of one primitive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    pub fill: Paint,
    pub stroke: Paint,
    pub stroke_width: f64,
    pub dashed: bool,
}

impl Style {
    pub fn filled(color: impl Into<String>) -> Self {
        Style {
            fill: Paint::color(color),
            ..Style::default()
        }
    }

    pub fn stroked(color: impl Into<String>, width: f64) -> Self {
        Style {
            stroke: Paint::color(color),
            stroke_width: width,
            ..Style::default()
        }
    }

    pub fn with_stroke(mut self, color: impl Into<String>, width: f64) -> Self {
        self.stroke = Paint::color(color);
        self.stroke_width = width;
        self
    }

    pub fn with_fill(mut self, fill: Paint) -> Self {
        self.fill = fill;
        self
    }

    pub fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

/// A text run. `position` is the anchor point on the vertical centre line.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub position: DVec2,
    pub text: String,
    pub color: String,
    pub font_size: f64,
    pub anchor: TextAnchor,
    pub bold: bool,
}

impl Label {
    pub fn new(position: DVec2, text: impl Into<String>, color: impl Into<String>) -> Self {
        Label {
            position,
            text: text.into(),
            color: color.into(),
            font_size: defaults::FONT_SIZE,
            anchor: TextAnchor::Middle,
            bold: false,
        }
    }

    pub fn size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// A drawable primitive in element-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        rect: Rect,
        corner_radius: f64,
        style: Style,
    },
    Circle {
        center: DVec2,
        radius: f64,
        style: Style,
    },
    Ellipse {
        center: DVec2,
        radii: DVec2,
        style: Style,
    },
    Line {
        from: DVec2,
        to: DVec2,
        style: Style,
    },
    Polyline {
        points: Vec<DVec2>,
        style: Style,
    },
    Polygon {
        points: Vec<DVec2>,
        style: Style,
    },
    /// Smooth curve through `points` with cardinal-spline `tension`.
    Spline {
        points: Vec<DVec2>,
        tension: f64,
        style: Style,
    },
    /// Annular sector; `inner_radius == 0` gives a pie slice.
    Wedge {
        center: DVec2,
        inner_radius: f64,
        outer_radius: f64,
        start: Degrees,
        end: Degrees,
        style: Style,
    },
    Text(Label),
}

impl Primitive {
    pub fn rect(rect: Rect, style: Style) -> Self {
        Primitive::Rect {
            rect,
            corner_radius: 0.0,
            style,
        }
    }

    pub fn line(from: DVec2, to: DVec2, style: Style) -> Self {
        Primitive::Line { from, to, style }
    }

    pub fn style(&self) -> Option<&Style> {
        match self {
            Primitive::Rect { style, .. }
            | Primitive::Circle { style, .. }
            | Primitive::Ellipse { style, .. }
            | Primitive::Line { style, .. }
            | Primitive::Polyline { style, .. }
            | Primitive::Polygon { style, .. }
            | Primitive::Spline { style, .. }
            | Primitive::Wedge { style, .. } => Some(style),
            Primitive::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Label> {
        match self {
            Primitive::Text(label) => Some(label),
            _ => None,
        }
    }
}

/// Placement of an element: translate to its origin, rotate about that
/// origin, then fade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate: DVec2,
    pub rotation: Degrees,
    pub opacity: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translate: DVec2::ZERO,
        rotation: Degrees::ZERO,
        opacity: 1.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Map an element-local point to scene coordinates.
    pub fn apply(&self, local: DVec2) -> DVec2 {
        self.translate + self.rotation.unit().rotate(local)
    }
}

/// One element's (or one background layer's) primitives.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub element_id: Option<ElementId>,
    pub transform: Transform,
    pub primitives: Vec<Primitive>,
    /// Whether pointer events may target this item.
    pub interactive: bool,
}

impl DrawItem {
    /// A non-interactive layer in scene coordinates.
    pub fn decoration(primitives: Vec<Primitive>) -> Self {
        DrawItem {
            element_id: None,
            transform: Transform::IDENTITY,
            primitives,
            interactive: false,
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.primitives.iter().filter_map(Primitive::as_text)
    }
}

/// Output of one render pass: page, background layers, elements in
/// z-order and the selection overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawList {
    pub page: Rect,
    pub background: Vec<DrawItem>,
    pub items: Vec<DrawItem>,
    pub overlay: Vec<DrawItem>,
}

impl DrawList {
    pub fn item(&self, id: &ElementId) -> Option<&DrawItem> {
        self.items.iter().find(|i| i.element_id.as_ref() == Some(id))
    }
}
