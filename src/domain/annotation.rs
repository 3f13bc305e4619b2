//! Annotation types for drawing on step screenshots
//!
//! All annotation types store coordinates as percentages (0-100) of the
//! host image's bounding box. List order is paint order.

use serde::{Deserialize, Serialize};

use super::geometry::{PctPoint, PctRect, clamp_percent};
use super::id::AnnotationId;
use crate::config::{ShapeColor, deserialize_lenient_color};

/// Default font size of a new text label
pub const DEFAULT_TEXT_FONT_SIZE: f32 = 16.0;

/// Fill mode for rectangles and circles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeStyle {
    /// Stroked outline
    #[default]
    Outline,
    /// Translucent fill, no stroke
    Fill,
}

/// Numbered badge centered on `x,y`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberBadge {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub text: String,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<ShapeColor>,
}

/// Free text anchored at `x,y`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLabel {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub text: String,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<ShapeColor>,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

fn default_font_size() -> f32 {
    DEFAULT_TEXT_FONT_SIZE
}

/// Axis-aligned box, `x,y` is the top-left corner
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectShape {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<ShapeColor>,
    #[serde(default)]
    pub style: ShapeStyle,
}

/// Ellipse fitted to its bounding box (not forced circular)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleShape {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<ShapeColor>,
    #[serde(default)]
    pub style: ShapeStyle,
}

/// Directed segment from `x,y` to `end_x,end_y`
///
/// Older documents stored the end point in `width`/`height`; those names are
/// accepted on input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowShape {
    pub x: f32,
    pub y: f32,
    #[serde(default, alias = "width")]
    pub end_x: f32,
    #[serde(default, alias = "height")]
    pub end_y: f32,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<ShapeColor>,
}

impl ArrowShape {
    pub fn start(&self) -> PctPoint {
        PctPoint::new(self.x, self.y)
    }

    pub fn end(&self) -> PctPoint {
        PctPoint::new(self.end_x, self.end_y)
    }

    pub fn midpoint(&self) -> PctPoint {
        PctPoint::new((self.x + self.end_x) * 0.5, (self.y + self.end_y) * 0.5)
    }
}

/// Shape payload of an annotation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnnotationKind {
    Number(NumberBadge),
    Text(TextLabel),
    Rect(RectShape),
    Circle(CircleShape),
    Arrow(ArrowShape),
}

/// Unified annotation type for ordered drawing and undo/redo
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    #[serde(flatten)]
    pub kind: AnnotationKind,
}

impl Annotation {
    /// Wrap a shape with a fresh id
    pub fn new(kind: AnnotationKind) -> Self {
        Self {
            id: AnnotationId::new(),
            kind,
        }
    }

    /// Tag used in serialized documents
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            AnnotationKind::Number(_) => "number",
            AnnotationKind::Text(_) => "text",
            AnnotationKind::Rect(_) => "rect",
            AnnotationKind::Circle(_) => "circle",
            AnnotationKind::Arrow(_) => "arrow",
        }
    }

    pub fn color(&self) -> Option<ShapeColor> {
        match &self.kind {
            AnnotationKind::Number(a) => a.color,
            AnnotationKind::Text(a) => a.color,
            AnnotationKind::Rect(a) => a.color,
            AnnotationKind::Circle(a) => a.color,
            AnnotationKind::Arrow(a) => a.color,
        }
    }

    /// Editable text content of badges and labels
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            AnnotationKind::Number(a) => Some(&a.text),
            AnnotationKind::Text(a) => Some(&a.text),
            _ => None,
        }
    }

    /// Replace the text of a badge or label. Returns false for shapes.
    pub fn set_text(&mut self, text: &str) -> bool {
        match &mut self.kind {
            AnnotationKind::Number(a) => a.text = text.to_string(),
            AnnotationKind::Text(a) => a.text = text.to_string(),
            _ => return false,
        }
        true
    }

    /// Point the user grabs to move the annotation.
    ///
    /// This is `x,y` for every shape except arrows, which are grabbed at the
    /// segment midpoint.
    pub fn move_handle(&self) -> PctPoint {
        match &self.kind {
            AnnotationKind::Number(a) => PctPoint::new(a.x, a.y),
            AnnotationKind::Text(a) => PctPoint::new(a.x, a.y),
            AnnotationKind::Rect(a) => PctPoint::new(a.x, a.y),
            AnnotationKind::Circle(a) => PctPoint::new(a.x, a.y),
            AnnotationKind::Arrow(a) => a.midpoint(),
        }
    }

    /// Move so that the handle lands on `target`.
    ///
    /// Anchors are clamped to `[0, 100]`. Arrows translate both endpoints
    /// together and the translation is limited so the whole segment stays in
    /// range.
    pub fn move_handle_to(&mut self, target: PctPoint) {
        let target = target.clamped();
        match &mut self.kind {
            AnnotationKind::Number(a) => (a.x, a.y) = (target.x, target.y),
            AnnotationKind::Text(a) => (a.x, a.y) = (target.x, target.y),
            AnnotationKind::Rect(a) => (a.x, a.y) = (target.x, target.y),
            AnnotationKind::Circle(a) => (a.x, a.y) = (target.x, target.y),
            AnnotationKind::Arrow(a) => {
                let mid = a.midpoint();
                let dx = limit_delta(target.x - mid.x, a.x, a.end_x);
                let dy = limit_delta(target.y - mid.y, a.y, a.end_y);
                a.x += dx;
                a.end_x += dx;
                a.y += dy;
                a.end_y += dy;
            }
        }
    }

    /// Copy with every coordinate forced into `[0, 100]`.
    ///
    /// Used by the compositor for annotations that arrive from imported data.
    pub fn clamped(&self) -> Annotation {
        let mut out = self.clone();
        match &mut out.kind {
            AnnotationKind::Number(a) => {
                a.x = clamp_percent(a.x);
                a.y = clamp_percent(a.y);
            }
            AnnotationKind::Text(a) => {
                a.x = clamp_percent(a.x);
                a.y = clamp_percent(a.y);
            }
            AnnotationKind::Rect(a) => {
                let r = PctRect::new(a.x, a.y, a.width, a.height).clamped();
                (a.x, a.y, a.width, a.height) = (r.x, r.y, r.width, r.height);
            }
            AnnotationKind::Circle(a) => {
                let r = PctRect::new(a.x, a.y, a.width, a.height).clamped();
                (a.x, a.y, a.width, a.height) = (r.x, r.y, r.width, r.height);
            }
            AnnotationKind::Arrow(a) => {
                a.x = clamp_percent(a.x);
                a.y = clamp_percent(a.y);
                a.end_x = clamp_percent(a.end_x);
                a.end_y = clamp_percent(a.end_y);
            }
        }
        out
    }
}

/// Clamp a translation so both coordinates stay inside `[0, 100]`
fn limit_delta(delta: f32, a: f32, b: f32) -> f32 {
    let lo = -a.min(b);
    let hi = 100.0 - a.max(b);
    if lo > hi {
        // Already out of range on both sides; leave it alone
        return 0.0;
    }
    delta.clamp(lo, hi)
}

/// Label for the next numbered badge: highest existing number plus one.
/// Badges whose text is not an integer are ignored.
pub fn next_badge_number(annotations: &[Annotation]) -> i64 {
    annotations
        .iter()
        .filter_map(|a| match &a.kind {
            AnnotationKind::Number(badge) => badge.text.trim().parse::<i64>().ok(),
            _ => None,
        })
        .max()
        .map_or(1, |max| max.saturating_add(1))
}
