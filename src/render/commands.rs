//! Backend-agnostic drawing commands
//!
//! `plan` turns an annotation list into primitive draw ops in pixel space.
//! A `Surface` executes them; `render::image` has the tiny-skia one used for
//! export, tests can record ops instead of rasterizing.

use crate::config::ShapeColor;
use crate::domain::{Annotation, AnnotationKind, ShapeStyle, ellipse_from_bounds, percent_to_pixel};

use super::geometry::{self, arrow, badge, shape, text};

/// Colour used when an annotation has none
pub const FALLBACK_COLOR: ShapeColor = ShapeColor::RED;

/// Straight (non-premultiplied) RGBA paint colour
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaintColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PaintColor {
    pub const WHITE: PaintColor = PaintColor::opaque(ShapeColor::WHITE);

    pub const fn opaque(c: ShapeColor) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: 255,
        }
    }

    /// Same colour at the given opacity (0.0-1.0)
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }
}

/// Horizontal anchoring of text relative to its x coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Vertical anchoring of text relative to its y coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextBaseline {
    /// y is the alphabetic baseline
    Alphabetic,
    /// y is the middle of the em box
    Middle,
}

/// How glyphs are painted
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextPaint {
    Fill(PaintColor),
    Stroke { color: PaintColor, width: f32 },
}

/// A single primitive, in image pixel coordinates
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Stroked segment with round caps and joins
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: PaintColor,
    },
    FillPolygon {
        points: Vec<(f32, f32)>,
        color: PaintColor,
    },
    StrokeRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        width: f32,
        color: PaintColor,
    },
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: PaintColor,
    },
    StrokeEllipse {
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
        width: f32,
        color: PaintColor,
    },
    FillEllipse {
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
        color: PaintColor,
    },
    FillCircle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: PaintColor,
    },
    StrokeCircle {
        cx: f32,
        cy: f32,
        radius: f32,
        width: f32,
        color: PaintColor,
    },
    /// Bold sans-serif text
    Text {
        x: f32,
        y: f32,
        text: String,
        size: f32,
        align: TextAlign,
        baseline: TextBaseline,
        paint: TextPaint,
    },
}

/// Something that can execute draw ops
pub trait Surface {
    fn draw(&mut self, op: &DrawOp);
}

/// Execute ops in order
pub fn execute<S: Surface + ?Sized>(surface: &mut S, ops: &[DrawOp]) {
    for op in ops {
        surface.draw(op);
    }
}

/// Plan the draw ops for an annotation list on an image of `width x height`.
///
/// Ops are emitted in paint order (list order). Coordinates are clamped to
/// the image first, so imported out-of-range data cannot draw outside it.
pub fn plan(annotations: &[Annotation], width: u32, height: u32) -> Vec<DrawOp> {
    let scale = geometry::scale_factor(width);
    let px = |v: f32| percent_to_pixel(v, width);
    let py = |v: f32| percent_to_pixel(v, height);
    let mut ops = Vec::with_capacity(annotations.len() * 2);

    for annotation in annotations {
        let annotation = annotation.clamped();
        let color = PaintColor::opaque(annotation.color().unwrap_or(FALLBACK_COLOR));

        match &annotation.kind {
            AnnotationKind::Arrow(a) => {
                let (sx, sy, ex, ey) = (px(a.x), py(a.y), px(a.end_x), py(a.end_y));
                ops.push(DrawOp::Line {
                    from: (sx, sy),
                    to: (ex, ey),
                    width: arrow::THICKNESS * scale,
                    color,
                });
                let (w1x, w1y, w2x, w2y) =
                    arrow::head_points(sx, sy, ex, ey, arrow::HEAD_LENGTH * scale);
                ops.push(DrawOp::FillPolygon {
                    points: vec![(ex, ey), (w1x, w1y), (w2x, w2y)],
                    color,
                });
            }
            AnnotationKind::Rect(r) => {
                let (x, y, w, h) = (px(r.x), py(r.y), px(r.width), py(r.height));
                ops.push(match r.style {
                    ShapeStyle::Fill => DrawOp::FillRect {
                        x,
                        y,
                        w,
                        h,
                        color: color.with_alpha(shape::FILL_ALPHA),
                    },
                    ShapeStyle::Outline => DrawOp::StrokeRect {
                        x,
                        y,
                        w,
                        h,
                        width: shape::THICKNESS * scale,
                        color,
                    },
                });
            }
            AnnotationKind::Circle(c) => {
                let (x, y, w, h) = (px(c.x), py(c.y), px(c.width), py(c.height));
                let (cx, cy, rx, ry) = ellipse_from_bounds(x, y, x + w, y + h);
                ops.push(match c.style {
                    ShapeStyle::Fill => DrawOp::FillEllipse {
                        cx,
                        cy,
                        rx,
                        ry,
                        color: color.with_alpha(shape::FILL_ALPHA),
                    },
                    ShapeStyle::Outline => DrawOp::StrokeEllipse {
                        cx,
                        cy,
                        rx,
                        ry,
                        width: shape::THICKNESS * scale,
                        color,
                    },
                });
            }
            AnnotationKind::Number(b) => {
                let (cx, cy) = (px(b.x), py(b.y));
                let radius = badge::RADIUS * scale;
                ops.push(DrawOp::FillCircle {
                    cx,
                    cy,
                    radius,
                    color,
                });
                ops.push(DrawOp::StrokeCircle {
                    cx,
                    cy,
                    radius,
                    width: badge::RING * scale,
                    color: PaintColor::WHITE,
                });
                ops.push(DrawOp::Text {
                    x: cx,
                    y: cy,
                    text: b.text.clone(),
                    size: badge::FONT_SIZE * scale,
                    align: TextAlign::Center,
                    baseline: TextBaseline::Middle,
                    paint: TextPaint::Fill(PaintColor::WHITE),
                });
            }
            AnnotationKind::Text(t) => {
                let (x, y) = (px(t.x), py(t.y));
                let size = text::FONT_SIZE * scale;
                // White outline first, coloured fill on top
                ops.push(DrawOp::Text {
                    x,
                    y,
                    text: t.text.clone(),
                    size,
                    align: TextAlign::Center,
                    baseline: TextBaseline::Alphabetic,
                    paint: TextPaint::Stroke {
                        color: PaintColor::WHITE,
                        width: text::OUTLINE * scale,
                    },
                });
                ops.push(DrawOp::Text {
                    x,
                    y,
                    text: t.text.clone(),
                    size,
                    align: TextAlign::Center,
                    baseline: TextBaseline::Alphabetic,
                    paint: TextPaint::Fill(color),
                });
            }
        }
    }

    ops
}
