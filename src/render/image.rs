//! Image rendering for annotations using tiny-skia
//!
//! `PixmapSurface` executes draw ops on a pixmap; `draw_annotations_in_order`
//! wraps an `RgbaImage` in one, draws, and copies the result back.

use image::RgbaImage;
use tiny_skia::{
    ColorU8, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform,
};

use super::commands::{self, DrawOp, PaintColor, Surface, TextPaint};
use super::geometry::shape;
use super::text;
use crate::domain::Annotation;

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back.
///
/// The image holds straight alpha; tiny-skia works premultiplied.
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let Some(mut pixmap) = Pixmap::new(img.width(), img.height()) else {
        return;
    };

    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    f(&mut pixmap);

    // Copy back
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
}

fn paint_for(color: PaintColor) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn round_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

/// Build an ellipse path using cubic bezier curves
fn build_ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<Path> {
    let kx = rx * shape::BEZIER_K;
    let ky = ry * shape::BEZIER_K;

    let mut pb = PathBuilder::new();

    // Start at top
    pb.move_to(cx, cy - ry);
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);

    pb.close();
    pb.finish()
}

fn build_polygon_path(points: &[(f32, f32)]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.0, first.1);
    for &(x, y) in rest {
        pb.line_to(x, y);
    }
    pb.close();
    pb.finish()
}

fn build_rect_path(x: f32, y: f32, w: f32, h: f32) -> Option<Path> {
    tiny_skia::Rect::from_xywh(x, y, w, h).map(PathBuilder::from_rect)
}

/// tiny-skia backed `Surface`
pub struct PixmapSurface<'a> {
    pixmap: &'a mut Pixmap,
}

impl<'a> PixmapSurface<'a> {
    pub fn new(pixmap: &'a mut Pixmap) -> Self {
        Self { pixmap }
    }

    fn fill(&mut self, path: Option<Path>, color: PaintColor) {
        if let Some(path) = path {
            self.pixmap.fill_path(
                &path,
                &paint_for(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn stroke(&mut self, path: Option<Path>, width: f32, color: PaintColor) {
        if let Some(path) = path {
            self.pixmap.stroke_path(
                &path,
                &paint_for(color),
                &round_stroke(width),
                Transform::identity(),
                None,
            );
        }
    }
}

impl Surface for PixmapSurface<'_> {
    fn draw(&mut self, op: &DrawOp) {
        match op {
            DrawOp::Line {
                from,
                to,
                width,
                color,
            } => {
                let mut pb = PathBuilder::new();
                pb.move_to(from.0, from.1);
                pb.line_to(to.0, to.1);
                self.stroke(pb.finish(), *width, *color);
            }
            DrawOp::FillPolygon { points, color } => {
                self.fill(build_polygon_path(points), *color);
            }
            DrawOp::StrokeRect {
                x,
                y,
                w,
                h,
                width,
                color,
            } => {
                self.stroke(build_rect_path(*x, *y, *w, *h), *width, *color);
            }
            DrawOp::FillRect { x, y, w, h, color } => {
                if let Some(rect) = tiny_skia::Rect::from_xywh(*x, *y, *w, *h) {
                    self.pixmap
                        .fill_rect(rect, &paint_for(*color), Transform::identity(), None);
                }
            }
            DrawOp::StrokeEllipse {
                cx,
                cy,
                rx,
                ry,
                width,
                color,
            } => {
                self.stroke(build_ellipse_path(*cx, *cy, *rx, *ry), *width, *color);
            }
            DrawOp::FillEllipse {
                cx,
                cy,
                rx,
                ry,
                color,
            } => {
                self.fill(build_ellipse_path(*cx, *cy, *rx, *ry), *color);
            }
            DrawOp::FillCircle {
                cx,
                cy,
                radius,
                color,
            } => {
                self.fill(PathBuilder::from_circle(*cx, *cy, *radius), *color);
            }
            DrawOp::StrokeCircle {
                cx,
                cy,
                radius,
                width,
                color,
            } => {
                self.stroke(PathBuilder::from_circle(*cx, *cy, *radius), *width, *color);
            }
            DrawOp::Text {
                x,
                y,
                text,
                size,
                align,
                baseline,
                paint,
            } => {
                let Some(font) = text::annotation_font() else {
                    return;
                };
                let path = text::text_path(font, text, *size, *x, *y, *align, *baseline);
                match *paint {
                    TextPaint::Fill(color) => self.fill(path, color),
                    TextPaint::Stroke { color, width } => self.stroke(path, width, color),
                }
            }
        }
    }
}

/// Draw all annotations onto an image in list order (later on top)
pub fn draw_annotations_in_order(img: &mut RgbaImage, annotations: &[Annotation]) {
    if annotations.is_empty() {
        return;
    }

    let ops = commands::plan(annotations, img.width(), img.height());
    with_pixmap(img, |pixmap| {
        commands::execute(&mut PixmapSurface::new(pixmap), &ops);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeColor;
    use crate::domain::{AnnotationKind, ArrowShape, CircleShape, RectShape, ShapeStyle};

    const BG: image::Rgba<u8> = image::Rgba([200, 200, 200, 255]);

    fn rect(style: ShapeStyle) -> Annotation {
        Annotation::new(AnnotationKind::Rect(RectShape {
            x: 10.0,
            y: 10.0,
            width: 50.0,
            height: 50.0,
            color: Some(ShapeColor::BLACK),
            style,
        }))
    }

    #[test]
    fn test_outline_rect_leaves_interior() {
        let mut img = RgbaImage::from_pixel(100, 100, BG);
        draw_annotations_in_order(&mut img, &[rect(ShapeStyle::Outline)]);
        assert_eq!(*img.get_pixel(10, 30), image::Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(35, 35), BG);
    }

    #[test]
    fn test_filled_rect_blends_at_fill_alpha() {
        let mut img = RgbaImage::from_pixel(100, 100, BG);
        draw_annotations_in_order(&mut img, &[rect(ShapeStyle::Fill)]);
        let p = img.get_pixel(35, 35);
        // 200 * 0.7 = 140
        assert!((138..=142).contains(&p[0]), "{p:?}");
        assert_eq!(p[3], 255);
        assert_eq!(*img.get_pixel(80, 80), BG);
    }

    #[test]
    fn test_later_annotations_paint_over_earlier() {
        let red = Annotation::new(AnnotationKind::Circle(CircleShape {
            x: 20.0,
            y: 20.0,
            width: 60.0,
            height: 60.0,
            color: Some(ShapeColor::RED),
            style: ShapeStyle::Fill,
        }));
        let over = img_with(&[rect(ShapeStyle::Fill), red.clone()]);
        let under = img_with(&[red, rect(ShapeStyle::Fill)]);
        assert_ne!(over.get_pixel(40, 40), under.get_pixel(40, 40));
    }

    fn img_with(list: &[Annotation]) -> RgbaImage {
        let mut img = RgbaImage::from_pixel(100, 100, BG);
        draw_annotations_in_order(&mut img, list);
        img
    }

    #[test]
    fn test_arrow_colours_its_end_point() {
        let arrow = Annotation::new(AnnotationKind::Arrow(ArrowShape {
            x: 10.0,
            y: 50.0,
            end_x: 90.0,
            end_y: 50.0,
            color: Some(ShapeColor::BLACK),
        }));
        let img = img_with(&[arrow]);
        assert_eq!(*img.get_pixel(50, 50), image::Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(88, 50), image::Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(50, 10), BG);
    }

    #[test]
    fn test_transparent_pixels_survive_round_trip() {
        let mut img = RgbaImage::from_pixel(8, 8, image::Rgba([10, 20, 30, 0]));
        img.put_pixel(1, 1, image::Rgba([255, 0, 0, 255]));
        let before = img.clone();
        with_pixmap(&mut img, |_| {});
        assert_eq!(img.get_pixel(1, 1), before.get_pixel(1, 1));
        assert_eq!(img.get_pixel(0, 0)[3], 0);
    }
}
