//! Glyph outlines for annotation text
//!
//! Text is turned into a tiny-skia path so it can be filled or stroked like
//! any other shape. The face is a bold sans-serif looked up once through
//! fontdb; when the system has no usable font, text is skipped.

use std::fs;
use std::sync::OnceLock;

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use rusttype::{Font, OutlineBuilder, Scale, point as rt_point};
use tiny_skia::{Path, PathBuilder};

use super::commands::{TextAlign, TextBaseline};

/// Family names tried when the generic sans-serif lookup fails
const FALLBACK_FAMILIES: &[&str] = &["DejaVu Sans", "Liberation Sans", "Noto Sans", "Arial"];

/// Bold sans-serif face shared by every render, `None` if nothing loads
pub fn annotation_font() -> Option<&'static Font<'static>> {
    static FONT: OnceLock<Option<Font<'static>>> = OnceLock::new();
    FONT.get_or_init(|| {
        let font = load_system_font();
        if font.is_none() {
            log::warn!("No usable system font found, annotation text will not be rendered");
        }
        font
    })
    .as_ref()
}

fn load_system_font() -> Option<Font<'static>> {
    let mut db = Database::new();
    db.load_system_fonts();

    let mut families = vec![Family::SansSerif];
    families.extend(FALLBACK_FAMILIES.iter().map(|name| Family::Name(*name)));

    let query = Query {
        families: &families,
        weight: Weight::BOLD,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };

    let id = db.query(&query).or_else(|| db.faces().next().map(|face| face.id))?;
    let face = db.face(id)?;
    let index = face.index;

    let bytes = match &face.source {
        fontdb::Source::File(path) | fontdb::Source::SharedFile(path, _) => fs::read(path).ok()?,
        fontdb::Source::Binary(bytes) => bytes.as_ref().as_ref().to_vec(),
    };
    log::debug!("Annotation font: {:?}", face.families.first().map(|(name, _)| name));
    Font::try_from_vec_and_index(bytes, index)
}

/// Collects rusttype glyph outlines into a tiny-skia path
struct SkiaOutline {
    pb: PathBuilder,
    dx: f32,
    dy: f32,
}

impl OutlineBuilder for SkiaOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        self.pb.move_to(x + self.dx, y + self.dy);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.pb.line_to(x + self.dx, y + self.dy);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.pb
            .quad_to(x1 + self.dx, y1 + self.dy, x + self.dx, y + self.dy);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.pb.cubic_to(
            x1 + self.dx,
            y1 + self.dy,
            x2 + self.dx,
            y2 + self.dy,
            x + self.dx,
            y + self.dy,
        );
    }

    fn close(&mut self) {
        self.pb.close();
    }
}

/// Advance width of `text` at `size` pixels
pub fn text_width(font: &Font<'_>, text: &str, size: f32) -> f32 {
    font.layout(text, Scale::uniform(size), rt_point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

/// Outline of `text` anchored at `x,y` in pixel space (y down).
///
/// Returns `None` for empty or whitespace-only text.
pub fn text_path(
    font: &Font<'_>,
    text: &str,
    size: f32,
    x: f32,
    y: f32,
    align: TextAlign,
    baseline: TextBaseline,
) -> Option<Path> {
    let scale = Scale::uniform(size);
    let v_metrics = font.v_metrics(scale);

    let dx = match align {
        TextAlign::Left => x,
        TextAlign::Center => x - text_width(font, text, size) / 2.0,
    };
    let dy = match baseline {
        TextBaseline::Alphabetic => y,
        // descent is negative
        TextBaseline::Middle => y + (v_metrics.ascent + v_metrics.descent) / 2.0,
    };

    let mut sink = SkiaOutline {
        pb: PathBuilder::new(),
        dx,
        dy,
    };
    for glyph in font.layout(text, scale, rt_point(0.0, 0.0)) {
        glyph.build_outline(&mut sink);
    }
    sink.pb.finish()
}
