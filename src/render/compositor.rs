//! Flattening annotations onto step images

use image::RgbaImage;

use super::image::draw_annotations_in_order;
use crate::domain::{Annotation, ImageData};

/// Draw `annotations` onto a copy of `base`. Output has the same dimensions.
pub fn composite_rgba(base: &RgbaImage, annotations: &[Annotation]) -> RgbaImage {
    let mut out = base.clone();
    draw_annotations_in_order(&mut out, annotations);
    out
}

/// Flatten annotations onto an encoded image.
///
/// Never fails: if the base cannot be decoded or the result cannot be
/// encoded, the base image is returned unannotated.
pub fn composite(base: &ImageData, annotations: &[Annotation]) -> ImageData {
    if annotations.is_empty() {
        return base.clone();
    }

    let rgba = match base.decode() {
        Ok(rgba) => rgba,
        Err(err) => {
            log::warn!("Failed to decode step image, using it unannotated: {err}");
            return base.clone();
        }
    };

    let flattened = composite_rgba(&rgba, annotations);
    match ImageData::from_rgba(&flattened) {
        Ok(data) => data,
        Err(err) => {
            log::warn!("Failed to encode composited image: {err}");
            base.clone()
        }
    }
}

/// `composite` on tokio's blocking pool, so callers on the UI task are not
/// stalled by rasterization.
pub async fn composite_async(base: ImageData, annotations: Vec<Annotation>) -> ImageData {
    let fallback = base.clone();
    match tokio::task::spawn_blocking(move || composite(&base, &annotations)).await {
        Ok(data) => data,
        Err(err) => {
            log::error!("Compositing task failed: {err}");
            fallback
        }
    }
}
