//! Cropping a step image to a percentage selection
//!
//! A zero-area selection is a no-op (`None`), never an error.

use image::RgbaImage;

use crate::domain::{ImageData, PctRect, PixelRect, percent_to_pixel};
use crate::error::ImageDataError;

/// Pixel bounds of `rect` inside a `width x height` image, clipped to the
/// image. `None` when the result has no area.
pub fn pixel_bounds(rect: PctRect, width: u32, height: u32) -> Option<PixelRect> {
    let rect = rect.clamped();
    let left = percent_to_pixel(rect.x, width).round() as i32;
    let top = percent_to_pixel(rect.y, height).round() as i32;
    let right = percent_to_pixel(rect.x + rect.width, width).round() as i32;
    let bottom = percent_to_pixel(rect.y + rect.height, height).round() as i32;

    PixelRect::new(left, top, right, bottom).intersect(PixelRect::of_image(width, height))
}

/// Copy the selected region into a new buffer of the cropped size
pub fn crop_rgba(img: &RgbaImage, rect: PctRect) -> Option<RgbaImage> {
    let Some(bounds) = pixel_bounds(rect, img.width(), img.height()) else {
        log::debug!("Ignoring crop with zero area: {rect:?}");
        return None;
    };
    let dims = bounds.dimensions()?;

    Some(
        image::imageops::crop_imm(
            img,
            bounds.left as u32,
            bounds.top as u32,
            dims.width(),
            dims.height(),
        )
        .to_image(),
    )
}

/// Crop encoded image data; the result is PNG encoded.
///
/// `Ok(None)` means the selection was empty and nothing changed.
pub fn crop_image(data: &ImageData, rect: PctRect) -> Result<Option<ImageData>, ImageDataError> {
    let rgba = data.decode()?;
    crop_rgba(&rgba, rect)
        .map(|cropped| ImageData::from_rgba(&cropped))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_quarter_of_800x600() {
        let img = RgbaImage::new(800, 600);
        let cropped = crop_rgba(&img, PctRect::new(25.0, 25.0, 50.0, 50.0)).unwrap();
        assert_eq!(cropped.dimensions(), (400, 300));
    }

    #[test]
    fn test_crop_keeps_selected_pixels() {
        let mut img = RgbaImage::new(10, 10);
        img.put_pixel(5, 5, image::Rgba([1, 2, 3, 255]));
        let cropped = crop_rgba(&img, PctRect::new(50.0, 50.0, 50.0, 50.0)).unwrap();
        assert_eq!(*cropped.get_pixel(0, 0), image::Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_zero_area_is_noop() {
        let img = RgbaImage::new(100, 100);
        assert!(crop_rgba(&img, PctRect::new(10.0, 10.0, 0.0, 40.0)).is_none());
        assert!(pixel_bounds(PctRect::new(10.0, 10.0, 40.0, 0.0), 100, 100).is_none());
    }

    #[test]
    fn test_out_of_range_selection_is_clipped() {
        let bounds = pixel_bounds(PctRect::new(80.0, -10.0, 50.0, 50.0), 200, 100).unwrap();
        assert_eq!(bounds, PixelRect::new(160, 0, 200, 40));
    }

    #[test]
    fn test_crop_image_data() {
        let data = ImageData::from_rgba(&RgbaImage::new(800, 600)).unwrap();
        let cropped = crop_image(&data, PctRect::new(25.0, 25.0, 50.0, 50.0))
            .unwrap()
            .unwrap();
        assert_eq!(cropped.decode().unwrap().dimensions(), (400, 300));
        assert!(crop_image(&data, PctRect::default()).unwrap().is_none());
    }
}
