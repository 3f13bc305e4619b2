//! Captured frame type

use image::RgbaImage;

use crate::domain::ImageData;
use crate::error::CaptureError;

/// A captured frame with both raw RGBA data and its PNG encoding
#[derive(Clone, Debug)]
pub struct CapturedFrame {
    pub rgba: RgbaImage,
    pub data: ImageData,
}

impl CapturedFrame {
    /// Encode a raw frame from a capture source
    pub fn new(rgba: RgbaImage) -> Result<Self, CaptureError> {
        log::debug!(
            "Frame captured: {}x{} pixels",
            rgba.width(),
            rgba.height()
        );
        let data =
            ImageData::from_rgba(&rgba).map_err(|e| CaptureError::Encode(e.to_string()))?;
        Ok(Self { rgba, data })
    }

    /// Get the width of the frame
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the frame
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    /// Give up the raw pixels and keep only the encoded image
    pub fn into_image_data(self) -> ImageData {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_frame_encodes_png() {
        let rgba = RgbaImage::from_pixel(8, 4, Rgba([10, 20, 30, 255]));
        let frame = CapturedFrame::new(rgba.clone()).unwrap();
        assert_eq!((frame.width(), frame.height()), (8, 4));
        assert_eq!(frame.data.mime_type(), "image/png");
        assert_eq!(frame.into_image_data().decode().unwrap(), rgba);
    }
}
