//! Geometric types for annotation coordinates
//!
//! Annotation positions are percentages (0-100) of the host image's
//! bounding box so they stay valid across zoom and resize. Pixel types are
//! only used at the rendering and cropping boundary.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Upper bound of the percentage coordinate space
pub const PERCENT_MAX: f32 = 100.0;

/// Clamp a percentage coordinate to `[0, 100]`. NaN maps to 0.
#[inline]
pub fn clamp_percent(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, PERCENT_MAX)
    }
}

/// Convert a percentage of `dimension` to a pixel coordinate
#[inline]
pub fn percent_to_pixel(value: f32, dimension: u32) -> f32 {
    value / PERCENT_MAX * dimension as f32
}

/// A point in percentage space
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PctPoint {
    pub x: f32,
    pub y: f32,
}

impl PctPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Same point with both coordinates clamped to `[0, 100]`
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_percent(self.x),
            y: clamp_percent(self.y),
        }
    }

    /// Pixel position inside an image of the given size
    pub fn to_pixels(self, width: u32, height: u32) -> (f32, f32) {
        (percent_to_pixel(self.x, width), percent_to_pixel(self.y, height))
    }
}

/// An axis-aligned rectangle in percentage space, `x,y` is the top-left corner
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PctRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PctRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalized rectangle spanned by two arbitrary corner points
    pub fn from_corners(a: PctPoint, b: PctPoint) -> Self {
        let (min_x, min_y, max_x, max_y) = normalize_rect(a.x, a.y, b.x, b.y);
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// Whether both sides are strictly larger than `min`
    pub fn exceeds(&self, min: f32) -> bool {
        self.width > min && self.height > min
    }

    /// Whether the rectangle covers no area
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Clip the rectangle to the `[0, 100]` square
    pub fn clamped(&self) -> Self {
        let left = clamp_percent(self.x);
        let top = clamp_percent(self.y);
        let right = clamp_percent(self.x + self.width.max(0.0));
        let bottom = clamp_percent(self.y + self.height.max(0.0));
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Pixel-space bounds `(x, y, w, h)` inside an image of the given size
    pub fn to_pixels(&self, width: u32, height: u32) -> (f32, f32, f32, f32) {
        (
            percent_to_pixel(self.x, width),
            percent_to_pixel(self.y, height),
            percent_to_pixel(self.width, width),
            percent_to_pixel(self.height, height),
        )
    }

    pub fn contains(&self, p: PctPoint) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Integer pixel rectangle (exclusive right/bottom)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle covering a whole image
    pub fn of_image(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    /// Calculate the intersection of two rectangles
    pub fn intersect(&self, other: PixelRect) -> Option<PixelRect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        if left < right && top < bottom {
            Some(PixelRect {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Convert to dimensions (NonZeroU32 width and height)
    pub fn dimensions(self) -> Option<RectDimension> {
        let width = NonZeroU32::new(self.width().max(0) as u32)?;
        let height = NonZeroU32::new(self.height().max(0) as u32)?;
        Some(RectDimension { width, height })
    }
}

/// Non-zero dimensions of a rectangle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RectDimension {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl RectDimension {
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn height(&self) -> u32 {
        self.height.get()
    }
}

/// Normalize min/max coordinates from arbitrary start/end points
#[inline]
pub fn normalize_rect(x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32, f32, f32) {
    let (min_x, max_x) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    let (min_y, max_y) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
    (min_x, min_y, max_x, max_y)
}

/// Calculate ellipse center and radii from a bounding box
#[inline]
pub fn ellipse_from_bounds(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> (f32, f32, f32, f32) {
    let cx = (min_x + max_x) * 0.5;
    let cy = (min_y + max_y) * 0.5;
    let rx = (max_x - min_x) * 0.5;
    let ry = (max_y - min_y) * 0.5;
    (cx, cy, rx, ry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_percent() {
        assert_eq!(clamp_percent(-5.0), 0.0);
        assert_eq!(clamp_percent(150.0), 100.0);
        assert_eq!(clamp_percent(42.5), 42.5);
        assert_eq!(clamp_percent(f32::NAN), 0.0);
    }

    #[test]
    fn test_from_corners_normalizes() {
        let r = PctRect::from_corners(PctPoint::new(60.0, 10.0), PctPoint::new(20.0, 40.0));
        assert_eq!(r, PctRect::new(20.0, 10.0, 40.0, 30.0));
    }

    #[test]
    fn test_exceeds_threshold() {
        assert!(!PctRect::new(10.0, 10.0, 1.0, 1.0).exceeds(1.0));
        assert!(!PctRect::new(10.0, 10.0, 5.0, 1.0).exceeds(1.0));
        assert!(PctRect::new(10.0, 10.0, 1.5, 1.5).exceeds(1.0));
    }

    #[test]
    fn test_clamped_rect_stays_inside() {
        let r = PctRect::new(90.0, -10.0, 30.0, 30.0).clamped();
        assert_eq!(r, PctRect::new(90.0, 0.0, 10.0, 20.0));
    }

    #[test]
    fn test_pixel_rect_intersect() {
        let img = PixelRect::of_image(100, 50);
        let r = PixelRect::new(80, 40, 120, 90);
        assert_eq!(img.intersect(r), Some(PixelRect::new(80, 40, 100, 50)));
        assert_eq!(img.intersect(PixelRect::new(100, 0, 120, 10)), None);
    }

    #[test]
    fn test_pixel_rect_dimensions() {
        assert!(PixelRect::new(5, 5, 5, 10).dimensions().is_none());
        let d = PixelRect::new(0, 0, 4, 3).dimensions().unwrap();
        assert_eq!((d.width(), d.height()), (4, 3));
    }
}
