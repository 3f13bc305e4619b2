//! Shared geometry calculations for annotations
//!
//! Sizes are given in reference pixels for a 1200px wide image and scaled
//! with `scale_factor` so strokes keep their visual weight on large
//! screenshots.

/// Image width at which reference sizes are used unscaled
pub const REFERENCE_WIDTH: f32 = 1200.0;

/// Size multiplier for an image of the given pixel width, never below 1
#[inline]
pub fn scale_factor(image_width: u32) -> f32 {
    (image_width as f32 / REFERENCE_WIDTH).max(1.0)
}

/// Arrow geometry constants
pub mod arrow {
    /// Shaft thickness in reference pixels
    pub const THICKNESS: f32 = 5.0;
    /// Arrowhead length in reference pixels
    pub const HEAD_LENGTH: f32 = 20.0;
    /// Arrowhead wing angle from the shaft in radians (30 degrees)
    pub const HEAD_ANGLE: f32 = std::f32::consts::FRAC_PI_6;

    /// Calculate the two arrowhead wing points for a segment ending at `end`.
    ///
    /// The head follows the line angle `atan2(dy, dx)`. A zero-length segment
    /// has angle 0, so the head points along +x as a small marker.
    /// Returns (wing1_x, wing1_y, wing2_x, wing2_y).
    pub fn head_points(
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
        head_length: f32,
    ) -> (f32, f32, f32, f32) {
        let angle = (end_y - start_y).atan2(end_x - start_x);
        let wing1_x = end_x - head_length * (angle - HEAD_ANGLE).cos();
        let wing1_y = end_y - head_length * (angle - HEAD_ANGLE).sin();
        let wing2_x = end_x - head_length * (angle + HEAD_ANGLE).cos();
        let wing2_y = end_y - head_length * (angle + HEAD_ANGLE).sin();
        (wing1_x, wing1_y, wing2_x, wing2_y)
    }
}

/// Rectangle/circle constants
pub mod shape {
    /// Outline stroke thickness in reference pixels
    pub const THICKNESS: f32 = 5.0;
    /// Opacity of filled shapes
    pub const FILL_ALPHA: f32 = 0.3;
    /// Bezier control point factor for approximating a quarter ellipse
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Number badge constants
pub mod badge {
    /// Disc radius in reference pixels
    pub const RADIUS: f32 = 24.0;
    /// White ring width in reference pixels
    pub const RING: f32 = 2.0;
    /// Label size in reference pixels
    pub const FONT_SIZE: f32 = 24.0;
}

/// Text label constants
pub mod text {
    /// Label size in reference pixels
    pub const FONT_SIZE: f32 = 32.0;
    /// White outline width drawn behind the fill
    pub const OUTLINE: f32 = 4.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_factor() {
        assert_eq!(scale_factor(800), 1.0);
        assert_eq!(scale_factor(1200), 1.0);
        assert_eq!(scale_factor(3840), 3.2);
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-3, "{a} != {b}");
    }

    #[test]
    fn test_head_points_rightward() {
        let (x1, y1, x2, y2) = arrow::head_points(0.0, 0.0, 100.0, 0.0, 20.0);
        let dx = 20.0 * arrow::HEAD_ANGLE.cos();
        let dy = 20.0 * arrow::HEAD_ANGLE.sin();
        assert_close(x1, 100.0 - dx);
        assert_close(y1, dy);
        assert_close(x2, 100.0 - dx);
        assert_close(y2, -dy);
    }

    #[test]
    fn test_head_points_trail_behind_end_in_all_quadrants() {
        let end = (50.0, 50.0);
        for (sx, sy) in [(0.0, 50.0), (100.0, 50.0), (50.0, 0.0), (50.0, 100.0)] {
            let (x1, y1, x2, y2) = arrow::head_points(sx, sy, end.0, end.1, 20.0);
            // Both wings sit on the start side of the end point
            let dir = (end.0 - sx, end.1 - sy);
            for (wx, wy) in [(x1, y1), (x2, y2)] {
                let back = (wx - end.0) * dir.0 + (wy - end.1) * dir.1;
                assert!(back < 0.0);
            }
        }
    }

    #[test]
    fn test_head_points_degenerate() {
        let (x1, y1, x2, y2) = arrow::head_points(10.0, 10.0, 10.0, 10.0, 20.0);
        assert!(x1.is_finite() && y1.is_finite() && x2.is_finite() && y2.is_finite());
        assert!(x1 < 10.0 && x2 < 10.0);
    }
}
