//! On-screen placement of the step image

use crate::domain::{PERCENT_MAX, PctPoint, clamp_percent};

/// Screen-space box the step image is drawn into
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Map a screen point to clamped percentage space.
    ///
    /// A zero-size box maps every point to the origin.
    pub fn to_percent(&self, x: f32, y: f32) -> PctPoint {
        PctPoint::new(
            axis_percent(x, self.left, self.width),
            axis_percent(y, self.top, self.height),
        )
    }

    /// Screen position of a percentage point
    pub fn to_screen(&self, p: PctPoint) -> (f32, f32) {
        (
            self.left + p.x / PERCENT_MAX * self.width,
            self.top + p.y / PERCENT_MAX * self.height,
        )
    }
}

fn axis_percent(pos: f32, origin: f32, size: f32) -> f32 {
    if size <= 0.0 {
        return 0.0;
    }
    clamp_percent(PERCENT_MAX * (pos - origin) / size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_and_clamps() {
        let vp = Viewport::new(100.0, 50.0, 400.0, 200.0);
        assert_eq!(vp.to_percent(300.0, 150.0), PctPoint::new(50.0, 50.0));
        assert_eq!(vp.to_percent(0.0, 400.0), PctPoint::new(0.0, 100.0));
        assert_eq!(vp.to_screen(PctPoint::new(25.0, 100.0)), (200.0, 250.0));
    }

    #[test]
    fn test_zero_size_maps_to_origin() {
        let vp = Viewport::new(10.0, 10.0, 0.0, 0.0);
        assert_eq!(vp.to_percent(500.0, 500.0), PctPoint::new(0.0, 0.0));
    }
}
