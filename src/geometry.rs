//! Geometry types and helpers.
//!
//! Logical coordinates are `f32` and independent of the device pixel ratio;
//! pixel sizes are `u32`.

use resvg::tiny_skia::{Path, PathBuilder};

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Multiplies both dimensions by an integer factor.
    pub fn scaled(&self, factor: u32) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A rectangle in logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoxF {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the right edge coordinate (x + width).
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge coordinate (y + height).
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Centres a `w` x `h` box inside this one.
    pub fn center_inner(&self, w: f32, h: f32) -> BoxF {
        BoxF::new(
            self.x + (self.width - w) / 2.0,
            self.y + (self.height - h) / 2.0,
            w,
            h,
        )
    }
}

/// Draw size produced by [`fit_contain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FitSize {
    pub draw_w: u32,
    pub draw_h: u32,
}

/// Scales `src` to fit inside `max` while keeping its aspect ratio.
///
/// Each axis is rounded on its own, so the ratio may drift by up to a pixel.
pub fn fit_contain(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> FitSize {
    if src_w == 0 || src_h == 0 {
        return FitSize::default();
    }
    let ratio = (max_w as f32 / src_w as f32).min(max_h as f32 / src_h as f32);
    FitSize {
        draw_w: (src_w as f32 * ratio).round() as u32,
        draw_h: (src_h as f32 * ratio).round() as u32,
    }
}

/// Builds a rounded rectangle with quadratic corners.
///
/// The radius is clamped to half the shorter side so small boxes never
/// produce a self-intersecting outline.
pub fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, r: f32) -> Option<Path> {
    let radius = r.min(w / 2.0).min(h / 2.0).max(0.0);
    let mut pb = PathBuilder::new();
    pb.move_to(x + radius, y);
    pb.line_to(x + w - radius, y);
    pb.quad_to(x + w, y, x + w, y + radius);
    pb.line_to(x + w, y + h - radius);
    pb.quad_to(x + w, y + h, x + w - radius, y + h);
    pb.line_to(x + radius, y + h);
    pb.quad_to(x, y + h, x, y + h - radius);
    pb.line_to(x, y + radius);
    pb.quad_to(x, y, x + radius, y);
    pb.close();
    pb.finish()
}

/// Rounds a base constant multiplied by the output scale.
pub(crate) fn px(base: f32, scale: f32) -> f32 {
    (base * scale).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_contain_width_bound() {
        assert_eq!(fit_contain(200, 100, 100, 100), FitSize { draw_w: 100, draw_h: 50 });
    }

    #[test]
    fn fit_contain_height_bound_and_upscale() {
        assert_eq!(fit_contain(50, 100, 104, 104), FitSize { draw_w: 52, draw_h: 104 });
        assert_eq!(fit_contain(10, 10, 104, 104), FitSize { draw_w: 104, draw_h: 104 });
    }

    #[test]
    fn fit_contain_rounds_axes_independently() {
        // 3x7 into 10x10: ratio 10/7, width 4.2857 -> 4
        assert_eq!(fit_contain(3, 7, 10, 10), FitSize { draw_w: 4, draw_h: 10 });
    }

    #[test]
    fn fit_contain_empty_source() {
        assert_eq!(fit_contain(0, 10, 100, 100), FitSize::default());
    }

    #[test]
    fn rounded_rect_radius_is_clamped() {
        let path = rounded_rect_path(0.0, 0.0, 10.0, 6.0, 50.0).unwrap();
        let bounds = path.bounds();
        assert_eq!(bounds.left(), 0.0);
        assert_eq!(bounds.top(), 0.0);
        assert_eq!(bounds.right(), 10.0);
        assert_eq!(bounds.bottom(), 6.0);
    }

    #[test]
    fn rounded_rect_zero_radius_is_plain_rect() {
        let path = rounded_rect_path(2.0, 3.0, 20.0, 10.0, 0.0).unwrap();
        let bounds = path.bounds();
        assert_eq!(bounds.width(), 20.0);
        assert_eq!(bounds.height(), 10.0);
    }

    #[test]
    fn box_helpers() {
        let b = BoxF::new(10.0, 20.0, 100.0, 40.0);
        assert_eq!(b.right(), 110.0);
        assert_eq!(b.bottom(), 60.0);
        assert_eq!(b.center_y(), 40.0);
        assert_eq!(b.center_inner(50.0, 20.0), BoxF::new(35.0, 30.0, 50.0, 20.0));
    }

    #[test]
    fn size_px_scaled() {
        assert_eq!(SizePx::new(1000, 240).scaled(2), SizePx::new(2000, 480));
        assert!(SizePx::new(0, 10).is_empty());
    }
}
