//! Concentric pattern family.
//!
//! Five nested shapes share an anchor just right of the logo centre, one
//! radius sequence and one alpha law; only the outline differs.

use resvg::tiny_skia::{Path, PathBuilder, Rect};

use super::PatternParams;
use crate::color::Rgb;
use crate::error::PatternError;
use crate::geometry::px;
use crate::surface::Surface;

/// Ring radii before scaling, innermost first.
pub const RING_RADII: [f32; 5] = [80.0, 140.0, 200.0, 260.0, 320.0];

/// Per-ring alpha before the opacity gain is applied.
pub const RING_ALPHAS: [f32; 5] = [0.26, 0.20, 0.14, 0.08, 0.04];

/// Outline drawn for each ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Hexagon,
    Diamond,
}

impl Shape {
    fn name(&self) -> &'static str {
        match self {
            Shape::Circle => "circles",
            Shape::Square => "concentric-squares",
            Shape::Triangle => "concentric-triangles",
            Shape::Hexagon => "concentric-hexagons",
            Shape::Diamond => "concentric-diamonds",
        }
    }

    /// Builds the outline for a ring of radius `r` centred on (`cx`, `cy`).
    fn path(&self, cx: f32, cy: f32, r: f32) -> Option<Path> {
        match self {
            Shape::Circle => PathBuilder::from_circle(cx, cy, r),
            Shape::Square => {
                let side = r * 1.8;
                let rect = Rect::from_xywh(cx - side / 2.0, cy - side / 2.0, side, side)?;
                Some(PathBuilder::from_rect(rect))
            }
            Shape::Triangle => {
                let side = r * 2.0;
                let height = side * 0.866;
                polygon(&[
                    (cx, cy - height / 2.0),
                    (cx - side / 2.0, cy + height / 2.0),
                    (cx + side / 2.0, cy + height / 2.0),
                ])
            }
            Shape::Hexagon => {
                let radius = r * 1.2;
                let points: Vec<(f32, f32)> = (0..6)
                    .map(|j| {
                        let angle = j as f32 / 6.0 * std::f32::consts::TAU;
                        (cx + angle.cos() * radius, cy + angle.sin() * radius)
                    })
                    .collect();
                polygon(&points)
            }
            Shape::Diamond => {
                let half = r * 1.4;
                polygon(&[(cx, cy - half), (cx + half, cy), (cx, cy + half), (cx - half, cy)])
            }
        }
    }
}

/// Response curve of the opacity slider.
///
/// Low values still leave a faint pattern; high values saturate smoothly.
pub fn ring_gain(opacity: f32) -> f32 {
    0.6 + opacity.powf(1.1) * 1.6
}

/// Final alpha of ring `index` for the given slider opacity.
pub fn ring_alpha(index: usize, opacity: f32) -> f32 {
    (RING_ALPHAS[index] * ring_gain(opacity)).clamp(0.0, 1.0)
}

/// Anchor of the concentric family: the logo box centre, vertically centred.
pub fn anchor(params: &PatternParams) -> (f32, f32) {
    (
        px(50.0, params.scale) + px(52.0, params.scale),
        params.height / 2.0,
    )
}

pub(super) fn paint(surface: &mut Surface, params: &PatternParams, shape: Shape) -> Result<(), PatternError> {
    let (cx, cy) = anchor(params);
    for (i, base) in RING_RADII.iter().enumerate() {
        let r = px(*base, params.scale);
        let path = shape.path(cx, cy, r).ok_or(PatternError::Path(shape.name()))?;
        surface.fill_path_solid(&path, params.color.with_alpha(ring_alpha(i, params.opacity)));
    }
    Ok(())
}

/// Fills plain circles with fixed alphas. Used by the logo card.
pub(crate) fn fill_rings(
    surface: &mut Surface,
    center: (f32, f32),
    radii: &[f32],
    alphas: &[f32],
    color: Rgb,
) -> Result<(), PatternError> {
    for (r, a) in radii.iter().zip(alphas) {
        let path = PathBuilder::from_circle(center.0, center.1, *r).ok_or(PatternError::Path("rings"))?;
        surface.fill_path_solid(&path, color.with_alpha(*a));
    }
    Ok(())
}

fn polygon(points: &[(f32, f32)]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.0, first.1);
    for (x, y) in rest {
        pb.line_to(*x, *y);
    }
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SizePx;

    #[test]
    fn gain_curve_endpoints() {
        assert!((ring_gain(0.0) - 0.6).abs() < 1e-6);
        assert!((ring_gain(1.0) - 2.2).abs() < 1e-6);
        assert!(ring_gain(0.5) < 0.6 + 0.5 * 1.6);
    }

    #[test]
    fn ring_alpha_is_clamped_and_decreasing() {
        for opacity in [0.0, 0.3, 1.0] {
            let alphas: Vec<f32> = (0..5).map(|i| ring_alpha(i, opacity)).collect();
            assert!(alphas.windows(2).all(|w| w[0] > w[1]));
            assert!(alphas.iter().all(|a| (0.0..=1.0).contains(a)));
        }
        assert!((ring_alpha(0, 1.0) - 0.572).abs() < 1e-4);
    }

    #[test]
    fn anchor_follows_logo_centre() {
        let params = PatternParams::new(Rgb::BLACK, 0.5, 2000.0, 480.0, 2.0);
        assert_eq!(anchor(&params), (204.0, 240.0));
        let params = PatternParams::new(Rgb::BLACK, 0.5, 1500.0, 360.0, 1.5);
        assert_eq!(anchor(&params), (75.0 + 78.0, 180.0));
    }

    #[test]
    fn every_shape_builds_a_path() {
        for shape in [Shape::Circle, Shape::Square, Shape::Triangle, Shape::Hexagon, Shape::Diamond] {
            assert!(shape.path(100.0, 50.0, 80.0).is_some(), "{shape:?}");
        }
    }

    #[test]
    fn inner_ring_is_darker_than_outer() {
        let mut surface = Surface::new(SizePx::new(1000, 240), 1).unwrap();
        surface.fill(Rgb::WHITE);
        let params = PatternParams::new(Rgb::new(0, 0, 0), 1.0, 1000.0, 240.0, 1.0);
        paint(&mut surface, &params, Shape::Circle).unwrap();

        // Anchor is (102, 120); every ring covers it, only the outer ones reach x=400.
        let centre = surface.pixel(102, 120).unwrap();
        let outer = surface.pixel(400, 120).unwrap();
        assert!(centre[0] < outer[0]);
        assert!(outer[0] < 255);
    }
}
