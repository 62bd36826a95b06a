//! Gradient pattern family.
//!
//! Each pattern places a fixed set of soft elements at fractions of the
//! canvas size. Element sizes scale with the output size; element alpha is
//! the slider opacity times a per-element multiplier, faded to zero at the
//! element's edge.

use resvg::tiny_skia::{
    GradientStop, LinearGradient, Path, PathBuilder, Point, RadialGradient, Rect, Shader, SpreadMode,
    Transform,
};

use super::PatternParams;
use super::concentric::RING_RADII;
use crate::color::Rgb;
use crate::error::PatternError;
use crate::geometry::px;
use crate::surface::Surface;

/// An element placed at (`fx` * width, `fy` * height).
struct Spot {
    fx: f32,
    fy: f32,
    size: f32,
    /// Rotation in degrees; ignored by unrotated shapes.
    angle: f32,
    mult: f32,
}

const fn spot(fx: f32, fy: f32, size: f32, mult: f32) -> Spot {
    Spot { fx, fy, size, angle: 0.0, mult }
}

const fn turned(fx: f32, fy: f32, size: f32, angle: f32, mult: f32) -> Spot {
    Spot { fx, fy, size, angle, mult }
}

const CIRCLES: [Spot; 4] = [
    spot(0.2, 0.2, 120.0, 0.3),
    spot(0.8, 0.3, 100.0, 0.25),
    spot(0.3, 0.7, 90.0, 0.2),
    spot(0.7, 0.8, 110.0, 0.35),
];

const BLOBS: [Spot; 4] = [
    spot(0.15, 0.15, 150.0, 0.4),
    spot(0.85, 0.25, 130.0, 0.3),
    spot(0.25, 0.75, 140.0, 0.35),
    spot(0.75, 0.85, 120.0, 0.25),
];

const FEATHERS: [Spot; 4] = [
    turned(0.15, 0.2, 120.0, -30.0, 0.4),
    turned(0.85, 0.3, 100.0, 45.0, 0.35),
    turned(0.2, 0.8, 110.0, 15.0, 0.3),
    turned(0.8, 0.7, 90.0, -45.0, 0.25),
];

/// (fx, fy, width, height, multiplier)
const RECTANGLES: [(f32, f32, f32, f32, f32); 4] = [
    (0.1, 0.1, 40.0, 200.0, 0.3),
    (0.8, 0.2, 35.0, 180.0, 0.25),
    (0.05, 0.3, 30.0, 150.0, 0.2),
    (0.9, 0.1, 25.0, 160.0, 0.35),
];

const ARROWS: [Spot; 4] = [
    turned(0.2, 0.2, 80.0, 45.0, 0.4),
    turned(0.8, 0.3, 70.0, -30.0, 0.35),
    turned(0.3, 0.8, 75.0, 120.0, 0.3),
    turned(0.7, 0.7, 65.0, -60.0, 0.25),
];

/// Arrow outline in units of the arrow size, pointing along -y.
const ARROW_OUTLINE: [(f32, f32); 10] = [
    (0.0, -0.5),
    (0.3, -0.2),
    (0.1, -0.2),
    (0.1, 0.2),
    (0.3, 0.2),
    (0.0, 0.5),
    (-0.3, 0.2),
    (-0.1, 0.2),
    (-0.1, -0.2),
    (-0.3, -0.2),
];

const DIAMONDS: [Spot; 4] = [
    spot(0.2, 0.3, 100.0, 0.4),
    spot(0.8, 0.2, 90.0, 0.35),
    spot(0.3, 0.8, 85.0, 0.3),
    spot(0.7, 0.7, 95.0, 0.25),
];

/// (start fx, start fy, end fx, end fy, thickness, multiplier)
const SWOOSHES: [(f32, f32, f32, f32, f32, f32); 2] = [
    (0.0, 0.3, 0.7, 0.1, 80.0, 0.4),
    (0.3, 1.0, 1.0, 0.7, 70.0, 0.3),
];

const RING_MULTS: [f32; 5] = [0.3, 0.25, 0.2, 0.15, 0.1];

/// Inner edge of a gradient ring as a fraction of its outer radius.
const RING_INNER: f32 = 0.7;

/// Builds gradient stops from `(position, alpha)` pairs.
fn stops(color: Rgb, points: &[(f32, f32)]) -> Vec<GradientStop> {
    points.iter()
        .map(|(pos, alpha)| GradientStop::new(*pos, color.with_alpha(*alpha).to_skia()))
        .collect()
}

fn radial(
    name: &'static str,
    center: (f32, f32),
    radius: f32,
    stops: Vec<GradientStop>,
) -> Result<Shader<'static>, PatternError> {
    let c = Point::from_xy(center.0, center.1);
    RadialGradient::new(c, c, radius, stops, SpreadMode::Pad, Transform::identity())
        .ok_or(PatternError::Gradient(name))
}

fn linear(
    name: &'static str,
    start: (f32, f32),
    end: (f32, f32),
    stops: Vec<GradientStop>,
) -> Result<Shader<'static>, PatternError> {
    LinearGradient::new(
        Point::from_xy(start.0, start.1),
        Point::from_xy(end.0, end.1),
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    )
    .ok_or(PatternError::Gradient(name))
}

fn position(spot: &Spot, params: &PatternParams) -> (f32, f32) {
    (params.width * spot.fx, params.height * spot.fy)
}

fn circle(name: &'static str, center: (f32, f32), r: f32) -> Result<Path, PatternError> {
    PathBuilder::from_circle(center.0, center.1, r).ok_or(PatternError::Path(name))
}

fn polygon(name: &'static str, points: impl IntoIterator<Item = (f32, f32)>) -> Result<Path, PatternError> {
    let mut pb = PathBuilder::new();
    for (i, (x, y)) in points.into_iter().enumerate() {
        if i == 0 {
            pb.move_to(x, y);
        } else {
            pb.line_to(x, y);
        }
    }
    pb.close();
    pb.finish().ok_or(PatternError::Path(name))
}

pub(super) fn circles(surface: &mut Surface, params: &PatternParams) -> Result<(), PatternError> {
    for s in &CIRCLES {
        let center = position(s, params);
        let r = px(s.size, params.scale);
        let o = params.opacity * s.mult;
        let shader = radial("gradient-circles", center, r, stops(params.color, &[(0.0, o), (0.7, o * 0.5), (1.0, 0.0)]))?;
        surface.fill_path_shader(&circle("gradient-circles", center, r)?, shader, Transform::identity());
    }
    Ok(())
}

pub(super) fn blobs(surface: &mut Surface, params: &PatternParams) -> Result<(), PatternError> {
    const POINTS: usize = 8;
    for s in &BLOBS {
        let (cx, cy) = position(s, params);
        let size = px(s.size, params.scale);
        let o = params.opacity * s.mult;
        let shader = radial("gradient-blobs", (cx, cy), size, stops(params.color, &[(0.0, o), (0.6, o * 0.3), (1.0, 0.0)]))?;

        let mut pb = PathBuilder::new();
        for i in 0..POINTS {
            let angle = i as f32 / POINTS as f32 * std::f32::consts::TAU;
            let r = size * (0.7 + (angle * 3.0).sin() * 0.3);
            let (x, y) = (cx + angle.cos() * r, cy + angle.sin() * r);
            if i == 0 {
                pb.move_to(x, y);
            } else {
                pb.quad_to(cx, cy, x, y);
            }
        }
        pb.close();
        let path = pb.finish().ok_or(PatternError::Path("gradient-blobs"))?;
        surface.fill_path_shader(&path, shader, Transform::identity());
    }
    Ok(())
}

pub(super) fn feathers(surface: &mut Surface, params: &PatternParams) -> Result<(), PatternError> {
    for s in &FEATHERS {
        let (x, y) = position(s, params);
        let len = px(s.size, params.scale);
        let (sin, cos) = s.angle.to_radians().sin_cos();
        let end = (x + cos * len, y + sin * len);
        let mid = (x + cos * len * 0.5, y + sin * len * 0.5);
        let o = params.opacity * s.mult;
        let shader = linear("gradient-feathers", (x, y), end, stops(params.color, &[(0.0, o), (0.7, o * 0.3), (1.0, 0.0)]))?;

        let bulge = len * 0.2;
        let mut pb = PathBuilder::new();
        pb.move_to(x, y);
        pb.quad_to(mid.0 + sin * bulge, mid.1 - cos * bulge, end.0, end.1);
        pb.quad_to(mid.0 - sin * bulge, mid.1 + cos * bulge, x, y);
        pb.close();
        let path = pb.finish().ok_or(PatternError::Path("gradient-feathers"))?;
        surface.fill_path_shader(&path, shader, Transform::identity());
    }
    Ok(())
}

pub(super) fn rectangles(surface: &mut Surface, params: &PatternParams) -> Result<(), PatternError> {
    for (fx, fy, w, h, mult) in RECTANGLES {
        let (x, y) = (params.width * fx, params.height * fy);
        let (w, h) = (px(w, params.scale), px(h, params.scale));
        let o = params.opacity * mult;
        let shader = linear(
            "gradient-rectangles",
            (x, y),
            (x, y + h),
            stops(params.color, &[(0.0, o), (0.5, o * 0.6), (1.0, 0.0)]),
        )?;
        let rect = Rect::from_xywh(x, y, w, h).ok_or(PatternError::Path("gradient-rectangles"))?;
        surface.fill_path_shader(&PathBuilder::from_rect(rect), shader, Transform::identity());
    }
    Ok(())
}

/// Arrows are drawn in a local frame centred on the arrow and rotated by its
/// angle; the radial fade is centred on the arrow in that frame.
pub(super) fn arrows(surface: &mut Surface, params: &PatternParams) -> Result<(), PatternError> {
    for s in &ARROWS {
        let (x, y) = position(s, params);
        let size = px(s.size, params.scale);
        let o = params.opacity * s.mult;
        let shader = radial("gradient-arrows", (0.0, 0.0), size, stops(params.color, &[(0.0, o), (0.6, o * 0.4), (1.0, 0.0)]))?;
        let path = polygon(
            "gradient-arrows",
            ARROW_OUTLINE.iter().map(|(ax, ay)| (ax * size, ay * size)),
        )?;
        let local = Transform::from_translate(x, y).pre_rotate(s.angle);
        surface.fill_path_shader(&path, shader, local);
    }
    Ok(())
}

pub(super) fn diamonds(surface: &mut Surface, params: &PatternParams) -> Result<(), PatternError> {
    for s in &DIAMONDS {
        let (x, y) = position(s, params);
        let size = px(s.size, params.scale);
        let half = size * 0.5;
        let o = params.opacity * s.mult;
        let shader = radial("gradient-diamonds", (x, y), size, stops(params.color, &[(0.0, o), (0.5, o * 0.5), (1.0, 0.0)]))?;
        let path = polygon(
            "gradient-diamonds",
            [(x, y - half), (x + half, y), (x, y + half), (x - half, y)],
        )?;
        surface.fill_path_shader(&path, shader, Transform::identity());
    }
    Ok(())
}

pub(super) fn swoosh(surface: &mut Surface, params: &PatternParams) -> Result<(), PatternError> {
    for (sx, sy, ex, ey, thickness, mult) in SWOOSHES {
        let start = (params.width * sx, params.height * sy);
        let end = (params.width * ex, params.height * ey);
        let mid = ((start.0 + end.0) / 2.0, (start.1 + end.1) / 2.0);
        let thickness = px(thickness, params.scale);
        let o = params.opacity * mult;
        let shader = linear(
            "gradient-swoosh",
            start,
            end,
            stops(params.color, &[(0.0, 0.0), (0.3, o), (0.7, o * 0.6), (1.0, 0.0)]),
        )?;

        let mut pb = PathBuilder::new();
        pb.move_to(start.0, start.1);
        pb.quad_to(mid.0, mid.1, end.0, end.1);
        pb.quad_to(mid.0, mid.1 + thickness, start.0, start.1);
        pb.close();
        let path = pb.finish().ok_or(PatternError::Path("gradient-swoosh"))?;
        surface.fill_path_shader(&path, shader, Transform::identity());
    }
    Ok(())
}

/// Soft rings around the logo. Each ring is transparent inside
/// [`RING_INNER`] of its radius, peaks halfway to the edge, then fades out.
pub(super) fn rings(surface: &mut Surface, params: &PatternParams) -> Result<(), PatternError> {
    let center = (px(118.0, params.scale) + px(52.0, params.scale), params.height / 2.0);
    for (base, mult) in RING_RADII.iter().zip(RING_MULTS) {
        let r = px(*base, params.scale);
        let o = params.opacity * mult;
        let peak = RING_INNER + (1.0 - RING_INNER) * 0.5;
        let shader = radial(
            "gradient-rings",
            center,
            r,
            stops(params.color, &[(0.0, 0.0), (RING_INNER, 0.0), (peak, o), (1.0, 0.0)]),
        )?;
        surface.fill_path_shader(&circle("gradient-rings", center, r)?, shader, Transform::identity());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SizePx;

    fn canvas() -> (Surface, PatternParams) {
        let mut surface = Surface::new(SizePx::new(1000, 240), 1).unwrap();
        surface.fill(Rgb::WHITE);
        let params = PatternParams::new(Rgb::new(0, 0, 0), 1.0, 1000.0, 240.0, 1.0);
        (surface, params)
    }

    #[test]
    fn gradient_circles_fade_towards_the_edge() {
        let (mut surface, params) = canvas();
        circles(&mut surface, &params).unwrap();
        // First circle: centre (200, 48), radius 120.
        let centre = surface.pixel(200, 48).unwrap();
        let rim = surface.pixel(310, 48).unwrap();
        assert!(centre[0] < rim[0]);
    }

    #[test]
    fn rings_are_hollow() {
        let (mut surface, params) = canvas();
        rings(&mut surface, &params).unwrap();
        // Centre (170, 120) lies inside the transparent core of every ring.
        assert_eq!(surface.pixel(170, 120).unwrap()[0], 255);
        // Halfway between 0.7r and r of the innermost ring (r = 80).
        assert!(surface.pixel(170 + 68, 120).unwrap()[0] < 255);
    }

    #[test]
    fn rectangles_fade_downwards() {
        let (mut surface, params) = canvas();
        rectangles(&mut surface, &params).unwrap();
        // First rectangle spans x 100..140, y 24..224.
        let top = surface.pixel(120, 26).unwrap();
        let bottom = surface.pixel(120, 220).unwrap();
        assert!(top[0] < bottom[0]);
    }

    #[test]
    fn arrows_are_centred_on_their_anchor() {
        let (mut surface, params) = canvas();
        arrows(&mut surface, &params).unwrap();
        // First arrow anchors at (200, 48); its shaft covers the anchor.
        assert!(surface.pixel(200, 48).unwrap()[0] < 255);
    }

    #[test]
    fn zero_opacity_leaves_background() {
        let (mut surface, _) = canvas();
        let params = PatternParams::new(Rgb::new(0, 0, 0), 0.0, 1000.0, 240.0, 1.0);
        diamonds(&mut surface, &params).unwrap();
        swoosh(&mut surface, &params).unwrap();
        assert!(
            surface
                .pixmap()
                .pixels()
                .iter()
                .all(|p| p.demultiply().red() == 255)
        );
    }
}
