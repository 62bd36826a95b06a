//! Decorative background patterns.
//!
//! Every pattern is a pure function of (colour, opacity, canvas size, scale)
//! that paints translucent elements onto a surface. There are two families:
//!
//! - [`concentric`]: five nested shapes anchored next to the logo, sharing one
//!   radius sequence and a nonlinear alpha response to the opacity slider.
//! - [`gradient`]: a handful of soft elements placed at fixed fractions of the
//!   canvas, each fading to full transparency at its edge.
//!
//! Unknown identifiers resolve to [`PatternType::Circles`].

pub mod concentric;
pub mod gradient;

use std::fmt;

use resvg::tiny_skia::Pixmap;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::PatternError;
use crate::geometry::SizePx;
use crate::surface::Surface;

use concentric::Shape;

/// Opacity used when the caller passes a non-number.
const FALLBACK_OPACITY: f32 = 0.3;

// ============================================================================
// PatternType
// ============================================================================

/// The selectable background patterns.
///
/// Serializes as its kebab-case identifier. Deserializing an unknown
/// identifier yields [`PatternType::Circles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum PatternType {
    #[default]
    Circles,
    ConcentricSquares,
    ConcentricTriangles,
    ConcentricHexagons,
    ConcentricDiamonds,
    GradientCircles,
    GradientBlobs,
    GradientFeathers,
    GradientRectangles,
    GradientArrows,
    GradientDiamonds,
    GradientSwoosh,
    GradientRings,
}

impl PatternType {
    pub const ALL: [PatternType; 13] = [
        PatternType::Circles,
        PatternType::ConcentricSquares,
        PatternType::ConcentricTriangles,
        PatternType::ConcentricHexagons,
        PatternType::ConcentricDiamonds,
        PatternType::GradientCircles,
        PatternType::GradientBlobs,
        PatternType::GradientFeathers,
        PatternType::GradientRectangles,
        PatternType::GradientArrows,
        PatternType::GradientDiamonds,
        PatternType::GradientSwoosh,
        PatternType::GradientRings,
    ];

    /// Resolves an identifier, falling back to circles for anything unknown.
    pub fn from_id(id: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|p| p.id() == id.trim())
            .unwrap_or_default()
    }

    /// The kebab-case identifier.
    pub fn id(&self) -> &'static str {
        match self {
            PatternType::Circles => "circles",
            PatternType::ConcentricSquares => "concentric-squares",
            PatternType::ConcentricTriangles => "concentric-triangles",
            PatternType::ConcentricHexagons => "concentric-hexagons",
            PatternType::ConcentricDiamonds => "concentric-diamonds",
            PatternType::GradientCircles => "gradient-circles",
            PatternType::GradientBlobs => "gradient-blobs",
            PatternType::GradientFeathers => "gradient-feathers",
            PatternType::GradientRectangles => "gradient-rectangles",
            PatternType::GradientArrows => "gradient-arrows",
            PatternType::GradientDiamonds => "gradient-diamonds",
            PatternType::GradientSwoosh => "gradient-swoosh",
            PatternType::GradientRings => "gradient-rings",
        }
    }

    /// Paints this pattern's translucent elements onto `surface`.
    ///
    /// Nothing else is touched: the background stays whatever it was.
    pub fn paint(&self, surface: &mut Surface, params: &PatternParams) -> Result<(), PatternError> {
        match self {
            PatternType::Circles => concentric::paint(surface, params, Shape::Circle),
            PatternType::ConcentricSquares => concentric::paint(surface, params, Shape::Square),
            PatternType::ConcentricTriangles => concentric::paint(surface, params, Shape::Triangle),
            PatternType::ConcentricHexagons => concentric::paint(surface, params, Shape::Hexagon),
            PatternType::ConcentricDiamonds => concentric::paint(surface, params, Shape::Diamond),
            PatternType::GradientCircles => gradient::circles(surface, params),
            PatternType::GradientBlobs => gradient::blobs(surface, params),
            PatternType::GradientFeathers => gradient::feathers(surface, params),
            PatternType::GradientRectangles => gradient::rectangles(surface, params),
            PatternType::GradientArrows => gradient::arrows(surface, params),
            PatternType::GradientDiamonds => gradient::diamonds(surface, params),
            PatternType::GradientSwoosh => gradient::swoosh(surface, params),
            PatternType::GradientRings => gradient::rings(surface, params),
        }
    }
}

impl From<String> for PatternType {
    fn from(id: String) -> Self {
        Self::from_id(&id)
    }
}

impl From<PatternType> for String {
    fn from(p: PatternType) -> Self {
        p.id().to_string()
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ============================================================================
// PatternParams
// ============================================================================

/// Inputs shared by every pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternParams {
    pub color: Rgb,
    /// Slider opacity, already normalized into 0.0-1.0.
    pub opacity: f32,
    /// Logical canvas width.
    pub width: f32,
    /// Logical canvas height.
    pub height: f32,
    pub scale: f32,
}

impl PatternParams {
    /// Creates params, clamping opacity into 0.0-1.0 (non-numbers become 0.3).
    pub fn new(color: Rgb, opacity: f32, width: f32, height: f32, scale: f32) -> Self {
        Self {
            color,
            opacity: normalize_opacity(opacity),
            width,
            height,
            scale,
        }
    }
}

/// Clamps to `0..=1`; NaN becomes the fallback. Zero stays zero so a slider
/// at 0 really hides the gradient family.
pub(crate) fn normalize_opacity(opacity: f32) -> f32 {
    if opacity.is_nan() {
        FALLBACK_OPACITY
    } else {
        opacity.clamp(0.0, 1.0)
    }
}

/// Renders a pattern over an opaque white background.
///
/// The returned pixmap is exactly `width` x `height` pixels.
pub fn generate_pattern(
    pattern: PatternType,
    color: Rgb,
    opacity: f32,
    width: u32,
    height: u32,
    scale: f32,
) -> Result<Pixmap, PatternError> {
    let mut surface =
        Surface::new(SizePx::new(width, height), 1).ok_or(PatternError::Surface { width, height })?;
    surface.fill(Rgb::WHITE);
    let params = PatternParams::new(color, opacity, width as f32, height as f32, scale);
    pattern.paint(&mut surface, &params)?;
    Ok(surface.into_pixmap())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOLD: Rgb = Rgb::new(0xd4, 0xb9, 0x82);

    #[test]
    fn every_pattern_is_opaque_and_sized() {
        for pattern in PatternType::ALL {
            let pixmap = generate_pattern(pattern, GOLD, 0.5, 300, 72, 0.3)
                .unwrap_or_else(|e| panic!("{pattern} failed: {e}"));
            assert_eq!((pixmap.width(), pixmap.height()), (300, 72), "{pattern}");
            assert!(
                pixmap.pixels().iter().all(|p| p.alpha() == 255),
                "{pattern} left translucent pixels"
            );
        }
    }

    #[test]
    fn every_pattern_draws_something() {
        for pattern in PatternType::ALL {
            let pixmap = generate_pattern(pattern, GOLD, 1.0, 400, 96, 0.4).unwrap();
            let tinted = pixmap
                .pixels()
                .iter()
                .any(|p| p.demultiply().blue() < 250);
            assert!(tinted, "{pattern} painted nothing");
        }
    }

    #[test]
    fn unknown_identifier_matches_circles() {
        let unknown = PatternType::from_id("polka-dots");
        assert_eq!(unknown, PatternType::Circles);
        let a = generate_pattern(unknown, GOLD, 0.4, 200, 48, 0.2).unwrap();
        let b = generate_pattern(PatternType::Circles, GOLD, 0.4, 200, 48, 0.2).unwrap();
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn patterns_are_deterministic() {
        for pattern in PatternType::ALL {
            let a = generate_pattern(pattern, GOLD, 0.7, 250, 60, 0.25).unwrap();
            let b = generate_pattern(pattern, GOLD, 0.7, 250, 60, 0.25).unwrap();
            assert_eq!(a.data(), b.data(), "{pattern} is not deterministic");
        }
    }

    #[test]
    fn zero_sized_pattern_is_an_error() {
        let err = generate_pattern(PatternType::Circles, GOLD, 0.5, 0, 10, 1.0).unwrap_err();
        assert_eq!(err, PatternError::Surface { width: 0, height: 10 });
    }

    #[test]
    fn identifiers_round_trip_through_serde() {
        for pattern in PatternType::ALL {
            let json = serde_json::to_string(&pattern).unwrap();
            assert_eq!(json, format!("\"{}\"", pattern.id()));
            let back: PatternType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, pattern);
        }
        let fallback: PatternType = serde_json::from_str("\"zigzag\"").unwrap();
        assert_eq!(fallback, PatternType::Circles);
    }

    #[test]
    fn opacity_is_normalized() {
        assert_eq!(normalize_opacity(f32::NAN), 0.3);
        assert_eq!(normalize_opacity(-1.0), 0.0);
        assert_eq!(normalize_opacity(3.0), 1.0);
        assert_eq!(normalize_opacity(0.42), 0.42);
        assert_eq!(normalize_opacity(0.0), 0.0);
    }
}
