//! Colour parsing and derivation.
//!
//! Colours arrive as CSS strings from the caller (`#rgb`, `#rrggbb`,
//! `rgb(...)`, `rgba(...)`). Parsing never fails: anything unreadable
//! becomes black.

use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use resvg::tiny_skia;

/// An opaque sRGB colour with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns a translucent variant of this colour.
    pub fn with_alpha(self, alpha: f32) -> Rgba {
        to_rgba(self, alpha)
    }

    /// Formats the colour as a lowercase `#rrggbb` string.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Perceived brightness used to rank palette entries.
    pub fn luminance(self) -> f32 {
        luminance(self)
    }
}

impl From<Srgb<u8>> for Rgb {
    fn from(c: Srgb<u8>) -> Self {
        Self::new(c.red, c.green, c.blue)
    }
}

impl From<Rgb> for Srgb<u8> {
    fn from(c: Rgb) -> Self {
        Srgb::new(c.r, c.g, c.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// An sRGB colour with a straight (non-premultiplied) alpha in 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Drops the alpha channel.
    pub fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }

    /// Formats the colour as a CSS `rgba(r,g,b,a)` string.
    pub fn to_css(self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, trim_float(self.a))
    }

    /// Converts to a tiny-skia colour, clamping alpha into range.
    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, alpha_to_u8(self.a))
    }
}

impl From<Rgb> for Rgba {
    fn from(c: Rgb) -> Self {
        Self::new(c.r, c.g, c.b, 1.0)
    }
}

/// Parses a CSS colour string into an RGB triple.
///
/// Accepts `#rgb`, `#rrggbb` (with or without the leading `#`) and
/// `rgb(...)`/`rgba(...)`. Three-digit hex is expanded by doubling each
/// channel. Malformed input yields black.
pub fn parse_color(value: &str) -> Rgb {
    parse_color_alpha(value).rgb()
}

/// Like [`parse_color`], but keeps the alpha component of `rgba(...)` input.
pub fn parse_color_alpha(value: &str) -> Rgba {
    let value = value.trim();
    if value.starts_with("rgb") {
        return parse_rgb_function(value).unwrap_or(Rgba::new(0, 0, 0, 1.0));
    }
    Srgb::<u8>::from_str(value)
        .map(|c| Rgb::from(c).into())
        .unwrap_or(Rgba::new(0, 0, 0, 1.0))
}

fn parse_rgb_function(value: &str) -> Option<Rgba> {
    let inner: String = value
        .trim_start_matches("rgba")
        .trim_start_matches("rgb")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '(' && *c != ')')
        .collect();
    let mut parts = inner.split(',');

    let mut channel = || -> Option<u8> {
        let v: f32 = parts.next()?.parse().ok()?;
        v.is_finite().then(|| v.round().clamp(0.0, 255.0) as u8)
    };
    let (r, g, b) = (channel()?, channel()?, channel()?);

    let a = match parts.next() {
        Some(raw) => raw.parse::<f32>().ok().filter(|a| a.is_finite())?,
        None => 1.0,
    };
    Some(Rgba::new(r, g, b, a))
}

/// Derives a translucent colour. The caller keeps `alpha` within 0.0-1.0.
pub fn to_rgba(color: Rgb, alpha: f32) -> Rgba {
    Rgba::new(color.r, color.g, color.b, alpha)
}

/// Rec. 709 luma over the raw 0-255 channel values.
pub fn luminance(color: Rgb) -> f32 {
    0.2126 * color.r as f32 + 0.7152 * color.g as f32 + 0.0722 * color.b as f32
}

/// Returns the brightest palette entry. Ties keep the first maximal entry.
pub fn select_brightest(palette: &[Rgb]) -> Option<Rgb> {
    palette.iter().copied().fold(None, |best, c| match best {
        Some(b) if luminance(c) <= luminance(b) => Some(b),
        _ => Some(c),
    })
}

pub(crate) fn alpha_to_u8(alpha: f32) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn trim_float(v: f32) -> String {
    let s = format!("{:.3}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
