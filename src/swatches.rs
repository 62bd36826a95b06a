//! Palette extraction and automatic colour selection.
//!
//! A [`PaletteExtractor`] reduces an image to a handful of representative
//! swatches. [`AutoColors`] then picks the text colour (the most common
//! swatch) and the pattern colour (the brightest swatch).

use image::RgbaImage;

use crate::asset::{LogoSource, decode_logo};
use crate::color::{Rgb, select_brightest};
use crate::error::SignatureResult;
use crate::input::SignatureInput;
use crate::surface::pixmap_to_rgba_image;

/// Number of swatches requested from a logo.
pub const DEFAULT_SWATCH_COUNT: usize = 6;

/// Side length SVG logos are rasterized at before sampling.
const SAMPLE_RASTER_PX: u32 = 128;

/// Reduces an image to representative colours.
pub trait PaletteExtractor {
    /// Returns at most `count` colours, most representative first.
    fn extract(&self, image: &RgbaImage, count: usize) -> Vec<Rgb>;
}

// ============================================================================
// MedianCut
// ============================================================================

/// Modified median-cut quantizer.
///
/// Pixels are reduced to 5 bits per channel, then the colour space is split
/// at the population median along its widest channel until enough boxes
/// exist. Translucent (alpha < 125) and near-white (all channels > 250)
/// pixels are ignored.
#[derive(Debug, Clone, Copy)]
pub struct MedianCut {
    /// Sample every n-th pixel. 1 samples all of them.
    pub quality: usize,
}

impl Default for MedianCut {
    fn default() -> Self {
        Self { quality: 10 }
    }
}

const SIGBITS: u32 = 5;
const RSHIFT: u32 = 8 - SIGBITS;

/// Quantized colour and its pixel count.
type Bin = ([u8; 3], u32);

struct ColorBox {
    bins: Vec<Bin>,
    population: u64,
}

impl ColorBox {
    fn new(bins: Vec<Bin>) -> Self {
        let population = bins.iter().map(|(_, n)| *n as u64).sum();
        Self { bins, population }
    }

    fn range(&self, channel: usize) -> u8 {
        let (lo, hi) = self.bins.iter().fold((u8::MAX, 0u8), |(lo, hi), (c, _)| {
            (lo.min(c[channel]), hi.max(c[channel]))
        });
        hi.saturating_sub(lo)
    }

    /// Channel with the widest range, or `None` for a single-colour box.
    fn widest_channel(&self) -> Option<usize> {
        let (channel, range) = (0..3)
            .map(|ch| (ch, self.range(ch)))
            .fold((0, 0), |best, cur| if cur.1 > best.1 { cur } else { best });
        (range > 0).then_some(channel)
    }

    fn split(mut self) -> (ColorBox, ColorBox) {
        // Caller guarantees a non-zero range.
        let ch = self.widest_channel().unwrap_or(0);
        self.bins.sort_by_key(|(c, _)| (c[ch], c[(ch + 1) % 3], c[(ch + 2) % 3]));

        let half = self.population / 2;
        let mut running = 0u64;
        let mut cut = self.bins[self.bins.len() - 1].0[ch];
        for (c, n) in &self.bins {
            running += *n as u64;
            if running >= half {
                cut = c[ch];
                break;
            }
        }
        let max = self.bins[self.bins.len() - 1].0[ch];
        let split_at = if cut < max {
            self.bins.partition_point(|(c, _)| c[ch] <= cut)
        } else {
            self.bins.partition_point(|(c, _)| c[ch] < max)
        };
        let upper = self.bins.split_off(split_at);
        (ColorBox::new(self.bins), ColorBox::new(upper))
    }

    fn average(&self) -> Rgb {
        let half_step = 1u64 << (RSHIFT - 1);
        let mut sum = [0u64; 3];
        for (c, n) in &self.bins {
            for (s, v) in sum.iter_mut().zip(c) {
                *s += (((*v as u64) << RSHIFT) + half_step) * *n as u64;
            }
        }
        let pop = self.population.max(1);
        let channel = |s: u64| ((s + pop / 2) / pop).min(255) as u8;
        Rgb::new(channel(sum[0]), channel(sum[1]), channel(sum[2]))
    }
}

fn histogram(image: &RgbaImage, quality: usize) -> Vec<Bin> {
    let mut counts = vec![0u32; 1 << (3 * SIGBITS)];
    for px in image.pixels().step_by(quality.max(1)) {
        let [r, g, b, a] = px.0;
        if a < 125 || (r > 250 && g > 250 && b > 250) {
            continue;
        }
        let idx = ((r as usize >> RSHIFT) << (2 * SIGBITS))
            | ((g as usize >> RSHIFT) << SIGBITS)
            | (b as usize >> RSHIFT);
        counts[idx] += 1;
    }
    let mask = (1 << SIGBITS) - 1;
    counts
        .into_iter()
        .enumerate()
        .filter(|(_, n)| *n > 0)
        .map(|(idx, n)| {
            let q = [
                (idx >> (2 * SIGBITS)) as u8,
                ((idx >> SIGBITS) & mask) as u8,
                (idx & mask) as u8,
            ];
            (q, n)
        })
        .collect()
}

impl PaletteExtractor for MedianCut {
    fn extract(&self, image: &RgbaImage, count: usize) -> Vec<Rgb> {
        let bins = histogram(image, self.quality);
        if bins.is_empty() || count == 0 {
            return Vec::new();
        }

        let mut boxes = vec![ColorBox::new(bins)];
        while boxes.len() < count {
            let candidate = boxes
                .iter()
                .enumerate()
                .filter(|(_, b)| b.widest_channel().is_some())
                .max_by(|(ia, a), (ib, b)| a.population.cmp(&b.population).then(ib.cmp(ia)))
                .map(|(i, _)| i);
            let Some(i) = candidate else { break };
            let (lower, upper) = boxes.swap_remove(i).split();
            boxes.push(lower);
            boxes.push(upper);
        }

        boxes.sort_by(|a, b| b.population.cmp(&a.population));
        boxes.iter().map(ColorBox::average).collect()
    }
}

// ============================================================================
// AutoColors
// ============================================================================

/// Colours derived from a logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoColors {
    /// Text and icon colour: the most common swatch.
    pub foreground: Rgb,
    /// Pattern colour: the brightest swatch.
    pub pattern: Rgb,
}

impl AutoColors {
    /// Picks colours from an extracted palette. `None` for an empty palette.
    pub fn from_palette(palette: &[Rgb]) -> Option<Self> {
        let foreground = *palette.first()?;
        let pattern = select_brightest(palette)?;
        Some(Self { foreground, pattern })
    }

    pub fn from_image(extractor: &dyn PaletteExtractor, image: &RgbaImage) -> Option<Self> {
        Self::from_palette(&extractor.extract(image, DEFAULT_SWATCH_COUNT))
    }

    /// Decodes `logo` and picks colours from it.
    ///
    /// Decoding errors propagate; a logo with no usable pixels yields `None`.
    pub fn from_logo(extractor: &dyn PaletteExtractor, logo: &LogoSource) -> SignatureResult<Option<Self>> {
        let pixmap = decode_logo(logo, SAMPLE_RASTER_PX)?;
        let colors = Self::from_image(extractor, &pixmap_to_rgba_image(&pixmap));
        tracing::debug!(?colors, "auto colours from logo");
        Ok(colors)
    }

    /// Writes the colours into `input` as hex strings.
    pub fn apply(&self, input: &mut SignatureInput) {
        input.foreground_color = self.foreground.to_hex();
        input.pattern_color = self.pattern.to_hex();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Left 3/4 dark blue, right 1/4 light gold, with a white border.
    fn two_tone() -> RgbaImage {
        RgbaImage::from_fn(40, 20, |x, y| {
            if x == 0 || y == 0 {
                Rgba([255, 255, 255, 255])
            } else if x < 30 {
                Rgba([20, 40, 120, 255])
            } else {
                Rgba([230, 200, 140, 255])
            }
        })
    }

    #[test]
    fn dominant_colour_comes_first() {
        let palette = MedianCut { quality: 1 }.extract(&two_tone(), 6);
        assert_eq!(palette.len(), 2);
        let first = palette[0];
        assert!(first.b > first.r && first.r < 40, "got {first:?}");
        let second = palette[1];
        assert!(second.r > 220 && second.g > 190, "got {second:?}");
    }

    #[test]
    fn ignores_white_and_transparent_pixels() {
        let mut img = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        img.put_pixel(3, 3, Rgba([0, 0, 0, 0]));
        assert!(MedianCut { quality: 1 }.extract(&img, 6).is_empty());
    }

    #[test]
    fn never_returns_more_than_requested() {
        let img = RgbaImage::from_fn(64, 64, |x, y| Rgba([(x * 4) as u8, (y * 4) as u8, 90, 255]));
        let palette = MedianCut { quality: 1 }.extract(&img, 6);
        assert_eq!(palette.len(), 6);
        assert!(MedianCut::default().extract(&img, 0).is_empty());
    }

    #[test]
    fn extraction_is_deterministic() {
        let img = RgbaImage::from_fn(50, 30, |x, y| Rgba([(x * 5) as u8, (y * 8) as u8, ((x + y) * 3) as u8, 255]));
        let a = MedianCut::default().extract(&img, 6);
        let b = MedianCut::default().extract(&img, 6);
        assert_eq!(a, b);
    }

    #[test]
    fn auto_colours_pick_first_and_brightest() {
        let palette = [Rgb::new(20, 40, 120), Rgb::new(230, 200, 140), Rgb::new(100, 100, 100)];
        let colors = AutoColors::from_palette(&palette).unwrap();
        assert_eq!(colors.foreground, Rgb::new(20, 40, 120));
        assert_eq!(colors.pattern, Rgb::new(230, 200, 140));
        assert!(AutoColors::from_palette(&[]).is_none());

        let mut input = SignatureInput::default();
        colors.apply(&mut input);
        assert_eq!(input.foreground_color, "#142878");
        assert_eq!(input.pattern_color, "#e6c88c");
    }

    #[test]
    fn auto_colours_from_logo_image() {
        let logo = LogoSource::from_image(two_tone());
        let colors = AutoColors::from_logo(&MedianCut { quality: 1 }, &logo).unwrap().unwrap();
        assert!(colors.foreground.b > colors.foreground.r);
        assert!(colors.pattern.r > 200);
    }
}
