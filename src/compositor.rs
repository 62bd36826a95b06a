//! Signature compositor.
//!
//! [`Compositor`] turns a [`SignatureInput`] into a finished raster image.
//!
//! # Render Pipeline
//!
//! 1. **Layout** - [`LayoutMetrics::compute`] positions the logo box and every
//!    text/icon span.
//! 2. **Assets** - the logo and the three tinted icons are decoded in
//!    parallel and joined before drawing.
//! 3. **Background** - white fill, then the pattern painted on its own
//!    transparent layer and composited on success.
//! 4. **Logo** - fit-contained and centred in the logo box.
//! 5. **Rows** - icons and text drawn from the layout spans.
//! 6. **Encode** - PNG bytes plus the raw device-pixel image.
//!
//! A pattern or icon that fails is logged and skipped; a logo that cannot
//! be decoded fails the whole render.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use resvg::tiny_skia::Pixmap;

use crate::asset::{BuiltinIcons, IconSet, IconSource, LogoSource, decode_logo};
use crate::color::{Rgb, parse_color};
use crate::error::{SignatureError, SignatureResult};
use crate::geometry::{BoxF, SizePx, fit_contain, rounded_rect_path};
use crate::html::{HtmlOptions, compose_signature_html};
use crate::input::{RenderSettings, SignatureInput};
use crate::layout::{LayoutMetrics, Span};
use crate::pattern::concentric::{RING_ALPHAS, fill_rings};
use crate::pattern::{PatternParams, generate_pattern};
use crate::surface::Surface;
use crate::text::Typesetter;

/// Logical size of the logo card.
const CARD_SIZE: SizePx = SizePx { width: 220, height: 140 };
const CARD_CENTER: (f32, f32) = (80.0, 70.0);
const CARD_RING_RADII: [f32; 5] = [70.0, 110.0, 150.0, 190.0, 230.0];
const CARD_TILE: f32 = 96.0;
const CARD_RADIUS: f32 = 12.0;
const CARD_INSET: f32 = 12.0;

/// Ring colour used by the logo card when the caller has no preference.
pub const DEFAULT_RING_COLOR: Rgb = Rgb::new(212, 185, 130);

// ============================================================================
// RenderedSignature
// ============================================================================

/// A finished render.
#[derive(Debug, Clone)]
pub struct RenderedSignature {
    /// PNG-encoded image.
    pub png: Vec<u8>,
    /// The image in device pixels (`width * dpr` x `height * dpr`).
    pub image: RgbaImage,
    /// Logical width.
    pub width: u32,
    /// Logical height.
    pub height: u32,
    pub device_pixel_ratio: u32,
}

impl RenderedSignature {
    fn from_surface(surface: &Surface) -> SignatureResult<Self> {
        let image = surface.to_rgba_image();
        let png = crate::surface::encode_png(image.clone())?;
        let logical = surface.logical_size();
        Ok(Self {
            png,
            image,
            width: logical.width,
            height: logical.height,
            device_pixel_ratio: surface.device_pixel_ratio(),
        })
    }

    /// The PNG as a `data:image/png;base64,...` URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }

    /// Logical size.
    pub fn size(&self) -> SizePx {
        SizePx::new(self.width, self.height)
    }
}

// ============================================================================
// Compositor
// ============================================================================

/// Renders signatures. Cheap to share across threads.
///
/// # Example
///
/// ```
/// use signature_compositor::{Compositor, RenderSettings, SignatureInput, OutputSize};
///
/// let settings = RenderSettings { load_system_fonts: false, ..RenderSettings::default() };
/// let compositor = Compositor::new(settings);
///
/// let input = SignatureInput { output_size: OutputSize::Small, ..SignatureInput::default() };
/// let rendered = compositor.compose_signature(&input).unwrap();
///
/// assert_eq!((rendered.width, rendered.height), (1000, 240));
/// assert_eq!(rendered.image.width(), 2000);
/// ```
#[derive(Clone)]
pub struct Compositor {
    settings: RenderSettings,
    typesetter: Typesetter,
    icons: Arc<dyn IconSource>,
}

impl Compositor {
    /// Creates a compositor with the built-in icons.
    pub fn new(settings: RenderSettings) -> Self {
        let typesetter = Typesetter::from_settings(&settings);
        Self {
            settings,
            typesetter,
            icons: Arc::new(BuiltinIcons),
        }
    }

    /// Replaces the icon source.
    pub fn with_icons(mut self, icons: impl IconSource + 'static) -> Self {
        self.icons = Arc::new(icons);
        self
    }

    /// Replaces the typesetter, e.g. to share one font database.
    pub fn with_typesetter(mut self, typesetter: Typesetter) -> Self {
        self.typesetter = typesetter;
        self
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn typesetter(&self) -> &Typesetter {
        &self.typesetter
    }

    pub(crate) fn icon_source(&self) -> &dyn IconSource {
        self.icons.as_ref()
    }

    /// Computes the layout `compose_signature` would draw.
    pub fn layout(&self, input: &SignatureInput) -> LayoutMetrics {
        LayoutMetrics::compute(input, &self.typesetter)
    }

    /// Renders `input` to an image.
    ///
    /// Returns an error only when the logo cannot be decoded or the surface
    /// cannot be allocated or encoded.
    #[tracing::instrument(
        skip_all,
        fields(pattern = %input.pattern_type, size = %input.output_size)
    )]
    pub fn compose_signature(&self, input: &SignatureInput) -> SignatureResult<RenderedSignature> {
        let dpr = self.settings.effective_dpr();
        let metrics = self.layout(input);
        let tint = LayoutMetrics::icon_tint(input);
        let icon_px = (metrics.icon_size * dpr as f32).round() as u32;
        let logo_px = (metrics.logo_box.width * dpr as f32).round() as u32;

        let (logo, icons) = rayon::join(
            || input.logo_source().map(|logo| decode_logo(logo, logo_px)).transpose(),
            || IconSet::rasterize(self.icons.as_ref(), tint, icon_px),
        );
        let logo = logo?;

        let mut surface = Surface::try_new(metrics.canvas, dpr)?;
        surface.fill(Rgb::WHITE);
        self.draw_pattern(&mut surface, input, &metrics);

        if let Some(logo) = &logo {
            draw_fitted(&mut surface, logo, metrics.logo_box);
        }

        for span in metrics.rows.iter().flat_map(|row| &row.spans) {
            match span {
                Span::Text { text, x, y, style } => {
                    self.typesetter.draw(&mut surface, text, *x, *y, style);
                }
                Span::Icon { icon, bounds } => {
                    if let Some(pixmap) = icons.get(*icon) {
                        surface.draw_image(pixmap, *bounds);
                    }
                }
            }
        }

        RenderedSignature::from_surface(&surface)
    }

    /// Parses a JSON [`SignatureInput`] and renders it.
    pub fn compose_signature_json(&self, json: &str) -> SignatureResult<RenderedSignature> {
        let input = SignatureInput::from_json(json).map_err(|e| SignatureError::config(e.to_string()))?;
        self.compose_signature(&input)
    }

    fn draw_pattern(&self, surface: &mut Surface, input: &SignatureInput, metrics: &LayoutMetrics) {
        let pattern = input.pattern_type;
        let Some(mut layer) = Surface::new(metrics.canvas, surface.device_pixel_ratio()) else {
            tracing::warn!(%pattern, "pattern layer could not be allocated; skipping");
            return;
        };
        let params = PatternParams::new(
            parse_color(&input.pattern_color),
            input.opacity(),
            metrics.canvas.width as f32,
            metrics.canvas.height as f32,
            metrics.scale,
        );
        match pattern.paint(&mut layer, &params) {
            Ok(()) => surface.draw_layer(&layer),
            Err(err) => tracing::warn!(%pattern, error = %err, "pattern failed; rendering without it"),
        }
    }

    /// Renders the logo on a white rounded tile surrounded by soft rings.
    ///
    /// The card is 220 x 140 logical pixels with a transparent background.
    #[tracing::instrument(skip_all)]
    pub fn compose_logo_card(&self, logo: &LogoSource, ring_color: Rgb) -> SignatureResult<RenderedSignature> {
        let dpr = self.settings.effective_dpr();
        let max_side = CARD_TILE - CARD_INSET * 2.0;
        let logo = decode_logo(logo, (max_side * dpr as f32).round() as u32)?;

        let mut surface = Surface::try_new(CARD_SIZE, dpr)?;
        fill_rings(&mut surface, CARD_CENTER, &CARD_RING_RADII, &RING_ALPHAS, ring_color)?;

        let tile = BoxF::new(
            CARD_CENTER.0 - CARD_TILE / 2.0,
            CARD_CENTER.1 - CARD_TILE / 2.0,
            CARD_TILE,
            CARD_TILE,
        );
        let path = rounded_rect_path(tile.x, tile.y, tile.width, tile.height, CARD_RADIUS)
            .ok_or_else(|| SignatureError::surface("logo card tile has no area"))?;
        surface.fill_path_solid(&path, Rgb::WHITE.into());

        let inner = BoxF::new(tile.x + CARD_INSET, tile.y + CARD_INSET, max_side, max_side);
        draw_fitted(&mut surface, &logo, inner);

        RenderedSignature::from_surface(&surface)
    }

    /// Builds an HTML table fragment that mirrors the raster layout.
    pub fn compose_signature_html(&self, input: &SignatureInput, options: HtmlOptions) -> SignatureResult<String> {
        compose_signature_html(self, input, options)
    }

    /// Renders just the background pattern at the input's output size.
    pub fn compose_pattern(&self, input: &SignatureInput) -> SignatureResult<Pixmap> {
        let canvas = input.output_size.canvas_size();
        Ok(generate_pattern(
            input.pattern_type,
            parse_color(&input.pattern_color),
            input.opacity(),
            canvas.width,
            canvas.height,
            input.output_size.scale(),
        )?)
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

/// Draws `image` fit-contained and centred in `area`.
fn draw_fitted(surface: &mut Surface, image: &Pixmap, area: BoxF) {
    let fit = fit_contain(
        image.width(),
        image.height(),
        area.width.round() as u32,
        area.height.round() as u32,
    );
    surface.draw_image(image, area.center_inner(fit.draw_w as f32, fit.draw_h as f32));
}
