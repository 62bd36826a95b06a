//! Asset loading: logo decoding and tinted icon rasterization.
//!
//! Logos may be raster images or SVG, delivered as data URIs, raw SVG markup
//! or an already decoded image. Icons are monochrome SVGs recoloured by a
//! textual substitution on `fill="<hex>"` attributes before rasterization.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use rayon::prelude::*;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::{SignatureError, SignatureResult};
use crate::surface::rgba_image_to_pixmap;

// ============================================================================
// LogoSource
// ============================================================================

/// Where the logo comes from.
///
/// Serializes as a plain string (data URI or SVG markup). Decoded images
/// can be passed in directly but are never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogoSource {
    /// A `data:` URI or raw SVG markup.
    Uri(String),

    /// An image the caller has already decoded.
    #[serde(skip)]
    Image(Arc<RgbaImage>),
}

impl LogoSource {
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self::Uri(uri.into())
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self::Image(Arc::new(image))
    }

    /// Returns `true` for an empty URI, which callers treat as "no logo".
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Uri(s) if s.trim().is_empty())
    }
}

/// Payload extracted from a logo source, before rasterization.
enum LogoPayload {
    Svg(String),
    Raster(Vec<u8>),
}

fn logo_payload(uri: &str) -> SignatureResult<LogoPayload> {
    let uri = uri.trim();
    if uri.starts_with('<') {
        return Ok(LogoPayload::Svg(uri.to_string()));
    }
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| SignatureError::logo_decode("expected a data URI or SVG markup"))?;
    let (meta, data) = rest
        .split_once(',')
        .ok_or_else(|| SignatureError::logo_decode("data URI has no payload"))?;

    let is_svg = meta.contains("svg");
    let bytes = if meta.ends_with(";base64") {
        STANDARD
            .decode(data.trim())
            .map_err(|e| SignatureError::logo_decode(format!("invalid base64: {e}")))?
    } else {
        urlencoding::decode(data)
            .map_err(|e| SignatureError::logo_decode(format!("invalid percent-encoding: {e}")))?
            .into_owned()
            .into_bytes()
    };

    if is_svg || looks_like_svg(&bytes) {
        let svg = String::from_utf8(bytes)
            .map_err(|_| SignatureError::logo_decode("SVG logo is not valid UTF-8"))?;
        Ok(LogoPayload::Svg(svg))
    } else {
        Ok(LogoPayload::Raster(bytes))
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<svg") || head.starts_with("<?xml")
}

/// Decodes a logo into a premultiplied pixmap.
///
/// SVG logos are rasterized so their longer side equals `svg_target_px`;
/// raster logos keep their intrinsic size.
pub fn decode_logo(source: &LogoSource, svg_target_px: u32) -> SignatureResult<Pixmap> {
    match source {
        LogoSource::Image(image) => rgba_image_to_pixmap(image)
            .ok_or_else(|| SignatureError::logo_decode("logo image is empty")),
        LogoSource::Uri(uri) => match logo_payload(uri)? {
            LogoPayload::Svg(svg) => render_svg(&svg, svg_target_px)
                .ok_or_else(|| SignatureError::logo_decode("cannot render SVG logo")),
            LogoPayload::Raster(bytes) => {
                let img = image::load_from_memory(&bytes)
                    .map_err(|e| SignatureError::logo_decode(e.to_string()))?
                    .to_rgba8();
                rgba_image_to_pixmap(&img)
                    .ok_or_else(|| SignatureError::logo_decode("logo image is empty"))
            }
        },
    }
}

// ============================================================================
// Icons
// ============================================================================

/// The three contact icons drawn next to the website, phone and email text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Globe,
    IdCard,
    Inbox,
}

impl Icon {
    pub const ALL: [Icon; 3] = [Icon::Globe, Icon::IdCard, Icon::Inbox];

    /// File name of the asset inside an icon directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Icon::Globe => "global.svg",
            Icon::IdCard => "user-id.svg",
            Icon::Inbox => "inbox.svg",
        }
    }

    /// Character used by the HTML export when images are disabled.
    pub fn emoji(&self) -> &'static str {
        match self {
            Icon::Globe => "\u{1F310}",
            Icon::IdCard => "\u{1F4DE}",
            Icon::Inbox => "\u{2709}\u{FE0F}",
        }
    }

    fn index(&self) -> usize {
        match self {
            Icon::Globe => 0,
            Icon::IdCard => 1,
            Icon::Inbox => 2,
        }
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Supplies monochrome SVG markup for icons by logical name.
pub trait IconSource: Send + Sync {
    /// Returns the SVG markup for `icon`, or `None` if it is unavailable.
    fn icon_svg(&self, icon: Icon) -> Option<String>;
}

/// Icons compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinIcons;

const GLOBE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path fill="#292D32" fill-rule="evenodd" d="M12 2a10 10 0 1 0 0 20a10 10 0 1 0 0-20zm0 1.6a8.4 8.4 0 1 1 0 16.8a8.4 8.4 0 1 1 0-16.8z"/><path fill="#292D32" fill-rule="evenodd" d="M12 2c-2.9 2.6-4.3 6-4.3 10s1.4 7.4 4.3 10c2.9-2.6 4.3-6 4.3-10S14.9 4.6 12 2zm0 2.3c1.8 2.1 2.7 4.6 2.7 7.7s-0.9 5.6-2.7 7.7c-1.8-2.1-2.7-4.6-2.7-7.7s0.9-5.6 2.7-7.7z"/><path fill="#292D32" d="M3 11.2h18v1.6H3z"/></svg>"##;

const ID_CARD_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path fill="#292D32" fill-rule="evenodd" d="M4 4h16a2 2 0 0 1 2 2v12a2 2 0 0 1-2 2H4a2 2 0 0 1-2-2V6a2 2 0 0 1 2-2zm0 1.6a.4.4 0 0 0-.4.4v12c0 .2.2.4.4.4h16c.2 0 .4-.2.4-.4V6a.4.4 0 0 0-.4-.4z"/><path fill="#292D32" d="M8.5 8a2 2 0 1 1 0 4a2 2 0 1 1 0-4zM5 16c0-1.9 1.6-3 3.5-3s3.5 1.1 3.5 3v.6H5zM13.5 9h5v1.6h-5zM13.5 13h4v1.6h-4z"/></svg>"##;

const INBOX_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path fill="#292D32" fill-rule="evenodd" d="M5 3h14a2 2 0 0 1 2 2v14a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2V5a2 2 0 0 1 2-2zm0 1.6a.4.4 0 0 0-.4.4v7.4h4.6l1 2.2h3.6l1-2.2h4.6V5a.4.4 0 0 0-.4-.4zm-.4 9.4V19c0 .2.2.4.4.4h14c.2 0 .4-.2.4-.4v-5h-3.6l-1 2.2H9.2l-1-2.2z"/></svg>"##;

impl IconSource for BuiltinIcons {
    fn icon_svg(&self, icon: Icon) -> Option<String> {
        let svg = match icon {
            Icon::Globe => GLOBE_SVG,
            Icon::IdCard => ID_CARD_SVG,
            Icon::Inbox => INBOX_SVG,
        };
        Some(svg.to_string())
    }
}

/// Icons read from a directory (`global.svg`, `user-id.svg`, `inbox.svg`).
#[derive(Debug, Clone)]
pub struct IconDirectory {
    root: PathBuf,
}

impl IconDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl IconSource for IconDirectory {
    fn icon_svg(&self, icon: Icon) -> Option<String> {
        let path = self.root.join(icon.file_name());
        match std::fs::read_to_string(&path) {
            Ok(svg) => Some(svg),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "icon asset unavailable");
                None
            }
        }
    }
}

/// The three icons rasterized for one render. Missing entries are skipped.
#[derive(Default)]
pub struct IconSet {
    icons: [Option<Pixmap>; 3],
}

impl IconSet {
    /// Tints and rasterizes every icon concurrently.
    pub fn rasterize(source: &dyn IconSource, color: Rgb, size_px: u32) -> Self {
        let rendered: Vec<Option<Pixmap>> = Icon::ALL
            .par_iter()
            .map(|icon| rasterize_icon(source, *icon, color, size_px))
            .collect();
        let mut icons: [Option<Pixmap>; 3] = Default::default();
        for (slot, pixmap) in icons.iter_mut().zip(rendered) {
            *slot = pixmap;
        }
        Self { icons }
    }

    pub fn get(&self, icon: Icon) -> Option<&Pixmap> {
        self.icons[icon.index()].as_ref()
    }
}

/// Loads, tints and rasterizes one icon. Failures degrade to `None`.
pub fn rasterize_icon(source: &dyn IconSource, icon: Icon, color: Rgb, size_px: u32) -> Option<Pixmap> {
    let Some(svg) = source.icon_svg(icon) else {
        tracing::warn!(%icon, "icon missing; row renders without it");
        return None;
    };
    let tinted = tint_svg(&svg, color);
    let pixmap = render_svg(&tinted, size_px);
    if pixmap.is_none() {
        tracing::warn!(%icon, "icon failed to rasterize; row renders without it");
    }
    pixmap
}

// ============================================================================
// SVG Rendering
// ============================================================================

/// Renders an SVG string to a pixmap whose larger side is `size` pixels.
///
/// Returns `None` if the SVG cannot be parsed or rendered.
pub fn render_svg(svg_data: &str, size: u32) -> Option<Pixmap> {
    let opts = Options::default();
    let tree = Tree::from_str(svg_data, &opts).ok()?;

    let svg_size = tree.size();
    let (sw, sh) = (svg_size.width(), svg_size.height());
    let (width, height) = if sw >= sh {
        (size, ((sh * size as f32 / sw).round() as u32).max(1))
    } else {
        (((sw * size as f32 / sh).round() as u32).max(1), size)
    };
    let scale = size as f32 / sw.max(sh);

    let mut pixmap = Pixmap::new(width, height)?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());
    Some(pixmap)
}

/// Replaces every `fill="<hex>"` attribute with `color`.
///
/// Only hex values (`#` optional, 3 to 6 digits) are touched; `none`, named
/// colours, `currentColor` and style-based fills are left as they are.
pub fn tint_svg(svg: &str, color: Rgb) -> String {
    const PATTERN: &str = "fill=\"";
    let new_color = color.to_hex();
    let mut result = String::with_capacity(svg.len());
    let mut remaining = svg;

    while let Some(start) = remaining.find(PATTERN) {
        result.push_str(&remaining[..start + PATTERN.len()]);
        remaining = &remaining[start + PATTERN.len()..];

        let Some(end) = remaining.find('"') else {
            break;
        };
        let value = &remaining[..end];
        if is_hex_fill(value) {
            result.push_str(&new_color);
        } else {
            result.push_str(value);
        }
        remaining = &remaining[end..];
    }

    result.push_str(remaining);
    result
}

fn is_hex_fill(value: &str) -> bool {
    let digits = value.strip_prefix('#').unwrap_or(value);
    (3..=6).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

// ============================================================================
// Tests
// ============================================================================
