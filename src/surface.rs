//! Raster drawing surface.
//!
//! [`Surface`] is the canvas every render draws into: a premultiplied
//! tiny-skia pixmap sized in device pixels plus a root transform that maps
//! logical coordinates onto it.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use resvg::tiny_skia::{
    self, FillRule, FilterQuality, IntSize, Paint, Path, Pattern, Pixmap, PixmapPaint, Rect,
    Shader, SpreadMode, Transform,
};
use resvg::usvg::Tree;

use crate::color::{Rgb, Rgba as Rgba32};
use crate::error::{SignatureError, SignatureResult};
use crate::geometry::{BoxF, SizePx};

/// A drawing surface with a fixed device pixel ratio.
pub struct Surface {
    pixmap: Pixmap,
    logical: SizePx,
    dpr: u32,
}

impl Surface {
    /// Allocates a transparent surface of `logical * dpr` device pixels.
    pub fn new(logical: SizePx, dpr: u32) -> Option<Self> {
        let dpr = dpr.max(1);
        let device = logical.scaled(dpr);
        let pixmap = Pixmap::new(device.width, device.height)?;
        Some(Self {
            pixmap,
            logical,
            dpr,
        })
    }

    /// Like [`Surface::new`], reporting allocation failure as an error.
    pub fn try_new(logical: SizePx, dpr: u32) -> SignatureResult<Self> {
        Self::new(logical, dpr).ok_or_else(|| {
            SignatureError::surface(format!(
                "cannot allocate {}x{} surface at {}x",
                logical.width, logical.height, dpr
            ))
        })
    }

    pub fn logical_size(&self) -> SizePx {
        self.logical
    }

    pub fn device_pixel_ratio(&self) -> u32 {
        self.dpr
    }

    /// Transform from logical coordinates to device pixels.
    pub fn transform(&self) -> Transform {
        Transform::from_scale(self.dpr as f32, self.dpr as f32)
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Fills the whole surface with an opaque colour.
    pub fn fill(&mut self, color: Rgb) {
        self.pixmap
            .fill(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, 255));
    }

    /// Fills a path given in logical coordinates with a solid colour.
    pub fn fill_path_solid(&mut self, path: &Path, color: Rgba32) {
        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        paint.anti_alias = true;
        self.fill_path(path, paint);
    }

    /// Fills a path given in logical coordinates with an arbitrary shader.
    pub fn fill_path_shader(&mut self, path: &Path, shader: Shader<'_>, local: Transform) {
        let paint = Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        };
        let ts = self.transform().pre_concat(local);
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, ts, None);
    }

    fn fill_path(&mut self, path: &Path, paint: Paint<'_>) {
        let ts = self.transform();
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, ts, None);
    }

    /// Draws `image` scaled into `dest` (logical coordinates).
    pub fn draw_image(&mut self, image: &Pixmap, dest: BoxF) {
        if image.width() == 0 || image.height() == 0 || dest.width <= 0.0 || dest.height <= 0.0 {
            return;
        }
        let Some(rect) = Rect::from_xywh(dest.x, dest.y, dest.width, dest.height) else {
            return;
        };
        let sx = dest.width / image.width() as f32;
        let sy = dest.height / image.height() as f32;
        let pattern = Pattern::new(
            image.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bicubic,
            1.0,
            Transform::from_row(sx, 0.0, 0.0, sy, dest.x, dest.y),
        );
        let paint = Paint {
            shader: pattern,
            anti_alias: true,
            ..Paint::default()
        };
        let ts = self.transform();
        self.pixmap.fill_rect(rect, &paint, ts, None);
    }

    /// Composites another surface of the same device size on top of this one.
    pub fn draw_layer(&mut self, layer: &Surface) {
        self.pixmap.draw_pixmap(
            0,
            0,
            layer.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// Renders a parsed SVG tree whose user space is the logical canvas.
    pub fn render_tree(&mut self, tree: &Tree) {
        let ts = self.transform();
        resvg::render(tree, ts, &mut self.pixmap.as_mut());
    }

    /// Returns the colour of a device pixel, unpremultiplied.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        let p = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgba([p.red(), p.green(), p.blue(), p.alpha()]))
    }

    /// Converts the surface to a straight-alpha RGBA image.
    pub fn to_rgba_image(&self) -> RgbaImage {
        pixmap_to_rgba_image(&self.pixmap)
    }

    /// Encodes the surface as PNG.
    pub fn encode_png(&self) -> SignatureResult<Vec<u8>> {
        encode_png(self.to_rgba_image())
    }
}

/// Encodes an RGBA image as PNG bytes.
pub fn encode_png(image: RgbaImage) -> SignatureResult<Vec<u8>> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| SignatureError::encode(e.to_string()))?;
    Ok(buf)
}

/// Converts a tiny_skia Pixmap to an image::RgbaImage.
pub fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

/// Converts a straight-alpha RGBA image into a premultiplied pixmap.
pub fn rgba_image_to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let (width, height) = image.dimensions();
    let mut data = image.as_raw().clone();
    premultiply_rgba8_in_place(&mut data);
    Pixmap::from_vec(data, IntSize::from_wh(width, height)?)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resvg::tiny_skia::PathBuilder;

    #[test]
    fn surface_is_sized_in_device_pixels() {
        let surface = Surface::new(SizePx::new(100, 24), 2).unwrap();
        assert_eq!(surface.pixmap().width(), 200);
        assert_eq!(surface.pixmap().height(), 48);
        assert_eq!(surface.logical_size(), SizePx::new(100, 24));
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        assert!(Surface::new(SizePx::new(0, 10), 2).is_none());
        assert!(Surface::try_new(SizePx::new(0, 10), 2).is_err());
    }

    #[test]
    fn logical_drawing_is_scaled_by_dpr() {
        let mut surface = Surface::new(SizePx::new(10, 10), 2).unwrap();
        surface.fill(Rgb::WHITE);
        let rect = Rect::from_xywh(0.0, 0.0, 5.0, 5.0).unwrap();
        let path = PathBuilder::from_rect(rect);
        surface.fill_path_solid(&path, Rgba32::new(255, 0, 0, 1.0));

        // Logical (0..5) covers device (0..10).
        assert_eq!(surface.pixel(9, 9).unwrap().0, [255, 0, 0, 255]);
        assert_eq!(surface.pixel(11, 11).unwrap().0, [255, 255, 255, 255]);
    }

    #[test]
    fn draw_image_scales_into_destination() {
        let mut surface = Surface::new(SizePx::new(20, 20), 1).unwrap();
        surface.fill(Rgb::WHITE);
        let src = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
        let pixmap = rgba_image_to_pixmap(&src).unwrap();
        surface.draw_image(&pixmap, BoxF::new(5.0, 5.0, 10.0, 10.0));

        let inside = surface.pixel(10, 10).unwrap();
        assert!(inside[2] > 245 && inside[0] < 10, "got {:?}", inside);
        assert_eq!(surface.pixel(1, 1).unwrap().0, [255, 255, 255, 255]);
    }

    #[test]
    fn rgba_round_trip_keeps_opaque_pixels() {
        let src = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let pixmap = rgba_image_to_pixmap(&src).unwrap();
        assert_eq!(pixmap_to_rgba_image(&pixmap), src);
    }

    #[test]
    fn png_encoding_produces_signature() {
        let surface = Surface::new(SizePx::new(4, 4), 1).unwrap();
        let png = surface.encode_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
