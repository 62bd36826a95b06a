//! signature-compositor: email signature image compositor
//!
//! This crate renders an email signature from a plain input record: name,
//! title and contact rows, a logo, a decorative background pattern and two
//! layout sliders. The output is a PNG (plus the raw pixels) at one of three
//! output sizes, or an HTML table fragment for email clients.
//!
//! # Example
//!
//! ```
//! use signature_compositor::{Compositor, OutputSize, PatternType, RenderSettings, SignatureInput};
//!
//! let compositor = Compositor::new(RenderSettings {
//!     load_system_fonts: false,
//!     ..RenderSettings::default()
//! });
//!
//! let input = SignatureInput {
//!     name: "Ada Lovelace".into(),
//!     title: "Analyst".into(),
//!     pattern_type: PatternType::GradientBlobs,
//!     output_size: OutputSize::Small,
//!     ..SignatureInput::default()
//! };
//!
//! let rendered = compositor.compose_signature(&input).unwrap();
//! assert_eq!((rendered.width, rendered.height), (1000, 240));
//! assert!(rendered.to_data_uri().starts_with("data:image/png;base64,"));
//! ```
//!
//! # JSON Input
//!
//! [`SignatureInput`] is serde-friendly with camelCase field names, and
//! every field has a default:
//!
//! ```
//! use signature_compositor::{Compositor, HtmlOptions, RenderSettings, SignatureInput};
//!
//! let input = SignatureInput::from_json(r#"{ "name": "Ada", "outputSize": "small" }"#).unwrap();
//! let compositor = Compositor::new(RenderSettings { load_system_fonts: false, ..Default::default() });
//!
//! let options = HtmlOptions { include_pattern: false, include_images: false };
//! let html = compositor.compose_signature_html(&input, options).unwrap();
//! assert!(html.starts_with("<table"));
//! ```

mod asset;
mod color;
mod compositor;
mod error;
mod geometry;
mod html;
mod input;
mod layout;
mod surface;
mod swatches;
mod text;

pub mod pattern;

pub use asset::{
    BuiltinIcons, Icon, IconDirectory, IconSet, IconSource, LogoSource, decode_logo, rasterize_icon,
    render_svg, tint_svg,
};
pub use color::{Rgb, Rgba, luminance, parse_color, parse_color_alpha, select_brightest, to_rgba};
pub use compositor::{Compositor, DEFAULT_RING_COLOR, RenderedSignature};
pub use error::{PatternError, SignatureError, SignatureResult};
pub use geometry::{BoxF, FitSize, SizePx, fit_contain, rounded_rect_path};
pub use html::{HtmlOptions, escape_html};
pub use input::{MAX_DEVICE_PIXEL_RATIO, OutputSize, RenderSettings, RequiredField, SignatureInput};
pub use layout::{LayoutMetrics, Row, RowKind, Span, block_height};
pub use pattern::{PatternParams, PatternType, generate_pattern};
pub use surface::{Surface, encode_png, pixmap_to_rgba_image, rgba_image_to_pixmap};
pub use swatches::{AutoColors, DEFAULT_SWATCH_COUNT, MedianCut, PaletteExtractor};
pub use text::{
    Baseline, DEFAULT_FONT_FAMILY, FixedAdvance, TextMeasure, TextStyle, Typesetter, bind_generic_families,
};
