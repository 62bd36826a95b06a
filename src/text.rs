//! Text measuring and drawing.
//!
//! Text is shaped by usvg: each run becomes a one-element SVG document in the
//! surface's logical coordinate space, which resvg then paints. Measuring
//! uses the same shaping, so widths match what is drawn.

use std::path::Path;
use std::sync::Arc;

use resvg::usvg::{Group, Node, Options, Tree, fontdb};

use crate::color::Rgba;
use crate::geometry::SizePx;
use crate::html::escape_html;
use crate::input::RenderSettings;
use crate::surface::Surface;

/// Font stack used when the caller does not configure one.
pub const DEFAULT_FONT_FAMILY: &str = "Inter, 'Segoe UI', Roboto, Arial, sans-serif";

/// Sans-serif faces tried, in order, when a generic family names a font that
/// is not installed.
const FALLBACK_FAMILIES: &[&str] = &[
    "Inter",
    "Segoe UI",
    "Roboto",
    "Arial",
    "Helvetica",
    "Liberation Sans",
    "DejaVu Sans",
    "Noto Sans",
    "Open Sans",
];

/// Average advance as a fraction of the font size, used when no font can
/// shape the text.
const FALLBACK_ADVANCE: f32 = 0.55;

/// Vertical anchor of a text run relative to its `y` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baseline {
    /// `y` is the top of the em box.
    #[default]
    Top,
    /// `y` is the vertical centre.
    Middle,
    /// `y` is the alphabetic baseline.
    Alphabetic,
}

impl Baseline {
    fn svg_value(&self) -> &'static str {
        match self {
            Baseline::Top => "text-before-edge",
            Baseline::Middle => "central",
            Baseline::Alphabetic => "alphabetic",
        }
    }
}

/// Font and colour of a text run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in logical pixels.
    pub size: f32,
    pub weight: u16,
    pub italic: bool,
    pub color: Rgba,
    pub baseline: Baseline,
}

impl TextStyle {
    pub fn new(size: f32, weight: u16, color: Rgba) -> Self {
        Self {
            size,
            weight,
            italic: false,
            color,
            baseline: Baseline::Top,
        }
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = baseline;
        self
    }
}

/// Measures the advance width of a text run in logical pixels.
pub trait TextMeasure {
    fn measure(&self, text: &str, style: &TextStyle) -> f32;
}

/// Estimates widths from the character count alone.
///
/// Used when no fonts are available; also handy for layout tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvance(pub f32);

impl Default for FixedAdvance {
    fn default() -> Self {
        Self(FALLBACK_ADVANCE)
    }
}

impl TextMeasure for FixedAdvance {
    fn measure(&self, text: &str, style: &TextStyle) -> f32 {
        text.chars().count() as f32 * style.size * self.0
    }
}

/// Shapes, measures and draws text with a font database.
#[derive(Clone)]
pub struct Typesetter {
    fontdb: Arc<fontdb::Database>,
    family: String,
}

impl Typesetter {
    /// Wraps an existing database. Call [`bind_generic_families`] on it
    /// first if it may lack the fonts the generic families name.
    pub fn new(fontdb: Arc<fontdb::Database>, family: impl Into<String>) -> Self {
        Self {
            fontdb,
            family: family.into(),
        }
    }

    /// Creates a typesetter backed by the fonts installed on this machine.
    pub fn with_system_fonts(family: impl Into<String>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        Self::from_database(db, family)
    }

    /// Creates the typesetter described by `settings`: system fonts when
    /// enabled, plus every font file found in `settings.font_dirs`.
    pub fn from_settings(settings: &RenderSettings) -> Self {
        if !settings.load_system_fonts && settings.font_dirs.is_empty() {
            return Self::new(Arc::new(fontdb::Database::new()), settings.font_family.clone());
        }
        let mut db = fontdb::Database::new();
        if settings.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &settings.font_dirs {
            load_font_dir(&mut db, dir);
        }
        Self::from_database(db, settings.font_family.clone())
    }

    fn from_database(mut db: fontdb::Database, family: impl Into<String>) -> Self {
        match bind_generic_families(&mut db) {
            Some(fallback) => tracing::debug!(faces = db.len(), %fallback, "loaded fonts"),
            None => tracing::warn!("no font faces available; text will not be drawn"),
        }
        Self::new(Arc::new(db), family)
    }

    /// Creates a typesetter with no fonts; text is measured by estimate and
    /// not drawn.
    pub fn without_fonts() -> Self {
        Self::new(Arc::new(fontdb::Database::new()), DEFAULT_FONT_FAMILY)
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn has_fonts(&self) -> bool {
        self.fontdb.len() != 0
    }

    /// Draws `text` at logical position (`x`, `y`).
    pub fn draw(&self, surface: &mut Surface, text: &str, x: f32, y: f32, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        let svg = self.text_svg(text, x, y, style, surface.logical_size());
        match self.parse(&svg) {
            Some(tree) if tree.root().has_children() => surface.render_tree(&tree),
            Some(_) if !self.has_fonts() => {}
            Some(_) => tracing::warn!(text, family = %self.family, "no font face matched; text run not drawn"),
            None => tracing::warn!(text, "text run could not be shaped"),
        }
    }

    fn text_svg(&self, text: &str, x: f32, y: f32, style: &TextStyle, canvas: SizePx) -> String {
        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
                r#"<text x="{x}" y="{y}" font-family="{family}" font-size="{size}" font-weight="{weight}" "#,
                r#"font-style="{font_style}" fill="{fill}" fill-opacity="{opacity}" "#,
                r#"dominant-baseline="{baseline}" xml:space="preserve">{text}</text></svg>"#
            ),
            w = canvas.width.max(1),
            h = canvas.height.max(1),
            x = x,
            y = y,
            family = escape_html(&self.family),
            size = style.size,
            weight = style.weight,
            font_style = if style.italic { "italic" } else { "normal" },
            fill = style.color.rgb().to_hex(),
            opacity = style.color.a.clamp(0.0, 1.0),
            baseline = style.baseline.svg_value(),
            text = escape_html(text),
        )
    }

    fn parse(&self, svg: &str) -> Option<Tree> {
        let mut opts = Options::default();
        opts.fontdb = Arc::clone(&self.fontdb);
        Tree::from_str(svg, &opts).ok()
    }
}

impl TextMeasure for Typesetter {
    fn measure(&self, text: &str, style: &TextStyle) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let canvas = SizePx::new(1, 1);
        let svg = self.text_svg(text, 0.0, style.size, style, canvas);
        self.parse(&svg)
            .and_then(|tree| shaped_width(tree.root()))
            .unwrap_or_else(|| FixedAdvance::default().measure(text, style))
    }
}

/// Points every generic family (`sans-serif`, `serif`, ...) that names a
/// missing font at a face that is actually loaded.
///
/// Returns the family used as the fallback, or `None` for an empty database.
pub fn bind_generic_families(db: &mut fontdb::Database) -> Option<String> {
    let fallback = fallback_family(db)?;

    let generics = [
        fontdb::Family::SansSerif,
        fontdb::Family::Serif,
        fontdb::Family::Monospace,
        fontdb::Family::Cursive,
        fontdb::Family::Fantasy,
    ];
    for generic in generics {
        if has_family(db, db.family_name(&generic)) {
            continue;
        }
        match generic {
            fontdb::Family::SansSerif => db.set_sans_serif_family(fallback.as_str()),
            fontdb::Family::Serif => db.set_serif_family(fallback.as_str()),
            fontdb::Family::Monospace => db.set_monospace_family(fallback.as_str()),
            fontdb::Family::Cursive => db.set_cursive_family(fallback.as_str()),
            _ => db.set_fantasy_family(fallback.as_str()),
        }
    }
    Some(fallback)
}

fn fallback_family(db: &fontdb::Database) -> Option<String> {
    FALLBACK_FAMILIES
        .iter()
        .copied()
        .find(|name| has_family(db, name))
        .map(str::to_string)
        .or_else(|| {
            db.faces()
                .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
        })
}

fn has_family(db: &fontdb::Database, name: &str) -> bool {
    db.faces()
        .any(|face| face.families.iter().any(|(family, _)| family == name))
}

fn load_font_dir(db: &mut fontdb::Database, dir: &Path) {
    let before = db.len();
    db.load_fonts_dir(dir);
    if db.len() == before {
        tracing::warn!(dir = %dir.display(), "no fonts found in font directory");
    }
}

fn shaped_width(group: &Group) -> Option<f32> {
    group.children().iter().find_map(|node| match node {
        Node::Text(text) => Some(text.bounding_box().right().max(0.0)),
        Node::Group(inner) => shaped_width(inner),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    fn style() -> TextStyle {
        TextStyle::new(20.0, 400, Rgb::BLACK.with_alpha(0.9))
    }

    #[test]
    fn fixed_advance_scales_with_length_and_size() {
        let m = FixedAdvance(0.5);
        assert_eq!(m.measure("abcd", &style()), 40.0);
        assert_eq!(m.measure("", &style()), 0.0);
    }

    #[test]
    fn measuring_without_fonts_falls_back_to_estimate() {
        let ts = Typesetter::without_fonts();
        assert!(!ts.has_fonts());
        let expected = FixedAdvance::default().measure("Phone", &style());
        assert_eq!(ts.measure("Phone", &style()), expected);
        assert_eq!(ts.measure("", &style()), 0.0);
    }

    #[test]
    fn text_markup_is_escaped() {
        let ts = Typesetter::without_fonts();
        let svg = ts.text_svg("A & <B>", 1.0, 2.0, &style(), SizePx::new(10, 10));
        assert!(svg.contains("A &amp; &lt;B&gt;"));
        assert!(svg.contains(r#"dominant-baseline="text-before-edge""#));
        assert!(ts.parse(&svg).is_some());
    }

    #[test]
    fn empty_database_has_no_fallback() {
        let mut db = fontdb::Database::new();
        assert_eq!(bind_generic_families(&mut db), None);
    }

    #[test]
    fn generic_families_resolve_to_loaded_faces() {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let Some(fallback) = bind_generic_families(&mut db) else {
            return;
        };
        assert!(has_family(&db, &fallback));
        for generic in [fontdb::Family::SansSerif, fontdb::Family::Serif, fontdb::Family::Monospace] {
            let name = db.family_name(&generic).to_string();
            assert!(has_family(&db, &name), "{name} is not loaded");
        }
    }

    #[test]
    fn system_fonts_put_ink_on_the_surface() {
        let ts = Typesetter::with_system_fonts(DEFAULT_FONT_FAMILY);
        if !ts.has_fonts() {
            return;
        }
        let mut surface = Surface::new(SizePx::new(120, 40), 2).unwrap();
        surface.fill(Rgb::WHITE);
        ts.draw(&mut surface, "Full Name", 4.0, 4.0, &style());
        let dark = surface
            .pixmap()
            .pixels()
            .iter()
            .filter(|p| p.demultiply().red() < 100)
            .count();
        assert!(dark > 20, "only {dark} dark pixels");
        assert!(ts.measure("Full Name", &style()) > 0.0);
    }

    #[test]
    fn settings_without_fonts_skip_loading() {
        let settings = RenderSettings {
            load_system_fonts: false,
            font_family: "Georgia".into(),
            ..RenderSettings::default()
        };
        let ts = Typesetter::from_settings(&settings);
        assert!(!ts.has_fonts());
        assert_eq!(ts.family(), "Georgia");
    }

    #[test]
    fn italic_and_baseline_builders() {
        let s = style().italic(true).baseline(Baseline::Middle);
        assert!(s.italic);
        assert_eq!(s.baseline, Baseline::Middle);
    }

    #[test]
    fn drawing_without_fonts_leaves_surface_untouched() {
        let ts = Typesetter::without_fonts();
        let mut surface = Surface::new(SizePx::new(50, 20), 1).unwrap();
        surface.fill(Rgb::WHITE);
        ts.draw(&mut surface, "hello", 2.0, 2.0, &style());
        assert!(
            surface
                .pixmap()
                .pixels()
                .iter()
                .all(|p| p.demultiply().red() == 255)
        );
    }
}
