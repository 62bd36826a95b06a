//! Serializable signature input and render settings.
//!
//! A [`SignatureInput`] captures everything the compositor needs for one
//! render: the text fields, the logo, colours and layout sliders. It is
//! serialized with camelCase field names so a form front end can hand it
//! over as JSON. Every field has a default, so `{}` is a valid input.
//!
//! # Example
//!
//! ```
//! use signature_compositor::{OutputSize, PatternType, SignatureInput};
//!
//! let input = SignatureInput::from_json(
//!     r#"{ "name": "Ada Lovelace", "patternType": "gradient-rings", "outputSize": "medium" }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(input.pattern_type, PatternType::GradientRings);
//! assert_eq!(input.output_size, OutputSize::Medium);
//! assert_eq!(input.foreground_color, "#111111");
//!
//! let json = input.to_json().unwrap();
//! assert!(json.contains("\"patternType\":\"gradient-rings\""));
//! ```

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::asset::LogoSource;
use crate::geometry::SizePx;
use crate::pattern::{PatternType, normalize_opacity};
use crate::text::DEFAULT_FONT_FAMILY;

/// Logical canvas width at scale 1.0.
pub const BASE_WIDTH: f32 = 1000.0;
/// Logical canvas height at scale 1.0.
pub const BASE_HEIGHT: f32 = 240.0;

// ============================================================================
// OutputSize
// ============================================================================

/// Output size preset. Multiplies every layout constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputSize {
    Small,
    Medium,
    #[default]
    Large,
}

impl OutputSize {
    pub const ALL: [OutputSize; 3] = [OutputSize::Small, OutputSize::Medium, OutputSize::Large];

    /// Resolves an identifier; anything unknown is `Large`.
    pub fn from_id(id: &str) -> Self {
        match id.trim() {
            "small" => Self::Small,
            "medium" => Self::Medium,
            _ => Self::Large,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    pub fn scale(&self) -> f32 {
        match self {
            Self::Small => 1.0,
            Self::Medium => 1.5,
            Self::Large => 2.0,
        }
    }

    /// Logical canvas size for this preset.
    pub fn canvas_size(&self) -> SizePx {
        let s = self.scale();
        SizePx::new((BASE_WIDTH * s).round() as u32, (BASE_HEIGHT * s).round() as u32)
    }

    /// Suggested download name, e.g. `signature-large.png`.
    pub fn file_name(&self) -> String {
        format!("signature-{}.png", self.id())
    }
}

impl From<String> for OutputSize {
    fn from(id: String) -> Self {
        Self::from_id(&id)
    }
}

impl From<OutputSize> for String {
    fn from(size: OutputSize) -> Self {
        size.id().to_string()
    }
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ============================================================================
// SignatureInput
// ============================================================================

/// Everything one signature render depends on.
///
/// # JSON Format
///
/// ```json
/// {
///   "name": "Ada Lovelace",
///   "title": "Analyst",
///   "phone": "+44 20 7946 0000",
///   "email": "ada@example.com",
///   "website": "example.com",
///   "address": "12 St James's Square, London",
///   "rights1": "All rights reserved.",
///   "rights2": "Confidential",
///   "rights2Italic": true,
///   "rights2UseFg": true,
///   "logoSource": "data:image/png;base64,...",
///   "foregroundColor": "#111111",
///   "patternColor": "#D4B982",
///   "patternOpacity": 0.5,
///   "verticalPositionPercent": 30,
///   "horizontalPositionPercent": 10,
///   "patternType": "circles",
///   "outputSize": "large"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignatureInput {
    pub name: String,
    pub title: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub address: String,
    pub rights1: String,
    pub rights2: String,
    pub rights2_italic: bool,

    /// Draw `rights2` in the foreground colour instead of muted grey.
    pub rights2_use_fg: bool,

    #[serde(rename = "logoSource", skip_serializing_if = "Option::is_none")]
    pub logo: Option<LogoSource>,

    /// CSS colour for the name and the icon tint.
    pub foreground_color: String,

    /// CSS colour of the background pattern.
    pub pattern_color: String,

    /// Pattern opacity, 0.0-1.0.
    pub pattern_opacity: f32,

    /// 0 puts the text block at the bottom, 100 at the top.
    pub vertical_position_percent: i32,

    /// 0 puts the text block next to the logo, 100 against the right padding.
    pub horizontal_position_percent: i32,

    pub pattern_type: PatternType,
    pub output_size: OutputSize,
}

impl Default for SignatureInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            title: String::new(),
            phone: String::new(),
            email: String::new(),
            website: String::new(),
            address: String::new(),
            rights1: String::new(),
            rights2: String::new(),
            rights2_italic: false,
            rights2_use_fg: true,
            logo: None,
            foreground_color: "#111111".to_string(),
            pattern_color: "#D4B982".to_string(),
            pattern_opacity: 0.5,
            vertical_position_percent: 30,
            horizontal_position_percent: 10,
            pattern_type: PatternType::Circles,
            output_size: OutputSize::Large,
        }
    }
}

/// Fields that must be filled in before a signature is exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Name,
    Title,
    Email,
    Phone,
    Website,
}

impl RequiredField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Title => "title",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Website => "website",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl SignatureInput {
    /// Creates an input with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the logo.
    pub fn with_logo(mut self, logo: LogoSource) -> Self {
        self.logo = Some(logo);
        self
    }

    /// The logo, unless absent or an empty string.
    pub fn logo_source(&self) -> Option<&LogoSource> {
        self.logo.as_ref().filter(|l| !l.is_empty())
    }

    /// Opacity clamped into 0.0-1.0; non-numbers fall back to 0.3.
    pub fn opacity(&self) -> f32 {
        normalize_opacity(self.pattern_opacity)
    }

    pub fn vertical_percent(&self) -> f32 {
        self.vertical_position_percent.clamp(0, 100) as f32
    }

    pub fn horizontal_percent(&self) -> f32 {
        self.horizontal_position_percent.clamp(0, 100) as f32
    }

    /// Required fields that are empty or whitespace-only, in form order.
    ///
    /// Previews never check this; it gates downloading and copying.
    pub fn missing_required_fields(&self) -> Vec<RequiredField> {
        [
            (RequiredField::Name, &self.name),
            (RequiredField::Title, &self.title),
            (RequiredField::Email, &self.email),
            (RequiredField::Phone, &self.phone),
            (RequiredField::Website, &self.website),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// Serializes the input to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the input to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes an input from a JSON string. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// RenderSettings
// ============================================================================

/// Largest backing-store multiplier a render will allocate for.
pub const MAX_DEVICE_PIXEL_RATIO: u32 = 8;

/// Process-wide rendering settings, fixed when a compositor is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderSettings {
    /// Display density. Values below 2 are raised to 2, values above
    /// [`MAX_DEVICE_PIXEL_RATIO`] are lowered to it.
    pub device_pixel_ratio: f32,

    /// CSS-style font family list used for all text.
    pub font_family: String,

    /// Load fonts installed on this machine.
    pub load_system_fonts: bool,

    /// Extra directories scanned for `.ttf`, `.otf` and `.ttc` files.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub font_dirs: Vec<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 2.0,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            load_system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

impl RenderSettings {
    /// Backing-store multiplier: `round(device_pixel_ratio)` clamped to
    /// `2..=MAX_DEVICE_PIXEL_RATIO`.
    pub fn effective_dpr(&self) -> u32 {
        let dpr = self.device_pixel_ratio;
        if dpr.is_finite() && dpr > 2.0 {
            (dpr.round() as u32).min(MAX_DEVICE_PIXEL_RATIO)
        } else {
            2
        }
    }

    /// Deserializes settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// Tests
// ============================================================================
