//! Signature layout.
//!
//! [`LayoutMetrics::compute`] turns a [`SignatureInput`] into positioned
//! spans without touching any pixels. The raster compositor draws exactly
//! these spans and the HTML composer reuses the same dimensions, so both
//! outputs stay numerically consistent.
//!
//! All constants are logical pixels at scale 1.0; each is multiplied by the
//! output scale and rounded before use.

use crate::asset::Icon;
use crate::color::{Rgb, Rgba, parse_color_alpha};
use crate::geometry::{BoxF, SizePx, px};
use crate::input::SignatureInput;
use crate::text::{Baseline, TextMeasure, TextStyle};

pub(crate) const LOGO_X: f32 = 50.0;
pub(crate) const LOGO_BOX: f32 = 104.0;
pub(crate) const LOGO_TEXT_GAP: f32 = 28.0;
pub(crate) const RIGHT_PADDING: f32 = 200.0;

pub(crate) const NAME_HEIGHT: f32 = 24.0;
pub(crate) const TITLE_HEIGHT: f32 = 18.0;
pub(crate) const WEBSITE_HEIGHT: f32 = 18.0;
pub(crate) const CONTACT_HEIGHT: f32 = 18.0;
pub(crate) const ADDRESS_HEIGHT: f32 = 14.0;
pub(crate) const FOOTER_HEIGHT: f32 = 14.0;

pub(crate) const ICON_SIZE: f32 = 18.0;
pub(crate) const GAP_AFTER_ICON: f32 = 8.0;
pub(crate) const GAP_AFTER_TEXT: f32 = 12.0;
pub(crate) const SEPARATOR_ADVANCE: f32 = 14.0;

pub(crate) const GAP_AFTER_NAME: f32 = 4.0;
pub(crate) const GAP_AFTER_TITLE: f32 = 8.0;
pub(crate) const GAP_AFTER_WEBSITE: f32 = 16.0;
pub(crate) const GAP_AFTER_CONTACT: f32 = 26.0;
pub(crate) const GAP_AFTER_ADDRESS: f32 = 4.0;
pub(crate) const GAP_AFTER_RIGHTS1: f32 = 4.0;

pub const PLACEHOLDER_NAME: &str = "Full Name";
pub const PLACEHOLDER_TITLE: &str = "Job Title";
pub const PLACEHOLDER_WEBSITE: &str = "Website";
pub const PLACEHOLDER_PHONE: &str = "Phone";
pub const PLACEHOLDER_EMAIL: &str = "Email";

pub const SEPARATOR: &str = "|";

pub(crate) const TITLE_COLOR: Rgba = Rgba::new(17, 24, 39, 0.7);
pub(crate) const BODY_COLOR: Rgba = Rgba::new(17, 24, 39, 0.9);
pub(crate) const SEPARATOR_COLOR: Rgba = Rgba::new(107, 114, 128, 0.9);
pub(crate) const ADDRESS_COLOR: Rgba = Rgba::new(55, 65, 81, 0.9);
pub(crate) const MUTED_COLOR: Rgba = Rgba::new(107, 114, 128, 0.95);

/// The rows of a signature, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    Name,
    Title,
    Website,
    Contact,
    Address,
    Rights1,
    Rights2,
}

/// One positioned element.
#[derive(Debug, Clone, PartialEq)]
pub enum Span {
    Text {
        text: String,
        x: f32,
        y: f32,
        style: TextStyle,
    },
    Icon {
        icon: Icon,
        bounds: BoxF,
    },
}

impl Span {
    pub fn text(&self) -> Option<&str> {
        match self {
            Span::Text { text, .. } => Some(text),
            Span::Icon { .. } => None,
        }
    }
}

/// A row of the text block.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub kind: RowKind,
    /// Top of the row's slot in the vertical flow.
    pub top: f32,
    pub height: f32,
    pub spans: Vec<Span>,
}

/// Resolved geometry of a single render.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutMetrics {
    pub canvas: SizePx,
    pub scale: f32,
    /// Square box the logo is fit into.
    pub logo_box: BoxF,
    pub min_text_x: f32,
    pub max_text_x: f32,
    pub text_x: f32,
    pub block_height: f32,
    pub top_padding: f32,
    /// Scaled icon edge length.
    pub icon_size: f32,
    pub rows: Vec<Row>,
}

impl LayoutMetrics {
    /// Lays out `input`, measuring contact-row text with `measure`.
    pub fn compute(input: &SignatureInput, measure: &dyn TextMeasure) -> Self {
        let s = input.output_size.scale();
        let canvas = input.output_size.canvas_size();
        let (w, h) = (canvas.width as f32, canvas.height as f32);

        let logo_size = px(LOGO_BOX, s);
        let logo_box = BoxF::new(px(LOGO_X, s), h / 2.0 - logo_size / 2.0, logo_size, logo_size);

        let min_text_x = logo_box.right() + px(LOGO_TEXT_GAP, s);
        let max_text_x = w - px(RIGHT_PADDING, s);
        let text_x = min_text_x + (max_text_x - min_text_x) * input.horizontal_percent() / 100.0;

        let address = non_blank(&input.address);
        let rights1 = non_blank(&input.rights1);
        let rights2 = non_blank(&input.rights2);

        let block_height = block_height(s, address.is_some(), rights1.is_some(), rights2.is_some());
        let top_padding = (h - block_height) * (100.0 - input.vertical_percent()) / 100.0;

        let fg = parse_color_alpha(&input.foreground_color);
        let icon_size = px(ICON_SIZE, s);
        let mut rows = Vec::with_capacity(7);
        let mut y = top_padding;

        // Name and title
        let name_h = px(NAME_HEIGHT, s);
        rows.push(text_row(
            RowKind::Name,
            y,
            name_h,
            text_x,
            or_placeholder(&input.name, PLACEHOLDER_NAME),
            TextStyle::new(name_h, 700, fg),
        ));
        y += name_h + px(GAP_AFTER_NAME, s);

        let title_h = px(TITLE_HEIGHT, s);
        rows.push(text_row(
            RowKind::Title,
            y,
            title_h,
            text_x,
            or_placeholder(&input.title, PLACEHOLDER_TITLE),
            TextStyle::new(title_h, 500, TITLE_COLOR),
        ));
        y += title_h + px(GAP_AFTER_TITLE, s);

        // Website: icon centred on the row, text top-aligned
        let website_h = px(WEBSITE_HEIGHT, s);
        let centre = y + website_h / 2.0;
        rows.push(Row {
            kind: RowKind::Website,
            top: y,
            height: website_h,
            spans: vec![
                Span::Icon {
                    icon: Icon::Globe,
                    bounds: BoxF::new(text_x, centre - icon_size / 2.0, icon_size, icon_size),
                },
                Span::Text {
                    text: or_placeholder(&input.website, PLACEHOLDER_WEBSITE),
                    x: text_x + icon_size + px(GAP_AFTER_ICON, s),
                    y,
                    style: TextStyle::new(website_h, 400, BODY_COLOR),
                },
            ],
        });
        y += website_h + px(GAP_AFTER_WEBSITE, s);

        // Contact: phone | email on a running cursor
        let contact_h = px(CONTACT_HEIGHT, s);
        rows.push(contact_row(input, measure, s, text_x, y, contact_h, icon_size));
        y += contact_h + px(GAP_AFTER_CONTACT, s);

        // Footer rows sit on their alphabetic baseline at the running y
        let address_h = px(ADDRESS_HEIGHT, s);
        let footer_h = px(FOOTER_HEIGHT, s);
        if let Some(address) = address {
            let style = TextStyle::new(address_h, 400, ADDRESS_COLOR).baseline(Baseline::Alphabetic);
            rows.push(text_row(RowKind::Address, y, address_h, text_x, address.to_string(), style));
            y += address_h + px(GAP_AFTER_ADDRESS, s);
        }
        if let Some(rights1) = rights1 {
            let style = TextStyle::new(address_h, 400, BODY_COLOR).baseline(Baseline::Alphabetic);
            rows.push(text_row(RowKind::Rights1, y, footer_h, text_x, rights1.to_string(), style));
            y += footer_h + px(GAP_AFTER_RIGHTS1, s);
        }
        if let Some(rights2) = rights2 {
            let color = if input.rights2_use_fg {
                fg.rgb().with_alpha(0.9)
            } else {
                MUTED_COLOR
            };
            let style = TextStyle::new(footer_h, 400, color)
                .italic(input.rights2_italic)
                .baseline(Baseline::Alphabetic);
            rows.push(text_row(RowKind::Rights2, y, footer_h, text_x, rights2.to_string(), style));
        }

        let metrics = Self {
            canvas,
            scale: s,
            logo_box,
            min_text_x,
            max_text_x,
            text_x,
            block_height,
            top_padding,
            icon_size,
            rows,
        };
        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            text_x = metrics.text_x,
            top_padding = metrics.top_padding,
            rows = metrics.rows.len(),
            "layout computed"
        );
        metrics
    }

    pub fn row(&self, kind: RowKind) -> Option<&Row> {
        self.rows.iter().find(|r| r.kind == kind)
    }

    /// Every text span, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flat_map(|r| r.spans.iter().filter_map(Span::text))
    }

    /// The tint applied to icons: the foreground colour without alpha.
    pub fn icon_tint(input: &SignatureInput) -> Rgb {
        parse_color_alpha(&input.foreground_color).rgb()
    }
}

/// Height of the text block for the given optional rows.
pub fn block_height(s: f32, address: bool, rights1: bool, rights2: bool) -> f32 {
    let mut total = px(NAME_HEIGHT, s)
        + px(GAP_AFTER_NAME, s)
        + px(TITLE_HEIGHT, s)
        + px(GAP_AFTER_TITLE, s)
        + px(WEBSITE_HEIGHT, s)
        + px(GAP_AFTER_WEBSITE, s)
        + px(CONTACT_HEIGHT, s)
        + px(GAP_AFTER_CONTACT, s);
    if address {
        total += px(ADDRESS_HEIGHT, s) + px(GAP_AFTER_ADDRESS, s);
    }
    if rights1 {
        total += px(FOOTER_HEIGHT, s) + px(GAP_AFTER_RIGHTS1, s);
    }
    if rights2 {
        total += px(FOOTER_HEIGHT, s);
    }
    total
}

fn contact_row(
    input: &SignatureInput,
    measure: &dyn TextMeasure,
    s: f32,
    text_x: f32,
    top: f32,
    height: f32,
    icon_size: f32,
) -> Row {
    let centre = top + height / 2.0;
    let icon_top = centre - icon_size / 2.0;
    let body = TextStyle::new(height, 400, BODY_COLOR).baseline(Baseline::Middle);
    let phone = or_placeholder(&input.phone, PLACEHOLDER_PHONE);
    let email = or_placeholder(&input.email, PLACEHOLDER_EMAIL);

    let mut spans = Vec::with_capacity(5);
    let mut cursor = text_x;

    spans.push(Span::Icon {
        icon: Icon::IdCard,
        bounds: BoxF::new(cursor, icon_top, icon_size, icon_size),
    });
    cursor += icon_size + px(GAP_AFTER_ICON, s);

    let phone_width = measure.measure(&phone, &body);
    spans.push(Span::Text { text: phone, x: cursor, y: centre, style: body });
    cursor += phone_width + px(GAP_AFTER_TEXT, s);

    spans.push(Span::Text {
        text: SEPARATOR.to_string(),
        x: cursor,
        y: centre,
        style: TextStyle { color: SEPARATOR_COLOR, ..body },
    });
    cursor += px(SEPARATOR_ADVANCE, s);

    spans.push(Span::Icon {
        icon: Icon::Inbox,
        bounds: BoxF::new(cursor, icon_top, icon_size, icon_size),
    });
    cursor += icon_size + px(GAP_AFTER_ICON, s);

    spans.push(Span::Text { text: email, x: cursor, y: centre, style: body });

    Row {
        kind: RowKind::Contact,
        top,
        height,
        spans,
    }
}

fn text_row(kind: RowKind, top: f32, height: f32, x: f32, text: String, style: TextStyle) -> Row {
    Row {
        kind,
        top,
        height,
        spans: vec![Span::Text { text, x, y: top, style }],
    }
}

fn non_blank(value: &str) -> Option<&str> {
    (!value.trim().is_empty()).then_some(value)
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    non_blank(value).unwrap_or(placeholder).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::OutputSize;
    use crate::text::FixedAdvance;

    fn layout(input: &SignatureInput) -> LayoutMetrics {
        LayoutMetrics::compute(input, &FixedAdvance(0.5))
    }

    fn small(v: i32, h: i32) -> SignatureInput {
        SignatureInput {
            output_size: OutputSize::Small,
            vertical_position_percent: v,
            horizontal_position_percent: h,
            ..SignatureInput::default()
        }
    }

    #[test]
    fn empty_input_uses_placeholders() {
        let metrics = layout(&SignatureInput::default());
        let texts: Vec<&str> = metrics.texts().collect();
        assert_eq!(texts, vec!["Full Name", "Job Title", "Website", "Phone", "|", "Email"]);
        assert!(metrics.row(RowKind::Address).is_none());
    }

    #[test]
    fn base_block_height() {
        // 24+4+18+8+18+16+18+26
        assert_eq!(block_height(1.0, false, false, false), 132.0);
        assert_eq!(block_height(1.0, true, true, true), 132.0 + 18.0 + 18.0 + 14.0);
        assert_eq!(block_height(2.0, false, false, false), 264.0);
    }

    #[test]
    fn vertical_position_law() {
        let bottom = layout(&small(0, 10));
        assert_eq!(bottom.top_padding, 240.0 - 132.0);

        let middle = layout(&small(50, 10));
        assert_eq!(middle.top_padding, (240.0 - 132.0) / 2.0);

        let top = layout(&small(100, 10));
        assert_eq!(top.top_padding, 0.0);
        assert_eq!(top.rows[0].top, 0.0);
    }

    #[test]
    fn horizontal_position_law() {
        let left = layout(&small(30, 0));
        assert_eq!(left.text_x, left.min_text_x);
        assert_eq!(left.min_text_x, 50.0 + 104.0 + 28.0);

        let right = layout(&small(30, 100));
        assert_eq!(right.text_x, right.max_text_x);
        assert_eq!(right.max_text_x, 800.0);
    }

    #[test]
    fn out_of_range_sliders_are_clamped() {
        assert_eq!(layout(&small(180, 10)).top_padding, 0.0);
        assert_eq!(layout(&small(30, -20)).text_x, 182.0);
    }

    #[test]
    fn blank_optional_rows_are_omitted() {
        let mut input = small(30, 10);
        let base = layout(&input).block_height;

        input.address = "   ".into();
        input.rights1 = "\t".into();
        input.rights2 = String::new();
        let blank = layout(&input);
        assert_eq!(blank.block_height, base);
        assert_eq!(blank.rows.len(), 4);

        input.address = "1 Main St".into();
        assert_eq!(layout(&input).block_height, base + 14.0 + 4.0);

        input.address.clear();
        input.rights1 = "All rights reserved".into();
        assert_eq!(layout(&input).block_height, base + 14.0 + 4.0);

        input.rights1.clear();
        input.rights2 = "Confidential".into();
        let with_rights2 = layout(&input);
        assert_eq!(with_rights2.block_height, base + 14.0);
        assert!(with_rights2.row(RowKind::Rights2).is_some());
    }

    #[test]
    fn logo_box_is_vertically_centred() {
        let metrics = layout(&SignatureInput::default());
        assert_eq!(metrics.canvas, SizePx::new(2000, 480));
        assert_eq!(metrics.logo_box, BoxF::new(100.0, 136.0, 208.0, 208.0));
    }

    #[test]
    fn contact_cursor_advances_by_measured_width() {
        let mut input = small(30, 0);
        input.phone = "12345".into();
        let metrics = layout(&input);
        let contact = metrics.row(RowKind::Contact).unwrap();

        let xs: Vec<f32> = contact
            .spans
            .iter()
            .map(|span| match span {
                Span::Text { x, .. } => *x,
                Span::Icon { bounds, .. } => bounds.x,
            })
            .collect();
        let phone_x = 182.0 + 18.0 + 8.0;
        let sep_x = phone_x + 5.0 * 18.0 * 0.5 + 12.0;
        let inbox_x = sep_x + 14.0;
        assert_eq!(xs, vec![182.0, phone_x, sep_x, inbox_x, inbox_x + 18.0 + 8.0]);
    }

    #[test]
    fn separator_gap_scales_with_output_size() {
        let input = SignatureInput {
            horizontal_position_percent: 0,
            ..SignatureInput::default()
        };
        let metrics = layout(&input);
        let contact = metrics.row(RowKind::Contact).unwrap();
        let separator_x = contact
            .spans
            .iter()
            .find_map(|span| match span {
                Span::Text { text, x, .. } if text == SEPARATOR => Some(*x),
                _ => None,
            })
            .unwrap();
        let inbox_x = contact
            .spans
            .iter()
            .find_map(|span| match span {
                Span::Icon { icon: Icon::Inbox, bounds } => Some(bounds.x),
                _ => None,
            })
            .unwrap();
        assert_eq!(metrics.scale, 2.0);
        assert_eq!(inbox_x - separator_x, 28.0);
    }

    #[test]
    fn rows_flow_downwards() {
        let mut input = small(30, 10);
        input.address = "Somewhere".into();
        let metrics = layout(&input);
        let top = metrics.top_padding;
        let tops: Vec<f32> = metrics.rows.iter().map(|r| r.top - top).collect();
        assert_eq!(tops, vec![0.0, 28.0, 54.0, 88.0, 132.0]);
    }

    #[test]
    fn rights2_colour_follows_flag() {
        let mut input = small(30, 10);
        input.foreground_color = "#336699".into();
        input.rights2 = "Note".into();
        input.rights2_italic = true;

        let style = |m: &LayoutMetrics| match &m.row(RowKind::Rights2).unwrap().spans[0] {
            Span::Text { style, .. } => *style,
            Span::Icon { .. } => unreachable!(),
        };

        let with_fg = layout(&input);
        assert_eq!(style(&with_fg).color, Rgba::new(0x33, 0x66, 0x99, 0.9));
        assert!(style(&with_fg).italic);

        input.rights2_use_fg = false;
        assert_eq!(style(&layout(&input)).color, MUTED_COLOR);
    }
}
