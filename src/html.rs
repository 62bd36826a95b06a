//! HTML email fragment.
//!
//! Produces a table-based fragment that reproduces the raster signature in
//! email clients. Sizes, gaps and colours come from the same
//! [`LayoutMetrics`] the raster compositor draws, so the two outputs agree.
//!
//! The pattern, when included, is a base64 PNG background with a VML
//! fallback for Outlook's Word-based renderer.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use resvg::tiny_skia::Pixmap;
use serde::{Deserialize, Serialize};

use crate::asset::{Icon, LogoSource, decode_logo, rasterize_icon};
use crate::color::parse_color;
use crate::compositor::Compositor;
use crate::error::{PatternError, SignatureError, SignatureResult};
use crate::geometry::{fit_contain, px};
use crate::input::SignatureInput;
use crate::layout::{
    GAP_AFTER_ICON, GAP_AFTER_TEXT, LayoutMetrics, Row, RowKind, SEPARATOR, SEPARATOR_ADVANCE, Span,
};
use crate::pattern::{PatternType, generate_pattern};
use crate::surface::{encode_png, pixmap_to_rgba_image};
use crate::text::TextStyle;

/// Px-to-pt factor used for VML dimensions.
const PT_PER_PX: f32 = 0.75;

/// What to inline in the fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HtmlOptions {
    /// Bake the pattern in as a background image.
    pub include_pattern: bool,
    /// Inline icons as PNGs; otherwise emoji stand in.
    pub include_images: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            include_pattern: true,
            include_images: true,
        }
    }
}

/// Escapes `& < > " '` for use in text and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Adds `https://` unless the address already carries a scheme.
fn website_href(website: &str) -> String {
    let trimmed = website.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn png_data_uri(pixmap: &Pixmap) -> SignatureResult<String> {
    let png = encode_png(pixmap_to_rgba_image(pixmap))?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// The logo as something an `<img src>` accepts.
fn logo_src(source: &LogoSource, decoded: &Pixmap) -> SignatureResult<String> {
    match source {
        LogoSource::Uri(uri) if uri.trim_start().starts_with("data:") => Ok(uri.trim().to_string()),
        LogoSource::Uri(svg) => Ok(format!(
            "data:image/svg+xml;base64,{}",
            STANDARD.encode(svg.trim().as_bytes())
        )),
        LogoSource::Image(_) => png_data_uri(decoded),
    }
}

fn font_css(style: &TextStyle, family: &str) -> String {
    format!(
        "font-family:{family};font-size:{size}px;line-height:{size}px;font-weight:{weight};font-style:{italic};color:{color};",
        family = escape_html(family),
        size = style.size,
        weight = style.weight,
        italic = if style.italic { "italic" } else { "normal" },
        color = style.color.to_css(),
    )
}

/// The pattern as a PNG data URI, or `None` when it cannot be produced.
fn pattern_background(input: &SignatureInput, metrics: &LayoutMetrics) -> Option<String> {
    let pattern = generate_pattern(
        input.pattern_type,
        parse_color(&input.pattern_color),
        input.opacity(),
        metrics.canvas.width,
        metrics.canvas.height,
        metrics.scale,
    );
    background_uri(input.pattern_type, pattern)
}

fn background_uri(pattern: PatternType, rendered: Result<Pixmap, PatternError>) -> Option<String> {
    match rendered.map_err(SignatureError::from).and_then(|pixmap| png_data_uri(&pixmap)) {
        Ok(uri) => Some(uri),
        Err(err) => {
            tracing::warn!(%pattern, error = %err, "pattern failed; emitting html without a background");
            None
        }
    }
}

pub(crate) fn compose_signature_html(
    compositor: &Compositor,
    input: &SignatureInput,
    options: HtmlOptions,
) -> SignatureResult<String> {
    let metrics = compositor.layout(input);
    let (w, h) = (metrics.canvas.width, metrics.canvas.height);
    let family = compositor.typesetter().family();

    let background = if options.include_pattern {
        pattern_background(input, &metrics)
    } else {
        None
    };

    let mut html = String::new();

    // Outer table carrying the background
    let bg_css = background
        .as_ref()
        .map(|uri| {
            format!(
                "background-image:url('{}');background-size:{w}px {h}px;background-repeat:no-repeat;",
                escape_html(uri)
            )
        })
        .unwrap_or_default();
    html.push_str(&format!(
        r#"<table cellpadding="0" cellspacing="0" border="0" width="{w}" style="width:{w}px;border-collapse:collapse;background-color:#ffffff;">"#
    ));
    html.push_str(&format!(
        r#"<tr><td width="{w}" height="{h}" valign="top"{bg_attr} style="width:{w}px;height:{h}px;padding:0;{bg_css}">"#,
        bg_attr = background
            .as_ref()
            .map(|uri| format!(r#" background="{}""#, escape_html(uri)))
            .unwrap_or_default(),
    ));
    if let Some(uri) = &background {
        html.push_str(&format!(
            concat!(
                r#"<!--[if gte mso 9]><v:rect xmlns:v="urn:schemas-microsoft-com:vml" fill="true" stroke="false" "#,
                r##"style="width:{wpt}pt;height:{hpt}pt;"><v:fill type="frame" src="{src}" color="#ffffff" />"##,
                r#"<v:textbox inset="0,0,0,0"><![endif]-->"#
            ),
            wpt = w as f32 * PT_PER_PX,
            hpt = h as f32 * PT_PER_PX,
            src = escape_html(uri),
        ));
    }

    // Inner two-column table
    html.push_str(&format!(
        r#"<table cellpadding="0" cellspacing="0" border="0" width="{w}" style="width:{w}px;height:{h}px;border-collapse:collapse;"><tr>"#
    ));
    html.push_str(&logo_cell(input, &metrics, h)?);
    html.push_str(&format!(
        r#"<td valign="top" style="vertical-align:top;padding:{top}px 0 0 {left}px;">"#,
        top = metrics.top_padding,
        left = metrics.text_x - metrics.logo_box.right(),
    ));
    html.push_str(&text_rows(compositor, input, &metrics, family, options));
    html.push_str("</td></tr></table>");

    if background.is_some() {
        html.push_str("<!--[if gte mso 9]></v:textbox></v:rect><![endif]-->");
    }
    html.push_str("</td></tr></table>");

    tracing::debug!(bytes = html.len(), pattern = options.include_pattern, "html fragment composed");
    Ok(html)
}

fn logo_cell(input: &SignatureInput, metrics: &LayoutMetrics, h: u32) -> SignatureResult<String> {
    let logo_box = metrics.logo_box;
    let mut cell = format!(
        r#"<td width="{cell_w}" height="{h}" valign="middle" style="width:{cell_w}px;height:{h}px;padding:0 0 0 {x}px;vertical-align:middle;">"#,
        cell_w = logo_box.width,
        x = logo_box.x,
    );
    if let Some(source) = input.logo_source() {
        let decoded = decode_logo(source, logo_box.width.round() as u32)?;
        let fit = fit_contain(
            decoded.width(),
            decoded.height(),
            logo_box.width.round() as u32,
            logo_box.height.round() as u32,
        );
        cell.push_str(&format!(
            r#"<img src="{src}" width="{dw}" height="{dh}" alt="" style="display:block;width:{dw}px;height:{dh}px;margin:0 auto;border:0;" />"#,
            src = escape_html(&logo_src(source, &decoded)?),
            dw = fit.draw_w,
            dh = fit.draw_h,
        ));
    }
    cell.push_str("</td>");
    Ok(cell)
}

fn text_rows(
    compositor: &Compositor,
    input: &SignatureInput,
    metrics: &LayoutMetrics,
    family: &str,
    options: HtmlOptions,
) -> String {
    let icon_size = metrics.icon_size;
    let icon_px = (icon_size * 2.0).round() as u32;
    let tint = LayoutMetrics::icon_tint(input);
    let icon_html = |icon: Icon| -> String {
        let src = options
            .include_images
            .then(|| rasterize_icon(compositor.icon_source(), icon, tint, icon_px))
            .flatten()
            .and_then(|pixmap| png_data_uri(&pixmap).ok());
        match src {
            Some(src) => format!(
                r#"<img src="{src}" width="{s}" height="{s}" alt="" style="width:{s}px;height:{s}px;vertical-align:middle;border:0;" />"#,
                s = icon_size,
            ),
            None => format!(
                r#"<span style="display:inline-block;width:{s}px;font-size:{s}px;line-height:{s}px;vertical-align:middle;">{emoji}</span>"#,
                s = icon_size,
                emoji = icon.emoji(),
            ),
        }
    };

    let mut out = String::new();
    for (i, row) in metrics.rows.iter().enumerate() {
        let gap = metrics
            .rows
            .get(i + 1)
            .map(|next| next.top - row.top - row.height)
            .unwrap_or(0.0);
        out.push_str(&format!(
            r#"<div style="margin:0 0 {gap}px 0;height:{rh}px;white-space:nowrap;">"#,
            rh = row.height,
        ));
        row_html(&mut out, row, input, family, metrics, &icon_html);
        out.push_str("</div>");
    }
    out
}

fn row_html(
    out: &mut String,
    row: &Row,
    input: &SignatureInput,
    family: &str,
    metrics: &LayoutMetrics,
    icon_html: &dyn Fn(Icon) -> String,
) {
    let s = metrics.scale;
    let gap_after_icon = px(GAP_AFTER_ICON, s);
    let gap_after_text = px(GAP_AFTER_TEXT, s);
    let separator_advance = px(SEPARATOR_ADVANCE, s);

    for span in &row.spans {
        match span {
            Span::Icon { icon, .. } => {
                out.push_str(&format!(
                    r#"<span style="display:inline-block;margin-right:{gap_after_icon}px;vertical-align:middle;">{}</span>"#,
                    icon_html(*icon)
                ));
            }
            Span::Text { text, style, .. } => {
                let css = font_css(style, family);
                let body = escape_html(text);
                let content = match (row.kind, text.as_str()) {
                    (RowKind::Website, _) if !input.website.trim().is_empty() => format!(
                        r#"<a href="{}" style="{css}text-decoration:none;">{body}</a>"#,
                        escape_html(&website_href(&input.website))
                    ),
                    (RowKind::Contact, t) if t == input.email && !input.email.trim().is_empty() => format!(
                        r#"<a href="mailto:{}" style="{css}text-decoration:none;">{body}</a>"#,
                        escape_html(input.email.trim())
                    ),
                    _ => body,
                };
                let trailing = match (row.kind, text.as_str()) {
                    (RowKind::Contact, SEPARATOR) => {
                        format!("display:inline-block;width:{separator_advance}px;")
                    }
                    (RowKind::Contact, _) => format!("margin-right:{gap_after_text}px;"),
                    _ => String::new(),
                };
                out.push_str(&format!(
                    r#"<span style="{css}vertical-align:middle;{trailing}">{content}</span>"#
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{OutputSize, RenderSettings};

    fn compositor() -> Compositor {
        Compositor::new(RenderSettings {
            load_system_fonts: false,
            ..RenderSettings::default()
        })
    }

    fn filled() -> SignatureInput {
        SignatureInput {
            name: "Ada <Lovelace>".into(),
            title: "R&D \"Lead\"".into(),
            phone: "+1 555 0100".into(),
            email: "ada@example.com".into(),
            website: "example.com".into(),
            address: "O'Connell St".into(),
            output_size: OutputSize::Small,
            ..SignatureInput::default()
        }
    }

    #[test]
    fn escapes_all_special_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn user_text_is_escaped_in_fragment() {
        let options = HtmlOptions { include_pattern: false, include_images: false };
        let html = compositor().compose_signature_html(&filled(), options).unwrap();
        assert!(html.contains("Ada &lt;Lovelace&gt;"));
        assert!(html.contains("R&amp;D &quot;Lead&quot;"));
        assert!(html.contains("O&#39;Connell St"));
        assert!(!html.contains("<Lovelace>"));
    }

    #[test]
    fn pattern_brings_vml_fallback() {
        let html = compositor()
            .compose_signature_html(&filled(), HtmlOptions::default())
            .unwrap();
        assert!(html.contains("<!--[if gte mso 9]>"));
        assert!(html.contains(r#"<v:fill type="frame" src="data:image/png;base64,"#));
        assert!(html.contains("background-image:url('data:image/png;base64,"));
        assert!(html.contains("</v:textbox></v:rect>"));
        assert!(html.contains(r#"width="1000""#));
        assert!(html.contains("width:750pt;height:180pt;"));
        assert!(html.contains(r##"color="#ffffff" /><v:textbox inset="0,0,0,0">"##));
    }

    #[test]
    fn without_pattern_there_is_no_background() {
        let options = HtmlOptions { include_pattern: false, include_images: true };
        let html = compositor().compose_signature_html(&filled(), options).unwrap();
        assert!(!html.contains("mso"));
        assert!(!html.contains("background-image"));
        assert!(html.contains(r#"<img src="data:image/png;base64,"#));
    }

    #[test]
    fn failed_pattern_drops_only_the_background() {
        let failed = Err(PatternError::Surface { width: 0, height: 0 });
        assert_eq!(background_uri(PatternType::Circles, failed), None);

        let pixmap = Pixmap::new(4, 4).unwrap();
        let uri = background_uri(PatternType::Circles, Ok(pixmap)).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn emoji_replace_icons_without_images() {
        let options = HtmlOptions { include_pattern: false, include_images: false };
        let html = compositor().compose_signature_html(&filled(), options).unwrap();
        for icon in Icon::ALL {
            assert!(html.contains(icon.emoji()), "{icon} has no emoji fallback");
        }
        assert!(!html.contains("<img"));
    }

    #[test]
    fn links_for_website_and_email() {
        let options = HtmlOptions { include_pattern: false, include_images: false };
        let mut input = filled();
        let html = compositor().compose_signature_html(&input, options).unwrap();
        assert!(html.contains(r#"href="https://example.com""#));
        assert!(html.contains(r#"href="mailto:ada@example.com""#));

        input.website = "HTTP://example.org".into();
        let html = compositor().compose_signature_html(&input, options).unwrap();
        assert!(html.contains(r#"href="HTTP://example.org""#));
    }

    #[test]
    fn placeholders_are_not_linked() {
        let options = HtmlOptions { include_pattern: false, include_images: false };
        let input = SignatureInput { output_size: OutputSize::Small, ..SignatureInput::default() };
        let html = compositor().compose_signature_html(&input, options).unwrap();
        assert!(html.contains("Full Name"));
        assert!(html.contains("Website"));
        assert!(!html.contains("href="));
    }

    #[test]
    fn svg_logo_is_inlined_as_base64() {
        let options = HtmlOptions { include_pattern: false, include_images: false };
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="20" height="10" fill="red"/></svg>"#;
        let input = filled().with_logo(LogoSource::from_uri(svg));
        let html = compositor().compose_signature_html(&input, options).unwrap();
        assert!(html.contains(r#"<img src="data:image/svg+xml;base64,"#));
        assert!(html.contains(r#"width="104" height="52""#));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: HtmlOptions = serde_json::from_str(r#"{"includeImages":false}"#).unwrap();
        assert!(options.include_pattern);
        assert!(!options.include_images);
    }
}
