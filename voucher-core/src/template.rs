//! Voucher template: one record in, one fixed-size SVG composition out.
//!
//! Every record yields the same element structure. Missing values print the
//! locale placeholder and long values are clipped to a character budget, so
//! nothing about the layout depends on how complete the input is.

use crate::locale::Locale;
use crate::record::VoucherRecord;

const ACCENT: &str = "#6a1b9a";
const ACCENT_SOFT: &str = "#f3e5f5";
const INK: &str = "#222";
const MUTED: &str = "#777";

// Character budget for field values. The code is never clipped.
const FIELD_CHARS: usize = 30;

// Code badge: usable width and font size bounds (px).
const BADGE_TEXT_WIDTH: f64 = 206.0;
const BADGE_FONT_MAX: f64 = 24.0;
const BADGE_FONT_MIN: f64 = 12.0;
// Rough advance of a bold glyph relative to its font size.
const GLYPH_ADVANCE: f64 = 0.6;

/// Styled, not yet rasterized voucher.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualComposition {
    /// Voucher code, kept for diagnostics.
    pub code: String,
    pub svg: String,
    pub width: u32,
    pub height: u32,
}

/// Lays out one voucher on a `width` x `height` logical canvas.
///
/// Coordinates below are written for the default 782x535 canvas and scaled
/// to other sizes through the SVG `viewBox`.
pub fn render(record: &VoucherRecord, locale: Locale, width: u32, height: u32) -> VisualComposition {
    let labels = locale.labels();
    let text = |raw: &str, max: usize| svg_escape(&clip(&display_text(raw, locale), max));

    let mut s = String::new();
    s.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    s.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 782 535\" preserveAspectRatio=\"none\" font-family=\"sans-serif\" fill=\"{INK}\">\n"
    ));
    s.push_str("<rect x=\"0\" y=\"0\" width=\"782\" height=\"535\" fill=\"#ffffff\"/>\n");
    s.push_str(&format!(
        "<rect x=\"6\" y=\"6\" width=\"770\" height=\"523\" rx=\"18\" fill=\"none\" stroke=\"{ACCENT}\" stroke-width=\"4\"/>\n"
    ));

    // Heading band with the code badge on the right
    s.push_str(&format!(
        "<path d=\"M 24 6 H 758 Q 776 6 776 24 V 96 H 6 V 24 Q 6 6 24 6 Z\" fill=\"{ACCENT}\"/>\n"
    ));
    s.push_str(&format!(
        "<text x=\"32\" y=\"52\" font-size=\"34\" font-weight=\"bold\" fill=\"#ffffff\">{}</text>\n",
        svg_escape(labels.title)
    ));
    s.push_str(&format!(
        "<text x=\"32\" y=\"80\" font-size=\"18\" fill=\"#ffffff\">{}</text>\n",
        svg_escape(labels.subtitle)
    ));
    s.push_str("<rect x=\"526\" y=\"26\" width=\"226\" height=\"48\" rx=\"10\" fill=\"#ffffff\"/>\n");
    let code = display_text(&record.code, locale);
    s.push_str(&format!(
        "<text x=\"639\" y=\"58\" text-anchor=\"middle\"{} font-weight=\"bold\" fill=\"{ACCENT}\">{}</text>\n",
        badge_fit(code.chars().count()),
        svg_escape(&code)
    ));

    // Client block: 2x2 field grid
    s.push_str(&format!(
        "<text x=\"32\" y=\"132\" font-size=\"18\" font-weight=\"bold\" fill=\"{ACCENT}\">{}</text>\n",
        svg_escape(labels.client_heading)
    ));
    s.push_str(&format!(
        "<path d=\"M 32 142 H 750\" stroke=\"{ACCENT}\" stroke-width=\"1.5\"/>\n"
    ));
    let fields = [
        (labels.customer_name, record.customer_name.as_str()),
        (labels.customer_tax_id, record.customer_tax_id.as_str()),
        (labels.store, record.store_name.as_str()),
        (labels.mall, record.mall_name.as_str()),
    ];
    for (i, (label, value)) in fields.iter().enumerate() {
        let x = if i % 2 == 0 { 32 } else { 410 };
        let y = 172 + (i / 2) * 66;
        push_field(&mut s, x, y, label, &text(value, FIELD_CHARS), 21, false);
    }

    // Footer: purchase value beside the attribution date
    s.push_str(&format!(
        "<rect x=\"24\" y=\"306\" width=\"734\" height=\"118\" rx=\"12\" fill=\"{ACCENT_SOFT}\"/>\n"
    ));
    push_field(
        &mut s,
        48,
        346,
        labels.purchase_value,
        &svg_escape(&locale.format_currency(record.purchase_value)),
        32,
        true,
    );
    push_field(
        &mut s,
        426,
        346,
        labels.attribution_date,
        &svg_escape(&locale.format_date(&record.attribution_date)),
        32,
        true,
    );

    // Closer: perforation with ticket notches
    s.push_str(&format!(
        "<path d=\"M 30 454 H 752\" stroke=\"{MUTED}\" stroke-width=\"2\" stroke-dasharray=\"10 8\"/>\n"
    ));
    s.push_str(&format!(
        "<circle cx=\"6\" cy=\"454\" r=\"16\" fill=\"#ffffff\" stroke=\"{ACCENT}\" stroke-width=\"4\"/>\n"
    ));
    s.push_str(&format!(
        "<circle cx=\"776\" cy=\"454\" r=\"16\" fill=\"#ffffff\" stroke=\"{ACCENT}\" stroke-width=\"4\"/>\n"
    ));
    s.push_str(&format!(
        "<text x=\"391\" y=\"500\" text-anchor=\"middle\" font-size=\"24\" font-style=\"italic\" fill=\"{ACCENT}\">{}</text>\n",
        svg_escape(labels.closer)
    ));
    s.push_str("</svg>\n");

    VisualComposition {
        code: record.code.clone(),
        svg: s,
        width,
        height,
    }
}

fn push_field(s: &mut String, x: usize, y: usize, label: &str, value: &str, size: u32, bold: bool) {
    s.push_str(&format!(
        "<text x=\"{x}\" y=\"{y}\" font-size=\"15\" fill=\"{MUTED}\">{}</text>\n",
        svg_escape(label)
    ));
    let weight = if bold { " font-weight=\"bold\"" } else { "" };
    s.push_str(&format!(
        "<text x=\"{x}\" y=\"{}\" font-size=\"{size}\"{weight}>{value}</text>\n",
        y + 8 + size as usize
    ));
}

/// Font size for a code of `chars` characters; codes too long even at the
/// minimum size are squeezed into the badge with `textLength`.
fn badge_fit(chars: usize) -> String {
    let chars = chars.max(1) as f64;
    let size = (BADGE_TEXT_WIDTH / (chars * GLYPH_ADVANCE)).clamp(BADGE_FONT_MIN, BADGE_FONT_MAX);
    let size = size.floor();
    if chars * GLYPH_ADVANCE * size > BADGE_TEXT_WIDTH {
        format!(
            " font-size=\"{size}\" textLength=\"{BADGE_TEXT_WIDTH}\" lengthAdjust=\"spacingAndGlyphs\""
        )
    } else {
        format!(" font-size=\"{size}\"")
    }
}

/// Trimmed value, or the locale placeholder when there is nothing to show.
/// Control characters are not valid XML text and become spaces.
pub fn display_text(raw: &str, locale: Locale) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let t = cleaned.trim();
    if t.is_empty() {
        locale.not_available().to_string()
    } else {
        t.to_string()
    }
}

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn svg_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
