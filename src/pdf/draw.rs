use pdf_writer::{Content, Name, Str};

use crate::fonts::{FontEntry, Fonts};
use crate::layout::{
    COVER_META_GAP, COVER_RULE_GAP, Callout, Element, LineKind, PositionedElement, TextMetrics,
    item_chrome_height, item_line_height,
};
use crate::style::Style;

const SUB_ITEM_MARKER: &str = "\u{2013}";
const LEADER_CHAR: char = '.';

fn set_fill(content: &mut Content, [r, g, b]: [u8; 3]) {
    content.set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
}

fn set_stroke(content: &mut Content, [r, g, b]: [u8; 3]) {
    content.set_stroke_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
}

/// Show one line of text with its baseline at `baseline_y`.
fn show_line(
    content: &mut Content,
    font: &FontEntry,
    font_size: f32,
    x: f32,
    baseline_y: f32,
    text: &str,
) {
    if text.is_empty() {
        return;
    }
    content.begin_text();
    content.set_font(Name(font.pdf_name.as_bytes()), font_size);
    content.next_line(x, baseline_y);
    content.show(Str(&font.encode(text)));
    content.end_text();
}

fn show_right_aligned(
    content: &mut Content,
    font: &FontEntry,
    font_size: f32,
    right_x: f32,
    baseline_y: f32,
    text: &str,
) {
    let w = font.metrics.text_width(text, font_size);
    show_line(content, font, font_size, right_x - w, baseline_y, text);
}

pub(super) fn draw_element(
    content: &mut Content,
    el: &PositionedElement,
    style: &Style,
    fonts: &Fonts,
) {
    match &el.element {
        Element::Cover {
            title,
            subtitle,
            meta,
        } => draw_cover(content, el, title, subtitle, meta, style, fonts),
        Element::TocHeading { text } => {
            let size = style.sizes.toc_heading;
            set_fill(content, style.palette.text);
            let baseline = el.y_top - fonts.bold.metrics.ascent(size);
            show_line(content, &fonts.bold, size, el.x, baseline, text);
        }
        Element::TocEntry {
            number,
            title,
            page,
        } => draw_toc_entry(content, el, *number, title, *page, style, fonts),
        Element::SectionHeader {
            section_type,
            lines,
            ..
        } => {
            let size = style.sizes.section_heading;
            let lh = fonts
                .bold
                .metrics
                .line_height(size, style.spacing.line_spacing);
            let bar = style.spacing.accent_bar_width;
            let text_h = lines.len() as f32 * lh;

            set_fill(content, style.palette.accent(*section_type));
            content.rect(el.x, el.y_top - text_h, bar, text_h).fill_nonzero();

            set_fill(content, style.palette.text);
            let mut y = el.y_top;
            for line in lines {
                let baseline = y - fonts.bold.metrics.ascent(size);
                show_line(content, &fonts.bold, size, el.x + bar * 3.0, baseline, line);
                y -= lh;
            }
        }
        Element::Item {
            marker,
            callout,
            continued,
            lines,
        } => {
            let metrics = TextMetrics {
                regular: &fonts.regular.metrics,
                bold: &fonts.bold.metrics,
            };
            let (pad, accent) = match callout {
                Some(kind) => {
                    let (accent, fill) = callout_colors(*kind, style);
                    content.save_state();
                    set_fill(content, fill);
                    set_stroke(content, accent);
                    content.set_line_width(0.75);
                    content
                        .rect(el.x, el.y_bottom(), el.width, el.height)
                        .fill_nonzero_and_stroke();
                    set_fill(content, accent);
                    content.rect(el.x, el.y_bottom(), 3.0, el.height).fill_nonzero();
                    content.restore_state();
                    (style.spacing.callout_padding, Some(accent))
                }
                None => (0.0, None),
            };

            let inner_x = el.x + pad;
            let text_x = inner_x + style.spacing.item_indent;
            let mut y = el.y_top - pad;

            if let (Some(kind), Some(accent), false) = (callout, accent, *continued) {
                let size = style.sizes.callout_label;
                set_fill(content, accent);
                let baseline = y - fonts.bold.metrics.ascent(size);
                show_line(content, &fonts.bold, size, text_x, baseline, kind.label());
                y -= item_chrome_height(Some(*kind), true, style, metrics)
                    - item_chrome_height(Some(*kind), false, style, metrics);
            }

            set_fill(content, style.palette.text);
            let mut first_text_line = true;
            for line in lines {
                let size = match line.kind {
                    LineKind::Text => style.sizes.item,
                    LineKind::SubItemStart | LineKind::SubItem => style.sizes.sub_item,
                };
                let baseline = y - fonts.regular.metrics.ascent(size);
                match line.kind {
                    LineKind::Text => {
                        if first_text_line && let Some(m) = marker {
                            set_fill(content, style.palette.muted);
                            let label = m.label();
                            show_line(content, &fonts.bold, size, inner_x + 2.0, baseline, &label);
                            set_fill(content, style.palette.text);
                        }
                        first_text_line = false;
                        show_line(content, &fonts.regular, size, text_x, baseline, &line.text);
                    }
                    LineKind::SubItemStart | LineKind::SubItem => {
                        let sub_x = text_x + style.spacing.sub_item_indent;
                        set_fill(content, style.palette.muted);
                        if line.kind == LineKind::SubItemStart {
                            let x = text_x + 2.0;
                            show_line(content, &fonts.regular, size, x, baseline, SUB_ITEM_MARKER);
                        }
                        show_line(content, &fonts.regular, size, sub_x, baseline, &line.text);
                        set_fill(content, style.palette.text);
                    }
                }
                y -= item_line_height(line.kind, style, metrics);
            }
        }
        Element::Footer { text, page, total } => {
            let size = style.sizes.footer;
            set_stroke(content, style.palette.muted);
            content.set_line_width(0.5);
            content.move_to(el.x, el.y_top - 4.0);
            content.line_to(el.x + el.width, el.y_top - 4.0);
            content.stroke();

            set_fill(content, style.palette.muted);
            let baseline = el.y_top - 12.0 - fonts.regular.metrics.ascent(size) / 2.0;
            if let Some(text) = text {
                show_line(content, &fonts.regular, size, el.x, baseline, text);
            }
            let label = format!("Page {page} of {total}");
            show_right_aligned(content, &fonts.regular, size, el.x + el.width, baseline, &label);
        }
    }
}

fn callout_colors(kind: Callout, style: &Style) -> ([u8; 3], [u8; 3]) {
    match kind {
        Callout::Tip => (style.palette.tip_accent, style.palette.tip_fill),
        Callout::Warning => (style.palette.warning_accent, style.palette.warning_fill),
    }
}

fn draw_cover(
    content: &mut Content,
    el: &PositionedElement,
    title: &[String],
    subtitle: &[String],
    meta: &str,
    style: &Style,
    fonts: &Fonts,
) {
    let sizes = &style.sizes;
    let ls = style.spacing.line_spacing;

    set_fill(content, style.palette.quick_reference);
    content.rect(el.x, el.y_top - 4.0, 72.0, 4.0).fill_nonzero();

    let mut y = el.y_top - COVER_RULE_GAP;
    set_fill(content, style.palette.text);
    for line in title {
        let baseline = y - fonts.bold.metrics.ascent(sizes.cover_title);
        show_line(content, &fonts.bold, sizes.cover_title, el.x, baseline, line);
        y -= fonts.bold.metrics.line_height(sizes.cover_title, ls);
    }
    y -= style.spacing.after_cover_title;

    set_fill(content, style.palette.muted);
    if !subtitle.is_empty() {
        for line in subtitle {
            let baseline = y - fonts.regular.metrics.ascent(sizes.cover_subtitle);
            show_line(content, &fonts.regular, sizes.cover_subtitle, el.x, baseline, line);
            y -= fonts.regular.metrics.line_height(sizes.cover_subtitle, ls);
        }
        y -= COVER_META_GAP;
    }

    let baseline = y - fonts.regular.metrics.ascent(sizes.cover_meta);
    show_line(content, &fonts.regular, sizes.cover_meta, el.x, baseline, meta);
}

/// "N. Title ........ page", with the leader filling the gap like a right tab stop.
fn draw_toc_entry(
    content: &mut Content,
    el: &PositionedElement,
    number: usize,
    title: &str,
    page: usize,
    style: &Style,
    fonts: &Fonts,
) {
    let size = style.sizes.toc_entry;
    let font = &fonts.regular;
    let baseline = el.y_top - font.metrics.ascent(size);
    let left = format!("{number}. {title}");
    let page_label = page.to_string();
    let right_x = el.x + el.width;

    set_fill(content, style.palette.text);
    show_line(content, font, size, el.x, baseline, &left);
    show_right_aligned(content, font, size, right_x, baseline, &page_label);

    let left_end = el.x + font.metrics.text_width(&left, size);
    let page_start = right_x - font.metrics.text_width(&page_label, size);
    let char_w = font.metrics.char_width_1000(LEADER_CHAR) * size / 1000.0;
    let gap = page_start - left_end;
    if char_w > 0.0 && gap > char_w * 2.0 {
        let count = ((gap - char_w) / char_w).floor() as usize;
        if count > 0 {
            let leader: String = std::iter::repeat_n(LEADER_CHAR, count).collect();
            let leader_start = page_start - char_w / 2.0 - count as f32 * char_w;
            set_fill(content, style.palette.muted);
            show_line(content, font, size, leader_start, baseline, &leader);
        }
    }
}
