use crate::fonts::FontMetrics;
use crate::limits::{ELLIPSIS, truncate_text};
use crate::model::{Item, Outline, Section};
use crate::style::Style;

use super::{
    Block, BlockFlow, COVER_META_GAP, COVER_RULE_GAP, Callout, Element, ItemLine, LineKind,
    MAX_COVER_SUBTITLE_LINES, MAX_COVER_TITLE_LINES, MAX_HEADING_LINES, Marker, TOC_PAGE_COLUMN,
    TextMetrics,
};

/// Cover and heading strings are not limited upstream.
const MAX_TITLE_CHARS: usize = 150;
const MAX_SUBTITLE_CHARS: usize = 240;
const MAX_HEADING_CHARS: usize = 120;

/// Split a word wider than `max_width` into pieces that each fit.
fn break_word(word: &str, metrics: &FontMetrics, font_size: f32, max_width: f32) -> Vec<String> {
    if metrics.text_width(word, font_size) <= max_width {
        return vec![word.to_string()];
    }
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_w = 0.0f32;
    for ch in word.chars() {
        let cw = metrics.char_width_1000(ch) * font_size / 1000.0;
        if !current.is_empty() && current_w + cw > max_width {
            pieces.push(std::mem::take(&mut current));
            current_w = 0.0;
        }
        current.push(ch);
        current_w += cw;
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Greedy word wrap. Always returns at least one (possibly empty) line, and no line
/// is wider than `max_width` unless a single character is.
pub fn wrap_text(text: &str, metrics: &FontMetrics, font_size: f32, max_width: f32) -> Vec<String> {
    let space_w = metrics.space_width(font_size);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_w = 0.0f32;

    for word in text.split_whitespace() {
        for piece in break_word(word, metrics, font_size, max_width) {
            let ww = metrics.text_width(&piece, font_size);
            let proposed = if current.is_empty() {
                ww
            } else {
                current_w + space_w + ww
            };
            if !current.is_empty() && proposed > max_width {
                lines.push(std::mem::take(&mut current));
                current.push_str(&piece);
                current_w = ww;
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(&piece);
                current_w = proposed;
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Shorten `text` to a single line of at most `max_width`, ending in an ellipsis when cut.
pub fn fit_line(text: &str, metrics: &FontMetrics, font_size: f32, max_width: f32) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if metrics.text_width(&text, font_size) <= max_width {
        return text;
    }
    let budget = max_width - metrics.text_width(ELLIPSIS, font_size);
    let mut out = String::new();
    let mut w = 0.0f32;
    for ch in text.chars() {
        let cw = metrics.char_width_1000(ch) * font_size / 1000.0;
        if w + cw > budget {
            break;
        }
        out.push(ch);
        w += cw;
    }
    let mut out = out.trim_end().to_string();
    out.push_str(ELLIPSIS);
    out
}

/// Wrap and keep at most `max_lines`, marking the cut on the last kept line.
fn wrap_clamped(
    text: &str,
    metrics: &FontMetrics,
    font_size: f32,
    max_width: f32,
    max_lines: usize,
) -> Vec<String> {
    let mut lines = wrap_text(text, metrics, font_size, max_width);
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = fit_line(&format!("{last}{ELLIPSIS}"), metrics, font_size, max_width);
        }
    }
    lines
}

pub(crate) fn build_blocks(outline: &Outline, style: &Style, metrics: TextMetrics) -> Vec<Block> {
    let mut blocks = vec![cover_block(outline, style, metrics)];

    if style.table_of_contents && !outline.sections.is_empty() {
        blocks.extend(toc_blocks(outline, style, metrics));
    }

    let mut first_content = true;
    for (idx, section) in outline.sections.iter().enumerate() {
        let mut header = section_header_block(idx + 1, section, style, metrics);
        header.flow.starts_page = first_content;
        first_content = false;
        blocks.push(header);

        for (item_idx, item) in section.items.iter().enumerate() {
            let marker = if section.section_type.is_numbered() {
                Marker::Number(item_idx + 1)
            } else {
                Marker::Bullet
            };
            blocks.extend(item_blocks(item, marker, style, metrics));
        }
    }

    log::debug!(
        "measure: {} blocks, {:.1}pt total height",
        blocks.len(),
        blocks.iter().map(|b| b.flow.height).sum::<f32>()
    );
    blocks
}

fn cover_block(outline: &Outline, style: &Style, metrics: TextMetrics) -> Block {
    let sizes = &style.sizes;
    let ls = style.spacing.line_spacing;
    let width = style.content_width();

    let title = wrap_clamped(
        &truncate_text(&outline.title, MAX_TITLE_CHARS),
        metrics.bold,
        sizes.cover_title,
        width,
        MAX_COVER_TITLE_LINES,
    );
    let subtitle = match outline.subtitle.as_deref() {
        Some(s) => wrap_clamped(
            &truncate_text(s, MAX_SUBTITLE_CHARS),
            metrics.regular,
            sizes.cover_subtitle,
            width,
            MAX_COVER_SUBTITLE_LINES,
        ),
        None => Vec::new(),
    };

    let sections = outline.sections.len();
    let items = outline.item_count();
    let meta = format!(
        "{sections} section{} \u{00B7} {items} item{}",
        if sections == 1 { "" } else { "s" },
        if items == 1 { "" } else { "s" },
    );

    let mut height = COVER_RULE_GAP
        + title.len() as f32 * metrics.bold.line_height(sizes.cover_title, ls)
        + style.spacing.after_cover_title;
    if !subtitle.is_empty() {
        height += subtitle.len() as f32 * metrics.regular.line_height(sizes.cover_subtitle, ls)
            + COVER_META_GAP;
    }
    height += metrics.regular.line_height(sizes.cover_meta, ls);

    Block {
        flow: BlockFlow::new(height),
        x: style.margins.left,
        width,
        element: Element::Cover {
            title,
            subtitle,
            meta,
        },
    }
}

fn toc_blocks(outline: &Outline, style: &Style, metrics: TextMetrics) -> Vec<Block> {
    let sizes = &style.sizes;
    let ls = style.spacing.line_spacing;
    let width = style.content_width();

    let mut blocks = vec![Block {
        flow: BlockFlow {
            height: metrics.bold.line_height(sizes.toc_heading, ls)
                + style.spacing.after_section_heading,
            space_before: 0.0,
            starts_page: true,
            keep_with_next: true,
        },
        x: style.margins.left,
        width,
        element: Element::TocHeading {
            text: "Contents".into(),
        },
    }];

    let entry_h = metrics.regular.line_height(sizes.toc_entry, ls);
    for (idx, section) in outline.sections.iter().enumerate() {
        let number = idx + 1;
        let prefix_w = metrics
            .regular
            .text_width(&format!("{number}. "), sizes.toc_entry);
        let title = fit_line(
            &section.title,
            metrics.regular,
            sizes.toc_entry,
            (width - TOC_PAGE_COLUMN - prefix_w).max(0.0),
        );
        blocks.push(Block {
            flow: BlockFlow {
                space_before: 2.0,
                ..BlockFlow::new(entry_h)
            },
            x: style.margins.left,
            width,
            // Page is resolved once pagination is known.
            element: Element::TocEntry {
                number,
                title,
                page: 0,
            },
        });
    }
    blocks
}

fn section_header_block(
    number: usize,
    section: &Section,
    style: &Style,
    metrics: TextMetrics,
) -> Block {
    let size = style.sizes.section_heading;
    let bar = style.spacing.accent_bar_width;
    let text_width = style.content_width() - bar * 3.0;
    let lines = wrap_clamped(
        &truncate_text(&section.title, MAX_HEADING_CHARS),
        metrics.bold,
        size,
        text_width,
        MAX_HEADING_LINES,
    );
    let height = lines.len() as f32 * metrics.bold.line_height(size, style.spacing.line_spacing)
        + style.spacing.after_section_heading;

    Block {
        flow: BlockFlow {
            height,
            space_before: style.spacing.before_section,
            starts_page: false,
            keep_with_next: true,
        },
        x: style.margins.left,
        width: style.content_width(),
        element: Element::SectionHeader {
            number,
            section_type: section.section_type,
            lines,
        },
    }
}

fn callout_for(item: &Item) -> Option<Callout> {
    if item.is_warning {
        Some(Callout::Warning)
    } else if item.is_tip {
        Some(Callout::Tip)
    } else {
        None
    }
}

/// Height of the fixed parts of an item box: padding and the callout label row.
pub(crate) fn item_chrome_height(
    callout: Option<Callout>,
    with_label: bool,
    style: &Style,
    metrics: TextMetrics,
) -> f32 {
    match callout {
        Some(_) => {
            let label = if with_label {
                metrics
                    .bold
                    .line_height(style.sizes.callout_label, style.spacing.line_spacing)
            } else {
                0.0
            };
            style.spacing.callout_padding * 2.0 + label
        }
        None => 0.0,
    }
}

pub(crate) fn item_line_height(kind: LineKind, style: &Style, metrics: TextMetrics) -> f32 {
    let size = match kind {
        LineKind::Text => style.sizes.item,
        LineKind::SubItemStart | LineKind::SubItem => style.sizes.sub_item,
    };
    metrics.regular.line_height(size, style.spacing.line_spacing)
}

fn item_blocks(item: &Item, marker: Marker, style: &Style, metrics: TextMetrics) -> Vec<Block> {
    let callout = callout_for(item);
    let padding = if callout.is_some() {
        style.spacing.callout_padding
    } else {
        0.0
    };
    let text_width = style.content_width() - style.spacing.item_indent - padding * 2.0;
    let sub_width = text_width - style.spacing.sub_item_indent;

    let mut lines: Vec<ItemLine> =
        wrap_text(&item.text, metrics.regular, style.sizes.item, text_width)
            .into_iter()
            .map(|text| ItemLine {
                kind: LineKind::Text,
                text,
            })
            .collect();
    for sub in &item.sub_items {
        let wrapped = wrap_text(sub, metrics.regular, style.sizes.sub_item, sub_width);
        lines.extend(wrapped.into_iter().enumerate().map(|(i, text)| ItemLine {
            kind: if i == 0 {
                LineKind::SubItemStart
            } else {
                LineKind::SubItem
            },
            text,
        }));
    }

    // Split items taller than a page into continuation pieces.
    let usable = style.usable_height();
    let mut blocks = Vec::new();
    let mut piece: Vec<ItemLine> = Vec::new();
    let mut piece_h = item_chrome_height(callout, true, style, metrics);
    for line in lines {
        let lh = item_line_height(line.kind, style, metrics);
        if !piece.is_empty() && piece_h + lh > usable {
            let continued = !blocks.is_empty();
            let done = std::mem::take(&mut piece);
            blocks.push(item_block(done, piece_h, marker, callout, continued, style));
            piece_h = item_chrome_height(callout, false, style, metrics);
        }
        piece_h += lh;
        piece.push(line);
    }
    let continued = !blocks.is_empty();
    blocks.push(item_block(piece, piece_h, marker, callout, continued, style));
    blocks
}

fn item_block(
    lines: Vec<ItemLine>,
    height: f32,
    marker: Marker,
    callout: Option<Callout>,
    continued: bool,
    style: &Style,
) -> Block {
    Block {
        flow: BlockFlow {
            height,
            space_before: if continued { 0.0 } else { style.spacing.between_items },
            starts_page: false,
            keep_with_next: false,
        },
        x: style.margins.left,
        width: style.content_width(),
        element: Element::Item {
            marker: if continued { None } else { Some(marker) },
            callout,
            continued,
            lines,
        },
    }
}
