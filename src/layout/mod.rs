//! Layout engine: decides what goes on which page and where.
//!
//! Layout runs in two passes over pure data. [`measure`] turns the outline into
//! blocks with known heights, [`paginate`] chooses page boundaries from those heights
//! alone, and [`place`] assigns coordinates once the total page count is known.

mod measure;
mod paginate;

use std::collections::HashMap;
use std::ops::Range;

use crate::fonts::FontMetrics;
use crate::model::{Outline, SectionType};
use crate::style::Style;

pub use measure::{fit_line, wrap_text};
pub(crate) use measure::{item_chrome_height, item_line_height};
pub use paginate::{BlockFlow, paginate};

/// Gap between the cover's accent rule and its title.
pub const COVER_RULE_GAP: f32 = 18.0;
/// Gap between the cover subtitle and its metadata line.
pub const COVER_META_GAP: f32 = 8.0;
pub const MAX_COVER_TITLE_LINES: usize = 4;
pub const MAX_COVER_SUBTITLE_LINES: usize = 4;
pub const MAX_HEADING_LINES: usize = 3;
/// Room kept on the right of a TOC entry for its page number.
pub const TOC_PAGE_COLUMN: f32 = 36.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    Bullet,
    Number(usize),
}

impl Marker {
    pub fn label(self) -> String {
        match self {
            Marker::Bullet => "\u{2022}".to_string(),
            Marker::Number(n) => format!("{n}."),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Callout {
    Tip,
    Warning,
}

impl Callout {
    pub fn label(self) -> &'static str {
        match self {
            Callout::Tip => "TIP",
            Callout::Warning => "WARNING",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// Line of the item's own text.
    Text,
    /// First line of a sub-item; carries the sub-item marker.
    SubItemStart,
    SubItem,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemLine {
    pub kind: LineKind,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Cover {
        title: Vec<String>,
        subtitle: Vec<String>,
        meta: String,
    },
    TocHeading {
        text: String,
    },
    TocEntry {
        number: usize,
        title: String,
        page: usize,
    },
    SectionHeader {
        number: usize,
        section_type: SectionType,
        lines: Vec<String>,
    },
    Item {
        marker: Option<Marker>,
        callout: Option<Callout>,
        /// Set on the second and later pieces of an item split across pages.
        continued: bool,
        lines: Vec<ItemLine>,
    },
    Footer {
        text: Option<String>,
        page: usize,
        total: usize,
    },
}

/// An element with its box in PDF user space (origin bottom-left).
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedElement {
    pub x: f32,
    pub y_top: f32,
    pub width: f32,
    pub height: f32,
    pub element: Element,
}

impl PositionedElement {
    pub fn y_bottom(&self) -> f32 {
        self.y_top - self.height
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    /// 1-based physical page number.
    pub number: usize,
    pub elements: Vec<PositionedElement>,
}

/// Measurement fonts for the two faces the document uses.
#[derive(Clone, Copy)]
pub struct TextMetrics<'a> {
    pub regular: &'a FontMetrics,
    pub bold: &'a FontMetrics,
}

/// A measured block waiting for a page.
#[derive(Clone, Debug)]
pub(crate) struct Block {
    pub(crate) flow: BlockFlow,
    pub(crate) x: f32,
    pub(crate) width: f32,
    pub(crate) element: Element,
}

/// Lay out a normalized outline.
///
/// Page 1 carries the cover only, table-of-contents pages follow when the style asks for
/// them, and every content page after that gets a footer with its page number.
pub fn layout(outline: &Outline, style: &Style, metrics: TextMetrics) -> Vec<Page> {
    let blocks = measure::build_blocks(outline, style, metrics);
    let flows: Vec<BlockFlow> = blocks.iter().map(|b| b.flow).collect();
    let ranges = paginate(&flows, style.usable_height());
    place(blocks, &ranges, outline.footer.as_deref(), style, metrics)
}

/// Second pass: turn page ranges into positioned elements.
pub(crate) fn place(
    blocks: Vec<Block>,
    ranges: &[Range<usize>],
    footer_text: Option<&str>,
    style: &Style,
    metrics: TextMetrics,
) -> Vec<Page> {
    let total = ranges.len();

    let mut section_pages: HashMap<usize, usize> = HashMap::new();
    for (page_idx, range) in ranges.iter().enumerate() {
        for block in &blocks[range.clone()] {
            if let Element::SectionHeader { number, .. } = block.element {
                section_pages.entry(number).or_insert(page_idx + 1);
            }
        }
    }

    let footer_label = footer_text.map(|text| {
        let reserve = metrics
            .regular
            .text_width(&format!("Page {total} of {total}"), style.sizes.footer)
            + 24.0;
        fit_line(
            text,
            metrics.regular,
            style.sizes.footer,
            (style.content_width() - reserve).max(0.0),
        )
    });

    let mut blocks = blocks.into_iter();
    let mut pages = Vec::with_capacity(total);
    for (page_idx, range) in ranges.iter().enumerate() {
        let number = page_idx + 1;
        let mut elements = Vec::with_capacity(range.len() + 1);
        let mut y = style.content_top();
        let mut is_cover_page = false;

        for (pos, mut block) in blocks.by_ref().take(range.len()).enumerate() {
            if pos > 0 {
                y -= block.flow.space_before;
            }
            match &mut block.element {
                Element::Cover { .. } => {
                    is_cover_page = true;
                    // Push the cover down a little when there is room for it.
                    let drop = (style.usable_height() * 0.3)
                        .min(style.usable_height() - block.flow.height)
                        .max(0.0);
                    y -= drop;
                }
                Element::TocEntry { number, page, .. } => {
                    *page = section_pages.get(&*number).copied().unwrap_or(0);
                }
                _ => {}
            }
            elements.push(PositionedElement {
                x: block.x,
                y_top: y,
                width: block.width,
                height: block.flow.height,
                element: block.element,
            });
            y -= block.flow.height;
        }

        if !is_cover_page {
            elements.push(PositionedElement {
                x: style.margins.left,
                y_top: style.content_bottom(),
                width: style.content_width(),
                height: style.spacing.footer_band,
                element: Element::Footer {
                    text: footer_label.clone(),
                    page: number,
                    total,
                },
            });
        }

        pages.push(Page { number, elements });
    }

    log::debug!(
        "layout: {} pages, {} sections placed",
        total,
        section_pages.len()
    );
    pages
}
