mod draw;

use std::collections::HashSet;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, TextStr};

use crate::error::Error;
use crate::fonts::Fonts;
use crate::layout::{self, Page, TextMetrics};
use crate::model::Outline;
use crate::style::Style;

/// Characters drawn by the renderer itself rather than taken from the outline.
const DECORATION_CHARS: [char; 3] = ['\u{2022}', '\u{2013}', '\u{00B7}'];

fn collect_used_chars(outline: &Outline) -> HashSet<char> {
    let mut chars: HashSet<char> = (' '..='~').collect();
    chars.extend(DECORATION_CHARS);

    let mut add = |s: &str| chars.extend(s.chars());
    add(&outline.title);
    for extra in [&outline.subtitle, &outline.footer].into_iter().flatten() {
        add(extra);
    }
    for section in &outline.sections {
        add(&section.title);
        for item in &section.items {
            add(&item.text);
            for sub in &item.sub_items {
                add(sub);
            }
        }
    }
    chars
}

/// Render a normalized outline to PDF bytes.
///
/// Returns the serialized document and its page count. Either the whole document is
/// produced or an error is returned; partial output never escapes.
pub(crate) fn render(outline: &Outline, style: &Style) -> Result<(Vec<u8>, usize), Error> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();

    // Phase 1: two shared fonts, subset to what the document uses
    let used_chars = collect_used_chars(outline);
    let fonts = Fonts::register(&mut pdf, &style.fonts, &mut alloc, &used_chars)?;
    let t_fonts = t0.elapsed();

    // Phase 2: measure, paginate, place
    let metrics = TextMetrics {
        regular: &fonts.regular.metrics,
        bold: &fonts.bold.metrics,
    };
    let pages = layout::layout(outline, style, metrics);
    if pages.is_empty() {
        return Err(Error::Render("layout produced no pages".into()));
    }
    let t_layout = t0.elapsed();

    // Phase 3: one content stream per page
    let page_ids: Vec<Ref> = pages.iter().map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = pages.iter().map(|_| alloc()).collect();

    for (page, &content_id) in pages.iter().zip(&content_ids) {
        let raw = draw_page(page, style, &fonts).finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);
    }
    let t_draw = t0.elapsed();

    let count = i32::try_from(pages.len())
        .map_err(|_| Error::Render(format!("too many pages: {}", pages.len())))?;
    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(count);

    let font_pairs = fonts.pairs();
    for (&page_id, &content_id) in page_ids.iter().zip(&content_ids) {
        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, style.page_width(), style.page_height()))
            .parent(pages_id)
            .contents(content_id);
        let mut resources = page.resources();
        let mut font_dict = resources.fonts();
        for (name, font_ref) in font_pairs {
            font_dict.pair(Name(name.as_bytes()), font_ref);
        }
    }

    write_info(&mut pdf, info_id, outline, style);

    let bytes = pdf.finish();
    if !bytes.starts_with(b"%PDF-") {
        return Err(Error::Render("serializer did not produce a PDF header".into()));
    }
    let t_assembly = t0.elapsed();

    log::info!(
        "Render phases: font_embed={:.1}ms, layout={:.1}ms, draw={:.1}ms, assembly={:.1}ms ({} pages)",
        t_fonts.as_secs_f64() * 1000.0,
        (t_layout - t_fonts).as_secs_f64() * 1000.0,
        (t_draw - t_layout).as_secs_f64() * 1000.0,
        (t_assembly - t_draw).as_secs_f64() * 1000.0,
        pages.len(),
    );

    Ok((bytes, pages.len()))
}

fn draw_page(page: &Page, style: &Style, fonts: &Fonts) -> Content {
    let mut content = Content::new();
    for el in &page.elements {
        draw::draw_element(&mut content, el, style, fonts);
    }
    content
}

fn write_info(pdf: &mut Pdf, info_id: Ref, outline: &Outline, style: &Style) {
    let mut info = pdf.document_info(info_id);
    info.title(TextStr(&outline.title));
    if let Some(subtitle) = outline.subtitle.as_deref() {
        info.subject(TextStr(subtitle));
    }
    info.creator(TextStr(&style.creator));
    info.producer(TextStr(concat!("cheatsheet-pdf ", env!("CARGO_PKG_VERSION"))));
}
