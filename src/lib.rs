mod error;
mod fonts;
pub mod layout;
pub mod limits;
pub mod model;
pub mod outline;
pub mod pack;
mod pdf;
pub mod style;

pub use error::{Error, Result};
pub use fonts::FontMetrics;
pub use limits::{Limits, enforce_limits, normalize};
pub use model::{
    DocumentMetadata, Item, MIME_TYPE, Outline, RenderedDocument, Section, SectionType,
};
pub use outline::parse_outline_json;
pub use pack::{PackReport, PackSheet, generate_pack};
pub use style::{PageSize, Style};

use std::path::Path;
use std::time::Instant;

/// Fit an outline onto pages and render it.
///
/// The outline is normalized first, so callers may pass generator output as-is.
pub fn generate(outline: &Outline, style: &Style) -> Result<RenderedDocument> {
    let t0 = Instant::now();

    let normalized = limits::normalize(outline);
    let t_normalize = t0.elapsed();

    let document = render_normalized(&normalized, style)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: normalize={:.1}ms, render={:.1}ms, total={:.1}ms (output {} bytes, {} pages)",
        t_normalize.as_secs_f64() * 1000.0,
        (t_total - t_normalize).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        document.byte_size,
        document.page_count,
    );

    Ok(document)
}

/// Render an outline that has already been through [`normalize`].
pub(crate) fn render_normalized(normalized: &Outline, style: &Style) -> Result<RenderedDocument> {
    let (bytes, page_count) = pdf::render(normalized, style)?;
    let byte_size = bytes.len();
    Ok(RenderedDocument {
        bytes,
        page_count,
        byte_size,
    })
}

/// Ingest raw generator output (optionally code-fenced JSON) and render it.
pub fn generate_from_json(json: &str, style: &Style) -> Result<RenderedDocument> {
    let outline = outline::parse_outline_json(json)?;
    generate(&outline, style)
}

pub fn convert_outline_file(
    input: &Path,
    output: &Path,
    style: &Style,
) -> Result<DocumentMetadata> {
    let t0 = Instant::now();

    let json = std::fs::read_to_string(input).map_err(|e| with_path(e, input))?;
    let doc = generate_from_json(&json, style)?;
    let t_generate = t0.elapsed();

    std::fs::write(output, &doc.bytes).map_err(|e| with_path(e, output))?;

    log::info!(
        "Timing: generate={:.1}ms, write={:.1}ms ({} -> {})",
        t_generate.as_secs_f64() * 1000.0,
        (t0.elapsed() - t_generate).as_secs_f64() * 1000.0,
        input.display(),
        output.display(),
    );

    Ok(doc.metadata())
}

fn with_path(e: std::io::Error, path: &Path) -> Error {
    Error::Io(std::io::Error::new(
        e.kind(),
        format!("{}: {e}", path.display()),
    ))
}
