//! Several cheat sheets rendered one after another, e.g. one per course module.

use crate::limits;
use crate::model::{Outline, RenderedDocument};
use crate::style::Style;

#[derive(Clone, Debug)]
pub struct PackSheet {
    pub title: String,
    pub document: RenderedDocument,
}

#[derive(Clone, Debug, Default)]
pub struct PackReport {
    pub sheets: Vec<PackSheet>,
    /// One line per outline that was skipped or failed.
    pub warnings: Vec<String>,
    pub total: usize,
    pub completed: usize,
}

impl PackReport {
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Count an input that never became an outline, e.g. a file that failed to parse.
    pub fn record_unreadable(&mut self, source: &str, err: &crate::Error) {
        log::warn!("Pack: skipped {source}, {err}");
        self.total += 1;
        self.warnings.push(format!("Skipped {source}: {err}"));
    }
}

/// Render each outline in order. A failing or empty outline is reported and skipped;
/// it never stops the rest of the pack.
pub fn generate_pack(outlines: &[Outline], style: &Style) -> PackReport {
    let t0 = std::time::Instant::now();
    let mut report = PackReport {
        total: outlines.len(),
        ..Default::default()
    };

    for outline in outlines {
        let title = outline.title.as_str();
        let normalized = limits::normalize(outline);
        if normalized.item_count() == 0 {
            log::warn!("Pack: skipped {title:?}, no meaningful content");
            report
                .warnings
                .push(format!("Skipped \"{title}\": no meaningful content"));
            continue;
        }

        match crate::render_normalized(&normalized, style) {
            Ok(document) => {
                report.completed += 1;
                log::info!(
                    "Pack: {title:?} done ({}/{}), {} pages",
                    report.completed,
                    report.total,
                    document.page_count,
                );
                report.sheets.push(PackSheet {
                    title: title.to_string(),
                    document,
                });
            }
            Err(e) => {
                log::error!("Pack: {title:?} failed: {e}");
                report.warnings.push(format!("\"{title}\" failed: {e}"));
            }
        }
    }

    log::info!(
        "Pack: {}/{} sheets in {:.1}ms, {} warnings",
        report.completed,
        report.total,
        t0.elapsed().as_secs_f64() * 1000.0,
        report.warnings.len(),
    );
    report
}
