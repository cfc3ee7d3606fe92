#![allow(dead_code)]

use std::path::{Path, PathBuf};

use cheatsheet_pdf::layout::TextMetrics;
use cheatsheet_pdf::{FontMetrics, Item, Outline, Section, SectionType};

pub fn items(prefix: &str, n: usize) -> Vec<Item> {
    (1..=n).map(|i| Item::new(format!("{prefix} {i}"))).collect()
}

pub fn section(section_type: SectionType, title: &str, n_items: usize) -> Section {
    Section::new(section_type, title, items(title, n_items))
}

pub fn outline(sections: Vec<Section>) -> Outline {
    Outline::from_sections("Test Sheet", sections)
}

/// Built-in Helvetica metrics, the same ones the default style renders with.
pub fn helvetica() -> (FontMetrics, FontMetrics) {
    (FontMetrics::helvetica(), FontMetrics::helvetica_bold())
}

pub fn metrics<'a>(fonts: &'a (FontMetrics, FontMetrics)) -> TextMetrics<'a> {
    TextMetrics {
        regular: &fonts.0,
        bold: &fonts.1,
    }
}

/// DejaVu Sans regular and bold from `CHEATSHEET_FONTS` or the usual system font
/// directories. Tests that need a real TrueType file skip when it is missing.
pub fn dejavu_sans() -> Option<(PathBuf, PathBuf)> {
    let mut dirs: Vec<PathBuf> = std::env::var("CHEATSHEET_FONTS")
        .map(|v| v.split(':').filter(|p| !p.is_empty()).map(PathBuf::from).collect())
        .unwrap_or_default();
    dirs.extend(
        ["/usr/share/fonts", "/usr/local/share/fonts", "/Library/Fonts"].map(PathBuf::from),
    );
    if let Ok(home) = std::env::var("HOME") {
        dirs.push(Path::new(&home).join(".fonts"));
    }

    let regular = dirs.iter().find_map(|d| find_file(d, "DejaVuSans.ttf", 4))?;
    let bold = dirs.iter().find_map(|d| find_file(d, "DejaVuSans-Bold.ttf", 4))?;
    Some((regular, bold))
}

fn find_file(dir: &Path, name: &str, depth: usize) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path.file_name().is_some_and(|n| n == name) {
            return Some(path);
        }
    }
    if depth == 0 {
        return None;
    }
    subdirs.iter().find_map(|d| find_file(d, name, depth - 1))
}

/// Worst case under the default budget: every text at its length cap, with word lengths
/// chosen so that no two neighbouring words share a line, every item a callout with
/// three sub-items.
pub fn adversarial_outline() -> Outline {
    let item_text = format!("{} {} {}", "m".repeat(7), "m".repeat(50), "m".repeat(41));
    let sub_text = format!("{} {} {}", "m".repeat(12), "m".repeat(50), "m".repeat(16));

    let long_title = "W".repeat(200);
    let sections = [
        SectionType::QuickReference,
        SectionType::StepByStep,
        SectionType::Comparison,
        SectionType::Tips,
    ]
    .into_iter()
    .map(|t| {
        let items = (0..6)
            .map(|_| Item {
                text: item_text.clone(),
                sub_items: vec![sub_text.clone(); 3],
                is_tip: true,
                is_warning: true,
            })
            .collect();
        Section::new(t, long_title.clone(), items)
    })
    .collect();

    Outline {
        title: long_title.clone(),
        subtitle: Some(long_title.clone()),
        footer: Some(long_title),
        sections,
    }
}

/// Minimal structural view of a PDF produced by this crate.
pub struct PdfInspector<'a> {
    bytes: &'a [u8],
}

impl<'a> PdfInspector<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        PdfInspector { bytes }
    }

    pub fn has_header(&self) -> bool {
        self.bytes.starts_with(b"%PDF-")
    }

    pub fn has_trailer(&self) -> bool {
        let tail = &self.bytes[self.bytes.len().saturating_sub(32)..];
        find(tail, b"%%EOF").is_some()
    }

    /// Number of page objects (`/Type /Page`, not `/Pages`).
    pub fn page_count(&self) -> usize {
        let needle = b"/Type /Page";
        let mut count = 0;
        let mut pos = 0;
        while let Some(i) = find(&self.bytes[pos..], needle) {
            let end = pos + i + needle.len();
            if self.bytes.get(end) != Some(&b's') {
                count += 1;
            }
            pos = end;
        }
        count
    }

    pub fn contains(&self, needle: &[u8]) -> bool {
        find(self.bytes, needle).is_some()
    }

    /// Every stream that inflates as zlib, i.e. the page content streams.
    pub fn content_streams(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        let mut pos = 0;
        while let Some(i) = find(&self.bytes[pos..], b"stream\n") {
            let start = pos + i + b"stream\n".len();
            let Some(len) = find(&self.bytes[start..], b"\nendstream") else {
                break;
            };
            let data = &self.bytes[start..start + len];
            if let Ok(raw) = miniz_oxide::inflate::decompress_to_vec_zlib(data) {
                out.push(raw);
            }
            pos = start + len + b"\nendstream".len();
        }
        out
    }

    /// Concatenated content of all pages, lossily decoded.
    pub fn page_text(&self) -> String {
        self.content_streams()
            .iter()
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
