use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;
use crate::model::SectionType;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
    Letter,
    A4,
    Custom { width: f32, height: f32 },
}

impl PageSize {
    /// (width, height) in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::A4 => (595.28, 841.89),
            PageSize::Custom { width, height } => (width, height),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Margins {
            top: 54.0,
            bottom: 54.0,
            left: 54.0,
            right: 54.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    pub cover_title: f32,
    pub cover_subtitle: f32,
    pub cover_meta: f32,
    pub toc_heading: f32,
    pub toc_entry: f32,
    pub section_heading: f32,
    pub item: f32,
    pub sub_item: f32,
    pub callout_label: f32,
    pub footer: f32,
}

impl Default for FontSizes {
    fn default() -> Self {
        FontSizes {
            cover_title: 28.0,
            cover_subtitle: 14.0,
            cover_meta: 10.0,
            toc_heading: 16.0,
            toc_entry: 11.0,
            section_heading: 14.0,
            item: 10.0,
            sub_item: 9.0,
            callout_label: 7.0,
            footer: 8.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Spacing {
    /// Line height as a multiple of the font's natural line height.
    pub line_spacing: f32,
    pub after_cover_title: f32,
    pub before_section: f32,
    pub after_section_heading: f32,
    pub between_items: f32,
    pub item_indent: f32,
    pub sub_item_indent: f32,
    pub callout_padding: f32,
    pub accent_bar_width: f32,
    /// Band at the bottom of every content page reserved for the footer.
    pub footer_band: f32,
}

impl Default for Spacing {
    fn default() -> Self {
        Spacing {
            line_spacing: 1.15,
            after_cover_title: 12.0,
            before_section: 14.0,
            after_section_heading: 6.0,
            between_items: 5.0,
            item_indent: 16.0,
            sub_item_indent: 14.0,
            callout_padding: 6.0,
            accent_bar_width: 4.0,
            footer_band: 24.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub text: [u8; 3],
    pub muted: [u8; 3],
    pub quick_reference: [u8; 3],
    pub step_by_step: [u8; 3],
    pub comparison: [u8; 3],
    pub tips: [u8; 3],
    pub key_takeaways: [u8; 3],
    pub glossary: [u8; 3],
    pub custom: [u8; 3],
    pub tip_accent: [u8; 3],
    pub tip_fill: [u8; 3],
    pub warning_accent: [u8; 3],
    pub warning_fill: [u8; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            text: [0x1F, 0x23, 0x2B],
            muted: [0x6B, 0x72, 0x80],
            quick_reference: [0x25, 0x63, 0xEB],
            step_by_step: [0x7C, 0x3A, 0xED],
            comparison: [0x0E, 0x91, 0x9B],
            tips: [0x16, 0xA3, 0x4A],
            key_takeaways: [0xEA, 0x58, 0x0C],
            glossary: [0x47, 0x55, 0x69],
            custom: [0x4F, 0x46, 0xE5],
            tip_accent: [0x16, 0xA3, 0x4A],
            tip_fill: [0xF0, 0xFD, 0xF4],
            warning_accent: [0xDC, 0x26, 0x26],
            warning_fill: [0xFE, 0xF2, 0xF2],
        }
    }
}

impl Palette {
    pub fn accent(&self, section_type: SectionType) -> [u8; 3] {
        match section_type {
            SectionType::QuickReference => self.quick_reference,
            SectionType::StepByStep => self.step_by_step,
            SectionType::Comparison => self.comparison,
            SectionType::Tips => self.tips,
            SectionType::KeyTakeaways => self.key_takeaways,
            SectionType::Glossary => self.glossary,
            SectionType::Custom => self.custom,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FontChoice {
    pub regular: String,
    pub bold: String,
    /// Explicit font files; when set they must load or rendering fails.
    pub regular_file: Option<PathBuf>,
    pub bold_file: Option<PathBuf>,
}

impl Default for FontChoice {
    fn default() -> Self {
        FontChoice {
            regular: "Helvetica".into(),
            bold: "Helvetica-Bold".into(),
            regular_file: None,
            bold_file: None,
        }
    }
}

/// Everything layout and rendering need to know about appearance.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Style {
    pub page_size: PageSize,
    pub margins: Margins,
    pub fonts: FontChoice,
    pub sizes: FontSizes,
    pub spacing: Spacing,
    pub palette: Palette,
    pub table_of_contents: bool,
    pub creator: String,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            page_size: PageSize::Letter,
            margins: Margins::default(),
            fonts: FontChoice::default(),
            sizes: FontSizes::default(),
            spacing: Spacing::default(),
            palette: Palette::default(),
            table_of_contents: false,
            creator: concat!("cheatsheet-pdf ", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl Style {
    pub fn from_json_file(path: &Path) -> Result<Style, Error> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn page_width(&self) -> f32 {
        self.page_size.dimensions().0
    }

    pub fn page_height(&self) -> f32 {
        self.page_size.dimensions().1
    }

    pub fn content_width(&self) -> f32 {
        self.page_width() - self.margins.left - self.margins.right
    }

    /// Top edge of the content area.
    pub fn content_top(&self) -> f32 {
        self.page_height() - self.margins.top
    }

    /// Bottom edge of the content area, above the footer band.
    pub fn content_bottom(&self) -> f32 {
        self.margins.bottom + self.spacing.footer_band
    }

    pub fn usable_height(&self) -> f32 {
        (self.content_top() - self.content_bottom()).max(0.0)
    }
}
