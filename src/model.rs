use serde::{Deserialize, Serialize};

pub const MIME_TYPE: &str = "application/pdf";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    QuickReference,
    StepByStep,
    Comparison,
    Tips,
    KeyTakeaways,
    Glossary,
    Custom,
}

impl SectionType {
    pub const ALL: [SectionType; 7] = [
        SectionType::QuickReference,
        SectionType::StepByStep,
        SectionType::Comparison,
        SectionType::Tips,
        SectionType::KeyTakeaways,
        SectionType::Glossary,
        SectionType::Custom,
    ];

    /// Trimming weight: higher survives longer.
    pub fn priority(self) -> i32 {
        match self {
            SectionType::QuickReference => 4,
            SectionType::StepByStep => 3,
            SectionType::Comparison => 2,
            SectionType::Tips => 1,
            SectionType::KeyTakeaways => 0,
            SectionType::Glossary => -1,
            SectionType::Custom => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionType::QuickReference => "quick_reference",
            SectionType::StepByStep => "step_by_step",
            SectionType::Comparison => "comparison",
            SectionType::Tips => "tips",
            SectionType::KeyTakeaways => "key_takeaways",
            SectionType::Glossary => "glossary",
            SectionType::Custom => "custom",
        }
    }

    /// Unknown names fall back to `Custom`.
    pub fn parse_lossy(s: &str) -> SectionType {
        let s = s.trim();
        SectionType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .unwrap_or(SectionType::Custom)
    }

    /// Items in ordered sections get sequential numbers instead of bullets.
    pub fn is_numbered(self) -> bool {
        matches!(self, SectionType::StepByStep)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_items: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_tip: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_warning: bool,
}

impl Item {
    pub fn new(text: impl Into<String>) -> Self {
        Item {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_sub_items<I, S>(mut self, sub_items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_items = sub_items.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "type")]
    pub section_type: SectionType,
    #[serde(alias = "heading")]
    pub title: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Section {
    pub fn new(section_type: SectionType, title: impl Into<String>, items: Vec<Item>) -> Self {
        Section {
            section_type,
            title: title.into(),
            items,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    pub sections: Vec<Section>,
}

impl Outline {
    pub fn from_sections(title: impl Into<String>, sections: Vec<Section>) -> Self {
        Outline {
            title: title.into(),
            subtitle: None,
            footer: None,
            sections,
        }
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

/// Final artifact handed to the storage collaborator.
#[derive(Clone, Debug)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub byte_size: usize,
}

impl RenderedDocument {
    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            page_count: self.page_count,
            byte_size: self.byte_size,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub page_count: usize,
    pub byte_size: usize,
}
