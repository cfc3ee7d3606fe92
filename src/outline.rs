//! Ingest of outlines produced by the upstream generator.
//!
//! The generator is an LLM, so its replies are parsed leniently: only a missing
//! `sections` array is fatal, everything else is repaired with a default and a warning.

use serde_json::{Map, Value};

use crate::error::Error;
use crate::model::{Item, Outline, Section, SectionType};

const UNTITLED_SECTION: &str = "Untitled Section";
const DEFAULT_TITLE: &str = "Cheat Sheet";

/// Remove a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````).
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        // Single-line fence: "```json {...}```"
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim().strip_suffix("```").unwrap_or(body).trim()
}

pub fn parse_outline_json(content: &str) -> Result<Outline, Error> {
    let cleaned = strip_code_fence(content);
    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| Error::InvalidOutline(format!("not valid JSON: {e}")))?;
    outline_from_value(&value)
}

pub fn outline_from_value(value: &Value) -> Result<Outline, Error> {
    let root = value
        .as_object()
        .ok_or_else(|| Error::InvalidOutline("root is not an object".into()))?;
    let raw_sections = root
        .get("sections")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::InvalidOutline("missing sections array".into()))?;

    let title = non_empty_str(root, "title").unwrap_or_else(|| {
        log::warn!("Outline has no title, using {DEFAULT_TITLE:?}");
        DEFAULT_TITLE.to_string()
    });

    let sections = raw_sections
        .iter()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let section = section_from_value(idx, raw);
            if section.is_none() {
                log::warn!("Section {idx} is not an object, dropped");
            }
            section
        })
        .collect();

    Ok(Outline {
        title,
        subtitle: non_empty_str(root, "subtitle"),
        footer: non_empty_str(root, "footer"),
        sections,
    })
}

fn non_empty_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn section_from_value(idx: usize, raw: &Value) -> Option<Section> {
    let obj = raw.as_object()?;

    let title = non_empty_str(obj, "title")
        .or_else(|| non_empty_str(obj, "heading"))
        .unwrap_or_else(|| {
            log::warn!("Section {idx} has no title, using {UNTITLED_SECTION:?}");
            UNTITLED_SECTION.to_string()
        });

    let section_type = match obj.get("type").and_then(Value::as_str) {
        Some(name) => {
            let parsed = SectionType::parse_lossy(name);
            if parsed == SectionType::Custom && !name.trim().eq_ignore_ascii_case("custom") {
                log::warn!("Section {idx} has unknown type {name:?}, treating as custom");
            }
            parsed
        }
        None => {
            log::warn!("Section {idx} has no type, treating as custom");
            SectionType::Custom
        }
    };

    let items = match obj.get("items") {
        Some(Value::Array(raw_items)) => raw_items
            .iter()
            .filter_map(|raw_item| item_from_value(idx, raw_item))
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            log::warn!("Section {idx} items is not an array, ignored");
            Vec::new()
        }
    };

    Some(Section {
        section_type,
        title,
        items,
    })
}

fn item_from_value(section_idx: usize, raw: &Value) -> Option<Item> {
    // Generators sometimes emit bare strings instead of item objects.
    if let Some(text) = raw.as_str() {
        return Some(Item::new(text.trim()));
    }
    let Some(obj) = raw.as_object() else {
        log::warn!("Section {section_idx}: dropped non-object item");
        return None;
    };

    let text = obj
        .get("text")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let sub_items = match obj.get("subItems") {
        Some(Value::Array(subs)) => subs
            .iter()
            .filter_map(|s| s.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            log::warn!("Section {section_idx}: subItems is not an array, ignored");
            Vec::new()
        }
    };

    Some(Item {
        text,
        sub_items,
        is_tip: obj.get("isTip").and_then(Value::as_bool).unwrap_or(false),
        is_warning: obj.get("isWarning").and_then(Value::as_bool).unwrap_or(false),
    })
}
