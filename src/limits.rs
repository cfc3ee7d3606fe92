//! Lossy compaction of an outline down to a printable budget.
//!
//! Order matters: sections are chosen first, then items, then text is shortened,
//! and the global item budget is enforced last on the already-shrunk data.

use crate::model::{Item, Outline, Section};

pub const ELLIPSIS: &str = "...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub max_sections: usize,
    pub max_items_per_section: usize,
    pub max_sub_items: usize,
    pub max_item_chars: usize,
    pub max_sub_item_chars: usize,
    pub max_total_items: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_sections: 4,
            max_items_per_section: 6,
            max_sub_items: 3,
            max_item_chars: 100,
            max_sub_item_chars: 80,
            max_total_items: 30,
        }
    }
}

/// A trimmed section is never cut below this many items before being dropped.
const MIN_ITEMS_BEFORE_DROP: usize = 3;

#[derive(Default)]
struct TrimStats {
    sections_dropped: usize,
    items_dropped: usize,
    sub_items_dropped: usize,
    texts_truncated: usize,
}

/// Shorten `text` to at most `max_chars` characters, ending in [`ELLIPSIS`] when cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.chars().count());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

fn total_items(sections: &[Section]) -> usize {
    sections.iter().map(|s| s.items.len()).sum()
}

pub fn enforce_limits(sections: Vec<Section>) -> Vec<Section> {
    normalize_sections(sections, &Limits::default())
}

pub fn normalize_sections(sections: Vec<Section>, limits: &Limits) -> Vec<Section> {
    let mut stats = TrimStats::default();
    let input_sections = sections.len();

    // 1. Highest priority first; sort_by_key is stable so ties keep authorial order.
    let mut sections = sections;
    sections.sort_by_key(|s| std::cmp::Reverse(s.section_type.priority()));
    if sections.len() > limits.max_sections {
        stats.sections_dropped += sections.len() - limits.max_sections;
        stats.items_dropped += total_items(&sections[limits.max_sections..]);
        sections.truncate(limits.max_sections);
    }

    for section in &mut sections {
        // 2. Item order is authorial, never re-sorted.
        if section.items.len() > limits.max_items_per_section {
            stats.items_dropped += section.items.len() - limits.max_items_per_section;
            section.items.truncate(limits.max_items_per_section);
        }

        // 3. Text length and sub-item count.
        for item in &mut section.items {
            shorten_item(item, limits, &mut stats);
        }
    }

    // 4. Global budget, cutting from the lowest-priority end.
    while total_items(&sections) > limits.max_total_items && sections.len() > 1 {
        let Some(last) = sections.last_mut() else {
            break;
        };
        if last.items.len() > MIN_ITEMS_BEFORE_DROP {
            stats.items_dropped += last.items.len() - MIN_ITEMS_BEFORE_DROP;
            last.items.truncate(MIN_ITEMS_BEFORE_DROP);
        } else if let Some(removed) = sections.pop() {
            stats.sections_dropped += 1;
            stats.items_dropped += removed.items.len();
        }
    }

    log::debug!(
        "normalize: {} → {} sections, {} items kept; dropped {} sections, {} items, {} sub-items; truncated {} texts",
        input_sections,
        sections.len(),
        total_items(&sections),
        stats.sections_dropped,
        stats.items_dropped,
        stats.sub_items_dropped,
        stats.texts_truncated,
    );

    sections
}

fn shorten_item(item: &mut Item, limits: &Limits, stats: &mut TrimStats) {
    if item.text.chars().count() > limits.max_item_chars {
        item.text = truncate_text(&item.text, limits.max_item_chars);
        stats.texts_truncated += 1;
    }
    if item.sub_items.len() > limits.max_sub_items {
        stats.sub_items_dropped += item.sub_items.len() - limits.max_sub_items;
        item.sub_items.truncate(limits.max_sub_items);
    }
    for sub in &mut item.sub_items {
        if sub.chars().count() > limits.max_sub_item_chars {
            *sub = truncate_text(sub, limits.max_sub_item_chars);
            stats.texts_truncated += 1;
        }
    }
}

/// Normalize the sections of a whole outline, keeping its cover metadata.
pub fn normalize(outline: &Outline) -> Outline {
    normalize_with(outline, &Limits::default())
}

pub fn normalize_with(outline: &Outline, limits: &Limits) -> Outline {
    Outline {
        title: outline.title.clone(),
        subtitle: outline.subtitle.clone(),
        footer: outline.footer.clone(),
        sections: normalize_sections(outline.sections.clone(), limits),
    }
}
