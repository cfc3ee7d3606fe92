mod common;

use cheatsheet_pdf::limits::{ELLIPSIS, Limits, normalize_sections, truncate_text};
use cheatsheet_pdf::{Item, Section, SectionType, enforce_limits, normalize};
use proptest::prelude::*;

use common::{outline, section};

fn types(sections: &[Section]) -> Vec<SectionType> {
    sections.iter().map(|s| s.section_type).collect()
}

#[test]
fn keeps_four_highest_priority_types() {
    let input = vec![
        section(SectionType::Glossary, "Glossary", 2),
        section(SectionType::QuickReference, "Reference", 2),
        section(SectionType::Tips, "Tips", 2),
        section(SectionType::Custom, "Extra", 2),
        section(SectionType::Comparison, "Compare", 2),
        section(SectionType::StepByStep, "Steps", 2),
    ];
    let out = enforce_limits(input.clone());
    assert_eq!(
        types(&out),
        [
            SectionType::QuickReference,
            SectionType::StepByStep,
            SectionType::Comparison,
            SectionType::Tips,
        ]
    );

    let mut reversed = input;
    reversed.reverse();
    assert_eq!(types(&enforce_limits(reversed)), types(&out));
}

#[test]
fn equal_priorities_keep_authorial_order() {
    // key_takeaways and custom share priority 0.
    let out = enforce_limits(vec![
        section(SectionType::Custom, "First", 1),
        section(SectionType::KeyTakeaways, "Second", 1),
        section(SectionType::Custom, "Third", 1),
    ]);
    let titles: Vec<&str> = out.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["First", "Second", "Third"]);
}

#[test]
fn text_of_101_chars_is_cut_to_100() {
    let text: String = ('a'..='z').cycle().take(101).collect();
    let out = enforce_limits(vec![Section::new(
        SectionType::Tips,
        "Tips",
        vec![Item::new(text.clone())],
    )]);
    let kept = &out[0].items[0].text;
    assert_eq!(kept.chars().count(), 100);
    assert!(kept.ends_with(ELLIPSIS));
    assert_eq!(&kept[..97], &text[..97]);
}

#[test]
fn text_of_100_chars_is_untouched() {
    let text = "x".repeat(100);
    let out = enforce_limits(vec![Section::new(
        SectionType::Tips,
        "Tips",
        vec![Item::new(text.clone())],
    )]);
    assert_eq!(out[0].items[0].text, text);
}

#[test]
fn sub_items_are_capped_and_truncated() {
    let item = Item::new("Parent").with_sub_items([
        "y".repeat(81),
        "y".repeat(80),
        "third".into(),
        "fourth".into(),
    ]);
    let out = enforce_limits(vec![Section::new(SectionType::Tips, "Tips", vec![item])]);
    let subs = &out[0].items[0].sub_items;
    assert_eq!(subs.len(), 3);
    assert_eq!(subs[0], format!("{}{ELLIPSIS}", "y".repeat(77)));
    assert_eq!(subs[1], "y".repeat(80));
    assert_eq!(subs[2], "third");
}

#[test]
fn truncation_counts_characters_not_bytes() {
    let text = "é".repeat(120);
    let cut = truncate_text(&text, 100);
    assert_eq!(cut.chars().count(), 100);
    assert!(cut.starts_with(&"é".repeat(97)));
}

#[test]
fn first_six_items_survive_in_order() {
    let out = enforce_limits(vec![section(SectionType::QuickReference, "Key Concepts", 7)]);
    let texts: Vec<&str> = out[0].items.iter().map(|i| i.text.as_str()).collect();
    assert_eq!(
        texts,
        [
            "Key Concepts 1",
            "Key Concepts 2",
            "Key Concepts 3",
            "Key Concepts 4",
            "Key Concepts 5",
            "Key Concepts 6",
        ]
    );
}

/// With six sections allowed, 6 x 6 = 36 items exceed the global budget of 30.
fn wide_limits() -> Limits {
    Limits {
        max_sections: 6,
        ..Limits::default()
    }
}

#[test]
fn global_trim_only_touches_lowest_priority_sections() {
    let input = vec![
        section(SectionType::QuickReference, "A", 7),
        section(SectionType::StepByStep, "B", 7),
        section(SectionType::Comparison, "C", 7),
        section(SectionType::Tips, "D", 7),
        section(SectionType::KeyTakeaways, "E", 7),
        section(SectionType::Glossary, "F", 7),
    ];
    let out = normalize_sections(input, &wide_limits());

    let total: usize = out.iter().map(|s| s.items.len()).sum();
    assert!(total <= 30);
    for s in &out[..4] {
        assert_eq!(s.items.len(), 6, "section {} was trimmed", s.title);
    }
    // Glossary is cut to 3 first, then removed; key takeaways still fits at 6.
    let titles: Vec<&str> = out.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["A", "B", "C", "D", "E"]);
    assert_eq!(total, 30);
}

#[test]
fn global_trim_cuts_last_section_to_three_before_dropping() {
    let input = vec![
        section(SectionType::QuickReference, "A", 6),
        section(SectionType::StepByStep, "B", 6),
        section(SectionType::Comparison, "C", 6),
        section(SectionType::Tips, "D", 6),
        section(SectionType::KeyTakeaways, "E", 6),
    ];
    let limits = Limits {
        max_total_items: 27,
        ..wide_limits()
    };
    let out = normalize_sections(input, &limits);
    assert_eq!(out.len(), 5);
    assert_eq!(out[4].items.len(), 3);
    assert_eq!(out[4].items[2].text, "E 3");
}

#[test]
fn global_trim_never_removes_the_only_section() {
    let limits = Limits {
        max_total_items: 2,
        ..Limits::default()
    };
    let out = normalize_sections(vec![section(SectionType::Tips, "Only", 6)], &limits);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].items.len(), 6);
}

#[test]
fn empty_outline_stays_empty() {
    assert!(enforce_limits(Vec::new()).is_empty());
    let out = normalize(&outline(Vec::new()));
    assert!(out.sections.is_empty());
    assert_eq!(out.title, "Test Sheet");
}

#[test]
fn cover_metadata_is_preserved() {
    let mut input = outline(vec![section(SectionType::Tips, "Tips", 9)]);
    input.subtitle = Some("Module 2".into());
    input.footer = Some("Example Academy".into());
    let out = normalize(&input);
    assert_eq!(out.subtitle.as_deref(), Some("Module 2"));
    assert_eq!(out.footer.as_deref(), Some("Example Academy"));
    assert_eq!(out.sections[0].items.len(), 6);
}

fn arb_section_type() -> impl Strategy<Value = SectionType> {
    prop::sample::select(SectionType::ALL.to_vec())
}

fn arb_text(max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            prop::char::range('a', 'z'),
            Just(' '),
            Just('é'),
            Just('\u{1F600}'),
        ],
        0..max,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

fn arb_item() -> impl Strategy<Value = Item> {
    (
        arb_text(160),
        prop::collection::vec(arb_text(120), 0..6),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(text, sub_items, is_tip, is_warning)| Item {
            text,
            sub_items,
            is_tip,
            is_warning,
        })
}

fn arb_sections() -> impl Strategy<Value = Vec<Section>> {
    prop::collection::vec(
        (
            arb_section_type(),
            0usize..1000,
            prop::collection::vec(arb_item(), 0..12),
        )
            .prop_map(|(t, id, items)| Section::new(t, format!("S{id}"), items)),
        0..12,
    )
}

proptest! {
    #[test]
    fn prop_output_is_within_budget(sections in arb_sections()) {
        let out = enforce_limits(sections);
        prop_assert!(out.len() <= 4);
        prop_assert!(out.iter().map(|s| s.items.len()).sum::<usize>() <= 30);
        for s in &out {
            prop_assert!(s.items.len() <= 6);
            for item in &s.items {
                prop_assert!(item.text.chars().count() <= 100);
                prop_assert!(item.sub_items.len() <= 3);
                for sub in &item.sub_items {
                    prop_assert!(sub.chars().count() <= 80);
                }
            }
        }
    }

    #[test]
    fn prop_priorities_never_increase(sections in arb_sections()) {
        let out = enforce_limits(sections);
        for pair in out.windows(2) {
            prop_assert!(pair[0].section_type.priority() >= pair[1].section_type.priority());
        }
    }

    #[test]
    fn prop_kept_items_are_a_truncated_prefix(sections in arb_sections()) {
        let indexed: Vec<Section> = sections
            .into_iter()
            .enumerate()
            .map(|(i, mut s)| {
                s.title = format!("{i}");
                s
            })
            .collect();
        let out = enforce_limits(indexed.clone());
        for s in &out {
            let Ok(idx) = s.title.parse::<usize>() else {
                panic!("unexpected title {}", s.title);
            };
            let original = &indexed[idx];
            for (kept, orig) in s.items.iter().zip(&original.items) {
                prop_assert_eq!(&kept.text, &truncate_text(&orig.text, 100));
                prop_assert_eq!(kept.is_tip, orig.is_tip);
                prop_assert_eq!(kept.is_warning, orig.is_warning);
            }
        }
        // Equal priorities keep their input order.
        for pair in out.windows(2) {
            if pair[0].section_type.priority() == pair[1].section_type.priority() {
                let a: usize = pair[0].title.parse().unwrap_or(0);
                let b: usize = pair[1].title.parse().unwrap_or(0);
                prop_assert!(a < b);
            }
        }
    }

    #[test]
    fn prop_normalizing_twice_changes_nothing(sections in arb_sections()) {
        let once = enforce_limits(sections);
        let twice = enforce_limits(once.clone());
        prop_assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );
    }

    #[test]
    fn prop_global_trim_is_idempotent_with_wide_limits(sections in arb_sections()) {
        let limits = wide_limits();
        let once = normalize_sections(sections, &limits);
        prop_assert!(once.iter().map(|s| s.items.len()).sum::<usize>() <= 30 || once.len() == 1);
        let twice = normalize_sections(once.clone(), &limits);
        prop_assert_eq!(once, twice);
    }
}
