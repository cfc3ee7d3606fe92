mod common;

use cheatsheet_pdf::style::FontChoice;
use cheatsheet_pdf::{
    Error, Item, MIME_TYPE, Section, SectionType, Style, convert_outline_file, generate,
    generate_from_json,
};

use common::{PdfInspector, adversarial_outline, outline, section};

#[test]
fn key_concepts_and_pro_tips() {
    let _ = env_logger::try_init();
    let input = outline(vec![
        section(SectionType::QuickReference, "Key Concepts", 7),
        section(SectionType::Tips, "Pro Tips", 3),
    ]);

    let doc = generate(&input, &Style::default()).expect("render");
    assert!(doc.page_count >= 1);
    assert!(doc.byte_size > 0);
    assert_eq!(doc.byte_size, doc.bytes.len());

    let pdf = PdfInspector::new(&doc.bytes);
    assert!(pdf.has_header());
    assert!(pdf.has_trailer());
    assert_eq!(pdf.page_count(), doc.page_count);

    let text = pdf.page_text();
    assert!(text.contains("(Key Concepts 6)"));
    assert!(!text.contains("(Key Concepts 7)"), "seventh item should be trimmed");
    assert!(text.contains("(Pro Tips 3)"));
    assert!(text.contains(&format!("(Page 2 of {})", doc.page_count)));
}

#[test]
fn metadata_serializes_in_camel_case() {
    let doc = generate(
        &outline(vec![section(SectionType::Glossary, "Terms", 2)]),
        &Style::default(),
    )
    .expect("render");
    let json = serde_json::to_value(doc.metadata()).expect("json");
    assert_eq!(json["pageCount"], doc.page_count);
    assert_eq!(json["byteSize"], doc.byte_size);
    assert_eq!(MIME_TYPE, "application/pdf");
}

#[test]
fn renders_callouts_and_footer_text() {
    let mut warning = Item::new("Never clip the master bus");
    warning.is_warning = true;
    let mut tip = Item::new("Use reference tracks");
    tip.is_tip = true;
    let mut input = outline(vec![Section::new(
        SectionType::Tips,
        "Mix Tips",
        vec![warning, tip],
    )]);
    input.footer = Some("Example Academy".into());

    let doc = generate(&input, &Style::default()).expect("render");
    let text = PdfInspector::new(&doc.bytes).page_text();
    assert!(text.contains("(WARNING)"));
    assert!(text.contains("(TIP)"));
    assert!(text.contains("(Example Academy)"));
}

#[test]
fn document_info_carries_title() {
    let mut input = outline(vec![section(SectionType::Tips, "Tips", 1)]);
    input.title = "Mixing Basics".into();
    input.subtitle = Some("Module 1".into());
    let doc = generate(&input, &Style::default()).expect("render");
    let pdf = PdfInspector::new(&doc.bytes);
    assert!(pdf.contains(b"/Title (Mixing Basics)"));
    assert!(pdf.contains(b"/Subject (Module 1)"));
    assert!(pdf.contains(b"/BaseFont /Helvetica-Bold"));
}

#[test]
fn worst_case_renders_within_ceiling() {
    let doc = generate(&adversarial_outline(), &Style::default()).expect("render");
    assert!(doc.page_count <= 10);
    assert_eq!(PdfInspector::new(&doc.bytes).page_count(), doc.page_count);
}

#[test]
fn toc_adds_a_page() {
    let input = outline(vec![
        section(SectionType::QuickReference, "Basics", 2),
        section(SectionType::Tips, "Tips", 2),
    ]);
    let plain = generate(&input, &Style::default()).expect("render");
    let with_toc = generate(
        &input,
        &Style {
            table_of_contents: true,
            ..Style::default()
        },
    )
    .expect("render");
    assert_eq!(with_toc.page_count, plain.page_count + 1);
    assert!(PdfInspector::new(&with_toc.bytes).page_text().contains("(Contents)"));
}

#[test]
fn json_input_goes_through_ingest() {
    let json = r#"```json
    {"title": "From JSON", "sections": [
      {"heading": "Steps", "type": "step_by_step", "items": [{"text": "First"}, {"text": "Second"}]}
    ]}
    ```"#;
    let doc = generate_from_json(json, &Style::default()).expect("render");
    let text = PdfInspector::new(&doc.bytes).page_text();
    assert!(text.contains("(1.)"));
    assert!(text.contains("(Second)"));
}

#[test]
fn invalid_json_is_a_validation_error() {
    let err = generate_from_json("{\"title\": \"no sections\"}", &Style::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidOutline(_)));
}

#[test]
fn unreadable_explicit_font_is_a_render_error() {
    let style = Style {
        fonts: FontChoice {
            regular_file: Some("/definitely/not/here.ttf".into()),
            ..FontChoice::default()
        },
        ..Style::default()
    };
    let err = generate(&outline(vec![section(SectionType::Tips, "Tips", 1)]), &style).unwrap_err();
    assert!(matches!(err, Error::Render(_)), "got {err:?}");
}

#[test]
fn garbage_explicit_font_is_a_render_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let font = dir.path().join("broken.ttf");
    std::fs::write(&font, b"not a font").expect("write");
    let style = Style {
        fonts: FontChoice {
            bold_file: Some(font),
            ..FontChoice::default()
        },
        ..Style::default()
    };
    let err = generate(&outline(vec![section(SectionType::Tips, "Tips", 1)]), &style).unwrap_err();
    assert!(matches!(err, Error::Render(_)));
}

#[test]
fn unknown_family_falls_back_to_helvetica() {
    let style = Style {
        fonts: FontChoice {
            regular: "No Such Family 12345".into(),
            ..FontChoice::default()
        },
        ..Style::default()
    };
    let doc = generate(&outline(vec![section(SectionType::Tips, "Tips", 1)]), &style)
        .expect("fallback render");
    assert!(PdfInspector::new(&doc.bytes).contains(b"/BaseFont /Helvetica"));
}

#[test]
fn converts_file_to_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("outline.json");
    let output = dir.path().join("sheet.pdf");
    std::fs::write(
        &input,
        r#"{"title": "File", "sections": [{"title": "A", "type": "tips", "items": ["one"]}]}"#,
    )
    .expect("write");

    let meta = convert_outline_file(&input, &output, &Style::default()).expect("convert");
    let bytes = std::fs::read(&output).expect("read");
    assert_eq!(meta.byte_size, bytes.len());
    assert_eq!(PdfInspector::new(&bytes).page_count(), meta.page_count);
}

#[test]
fn missing_input_file_names_the_path() {
    let err = convert_outline_file(
        std::path::Path::new("/no/such/outline.json"),
        std::path::Path::new("/tmp/unused.pdf"),
        &Style::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(err.to_string().contains("/no/such/outline.json"));
}

#[test]
fn explicit_truetype_is_embedded_as_type0() {
    let Some((regular, bold)) = common::dejavu_sans() else {
        eprintln!("DejaVu Sans not found, skipping");
        return;
    };
    let style = Style {
        fonts: FontChoice {
            regular_file: Some(regular),
            bold_file: Some(bold),
            ..FontChoice::default()
        },
        ..Style::default()
    };
    let mut input = outline(vec![Section::new(
        SectionType::QuickReference,
        "Checks",
        vec![Item::new("Gain staged \u{2713}")],
    )]);
    input.title = "Embedded Fonts".into();

    let doc = generate(&input, &style).expect("render");
    let pdf = PdfInspector::new(&doc.bytes);
    assert!(pdf.contains(b"/Subtype /Type0"));
    assert!(pdf.contains(b"/Identity-H"));
    assert!(pdf.contains(b"/ToUnicode"));
    assert!(pdf.contains(b"/FontFile2"));
    // The check mark has no WinAnsi code; it is kept as a glyph id mapped back to U+2713.
    assert!(pdf.contains(b"<2713>"));
    assert!(!pdf.contains(b"/BaseFont /Helvetica"));

    let worst = generate(&adversarial_outline(), &style).expect("render worst case");
    assert!(worst.page_count <= 10, "{} pages", worst.page_count);
}
