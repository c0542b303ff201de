//! Integration tests for the computed-style record.

use folio_style::{
    AutoLength, ComputedStyle, Display, Float, LengthValue, Position, Sides, TextAlign, ZIndex,
    parse_keyword,
};

#[test]
fn test_initial_values() {
    let style = ComputedStyle::default();
    assert_eq!(style.display, Display::Block);
    assert_eq!(style.position, Position::Static);
    assert_eq!(style.float, Float::None);
    assert_eq!(style.z_index, ZIndex::Auto);
    assert!(style.width.is_auto());
    assert_eq!(style.margin, Sides::all(AutoLength::px(0.0)));
    assert!(style.inset.left.is_auto());
    assert!((style.opacity - 1.0).abs() < f32::EPSILON);
}

#[test]
fn test_partial_json_fills_initial_values() {
    let json = r#"{
        "display": "inline-block",
        "position": "absolute",
        "z_index": { "Integer": -1 },
        "width": { "Length": { "Percent": 50.0 } },
        "text_align": "justify"
    }"#;
    let style: ComputedStyle = serde_json::from_str(json).unwrap();
    assert_eq!(style.display, Display::InlineBlock);
    assert_eq!(style.position, Position::Absolute);
    assert_eq!(style.z_index, ZIndex::Integer(-1));
    assert_eq!(style.width, AutoLength::Length(LengthValue::Percent(50.0)));
    assert_eq!(style.text_align, TextAlign::Justify);
    assert_eq!(style.float, Float::None);
}

#[test]
fn test_text_inherits_font_and_alignment_only() {
    let parent = ComputedStyle {
        text_align: TextAlign::Justify,
        font_size: 24.0,
        width: AutoLength::px(300.0),
        ..ComputedStyle::default()
    };
    let text = ComputedStyle::inherit_for_text(&parent);
    assert_eq!(text.display, Display::Inline);
    assert_eq!(text.text_align, TextAlign::Justify);
    assert!((text.font_size - 24.0).abs() < f32::EPSILON);
    assert!(text.width.is_auto());
}

#[test]
fn test_unknown_keyword_falls_back() {
    let float = parse_keyword::<Float>("float", "center").unwrap_or_default();
    assert_eq!(float, Float::None);
    assert_eq!(parse_keyword::<Float>("float", "inline-end"), Some(Float::InlineEnd));
}
