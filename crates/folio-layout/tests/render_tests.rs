//! End-to-end tests for the render pipeline and its configuration.

use folio_common::logging::{LogConfig, init_logging};
use folio_layout::counters::counter_text;
use folio_layout::{
    ApproximateFontMetrics, CounterStyle, LayoutConfig, LayoutError, LayoutTree, render_document,
};
use folio_style::{AutoLength, ComputedStyle};

fn block(height: f32) -> ComputedStyle {
    ComputedStyle {
        height: AutoLength::px(height),
        ..ComputedStyle::default()
    }
}

fn five_blocks() -> LayoutTree {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    for _ in 0..5 {
        let _ = tree.append_element(tree.root(), "div", block(50.0));
    }
    tree
}

#[test]
fn test_config_json_round_trip() {
    let config = LayoutConfig {
        viewport_width: 612.0,
        page_height: Some(792.0),
        page_margin_top: 36.0,
        justify: false,
        ..LayoutConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: LayoutConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    let empty: LayoutConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, LayoutConfig::default());
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut tree = five_blocks();
    let config = LayoutConfig {
        page_height: Some(0.0),
        ..LayoutConfig::default()
    };
    let err = render_document(&mut tree, &config, &ApproximateFontMetrics).unwrap_err();
    assert_eq!(err, LayoutError::InvalidPageHeight(0.0));
    assert_eq!(err.to_string(), "invalid page height: 0");

    let config = LayoutConfig {
        viewport_width: f32::NAN,
        ..LayoutConfig::default()
    };
    assert!(matches!(
        render_document(&mut tree, &config, &ApproximateFontMetrics),
        Err(LayoutError::InvalidViewport { .. })
    ));
}

#[test]
fn test_render_document_paginates() {
    let _ = init_logging(&LogConfig::test());
    let mut tree = five_blocks();
    let config = LayoutConfig {
        page_height: Some(120.0),
        ..LayoutConfig::default()
    };
    let output = render_document(&mut tree, &config, &ApproximateFontMetrics).unwrap();

    assert_eq!(output.pages.len(), 3);
    assert_eq!(output.diagnostics.pages, 3);
    assert_eq!(output.diagnostics.boxes_laid_out, 6);
    assert_eq!(output.paint_order.len(), tree.len());
    for page in &output.pages {
        assert_eq!(page.paint_order.first(), Some(&tree.root()));
    }
    // The third block, [100, 150], straddles the first page break.
    let third = tree.children(tree.root())[2];
    assert!(output.pages[0].contains(third) && output.pages[1].contains(third));
}

#[test]
fn test_page_margins_shrink_the_band() {
    let mut tree = five_blocks();
    let config = LayoutConfig {
        page_height: Some(100.0),
        page_margin_top: 10.0,
        page_margin_bottom: 10.0,
        ..LayoutConfig::default()
    };
    let output = render_document(&mut tree, &config, &ApproximateFontMetrics).unwrap();

    // 250px of content in 80px bands.
    assert_eq!(output.pages.len(), 4);
    assert!((output.geometry.usable_height() - 80.0).abs() < f32::EPSILON);
}

#[test]
fn test_render_boxes_snapshot() {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let p = tree.append_element(tree.root(), "p", ComputedStyle::default());
    let _ = tree.append_text(p, "hello world");
    let output =
        render_document(&mut tree, &LayoutConfig::default(), &ApproximateFontMetrics).unwrap();

    let boxes = output.render_boxes(&tree, 0);
    assert_eq!(boxes.len(), tree.len());
    assert_eq!(boxes[0].node, tree.root());
    assert_eq!(boxes[2].runs.len(), 1);
    assert!(output.render_boxes(&tree, 7).is_empty());

    let json = serde_json::to_value(&output.pages).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(1));
}

#[test]
fn test_counters_survive_the_render() {
    let mut tree = LayoutTree::new(ComputedStyle {
        counter_reset: Some("figure 4".to_string()),
        ..ComputedStyle::default()
    });
    let figure = tree.append_element(tree.root(), "figure", ComputedStyle {
        counter_increment: Some("figure".to_string()),
        ..ComputedStyle::default()
    });
    let output =
        render_document(&mut tree, &LayoutConfig::default(), &ApproximateFontMetrics).unwrap();

    assert_eq!(
        counter_text(&tree, &output.counters, figure, "figure", CounterStyle::Decimal),
        "5"
    );
}

#[test]
fn test_independent_renders() {
    let mut first = five_blocks();
    let mut second = five_blocks();
    let narrow = LayoutConfig {
        viewport_width: 200.0,
        ..LayoutConfig::default()
    };
    let a = render_document(&mut first, &narrow, &ApproximateFontMetrics).unwrap();
    let b =
        render_document(&mut second, &LayoutConfig::default(), &ApproximateFontMetrics).unwrap();

    assert_eq!(a.diagnostics, b.diagnostics);
    let child = first.children(first.root())[0];
    assert!((first[child].dimensions.content.width - 200.0).abs() < f32::EPSILON);
    assert!((second[child].dimensions.content.width - 800.0).abs() < f32::EPSILON);
}
