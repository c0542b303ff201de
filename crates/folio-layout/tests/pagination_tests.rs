//! Tests for slicing a laid-out tree into pages.

use folio_layout::pagination::page_for_y;
use folio_layout::{
    FontAttrs, LayoutTree, NodeId, NodePayload, Page, PageGeometry, Rect, RenderBox, Run, paginate,
    resolve_paint_order,
};
use folio_style::{ComputedStyle, Position, ZIndex};

const PAGE_HEIGHT: f32 = 400.0;

fn place(tree: &mut LayoutTree, id: NodeId, top: f32, bottom: f32) {
    tree[id].dimensions.content = Rect::new(0.0, top, 100.0, bottom - top);
}

fn pages_of(pages: &[Page], id: NodeId) -> Vec<usize> {
    pages.iter().filter(|p| p.contains(id)).map(|p| p.page_index).collect()
}

#[test]
fn test_box_across_page_boundary_is_on_both_pages() {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let spanning = tree.append_element(tree.root(), "div", ComputedStyle::default());
    let later = tree.append_element(tree.root(), "div", ComputedStyle::default());
    place(&mut tree, spanning, 380.0, 530.0);
    place(&mut tree, later, 620.0, 720.0);

    let order = resolve_paint_order(&tree);
    let pages = paginate(&tree, &order, PAGE_HEIGHT);

    assert_eq!(pages.len(), 2);
    assert_eq!(pages_of(&pages, spanning), vec![0, 1]);
    assert_eq!(pages_of(&pages, later), vec![1]);
    assert!((pages[1].page_offset_y - 400.0).abs() < f32::EPSILON);
}

#[test]
fn test_text_goes_by_baseline() {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let text = tree.append_text(tree.root(), "first second");
    let font = FontAttrs::default();
    tree.set_payload(
        text,
        NodePayload::Runs(vec![
            Run::new("first", font, 0.0, 20.0, 48.0),
            Run::new("second", font, 0.0, 420.0, 57.6),
        ]),
    );
    // Bounds that would put the box on one page only.
    place(&mut tree, text, 0.0, 10.0);

    let order = resolve_paint_order(&tree);
    let pages = paginate(&tree, &order, PAGE_HEIGHT);

    assert_eq!(pages.len(), 2);
    for page in &pages {
        assert!(page.flow_content_order.contains(&text), "page {}", page.page_index);
    }
}

#[test]
fn test_ancestors_follow_their_descendants() {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let section = tree.append_element(tree.root(), "section", ComputedStyle::default());
    let deep = tree.append_element(section, "div", ComputedStyle::default());
    place(&mut tree, section, 0.0, 100.0);
    place(&mut tree, deep, 900.0, 950.0);

    let order = resolve_paint_order(&tree);
    let pages = paginate(&tree, &order, PAGE_HEIGHT);

    assert_eq!(pages.len(), 3);
    assert_eq!(pages_of(&pages, section), vec![0, 2]);
    assert!(pages[2].contains(tree.root()));
    assert!(!pages[1].contains(section));
    assert_eq!(pages[2].flow_content_order, vec![tree.root(), section, deep]);
}

#[test]
fn test_page_paint_order_is_a_subsequence() {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let flow = tree.append_element(tree.root(), "div", ComputedStyle::default());
    let above = tree.append_element(tree.root(), "div", ComputedStyle {
        position: Position::Absolute,
        z_index: ZIndex::Integer(1),
        ..ComputedStyle::default()
    });
    let below = tree.append_element(tree.root(), "div", ComputedStyle {
        position: Position::Absolute,
        z_index: ZIndex::Integer(-1),
        ..ComputedStyle::default()
    });
    place(&mut tree, flow, 0.0, 500.0);
    place(&mut tree, above, 410.0, 420.0);
    place(&mut tree, below, 10.0, 20.0);

    let order = resolve_paint_order(&tree);
    let pages = paginate(&tree, &order, PAGE_HEIGHT);

    assert_eq!(pages[0].paint_order, vec![tree.root(), below, flow]);
    assert_eq!(pages[1].paint_order, vec![tree.root(), flow, above]);
}

#[test]
fn test_empty_document_has_one_page() {
    let tree = LayoutTree::new(ComputedStyle::default());
    let pages = paginate(&tree, &resolve_paint_order(&tree), PAGE_HEIGHT);
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].flow_content_order, vec![tree.root()]);
}

#[test]
fn test_page_for_y() {
    assert_eq!(page_for_y(0.0, PAGE_HEIGHT), 0);
    assert_eq!(page_for_y(399.9, PAGE_HEIGHT), 0);
    assert_eq!(page_for_y(400.0, PAGE_HEIGHT), 1);
    assert_eq!(page_for_y(-30.0, PAGE_HEIGHT), 0);
    assert_eq!(page_for_y(f32::NAN, PAGE_HEIGHT), 0);
}

#[test]
fn test_render_box_remaps_baselines() {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let text = tree.append_text(tree.root(), "x");
    tree.set_payload(
        text,
        NodePayload::Runs(vec![Run::new("x", FontAttrs::default(), 5.0, 360.0, 9.6)]),
    );
    let geometry = PageGeometry {
        page_height: 400.0,
        margin_top: 20.0,
        margin_bottom: 30.0,
    };
    let snapshot = RenderBox::snapshot(&tree, text, &geometry);
    assert!((snapshot.runs[0].baseline() - 430.0).abs() < 0.001);
    assert!((snapshot.runs[0].x() - 5.0).abs() < f32::EPSILON);
    // The tree itself is untouched.
    assert!((tree[text].runs()[0].baseline() - 360.0).abs() < f32::EPSILON);
}
