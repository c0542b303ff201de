//! Tests for stacking contexts and paint order.

use folio_layout::stacking::{StackingContextId, creates_stacking_context};
use folio_layout::{LayoutTree, NodeId, build_stacking_tree, resolve_paint_order};
use folio_style::{ComputedStyle, Isolation, Position, ZIndex};

fn positioned(position: Position, z: Option<i32>) -> ComputedStyle {
    ComputedStyle {
        position,
        z_index: z.map_or(ZIndex::Auto, ZIndex::Integer),
        ..ComputedStyle::default()
    }
}

#[test]
fn test_negative_then_flow_then_positive() {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let root = tree.root();
    let a = tree.append_element(root, "div", ComputedStyle::default());
    let b = tree.append_element(root, "div", positioned(Position::Absolute, Some(-1)));
    let c = tree.append_element(root, "div", positioned(Position::Absolute, Some(5)));

    assert_eq!(resolve_paint_order(&tree), vec![root, b, a, c]);
}

#[test]
fn test_equal_levels_keep_document_order() {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let root = tree.root();
    let first = tree.append_element(root, "div", positioned(Position::Relative, Some(1)));
    let second = tree.append_element(root, "div", positioned(Position::Relative, Some(1)));
    let lower = tree.append_element(root, "div", positioned(Position::Relative, Some(0)));

    assert_eq!(resolve_paint_order(&tree), vec![root, lower, first, second]);
}

#[test]
fn test_child_context_paints_atomically() {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let root = tree.root();
    let x = tree.append_element(root, "div", positioned(Position::Relative, Some(1)));
    let x_child = tree.append_element(x, "div", positioned(Position::Relative, Some(100)));
    let x_text = tree.append_text(x_child, "inside");
    let y = tree.append_element(root, "div", positioned(Position::Relative, Some(2)));

    // z-index 100 only orders x_child inside x's context.
    assert_eq!(resolve_paint_order(&tree), vec![root, x, x_child, x_text, y]);
}

#[test]
fn test_negative_child_paints_above_its_context_anchor() {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let root = tree.root();
    let ctx = tree.append_element(root, "div", positioned(Position::Relative, Some(0)));
    let below = tree.append_element(ctx, "div", positioned(Position::Absolute, Some(-5)));
    let flow = tree.append_element(ctx, "p", ComputedStyle::default());

    assert_eq!(resolve_paint_order(&tree), vec![root, ctx, below, flow]);
}

#[test]
fn test_auto_z_positioned_boxes_paint_in_flow_order() {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let root = tree.root();
    let rel = tree.append_element(root, "div", positioned(Position::Relative, None));
    let nested = tree.append_element(rel, "div", positioned(Position::Absolute, Some(-1)));
    let plain = tree.append_element(root, "div", ComputedStyle::default());

    // rel does not form a context, so nested belongs to the root context.
    assert_eq!(resolve_paint_order(&tree), vec![root, nested, rel, plain]);
    let stacking = build_stacking_tree(&tree);
    assert_eq!(stacking.anchored_by(rel), None);
    assert_eq!(
        stacking.get(stacking.anchored_by(nested).unwrap()).unwrap().parent,
        Some(StackingContextId::ROOT)
    );
}

#[test]
fn test_opacity_context_paints_at_level_zero() {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let root = tree.root();
    let faded = tree.append_element(root, "div", ComputedStyle {
        opacity: 0.5,
        ..ComputedStyle::default()
    });
    let plain = tree.append_element(root, "div", ComputedStyle::default());

    assert_eq!(resolve_paint_order(&tree), vec![root, plain, faded]);
}

#[test]
fn test_z_index_ignored_on_static_context() {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let root = tree.root();
    let plain = tree.append_element(root, "div", ComputedStyle::default());
    let faded = tree.append_element(root, "div", ComputedStyle {
        opacity: 0.5,
        z_index: ZIndex::Integer(-1),
        ..ComputedStyle::default()
    });

    assert_eq!(resolve_paint_order(&tree), vec![root, plain, faded]);
    let stacking = build_stacking_tree(&tree);
    let context = stacking.anchored_by(faded).and_then(|id| stacking.get(id)).unwrap();
    assert_eq!(context.z, 0);
}

#[test]
fn test_stacking_context_triggers() {
    assert!(!creates_stacking_context(&ComputedStyle::default()));
    assert!(!creates_stacking_context(&positioned(Position::Relative, None)));
    assert!(!creates_stacking_context(&positioned(Position::Static, Some(3))));
    assert!(creates_stacking_context(&positioned(Position::Relative, Some(0))));
    assert!(creates_stacking_context(&positioned(Position::Fixed, None)));
    assert!(creates_stacking_context(&positioned(Position::Sticky, None)));
    assert!(creates_stacking_context(&ComputedStyle {
        has_transform: true,
        ..ComputedStyle::default()
    }));
    assert!(creates_stacking_context(&ComputedStyle {
        isolation: Isolation::Isolate,
        ..ComputedStyle::default()
    }));
}

#[test]
fn test_every_box_painted_once() {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let root = tree.root();
    let mut parent = root;
    for depth in 0..20 {
        let z = if depth % 3 == 0 { Some(depth - 10) } else { None };
        parent = tree.append_element(parent, "div", positioned(Position::Relative, z));
        let _ = tree.append_text(parent, "t");
    }
    let mut order = resolve_paint_order(&tree);
    assert_eq!(order.len(), tree.len());
    order.sort_by_key(|id| id.0);
    let all: Vec<NodeId> = (0..tree.len()).map(NodeId).collect();
    assert_eq!(order, all);
}
