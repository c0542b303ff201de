//! Tests for the justification adjuster.

use folio_layout::{
    ApproximateFontMetrics, FontAttrs, LayoutConfig, LayoutTree, NodeId, NodePayload, Run,
    justify_tree, render_document,
};
use folio_style::{ComputedStyle, TextAlign};

fn justified_root() -> LayoutTree {
    LayoutTree::new(ComputedStyle {
        text_align: TextAlign::Justify,
        ..ComputedStyle::default()
    })
}

fn run(text: &str, x: f32, advance: f32, line: usize) -> Run {
    let mut run = Run::new(text, FontAttrs::default(), x, 20.0, advance);
    run.line_index = Some(line);
    run
}

fn text_with_runs(tree: &mut LayoutTree, parent: NodeId, runs: Vec<Run>) -> NodeId {
    let text: String = runs.iter().map(|r| r.text.as_str()).collect();
    let id = tree.append_text(parent, &text);
    tree.set_payload(id, NodePayload::Runs(runs));
    id
}

fn xs(tree: &LayoutTree, ids: &[NodeId]) -> Vec<f32> {
    ids.iter()
        .flat_map(|&id| tree[id].runs().iter().map(Run::x))
        .collect()
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}

#[test]
fn test_aligned_line_is_left_alone() {
    let mut tree = justified_root();
    let a = text_with_runs(&mut tree, NodeId::ROOT, vec![run("aaaa bbbb", 0.0, 100.0, 0)]);
    let b = text_with_runs(&mut tree, NodeId::ROOT, vec![run("cccc", 0.0, 38.4, 1)]);
    let before = tree.clone();

    let _ = justify_tree(&mut tree);
    assert_eq!(tree[a].runs(), before[a].runs());
    assert_eq!(tree[b].runs(), before[b].runs());
}

#[test]
fn test_leading_whitespace_is_redistributed() {
    let mut tree = justified_root();
    let lead = text_with_runs(&mut tree, NodeId::ROOT, vec![run(" ", 0.0, 9.6, 0)]);
    let words = text_with_runs(&mut tree, NodeId::ROOT, vec![run("foo bar", 9.6, 67.2, 0)]);
    let tail = text_with_runs(&mut tree, NodeId::ROOT, vec![run(" baz", 76.8, 38.4, 0)]);

    let stats = justify_tree(&mut tree);
    assert_eq!(stats.lines_adjusted, 1);

    assert!(approx(tree[lead].runs()[0].advance, 0.0));
    // 9.6px over two spaces.
    assert_eq!(tree[words].runs()[0].word_spacing, Some(4.8));
    let positions = xs(&tree, &[lead, words, tail]);
    assert!(approx(positions[1], 0.0));
    assert!(approx(positions[2], 72.0));
    let last = &tree[tail].runs()[0];
    assert!(approx(last.x() + last.advance, 115.2));
}

#[test]
fn test_wide_leading_whitespace_is_folded_not_kept_as_a_gap() {
    // Two boundary spaces together are wider than one font size.
    let mut tree = justified_root();
    let outer = text_with_runs(&mut tree, NodeId::ROOT, vec![run(" ", 0.0, 9.6, 0)]);
    let inner = text_with_runs(&mut tree, NodeId::ROOT, vec![run(" ", 9.6, 9.6, 0)]);
    let words = text_with_runs(&mut tree, NodeId::ROOT, vec![run("foo bar", 19.2, 67.2, 0)]);

    let stats = justify_tree(&mut tree);
    assert_eq!(stats.lines_adjusted, 1);
    let word_run = &tree[words].runs()[0];
    assert!(approx(word_run.x(), 0.0));
    assert!(approx(word_run.x() + word_run.advance, 86.4));
    assert!(approx(tree[outer].runs()[0].advance, 0.0));
    assert!(approx(tree[inner].runs()[0].x(), 0.0));
}

#[test]
fn test_adjusting_twice_is_idempotent() {
    let mut tree = justified_root();
    let lead = text_with_runs(&mut tree, NodeId::ROOT, vec![run(" ", 0.0, 9.6, 0)]);
    let words = text_with_runs(
        &mut tree,
        NodeId::ROOT,
        vec![run("foo bar", 9.6, 67.2, 0), run("next", 0.0, 38.4, 1)],
    );

    let _ = justify_tree(&mut tree);
    let once = tree.clone();
    let _ = justify_tree(&mut tree);
    assert_eq!(tree[lead].runs(), once[lead].runs());
    assert_eq!(tree[words].runs(), once[words].runs());
}

#[test]
fn test_small_gaps_close_and_large_gaps_stay() {
    let mut tree = justified_root();
    let first = text_with_runs(&mut tree, NodeId::ROOT, vec![run("a b", 0.0, 28.8, 0)]);
    let near = text_with_runs(&mut tree, NodeId::ROOT, vec![run("c", 30.0, 9.6, 0)]);
    let far = text_with_runs(&mut tree, NodeId::ROOT, vec![run("d", 100.0, 9.6, 0)]);

    let _ = justify_tree(&mut tree);
    let positions = xs(&tree, &[first, near, far]);
    assert!(approx(positions[0], 0.0));
    assert!(approx(positions[1], 28.8));
    assert!(approx(positions[2], 100.0));
}

#[test]
fn test_last_line_and_spaceless_lines_are_skipped() {
    let mut tree = justified_root();
    let mut last = run(" tail end", 5.0, 86.4, 0);
    last.last_line = true;
    let a = text_with_runs(&mut tree, NodeId::ROOT, vec![last]);
    let b = text_with_runs(&mut tree, NodeId::ROOT, vec![run("word", 3.0, 38.4, 1)]);

    let stats = justify_tree(&mut tree);
    assert_eq!(stats.lines_adjusted, 0);
    assert_eq!(stats.lines_skipped, 2);
    assert!(approx(tree[a].runs()[0].x(), 5.0));
    assert!(approx(tree[b].runs()[0].x(), 3.0));
}

#[test]
fn test_runs_inside_inline_boxes_share_the_line() {
    let mut tree = justified_root();
    let first = text_with_runs(&mut tree, NodeId::ROOT, vec![run("one two", 0.0, 67.2, 0)]);
    let span = tree.append_element(tree.root(), "span", ComputedStyle::inline());
    let inner = text_with_runs(&mut tree, span, vec![run(" three", 70.0, 57.6, 0)]);

    let stats = justify_tree(&mut tree);
    assert_eq!(stats.lines_adjusted, 1);
    assert!(approx(tree[first].runs()[0].x(), 0.0));
    assert!(approx(tree[inner].runs()[0].x(), 67.2));
}

#[test]
fn test_laid_out_paragraph_is_stable_under_adjustment() {
    let mut tree = justified_root();
    let text = tree.append_text(tree.root(), "the quick brown fox jumps over the lazy dog");
    let config = LayoutConfig {
        viewport_width: 120.0,
        ..LayoutConfig::default()
    };
    let output = render_document(&mut tree, &config, &ApproximateFontMetrics).unwrap();
    assert!(output.diagnostics.justified_lines > 0);

    let once = tree[text].runs().to_vec();
    let _ = justify_tree(&mut tree);
    assert_eq!(tree[text].runs(), once.as_slice());
    // Every line but the last reaches the right edge.
    for r in once.iter().filter(|r| !r.last_line) {
        assert!(approx(r.x() + r.advance, 120.0), "{r:?}");
    }
}
