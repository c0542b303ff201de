//! Inline justification adjustment.
//!
//! [CSS Text 3 § 7.1 Text alignment](https://www.w3.org/TR/css-text-3/#text-align-property)
//!
//! "justify: Text is justified according to the method specified by the
//! text-justify property, in order to exactly fill the line box."
//!
//! The line builder already stretches justified lines by giving each run
//! extra word spacing. This pass runs over the finished tree and fixes what
//! the builder cannot see: a line may start with whitespace-only runs (from
//! inline element boundaries) whose width should have gone into the
//! inter-word gaps, and runs coming from different text boxes may leave
//! small gaps or overlaps between each other. Each justified line is
//! re-walked left to right so that every run starts where the previous one
//! ended.
//!
//! Running the pass twice changes nothing.

use std::collections::BTreeMap;

use folio_style::{Display, TextAlign};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::box_model::is_block_container;
use crate::tree::{LayoutTree, NodeId, NodeKind};

/// Font attributes of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontAttrs {
    /// Font size in px.
    pub size: f32,
    /// Weight, 100..=900.
    pub weight: u16,
    /// Italic or oblique.
    pub italic: bool,
}

impl Default for FontAttrs {
    fn default() -> Self {
        Self {
            size: folio_style::DEFAULT_FONT_SIZE_PX,
            weight: 400,
            italic: false,
        }
    }
}

/// Affine text matrix `[a b c d e f]`; `(e, f)` is the pen position, with
/// `f` on the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineMatrix {
    /// Horizontal scale.
    pub a: f32,
    /// Vertical shear.
    pub b: f32,
    /// Horizontal shear.
    pub c: f32,
    /// Vertical scale.
    pub d: f32,
    /// Pen x.
    pub e: f32,
    /// Pen y (baseline).
    pub f: f32,
}

impl Default for LineMatrix {
    fn default() -> Self {
        Self::translation(0.0, 0.0)
    }
}

impl LineMatrix {
    /// Identity transform with the pen at `(x, y)`.
    #[must_use]
    pub const fn translation(x: f32, y: f32) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: x,
            f: y,
        }
    }

    /// Pen position.
    #[must_use]
    pub const fn pen(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    /// Move the pen.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.e += dx;
        self.f += dy;
    }
}

/// A horizontal run of text sharing one font, placed on one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// The text, with whitespace already collapsed.
    pub text: String,
    /// Font attributes.
    pub font: FontAttrs,
    /// Pen matrix.
    pub matrix: LineMatrix,
    /// Horizontal advance including any word spacing.
    pub advance: f32,
    /// Index of the line inside its block container.
    pub line_index: Option<usize>,
    /// Set on runs of the final line of a paragraph.
    pub last_line: bool,
    /// Inter-word spaces in `text`; counted from `text` when absent.
    pub space_count: Option<usize>,
    /// Extra advance per space.
    pub word_spacing: Option<f32>,
}

impl Run {
    /// A run with its pen at `(x, baseline)` and no line information.
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        font: FontAttrs,
        x: f32,
        baseline: f32,
        advance: f32,
    ) -> Self {
        Self {
            text: text.into(),
            font,
            matrix: LineMatrix::translation(x, baseline),
            advance,
            line_index: None,
            last_line: false,
            space_count: None,
            word_spacing: None,
        }
    }

    /// Pen x.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.matrix.e
    }

    /// Baseline y.
    #[must_use]
    pub const fn baseline(&self) -> f32 {
        self.matrix.f
    }

    /// True when the run contains only whitespace.
    #[must_use]
    pub fn is_whitespace_only(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(char::is_whitespace)
    }

    /// Number of spaces word spacing applies to.
    #[must_use]
    pub fn spaces(&self) -> usize {
        self.space_count
            .unwrap_or_else(|| self.text.chars().filter(|&c| c == ' ').count())
    }

    /// Widen every space of the run by `extra`.
    pub fn add_word_spacing(&mut self, extra: f32) {
        let spaces = self.spaces();
        if spaces == 0 {
            return;
        }
        self.word_spacing = Some(self.word_spacing.unwrap_or(0.0) + extra);
        #[allow(clippy::cast_precision_loss)]
        let widened = extra * spaces as f32;
        self.advance += widened;
    }
}

/// Counts from one adjustment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct JustifyStats {
    /// Lines that were re-walked.
    pub lines_adjusted: usize,
    /// Justified lines left alone (last lines, lines without spaces).
    pub lines_skipped: usize,
}

#[derive(Debug, Clone, Copy)]
struct RunRef {
    node: NodeId,
    index: usize,
}

/// Adjust every justified line of the tree in place.
pub fn justify_tree(tree: &mut LayoutTree) -> JustifyStats {
    let mut stats = JustifyStats::default();
    for id in tree.document_order() {
        if tree[id].style.text_align != TextAlign::Justify || !is_block_container(tree, id) {
            continue;
        }
        let mut lines: BTreeMap<usize, Vec<RunRef>> = BTreeMap::new();
        for run in collect_runs(tree, id) {
            if let Some(line) = run_at(tree, run).and_then(|r| r.line_index) {
                lines.entry(line).or_default().push(run);
            }
        }
        for (line, mut refs) in lines {
            // Stable: runs at the same x keep document order.
            refs.sort_by(|a, b| x_of(tree, *a).total_cmp(&x_of(tree, *b)));
            if adjust_line(tree, &refs) {
                trace!(node = id.0, line, runs = refs.len(), "justified line");
                stats.lines_adjusted += 1;
            } else {
                stats.lines_skipped += 1;
            }
        }
    }
    stats
}

/// Runs inside `container`'s own inline formatting context: text children
/// and, recursively, text inside inline boxes. Nested block containers lay
/// out their own lines and are skipped.
fn collect_runs(tree: &LayoutTree, container: NodeId) -> Vec<RunRef> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = tree.children(container).iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        let node = &tree[id];
        match node.kind {
            NodeKind::Text(_) => {
                out.extend((0..node.runs().len()).map(|index| RunRef { node: id, index }));
            }
            NodeKind::Element(_) if node.style.display == Display::Inline => {
                stack.extend(tree.children(id).iter().rev().copied());
            }
            _ => {}
        }
    }
    out
}

fn run_at(tree: &LayoutTree, r: RunRef) -> Option<&Run> {
    tree.get(r.node).and_then(|n| n.runs().get(r.index))
}

fn run_at_mut(tree: &mut LayoutTree, r: RunRef) -> Option<&mut Run> {
    tree.get_mut(r.node).and_then(|n| n.runs_mut().get_mut(r.index))
}

fn x_of(tree: &LayoutTree, r: RunRef) -> f32 {
    run_at(tree, r).map_or(0.0, Run::x)
}

/// Adjust one line; `refs` is sorted by pen x. Returns false when the line
/// is skipped.
fn adjust_line(tree: &mut LayoutTree, refs: &[RunRef]) -> bool {
    let runs: Vec<&Run> = refs.iter().filter_map(|&r| run_at(tree, r)).collect();
    if runs.is_empty() || runs.iter().any(|r| r.last_line) {
        return false;
    }
    let leading = runs.iter().take_while(|r| r.is_whitespace_only()).count();
    let spaces: usize = runs[leading..].iter().map(|r| r.spaces()).sum();
    if spaces == 0 {
        return false;
    }
    let start_x = runs[0].x();

    // STEP 1: fold leading whitespace into the budget.
    let mut budget = 0.0_f32;
    for &r in &refs[..leading] {
        if let Some(run) = run_at_mut(tree, r) {
            budget += run.advance;
            run.advance = 0.0;
            run.space_count = Some(0);
        }
    }

    // STEP 2: spread the budget over the inter-word spaces.
    if budget > 0.0 {
        #[allow(clippy::cast_precision_loss)]
        let per_space = budget / spaces as f32;
        for &r in &refs[leading..] {
            if let Some(run) = run_at_mut(tree, r) {
                run.add_word_spacing(per_space);
            }
        }
    }

    // STEP 3: collapse the folded whitespace onto the line start.
    for &r in &refs[..leading] {
        if let Some(run) = run_at_mut(tree, r) {
            run.matrix.e = start_x;
        }
    }

    // STEP 4: re-walk the words. A gap wider than the larger neighbouring
    // font size is a deliberate gap (a float or an inline box edge) and is
    // kept. The first word follows folded whitespace directly.
    let mut cursor = start_x;
    let mut prev_size: Option<f32> = None;
    for &r in &refs[leading..] {
        if let Some(run) = run_at_mut(tree, r) {
            let gap = run.x() - cursor;
            let limit = prev_size.map_or(run.font.size, |p| p.max(run.font.size));
            if gap > limit && (prev_size.is_some() || leading == 0) {
                cursor = run.x();
            } else {
                run.matrix.e = cursor;
            }
            cursor += run.advance;
            prev_size = Some(run.font.size);
        }
    }
    true
}
