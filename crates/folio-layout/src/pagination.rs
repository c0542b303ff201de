//! Pagination of a positioned tree.
//!
//! [CSS Paged Media 3 § 3 Page Model](https://www.w3.org/TR/css-page-3/#page-model)
//!
//! "When formatting content in the page model, the content is laid out in
//! one or more page boxes."
//!
//! The tree is laid out once as a single tall strip; pages are horizontal
//! bands of that strip, `page_height` tall. A box belongs to every band its
//! border box touches, text boxes to every band holding one of their
//! baselines, and every ancestor of a member is a member too. Pages only
//! hold [`NodeId`]s into the shared tree.

use std::collections::BTreeSet;

use folio_common::warning::warn_once;
use folio_style::Rgba;
use serde::Serialize;
use tracing::debug;

use crate::box_model::Rect;
use crate::justify::Run;
use crate::tree::{LayoutTree, NodeId};

/// Upper bound on the number of pages produced.
pub const MAX_PAGES: usize = 100_000;

/// Physical page size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    /// Height of a physical page.
    pub page_height: f32,
    /// Band at the top of each page kept free of text.
    pub margin_top: f32,
    /// Band at the bottom of each page kept free of text.
    pub margin_bottom: f32,
}

impl PageGeometry {
    /// A page without margins.
    #[must_use]
    pub const fn new(page_height: f32) -> Self {
        Self {
            page_height,
            margin_top: 0.0,
            margin_bottom: 0.0,
        }
    }

    /// Height left for content between the margins.
    #[must_use]
    pub fn usable_height(&self) -> f32 {
        (self.page_height - self.margin_top - self.margin_bottom).max(0.0)
    }
}

/// One page slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// Zero-based page number.
    pub page_index: usize,
    /// Y of the top of the band in tree coordinates.
    pub page_offset_y: f32,
    /// Global paint order restricted to this page.
    pub paint_order: Vec<NodeId>,
    /// Document order restricted to this page.
    pub flow_content_order: Vec<NodeId>,
}

impl Page {
    /// True if `node` is on this page.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.flow_content_order.contains(&node)
    }
}

/// Page holding `y` for bands `page_height` tall. Negative and non-finite
/// positions are on page 0.
#[must_use]
pub fn page_for_y(y: f32, page_height: f32) -> usize {
    if !y.is_finite() || y <= 0.0 || !page_height.is_finite() || page_height <= 0.0 {
        return 0;
    }
    // Non-negative and finite here; large values saturate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let page = (y / page_height).floor() as usize;
    page.min(MAX_PAGES - 1)
}

/// Pages a vertical extent `[top, bottom]` intersects: `k` such that
/// `top < (k + 1) * h` and `bottom > k * h`. Zero-height extents are on
/// the page containing `top`.
fn pages_for_extent(top: f32, bottom: f32, page_height: f32) -> std::ops::RangeInclusive<usize> {
    let first = page_for_y(top, page_height);
    if bottom.is_nan() || bottom <= top {
        return first..=first;
    }
    let last = if bottom.is_finite() && bottom > 0.0 && page_height > 0.0 {
        // The last band whose top is above `bottom`.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let last = ((bottom / page_height).ceil() as usize).saturating_sub(1);
        last.min(MAX_PAGES - 1)
    } else {
        first
    };
    first..=last.max(first)
}

/// Slice `tree` into pages `page_height` tall.
///
/// `paint_order` is the global order from
/// [`crate::stacking::resolve_paint_order`]; each page keeps the subset of
/// it that is on the page. There is always at least one page.
#[must_use]
pub fn paginate(tree: &LayoutTree, paint_order: &[NodeId], page_height: f32) -> Vec<Page> {
    let page_height = if page_height.is_finite() && page_height > 0.0 {
        page_height
    } else {
        debug_assert!(false, "paginate called with page height {page_height}");
        f32::INFINITY
    };
    let order = tree.document_order();

    // STEP 1: Own membership of every box.
    let mut pages: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); tree.len()];
    for &id in &order {
        let node = &tree[id];
        let runs = node.runs();
        if runs.is_empty() {
            let border_box = node.dimensions.border_box();
            let (top, bottom) = if node.is_text() {
                (node.dimensions.content.y, node.dimensions.content.bottom())
            } else {
                (border_box.y, border_box.bottom())
            };
            pages[id.0].extend(pages_for_extent(top, bottom, page_height));
        } else {
            // Text boxes go by baseline, not by their own bounds.
            pages[id.0].extend(runs.iter().map(|r| page_for_y(r.baseline(), page_height)));
        }
    }

    // STEP 2: Ancestors of a member are members. Reverse document order
    // visits children before parents.
    for &id in order.iter().rev() {
        if let Some(parent) = tree.parent(id) {
            let child_pages = pages[id.0].clone();
            pages[parent.0].extend(child_pages);
        }
    }

    // STEP 3: Page count from the deepest member.
    let count = pages
        .iter()
        .filter_map(|p| p.last().copied())
        .max()
        .map_or(1, |last| last + 1);
    if count >= MAX_PAGES {
        let _ = warn_once("pagination", &format!("document truncated to {MAX_PAGES} pages"));
    }

    // STEP 4: Orders per page.
    let mut out: Vec<Page> = (0..count)
        .map(|page_index| {
            #[allow(clippy::cast_precision_loss)]
            let page_offset_y = if page_height.is_finite() {
                page_index as f32 * page_height
            } else {
                0.0
            };
            Page {
                page_index,
                page_offset_y,
                paint_order: Vec::new(),
                flow_content_order: Vec::new(),
            }
        })
        .collect();
    for &id in &order {
        for &p in &pages[id.0] {
            out[p].flow_content_order.push(id);
        }
    }
    for &id in paint_order {
        if let Some(set) = pages.get(id.0) {
            for &p in set {
                out[p].paint_order.push(id);
            }
        }
    }
    debug!(pages = out.len(), page_height, "paginated");
    out
}

/// Move a baseline from the continuous strip into page space.
///
/// The strip is cut into bands of [`PageGeometry::usable_height`]; band
/// `k` is drawn on physical page `k` below its top margin:
///
/// ```text
/// y' = k * page_height + margin_top + (y - k * usable_height)
/// ```
///
/// Without margins this is the identity.
#[must_use]
pub fn remap_baseline(y: f32, geometry: &PageGeometry) -> f32 {
    let usable = geometry.usable_height();
    if !y.is_finite() || usable <= 0.0 {
        return y;
    }
    #[allow(clippy::cast_precision_loss)]
    let k = page_for_y(y, usable) as f32;
    k * geometry.page_height + geometry.margin_top + (y - k * usable)
}

/// What the painter needs of one box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderBox {
    /// The box.
    pub node: NodeId,
    /// Content rectangle, in strip coordinates.
    pub content: Rect,
    /// Padding rectangle.
    pub padding_box: Rect,
    /// Border rectangle.
    pub border_box: Rect,
    /// Uniform corner radius.
    pub border_radius: f32,
    /// Background fill.
    pub background: Option<Rgba>,
    /// Text runs with baselines in page space.
    pub runs: Vec<Run>,
    /// Children, shared with the tree.
    pub children: Vec<NodeId>,
}

impl RenderBox {
    /// Snapshot `node` for painting.
    #[must_use]
    pub fn snapshot(tree: &LayoutTree, node: NodeId, geometry: &PageGeometry) -> Self {
        let n = &tree[node];
        let runs = n
            .runs()
            .iter()
            .map(|run| {
                let mut run = run.clone();
                run.matrix.f = remap_baseline(run.matrix.f, geometry);
                run
            })
            .collect();
        Self {
            node,
            content: n.dimensions.content,
            padding_box: n.dimensions.padding_box(),
            border_box: n.dimensions.border_box(),
            border_radius: n.style.border_radius,
            background: n.style.background_color,
            runs,
            children: n.children.clone(),
        }
    }
}
