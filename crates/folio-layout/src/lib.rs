//! Layout, pagination and paint order for the Folio engine.
//!
//! # Scope
//!
//! This crate takes a tree of boxes carrying computed styles and produces
//! geometry the painter can consume:
//!
//! - **Box model** ([CSS 2.1 § 8](https://www.w3.org/TR/CSS2/box.html))
//!   - Widths, heights and auto margins per § 10.3 and § 10.6
//!   - `box-sizing`, min/max clamping
//!
//! - **Normal flow** ([CSS 2.1 § 9.4](https://www.w3.org/TR/CSS2/visuren.html#normal-flow))
//!   - Block formatting contexts and sibling margin collapsing
//!   - Line boxes, alignment and justification
//!   - Floats and clearance
//!   - Relative, absolute and fixed positioning
//!
//! - **Generated content counters** ([CSS Lists 3 § 4](https://www.w3.org/TR/css-lists-3/#auto-numbering))
//!
//! - **Stacking order** ([CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html))
//!
//! - **Pagination** ([CSS Paged Media 3](https://www.w3.org/TR/css-page-3/))
//!
//! # Not Yet Implemented
//!
//! - Flex, grid and table layout (laid out as blocks)
//! - Parent/child margin collapsing
//! - Bidirectional reordering inside a line
//!
//! The usual entry point is [`render_document`].

/// Box model arithmetic per [CSS 2.1 § 8](https://www.w3.org/TR/CSS2/box.html).
pub mod box_model;
/// Render configuration.
pub mod config;
/// CSS counters per [CSS Lists 3 § 4](https://www.w3.org/TR/css-lists-3/#auto-numbering).
pub mod counters;
/// Errors reported by the render pipeline.
pub mod error;
/// Float placement per [CSS 2.1 § 9.5](https://www.w3.org/TR/CSS2/visuren.html#floats).
pub mod float;
/// Block flow per [CSS 2.1 § 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting).
pub mod flow;
/// Formatting context selection per [CSS Display 3 § 2](https://www.w3.org/TR/css-display-3/#the-display-properties).
pub mod formatting_context;
/// Line box construction per [CSS 2.1 § 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting).
pub mod inline;
/// Justification adjuster for laid-out text runs.
pub mod justify;
/// Page slicing per [CSS Paged Media 3](https://www.w3.org/TR/css-page-3/).
pub mod pagination;
/// Per-render state.
pub mod session;
/// Stacking contexts per [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html).
pub mod stacking;
/// Arena of layout boxes.
pub mod tree;
/// Helpers for `auto`-able lengths.
pub mod values;

use serde::Serialize;
use tracing::{debug, debug_span};

// Re-exports for convenience
pub use box_model::{BoxDimensions, ContainingBlock, EdgeSizes, Rect};
pub use config::LayoutConfig;
pub use counters::{CounterContext, CounterStyle, ScopeId, assign_counter_scopes};
pub use error::LayoutError;
pub use float::{FloatContext, FloatSide};
pub use flow::FlowLayout;
pub use inline::{ApproximateFontMetrics, FontMetrics};
pub use justify::{FontAttrs, JustifyStats, LineMatrix, Run, justify_tree};
pub use pagination::{Page, PageGeometry, RenderBox, paginate, remap_baseline};
pub use session::{Diagnostics, RenderSession};
pub use stacking::{StackingTree, build_stacking_tree, resolve_paint_order};
pub use tree::{LayoutNode, LayoutTree, NodeId, NodeKind, NodePayload};

/// Result of [`render_document`].
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutput {
    /// Page slices, at least one.
    pub pages: Vec<Page>,
    /// Global paint order of every box.
    pub paint_order: Vec<NodeId>,
    /// Page size used for slicing and baseline remapping.
    pub geometry: PageGeometry,
    /// What the passes did.
    pub diagnostics: Diagnostics,
    /// Counter scopes, for resolving `counter()` text after layout.
    pub counters: CounterContext,
}

impl RenderOutput {
    /// Boxes of page `page_index` in paint order, ready for a painter.
    /// Empty if there is no such page.
    #[must_use]
    pub fn render_boxes(&self, tree: &LayoutTree, page_index: usize) -> Vec<RenderBox> {
        self.pages.get(page_index).map_or_else(Vec::new, |page| {
            page.paint_order
                .iter()
                .map(|&node| RenderBox::snapshot(tree, node, &self.geometry))
                .collect()
        })
    }
}

/// Run every pass over `tree`: counters, flow, justification, paint order
/// and pagination.
///
/// Geometry is written into the tree in place. The returned pages hold ids
/// into it.
pub fn render_document(
    tree: &mut LayoutTree,
    config: &LayoutConfig,
    metrics: &dyn FontMetrics,
) -> Result<RenderOutput, LayoutError> {
    let mut session = RenderSession::new(config.clone())?;

    {
        let _span = debug_span!("counters").entered();
        assign_counter_scopes(tree, &mut session.counters);
    }
    {
        let _span = debug_span!("flow", boxes = tree.len()).entered();
        FlowLayout::new(session.viewport, metrics, &mut session.diagnostics)
            .with_float_cap(config.float_iteration_cap)
            .layout(tree);
    }
    if config.justify {
        let _span = debug_span!("justify").entered();
        session.diagnostics.justified_lines = justify_tree(tree).lines_adjusted;
    }
    let paint_order = {
        let _span = debug_span!("paint_order").entered();
        resolve_paint_order(tree)
    };
    let geometry = session.page_geometry();
    let pages = {
        let _span = debug_span!("paginate").entered();
        paginate(tree, &paint_order, geometry.usable_height())
    };
    session.diagnostics.pages = pages.len();
    debug!(diagnostics = ?session.diagnostics, "render complete");

    Ok(RenderOutput {
        pages,
        paint_order,
        geometry,
        diagnostics: session.diagnostics,
        counters: session.counters,
    })
}
