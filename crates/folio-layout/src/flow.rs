//! Block flow: turns the styled tree into positioned boxes.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! "In a block formatting context, boxes are laid out one after the other,
//! vertically, beginning at the top of a containing block. The vertical
//! distance between two sibling boxes is determined by the 'margin'
//! properties. Vertical margins between adjacent block-level boxes in a
//! block formatting context collapse."
//!
//! Layout runs in two passes. The first walks the tree top-down, stacking
//! block-level boxes, building line boxes for inline content and placing
//! floats; absolutely positioned and fixed boxes only get their static
//! position recorded. The second pass places those boxes in document order
//! against their containing blocks. All geometry is absolute.

use std::collections::HashMap;
use std::sync::Arc;

use folio_common::warning::warn_once;
use folio_style::{
    AutoLength, BoxSizing, ComputedStyle, Direction, Display, LengthContext, Overflow, Position,
};
use tracing::{debug, trace};

use crate::box_model::{
    AutoWidth, BoxDimensions, ContainingBlock, EdgeSizes, Rect, containing_block,
    resolve_auto_margins, resolve_edges, resolve_height, resolve_width,
};
use crate::float::{FloatContext, FloatSide};
use crate::formatting_context::{FormattingContext, establishes_bfc, node_establishes_bfc};
use crate::inline::{
    FontMetrics, InlineItem, InlineLayout, LineArea, LineBuilder, collapse_whitespace,
};
use crate::justify::FontAttrs;
use crate::session::Diagnostics;
use crate::tree::{IntrinsicSize, LayoutNode, LayoutTree, NodeId, NodeKind, NodePayload};
use crate::values::AutoOr;

/// Size of a replaced element with no intrinsic data.
const DEFAULT_REPLACED_SIZE: IntrinsicSize = IntrinsicSize {
    width: 300.0,
    height: 150.0,
};

/// Depth at which intrinsic width measurement stops descending.
const MAX_MEASURE_DEPTH: usize = 64;

/// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
///
/// "When two or more margins collapse, the resulting margin width is the
/// maximum of the collapsing margins' widths. In the case of negative
/// margins, the maximum of the absolute values of the negative adjoining
/// margins is deducted from the maximum of the positive adjoining margins.
/// If there are no positive margins, the maximum of the absolute values
/// of the adjoining margins is deducted from zero."
#[must_use]
pub fn collapse_two_margins(a: f32, b: f32) -> f32 {
    if a >= 0.0 && b >= 0.0 {
        a.max(b)
    } else if a < 0.0 && b < 0.0 {
        a.min(b)
    } else {
        a + b
    }
}

/// A block formatting context being laid out: its floats and the content
/// box of the box that established it.
struct Bfc {
    floats: FloatContext,
    origin: (f32, f32),
    width: f32,
}

impl Bfc {
    fn new(content: Rect, iteration_cap: usize) -> Self {
        Self {
            floats: FloatContext::with_iteration_cap(iteration_cap),
            origin: (content.x, content.y),
            width: content.width,
        }
    }

    fn line_area(&self, content: Rect) -> LineArea<'_> {
        LineArea {
            floats: &self.floats,
            float_origin: self.origin,
            float_width: self.width,
            left: content.x,
            right: content.right(),
        }
    }
}

/// Static position of an out-of-flow box, relative to the content box of
/// the block it would have been laid out in.
#[derive(Debug, Clone, Copy)]
struct StaticPosition {
    container: NodeId,
    dx: f32,
    dy: f32,
}

/// Where a block goes and how its 'auto' sizes are filled.
#[derive(Debug, Clone, Copy)]
struct BlockInput {
    cb: ContainingBlock,
    /// Top of the margin box.
    y: f32,
    auto_width: AutoWidth,
    /// Used content height for 'height: auto' (absolutely positioned boxes
    /// with both 'top' and 'bottom').
    stretch_height: Option<f32>,
}

/// The geometry builder.
pub struct FlowLayout<'a> {
    viewport: Rect,
    metrics: &'a dyn FontMetrics,
    float_cap: usize,
    diagnostics: &'a mut Diagnostics,
    static_positions: HashMap<NodeId, StaticPosition>,
}

impl<'a> FlowLayout<'a> {
    /// A builder for one render.
    pub fn new(
        viewport: Rect,
        metrics: &'a dyn FontMetrics,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            viewport,
            metrics,
            float_cap: crate::float::DEFAULT_ITERATION_CAP,
            diagnostics,
            static_positions: HashMap::new(),
        }
    }

    /// Bound the float placement scan.
    #[must_use]
    pub fn with_float_cap(mut self, cap: usize) -> Self {
        self.float_cap = cap.max(1);
        self
    }

    /// Lay out every box of `tree`.
    pub fn layout(mut self, tree: &mut LayoutTree) {
        let root = tree.root();
        let viewport = self.viewport;
        let mut outer = Bfc::new(viewport, self.float_cap);
        let input = BlockInput {
            cb: ContainingBlock::viewport(viewport),
            y: viewport.y,
            auto_width: AutoWidth::Fill,
            stretch_height: None,
        };
        let _ = self.layout_block(tree, root, input, &mut outer);
        self.layout_out_of_flow(tree);
        compute_scroll_extents(tree);
        debug!(
            boxes = self.diagnostics.boxes_laid_out,
            lines = self.diagnostics.lines,
            "flow layout finished"
        );
    }

    /// [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth) and
    /// [§ 10.6.3](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
    ///
    /// Lay out a block container and its contents. Returns the height of
    /// its margin box.
    fn layout_block(
        &mut self,
        tree: &mut LayoutTree,
        id: NodeId,
        input: BlockInput,
        bfc: &mut Bfc,
    ) -> f32 {
        self.diagnostics.boxes_laid_out += 1;
        let style = Arc::clone(&tree[id].style);
        if style.display == Display::None {
            hide_subtree(tree, id, input.cb.x, input.y);
            return 0.0;
        }
        let context = FormattingContext::select(&tree[id]);
        match context {
            FormattingContext::Replaced | FormattingContext::FormControl => {
                return self.layout_replaced(tree, id, input);
            }
            _ if context.is_external() => {
                let _ = warn_once(
                    "layout",
                    &format!("display: {} is laid out as a block", style.display),
                );
            }
            _ => {}
        }

        // STEP 1: Width, edges and position.
        let viewport = self.viewport;
        let width = resolve_width(&style, input.cb.width, viewport, input.auto_width);
        let pb_vertical = width.padding.vertical() + width.border.vertical();
        let definite = if style.height.is_auto() {
            input.stretch_height
        } else {
            definite_height(&style, input.cb.height, pb_vertical, viewport)
        };
        let content = Rect::new(
            input.cb.x + width.margin_left + width.border.left + width.padding.left,
            input.y + width.margin_top + width.border.top + width.padding.top,
            width.content_width,
            definite.unwrap_or(0.0),
        );
        tree[id].dimensions = BoxDimensions {
            content,
            padding: width.padding,
            border: width.border,
            margin: width.margin(),
        };

        // STEP 2: Contents.
        let mut content_height = if node_establishes_bfc(tree, id) {
            let mut own = Bfc::new(content, self.float_cap);
            let height = self.layout_children(tree, id, content, definite, &mut own);
            // [§ 10.6.7](https://www.w3.org/TR/CSS2/visudet.html#root-height)
            own.floats.max_bottom().map_or(height, |bottom| height.max(bottom))
        } else {
            self.layout_children(tree, id, content, definite, bfc)
        };
        if context == FormattingContext::Grid
            && let NodePayload::Grid(grid) = &tree[id].payload
        {
            content_height = content_height.max(grid.row_tracks.iter().sum());
        }

        // STEP 3: Height.
        let height = resolve_height(
            &style,
            input.stretch_height.unwrap_or(content_height),
            input.cb.height,
            pb_vertical,
            viewport,
        );
        tree[id].dimensions.content.height = height;
        let outer = tree[id].dimensions.margin_box().height;
        trace!(node = id.0, x = content.x, y = content.y, width = content.width, height, "block");

        // STEP 4: Relative offset; siblings are not affected.
        if style.position == Position::Relative {
            let (dx, dy) = relative_offset(&style, input.cb, viewport);
            tree.translate_subtree(id, dx, dy);
        }
        outer
    }

    /// Lay out the children of a block container whose content box is
    /// `content`. Returns the height the content needs.
    fn layout_children(
        &mut self,
        tree: &mut LayoutTree,
        id: NodeId,
        content: Rect,
        cb_height: Option<f32>,
        bfc: &mut Bfc,
    ) -> f32 {
        let cb = ContainingBlock::from_content(content, cb_height);
        let mut cursor = content.y;
        let mut prev_margin_bottom: Option<f32> = None;
        let mut segment: Vec<NodeId> = Vec::new();
        let mut line_index = 0;

        for child in tree.children(id).to_vec() {
            let style = Arc::clone(&tree[child].style);
            let inline_level =
                tree[child].is_text() || (style.display.is_inline_level() && !style.is_floated());
            if inline_level && !style.is_out_of_flow() {
                segment.push(child);
                continue;
            }
            if style.display == Display::None {
                hide_subtree(tree, child, content.x, cursor);
                continue;
            }
            if style.is_out_of_flow() {
                self.record_static_position(child, id, content, content.x, cursor);
                continue;
            }
            // Floats inside a run of inline content go to the top of that
            // run and do not break it.
            if style.is_floated() {
                self.layout_float(tree, child, cb, cursor, bfc);
                continue;
            }
            if !segment.is_empty() {
                let (bottom, next) = self.layout_inline_segment(
                    tree, id, &segment, content, cursor, line_index, bfc,
                );
                if next > line_index {
                    prev_margin_bottom = None;
                }
                cursor = bottom;
                line_index = next;
                segment.clear();
            }
            cursor =
                self.layout_in_flow_block(tree, child, cb, cursor, &mut prev_margin_bottom, bfc);
        }
        if !segment.is_empty() {
            let (bottom, _) =
                self.layout_inline_segment(tree, id, &segment, content, cursor, line_index, bfc);
            cursor = bottom;
        }
        cursor - content.y
    }

    /// Place one in-flow block-level child at `cursor`, collapsing its top
    /// margin with the previous sibling's bottom margin. Returns the new
    /// cursor.
    fn layout_in_flow_block(
        &mut self,
        tree: &mut LayoutTree,
        child: NodeId,
        cb: ContainingBlock,
        cursor: f32,
        prev_margin_bottom: &mut Option<f32>,
        bfc: &mut Bfc,
    ) -> f32 {
        let style = Arc::clone(&tree[child].style);
        let margin_top = resolve_edges(&style, cb.width, self.viewport)
            .margin
            .top
            .to_px_or(0.0);

        // STEP 1: Sibling margin collapsing.
        // cursor already includes the previous sibling's bottom margin.
        let mut y = cursor;
        if let Some(prev) = *prev_margin_bottom {
            y -= prev + margin_top - collapse_two_margins(prev, margin_top);
        }

        // STEP 2: Clearance.
        // [§ 9.5.2](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
        let (ox, oy) = bfc.origin;
        let border_top = y + margin_top;
        let cleared = bfc
            .floats
            .clear_for_block(style.clear, style.direction, border_top - oy)
            + oy;
        if cleared > border_top {
            y = cursor.max(cleared - margin_top);
        }

        // STEP 3: "The border box of a table, a block-level replaced element,
        // or an element in the normal flow that establishes a new block
        // formatting context must not overlap the margin box of any floats
        // in the same block formatting context as the element itself."
        let mut child_cb = cb;
        if establishes_bfc(&style) && !bfc.floats.is_empty() {
            let band = y + margin_top - oy;
            let offsets = bfc.floats.inline_offsets(band, band, bfc.width);
            let left = cb.x.max(ox + offsets.start);
            let right = (cb.x + cb.width).min(ox + offsets.end);
            child_cb.x = left;
            child_cb.width = (right - left).max(0.0);
        }

        let outer = self.layout_block(
            tree,
            child,
            BlockInput {
                cb: child_cb,
                y,
                auto_width: AutoWidth::Fill,
                stretch_height: None,
            },
            bfc,
        );
        *prev_margin_bottom = Some(tree[child].dimensions.margin.bottom);
        y + outer
    }

    /// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// Lay out the float's contents first, then hand its margin box to the
    /// float context and move the whole subtree to the placed position.
    fn layout_float(
        &mut self,
        tree: &mut LayoutTree,
        child: NodeId,
        cb: ContainingBlock,
        y: f32,
        bfc: &mut Bfc,
    ) {
        let style = Arc::clone(&tree[child].style);
        let Some(side) = FloatSide::from_style(style.float, style.direction) else {
            return;
        };

        // [§ 10.3.5](https://www.w3.org/TR/CSS2/visudet.html#float-width)
        //
        // "If 'width' is computed as 'auto', the used value is the
        // 'shrink-to-fit' width."
        let auto_width = self.shrink_to_fit(tree, child);
        let _ = self.layout_block(
            tree,
            child,
            BlockInput {
                cb,
                y,
                auto_width,
                stretch_height: None,
            },
            bfc,
        );

        let margin_box = tree[child].dimensions.margin_box();
        let (ox, oy) = bfc.origin;
        let placed = bfc.floats.place_float_within(
            side,
            margin_box.width,
            margin_box.height,
            y - oy,
            cb.x - ox,
            cb.x - ox + cb.width,
        );
        if placed.capped {
            self.diagnostics.float_cap_hits += 1;
        }
        tree.translate_subtree(
            child,
            placed.rect.inline_start + ox - margin_box.x,
            placed.rect.top + oy - margin_box.y,
        );
    }

    /// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    ///
    /// Break a run of inline-level siblings into lines. Returns the Y below
    /// the last line and the next line index of the container.
    #[allow(clippy::too_many_arguments)]
    fn layout_inline_segment(
        &mut self,
        tree: &mut LayoutTree,
        container: NodeId,
        segment: &[NodeId],
        content: Rect,
        cursor: f32,
        line_index: usize,
        bfc: &mut Bfc,
    ) -> (f32, usize) {
        // STEP 1: Flatten the segment into inline items. Atomic inlines and
        // floats are laid out on the way.
        let mut items = Vec::new();
        let mut inline_boxes = Vec::new();
        for &id in segment {
            self.collect_inline_items(
                tree,
                id,
                container,
                content,
                cursor,
                bfc,
                &mut items,
                &mut inline_boxes,
            );
        }

        // STEP 2: Build the lines.
        let style = Arc::clone(&tree[container].style);
        let strut = line_height_of(&style, self.metrics);
        let mut builder = LineBuilder::new(
            self.metrics,
            bfc.line_area(content),
            style.text_align,
            style.direction,
            strut,
            cursor,
            line_index,
        )
        .with_float_cap(self.float_cap);
        for item in &items {
            builder.push(item);
        }
        let layout = builder.finish();
        self.diagnostics.lines += layout.next_line_index - line_index;
        let result = (layout.bottom, layout.next_line_index);

        // STEP 3: Write the results back into the tree.
        apply_inline_layout(tree, layout);
        for &id in inline_boxes.iter().rev() {
            let bounds = tree
                .children(id)
                .iter()
                .filter(|&&c| !tree[c].style.is_floated() && !tree[c].style.is_out_of_flow())
                .map(|&c| fragment_rect(&tree[c]))
                .filter(|r| r.width > 0.0 || r.height > 0.0)
                .reduce(|a, b| a.union(&b));
            tree[id].dimensions.content =
                bounds.unwrap_or_else(|| Rect::new(content.x, cursor, 0.0, 0.0));
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_inline_items(
        &mut self,
        tree: &mut LayoutTree,
        id: NodeId,
        container: NodeId,
        content: Rect,
        cursor: f32,
        bfc: &mut Bfc,
        items: &mut Vec<InlineItem>,
        inline_boxes: &mut Vec<NodeId>,
    ) {
        let style = Arc::clone(&tree[id].style);
        if let NodeKind::Text(text) = &tree[id].kind {
            let text = text.clone();
            let node = &mut tree[id];
            node.payload = NodePayload::None;
            node.dimensions = BoxDimensions {
                content: Rect::new(content.x, cursor, 0.0, 0.0),
                ..BoxDimensions::default()
            };
            items.push(InlineItem::Text {
                node: id,
                text,
                font: font_of(&style),
                line_height: line_height_of(&style, self.metrics),
            });
            return;
        }
        if style.display == Display::None {
            hide_subtree(tree, id, content.x, cursor);
            return;
        }
        if style.is_out_of_flow() {
            self.record_static_position(id, container, content, content.x, cursor);
            return;
        }
        let cb = ContainingBlock::from_content(content, None);
        if style.is_floated() {
            self.layout_float(tree, id, cb, cursor, bfc);
            return;
        }

        // [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
        //
        // "Horizontal margins, borders, and padding are respected between
        // these boxes."
        if style.display == Display::Inline && matches!(tree[id].kind, NodeKind::Element(_)) {
            let edges = resolve_edges(&style, content.width, self.viewport);
            let margin = EdgeSizes {
                top: edges.margin.top.to_px_or(0.0),
                right: edges.margin.right.to_px_or(0.0),
                bottom: edges.margin.bottom.to_px_or(0.0),
                left: edges.margin.left.to_px_or(0.0),
            };
            tree[id].dimensions = BoxDimensions {
                content: Rect::new(content.x, cursor, 0.0, 0.0),
                padding: edges.padding,
                border: edges.border,
                margin,
            };
            inline_boxes.push(id);
            items.push(InlineItem::Edge {
                width: margin.left + edges.border.left + edges.padding.left,
            });
            for child in tree.children(id).to_vec() {
                self.collect_inline_items(
                    tree,
                    child,
                    container,
                    content,
                    cursor,
                    bfc,
                    items,
                    inline_boxes,
                );
            }
            items.push(InlineItem::Edge {
                width: margin.right + edges.border.right + edges.padding.right,
            });
            return;
        }

        // Atomic inline: inline-block, replaced element or form control.
        if style.display.is_block_level() && matches!(tree[id].kind, NodeKind::Element(_)) {
            let _ = warn_once(
                "layout",
                "block-level box inside an inline box is laid out as an inline-block",
            );
        }
        let auto_width = self.shrink_to_fit(tree, id);
        let mut scratch = Bfc::new(content, self.float_cap);
        let _ = self.layout_block(
            tree,
            id,
            BlockInput {
                cb,
                y: cursor,
                auto_width,
                stretch_height: None,
            },
            &mut scratch,
        );
        let margin_box = tree[id].dimensions.margin_box();
        items.push(InlineItem::Atomic {
            node: id,
            width: margin_box.width,
            height: margin_box.height,
        });
    }

    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    ///
    /// Replaced elements and form controls take their intrinsic size
    /// unless styled otherwise; one styled dimension scales the other by
    /// the intrinsic ratio.
    fn layout_replaced(&mut self, tree: &mut LayoutTree, id: NodeId, input: BlockInput) -> f32 {
        let style = Arc::clone(&tree[id].style);
        let viewport = self.viewport;
        let intrinsic = intrinsic_size(&tree[id]);
        let ratio = (intrinsic.width > 0.0 && intrinsic.height > 0.0)
            .then(|| intrinsic.width / intrinsic.height);

        // STEP 1: Width.
        let mut width = resolve_width(
            &style,
            input.cb.width,
            viewport,
            AutoWidth::ShrinkToFit {
                min_content: intrinsic.width,
                max_content: intrinsic.width,
            },
        );
        let pb_vertical = width.padding.vertical() + width.border.vertical();

        // STEP 2: Height, and the width again if only the height was given.
        let auto_height = match ratio {
            Some(r) if !style.width.is_auto() => width.content_width / r,
            _ => intrinsic.height,
        };
        let height = resolve_height(&style, auto_height, input.cb.height, pb_vertical, viewport);
        if style.width.is_auto()
            && !style.height.is_auto()
            && let Some(r) = ratio
        {
            width.content_width = height * r;
        }

        // STEP 3: Block-level replaced boxes center with 'auto' margins.
        if style.display.is_block_level() && !style.is_floated() && !style.is_out_of_flow() {
            let edges = resolve_edges(&style, input.cb.width, viewport);
            let (left, right) = resolve_auto_margins(
                input.cb.width,
                width.border_box_width(),
                edges.margin.left,
                edges.margin.right,
                style.direction,
            );
            width.margin_left = left;
            width.margin_right = right;
        }

        tree[id].dimensions = BoxDimensions {
            content: Rect::new(
                input.cb.x + width.margin_left + width.border.left + width.padding.left,
                input.y + width.margin_top + width.border.top + width.padding.top,
                width.content_width,
                height,
            ),
            padding: width.padding,
            border: width.border,
            margin: width.margin(),
        };
        let outer = tree[id].dimensions.margin_box().height;
        if style.position == Position::Relative {
            let (dx, dy) = relative_offset(&style, input.cb, viewport);
            tree.translate_subtree(id, dx, dy);
        }
        outer
    }

    fn record_static_position(
        &mut self,
        id: NodeId,
        container: NodeId,
        content: Rect,
        x: f32,
        y: f32,
    ) {
        let _ = self.static_positions.insert(
            id,
            StaticPosition {
                container,
                dx: x - content.x,
                dy: y - content.y,
            },
        );
    }

    /// [§ 10.3.7](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width) and
    /// [§ 10.6.4](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-height)
    ///
    /// Place absolutely positioned and fixed boxes, outermost first.
    fn layout_out_of_flow(&mut self, tree: &mut LayoutTree) {
        for id in tree.document_order() {
            if !tree[id].style.is_out_of_flow() {
                continue;
            }
            // Boxes under 'display: none' never got a static position.
            let Some(position) = self.static_positions.get(&id).copied() else {
                continue;
            };
            self.layout_positioned(tree, id, position);
        }
    }

    fn layout_positioned(&mut self, tree: &mut LayoutTree, id: NodeId, position: StaticPosition) {
        let style = Arc::clone(&tree[id].style);
        let viewport = self.viewport;
        let cb = containing_block(tree, id, viewport);
        let origin = tree[position.container].dimensions.content;
        let static_x = origin.x + position.dx;
        let static_y = origin.y + position.dy;

        // STEP 1: Resolve the insets. Vertical percentages of an indefinite
        // containing block are 'auto'.
        let ctx = style.length_context(viewport.width, viewport.height);
        let left = AutoOr::resolve(style.inset.left, cb.width, &ctx);
        let right = AutoOr::resolve(style.inset.right, cb.width, &ctx);
        let top = vertical_inset(style.inset.top, cb.height, &ctx);
        let bottom = vertical_inset(style.inset.bottom, cb.height, &ctx);

        // STEP 2: Width. With both 'left' and 'right' set the box fills the
        // space between them; otherwise it shrinks to fit.
        let auto_width = if left.is_auto() || right.is_auto() {
            self.shrink_to_fit(tree, id)
        } else {
            AutoWidth::Fill
        };
        let edges = resolve_edges(&style, cb.width, viewport);
        let stretch_height = match (top, bottom, cb.height) {
            (AutoOr::Length(t), AutoOr::Length(b), Some(h)) if style.height.is_auto() => Some(
                (h - t
                    - b
                    - edges.margin.top.to_px_or(0.0)
                    - edges.margin.bottom.to_px_or(0.0)
                    - edges.padding.vertical()
                    - edges.border.vertical())
                .max(0.0),
            ),
            _ => None,
        };
        let area = ContainingBlock {
            x: cb.x + left.to_px_or(0.0),
            y: cb.y,
            width: (cb.width - left.to_px_or(0.0) - right.to_px_or(0.0)).max(0.0),
            height: cb.height,
        };
        let mut scratch = Bfc::new(viewport, self.float_cap);
        let _ = self.layout_block(
            tree,
            id,
            BlockInput {
                cb: area,
                y: static_y,
                auto_width,
                stretch_height,
            },
            &mut scratch,
        );

        // STEP 3: Position the margin box.
        let margin_box = tree[id].dimensions.margin_box();
        let x = match (left, right) {
            (AutoOr::Length(_), _) => margin_box.x,
            (AutoOr::Auto, AutoOr::Length(r)) => cb.x + cb.width - r - margin_box.width,
            (AutoOr::Auto, AutoOr::Auto) => static_x,
        };
        let y = match (top, bottom, cb.height) {
            (AutoOr::Length(t), _, _) => cb.y + t,
            (AutoOr::Auto, AutoOr::Length(b), Some(h)) => cb.y + h - b - margin_box.height,
            _ => static_y,
        };
        tree.translate_subtree(id, x - margin_box.x, y - margin_box.y);
        debug!(node = id.0, x, y, position = %style.position, "placed out-of-flow box");
    }

    /// [§ 10.3.5](https://www.w3.org/TR/CSS2/visudet.html#float-width)
    ///
    /// "Calculate the preferred width by formatting the content without
    /// breaking lines other than where explicit line breaks occur, and also
    /// calculate the preferred minimum width, e.g., by trying all possible
    /// line breaks."
    fn shrink_to_fit(&self, tree: &LayoutTree, id: NodeId) -> AutoWidth {
        let (min_content, max_content) = self.intrinsic_widths(tree, id, 0);
        AutoWidth::ShrinkToFit {
            min_content,
            max_content,
        }
    }

    /// Preferred minimum and preferred content-box widths of a box.
    fn intrinsic_widths(&self, tree: &LayoutTree, id: NodeId, depth: usize) -> (f32, f32) {
        let node = &tree[id];
        let style = &node.style;
        match &node.kind {
            NodeKind::Text(text) => {
                let collapsed = collapse_whitespace(text);
                let size = style.font_size;
                let max = self.metrics.text_width(collapsed.trim(), size);
                let min = collapsed
                    .split(' ')
                    .map(|word| self.metrics.text_width(word, size))
                    .fold(0.0_f32, f32::max);
                (min, max)
            }
            NodeKind::Replaced(_) | NodeKind::FormControl(_) => {
                let width =
                    explicit_width(style, self.viewport).unwrap_or(intrinsic_size(node).width);
                (width, width)
            }
            NodeKind::Element(_) => {
                if let Some(width) = explicit_width(style, self.viewport) {
                    return (width, width);
                }
                if depth >= MAX_MEASURE_DEPTH {
                    return (0.0, 0.0);
                }
                let mut min = 0.0_f32;
                let mut max = 0.0_f32;
                let mut line = 0.0_f32;
                for &child in tree.children(id) {
                    let c = &tree[child];
                    if (!c.is_text() && c.style.display == Display::None)
                        || c.style.is_out_of_flow()
                    {
                        continue;
                    }
                    let (child_min, child_max) = self.intrinsic_widths(tree, child, depth + 1);
                    let extra = if c.is_text() {
                        0.0
                    } else {
                        outer_horizontal(&c.style, self.viewport)
                    };
                    min = min.max(child_min + extra);
                    if c.is_text() || (c.style.display.is_inline_level() && !c.style.is_floated()) {
                        line += child_max + extra;
                    } else {
                        max = max.max(line).max(child_max + extra);
                        line = 0.0;
                    }
                }
                (min, max.max(line))
            }
        }
    }
}

/// Move inline layout results into the tree: runs into their text boxes,
/// atomic inlines to their line positions.
fn apply_inline_layout(tree: &mut LayoutTree, layout: InlineLayout) {
    for ((node, run), (top, height)) in layout.runs.into_iter().zip(layout.run_lines) {
        let rect = Rect::new(run.x(), top, run.advance, height);
        let n = &mut tree[node];
        if let NodePayload::Runs(runs) = &mut n.payload {
            runs.push(run);
            n.dimensions.content = n.dimensions.content.union(&rect);
        } else {
            n.payload = NodePayload::Runs(vec![run]);
            n.dimensions.content = rect;
        }
    }
    for placement in layout.atomics {
        let margin_box = tree[placement.node].dimensions.margin_box();
        tree.translate_subtree(
            placement.node,
            placement.x - margin_box.x,
            placement.y - margin_box.y,
        );
    }
}

/// Rectangle an inline-level child contributes to its inline parent.
fn fragment_rect(node: &LayoutNode) -> Rect {
    match node.kind {
        NodeKind::Text(_) => node.dimensions.content,
        _ if node.style.display == Display::Inline => node.dimensions.border_box(),
        _ => node.dimensions.margin_box(),
    }
}

/// Collapse a subtree that generates no boxes to a point.
fn hide_subtree(tree: &mut LayoutTree, id: NodeId, x: f32, y: f32) {
    for n in tree.subtree(id) {
        let node = &mut tree[n];
        node.dimensions = BoxDimensions {
            content: Rect::new(x, y, 0.0, 0.0),
            ..BoxDimensions::default()
        };
        if matches!(node.payload, NodePayload::Runs(_)) {
            node.payload = NodePayload::None;
        }
    }
}

/// [§ 11.1.1 Overflow](https://www.w3.org/TR/CSS2/visufx.html#overflow)
///
/// Scrollable overflow of every box: its padding box grown to cover the
/// boxes of its descendants. Descendants that clip contribute only their
/// own border box.
fn compute_scroll_extents(tree: &mut LayoutTree) {
    let mut overflow = vec![Rect::default(); tree.len()];
    for id in tree.document_order().into_iter().rev() {
        let node = &tree[id];
        let own = if node.is_text() {
            node.dimensions.content
        } else {
            node.dimensions.border_box()
        };
        let extent = node
            .children
            .iter()
            .map(|c| overflow[c.0])
            .filter(|r| r.width > 0.0 || r.height > 0.0)
            .fold(own, |acc, r| acc.union(&r));
        let padding_box = node.dimensions.padding_box();
        let clips = node.style.overflow != Overflow::Visible;
        overflow[id.0] = if clips { own } else { extent };
        let node = &mut tree[id];
        node.scroll_width = (extent.right().max(padding_box.right()) - padding_box.x).max(0.0);
        node.scroll_height = (extent.bottom().max(padding_box.bottom()) - padding_box.y).max(0.0);
    }
}

/// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
///
/// "If both 'left' and 'right' are 'auto', the used values are both 0 ...
/// If neither 'left' nor 'right' is 'auto', the position is
/// over-constrained, and one of them has to be ignored. If the 'direction'
/// property of the containing block is 'ltr', the value of 'left' wins."
///
/// "If neither [top nor bottom] is 'auto', 'bottom' is ignored."
fn relative_offset(style: &ComputedStyle, cb: ContainingBlock, viewport: Rect) -> (f32, f32) {
    let ctx = style.length_context(viewport.width, viewport.height);
    let left = AutoOr::resolve(style.inset.left, cb.width, &ctx);
    let right = AutoOr::resolve(style.inset.right, cb.width, &ctx);
    let top = vertical_inset(style.inset.top, cb.height, &ctx);
    let bottom = vertical_inset(style.inset.bottom, cb.height, &ctx);
    let dx = match (left, right) {
        (AutoOr::Auto, AutoOr::Auto) => 0.0,
        (AutoOr::Length(l), AutoOr::Auto) => l,
        (AutoOr::Auto, AutoOr::Length(r)) => -r,
        (AutoOr::Length(l), AutoOr::Length(r)) => match style.direction {
            Direction::Ltr => l,
            Direction::Rtl => -r,
        },
    };
    let dy = match (top, bottom) {
        (AutoOr::Length(t), _) => t,
        (AutoOr::Auto, AutoOr::Length(b)) => -b,
        (AutoOr::Auto, AutoOr::Auto) => 0.0,
    };
    (dx, dy)
}

fn vertical_inset(value: AutoLength, cb_height: Option<f32>, ctx: &LengthContext) -> AutoOr {
    match value {
        AutoLength::Auto => AutoOr::Auto,
        AutoLength::Length(len) => len
            .to_px_definite(cb_height, ctx)
            .map_or(AutoOr::Auto, AutoOr::Length),
    }
}

/// Content height fixed by style before the contents are laid out.
fn definite_height(
    style: &ComputedStyle,
    cb_height: Option<f32>,
    padding_border: f32,
    viewport: Rect,
) -> Option<f32> {
    let ctx = style.length_context(viewport.width, viewport.height);
    let _ = style.height.length()?.to_px_definite(cb_height, &ctx)?;
    Some(resolve_height(style, 0.0, cb_height, padding_border, viewport))
}

/// A non-percentage `width` as a content-box width.
fn explicit_width(style: &ComputedStyle, viewport: Rect) -> Option<f32> {
    let length = style.width.length().filter(|l| !l.is_percent())?;
    let ctx = style.length_context(viewport.width, viewport.height);
    let width = length.to_px(0.0, &ctx);
    Some(match style.box_sizing {
        BoxSizing::ContentBox => width.max(0.0),
        BoxSizing::BorderBox => {
            let edges = resolve_edges(style, 0.0, viewport);
            (width - edges.padding.horizontal() - edges.border.horizontal()).max(0.0)
        }
    })
}

/// Horizontal padding, border and non-auto margins.
fn outer_horizontal(style: &ComputedStyle, viewport: Rect) -> f32 {
    let edges = resolve_edges(style, 0.0, viewport);
    edges.padding.horizontal()
        + edges.border.horizontal()
        + edges.margin.left.to_px_or(0.0)
        + edges.margin.right.to_px_or(0.0)
}

fn intrinsic_size(node: &LayoutNode) -> IntrinsicSize {
    match &node.payload {
        NodePayload::Intrinsic(size) => *size,
        NodePayload::FormControl(data) => data.intrinsic,
        _ => DEFAULT_REPLACED_SIZE,
    }
}

fn font_of(style: &ComputedStyle) -> FontAttrs {
    FontAttrs {
        size: style.font_size,
        weight: style.font_weight,
        italic: style.italic,
    }
}

/// Used `line-height`.
pub(crate) fn line_height_of(style: &ComputedStyle, metrics: &dyn FontMetrics) -> f32 {
    style
        .line_height
        .filter(|h| h.is_finite() && *h >= 0.0)
        .unwrap_or_else(|| metrics.line_height(style.font_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_two_margins() {
        assert!((collapse_two_margins(20.0, 30.0) - 30.0).abs() < f32::EPSILON);
        assert!((collapse_two_margins(-10.0, -30.0) + 30.0).abs() < f32::EPSILON);
        assert!((collapse_two_margins(20.0, -5.0) - 15.0).abs() < f32::EPSILON);
    }
}
