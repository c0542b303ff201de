//! Box model resolution.
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)
//!
//! Pure functions that turn a [`ComputedStyle`] plus a containing block into
//! used pixel values: padding, border and margin extents, block widths
//! (auto, percentage, `box-sizing`, min/max) and heights. None of them keep
//! state; [`containing_block`] reads the arena but never writes it.

use folio_style::{
    BoxSizing, ComputedStyle, Direction, Display, LengthContext, LengthValue, Position, Sides,
};
use serde::Serialize;

use crate::tree::{LayoutTree, NodeId, NodeKind};
use crate::values::{AutoEdgeSizes, AutoOr};

/// A rectangle positioned in 2D space.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Construct a rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// Edge sizes for padding, border, or margin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EdgeSizes {
    /// Top edge size.
    pub top: f32,
    /// Right edge size.
    pub right: f32,
    /// Bottom edge size.
    pub bottom: f32,
    /// Left edge size.
    pub left: f32,
}

impl EdgeSizes {
    /// Left plus right.
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Top plus bottom.
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    fn resolve(sides: &Sides<LengthValue>, reference: f32, ctx: &LengthContext) -> Self {
        let px = |l: LengthValue| l.to_px(reference, ctx).max(0.0);
        Self {
            top: px(sides.top),
            right: px(sides.right),
            bottom: px(sides.bottom),
            left: px(sides.left),
        }
    }
}

/// [§ 3. The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
///
/// "Each box has a content area and optional surrounding padding, border,
/// and margin areas."
///
/// ```text
///   margin box ⊇ border box ⊇ padding box ⊇ content box
/// ```
///
/// Only the content rectangle is stored; the outer boxes are derived by
/// expanding it through the edge sizes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BoxDimensions {
    /// Content area dimensions
    pub content: Rect,
    /// Padding widths around the content area
    pub padding: EdgeSizes,
    /// Border widths around the padding area
    pub border: EdgeSizes,
    /// Margin widths around the border area
    pub margin: EdgeSizes,
}

impl BoxDimensions {
    fn expand(rect: Rect, edges: EdgeSizes) -> Rect {
        Rect {
            x: rect.x - edges.left,
            y: rect.y - edges.top,
            width: rect.width + edges.left + edges.right,
            height: rect.height + edges.top + edges.bottom,
        }
    }

    /// [§ 3.2 Padding](https://www.w3.org/TR/css-box-3/#paddings)
    ///
    /// "The padding box contains both the content and padding areas."
    #[must_use]
    pub fn padding_box(&self) -> Rect {
        Self::expand(self.content, self.padding)
    }

    /// [§ 3.3 Borders](https://www.w3.org/TR/css-box-3/#borders)
    ///
    /// "The border box contains content, padding, and border areas."
    #[must_use]
    pub fn border_box(&self) -> Rect {
        Self::expand(self.padding_box(), self.border)
    }

    /// [§ 3.1 Margins](https://www.w3.org/TR/css-box-3/#margins)
    ///
    /// "The margin box is the outermost box, and contains all four areas."
    #[must_use]
    pub fn margin_box(&self) -> Rect {
        Self::expand(self.border_box(), self.margin)
    }

    /// "The content box contains the actual content of the element."
    #[must_use]
    pub const fn content_box(&self) -> Rect {
        self.content
    }

    /// Move the box without resizing it.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.content.x += dx;
        self.content.y += dy;
    }
}

/// [§ 10.1 Definition of containing block](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
///
/// "The position and size of an element's box(es) are sometimes calculated
/// relative to a certain rectangle, called the containing block of the
/// element."
///
/// Computed on demand and never stored on a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ContainingBlock {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width; always definite.
    pub width: f32,
    /// Height, when it does not depend on the content being laid out.
    pub height: Option<f32>,
}

impl ContainingBlock {
    /// The viewport acting as the initial containing block.
    #[must_use]
    pub const fn viewport(viewport: Rect) -> Self {
        Self {
            x: viewport.x,
            y: viewport.y,
            width: viewport.width,
            height: Some(viewport.height),
        }
    }

    /// Containing block formed by a content rectangle whose height may not
    /// be final yet.
    #[must_use]
    pub fn from_content(content: Rect, height: Option<f32>) -> Self {
        Self {
            x: content.x,
            y: content.y,
            width: if content.width.is_finite() {
                content.width.max(0.0)
            } else {
                0.0
            },
            height,
        }
    }
}

/// Padding, border and margin resolved against a percentage basis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ResolvedEdges {
    /// Used padding.
    pub padding: EdgeSizes,
    /// Used border widths.
    pub border: EdgeSizes,
    /// Margins, with 'auto' preserved.
    pub margin: AutoEdgeSizes,
}

/// Resolve padding, border and margins of `style`.
///
/// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
///
/// "The percentage is calculated with respect to the width of the
/// generated box's containing block, even for 'padding-top' and
/// 'padding-bottom'."
///
/// Negative padding and border widths clamp to zero. A non-finite
/// `reference_inline` makes percentages resolve to zero.
#[must_use]
pub fn resolve_edges(
    style: &ComputedStyle,
    reference_inline: f32,
    viewport: Rect,
) -> ResolvedEdges {
    let ctx = style.length_context(viewport.width, viewport.height);
    ResolvedEdges {
        padding: EdgeSizes::resolve(&style.padding, reference_inline, &ctx),
        border: EdgeSizes::resolve(&style.border_width, reference_inline, &ctx),
        margin: AutoEdgeSizes::resolve(&style.margin, reference_inline, &ctx),
    }
}

/// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
///
/// "If the tentative used width is greater than 'max-width', the rules
/// above are applied again, but this time using the computed value of
/// 'max-width' as the computed value for 'width'. If the resulting width
/// is smaller than 'min-width', the rules above are applied again."
///
/// Max first, then min: a min larger than max wins.
#[must_use]
pub fn clamp_min_max(value: f32, min: Option<f32>, max: Option<f32>) -> f32 {
    let mut clamped = value;
    if let Some(max) = max
        && clamped > max
    {
        clamped = max;
    }
    if let Some(min) = min
        && clamped < min
    {
        clamped = min;
    }
    clamped
}

/// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// "'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
/// 'padding-right' + 'border-right-width' + 'margin-right' = width of
/// containing block"
///
/// Solves the used horizontal margins for a box whose border-box width is
/// already known:
///
/// - both 'auto': the leftover space is split evenly;
/// - one 'auto': it takes whatever makes the equality hold;
/// - neither 'auto' (over-constrained): the end-side margin (right under
///   `ltr`) is recomputed.
///
/// "If 'width' is not 'auto' and [the sum] is larger than the width of the
/// containing block, then any 'auto' values for 'margin-left' or
/// 'margin-right' are, for the following rules, treated as zero."
///
/// The returned pair always satisfies
/// `left + border_box_width + right == cb_width`.
#[must_use]
pub fn resolve_auto_margins(
    cb_width: f32,
    border_box_width: f32,
    left: AutoOr,
    right: AutoOr,
    direction: Direction,
) -> (f32, f32) {
    let used_non_auto = left.to_px_or(0.0) + right.to_px_or(0.0);
    let (left, right) = if border_box_width + used_non_auto > cb_width {
        (
            AutoOr::Length(left.to_px_or(0.0)),
            AutoOr::Length(right.to_px_or(0.0)),
        )
    } else {
        (left, right)
    };

    match (left, right) {
        (AutoOr::Auto, AutoOr::Auto) => {
            let half = (cb_width - border_box_width) / 2.0;
            (half, half)
        }
        (AutoOr::Auto, AutoOr::Length(r)) => (cb_width - border_box_width - r, r),
        (AutoOr::Length(l), AutoOr::Auto) => (l, cb_width - border_box_width - l),
        (AutoOr::Length(l), AutoOr::Length(r)) => match direction {
            Direction::Ltr => (l, cb_width - border_box_width - l),
            Direction::Rtl => (cb_width - border_box_width - r, r),
        },
    }
}

/// How an 'auto' width is filled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutoWidth {
    /// [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    /// normal-flow blocks stretch to the containing block.
    Fill,
    /// [§ 10.3.5](https://www.w3.org/TR/CSS2/visudet.html#float-width)
    ///
    /// "min(max(preferred minimum width, available width), preferred width)"
    ///
    /// Used by floats, inline-blocks and absolutely positioned boxes. The
    /// preferred widths are content-box widths.
    ShrinkToFit {
        /// Preferred minimum (min-content) width.
        min_content: f32,
        /// Preferred (max-content) width.
        max_content: f32,
    },
}

/// Used horizontal metrics of a block-level box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BlockWidth {
    /// Content-box width.
    pub content_width: f32,
    /// Used left margin.
    pub margin_left: f32,
    /// Used right margin.
    pub margin_right: f32,
    /// Used padding (all sides, percentages against the containing block
    /// width).
    pub padding: EdgeSizes,
    /// Used border widths.
    pub border: EdgeSizes,
    /// Top and bottom margins, resolved against the containing block width
    /// ('auto' is zero for block-level boxes in normal flow).
    pub margin_top: f32,
    /// See `margin_top`.
    pub margin_bottom: f32,
}

impl BlockWidth {
    /// Content width plus horizontal padding and border.
    #[must_use]
    pub fn border_box_width(&self) -> f32 {
        self.content_width + self.padding.horizontal() + self.border.horizontal()
    }

    /// All four margins as used values.
    #[must_use]
    pub const fn margin(&self) -> EdgeSizes {
        EdgeSizes {
            top: self.margin_top,
            right: self.margin_right,
            bottom: self.margin_bottom,
            left: self.margin_left,
        }
    }
}

/// Width of a block-level box in normal flow.
///
/// See [`resolve_width`] for the general form.
#[must_use]
pub fn resolve_block_width(style: &ComputedStyle, cb_width: f32, viewport: Rect) -> BlockWidth {
    resolve_width(style, cb_width, viewport, AutoWidth::Fill)
}

/// Solve width and horizontal margins.
///
/// [§ 10.3 Calculating widths and margins](https://www.w3.org/TR/CSS2/visudet.html#Computing_widths_and_margins)
///
/// STEP 1: resolve edges against the containing block width.
/// STEP 2: compute the tentative content width ('auto' per `auto_width`,
///         percentages of a non-finite containing block become 'auto',
///         `box-sizing: border-box` subtracts padding and border).
/// STEP 3: clamp with min/max and, if the clamp moved the width, solve the
///         margins again with the clamped value as the specified width.
///
/// Shrink-to-fit boxes use zero for 'auto' margins (§ 10.3.5); normal-flow
/// blocks run [`resolve_auto_margins`].
#[must_use]
pub fn resolve_width(
    style: &ComputedStyle,
    cb_width: f32,
    viewport: Rect,
    auto_width: AutoWidth,
) -> BlockWidth {
    let cb_definite = cb_width.is_finite();
    let cb = if cb_definite { cb_width.max(0.0) } else { 0.0 };

    // STEP 1
    let edges = resolve_edges(style, cb, viewport);
    let pb = edges.padding.horizontal() + edges.border.horizontal();
    let ctx = style.length_context(viewport.width, viewport.height);
    let to_content = |v: f32| match style.box_sizing {
        BoxSizing::ContentBox => v.max(0.0),
        BoxSizing::BorderBox => (v - pb).max(0.0),
    };
    let resolve_limit = |l: LengthValue| {
        if l.is_percent() && !cb_definite {
            None
        } else {
            Some(to_content(l.to_px(cb, &ctx)))
        }
    };

    // STEP 2
    let specified = style.width.length().and_then(resolve_limit);
    let tentative = solve_horizontal(style, cb, pb, &edges, specified, auto_width);

    // STEP 3
    let min = style.min_width.and_then(resolve_limit);
    let max = style.max_width.and_then(resolve_limit);
    let clamped = clamp_min_max(tentative.0, min, max);
    let (content_width, margin_left, margin_right) =
        if (clamped - tentative.0).abs() > f32::EPSILON {
            solve_horizontal(style, cb, pb, &edges, Some(clamped), auto_width)
        } else {
            tentative
        };

    BlockWidth {
        content_width,
        margin_left,
        margin_right,
        padding: edges.padding,
        border: edges.border,
        margin_top: edges.margin.top.to_px_or(0.0),
        margin_bottom: edges.margin.bottom.to_px_or(0.0),
    }
}

fn solve_horizontal(
    style: &ComputedStyle,
    cb: f32,
    pb: f32,
    edges: &ResolvedEdges,
    specified: Option<f32>,
    auto_width: AutoWidth,
) -> (f32, f32, f32) {
    let (ml, mr) = (edges.margin.left, edges.margin.right);
    match auto_width {
        AutoWidth::ShrinkToFit {
            min_content,
            max_content,
        } => {
            let (l, r) = (ml.to_px_or(0.0), mr.to_px_or(0.0));
            let content = specified.unwrap_or_else(|| {
                let available = (cb - pb - l - r).max(0.0);
                min_content.max(available).min(max_content).max(0.0)
            });
            (content, l, r)
        }
        AutoWidth::Fill => {
            // "If 'width' is set to 'auto', any other 'auto' values become
            // '0' and 'width' follows from the resulting equality."
            let (content, ml, mr) = match specified {
                Some(w) => (w, ml, mr),
                None => {
                    let (l, r) = (ml.to_px_or(0.0), mr.to_px_or(0.0));
                    (
                        (cb - pb - l - r).max(0.0),
                        AutoOr::Length(l),
                        AutoOr::Length(r),
                    )
                }
            };
            let (l, r) = resolve_auto_margins(cb, content + pb, ml, mr, style.direction);
            (content, l, r)
        }
    }
}

/// [§ 10.6.3 Block-level non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
///
/// Used content height of a box.
///
/// `auto_height` is the height the content needs; it is used when 'height'
/// is 'auto' or a percentage of an indefinite containing block.
/// `padding_border` is the vertical padding plus border, needed for
/// `box-sizing: border-box`. Min/max percentages of an indefinite block
/// are ignored. Non-finite `auto_height` is treated as zero.
#[must_use]
pub fn resolve_height(
    style: &ComputedStyle,
    auto_height: f32,
    cb_height: Option<f32>,
    padding_border: f32,
    viewport: Rect,
) -> f32 {
    let ctx = style.length_context(viewport.width, viewport.height);
    let to_content = |v: f32| match style.box_sizing {
        BoxSizing::ContentBox => v.max(0.0),
        BoxSizing::BorderBox => (v - padding_border).max(0.0),
    };
    let resolve = |l: LengthValue| l.to_px_definite(cb_height, &ctx).map(to_content);

    let auto_height = if auto_height.is_finite() {
        auto_height.max(0.0)
    } else {
        0.0
    };
    let tentative = style.height.length().and_then(resolve).unwrap_or(auto_height);
    let min = style.min_height.and_then(resolve);
    let max = style.max_height.and_then(resolve);
    clamp_min_max(tentative, min, max)
}

/// The containing block of `node`.
///
/// [§ 10.1](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
///
/// - `static`, `relative`, `sticky`: "formed by the content edge of the
///   nearest block container ancestor box."
/// - `absolute`: the content box of the nearest positioned ancestor, or
///   the viewport.
/// - `fixed`: "established by the viewport".
///
/// The root has the viewport as its containing block.
///
/// If the ancestor's content height is not resolved yet (non-finite or
/// zero) but it has an explicit non-auto `height`, that explicit height is
/// used instead. This is an approximation: percentages inside boxes whose
/// height is still being computed resolve against the declared height.
#[must_use]
pub fn containing_block(tree: &LayoutTree, node: NodeId, viewport: Rect) -> ContainingBlock {
    let style = &tree[node].style;
    let ancestor = match style.position {
        Position::Fixed => None,
        Position::Absolute => tree
            .ancestors(node)
            .find(|&a| tree[a].style.position.is_positioned()),
        Position::Static | Position::Relative | Position::Sticky => {
            tree.ancestors(node).find(|&a| is_block_container(tree, a))
        }
    };
    ancestor.map_or_else(
        || ContainingBlock::viewport(viewport),
        |a| {
            ContainingBlock::from_content(
                tree[a].dimensions.content,
                ancestor_height(tree, a, viewport),
            )
        },
    )
}

/// Elements whose box can contain block-level boxes.
pub(crate) fn is_block_container(tree: &LayoutTree, id: NodeId) -> bool {
    let node = &tree[id];
    matches!(node.kind, NodeKind::Element(_)) && !matches!(node.style.display, Display::Inline)
}

fn ancestor_height(tree: &LayoutTree, id: NodeId, viewport: Rect) -> Option<f32> {
    let node = &tree[id];
    let height = node.dimensions.content.height;
    if height.is_finite() && height > 0.0 {
        return Some(height);
    }
    if node.style.height.is_auto() {
        return None;
    }
    let cb = containing_block(tree, id, viewport);
    let ctx = node.style.length_context(viewport.width, viewport.height);
    // A percentage of an indefinite block is still 'auto'.
    let _ = node.style.height.length()?.to_px_definite(cb.height, &ctx)?;
    let dims = &node.dimensions;
    let padding_border = dims.padding.vertical() + dims.border.vertical();
    Some(resolve_height(
        &node.style,
        0.0,
        cb.height,
        padding_border,
        viewport,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_min_wins_over_max() {
        assert!((clamp_min_max(50.0, Some(80.0), Some(60.0)) - 80.0).abs() < f32::EPSILON);
        assert!((clamp_min_max(90.0, None, Some(60.0)) - 60.0).abs() < f32::EPSILON);
        assert!((clamp_min_max(10.0, Some(20.0), None) - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert!((r.right() - 40.0).abs() < f32::EPSILON);
        assert!((r.bottom() - 60.0).abs() < f32::EPSILON);
    }
}
