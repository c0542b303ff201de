//! CSS Formatting Contexts.
//!
//! [§ 9.4 Normal flow](https://www.w3.org/TR/CSS2/visuren.html#normal-flow)
//!
//! "Boxes in the normal flow belong to a formatting context, which may be
//! block or inline, but not both simultaneously."

use folio_style::{ComputedStyle, Display, Overflow};
use serde::Serialize;

use crate::tree::{LayoutNode, LayoutTree, NodeId, NodeKind};

/// How a box lays out its contents. Selected once per box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormattingContext {
    /// Block container laying out block-level children, or lines.
    Block,
    /// Inline box or text; participates in its container's lines.
    Inline,
    /// Replaced element sized from its intrinsic dimensions.
    Replaced,
    /// Form control sized from its control data.
    FormControl,
    /// Flex container. Laid out as a block.
    Flex,
    /// Grid container. Laid out as a block, at least as tall as its row
    /// tracks.
    Grid,
    /// Table. Laid out as a block.
    Table,
}

impl FormattingContext {
    /// Pick the context for a box from its kind and `display`.
    #[must_use]
    pub fn select(node: &LayoutNode) -> Self {
        match node.kind {
            NodeKind::Text(_) => Self::Inline,
            NodeKind::Replaced(_) => Self::Replaced,
            NodeKind::FormControl(_) => Self::FormControl,
            NodeKind::Element(_) => match node.style.display {
                Display::Inline => Self::Inline,
                Display::Flex => Self::Flex,
                Display::Grid => Self::Grid,
                Display::Table => Self::Table,
                Display::Block
                | Display::InlineBlock
                | Display::ListItem
                | Display::FlowRoot
                | Display::None => Self::Block,
            },
        }
    }

    /// True for contexts whose layout algorithm lives outside the engine.
    #[must_use]
    pub const fn is_external(self) -> bool {
        matches!(self, Self::Flex | Self::Grid | Self::Table)
    }
}

/// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
///
/// "Floats, absolutely positioned elements, block containers (such as
/// inline-blocks, table-cells, and table-captions) that are not block boxes,
/// and block boxes with 'overflow' other than 'visible' (except when that
/// value has been propagated to the viewport) establish new block
/// formatting contexts for their contents."
///
/// `display: flow-root` and flex, grid and table containers do as well.
#[must_use]
pub fn establishes_bfc(style: &ComputedStyle) -> bool {
    style.is_floated()
        || style.is_out_of_flow()
        || style.overflow != Overflow::Visible
        || matches!(
            style.display,
            Display::InlineBlock
                | Display::FlowRoot
                | Display::Flex
                | Display::Grid
                | Display::Table
        )
}

/// [`establishes_bfc`] for a box in the tree; the root always does.
#[must_use]
pub fn node_establishes_bfc(tree: &LayoutTree, id: NodeId) -> bool {
    id == tree.root() || establishes_bfc(&tree[id].style)
}
