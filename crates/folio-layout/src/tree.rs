//! The layout tree.
//!
//! An arena of [`LayoutNode`]s addressed by [`NodeId`]. Children are
//! ordered index lists and the parent link is a plain index, so passes can
//! walk up and down the tree without reference cycles.
//!
//! The host builds the tree (one node per generated box, in document order)
//! before layout starts. From then on the shape is fixed: passes only write
//! geometry, text runs and counter scopes.

use std::ops::{Index, IndexMut};
use std::sync::Arc;

use folio_style::ComputedStyle;
use serde::Serialize;

use crate::box_model::BoxDimensions;
use crate::counters::ScopeId;
use crate::justify::Run;

/// A type-safe index into the layout tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root box is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// What generated a box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    /// A box generated by an element, with its tag name.
    Element(String),
    /// A run of text. Its style is inherited from the parent box.
    Text(String),
    /// A replaced element (`img`, `canvas`, ...); sized by
    /// [`NodePayload::Intrinsic`].
    Replaced(String),
    /// A form control; sized by [`NodePayload::FormControl`].
    FormControl(String),
}

impl NodeKind {
    /// Tag name of element-like kinds.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element(tag) | Self::Replaced(tag) | Self::FormControl(tag) => Some(tag),
            Self::Text(_) => None,
        }
    }

    /// Atomic boxes are sized from intrinsic data and never contain flow.
    #[must_use]
    pub const fn is_atomic(&self) -> bool {
        matches!(self, Self::Replaced(_) | Self::FormControl(_))
    }
}

/// Intrinsic dimensions of a replaced element or form control.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct IntrinsicSize {
    /// Natural width in px.
    pub width: f32,
    /// Natural height in px.
    pub height: f32,
}

/// Data a form control brings to layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FormControlData {
    /// Size the control renders at when not sized by style.
    pub intrinsic: IntrinsicSize,
    /// Current value, drawn by the backend.
    pub value: String,
}

/// Table structure handed over by the (external) table algorithm.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TableMetadata {
    /// Column count.
    pub columns: usize,
    /// Row count.
    pub rows: usize,
}

/// Grid structure handed over by the (external) grid algorithm.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GridMetadata {
    /// Resolved column track sizes in px.
    pub column_tracks: Vec<f32>,
    /// Resolved row track sizes in px.
    pub row_tracks: Vec<f32>,
}

/// Per-kind data attached to a node.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum NodePayload {
    /// Nothing extra.
    #[default]
    None,
    /// Text runs produced by inline layout, in line order.
    Runs(Vec<Run>),
    /// Natural size of a replaced element.
    Intrinsic(IntrinsicSize),
    /// Form control data.
    FormControl(FormControlData),
    /// Table structure.
    Table(TableMetadata),
    /// Grid structure.
    Grid(GridMetadata),
}

/// One box of the layout tree.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutNode {
    /// What generated this box.
    pub kind: NodeKind,
    /// Computed style, shared and read-only.
    #[serde(skip)]
    pub style: Arc<ComputedStyle>,
    /// Box geometry, written by layout.
    pub dimensions: BoxDimensions,
    /// Width of the scrollable overflow area (padding box or larger).
    pub scroll_width: f32,
    /// Height of the scrollable overflow area.
    pub scroll_height: f32,
    /// Children in document order.
    pub children: Vec<NodeId>,
    /// Parent box; `None` only for the root.
    pub parent: Option<NodeId>,
    /// Per-kind payload.
    pub payload: NodePayload,
    /// Counter scope registered for this box.
    pub counter_scope: Option<ScopeId>,
}

impl LayoutNode {
    fn new(kind: NodeKind, style: Arc<ComputedStyle>, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            style,
            dimensions: BoxDimensions::default(),
            scroll_width: 0.0,
            scroll_height: 0.0,
            children: Vec::new(),
            parent,
            payload: NodePayload::None,
            counter_scope: None,
        }
    }

    /// Text runs, if inline layout produced any for this node.
    #[must_use]
    pub fn runs(&self) -> &[Run] {
        match &self.payload {
            NodePayload::Runs(runs) => runs,
            _ => &[],
        }
    }

    /// Mutable access to the text runs.
    pub fn runs_mut(&mut self) -> &mut [Run] {
        match &mut self.payload {
            NodePayload::Runs(runs) => runs,
            _ => &mut [],
        }
    }

    /// True for text nodes.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }
}

/// Arena of layout boxes.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutTree {
    nodes: Vec<LayoutNode>,
}

impl LayoutTree {
    /// Create a tree holding only the root box.
    #[must_use]
    pub fn new(root_style: ComputedStyle) -> Self {
        Self {
            nodes: vec![LayoutNode::new(
                NodeKind::Element("html".to_string()),
                Arc::new(root_style),
                None,
            )],
        }
    }

    /// The root box.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of boxes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a box by id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.get(id.0)
    }

    /// Get a mutable box by id.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut LayoutNode> {
        self.nodes.get_mut(id.0)
    }

    /// Append a new box as the last child of `parent`.
    ///
    /// `parent` must already be in the tree.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind, style: Arc<ComputedStyle>) -> NodeId {
        debug_assert!(parent.0 < self.nodes.len(), "append to unknown parent {parent:?}");
        let id = NodeId(self.nodes.len());
        self.nodes.push(LayoutNode::new(kind, style, Some(parent)));
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.push(id);
        }
        id
    }

    /// Append an element box.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, style: ComputedStyle) -> NodeId {
        self.append(parent, NodeKind::Element(tag.to_string()), Arc::new(style))
    }

    /// Append a text box inheriting from `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let style = self
            .get(parent)
            .map_or_else(ComputedStyle::inline, |p| ComputedStyle::inherit_for_text(&p.style));
        self.append(parent, NodeKind::Text(text.to_string()), Arc::new(style))
    }

    /// Attach per-kind data to a box.
    pub fn set_payload(&mut self, id: NodeId, payload: NodePayload) {
        if let Some(node) = self.get_mut(id) {
            node.payload = payload;
        }
    }

    /// Get the parent of a box.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a box.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Iterate over all ancestors of a box, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// True if `descendant` is strictly inside `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|a| a == ancestor)
    }

    /// Every box of the subtree rooted at `id` (including `id`), in
    /// document order (pre-order).
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Every box in document order.
    #[must_use]
    pub fn document_order(&self) -> Vec<NodeId> {
        self.subtree(NodeId::ROOT)
    }

    /// Iterate over `(id, node)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &LayoutNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Move a box, its descendants and their text runs by `(dx, dy)`.
    pub fn translate_subtree(&mut self, id: NodeId, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        for current in self.subtree(id) {
            let node = &mut self[current];
            node.dimensions.translate(dx, dy);
            for run in node.runs_mut() {
                run.matrix.translate(dx, dy);
            }
        }
    }
}

impl Index<NodeId> for LayoutTree {
    type Output = LayoutNode;

    fn index(&self, id: NodeId) -> &LayoutNode {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for LayoutTree {
    fn index_mut(&mut self, id: NodeId) -> &mut LayoutNode {
        &mut self.nodes[id.0]
    }
}

/// Iterator over ancestors of a box.
pub struct AncestorIterator<'a> {
    tree: &'a LayoutTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_order_is_preorder() {
        let mut tree = LayoutTree::new(ComputedStyle::default());
        let a = tree.append_element(NodeId::ROOT, "div", ComputedStyle::default());
        let a1 = tree.append_text(a, "hello");
        let b = tree.append_element(NodeId::ROOT, "div", ComputedStyle::default());
        assert_eq!(tree.document_order(), vec![NodeId::ROOT, a, a1, b]);
        assert_eq!(tree.ancestors(a1).collect::<Vec<_>>(), vec![a, NodeId::ROOT]);
        assert!(tree.is_descendant_of(a1, NodeId::ROOT));
        assert!(!tree.is_descendant_of(b, a));
    }
}
