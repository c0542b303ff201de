//! CSS Stacking Contexts and Painting Order.
//!
//! [§ 9.9 Layered presentation](https://www.w3.org/TR/CSS2/visuren.html#layers)
//!
//! "An element in CSS 2 may have a stack level, which describes its position
//! within a set of elements sharing the same stacking context."
//!
//! [CSS 2.1 Appendix E: Elaborate description of Stacking Contexts](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! The stacking tree runs parallel to the layout tree but only has a node
//! where a box establishes a context. Painting a context emits, in order:
//!
//! 1. the box that anchors it;
//! 2. child contexts with negative stack levels, lowest first;
//! 3. every other member box in document order;
//! 4. child contexts with stack level 0 or above, lowest first.
//!
//! Ties keep document order. A child context is painted whole where it
//! sorts, so its boxes never interleave with its siblings'.

use folio_style::{ComputedStyle, Isolation, Position};
use serde::Serialize;
use tracing::debug;

use crate::tree::{LayoutTree, NodeId};

/// Index of a stacking context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StackingContextId(pub usize);

impl StackingContextId {
    /// The root context, anchored at the root box.
    pub const ROOT: Self = Self(0);
}

/// One stacking context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackingContextNode {
    /// This context.
    pub id: StackingContextId,
    /// The box that establishes it.
    pub node: NodeId,
    /// Enclosing context; `None` for the root.
    pub parent: Option<StackingContextId>,
    /// Contexts established by member boxes, in document order.
    pub children: Vec<StackingContextId>,
    /// Stack level inside the parent context.
    pub z: i32,
    /// Boxes painted by this context besides its anchor, in document
    /// order. Includes the anchors of child contexts.
    pub members: Vec<NodeId>,
}

/// [§ 9.9.1 Specifying the stack level](https://www.w3.org/TR/CSS2/visuren.html#z-index)
///
/// "The root element forms the root stacking context. Other stacking
/// contexts are generated by any positioned element (including relatively
/// positioned elements) having a computed value of 'z-index' other than
/// 'auto'."
///
/// Fixed and sticky boxes, `opacity < 1`, transforms, filters and
/// `isolation: isolate` also create one; with `z-index: auto` their level
/// is 0.
#[must_use]
pub fn creates_stacking_context(style: &ComputedStyle) -> bool {
    (style.position.is_positioned() && style.z_index.value().is_some())
        || matches!(style.position, Position::Fixed | Position::Sticky)
        || style.opacity < 1.0
        || style.has_transform
        || style.has_filter
        || style.isolation == Isolation::Isolate
}

/// Stacking contexts of a laid-out tree.
#[derive(Debug, Clone, Serialize)]
pub struct StackingTree {
    contexts: Vec<StackingContextNode>,
    anchored: Vec<Option<StackingContextId>>,
}

impl StackingTree {
    /// All contexts; index 0 is the root.
    #[must_use]
    pub fn contexts(&self) -> &[StackingContextNode] {
        &self.contexts
    }

    /// A context by id.
    #[must_use]
    pub fn get(&self, id: StackingContextId) -> Option<&StackingContextNode> {
        self.contexts.get(id.0)
    }

    /// The context `node` establishes, if any.
    #[must_use]
    pub fn anchored_by(&self, node: NodeId) -> Option<StackingContextId> {
        self.anchored.get(node.0).copied().flatten()
    }

    /// Paint order of every box, starting from the root context.
    #[must_use]
    pub fn paint_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.anchored.len());
        if !self.contexts.is_empty() {
            self.paint_context(StackingContextId::ROOT, &mut out);
        }
        out
    }

    /// [Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
    fn paint_context(&self, id: StackingContextId, out: &mut Vec<NodeId>) {
        let Some(context) = self.get(id) else {
            return;
        };
        // STEP 1: The anchor.
        out.push(context.node);

        // STEP 2: Split members into layers. Sorting is stable, so equal
        // stack levels stay in document order.
        let mut negative = Vec::new();
        let mut flow = Vec::new();
        let mut positive = Vec::new();
        for &member in &context.members {
            match self.anchored_by(member).and_then(|c| self.get(c)) {
                Some(child) if child.z < 0 => negative.push(child),
                Some(child) => positive.push(child),
                None => flow.push(member),
            }
        }
        negative.sort_by_key(|c| c.z);
        positive.sort_by_key(|c| c.z);

        // STEP 3: Paint.
        for child in negative {
            self.paint_context(child.id, out);
        }
        out.extend(flow);
        for child in positive {
            self.paint_context(child.id, out);
        }
    }
}

/// Build the stacking tree in one document-order walk.
#[must_use]
pub fn build_stacking_tree(tree: &LayoutTree) -> StackingTree {
    let mut contexts: Vec<StackingContextNode> = Vec::new();
    let mut anchored: Vec<Option<StackingContextId>> = vec![None; tree.len()];
    let mut owner: Vec<StackingContextId> = vec![StackingContextId::ROOT; tree.len()];

    for id in tree.document_order() {
        let style = &tree[id].style;
        let Some(parent) = tree.parent(id) else {
            contexts.push(StackingContextNode {
                id: StackingContextId::ROOT,
                node: id,
                parent: None,
                children: Vec::new(),
                z: 0,
                members: Vec::new(),
            });
            anchored[id.0] = Some(StackingContextId::ROOT);
            owner[id.0] = StackingContextId::ROOT;
            continue;
        };
        // Boxes inside `parent` belong to the context `parent` anchors, or
        // to the one `parent` itself belongs to.
        let context = anchored[parent.0].unwrap_or(owner[parent.0]);
        owner[id.0] = context;
        if let Some(c) = contexts.get_mut(context.0) {
            c.members.push(id);
        }
        if creates_stacking_context(style) {
            let child = StackingContextId(contexts.len());
            contexts.push(StackingContextNode {
                id: child,
                node: id,
                parent: Some(context),
                children: Vec::new(),
                z: context_level(style),
                members: Vec::new(),
            });
            if let Some(c) = contexts.get_mut(context.0) {
                c.children.push(child);
            }
            anchored[id.0] = Some(child);
            debug!(node = id.0, context = child.0, parent = context.0, "stacking context");
        }
    }
    StackingTree { contexts, anchored }
}

/// Stack level of a context. Only positioned boxes carry their
/// `z-index`; contexts from other triggers sit at level 0.
fn context_level(style: &ComputedStyle) -> i32 {
    if style.position.is_positioned() {
        style.z_index.value().unwrap_or(0)
    } else {
        0
    }
}

/// Paint order of every box in `tree`. Each box appears exactly once.
#[must_use]
pub fn resolve_paint_order(tree: &LayoutTree) -> Vec<NodeId> {
    build_stacking_tree(tree).paint_order()
}
