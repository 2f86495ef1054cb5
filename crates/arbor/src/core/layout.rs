//! The two-pass measure and layout engine.
//!
//! A layout pass is two preorder walks. The measure pass asks every
//! node how large it wants to be under parent-imposed constraints; the
//! layout pass assigns final parent-relative bounds using those
//! answers. Passes are non-reentrant: layout requests raised while a
//! pass runs are deferred and replayed once it finishes.

use arbor_geom::Rect;

use crate::core::{
    id::NodeId,
    measure::{Measured, MeasureSpec, child_measure_spec},
    node::{Node, Visibility},
    tree::Tree,
};

/// Handle given to [`Measurable::measure`] implementations.
///
/// Composite nodes measure children through this handle; the handle
/// records the node's own result via [`set_measured`].
///
/// [`Measurable::measure`]: crate::core::caps::Measurable::measure
/// [`set_measured`]: MeasurePass::set_measured
pub struct MeasurePass<'a> {
    tree: &'a mut Tree,
    current: NodeId,
    recorded: bool,
}

impl MeasurePass<'_> {
    /// The node being measured.
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Read access to any node in the tree.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.node(id)
    }

    /// Children of the node being measured, in insertion order.
    pub fn children(&self) -> Vec<NodeId> {
        self.tree
            .node(self.current)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Derive the width spec to pass to `child`, given the constraint
    /// on the current node and the width already spoken for.
    pub fn child_width_spec(&self, child: NodeId, parent: MeasureSpec, used: i32) -> MeasureSpec {
        let policy = self
            .tree
            .node(child)
            .map(|n| n.width_policy)
            .unwrap_or_default();
        child_measure_spec(parent, used, policy)
    }

    /// Height counterpart of [`Self::child_width_spec`].
    pub fn child_height_spec(&self, child: NodeId, parent: MeasureSpec, used: i32) -> MeasureSpec {
        let policy = self
            .tree
            .node(child)
            .map(|n| n.height_policy)
            .unwrap_or_default();
        child_measure_spec(parent, used, policy)
    }

    /// Measure a child under the given constraints. The child's result
    /// is stored on the child and returned.
    pub fn measure_child(
        &mut self,
        child: NodeId,
        width: MeasureSpec,
        height: MeasureSpec,
    ) -> Measured {
        measure_node(self.tree, child, width, height)
    }

    /// Record the measured result for the node being measured. Every
    /// [`Measurable::measure`] implementation must call this exactly
    /// once before returning.
    ///
    /// [`Measurable::measure`]: crate::core::caps::Measurable::measure
    pub fn set_measured(&mut self, measured: Measured) {
        if let Some(n) = self.tree.nodes.get_mut(self.current) {
            n.measured = Some(measured);
        }
        self.recorded = true;
    }
}

/// Handle given to [`Positioner::position`] implementations.
///
/// [`Positioner::position`]: crate::core::caps::Positioner::position
pub struct LayoutPass<'a> {
    tree: &'a mut Tree,
    current: NodeId,
}

impl LayoutPass<'_> {
    /// The node being laid out.
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Read access to any node in the tree.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.node(id)
    }

    /// Children of the node being laid out, in insertion order.
    pub fn children(&self) -> Vec<NodeId> {
        self.tree
            .node(self.current)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// The child's result from the measure pass that just ran.
    pub fn measured(&self, child: NodeId) -> Option<Measured> {
        self.tree.node(child).and_then(|n| n.measured)
    }

    /// Assign a child's bounds, relative to the current node, and lay
    /// out the child's subtree.
    pub fn place_child(&mut self, child: NodeId, bounds: Rect) {
        layout_node(self.tree, child, bounds);
    }
}

/// Measure one node, storing and returning its result.
pub(crate) fn measure_node(
    tree: &mut Tree,
    id: NodeId,
    width: MeasureSpec,
    height: MeasureSpec,
) -> Measured {
    let Some(n) = tree.nodes.get_mut(id) else {
        return Measured::default();
    };
    if n.visibility == Visibility::Gone {
        let m = Measured::exact(0, 0);
        n.measured = Some(m);
        return m;
    }

    if let Some(mut cap) = n.caps.measure.take() {
        let mut pass = MeasurePass {
            tree,
            current: id,
            recorded: false,
        };
        cap.measure(&mut pass, width, height);
        let recorded = pass.recorded;
        if let Some(n) = tree.nodes.get_mut(id) {
            n.caps.measure = Some(cap);
        }
        if !recorded {
            // Continuing with a stale or absent measurement would
            // corrupt the whole pass, so this is fatal.
            panic!("measure() finished without calling set_measured on {id:?}");
        }
        return tree.nodes.get(id).and_then(|n| n.measured).unwrap_or_default();
    }

    // Default measurement: leaves want their preferred size, composites
    // want to envelope their children.
    let children = tree.nodes[id].children.clone();
    let mut desired = tree.nodes[id].preferred;
    for child in children {
        let Some(c) = tree.nodes.get(child) else {
            continue;
        };
        // Gone children still pass through measure_node, which records
        // their 0x0 result; they contribute nothing to the envelope.
        let cw = child_measure_spec(width, 0, c.width_policy);
        let ch = child_measure_spec(height, 0, c.height_policy);
        let m = measure_node(tree, child, cw, ch);
        desired.w = desired.w.max(m.width);
        desired.h = desired.h.max(m.height);
    }
    let m = Measured::resolve(desired, width, height);
    if let Some(n) = tree.nodes.get_mut(id) {
        n.measured = Some(m);
    }
    m
}

/// Assign a node's bounds and lay out its subtree.
pub(crate) fn layout_node(tree: &mut Tree, id: NodeId, bounds: Rect) {
    let Some(n) = tree.nodes.get_mut(id) else {
        return;
    };
    if n.visibility == Visibility::Gone {
        n.layout_requested = false;
        return;
    }
    if n.bounds != bounds {
        n.bounds = bounds;
        n.damaged = true;
    }
    n.layout_requested = false;

    let size = n
        .measured
        .map(|m| m.size())
        .unwrap_or_else(|| bounds.size());
    let local = Rect::new(0, 0, size.w, size.h);

    if let Some(mut cap) = n.caps.position.take() {
        let mut pass = LayoutPass { tree, current: id };
        cap.position(&mut pass, local);
        if let Some(n) = tree.nodes.get_mut(id) {
            n.caps.position = Some(cap);
        }
        return;
    }

    // Default placement stacks children at the origin.
    let children = tree.nodes[id].children.clone();
    for child in children {
        let Some(c) = tree.nodes.get(child) else {
            continue;
        };
        if c.visibility == Visibility::Gone {
            tree.nodes[child].layout_requested = false;
            continue;
        }
        let size = c.measured.map(|m| m.size()).unwrap_or_default();
        layout_node(tree, child, Rect::new(0, 0, size.w, size.h));
    }
}

impl Tree {
    /// Mark a node as needing re-layout and schedule a pass.
    ///
    /// The request propagates to the root so the next pass descends to
    /// the node. Requests raised during an active pass are deferred and
    /// replayed once it completes.
    pub fn request_layout(&mut self, id: NodeId) {
        if !self.nodes.contains_key(id) {
            return;
        }
        if self.in_layout {
            self.deferred_layout.push(id);
            return;
        }
        let mut current = Some(id);
        while let Some(node) = current {
            let n = &mut self.nodes[node];
            if n.layout_requested {
                // Ancestors are already marked.
                break;
            }
            n.layout_requested = true;
            current = n.parent;
        }
        if !self.layout_scheduled && self.is_attached(id) {
            self.layout_scheduled = true;
            self.request_frame();
        }
    }

    /// Has this node a pending layout request?
    pub fn is_layout_requested(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.layout_requested)
    }

    /// Set the size the root is measured against, scheduling a pass
    /// when it changes.
    pub fn set_root_size(&mut self, size: arbor_geom::Size) {
        if self.root_size != size {
            self.root_size = size;
            let root = self.root;
            self.request_layout(root);
        }
    }

    /// Run a full measure and layout pass over the attached tree.
    ///
    /// Called from the frame callback; may also be called directly by
    /// hosts that drive frames themselves. Re-entrant calls are no-ops.
    pub fn perform_layout(&mut self) {
        if self.in_layout {
            return;
        }
        self.layout_scheduled = false;
        self.in_layout = true;
        let size = self.root_size;
        {
            let mut guard = scopeguard::guard(&mut *self, |t| t.in_layout = false);
            let tree: &mut Self = &mut **guard;
            let root = tree.root;
            measure_node(
                tree,
                root,
                MeasureSpec::exactly(size.w),
                MeasureSpec::exactly(size.h),
            );
            layout_node(tree, root, Rect::new(0, 0, size.w, size.h));
        }
        let deferred = std::mem::take(&mut self.deferred_layout);
        for id in deferred {
            self.request_layout(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use arbor_geom::Size;

    use super::*;
    use crate::core::{caps::Measurable, measure::SizePolicy};

    #[test]
    fn default_leaf_measures_preferred_within_constraints() {
        let mut t = Tree::new();
        let a = t.add_child(t.root()).unwrap();
        t.set_preferred(a, Size::new(30, 200));
        t.set_size_policy(a, SizePolicy::WrapContent, SizePolicy::WrapContent);
        t.set_root_size(Size::new(100, 100));
        t.perform_layout();

        let m = t.node(a).unwrap().measured().unwrap();
        assert_eq!((m.width, m.height), (30, 100));
        assert!(!m.width_too_small);
        assert!(m.height_too_small);
    }

    #[test]
    fn match_parent_fills_root() {
        let mut t = Tree::new();
        let a = t.add_child(t.root()).unwrap();
        t.set_size_policy(a, SizePolicy::MatchParent, SizePolicy::MatchParent);
        t.set_root_size(Size::new(80, 60));
        t.perform_layout();
        assert_eq!(t.node(a).unwrap().bounds(), Rect::new(0, 0, 80, 60));
    }

    #[test]
    fn gone_children_take_no_space() {
        let mut t = Tree::new();
        let panel = t.add_child(t.root()).unwrap();
        t.set_size_policy(panel, SizePolicy::WrapContent, SizePolicy::WrapContent);
        let a = t.add_child(panel).unwrap();
        t.set_preferred(a, Size::new(50, 50));
        t.set_visibility(a, Visibility::Gone);
        let b = t.add_child(panel).unwrap();
        t.set_preferred(b, Size::new(20, 20));
        t.set_root_size(Size::new(100, 100));
        t.perform_layout();

        // The gone child still gets a recorded measurement.
        assert_eq!(t.node(a).unwrap().measured().unwrap().size(), Size::zero());
        // Its preferred size does not inflate the wrapping parent.
        assert_eq!(t.node(panel).unwrap().measured().unwrap().size(), Size::new(20, 20));
    }

    #[test]
    fn layout_clears_pending_request() {
        let mut t = Tree::new();
        let a = t.add_child(t.root()).unwrap();
        t.set_root_size(Size::new(10, 10));
        t.request_layout(a);
        assert!(t.is_layout_requested(a));
        assert!(t.is_layout_requested(t.root()));
        t.perform_layout();
        assert!(!t.is_layout_requested(a));
        assert!(!t.is_layout_requested(t.root()));
    }

    struct NoRecord;
    impl Measurable for NoRecord {
        fn measure(&mut self, _: &mut MeasurePass<'_>, _: MeasureSpec, _: MeasureSpec) {}
    }

    #[test]
    #[should_panic(expected = "set_measured")]
    fn measure_without_result_panics() {
        let mut t = Tree::new();
        let a = t.add_child(t.root()).unwrap();
        t.caps_mut(a).unwrap().set_measurable(NoRecord);
        t.set_root_size(Size::new(10, 10));
        t.perform_layout();
    }

    struct Reentrant;
    impl Measurable for Reentrant {
        fn measure(&mut self, pass: &mut MeasurePass<'_>, w: MeasureSpec, h: MeasureSpec) {
            pass.set_measured(Measured::resolve(Size::new(5, 5), w, h));
        }
    }

    #[test]
    fn layout_requested_during_pass_is_deferred() {
        let mut t = Tree::new();
        let a = t.add_child(t.root()).unwrap();
        t.caps_mut(a).unwrap().set_measurable(Reentrant);
        t.set_root_size(Size::new(10, 10));
        t.in_layout = true;
        t.request_layout(a);
        assert!(!t.is_layout_requested(a));
        assert_eq!(t.deferred_layout, vec![a]);
        t.in_layout = false;
    }
}
