//! The node arena and structural tree operations.
//!
//! Parent and child links are arena ids, never owning pointers, so
//! subtree teardown is a bulk operation with no reference-cycle
//! hazards. All mutation happens on the owning thread; see
//! [`crate::Poster`] for the cross-thread entry points.

use std::{
    collections::{BinaryHeap, HashMap},
    sync::mpsc,
};

use arbor_geom::{Point, Rect, Size};
use serde_json::Value;

use crate::core::{
    caps::Capabilities,
    error::{Error, Result},
    event::PointerId,
    id::NodeId,
    invalidate::{DelayedPost, FrameScheduler, Posted},
    measure::SizePolicy,
    node::{Node, NodeFlags, Transform, Visibility},
    scroll::NestedScrollBinding,
};

/// The widget tree: node arena plus the state of every engine built on
/// it (layout, invalidation, dispatch, nested scroll, focus).
pub struct Tree {
    /// Node storage arena.
    pub(crate) nodes: slotmap::SlotMap<NodeId, Node>,
    /// Root node id. The root is always attached.
    pub(crate) root: NodeId,

    /// Currently focused node, at most one per tree.
    pub(crate) focus: Option<NodeId>,
    /// Whether the tree is in touch mode.
    pub(crate) touch_mode: bool,

    /// Per-pointer capture targets for in-progress gestures.
    pub(crate) pointer_targets: HashMap<PointerId, NodeId>,

    /// Active nested scroll bindings, keyed by the initiating child.
    pub(crate) nested_scrolls: HashMap<NodeId, NestedScrollBinding>,

    /// A measure/layout pass is currently running.
    pub(crate) in_layout: bool,
    /// Layout requests raised while a pass was active.
    pub(crate) deferred_layout: Vec<NodeId>,
    /// A coalesced re-layout is already scheduled for the next frame.
    pub(crate) layout_scheduled: bool,
    /// Size the root is measured against.
    pub(crate) root_size: Size,

    /// Host callback for frame scheduling.
    pub(crate) scheduler: Option<Box<dyn FrameScheduler>>,
    /// A frame has been requested and not yet run.
    pub(crate) frame_requested: bool,

    /// Cross-thread post queue, drained FIFO on the owning thread.
    pub(crate) post_tx: mpsc::Sender<Posted>,
    /// Receiving end of the post queue.
    pub(crate) post_rx: mpsc::Receiver<Posted>,
    /// Delayed posts ordered by target time.
    pub(crate) delayed: BinaryHeap<DelayedPost>,

    /// Generic side table keyed by `(node, key)`.
    pub(crate) tags: HashMap<(NodeId, String), Value>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree with an attached root node.
    pub fn new() -> Self {
        let mut nodes = slotmap::SlotMap::with_key();
        let mut root_node = Node::new();
        root_node.attached = true;
        let root = nodes.insert(root_node);
        let (post_tx, post_rx) = mpsc::channel();
        Self {
            nodes,
            root,
            focus: None,
            touch_mode: false,
            pointer_targets: HashMap::new(),
            nested_scrolls: HashMap::new(),
            in_layout: false,
            deferred_layout: Vec::new(),
            layout_scheduled: false,
            root_size: Size::zero(),
            scheduler: None,
            frame_requested: false,
            post_tx,
            post_rx,
            delayed: BinaryHeap::new(),
            tags: HashMap::new(),
        }
    }

    /// Return the root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Return a reference to a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Return the number of nodes in the arena, including detached ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Is the arena down to just the root?
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Is the node present and connected to the root?
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.attached)
    }

    /// Create a new detached node. It participates in nothing until it
    /// is inserted under a rooted ancestor.
    pub fn create_node(&mut self) -> NodeId {
        self.nodes.insert(Node::new())
    }

    /// Create a node and attach it as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId) -> Result<NodeId> {
        let id = self.create_node();
        self.attach_child(parent, id)?;
        Ok(id)
    }

    /// Attach an existing detached node as the last child of `parent`.
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self
            .nodes
            .get(parent)
            .ok_or(Error::NodeNotFound(parent))?
            .children
            .len();
        self.insert_child(parent, index, child)
    }

    /// Attach an existing detached node at `index` in `parent`'s child
    /// list. Insertion order is paint and traversal order.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        let child_node = self.nodes.get(child).ok_or(Error::NodeNotFound(child))?;
        if child == self.root {
            return Err(Error::RootNode);
        }
        if child_node.parent.is_some() {
            return Err(Error::AlreadyParented(child));
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(Error::WouldCycle(child));
        }

        let parent_attached = {
            let p = &mut self.nodes[parent];
            let index = index.min(p.children.len());
            p.children.insert(index, child);
            p.attached
        };
        self.nodes[child].parent = Some(parent);
        if parent_attached {
            self.set_attached_recursive(child, true);
        }
        self.request_layout(parent);
        self.invalidate(parent);
        Ok(())
    }

    /// Detach a node from its parent, keeping the subtree alive in the
    /// arena. Severs both directions: the parent forgets the child and
    /// the child forgets the parent.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(Error::RootNode);
        }
        let parent = self
            .nodes
            .get(id)
            .ok_or(Error::NodeNotFound(id))?
            .parent;
        let Some(parent) = parent else {
            return Ok(());
        };

        let recovery = self.prepare_focus_recovery(id);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        self.nodes[id].parent = None;
        self.set_attached_recursive(id, false);
        self.repair_after_removal(id, recovery);
        self.request_layout(parent);
        self.invalidate(parent);
        Ok(())
    }

    /// Remove a node and its whole subtree from the arena.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        self.detach(id)?;
        for node in self.collect_subtree(id) {
            self.tags.retain(|(owner, _), _| *owner != node);
            self.nodes.remove(node);
        }
        Ok(())
    }

    /// Is `ancestor` a strict ancestor of `node`?
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Node ids from the root down to `id`, inclusive. Empty when the
    /// node is absent or detached from the root.
    pub(crate) fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            let Some(n) = self.nodes.get(node) else {
                return Vec::new();
            };
            path.push(node);
            current = n.parent;
        }
        if path.last() != Some(&self.root) {
            return Vec::new();
        }
        path.reverse();
        path
    }

    /// All ids in the subtree under `id`, preorder, `id` first.
    pub(crate) fn collect_subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let Some(n) = self.nodes.get(node) else {
                continue;
            };
            out.push(node);
            for child in n.children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Bounds of `id` in root coordinates, accounting for ancestor
    /// scroll offsets. `None` for absent or detached nodes.
    pub fn absolute_bounds(&self, id: NodeId) -> Option<Rect> {
        let path = self.path_from_root(id);
        if path.is_empty() {
            return None;
        }
        let mut origin = Point::zero();
        let mut bounds = Rect::zero();
        for (depth, node) in path.iter().enumerate() {
            let n = &self.nodes[*node];
            bounds = n.bounds.offset(origin.x, origin.y);
            if depth + 1 < path.len() {
                origin = Point::new(
                    bounds.left - n.scroll.x,
                    bounds.top - n.scroll.y,
                );
            }
        }
        Some(bounds)
    }

    /// Is the node and every ancestor visible?
    pub(crate) fn effectively_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            let Some(n) = self.nodes.get(node) else {
                return false;
            };
            if n.visibility != Visibility::Visible {
                return false;
            }
            current = n.parent;
        }
        true
    }

    fn set_attached_recursive(&mut self, id: NodeId, attached: bool) {
        for node in self.collect_subtree(id) {
            if let Some(n) = self.nodes.get_mut(node) {
                n.attached = attached;
            }
        }
    }

    /// Drop dispatch, scroll, and focus references into a subtree that
    /// has left the attached tree.
    fn repair_after_removal(&mut self, removed_root: NodeId, recovery: Option<NodeId>) {
        let in_subtree = |tree: &Self, id: NodeId| {
            id == removed_root || tree.is_ancestor(removed_root, id)
        };

        // Gestures whose target left the tree are dropped, not cancelled;
        // the node is no longer reachable for delivery.
        let stale: Vec<PointerId> = self
            .pointer_targets
            .iter()
            .filter(|(_, target)| in_subtree(self, **target))
            .map(|(pointer, _)| *pointer)
            .collect();
        for pointer in stale {
            self.pointer_targets.remove(&pointer);
        }

        let stale_scrolls: Vec<NodeId> = self
            .nested_scrolls
            .keys()
            .filter(|child| in_subtree(self, **child))
            .copied()
            .collect();
        for child in stale_scrolls {
            self.stop_nested_scroll(child);
        }

        if let Some(focus) = self.focus
            && in_subtree(self, focus)
        {
            self.move_focus_after_removal(recovery);
        }
    }

    // --- Node attribute mutation -------------------------------------

    /// Set node visibility. Changing to or from [`Visibility::Gone`]
    /// affects layout; any change invalidates.
    pub fn set_visibility(&mut self, id: NodeId, visibility: Visibility) {
        let Some(n) = self.nodes.get_mut(id) else {
            return;
        };
        let old = n.visibility;
        if old == visibility {
            return;
        }
        n.visibility = visibility;
        let parent = n.parent;
        if old == Visibility::Gone || visibility == Visibility::Gone {
            self.request_layout(parent.unwrap_or(id));
        }
        self.invalidate(id);
        if visibility != Visibility::Visible {
            self.ensure_focus_valid();
        }
    }

    /// Set and clear flags on a node.
    pub fn modify_flags(&mut self, id: NodeId, set: NodeFlags, clear: NodeFlags) {
        let Some(n) = self.nodes.get_mut(id) else {
            return;
        };
        n.flags.insert(set);
        n.flags.remove(clear);
        if clear.intersects(NodeFlags::FOCUSABLE | NodeFlags::ENABLED) {
            self.ensure_focus_valid();
        }
    }

    /// Set the desired content size used by default measurement.
    pub fn set_preferred(&mut self, id: NodeId, preferred: Size) {
        if let Some(n) = self.nodes.get_mut(id)
            && n.preferred != preferred
        {
            n.preferred = preferred;
            self.request_layout(id);
        }
    }

    /// Set the per-axis sizing policy consulted by parents when they
    /// derive child measure specs.
    pub fn set_size_policy(&mut self, id: NodeId, width: SizePolicy, height: SizePolicy) {
        if let Some(n) = self.nodes.get_mut(id) {
            n.width_policy = width;
            n.height_policy = height;
            self.request_layout(id);
        }
    }

    /// Set the scroll offset of a node's content.
    pub fn set_scroll(&mut self, id: NodeId, offset: Point) {
        if let Some(n) = self.nodes.get_mut(id)
            && n.scroll != offset
        {
            n.scroll = offset;
            self.invalidate(id);
        }
    }

    /// Adjust the scroll offset of a node's content.
    pub fn scroll_by(&mut self, id: NodeId, dx: i32, dy: i32) {
        if let Some(n) = self.nodes.get(id) {
            let next = n.scroll.offset(dx, dy);
            self.set_scroll(id, next);
        }
    }

    /// Set the presentational transform. Purely visual; layout bounds
    /// are unaffected.
    pub fn set_transform(&mut self, id: NodeId, transform: Transform) {
        if let Some(n) = self.nodes.get_mut(id) {
            n.transform = transform;
            self.invalidate(id);
        }
    }

    /// Set the paint-order override.
    pub fn set_z(&mut self, id: NodeId, z: f32) {
        if let Some(n) = self.nodes.get_mut(id)
            && n.z != z
        {
            n.z = z;
            self.invalidate(id);
        }
    }

    /// Set the stable identifier used by hierarchy state save/restore.
    pub fn set_state_id(&mut self, id: NodeId, state_id: Option<u64>) {
        if let Some(n) = self.nodes.get_mut(id) {
            n.state_id = state_id;
        }
    }

    /// Override bounds for the current frame only, for animations. The
    /// layout invariant (`bounds == measured size`) is restored by the
    /// next layout pass; no layout is requested here.
    pub fn set_animated_bounds(&mut self, id: NodeId, bounds: Rect) {
        if let Some(n) = self.nodes.get_mut(id) {
            n.bounds = bounds;
            self.invalidate(id);
        }
    }

    /// Mutable access to a node's capability slots.
    pub fn caps_mut(&mut self, id: NodeId) -> Option<&mut Capabilities> {
        self.nodes.get_mut(id).map(|n| &mut n.caps)
    }

    // --- Tag side table ----------------------------------------------

    /// Store an arbitrary value keyed by `(node, key)`.
    pub fn set_tag(&mut self, id: NodeId, key: &str, value: Value) {
        if self.nodes.contains_key(id) {
            self.tags.insert((id, key.to_owned()), value);
        }
    }

    /// Look up a value stored for `(node, key)`.
    pub fn tag(&self, id: NodeId, key: &str) -> Option<&Value> {
        self.tags.get(&(id, key.to_owned()))
    }

    /// Remove a tag, returning it if present.
    pub fn take_tag(&mut self, id: NodeId, key: &str) -> Option<Value> {
        self.tags.remove(&(id, key.to_owned()))
    }
}
