//! Focus state, eligibility, navigation, and recovery.
//!
//! At most one node holds focus. Directional navigation uses a beam
//! heuristic over absolute bounds: candidates whose perpendicular span
//! overlaps the current node's beat candidates that are merely nearby.
//! Sequential navigation walks the tree in preorder and wraps.

use arbor_geom::Rect;

use crate::core::{
    id::NodeId,
    node::{NodeFlags, Visibility},
    tree::Tree,
};

/// Direction of a focus movement request.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum FocusDirection {
    /// Spatially upward.
    Up,
    /// Spatially downward.
    Down,
    /// Spatially left.
    Left,
    /// Spatially right.
    Right,
    /// Next in preorder (Tab).
    Forward,
    /// Previous in preorder (Shift-Tab).
    Backward,
}

impl FocusDirection {
    fn is_directional(self) -> bool {
        !matches!(self, Self::Forward | Self::Backward)
    }
}

impl Tree {
    /// The currently focused node, if any.
    pub fn focused(&self) -> Option<NodeId> {
        self.focus
    }

    /// Is the tree in touch mode?
    pub fn touch_mode(&self) -> bool {
        self.touch_mode
    }

    /// Can this node hold focus right now?
    ///
    /// Requires the focusable and enabled flags, non-empty bounds,
    /// effective visibility, attachment, no focus-blocking ancestor,
    /// and, in touch mode, the touch-mode focusable flag.
    pub fn is_focusable(&self, id: NodeId) -> bool {
        let Some(n) = self.nodes.get(id) else {
            return false;
        };
        if !n.attached
            || !n.flags.contains(NodeFlags::FOCUSABLE | NodeFlags::ENABLED)
            || n.bounds.is_empty()
            || !self.effectively_visible(id)
        {
            return false;
        }
        if self.touch_mode && !n.flags.contains(NodeFlags::FOCUSABLE_IN_TOUCH_MODE) {
            return false;
        }
        !self.focus_blocked(id)
    }

    /// Does a strict ancestor block focus for this subtree?
    fn focus_blocked(&self, id: NodeId) -> bool {
        let mut current = self.nodes.get(id).and_then(|n| n.parent);
        while let Some(node) = current {
            let Some(n) = self.nodes.get(node) else {
                return true;
            };
            if n.flags.contains(NodeFlags::BLOCK_DESCENDANT_FOCUS) {
                return true;
            }
            current = n.parent;
        }
        false
    }

    /// Give focus to a node. Returns `false` when the node is not
    /// currently focusable.
    ///
    /// The old holder's listener hears the loss before the new holder's
    /// listener hears the gain.
    pub fn request_focus(&mut self, id: NodeId) -> bool {
        if self.focus == Some(id) {
            return true;
        }
        if !self.is_focusable(id) {
            return false;
        }
        if let Some(old) = self.focus.take() {
            self.notify_focus(old, false);
            self.invalidate(old);
        }
        self.focus = Some(id);
        self.notify_focus(id, true);
        self.invalidate(id);
        true
    }

    /// Drop focus entirely.
    pub fn clear_focus(&mut self) {
        if let Some(old) = self.focus.take() {
            self.notify_focus(old, false);
            self.invalidate(old);
        }
    }

    fn notify_focus(&mut self, id: NodeId, focused: bool) {
        let Some(n) = self.nodes.get_mut(id) else {
            return;
        };
        if let Some(mut cap) = n.caps.focus.take() {
            cap.focus_changed(id, focused);
            if let Some(n) = self.nodes.get_mut(id) {
                n.caps.focus = Some(cap);
            }
        }
    }

    /// Enter or leave touch mode. Leaving touch mode does not move
    /// focus by itself; key dispatch does that on the first directional
    /// key.
    pub fn set_touch_mode(&mut self, touch_mode: bool) {
        if self.touch_mode == touch_mode {
            return;
        }
        self.touch_mode = touch_mode;
        if touch_mode {
            self.ensure_focus_valid();
        }
    }

    /// Find the node focus should move to, without moving it.
    ///
    /// Directional search is scoped to the nearest focus-cluster
    /// ancestor of `from` (the whole tree when there is none) and picks
    /// the best candidate strictly in the given direction. Sequential
    /// search walks the scope in preorder and wraps.
    pub fn focus_search(&self, from: Option<NodeId>, direction: FocusDirection) -> Option<NodeId> {
        let scope = from.map_or(self.root, |f| self.cluster_scope(f));
        let order: Vec<NodeId> = self
            .collect_subtree(scope)
            .into_iter()
            .filter(|id| !self.pruned_for_focus(*id))
            .collect();
        let candidates: Vec<NodeId> = order
            .iter()
            .copied()
            .filter(|id| Some(*id) != from && self.is_focusable(*id))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        if direction.is_directional() {
            let from_rect = from.and_then(|f| self.absolute_bounds(f))?;
            return self.best_directional(&candidates, from_rect, direction);
        }

        let Some(from) = from else {
            return match direction {
                FocusDirection::Backward => candidates.last().copied(),
                _ => candidates.first().copied(),
            };
        };
        let pos = order.iter().position(|id| *id == from)?;
        match direction {
            FocusDirection::Forward => order[pos + 1..]
                .iter()
                .chain(order[..pos].iter())
                .copied()
                .find(|id| candidates.contains(id)),
            _ => order[..pos]
                .iter()
                .rev()
                .chain(order[pos + 1..].iter().rev())
                .copied()
                .find(|id| candidates.contains(id)),
        }
    }

    /// Move focus in a direction. Returns `true` when focus moved.
    pub fn move_focus(&mut self, direction: FocusDirection) -> bool {
        let Some(next) = self.focus_search(self.focus, direction) else {
            return false;
        };
        self.request_focus(next)
    }

    /// Nearest focus-cluster ancestor-or-self, or the root.
    fn cluster_scope(&self, id: NodeId) -> NodeId {
        let mut current = Some(id);
        while let Some(node) = current {
            let Some(n) = self.nodes.get(node) else {
                break;
            };
            if n.flags.contains(NodeFlags::FOCUS_CLUSTER) {
                return node;
            }
            current = n.parent;
        }
        self.root
    }

    /// Subtrees invisible to focus traversal.
    fn pruned_for_focus(&self, id: NodeId) -> bool {
        self.nodes
            .get(id)
            .is_none_or(|n| n.visibility == Visibility::Gone)
    }

    fn best_directional(
        &self,
        candidates: &[NodeId],
        from: Rect,
        direction: FocusDirection,
    ) -> Option<NodeId> {
        // (edge distance, perpendicular center offset, beam overlap)
        let score = |cand: Rect| -> Option<(i64, bool)> {
            let (edge, perp, overlap) = match direction {
                FocusDirection::Left => (
                    from.left - cand.right,
                    (cand.center().y - from.center().y).abs(),
                    cand.overlaps_vertically(from),
                ),
                FocusDirection::Right => (
                    cand.left - from.right,
                    (cand.center().y - from.center().y).abs(),
                    cand.overlaps_vertically(from),
                ),
                FocusDirection::Up => (
                    from.top - cand.bottom,
                    (cand.center().x - from.center().x).abs(),
                    cand.overlaps_horizontally(from),
                ),
                FocusDirection::Down => (
                    cand.top - from.bottom,
                    (cand.center().x - from.center().x).abs(),
                    cand.overlaps_horizontally(from),
                ),
                _ => return None,
            };
            if edge < 0 {
                return None;
            }
            Some((i64::from(edge) * 10_000 + i64::from(perp), overlap))
        };

        let mut best_beam: Option<(i64, NodeId)> = None;
        let mut best_any: Option<(i64, NodeId)> = None;
        for id in candidates {
            let Some(rect) = self.absolute_bounds(*id) else {
                continue;
            };
            let Some((s, overlap)) = score(rect) else {
                continue;
            };
            if overlap && best_beam.is_none_or(|(b, _)| s < b) {
                best_beam = Some((s, *id));
            }
            if best_any.is_none_or(|(b, _)| s < b) {
                best_any = Some((s, *id));
            }
        }
        best_beam.or(best_any).map(|(_, id)| id)
    }

    // --- Recovery ----------------------------------------------------

    /// Before a subtree is detached, pick where focus should land if it
    /// is currently inside that subtree. Candidates are computed while
    /// the subtree is still in place so preorder neighbors are correct.
    pub(crate) fn prepare_focus_recovery(&self, subtree_root: NodeId) -> Option<NodeId> {
        let focus = self.focus?;
        if focus != subtree_root && !self.is_ancestor(subtree_root, focus) {
            return None;
        }
        let in_subtree =
            |id: NodeId| id == subtree_root || self.is_ancestor(subtree_root, id);

        let forward = self
            .focus_search(Some(focus), FocusDirection::Forward)
            .filter(|id| !in_subtree(*id));
        if forward.is_some() {
            return forward;
        }
        let backward = self
            .focus_search(Some(focus), FocusDirection::Backward)
            .filter(|id| !in_subtree(*id));
        if backward.is_some() {
            return backward;
        }
        // Fall back to the nearest focusable ancestor of the removed
        // subtree.
        let mut current = self.nodes.get(subtree_root).and_then(|n| n.parent);
        while let Some(node) = current {
            if self.is_focusable(node) {
                return Some(node);
            }
            current = self.nodes.get(node).and_then(|n| n.parent);
        }
        None
    }

    /// Apply a recovery decision after the holder left the tree. The
    /// old holder is gone, so no loss notification is sent to it.
    pub(crate) fn move_focus_after_removal(&mut self, recovery: Option<NodeId>) {
        self.focus = None;
        if let Some(id) = recovery {
            self.request_focus(id);
        }
    }

    /// Re-check the current holder's eligibility, moving or dropping
    /// focus when it no longer qualifies.
    pub(crate) fn ensure_focus_valid(&mut self) {
        let Some(focus) = self.focus else {
            return;
        };
        if self.is_focusable(focus) {
            return;
        }
        let next = self
            .focus_search(Some(focus), FocusDirection::Forward)
            .or_else(|| self.focus_search(Some(focus), FocusDirection::Backward));
        if let Some(old) = self.focus.take() {
            self.notify_focus(old, false);
            self.invalidate(old);
        }
        if let Some(next) = next {
            self.request_focus(next);
        }
    }
}
