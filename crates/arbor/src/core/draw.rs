//! The draw traversal.
//!
//! Drawing records into a host-provided [`DrawSurface`]; nothing here
//! rasterizes. The traversal walks visible nodes in paint order (z
//! ascending, insertion order among equals), establishes each node's
//! coordinate space on the surface, lets the node's draw delegate
//! record its content, then descends into children shifted by the
//! node's scroll offset.

use arbor_geom::Rect;

use crate::core::{
    id::NodeId,
    node::{Transform, Visibility},
    tree::Tree,
};

/// Recording target for the draw traversal and draw delegates.
///
/// The traversal drives the canvas-state methods; delegates record
/// content with the primitives. Hosts translate records into their
/// actual rendering backend.
pub trait DrawSurface {
    /// Push a copy of the current canvas state.
    fn save(&mut self);

    /// Pop back to the previously saved canvas state.
    fn restore(&mut self);

    /// Shift the origin of the current space.
    fn translate(&mut self, dx: i32, dy: i32);

    /// Intersect the clip with a rect in the current space.
    fn clip(&mut self, rect: Rect);

    /// Concatenate a node transform onto the current space.
    fn apply_transform(&mut self, transform: &Transform);

    /// Record a filled rectangle, color as ARGB.
    fn fill_rect(&mut self, rect: Rect, argb: u32);

    /// Record a text run at a position in the current space.
    fn text(&mut self, rect: Rect, text: &str);
}

/// A read-only copy of one node's public state, with children in
/// insertion order. Useful for host-side inspection and tests.
#[derive(Debug, Clone)]
pub struct NodeSnapshot {
    /// Arena id of the node.
    pub id: NodeId,
    /// Parent-relative bounds.
    pub bounds: Rect,
    /// Node visibility.
    pub visibility: Visibility,
    /// Paint-order override.
    pub z: f32,
    /// Damage pending at snapshot time.
    pub damaged: bool,
    /// Child snapshots in insertion order.
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// Visit every snapshot in the subtree, preorder.
    pub fn walk(&self, f: &mut dyn FnMut(&NodeSnapshot)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }
}

impl Tree {
    /// Record the visible tree into a surface, clearing damage.
    pub fn draw(&mut self, surface: &mut dyn DrawSurface) {
        let root = self.root;
        self.draw_node(root, surface);
    }

    fn draw_node(&mut self, id: NodeId, surface: &mut dyn DrawSurface) {
        let Some(n) = self.nodes.get_mut(id) else {
            return;
        };
        if n.visibility != Visibility::Visible {
            n.damaged = false;
            return;
        }
        let bounds = n.bounds;
        let transform = n.transform;
        let scroll = n.scroll;
        n.damaged = false;

        surface.save();
        surface.translate(bounds.left, bounds.top);
        if !transform.is_identity() {
            surface.apply_transform(&transform);
        }
        let local = Rect::new(0, 0, bounds.width(), bounds.height());
        surface.clip(local);

        if let Some(mut cap) = self.nodes[id].caps.draw.take() {
            cap.draw(id, local, surface);
            if let Some(n) = self.nodes.get_mut(id) {
                n.caps.draw = Some(cap);
            }
        }

        let mut order: Vec<(usize, NodeId)> = self.nodes[id]
            .children
            .iter()
            .copied()
            .enumerate()
            .collect();
        order.sort_by(|(ai, a), (bi, b)| {
            let az = self.nodes.get(*a).map_or(0.0, |n| n.z);
            let bz = self.nodes.get(*b).map_or(0.0, |n| n.z);
            az.total_cmp(&bz).then(ai.cmp(bi))
        });
        if !order.is_empty() {
            surface.translate(-scroll.x, -scroll.y);
            for (_, child) in order {
                self.draw_node(child, surface);
            }
        }
        surface.restore();
    }

    /// Snapshot the subtree under `id` (the root by default callers).
    pub fn snapshot(&self, id: NodeId) -> Option<NodeSnapshot> {
        let n = self.nodes.get(id)?;
        Some(NodeSnapshot {
            id,
            bounds: n.bounds,
            visibility: n.visibility,
            z: n.z,
            damaged: n.damaged,
            children: n
                .children
                .iter()
                .filter_map(|c| self.snapshot(*c))
                .collect(),
        })
    }
}
