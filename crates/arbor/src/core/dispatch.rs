//! Input dispatch: hit-testing, pointer capture, interception, key
//! routing, and generic motion events.
//!
//! A `Down` selects a target by hit-testing and captures that pointer;
//! every later event for the same pointer id goes to the captured
//! target regardless of position, until `Up` or `Cancel`. Ancestors on
//! the path get a capture-phase veto through their interceptor slot,
//! both at `Down` and mid-gesture.

use arbor_geom::Point;

use crate::core::{
    event::{KeyEvent, KeyCode, MotionEvent, MotionSource, PointerAction, PointerEvent},
    focus::FocusDirection,
    id::NodeId,
    node::{NodeFlags, Visibility},
    tree::Tree,
};

impl Tree {
    /// Dispatch a pointer event arriving at the root in root
    /// coordinates. Returns `true` when some node consumed it.
    pub fn dispatch_pointer(&mut self, event: PointerEvent) -> bool {
        if event.obscured && self.filters_obscured(self.root) {
            tracing::debug!(?event.action, "dropping obscured pointer event");
            return false;
        }
        match event.action {
            PointerAction::Down => self.pointer_down(event),
            _ => self.pointer_followup(event),
        }
    }

    fn pointer_down(&mut self, event: PointerEvent) -> bool {
        self.set_touch_mode(true);

        let mut path = Vec::new();
        let p = (event.position.x as f32, event.position.y as f32);
        if !self.hit_path(self.root, p, &mut path) || path.is_empty() {
            return false;
        }

        // Capture phase: ancestors may claim the gesture before the
        // deepest hit sees it.
        let mut deepest = path.len() - 1;
        for (i, node) in path[..path.len() - 1].iter().enumerate() {
            if self.call_intercept(*node, &event) == Some(true) {
                deepest = i;
                break;
            }
        }

        if event.obscured && self.filters_obscured(path[deepest]) {
            return false;
        }

        // Bubble from the deepest candidate upward until someone
        // consumes. The consumer captures the pointer.
        for i in (0..=deepest).rev() {
            let node = path[i];
            if !self.enabled(node) {
                continue;
            }
            if self.call_pointer(node, &event) == Some(true) {
                self.pointer_targets.insert(event.pointer, node);
                return true;
            }
            if self.node_flags(node).contains(NodeFlags::CLICKABLE) {
                self.modify_flags(node, NodeFlags::PRESSED, NodeFlags::empty());
                self.invalidate(node);
                self.pointer_targets.insert(event.pointer, node);
                return true;
            }
        }
        false
    }

    fn pointer_followup(&mut self, event: PointerEvent) -> bool {
        let Some(mut target) = self.pointer_targets.get(&event.pointer).copied() else {
            return false;
        };

        // Mid-gesture interception: an ancestor may still take over,
        // which cancels the gesture for the current target.
        if event.action == PointerAction::Move {
            let path = self.path_from_root(target);
            for node in path.iter().take(path.len().saturating_sub(1)) {
                if self.call_intercept(*node, &event) == Some(true) {
                    let cancel = PointerEvent {
                        action: PointerAction::Cancel,
                        ..event
                    };
                    self.call_pointer(target, &cancel);
                    self.clear_pressed(target);
                    self.pointer_targets.insert(event.pointer, *node);
                    target = *node;
                    break;
                }
            }
        }

        let handled = self.call_pointer(target, &event) == Some(true);
        let default = self.default_click(target, &event);
        if matches!(event.action, PointerAction::Up | PointerAction::Cancel) {
            self.pointer_targets.remove(&event.pointer);
        }
        handled || default
    }

    /// Default handling for clickable nodes captured without a pointer
    /// handler: pressed state across the gesture, click on `Up` inside
    /// the node's bounds.
    fn default_click(&mut self, target: NodeId, event: &PointerEvent) -> bool {
        if !self.node_flags(target).contains(NodeFlags::PRESSED) {
            return false;
        }
        match event.action {
            PointerAction::Up => {
                self.clear_pressed(target);
                let inside = self
                    .to_local(target, event.position)
                    .zip(self.node(target).map(|n| n.bounds.size()))
                    .is_some_and(|(p, size)| {
                        p.x >= 0 && p.y >= 0 && p.x < size.w && p.y < size.h
                    });
                if inside && self.enabled(target) {
                    self.fire_click(target);
                }
                true
            }
            PointerAction::Cancel => {
                self.clear_pressed(target);
                true
            }
            _ => true,
        }
    }

    fn clear_pressed(&mut self, id: NodeId) {
        if self.node_flags(id).contains(NodeFlags::PRESSED) {
            self.modify_flags(id, NodeFlags::empty(), NodeFlags::PRESSED);
            self.invalidate(id);
        }
    }

    fn fire_click(&mut self, id: NodeId) {
        let Some(n) = self.nodes.get_mut(id) else {
            return;
        };
        if let Some(mut cap) = n.caps.click.take() {
            cap(id);
            if let Some(n) = self.nodes.get_mut(id) {
                n.caps.click = Some(cap);
            }
        }
    }

    /// Dispatch a key event along the focus path.
    ///
    /// Ancestors hear `pre_key` root first; then `on_key` bubbles from
    /// the focused node back to the root. An unconsumed directional or
    /// tab key-down falls through to focus navigation, leaving touch
    /// mode first.
    pub fn dispatch_key(&mut self, event: KeyEvent) -> bool {
        let mut path = self
            .focus
            .map(|f| self.path_from_root(f))
            .unwrap_or_default();
        if path.is_empty() {
            path.push(self.root);
        }

        for node in &path {
            if self.call_pre_key(*node, &event) == Some(true) {
                return true;
            }
        }
        for node in path.iter().rev() {
            if self.call_key(*node, &event) == Some(true) {
                return true;
            }
        }

        if !event.down {
            return false;
        }
        let direction = match event.code {
            KeyCode::ArrowUp => FocusDirection::Up,
            KeyCode::ArrowDown => FocusDirection::Down,
            KeyCode::ArrowLeft => FocusDirection::Left,
            KeyCode::ArrowRight => FocusDirection::Right,
            KeyCode::Tab if event.mods.shift => FocusDirection::Backward,
            KeyCode::Tab => FocusDirection::Forward,
            _ => return false,
        };
        self.set_touch_mode(false);
        if self.focus.is_none() {
            if let Some(first) = self.focus_search(None, FocusDirection::Forward) {
                return self.request_focus(first);
            }
            return false;
        }
        self.move_focus(direction)
    }

    /// Dispatch a generic motion event. Pointer-source events are
    /// routed by hit-testing; others follow the focus path. Delivery
    /// bubbles from the deepest node upward.
    pub fn dispatch_motion(&mut self, event: MotionEvent) -> bool {
        let path = match event.source {
            MotionSource::Pointer => {
                let mut path = Vec::new();
                let p = (event.position.x as f32, event.position.y as f32);
                if !self.hit_path(self.root, p, &mut path) {
                    return false;
                }
                path
            }
            MotionSource::NonPointer => {
                let mut path = self
                    .focus
                    .map(|f| self.path_from_root(f))
                    .unwrap_or_default();
                if path.is_empty() {
                    path.push(self.root);
                }
                path
            }
        };
        for node in path.iter().rev() {
            if self.enabled(*node) && self.call_motion(*node, &event) == Some(true) {
                return true;
            }
        }
        false
    }

    // --- Hit-testing and coordinate mapping --------------------------

    /// Descend from `id`, appending the hit chain to `out`. `point` is
    /// in the parent's content space. Children are tried topmost first:
    /// higher z wins, later siblings beat earlier ones at equal z.
    fn hit_path(&self, id: NodeId, point: (f32, f32), out: &mut Vec<NodeId>) -> bool {
        let Some(n) = self.nodes.get(id) else {
            return false;
        };
        if n.visibility != Visibility::Visible {
            return false;
        }
        let local = (point.0 - n.bounds.left as f32, point.1 - n.bounds.top as f32);
        let local = if n.transform.is_identity() {
            local
        } else {
            match n.transform.unmap(local.0, local.1) {
                Some(p) => p,
                None => return false,
            }
        };
        let size = n.bounds.size();
        if local.0 < 0.0
            || local.1 < 0.0
            || local.0 >= size.w as f32
            || local.1 >= size.h as f32
        {
            return false;
        }
        out.push(id);

        let mut order: Vec<(usize, NodeId)> = n.children.iter().copied().enumerate().collect();
        order.sort_by(|(ai, a), (bi, b)| {
            let az = self.nodes.get(*a).map_or(0.0, |n| n.z);
            let bz = self.nodes.get(*b).map_or(0.0, |n| n.z);
            bz.total_cmp(&az).then(bi.cmp(ai))
        });
        let content = (local.0 + n.scroll.x as f32, local.1 + n.scroll.y as f32);
        for (_, child) in order {
            if self.hit_path(child, content, out) {
                return true;
            }
        }
        true
    }

    /// Rewrite a root-space point into `id`'s local space, applying
    /// ancestor bounds, scroll offsets, and transforms.
    pub fn to_local(&self, id: NodeId, point: Point) -> Option<Point> {
        let path = self.path_from_root(id);
        if path.is_empty() {
            return None;
        }
        let mut p = (point.x as f32, point.y as f32);
        for (depth, node) in path.iter().enumerate() {
            let n = &self.nodes[*node];
            p = (p.0 - n.bounds.left as f32, p.1 - n.bounds.top as f32);
            if !n.transform.is_identity() {
                p = n.transform.unmap(p.0, p.1)?;
            }
            if depth + 1 < path.len() {
                p = (p.0 + n.scroll.x as f32, p.1 + n.scroll.y as f32);
            }
        }
        Some(Point::new(p.0.round() as i32, p.1.round() as i32))
    }

    // --- Capability invocation ---------------------------------------

    fn node_flags(&self, id: NodeId) -> NodeFlags {
        self.nodes.get(id).map(|n| n.flags).unwrap_or_default()
    }

    fn enabled(&self, id: NodeId) -> bool {
        self.node_flags(id).contains(NodeFlags::ENABLED)
    }

    fn filters_obscured(&self, id: NodeId) -> bool {
        self.node_flags(id)
            .contains(NodeFlags::FILTER_TOUCHES_WHEN_OBSCURED)
    }

    fn localized(&self, id: NodeId, event: &PointerEvent) -> Option<PointerEvent> {
        let position = self.to_local(id, event.position)?;
        Some(PointerEvent { position, ..*event })
    }

    fn call_pointer(&mut self, id: NodeId, event: &PointerEvent) -> Option<bool> {
        let event = self.localized(id, event)?;
        let mut cap = self.nodes.get_mut(id)?.caps.pointer.take()?;
        let out = cap.on_pointer(id, &event);
        if let Some(n) = self.nodes.get_mut(id) {
            n.caps.pointer = Some(cap);
        }
        Some(out)
    }

    fn call_intercept(&mut self, id: NodeId, event: &PointerEvent) -> Option<bool> {
        let event = self.localized(id, event)?;
        let mut cap = self.nodes.get_mut(id)?.caps.intercept.take()?;
        let out = cap.intercept(id, &event);
        if let Some(n) = self.nodes.get_mut(id) {
            n.caps.intercept = Some(cap);
        }
        Some(out)
    }

    fn call_pre_key(&mut self, id: NodeId, event: &KeyEvent) -> Option<bool> {
        let mut cap = self.nodes.get_mut(id)?.caps.key.take()?;
        let out = cap.pre_key(id, event);
        if let Some(n) = self.nodes.get_mut(id) {
            n.caps.key = Some(cap);
        }
        Some(out)
    }

    fn call_key(&mut self, id: NodeId, event: &KeyEvent) -> Option<bool> {
        let mut cap = self.nodes.get_mut(id)?.caps.key.take()?;
        let out = cap.on_key(id, event);
        if let Some(n) = self.nodes.get_mut(id) {
            n.caps.key = Some(cap);
        }
        Some(out)
    }

    fn call_motion(&mut self, id: NodeId, event: &MotionEvent) -> Option<bool> {
        let event = match event.source {
            MotionSource::Pointer => {
                let position = self.to_local(id, event.position)?;
                MotionEvent { position, ..*event }
            }
            MotionSource::NonPointer => *event,
        };
        let mut cap = self.nodes.get_mut(id)?.caps.motion.take()?;
        let out = cap.on_motion(id, &event);
        if let Some(n) = self.nodes.get_mut(id) {
            n.caps.motion = Some(cap);
        }
        Some(out)
    }
}
