//! Nested scroll coordination between a scrolling node and its
//! cooperating ancestors.
//!
//! A scrolling child opens a gesture with [`Tree::start_nested_scroll`].
//! Every ancestor that accepts joins the chain, nearest first, and is
//! consulted before (`pre_scroll`) and after (`scroll`) each step the
//! child takes. Deltas are conserved: what the chain consumes plus what
//! remains always equals what was offered.

use bitflags::bitflags;

use crate::core::{caps::NestedScrollParent, id::NodeId, tree::Tree};

bitflags! {
    /// Scroll axes involved in a nested scroll gesture.
    #[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
    pub struct ScrollAxes: u8 {
        /// Horizontal scrolling.
        const HORIZONTAL = 1 << 0;
        /// Vertical scrolling.
        const VERTICAL = 1 << 1;
    }
}

/// An in-progress nested scroll gesture.
pub(crate) struct NestedScrollBinding {
    /// Accepting ancestors, nearest to the child first.
    pub(crate) chain: Vec<NodeId>,
    /// Axes declared when the gesture started.
    #[allow(dead_code)]
    pub(crate) axes: ScrollAxes,
}

/// Clamp a claimed amount to the remaining delta, preserving sign.
fn claim(took: i32, remaining: i32) -> i32 {
    if remaining >= 0 {
        took.clamp(0, remaining)
    } else {
        took.clamp(remaining, 0)
    }
}

impl Tree {
    /// Take a node's scroll-parent capability out, run `f`, restore it.
    fn with_scroll_parent<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut Self, &mut dyn NestedScrollParent) -> R,
    ) -> Option<R> {
        let mut cap = self.nodes.get_mut(id)?.caps.scroll_parent.take()?;
        let out = f(self, cap.as_mut());
        if let Some(n) = self.nodes.get_mut(id) {
            n.caps.scroll_parent = Some(cap);
        }
        Some(out)
    }

    /// Open a nested scroll gesture for `child` along `axes`.
    ///
    /// Every ancestor with a scroll-parent capability is asked to
    /// cooperate; acceptors form the gesture's chain, nearest first.
    /// Returns `true` when at least one ancestor accepted. A still-open
    /// previous gesture for the same child is stopped first.
    pub fn start_nested_scroll(&mut self, child: NodeId, axes: ScrollAxes) -> bool {
        self.stop_nested_scroll(child);
        let mut chain = Vec::new();
        let mut current = self.nodes.get(child).and_then(|n| n.parent);
        while let Some(ancestor) = current {
            let accepted = self
                .with_scroll_parent(ancestor, |_, cap| cap.on_start(ancestor, child, axes))
                .unwrap_or(false);
            if accepted {
                chain.push(ancestor);
            }
            current = self.nodes.get(ancestor).and_then(|n| n.parent);
        }
        if chain.is_empty() {
            return false;
        }
        self.nested_scrolls
            .insert(child, NestedScrollBinding { chain, axes });
        true
    }

    /// Close the gesture for `child`, notifying the chain. Idempotent.
    pub fn stop_nested_scroll(&mut self, child: NodeId) {
        let Some(binding) = self.nested_scrolls.remove(&child) else {
            return;
        };
        for ancestor in binding.chain {
            self.with_scroll_parent(ancestor, |_, cap| cap.on_stop(ancestor));
        }
    }

    /// Offer a scroll step to the chain before the child consumes any
    /// of it. Returns what the ancestors took.
    pub fn dispatch_nested_pre_scroll(&mut self, child: NodeId, dx: i32, dy: i32) -> (i32, i32) {
        let chain = match self.nested_scrolls.get(&child) {
            Some(b) => b.chain.clone(),
            None => return (0, 0),
        };
        let (mut rx, mut ry) = (dx, dy);
        for ancestor in chain {
            if rx == 0 && ry == 0 {
                break;
            }
            let (tx, ty) = self
                .with_scroll_parent(ancestor, |_, cap| cap.on_pre_scroll(ancestor, rx, ry))
                .unwrap_or((0, 0));
            rx -= claim(tx, rx);
            ry -= claim(ty, ry);
        }
        (dx - rx, dy - ry)
    }

    /// Report a completed scroll step. `consumed` is what the child
    /// took (including any pre-scroll consumption); `unconsumed` is
    /// offered along the chain. Returns what the ancestors took of it.
    pub fn dispatch_nested_scroll(
        &mut self,
        child: NodeId,
        consumed: (i32, i32),
        unconsumed: (i32, i32),
    ) -> (i32, i32) {
        let chain = match self.nested_scrolls.get(&child) {
            Some(b) => b.chain.clone(),
            None => return (0, 0),
        };
        let (mut cx, mut cy) = consumed;
        let (mut rx, mut ry) = unconsumed;
        for ancestor in chain {
            if rx == 0 && ry == 0 {
                break;
            }
            let (tx, ty) = self
                .with_scroll_parent(ancestor, |_, cap| {
                    cap.on_scroll(ancestor, (cx, cy), (rx, ry))
                })
                .unwrap_or((0, 0));
            let tx = claim(tx, rx);
            let ty = claim(ty, ry);
            rx -= tx;
            ry -= ty;
            cx += tx;
            cy += ty;
        }
        (unconsumed.0 - rx, unconsumed.1 - ry)
    }

    /// Offer a fling to the chain before the child acts on it. Returns
    /// `true` when an ancestor consumed the whole velocity.
    pub fn dispatch_nested_pre_fling(&mut self, child: NodeId, vx: f32, vy: f32) -> bool {
        let chain = match self.nested_scrolls.get(&child) {
            Some(b) => b.chain.clone(),
            None => return false,
        };
        for ancestor in chain {
            let taken = self
                .with_scroll_parent(ancestor, |_, cap| cap.on_pre_fling(ancestor, vx, vy))
                .unwrap_or(false);
            if taken {
                return true;
            }
        }
        false
    }

    /// Report a fling to the chain after the child has acted on it.
    pub fn dispatch_nested_fling(&mut self, child: NodeId, vx: f32, vy: f32, consumed: bool) {
        let chain = match self.nested_scrolls.get(&child) {
            Some(b) => b.chain.clone(),
            None => return,
        };
        for ancestor in chain {
            self.with_scroll_parent(ancestor, |_, cap| {
                cap.on_fling(ancestor, vx, vy, consumed);
            });
        }
    }

    /// Is a nested scroll gesture currently open for `child`?
    pub fn has_nested_scroll(&self, child: NodeId) -> bool {
        self.nested_scrolls.contains_key(&child)
    }
}
