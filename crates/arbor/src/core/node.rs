use arbor_geom::{Point, Rect, Size};
use bitflags::bitflags;

use crate::core::{
    caps::Capabilities,
    id::NodeId,
    measure::{Measured, SizePolicy},
};

/// Node visibility.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Laid out, drawn, and hit-testable.
    #[default]
    Visible,
    /// Takes layout space but is neither drawn nor hit-testable.
    Invisible,
    /// Consumes no space; skipped by layout and hit-testing.
    Gone,
}

bitflags! {
    /// Boolean node state and configuration flags.
    #[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
    pub struct NodeFlags: u32 {
        /// The node responds to input.
        const ENABLED = 1 << 0;
        /// The node consumes pointer gestures by default.
        const CLICKABLE = 1 << 1;
        /// The node reacts to long presses.
        const LONG_CLICKABLE = 1 << 2;
        /// The node can hold input focus.
        const FOCUSABLE = 1 << 3;
        /// The node can hold focus while the tree is in touch mode.
        const FOCUSABLE_IN_TOUCH_MODE = 1 << 4;
        /// Transient pressed state, driven by pointer dispatch.
        const PRESSED = 1 << 5;
        /// Selected state.
        const SELECTED = 1 << 6;
        /// The node scrolls its own content.
        const SCROLL_CONTAINER = 1 << 7;
        /// The node scopes directional focus search for its subtree.
        const FOCUS_CLUSTER = 1 << 8;
        /// Descendants of this node never receive focus.
        const BLOCK_DESCENDANT_FOCUS = 1 << 9;
        /// This subtree is excluded from hierarchy state saves.
        const SAVE_DISABLED = 1 << 10;
        /// Drop touches delivered while another window obscures this one.
        const FILTER_TOUCHES_WHEN_OBSCURED = 1 << 11;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::ENABLED
    }
}

/// Presentational transform. Never affects layout bounds; hit-testing
/// and drawing apply it around the pivot point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Horizontal translation.
    pub tx: f32,
    /// Vertical translation.
    pub ty: f32,
    /// Horizontal scale factor.
    pub sx: f32,
    /// Vertical scale factor.
    pub sy: f32,
    /// Rotation in degrees, clockwise.
    pub rotation: f32,
    /// Pivot point in local coordinates.
    pub pivot: (f32, f32),
    /// Elevation. Recorded for the drawing backend; no shadow logic here.
    pub elevation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            tx: 0.0,
            ty: 0.0,
            sx: 1.0,
            sy: 1.0,
            rotation: 0.0,
            pivot: (0.0, 0.0),
            elevation: 0.0,
        }
    }
}

impl Transform {
    /// Is this the identity transform?
    pub fn is_identity(&self) -> bool {
        self.tx == 0.0
            && self.ty == 0.0
            && self.sx == 1.0
            && self.sy == 1.0
            && self.rotation == 0.0
    }

    /// Map a local-space point into the transformed (parent-visible)
    /// space.
    pub fn map(&self, x: f32, y: f32) -> (f32, f32) {
        let (px, py) = self.pivot;
        let (dx, dy) = (x - px, y - py);
        let (dx, dy) = (dx * self.sx, dy * self.sy);
        let r = self.rotation.to_radians();
        let (sin, cos) = r.sin_cos();
        let (dx, dy) = (dx * cos - dy * sin, dx * sin + dy * cos);
        (dx + px + self.tx, dy + py + self.ty)
    }

    /// Map a point from the transformed space back into local space.
    /// Returns `None` when the transform is degenerate (zero scale).
    pub fn unmap(&self, x: f32, y: f32) -> Option<(f32, f32)> {
        if self.sx == 0.0 || self.sy == 0.0 {
            return None;
        }
        let (px, py) = self.pivot;
        let (dx, dy) = (x - self.tx - px, y - self.ty - py);
        let r = (-self.rotation).to_radians();
        let (sin, cos) = r.sin_cos();
        let (dx, dy) = (dx * cos - dy * sin, dx * sin + dy * cos);
        Some((dx / self.sx + px, dy / self.sy + py))
    }
}

/// Core node data stored in the arena.
///
/// A node has no behavior of its own; engines consult its geometry and
/// flags and invoke its [`Capabilities`] slots at well-defined points.
pub struct Node {
    /// Parent in the arena tree. Upward lookup only, never owning.
    pub(crate) parent: Option<NodeId>,
    /// Children in insertion order. Insertion order is paint and
    /// traversal order unless a z override reorders painting.
    pub(crate) children: Vec<NodeId>,

    /// Bounds relative to the parent, assigned by the layout pass.
    pub(crate) bounds: Rect,
    /// Result of the most recent measure pass, if any.
    pub(crate) measured: Option<Measured>,
    /// Desired content size used by the default leaf measurement.
    pub(crate) preferred: Size,
    /// Sizing policy per axis, consulted when a parent derives specs.
    pub(crate) width_policy: SizePolicy,
    /// See `width_policy`.
    pub(crate) height_policy: SizePolicy,
    /// Scroll offset applied to this node's content.
    pub(crate) scroll: Point,

    /// Node visibility.
    pub(crate) visibility: Visibility,
    /// Boolean flag set.
    pub(crate) flags: NodeFlags,
    /// Presentational transform.
    pub(crate) transform: Transform,
    /// Paint-order override. Children with equal z keep insertion order.
    pub(crate) z: f32,

    /// Stable identifier for hierarchy state save/restore.
    pub(crate) state_id: Option<u64>,
    /// Behavior capability slots.
    pub(crate) caps: Capabilities,

    /// Whether the node is connected to the tree root.
    pub(crate) attached: bool,
    /// A re-layout has been requested for this node or a descendant.
    pub(crate) layout_requested: bool,
    /// The node has damage pending redraw.
    pub(crate) damaged: bool,
}

impl Node {
    pub(crate) fn new() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            bounds: Rect::zero(),
            measured: None,
            preferred: Size::zero(),
            width_policy: SizePolicy::default(),
            height_policy: SizePolicy::default(),
            scroll: Point::zero(),
            visibility: Visibility::default(),
            flags: NodeFlags::default(),
            transform: Transform::default(),
            z: 0.0,
            state_id: None,
            caps: Capabilities::default(),
            attached: false,
            layout_requested: false,
            damaged: false,
        }
    }

    /// Return the node's parent, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Return the node's children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Parent-relative bounds from the most recent layout pass.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Result of the most recent measure pass. Defined only after a
    /// successful measure.
    pub fn measured(&self) -> Option<Measured> {
        self.measured
    }

    /// Desired content size for default measurement.
    pub fn preferred(&self) -> Size {
        self.preferred
    }

    /// Scroll offset applied to this node's content.
    pub fn scroll(&self) -> Point {
        self.scroll
    }

    /// Sizing policy for the width axis.
    pub fn width_policy(&self) -> SizePolicy {
        self.width_policy
    }

    /// Sizing policy for the height axis.
    pub fn height_policy(&self) -> SizePolicy {
        self.height_policy
    }

    /// Node visibility.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// The node's flag set.
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Presentational transform.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Paint-order override.
    pub fn z(&self) -> f32 {
        self.z
    }

    /// Stable identifier for state save/restore.
    pub fn state_id(&self) -> Option<u64> {
        self.state_id
    }

    /// Whether the node is connected to the tree root.
    pub fn attached(&self) -> bool {
        self.attached
    }
}
