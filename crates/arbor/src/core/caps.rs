//! Per-node behavior capability slots.
//!
//! Instead of one deep widget subclass chain, each optional behavior is
//! an independent strategy object stored in a [`Capabilities`] slot.
//! The engines invoke a slot at a well-defined point by temporarily
//! taking the box out of the node, so a capability may freely call back
//! into the tree (measure children, request layout, invalidate) without
//! aliasing it.

use arbor_geom::Rect;
use serde_json::Value;

use crate::core::{
    draw::DrawSurface,
    event::{KeyEvent, MotionEvent, PointerEvent},
    id::NodeId,
    layout::{LayoutPass, MeasurePass},
    measure::MeasureSpec,
    scroll::ScrollAxes,
};

/// Overrides the measure pass for a node.
///
/// The implementation must call [`MeasurePass::set_measured`] before
/// returning; failing to do so is a contract violation and aborts the
/// pass with a diagnostic.
pub trait Measurable: Send {
    /// Measure the node under the given constraints. Composite nodes
    /// measure each child through the pass before computing their own
    /// desired size.
    fn measure(&mut self, pass: &mut MeasurePass<'_>, width: MeasureSpec, height: MeasureSpec);
}

/// Overrides child positioning during the layout pass.
pub trait Positioner: Send {
    /// Position children within `bounds` using the sizes computed by
    /// the prior measure pass, via [`LayoutPass::place_child`].
    fn position(&mut self, pass: &mut LayoutPass<'_>, bounds: Rect);
}

/// Records a node's own drawing into a surface. Children are drawn by
/// the traversal, not by the delegate.
pub trait DrawDelegate: Send {
    /// Record drawing operations for the node's content.
    fn draw(&mut self, node: NodeId, bounds: Rect, surface: &mut dyn DrawSurface);
}

/// Handles pointer events delivered to a node.
pub trait PointerHandler: Send {
    /// Handle a pointer event in node-local coordinates. Return `true`
    /// to consume it.
    fn on_pointer(&mut self, node: NodeId, event: &PointerEvent) -> bool;
}

/// Capture-phase pointer interception for ancestors.
pub trait PointerInterceptor: Send {
    /// Return `true` to claim the gesture before descendants see the
    /// event. A claimed in-progress gesture delivers a synthetic cancel
    /// to its previous target.
    fn intercept(&mut self, node: NodeId, event: &PointerEvent) -> bool;
}

/// Handles key events routed along the focus path.
pub trait KeyHandler: Send {
    /// Pre-dispatch opportunity given to ancestors of the focused node,
    /// root first, before the focused node handles the event.
    fn pre_key(&mut self, _node: NodeId, _event: &KeyEvent) -> bool {
        false
    }

    /// Handle a key event. Return `true` to consume it.
    fn on_key(&mut self, _node: NodeId, _event: &KeyEvent) -> bool {
        false
    }
}

/// Handles generic motion events (scroll wheels, joysticks).
pub trait MotionHandler: Send {
    /// Handle a motion event. Return `true` to consume it.
    fn on_motion(&mut self, node: NodeId, event: &MotionEvent) -> bool;
}

/// Cooperating ancestor side of the nested scroll protocol.
pub trait NestedScrollParent: Send {
    /// A descendant is starting a nested scroll along `axes`. Return
    /// `true` to cooperate for the duration of the gesture.
    fn on_start(&mut self, node: NodeId, child: NodeId, axes: ScrollAxes) -> bool;

    /// First claim on a scroll step. Return the portion of `(dx, dy)`
    /// this node consumes.
    fn on_pre_scroll(&mut self, _node: NodeId, _dx: i32, _dy: i32) -> (i32, i32) {
        (0, 0)
    }

    /// React to a completed scroll step. `consumed` is what the child
    /// and nearer ancestors took; `unconsumed` is the remainder offered
    /// to this node. Return the portion of `unconsumed` this node
    /// consumes.
    fn on_scroll(&mut self, _node: NodeId, _consumed: (i32, i32), _unconsumed: (i32, i32)) -> (i32, i32) {
        (0, 0)
    }

    /// First claim on a fling. Return `true` to consume the whole
    /// velocity before the child acts on it.
    fn on_pre_fling(&mut self, _node: NodeId, _vx: f32, _vy: f32) -> bool {
        false
    }

    /// React to a fling the child has already acted on (or not, per
    /// `consumed`).
    fn on_fling(&mut self, _node: NodeId, _vx: f32, _vy: f32, _consumed: bool) {}

    /// The nested scroll has ended.
    fn on_stop(&mut self, _node: NodeId) {}
}

/// Observes focus gain and loss for a node.
pub trait FocusListener: Send {
    /// Called with `false` on the old holder before the new holder
    /// hears `true`; the two never overlap.
    fn focus_changed(&mut self, node: NodeId, focused: bool);
}

/// Provides the opaque per-node state blob for hierarchy save/restore.
pub trait Stateful: Send {
    /// Produce the node's state blob, or `None` to skip this node.
    fn save(&mut self, node: NodeId) -> Option<Value>;

    /// Apply a previously saved blob. Blobs from a drifted tree shape
    /// must be tolerated, not treated as errors.
    fn restore(&mut self, node: NodeId, blob: &Value);
}

/// Click callback fired by the default clickable pointer handling.
pub type ClickHandler = Box<dyn FnMut(NodeId) + Send>;

/// The set of optional behaviors a node implements.
#[derive(Default)]
pub struct Capabilities {
    /// Measure override.
    pub(crate) measure: Option<Box<dyn Measurable>>,
    /// Child-positioning override.
    pub(crate) position: Option<Box<dyn Positioner>>,
    /// Draw override.
    pub(crate) draw: Option<Box<dyn DrawDelegate>>,
    /// Pointer handling.
    pub(crate) pointer: Option<Box<dyn PointerHandler>>,
    /// Capture-phase interception.
    pub(crate) intercept: Option<Box<dyn PointerInterceptor>>,
    /// Key handling.
    pub(crate) key: Option<Box<dyn KeyHandler>>,
    /// Generic motion handling.
    pub(crate) motion: Option<Box<dyn MotionHandler>>,
    /// Nested scroll cooperation.
    pub(crate) scroll_parent: Option<Box<dyn NestedScrollParent>>,
    /// Focus change observation.
    pub(crate) focus: Option<Box<dyn FocusListener>>,
    /// State blob provider.
    pub(crate) state: Option<Box<dyn Stateful>>,
    /// Click callback.
    pub(crate) click: Option<ClickHandler>,
}

impl Capabilities {
    /// Install a measure override.
    pub fn set_measurable(&mut self, m: impl Measurable + 'static) -> &mut Self {
        self.measure = Some(Box::new(m));
        self
    }

    /// Install a child-positioning override.
    pub fn set_positioner(&mut self, p: impl Positioner + 'static) -> &mut Self {
        self.position = Some(Box::new(p));
        self
    }

    /// Install a draw override.
    pub fn set_draw_delegate(&mut self, d: impl DrawDelegate + 'static) -> &mut Self {
        self.draw = Some(Box::new(d));
        self
    }

    /// Install a pointer handler.
    pub fn set_pointer_handler(&mut self, h: impl PointerHandler + 'static) -> &mut Self {
        self.pointer = Some(Box::new(h));
        self
    }

    /// Install a capture-phase interceptor.
    pub fn set_interceptor(&mut self, i: impl PointerInterceptor + 'static) -> &mut Self {
        self.intercept = Some(Box::new(i));
        self
    }

    /// Install a key handler.
    pub fn set_key_handler(&mut self, h: impl KeyHandler + 'static) -> &mut Self {
        self.key = Some(Box::new(h));
        self
    }

    /// Install a generic motion handler.
    pub fn set_motion_handler(&mut self, h: impl MotionHandler + 'static) -> &mut Self {
        self.motion = Some(Box::new(h));
        self
    }

    /// Install nested scroll cooperation.
    pub fn set_scroll_parent(&mut self, p: impl NestedScrollParent + 'static) -> &mut Self {
        self.scroll_parent = Some(Box::new(p));
        self
    }

    /// Install a focus change listener.
    pub fn set_focus_listener(&mut self, l: impl FocusListener + 'static) -> &mut Self {
        self.focus = Some(Box::new(l));
        self
    }

    /// Install a state blob provider.
    pub fn set_stateful(&mut self, s: impl Stateful + 'static) -> &mut Self {
        self.state = Some(Box::new(s));
        self
    }

    /// Install a click callback.
    pub fn set_click_handler(&mut self, f: impl FnMut(NodeId) + Send + 'static) -> &mut Self {
        self.click = Some(Box::new(f));
        self
    }
}
