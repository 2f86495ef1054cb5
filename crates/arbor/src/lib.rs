//! Arbor: a retained-mode widget-tree core.
//!
//! Arbor implements the hard parts of a retained-mode UI tree without
//! owning a renderer or a platform window: the two-pass measure/layout
//! protocol, invalidation-driven redraw scheduling, hit-testing and
//! event dispatch, cooperative nested scrolling, focus navigation, and
//! hierarchical state save/restore. Drawing is recorded into an opaque
//! [`DrawSurface`]; rasterization, window lifecycle, and theme storage
//! are external collaborators.
//!
//! # Quick start
//!
//! The main entry points are:
//! - [`Tree`] - the node arena and every engine built on it
//! - [`Capabilities`] - per-node behavior slots invoked by the engines
//! - [`MeasureSpec`] - the constraint a parent imposes on a child
//!
//! All tree mutation happens on one owning thread; other threads reach
//! the tree only through a [`Poster`] handle.

// Internal core module - re-export specific items below
mod core;

pub use crate::core::caps::{
    Capabilities, ClickHandler, DrawDelegate, FocusListener, KeyHandler, Measurable,
    MotionHandler, NestedScrollParent, PointerHandler, PointerInterceptor, Positioner, Stateful,
};
pub use crate::core::draw::{DrawSurface, NodeSnapshot};
pub use crate::core::error::{Error, Result};
pub use crate::core::event::{
    KeyCode, KeyEvent, Mods, MotionEvent, MotionSource, PointerAction, PointerEvent, PointerId,
};
pub use crate::core::focus::FocusDirection;
pub use crate::core::id::NodeId;
pub use crate::core::invalidate::{FrameScheduler, Poster};
pub use crate::core::layout::{LayoutPass, MeasurePass};
pub use crate::core::measure::{Measured, MeasureSpec, SizePolicy, SpecMode, child_measure_spec};
pub use crate::core::node::{Node, NodeFlags, Transform, Visibility};
pub use crate::core::scroll::ScrollAxes;
pub use crate::core::state::{MemoryStateContainer, StateContainer};
pub use crate::core::theme::{AttrValue, KNOWN_ATTRS, ThemeProvider};
pub use crate::core::tree::Tree;

pub use arbor_geom as geom;
