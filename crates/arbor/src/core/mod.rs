//! Core types for the arbor widget-tree library.

/// Per-node behavior capability slots.
pub mod caps;
/// Draw recording and structural snapshots.
pub mod draw;
/// Core error types.
pub mod error;
/// Input event types.
pub mod event;
/// Event dispatch: hit-testing, capture, and focus-path routing.
pub mod dispatch;
/// Focus navigation.
pub mod focus;
/// Node ID types.
pub mod id;
/// Damage tracking, frame scheduling, and the cross-thread post queue.
pub mod invalidate;
/// The two-pass measure/layout engine.
pub mod layout;
/// Measurement constraints.
pub mod measure;
/// Node data stored in the arena.
pub mod node;
/// Nested scroll coordination.
pub mod scroll;
/// Hierarchical state save/restore.
pub mod state;
/// Theme attribute resolution boundary.
pub mod theme;
/// The arena and structural operations.
pub mod tree;
