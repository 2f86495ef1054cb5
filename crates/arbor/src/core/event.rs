//! Input event types delivered by the platform window host.

use arbor_geom::Point;

/// Identifier distinguishing concurrent pointers (fingers, styluses).
pub type PointerId = u32;

/// Pointer event phases.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum PointerAction {
    /// Pointer made contact. Selects a dispatch target by hit-testing.
    Down,
    /// Pointer moved while down. Routed to the captured target.
    Move,
    /// Pointer lifted. Ends the gesture for this pointer id.
    Up,
    /// The gesture was aborted. Also sent synthetically on interception.
    Cancel,
}

/// A pointer event in some node's coordinate space. Events arrive at
/// the root in root coordinates; dispatch rewrites `position` into the
/// target's local space before delivery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Event phase.
    pub action: PointerAction,
    /// Which pointer this event belongs to.
    pub pointer: PointerId,
    /// Position in the current coordinate space.
    pub position: Point,
    /// The hosting window was obscured by another window when the
    /// event was generated. Consulted by the security filter.
    pub obscured: bool,
}

impl PointerEvent {
    /// Construct a pointer event for pointer 0 with no obscured flag.
    pub fn new(action: PointerAction, position: impl Into<Point>) -> Self {
        Self {
            action,
            pointer: 0,
            position: position.into(),
            obscured: false,
        }
    }
}

/// Modifier key state.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Mods {
    /// Shift is active.
    pub shift: bool,
    /// Control is active.
    pub ctrl: bool,
    /// Alt is active.
    pub alt: bool,
}

/// Key identity for key events.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum KeyCode {
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Tab. With shift, navigates backward.
    Tab,
    /// Enter.
    Enter,
    /// Escape.
    Escape,
    /// A character key.
    Char(char),
}

/// A key event, routed along the focus path.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key identity.
    pub code: KeyCode,
    /// Modifier state.
    pub mods: Mods,
    /// `true` for key-down, `false` for key-up.
    pub down: bool,
}

impl KeyEvent {
    /// A key-down event with no modifiers.
    pub fn down(code: KeyCode) -> Self {
        Self {
            code,
            mods: Mods::default(),
            down: true,
        }
    }
}

impl From<char> for KeyEvent {
    fn from(c: char) -> Self {
        Self::down(KeyCode::Char(c))
    }
}

/// Where a generic motion event originated.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum MotionSource {
    /// A pointing device; routed by hit-testing under `position`.
    Pointer,
    /// A non-pointer device (joystick, rotary); routed along the focus
    /// path.
    NonPointer,
}

/// A generic motion event carrying axis deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionEvent {
    /// Originating device class.
    pub source: MotionSource,
    /// Position, meaningful only for pointer sources.
    pub position: Point,
    /// Horizontal axis delta (e.g. horizontal wheel).
    pub axis_x: f32,
    /// Vertical axis delta (e.g. vertical wheel).
    pub axis_y: f32,
}
