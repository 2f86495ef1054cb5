//! Measurement constraints and the rules for resolving them.
//!
//! A [`MeasureSpec`] is the constraint a parent imposes on a child for
//! one axis during the measure pass. The measured result is carried as
//! a plain [`Measured`] struct; there is no packed bit encoding.

use arbor_geom::Size;

/// Constraint mode for one axis of a measure pass.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum SpecMode {
    /// The child must be exactly the given size.
    Exactly,
    /// The child may be any size up to the given size.
    AtMost,
    /// The child may be any non-negative size it wants.
    Unspecified,
}

/// A (size, mode) constraint for one axis.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct MeasureSpec {
    /// Constraint size. Ignored for [`SpecMode::Unspecified`].
    pub size: i32,
    /// Constraint mode.
    pub mode: SpecMode,
}

impl MeasureSpec {
    /// An exact-size constraint.
    pub fn exactly(size: i32) -> Self {
        Self {
            size: size.max(0),
            mode: SpecMode::Exactly,
        }
    }

    /// An upper-bound constraint.
    pub fn at_most(size: i32) -> Self {
        Self {
            size: size.max(0),
            mode: SpecMode::AtMost,
        }
    }

    /// An unconstrained spec.
    pub fn unspecified() -> Self {
        Self {
            size: 0,
            mode: SpecMode::Unspecified,
        }
    }

    /// Resolve a desired size against this constraint.
    ///
    /// Returns the granted size and whether the node wanted more space
    /// than it was granted.
    pub fn resolve(&self, desired: i32) -> (i32, bool) {
        let desired = desired.max(0);
        match self.mode {
            SpecMode::Exactly => (self.size, false),
            SpecMode::AtMost => (desired.min(self.size), desired > self.size),
            SpecMode::Unspecified => (desired, false),
        }
    }
}

/// How a node wants to size itself within its parent, per axis.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum SizePolicy {
    /// Exactly this many units.
    Fixed(i32),
    /// As large as the parent allows.
    MatchParent,
    /// As large as the node's content wants, up to the parent's limit.
    #[default]
    WrapContent,
}

/// Derive the spec a parent passes to a child for one axis.
///
/// `spec` is the constraint imposed on the parent, `used` is space the
/// parent has already reserved on this axis, and `policy` is how the
/// child wants to size itself. The derivation follows the standard
/// mode table: a parent with an exact or bounded size turns
/// `MatchParent` into `Exactly`/`AtMost` of the remaining space and
/// `WrapContent` into `AtMost`; an unconstrained parent can only pass
/// the lack of constraint through.
pub fn child_measure_spec(spec: MeasureSpec, used: i32, policy: SizePolicy) -> MeasureSpec {
    let room = (spec.size - used).max(0);
    if let SizePolicy::Fixed(size) = policy {
        return MeasureSpec::exactly(size);
    }
    match (spec.mode, policy) {
        (SpecMode::Exactly, SizePolicy::MatchParent) => MeasureSpec::exactly(room),
        (SpecMode::Exactly, SizePolicy::WrapContent) => MeasureSpec::at_most(room),
        (SpecMode::AtMost, SizePolicy::MatchParent) => MeasureSpec::at_most(room),
        (SpecMode::AtMost, SizePolicy::WrapContent) => MeasureSpec::at_most(room),
        (SpecMode::Unspecified, _) => MeasureSpec::unspecified(),
        // Fixed is handled above.
        (_, SizePolicy::Fixed(_)) => unreachable!(),
    }
}

/// The outcome of measuring a node.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Measured {
    /// Granted width.
    pub width: i32,
    /// Granted height.
    pub height: i32,
    /// The node wanted a larger width than it was granted.
    pub width_too_small: bool,
    /// The node wanted a larger height than it was granted.
    pub height_too_small: bool,
}

impl Measured {
    /// Resolve a desired size against both axis constraints.
    pub fn resolve(desired: Size, width: MeasureSpec, height: MeasureSpec) -> Self {
        let (w, w_small) = width.resolve(desired.w);
        let (h, h_small) = height.resolve(desired.h);
        Self {
            width: w,
            height: h,
            width_too_small: w_small,
            height_too_small: h_small,
        }
    }

    /// An exact measurement with no too-small state.
    pub fn exact(width: i32, height: i32) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
            width_too_small: false,
            height_too_small: false,
        }
    }

    /// Granted size as a [`Size`].
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Did either axis want more space than granted?
    pub fn too_small(&self) -> bool {
        self.width_too_small || self.height_too_small
    }
}
