//! Theme attribute resolution.
//!
//! A [`ThemeProvider`] maps attribute names to values; applying it to a
//! node translates the well-known attributes into node properties.
//! Unknown names are the provider's to ignore; a value of the wrong
//! shape is logged and skipped, leaving the node's current setting.

use arbor_geom::Size;

use crate::core::{
    id::NodeId,
    node::{NodeFlags, Visibility},
    tree::Tree,
};

/// A resolved theme attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Boolean attribute.
    Bool(bool),
    /// Integer attribute (dimensions, counts).
    Int(i32),
    /// Packed ARGB color.
    Color(u32),
    /// String attribute.
    Str(String),
}

impl AttrValue {
    fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Source of theme attribute values.
pub trait ThemeProvider {
    /// Resolve an attribute by name, or `None` when the theme does not
    /// define it.
    fn attr(&self, name: &str) -> Option<AttrValue>;
}

/// Attribute names recognized by [`Tree::apply_theme`]:
/// `enabled`, `clickable`, `focusable`, `focusable-in-touch-mode`,
/// `visibility` (`"visible"`, `"invisible"`, `"gone"`),
/// `preferred-width`, and `preferred-height`.
pub const KNOWN_ATTRS: &[&str] = &[
    "enabled",
    "clickable",
    "focusable",
    "focusable-in-touch-mode",
    "visibility",
    "preferred-width",
    "preferred-height",
];

impl Tree {
    /// Apply a theme's well-known attributes to one node. See
    /// [`KNOWN_ATTRS`] for the recognized names.
    pub fn apply_theme(&mut self, id: NodeId, theme: &dyn ThemeProvider) {
        if !self.nodes.contains_key(id) {
            return;
        }

        let flag_attrs = [
            ("enabled", NodeFlags::ENABLED),
            ("clickable", NodeFlags::CLICKABLE),
            ("focusable", NodeFlags::FOCUSABLE),
            ("focusable-in-touch-mode", NodeFlags::FOCUSABLE_IN_TOUCH_MODE),
        ];
        for (name, flag) in flag_attrs {
            let Some(value) = theme.attr(name) else {
                continue;
            };
            match value.as_bool() {
                Some(true) => self.modify_flags(id, flag, NodeFlags::empty()),
                Some(false) => self.modify_flags(id, NodeFlags::empty(), flag),
                None => tracing::warn!(name, ?value, "theme attribute is not a bool"),
            }
        }

        if let Some(value) = theme.attr("visibility") {
            match value.as_str() {
                Some("visible") => self.set_visibility(id, Visibility::Visible),
                Some("invisible") => self.set_visibility(id, Visibility::Invisible),
                Some("gone") => self.set_visibility(id, Visibility::Gone),
                _ => tracing::warn!(?value, "unrecognized visibility attribute"),
            }
        }

        let mut preferred = self.nodes[id].preferred;
        for (name, slot) in [
            ("preferred-width", &mut preferred.w),
            ("preferred-height", &mut preferred.h),
        ] {
            let Some(value) = theme.attr(name) else {
                continue;
            };
            match value.as_int() {
                Some(v) if v >= 0 => *slot = v,
                _ => tracing::warn!(name, ?value, "theme dimension is not a non-negative int"),
            }
        }
        self.set_preferred(id, Size::new(preferred.w, preferred.h));
    }
}
