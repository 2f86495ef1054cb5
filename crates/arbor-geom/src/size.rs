/// A width/height pair. Negative components are clamped to zero on
/// construction.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Size {
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl Size {
    /// Construct a size, clamping negative components to zero.
    pub fn new(w: i32, h: i32) -> Self {
        Self {
            w: w.max(0),
            h: h.max(0),
        }
    }

    /// A zero size.
    pub fn zero() -> Self {
        Self { w: 0, h: 0 }
    }

    /// Does either dimension collapse to zero?
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

impl From<(i32, i32)> for Size {
    fn from((w, h): (i32, i32)) -> Self {
        Self::new(w, h)
    }
}
