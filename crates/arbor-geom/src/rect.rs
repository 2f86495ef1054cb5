use super::{Point, Size};

/// A rectangle stored as edge coordinates. `right` and `bottom` are
/// exclusive; an empty rect has `right <= left` or `bottom <= top`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

impl Rect {
    /// Construct a rectangle from edge coordinates.
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Construct a rectangle from an origin and a size.
    pub fn from_size(origin: Point, size: Size) -> Self {
        Self {
            left: origin.x,
            top: origin.y,
            right: origin.x.saturating_add(size.w),
            bottom: origin.y.saturating_add(size.h),
        }
    }

    /// A zero rectangle at the origin.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Width of the rectangle, zero if degenerate.
    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    /// Height of the rectangle, zero if degenerate.
    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    /// Size of the rectangle.
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Does this rect enclose no area?
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Center point, rounded toward the top-left.
    pub fn center(&self) -> Point {
        Point::new(
            self.left + self.width() / 2,
            self.top + self.height() / 2,
        )
    }

    /// Does the rect contain the point? Edges at `right`/`bottom` are
    /// exclusive.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }

    /// Do the two rects overlap?
    pub fn intersects(&self, other: Self) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    /// Intersection of two rects, if non-empty.
    pub fn intersect(&self, other: Self) -> Option<Self> {
        let r = Self {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        };
        if r.is_empty() { None } else { Some(r) }
    }

    /// Smallest rect containing both rects.
    pub fn union(&self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Return this rect translated by the given deltas.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            left: self.left.saturating_add(dx),
            top: self.top.saturating_add(dy),
            right: self.right.saturating_add(dx),
            bottom: self.bottom.saturating_add(dy),
        }
    }

    /// Return this rect moved so its top-left corner is at `origin`.
    pub fn offset_to(&self, origin: Point) -> Self {
        Self::from_size(origin, self.size())
    }

    /// Do the vertical extents of the rects overlap?
    pub fn overlaps_vertically(&self, other: Self) -> bool {
        self.top < other.bottom && other.top < self.bottom
    }

    /// Do the horizontal extents of the rects overlap?
    pub fn overlaps_horizontally(&self, other: Self) -> bool {
        self.left < other.right && other.left < self.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_edges_exclusive() {
        let r = Rect::new(1, 1, 4, 4);
        assert!(r.contains(Point::new(1, 1)));
        assert!(r.contains(Point::new(3, 3)));
        assert!(!r.contains(Point::new(4, 3)));
        assert!(!r.contains(Point::new(3, 4)));
        assert!(!r.contains(Point::new(0, 1)));
    }

    #[test]
    fn intersect_and_union() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 15, 15);
        assert_eq!(a.intersect(b), Some(Rect::new(5, 5, 10, 10)));
        assert_eq!(a.union(b), Rect::new(0, 0, 15, 15));
        let c = Rect::new(20, 20, 30, 30);
        assert_eq!(a.intersect(c), None);
        assert!(!a.intersects(c));
    }

    #[test]
    fn degenerate_rects() {
        let r = Rect::new(5, 5, 5, 9);
        assert!(r.is_empty());
        assert_eq!(r.width(), 0);
        assert_eq!(r.size(), Size::new(0, 4));
        assert_eq!(r.union(Rect::new(0, 0, 2, 2)), Rect::new(0, 0, 2, 2));
    }

    #[test]
    fn offsets() {
        let r = Rect::new(1, 2, 3, 4);
        assert_eq!(r.offset(10, 20), Rect::new(11, 22, 13, 24));
        assert_eq!(r.offset_to(Point::zero()), Rect::new(0, 0, 2, 2));
    }
}
