use super::Vec2;

/// Axis-aligned rectangle (origin + size).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Builds a rectangle from two opposite corners.
    #[inline]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            origin: min,
            size: max - min,
        }
    }

    /// Smallest rectangle enclosing every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Rect>
    where
        I: IntoIterator<Item = Vec2>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Rect::from_min_max(min, max))
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Smallest rectangle containing both `self` and `other`.
    #[inline]
    pub fn union(self, other: Rect) -> Rect {
        Rect::from_min_max(self.min().min(other.min()), self.max().max(other.max()))
    }

    /// Returns the rectangle shifted by `-offset`.
    #[inline]
    pub fn relative_to(self, offset: Vec2) -> Rect {
        Rect {
            origin: self.origin - offset,
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── from_points ───────────────────────────────────────────────────────

    #[test]
    fn from_points_empty_is_none() {
        assert!(Rect::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn from_points_single_point_is_degenerate() {
        let r = Rect::from_points([Vec2::new(3.0, 4.0)]).unwrap();
        assert_eq!(r.origin, Vec2::new(3.0, 4.0));
        assert!(r.is_empty());
    }

    #[test]
    fn from_points_encloses_all() {
        let r = Rect::from_points([
            Vec2::new(-1.0, 2.0),
            Vec2::new(4.0, -3.0),
            Vec2::new(0.0, 5.0),
        ])
        .unwrap();
        assert_eq!(r, Rect::new(-1.0, -3.0, 5.0, 8.0));
    }

    // ── union / relative_to ───────────────────────────────────────────────

    #[test]
    fn union_covers_both() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0);
        let b = Rect::new(5.0, 1.0, 1.0, 4.0);
        assert_eq!(a.union(b), Rect::new(0.0, 0.0, 6.0, 5.0));
    }

    #[test]
    fn relative_to_moves_origin_only() {
        let r = Rect::new(10.0, 20.0, 3.0, 4.0).relative_to(Vec2::new(10.0, 5.0));
        assert_eq!(r, Rect::new(0.0, 15.0, 3.0, 4.0));
    }
}
