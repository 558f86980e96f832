use core::cmp::Ordering;

use super::ZIndex;

/// Paint-order key: z-index first, then submission order.
///
/// Submission order is what keeps a skeleton's split ranges and the overlay
/// output interleaved between them in draw-order sequence.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SortKey {
    pub z: ZIndex,
    /// Monotonic submission counter within the frame.
    pub order: u32,
}

impl SortKey {
    #[inline]
    pub const fn new(z: ZIndex, order: u32) -> Self {
        Self { z, order }
    }
}

impl Ord for SortKey {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        (self.z, self.order).cmp(&(other.z, other.order))
    }
}

impl PartialOrd for SortKey {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
