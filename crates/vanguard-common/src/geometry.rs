//! Screen-space geometry in whole pixels.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in pixel coordinates (y grows downward).
///
/// Centers are derived with integer halving, so a rectangle with an odd width
/// reports the center one pixel left of the geometric middle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub w: i32,
    /// Height in pixels
    pub h: i32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Creates a rectangle of the given size centered on a point.
    #[must_use]
    pub const fn from_center(cx: i32, cy: i32, w: i32, h: i32) -> Self {
        Self {
            x: cx - w / 2,
            y: cy - h / 2,
            w,
            h,
        }
    }

    /// Horizontal center.
    #[must_use]
    pub const fn centerx(&self) -> i32 {
        self.x + self.w / 2
    }

    /// Vertical center.
    #[must_use]
    pub const fn centery(&self) -> i32 {
        self.y + self.h / 2
    }

    /// Center point as `(x, y)`.
    #[must_use]
    pub const fn center(&self) -> (i32, i32) {
        (self.centerx(), self.centery())
    }

    /// Moves the rectangle so its horizontal center lands on `cx`.
    pub fn set_centerx(&mut self, cx: i32) {
        self.x = cx - self.w / 2;
    }

    /// Right edge (exclusive).
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Bottom edge (exclusive).
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Checks whether two rectangles overlap.
    ///
    /// Touching edges do not count, and an empty rectangle never collides.
    #[must_use]
    pub const fn colliderect(&self, other: &Rect) -> bool {
        if self.w <= 0 || self.h <= 0 || other.w <= 0 || other.h <= 0 {
            return false;
        }
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rect_from_center() {
        let rect = Rect::from_center(50, 40, 20, 10);
        assert_eq!(rect, Rect::new(40, 35, 20, 10));
        assert_eq!(rect.right(), 60);
        assert_eq!(rect.bottom(), 45);
    }

    #[test]
    fn test_colliderect_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert!(a.colliderect(&b));
    }

    #[test]
    fn test_colliderect_touching_edges() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(!a.colliderect(&b));
    }

    #[test]
    fn test_colliderect_empty() {
        let a = Rect::new(0, 0, 10, 10);
        let empty = Rect::new(2, 2, 0, 5);
        assert!(!a.colliderect(&empty));
        assert!(!empty.colliderect(&a));
    }

    proptest! {
        #[test]
        fn prop_colliderect_symmetric(
            ax in -500i32..500, ay in -500i32..500, aw in 0i32..200, ah in 0i32..200,
            bx in -500i32..500, by in -500i32..500, bw in 0i32..200, bh in 0i32..200,
        ) {
            let a = Rect::new(ax, ay, aw, ah);
            let b = Rect::new(bx, by, bw, bh);
            prop_assert_eq!(a.colliderect(&b), b.colliderect(&a));
        }

        #[test]
        fn prop_set_centerx_keeps_size(x in -1000i32..1000, w in 0i32..300, cx in -1000i32..1000) {
            let mut rect = Rect::new(x, 0, w, 10);
            rect.set_centerx(cx);
            prop_assert_eq!(rect.w, w);
            prop_assert_eq!(rect.centerx(), cx);
        }
    }
}
