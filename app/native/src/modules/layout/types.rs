//! Geometry types for the layout engine.
//!
//! Two coordinate spaces are in play:
//! - `Rect` holds fractional screen coordinates (`0.0..=1.0`), which is how
//!   agents describe slots independently of the physical display.
//! - `ScreenRect` holds absolute device units, which is what the host
//!   places windows with.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Fractional Rect
// ============================================================================

/// A rectangle in fractional screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Check if this rectangle has valid dimensions.
    #[must_use]
    pub fn is_valid(&self) -> bool { self.width > 0.0 && self.height > 0.0 }

    /// Check if every coordinate lies within the unit square range `0.0..=1.0`.
    #[must_use]
    pub fn is_fractional(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|value| value.is_finite() && (0.0..=1.0).contains(value))
    }

    /// Check if this rectangle overlaps another.
    ///
    /// Rectangles that only share an edge do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// Convert to absolute device units within `screen`.
    ///
    /// Each component is truncated toward zero after scaling.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_screen(&self, screen: &ScreenRect) -> ScreenRect {
        let sw = f64::from(screen.width);
        let sh = f64::from(screen.height);
        ScreenRect::new(
            (f64::from(screen.x) + self.x * sw) as i32,
            (f64::from(screen.y) + self.y * sh) as i32,
            (self.width * sw) as i32,
            (self.height * sh) as i32,
        )
    }
}

// ============================================================================
// Absolute ScreenRect
// ============================================================================

/// A rectangle in absolute device units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRect {
    /// Create a new screen rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// X coordinate one past the right edge.
    #[must_use]
    pub const fn right(&self) -> i32 { self.x + self.width }

    /// Y coordinate one past the bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 { self.y + self.height }

    /// Check if this rectangle has a positive area.
    #[must_use]
    pub const fn is_valid(&self) -> bool { self.width > 0 && self.height > 0 }

    /// Returns true if this rectangle's horizontal center lies left of `other`'s.
    #[must_use]
    pub const fn is_left_of_center(&self, other: &Self) -> bool {
        2 * self.x + self.width < 2 * other.x + other.width
    }

    /// Client area of a window framed by a border of `border_width`.
    ///
    /// The origin stays put; the border is drawn outside the client area,
    /// so only the size shrinks.
    #[must_use]
    pub const fn without_border(&self, border_width: i32) -> Self {
        Self::new(
            self.x,
            self.y,
            self.width - 2 * border_width,
            self.height - 2 * border_width,
        )
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    mod rect_tests {
        use super::*;

        #[test]
        fn test_rect_is_valid() {
            assert!(Rect::new(0.0, 0.0, 0.5, 0.5).is_valid());
            assert!(!Rect::new(0.0, 0.0, 0.0, 0.5).is_valid());
            assert!(!Rect::new(0.0, 0.0, 0.5, -0.1).is_valid());
        }

        #[test]
        fn test_rect_is_fractional() {
            assert!(Rect::new(0.0, 0.0, 1.0, 1.0).is_fractional());
            assert!(!Rect::new(-0.1, 0.0, 0.5, 0.5).is_fractional());
            assert!(!Rect::new(0.0, 0.0, 1.5, 0.5).is_fractional());
            assert!(!Rect::new(f64::NAN, 0.0, 0.5, 0.5).is_fractional());
        }

        #[test]
        fn test_rect_intersects_overlap() {
            let a = Rect::new(0.0, 0.0, 0.5, 1.0);
            let b = Rect::new(0.25, 0.25, 0.5, 0.5);
            assert!(a.intersects(&b));
            assert!(b.intersects(&a));
        }

        #[test]
        fn test_rect_touching_edges_do_not_intersect() {
            let left = Rect::new(0.0, 0.0, 0.5, 1.0);
            let right = Rect::new(0.5, 0.0, 0.5, 1.0);
            assert!(!left.intersects(&right));

            let top = Rect::new(0.0, 0.0, 1.0, 0.5);
            let bottom = Rect::new(0.0, 0.5, 1.0, 0.5);
            assert!(!top.intersects(&bottom));
        }

        #[test]
        fn test_rect_disjoint() {
            let a = Rect::new(0.0, 0.0, 0.2, 0.2);
            let b = Rect::new(0.6, 0.6, 0.2, 0.2);
            assert!(!a.intersects(&b));
        }

        #[test]
        fn test_rect_to_screen_truncates() {
            let screen = ScreenRect::new(0, 0, 1921, 1081);
            let rect = Rect::new(0.75, 0.0, 0.25, 0.5);
            assert_eq!(rect.to_screen(&screen), ScreenRect::new(1440, 0, 480, 540));
        }

        #[test]
        fn test_rect_to_screen_respects_origin() {
            let screen = ScreenRect::new(100, 50, 1000, 500);
            let rect = Rect::new(0.5, 0.5, 0.5, 0.5);
            assert_eq!(rect.to_screen(&screen), ScreenRect::new(600, 300, 500, 250));
        }
    }

    mod screen_rect_tests {
        use super::*;

        #[test]
        fn test_edges() {
            let rect = ScreenRect::new(10, 20, 100, 50);
            assert_eq!(rect.right(), 110);
            assert_eq!(rect.bottom(), 70);
        }

        #[test]
        fn test_is_valid() {
            assert!(ScreenRect::new(0, 0, 1, 1).is_valid());
            assert!(!ScreenRect::new(0, 0, 0, 10).is_valid());
            assert!(!ScreenRect::new(0, 0, 10, -5).is_valid());
        }

        #[test]
        fn test_is_left_of_center() {
            let screen = ScreenRect::new(0, 0, 1000, 500);
            assert!(ScreenRect::new(0, 0, 300, 500).is_left_of_center(&screen));
            assert!(!ScreenRect::new(700, 0, 300, 500).is_left_of_center(&screen));
            // Exactly centered counts as right-anchored.
            assert!(!ScreenRect::new(250, 0, 500, 500).is_left_of_center(&screen));
        }

        #[test]
        fn test_without_border() {
            let rect = ScreenRect::new(10, 20, 100, 50).without_border(2);
            assert_eq!(rect, ScreenRect::new(10, 20, 96, 46));
        }
    }
}
