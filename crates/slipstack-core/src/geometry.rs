#![forbid(unsafe_code)]

//! Geometric primitives in logical pixels.

use crate::direction::{Axis, Direction};

/// A touch position, origin at the top-left of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A two-component displacement or rate (translation in px, velocity in
/// px/s, or their normalized counterparts).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Vector {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component along `axis`.
    #[inline]
    #[must_use]
    pub const fn along(self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Signed projection onto `direction`: positive when moving the way the
    /// direction points.
    #[inline]
    #[must_use]
    pub fn toward(self, direction: Direction) -> f32 {
        self.along(direction.axis()) * direction.sign()
    }

    /// Whether both components are exactly zero.
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Screen or viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    /// Width in px.
    pub width: f32,
    /// Height in px.
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Extent along `axis`.
    #[inline]
    #[must_use]
    pub const fn along(self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Check if either extent is non-positive.
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toward_respects_sign() {
        let v = Vector::new(-40.0, 120.0);
        assert_eq!(v.toward(Direction::Vertical), 120.0);
        assert_eq!(v.toward(Direction::VerticalInverted), -120.0);
        assert_eq!(v.toward(Direction::HorizontalInverted), 40.0);
    }

    #[test]
    fn size_along_axis() {
        let s = Size::new(375.0, 812.0);
        assert_eq!(s.along(Axis::Horizontal), 375.0);
        assert_eq!(s.along(Axis::Vertical), 812.0);
        assert!(!s.is_empty());
        assert!(Size::new(0.0, 10.0).is_empty());
    }
}
