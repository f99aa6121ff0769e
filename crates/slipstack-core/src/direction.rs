#![forbid(unsafe_code)]

//! Signed drag directions and direction sets.
//!
//! A [`Direction`] is one signed drag along one axis. The names follow the
//! gesture configuration surface: `vertical` is a downward drag (the usual
//! dismiss gesture for a modal), `vertical-inverted` is upward, `horizontal`
//! is rightward (back-swipe), and `horizontal-inverted` is leftward.
//!
//! [`Directions`] is the bit set stored on every screen node as its claimed
//! directions.

use bitflags::bitflags;

/// A drag axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Axis {
    /// Left/right movement.
    Horizontal,
    /// Up/down movement.
    Vertical,
}

impl Axis {
    /// Both directions on this axis.
    #[must_use]
    pub const fn directions(self) -> Directions {
        match self {
            Self::Horizontal => Directions::HORIZONTAL_AXIS,
            Self::Vertical => Directions::VERTICAL_AXIS,
        }
    }

    /// The other axis.
    #[must_use]
    pub const fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// A single signed drag direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Direction {
    /// Drag down (positive y).
    Vertical,
    /// Drag up (negative y).
    VerticalInverted,
    /// Drag right (positive x).
    Horizontal,
    /// Drag left (negative x).
    HorizontalInverted,
}

impl Direction {
    /// Every direction, in evaluation order.
    pub const ALL: [Self; 4] = [
        Self::Vertical,
        Self::VerticalInverted,
        Self::Horizontal,
        Self::HorizontalInverted,
    ];

    /// Axis this direction moves along.
    #[inline]
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Vertical | Self::VerticalInverted => Axis::Vertical,
            Self::Horizontal | Self::HorizontalInverted => Axis::Horizontal,
        }
    }

    /// `+1.0` when the direction follows the positive screen axis, `-1.0`
    /// otherwise.
    #[inline]
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Vertical | Self::Horizontal => 1.0,
            Self::VerticalInverted | Self::HorizontalInverted => -1.0,
        }
    }

    /// The direction on the same axis with the opposite sign.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Vertical => Self::VerticalInverted,
            Self::VerticalInverted => Self::Vertical,
            Self::Horizontal => Self::HorizontalInverted,
            Self::HorizontalInverted => Self::Horizontal,
        }
    }

    /// Direction for a signed delta along `axis`. Zero maps to the positive
    /// direction.
    #[must_use]
    pub fn from_delta(axis: Axis, delta: f32) -> Self {
        match (axis, delta < 0.0) {
            (Axis::Vertical, false) => Self::Vertical,
            (Axis::Vertical, true) => Self::VerticalInverted,
            (Axis::Horizontal, false) => Self::Horizontal,
            (Axis::Horizontal, true) => Self::HorizontalInverted,
        }
    }

    /// Single-bit set for this direction.
    #[inline]
    #[must_use]
    pub const fn flag(self) -> Directions {
        match self {
            Self::Vertical => Directions::VERTICAL,
            Self::VerticalInverted => Directions::VERTICAL_INVERTED,
            Self::Horizontal => Directions::HORIZONTAL,
            Self::HorizontalInverted => Directions::HORIZONTAL_INVERTED,
        }
    }

    /// Configuration name of this direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vertical => "vertical",
            Self::VerticalInverted => "vertical-inverted",
            Self::Horizontal => "horizontal",
            Self::HorizontalInverted => "horizontal-inverted",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Set of claimed or allowed directions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Directions: u8 {
        /// Drag down.
        const VERTICAL = 1 << 0;
        /// Drag up.
        const VERTICAL_INVERTED = 1 << 1;
        /// Drag right.
        const HORIZONTAL = 1 << 2;
        /// Drag left.
        const HORIZONTAL_INVERTED = 1 << 3;

        /// Both vertical directions.
        const VERTICAL_AXIS = Self::VERTICAL.bits() | Self::VERTICAL_INVERTED.bits();
        /// Both horizontal directions.
        const HORIZONTAL_AXIS = Self::HORIZONTAL.bits() | Self::HORIZONTAL_INVERTED.bits();
    }
}

impl Directions {
    /// Whether `direction` is in the set.
    #[inline]
    #[must_use]
    pub const fn has(self, direction: Direction) -> bool {
        self.contains(direction.flag())
    }

    /// Iterate the contained directions in [`Direction::ALL`] order.
    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.has(*d))
    }

    /// Whether any direction on `axis` is present.
    #[inline]
    #[must_use]
    pub const fn touches_axis(self, axis: Axis) -> bool {
        self.intersects(axis.directions())
    }
}

impl From<Direction> for Directions {
    fn from(direction: Direction) -> Self {
        direction.flag()
    }
}

impl FromIterator<Direction> for Directions {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |acc, d| acc | d.flag())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
