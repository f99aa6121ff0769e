#![forbid(unsafe_code)]

//! Per-screen gesture configuration and engine-wide tuning.
//!
//! [`ScreenGestureConfig`] mirrors the per-screen configuration surface the
//! navigator hands over on mount. [`EngineConfig`] groups the tunables that
//! are the same for every screen (activation thresholds, settle springs).
//!
//! # Loading
//!
//! With the `config` feature, [`EngineConfig`] loads from JSON or TOML:
//!
//! ```toml
//! [activation]
//! minDistance = 12.0
//!
//! [closeSpring]
//! stiffness = 500.0
//! damping = 44.7
//! ```
//!
//! ```rust,ignore
//! let config = EngineConfig::from_toml_file("slipstack.toml")?;
//! ```
//!
//! # Defaults
//!
//! Every field has a default, so a partial file only overrides what it
//! names.

#[cfg(feature = "config")]
use std::path::Path;

use crate::activation::{ActivationArea, ActivationThresholds};
use crate::direction::{Axis, Direction, Directions};
use crate::error::ConfigError;
use crate::spring::SpringConfig;
use crate::velocity::DEFAULT_VELOCITY_IMPACT;

// ---------------------------------------------------------------------------
// Per-screen configuration
// ---------------------------------------------------------------------------

/// One entry of the `gestureDirection` configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum GestureDirection {
    /// Swipe right.
    Horizontal,
    /// Swipe left.
    HorizontalInverted,
    /// Swipe down.
    Vertical,
    /// Swipe up.
    VerticalInverted,
    /// All four directions.
    Bidirectional,
}

impl GestureDirection {
    /// Directions this entry enables.
    #[must_use]
    pub const fn directions(self) -> Directions {
        match self {
            Self::Horizontal => Directions::HORIZONTAL,
            Self::HorizontalInverted => Directions::HORIZONTAL_INVERTED,
            Self::Vertical => Directions::VERTICAL,
            Self::VerticalInverted => Directions::VERTICAL_INVERTED,
            Self::Bidirectional => Directions::all(),
        }
    }
}

/// Gesture configuration of one screen.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ScreenGestureConfig {
    /// Master switch. A disabled screen claims nothing.
    pub gesture_enabled: bool,
    /// One or more dismiss directions.
    pub gesture_direction: Vec<GestureDirection>,
    /// Edge band override for every side (px).
    pub gesture_response_distance: Option<f32>,
    /// Where touches may start.
    pub gesture_activation_area: ActivationArea,
    /// Weight of release velocity relative to translation (0..=1).
    pub gesture_velocity_impact: f32,
    /// Ascending fractional rest extents for sheet-style screens.
    pub snap_points: Vec<f32>,
    /// Whether a sheet may expand by dragging inside its scrollable content.
    pub expand_via_scroll_view: bool,
}

impl Default for ScreenGestureConfig {
    fn default() -> Self {
        Self {
            gesture_enabled: false,
            gesture_direction: vec![GestureDirection::Horizontal],
            gesture_response_distance: None,
            gesture_activation_area: ActivationArea::screen(),
            gesture_velocity_impact: DEFAULT_VELOCITY_IMPACT,
            snap_points: Vec::new(),
            expand_via_scroll_view: true,
        }
    }
}

impl ScreenGestureConfig {
    /// An enabled config dismissing in `directions`.
    #[must_use]
    pub fn dismissible(directions: impl IntoIterator<Item = GestureDirection>) -> Self {
        Self {
            gesture_enabled: true,
            gesture_direction: directions.into_iter().collect(),
            ..Self::default()
        }
    }

    /// An enabled sheet collapsing in `direction` with the given snap points.
    #[must_use]
    pub fn sheet(direction: GestureDirection, snap_points: impl Into<Vec<f32>>) -> Self {
        Self {
            gesture_enabled: true,
            gesture_direction: vec![direction],
            snap_points: snap_points.into(),
            ..Self::default()
        }
    }

    /// Builder: set `expand_via_scroll_view`.
    #[must_use]
    pub fn with_expand_via_scroll_view(mut self, enabled: bool) -> Self {
        self.expand_via_scroll_view = enabled;
        self
    }

    /// Builder: set the activation area.
    #[must_use]
    pub fn with_activation_area(mut self, area: ActivationArea) -> Self {
        self.gesture_activation_area = area;
        self
    }

    /// Builder: set the response distance.
    #[must_use]
    pub fn with_response_distance(mut self, distance: f32) -> Self {
        self.gesture_response_distance = Some(distance);
        self
    }

    /// Dismiss directions from `gestureDirection`, or empty when disabled.
    #[must_use]
    pub fn dismiss_directions(&self) -> Directions {
        if !self.gesture_enabled {
            return Directions::empty();
        }
        self.gesture_direction
            .iter()
            .fold(Directions::empty(), |acc, d| acc | d.directions())
    }

    /// Whether this screen rests on snap points.
    #[inline]
    #[must_use]
    pub fn has_snap_points(&self) -> bool {
        !self.snap_points.is_empty()
    }

    /// Every direction this screen claims: its dismiss directions, plus both
    /// directions of each dismiss axis when it has snap points.
    #[must_use]
    pub fn claimed_directions(&self) -> Directions {
        let dismiss = self.dismiss_directions();
        if dismiss.is_empty() || !self.has_snap_points() {
            return dismiss;
        }
        [Axis::Horizontal, Axis::Vertical]
            .into_iter()
            .filter(|axis| dismiss.touches_axis(*axis))
            .fold(dismiss, |acc, axis| acc | axis.directions())
    }

    /// The collapse direction of a sheet: the first dismiss direction on the
    /// sheet's axis. `None` for screens without snap points.
    #[must_use]
    pub fn collapse_direction(&self) -> Option<Direction> {
        if !self.has_snap_points() {
            return None;
        }
        self.dismiss_directions().directions().next()
    }

    /// Snap points sorted ascending, as used at runtime.
    #[must_use]
    pub fn sorted_snap_points(&self) -> Vec<f32> {
        let mut points = self.snap_points.clone();
        points.sort_by(f32::total_cmp);
        points.dedup();
        points
    }

    /// Check ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.gesture_velocity_impact) {
            return Err(ConfigError::invalid(
                "gestureVelocityImpact",
                format!("must be in [0, 1], got {}", self.gesture_velocity_impact),
            ));
        }
        if let Some(distance) = self.gesture_response_distance
            && !(distance >= 0.0 && distance.is_finite())
        {
            return Err(ConfigError::invalid(
                "gestureResponseDistance",
                format!("must be a non-negative number, got {distance}"),
            ));
        }
        if let Some(bad) = self
            .snap_points
            .iter()
            .find(|p| !(**p > 0.0 && **p <= 1.0))
        {
            return Err(ConfigError::invalid(
                "snapPoints",
                format!("every snap point must be in (0, 1], got {bad}"),
            ));
        }
        if self.gesture_enabled && self.gesture_direction.is_empty() {
            return Err(ConfigError::invalid(
                "gestureDirection",
                "an enabled gesture needs at least one direction",
            ));
        }
        if self.has_snap_points() {
            let dismiss = self.dismiss_directions();
            if dismiss.touches_axis(Axis::Horizontal) && dismiss.touches_axis(Axis::Vertical) {
                return Err(ConfigError::invalid(
                    "snapPoints",
                    "a sheet moves along a single axis",
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Engine configuration
// ---------------------------------------------------------------------------

/// Engine-wide tunables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct EngineConfig {
    /// Activation thresholds for every recognizer.
    pub activation: ActivationThresholds,
    /// Spring used when settling open or onto a snap point.
    pub open_spring: SpringConfig,
    /// Spring used when settling closed.
    pub close_spring: SpringConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            activation: ActivationThresholds::default(),
            open_spring: SpringConfig::OPEN,
            close_spring: SpringConfig::CLOSE,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Check ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.activation;
        if !(a.min_distance > 0.0) {
            return Err(ConfigError::invalid(
                "activation.minDistance",
                format!("must be > 0, got {}", a.min_distance),
            ));
        }
        if a.horizontal_cross_tolerance < 0.0 || a.vertical_cross_tolerance < 0.0 {
            return Err(ConfigError::invalid(
                "activation",
                "cross-axis tolerances must be >= 0",
            ));
        }
        for (field, spring) in [
            ("openSpring", &self.open_spring),
            ("closeSpring", &self.close_spring),
        ] {
            if !(spring.stiffness > 0.0) || spring.damping < 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!(
                        "stiffness must be > 0 and damping >= 0, got {} / {}",
                        spring.stiffness, spring.damping
                    ),
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
