#![forbid(unsafe_code)]

//! Velocity normalization and the release-time dismissal test.
//!
//! Everything here is a pure function over normalized units (fractions of
//! the screen extent per axis), so the same fling feels the same on every
//! screen size.
//!
//! # Dismissal model
//!
//! A release projects where the screen would land:
//!
//! ```text
//! projected = translation / extent + clamp(velocity / extent) * weight
//! ```
//!
//! and dismisses when the projection crosses the midpoint of the screen
//! (`0.5`). A long slow drag and a short fast flick both qualify.
//!
//! # Invariants
//!
//! 1. [`normalize`] always returns a value in
//!    `[-MAX_NORMALIZED_VELOCITY, MAX_NORMALIZED_VELOCITY]`.
//! 2. A release with zero translation and zero velocity never dismisses.
//! 3. [`calculate_restore_velocity`] returns exactly `0.0` inside the
//!    [`RESTORE_EPSILON`] band.
//! 4. [`determine_dismissal`] only evaluates directions present in the
//!    allowed set.

use crate::direction::{Axis, Direction, Directions};
use crate::geometry::{Size, Vector};

/// Velocity clamp in screen extents per second.
pub const MAX_NORMALIZED_VELOCITY: f32 = 3.2;

/// Projected position (fraction of the screen) a release must exceed.
pub const DISMISS_THRESHOLD: f32 = 0.5;

/// Band around the rest value inside which restore velocity is zero.
pub const RESTORE_EPSILON: f32 = 0.01;

/// Default weight of velocity relative to translation.
pub const DEFAULT_VELOCITY_IMPACT: f32 = 0.3;

/// Translation and velocity of the active pointer, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanEvent {
    /// Cumulative translation since touch start (px).
    pub translation: Vector,
    /// Instantaneous velocity (px/s).
    pub velocity: Vector,
}

impl PanEvent {
    /// Create a new pan event.
    #[inline]
    pub const fn new(translation: Vector, velocity: Vector) -> Self {
        Self {
            translation,
            velocity,
        }
    }
}

/// Outcome of [`determine_dismissal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DismissalDecision {
    /// Whether the release should dismiss the screen.
    pub should_dismiss: bool,
    /// The first allowed direction whose projection passed.
    pub direction: Option<Direction>,
}

/// Divide a pixel velocity by the screen extent and clamp to
/// `±MAX_NORMALIZED_VELOCITY`.
///
/// A non-positive extent yields `0.0`.
#[must_use]
pub fn normalize(velocity: f32, extent: f32) -> f32 {
    if extent <= 0.0 || !velocity.is_finite() {
        return 0.0;
    }
    (velocity / extent).clamp(-MAX_NORMALIZED_VELOCITY, MAX_NORMALIZED_VELOCITY)
}

/// Normalize a translation against the screen extent (no clamp).
#[inline]
#[must_use]
pub fn normalize_translation(translation: f32, extent: f32) -> f32 {
    if extent <= 0.0 {
        0.0
    } else {
        translation / extent
    }
}

/// Normalized projected position of a release along one axis.
#[inline]
#[must_use]
pub fn projected_position(translation: f32, velocity: f32, extent: f32, weight: f32) -> f32 {
    normalize_translation(translation, extent) + normalize(velocity, extent) * weight
}

/// Whether a release with this translation and velocity projects past the
/// midpoint of the screen, in either direction.
#[must_use]
pub fn should_pass_dismissal_threshold(
    translation: f32,
    velocity: f32,
    extent: f32,
    velocity_weight: f32,
) -> bool {
    if translation == 0.0 && velocity == 0.0 {
        return false;
    }
    projected_position(translation, velocity, extent, velocity_weight).abs() > DISMISS_THRESHOLD
}

/// Signed velocity (progress units per second) to seed the settle animation
/// after a release decision.
///
/// The dominant axis is the supported axis with the larger normalized
/// translation. With one supported axis it is always that axis. Ties fall
/// back to raw translation magnitude, then to the vertical axis. The result
/// points from `current_progress` toward the target (`0.0` when dismissing,
/// `1.0` otherwise) and is `0.0` when already at the target or when no axis
/// is supported.
#[must_use]
pub fn calculate_progress_velocity(
    event: &PanEvent,
    dimensions: Size,
    supported: Directions,
    should_dismiss: bool,
    current_progress: f32,
) -> f32 {
    let Some(axis) = dominant_axis(event, dimensions, supported) else {
        return 0.0;
    };

    let target = if should_dismiss { 0.0 } else { 1.0 };
    let delta = target - current_progress;
    if delta == 0.0 {
        return 0.0;
    }

    let speed = normalize(event.velocity.along(axis), dimensions.along(axis)).abs();
    speed.copysign(delta)
}

fn dominant_axis(event: &PanEvent, dimensions: Size, supported: Directions) -> Option<Axis> {
    let horizontal = supported.touches_axis(Axis::Horizontal);
    let vertical = supported.touches_axis(Axis::Vertical);
    match (horizontal, vertical) {
        (false, false) => None,
        (true, false) => Some(Axis::Horizontal),
        (false, true) => Some(Axis::Vertical),
        (true, true) => {
            let nx = normalize_translation(event.translation.x, dimensions.width).abs();
            let ny = normalize_translation(event.translation.y, dimensions.height).abs();
            if nx > ny {
                Some(Axis::Horizontal)
            } else if ny > nx {
                Some(Axis::Vertical)
            } else if event.translation.x.abs() > event.translation.y.abs() {
                Some(Axis::Horizontal)
            } else {
                Some(Axis::Vertical)
            }
        }
    }
}

/// Velocity that returns an off-rest value to zero.
///
/// Points from `current` toward zero with magnitude `min(|base|, 1)`, or is
/// exactly `0.0` once `|current| < RESTORE_EPSILON` so a spring does not
/// chase micro-oscillations.
#[must_use]
pub fn calculate_restore_velocity(current: f32, base_velocity: f32) -> f32 {
    if current.abs() < RESTORE_EPSILON {
        return 0.0;
    }
    let magnitude = base_velocity.abs().min(1.0);
    if magnitude == 0.0 {
        return 0.0;
    }
    -magnitude.copysign(current)
}

/// Release-time dismissal decision over the allowed directions.
///
/// Each allowed direction is tested with its own sign: a `vertical`
/// (downward) claim only passes on a downward projection, a
/// `vertical-inverted` claim only on an upward one.
#[must_use]
pub fn determine_dismissal(
    event: &PanEvent,
    allowed: Directions,
    dimensions: Size,
    velocity_weight: f32,
) -> DismissalDecision {
    if event.translation.is_zero() && event.velocity.is_zero() {
        return DismissalDecision::default();
    }

    for direction in allowed.directions() {
        let extent = dimensions.along(direction.axis());
        let projected = projected_position(
            event.translation.toward(direction),
            event.velocity.toward(direction),
            extent,
            velocity_weight,
        );
        if projected > DISMISS_THRESHOLD {
            return DismissalDecision {
                should_dismiss: true,
                direction: Some(direction),
            };
        }
    }

    DismissalDecision::default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const PHONE: Size = Size::new(320.0, 640.0);

    fn pan(tx: f32, ty: f32, vx: f32, vy: f32) -> PanEvent {
        PanEvent::new(Vector::new(tx, ty), Vector::new(vx, vy))
    }

    #[test]
    fn normalize_clamps_flings() {
        assert!((normalize(6400.0, 320.0) - 3.2).abs() < 1e-6);
        assert!((normalize(-6400.0, 320.0) + 3.2).abs() < 1e-6);
        assert!((normalize(160.0, 320.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn normalize_degenerate_extent_is_zero() {
        assert_eq!(normalize(500.0, 0.0), 0.0);
        assert_eq!(normalize(500.0, -10.0), 0.0);
        assert_eq!(normalize(f32::NAN, 320.0), 0.0);
    }

    #[test]
    fn threshold_translation_only() {
        assert!(should_pass_dismissal_threshold(170.0, 0.0, 320.0, 0.3));
        assert!(!should_pass_dismissal_threshold(150.0, 0.0, 320.0, 0.3));
    }

    #[test]
    fn threshold_no_movement_never_dismisses() {
        assert!(!should_pass_dismissal_threshold(0.0, 0.0, 320.0, 0.3));
        assert!(!should_pass_dismissal_threshold(0.0, 0.0, 320.0, 10.0));
    }

    #[test]
    fn threshold_short_fast_flick() {
        // 20% of the screen plus a clamped fling: 0.0625 + 3.2 * 0.3 > 0.5
        assert!(should_pass_dismissal_threshold(20.0, 5000.0, 320.0, 0.3));
        // Same flick with no velocity impact stays put.
        assert!(!should_pass_dismissal_threshold(20.0, 5000.0, 320.0, 0.0));
    }

    #[test]
    fn threshold_is_symmetric() {
        assert!(should_pass_dismissal_threshold(-170.0, 0.0, 320.0, 0.3));
    }

    #[test]
    fn progress_velocity_single_axis_dominant() {
        let event = pan(10.0, 300.0, 640.0, 900.0);
        // Only horizontal supported: horizontal is dominant even though the
        // vertical translation is larger.
        let v = calculate_progress_velocity(&event, PHONE, Directions::HORIZONTAL, true, 0.9);
        assert!((v + 2.0).abs() < 1e-6, "{v}");
    }

    #[test]
    fn progress_velocity_points_toward_target() {
        let event = pan(0.0, 200.0, 0.0, 1280.0);
        let dismiss = calculate_progress_velocity(&event, PHONE, Directions::VERTICAL, true, 0.7);
        assert!(dismiss < 0.0);
        let restore = calculate_progress_velocity(&event, PHONE, Directions::VERTICAL, false, 0.7);
        assert!(restore > 0.0);
        assert!((dismiss.abs() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn progress_velocity_is_clamped() {
        let event = pan(0.0, 200.0, 0.0, 90_000.0);
        let v = calculate_progress_velocity(&event, PHONE, Directions::VERTICAL, true, 0.7);
        assert!(v.abs() <= MAX_NORMALIZED_VELOCITY + 1e-6);
    }

    #[test]
    fn progress_velocity_dominant_by_normalized_translation() {
        // 100/320 = 0.31 horizontal vs 150/640 = 0.23 vertical: horizontal
        // wins although the raw vertical translation is larger.
        let event = pan(100.0, 150.0, 320.0, 1280.0);
        let all = Directions::HORIZONTAL_AXIS | Directions::VERTICAL_AXIS;
        let v = calculate_progress_velocity(&event, PHONE, all, true, 1.0);
        assert!((v + 1.0).abs() < 1e-6, "{v}");
    }

    #[test]
    fn progress_velocity_at_target_is_zero() {
        let event = pan(0.0, 10.0, 0.0, 600.0);
        assert_eq!(
            calculate_progress_velocity(&event, PHONE, Directions::VERTICAL, false, 1.0),
            0.0
        );
        assert_eq!(
            calculate_progress_velocity(&event, PHONE, Directions::empty(), true, 0.5),
            0.0
        );
    }

    #[test]
    fn restore_velocity_band_and_clamp() {
        assert_eq!(calculate_restore_velocity(0.005, 3.0), 0.0);
        assert_eq!(calculate_restore_velocity(-0.009, 3.0), 0.0);
        assert!((calculate_restore_velocity(0.4, 3.0) + 1.0).abs() < 1e-6);
        assert!((calculate_restore_velocity(-0.4, 0.5) - 0.5).abs() < 1e-6);
        assert_eq!(calculate_restore_velocity(0.4, 0.0), 0.0);
    }

    #[test]
    fn dismissal_respects_sign_of_claim() {
        let down = pan(0.0, 400.0, 0.0, 0.0);
        assert!(determine_dismissal(&down, Directions::VERTICAL, PHONE, 0.3).should_dismiss);
        assert!(
            !determine_dismissal(&down, Directions::VERTICAL_INVERTED, PHONE, 0.3).should_dismiss
        );

        let up = pan(0.0, -400.0, 0.0, 0.0);
        let decision = determine_dismissal(&up, Directions::VERTICAL_AXIS, PHONE, 0.3);
        assert_eq!(decision.direction, Some(Direction::VerticalInverted));
    }

    #[test]
    fn dismissal_skips_disallowed_directions() {
        let right = pan(300.0, 0.0, 2000.0, 0.0);
        let decision = determine_dismissal(&right, Directions::VERTICAL_AXIS, PHONE, 0.3);
        assert!(!decision.should_dismiss);
        assert_eq!(decision.direction, None);
    }

    #[test]
    fn dismissal_velocity_can_reverse_translation() {
        // Dragged down past the midpoint but flung back up hard.
        let event = pan(0.0, 340.0, 0.0, -3000.0);
        assert!(!determine_dismissal(&event, Directions::VERTICAL, PHONE, 0.3).should_dismiss);
    }
}
