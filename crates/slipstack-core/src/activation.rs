#![forbid(unsafe_code)]

//! Activation geometry: where a drag may start and when it commits.
//!
//! Two pure decisions feed every recognizer:
//!
//! - [`compute_edge_constraints`]: given the touch-start point and the
//!   screen's activation area, which directions are geometrically eligible.
//! - [`should_activate_or_fail`]: given the cumulative delta, whether the
//!   recognizer activates in one direction, fails, or keeps waiting.
//!
//! # Invariants
//!
//! 1. Below the minimum movement threshold the decision is always
//!    [`ActivationDecision::Pending`].
//! 2. Equal horizontal and vertical magnitudes never classify; the decision
//!    stays pending.
//! 3. Past the threshold the decision is never pending once the swipe has an
//!    axis: it either activates exactly one direction or fails.

use crate::direction::{Axis, Direction, Directions};
use crate::geometry::{Point, Size, Vector};

/// Default edge band for the left and right edges (px).
pub const DEFAULT_HORIZONTAL_EDGE_DISTANCE: f32 = 50.0;

/// Default edge band for the top and bottom edges (px).
pub const DEFAULT_VERTICAL_EDGE_DISTANCE: f32 = 135.0;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How one side of the screen accepts touch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SideActivation {
    /// Any touch point is eligible.
    #[default]
    Screen,
    /// Only touches inside the response band of this edge are eligible.
    Edge,
}

/// Per-side activation area.
///
/// Each swipe direction reads the side it originates from: a rightward
/// swipe reads `left`, a leftward swipe `right`, a downward swipe `top`, an
/// upward swipe `bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActivationArea {
    /// Left edge (rightward swipes).
    pub left: SideActivation,
    /// Right edge (leftward swipes).
    pub right: SideActivation,
    /// Top edge (downward swipes).
    pub top: SideActivation,
    /// Bottom edge (upward swipes).
    pub bottom: SideActivation,
}

impl ActivationArea {
    /// Whole-screen activation on every side.
    #[must_use]
    pub const fn screen() -> Self {
        Self::uniform(SideActivation::Screen)
    }

    /// Edge-only activation on every side.
    #[must_use]
    pub const fn edge() -> Self {
        Self::uniform(SideActivation::Edge)
    }

    /// Same mode on all four sides.
    #[must_use]
    pub const fn uniform(mode: SideActivation) -> Self {
        Self {
            left: mode,
            right: mode,
            top: mode,
            bottom: mode,
        }
    }

    /// The side a swipe in `direction` originates from.
    #[must_use]
    pub const fn side_for(&self, direction: Direction) -> SideActivation {
        match direction {
            Direction::Horizontal => self.left,
            Direction::HorizontalInverted => self.right,
            Direction::Vertical => self.top,
            Direction::VerticalInverted => self.bottom,
        }
    }
}

/// Movement and tolerance thresholds for [`should_activate_or_fail`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ActivationThresholds {
    /// Movement along the classified axis required to decide (px).
    pub min_distance: f32,
    /// Allowed vertical drift while swiping horizontally (px).
    pub horizontal_cross_tolerance: f32,
    /// Allowed horizontal drift while swiping vertically (px).
    pub vertical_cross_tolerance: f32,
}

impl Default for ActivationThresholds {
    fn default() -> Self {
        Self {
            min_distance: 10.0,
            horizontal_cross_tolerance: 15.0,
            vertical_cross_tolerance: 20.0,
        }
    }
}

impl ActivationThresholds {
    /// Cross-axis tolerance while swiping along `axis`.
    #[inline]
    #[must_use]
    pub const fn cross_tolerance(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.horizontal_cross_tolerance,
            Axis::Vertical => self.vertical_cross_tolerance,
        }
    }
}

// ---------------------------------------------------------------------------
// Edge constraints
// ---------------------------------------------------------------------------

/// Per-direction geometric eligibility of a touch start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeConstraints {
    /// Rightward swipe allowed (touch near the left edge, or left side is
    /// whole-screen).
    pub horizontal_right: bool,
    /// Leftward swipe allowed.
    pub horizontal_left: bool,
    /// Downward swipe allowed.
    pub vertical_down: bool,
    /// Upward swipe allowed.
    pub vertical_up: bool,
}

impl EdgeConstraints {
    /// Every direction eligible.
    pub const UNCONSTRAINED: Self = Self {
        horizontal_right: true,
        horizontal_left: true,
        vertical_down: true,
        vertical_up: true,
    };

    /// Whether `direction` is geometrically eligible.
    #[inline]
    #[must_use]
    pub const fn allows(&self, direction: Direction) -> bool {
        match direction {
            Direction::Horizontal => self.horizontal_right,
            Direction::HorizontalInverted => self.horizontal_left,
            Direction::Vertical => self.vertical_down,
            Direction::VerticalInverted => self.vertical_up,
        }
    }

    /// Eligible directions as a set.
    #[must_use]
    pub fn to_directions(&self) -> Directions {
        Direction::ALL
            .into_iter()
            .filter(|d| self.allows(*d))
            .collect()
    }
}

/// Compute which directions a touch starting at `touch` may drive.
///
/// `response_distance` overrides the default band on every side; `None`
/// uses 50px for the left/right bands and 135px for the top/bottom bands.
#[must_use]
pub fn compute_edge_constraints(
    touch: Point,
    dimensions: Size,
    area: &ActivationArea,
    response_distance: Option<f32>,
) -> EdgeConstraints {
    let horizontal_band = response_distance.unwrap_or(DEFAULT_HORIZONTAL_EDGE_DISTANCE);
    let vertical_band = response_distance.unwrap_or(DEFAULT_VERTICAL_EDGE_DISTANCE);

    let within = |mode: SideActivation, near_edge: bool| match mode {
        SideActivation::Screen => true,
        SideActivation::Edge => near_edge,
    };

    EdgeConstraints {
        horizontal_right: within(area.left, touch.x <= horizontal_band),
        horizontal_left: within(area.right, touch.x >= dimensions.width - horizontal_band),
        vertical_down: within(area.top, touch.y <= vertical_band),
        vertical_up: within(area.bottom, touch.y >= dimensions.height - vertical_band),
    }
}

// ---------------------------------------------------------------------------
// Swipe classification and activation
// ---------------------------------------------------------------------------

/// Classify a cumulative delta by its dominant axis.
///
/// Equal magnitudes (including no movement) are ambiguous and return
/// `None`.
#[must_use]
pub fn classify_swipe(delta: Vector) -> Option<Axis> {
    let ax = delta.x.abs();
    let ay = delta.y.abs();
    if ax > ay {
        Some(Axis::Horizontal)
    } else if ay > ax {
        Some(Axis::Vertical)
    } else {
        None
    }
}

/// Why a recognizer failed. Carried for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    /// The recognizer is disabled.
    Disabled,
    /// Cross-axis drift exceeded the tolerance band.
    CrossAxisDrift,
    /// The signed direction is not claimed or inherited here.
    NotOwned(Direction),
    /// The touch started outside the edge band for this direction.
    EdgeGated(Direction),
    /// Scrollable content under the touch is not at the boundary this
    /// direction leaves from.
    ScrollGated(Direction),
    /// Another participant claimed the touch sequence first.
    Preempted,
}

/// Per-sample activation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationDecision {
    /// Not enough movement (or an ambiguous axis) to decide yet.
    Pending,
    /// Claim the touch sequence for this direction.
    Activate(Direction),
    /// Give up so a competing recognizer can take over.
    Fail(FailReason),
}

/// Inputs to [`should_activate_or_fail`].
#[derive(Debug, Clone, Copy)]
pub struct ActivationInput<'a> {
    /// Cumulative delta since touch start (px).
    pub delta: Vector,
    /// Directions this recognizer logically owns.
    pub allowed: Directions,
    /// Geometric eligibility from the touch start.
    pub edges: &'a EdgeConstraints,
    /// Recognizer disabled outright.
    pub disabled: bool,
    /// Thresholds in effect.
    pub thresholds: &'a ActivationThresholds,
}

/// Decide whether a directional recognizer activates, fails, or waits.
#[must_use]
pub fn should_activate_or_fail(input: &ActivationInput<'_>) -> ActivationDecision {
    let Some(axis) = classify_swipe(input.delta) else {
        return ActivationDecision::Pending;
    };

    let along = input.delta.along(axis);
    if along.abs() <= input.thresholds.min_distance {
        return ActivationDecision::Pending;
    }

    if input.disabled {
        return ActivationDecision::Fail(FailReason::Disabled);
    }

    let cross = input.delta.along(axis.cross()).abs();
    if cross > input.thresholds.cross_tolerance(axis) {
        return ActivationDecision::Fail(FailReason::CrossAxisDrift);
    }

    let direction = Direction::from_delta(axis, along);
    if !input.allowed.has(direction) {
        return ActivationDecision::Fail(FailReason::NotOwned(direction));
    }
    if !input.edges.allows(direction) {
        return ActivationDecision::Fail(FailReason::EdgeGated(direction));
    }

    ActivationDecision::Activate(direction)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const PHONE: Size = Size::new(375.0, 812.0);

    fn decide(dx: f32, dy: f32, allowed: Directions, edges: &EdgeConstraints) -> ActivationDecision {
        should_activate_or_fail(&ActivationInput {
            delta: Vector::new(dx, dy),
            allowed,
            edges,
            disabled: false,
            thresholds: &ActivationThresholds::default(),
        })
    }

    #[test]
    fn edge_mode_denies_mid_screen_touch() {
        let c = compute_edge_constraints(
            Point::new(200.0, 400.0),
            PHONE,
            &ActivationArea::edge(),
            None,
        );
        assert!(!c.horizontal_right);
        assert!(!c.horizontal_left);
        assert!(!c.vertical_down);
        assert!(!c.vertical_up);
    }

    #[test]
    fn edge_mode_allows_left_band() {
        let c = compute_edge_constraints(
            Point::new(30.0, 400.0),
            PHONE,
            &ActivationArea::edge(),
            None,
        );
        assert!(c.horizontal_right);
        assert!(!c.horizontal_left);
    }

    #[test]
    fn edge_mode_vertical_bands_default_to_135() {
        let top = compute_edge_constraints(
            Point::new(180.0, 120.0),
            PHONE,
            &ActivationArea::edge(),
            None,
        );
        assert!(top.vertical_down);
        assert!(!top.vertical_up);

        let bottom = compute_edge_constraints(
            Point::new(180.0, 700.0),
            PHONE,
            &ActivationArea::edge(),
            None,
        );
        assert!(bottom.vertical_up);
        assert!(!bottom.vertical_down);
    }

    #[test]
    fn response_distance_overrides_every_band() {
        let c = compute_edge_constraints(
            Point::new(90.0, 90.0),
            PHONE,
            &ActivationArea::edge(),
            Some(100.0),
        );
        assert!(c.horizontal_right);
        assert!(c.vertical_down);

        let narrow = compute_edge_constraints(
            Point::new(90.0, 90.0),
            PHONE,
            &ActivationArea::edge(),
            Some(20.0),
        );
        assert!(!narrow.horizontal_right);
        assert!(!narrow.vertical_down);
    }

    #[test]
    fn per_side_configuration() {
        let area = ActivationArea {
            left: SideActivation::Edge,
            ..ActivationArea::screen()
        };
        let c = compute_edge_constraints(Point::new(200.0, 400.0), PHONE, &area, None);
        assert!(!c.horizontal_right);
        assert!(c.horizontal_left);
        assert!(c.vertical_down);
        assert_eq!(
            c.to_directions(),
            Directions::HORIZONTAL_INVERTED | Directions::VERTICAL_AXIS
        );
    }

    #[test]
    fn classify_equal_magnitudes_is_ambiguous() {
        assert_eq!(classify_swipe(Vector::new(12.0, -12.0)), None);
        assert_eq!(classify_swipe(Vector::ZERO), None);
        assert_eq!(classify_swipe(Vector::new(3.0, 1.0)), Some(Axis::Horizontal));
        assert_eq!(classify_swipe(Vector::new(-1.0, -3.0)), Some(Axis::Vertical));
    }

    #[test]
    fn pending_below_threshold() {
        let edges = EdgeConstraints::UNCONSTRAINED;
        assert_eq!(
            decide(6.0, 1.0, Directions::HORIZONTAL, &edges),
            ActivationDecision::Pending
        );
        // Below threshold even when the direction is not owned.
        assert_eq!(
            decide(-6.0, 1.0, Directions::HORIZONTAL, &edges),
            ActivationDecision::Pending
        );
    }

    #[test]
    fn threshold_distance_itself_stays_pending() {
        let edges = EdgeConstraints::UNCONSTRAINED;
        assert_eq!(
            decide(10.0, 0.0, Directions::HORIZONTAL, &edges),
            ActivationDecision::Pending
        );
        assert_eq!(
            decide(10.5, 0.0, Directions::HORIZONTAL, &edges),
            ActivationDecision::Activate(Direction::Horizontal)
        );
    }

    #[test]
    fn activates_past_threshold() {
        let edges = EdgeConstraints::UNCONSTRAINED;
        assert_eq!(
            decide(24.0, 4.0, Directions::HORIZONTAL, &edges),
            ActivationDecision::Activate(Direction::Horizontal)
        );
        assert_eq!(
            decide(2.0, -30.0, Directions::VERTICAL_AXIS, &edges),
            ActivationDecision::Activate(Direction::VerticalInverted)
        );
    }

    #[test]
    fn fails_on_disallowed_direction() {
        let edges = EdgeConstraints::UNCONSTRAINED;
        assert_eq!(
            decide(-24.0, 0.0, Directions::HORIZONTAL, &edges),
            ActivationDecision::Fail(FailReason::NotOwned(Direction::HorizontalInverted))
        );
    }

    #[test]
    fn fails_on_edge_gate() {
        let edges = EdgeConstraints {
            horizontal_right: false,
            ..EdgeConstraints::UNCONSTRAINED
        };
        assert_eq!(
            decide(24.0, 0.0, Directions::HORIZONTAL, &edges),
            ActivationDecision::Fail(FailReason::EdgeGated(Direction::Horizontal))
        );
    }

    #[test]
    fn fails_on_cross_axis_drift() {
        let edges = EdgeConstraints::UNCONSTRAINED;
        // Horizontal swipe tolerates 15px of vertical drift.
        assert_eq!(
            decide(40.0, 16.0, Directions::HORIZONTAL, &edges),
            ActivationDecision::Fail(FailReason::CrossAxisDrift)
        );
        // Vertical swipe tolerates 20px of horizontal drift.
        assert_eq!(
            decide(18.0, 40.0, Directions::VERTICAL, &edges),
            ActivationDecision::Activate(Direction::Vertical)
        );
        assert_eq!(
            decide(21.0, 40.0, Directions::VERTICAL, &edges),
            ActivationDecision::Fail(FailReason::CrossAxisDrift)
        );
    }

    #[test]
    fn disabled_fails_past_threshold() {
        let edges = EdgeConstraints::UNCONSTRAINED;
        let decision = should_activate_or_fail(&ActivationInput {
            delta: Vector::new(0.0, 40.0),
            allowed: Directions::VERTICAL,
            edges: &edges,
            disabled: true,
            thresholds: &ActivationThresholds::default(),
        });
        assert_eq!(decision, ActivationDecision::Fail(FailReason::Disabled));
    }
}
