//! Property-based invariants for the gesture calculators.
//!
//! 1. **Clamping**: normalized velocity never leaves `±MAX_NORMALIZED_VELOCITY`
//!    and a non-positive extent normalizes to zero.
//!
//! 2. **Threshold**: `should_pass_dismissal_threshold` matches the projected
//!    position test, is symmetric under sign flip, and is monotone in
//!    translation.
//!
//! 3. **Release velocity**: `calculate_progress_velocity` points from the
//!    current progress toward the target with the normalized speed of the
//!    dominant axis.
//!
//! 4. **Activation**: movement up to `min_distance` never decides; activation
//!    requires ownership and edge eligibility; disabled recognizers never
//!    activate.
//!
//! 5. **Dismissal**: `determine_dismissal` only reports allowed directions.

use proptest::prelude::*;
use slipstack_core::activation::{
    ActivationDecision, ActivationInput, ActivationThresholds, EdgeConstraints, classify_swipe,
    should_activate_or_fail,
};
use slipstack_core::direction::{Axis, Direction, Directions};
use slipstack_core::geometry::{Size, Vector};
use slipstack_core::velocity::{
    DISMISS_THRESHOLD, MAX_NORMALIZED_VELOCITY, PanEvent, calculate_progress_velocity,
    determine_dismissal, normalize, projected_position, should_pass_dismissal_threshold,
};

const PHONE: Size = Size::new(390.0, 844.0);

// ── Strategies ──────────────────────────────────────────────────────────

fn px() -> impl Strategy<Value = f32> {
    -2000.0f32..2000.0
}

fn px_per_sec() -> impl Strategy<Value = f32> {
    -8000.0f32..8000.0
}

fn extent() -> impl Strategy<Value = f32> {
    1.0f32..2000.0
}

fn weight() -> impl Strategy<Value = f32> {
    0.0f32..=1.0
}

fn directions() -> impl Strategy<Value = Directions> {
    (0u8..16).prop_map(Directions::from_bits_truncate)
}

fn edges() -> impl Strategy<Value = EdgeConstraints> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(r, l, d, u)| {
        EdgeConstraints {
            horizontal_right: r,
            horizontal_left: l,
            vertical_down: d,
            vertical_up: u,
        }
    })
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Clamping
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn normalized_velocity_is_clamped(v in px_per_sec(), d in extent()) {
        let n = normalize(v, d);
        prop_assert!(n.is_finite());
        prop_assert!(n.abs() <= MAX_NORMALIZED_VELOCITY);
        prop_assert!(n == 0.0 || n.signum() == v.signum());
    }

    #[test]
    fn non_positive_extent_normalizes_to_zero(v in px_per_sec(), d in -100.0f32..=0.0) {
        prop_assert_eq!(normalize(v, d), 0.0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Dismissal threshold
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn threshold_matches_projection(t in px(), v in px_per_sec(), d in extent(), w in weight()) {
        let passes = should_pass_dismissal_threshold(t, v, d, w);
        let expected = !(t == 0.0 && v == 0.0)
            && projected_position(t, v, d, w).abs() > DISMISS_THRESHOLD;
        prop_assert_eq!(passes, expected);
    }

    #[test]
    fn threshold_is_sign_symmetric(t in px(), v in px_per_sec(), d in extent(), w in weight()) {
        prop_assert_eq!(
            should_pass_dismissal_threshold(t, v, d, w),
            should_pass_dismissal_threshold(-t, -v, d, w)
        );
    }

    #[test]
    fn threshold_is_monotone_in_translation(
        t in 0.0f32..2000.0,
        extra in 0.0f32..500.0,
        v in 0.0f32..8000.0,
        d in extent(),
        w in weight(),
    ) {
        if should_pass_dismissal_threshold(t, v, d, w) {
            prop_assert!(should_pass_dismissal_threshold(t + extra, v, d, w));
        }
    }
}

#[test]
fn threshold_reference_points() {
    assert!(should_pass_dismissal_threshold(170.0, 0.0, 320.0, 0.3));
    assert!(!should_pass_dismissal_threshold(0.0, 0.0, 320.0, 0.3));
    assert!(!should_pass_dismissal_threshold(100.0, 0.0, 320.0, 0.3));
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Release velocity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn progress_velocity_points_at_target(
        ty in px(),
        vy in px_per_sec(),
        current in 0.0f32..=1.0,
        dismiss in any::<bool>(),
    ) {
        let event = PanEvent::new(Vector::new(0.0, ty), Vector::new(0.0, vy));
        let velocity =
            calculate_progress_velocity(&event, PHONE, Directions::VERTICAL, dismiss, current);

        let target = if dismiss { 0.0 } else { 1.0 };
        let speed = normalize(vy, PHONE.height).abs();
        if current == target || speed == 0.0 {
            prop_assert_eq!(velocity, 0.0);
        } else {
            prop_assert_eq!(velocity.signum(), (target - current).signum());
            prop_assert!((velocity.abs() - speed).abs() < 1e-5);
        }
    }

    #[test]
    fn unsupported_axes_yield_no_velocity(
        tx in px(),
        ty in px(),
        current in 0.0f32..=1.0,
    ) {
        let event = PanEvent::new(Vector::new(tx, ty), Vector::new(500.0, 500.0));
        prop_assert_eq!(
            calculate_progress_velocity(&event, PHONE, Directions::empty(), true, current),
            0.0
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Activation
// ═════════════════════════════════════════════════════════════════════════

fn decide(
    delta: Vector,
    allowed: Directions,
    edges: &EdgeConstraints,
    disabled: bool,
) -> ActivationDecision {
    should_activate_or_fail(&ActivationInput {
        delta,
        allowed,
        edges,
        disabled,
        thresholds: &ActivationThresholds::default(),
    })
}

proptest! {
    #[test]
    fn small_movement_never_decides(
        dx in -10.0f32..=10.0,
        dy in -10.0f32..=10.0,
        allowed in directions(),
        edges in edges(),
        disabled in any::<bool>(),
    ) {
        prop_assert_eq!(
            decide(Vector::new(dx, dy), allowed, &edges, disabled),
            ActivationDecision::Pending
        );
    }

    #[test]
    fn activation_requires_ownership_and_edges(
        dx in px(),
        dy in px(),
        allowed in directions(),
        edges in edges(),
    ) {
        if let ActivationDecision::Activate(direction) =
            decide(Vector::new(dx, dy), allowed, &edges, false)
        {
            prop_assert!(allowed.has(direction));
            prop_assert!(edges.allows(direction));
            let axis = classify_swipe(Vector::new(dx, dy));
            prop_assert_eq!(axis, Some(direction.axis()));
        }
    }

    #[test]
    fn disabled_recognizers_never_activate(
        dx in px(),
        dy in px(),
        edges in edges(),
    ) {
        let decision = decide(Vector::new(dx, dy), Directions::all(), &edges, true);
        prop_assert!(!matches!(decision, ActivationDecision::Activate(_)));
    }

    #[test]
    fn classification_ignores_sign(dx in px(), dy in px()) {
        let axis = classify_swipe(Vector::new(dx, dy));
        prop_assert_eq!(axis, classify_swipe(Vector::new(-dx, dy)));
        prop_assert_eq!(axis, classify_swipe(Vector::new(dx, -dy)));
        if dx.abs() == dy.abs() {
            prop_assert_eq!(axis, None);
        }
    }
}

#[test]
fn clean_owned_swipe_activates_each_direction() {
    for direction in Direction::ALL {
        let delta = match direction.axis() {
            Axis::Horizontal => Vector::new(40.0 * direction.sign(), 2.0),
            Axis::Vertical => Vector::new(2.0, 40.0 * direction.sign()),
        };
        assert_eq!(
            decide(delta, direction.flag(), &EdgeConstraints::UNCONSTRAINED, false),
            ActivationDecision::Activate(direction),
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Dismissal
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn dismissal_reports_only_allowed_directions(
        tx in px(),
        ty in px(),
        vx in px_per_sec(),
        vy in px_per_sec(),
        allowed in directions(),
        w in weight(),
    ) {
        let event = PanEvent::new(Vector::new(tx, ty), Vector::new(vx, vy));
        let decision = determine_dismissal(&event, allowed, PHONE, w);
        match decision.direction {
            Some(direction) => {
                prop_assert!(decision.should_dismiss);
                prop_assert!(allowed.has(direction));
            }
            None => prop_assert!(!decision.should_dismiss),
        }
        if allowed.is_empty() {
            prop_assert!(!decision.should_dismiss);
        }
    }
}
