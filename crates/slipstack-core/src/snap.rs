#![forbid(unsafe_code)]

//! Snap points: extra rest targets for sheet-style screens.
//!
//! A sheet's progress rests on one of its ascending snap extents instead of
//! only `0`/`1`. The fractional snap index maps progress onto the sequence
//! `[closed (0.0) at -1, p0 at 0, p1 at 1, ...]` by piecewise-linear
//! interpolation, so `-1.0` is fully closed and `len - 1` is fully
//! expanded.
//!
//! # Release
//!
//! A release walks the snap points one adjacent pair at a time, starting
//! from the point the gesture began on and heading the way the finger
//! travelled. Each pair runs the dismissal test of [`crate::velocity`] with
//! the gap between the two points as the extent: the step is taken once the
//! projected travel passes half the gap. Velocity can carry the release at
//! most one pair past the last point the finger reached. The closed state
//! (index `-1`) is the pair below the smallest point, and only a gesture
//! that started there may take it.
//!
//! When no pair qualifies, the nearest snap point around the live progress
//! wins, biased by velocity.

use crate::error::CommandError;
use crate::ownership::ScreenId;
use crate::store::SettleTarget;
use crate::velocity::{projected_position, should_pass_dismissal_threshold};

/// Slack when comparing progress against snap extents.
const SNAP_EPSILON: f32 = 1e-3;

/// Fractional snap index for `progress`. `None` without snap points.
#[must_use]
pub fn index_for_progress(progress: f32, points: &[f32]) -> Option<f32> {
    let first = *points.first()?;
    if progress <= 0.0 {
        return Some(-1.0);
    }
    if progress < first {
        return Some(progress / first - 1.0);
    }
    for (i, pair) in points.windows(2).enumerate() {
        let (lo, hi) = (pair[0], pair[1]);
        if progress <= hi {
            let span = hi - lo;
            let t = if span > 0.0 { (progress - lo) / span } else { 1.0 };
            return Some(i as f32 + t);
        }
    }
    Some((points.len() - 1) as f32)
}

/// Largest snap extent, or `1.0` without snap points.
#[must_use]
pub fn max_extent(points: &[f32]) -> f32 {
    points.last().copied().unwrap_or(1.0)
}

/// Release inputs for [`choose_target`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapRelease {
    /// Live progress at release.
    pub progress: f32,
    /// Progress when the gesture started.
    pub start_progress: f32,
    /// Normalized velocity projected onto the collapse direction.
    pub collapse_velocity: f32,
    /// Velocity weight (`gestureVelocityImpact`).
    pub weight: f32,
    /// The gesture moved toward collapse.
    pub collapsing: bool,
    /// The screen may be dismissed.
    pub dismiss_enabled: bool,
}

/// Pick the rest target for a released sheet.
///
/// Ties go to the larger extent. Returns `Open(1.0)` when `points` is empty.
#[must_use]
pub fn choose_target(points: &[f32], release: &SnapRelease) -> SettleTarget {
    let Some(&min) = points.first() else {
        return SettleTarget::Open(1.0);
    };
    let may_close = release.dismiss_enabled
        && release.collapsing
        && release.start_progress <= min + SNAP_EPSILON;

    let mut at = nearest_index(points, release.start_progress);
    let mut chosen = None;
    loop {
        let here = points[at];
        if chosen.is_some() && !reached(release, here) {
            break;
        }
        let Some(next) = neighbour(points, at, release.collapsing, may_close) else {
            break;
        };
        if !crosses_pair(here, next.progress(), release) {
            break;
        }
        chosen = Some(next);
        match next {
            SettleTarget::Snap { index, .. } => at = index,
            _ => break,
        }
    }
    chosen.unwrap_or_else(|| biased_nearest(points, release))
}

/// Next rest target from snap point `at` in the direction of travel.
fn neighbour(points: &[f32], at: usize, collapsing: bool, may_close: bool) -> Option<SettleTarget> {
    if collapsing {
        match at.checked_sub(1) {
            Some(index) => Some(SettleTarget::Snap {
                index,
                progress: points[index],
            }),
            None => may_close.then_some(SettleTarget::Closed),
        }
    } else {
        points.get(at + 1).map(|&progress| SettleTarget::Snap {
            index: at + 1,
            progress,
        })
    }
}

/// The live progress has reached `extent` in the direction of travel.
fn reached(release: &SnapRelease, extent: f32) -> bool {
    if release.collapsing {
        release.progress <= extent + SNAP_EPSILON
    } else {
        release.progress >= extent - SNAP_EPSILON
    }
}

/// Dismissal test on the pair `here -> there`, normalized to their gap.
fn crosses_pair(here: f32, there: f32, release: &SnapRelease) -> bool {
    let gap = (there - here).abs();
    if gap <= SNAP_EPSILON {
        return false;
    }
    let toward = (there - here).signum();
    let travel = (release.progress - here) * toward;
    // Progress falls while moving toward collapse.
    let speed = -release.collapse_velocity * toward;
    should_pass_dismissal_threshold(travel, speed, gap, release.weight)
        && projected_position(travel, speed, gap, release.weight) > 0.0
}

/// Nearest of the snap points bracketing the live progress to the
/// velocity-projected position.
fn biased_nearest(points: &[f32], release: &SnapRelease) -> SettleTarget {
    let projected = release.progress - release.collapse_velocity * release.weight;
    let last = points.len() - 1;
    let lower = points
        .iter()
        .rposition(|&p| p <= release.progress + SNAP_EPSILON)
        .unwrap_or(0);
    let upper = points
        .iter()
        .position(|&p| p >= release.progress - SNAP_EPSILON)
        .unwrap_or(last);
    let index = if (projected - points[upper]).abs() <= (projected - points[lower]).abs() {
        upper
    } else {
        lower
    };
    SettleTarget::Snap {
        index,
        progress: points[index],
    }
}

/// Index of the snap point nearest to `progress`; ties go to the larger.
fn nearest_index(points: &[f32], progress: f32) -> usize {
    let mut best = 0;
    for (index, &point) in points.iter().enumerate() {
        if (progress - point).abs() <= (progress - points[best]).abs() {
            best = index;
        }
    }
    best
}

/// Snap target nearest to `progress` without projection. Used to return a
/// cancelled drag to where it rests.
#[must_use]
pub fn nearest(points: &[f32], progress: f32) -> SettleTarget {
    if points.is_empty() {
        return SettleTarget::Open(1.0);
    }
    let index = nearest_index(points, progress);
    SettleTarget::Snap {
        index,
        progress: points[index],
    }
}

/// Settle velocity toward `target`: the magnitude of `velocity`, signed
/// from `current` toward `target`. Zero when already there.
#[must_use]
pub fn settle_velocity(current: f32, target: f32, velocity: f32) -> f32 {
    let delta = target - current;
    if delta.abs() < SNAP_EPSILON {
        return 0.0;
    }
    velocity.abs().copysign(delta)
}

/// Resolve a programmatic `snap_to` request.
pub fn target_for_index(
    screen: ScreenId,
    points: &[f32],
    index: usize,
) -> Result<SettleTarget, CommandError> {
    if points.is_empty() {
        return Err(CommandError::NoSnapPoints(screen));
    }
    points
        .get(index)
        .map(|&progress| SettleTarget::Snap { index, progress })
        .ok_or(CommandError::SnapIndexOutOfRange {
            screen,
            index,
            len: points.len(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const POINTS: [f32; 3] = [0.25, 0.5, 1.0];

    fn release(progress: f32, start: f32, collapse_velocity: f32) -> SnapRelease {
        SnapRelease {
            progress,
            start_progress: start,
            collapse_velocity,
            weight: 0.3,
            collapsing: collapse_velocity > 0.0 || progress < start,
            dismiss_enabled: true,
        }
    }

    #[test]
    fn snap_index_is_piecewise_linear() {
        assert_eq!(index_for_progress(0.0, &POINTS), Some(-1.0));
        assert_eq!(index_for_progress(0.125, &POINTS), Some(-0.5));
        assert_eq!(index_for_progress(0.25, &POINTS), Some(0.0));
        assert_eq!(index_for_progress(0.375, &POINTS), Some(0.5));
        assert_eq!(index_for_progress(0.75, &POINTS), Some(1.5));
        assert_eq!(index_for_progress(1.0, &POINTS), Some(2.0));
        assert_eq!(index_for_progress(0.5, &[]), None);
    }

    #[test]
    fn release_steps_one_pair_per_reached_point() {
        let target = choose_target(&POINTS, &release(0.45, 0.25, 0.0));
        assert_eq!(
            target,
            SettleTarget::Snap {
                index: 1,
                progress: 0.5
            }
        );

        let target = choose_target(&POINTS, &release(0.6, 0.5, -1.5));
        assert_eq!(
            target,
            SettleTarget::Snap {
                index: 2,
                progress: 1.0
            }
        );
    }

    #[test]
    fn flick_from_smallest_point_stops_at_next() {
        let points = [0.3, 0.6, 1.0];
        // 100px up on an 800px screen at 1500px/s.
        let target = choose_target(&points, &release(0.425, 0.3, -1.875));
        assert_eq!(
            target,
            SettleTarget::Snap {
                index: 1,
                progress: 0.6
            }
        );
    }

    #[test]
    fn long_drag_crosses_every_reached_pair() {
        assert!(matches!(
            choose_target(&POINTS, &release(0.9, 0.25, 0.0)),
            SettleTarget::Snap { index: 2, .. }
        ));
        assert!(matches!(
            choose_target(&POINTS, &release(0.6, 0.25, 0.0)),
            SettleTarget::Snap { index: 1, .. }
        ));
    }

    #[test]
    fn short_drag_falls_back_to_nearest() {
        assert!(matches!(
            choose_target(&POINTS, &release(0.3, 0.25, 0.0)),
            SettleTarget::Snap { index: 0, .. }
        ));
        // Grabbed between points, nudged up, flung down: the velocity bias
        // picks the lower point although 0.5 is closer.
        let mut drifting = release(0.39, 0.39, 0.3);
        drifting.collapsing = false;
        assert!(matches!(
            choose_target(&POINTS, &drifting),
            SettleTarget::Snap { index: 0, .. }
        ));
    }

    #[test]
    fn nearest_ties_go_to_larger_extent() {
        assert_eq!(
            nearest(&POINTS, 0.75),
            SettleTarget::Snap {
                index: 2,
                progress: 1.0
            }
        );
        assert_eq!(nearest(&[], 0.4), SettleTarget::Open(1.0));
    }

    #[test]
    fn closed_only_from_smallest_point() {
        let from_min = choose_target(&POINTS, &release(0.1, 0.25, 0.5));
        assert_eq!(from_min, SettleTarget::Closed);

        let from_mid = choose_target(&POINTS, &release(0.1, 0.5, 0.5));
        assert_eq!(
            from_mid,
            SettleTarget::Snap {
                index: 0,
                progress: 0.25
            }
        );

        let mut no_dismiss = release(0.1, 0.25, 0.5);
        no_dismiss.dismiss_enabled = false;
        assert!(matches!(
            choose_target(&POINTS, &no_dismiss),
            SettleTarget::Snap { index: 0, .. }
        ));
    }

    #[test]
    fn settle_velocity_points_at_target() {
        assert!(settle_velocity(0.3, 0.5, -2.0) > 0.0);
        assert!(settle_velocity(0.6, 0.5, 2.0) < 0.0);
        assert_eq!(settle_velocity(0.5, 0.5, 2.0), 0.0);
    }

    #[test]
    fn snap_to_index_errors() {
        let id = ScreenId::new(3);
        assert_eq!(
            target_for_index(id, &[], 0),
            Err(CommandError::NoSnapPoints(id))
        );
        assert_eq!(
            target_for_index(id, &POINTS, 3),
            Err(CommandError::SnapIndexOutOfRange {
                screen: id,
                index: 3,
                len: 3
            })
        );
        assert!(target_for_index(id, &POINTS, 2).is_ok());
    }
}
