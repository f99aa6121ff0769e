#![forbid(unsafe_code)]

//! Interpolation frames handed to screen interpolators.
//!
//! An interpolator is a pure function of an [`InterpolationFrame`]: the
//! screen's own snapshot plus those of its stack neighbors. Frames are built
//! by value from published snapshots, so an interpolator never holds a
//! reference into the store.
//!
//! `progress` combines the screen with the one above it
//! (`current.progress + next.progress`), so a screen covered by an opening
//! screen sees values in `(1, 2]`.

use std::sync::Arc;

use crate::store::AnimationState;

/// Snapshot input for one interpolator call.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationFrame {
    /// The screen being styled.
    pub current: Arc<AnimationState>,
    /// The screen below it in the same stack.
    pub previous: Option<Arc<AnimationState>>,
    /// The screen above it in the same stack.
    pub next: Option<Arc<AnimationState>>,
    /// `current.progress + next.progress`.
    pub progress: f32,
}

impl InterpolationFrame {
    /// Build a frame from snapshots.
    #[must_use]
    pub fn new(
        current: Arc<AnimationState>,
        previous: Option<Arc<AnimationState>>,
        next: Option<Arc<AnimationState>>,
    ) -> Self {
        let progress = current.progress + next.as_ref().map_or(0.0, |n| n.progress);
        Self {
            current,
            previous,
            next,
            progress,
        }
    }

    /// Frame for a screen without state: fully open, idle, no neighbors.
    #[must_use]
    pub fn neutral() -> Self {
        Self::new(Arc::new(AnimationState::neutral()), None, None)
    }

    /// Whether the screen is the topmost of its stack.
    #[inline]
    #[must_use]
    pub fn is_top(&self) -> bool {
        self.next.is_none()
    }
}

impl Default for InterpolationFrame {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Pure mapping from a frame to a style value.
pub trait Interpolator {
    /// Produced style value.
    type Output;

    /// Map `frame` to an output.
    fn interpolate(&self, frame: &InterpolationFrame) -> Self::Output;
}

impl<F, O> Interpolator for F
where
    F: Fn(&InterpolationFrame) -> O,
{
    type Output = O;

    fn interpolate(&self, frame: &InterpolationFrame) -> O {
        self(frame)
    }
}

/// Piecewise-linear map of `value` from `input` to `output` ranges, clamped
/// to the end values.
///
/// `input` must be ascending and the same length as `output`; mismatched or
/// empty ranges yield `output`'s first value (or `0.0`).
#[must_use]
pub fn interpolate_clamped(value: f32, input: &[f32], output: &[f32]) -> f32 {
    let fallback = output.first().copied().unwrap_or(0.0);
    if input.len() != output.len() || input.is_empty() {
        return fallback;
    }
    if value <= input[0] {
        return output[0];
    }
    for i in 1..input.len() {
        if value <= input[i] {
            let span = input[i] - input[i - 1];
            let t = if span > 0.0 {
                (value - input[i - 1]) / span
            } else {
                1.0
            };
            return output[i - 1] + (output[i] - output[i - 1]) * t;
        }
    }
    output[output.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(progress: f32) -> Arc<AnimationState> {
        Arc::new(AnimationState::at_rest(progress, &[]))
    }

    #[test]
    fn progress_adds_screen_above() {
        let frame = InterpolationFrame::new(state(1.0), None, Some(state(0.4)));
        assert!((frame.progress - 1.4).abs() < 1e-6);
        assert!(!frame.is_top());
    }

    #[test]
    fn neutral_frame_is_open() {
        let frame = InterpolationFrame::neutral();
        assert_eq!(frame.progress, 1.0);
        assert!(frame.is_top());
        assert!(frame.previous.is_none());
    }

    #[test]
    fn closures_are_interpolators() {
        let slide = |frame: &InterpolationFrame| {
            interpolate_clamped(frame.progress, &[0.0, 1.0, 2.0], &[800.0, 0.0, -120.0])
        };
        let opening = InterpolationFrame::new(state(0.5), None, None);
        assert!((slide.interpolate(&opening) - 400.0).abs() < 1e-3);

        let covered = InterpolationFrame::new(state(1.0), None, Some(state(1.0)));
        assert!((slide.interpolate(&covered) + 120.0).abs() < 1e-3);
    }

    #[test]
    fn clamped_outside_range() {
        assert_eq!(interpolate_clamped(-1.0, &[0.0, 1.0], &[0.0, 10.0]), 0.0);
        assert_eq!(interpolate_clamped(3.0, &[0.0, 1.0], &[0.0, 10.0]), 10.0);
        assert_eq!(interpolate_clamped(0.5, &[0.0], &[1.0, 2.0]), 1.0);
    }
}
