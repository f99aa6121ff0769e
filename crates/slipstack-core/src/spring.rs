#![forbid(unsafe_code)]

//! Damped spring used to settle progress after a release.
//!
//! Classical damped harmonic oscillator:
//!
//!   F = -stiffness × (position - target) - damping × velocity
//!
//! integrated with semi-implicit Euler. A settle starts from the live
//! interpolated progress and the calculator's release velocity, so there is
//! no jump when a drag hands over to the animation.
//!
//! # Invariants
//!
//! 1. `position()` starts at the value passed to [`Spring::new`].
//! 2. A spring at rest stays at rest.
//! 3. Stiffness is at least [`MIN_STIFFNESS`]; damping is non-negative.
//!
//! # Failure Modes
//!
//! - Large dt: subdivided into steps of at most 4ms.
//! - Zero damping: oscillates forever; `is_at_rest()` may never be true.

use std::time::Duration;

/// Maximum dt per integration step (4ms).
const MAX_STEP_SECS: f32 = 0.004;

/// Position delta below which the spring may come to rest.
const DEFAULT_REST_THRESHOLD: f32 = 0.001;

/// Velocity below which (with the position threshold) the spring rests.
const DEFAULT_VELOCITY_THRESHOLD: f32 = 0.01;

/// Minimum stiffness to prevent degenerate springs.
pub const MIN_STIFFNESS: f32 = 0.1;

/// Spring constants for one kind of settle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpringConfig {
    /// Restoring force strength.
    pub stiffness: f32,
    /// Velocity drag.
    pub damping: f32,
}

impl SpringConfig {
    /// Near-critical settle with a barely visible overshoot.
    pub const OPEN: Self = Self {
        stiffness: 400.0,
        damping: 38.0,
    };

    /// Critically damped: a closing screen must not bounce back into view.
    pub const CLOSE: Self = Self {
        stiffness: 400.0,
        damping: 40.0,
    };
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::OPEN
    }
}

/// A damped harmonic oscillator driving one progress value.
#[derive(Debug, Clone)]
pub struct Spring {
    position: f32,
    velocity: f32,
    target: f32,
    stiffness: f32,
    damping: f32,
    rest_threshold: f32,
    velocity_threshold: f32,
    at_rest: bool,
}

impl Spring {
    /// Create a spring at `initial` heading for `target`, at zero velocity.
    #[must_use]
    pub fn new(initial: f32, target: f32) -> Self {
        Self {
            position: initial,
            velocity: 0.0,
            target,
            stiffness: SpringConfig::OPEN.stiffness,
            damping: SpringConfig::OPEN.damping,
            rest_threshold: DEFAULT_REST_THRESHOLD,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            at_rest: false,
        }
    }

    /// Apply stiffness and damping from `config`.
    #[must_use]
    pub fn with_config(self, config: &SpringConfig) -> Self {
        self.with_stiffness(config.stiffness)
            .with_damping(config.damping)
    }

    /// Set stiffness. Clamped to [`MIN_STIFFNESS`].
    #[must_use]
    pub fn with_stiffness(mut self, k: f32) -> Self {
        self.stiffness = k.max(MIN_STIFFNESS);
        self
    }

    /// Set damping. Clamped to `0.0`.
    #[must_use]
    pub fn with_damping(mut self, c: f32) -> Self {
        self.damping = c.max(0.0);
        self
    }

    /// Seed the initial velocity (units per second).
    #[must_use]
    pub fn with_velocity(mut self, velocity: f32) -> Self {
        self.velocity = velocity;
        self
    }

    /// Current position (unclamped).
    #[inline]
    #[must_use]
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Current velocity.
    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Whether the spring has settled at the target.
    #[inline]
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    fn step(&mut self, dt: f32) {
        let displacement = self.position - self.target;
        let acceleration = -self.stiffness * displacement - self.damping * self.velocity;

        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Advance the spring by `dt`, subdividing for stability.
    pub fn advance(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }

        let mut remaining = dt.as_secs_f32();
        if remaining <= 0.0 {
            return;
        }
        while remaining > 0.0 {
            let step_dt = remaining.min(MAX_STEP_SECS);
            self.step(step_dt);
            remaining -= step_dt;
        }

        if (self.position - self.target).abs() < self.rest_threshold
            && self.velocity.abs() < self.velocity_threshold
        {
            self.position = self.target;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
