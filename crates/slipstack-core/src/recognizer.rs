#![forbid(unsafe_code)]

//! Per-touch recognizers and the race that arbitrates between them.
//!
//! Each owning screen gets one [`DirectionalRecognizer`] per touch
//! sequence. A recognizer is a `Pending → Active | Failed` machine fed with
//! the cumulative delta. The [`GestureRace`] takes the first participant to
//! report `Active` and fails everyone else; the native scroll participant
//! only claims the sequence once every screen recognizer has failed.
//!
//! # Invariants
//!
//! 1. A recognizer leaves `Pending` at most once.
//! 2. A race has at most one winner, and the winner never changes.
//! 3. A [`TouchSession`] outcome leaves `Pending` at most once.

use std::fmt::Debug;

use tracing::debug;

use crate::activation::{
    ActivationDecision, ActivationInput, ActivationThresholds, EdgeConstraints, FailReason,
    classify_swipe, should_activate_or_fail,
};
use crate::direction::{Direction, Directions};
use crate::geometry::{Point, Vector};
use crate::ownership::ScreenId;
use crate::scroll::ScrollableId;

// ---------------------------------------------------------------------------
// Recognizer
// ---------------------------------------------------------------------------

/// State of one recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecognizerState {
    /// Not decided yet.
    #[default]
    Pending,
    /// Claimed the touch sequence in this direction.
    Active(Direction),
    /// Gave up.
    Failed(FailReason),
}

impl RecognizerState {
    /// Whether still undecided.
    #[inline]
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether failed.
    #[inline]
    #[must_use]
    pub const fn is_failed(self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Directional pan recognizer for one owning screen.
#[derive(Debug, Clone)]
pub struct DirectionalRecognizer {
    screen: ScreenId,
    owned: Directions,
    scroll_allowed: Directions,
    edges: EdgeConstraints,
    disabled: bool,
    state: RecognizerState,
}

impl DirectionalRecognizer {
    /// Recognizer for `screen`, owning `owned` for this touch.
    #[must_use]
    pub fn new(screen: ScreenId, owned: Directions, edges: EdgeConstraints) -> Self {
        Self {
            screen,
            owned,
            scroll_allowed: Directions::all(),
            edges,
            disabled: false,
            state: RecognizerState::Pending,
        }
    }

    /// Restrict the directions scrollable content lets through.
    #[must_use]
    pub fn with_scroll_allowed(mut self, allowed: Directions) -> Self {
        self.scroll_allowed = allowed;
        self
    }

    /// Disable outright.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Screen this recognizer drives.
    #[inline]
    #[must_use]
    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    /// Directions owned for this touch.
    #[inline]
    #[must_use]
    pub fn owned(&self) -> Directions {
        self.owned
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> RecognizerState {
        self.state
    }

    /// Feed the cumulative delta. Decided recognizers keep their state.
    pub fn update(&mut self, delta: Vector, thresholds: &ActivationThresholds) -> RecognizerState {
        if !self.state.is_pending() {
            return self.state;
        }
        let decision = should_activate_or_fail(&ActivationInput {
            delta,
            allowed: self.owned,
            edges: &self.edges,
            disabled: self.disabled,
            thresholds,
        });
        self.state = match decision {
            ActivationDecision::Pending => RecognizerState::Pending,
            ActivationDecision::Activate(direction) if !self.scroll_allowed.has(direction) => {
                RecognizerState::Failed(FailReason::ScrollGated(direction))
            }
            ActivationDecision::Activate(direction) => RecognizerState::Active(direction),
            ActivationDecision::Fail(reason) => RecognizerState::Failed(reason),
        };
        self.state
    }

    fn preempt(&mut self) {
        if self.state.is_pending() {
            self.state = RecognizerState::Failed(FailReason::Preempted);
        }
    }
}

// ---------------------------------------------------------------------------
// Race
// ---------------------------------------------------------------------------

/// First-`Active`-wins arbiter over participants keyed by `K`.
#[derive(Debug, Clone)]
pub struct GestureRace<K> {
    entrants: Vec<(K, RecognizerState)>,
    winner: Option<K>,
}

impl<K> Default for GestureRace<K> {
    fn default() -> Self {
        Self {
            entrants: Vec::new(),
            winner: None,
        }
    }
}

impl<K: Copy + Eq + Debug> GestureRace<K> {
    /// Create an empty race.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant. Ignored once a winner exists or if already entered.
    pub fn enter(&mut self, key: K) {
        if self.winner.is_none() && !self.entrants.iter().any(|(k, _)| *k == key) {
            self.entrants.push((key, RecognizerState::Pending));
        }
    }

    /// Report a participant's new state. Returns the winner, if any.
    ///
    /// The first `Active` report wins and every other participant fails
    /// with [`FailReason::Preempted`]. Reports after a winner exists are
    /// ignored.
    pub fn report(&mut self, key: K, state: RecognizerState) -> Option<K> {
        if self.winner.is_some() {
            return self.winner;
        }
        let Some(slot) = self.entrants.iter_mut().find(|(k, _)| *k == key) else {
            return None;
        };
        if !slot.1.is_pending() {
            return None;
        }
        slot.1 = state;
        if let RecognizerState::Active(_) = state {
            self.winner = Some(key);
            for (k, s) in &mut self.entrants {
                if *k != key {
                    *s = RecognizerState::Failed(FailReason::Preempted);
                }
            }
        }
        self.winner
    }

    /// Winning participant.
    #[inline]
    #[must_use]
    pub fn winner(&self) -> Option<K> {
        self.winner
    }

    /// Recorded state of a participant.
    #[must_use]
    pub fn state_of(&self, key: K) -> Option<RecognizerState> {
        self.entrants
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, s)| *s)
    }

    /// Whether every participant matching `filter` has failed. Vacuously
    /// true when none match.
    pub fn all_failed_where(&self, mut filter: impl FnMut(&K) -> bool) -> bool {
        self.entrants
            .iter()
            .filter(|(k, _)| filter(k))
            .all(|(_, s)| s.is_failed())
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A participant in a touch race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Participant {
    /// The pan recognizer of an owning screen.
    Screen(ScreenId),
    /// Native scrolling of the touched scrollable.
    NativeScroll,
}

/// What a touch sequence ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case", tag = "kind"))]
pub enum GestureOutcome {
    /// Still undecided.
    #[default]
    Pending,
    /// A screen gesture won and drives `screen`.
    Driving {
        screen: ScreenId,
        direction: Direction,
    },
    /// Native scrolling won.
    Scrolling,
    /// Nothing responds to this touch.
    Ignored,
}

/// One touch sequence from start to end or cancel.
#[derive(Debug, Clone)]
pub struct TouchSession {
    start: Point,
    scrollable: Option<ScrollableId>,
    recognizers: Vec<DirectionalRecognizer>,
    race: GestureRace<Participant>,
    outcome: GestureOutcome,
}

impl TouchSession {
    /// Start a session at `start`, optionally inside a scrollable.
    #[must_use]
    pub fn new(
        start: Point,
        scrollable: Option<ScrollableId>,
        recognizers: Vec<DirectionalRecognizer>,
    ) -> Self {
        let mut race = GestureRace::new();
        for recognizer in &recognizers {
            race.enter(Participant::Screen(recognizer.screen()));
        }
        if scrollable.is_some() {
            race.enter(Participant::NativeScroll);
        }
        Self {
            start,
            scrollable,
            recognizers,
            race,
            outcome: GestureOutcome::Pending,
        }
    }

    /// Touch start point.
    #[inline]
    #[must_use]
    pub fn start(&self) -> Point {
        self.start
    }

    /// Scrollable under the touch start.
    #[inline]
    #[must_use]
    pub fn scrollable(&self) -> Option<ScrollableId> {
        self.scrollable
    }

    /// Current outcome.
    #[inline]
    #[must_use]
    pub fn outcome(&self) -> GestureOutcome {
        self.outcome
    }

    /// Recognizers in this session.
    #[must_use]
    pub fn recognizers(&self) -> &[DirectionalRecognizer] {
        &self.recognizers
    }

    /// Directions `screen` owns in this session; empty when it takes no part.
    #[must_use]
    pub fn owned_by(&self, screen: ScreenId) -> Directions {
        self.recognizers
            .iter()
            .find(|r| r.screen() == screen)
            .map_or(Directions::empty(), DirectionalRecognizer::owned)
    }

    /// Race state.
    #[must_use]
    pub fn race(&self) -> &GestureRace<Participant> {
        &self.race
    }

    /// Feed the cumulative delta since touch start.
    pub fn update(&mut self, delta: Vector, thresholds: &ActivationThresholds) -> GestureOutcome {
        if self.outcome != GestureOutcome::Pending {
            return self.outcome;
        }

        for recognizer in &mut self.recognizers {
            if !recognizer.state().is_pending() {
                continue;
            }
            let state = recognizer.update(delta, thresholds);
            let participant = Participant::Screen(recognizer.screen());
            if self.race.report(participant, state) == Some(participant) {
                if let RecognizerState::Active(direction) = state {
                    self.outcome = GestureOutcome::Driving {
                        screen: recognizer.screen(),
                        direction,
                    };
                }
                break;
            }
        }

        if let GestureOutcome::Driving { screen, direction } = self.outcome {
            for recognizer in &mut self.recognizers {
                recognizer.preempt();
            }
            debug!(screen = %screen, direction = %direction, "race won by screen gesture");
            return self.outcome;
        }

        let screens_failed = self
            .race
            .all_failed_where(|p| matches!(p, Participant::Screen(_)));
        if screens_failed && !delta.is_zero() {
            if self.scrollable.is_some() {
                let direction = classify_swipe(delta)
                    .map_or(Direction::Vertical, |axis| {
                        Direction::from_delta(axis, delta.along(axis))
                    });
                self.race
                    .report(Participant::NativeScroll, RecognizerState::Active(direction));
                self.outcome = GestureOutcome::Scrolling;
                debug!(direction = %direction, "race won by native scroll");
            } else {
                self.outcome = GestureOutcome::Ignored;
            }
        }
        self.outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
