#![forbid(unsafe_code)]

//! Per-screen animation state with lock-free snapshot reads.
//!
//! The store is the only place [`AnimationState`] changes. The engine owns
//! it and mutates it from the animation context; everything else reads
//! published snapshots through [`StateReader`] handles backed by
//! [`arc_swap::ArcSwap`], so a reader never blocks the writer and may see a
//! value one frame stale.
//!
//! # State machine
//!
//! ```text
//!                  ┌──────── begin_drag ─────────┐
//!                  ▼                             │
//! Idle ──► Dragging ──► SettlingOpen ───────► Idle
//!                   ├─► SettlingSnap(i) ────► Idle
//!                   └─► SettlingClosed ─────► Removed (commit)
//! ```
//!
//! # Invariants
//!
//! 1. `closing` never goes back to `false` once set.
//! 2. `SettlingClosed` and `Removed` reject [`TransitionStore::begin_drag`].
//! 3. [`TransitionStore::tick`] reports each screen's completed close once.
//! 4. Published progress stays within `[0, 1]`.
//!
//! # Failure Modes
//!
//! - Unknown ids are ignored by mutators and yield `None` from readers.

use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use arc_swap::ArcSwap;
use tracing::{debug, trace};

use crate::geometry::{Size, Vector};
use crate::ownership::ScreenId;
use crate::snap;
use crate::spring::{Spring, SpringConfig};
use crate::velocity::{PanEvent, normalize, normalize_translation};

/// Phase of a screen's transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TransitionPhase {
    /// At rest.
    #[default]
    Idle,
    /// Following an active pointer.
    Dragging,
    /// Springing toward an open rest value. Interruptible.
    SettlingOpen,
    /// Springing closed. Not interruptible.
    SettlingClosed,
    /// Springing toward snap point `i`. Interruptible.
    SettlingSnap(usize),
    /// Closed and handed back to the navigator.
    Removed,
}

impl TransitionPhase {
    /// Whether a new touch may take over from this phase.
    #[inline]
    #[must_use]
    pub const fn is_interruptible(self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Dragging | Self::SettlingOpen | Self::SettlingSnap(_)
        )
    }

    /// Whether a spring is running.
    #[inline]
    #[must_use]
    pub const fn is_settling(self) -> bool {
        matches!(
            self,
            Self::SettlingOpen | Self::SettlingClosed | Self::SettlingSnap(_)
        )
    }
}

/// Snapshot of one screen's transition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AnimationState {
    /// 0 closed, 1 fully open. Sheets rest at their snap extents.
    pub progress: f32,
    /// Set once a closing settle starts. Never cleared.
    pub closing: bool,
    /// A pointer is driving this screen.
    pub dragging: bool,
    /// Animating out after a dismissal decision.
    pub dismissing: bool,
    /// Pointer translation since touch start (px).
    pub translation: Vector,
    /// Pointer velocity (px/s).
    pub velocity: Vector,
    /// Translation divided by the screen dimensions.
    pub normalized_translation: Vector,
    /// Velocity divided by the screen dimensions, clamped.
    pub normalized_velocity: Vector,
    /// Fractional snap index; `-1.0` is fully closed. `None` without snap
    /// points.
    pub snap_index: Option<f32>,
    /// State machine phase.
    pub phase: TransitionPhase,
}

impl AnimationState {
    /// Resting state at `progress`.
    #[must_use]
    pub fn at_rest(progress: f32, snap_points: &[f32]) -> Self {
        Self {
            progress,
            closing: false,
            dragging: false,
            dismissing: false,
            translation: Vector::ZERO,
            velocity: Vector::ZERO,
            normalized_translation: Vector::ZERO,
            normalized_velocity: Vector::ZERO,
            snap_index: snap::index_for_progress(progress, snap_points),
            phase: TransitionPhase::Idle,
        }
    }

    /// A fully open, idle screen. Used when no state exists.
    #[must_use]
    pub fn neutral() -> Self {
        Self::at_rest(1.0, &[])
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Where a settle animation heads.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SettleTarget {
    /// Rest open at the given progress (usually `1.0`).
    Open(f32),
    /// Animate closed and request removal.
    Closed,
    /// Rest at snap point `index`, whose extent is `progress`.
    Snap { index: usize, progress: f32 },
}

impl SettleTarget {
    /// Target progress value.
    #[must_use]
    pub const fn progress(self) -> f32 {
        match self {
            Self::Open(p) => p,
            Self::Closed => 0.0,
            Self::Snap { progress, .. } => progress,
        }
    }

    const fn phase(self) -> TransitionPhase {
        match self {
            Self::Open(_) => TransitionPhase::SettlingOpen,
            Self::Closed => TransitionPhase::SettlingClosed,
            Self::Snap { index, .. } => TransitionPhase::SettlingSnap(index),
        }
    }
}

// ---------------------------------------------------------------------------
// StateReader
// ---------------------------------------------------------------------------

/// Cloneable read handle to one screen's published state.
///
/// Safe to send to other threads. Outlives the screen: after unmount it
/// keeps returning the last published snapshot (phase `Removed`).
#[derive(Debug, Clone)]
pub struct StateReader {
    screen: ScreenId,
    inner: Arc<ArcSwap<AnimationState>>,
}

impl StateReader {
    /// Screen this handle reads.
    #[inline]
    #[must_use]
    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn load(&self) -> Arc<AnimationState> {
        self.inner.load_full()
    }

    /// Latest published progress.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.inner.load().progress
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Slot {
    state: AnimationState,
    published: Arc<ArcSwap<AnimationState>>,
    snap_points: Vec<f32>,
    spring: Option<Spring>,
    committed: bool,
}

impl Slot {
    fn publish(&self) {
        self.published.store(Arc::new(self.state.clone()));
    }

    fn set_progress(&mut self, progress: f32) {
        self.state.progress = progress.clamp(0.0, 1.0);
        self.state.snap_index = snap::index_for_progress(self.state.progress, &self.snap_points);
    }
}

/// Keyed store of per-screen animation state.
#[derive(Debug, Default)]
pub struct TransitionStore {
    slots: AHashMap<ScreenId, Slot>,
}

impl TransitionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state for a mounted screen, resting at `progress`.
    pub fn insert(&mut self, id: ScreenId, progress: f32, snap_points: &[f32]) {
        let state = AnimationState::at_rest(progress.clamp(0.0, 1.0), snap_points);
        let slot = Slot {
            published: Arc::new(ArcSwap::from_pointee(state.clone())),
            state,
            snap_points: snap_points.to_vec(),
            spring: None,
            committed: false,
        };
        self.slots.insert(id, slot);
    }

    /// Drop a screen's state. Outstanding readers see phase `Removed`.
    pub fn remove(&mut self, id: ScreenId) {
        if let Some(mut slot) = self.slots.remove(&id) {
            slot.state.phase = TransitionPhase::Removed;
            slot.state.dragging = false;
            slot.publish();
        }
    }

    /// Whether `id` has state.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: ScreenId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Read handle for `id`.
    #[must_use]
    pub fn reader(&self, id: ScreenId) -> Option<StateReader> {
        self.slots.get(&id).map(|slot| StateReader {
            screen: id,
            inner: Arc::clone(&slot.published),
        })
    }

    /// Latest published snapshot for `id`.
    #[must_use]
    pub fn snapshot(&self, id: ScreenId) -> Option<Arc<AnimationState>> {
        self.slots.get(&id).map(|slot| slot.published.load_full())
    }

    /// Writer-side view of `id`'s current state.
    #[must_use]
    pub fn state(&self, id: ScreenId) -> Option<&AnimationState> {
        self.slots.get(&id).map(|slot| &slot.state)
    }

    /// Start following a pointer. Cancels an interruptible settle and
    /// returns the live progress the drag starts from, or `None` when the
    /// screen is closing or unknown.
    pub fn begin_drag(&mut self, id: ScreenId) -> Option<f32> {
        let slot = self.slots.get_mut(&id)?;
        if slot.state.closing || !slot.state.phase.is_interruptible() {
            return None;
        }
        if let Some(spring) = slot.spring.take() {
            slot.set_progress(spring.position());
        }
        slot.state.phase = TransitionPhase::Dragging;
        slot.state.dragging = true;
        slot.publish();
        trace!(screen = %id, progress = slot.state.progress, "drag started");
        Some(slot.state.progress)
    }

    /// Apply one pointer sample with the progress derived from it.
    pub fn update_drag(&mut self, id: ScreenId, event: &PanEvent, dimensions: Size, progress: f32) {
        let Some(slot) = self.slots.get_mut(&id) else {
            return;
        };
        if slot.state.phase != TransitionPhase::Dragging {
            return;
        }
        slot.state.translation = event.translation;
        slot.state.velocity = event.velocity;
        slot.state.normalized_translation = Vector::new(
            normalize_translation(event.translation.x, dimensions.width),
            normalize_translation(event.translation.y, dimensions.height),
        );
        slot.state.normalized_velocity = Vector::new(
            normalize(event.velocity.x, dimensions.width),
            normalize(event.velocity.y, dimensions.height),
        );
        slot.set_progress(progress);
        slot.publish();
    }

    /// Start a settle animation from the live value, seeded with `velocity`
    /// (progress units per second). A zero seed keeps the momentum of an
    /// interrupted settle.
    ///
    /// Returns `false` when the screen is unknown or already closing.
    pub fn settle(
        &mut self,
        id: ScreenId,
        target: SettleTarget,
        velocity: f32,
        spring: &SpringConfig,
    ) -> bool {
        let Some(slot) = self.slots.get_mut(&id) else {
            return false;
        };
        if slot.state.closing {
            return false;
        }
        let (from, carried) = match slot.spring.take() {
            Some(running) => (running.position(), running.velocity()),
            None => (slot.state.progress, 0.0),
        };
        let velocity = if velocity == 0.0 { carried } else { velocity };
        slot.spring = Some(
            Spring::new(from, target.progress())
                .with_config(spring)
                .with_velocity(velocity),
        );
        slot.state.phase = target.phase();
        slot.state.dragging = false;
        if matches!(target, SettleTarget::Closed) {
            slot.state.closing = true;
            slot.state.dismissing = true;
        }
        slot.publish();
        debug!(
            screen = %id,
            from,
            to = target.progress(),
            velocity,
            phase = ?slot.state.phase,
            "settle started"
        );
        true
    }

    /// Advance every running settle by `dt`.
    ///
    /// Returns the screens whose closing settle finished during this tick.
    pub fn tick(&mut self, dt: Duration) -> Vec<ScreenId> {
        let mut closed = Vec::new();
        for (id, slot) in &mut self.slots {
            let Some(spring) = slot.spring.as_mut() else {
                continue;
            };
            spring.advance(dt);
            let position = spring.position();
            let at_rest = spring.is_at_rest();
            slot.set_progress(position);

            if at_rest {
                slot.spring = None;
                match slot.state.phase {
                    TransitionPhase::SettlingClosed => {
                        slot.state.phase = TransitionPhase::Removed;
                        slot.state.dismissing = false;
                        if !slot.committed {
                            slot.committed = true;
                            closed.push(*id);
                        }
                    }
                    _ => slot.state.phase = TransitionPhase::Idle,
                }
                debug!(screen = %id, progress = slot.state.progress, phase = ?slot.state.phase, "settle finished");
            }
            slot.publish();
        }
        closed.sort_unstable();
        closed
    }

    /// Whether any settle is running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.slots.values().any(|slot| slot.spring.is_some())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);
    const DIMS: Size = Size::new(400.0, 800.0);

    fn run(store: &mut TransitionStore, frames: usize) -> Vec<ScreenId> {
        let mut closed = Vec::new();
        for _ in 0..frames {
            closed.extend(store.tick(FRAME));
        }
        closed
    }

    #[test]
    fn drag_updates_normalized_values() {
        let id = ScreenId::new(1);
        let mut store = TransitionStore::new();
        store.insert(id, 1.0, &[]);
        assert_eq!(store.begin_drag(id), Some(1.0));

        let event = PanEvent::new(Vector::new(0.0, 200.0), Vector::new(0.0, 8000.0));
        store.update_drag(id, &event, DIMS, 0.75);

        let snap = store.snapshot(id).unwrap();
        assert!(snap.dragging);
        assert_eq!(snap.phase, TransitionPhase::Dragging);
        assert!((snap.normalized_translation.y - 0.25).abs() < 1e-6);
        assert!((snap.normalized_velocity.y - 3.2).abs() < 1e-6);
        assert!((snap.progress - 0.75).abs() < 1e-6);
    }

    #[test]
    fn closing_settle_commits_once() {
        let id = ScreenId::new(1);
        let mut store = TransitionStore::new();
        store.insert(id, 1.0, &[]);
        store.begin_drag(id);
        assert!(store.settle(id, SettleTarget::Closed, -1.0, &SpringConfig::CLOSE));

        let snap = store.snapshot(id).unwrap();
        assert!(snap.closing);
        assert!(!snap.dragging);

        let closed = run(&mut store, 240);
        assert_eq!(closed, vec![id]);
        assert_eq!(store.state(id).unwrap().phase, TransitionPhase::Removed);
        assert!(run(&mut store, 10).is_empty());
    }

    #[test]
    fn closing_is_not_interruptible() {
        let id = ScreenId::new(1);
        let mut store = TransitionStore::new();
        store.insert(id, 1.0, &[]);
        store.settle(id, SettleTarget::Closed, 0.0, &SpringConfig::CLOSE);
        run(&mut store, 3);

        assert_eq!(store.begin_drag(id), None);
        assert!(!store.settle(id, SettleTarget::Open(1.0), 0.0, &SpringConfig::OPEN));
        assert!(store.state(id).unwrap().closing);
    }

    #[test]
    fn open_settle_is_interruptible_from_live_value() {
        let id = ScreenId::new(1);
        let mut store = TransitionStore::new();
        store.insert(id, 0.4, &[]);
        store.settle(id, SettleTarget::Open(1.0), 0.0, &SpringConfig::OPEN);
        run(&mut store, 5);

        let live = store.state(id).unwrap().progress;
        assert!(live > 0.4 && live < 1.0, "live {live}");
        let resumed = store.begin_drag(id).unwrap();
        assert!((resumed - live).abs() < 1e-6);
        assert!(!store.is_animating());
    }

    #[test]
    fn zero_seed_keeps_interrupted_momentum() {
        let id = ScreenId::new(1);
        let mut store = TransitionStore::new();
        store.insert(id, 0.4, &[0.3, 0.6, 1.0]);
        store.settle(id, SettleTarget::Open(1.0), 2.0, &SpringConfig::OPEN);
        run(&mut store, 3);
        let interrupted = store.state(id).unwrap().progress;

        // Retargeted below while still rising.
        store.settle(
            id,
            SettleTarget::Snap {
                index: 0,
                progress: 0.3,
            },
            0.0,
            &SpringConfig::OPEN,
        );
        run(&mut store, 1);
        assert!(store.state(id).unwrap().progress > interrupted);

        run(&mut store, 240);
        assert!((store.state(id).unwrap().progress - 0.3).abs() < 1e-3);
    }

    #[test]
    fn snap_settle_ends_idle_with_index() {
        let id = ScreenId::new(1);
        let points = [0.3, 0.6, 1.0];
        let mut store = TransitionStore::new();
        store.insert(id, 0.3, &points);
        assert_eq!(store.state(id).unwrap().snap_index, Some(0.0));

        store.settle(
            id,
            SettleTarget::Snap {
                index: 1,
                progress: 0.6,
            },
            0.5,
            &SpringConfig::OPEN,
        );
        assert_eq!(store.state(id).unwrap().phase, TransitionPhase::SettlingSnap(1));
        run(&mut store, 240);

        let state = store.state(id).unwrap();
        assert_eq!(state.phase, TransitionPhase::Idle);
        assert!((state.snap_index.unwrap() - 1.0).abs() < 0.01);
    }

    #[test]
    fn reader_survives_removal() {
        let id = ScreenId::new(7);
        let mut store = TransitionStore::new();
        store.insert(id, 1.0, &[]);
        let reader = store.reader(id).unwrap();
        store.remove(id);

        assert!(store.reader(id).is_none());
        assert_eq!(reader.load().phase, TransitionPhase::Removed);
        assert_eq!(reader.screen(), id);
    }

    #[test]
    fn reader_is_send() {
        fn assert_send<T: Send + Sync>() {}
        assert_send::<StateReader>();
    }
}
