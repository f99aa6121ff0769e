#![forbid(unsafe_code)]

//! The transition engine: one facade over registry, store, scroll
//! coordinator, and touch sessions.
//!
//! The engine is driven from a single logical writer (the animation
//! context) through `&mut self` methods:
//!
//! ```text
//! navigator ──register/mount/unmount/focus──► TransitionEngine
//! touch runtime ──touch_start/move/end/cancel──►    │
//! frame clock ──tick / advance_to──────────────►    │
//!                                                   ├──► StateReader / InterpolationFrame
//!                                                   └──► drain_commands(): RemoveRoute
//! ```
//!
//! # Invariants
//!
//! 1. At most one touch session exists; starting a new one cancels the old.
//! 2. A drag only ever drives the screen that won the race.
//! 3. `RemoveRoute` is queued once per dismissed screen.
//!
//! # Failure Modes
//!
//! - A closing screen wins nothing: its recognizer is disabled and
//!   programmatic commands return [`CommandError::AlreadyClosing`].
//! - Unmounting the dragged screen drops the session without a release.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use web_time::Instant;

use crate::activation::compute_edge_constraints;
use crate::config::EngineConfig;
use crate::direction::{Direction, Directions};
use crate::error::{CommandError, ConfigError, RegistryError};
use crate::geometry::{Point, Size};
use crate::interpolation::InterpolationFrame;
use crate::ownership::{NavigatorId, OwnershipRegistry, ScreenId, ScreenRegistration};
use crate::recognizer::{DirectionalRecognizer, GestureOutcome, TouchSession};
use crate::scroll::{ScrollCoordinator, ScrollMetrics, ScrollableId, ScrollableRegistration, SheetGate};
use crate::snap::{self, SnapRelease};
use crate::store::{AnimationState, SettleTarget, StateReader, TransitionStore};
use crate::velocity::{
    PanEvent, calculate_progress_velocity, calculate_restore_velocity, determine_dismissal, normalize,
};

/// Requests for the navigator, drained from the main context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case", tag = "kind", content = "screen"))]
pub enum NavigatorCommand {
    /// The screen finished closing; remove its route.
    RemoveRoute(ScreenId),
}

/// Settle chosen on release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Release {
    /// Screen being settled.
    pub screen: ScreenId,
    /// Rest target.
    pub target: SettleTarget,
    /// Initial settle velocity (progress units per second).
    pub velocity: f32,
}

#[derive(Debug, Clone, Copy)]
struct ActiveDrag {
    screen: ScreenId,
    /// Direction whose projection lowers progress.
    projection: Direction,
    /// Directions the screen owned when the touch started.
    owned: Directions,
    origin: f32,
    upper: f32,
    sheet: bool,
}

#[derive(Debug)]
struct Session {
    touch: TouchSession,
    drag: Option<ActiveDrag>,
    outcome: GestureOutcome,
}

/// Gesture-driven transition engine for a tree of navigator stacks.
#[derive(Debug)]
pub struct TransitionEngine {
    config: EngineConfig,
    dimensions: Size,
    registry: OwnershipRegistry,
    store: TransitionStore,
    scroll: ScrollCoordinator,
    session: Option<Session>,
    commands: Vec<NavigatorCommand>,
    clock: Option<Instant>,
}

impl TransitionEngine {
    /// Engine with default configuration for a screen of `dimensions`.
    #[must_use]
    pub fn new(dimensions: Size) -> Self {
        Self {
            config: EngineConfig::default(),
            dimensions,
            registry: OwnershipRegistry::new(),
            store: TransitionStore::new(),
            scroll: ScrollCoordinator::new(),
            session: None,
            commands: Vec::new(),
            clock: None,
        }
    }

    /// Engine with a validated configuration.
    pub fn with_config(dimensions: Size, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(dimensions)
        })
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Screen dimensions used for normalization.
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> Size {
        self.dimensions
    }

    /// Update screen dimensions (rotation, window resize).
    pub fn set_dimensions(&mut self, dimensions: Size) {
        self.dimensions = dimensions;
    }

    /// Navigator tree.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &OwnershipRegistry {
        &self.registry
    }

    /// Scroll coordinator.
    #[inline]
    #[must_use]
    pub fn scroll(&self) -> &ScrollCoordinator {
        &self.scroll
    }

    // -----------------------------------------------------------------------
    // Navigator tree
    // -----------------------------------------------------------------------

    /// Register a navigator; `host` is `None` for the root.
    pub fn register_navigator(
        &mut self,
        id: NavigatorId,
        host: Option<ScreenId>,
    ) -> Result<(), RegistryError> {
        self.registry.register_navigator(id, host)
    }

    /// Mount a screen. Plain screens rest open; sheets rest on their
    /// smallest snap point.
    pub fn mount(&mut self, registration: ScreenRegistration) -> Result<(), RegistryError> {
        let node = self.registry.mount(registration)?;
        let initial = node.snap_points().first().copied().unwrap_or(1.0);
        self.store.insert(node.id(), initial, node.snap_points());
        Ok(())
    }

    /// Unmount a screen and everything nested in it. Returns removed ids.
    pub fn unmount(&mut self, id: ScreenId) -> Result<Vec<ScreenId>, RegistryError> {
        let removed = self.registry.unmount(id)?;
        for screen in &removed {
            self.store.remove(*screen);
            self.scroll.remove_screen(*screen);
        }
        if let Some(drag) = self.session.as_ref().and_then(|s| s.drag)
            && removed.contains(&drag.screen)
        {
            debug!(screen = %drag.screen, "dragged screen unmounted, session dropped");
            self.session = None;
        }
        Ok(removed)
    }

    /// Focus-change notification.
    pub fn focus(&mut self, navigator: NavigatorId, screen: ScreenId) -> Result<(), RegistryError> {
        self.registry.focus(navigator, screen)
    }

    /// Register a scrollable inside a mounted screen.
    pub fn register_scrollable(
        &mut self,
        id: ScrollableId,
        registration: ScrollableRegistration,
    ) -> Result<(), RegistryError> {
        if self.registry.screen(registration.screen).is_none() {
            return Err(RegistryError::UnknownScreen(registration.screen));
        }
        self.scroll.register(id, registration)
    }

    /// Report new scroll metrics.
    pub fn update_scroll(&mut self, id: ScrollableId, metrics: ScrollMetrics) -> Result<(), RegistryError> {
        self.scroll.update(id, metrics)
    }

    // -----------------------------------------------------------------------
    // Touch input
    // -----------------------------------------------------------------------

    /// Begin a touch sequence at `point`, optionally inside a scrollable.
    pub fn touch_start(&mut self, point: Point, scrollable: Option<ScrollableId>) -> GestureOutcome {
        if self.session.is_some() {
            self.touch_cancel();
        }

        let recognizers = match self.registry.focused_leaf() {
            Some(leaf) => self.build_recognizers(leaf, point, scrollable),
            None => Vec::new(),
        };
        debug!(
            x = point.x,
            y = point.y,
            scrollable = ?scrollable,
            participants = recognizers.len(),
            "touch started"
        );
        self.session = Some(Session {
            touch: TouchSession::new(point, scrollable, recognizers),
            drag: None,
            outcome: GestureOutcome::Pending,
        });
        GestureOutcome::Pending
    }

    fn build_recognizers(
        &self,
        leaf: ScreenId,
        point: Point,
        scrollable: Option<ScrollableId>,
    ) -> Vec<DirectionalRecognizer> {
        let owners = self.registry.owners_from(leaf);
        owners
            .owners()
            .into_iter()
            .filter_map(|owner| {
                let node = self.registry.screen(owner)?;
                let state = self.store.state(owner)?;
                let config = node.config();
                let owned = owners.owned_by(owner);

                let edges = compute_edge_constraints(
                    point,
                    self.dimensions,
                    &config.gesture_activation_area,
                    config.gesture_response_distance,
                );
                let gate = config.collapse_direction().map(|collapse| SheetGate {
                    collapse,
                    progress: state.progress,
                    max_extent: snap::max_extent(node.snap_points()),
                    expand_via_scroll_view: config.expand_via_scroll_view,
                });
                let scroll_allowed = self
                    .scroll
                    .allowed_directions(scrollable, owned, gate.as_ref());

                Some(
                    DirectionalRecognizer::new(owner, owned, edges)
                        .with_scroll_allowed(scroll_allowed)
                        .with_disabled(!node.gesture_enabled() || state.closing),
                )
            })
            .collect()
    }

    /// Feed a pointer sample (translation since touch start, velocity).
    pub fn touch_move(&mut self, event: PanEvent) -> GestureOutcome {
        let Some(session) = self.session.as_mut() else {
            return GestureOutcome::Ignored;
        };

        if session.drag.is_none() && session.outcome == GestureOutcome::Pending {
            session.outcome = session
                .touch
                .update(event.translation, &self.config.activation);
            if let GestureOutcome::Driving { screen, direction } = session.outcome {
                let owned = session.touch.owned_by(screen);
                let drag =
                    Self::begin_drag(&self.registry, &mut self.store, screen, direction, owned);
                match drag {
                    Some(drag) => session.drag = Some(drag),
                    None => {
                        debug!(screen = %screen, "race winner is closing, touch ignored");
                        session.outcome = GestureOutcome::Ignored;
                    }
                }
            }
        }

        if let Some(drag) = session.drag {
            let extent = self.dimensions.along(drag.projection.axis());
            let moved = if extent > 0.0 {
                event.translation.toward(drag.projection) / extent
            } else {
                0.0
            };
            let progress = (drag.origin - moved).clamp(0.0, drag.upper);
            self.store
                .update_drag(drag.screen, &event, self.dimensions, progress);
        }
        session.outcome
    }

    fn begin_drag(
        registry: &OwnershipRegistry,
        store: &mut TransitionStore,
        screen: ScreenId,
        direction: Direction,
        owned: Directions,
    ) -> Option<ActiveDrag> {
        let node = registry.screen(screen)?;
        let origin = store.begin_drag(screen)?;
        let collapse = node.config().collapse_direction();
        Some(ActiveDrag {
            screen,
            projection: collapse.unwrap_or(direction),
            owned,
            origin,
            upper: snap::max_extent(node.snap_points()),
            sheet: collapse.is_some(),
        })
    }

    /// End the touch sequence with its final sample. Returns the settle
    /// chosen for the dragged screen, if a screen gesture was active.
    pub fn touch_end(&mut self, event: PanEvent) -> Option<Release> {
        if self
            .session
            .as_ref()
            .is_some_and(|s| s.drag.is_some())
        {
            self.touch_move(event);
        }
        let drag = self.session.take()?.drag?;
        let node = self.registry.screen(drag.screen)?;
        let config = node.config();
        let current = self.store.state(drag.screen)?.progress;
        let weight = config.gesture_velocity_impact;

        let (target, velocity) = if drag.sheet {
            let extent = self.dimensions.along(drag.projection.axis());
            let collapse_velocity = normalize(event.velocity.toward(drag.projection), extent);
            let toward_collapse = event.translation.toward(drag.projection);
            let release = SnapRelease {
                progress: current,
                start_progress: drag.origin,
                collapse_velocity,
                weight,
                collapsing: toward_collapse > 0.0
                    || (toward_collapse == 0.0 && collapse_velocity > 0.0),
                dismiss_enabled: !config.dismiss_directions().is_empty(),
            };
            let target = snap::choose_target(node.snap_points(), &release);
            (
                target,
                snap::settle_velocity(current, target.progress(), collapse_velocity),
            )
        } else {
            // Live progress only follows the projection direction, so the
            // release may only dismiss through it.
            let allowed =
                config.dismiss_directions() & drag.owned & Directions::from(drag.projection);
            let decision = determine_dismissal(&event, allowed, self.dimensions, weight);
            let target = if decision.should_dismiss {
                SettleTarget::Closed
            } else {
                SettleTarget::Open(1.0)
            };
            let velocity = calculate_progress_velocity(
                &event,
                self.dimensions,
                allowed,
                decision.should_dismiss,
                current,
            );
            (target, velocity)
        };

        debug!(
            screen = %drag.screen,
            progress = current,
            settle_target = ?target,
            velocity,
            "release decided"
        );
        self.settle(drag.screen, target, velocity);
        Some(Release {
            screen: drag.screen,
            target,
            velocity,
        })
    }

    /// Cancel the touch sequence. A dragged screen settles back to where
    /// the drag began; nothing is dismissed.
    pub fn touch_cancel(&mut self) {
        let Some(drag) = self.session.take().and_then(|s| s.drag) else {
            return;
        };
        let target = match self.registry.screen(drag.screen) {
            Some(node) if drag.sheet => snap::nearest(node.snap_points(), drag.origin),
            _ => SettleTarget::Open(drag.origin),
        };
        // Restore starts at the finger speed, capped at one extent per second.
        let velocity = self.store.state(drag.screen).map_or(0.0, |state| {
            let base = state.normalized_velocity.along(drag.projection.axis());
            calculate_restore_velocity(state.progress - target.progress(), base)
        });
        debug!(screen = %drag.screen, settle_target = ?target, velocity, "touch cancelled");
        self.settle(drag.screen, target, velocity);
    }

    /// Outcome of the current touch sequence, if one is in progress.
    #[must_use]
    pub fn outcome(&self) -> Option<GestureOutcome> {
        self.session.as_ref().map(|s| s.outcome)
    }

    fn settle(&mut self, screen: ScreenId, target: SettleTarget, velocity: f32) -> bool {
        let spring = match target {
            SettleTarget::Closed => &self.config.close_spring,
            _ => &self.config.open_spring,
        };
        self.store.settle(screen, target, velocity, spring)
    }

    // -----------------------------------------------------------------------
    // Frame clock
    // -----------------------------------------------------------------------

    /// Advance running settles by `dt` and queue commit signals.
    pub fn tick(&mut self, dt: Duration) {
        for screen in self.store.tick(dt) {
            info!(screen = %screen, "closing settled, remove route");
            self.commands.push(NavigatorCommand::RemoveRoute(screen));
        }
    }

    /// Advance to frame timestamp `now`. The first call only anchors the
    /// clock.
    pub fn advance_to(&mut self, now: Instant) {
        if let Some(previous) = self.clock {
            self.tick(now.saturating_duration_since(previous));
        }
        self.clock = Some(now);
    }

    /// Whether any settle animation is running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.store.is_animating()
    }

    // -----------------------------------------------------------------------
    // Programmatic commands
    // -----------------------------------------------------------------------

    fn command_target(&mut self, screen: ScreenId) -> Result<&[f32], CommandError> {
        let state = self
            .store
            .state(screen)
            .ok_or(CommandError::UnknownScreen(screen))?;
        if state.closing {
            return Err(CommandError::AlreadyClosing(screen));
        }
        if self
            .session
            .as_ref()
            .and_then(|s| s.drag)
            .is_some_and(|d| d.screen == screen)
        {
            self.session = None;
        }
        self.registry
            .screen(screen)
            .map(|node| node.snap_points())
            .ok_or(CommandError::UnknownScreen(screen))
    }

    /// Settle a sheet onto snap point `index`.
    pub fn snap_to(&mut self, screen: ScreenId, index: usize) -> Result<(), CommandError> {
        let points = self.command_target(screen)?;
        let target = snap::target_for_index(screen, points, index)?;
        debug!(screen = %screen, index, "snap requested");
        self.settle(screen, target, 0.0);
        Ok(())
    }

    /// Settle a screen closed and queue its removal when done.
    pub fn dismiss(&mut self, screen: ScreenId) -> Result<(), CommandError> {
        self.command_target(screen)?;
        debug!(screen = %screen, "dismiss requested");
        self.settle(screen, SettleTarget::Closed, 0.0);
        Ok(())
    }

    /// Take queued navigator commands.
    pub fn drain_commands(&mut self) -> Vec<NavigatorCommand> {
        std::mem::take(&mut self.commands)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Cloneable read handle for `screen`.
    #[must_use]
    pub fn reader(&self, screen: ScreenId) -> Option<StateReader> {
        self.store.reader(screen)
    }

    /// Latest published state of `screen`.
    #[must_use]
    pub fn state(&self, screen: ScreenId) -> Option<Arc<AnimationState>> {
        self.store.snapshot(screen)
    }

    /// Interpolation frame for `screen`; neutral when it has no state.
    #[must_use]
    pub fn frame(&self, screen: ScreenId) -> InterpolationFrame {
        let Some(current) = self.store.snapshot(screen) else {
            return InterpolationFrame::neutral();
        };
        let (previous, next) = self.registry.neighbors(screen);
        InterpolationFrame::new(
            current,
            previous.and_then(|id| self.store.snapshot(id)),
            next.and_then(|id| self.store.snapshot(id)),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
