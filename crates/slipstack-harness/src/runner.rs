#![forbid(unsafe_code)]

//! Scenario replay against a [`TransitionEngine`].
//!
//! Replays are deterministic: the clock only advances through `tick` and
//! `settle` steps, in fixed 16ms frames.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use slipstack_core::engine::{NavigatorCommand, TransitionEngine};
use slipstack_core::error::RegistryError;
use slipstack_core::geometry::{Point, Vector};
use slipstack_core::ownership::{ScreenId, ScreenRegistration};
use slipstack_core::recognizer::GestureOutcome;
use slipstack_core::scroll::{ScrollableId, ScrollableRegistration};
use slipstack_core::velocity::PanEvent;
use tracing::{debug, info_span};

use crate::error::{HarnessError, Result};
use crate::scenario::{Scenario, Step};
use crate::transcript::{Event, ScreenSummary, Transcript};

/// Frame duration used by `tick` and `settle`.
pub const FRAME: Duration = Duration::from_millis(16);

/// Replay `scenario` and return its transcript.
pub fn run(scenario: &Scenario) -> Result<Transcript> {
    let engine = match &scenario.engine {
        Some(config) => TransitionEngine::with_config(scenario.dimensions, config.clone())?,
        None => TransitionEngine::new(scenario.dimensions),
    };
    let _span = info_span!("replay", scenario = %scenario.name).entered();

    let mut runner = Runner {
        engine,
        auto_unmount: scenario.auto_unmount,
        events: Vec::new(),
        mounted: BTreeSet::new(),
        decided: false,
    };
    for (index, step) in scenario.steps.iter().enumerate() {
        debug!(step = index, op = step.op(), "replaying step");
        runner.apply(index, step)?;
        runner.drain(index)?;
    }
    Ok(runner.finish(&scenario.name))
}

struct Runner {
    engine: TransitionEngine,
    auto_unmount: bool,
    events: Vec<Event>,
    mounted: BTreeSet<ScreenId>,
    /// The current touch already produced a gesture event.
    decided: bool,
}

impl Runner {
    fn registry(step: usize, op: &'static str) -> impl FnOnce(RegistryError) -> HarnessError {
        move |source| HarnessError::Registry { step, op, source }
    }

    fn apply(&mut self, index: usize, step: &Step) -> Result<()> {
        let op = step.op();
        match step {
            Step::RegisterNavigator { id, host } => self
                .engine
                .register_navigator(*id, *host)
                .map_err(Self::registry(index, op))?,
            Step::Mount {
                id,
                navigator,
                config,
            } => {
                self.engine
                    .mount(ScreenRegistration {
                        id: *id,
                        navigator: *navigator,
                        config: config.clone(),
                    })
                    .map_err(Self::registry(index, op))?;
                self.mounted.insert(*id);
            }
            Step::Unmount { id } => self.unmount(index, op, *id)?,
            Step::Focus { navigator, screen } => self
                .engine
                .focus(*navigator, *screen)
                .map_err(Self::registry(index, op))?,
            Step::RegisterScrollable {
                id,
                screen,
                parent,
                axis,
                metrics,
            } => self
                .engine
                .register_scrollable(
                    *id,
                    ScrollableRegistration {
                        screen: *screen,
                        parent: *parent,
                        axis: *axis,
                        metrics: *metrics,
                    },
                )
                .map_err(Self::registry(index, op))?,
            Step::SetScroll { id, offset } => {
                let mut metrics = self
                    .engine
                    .scroll()
                    .metrics(*id)
                    .ok_or(RegistryError::UnknownScrollable(*id))
                    .map_err(Self::registry(index, op))?;
                metrics.offset = *offset;
                self.engine
                    .update_scroll(*id, metrics)
                    .map_err(Self::registry(index, op))?;
            }
            Step::TouchStart { x, y, scrollable } => self.touch_start(*x, *y, *scrollable),
            Step::Move { tx, ty, vx, vy } => self.touch_move(index, pan(*tx, *ty, *vx, *vy)),
            Step::End { tx, ty, vx, vy } => self.touch_end(index, pan(*tx, *ty, *vx, *vy)),
            Step::Cancel => {
                self.engine.touch_cancel();
                self.events.push(Event::Cancelled { step: index });
            }
            Step::Swipe {
                x,
                y,
                scrollable,
                dx,
                dy,
                vx,
                vy,
                samples,
            } => {
                self.touch_start(*x, *y, *scrollable);
                let samples = (*samples).max(1);
                for i in 1..=samples {
                    let t = i as f32 / samples as f32;
                    self.touch_move(index, pan(dx * t, dy * t, *vx, *vy));
                }
                self.touch_end(index, pan(*dx, *dy, *vx, *vy));
            }
            Step::Tick { frames } => {
                for _ in 0..*frames {
                    self.engine.tick(FRAME);
                }
            }
            Step::Settle { max_frames } => {
                let mut frames = 0;
                while self.engine.is_animating() && frames < *max_frames {
                    self.engine.tick(FRAME);
                    frames += 1;
                }
                self.events.push(Event::Settled {
                    step: index,
                    frames,
                });
            }
            Step::SnapTo { screen, index: snap } => {
                if let Err(err) = self.engine.snap_to(*screen, *snap) {
                    self.events.push(Event::Rejected {
                        step: index,
                        message: err.to_string(),
                    });
                }
            }
            Step::Dismiss { screen } => {
                if let Err(err) = self.engine.dismiss(*screen) {
                    self.events.push(Event::Rejected {
                        step: index,
                        message: err.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn touch_start(&mut self, x: f32, y: f32, scrollable: Option<ScrollableId>) {
        self.decided = false;
        self.engine.touch_start(Point::new(x, y), scrollable);
    }

    fn touch_move(&mut self, index: usize, event: PanEvent) {
        let outcome = self.engine.touch_move(event);
        if !self.decided && outcome != GestureOutcome::Pending {
            self.decided = true;
            self.events.push(Event::Gesture {
                step: index,
                outcome,
            });
        }
    }

    fn touch_end(&mut self, index: usize, event: PanEvent) {
        if let Some(release) = self.engine.touch_end(event) {
            self.events.push(Event::Release {
                step: index,
                screen: release.screen,
                target: release.target,
                velocity: release.velocity,
            });
        }
        self.decided = false;
    }

    fn unmount(&mut self, index: usize, op: &'static str, id: ScreenId) -> Result<()> {
        let screens = self
            .engine
            .unmount(id)
            .map_err(Self::registry(index, op))?;
        for screen in &screens {
            self.mounted.remove(screen);
        }
        self.events.push(Event::Unmounted {
            step: index,
            screens,
        });
        Ok(())
    }

    fn drain(&mut self, index: usize) -> Result<()> {
        for command in self.engine.drain_commands() {
            self.events.push(Event::Command {
                step: index,
                command,
            });
            let NavigatorCommand::RemoveRoute(screen) = command;
            if self.auto_unmount && self.mounted.contains(&screen) {
                self.unmount(index, "remove-route", screen)?;
            }
        }
        Ok(())
    }

    fn finish(self, name: &str) -> Transcript {
        let screens: BTreeMap<_, _> = self
            .mounted
            .iter()
            .filter_map(|id| {
                self.engine
                    .state(*id)
                    .map(|state| (*id, ScreenSummary::from(state.as_ref())))
            })
            .collect();
        Transcript {
            scenario: name.to_owned(),
            events: self.events,
            screens,
        }
    }
}

fn pan(tx: f32, ty: f32, vx: f32, vy: f32) -> PanEvent {
    PanEvent::new(Vector::new(tx, ty), Vector::new(vx, vy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipstack_core::config::{GestureDirection, ScreenGestureConfig};
    use slipstack_core::geometry::Size;
    use slipstack_core::ownership::NavigatorId;

    fn base(steps: Vec<Step>) -> Scenario {
        let mut all = vec![
            Step::RegisterNavigator {
                id: NavigatorId::new(1),
                host: None,
            },
            Step::Mount {
                id: ScreenId::new(1),
                navigator: NavigatorId::new(1),
                config: ScreenGestureConfig::dismissible([GestureDirection::Horizontal]),
            },
        ];
        all.extend(steps);
        Scenario {
            name: "unit".into(),
            dimensions: Size::new(400.0, 800.0),
            engine: None,
            auto_unmount: true,
            steps: all,
        }
    }

    #[test]
    fn dismissal_unmounts_after_remove_route() {
        let scenario = base(vec![
            Step::Swipe {
                x: 20.0,
                y: 400.0,
                scrollable: None,
                dx: 300.0,
                dy: 0.0,
                vx: 1200.0,
                vy: 0.0,
                samples: 4,
            },
            Step::Settle { max_frames: 600 },
        ]);
        let transcript = run(&scenario).unwrap();
        assert_eq!(
            transcript.commands(),
            vec![NavigatorCommand::RemoveRoute(ScreenId::new(1))]
        );
        assert!(transcript.screens.is_empty());
        assert!(matches!(
            transcript.events.last(),
            Some(Event::Unmounted { .. })
        ));
    }

    #[test]
    fn rejected_commands_are_recorded() {
        let scenario = base(vec![Step::SnapTo {
            screen: ScreenId::new(1),
            index: 0,
        }]);
        let transcript = run(&scenario).unwrap();
        assert!(matches!(
            &transcript.events[..],
            [Event::Rejected { step: 2, message }] if message.contains("no snap points")
        ));
        assert_eq!(transcript.screen(ScreenId::new(1)).unwrap().progress, 1.0);
    }

    #[test]
    fn registry_errors_abort_replay() {
        let scenario = base(vec![Step::Mount {
            id: ScreenId::new(1),
            navigator: NavigatorId::new(1),
            config: ScreenGestureConfig::default(),
        }]);
        let err = run(&scenario).unwrap_err();
        assert!(matches!(err, HarnessError::Registry { step: 2, .. }));
        assert_eq!(err.exit_code(), 1);
    }
}
