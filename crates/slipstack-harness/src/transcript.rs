#![forbid(unsafe_code)]

//! Replay transcripts: what each step did, plus final screen states.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use slipstack_core::engine::NavigatorCommand;
use slipstack_core::ownership::ScreenId;
use slipstack_core::recognizer::GestureOutcome;
use slipstack_core::store::{AnimationState, SettleTarget, TransitionPhase};

/// One observable effect of a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Event {
    /// A touch sequence was decided.
    Gesture { step: usize, outcome: GestureOutcome },
    /// A screen gesture was released.
    Release {
        step: usize,
        screen: ScreenId,
        target: SettleTarget,
        velocity: f32,
    },
    /// A touch was cancelled.
    Cancelled { step: usize },
    /// Settles ran for this many frames.
    Settled { step: usize, frames: u32 },
    /// The engine asked the navigator for something.
    Command {
        step: usize,
        command: NavigatorCommand,
    },
    /// Screens left the tree.
    Unmounted { step: usize, screens: Vec<ScreenId> },
    /// A programmatic command was refused.
    Rejected { step: usize, message: String },
}

/// Final state of one mounted screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSummary {
    pub progress: f32,
    pub phase: TransitionPhase,
    pub closing: bool,
    pub snap_index: Option<f32>,
}

impl From<&AnimationState> for ScreenSummary {
    fn from(state: &AnimationState) -> Self {
        Self {
            progress: state.progress,
            phase: state.phase,
            closing: state.closing,
            snap_index: state.snap_index,
        }
    }
}

/// Result of replaying a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    pub scenario: String,
    pub events: Vec<Event>,
    pub screens: BTreeMap<ScreenId, ScreenSummary>,
}

impl Transcript {
    /// Decided gesture outcomes, in order.
    #[must_use]
    pub fn gestures(&self) -> Vec<GestureOutcome> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Gesture { outcome, .. } => Some(*outcome),
                _ => None,
            })
            .collect()
    }

    /// Releases as `(screen, target)`, in order.
    #[must_use]
    pub fn releases(&self) -> Vec<(ScreenId, SettleTarget)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Release { screen, target, .. } => Some((*screen, *target)),
                _ => None,
            })
            .collect()
    }

    /// Navigator commands, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<NavigatorCommand> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Command { command, .. } => Some(*command),
                _ => None,
            })
            .collect()
    }

    /// Final summary of `screen`, if still mounted.
    #[must_use]
    pub fn screen(&self, screen: ScreenId) -> Option<&ScreenSummary> {
        self.screens.get(&screen)
    }
}

fn fmt_outcome(outcome: &GestureOutcome, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match outcome {
        GestureOutcome::Pending => write!(f, "pending"),
        GestureOutcome::Driving { screen, direction } => write!(f, "driving {screen} {direction}"),
        GestureOutcome::Scrolling => write!(f, "scrolling"),
        GestureOutcome::Ignored => write!(f, "ignored"),
    }
}

fn fmt_target(target: &SettleTarget, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match target {
        SettleTarget::Open(p) => write!(f, "open({p:.3})"),
        SettleTarget::Closed => write!(f, "closed"),
        SettleTarget::Snap { index, progress } => write!(f, "snap[{index}]({progress:.3})"),
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scenario {}", self.scenario)?;
        for event in &self.events {
            match event {
                Event::Gesture { step, outcome } => {
                    write!(f, "  [{step}] gesture ")?;
                    fmt_outcome(outcome, f)?;
                }
                Event::Release {
                    step,
                    screen,
                    target,
                    velocity,
                } => {
                    write!(f, "  [{step}] release {screen} -> ")?;
                    fmt_target(target, f)?;
                    write!(f, " v={velocity:.3}")?;
                }
                Event::Cancelled { step } => write!(f, "  [{step}] cancelled")?,
                Event::Settled { step, frames } => write!(f, "  [{step}] settled in {frames} frames")?,
                Event::Command { step, command } => match command {
                    NavigatorCommand::RemoveRoute(screen) => {
                        write!(f, "  [{step}] command remove-route {screen}")?;
                    }
                },
                Event::Unmounted { step, screens } => {
                    write!(f, "  [{step}] unmounted")?;
                    for screen in screens {
                        write!(f, " {screen}")?;
                    }
                }
                Event::Rejected { step, message } => write!(f, "  [{step}] rejected: {message}")?,
            }
            writeln!(f)?;
        }
        writeln!(f, "screens")?;
        for (id, summary) in &self.screens {
            write!(
                f,
                "  {id} progress={:.3} phase={:?}",
                summary.progress, summary.phase
            )?;
            if let Some(index) = summary.snap_index {
                write!(f, " snap={index:.2}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
