#![forbid(unsafe_code)]

//! Deterministic scenario replay for `slipstack-core`.
//!
//! A [`scenario::Scenario`] scripts a navigator tree, scroll metrics, touches
//! and clock ticks. [`runner::run`] replays it against a fresh
//! `TransitionEngine` and returns a [`transcript::Transcript`] of decided
//! gestures, releases, navigator commands and final screen states.
//!
//! # Invariants
//! - Replays never read the wall clock; the same scenario always yields the
//!   same transcript.
//! - A removal command is drained at the step that completed the close.
//!
//! # Failure Modes
//! - Tree errors (unknown navigator, duplicate screen) abort the replay with
//!   the failing step index.
//! - Programmatic commands that cannot apply are recorded, not fatal.

pub mod cli;
pub mod error;
pub mod runner;
pub mod scenario;
pub mod transcript;

pub use cli::{run, run_from_env};
pub use error::{HarnessError, Result};
