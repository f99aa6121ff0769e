#![forbid(unsafe_code)]

//! Scenario format: a named, ordered script of navigator and touch steps.
//!
//! Scenarios are JSON. Every step carries an `op` tag:
//!
//! ```json
//! {
//!   "name": "simple-inheritance",
//!   "dimensions": { "width": 400.0, "height": 800.0 },
//!   "steps": [
//!     { "op": "register-navigator", "id": 1 },
//!     { "op": "mount", "id": 1, "navigator": 1,
//!       "config": { "gestureEnabled": true, "gestureDirection": ["vertical"] } },
//!     { "op": "swipe", "x": 200.0, "y": 300.0, "dy": 400.0, "vy": 1500.0 },
//!     { "op": "settle" }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use slipstack_core::config::{EngineConfig, ScreenGestureConfig};
use slipstack_core::direction::Axis;
use slipstack_core::geometry::Size;
use slipstack_core::ownership::{NavigatorId, ScreenId};
use slipstack_core::scroll::{ScrollMetrics, ScrollableId};

use crate::error::HarnessError;

/// Default number of move samples a `swipe` step emits.
pub const DEFAULT_SWIPE_SAMPLES: u32 = 5;

/// Default frame budget for a `settle` step.
pub const DEFAULT_SETTLE_FRAMES: u32 = 600;

fn default_swipe_samples() -> u32 {
    DEFAULT_SWIPE_SAMPLES
}

fn default_settle_frames() -> u32 {
    DEFAULT_SETTLE_FRAMES
}

fn default_frames() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// A replayable scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// Name shown in transcripts.
    pub name: String,
    /// Screen dimensions.
    pub dimensions: Size,
    /// Engine tuning. Defaults when absent.
    #[serde(default)]
    pub engine: Option<EngineConfig>,
    /// Unmount a screen as soon as its removal command is drained, the way
    /// a navigator would.
    #[serde(default = "default_true")]
    pub auto_unmount: bool,
    /// Ordered steps.
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Parse from JSON.
    pub fn from_json_str(s: &str) -> Result<Self, HarnessError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Step {
    /// Register a navigator (root when `host` is absent).
    RegisterNavigator {
        id: NavigatorId,
        #[serde(default)]
        host: Option<ScreenId>,
    },
    /// Mount a screen on a navigator.
    Mount {
        id: ScreenId,
        navigator: NavigatorId,
        #[serde(default)]
        config: ScreenGestureConfig,
    },
    /// Unmount a screen.
    Unmount { id: ScreenId },
    /// Focus a screen within its navigator.
    Focus {
        navigator: NavigatorId,
        screen: ScreenId,
    },
    /// Register a scrollable in a screen.
    RegisterScrollable {
        id: ScrollableId,
        screen: ScreenId,
        #[serde(default)]
        parent: Option<ScrollableId>,
        axis: Axis,
        #[serde(default)]
        metrics: ScrollMetrics,
    },
    /// Move a scrollable's offset, keeping its content and viewport.
    SetScroll { id: ScrollableId, offset: f32 },
    /// Begin a touch.
    TouchStart {
        x: f32,
        y: f32,
        #[serde(default)]
        scrollable: Option<ScrollableId>,
    },
    /// Feed a sample: translation since touch start and velocity.
    Move {
        #[serde(default)]
        tx: f32,
        #[serde(default)]
        ty: f32,
        #[serde(default)]
        vx: f32,
        #[serde(default)]
        vy: f32,
    },
    /// Lift the finger with a final sample.
    End {
        #[serde(default)]
        tx: f32,
        #[serde(default)]
        ty: f32,
        #[serde(default)]
        vx: f32,
        #[serde(default)]
        vy: f32,
    },
    /// Cancel the touch.
    Cancel,
    /// A full touch: start, evenly spaced moves, end.
    Swipe {
        x: f32,
        y: f32,
        #[serde(default)]
        scrollable: Option<ScrollableId>,
        #[serde(default)]
        dx: f32,
        #[serde(default)]
        dy: f32,
        #[serde(default)]
        vx: f32,
        #[serde(default)]
        vy: f32,
        #[serde(default = "default_swipe_samples")]
        samples: u32,
    },
    /// Advance the clock by `frames` frames of 16ms.
    Tick {
        #[serde(default = "default_frames")]
        frames: u32,
    },
    /// Tick until no settle runs, at most `max_frames` frames.
    Settle {
        #[serde(default = "default_settle_frames", rename = "maxFrames")]
        max_frames: u32,
    },
    /// Programmatic snap.
    SnapTo { screen: ScreenId, index: usize },
    /// Programmatic dismiss.
    Dismiss { screen: ScreenId },
}

impl Step {
    /// The step's `op` tag.
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::RegisterNavigator { .. } => "register-navigator",
            Self::Mount { .. } => "mount",
            Self::Unmount { .. } => "unmount",
            Self::Focus { .. } => "focus",
            Self::RegisterScrollable { .. } => "register-scrollable",
            Self::SetScroll { .. } => "set-scroll",
            Self::TouchStart { .. } => "touch-start",
            Self::Move { .. } => "move",
            Self::End { .. } => "end",
            Self::Cancel => "cancel",
            Self::Swipe { .. } => "swipe",
            Self::Tick { .. } => "tick",
            Self::Settle { .. } => "settle",
            Self::SnapTo { .. } => "snap-to",
            Self::Dismiss { .. } => "dismiss",
        }
    }
}
