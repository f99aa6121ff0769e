#![forbid(unsafe_code)]

//! Arbitration between native scrolling and screen gestures.
//!
//! Scrollables report their metrics; nested scrollables link to their
//! parent. A screen gesture may start from inside scrollable content only
//! when every scrollable on the gesture's axis, from the touched one up
//! through its ancestors, sits at the boundary the direction leaves from:
//!
//! | Direction | Boundary |
//! |---|---|
//! | down, right | `offset == 0` |
//! | up, left | `offset == max_offset` |
//!
//! Sheets add one rule for their expand direction (the opposite of their
//! collapse direction). With `expand_via_scroll_view` the expand direction
//! follows the collapse boundary (content scrolled to the top) and only
//! while the sheet can still grow; without it, expanding never starts from
//! inside scrollable content.

use std::fmt;

use ahash::AHashMap;

use crate::direction::{Axis, Direction, Directions};
use crate::error::RegistryError;
use crate::ownership::ScreenId;

/// Offsets within this distance of a boundary count as at the boundary.
pub const BOUNDARY_EPSILON: f32 = 0.5;

/// Progress slack when checking whether a sheet is fully expanded.
const EXTENT_EPSILON: f32 = 1e-3;

/// Opaque identifier of a scrollable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ScrollableId(u64);

impl ScrollableId {
    /// Wrap a raw id.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ScrollableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scroll#{}", self.0)
    }
}

/// Scroll position along a scrollable's axis (px).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScrollMetrics {
    /// Current offset.
    pub offset: f32,
    /// Content length.
    pub content: f32,
    /// Visible length.
    pub viewport: f32,
}

impl ScrollMetrics {
    /// Metrics with the given values.
    #[must_use]
    pub const fn new(offset: f32, content: f32, viewport: f32) -> Self {
        Self {
            offset,
            content,
            viewport,
        }
    }

    /// Largest reachable offset.
    #[inline]
    #[must_use]
    pub fn max_offset(&self) -> f32 {
        (self.content - self.viewport).max(0.0)
    }

    /// Whether the content sits at the boundary `direction` leaves from.
    #[must_use]
    pub fn at_boundary_for(&self, direction: Direction) -> bool {
        if direction.sign() > 0.0 {
            self.offset <= BOUNDARY_EPSILON
        } else {
            self.offset >= self.max_offset() - BOUNDARY_EPSILON
        }
    }
}

/// Registration of one scrollable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollableRegistration {
    /// Screen the scrollable renders in.
    pub screen: ScreenId,
    /// Enclosing scrollable, if nested.
    pub parent: Option<ScrollableId>,
    /// Scroll axis.
    pub axis: Axis,
    /// Initial metrics.
    pub metrics: ScrollMetrics,
}

/// Sheet-specific inputs to the expand-direction rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetGate {
    /// The sheet's collapse direction.
    pub collapse: Direction,
    /// Current sheet progress.
    pub progress: f32,
    /// Largest snap extent.
    pub max_extent: f32,
    /// Whether expanding may start inside scrollable content.
    pub expand_via_scroll_view: bool,
}

#[derive(Debug, Clone, Copy)]
struct ScrollNode {
    screen: ScreenId,
    parent: Option<ScrollableId>,
    axis: Axis,
    metrics: ScrollMetrics,
}

/// Tracks scrollables and answers boundary questions.
#[derive(Debug, Default)]
pub struct ScrollCoordinator {
    nodes: AHashMap<ScrollableId, ScrollNode>,
}

impl ScrollCoordinator {
    /// Create an empty coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scrollable. The parent, if any, must already exist.
    pub fn register(
        &mut self,
        id: ScrollableId,
        registration: ScrollableRegistration,
    ) -> Result<(), RegistryError> {
        if self.nodes.contains_key(&id) {
            return Err(RegistryError::DuplicateScrollable(id));
        }
        if let Some(parent) = registration.parent
            && !self.nodes.contains_key(&parent)
        {
            return Err(RegistryError::UnknownScrollable(parent));
        }
        self.nodes.insert(
            id,
            ScrollNode {
                screen: registration.screen,
                parent: registration.parent,
                axis: registration.axis,
                metrics: registration.metrics,
            },
        );
        Ok(())
    }

    /// Report new metrics for a scrollable.
    pub fn update(&mut self, id: ScrollableId, metrics: ScrollMetrics) -> Result<(), RegistryError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(RegistryError::UnknownScrollable(id))?;
        node.metrics = metrics;
        Ok(())
    }

    /// Current metrics of a scrollable.
    #[must_use]
    pub fn metrics(&self, id: ScrollableId) -> Option<ScrollMetrics> {
        self.nodes.get(&id).map(|n| n.metrics)
    }

    /// Screen a scrollable belongs to.
    #[must_use]
    pub fn screen_of(&self, id: ScrollableId) -> Option<ScreenId> {
        self.nodes.get(&id).map(|n| n.screen)
    }

    /// Drop every scrollable rendered in `screen`.
    pub fn remove_screen(&mut self, screen: ScreenId) {
        self.nodes.retain(|_, node| node.screen != screen);
    }

    /// Whether every scrollable on `direction`'s axis, from `id` up through
    /// its ancestors, sits at the boundary `direction` leaves from.
    #[must_use]
    pub fn at_boundary(&self, id: ScrollableId, direction: Direction) -> bool {
        let axis = direction.axis();
        std::iter::successors(self.nodes.get(&id), |node| {
            node.parent.and_then(|p| self.nodes.get(&p))
        })
        .filter(|node| node.axis == axis)
        .all(|node| node.metrics.at_boundary_for(direction))
    }

    /// Whether `direction` may start a screen gesture for a touch that
    /// began in `touched` (`None` for deadspace).
    #[must_use]
    pub fn allows(
        &self,
        touched: Option<ScrollableId>,
        direction: Direction,
        sheet: Option<&SheetGate>,
    ) -> bool {
        let Some(id) = touched else {
            return true;
        };
        match sheet {
            Some(gate) if direction == gate.collapse.opposite() => {
                gate.expand_via_scroll_view
                    && gate.progress < gate.max_extent - EXTENT_EPSILON
                    && self.at_boundary(id, gate.collapse)
            }
            _ => self.at_boundary(id, direction),
        }
    }

    /// Subset of `directions` allowed by [`Self::allows`].
    #[must_use]
    pub fn allowed_directions(
        &self,
        touched: Option<ScrollableId>,
        directions: Directions,
        sheet: Option<&SheetGate>,
    ) -> Directions {
        directions
            .directions()
            .filter(|d| self.allows(touched, *d, sheet))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
