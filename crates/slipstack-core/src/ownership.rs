#![forbid(unsafe_code)]

//! Direction ownership over a tree of navigator stacks.
//!
//! Screens live in navigators; a navigator may be hosted by a screen of its
//! parent navigator. The registry is an arena keyed by id with parent links
//! and no cycles (a host must be mounted before the navigator it hosts).
//!
//! Ownership is never stored. Every query walks from the requesting screen
//! toward the root and stops at the first screen whose claimed directions
//! include the requested one:
//!
//! ```text
//! root nav ── [A: vertical] ── hosts nav ── [B: (none)] ── hosts nav ── [C: horizontal]
//!
//! resolve(C, horizontal) = Owned            (C claims it)
//! resolve(C, vertical)   = Inherited(A)     (C, B claim nothing vertical)
//! resolve(C, up)         = Unowned
//! ```
//!
//! # Invariants
//!
//! 1. At most one screen owns a direction for a given starting screen.
//! 2. A claim shadows only the same direction in ancestors; each direction
//!    is resolved by its own walk.
//! 3. Disabled screens claim nothing, so the walk passes through them.
//! 4. Unmounting a screen removes every navigator it hosts, recursively.

use std::fmt;

use ahash::AHashMap;
use tracing::debug;

use crate::config::ScreenGestureConfig;
use crate::direction::{Direction, Directions};
use crate::error::RegistryError;

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

/// Opaque identifier of a mounted screen instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ScreenId(u64);

impl ScreenId {
    /// Wrap a raw id.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen#{}", self.0)
    }
}

/// Opaque identifier of a navigator stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NavigatorId(u64);

impl NavigatorId {
    /// Wrap a raw id.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NavigatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nav#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// Mount-time registration handed over by the navigator.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenRegistration {
    /// Screen instance id.
    pub id: ScreenId,
    /// Navigator the screen is pushed onto.
    pub navigator: NavigatorId,
    /// Gesture configuration.
    pub config: ScreenGestureConfig,
}

/// One mounted screen.
#[derive(Debug, Clone)]
pub struct ScreenNode {
    id: ScreenId,
    navigator: NavigatorId,
    config: ScreenGestureConfig,
    claimed: Directions,
    snap_points: Vec<f32>,
    hosts: Vec<NavigatorId>,
}

impl ScreenNode {
    /// Screen id.
    #[inline]
    pub fn id(&self) -> ScreenId {
        self.id
    }

    /// Navigator this screen belongs to.
    #[inline]
    pub fn navigator(&self) -> NavigatorId {
        self.navigator
    }

    /// Gesture configuration as mounted.
    #[inline]
    pub fn config(&self) -> &ScreenGestureConfig {
        &self.config
    }

    /// Directions this screen claims for itself.
    #[inline]
    pub fn claimed_directions(&self) -> Directions {
        self.claimed
    }

    /// Whether gestures are enabled on this screen.
    #[inline]
    pub fn gesture_enabled(&self) -> bool {
        self.config.gesture_enabled
    }

    /// Snap points, sorted ascending. Empty for dismiss-only screens.
    #[inline]
    pub fn snap_points(&self) -> &[f32] {
        &self.snap_points
    }

    /// Navigators nested inside this screen.
    #[inline]
    pub fn hosted_navigators(&self) -> &[NavigatorId] {
        &self.hosts
    }
}

#[derive(Debug, Clone)]
struct NavigatorNode {
    host: Option<ScreenId>,
    stack: Vec<ScreenId>,
    focused: Option<ScreenId>,
}

impl NavigatorNode {
    fn active(&self) -> Option<ScreenId> {
        self.focused.or_else(|| self.stack.last().copied())
    }
}

// ---------------------------------------------------------------------------
// Resolution results
// ---------------------------------------------------------------------------

/// Who handles a direction for a requesting screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The requesting screen claims the direction.
    Owned,
    /// An ancestor claims it; gestures in this direction drive that screen.
    Inherited(ScreenId),
    /// Nobody claims it; gestures in this direction do nothing.
    Unowned,
}

/// Owners of all four directions, resolved from one starting screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OwnerMap {
    owners: [Option<ScreenId>; 4],
}

impl OwnerMap {
    fn slot(direction: Direction) -> usize {
        match direction {
            Direction::Vertical => 0,
            Direction::VerticalInverted => 1,
            Direction::Horizontal => 2,
            Direction::HorizontalInverted => 3,
        }
    }

    /// Owner of `direction`, if any.
    #[inline]
    #[must_use]
    pub fn owner(&self, direction: Direction) -> Option<ScreenId> {
        self.owners[Self::slot(direction)]
    }

    /// Directions resolved to `screen`.
    #[must_use]
    pub fn owned_by(&self, screen: ScreenId) -> Directions {
        Direction::ALL
            .into_iter()
            .filter(|d| self.owner(*d) == Some(screen))
            .collect()
    }

    /// Distinct owners, in direction evaluation order.
    #[must_use]
    pub fn owners(&self) -> Vec<ScreenId> {
        let mut out: Vec<ScreenId> = Vec::with_capacity(4);
        for owner in self.owners.iter().flatten() {
            if !out.contains(owner) {
                out.push(*owner);
            }
        }
        out
    }

    /// Whether no direction has an owner.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.iter().all(Option::is_none)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Arena of navigators and mounted screens.
#[derive(Debug, Default)]
pub struct OwnershipRegistry {
    screens: AHashMap<ScreenId, ScreenNode>,
    navigators: AHashMap<NavigatorId, NavigatorNode>,
    root: Option<NavigatorId>,
}

impl OwnershipRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a navigator. `host` is `None` for the single root navigator.
    pub fn register_navigator(
        &mut self,
        id: NavigatorId,
        host: Option<ScreenId>,
    ) -> Result<(), RegistryError> {
        if self.navigators.contains_key(&id) {
            return Err(RegistryError::DuplicateNavigator(id));
        }
        match host {
            None => {
                if let Some(existing) = self.root {
                    return Err(RegistryError::SecondRoot {
                        existing,
                        rejected: id,
                    });
                }
                self.root = Some(id);
            }
            Some(host_id) => {
                let Some(host_node) = self.screens.get_mut(&host_id) else {
                    return Err(RegistryError::UnknownHost {
                        navigator: id,
                        host: host_id,
                    });
                };
                host_node.hosts.push(id);
            }
        }
        self.navigators.insert(
            id,
            NavigatorNode {
                host,
                stack: Vec::new(),
                focused: None,
            },
        );
        debug!(navigator = %id, host = ?host, "navigator registered");
        Ok(())
    }

    /// Mount a screen on top of its navigator's stack and focus it.
    pub fn mount(&mut self, registration: ScreenRegistration) -> Result<&ScreenNode, RegistryError> {
        let ScreenRegistration {
            id,
            navigator,
            config,
        } = registration;

        if self.screens.contains_key(&id) {
            return Err(RegistryError::DuplicateScreen(id));
        }
        let Some(nav) = self.navigators.get_mut(&navigator) else {
            return Err(RegistryError::UnknownNavigator(navigator));
        };
        config
            .validate()
            .map_err(|e| RegistryError::InvalidConfig {
                screen: id,
                message: e.to_string(),
            })?;

        nav.stack.push(id);
        nav.focused = Some(id);

        let node = ScreenNode {
            id,
            navigator,
            claimed: config.claimed_directions(),
            snap_points: config.sorted_snap_points(),
            config,
            hosts: Vec::new(),
        };
        debug!(screen = %id, navigator = %navigator, claimed = ?node.claimed, "screen mounted");
        Ok(self.screens.entry(id).or_insert(node))
    }

    /// Unmount a screen and everything nested inside it.
    ///
    /// Returns every removed screen id, the requested one first.
    pub fn unmount(&mut self, id: ScreenId) -> Result<Vec<ScreenId>, RegistryError> {
        if !self.screens.contains_key(&id) {
            return Err(RegistryError::UnknownScreen(id));
        }
        let mut removed = Vec::new();
        self.remove_screen(id, &mut removed);
        debug!(screen = %id, cascade = removed.len(), "screen unmounted");
        Ok(removed)
    }

    fn remove_screen(&mut self, id: ScreenId, removed: &mut Vec<ScreenId>) {
        let Some(node) = self.screens.remove(&id) else {
            return;
        };
        removed.push(id);

        if let Some(nav) = self.navigators.get_mut(&node.navigator) {
            nav.stack.retain(|s| *s != id);
            if nav.focused == Some(id) {
                nav.focused = nav.stack.last().copied();
            }
        }

        for nested in node.hosts {
            if let Some(nav) = self.navigators.remove(&nested) {
                for child in nav.stack {
                    self.remove_screen(child, removed);
                }
            }
        }
    }

    /// Focus-change notification for one navigator.
    pub fn focus(&mut self, navigator: NavigatorId, screen: ScreenId) -> Result<(), RegistryError> {
        let Some(node) = self.screens.get(&screen) else {
            return Err(RegistryError::UnknownScreen(screen));
        };
        if node.navigator != navigator {
            return Err(RegistryError::ForeignFocus { navigator, screen });
        }
        let Some(nav) = self.navigators.get_mut(&navigator) else {
            return Err(RegistryError::UnknownNavigator(navigator));
        };
        nav.focused = Some(screen);
        Ok(())
    }

    /// Look up a mounted screen.
    #[inline]
    #[must_use]
    pub fn screen(&self, id: ScreenId) -> Option<&ScreenNode> {
        self.screens.get(&id)
    }

    /// Number of mounted screens.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.screens.len()
    }

    /// Whether nothing is mounted.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    /// The screen hosting `id`'s navigator, if `id` is nested.
    #[must_use]
    pub fn parent_screen(&self, id: ScreenId) -> Option<ScreenId> {
        let node = self.screens.get(&id)?;
        self.navigators.get(&node.navigator)?.host
    }

    /// Screens below and above `id` in its own navigator's stack.
    #[must_use]
    pub fn neighbors(&self, id: ScreenId) -> (Option<ScreenId>, Option<ScreenId>) {
        let Some(stack) = self
            .screens
            .get(&id)
            .and_then(|n| self.navigators.get(&n.navigator))
            .map(|nav| &nav.stack)
        else {
            return (None, None);
        };
        let Some(index) = stack.iter().position(|s| *s == id) else {
            return (None, None);
        };
        let previous = index.checked_sub(1).map(|i| stack[i]);
        let next = stack.get(index + 1).copied();
        (previous, next)
    }

    /// The innermost focused screen: descend from the root navigator through
    /// each focused screen and the navigators it hosts.
    #[must_use]
    pub fn focused_leaf(&self) -> Option<ScreenId> {
        let mut leaf = self.navigators.get(&self.root?)?.active()?;
        loop {
            let node = self.screens.get(&leaf)?;
            let nested = node
                .hosts
                .iter()
                .rev()
                .filter_map(|n| self.navigators.get(n))
                .find_map(NavigatorNode::active);
            match nested {
                Some(active) => leaf = active,
                None => return Some(leaf),
            }
        }
    }

    /// Walk from `from` toward the root, yielding `from` first.
    pub fn ancestry(&self, from: ScreenId) -> impl Iterator<Item = &ScreenNode> + '_ {
        std::iter::successors(self.screens.get(&from), move |node| {
            self.navigators
                .get(&node.navigator)
                .and_then(|nav| nav.host)
                .and_then(|host| self.screens.get(&host))
        })
    }

    /// Nearest screen at or above `from` claiming `direction`.
    #[must_use]
    pub fn owner(&self, from: ScreenId, direction: Direction) -> Option<ScreenId> {
        self.ancestry(from)
            .find(|node| node.claimed.has(direction))
            .map(ScreenNode::id)
    }

    /// Resolve `direction` for `from`.
    #[must_use]
    pub fn resolve(&self, from: ScreenId, direction: Direction) -> Ownership {
        match self.owner(from, direction) {
            Some(owner) if owner == from => Ownership::Owned,
            Some(owner) => Ownership::Inherited(owner),
            None => Ownership::Unowned,
        }
    }

    /// Resolve all four directions for `from`.
    #[must_use]
    pub fn owners_from(&self, from: ScreenId) -> OwnerMap {
        let mut map = OwnerMap::default();
        for direction in Direction::ALL {
            map.owners[OwnerMap::slot(direction)] = self.owner(from, direction);
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
