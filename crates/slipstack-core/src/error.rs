#![forbid(unsafe_code)]

//! Typed errors for API misuse.
//!
//! Gesture decisions never fail: an ambiguous swipe stays pending and an
//! unowned direction is inert. The errors here cover callers handing the
//! engine an inconsistent tree, invalid configuration, or a programmatic
//! command that cannot apply.

use std::fmt;

use crate::ownership::{NavigatorId, ScreenId};
use crate::scroll::ScrollableId;

/// Navigator tree mutations that cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A screen with this id is already mounted.
    DuplicateScreen(ScreenId),
    /// A navigator with this id is already registered.
    DuplicateNavigator(NavigatorId),
    /// The referenced navigator is not registered.
    UnknownNavigator(NavigatorId),
    /// The referenced screen is not mounted.
    UnknownScreen(ScreenId),
    /// A nested navigator names a host screen that is not mounted.
    UnknownHost {
        navigator: NavigatorId,
        host: ScreenId,
    },
    /// A root navigator already exists.
    SecondRoot {
        existing: NavigatorId,
        rejected: NavigatorId,
    },
    /// The focus target is mounted in another navigator.
    ForeignFocus {
        navigator: NavigatorId,
        screen: ScreenId,
    },
    /// A scrollable with this id is already registered.
    DuplicateScrollable(ScrollableId),
    /// The referenced scrollable is not registered.
    UnknownScrollable(ScrollableId),
    /// The screen's gesture configuration failed validation.
    InvalidConfig { screen: ScreenId, message: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateScreen(id) => write!(f, "screen {id} is already mounted"),
            Self::DuplicateNavigator(id) => write!(f, "navigator {id} is already registered"),
            Self::UnknownNavigator(id) => write!(f, "navigator {id} is not registered"),
            Self::UnknownScreen(id) => write!(f, "screen {id} is not mounted"),
            Self::UnknownHost { navigator, host } => {
                write!(f, "navigator {navigator} is hosted by unmounted screen {host}")
            }
            Self::SecondRoot { existing, rejected } => write!(
                f,
                "navigator {rejected} has no host but {existing} is already the root"
            ),
            Self::ForeignFocus { navigator, screen } => {
                write!(f, "screen {screen} does not belong to navigator {navigator}")
            }
            Self::DuplicateScrollable(id) => write!(f, "scrollable {id} is already registered"),
            Self::UnknownScrollable(id) => write!(f, "scrollable {id} is not registered"),
            Self::InvalidConfig { screen, message } => {
                write!(f, "screen {screen} has invalid gesture config: {message}")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Invalid configuration values or unreadable config sources.
#[derive(Debug)]
pub enum ConfigError {
    /// A field is outside its accepted range.
    Invalid {
        field: &'static str,
        reason: String,
    },
    /// Reading a config file failed.
    Io(std::io::Error),
    /// JSON parsing failed.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// TOML parsing failed.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { field, reason } => write!(f, "invalid {field}: {reason}"),
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "config JSON error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "config TOML error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Invalid { .. } => None,
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
        }
    }
}

/// Programmatic commands (`snap_to`, `dismiss`) that cannot apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The target screen is not mounted or has no animation state.
    UnknownScreen(ScreenId),
    /// `snap_to` on a screen configured without snap points.
    NoSnapPoints(ScreenId),
    /// `snap_to` index past the last snap point.
    SnapIndexOutOfRange {
        screen: ScreenId,
        index: usize,
        len: usize,
    },
    /// The screen is already animating out.
    AlreadyClosing(ScreenId),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownScreen(id) => write!(f, "screen {id} is not mounted"),
            Self::NoSnapPoints(id) => write!(f, "screen {id} has no snap points"),
            Self::SnapIndexOutOfRange { screen, index, len } => write!(
                f,
                "snap index {index} out of range for screen {screen} ({len} snap points)"
            ),
            Self::AlreadyClosing(id) => write!(f, "screen {id} is already closing"),
        }
    }
}

impl std::error::Error for CommandError {}
