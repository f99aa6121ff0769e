#![forbid(unsafe_code)]

//! Core: gesture ownership, dismissal math, and transition progress for
//! nested stack navigators.
//!
//! # Role in SlipStack
//! `slipstack-core` decides which screen a swipe belongs to, whether a
//! release dismisses it, and how its transition progress animates. Rendering
//! and navigation stay outside: navigators report their tree and touches,
//! interpolators read snapshots, and the navigator drains removal commands.
//!
//! # Primary responsibilities
//! - **Ownership**: per-direction claims resolved by an ancestor walk.
//! - **Activation**: edge bands, axis classification, pending/activate/fail.
//! - **Calculator**: normalized translation and velocity, release decisions.
//! - **Store**: per-screen animation state with lock-free readers.
//! - **Scroll coordination** and **snap points** for sheets.
//!
//! # How it fits in the system
//! [`engine::TransitionEngine`] composes the modules. The harness crate
//! (`slipstack-harness`) replays scripted touch scenarios through it.
//!
//! ```
//! use slipstack_core::config::{GestureDirection, ScreenGestureConfig};
//! use slipstack_core::engine::TransitionEngine;
//! use slipstack_core::geometry::{Point, Size, Vector};
//! use slipstack_core::ownership::{NavigatorId, ScreenId, ScreenRegistration};
//! use slipstack_core::velocity::PanEvent;
//!
//! let mut engine = TransitionEngine::new(Size::new(390.0, 844.0));
//! let nav = NavigatorId::new(1);
//! let modal = ScreenId::new(1);
//! engine.register_navigator(nav, None)?;
//! engine.mount(ScreenRegistration {
//!     id: modal,
//!     navigator: nav,
//!     config: ScreenGestureConfig::dismissible([GestureDirection::Vertical]),
//! })?;
//!
//! engine.touch_start(Point::new(195.0, 300.0), None);
//! let fling = PanEvent::new(Vector::new(0.0, 420.0), Vector::new(0.0, 1800.0));
//! engine.touch_move(fling);
//! let release = engine.touch_end(fling).expect("screen gesture was active");
//! assert_eq!(release.screen, modal);
//! # Ok::<(), slipstack_core::error::RegistryError>(())
//! ```

pub mod activation;
pub mod config;
pub mod direction;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod interpolation;
pub mod ownership;
pub mod recognizer;
pub mod scroll;
pub mod snap;
pub mod spring;
pub mod store;
pub mod velocity;

pub use direction::{Axis, Direction, Directions};
pub use engine::{NavigatorCommand, TransitionEngine};
pub use ownership::{NavigatorId, ScreenId};
