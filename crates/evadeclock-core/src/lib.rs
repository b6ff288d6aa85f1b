//! # Evadeclock Core Library
//!
//! Core logic for Evadeclock, a floating always-on-top countdown
//! overlay that dodges the pointer. The GUI shell (windows, fonts,
//! text rendering) is a thin layer over this library: it delivers
//! ticks, pointer interactions and screen changes, and applies the
//! events it gets back.
//!
//! ## Architecture
//!
//! - **Clock**: a pure-function-of-`now` countdown that classifies the
//!   moment as normal/grace/overtime and derives a cycling indicator
//!   symbol -- no internal thread, the caller samples it each tick
//! - **Placement**: a per-surface corner orientation state machine with
//!   a one-level "stick" relation between window pairs
//! - **Overlay**: wires one countdown and the placement graph across
//!   all screens and owns the per-surface tick registrations
//!
//! ## Key Components
//!
//! - [`Countdown`]: countdown phase and display-text derivation
//! - [`PlacementEngine`]: evasive corner placement and the stick graph
//! - [`Overlay`]: per-screen orchestration driven by the host
//! - [`OverlaySettings`]: the one settings structure, validated up front

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod overlay;
pub mod placement;

pub use clock::{Countdown, Status};
pub use config::{DisplayGranularity, OverlaySettings};
pub use error::{ConfigError, CoreError, PlacementError, Result};
pub use events::Event;
pub use overlay::Overlay;
pub use placement::{NodeId, Orientation, Placement, PlacementEngine, Point, Rect, Size};
