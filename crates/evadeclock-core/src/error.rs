//! Core error types for evadeclock-core.
//!
//! Construction-time problems (bad settings) are fatal for the component
//! being built; runtime placement problems are contained to the node
//! they concern and never tear down the rest of the overlay.

use thiserror::Error;

use crate::placement::NodeId;

/// Core error type for evadeclock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings rejected at construction
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Placement graph errors
    #[error("placement error: {0}")]
    Placement(#[from] PlacementError),
}

/// Settings validation errors.
///
/// Any of these aborts construction of the component entirely; no
/// partially-initialized clock or node is ever exposed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A prefix palette with no symbols to cycle through
    #[error("palette '{palette}' must contain at least one symbol")]
    EmptyPalette { palette: &'static str },

    /// Countdown length must be positive
    #[error("countdown duration must be positive, got {secs}s")]
    NonPositiveDuration { secs: f64 },

    /// Grace window must be positive
    #[error("grace window must be positive, got {secs}s")]
    NonPositiveGrace { secs: f64 },

    /// Cycle or tick period must be positive
    #[error("{which} period must be positive, got {secs}s")]
    NonPositivePeriod { which: &'static str, secs: f64 },

    /// Corner inset margins cannot be negative
    #[error("{axis} padding must not be negative, got {value}")]
    NegativePadding { axis: &'static str, value: f64 },
}

/// Placement graph errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// Node id does not resolve to a live node
    #[error("unknown placement node {0}")]
    UnknownNode(NodeId),

    /// Screen index outside the current screen list
    #[error("screen index {index} out of range ({count} screens attached)")]
    UnknownScreen { index: usize, count: usize },

    /// The anchor already has a window stuck to it
    #[error("node {0} already has a dependent stuck to it")]
    AnchorOccupied(NodeId),

    /// Stick relations are one level deep; chaining is rejected
    #[error("node {0} is itself stuck to another node")]
    AnchorChained(NodeId),

    /// No screens are attached at all
    #[error("no screens available")]
    NoScreens,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
