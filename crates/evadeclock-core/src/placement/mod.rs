mod engine;
mod geometry;

pub use engine::{NodeId, Placement, PlacementEngine};
pub use geometry::{Orientation, Point, Rect, Size};
