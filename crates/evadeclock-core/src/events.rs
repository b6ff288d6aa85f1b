use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Status;
use crate::placement::{NodeId, Point};

/// Every observable change in the overlay produces an Event.
/// The GUI host polls these and applies them to its surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A surface's label text is due for a repaint.
    TextUpdated {
        node: NodeId,
        text: String,
        status: Status,
        at: DateTime<Utc>,
    },
    /// A surface must be moved to a new origin.
    NodeMoved {
        node: NodeId,
        origin: Point,
        at: DateTime<Utc>,
    },
    /// A surface was torn down; its tick registration is gone with it.
    SurfaceClosed {
        node: NodeId,
        at: DateTime<Utc>,
    },
}
