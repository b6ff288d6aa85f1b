//! Evasive placement engine.
//!
//! One node per overlay surface. A free node occupies a screen corner
//! and hops to the next corner whenever the pointer lands on it; a
//! stuck node has no placement of its own and rides directly above or
//! beneath its anchor. Interactions delivered to a stuck node are
//! forwarded to the anchor, so the pair only ever moves as a unit.
//!
//! Nodes refer to each other through registry handles, never owning
//! pointers: the anchor/dependent relation is a cycle of references in
//! both directions and must not become a cycle of ownership.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::geometry::{Orientation, Point, Rect, Size};
use crate::config::OverlaySettings;
use crate::error::{CoreError, PlacementError};

/// Registry handle for a placement node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A computed position the host must apply to the matching surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub node: NodeId,
    pub origin: Point,
}

#[derive(Debug, Clone)]
struct Node {
    orientation: Orientation,
    /// The node this one sticks to. Set at creation, never reassigned.
    anchor: Option<NodeId>,
    /// Back-reference to the single node stuck to this one.
    dependent: Option<NodeId>,
    size: Size,
    /// Index into the engine's screen list. Unused for placement while
    /// stuck (the anchor decides), but kept for fallback bookkeeping.
    screen: usize,
    origin: Point,
}

/// Placement state machine over all managed surfaces.
///
/// Single-threaded: every mutation happens inside one call, so a
/// collaborator querying between calls never observes an orientation
/// that has advanced without its recomputed origin.
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    /// Slot registry; `remove_node` leaves a tombstone so handles held
    /// by the host stay stable.
    nodes: Vec<Option<Node>>,
    screens: Vec<Rect>,
    xpadding: f64,
    ypadding: f64,
}

impl PlacementEngine {
    /// Build an engine over the given screen list.
    pub fn new(screens: Vec<Rect>, settings: &OverlaySettings) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self {
            nodes: Vec::new(),
            screens,
            xpadding: settings.xpadding,
            ypadding: settings.ypadding,
        })
    }

    pub fn screens(&self) -> &[Rect] {
        &self.screens
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    // ── Node lifecycle ───────────────────────────────────────────────

    /// Register a surface and compute its initial origin.
    ///
    /// A node created with an `anchor` sticks to it: its width is
    /// forced to the anchor's width so the pair stacks flush, the
    /// anchor gains the back-reference, and the relation stays one
    /// level deep (anchoring to an already-stuck node is rejected, as
    /// is a second dependent). On any error nothing is registered.
    pub fn create_node(
        &mut self,
        size: Size,
        screen: usize,
        anchor: Option<NodeId>,
    ) -> Result<Placement, PlacementError> {
        if self.screens.is_empty() {
            return Err(PlacementError::NoScreens);
        }
        if screen >= self.screens.len() {
            return Err(PlacementError::UnknownScreen {
                index: screen,
                count: self.screens.len(),
            });
        }
        let mut size = size;
        if let Some(anchor_id) = anchor {
            let anchor_node = self.get(anchor_id)?;
            if anchor_node.anchor.is_some() {
                return Err(PlacementError::AnchorChained(anchor_id));
            }
            if anchor_node.dependent.is_some() {
                return Err(PlacementError::AnchorOccupied(anchor_id));
            }
            size.width = anchor_node.size.width;
        }

        let id = NodeId(self.nodes.len() as u32);
        let mut node = Node {
            orientation: Orientation::default(),
            anchor,
            dependent: None,
            size,
            screen,
            origin: Point { x: 0.0, y: 0.0 },
        };
        node.origin = self.compute_origin(&node)?;
        if let Some(anchor_id) = anchor {
            self.get_mut(anchor_id)?.dependent = Some(id);
        }
        let origin = node.origin;
        self.nodes.push(Some(node));
        debug!(node = %id, ?anchor, x = origin.x, y = origin.y, "placement node created");
        Ok(Placement { node: id, origin })
    }

    /// Drop a node and detach its relations.
    ///
    /// The surface's tick registration is owned by the overlay layer;
    /// this only removes the placement bookkeeping. A surviving
    /// dependent becomes a free node at its last origin.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), PlacementError> {
        let node = self
            .nodes
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .ok_or(PlacementError::UnknownNode(id))?;
        if let Some(anchor_id) = node.anchor {
            if let Ok(anchor_node) = self.get_mut(anchor_id) {
                anchor_node.dependent = None;
            }
        }
        if let Some(dependent_id) = node.dependent {
            if let Ok(dependent_node) = self.get_mut(dependent_id) {
                dependent_node.anchor = None;
            }
        }
        debug!(node = %id, "placement node removed");
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn origin(&self, id: NodeId) -> Result<Point, PlacementError> {
        Ok(self.get(id)?.origin)
    }

    pub fn size(&self, id: NodeId) -> Result<Size, PlacementError> {
        Ok(self.get(id)?.size)
    }

    /// Effective orientation, resolved through the anchor for a stuck
    /// node: the pair faces whichever corner the anchor occupies.
    pub fn orientation(&self, id: NodeId) -> Result<Orientation, PlacementError> {
        let node = self.get(id)?;
        match node.anchor {
            Some(anchor_id) => self.orientation(anchor_id),
            None => Ok(node.orientation),
        }
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Pointer hover-enter or secondary click on a managed surface.
    ///
    /// A stuck node forwards to its anchor; its own orientation never
    /// changes. A free node advances one corner and drags its dependent
    /// along. Everything is committed together before returning, and an
    /// error leaves the engine exactly as it was.
    pub fn on_interaction(&mut self, id: NodeId) -> Result<Vec<Placement>, PlacementError> {
        let node = self.get(id)?.clone();
        if let Some(anchor_id) = node.anchor {
            debug!(node = %id, anchor = %anchor_id, "interaction forwarded to anchor");
            return self.on_interaction(anchor_id);
        }

        // Compute every new origin before touching any state.
        let next = node.orientation.next();
        let screen = self.screen_of(&node)?;
        let origin = next.corner_origin(screen, node.size, self.xpadding, self.ypadding);
        let dependent = match node.dependent {
            Some(dependent_id) => {
                let dependent_size = self.get(dependent_id)?.size;
                Some((
                    dependent_id,
                    stuck_origin(next, origin, node.size, dependent_size),
                ))
            }
            None => None,
        };

        let committed = self.get_mut(id)?;
        committed.orientation = next;
        committed.origin = origin;
        let mut updates = vec![Placement { node: id, origin }];
        if let Some((dependent_id, dependent_origin)) = dependent {
            self.get_mut(dependent_id)?.origin = dependent_origin;
            updates.push(Placement {
                node: dependent_id,
                origin: dependent_origin,
            });
        }
        debug!(node = %id, orientation = ?next, "evaded to next corner");
        Ok(updates)
    }

    /// Displays were added, removed or resized.
    ///
    /// Every node is re-placed against the new list. A node whose
    /// screen is gone falls back to the nearest remaining screen (by
    /// center distance from its last origin); with no screens left it
    /// keeps its last origin. Per-node recovery: one lost screen never
    /// disturbs nodes on surviving screens.
    pub fn on_screens_changed(&mut self, screens: Vec<Rect>) -> Vec<Placement> {
        self.screens = screens;
        let ids: Vec<NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| NodeId(index as u32))
            .collect();

        let mut updates = Vec::new();
        // Free nodes first, so stuck nodes see fresh anchor origins.
        for &id in &ids {
            let Ok(node) = self.get(id).cloned() else { continue };
            if node.anchor.is_some() {
                continue;
            }
            let screen_index = if node.screen < self.screens.len() {
                node.screen
            } else {
                match self.nearest_screen(node.origin) {
                    Some(index) => {
                        warn!(
                            node = %id,
                            lost = node.screen,
                            fallback = index,
                            "screen removed; reassigning to nearest remaining screen"
                        );
                        index
                    }
                    None => {
                        warn!(node = %id, "no screens remain; keeping last origin");
                        continue;
                    }
                }
            };
            let screen = self.screens[screen_index];
            let origin =
                node.orientation
                    .corner_origin(screen, node.size, self.xpadding, self.ypadding);
            if let Ok(committed) = self.get_mut(id) {
                committed.screen = screen_index;
                committed.origin = origin;
            }
            updates.push(Placement { node: id, origin });
        }
        for &id in &ids {
            let Ok(node) = self.get(id).cloned() else { continue };
            let Some(anchor_id) = node.anchor else { continue };
            let Ok(anchor_node) = self.get(anchor_id).cloned() else { continue };
            let origin = stuck_origin(
                anchor_node.orientation,
                anchor_node.origin,
                anchor_node.size,
                node.size,
            );
            if let Ok(committed) = self.get_mut(id) {
                committed.screen = anchor_node.screen;
                committed.origin = origin;
            }
            updates.push(Placement { node: id, origin });
        }
        updates
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn get(&self, id: NodeId) -> Result<&Node, PlacementError> {
        self.nodes
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(PlacementError::UnknownNode(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, PlacementError> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(PlacementError::UnknownNode(id))
    }

    fn screen_of(&self, node: &Node) -> Result<Rect, PlacementError> {
        self.screens
            .get(node.screen)
            .copied()
            .ok_or(PlacementError::UnknownScreen {
                index: node.screen,
                count: self.screens.len(),
            })
    }

    fn compute_origin(&self, node: &Node) -> Result<Point, PlacementError> {
        if let Some(anchor_id) = node.anchor {
            let anchor_node = self.get(anchor_id)?;
            Ok(stuck_origin(
                anchor_node.orientation,
                anchor_node.origin,
                anchor_node.size,
                node.size,
            ))
        } else {
            let screen = self.screen_of(node)?;
            Ok(node
                .orientation
                .corner_origin(screen, node.size, self.xpadding, self.ypadding))
        }
    }

    fn nearest_screen(&self, from: Point) -> Option<usize> {
        self.screens
            .iter()
            .enumerate()
            .map(|(index, rect)| {
                let center = rect.center();
                let dx = center.x - from.x;
                let dy = center.y - from.y;
                (index, dx * dx + dy * dy)
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}

/// Origin of a stuck node: same x as the anchor; stacked beneath it
/// when the anchor sits in a top corner, on top of it otherwise, so the
/// pair always grows toward the screen center.
fn stuck_origin(
    anchor_orientation: Orientation,
    anchor_origin: Point,
    anchor_size: Size,
    size: Size,
) -> Point {
    let y = if anchor_orientation.is_top() {
        anchor_origin.y + anchor_size.height
    } else {
        anchor_origin.y - size.height
    };
    Point {
        x: anchor_origin.x,
        y,
    }
}
