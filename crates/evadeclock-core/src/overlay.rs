//! Per-screen overlay orchestration.
//!
//! One [`Countdown`] shared by every screen, one placement node pair
//! per screen: a free *summary* surface showing the countdown, and a
//! *detail* surface stuck beneath it showing the plain `MM:SS` view.
//! The overlay owns one explicitly constructed countdown; there is no
//! ambient global clock.
//!
//! The host drives everything: it calls [`Overlay::tick`] periodically,
//! delivers pointer interactions, and reports display changes. Each
//! call answers with [`Event`]s the host applies to its surfaces. No
//! threads, no internal timers.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::clock::Countdown;
use crate::config::OverlaySettings;
use crate::error::Result;
use crate::events::Event;
use crate::placement::{NodeId, PlacementEngine, Rect, Size};

/// Which text a surface renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceRole {
    /// Countdown with indicator symbols; polls every `tick_secs`.
    Summary,
    /// Plain `MM:SS` companion; polls every `companion_tick_secs`.
    Detail,
}

/// Periodic text refresh owned by exactly one surface.
///
/// This is the scoped resource tying a tick to its rendering target:
/// the registration lives in the overlay's list only while its surface
/// does, and teardown drops them together, so a tick can never address
/// a destroyed surface.
#[derive(Debug, Clone)]
struct TickRegistration {
    node: NodeId,
    role: SurfaceRole,
    interval_secs: f64,
    last_fired: Option<DateTime<Utc>>,
}

impl TickRegistration {
    fn due(&self, now: DateTime<Utc>) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => (now - last).num_milliseconds() as f64 / 1000.0 >= self.interval_secs,
        }
    }
}

/// The whole overlay: countdown, placement graph and tick bookkeeping.
pub struct Overlay {
    settings: OverlaySettings,
    countdown: Countdown,
    engine: PlacementEngine,
    registrations: Vec<TickRegistration>,
    /// Host callback sizing a rendered label; font metrics live on the
    /// GUI side of the boundary.
    measure: Box<dyn Fn(&str) -> Size + Send>,
}

impl Overlay {
    /// Build the overlay and place a summary/detail pair on every
    /// screen. Fails on unusable settings before any surface exists.
    pub fn new(
        settings: OverlaySettings,
        screens: Vec<Rect>,
        now: DateTime<Utc>,
        measure: impl Fn(&str) -> Size + Send + 'static,
    ) -> Result<Self> {
        let countdown = Countdown::new(settings.clone(), now)?;
        let engine = PlacementEngine::new(screens, &settings)?;
        let mut overlay = Self {
            settings,
            countdown,
            engine,
            registrations: Vec::new(),
            measure: Box::new(measure),
        };
        overlay.build_surfaces(now)?;
        Ok(overlay)
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn engine(&self) -> &PlacementEngine {
        &self.engine
    }

    /// Nodes with a live tick registration, summary first per screen.
    pub fn surface_nodes(&self) -> Vec<NodeId> {
        self.registrations.iter().map(|r| r.node).collect()
    }

    /// Emit the current text and position of every surface, without
    /// disturbing the tick cadence. For hosts that just (re)appeared.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        for registration in &self.registrations {
            if let Ok(origin) = self.engine.origin(registration.node) {
                events.push(Event::NodeMoved {
                    node: registration.node,
                    origin,
                    at: now,
                });
            }
            events.push(Event::TextUpdated {
                node: registration.node,
                text: self.text_for(registration.role, now),
                status: self.countdown.status(now),
                at: now,
            });
        }
        events
    }

    /// Periodic drive from the host. Surfaces whose interval has
    /// elapsed get fresh text; a fresh registration fires on its first
    /// tick. Calling twice with the same `now` repaints nothing twice.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        let status = self.countdown.status(now);
        for registration in &mut self.registrations {
            if !registration.due(now) {
                continue;
            }
            registration.last_fired = Some(now);
            let text = match registration.role {
                SurfaceRole::Summary => self.countdown.display_text(now),
                SurfaceRole::Detail => self.countdown.companion_text(now),
            };
            events.push(Event::TextUpdated {
                node: registration.node,
                text,
                status,
                at: now,
            });
        }
        events
    }

    /// Pointer hover-enter or secondary click on a surface.
    pub fn interaction(&mut self, node: NodeId, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let placements = self.engine.on_interaction(node)?;
        Ok(placements
            .into_iter()
            .map(|p| Event::NodeMoved {
                node: p.node,
                origin: p.origin,
                at: now,
            })
            .collect())
    }

    /// Displays were added, removed or resized: tear down every surface
    /// (releasing its tick registration) and rebuild on the new list.
    pub fn screens_changed(
        &mut self,
        screens: Vec<Rect>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let mut events = self.close_surfaces(now);
        self.engine = PlacementEngine::new(screens, &self.settings)?;
        if self.engine.screens().is_empty() {
            debug!("no screens attached; overlay stays empty until the next change");
            return Ok(events);
        }
        events.extend(self.build_surfaces(now)?);
        Ok(events)
    }

    /// Application teardown: release every surface and registration.
    pub fn shutdown(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        self.close_surfaces(now)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn build_surfaces(&mut self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        for screen_index in 0..self.engine.screens().len() {
            let summary_size = (self.measure)(&self.countdown.display_text(now));
            let summary = self.engine.create_node(summary_size, screen_index, None)?;
            let detail_size = (self.measure)(&self.countdown.companion_text(now));
            let detail =
                self.engine
                    .create_node(detail_size, screen_index, Some(summary.node))?;

            self.registrations.push(TickRegistration {
                node: summary.node,
                role: SurfaceRole::Summary,
                interval_secs: self.settings.tick_secs,
                last_fired: None,
            });
            self.registrations.push(TickRegistration {
                node: detail.node,
                role: SurfaceRole::Detail,
                interval_secs: self.settings.companion_tick_secs,
                last_fired: None,
            });
            for placement in [summary, detail] {
                events.push(Event::NodeMoved {
                    node: placement.node,
                    origin: placement.origin,
                    at: now,
                });
            }
        }
        debug!(
            surfaces = self.registrations.len(),
            screens = self.engine.screens().len(),
            "overlay surfaces built"
        );
        Ok(events)
    }

    fn close_surfaces(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        for registration in self.registrations.drain(..) {
            // The registration is released with its surface; a missing
            // node here only means the engine was already rebuilt.
            let _ = self.engine.remove_node(registration.node);
            events.push(Event::SurfaceClosed {
                node: registration.node,
                at: now,
            });
        }
        events
    }

    fn text_for(&self, role: SurfaceRole, now: DateTime<Utc>) -> String {
        match role {
            SurfaceRole::Summary => self.countdown.display_text(now),
            SurfaceRole::Detail => self.countdown.companion_text(now),
        }
    }
}

impl std::fmt::Debug for Overlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overlay")
            .field("countdown", &self.countdown)
            .field("engine", &self.engine)
            .field("registrations", &self.registrations)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn at(offset_secs: i64) -> DateTime<Utc> {
        start() + Duration::seconds(offset_secs)
    }

    fn screen() -> Rect {
        Rect {
            x: 0.0,
            y: 0.0,
            width: 1920.0,
            height: 1080.0,
        }
    }

    fn measure(text: &str) -> Size {
        Size {
            width: 12.0 * text.chars().count() as f64,
            height: 40.0,
        }
    }

    fn overlay(screens: Vec<Rect>) -> Overlay {
        Overlay::new(OverlaySettings::default(), screens, start(), measure).unwrap()
    }

    #[test]
    fn one_surface_pair_per_screen() {
        let second = Rect {
            x: 1920.0,
            ..screen()
        };
        let o = overlay(vec![screen(), second]);
        assert_eq!(o.surface_nodes().len(), 4);
        assert_eq!(o.engine().node_count(), 4);
    }

    #[test]
    fn invalid_settings_create_nothing() {
        let bad = OverlaySettings {
            duration_secs: -5.0,
            ..OverlaySettings::default()
        };
        assert!(Overlay::new(bad, vec![screen()], start(), measure).is_err());
    }

    #[test]
    fn first_tick_paints_everything() {
        let mut o = overlay(vec![screen()]);
        let events = o.tick(at(0));
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .all(|e| matches!(e, Event::TextUpdated { .. })));
    }

    #[test]
    fn companion_polls_slower() {
        let mut o = overlay(vec![screen()]);
        o.tick(at(0));
        // 1s later only the summary (1s interval) is due; the detail
        // surface has a 5s interval.
        let events = o.tick(at(1));
        assert_eq!(events.len(), 1);
        let events = o.tick(at(2));
        assert_eq!(events.len(), 1);
        // At 5s both fire.
        let events = o.tick(at(5));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn same_instant_ticks_are_idempotent() {
        let mut o = overlay(vec![screen()]);
        assert_eq!(o.tick(at(0)).len(), 2);
        assert!(o.tick(at(0)).is_empty());
    }

    #[test]
    fn interaction_moves_the_pair() {
        let mut o = overlay(vec![screen()]);
        let nodes = o.surface_nodes();
        // Poke the detail surface: forwarded to its summary anchor,
        // both move.
        let events = o.interaction(nodes[1], at(10)).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| matches!(e, Event::NodeMoved { .. })));
    }

    #[test]
    fn screens_changed_rebuilds_surfaces() {
        let mut o = overlay(vec![screen()]);
        let old_nodes = o.surface_nodes();
        let second = Rect {
            x: 1920.0,
            ..screen()
        };
        let events = o.screens_changed(vec![screen(), second], at(30)).unwrap();

        let closed = events
            .iter()
            .filter(|e| matches!(e, Event::SurfaceClosed { .. }))
            .count();
        let moved = events
            .iter()
            .filter(|e| matches!(e, Event::NodeMoved { .. }))
            .count();
        assert_eq!(closed, old_nodes.len());
        assert_eq!(moved, 4);
        assert_eq!(o.surface_nodes().len(), 4);
        // Rebuilt registrations fire immediately on the next tick.
        assert_eq!(o.tick(at(31)).len(), 4);
    }

    #[test]
    fn all_screens_gone_leaves_an_empty_overlay() {
        let mut o = overlay(vec![screen()]);
        let events = o.screens_changed(Vec::new(), at(30)).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .all(|e| matches!(e, Event::SurfaceClosed { .. })));
        assert!(o.surface_nodes().is_empty());
        assert!(o.tick(at(31)).is_empty());
    }

    #[test]
    fn shutdown_releases_every_registration() {
        let mut o = overlay(vec![screen()]);
        let events = o.shutdown(at(60));
        assert_eq!(events.len(), 2);
        assert_eq!(o.engine().node_count(), 0);
        // Nothing left to tick: no dangling registration can address a
        // destroyed surface.
        assert!(o.tick(at(61)).is_empty());
    }

    #[test]
    fn snapshot_reports_without_consuming_ticks() {
        let o = overlay(vec![screen()]);
        let events = o.snapshot(at(3));
        // A move and a text per surface.
        assert_eq!(events.len(), 4);
    }
}
