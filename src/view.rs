//! Selection, viewport and panel state for the map view.
//!
//! [`ViewController`] is the single owner of UI state. The map surface talks
//! to it through [`ViewController::on_move`],
//! [`ViewController::interaction_start`] and
//! [`ViewController::interaction_end`]; selectors talk to it through the
//! `select_*` methods. Camera movement leaves as [`CameraRequest`]s.

use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::model::{Port, Viewport};
use crate::proximity::visiting_ships;
use crate::tracks::ShipTracks;

pub const FOCUS_ZOOM: f64 = 6.0;
pub const FLY_TO_DURATION_MS: u64 = 2000;

/// Which selector list is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Mode {
    #[default]
    Ship,
    Port,
}

/// What the user has picked. Ship and port selections exclude each other.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum Selection {
    #[default]
    None,
    Ship(String),
    Port(String),
}

/// An animated camera move for the map surface to perform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ViewController {
    mode: Mode,
    selection: Selection,
    panel_open: bool,
    viewport: Viewport,
    interacting: bool,
    visited: BTreeSet<String>,
    pending_camera: Option<CameraRequest>,
}

impl ViewController {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    /// Ships matched by the last port selection.
    pub fn visited(&self) -> &BTreeSet<String> {
        &self.visited
    }

    pub fn pending_camera(&self) -> Option<CameraRequest> {
        self.pending_camera
    }

    /// Switches the displayed selector. The current selection is kept.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            Mode::Ship => Mode::Port,
            Mode::Port => Mode::Ship,
        };
        debug!(mode = ?self.mode, "Selector mode toggled");
    }

    /// The value the visible selector should show: the selection, if it is
    /// of the displayed kind.
    pub fn selector_value(&self) -> Option<&str> {
        match (&self.selection, self.mode) {
            (Selection::Ship(id), Mode::Ship) => Some(id.as_str()),
            (Selection::Port(name), Mode::Port) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Selects a ship and asks for a fly-to its latest point.
    ///
    /// Returns `None` (and moves nothing) when the ship has no points or the
    /// user is currently dragging the map.
    pub fn select_ship(&mut self, ship_id: &str, tracks: &ShipTracks) -> Option<CameraRequest> {
        self.selection = Selection::Ship(ship_id.to_string());
        self.panel_open = false;
        self.visited.clear();
        self.pending_camera = None;

        let Some(latest) = tracks.latest(ship_id) else {
            info!(ship = ship_id, "Selected ship has no recorded pings");
            return None;
        };

        if self.interacting {
            debug!(ship = ship_id, "Fly-to suppressed during user interaction");
            return None;
        }

        let request = CameraRequest {
            latitude: latest.point.latitude,
            longitude: latest.point.longitude,
            zoom: FOCUS_ZOOM,
            duration_ms: FLY_TO_DURATION_MS,
        };
        info!(
            ship = ship_id,
            latitude = request.latitude,
            longitude = request.longitude,
            "Flying to latest ping"
        );
        self.pending_camera = Some(request);
        Some(request)
    }

    /// Selects a port: recenters on it, finds visiting ships and opens the
    /// panel.
    ///
    /// # Errors
    ///
    /// Fails without touching any state if `name` is not a known port.
    pub fn select_port(
        &mut self,
        name: &str,
        ports: &[Port],
        tracks: &ShipTracks,
    ) -> Result<&BTreeSet<String>> {
        let Some(port) = ports.iter().find(|p| p.name == name) else {
            bail!("unknown port {name:?}");
        };

        self.selection = Selection::Port(port.name.clone());
        self.pending_camera = None;
        self.viewport = Viewport {
            latitude: port.latitude,
            longitude: port.longitude,
            zoom: FOCUS_ZOOM,
        };
        self.visited = visiting_ships(port, tracks);
        self.panel_open = true;

        info!(port = name, visitors = self.visited.len(), "Port selected");
        Ok(&self.visited)
    }

    /// Selector clear button.
    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
        self.panel_open = false;
        self.visited.clear();
        self.pending_camera = None;
    }

    /// Hides the port panel; the selection stays.
    pub fn close_panel(&mut self) {
        self.panel_open = false;
    }

    /// Pointer/touch down on the map. Drops any fly-to not yet applied.
    pub fn interaction_start(&mut self) {
        self.interacting = true;
        self.pending_camera = None;
    }

    pub fn interaction_end(&mut self) {
        self.interacting = false;
    }

    /// User pan/zoom reported by the map surface.
    pub fn on_move(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// The map surface finished the pending fly-to; the viewport lands on
    /// its target. Returns the applied request.
    pub fn apply_camera(&mut self) -> Option<CameraRequest> {
        let request = self.pending_camera.take()?;
        self.viewport = Viewport {
            latitude: request.latitude,
            longitude: request.longitude,
            zoom: request.zoom,
        };
        Some(request)
    }
}
