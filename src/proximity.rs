//! Port visit detection by bounding-box proximity.

use std::collections::BTreeSet;

use crate::model::Port;
use crate::tracks::ShipTracks;

/// Half-width, in degrees, of the box drawn around a port.
pub const PROXIMITY_DEGREES: f64 = 0.01;

/// Axis-aligned box test; not a geodesic distance.
pub fn within_box(lat: f64, lon: f64, center_lat: f64, center_lon: f64, tolerance: f64) -> bool {
    (lat - center_lat).abs() <= tolerance && (lon - center_lon).abs() <= tolerance
}

/// Ids of ships with at least one point inside the port's box.
#[tracing::instrument(skip(port, tracks), fields(port_name = %port.name))]
pub fn visiting_ships(port: &Port, tracks: &ShipTracks) -> BTreeSet<String> {
    let visited: BTreeSet<String> = tracks
        .iter()
        .filter(|(_, days)| {
            days.values().flatten().any(|p| {
                within_box(
                    p.latitude,
                    p.longitude,
                    port.latitude,
                    port.longitude,
                    PROXIMITY_DEGREES,
                )
            })
        })
        .map(|(ship, _)| ship.to_string())
        .collect();

    tracing::debug!(visitors = visited.len(), "Proximity scan complete");
    visited
}
