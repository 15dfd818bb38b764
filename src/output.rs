//! Output formatting and persistence for map scenes and port visits.
//!
//! Supports pretty-printing, GeoJSON files, and CSV append.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::dashboard::PortPanel;
use crate::render::MapScene;
use csv::WriterBuilder;
use geojson::GeoJson;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// One CSV row per ship seen at a port.
#[derive(Debug, Serialize)]
pub struct VisitRecord<'a> {
    pub recorded_at: DateTime<Utc>,
    pub port: &'a str,
    pub ship_id: &'a str,
    pub ship_label: &'a str,
}

/// Logs a scene using Rust's debug pretty-print format.
pub fn print_pretty(scene: &MapScene) {
    debug!("{:#?}", scene);
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes the scene as a GeoJSON `FeatureCollection`, replacing `path`.
pub fn write_geojson(path: &str, scene: &MapScene) -> Result<()> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("failed to create {path}"))?;
    let mut writer = BufWriter::new(file);
    let geojson = GeoJson::from(scene.to_geojson());
    serde_json::to_writer_pretty(&mut writer, &geojson)?;
    writer.flush()?;
    info!(path, lines = scene.lines.len(), markers = scene.markers.len(), "GeoJSON written");
    Ok(())
}

/// Appends one row per visiting ship to a CSV file.
///
/// Creates the file with headers if it does not already exist. An empty
/// panel writes nothing.
pub fn append_visits(path: &str, panel: &PortPanel) -> Result<()> {
    if panel.ships.is_empty() {
        return Ok(());
    }
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = panel.ships.len(), "Appending visit records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    let now = Utc::now();
    for ship in &panel.ships {
        writer.serialize(VisitRecord {
            recorded_at: now,
            port: &panel.port,
            ship_id: &ship.value,
            ship_label: &ship.label,
        })?;
    }
    writer.flush()?;

    Ok(())
}
