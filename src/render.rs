//! What the map surface draws: styled track lines, markers and the viewport.
//!
//! [`MapScene`] is built from controller state and exported as a GeoJSON
//! `FeatureCollection` for an external map renderer.

use chrono::NaiveDate;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value as GeoValue};
use serde::Serialize;

use crate::model::{TrackPoint, Viewport};
use crate::tracks::ShipTracks;
use crate::view::{Selection, ViewController};

/// Line colors by recency rank, brightest for the most recent day.
pub const TRACK_COLORS: &[&str] = &[
    "#FF0000", "#E60000", "#CC0000", "#B30000", "#990000", "#800000", "#660000", "#4D0000",
    "#330000",
];

/// Dash arrays by recency rank; rank 0 is solid.
pub const TRACK_DASHES: &[[f64; 2]] = &[
    [1.0, 0.0],
    [1.0, 2.0],
    [0.9, 3.0],
    [0.8, 4.0],
    [0.7, 5.0],
    [0.6, 6.0],
    [0.5, 7.0],
    [0.4, 8.0],
    [0.3, 9.0],
    [0.2, 10.0],
];

pub const TRACK_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub dasharray: [f64; 2],
    pub width: f64,
}

impl LineStyle {
    /// Style for a day's track; ranks past the end of the tables reuse the
    /// faintest entry.
    pub fn for_rank(rank: usize) -> Self {
        let color = TRACK_COLORS[rank.min(TRACK_COLORS.len() - 1)];
        let dasharray = TRACK_DASHES[rank.min(TRACK_DASHES.len() - 1)];
        Self {
            color,
            dasharray,
            width: TRACK_WIDTH,
        }
    }
}

/// One ship-day polyline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackLine {
    pub ship_id: String,
    pub day: NaiveDate,
    pub rank: usize,
    pub style: LineStyle,
    pub points: Vec<TrackPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapScene {
    pub viewport: Viewport,
    pub lines: Vec<TrackLine>,
    pub markers: Vec<Marker>,
}

impl MapScene {
    pub fn build(view: &ViewController, tracks: &ShipTracks) -> Self {
        let mut lines = Vec::new();
        let mut markers = Vec::new();

        match view.selection() {
            Selection::None => {}
            Selection::Ship(ship_id) => {
                lines.extend(ship_lines(ship_id, tracks));
                if let Some(latest) = tracks.latest(ship_id) {
                    markers.push(Marker {
                        latitude: latest.point.latitude,
                        longitude: latest.point.longitude,
                        label: ship_id.clone(),
                    });
                }
            }
            Selection::Port(_) => {
                for ship_id in view.visited() {
                    lines.extend(ship_lines(ship_id, tracks));
                }
            }
        }

        Self {
            viewport: view.viewport(),
            lines,
            markers,
        }
    }

    /// Exports lines as `LineString` features and markers as `Point`
    /// features. Lines with fewer than two points are left out.
    pub fn to_geojson(&self) -> FeatureCollection {
        let line_features = self
            .lines
            .iter()
            .filter(|line| line.points.len() >= 2)
            .map(|line| {
                let coordinates = line
                    .points
                    .iter()
                    .map(|p| p.position().to_vec())
                    .collect();

                let mut properties = JsonObject::new();
                properties.insert("ship".into(), JsonValue::from(line.ship_id.as_str()));
                properties.insert("day".into(), JsonValue::from(line.day.format("%Y-%m-%d").to_string()));
                properties.insert("rank".into(), JsonValue::from(line.rank));
                properties.insert("line-color".into(), JsonValue::from(line.style.color));
                properties.insert("line-width".into(), JsonValue::from(line.style.width));
                properties.insert(
                    "line-dasharray".into(),
                    JsonValue::from(line.style.dasharray.to_vec()),
                );

                feature(GeoValue::LineString(coordinates), properties)
            });

        let marker_features = self.markers.iter().map(|m| {
            let mut properties = JsonObject::new();
            properties.insert("marker".into(), JsonValue::from("ship"));
            properties.insert("label".into(), JsonValue::from(m.label.as_str()));
            feature(GeoValue::Point(vec![m.longitude, m.latitude]), properties)
        });

        FeatureCollection {
            bbox: None,
            features: line_features.chain(marker_features).collect(),
            foreign_members: None,
        }
    }
}

fn feature(value: GeoValue, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn ship_lines<'a>(ship_id: &'a str, tracks: &'a ShipTracks) -> impl Iterator<Item = TrackLine> + 'a {
    tracks
        .days_by_recency(ship_id)
        .into_iter()
        .map(move |(rank, day, points)| TrackLine {
            ship_id: ship_id.to_string(),
            day,
            rank,
            style: LineStyle::for_rank(rank),
            points: points.to_vec(),
        })
}
