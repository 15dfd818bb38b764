//! Record types shared by ingestion, aggregation and rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named port location. Loaded once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One recorded ship position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ping {
    pub ship_id: String,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

/// A ping with its ship stripped off, as stored inside a day's track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackPoint {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Ping> for TrackPoint {
    fn from(p: &Ping) -> Self {
        Self {
            timestamp: p.timestamp,
            latitude: p.latitude,
            longitude: p.longitude,
        }
    }
}

impl TrackPoint {
    /// GeoJSON position order: `[longitude, latitude]`.
    pub fn position(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// Map camera state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            latitude: 28.6448,
            longitude: 77.216,
            zoom: 2.0,
        }
    }
}
