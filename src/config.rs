//! Runtime configuration read from the environment (and `.env` via `dotenvy`).

use crate::model::Viewport;

pub const DEFAULT_SHIP_SOURCE: &str = "ship_data.csv";
pub const DEFAULT_PORT_SOURCE: &str = "ports_data.csv";

/// Where the two datasets live and where the camera starts.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Local path or `http(s)` URL of the ship ping CSV.
    pub ship_source: String,
    /// Local path or `http(s)` URL of the port CSV.
    pub port_source: String,
    pub initial_viewport: Viewport,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            ship_source: DEFAULT_SHIP_SOURCE.to_string(),
            port_source: DEFAULT_PORT_SOURCE.to_string(),
            initial_viewport: Viewport::default(),
        }
    }
}

impl DashboardConfig {
    /// Reads `SHIP_DATA_SOURCE`, `PORT_DATA_SOURCE`, `INITIAL_LATITUDE`,
    /// `INITIAL_LONGITUDE` and `INITIAL_ZOOM`. Missing or unparsable values
    /// fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let number = |key: &str, fallback: f64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(fallback)
        };

        Self {
            ship_source: lookup("SHIP_DATA_SOURCE").unwrap_or(defaults.ship_source),
            port_source: lookup("PORT_DATA_SOURCE").unwrap_or(defaults.port_source),
            initial_viewport: Viewport {
                latitude: number("INITIAL_LATITUDE", defaults.initial_viewport.latitude),
                longitude: number("INITIAL_LONGITUDE", defaults.initial_viewport.longitude),
                zoom: number("INITIAL_ZOOM", defaults.initial_viewport.zoom),
            },
        }
    }

    /// Replaces the sources with CLI overrides where given.
    pub fn with_sources(mut self, ships: Option<String>, ports: Option<String>) -> Self {
        if let Some(s) = ships {
            self.ship_source = s;
        }
        if let Some(p) = ports {
            self.port_source = p;
        }
        self
    }
}
