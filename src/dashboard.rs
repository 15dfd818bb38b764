//! Top-level dashboard: one-shot data load plus the view it drives.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use tracing::{error, info};

use crate::config::DashboardConfig;
use crate::fetch::{HttpClient, load_source};
use crate::ingest::{parse_pings, parse_ports};
use crate::model::Port;
use crate::options::{SelectOption, port_options, ship_option, ship_options};
use crate::render::MapScene;
use crate::tracks::ShipTracks;
use crate::view::{CameraRequest, Mode, Selection, ViewController};

/// The only failure text the user ever sees.
pub const LOAD_ERROR_MESSAGE: &str = "Error fetching data. Please try again.";

/// Everything loaded at mount.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub ports: Vec<Port>,
    pub tracks: ShipTracks,
}

impl Dataset {
    pub fn from_csv(ship_csv: &[u8], port_csv: &[u8]) -> Result<Self> {
        let ports = parse_ports(port_csv).context("port data")?;
        let pings = parse_pings(ship_csv).context("ship data")?;
        let tracks = ShipTracks::from_pings(&pings);
        info!(
            ports = ports.len(),
            ships = tracks.len(),
            pings = pings.len(),
            "Dataset parsed"
        );
        Ok(Self { ports, tracks })
    }

    /// Fetches both sources concurrently, then parses them.
    #[tracing::instrument(skip_all, fields(ships = %config.ship_source, ports = %config.port_source))]
    pub async fn load<C: HttpClient>(client: &C, config: &DashboardConfig) -> Result<Self> {
        let (ship_csv, port_csv) = tokio::try_join!(
            async {
                load_source(client, &config.ship_source)
                    .await
                    .context("ship data")
            },
            async {
                load_source(client, &config.port_source)
                    .await
                    .context("port data")
            },
        )?;
        Self::from_csv(&ship_csv, &port_csv)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Ready(Dataset),
    Failed(String),
}

/// Contents of the visible selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selector {
    pub placeholder: &'static str,
    pub options: Vec<SelectOption>,
    pub value: Option<String>,
}

/// Side panel listing ships seen at the selected port.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortPanel {
    pub port: String,
    pub ships: Vec<SelectOption>,
}

impl PortPanel {
    pub fn title(&self) -> String {
        format!("Ships visited at {} in last 7 days", self.port)
    }
}

impl fmt::Display for PortPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title())?;
        if self.ships.is_empty() {
            writeln!(f, "No ship visited here in last 7 days")?;
        }
        for ship in &self.ships {
            writeln!(f, "  - {}", ship.label)?;
        }
        Ok(())
    }
}

pub struct Dashboard {
    config: DashboardConfig,
    state: LoadState,
    mounted: bool,
    view: ViewController,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        let view = ViewController::new(config.initial_viewport);
        Self {
            config,
            state: LoadState::Loading,
            mounted: false,
            view,
        }
    }

    /// Builds an already-loaded dashboard, skipping the fetch.
    pub fn with_dataset(config: DashboardConfig, dataset: Dataset) -> Self {
        let mut dashboard = Self::new(config);
        dashboard.state = LoadState::Ready(dataset);
        dashboard.mounted = true;
        dashboard
    }

    /// Runs the initial load. Only the first call does any work; a failed
    /// load is final.
    pub async fn mount<C: HttpClient>(&mut self, client: &C) -> &LoadState {
        if self.mounted {
            return &self.state;
        }
        self.mounted = true;

        self.state = match Dataset::load(client, &self.config).await {
            Ok(dataset) => LoadState::Ready(dataset),
            Err(e) => {
                error!(error = %format!("{e:#}"), "Error fetching data");
                LoadState::Failed(LOAD_ERROR_MESSAGE.to_string())
            }
        };
        &self.state
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        match &self.state {
            LoadState::Ready(dataset) => Some(dataset),
            _ => None,
        }
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewController {
        &mut self.view
    }

    /// Selects a ship. Does nothing until data is ready.
    pub fn select_ship(&mut self, ship_id: &str) -> Option<CameraRequest> {
        let LoadState::Ready(dataset) = &self.state else {
            return None;
        };
        self.view.select_ship(ship_id, &dataset.tracks)
    }

    /// Selects a port and returns the resulting panel.
    pub fn select_port(&mut self, name: &str) -> Result<Option<PortPanel>> {
        let LoadState::Ready(dataset) = &self.state else {
            return Ok(None);
        };
        self.view.select_port(name, &dataset.ports, &dataset.tracks)?;
        Ok(self.port_panel())
    }

    pub fn selector(&self) -> Selector {
        let (placeholder, options) = match (self.view.mode(), self.dataset()) {
            (Mode::Ship, dataset) => (
                "Select a ship...",
                dataset.map(|d| ship_options(&d.tracks)).unwrap_or_default(),
            ),
            (Mode::Port, dataset) => (
                "Select a port...",
                dataset.map(|d| port_options(&d.ports)).unwrap_or_default(),
            ),
        };
        Selector {
            placeholder,
            options,
            value: self.view.selector_value().map(str::to_string),
        }
    }

    /// The open port panel, if any.
    pub fn port_panel(&self) -> Option<PortPanel> {
        if !self.view.panel_open() {
            return None;
        }
        let Selection::Port(port) = self.view.selection() else {
            return None;
        };
        Some(PortPanel {
            port: port.clone(),
            ships: self.view.visited().iter().map(|s| ship_option(s)).collect(),
        })
    }

    pub fn scene(&self) -> Option<MapScene> {
        self.dataset()
            .map(|dataset| MapScene::build(&self.view, &dataset.tracks))
    }
}
