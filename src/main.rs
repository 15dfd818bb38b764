//! CLI entry point for the ship track dashboard.
//!
//! Loads the ship ping and port CSVs once, then lists selector options,
//! exports a ship's or a port's tracks as GeoJSON, or replays a session of
//! UI events.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use ship_tracks::{
    config::DashboardConfig,
    dashboard::{Dashboard, LoadState},
    fetch::BasicClient,
    output::{append_visits, print_json, print_pretty, write_geojson},
    session,
};
use std::ffi::OsStr;
use std::io::BufReader;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ship_tracks")]
#[command(about = "Plot ship tracks and port visits from CSV exports", long_about = None)]
struct Cli {
    /// Ship ping CSV path or URL (overrides SHIP_DATA_SOURCE)
    #[arg(long, global = true, value_name = "FILE_OR_URL")]
    ships_source: Option<String>,

    /// Port CSV path or URL (overrides PORT_DATA_SOURCE)
    #[arg(long, global = true, value_name = "FILE_OR_URL")]
    ports_source: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the ship selector options
    Ships,
    /// List the port selector options
    Ports,
    /// Select a ship and export its daily tracks and latest position
    Ship {
        #[arg(value_name = "SHIP_ID")]
        ship_id: String,

        /// GeoJSON file to write
        #[arg(short, long, default_value = "ship.geojson")]
        output: String,
    },
    /// Select a port, list visiting ships and export their tracks
    Port {
        #[arg(value_name = "PORT_NAME")]
        name: String,

        /// GeoJSON file to write
        #[arg(short, long, default_value = "port.geojson")]
        output: String,

        /// Optional: CSV file to append visiting ships to
        #[arg(long)]
        visits_csv: Option<String>,
    },
    /// Replay UI commands from a script file or stdin
    Session {
        /// Script to read (defaults to stdin)
        #[arg(short, long)]
        script: Option<String>,

        /// Optional: GeoJSON file for the final scene
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ship_tracks.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ship_tracks.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = DashboardConfig::from_env().with_sources(cli.ships_source, cli.ports_source);
    let mut dashboard = Dashboard::new(config);

    let client = BasicClient::new();
    if let LoadState::Failed(message) = dashboard.mount(&client).await {
        error!(%message, "Dashboard failed to load");
        bail!("{message}");
    }

    match cli.command {
        Commands::Ships => {
            let selector = dashboard.selector();
            for option in &selector.options {
                info!(value = %option.value, label = %option.label, "Ship");
            }
            info!(total = selector.options.len(), "Ship list");
        }
        Commands::Ports => {
            dashboard.view_mut().toggle_mode();
            let selector = dashboard.selector();
            for option in &selector.options {
                info!(name = %option.value, "Port");
            }
            info!(total = selector.options.len(), "Port list");
        }
        Commands::Ship { ship_id, output } => {
            match dashboard.select_ship(&ship_id) {
                Some(camera) => {
                    info!(
                        latitude = camera.latitude,
                        longitude = camera.longitude,
                        zoom = camera.zoom,
                        duration_ms = camera.duration_ms,
                        "Fly-to"
                    );
                    dashboard.view_mut().apply_camera();
                }
                None => warn!(ship = %ship_id, "No pings recorded for ship"),
            }
            export_scene(&dashboard, &output)?;
        }
        Commands::Port {
            name,
            output,
            visits_csv,
        } => {
            dashboard.view_mut().toggle_mode();
            if let Some(panel) = dashboard.select_port(&name)? {
                info!("{}", panel.title());
                if panel.ships.is_empty() {
                    info!("No ship visited here in last 7 days");
                }
                for ship in &panel.ships {
                    info!(ship = %ship.value, label = %ship.label, "Visitor");
                }
                print_json(&panel)?;
                if let Some(path) = visits_csv {
                    append_visits(&path, &panel)?;
                }
            }
            export_scene(&dashboard, &output)?;
        }
        Commands::Session { script, output } => {
            let mut stdout = std::io::stdout().lock();
            let applied = match script {
                Some(path) => {
                    let file = std::fs::File::open(&path)?;
                    session::run(&mut dashboard, BufReader::new(file), &mut stdout)?
                }
                None => session::run(&mut dashboard, std::io::stdin().lock(), &mut stdout)?,
            };
            info!(applied, "Session finished");
            if let Some(path) = output {
                export_scene(&dashboard, &path)?;
            }
        }
    }

    Ok(())
}

/// Writes the dashboard's current scene to `path`.
fn export_scene(dashboard: &Dashboard, path: &str) -> Result<()> {
    if let Some(scene) = dashboard.scene() {
        print_pretty(&scene);
        write_geojson(path, &scene)?;
    }
    Ok(())
}
