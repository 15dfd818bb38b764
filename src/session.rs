//! Line-oriented replay of UI events against a [`Dashboard`].
//!
//! ```text
//! # comments and blank lines are skipped
//! ship ship_7
//! press
//! move 12.5 80.1 7
//! release
//! mode
//! port Chennai Port
//! close
//! show
//! ```

use anyhow::{Context, Result, anyhow, bail};
use std::io::{BufRead, Write};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::dashboard::Dashboard;
use crate::model::Viewport;
use crate::view::Selection;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Toggle between the ship and port selectors.
    Mode,
    Ship(String),
    Port(String),
    Clear,
    Close,
    /// Pointer or touch down on the map.
    Press,
    /// Pointer or touch up.
    Release,
    Move(Viewport),
    /// The map finished the pending fly-to.
    Fly,
    Show,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };

        let no_args = |cmd: Command| {
            if rest.is_empty() {
                Ok(cmd)
            } else {
                Err(anyhow!("`{word}` takes no arguments"))
            }
        };

        match word {
            "mode" => no_args(Command::Mode),
            "clear" => no_args(Command::Clear),
            "close" => no_args(Command::Close),
            "press" => no_args(Command::Press),
            "release" => no_args(Command::Release),
            "fly" => no_args(Command::Fly),
            "show" => no_args(Command::Show),
            "ship" if !rest.is_empty() => Ok(Command::Ship(rest.to_string())),
            "port" if !rest.is_empty() => Ok(Command::Port(rest.to_string())),
            "ship" | "port" => bail!("`{word}` needs a name"),
            "move" => {
                let parts: Vec<&str> = rest.split_whitespace().collect();
                let [lat, lon, zoom] = parts.as_slice() else {
                    bail!("`move` takes <lat> <lon> <zoom>");
                };
                Ok(Command::Move(Viewport {
                    latitude: parse_number(lat, "latitude")?,
                    longitude: parse_number(lon, "longitude")?,
                    zoom: parse_number(zoom, "zoom")?,
                }))
            }
            other => bail!("unknown command `{other}`"),
        }
    }
}

fn parse_number(raw: &str, what: &str) -> Result<f64> {
    let value: f64 = raw.parse().with_context(|| format!("bad {what} {raw:?}"))?;
    if !value.is_finite() {
        bail!("bad {what} {raw:?}");
    }
    Ok(value)
}

/// Applies one command, writing any user-facing text to `out`.
pub fn apply(dashboard: &mut Dashboard, command: Command, out: &mut impl Write) -> Result<()> {
    debug!(?command, "Applying command");
    match command {
        Command::Mode => dashboard.view_mut().toggle_mode(),
        Command::Ship(id) => match dashboard.select_ship(&id) {
            Some(camera) => writeln!(
                out,
                "fly-to {:.5},{:.5} zoom {}",
                camera.latitude, camera.longitude, camera.zoom
            )?,
            None => writeln!(out, "no camera move for {id}")?,
        },
        Command::Port(name) => {
            if let Some(panel) = dashboard.select_port(&name)? {
                write!(out, "{panel}")?;
            }
        }
        Command::Clear => dashboard.view_mut().clear_selection(),
        Command::Close => dashboard.view_mut().close_panel(),
        Command::Press => dashboard.view_mut().interaction_start(),
        Command::Release => dashboard.view_mut().interaction_end(),
        Command::Move(viewport) => dashboard.view_mut().on_move(viewport),
        Command::Fly => {
            if dashboard.view_mut().apply_camera().is_none() {
                writeln!(out, "no pending fly-to")?;
            }
        }
        Command::Show => show(dashboard, out)?,
    }
    Ok(())
}

fn show(dashboard: &Dashboard, out: &mut impl Write) -> Result<()> {
    let view = dashboard.view();
    let vp = view.viewport();
    let selection = match view.selection() {
        Selection::None => "none".to_string(),
        Selection::Ship(id) => format!("ship {id}"),
        Selection::Port(name) => format!("port {name}"),
    };
    writeln!(
        out,
        "mode {:?} | selection {selection} | viewport {:.4},{:.4} z{} | panel {}",
        view.mode(),
        vp.latitude,
        vp.longitude,
        vp.zoom,
        if view.panel_open() { "open" } else { "closed" },
    )?;
    if let Some(scene) = dashboard.scene() {
        writeln!(
            out,
            "lines {} | markers {}",
            scene.lines.len(),
            scene.markers.len()
        )?;
    }
    Ok(())
}

/// Runs every line of `input`. Bad lines, including ones that are not valid
/// UTF-8, are reported and skipped; returns the number of commands applied.
pub fn run(
    dashboard: &mut Dashboard,
    mut input: impl BufRead,
    out: &mut impl Write,
) -> Result<usize> {
    let mut applied = 0;
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        let result = match std::str::from_utf8(&buf) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    continue;
                }
                match trimmed.parse::<Command>() {
                    Ok(command) => apply(dashboard, command, out),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(anyhow!("line is not valid UTF-8: {e}")),
        };
        match result {
            Ok(()) => applied += 1,
            Err(e) => {
                warn!(line = line_no, error = %e, "Session command failed");
                writeln!(out, "line {line_no}: {e:#}")?;
            }
        }
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::dashboard::Dataset;
    use crate::view::Mode;

    const SHIPS: &str = "site_name,ec_timestamp,location_latitude,location_longitude\n\
                         ship_1,2024-03-01T08:00:00Z,10.0,20.0\n\
                         ship_1,2024-03-02T08:00:00Z,12.0,22.0\n";
    const PORTS: &str = "port_name,geo_location_latitude,geo_location_longitude\n\
                         Old Harbor,10.0,20.0\n";

    fn dashboard() -> Dashboard {
        let dataset = Dataset::from_csv(SHIPS.as_bytes(), PORTS.as_bytes()).unwrap();
        Dashboard::with_dataset(DashboardConfig::default(), dataset)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("mode".parse::<Command>().unwrap(), Command::Mode);
        assert_eq!(
            "ship ship_7".parse::<Command>().unwrap(),
            Command::Ship("ship_7".into())
        );
        assert_eq!(
            "port  Old Harbor ".parse::<Command>().unwrap(),
            Command::Port("Old Harbor".into())
        );
        assert_eq!(
            "move 1.5 -2 7".parse::<Command>().unwrap(),
            Command::Move(Viewport {
                latitude: 1.5,
                longitude: -2.0,
                zoom: 7.0
            })
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("teleport".parse::<Command>().is_err());
        assert!("ship".parse::<Command>().is_err());
        assert!("move 1 2".parse::<Command>().is_err());
        assert!("move a b c".parse::<Command>().is_err());
        assert!("close now".parse::<Command>().is_err());
    }

    #[test]
    fn test_run_script() {
        let mut dash = dashboard();
        let script = "# pick a ship\n\
                      ship ship_1\n\
                      fly\n\
                      \n\
                      mode\n\
                      port Old Harbor\n\
                      close\n\
                      show\n";
        let mut out = Vec::new();

        let applied = run(&mut dash, script.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(applied, 6);
        assert!(text.contains("fly-to 12.00000,22.00000 zoom 6"));
        assert!(text.contains("Ships visited at Old Harbor in last 7 days"));
        assert!(text.contains("  - Ship 1"));
        assert!(text.contains("selection port Old Harbor"));
        assert!(text.contains("panel closed"));
        assert_eq!(dash.view().mode(), Mode::Port);
    }

    #[test]
    fn test_press_suppresses_fly_to() {
        let mut dash = dashboard();
        let mut out = Vec::new();

        run(&mut dash, "press\nship ship_1\nrelease\n".as_bytes(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("no camera move for ship_1"));
        assert!(!dash.view().is_interacting());
    }

    #[test]
    fn test_bad_lines_are_reported_and_skipped() {
        let mut dash = dashboard();
        let mut out = Vec::new();

        let applied = run(&mut dash, "bogus\nport Nowhere\nmode\n".as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(applied, 1);
        assert!(text.contains("line 1: unknown command `bogus`"));
        assert!(text.contains("line 2: unknown port \"Nowhere\""));
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let mut dash = dashboard();
        let mut out = Vec::new();

        let applied = run(&mut dash, b"mode\n\xff\xfe bogus\nmode\n".as_slice(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(applied, 2);
        assert!(text.contains("line 2: line is not valid UTF-8"));
        assert_eq!(dash.view().mode(), Mode::Ship);
    }

    #[test]
    fn test_last_line_without_newline() {
        let mut dash = dashboard();
        let mut out = Vec::new();

        let applied = run(&mut dash, "mode\r\nship ship_1".as_bytes(), &mut out).unwrap();

        assert_eq!(applied, 2);
        assert_eq!(dash.view().mode(), Mode::Port);
        assert!(String::from_utf8(out).unwrap().contains("fly-to"));
    }
}
