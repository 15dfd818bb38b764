//! `{value, label}` lists for the ship and port selectors.

use serde::Serialize;
use std::cmp::Ordering;

use crate::model::Port;
use crate::tracks::ShipTracks;

const SHIP_PREFIX: &str = "ship_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Display label for a ship id: `ship_12` becomes `Ship 12`; other ids are
/// shown unchanged.
pub fn ship_label(ship_id: &str) -> String {
    match ship_id.strip_prefix(SHIP_PREFIX) {
        Some(rest) if !rest.is_empty() => format!("Ship {rest}"),
        _ => ship_id.to_string(),
    }
}

fn ship_number(ship_id: &str) -> Option<u64> {
    ship_id.strip_prefix(SHIP_PREFIX)?.parse().ok()
}

/// Orders numbered ships numerically, then everything else by id.
fn compare_ships(a: &str, b: &str) -> Ordering {
    match (ship_number(a), ship_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

pub fn ship_options(tracks: &ShipTracks) -> Vec<SelectOption> {
    let mut ids: Vec<&str> = tracks.ships().collect();
    ids.sort_by(|a, b| compare_ships(a, b));
    ids.into_iter().map(ship_option).collect()
}

pub fn ship_option(ship_id: &str) -> SelectOption {
    SelectOption {
        value: ship_id.to_string(),
        label: ship_label(ship_id),
    }
}

/// Ports in file order, labelled by name.
pub fn port_options(ports: &[Port]) -> Vec<SelectOption> {
    ports
        .iter()
        .map(|p| SelectOption {
            value: p.name.clone(),
            label: p.name.clone(),
        })
        .collect()
}
