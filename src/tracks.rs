//! Grouping of raw pings into per-ship, per-day tracks.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{Ping, TrackPoint};

/// One ship's tracks keyed by UTC calendar day.
pub type DailyTracks = BTreeMap<NaiveDate, Vec<TrackPoint>>;

/// All ships' tracks, keyed by ship id then day.
///
/// Each day's points are in timestamp order. Pings sharing a timestamp keep
/// their input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShipTracks {
    ships: BTreeMap<String, DailyTracks>,
}

/// The most recent point recorded for a ship.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatestPing {
    pub day: NaiveDate,
    pub point: TrackPoint,
}

impl ShipTracks {
    pub fn from_pings(pings: &[Ping]) -> Self {
        let mut ships: BTreeMap<String, DailyTracks> = BTreeMap::new();

        for ping in pings {
            let day = ping.timestamp.date_naive();
            ships
                .entry(ping.ship_id.clone())
                .or_default()
                .entry(day)
                .or_default()
                .push(TrackPoint::from(ping));
        }

        for days in ships.values_mut() {
            for points in days.values_mut() {
                points.sort_by_key(|p| p.timestamp);
            }
        }

        Self { ships }
    }

    /// Ship ids in ascending order.
    pub fn ships(&self) -> impl Iterator<Item = &str> {
        self.ships.keys().map(String::as_str)
    }

    pub fn days(&self, ship: &str) -> Option<&DailyTracks> {
        self.ships.get(ship)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DailyTracks)> {
        self.ships.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    /// Total number of points across every ship and day.
    pub fn ping_count(&self) -> usize {
        self.ships
            .values()
            .flat_map(|days| days.values())
            .map(Vec::len)
            .sum()
    }

    /// Finds the ship's most recent point by comparing timestamps.
    ///
    /// Returns `None` for an unknown ship or one with no points.
    pub fn latest(&self, ship: &str) -> Option<LatestPing> {
        self.ships
            .get(ship)?
            .iter()
            .flat_map(|(day, points)| points.iter().map(move |p| (*day, *p)))
            .max_by_key(|(_, p)| p.timestamp)
            .map(|(day, point)| LatestPing { day, point })
    }

    /// The ship's days, most recent first, paired with their recency rank
    /// (0 = most recent).
    pub fn days_by_recency(&self, ship: &str) -> Vec<(usize, NaiveDate, &[TrackPoint])> {
        let Some(days) = self.ships.get(ship) else {
            return Vec::new();
        };
        days.iter()
            .rev()
            .enumerate()
            .map(|(rank, (day, points))| (rank, *day, points.as_slice()))
            .collect()
    }
}
